//! 记录与数据集
//!
//! 一个 `Dataset` 对应一个输入 CSV，整个生命周期只属于处理该文件的那一轮。

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// 标识列
pub const ID_COLUMN: &str = "ORIG_FID";
pub const LAT_COLUMN: &str = "lat";
pub const LON_COLUMN: &str = "lon";
pub const AZIMUTH_CW_COLUMN: &str = "azimuth_cw";
pub const AZIMUTH_AW_COLUMN: &str = "azimuth_aw";

/// 年发电量，`None` 表示缺失
pub type YieldValue = Option<f64>;

/// 两个候选朝向
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Orientation {
    /// 顺时针
    Cw,
    /// 逆时针
    Aw,
}

impl Orientation {
    /// 处理顺序：先 cw 后 aw
    pub const ALL: [Orientation; 2] = [Orientation::Cw, Orientation::Aw];

    pub fn label(self) -> &'static str {
        match self {
            Orientation::Cw => "cw",
            Orientation::Aw => "aw",
        }
    }

    /// 输出文件中的结果列名
    pub fn result_column(self) -> &'static str {
        match self {
            Orientation::Cw => "E_Y_cw",
            Orientation::Aw => "E_Y_aw",
        }
    }
}

impl fmt::Display for Orientation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// 一行已清洗的输入
///
/// `fields` 保留原始单元格文本（按表头对齐，短行已补空），写出时原样回填。
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub id: String,
    pub lat: f64,
    pub lon: f64,
    pub azimuth_cw: f64,
    pub azimuth_aw: f64,
    pub fields: Vec<String>,
}

impl Record {
    /// 指定朝向对应的 aspect 角度
    pub fn aspect(&self, orientation: Orientation) -> f64 {
        match orientation {
            Orientation::Cw => self.azimuth_cw,
            Orientation::Aw => self.azimuth_aw,
        }
    }
}

/// 必需列在表头中的位置
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnIndex {
    pub id: usize,
    pub lat: usize,
    pub lon: usize,
    pub azimuth_cw: usize,
    pub azimuth_aw: usize,
}

impl ColumnIndex {
    /// 如果该列是被转换成数值的列，返回记录里对应的数值
    pub fn numeric_value(&self, column: usize, record: &Record) -> Option<f64> {
        if column == self.lat {
            Some(record.lat)
        } else if column == self.lon {
            Some(record.lon)
        } else if column == self.azimuth_cw {
            Some(record.azimuth_cw)
        } else if column == self.azimuth_aw {
            Some(record.azimuth_aw)
        } else {
            None
        }
    }
}

/// 单个输入文件清洗后的有序记录集合
#[derive(Debug, Clone)]
pub struct Dataset {
    pub source: PathBuf,
    pub headers: Vec<String>,
    pub columns: ColumnIndex,
    pub records: Vec<Record>,
    /// 清洗阶段丢弃的行数
    pub dropped_rows: usize,
    /// 按表头位置标记的小数列：写出时统一保留 4 位小数
    pub decimal_columns: Vec<bool>,
}

impl Dataset {
    /// 该列是否按浮点数写出（标识符列除外）
    pub fn is_decimal_column(&self, column: usize) -> bool {
        column != self.columns.id && self.decimal_columns.get(column).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 文件名（仅用于日志）
    pub fn file_name(&self) -> String {
        self.source
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string()
    }
}

/// 按标识符收集的两组查询结果
///
/// 同一标识符重复出现时，后写入的结果覆盖之前的结果。
#[derive(Debug, Default, Clone)]
pub struct YieldTable {
    cw: HashMap<String, YieldValue>,
    aw: HashMap<String, YieldValue>,
}

impl YieldTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, orientation: Orientation, id: &str, value: YieldValue) {
        let map = match orientation {
            Orientation::Cw => &mut self.cw,
            Orientation::Aw => &mut self.aw,
        };
        map.insert(id.to_string(), value);
    }

    /// 查不到标识符与查询失败一样，都视为缺失
    pub fn get(&self, orientation: Orientation, id: &str) -> YieldValue {
        let map = match orientation {
            Orientation::Cw => &self.cw,
            Orientation::Aw => &self.aw,
        };
        map.get(id).copied().flatten()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yield_table_lookup() {
        let mut table = YieldTable::new();
        table.insert(Orientation::Cw, "7", Some(1234.5));
        table.insert(Orientation::Aw, "7", None);

        assert_eq!(table.get(Orientation::Cw, "7"), Some(1234.5));
        assert_eq!(table.get(Orientation::Aw, "7"), None);
        assert_eq!(table.get(Orientation::Cw, "8"), None);
    }

    #[test]
    fn test_duplicate_id_last_write_wins() {
        let mut table = YieldTable::new();
        table.insert(Orientation::Cw, "1", Some(1.0));
        table.insert(Orientation::Cw, "1", Some(2.0));
        assert_eq!(table.get(Orientation::Cw, "1"), Some(2.0));
    }

    #[test]
    fn test_orientation_labels() {
        assert_eq!(Orientation::Cw.to_string(), "cw");
        assert_eq!(Orientation::Aw.result_column(), "E_Y_aw");
    }
}
