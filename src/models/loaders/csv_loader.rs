use crate::error::LoadError;
use crate::models::record::{
    ColumnIndex, Dataset, Record, AZIMUTH_AW_COLUMN, AZIMUTH_CW_COLUMN, ID_COLUMN, LAT_COLUMN,
    LON_COLUMN,
};
use std::path::Path;
use tokio::fs;
use tracing::{error, info};

/// 视为缺失值的单元格内容（空串单独处理）
const NA_TOKENS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// 单元格是否为缺失值
pub fn is_missing(cell: &str) -> bool {
    let cell = cell.trim();
    cell.is_empty() || NA_TOKENS.contains(&cell)
}

/// 把单元格转换成浮点数，非数值或 NaN 都返回 `None`
pub fn parse_number(cell: &str) -> Option<f64> {
    if is_missing(cell) {
        return None;
    }
    cell.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// 加载并清洗一个输入文件
///
/// 失败时记录日志并返回 `None`，调用方直接跳到下一个文件。
pub async fn load_dataset(path: &Path, skip_lines: usize) -> Option<Dataset> {
    info!(
        "\n--- 正在加载: {} ---",
        path.file_name().unwrap_or_default().to_string_lossy()
    );

    match try_load_dataset(path, skip_lines).await {
        Ok(dataset) => {
            info!("✓ 成功加载并清洗 {} 行", dataset.len());
            Some(dataset)
        }
        Err(e) => {
            error!("❌ {}", e);
            None
        }
    }
}

/// 与 `load_dataset` 相同，但保留具体错误
pub async fn try_load_dataset(path: &Path, skip_lines: usize) -> Result<Dataset, LoadError> {
    let content = fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LoadError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            LoadError::Read {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    parse_dataset(path, &content, skip_lines)
}

/// 解析 CSV 文本：跳过元数据行、校验列、转换数值、丢弃不完整的行
pub fn parse_dataset(path: &Path, content: &str, skip_lines: usize) -> Result<Dataset, LoadError> {
    let body = skip_leading_lines(content, skip_lines)
        .filter(|rest| !rest.trim().is_empty())
        .ok_or_else(|| LoadError::NoHeader {
            path: path.to_path_buf(),
            skipped: skip_lines,
        })?;

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let parse_err = |source: csv::Error| LoadError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let headers: Vec<String> = reader
        .headers()
        .map_err(parse_err)?
        .iter()
        .map(str::to_string)
        .collect();

    let columns = resolve_columns(path, &headers)?;

    let mut records = Vec::new();
    let mut rows_read = 0usize;
    let mut types = ColumnTypes::new(headers.len());

    for result in reader.records() {
        let row = result.map_err(parse_err)?;
        rows_read += 1;

        if row.len() > headers.len() {
            let line = row.position().map(|p| p.line()).unwrap_or(0) + skip_lines as u64;
            return Err(LoadError::RaggedRow {
                path: path.to_path_buf(),
                line,
                expected: headers.len(),
                found: row.len(),
            });
        }

        // 短行补空，与表头对齐
        let fields: Vec<String> = (0..headers.len())
            .map(|i| row.get(i).unwrap_or("").to_string())
            .collect();
        types.observe(&fields);

        if let Some(record) = clean_row(&columns, fields) {
            records.push(record);
        }
    }

    let dropped_rows = rows_read - records.len();
    if dropped_rows > 0 {
        info!("丢弃了 {} 行缺少必需数据的记录", dropped_rows);
    }

    if records.is_empty() {
        return Err(LoadError::EmptyAfterCleaning {
            path: path.to_path_buf(),
        });
    }

    Ok(Dataset {
        source: path.to_path_buf(),
        headers,
        columns,
        records,
        dropped_rows,
        decimal_columns: types.decimal_columns(),
    })
}

/// 按清洗前的全部行推断每列是否为小数列
///
/// 所有非缺失值都是数字，且至少有一个非整数或缺失值时，该列视为小数列。
struct ColumnTypes {
    numeric: Vec<bool>,
    fractional: Vec<bool>,
}

impl ColumnTypes {
    fn new(width: usize) -> Self {
        Self {
            numeric: vec![true; width],
            fractional: vec![false; width],
        }
    }

    fn observe(&mut self, fields: &[String]) {
        for (i, cell) in fields.iter().enumerate() {
            if !self.numeric[i] {
                continue;
            }
            if is_missing(cell) {
                self.fractional[i] = true;
            } else if parse_number(cell).is_none() {
                self.numeric[i] = false;
            } else if cell.trim().parse::<i64>().is_err() {
                self.fractional[i] = true;
            }
        }
    }

    fn decimal_columns(&self) -> Vec<bool> {
        self.numeric
            .iter()
            .zip(&self.fractional)
            .map(|(numeric, fractional)| *numeric && *fractional)
            .collect()
    }
}

fn skip_leading_lines(content: &str, count: usize) -> Option<&str> {
    let mut rest = content;
    for _ in 0..count {
        let newline = rest.find('\n')?;
        rest = &rest[newline + 1..];
    }
    Some(rest)
}

fn resolve_columns(path: &Path, headers: &[String]) -> Result<ColumnIndex, LoadError> {
    let find = |name: &str| headers.iter().position(|h| h == name);

    // 只支持已有 WGS84 lat/lon 列的文件
    let (lat, lon) = match (find(LAT_COLUMN), find(LON_COLUMN)) {
        (Some(lat), Some(lon)) => {
            info!("发现 'lat' 和 'lon' 列，按 WGS84 坐标处理");
            (lat, lon)
        }
        _ => {
            return Err(LoadError::MissingCoordinates {
                path: path.to_path_buf(),
            })
        }
    };

    let required = [ID_COLUMN, AZIMUTH_CW_COLUMN, AZIMUTH_AW_COLUMN];
    let missing: Vec<String> = required
        .iter()
        .filter(|name| find(**name).is_none())
        .map(|name| name.to_string())
        .collect();

    if !missing.is_empty() {
        return Err(LoadError::MissingColumns {
            path: path.to_path_buf(),
            columns: missing,
        });
    }

    Ok(ColumnIndex {
        id: find(ID_COLUMN).unwrap_or_default(),
        lat,
        lon,
        azimuth_cw: find(AZIMUTH_CW_COLUMN).unwrap_or_default(),
        azimuth_aw: find(AZIMUTH_AW_COLUMN).unwrap_or_default(),
    })
}

fn clean_row(columns: &ColumnIndex, fields: Vec<String>) -> Option<Record> {
    let id = &fields[columns.id];
    if is_missing(id) {
        return None;
    }

    Some(Record {
        id: id.trim().to_string(),
        lat: parse_number(&fields[columns.lat])?,
        lon: parse_number(&fields[columns.lon])?,
        azimuth_cw: parse_number(&fields[columns.azimuth_cw])?,
        azimuth_aw: parse_number(&fields[columns.azimuth_aw])?,
        fields,
    })
}
