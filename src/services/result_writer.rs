//! 结果写入服务 - 业务能力层
//!
//! 把两组查询结果按标识符拼回数据集，并写成 CSV。

use crate::error::WriteError;
use crate::models::loaders::{is_missing, parse_number};
use crate::models::{Dataset, Orientation, YieldTable};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// 构造查询时产生的临时列，不写入结果
pub const TRANSIENT_COLUMNS: [&str; 2] = ["url_cw", "url_aw"];

/// 结果文件路径：`<输出目录>/<原文件名><后缀>.<扩展名>`
pub fn output_path(
    input: &Path,
    output_dir: &Path,
    suffix: &str,
    extension: &str,
) -> Result<PathBuf, WriteError> {
    let stem = input
        .file_stem()
        .ok_or_else(|| WriteError::NoFileStem {
            path: input.to_path_buf(),
        })?
        .to_string_lossy();

    Ok(output_dir.join(format!("{}{}.{}", stem, suffix, extension)))
}

/// 浮点数统一保留 4 位小数，缺失写空
pub fn format_float(value: Option<f64>) -> String {
    value.map(|v| format!("{:.4}", v)).unwrap_or_default()
}

enum Cell {
    Raw(usize),
    Numeric(usize),
    Yield(Orientation),
}

/// 生成结果 CSV 的全部字节
///
/// 行数与顺序和数据集完全一致。
pub fn render_csv(dataset: &Dataset, results: &YieldTable) -> Result<Vec<u8>, csv::Error> {
    let mut header = Vec::new();
    let mut plan = Vec::new();

    for (idx, name) in dataset.headers.iter().enumerate() {
        if TRANSIENT_COLUMNS.contains(&name.as_str()) {
            continue;
        }
        let cell = match Orientation::ALL
            .into_iter()
            .find(|o| o.result_column() == name)
        {
            // 已存在的结果列原位覆盖
            Some(orientation) => Cell::Yield(orientation),
            None if is_numeric_column(dataset, idx) => Cell::Numeric(idx),
            None => Cell::Raw(idx),
        };
        header.push(name.as_str());
        plan.push(cell);
    }

    for orientation in Orientation::ALL {
        if !dataset.headers.iter().any(|h| h == orientation.result_column()) {
            header.push(orientation.result_column());
            plan.push(Cell::Yield(orientation));
        }
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&header)?;

    for record in &dataset.records {
        let row: Vec<String> = plan
            .iter()
            .map(|cell| match cell {
                Cell::Raw(idx) => {
                    let raw = &record.fields[*idx];
                    if is_missing(raw) {
                        String::new()
                    } else {
                        raw.clone()
                    }
                }
                Cell::Numeric(idx) => format_float(
                    dataset
                        .columns
                        .numeric_value(*idx, record)
                        .or_else(|| parse_number(&record.fields[*idx])),
                ),
                Cell::Yield(orientation) => {
                    format_float(results.get(*orientation, &record.id))
                }
            })
            .collect();
        writer.write_record(&row)?;
    }

    writer
        .into_inner()
        .map_err(|e| csv::Error::from(e.into_error()))
}

fn is_numeric_column(dataset: &Dataset, idx: usize) -> bool {
    let c = &dataset.columns;
    [c.lat, c.lon, c.azimuth_cw, c.azimuth_aw].contains(&idx) || dataset.is_decimal_column(idx)
}

/// 写入结果文件，必要时创建输出目录
pub async fn write_results(
    dataset: &Dataset,
    results: &YieldTable,
    path: &Path,
) -> Result<(), WriteError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| WriteError::CreateDir {
                path: parent.to_path_buf(),
                source: e,
            })?;
    }

    let bytes = render_csv(dataset, results).map_err(|e| WriteError::Serialize {
        path: path.to_path_buf(),
        source: e,
    })?;

    debug!("写入 {} 字节到 {}", bytes.len(), path.display());

    fs::write(path, bytes).await.map_err(|e| WriteError::Io {
        path: path.to_path_buf(),
        source: e,
    })
}
