//! 单个文件处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **加载**：读取并清洗输入文件，失败则跳过
//! 2. **构造查询**：每条记录两个查询
//! 3. **逐条查询**：按行顺序依次执行 `RecordFlow`
//! 4. **回填**：全部查询完成后一次性按标识符拼回
//! 5. **写出**：写入 `<原文件名>_results.csv`

use crate::config::Config;
use crate::models::{load_dataset, Dataset, Orientation, YieldTable};
use crate::services::{build_queries, output_path, write_results, BaseParams, QueryPair};
use crate::workflow::{RecordCtx, RecordFlow};
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// 单个文件的查询统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FileStats {
    pub records: usize,
    pub dropped: usize,
    pub fetched: usize,
    pub missing: usize,
}

/// 单个文件的处理结果
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// 结果已写出
    Written { path: PathBuf, stats: FileStats },
    /// 加载失败，未发起任何请求
    Skipped,
    /// 查询完成但写出失败
    WriteFailed { stats: FileStats },
}

/// 处理单个输入文件
///
/// 任何错误都只影响本文件，在这里记录日志后转换为 `FileOutcome`。
pub async fn process_file(
    path: &Path,
    flow: &RecordFlow,
    base_params: &BaseParams,
    config: &Config,
) -> FileOutcome {
    let Some(dataset) = load_dataset(path, config.header_skip_lines).await else {
        return FileOutcome::Skipped;
    };

    info!("正在构造查询...");
    let queries = build_queries(&dataset, base_params);

    let (results, stats) = fetch_all(&dataset, &queries, flow).await;

    let target = match output_path(
        path,
        &config.output_dir,
        &config.output_suffix,
        &config.input_extension,
    ) {
        Ok(target) => target,
        Err(e) => {
            error!("❌ {}", e);
            return FileOutcome::WriteFailed { stats };
        }
    };

    match write_results(&dataset, &results, &target).await {
        Ok(()) => {
            info!("✓ 结果已保存: {}", target.display());
            FileOutcome::Written {
                path: target,
                stats,
            }
        }
        Err(e) => {
            error!("❌ 保存结果失败: {}", e);
            FileOutcome::WriteFailed { stats }
        }
    }
}

/// 依次查询所有记录，结果按标识符收集
async fn fetch_all(
    dataset: &Dataset,
    queries: &[QueryPair<'_>],
    flow: &RecordFlow,
) -> (YieldTable, FileStats) {
    let file_name = dataset.file_name();
    let total = dataset.len();
    let mut results = YieldTable::new();
    let mut stats = FileStats {
        records: total,
        dropped: dataset.dropped_rows,
        ..Default::default()
    };

    info!("\n开始查询 {} 的 {} 个位置...", file_name, total);

    for (index, (record, pair)) in dataset.records.iter().zip(queries).enumerate() {
        let ctx = RecordCtx::new(file_name.clone(), index + 1, total, record.id.clone());
        info!(" 处理第 {}/{} 行 (ID: {})", ctx.row_index, total, record.id);

        let yields = flow.run(pair, &ctx).await;

        for orientation in Orientation::ALL {
            results.insert(orientation, &record.id, yields.get(orientation));
        }
        stats.fetched += yields.successes();
        stats.missing += 2 - yields.successes();
    }

    info!("\n{} 查询完成", file_name);
    (results, stats)
}
