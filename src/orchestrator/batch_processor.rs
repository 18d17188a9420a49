//! 批量文件处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **应用初始化**：创建 PVGIS 客户端和节奏策略
//! 2. **文件发现**：扫描输入目录中指定扩展名的文件（按路径排序）
//! 3. **逐个处理**：委托 `file_processor` 处理单个文件，一个文件失败不影响其他文件
//! 4. **全局统计**：汇总所有文件的处理结果

use crate::clients::PvgisClient;
use crate::config::Config;
use crate::error::Result;
use crate::orchestrator::file_processor::{self, FileOutcome};
use crate::services::{BaseParams, FixedDelay, PacingPolicy};
use crate::utils::logging;
use crate::workflow::RecordFlow;
use std::path::PathBuf;
use tokio::fs;
use tracing::{info, warn};

/// 应用主结构
pub struct App {
    config: Config,
    flow: RecordFlow,
    base_params: BaseParams,
}

impl App {
    /// 使用配置中的固定间隔初始化
    pub fn new(config: Config) -> Result<Self> {
        let pacing = Box::new(FixedDelay::from_config(&config));
        Self::with_pacing(config, pacing)
    }

    /// 使用自定义节奏策略初始化
    pub fn with_pacing(config: Config, pacing: Box<dyn PacingPolicy>) -> Result<Self> {
        config.validate()?;
        let client = PvgisClient::new(&config)?;
        let base_params = BaseParams::from_config(&config);

        Ok(Self {
            flow: RecordFlow::new(client, pacing),
            base_params,
            config,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> RunStats {
        logging::log_startup(&self.config);

        let sources = self.discover_sources().await;
        let mut stats = RunStats {
            files_found: sources.len(),
            ..Default::default()
        };

        if sources.is_empty() {
            warn!(
                "⚠️ 在目录 {} 中没有找到 .{} 文件，程序结束",
                self.config.input_dir.display(),
                self.config.input_extension
            );
            return stats;
        }

        info!("✓ 找到 {} 个待处理的文件", sources.len());

        for (index, path) in sources.iter().enumerate() {
            logging::log_file_start(index + 1, sources.len(), path);

            let outcome =
                file_processor::process_file(path, &self.flow, &self.base_params, &self.config)
                    .await;
            stats.record(&outcome);
        }

        logging::print_final_stats(&stats);
        stats
    }

    /// 扫描输入目录
    ///
    /// 目录不可读时视为没有文件。
    async fn discover_sources(&self) -> Vec<PathBuf> {
        let dir = &self.config.input_dir;
        let mut entries = match fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!("无法读取输入目录 {}: {}", dir.display(), e);
                return Vec::new();
            }
        };

        let mut sources = Vec::new();
        loop {
            match entries.next_entry().await {
                Ok(Some(entry)) => {
                    let path = entry.path();
                    let matches = path.extension().and_then(|s| s.to_str())
                        == Some(self.config.input_extension.as_str());
                    if matches && path.is_file() {
                        sources.push(path);
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    warn!("遍历输入目录 {} 时出错: {}", dir.display(), e);
                    break;
                }
            }
        }

        sources.sort();
        sources
    }
}

/// 全局处理统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub files_found: usize,
    pub files_written: usize,
    pub files_skipped: usize,
    pub files_write_failed: usize,
    pub records: usize,
    /// 清洗时丢弃的行数（仅统计成功加载的文件）
    pub dropped: usize,
    pub fetched: usize,
    pub missing: usize,
}

impl RunStats {
    fn record(&mut self, outcome: &FileOutcome) {
        let stats = match outcome {
            FileOutcome::Written { stats, .. } => {
                self.files_written += 1;
                stats
            }
            FileOutcome::WriteFailed { stats } => {
                self.files_write_failed += 1;
                stats
            }
            FileOutcome::Skipped => {
                self.files_skipped += 1;
                return;
            }
        };
        self.records += stats.records;
        self.dropped += stats.dropped;
        self.fetched += stats.fetched;
        self.missing += stats.missing;
    }
}
