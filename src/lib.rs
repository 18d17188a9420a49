//! # PVGIS Enrich
//!
//! 批量为建筑/屋面记录查询 PVGIS 光伏年发电量，并把结果写回 CSV。
//!
//! ## 架构设计
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - `PvgisClient`，一次请求对应一个朝向，失败收敛为 `FetchFailure`
//!
//! ### ② 业务能力层（Services）
//! - `request_builder` - 记录 → 两个查询（cw / aw）
//! - `pacing` - 每次请求之后的等待策略
//! - `result_writer` - 结果回填并写出 CSV
//!
//! ### ③ 流程层（Workflow）
//! - `RecordCtx` - 上下文封装（文件名 + 行号 + 标识符）
//! - `RecordFlow` - 单条记录的流程（cw → 等待 → aw → 等待）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 扫描输入目录，逐个处理文件
//! - `orchestrator/file_processor` - 单个文件：加载 → 查询 → 回填 → 写出
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{FetchOutcome, PvgisClient};
pub use config::Config;
pub use error::{AppError, FetchFailure, LoadError, Result, WriteError};
pub use models::{Dataset, Orientation, Record, YieldTable, YieldValue};
pub use orchestrator::{process_file, App, FileOutcome, RunStats};
pub use services::{FixedDelay, PacingPolicy};
pub use workflow::{RecordCtx, RecordFlow};
