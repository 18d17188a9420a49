//! 编排层（Orchestration Layer）
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<输入文件>)
//!     ↓
//! file_processor (处理 Dataset 中的 Vec<Record>)
//!     ↓
//! workflow::RecordFlow (处理单条 Record 的 cw / aw 两个查询)
//!     ↓
//! services / clients (能力层：构造查询 / 节奏 / 写出 / PVGIS 请求)
//! ```
//!
//! 全程串行：同一时间只有一个请求在途。

pub mod batch_processor;
pub mod file_processor;

pub use batch_processor::{App, RunStats};
pub use file_processor::{process_file, FileOutcome, FileStats};
