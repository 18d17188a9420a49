//! 记录处理上下文
//!
//! 封装"我正在处理哪个文件的第几行"这一信息，只用于日志

use std::fmt::Display;

#[derive(Debug, Clone)]
pub struct RecordCtx {
    /// 输入文件名
    pub file_name: String,

    /// 行号（从1开始，按清洗后的顺序）
    pub row_index: usize,

    /// 本文件的记录总数
    pub total_rows: usize,

    /// ORIG_FID
    pub record_id: String,
}

impl RecordCtx {
    pub fn new(file_name: String, row_index: usize, total_rows: usize, record_id: String) -> Self {
        Self {
            file_name,
            row_index,
            total_rows,
            record_id,
        }
    }
}

impl Display for RecordCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} 行 {}/{} ID#{}]",
            self.file_name, self.row_index, self.total_rows, self.record_id
        )
    }
}
