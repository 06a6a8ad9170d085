//! 记录处理上下文
//!
//! 封装"我正在处理表格的第几行、哪个项目"这一信息

use std::fmt::Display;

use crate::models::record::Record;

/// 记录处理上下文
#[derive(Debug, Clone)]
pub struct RecordCtx {
    /// 行号（从1开始，仅用于日志显示和默认文件名）
    pub row_number: usize,

    /// 项目标识（标识列的值，缺失时为行号）
    pub item_id: String,
}

impl RecordCtx {
    /// 创建新的记录上下文
    pub fn new(row_number: usize, item_id: impl Into<String>) -> Self {
        Self {
            row_number,
            item_id: item_id.into(),
        }
    }

    /// 根据标识列构建上下文
    pub fn for_record(record: &Record, row_number: usize, id_column: &str) -> Self {
        let item_id = record
            .get(id_column)
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| row_number.to_string());
        Self::new(row_number, item_id)
    }
}

impl Display for RecordCtx {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[项目 {} #{}]", self.item_id, self.row_number)
    }
}
