//! 失败记录写入服务 - 业务能力层
//!
//! 只负责把处理失败的记录追加到运行日志文件，不关心流程

use anyhow::{Context, Result};
use std::fs::OpenOptions;
use std::io::Write;
use tracing::debug;

/// 失败记录写入服务
///
/// 职责：
/// - 把失败记录（标识、行号、原因）追加写入日志文件
/// - 每次只处理一条记录
pub struct FailureWriter {
    log_file_path: String,
}

impl FailureWriter {
    /// 使用指定文件路径创建
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            log_file_path: path.into(),
        }
    }

    /// 写入一条失败记录
    ///
    /// # 参数
    /// - `item_id`: 记录标识
    /// - `row_number`: 行号（从 1 开始）
    /// - `reason`: 失败原因
    pub fn write(&self, item_id: &str, row_number: usize, reason: &str) -> Result<()> {
        debug!(
            "写入失败记录: 项目 {} | 行 {} | 原因长度: {}",
            item_id,
            row_number,
            reason.len()
        );

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_file_path)
            .with_context(|| format!("无法打开日志文件: {}", self.log_file_path))?;

        let line = format!(
            "[{}] 项目 {} | 行 {} | 失败: {}\n",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
            item_id,
            row_number,
            reason.replace('\n', " ")
        );

        file.write_all(line.as_bytes())?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_appends_one_line_per_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");
        let writer = FailureWriter::with_path(path.to_string_lossy());

        writer.write("IT-1", 1, "cuota\nagotada").unwrap();
        writer.write("IT-2", 2, "sin red").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("项目 IT-1 | 行 1 | 失败: cuota agotada"));
        assert!(lines[1].contains("项目 IT-2"));
    }
}
