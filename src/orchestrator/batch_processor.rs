//! 批量记录处理器 - 编排层
//!
//! ## 职责
//!
//! 按源表顺序逐条处理记录，把每条记录的结果写回对应行。
//!
//! ## 核心功能
//!
//! 1. **补齐表头**：缺失的派生列先以空值追加，保证输出结构完整
//! 2. **逐条处理**：委托 [`RecordFlow`] 处理单条记录，严格串行
//! 3. **失败隔离**：单条记录失败只把该行的派生字段写成错误标记，批次继续
//! 4. **进度汇报**：每处理完一条记录，通过 [`ProgressReporter`] 汇报进度
//! 5. **统计输出**：返回成功 / 失败 / 总数
//!
//! 处理器只接收并返回显式的 [`Table`]，不持有任何全局状态。

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::models::fields::DerivedField;
use crate::models::record::Table;
use crate::services::FailureWriter;
use crate::workflow::{RecordCtx, RecordFlow, RecordOutcome};

/// 批次进度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchProgress {
    pub completed: usize,
    pub total: usize,
}

impl BatchProgress {
    /// 完成比例；空表视为已完成
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }
}

/// 进度汇报
pub trait ProgressReporter: Send + Sync {
    fn report(&self, progress: BatchProgress, label: &str);

    /// 全部结束
    fn finish(&self, _message: &str) {}
}

/// 不汇报进度
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _progress: BatchProgress, _label: &str) {}
}

/// 命令行进度条
pub struct BarReporter {
    bar: ProgressBar,
}

impl BarReporter {
    pub fn new(total: usize, prefix: &str) -> Self {
        let bar = ProgressBar::new(total as u64);
        let style = ProgressStyle::with_template(
            "{prefix} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
        bar.set_style(style);
        bar.set_prefix(prefix.to_string());
        Self { bar }
    }
}

impl ProgressReporter for BarReporter {
    fn report(&self, progress: BatchProgress, label: &str) {
        self.bar.set_length(progress.total as u64);
        self.bar.set_position(progress.completed as u64);
        self.bar.set_message(label.to_string());
    }

    fn finish(&self, message: &str) {
        self.bar.finish_with_message(message.to_string());
    }
}

/// 批次统计
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
}

/// 批量记录处理器
pub struct BatchProcessor<'a> {
    flow: &'a RecordFlow,
    id_column: String,
    failure_writer: Option<FailureWriter>,
}

impl<'a> BatchProcessor<'a> {
    pub fn new(flow: &'a RecordFlow, id_column: impl Into<String>) -> Self {
        Self {
            flow,
            id_column: id_column.into(),
            failure_writer: None,
        }
    }

    /// 失败记录同时追加到运行日志
    pub fn with_failure_writer(mut self, writer: FailureWriter) -> Self {
        self.failure_writer = Some(writer);
        self
    }

    /// 处理整张表
    ///
    /// 从不因为单条记录失败而中止；返回补齐派生列、写回结果后的表。
    pub async fn process(
        &self,
        mut table: Table,
        reporter: &dyn ProgressReporter,
    ) -> (Table, BatchStats) {
        table.ensure_columns(DerivedField::columns());

        let total = table.len();
        let error_prefix = self.flow.profile().error_prefix.clone();
        let mut stats = BatchStats {
            total,
            ..Default::default()
        };

        info!("✓ 共 {} 条待处理的记录", total);

        for (index, record) in table.rows.iter_mut().enumerate() {
            let ctx = RecordCtx::for_record(record, index + 1, &self.id_column);
            info!("\n{} 开始处理 ({}/{})", ctx, index + 1, total);

            let outcome = self.flow.run(record, &ctx).await;
            match &outcome {
                RecordOutcome::Completed(_) => stats.success += 1,
                RecordOutcome::Failed { reason, .. } => {
                    stats.failed += 1;
                    self.record_failure(&ctx, reason);
                }
            }
            record.apply(&outcome.into_fields(&error_prefix));

            reporter.report(
                BatchProgress {
                    completed: index + 1,
                    total,
                },
                &ctx.item_id,
            );
        }

        reporter.finish("处理完成");
        info!(
            "✓ 批次完成: 成功 {}/{}，失败 {}",
            stats.success, stats.total, stats.failed
        );

        (table, stats)
    }

    fn record_failure(&self, ctx: &RecordCtx, reason: &str) {
        if let Some(writer) = &self.failure_writer {
            if let Err(e) = writer.write(&ctx.item_id, ctx.row_number, reason) {
                warn!("{} 写入失败记录时出错: {}", ctx, e);
            }
        }
    }
}
