//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `app` - 应用
//! - 管理一次运行的生命周期（初始化、运行）
//! - 选择生成服务，加载提示词配置和输入表格
//! - 写出工作簿，装配文档
//! - 输出全局统计信息
//!
//! ### `batch_processor` - 批量记录处理器
//! - 按顺序遍历表格的所有记录
//! - 复用同一个 RecordFlow
//! - 把结果写回对应行，汇报进度
//!
//! ## 层次关系
//!
//! ```text
//! app (一次运行)
//!     ↓
//! batch_processor (处理 Table)
//!     ↓
//! workflow::RecordFlow (处理单个 Record)
//!     ↓
//! services (能力层：generation / pacing / failure)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：app 管资源和输入输出，batch_processor 管逐条处理
//! 2. **显式状态**：表格作为参数传入、作为返回值传出
//! 3. **向下依赖**：编排层 → workflow → services
//! 4. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod app;
pub mod batch_processor;

// 重新导出主要类型
pub use app::App;
pub use batch_processor::{
    BarReporter, BatchProcessor, BatchProgress, BatchStats, NoProgress, ProgressReporter,
};
