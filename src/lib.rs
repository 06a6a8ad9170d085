//! # Item Enricher
//!
//! 为选择题题库表格批量生成教学分析字段的命令行工具
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 数据与解析（Models / Prompts / Parsing）
//! - `models/` - 记录、表格、派生字段、版本化的提示词配置，以及 XLSX / TOML 加载
//! - `prompts/` - 从记录提取字段，填充提示词模板
//! - `parsing/` - 按标题切分生成文本，截取每个选项的说明
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，不关心流程
//! - `GenerationService` - 文本生成能力（Gemini / OpenAI 兼容接口）
//! - `Pacer` - 调用节奏控制
//! - `FailureWriter` - 写运行日志能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一条记录"的完整处理流程
//! - `RecordCtx` - 上下文封装（行号 + 项目标识）
//! - `RecordFlow` - 流程编排（分析 → 概括 → 建议 → 改写）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量记录处理器，逐条处理并汇报进度
//! - `orchestrator/app` - 一次完整运行：加载、增强、写出、装配文档
//!
//! ### 输出（Output）
//! - `output/` - 工作簿写出、文档渲染、文档打包

pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod output;
pub mod parsing;
pub mod prompts;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::AppError;
pub use models::{PromptProfile, Record, Table};
pub use orchestrator::{App, BatchProcessor, BatchStats};
pub use workflow::{RecordCtx, RecordFlow, RecordOutcome};
