//! 应用 - 编排层
//!
//! ## 职责
//!
//! 整个程序的入口，负责一次完整运行的资源和步骤：
//!
//! 1. **应用初始化**：校验配置、初始化运行日志、选择生成服务、加载提示词配置
//! 2. **加载表格**：读取输入工作簿（去除 HTML 标签）
//! 3. **批量增强**：委托 [`BatchProcessor`] 逐条处理
//! 4. **写出结果**：写出增强后的工作簿
//! 5. **文档装配**：配置了模板时，为每条记录渲染文档
//! 6. **全局统计**：输出最终统计信息

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::{Config, LlmProvider, PackageFormat};
use crate::models::{load_prompt_profile, load_table, PromptProfile};
use crate::orchestrator::batch_processor::{BarReporter, BatchProcessor, BatchStats};
use crate::output::{
    assemble_documents, write_table, DirectorySink, PackagingSink, TeraRenderer, ZipSink,
};
use crate::services::{
    FailureWriter, FixedDelayPacer, GeminiService, GenerationService, LlmService, Pacer,
};
use crate::utils::logging::{init_log_file, log_startup, print_final_stats};
use crate::workflow::RecordFlow;

/// 应用主结构
pub struct App {
    config: Config,
    flow: RecordFlow,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate().context("配置校验失败")?;

        // 初始化日志文件
        init_log_file(&config.output_log_file)?;

        log_startup(&config);

        let generator: Arc<dyn GenerationService> = match config.llm_provider {
            LlmProvider::Gemini => Arc::new(GeminiService::new(&config)),
            LlmProvider::OpenAi => Arc::new(LlmService::new(&config)),
        };
        info!("🤖 生成服务模型: {}", generator.model_name());
        let pacer: Arc<dyn Pacer> = Arc::new(FixedDelayPacer::from_millis(config.pacing_delay_ms));

        let profile = match &config.prompt_profile_file {
            Some(path) => {
                info!("📁 加载提示词配置: {}", path);
                load_prompt_profile(Path::new(path)).await?
            }
            None => PromptProfile::default(),
        };
        info!("📋 提示词配置版本: {}", profile.version);

        let flow = RecordFlow::new(generator, pacer, profile).context("提示词配置与模板不一致")?;

        Ok(Self { config, flow })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        info!("\n📁 正在读取输入表格: {}", self.config.input_file);
        let table = load_table(Path::new(&self.config.input_file))
            .with_context(|| format!("无法加载输入表格: {}", self.config.input_file))?;

        if table.is_empty() {
            warn!("⚠️ 输入表格没有任何记录");
        }

        // 批量增强
        let processor = BatchProcessor::new(&self.flow, self.config.id_column.clone())
            .with_failure_writer(FailureWriter::with_path(&self.config.output_log_file));
        let reporter = BarReporter::new(table.len(), "增强");
        let (table, stats) = processor.process(table, &reporter).await;

        // 写出工作簿
        write_table(&table, Path::new(&self.config.output_workbook))
            .with_context(|| format!("无法写出工作簿: {}", self.config.output_workbook))?;

        // 文档装配
        if let Some(template_file) = &self.config.template_file {
            if !table.has_column(&self.config.id_column) {
                warn!(
                    "⚠️ 列 '{}' 不存在，文档将以行号命名。可用列: {}",
                    self.config.id_column,
                    table.columns.join(", ")
                );
            }

            let renderer = TeraRenderer::from_file(Path::new(template_file))
                .await
                .with_context(|| format!("无法加载文档模板: {}", template_file))?;
            let reporter = BarReporter::new(table.len(), "装配");
            let (mut sink, destination): (Box<dyn PackagingSink>, String) =
                match self.config.package_format {
                    PackageFormat::Zip => {
                        let path = self.config.archive_path();
                        (Box::new(ZipSink::new(&path)), path)
                    }
                    PackageFormat::Directory => (
                        Box::new(DirectorySink::create(&self.config.output_dir)?),
                        self.config.output_dir.clone(),
                    ),
                };
            let count = assemble_documents(
                &table,
                &renderer,
                sink.as_mut(),
                &self.config.id_column,
                &reporter,
            )?;
            info!("✓ 已生成 {} 份文档: {}", count, destination);
        } else {
            info!("未设置 TEMPLATE_FILE，跳过文档装配");
        }

        // 输出最终统计
        self.print_stats(&stats);

        Ok(())
    }

    fn print_stats(&self, stats: &BatchStats) {
        print_final_stats(
            stats.success,
            stats.failed,
            stats.total,
            &self.config.output_log_file,
        );
    }
}
