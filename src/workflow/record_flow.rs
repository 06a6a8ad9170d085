//! 记录处理流程 - 流程层
//!
//! 核心职责：定义"一条记录"的完整处理流程
//!
//! 流程顺序（每一步都依赖上一步的输出）：
//! 1. 分析：正确认知路径 + 错误选项分析 → 每个选项的说明
//! 2. 概括：根据正确路径生成"该题考查什么"
//! 3. 建议：根据完整分析和概括生成加强 / 进阶（combined 模式下还有改进机会）
//! 4. 改写：把"加强"建议改写成改进机会（仅 paraphrase 模式，且"加强"确实生成了）
//!
//! 任何一步出错，整条记录进入失败状态，所有派生字段统一写成错误标记。

use std::fmt;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{AppError, ProfileError};
use crate::models::fields::{DerivedFields, OptionLetter, KEY_COLUMN, SOURCE_FIELDS};
use crate::models::profile::{PromptProfile, RecommendationMode};
use crate::models::record::Record;
use crate::parsing::{DistractorResolver, SegmentStatus, Segmenter};
use crate::prompts::{build_prompt, check_template, extract_fields};
use crate::services::{GenerationService, Pacer};
use crate::utils::logging::truncate_text;
use crate::workflow::record_ctx::RecordCtx;

/// 第二阶段模板中的正确路径变量
pub const VAR_COGNITIVE_PATH: &str = "ruta_cognitiva_texto";
/// 第三阶段模板中的概括变量
pub const VAR_WHAT_IT_EVALUATES: &str = "que_evalua_sintetizado";
/// 第三阶段模板中的完整分析变量
pub const VAR_FULL_ANALYSIS: &str = "analisis_central_generado";
/// 第四阶段模板中的"加强"建议变量
pub const VAR_STRENGTHEN: &str = "recomendacion_fortalecer";

/// 单条记录的流水线状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Start,
    AnalysisDone,
    SynthesisDone,
    RecommendationsDone,
    ParaphraseDone,
    ParaphraseSkipped,
    Complete,
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PipelineState::Start => "开始",
            PipelineState::AnalysisDone => "分析完成",
            PipelineState::SynthesisDone => "概括完成",
            PipelineState::RecommendationsDone => "建议完成",
            PipelineState::ParaphraseDone => "改写完成",
            PipelineState::ParaphraseSkipped => "跳过改写",
            PipelineState::Complete => "完成",
        };
        f.write_str(name)
    }
}

/// 记录处理结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordOutcome {
    /// 所有阶段完成
    Completed(DerivedFields),
    /// 在 `state` 之后的某一步失败
    Failed { state: PipelineState, reason: String },
}

impl RecordOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, RecordOutcome::Completed(_))
    }

    /// 转换成要写回表格的派生字段
    ///
    /// 失败时不保留任何已完成阶段的结果，每个字段都写成 `{error_prefix}{reason}`。
    pub fn into_fields(self, error_prefix: &str) -> DerivedFields {
        match self {
            RecordOutcome::Completed(fields) => fields,
            RecordOutcome::Failed { reason, .. } => {
                DerivedFields::uniform(&format!("{}{}", error_prefix, reason))
            }
        }
    }
}

/// 记录处理流程
///
/// - 编排四个阶段的提示词构建、生成调用和响应解析
/// - 不持有表格，不写文件
/// - 只依赖生成服务和节奏控制器两个协作者
pub struct RecordFlow {
    generator: Arc<dyn GenerationService>,
    pacer: Arc<dyn Pacer>,
    profile: PromptProfile,
    analysis: Segmenter,
    recommendations: Segmenter,
    resolver: DistractorResolver,
}

impl RecordFlow {
    /// 创建流程
    ///
    /// 编译标题布局和选项正则，并检查每个模板只引用了对应阶段可用的变量。
    pub fn new(
        generator: Arc<dyn GenerationService>,
        pacer: Arc<dyn Pacer>,
        profile: PromptProfile,
    ) -> Result<Self, AppError> {
        let recommendation_fields = match profile.recommendation_mode {
            RecommendationMode::Paraphrase => 2,
            RecommendationMode::Combined => 3,
        };
        require_headings("analysis", profile.analysis.headings.len(), 2)?;
        require_headings(
            "recommendations",
            profile.recommendation_layout().headings.len(),
            recommendation_fields,
        )?;

        let analysis = Segmenter::new(&profile.analysis)?;
        let recommendations = Segmenter::new(profile.recommendation_layout())?;
        let resolver = DistractorResolver::new(
            &profile.option_heading_pattern,
            profile.distractor_not_found.clone(),
        )?;

        check_template(&profile.templates.analysis, SOURCE_FIELDS)?;
        check_template(
            &profile.templates.synthesis,
            &with_extras(&[VAR_COGNITIVE_PATH]),
        )?;
        check_template(
            profile.recommendation_template(),
            &with_extras(&[VAR_WHAT_IT_EVALUATES, VAR_FULL_ANALYSIS]),
        )?;
        if profile.recommendation_mode == RecommendationMode::Paraphrase {
            check_template(&profile.templates.paraphrase, &with_extras(&[VAR_STRENGTHEN]))?;
        }

        Ok(Self {
            generator,
            pacer,
            profile,
            analysis,
            recommendations,
            resolver,
        })
    }

    pub fn profile(&self) -> &PromptProfile {
        &self.profile
    }

    /// 处理一条记录
    ///
    /// 不会返回错误：所有失败都体现在 [`RecordOutcome::Failed`] 中。
    pub async fn run(&self, record: &Record, ctx: &RecordCtx) -> RecordOutcome {
        let mut state = PipelineState::Start;
        match self.run_stages(record, ctx, &mut state).await {
            Ok(fields) => {
                info!("{} ✓ 处理完成", ctx);
                RecordOutcome::Completed(fields)
            }
            Err(e) => {
                warn!("{} ❌ 在「{}」之后失败: {}", ctx, state, e);
                RecordOutcome::Failed {
                    state,
                    reason: e.record_reason(),
                }
            }
        }
    }

    async fn run_stages(
        &self,
        record: &Record,
        ctx: &RecordCtx,
        state: &mut PipelineState,
    ) -> Result<DerivedFields, AppError> {
        let templates = &self.profile.templates;
        let mut fields = DerivedFields::default();
        let mut calls = 0usize;

        // ========== 阶段 1: 分析 ==========
        info!("{} 阶段 1: 正确路径与错误选项分析...", ctx);
        let prompt = build_prompt(&templates.analysis, &extract_fields(record))?;
        let analysis_raw = self.generate(&prompt, &mut calls).await?;

        let segments = self.analysis.segment(&analysis_raw);
        self.log_segment_status(ctx, "分析", &segments.status);
        let mut bodies = segments.into_bodies().into_iter();
        fields.justificacion_correcta = bodies.next().unwrap_or_default();
        fields.analisis_distractores = bodies.next().unwrap_or_default();

        let key = OptionLetter::parse(record.get_or_empty(KEY_COLUMN));
        if key.is_none() {
            warn!(
                "{} ⚠️ 正确选项 '{}' 无法识别，所有选项都从错误分析中截取",
                ctx,
                record.get_or_empty(KEY_COLUMN)
            );
        }
        fields.justificaciones = self.resolver.resolve(
            &fields.analisis_distractores,
            key,
            &fields.justificacion_correcta,
        );
        *state = PipelineState::AnalysisDone;

        // ========== 阶段 2: 概括 ==========
        info!("{} 阶段 2: 概括考查能力...", ctx);
        let context = extract_fields(record).with(VAR_COGNITIVE_PATH, &fields.justificacion_correcta);
        let prompt = build_prompt(&templates.synthesis, &context)?;
        fields.que_evalua = self.generate(&prompt, &mut calls).await?;
        debug!("{} 考查能力: {}", ctx, truncate_text(&fields.que_evalua, 80));
        *state = PipelineState::SynthesisDone;

        // ========== 阶段 3: 建议 ==========
        info!("{} 阶段 3: 生成教学建议...", ctx);
        let context = extract_fields(record)
            .with(VAR_WHAT_IT_EVALUATES, &fields.que_evalua)
            .with(VAR_FULL_ANALYSIS, &analysis_raw);
        let prompt = build_prompt(self.profile.recommendation_template(), &context)?;
        let recommendations_raw = self.generate(&prompt, &mut calls).await?;

        let segments = self.recommendations.segment(&recommendations_raw);
        self.log_segment_status(ctx, "建议", &segments.status);
        let mut bodies = segments.into_bodies().into_iter();
        fields.recomendacion_fortalecer = bodies.next().unwrap_or_default();
        fields.recomendacion_avanzar = bodies.next().unwrap_or_default();
        *state = PipelineState::RecommendationsDone;

        match self.profile.recommendation_mode {
            RecommendationMode::Combined => {
                fields.oportunidad_de_mejora = bodies.next().unwrap_or_default();
            }
            RecommendationMode::Paraphrase => {
                // ========== 阶段 4: 改写 ==========
                if self.should_paraphrase(&fields.recomendacion_fortalecer) {
                    info!("{} 阶段 4: 改写改进机会...", ctx);
                    let context = extract_fields(record)
                        .with(VAR_STRENGTHEN, &fields.recomendacion_fortalecer);
                    let prompt = build_prompt(&templates.paraphrase, &context)?;
                    fields.oportunidad_de_mejora = self.generate(&prompt, &mut calls).await?;
                    *state = PipelineState::ParaphraseDone;
                } else {
                    info!("{} 阶段 4: 没有可改写的加强建议，跳过", ctx);
                    fields.oportunidad_de_mejora = self.profile.paraphrase_skipped.clone();
                    *state = PipelineState::ParaphraseSkipped;
                }
            }
        }

        *state = PipelineState::Complete;
        debug!("{} 共调用生成服务 {} 次", ctx, calls);
        Ok(fields)
    }

    /// 调用生成服务；同一条记录内除第一次外，调用前先等待
    async fn generate(&self, prompt: &str, calls: &mut usize) -> Result<String, AppError> {
        if *calls > 0 {
            self.pacer.wait().await;
        }
        *calls += 1;
        let text = self.generator.generate(prompt).await?;
        Ok(text.trim().to_string())
    }

    /// "加强"建议确实生成时才改写
    fn should_paraphrase(&self, strengthen: &str) -> bool {
        let strengthen = strengthen.trim();
        !strengthen.is_empty() && strengthen != self.profile.recommendation_layout().missing_sentinel
    }

    fn log_segment_status(&self, ctx: &RecordCtx, stage: &str, status: &SegmentStatus) {
        match status {
            SegmentStatus::Complete => debug!("{} {}响应分段完整", ctx, stage),
            SegmentStatus::Partial { missing } => {
                warn!("{} ⚠️ {}响应缺少标题 {:?}，已使用兜底文本", ctx, stage, missing)
            }
            SegmentStatus::PrimaryMissing => {
                warn!("{} ⚠️ {}响应缺少主标题，整段文本写入第一个字段", ctx, stage)
            }
        }
    }
}

fn require_headings(layout: &str, found: usize, expected: usize) -> Result<(), ProfileError> {
    if found < expected {
        return Err(ProfileError::LayoutTooShort {
            layout: layout.to_string(),
            expected,
            found,
        });
    }
    Ok(())
}

fn with_extras(extras: &[&'static str]) -> Vec<&'static str> {
    SOURCE_FIELDS.iter().copied().chain(extras.iter().copied()).collect()
}
