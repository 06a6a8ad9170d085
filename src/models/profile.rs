//! 提示词配置（版本化）
//!
//! 标题字面量、选项标题正则、兜底文本和提示词模板都放在这里，
//! 模型输出格式变化时只需要换一份 TOML，而不用改代码。

use serde::{Deserialize, Serialize};

use crate::parsing::segmenter::HeadingLayout;
use crate::prompts::templates;

/// 第三阶段的建议生成方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationMode {
    /// 第三阶段只生成"加强"和"进阶"两段，第四阶段改写"加强"得到改进机会
    Paraphrase,
    /// 第三阶段一次生成三段，不调用第四阶段
    Combined,
}

/// 各阶段的提示词模板
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptTemplates {
    pub analysis: String,
    pub synthesis: String,
    pub recommendations: String,
    pub recommendations_combined: String,
    pub paraphrase: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            analysis: templates::ANALYSIS.to_string(),
            synthesis: templates::SYNTHESIS.to_string(),
            recommendations: templates::RECOMMENDATIONS.to_string(),
            recommendations_combined: templates::RECOMMENDATIONS_COMBINED.to_string(),
            paraphrase: templates::PARAPHRASE.to_string(),
        }
    }
}

/// 提示词配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptProfile {
    pub version: String,
    pub recommendation_mode: RecommendationMode,
    /// 第一阶段：正确路径 / 错误选项分析
    pub analysis: HeadingLayout,
    /// 第三阶段（paraphrase 模式）：加强 / 进阶
    pub recommendations: HeadingLayout,
    /// 第三阶段（combined 模式）：加强 / 进阶 / 改进机会
    pub recommendations_combined: HeadingLayout,
    /// 选项标题正则，必须包含命名分组 `letter`
    pub option_heading_pattern: String,
    pub distractor_not_found: String,
    pub paraphrase_skipped: String,
    /// 记录失败时写入每个派生字段的前缀
    pub error_prefix: String,
    pub templates: PromptTemplates,
}

impl Default for PromptProfile {
    fn default() -> Self {
        Self {
            version: "2024.1".to_string(),
            recommendation_mode: RecommendationMode::Paraphrase,
            analysis: HeadingLayout::new(
                ["Ruta Cognitiva Correcta:", "Análisis de Opciones No Válidas:"],
                "Error al parsear distractores",
                "Error al parsear el análisis",
            ),
            recommendations: HeadingLayout::new(
                ["RECOMENDACIÓN PARA FORTALECER", "RECOMENDACIÓN PARA AVANZAR"],
                "No generada.",
                "Error al parsear recomendaciones",
            ),
            recommendations_combined: HeadingLayout::new(
                [
                    "RECOMENDACIÓN PARA FORTALECER",
                    "RECOMENDACIÓN PARA AVANZAR",
                    "OPORTUNIDAD DE MEJORA",
                ],
                "No generada.",
                "Error al parsear recomendaciones",
            ),
            option_heading_pattern: DEFAULT_OPTION_HEADING_PATTERN.to_string(),
            distractor_not_found: "Análisis del distractor no encontrado.".to_string(),
            paraphrase_skipped: "No hay recomendación para parafrasear.".to_string(),
            error_prefix: "ERROR: ".to_string(),
            templates: PromptTemplates::default(),
        }
    }
}

/// 默认选项标题：可选的列表符号和加粗标记，"Opción"（大小写、重音不敏感），字母，冒号
///
/// 例：`- **Opción B:**`、`Opción C:`、`* **opcion d**:`
pub const DEFAULT_OPTION_HEADING_PATTERN: &str =
    r"(?i)(?:[-*•][ \t]*)?(?:\*\*[ \t]*)?opci[oó]n[ \t]*(?P<letter>[A-D])[ \t]*(?:\*\*[ \t]*)?:[ \t]*(?:\*\*)?";

impl PromptProfile {
    /// 当前模式下第三阶段使用的标题布局
    pub fn recommendation_layout(&self) -> &HeadingLayout {
        match self.recommendation_mode {
            RecommendationMode::Paraphrase => &self.recommendations,
            RecommendationMode::Combined => &self.recommendations_combined,
        }
    }

    /// 当前模式下第三阶段使用的模板
    pub fn recommendation_template(&self) -> &str {
        match self.recommendation_mode {
            RecommendationMode::Paraphrase => &self.templates.recommendations,
            RecommendationMode::Combined => &self.templates.recommendations_combined,
        }
    }
}
