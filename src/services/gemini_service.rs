//! Gemini generateContent 接口
//!
//! 与 OpenAI 兼容接口不同，这里可以传 top_k 和内容过滤阈值。
//!
//! API key 放在请求头里，不出现在 URL 中，所以错误信息里不会带上它。

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};
use tracing::{debug, warn};

use crate::config::{Config, GenerationSettings};
use crate::error::GenerationError;
use crate::services::llm_service::GenerationService;

/// 应用内容过滤阈值的危害类别
const HARM_CATEGORIES: [&str; 4] = [
    "HARM_CATEGORY_HARASSMENT",
    "HARM_CATEGORY_HATE_SPEECH",
    "HARM_CATEGORY_SEXUALLY_EXPLICIT",
    "HARM_CATEGORY_DANGEROUS_CONTENT",
];

/// Gemini 生成服务
pub struct GeminiService {
    http: reqwest::Client,
    api_key: String,
    api_base_url: String,
    model_name: String,
    settings: GenerationSettings,
}

impl GeminiService {
    pub fn new(config: &Config) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.llm_api_key.clone(),
            api_base_url: config.llm_api_base_url.trim_end_matches('/').to_string(),
            model_name: config.llm_model_name.clone(),
            settings: config.generation.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base_url, self.model_name
        )
    }

    fn build_body(&self, prompt: &str) -> JsonValue {
        build_request_body(prompt, &self.settings)
    }
}

fn build_request_body(prompt: &str, settings: &GenerationSettings) -> JsonValue {
    let safety_settings: Vec<JsonValue> = HARM_CATEGORIES
        .iter()
        .map(|category| json!({ "category": category, "threshold": settings.safety_threshold }))
        .collect();

    json!({
        "contents": [{ "role": "user", "parts": [{ "text": prompt }] }],
        "generationConfig": {
            "temperature": settings.temperature,
            "topP": settings.top_p,
            "topK": settings.top_k,
            "maxOutputTokens": settings.max_output_tokens,
        },
        "safetySettings": safety_settings,
    })
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<Content>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

/// 从响应中取出生成文本
fn extract_text(response: GenerateContentResponse, model: &str) -> Result<String, GenerationError> {
    if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
        return Err(GenerationError::Blocked {
            model: model.to_string(),
            reason,
        });
    }

    let candidate = response
        .candidates
        .into_iter()
        .next()
        .ok_or_else(|| GenerationError::EmptyResponse {
            model: model.to_string(),
        })?;

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();
    let text = text.trim().to_string();

    if text.is_empty() {
        return match candidate.finish_reason.as_deref() {
            Some(reason @ ("SAFETY" | "BLOCKLIST" | "PROHIBITED_CONTENT" | "RECITATION")) => {
                Err(GenerationError::Blocked {
                    model: model.to_string(),
                    reason: reason.to_string(),
                })
            }
            _ => Err(GenerationError::EmptyResponse {
                model: model.to_string(),
            }),
        };
    }

    Ok(text)
}

#[async_trait]
impl GenerationService for GeminiService {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!("调用 Gemini API，模型: {}", self.model_name);
        debug!("提示词长度: {} 字符", prompt.chars().count());

        let response = self
            .http
            .post(self.endpoint())
            .header("x-goog-api-key", self.api_key.as_str())
            .json(&self.build_body(prompt))
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                warn!("Gemini API 调用失败: {}", e);
                GenerationError::request_failed(&self.model_name, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Gemini API 返回状态码 {}", status);
            return Err(GenerationError::BadStatus {
                model: self.model_name.clone(),
                status: status.as_u16(),
                body,
            });
        }

        let payload: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::request_failed(&self.model_name, e.without_url()))?;

        debug!("Gemini API 调用成功");

        extract_text(payload, &self.model_name)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
