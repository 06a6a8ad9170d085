//! 生成服务 - 业务能力层
//!
//! 流水线只把生成服务当作"文本进、文本出"的黑盒，见 [`GenerationService`]。
//!
//! ## 技术栈
//! - `LlmService`：使用 `async-openai` crate，兼容 OpenAI API 的服务
//! - `GeminiService`（见 `gemini_service`）：直接调用 Gemini generateContent 接口

use async_openai::{
    config::OpenAIConfig,
    types::chat::{
        ChatCompletionRequestMessage, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use tracing::{debug, warn};

use crate::config::{Config, GenerationSettings};
use crate::error::GenerationError;

/// 生成服务
///
/// 输入提示词，返回去掉首尾空白的生成文本。不做自动重试。
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError>;

    /// 模型名称（仅用于日志）
    fn model_name(&self) -> &str;
}

/// 兼容 OpenAI API 的生成服务
pub struct LlmService {
    client: Client<OpenAIConfig>,
    model_name: String,
    settings: GenerationSettings,
}

impl LlmService {
    /// 创建新的 LLM 服务
    pub fn new(config: &Config) -> Self {
        let openai_config = OpenAIConfig::new()
            .with_api_key(&config.llm_api_key)
            .with_api_base(&config.llm_api_base_url);

        let client = Client::with_config(openai_config);

        Self {
            client,
            model_name: config.llm_model_name.clone(),
            settings: config.generation.clone(),
        }
    }
}

#[async_trait]
impl GenerationService for LlmService {
    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        debug!("调用 LLM API，模型: {}", self.model_name);
        debug!("提示词长度: {} 字符", prompt.chars().count());

        let user_msg = ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()
            .map_err(|e| GenerationError::InvalidRequest(e.to_string()))?;

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model_name)
            .messages(vec![ChatCompletionRequestMessage::User(user_msg)])
            .temperature(self.settings.temperature)
            .top_p(self.settings.top_p)
            .max_tokens(self.settings.max_output_tokens)
            .build()
            .map_err(|e| GenerationError::InvalidRequest(e.to_string()))?;

        let response = self.client.chat().create(request).await.map_err(|e| {
            warn!("LLM API 调用失败: {}", e);
            GenerationError::request_failed(&self.model_name, e)
        })?;

        debug!("LLM API 调用成功");

        let content = response
            .choices
            .first()
            .and_then(|choice| choice.message.content.clone())
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| GenerationError::EmptyResponse {
                model: self.model_name.clone(),
            })?;

        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
