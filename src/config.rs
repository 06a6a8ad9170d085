use crate::error::ConfigError;

/// 生成服务提供方
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LlmProvider {
    /// Gemini generateContent 接口
    Gemini,
    /// 兼容 OpenAI 的 chat 接口
    OpenAi,
}

impl LlmProvider {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "gemini" | "google" => Some(LlmProvider::Gemini),
            "openai" | "openai-compatible" => Some(LlmProvider::OpenAi),
            _ => None,
        }
    }
}

/// 文档打包方式
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PackageFormat {
    /// 打成 `{OUTPUT_DIR}.zip`
    Zip,
    /// 直接写入 `OUTPUT_DIR` 目录
    Directory,
}

impl PackageFormat {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "zip" => Some(PackageFormat::Zip),
            "dir" | "directory" => Some(PackageFormat::Directory),
            _ => None,
        }
    }
}

/// 固定采样参数
///
/// 每次生成调用都使用同一组参数。
#[derive(Clone, Debug, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub top_p: f32,
    /// 仅 Gemini 接口使用
    pub top_k: u32,
    pub max_output_tokens: u32,
    /// 内容过滤阈值，应用于全部四个危害类别（仅 Gemini 接口使用）
    pub safety_threshold: String,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.6,
            top_p: 1.0,
            top_k: 1,
            max_output_tokens: 8192,
            safety_threshold: "BLOCK_NONE".to_string(),
        }
    }
}

/// 程序配置
#[derive(Clone, Debug)]
pub struct Config {
    // --- 生成服务配置 ---
    pub llm_provider: LlmProvider,
    pub llm_api_key: String,
    pub llm_api_base_url: String,
    pub llm_model_name: String,
    pub generation: GenerationSettings,
    /// 同一条记录内相邻两次生成调用之间的间隔（毫秒）
    pub pacing_delay_ms: u64,
    // --- 输入输出 ---
    /// 输入 Excel 文件
    pub input_file: String,
    /// 文档模板（未设置时跳过文档组装）
    pub template_file: Option<String>,
    /// 增强后的 Excel 文件
    pub output_workbook: String,
    /// 生成文档的存放目录（zip 模式下为压缩包名，不含扩展名）
    pub output_dir: String,
    /// 文档打包方式
    pub package_format: PackageFormat,
    /// 用于命名文件和日志标识的列
    pub id_column: String,
    /// 覆盖内置提示词配置的 TOML 文件
    pub prompt_profile_file: Option<String>,
    /// 是否显示详细日志
    pub verbose_logging: bool,
    /// 输出日志文件
    pub output_log_file: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            llm_provider: LlmProvider::Gemini,
            llm_api_key: String::new(),
            llm_api_base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            llm_model_name: "gemini-1.5-pro-latest".to_string(),
            generation: GenerationSettings::default(),
            pacing_delay_ms: 1500,
            input_file: "datos_base.xlsx".to_string(),
            template_file: None,
            output_workbook: "excel_enriquecido_con_ia.xlsx".to_string(),
            output_dir: "fichas_tecnicas_generadas".to_string(),
            package_format: PackageFormat::Zip,
            id_column: "ItemId".to_string(),
            prompt_profile_file: None,
            verbose_logging: false,
            output_log_file: "output.txt".to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let default = Self::default();
        let default_generation = default.generation.clone();
        Self {
            llm_provider: std::env::var("LLM_PROVIDER").ok().and_then(|v| LlmProvider::parse(&v)).unwrap_or(default.llm_provider),
            llm_api_key: std::env::var("LLM_API_KEY").unwrap_or(default.llm_api_key),
            llm_api_base_url: std::env::var("LLM_API_BASE_URL").unwrap_or(default.llm_api_base_url),
            llm_model_name: std::env::var("LLM_MODEL_NAME").unwrap_or(default.llm_model_name),
            generation: GenerationSettings {
                temperature: std::env::var("LLM_TEMPERATURE").ok().and_then(|v| v.parse().ok()).unwrap_or(default_generation.temperature),
                top_p: std::env::var("LLM_TOP_P").ok().and_then(|v| v.parse().ok()).unwrap_or(default_generation.top_p),
                top_k: std::env::var("LLM_TOP_K").ok().and_then(|v| v.parse().ok()).unwrap_or(default_generation.top_k),
                max_output_tokens: std::env::var("LLM_MAX_OUTPUT_TOKENS").ok().and_then(|v| v.parse().ok()).unwrap_or(default_generation.max_output_tokens),
                safety_threshold: std::env::var("LLM_SAFETY_THRESHOLD").unwrap_or(default_generation.safety_threshold),
            },
            pacing_delay_ms: std::env::var("PACING_DELAY_MS").ok().and_then(|v| v.parse().ok()).unwrap_or(default.pacing_delay_ms),
            input_file: std::env::var("INPUT_FILE").unwrap_or(default.input_file),
            template_file: std::env::var("TEMPLATE_FILE").ok().filter(|v| !v.trim().is_empty()),
            output_workbook: std::env::var("OUTPUT_WORKBOOK").unwrap_or(default.output_workbook),
            output_dir: std::env::var("OUTPUT_DIR").unwrap_or(default.output_dir),
            package_format: std::env::var("PACKAGE_FORMAT").ok().and_then(|v| PackageFormat::parse(&v)).unwrap_or(default.package_format),
            id_column: std::env::var("ID_COLUMN").unwrap_or(default.id_column),
            prompt_profile_file: std::env::var("PROMPT_PROFILE_FILE").ok().filter(|v| !v.trim().is_empty()),
            verbose_logging: std::env::var("VERBOSE_LOGGING").ok().and_then(|v| v.parse().ok()).unwrap_or(default.verbose_logging),
            output_log_file: std::env::var("OUTPUT_LOG_FILE").unwrap_or(default.output_log_file),
        }
    }

    /// zip 模式下压缩包的路径
    pub fn archive_path(&self) -> String {
        format!("{}.zip", self.output_dir.trim_end_matches(['/', '\\']))
    }

    /// 检查必填项
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.llm_api_key.trim().is_empty() {
            return Err(ConfigError::EnvVarNotFound {
                var_name: "LLM_API_KEY".to_string(),
            });
        }
        if !(0.0..=2.0).contains(&self.generation.temperature) {
            return Err(ConfigError::EnvVarParseFailed {
                var_name: "LLM_TEMPERATURE".to_string(),
                value: self.generation.temperature.to_string(),
                expected_type: "0.0 到 2.0 之间的浮点数".to_string(),
            });
        }
        Ok(())
    }
}
