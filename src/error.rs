use thiserror::Error;

/// 应用程序错误类型
#[derive(Debug, Error)]
pub enum AppError {
    /// 提示词模板错误
    #[error("模板错误: {0}")]
    Template(#[from] TemplateError),
    /// 生成服务错误
    #[error("生成服务错误: {0}")]
    Generation(#[from] GenerationError),
    /// 表格读写错误
    #[error("表格错误: {0}")]
    Table(#[from] TableError),
    /// 提示词配置错误
    #[error("配置文件错误: {0}")]
    Profile(#[from] ProfileError),
    /// 文档输出错误
    #[error("输出错误: {0}")]
    Output(#[from] OutputError),
    /// 配置错误
    #[error("配置错误: {0}")]
    Config(#[from] ConfigError),
}

/// 提示词模板错误
///
/// 模板引用了上下文中不存在的变量，属于配置缺陷而不是运行时状况。
#[derive(Debug, Error)]
pub enum TemplateError {
    /// 模板变量缺失
    #[error("模板变量 {{{name}}} 在上下文中不存在")]
    MissingVariable { name: String },
    /// 花括号未闭合
    #[error("模板在位置 {position} 处存在未闭合的占位符")]
    UnclosedPlaceholder { position: usize },
}

/// 生成服务错误（ServiceError）
///
/// 覆盖鉴权失败、配额、网络故障和内容过滤拒绝。
#[derive(Debug, Error)]
pub enum GenerationError {
    /// 网络请求失败
    #[error("请求失败 (模型: {model}): {source}")]
    RequestFailed {
        model: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
    /// 服务返回非成功状态码
    #[error("服务返回状态码 {status} (模型: {model}): {body}")]
    BadStatus {
        model: String,
        status: u16,
        body: String,
    },
    /// 内容过滤拒绝
    #[error("内容被过滤拒绝 (模型: {model}): {reason}")]
    Blocked { model: String, reason: String },
    /// 返回内容为空
    #[error("返回内容为空 (模型: {model})")]
    EmptyResponse { model: String },
    /// 请求构建失败
    #[error("请求构建失败: {0}")]
    InvalidRequest(String),
}

/// 表格读写错误
#[derive(Debug, Error)]
pub enum TableError {
    /// 文件不存在
    #[error("文件不存在: {path}")]
    NotFound { path: String },
    /// 工作簿打开失败
    #[error("无法打开工作簿 ({path}): {source}")]
    OpenFailed {
        path: String,
        #[source]
        source: calamine::Error,
    },
    /// 工作簿没有工作表
    #[error("工作簿没有任何工作表: {path}")]
    NoWorksheet { path: String },
    /// 工作表为空（没有表头）
    #[error("工作表为空: {path}")]
    EmptyWorksheet { path: String },
    /// 写入失败
    #[error("写入工作簿失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: rust_xlsxwriter::XlsxError,
    },
}

/// 提示词配置文件错误
#[derive(Debug, Error)]
pub enum ProfileError {
    /// 读取失败
    #[error("读取配置文件失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// TOML 解析失败
    #[error("TOML解析失败 ({path}): {source}")]
    TomlParseFailed {
        path: String,
        #[source]
        source: toml::de::Error,
    },
    /// 选项标题正则无效
    #[error("选项标题正则无效: {0}")]
    InvalidPattern(#[from] regex::Error),
    /// 选项标题正则缺少命名分组
    #[error("选项标题正则缺少命名分组 (?P<letter>...): {pattern}")]
    MissingLetterGroup { pattern: String },
    /// 标题布局中的标题数量不足
    #[error("标题布局 {layout} 至少需要 {expected} 个标题，实际 {found} 个")]
    LayoutTooShort {
        layout: String,
        expected: usize,
        found: usize,
    },
}

/// 文档输出错误
#[derive(Debug, Error)]
pub enum OutputError {
    /// 模板解析或渲染失败
    #[error("文档渲染失败: {0}")]
    Render(#[from] tera::Error),
    /// 压缩包写入失败
    #[error("写入压缩包失败 ({path}): {source}")]
    ArchiveFailed {
        path: String,
        #[source]
        source: zip::result::ZipError,
    },
    /// 读取模板失败
    #[error("读取模板失败 ({path}): {source}")]
    ReadFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
    /// 写入文件失败
    #[error("写入文件失败 ({path}): {source}")]
    WriteFailed {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// 配置错误
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 环境变量解析失败
    #[error("环境变量 {var_name} 解析失败: 值 '{value}' 无法转换为 {expected_type}")]
    EnvVarParseFailed {
        var_name: String,
        value: String,
        expected_type: String,
    },
    /// 环境变量不存在
    #[error("环境变量 {var_name} 不存在")]
    EnvVarNotFound { var_name: String },
}

// ========== 便捷构造函数 ==========

impl GenerationError {
    /// 创建请求失败错误
    pub fn request_failed(
        model: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        GenerationError::RequestFailed {
            model: model.into(),
            source: Box::new(source),
        }
    }
}

impl OutputError {
    /// 创建文件写入错误
    pub fn write_failed(path: impl Into<String>, source: std::io::Error) -> Self {
        OutputError::WriteFailed {
            path: path.into(),
            source,
        }
    }
}

// ========== 写入输出表格的失败原因 ==========

impl AppError {
    /// 记录失败时写入派生字段的原因
    ///
    /// 输出表格面向西班牙语读者，这里不使用日志中的中文信息。
    pub fn record_reason(&self) -> String {
        match self {
            AppError::Template(e) => e.record_reason(),
            AppError::Generation(e) => e.record_reason(),
            other => format!("error interno: {}", other),
        }
    }
}

impl TemplateError {
    pub fn record_reason(&self) -> String {
        match self {
            TemplateError::MissingVariable { name } => {
                format!("la plantilla usa la variable {{{}}}, que no está disponible", name)
            }
            TemplateError::UnclosedPlaceholder { position } => {
                format!("la plantilla tiene un marcador sin cerrar en la posición {}", position)
            }
        }
    }
}

impl GenerationError {
    pub fn record_reason(&self) -> String {
        match self {
            GenerationError::RequestFailed { model, source } => {
                format!("falló la solicitud al modelo {}: {}", model, source)
            }
            GenerationError::BadStatus {
                model,
                status,
                body,
            } => format!("el servicio respondió con el estado {} (modelo {}): {}", status, model, body),
            GenerationError::Blocked { model, reason } => {
                format!("el filtro de contenido bloqueó la respuesta (modelo {}): {}", model, reason)
            }
            GenerationError::EmptyResponse { model } => {
                format!("el modelo {} devolvió una respuesta vacía", model)
            }
            GenerationError::InvalidRequest(message) => {
                format!("solicitud inválida: {}", message)
            }
        }
    }
}
