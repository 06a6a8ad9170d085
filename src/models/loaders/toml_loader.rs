use crate::error::ProfileError;
use crate::models::profile::PromptProfile;
use crate::parsing::{DistractorResolver, Segmenter};
use std::path::Path;
use tokio::fs;

/// 从 TOML 文件加载提示词配置
///
/// 未出现在文件中的项使用内置默认值；标题布局和选项标题正则会在这里预先编译一次，
/// 配置有误时在处理任何记录之前就失败。
pub async fn load_prompt_profile(toml_file_path: &Path) -> Result<PromptProfile, ProfileError> {
    let path = toml_file_path.display().to_string();

    let content = fs::read_to_string(toml_file_path)
        .await
        .map_err(|source| ProfileError::ReadFailed {
            path: path.clone(),
            source,
        })?;

    let profile: PromptProfile =
        toml::from_str(&content).map_err(|source| ProfileError::TomlParseFailed {
            path: path.clone(),
            source,
        })?;

    Segmenter::new(&profile.analysis)?;
    Segmenter::new(profile.recommendation_layout())?;
    DistractorResolver::new(&profile.option_heading_pattern, profile.distractor_not_found.clone())?;

    tracing::info!("已加载提示词配置 {} (版本 {})", path, profile.version);

    Ok(profile)
}
