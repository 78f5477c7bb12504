//! 编辑器配置：语言后缀、长文本阈值、标识字段与遍历深度上限

use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

use crate::model::pairing::LanguagePair;

/// 长文本判定阈值（字符数，超过即为长文本）
pub const DEFAULT_LONG_TEXT_THRESHOLD: usize = 80;
/// 克隆模板时需要重新生成的标识字段名
pub const DEFAULT_IDENTIFIER_KEY: &str = "id";
/// 与 serde_json 解析递归上限一致
pub const DEFAULT_MAX_DEPTH: usize = 128;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("配置文件解析失败: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("配置无效: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub languages: LanguagePair,
    pub long_text_threshold: usize,
    pub identifier_key: String,
    pub max_depth: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            languages: LanguagePair::default(),
            long_text_threshold: DEFAULT_LONG_TEXT_THRESHOLD,
            identifier_key: DEFAULT_IDENTIFIER_KEY.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl EditorConfig {
    /// 从JSON文件读取配置，缺省字段使用默认值
    pub fn from_file(p: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(p)?;
        let config: EditorConfig = serde_json::from_str(&text)?;
        config.validate()?;
        tracing::info!("已加载编辑器配置: {}", p.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let LanguagePair { primary, secondary } = &self.languages;
        if primary.is_empty() || secondary.is_empty() {
            return Err(ConfigError::Invalid("语言后缀不能为空".into()));
        }
        if primary == secondary {
            return Err(ConfigError::Invalid(format!("两个语言后缀相同: {}", primary)));
        }
        // 一个后缀是另一个的结尾时，同一个键会同时匹配两种语言
        if primary.ends_with(secondary.as_str()) || secondary.ends_with(primary.as_str()) {
            return Err(ConfigError::Invalid(format!("语言后缀互相重叠: {} / {}", primary, secondary)));
        }
        if self.identifier_key.is_empty() {
            return Err(ConfigError::Invalid("标识字段名不能为空".into()));
        }
        if self.max_depth == 0 {
            return Err(ConfigError::Invalid("max_depth 必须大于0".into()));
        }
        Ok(())
    }
}
