use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub extraction: ExtractionConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub fallback: FallbackConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ModelConfig {
    #[serde(default = "default_model")]
    pub model: String,
    /// Environment variable holding the API key. No key means the model
    /// path is unavailable and every request takes the keyword fallback.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Backoff before the single rate-limit retry, when the error carries
    /// no wait hint.
    #[serde(default = "default_retry_wait_secs")]
    pub retry_wait_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_key_env: default_api_key_env(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            timeout_secs: default_timeout_secs(),
            retry_wait_secs: default_retry_wait_secs(),
        }
    }
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}
fn default_max_tokens() -> u32 {
    150
}
fn default_temperature() -> f64 {
    0.2
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_retry_wait_secs() -> u64 {
    25
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExtractionConfig {
    /// Extracted text is truncated to this many characters.
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,
    #[serde(default = "default_max_pdf_pages")]
    pub max_pdf_pages: usize,
    #[serde(default = "default_max_docx_paragraphs")]
    pub max_docx_paragraphs: usize,
    #[serde(default = "default_max_sheets")]
    pub max_sheets: usize,
    #[serde(default = "default_max_sheet_rows")]
    pub max_sheet_rows: usize,
    /// Cap on retained tokens for the heuristic legacy .doc path.
    #[serde(default = "default_max_doc_tokens")]
    pub max_doc_tokens: usize,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_chars: default_max_chars(),
            max_pdf_pages: default_max_pdf_pages(),
            max_docx_paragraphs: default_max_docx_paragraphs(),
            max_sheets: default_max_sheets(),
            max_sheet_rows: default_max_sheet_rows(),
            max_doc_tokens: default_max_doc_tokens(),
        }
    }
}

fn default_max_chars() -> usize {
    5000
}
fn default_max_pdf_pages() -> usize {
    10
}
fn default_max_docx_paragraphs() -> usize {
    100
}
fn default_max_sheets() -> usize {
    3
}
fn default_max_sheet_rows() -> usize {
    50
}
fn default_max_doc_tokens() -> usize {
    300
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChunkingConfig {
    /// Nominal chunk size in characters. One model call per chunk.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

fn default_chunk_size() -> usize {
    10_000
}

/// Keyword vocabulary for the deterministic fallback matcher.
///
/// The defaults are the administrative-domain terms the deployment was
/// built around; operators serving another domain or language override
/// them here rather than patching code.
#[derive(Debug, Deserialize, Clone)]
pub struct FallbackConfig {
    #[serde(default = "default_keywords")]
    pub keywords: Vec<String>,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            keywords: default_keywords(),
        }
    }
}

fn default_keywords() -> Vec<String> {
    [
        "ngân hàng",
        "tài chính",
        "kinh doanh",
        "hành chính",
        "đào tạo",
        "tồn kho",
        "kế toán",
        "nhân sự",
        "lương",
        "hợp đồng",
        "lao động",
        "quy định",
        "dự án",
    ]
    .into_iter()
    .map(str::to_string)
    .collect()
}

pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;

    let config: Config = toml::from_str(&content).with_context(|| "Failed to parse config file")?;

    if config.chunking.chunk_size == 0 {
        anyhow::bail!("chunking.chunk_size must be > 0");
    }

    if config.extraction.max_chars == 0 {
        anyhow::bail!("extraction.max_chars must be > 0");
    }

    if config.model.max_tokens == 0 {
        anyhow::bail!("model.max_tokens must be > 0");
    }

    if !(0.0..=2.0).contains(&config.model.temperature) {
        anyhow::bail!("model.temperature must be in [0.0, 2.0]");
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployment_values() {
        let config = Config::default();
        assert_eq!(config.model.model, "gpt-4o-mini");
        assert_eq!(config.model.max_tokens, 150);
        assert_eq!(config.model.retry_wait_secs, 25);
        assert_eq!(config.extraction.max_chars, 5000);
        assert_eq!(config.extraction.max_pdf_pages, 10);
        assert_eq!(config.chunking.chunk_size, 10_000);
        assert_eq!(config.fallback.keywords.len(), 13);
        assert!(config.fallback.keywords.contains(&"kế toán".to_string()));
    }

    #[test]
    fn keywords_are_overridable() {
        let config: Config = toml::from_str(
            r#"
[fallback]
keywords = ["finance", "hr"]
"#,
        )
        .unwrap();
        assert_eq!(config.fallback.keywords, vec!["finance", "hr"]);
    }

    #[test]
    fn zero_chunk_size_rejected() {
        let tmp = std::env::temp_dir().join("dsg-config-zero-chunk.toml");
        std::fs::write(&tmp, "[chunking]\nchunk_size = 0\n").unwrap();
        let err = load_config(&tmp).unwrap_err();
        assert!(err.to_string().contains("chunk_size"));
        let _ = std::fs::remove_file(&tmp);
    }
}
