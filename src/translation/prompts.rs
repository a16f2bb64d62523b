/*!
 * Prompts for workbook translation.
 *
 * The system prompt lives in an editable text file next to the tool. It is
 * read on every run and created with the built-in rules when missing.
 */

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::language::TranslationDirection;

/// System prompt sent with every translation request
#[derive(Debug, Clone, PartialEq)]
pub struct SystemPrompt {
    text: String,
}

impl SystemPrompt {
    /// Built-in translation rules; `{delimiter}` is replaced by the segment separator
    pub const TEMPLATE: &'static str = r#"You are a professional translator. Follow these rules strictly:
1. Output ONLY the translation, nothing else
2. DO NOT include the original text in your response
3. DO NOT add any explanations or notes
4. Keep IDs, model numbers, and special characters unchanged
5. Use standard terminology for technical terms
6. Preserve the original formatting (spaces, line breaks)
7. Use proper grammar and punctuation
8. Only keep unchanged: proper names, IDs, and technical codes
9. Translate all segments separated by "{delimiter}" and keep them separated with the same delimiter"#;

    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The built-in rules naming `delimiter` as the segment separator
    pub fn builtin(delimiter: &str) -> Self {
        Self::new(Self::TEMPLATE.replace("{delimiter}", delimiter))
    }

    /// Read the prompt from `path`, writing the built-in prompt for `delimiter`
    /// there first if the file does not exist
    pub fn load_or_create(path: &Path, delimiter: &str) -> Result<Self> {
        if path.exists() {
            let text = fs::read_to_string(path)
                .with_context(|| format!("Failed to read system prompt file: {}", path.display()))?;
            if !text.contains(delimiter) {
                warn!("System prompt in {} never mentions the delimiter '{}'", path.display(), delimiter);
            }
            return Ok(Self::new(text));
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory for prompt file: {}", parent.display()))?;
        }
        let prompt = Self::builtin(delimiter);
        fs::write(path, prompt.as_str())
            .with_context(|| format!("Failed to write default prompt file: {}", path.display()))?;
        info!("📝 Default prompt file created at: {}", path.display());
        Ok(prompt)
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Default for SystemPrompt {
    fn default() -> Self {
        Self::builtin("|||")
    }
}

/// User message for one batch: the direction, the separator, then the joined texts
pub fn build_user_prompt(texts: &[String], direction: TranslationDirection, delimiter: &str) -> String {
    format!(
        "Translate the following text from {}, keeping segments separated by '{}':\n\n{}",
        direction.label(),
        delimiter,
        texts.join(delimiter)
    )
}
