/*!
 * Core translation service implementation.
 *
 * This module contains the TranslationService, which turns one batch of texts
 * into one chat request and maps the delimited reply back onto the batch.
 * A reply is always repaired to exactly one string per input text, and a
 * failed request yields the input texts unchanged.
 */

use std::time::{Duration, Instant};

use log::{debug, error, warn};

use crate::app_config::{TranslationConfig, TranslationProvider as ConfigTranslationProvider};
use crate::errors::{AppError, ProviderError};
use crate::language::TranslationDirection;
use crate::providers::anthropic::{Anthropic, AnthropicRequest};
use crate::providers::mock::{MockProvider, MockRequest};
use crate::providers::openai::{OpenAI, OpenAIRequest};
use crate::providers::Provider;
use super::batch::Batch;
use super::prompts::{build_user_prompt, SystemPrompt};

/// Output budget for one batch reply
const MAX_OUTPUT_TOKENS: u32 = 8192;

/// Translation provider implementation variants
#[derive(Debug)]
enum TranslationProviderImpl {
    /// OpenAI-compatible chat completions
    OpenAI {
        /// Client instance
        client: OpenAI,
    },

    /// Anthropic API service
    Anthropic {
        /// Client instance
        client: Anthropic,
    },

    /// Scripted provider for tests
    Mock {
        /// Client instance
        client: MockProvider,
    },
}

/// How a batch request ended
#[derive(Debug, Clone, PartialEq)]
pub enum BatchOutcome {
    /// The reply had one segment per text
    Translated,
    /// The reply had the wrong number of segments and was padded or truncated
    Repaired {
        expected: usize,
        received: usize,
    },
    /// The request failed; the texts are returned untranslated
    Failed(String),
}

/// Translated texts, position-aligned with the request
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationResult {
    pub texts: Vec<String>,
    pub outcome: BatchOutcome,
}

/// Split a reply on `delimiter`, trimming every segment
pub fn split_response(response: &str, delimiter: &str) -> Vec<String> {
    response.split(delimiter).map(|s| s.trim().to_string()).collect()
}

/// Force `translated` to the length of `originals`: missing tail positions are
/// filled with the original texts at those positions, surplus segments are dropped.
pub fn repair_cardinality(originals: &[String], mut translated: Vec<String>) -> Vec<String> {
    if translated.len() < originals.len() {
        translated.extend_from_slice(&originals[translated.len()..]);
    } else {
        translated.truncate(originals.len());
    }
    translated
}

/// Main translation service for workbook text
#[derive(Debug)]
pub struct TranslationService {
    /// Provider implementation
    provider: TranslationProviderImpl,

    /// Model name sent with each request
    model: String,

    /// System message sent with each request
    system_prompt: SystemPrompt,

    /// Separator between texts
    delimiter: String,

    /// Pause after every request
    request_delay: Duration,

    /// Sampling temperature, provider default when unset
    temperature: Option<f32>,
}

impl TranslationService {
    /// Create a new translation service with the given configuration.
    /// Fails when the active provider has no API key.
    pub fn new(config: &TranslationConfig, system_prompt: SystemPrompt) -> Result<Self, AppError> {
        let api_key = config.get_api_key();
        if api_key.is_empty() {
            return Err(AppError::DependencyMissing(format!(
                "No API key for the {} provider: set api_key in the config or the {} environment variable",
                config.provider.display_name(),
                config.get_api_key_env()
            )));
        }

        let endpoint = config.get_endpoint();
        let timeout_secs = config.get_timeout_secs();
        let provider = match config.provider {
            ConfigTranslationProvider::OpenAI => TranslationProviderImpl::OpenAI {
                client: OpenAI::new(api_key, endpoint, timeout_secs),
            },
            ConfigTranslationProvider::Anthropic => TranslationProviderImpl::Anthropic {
                client: Anthropic::new(api_key, endpoint, timeout_secs),
            },
        };

        Ok(Self {
            provider,
            model: config.get_model(),
            system_prompt,
            delimiter: config.common.delimiter.clone(),
            request_delay: Duration::from_millis(config.common.rate_limit_delay_ms),
            temperature: config.common.temperature,
        })
    }

    /// Create a service backed by a mock provider, with no delay between requests
    pub fn with_mock(client: MockProvider, system_prompt: SystemPrompt) -> Self {
        Self {
            provider: TranslationProviderImpl::Mock { client },
            model: "mock".to_string(),
            system_prompt,
            delimiter: "|||".to_string(),
            request_delay: Duration::ZERO,
            temperature: None,
        }
    }

    /// Set the pause applied after every request
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    /// Set the separator between texts
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Test the connection to the translation provider
    pub async fn test_connection(&self) -> Result<(), ProviderError> {
        match &self.provider {
            TranslationProviderImpl::OpenAI { client } => client.test_connection().await,
            TranslationProviderImpl::Anthropic { client } => client.test_connection().await,
            TranslationProviderImpl::Mock { client } => client.test_connection().await,
        }
    }

    /// Translate the cleaned texts of one batch
    pub async fn translate_batch(&self, batch: &Batch<'_>, direction: TranslationDirection) -> TranslationResult {
        self.translate_texts(&batch.texts(), direction).await
    }

    /// Translate `texts` in one request. The result always holds exactly one
    /// string per input text; on failure those are the inputs themselves.
    pub async fn translate_texts(&self, texts: &[String], direction: TranslationDirection) -> TranslationResult {
        if texts.is_empty() {
            return TranslationResult {
                texts: Vec::new(),
                outcome: BatchOutcome::Translated,
            };
        }

        let user_prompt = build_user_prompt(texts, direction, &self.delimiter);
        let start_time = Instant::now();
        let response = self.request(user_prompt).await;

        let result = match response {
            Ok(reply) => {
                debug!("Translation reply received in {:?}", start_time.elapsed());
                let segments = split_response(&reply, &self.delimiter);
                let received = segments.len();
                let outcome = if received == texts.len() {
                    BatchOutcome::Translated
                } else {
                    warn!(
                        "Number of translated parts ({}) doesn't match number of original texts ({})",
                        received,
                        texts.len()
                    );
                    BatchOutcome::Repaired {
                        expected: texts.len(),
                        received,
                    }
                };
                TranslationResult {
                    texts: repair_cardinality(texts, segments),
                    outcome,
                }
            }
            Err(e) => {
                error!("Error translating batch: {}", e);
                TranslationResult {
                    texts: texts.to_vec(),
                    outcome: BatchOutcome::Failed(e.to_string()),
                }
            }
        };

        if !self.request_delay.is_zero() {
            tokio::time::sleep(self.request_delay).await;
        }
        result
    }

    /// Send one system + user exchange and return the reply text
    async fn request(&self, user_prompt: String) -> Result<String, ProviderError> {
        let system_prompt = self.system_prompt.as_str();
        let reply = match &self.provider {
            TranslationProviderImpl::OpenAI { client } => {
                let mut request = OpenAIRequest::new(self.model.clone())
                    .add_message("system", system_prompt)
                    .add_message("user", user_prompt)
                    .max_tokens(MAX_OUTPUT_TOKENS);
                if let Some(temperature) = self.temperature {
                    request = request.temperature(temperature);
                }
                let response = client.complete(request).await?;
                if let Some(usage) = &response.usage {
                    debug!("Token usage: {} prompt, {} completion", usage.prompt_tokens, usage.completion_tokens);
                }
                OpenAI::extract_text(&response)
            }
            TranslationProviderImpl::Anthropic { client } => {
                let mut request = AnthropicRequest::new(self.model.clone(), MAX_OUTPUT_TOKENS)
                    .system(system_prompt)
                    .add_message("user", user_prompt);
                if let Some(temperature) = self.temperature {
                    request = request.temperature(temperature);
                }
                let response = client.complete(request).await?;
                Anthropic::extract_text(&response)
            }
            TranslationProviderImpl::Mock { client } => {
                let request = MockRequest {
                    system_prompt: system_prompt.to_string(),
                    user_prompt,
                };
                let response = client.complete(request).await?;
                MockProvider::extract_text(&response)
            }
        };

        if reply.trim().is_empty() {
            return Err(ProviderError::ParseError("provider returned an empty reply".to_string()));
        }
        Ok(reply)
    }
}
