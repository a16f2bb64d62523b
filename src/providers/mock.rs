/*!
 * Mock provider implementations for testing.
 *
 * The mock reads the delimited payload out of the user prompt the way a real
 * model would and answers according to its behavior:
 * - `MockProvider::working()` - Tags and returns every segment
 * - `MockProvider::dropping(n)` - Loses the last `n` segments
 * - `MockProvider::extra(n)` - Appends `n` invented segments
 * - `MockProvider::failing()` - Always fails with an error
 */

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ProviderError;
use crate::providers::Provider;

/// Mock request for testing
#[derive(Debug, Clone, PartialEq)]
pub struct MockRequest {
    /// System message
    pub system_prompt: String,
    /// User message carrying the direction and the delimited payload
    pub user_prompt: String,
}

/// Mock response for testing
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// The translated text
    pub text: String,
}

/// Behavior mode for the mock provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockBehavior {
    /// Returns `[TRANSLATED] <segment>` for every segment
    Working,
    /// Returns all but the last `count` segments
    DropSegments { count: usize },
    /// Returns every segment plus `count` extra ones
    ExtraSegments { count: usize },
    /// Fails intermittently (every Nth request)
    Intermittent { fail_every: usize },
    /// Always fails with an error
    Failing,
    /// Returns empty response
    Empty,
}

/// Mock provider for testing translation behavior
#[derive(Debug)]
pub struct MockProvider {
    /// Behavior mode
    behavior: MockBehavior,
    /// Segment separator expected in the payload
    delimiter: String,
    /// Request counter for intermittent failures
    request_count: Arc<AtomicUsize>,
    /// Every request received, in order
    requests: Arc<Mutex<Vec<MockRequest>>>,
    /// Custom response generator (optional)
    custom_response: Option<fn(&MockRequest) -> String>,
}

impl MockProvider {
    /// Create a new mock provider with the specified behavior
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            delimiter: "|||".to_string(),
            request_count: Arc::new(AtomicUsize::new(0)),
            requests: Arc::new(Mutex::new(Vec::new())),
            custom_response: None,
        }
    }

    /// Create a working mock provider that always succeeds
    pub fn working() -> Self {
        Self::new(MockBehavior::Working)
    }

    /// Create a mock that drops the last `count` segments
    pub fn dropping(count: usize) -> Self {
        Self::new(MockBehavior::DropSegments { count })
    }

    /// Create a mock that adds `count` segments
    pub fn extra(count: usize) -> Self {
        Self::new(MockBehavior::ExtraSegments { count })
    }

    /// Create an intermittently failing mock provider
    pub fn intermittent(fail_every: usize) -> Self {
        Self::new(MockBehavior::Intermittent { fail_every })
    }

    /// Create a failing mock provider that always errors
    pub fn failing() -> Self {
        Self::new(MockBehavior::Failing)
    }

    /// Create a mock that returns empty responses
    pub fn empty() -> Self {
        Self::new(MockBehavior::Empty)
    }

    /// Use a different segment separator
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Set a custom response generator
    pub fn with_custom_response(mut self, generator: fn(&MockRequest) -> String) -> Self {
        self.custom_response = Some(generator);
        self
    }

    /// Number of requests received so far
    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<MockRequest> {
        self.requests.lock().clone()
    }

    /// Segments of the payload, which follows the first blank line of the user prompt
    pub fn payload_segments(user_prompt: &str, delimiter: &str) -> Vec<String> {
        let payload = user_prompt.split_once("\n\n")
            .map(|(_, payload)| payload)
            .unwrap_or(user_prompt);
        payload.split(delimiter).map(|s| s.to_string()).collect()
    }

    fn translated_segments(&self, request: &MockRequest) -> Vec<String> {
        Self::payload_segments(&request.user_prompt, &self.delimiter)
            .into_iter()
            .map(|s| format!("[TRANSLATED] {}", s))
            .collect()
    }
}

impl Clone for MockProvider {
    fn clone(&self) -> Self {
        Self {
            behavior: self.behavior,
            delimiter: self.delimiter.clone(),
            request_count: Arc::clone(&self.request_count),
            requests: Arc::clone(&self.requests),
            custom_response: self.custom_response,
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    type Request = MockRequest;
    type Response = MockResponse;

    async fn complete(&self, request: Self::Request) -> Result<Self::Response, ProviderError> {
        let count = self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().push(request.clone());

        if let Some(generator) = self.custom_response {
            return Ok(MockResponse { text: generator(&request) });
        }

        let text = match self.behavior {
            MockBehavior::Working => self.translated_segments(&request).join(&self.delimiter),

            MockBehavior::DropSegments { count: dropped } => {
                let mut segments = self.translated_segments(&request);
                segments.truncate(segments.len().saturating_sub(dropped));
                segments.join(&self.delimiter)
            }

            MockBehavior::ExtraSegments { count: extra } => {
                let mut segments = self.translated_segments(&request);
                segments.extend((0..extra).map(|i| format!("[EXTRA] {}", i)));
                segments.join(&self.delimiter)
            }

            MockBehavior::Intermittent { fail_every } => {
                if fail_every > 0 && count % fail_every == fail_every - 1 {
                    return Err(ProviderError::ApiError {
                        message: format!("Simulated intermittent failure (request #{})", count + 1),
                        status_code: 503,
                    });
                }
                self.translated_segments(&request).join(&self.delimiter)
            }

            MockBehavior::Failing => {
                return Err(ProviderError::ApiError {
                    message: "Simulated provider failure".to_string(),
                    status_code: 500,
                });
            }

            MockBehavior::Empty => String::new(),
        };

        Ok(MockResponse { text })
    }

    async fn test_connection(&self) -> Result<(), ProviderError> {
        match self.behavior {
            MockBehavior::Failing => Err(ProviderError::ConnectionError("Simulated connection failure".to_string())),
            _ => Ok(()),
        }
    }

    fn extract_text(response: &Self::Response) -> String {
        response.text.clone()
    }
}
