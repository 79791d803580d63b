//! Text-generation backed recommendations.
//!
//! [`OpenAiTextGenerator`] talks to any OpenAI-compatible chat completions
//! endpoint. [`LlmRecommendationSource`] turns a [`TextGenerator`] into a
//! [`RecommendationSource`] for one of three [`LlmKind`]s, parsing the reply
//! with the helpers in [`parse`].

pub mod parse;
pub mod prompts;

use serde::{Deserialize, Serialize};
use solace_core::{
    Category, Prompt, RecommendationItem, RecommendationRequest, RecommendationSource,
    SourceError, TextGenerator,
};

use crate::http::{ClientBuildError, HttpClientConfig, HttpRuntime};

/// Default chat completions base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default chat model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Configuration for [`OpenAiTextGenerator`].
#[derive(Clone, PartialEq, Eq)]
pub struct OpenAiConfig {
    /// Bearer token; when absent every call fails with
    /// [`SourceError::MissingCredentials`].
    pub api_key: Option<String>,
    /// API base URL, without a trailing slash.
    pub base_url: String,
    /// Model name.
    pub model: String,
    /// Shared HTTP settings.
    pub http: HttpClientConfig,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_owned(),
            model: DEFAULT_OPENAI_MODEL.to_owned(),
            http: HttpClientConfig::default(),
        }
    }
}

impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("http", &self.http)
            .finish()
    }
}

impl OpenAiConfig {
    /// Configuration for the public endpoint and default model.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        Self {
            api_key,
            ..Self::default()
        }
    }

    /// Use `model` instead of the default.
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }
}

/// Text generator backed by an OpenAI-compatible chat completions API.
#[derive(Debug)]
pub struct OpenAiTextGenerator {
    config: OpenAiConfig,
    http: HttpRuntime,
}

impl OpenAiTextGenerator {
    /// Build the generator and its HTTP runtime.
    ///
    /// # Errors
    ///
    /// Returns [`ClientBuildError`] when the HTTP client or Tokio runtime
    /// cannot be created.
    pub fn new(config: OpenAiConfig) -> Result<Self, ClientBuildError> {
        let http = HttpRuntime::new(&config.http)?;
        Ok(Self { config, http })
    }

    async fn complete(&self, api_key: &str, prompt: &Prompt) -> Result<String, SourceError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );
        let body = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
            max_tokens: prompt.max_tokens,
        };
        let request = self
            .http
            .client()
            .post(&url)
            .bearer_auth(api_key)
            .json(&body);
        let response: ChatResponse = self.http.send_json(request, &url).await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| SourceError::Service {
                message: "completion contained no message".to_owned(),
            })
    }
}

impl TextGenerator for OpenAiTextGenerator {
    fn generate(&self, prompt: &Prompt) -> Result<String, SourceError> {
        let api_key =
            self.config
                .api_key
                .as_deref()
                .ok_or_else(|| SourceError::MissingCredentials {
                    source_name: "OpenAI".to_owned(),
                })?;
        self.http.block_on(self.complete(api_key, prompt))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    #[serde(default)]
    content: Option<String>,
}

/// What an [`LlmRecommendationSource`] asks the generator for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmKind {
    /// Songs, linked to Spotify search.
    Music,
    /// Places, linked to Google Maps search.
    Places,
    /// Books linked to Amazon and activities linked to YouTube.
    BooksAndActivities,
}

impl LlmKind {
    /// Stable identifier used in source names and logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Music => "music",
            Self::Places => "places",
            Self::BooksAndActivities => "books-and-activities",
        }
    }

    /// Category assumed for drafts that omit a `type`.
    #[must_use]
    pub const fn default_category(self) -> Category {
        match self {
            Self::Music => Category::Music,
            Self::Places => Category::Place,
            Self::BooksAndActivities => Category::Activity,
        }
    }

    /// Prompt for this kind.
    #[must_use]
    pub fn prompt(self, request: &RecommendationRequest) -> Prompt {
        match self {
            Self::Music => prompts::music_prompt(request),
            Self::Places => prompts::places_prompt(request),
            Self::BooksAndActivities => prompts::books_and_activities_prompt(request),
        }
    }
}

/// Recommendation source that prompts a [`TextGenerator`].
#[derive(Debug)]
pub struct LlmRecommendationSource<G> {
    generator: G,
    kind: LlmKind,
    name: String,
}

impl<G: TextGenerator> LlmRecommendationSource<G> {
    /// Wrap `generator` as a source of `kind` recommendations.
    #[must_use]
    pub fn new(generator: G, kind: LlmKind) -> Self {
        Self {
            generator,
            kind,
            name: format!("llm-{}", kind.as_str()),
        }
    }

    /// The kind of recommendation requested.
    #[must_use]
    pub const fn kind(&self) -> LlmKind {
        self.kind
    }
}

impl<G: TextGenerator> RecommendationSource for LlmRecommendationSource<G> {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<RecommendationItem>, SourceError> {
        let reply = self.generator.generate(&self.kind.prompt(request))?;
        parse::parse_recommendations(self.kind, &reply)
    }
}
