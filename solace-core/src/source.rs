//! Recommendation source and text-generation traits.
//!
//! Sources are constructed explicitly by the caller and handed to whatever
//! aggregates their output; the core never reaches for process-wide state.

use thiserror::Error;

use crate::{RecommendationItem, RecommendationRequest};

/// Failures raised by recommendation sources and text generators.
///
/// Callers aggregating several sources degrade these to an empty list; the
/// coverage pass then supplies fallbacks.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The source has no credentials configured.
    #[error("{source_name} credentials are not configured")]
    MissingCredentials {
        /// Human-readable source name.
        source_name: String,
    },
    /// The request could not be sent or the response could not be read.
    #[error("network error calling {url}: {message}")]
    Network {
        /// Endpoint that was called.
        url: String,
        /// Transport error description.
        message: String,
    },
    /// The service answered with a non-success status.
    #[error("{url} returned HTTP {status}: {message}")]
    Http {
        /// Endpoint that was called.
        url: String,
        /// HTTP status code.
        status: u16,
        /// Status reason or response body excerpt.
        message: String,
    },
    /// The request did not finish in time.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// Endpoint that was called.
        url: String,
        /// Configured timeout in seconds.
        timeout_secs: u64,
    },
    /// The response body could not be interpreted.
    #[error("failed to parse response: {message}")]
    Parse {
        /// Description of the parse failure.
        message: String,
    },
    /// The service reported an application-level failure.
    #[error("service error: {message}")]
    Service {
        /// Description reported by the service.
        message: String,
    },
}

/// Produces candidate recommendations for a request.
///
/// # Examples
/// ```
/// use solace_core::{
///     Category, RecommendationItem, RecommendationRequest, RecommendationSource, SourceError,
/// };
///
/// struct Playlist;
///
/// impl RecommendationSource for Playlist {
///     fn name(&self) -> &str {
///         "playlist"
///     }
///
///     fn fetch(&self, _: &RecommendationRequest) -> Result<Vec<RecommendationItem>, SourceError> {
///         Ok(vec![RecommendationItem::new(Category::Music, "Song", "Desc", "Why", 7)])
///     }
/// }
///
/// let items = Playlist.fetch(&RecommendationRequest::default())?;
/// assert_eq!(items.len(), 1);
/// # Ok::<(), SourceError>(())
/// ```
pub trait RecommendationSource: Send + Sync {
    /// Short name used in logs and provenance reports.
    fn name(&self) -> &str;

    /// Fetch candidates for `request`.
    ///
    /// # Errors
    /// Returns [`SourceError`] when the upstream call fails or its response
    /// cannot be interpreted.
    fn fetch(&self, request: &RecommendationRequest)
    -> Result<Vec<RecommendationItem>, SourceError>;
}

/// A chat-style prompt for a text-generation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    /// System message setting the assistant's role.
    pub system: String,
    /// User message with the actual request.
    pub user: String,
    /// Upper bound on generated tokens.
    pub max_tokens: u32,
}

impl Prompt {
    /// Construct a prompt.
    #[must_use]
    pub fn new(system: impl Into<String>, user: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            max_tokens,
        }
    }
}

/// Turns a prompt into unstructured text.
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`.
    ///
    /// # Errors
    /// Returns [`SourceError`] when the service call fails.
    fn generate(&self, prompt: &Prompt) -> Result<String, SourceError>;
}

impl<T: RecommendationSource + ?Sized> RecommendationSource for Box<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<RecommendationItem>, SourceError> {
        (**self).fetch(request)
    }
}

impl<T: TextGenerator + ?Sized> TextGenerator for std::sync::Arc<T> {
    fn generate(&self, prompt: &Prompt) -> Result<String, SourceError> {
        (**self).generate(prompt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(
        SourceError::MissingCredentials { source_name: "Spotify".into() },
        "Spotify credentials are not configured"
    )]
    #[case(
        SourceError::Http { url: "https://api.example".into(), status: 429, message: "Too Many Requests".into() },
        "https://api.example returned HTTP 429: Too Many Requests"
    )]
    #[case(
        SourceError::Timeout { url: "https://api.example".into(), timeout_secs: 30 },
        "request to https://api.example timed out after 30s"
    )]
    fn errors_render_context(#[case] error: SourceError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }
}
