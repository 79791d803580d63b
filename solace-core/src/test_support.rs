//! In-memory doubles for the store and source traits, used by unit and
//! behaviour tests.

use std::cell::{Cell, RefCell};
use std::convert::Infallible;

use crate::{
    Feedback, RecommendationItem, RecommendationStore, StoredRecommendation, TherapistDirectory,
    TherapistLocationRecord, TherapistRow,
};
#[cfg(any(test, feature = "test-support"))]
use crate::{Prompt, RecommendationRequest, RecommendationSource, SourceError, TextGenerator};
#[cfg(any(test, feature = "test-support"))]
use std::sync::{
    Mutex,
    atomic::{AtomicUsize, Ordering},
};

/// In-memory roster and recommendation store.
///
/// The store performs linear scans and is intended only for small datasets.
#[derive(Debug, Default)]
pub struct MemoryStore {
    therapists: Vec<TherapistRow>,
    recommendations: RefCell<Vec<StoredRecommendation>>,
    next_id: Cell<i64>,
}

impl MemoryStore {
    /// Create a store holding the given roster.
    #[must_use]
    pub fn with_therapists<I>(rows: I) -> Self
    where
        I: IntoIterator<Item = TherapistRow>,
    {
        Self {
            therapists: rows.into_iter().collect(),
            ..Self::default()
        }
    }
}

impl TherapistDirectory for MemoryStore {
    type Error = Infallible;

    fn nearby_candidates(&self) -> Result<Vec<TherapistLocationRecord>, Self::Error> {
        Ok(self
            .therapists
            .iter()
            .filter(|row| row.is_listed())
            .map(|row| row.record.clone())
            .collect())
    }
}

impl RecommendationStore for MemoryStore {
    type Error = Infallible;

    fn replace_for_user(
        &self,
        user_id: &str,
        items: &[RecommendationItem],
    ) -> Result<Vec<StoredRecommendation>, Self::Error> {
        let mut rows = self.recommendations.borrow_mut();
        rows.retain(|row| row.user_id != user_id);
        let stored: Vec<_> = items
            .iter()
            .map(|item| {
                let id = self.next_id.get() + 1;
                self.next_id.set(id);
                StoredRecommendation {
                    id,
                    user_id: user_id.to_owned(),
                    item: item.clone(),
                    user_feedback: None,
                }
            })
            .collect();
        rows.extend(stored.iter().cloned());
        Ok(stored)
    }

    fn record_feedback(
        &self,
        user_id: &str,
        recommendation_id: i64,
        feedback: Feedback,
    ) -> Result<bool, Self::Error> {
        let mut rows = self.recommendations.borrow_mut();
        let target = rows
            .iter_mut()
            .find(|row| row.id == recommendation_id && row.user_id == user_id);
        Ok(target.is_some_and(|row| {
            row.user_feedback = Some(feedback);
            true
        }))
    }

    fn recommendations_for(&self, user_id: &str) -> Result<Vec<StoredRecommendation>, Self::Error> {
        Ok(self
            .recommendations
            .borrow()
            .iter()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect())
    }
}

/// Source returning a canned response and counting calls.
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
#[derive(Debug)]
pub struct StubSource {
    name: String,
    response: Result<Vec<RecommendationItem>, SourceError>,
    calls: AtomicUsize,
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
impl StubSource {
    /// A source that always returns `items`.
    #[must_use]
    pub fn with_items(name: impl Into<String>, items: Vec<RecommendationItem>) -> Self {
        Self {
            name: name.into(),
            response: Ok(items),
            calls: AtomicUsize::new(0),
        }
    }

    /// A source that always fails with `error`.
    #[must_use]
    pub fn with_error(name: impl Into<String>, error: SourceError) -> Self {
        Self {
            name: name.into(),
            response: Err(error),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times [`RecommendationSource::fetch`] ran.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[cfg(any(test, feature = "test-support"))]
impl RecommendationSource for StubSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn fetch(&self, _: &RecommendationRequest) -> Result<Vec<RecommendationItem>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

/// Text generator returning a canned reply and recording prompts.
#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
#[derive(Debug)]
pub struct StubTextGenerator {
    reply: Result<String, SourceError>,
    prompts: Mutex<Vec<Prompt>>,
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-support")))]
impl StubTextGenerator {
    /// A generator that always answers with `reply`.
    #[must_use]
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            reply: Ok(reply.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// A generator that always fails with `error`.
    #[must_use]
    pub fn with_error(error: SourceError) -> Self {
        Self {
            reply: Err(error),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Prompts received so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts
            .lock()
            .map(|prompts| prompts.clone())
            .unwrap_or_default()
    }
}

#[cfg(any(test, feature = "test-support"))]
impl TextGenerator for StubTextGenerator {
    fn generate(&self, prompt: &Prompt) -> Result<String, SourceError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.clone());
        }
        self.reply.clone()
    }
}
