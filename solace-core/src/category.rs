//! Recommendation categories.
//!
//! The enum offers compile-time safety for the four categories every
//! recommendation set must cover. Tags outside that set are carried through
//! verbatim as [`CategoryTag::Unrecognised`] so upstream data is never lost.
//!
//! # Examples
//! ```
//! use solace_core::{Category, CategoryTag};
//!
//! assert_eq!(Category::Music.as_str(), "music");
//! assert_eq!(CategoryTag::from("book").category(), Some(Category::Book));
//! assert_eq!(CategoryTag::from("Book").category(), None);
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// One of the required recommendation categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    /// Tracks and playlists.
    Music,
    /// Books and workbooks.
    Book,
    /// Physical places worth visiting.
    Place,
    /// Exercises, practices and routines.
    Activity,
}

impl Category {
    /// Categories a complete recommendation set must contain, in backfill
    /// order.
    pub const REQUIRED: [Self; 4] = [Self::Music, Self::Book, Self::Place, Self::Activity];

    /// Return the category as its lowercase wire tag.
    ///
    /// # Examples
    /// ```
    /// use solace_core::Category;
    ///
    /// assert_eq!(Category::Activity.as_str(), "activity");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Music => "music",
            Self::Book => "book",
            Self::Place => "place",
            Self::Activity => "activity",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a tag does not name a required category.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown recommendation category '{tag}'")]
pub struct UnknownCategory {
    /// The tag that failed to match.
    pub tag: String,
}

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Matching is exact and case-sensitive: `"Music"` is not `music`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "music" => Ok(Self::Music),
            "book" => Ok(Self::Book),
            "place" => Ok(Self::Place),
            "activity" => Ok(Self::Activity),
            _ => Err(UnknownCategory { tag: s.to_owned() }),
        }
    }
}

/// The category tag carried by a recommendation.
///
/// Construct tags through [`From<&str>`] or [`From<String>`] so that known
/// categories are always normalised into [`CategoryTag::Known`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "String", into = "String")
)]
pub enum CategoryTag {
    /// A required category.
    Known(Category),
    /// Any other tag, preserved exactly as received.
    Unrecognised(String),
}

impl CategoryTag {
    /// Return the required category this tag names, if any.
    #[must_use]
    pub const fn category(&self) -> Option<Category> {
        match self {
            Self::Known(category) => Some(*category),
            Self::Unrecognised(_) => None,
        }
    }

    /// Return the tag text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Known(category) => category.as_str(),
            Self::Unrecognised(tag) => tag,
        }
    }
}

impl From<Category> for CategoryTag {
    fn from(category: Category) -> Self {
        Self::Known(category)
    }
}

impl From<&str> for CategoryTag {
    fn from(tag: &str) -> Self {
        tag.parse()
            .map_or_else(|_| Self::Unrecognised(tag.to_owned()), Self::Known)
    }
}

impl From<String> for CategoryTag {
    fn from(tag: String) -> Self {
        tag.parse()
            .map_or_else(|_| Self::Unrecognised(tag), Self::Known)
    }
}

impl From<CategoryTag> for String {
    fn from(tag: CategoryTag) -> Self {
        match tag {
            CategoryTag::Known(category) => category.as_str().to_owned(),
            CategoryTag::Unrecognised(raw) => raw,
        }
    }
}

impl fmt::Display for CategoryTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
