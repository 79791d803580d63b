//! SQLite-backed therapist roster and recommendation store.

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use rusqlite::{Connection, OptionalExtension, Row, params};
use thiserror::Error;

use crate::{
    CategoryTag, Feedback, RecommendationItem, TherapistLocationRecord, TherapistProfile,
    TherapistRow,
};

use super::{RecommendationStore, StoredRecommendation, TherapistDirectory};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS therapists (
    id TEXT PRIMARY KEY,
    full_name TEXT NOT NULL DEFAULT '',
    credentials TEXT,
    specializations TEXT,
    bio TEXT,
    years_experience INTEGER,
    gender TEXT,
    languages TEXT,
    therapy_approaches TEXT,
    session_rate_min INTEGER,
    session_rate_max INTEGER,
    accepts_insurance INTEGER NOT NULL DEFAULT 0,
    verified INTEGER NOT NULL DEFAULT 0,
    is_accepting_clients INTEGER NOT NULL DEFAULT 1,
    city TEXT,
    state TEXT,
    latitude REAL,
    longitude REAL
);
CREATE TABLE IF NOT EXISTS recommendations (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id TEXT NOT NULL,
    type TEXT NOT NULL,
    title TEXT NOT NULL,
    description TEXT NOT NULL,
    ai_reasoning TEXT NOT NULL,
    relevance_score INTEGER NOT NULL,
    external_url TEXT,
    image_url TEXT,
    user_feedback TEXT,
    created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);
CREATE INDEX IF NOT EXISTS idx_recommendations_user ON recommendations(user_id, id);
";

const THERAPIST_COLUMNS: &str = "id, full_name, credentials, specializations, bio, \
    years_experience, gender, languages, therapy_approaches, session_rate_min, \
    session_rate_max, accepts_insurance, verified, city, state, latitude, longitude";

const RECOMMENDATION_COLUMNS: &str = "id, user_id, type, title, description, ai_reasoning, \
    relevance_score, external_url, image_url, user_feedback";

/// Errors raised by [`SqliteStore`].
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Failed to create the parent directory for the database file.
    #[error("failed to create parent directory {path:?}")]
    CreateDirectory {
        /// Directory that could not be created.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Opening the SQLite database failed.
    #[error("failed to open SQLite database at {path:?}")]
    Open {
        /// Database path.
        path: Utf8PathBuf,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// Creating the tables failed.
    #[error("failed to create store schema")]
    CreateSchema {
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A statement failed.
    #[error("failed to {operation}")]
    Query {
        /// What the store was doing.
        operation: &'static str,
        /// Source error returned by `rusqlite`.
        #[source]
        source: rusqlite::Error,
    },
    /// A list column held invalid JSON.
    #[error("therapist {id} has an invalid {column} list")]
    InvalidList {
        /// Therapist identifier.
        id: String,
        /// Offending column.
        column: &'static str,
        /// JSON decoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// Serialising a list column failed.
    #[error("failed to serialise {column} for therapist {id}")]
    Serialize {
        /// Therapist identifier.
        id: String,
        /// Column being written.
        column: &'static str,
        /// JSON encoding failure.
        #[source]
        source: serde_json::Error,
    },
    /// A stored feedback tag was not recognised.
    #[error("recommendation {id} has unrecognised feedback '{value}'")]
    InvalidFeedback {
        /// Recommendation identifier.
        id: i64,
        /// Stored value.
        value: String,
    },
}

fn query_error(operation: &'static str) -> impl FnOnce(rusqlite::Error) -> SqliteStoreError {
    move |source| SqliteStoreError::Query { operation, source }
}

/// Store backed by a single SQLite connection.
///
/// # Examples
/// ```
/// use solace_core::{Category, RecommendationItem, RecommendationStore, SqliteStore};
///
/// let store = SqliteStore::open_in_memory()?;
/// let item = RecommendationItem::new(Category::Music, "Track", "Ambient", "Relaxing", 9);
/// let stored = store.replace_for_user("user-1", &[item])?;
/// assert_eq!(stored.len(), 1);
/// assert_eq!(store.recommendations_for("user-1")?, stored);
/// # Ok::<(), solace_core::SqliteStoreError>(())
/// ```
#[derive(Debug)]
pub struct SqliteStore {
    connection: Connection,
}

impl SqliteStore {
    /// Open or create a database file, creating parent directories and
    /// tables as needed.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] when the directory, file or schema cannot
    /// be created.
    pub fn open(path: &Utf8Path) -> Result<Self, SqliteStoreError> {
        ensure_parent_dir(path)?;
        let connection =
            Connection::open(path.as_std_path()).map_err(|source| SqliteStoreError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Self::with_connection(connection)
    }

    /// Open a private in-memory database.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] when SQLite cannot allocate the database.
    pub fn open_in_memory() -> Result<Self, SqliteStoreError> {
        let connection = Connection::open_in_memory().map_err(|source| SqliteStoreError::Open {
            path: Utf8PathBuf::from(":memory:"),
            source,
        })?;
        Self::with_connection(connection)
    }

    fn with_connection(connection: Connection) -> Result<Self, SqliteStoreError> {
        connection
            .execute_batch(SCHEMA)
            .map_err(|source| SqliteStoreError::CreateSchema { source })?;
        Ok(Self { connection })
    }

    /// Insert or replace therapist rows in a single transaction.
    ///
    /// Returns the number of rows written.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] when serialisation or a write fails; the
    /// transaction is rolled back.
    pub fn upsert_therapists(&self, rows: &[TherapistRow]) -> Result<usize, SqliteStoreError> {
        let transaction = self
            .connection
            .unchecked_transaction()
            .map_err(query_error("begin therapist import"))?;
        {
            let mut statement = transaction
                .prepare(&format!(
                    "INSERT OR REPLACE INTO therapists ({THERAPIST_COLUMNS}, is_accepting_clients)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)"
                ))
                .map_err(query_error("prepare therapist insert"))?;
            for row in rows {
                let profile = &row.record.profile;
                statement
                    .execute(params![
                        profile.id,
                        profile.full_name,
                        profile.credentials,
                        encode_list(&profile.id, "specializations", &profile.specializations)?,
                        profile.bio,
                        profile.years_experience,
                        profile.gender,
                        encode_list(&profile.id, "languages", &profile.languages)?,
                        encode_list(&profile.id, "therapy_approaches", &profile.therapy_approaches)?,
                        profile.session_rate_min,
                        profile.session_rate_max,
                        profile.accepts_insurance,
                        profile.verified,
                        profile.city,
                        profile.state,
                        row.record.latitude,
                        row.record.longitude,
                        row.is_accepting_clients,
                    ])
                    .map_err(query_error("insert therapist"))?;
            }
        }
        transaction
            .commit()
            .map_err(query_error("commit therapist import"))?;
        Ok(rows.len())
    }
}

impl TherapistDirectory for SqliteStore {
    type Error = SqliteStoreError;

    fn nearby_candidates(&self) -> Result<Vec<TherapistLocationRecord>, Self::Error> {
        let mut statement = self
            .connection
            .prepare(&format!(
                "SELECT {THERAPIST_COLUMNS} FROM therapists
                 WHERE verified = 1 AND is_accepting_clients = 1
                 ORDER BY rowid"
            ))
            .map_err(query_error("prepare therapist query"))?;
        let raw_rows = statement
            .query_map([], RawTherapist::from_row)
            .map_err(query_error("query therapists"))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_error("read therapist row"))?;
        raw_rows.into_iter().map(RawTherapist::into_record).collect()
    }
}

impl RecommendationStore for SqliteStore {
    type Error = SqliteStoreError;

    fn replace_for_user(
        &self,
        user_id: &str,
        items: &[RecommendationItem],
    ) -> Result<Vec<StoredRecommendation>, Self::Error> {
        let transaction = self
            .connection
            .unchecked_transaction()
            .map_err(query_error("begin recommendation replacement"))?;
        transaction
            .execute(
                "DELETE FROM recommendations WHERE user_id = ?1",
                params![user_id],
            )
            .map_err(query_error("delete previous recommendations"))?;

        let mut stored = Vec::with_capacity(items.len());
        {
            let mut statement = transaction
                .prepare(
                    "INSERT INTO recommendations
                     (user_id, type, title, description, ai_reasoning, relevance_score,
                      external_url, image_url)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                )
                .map_err(query_error("prepare recommendation insert"))?;
            for item in items {
                statement
                    .execute(params![
                        user_id,
                        item.category.as_str(),
                        item.title,
                        item.description,
                        item.rationale,
                        item.relevance_score,
                        item.external_url,
                        item.image_url,
                    ])
                    .map_err(query_error("insert recommendation"))?;
                stored.push(StoredRecommendation {
                    id: transaction.last_insert_rowid(),
                    user_id: user_id.to_owned(),
                    item: item.clone(),
                    user_feedback: None,
                });
            }
        }
        transaction
            .commit()
            .map_err(query_error("commit recommendation replacement"))?;
        Ok(stored)
    }

    fn record_feedback(
        &self,
        user_id: &str,
        recommendation_id: i64,
        feedback: Feedback,
    ) -> Result<bool, Self::Error> {
        let changed = self
            .connection
            .execute(
                "UPDATE recommendations SET user_feedback = ?1 WHERE id = ?2 AND user_id = ?3",
                params![feedback.as_str(), recommendation_id, user_id],
            )
            .map_err(query_error("record feedback"))?;
        Ok(changed > 0)
    }

    fn recommendations_for(&self, user_id: &str) -> Result<Vec<StoredRecommendation>, Self::Error> {
        let mut statement = self
            .connection
            .prepare(&format!(
                "SELECT {RECOMMENDATION_COLUMNS} FROM recommendations WHERE user_id = ?1 ORDER BY id"
            ))
            .map_err(query_error("prepare recommendation query"))?;
        let rows = statement
            .query_map(params![user_id], RawRecommendation::from_row)
            .map_err(query_error("query recommendations"))?
            .collect::<Result<Vec<_>, _>>()
            .map_err(query_error("read recommendation row"))?;
        rows.into_iter().map(RawRecommendation::into_stored).collect()
    }
}

impl SqliteStore {
    /// Look up a single recommendation owned by `user_id`.
    ///
    /// # Errors
    /// Returns [`SqliteStoreError`] when the query fails.
    pub fn recommendation(
        &self,
        user_id: &str,
        recommendation_id: i64,
    ) -> Result<Option<StoredRecommendation>, SqliteStoreError> {
        self.connection
            .query_row(
                &format!(
                    "SELECT {RECOMMENDATION_COLUMNS} FROM recommendations \
                     WHERE id = ?1 AND user_id = ?2"
                ),
                params![recommendation_id, user_id],
                RawRecommendation::from_row,
            )
            .optional()
            .map_err(query_error("look up recommendation"))?
            .map(RawRecommendation::into_stored)
            .transpose()
    }
}

/// A recommendation row before its feedback tag is validated.
struct RawRecommendation {
    id: i64,
    user_id: String,
    item: RecommendationItem,
    feedback: Option<String>,
}

impl RawRecommendation {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            item: RecommendationItem {
                category: CategoryTag::from(row.get::<_, String>(2)?),
                title: row.get(3)?,
                description: row.get(4)?,
                rationale: row.get(5)?,
                relevance_score: row.get(6)?,
                external_url: row.get(7)?,
                image_url: row.get(8)?,
            },
            feedback: row.get(9)?,
        })
    }

    fn into_stored(self) -> Result<StoredRecommendation, SqliteStoreError> {
        let id = self.id;
        let user_feedback = self
            .feedback
            .map(|value| {
                value
                    .parse::<Feedback>()
                    .map_err(|err| SqliteStoreError::InvalidFeedback {
                        id,
                        value: err.value,
                    })
            })
            .transpose()?;
        Ok(StoredRecommendation {
            id,
            user_id: self.user_id,
            item: self.item,
            user_feedback,
        })
    }
}

/// Column values as read, before list decoding.
struct RawTherapist {
    id: String,
    full_name: String,
    credentials: Option<String>,
    specializations: Option<String>,
    bio: Option<String>,
    years_experience: Option<u32>,
    gender: Option<String>,
    languages: Option<String>,
    therapy_approaches: Option<String>,
    session_rate_min: Option<u32>,
    session_rate_max: Option<u32>,
    accepts_insurance: bool,
    verified: bool,
    city: Option<String>,
    state: Option<String>,
    latitude: Option<f64>,
    longitude: Option<f64>,
}

impl RawTherapist {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            full_name: row.get(1)?,
            credentials: row.get(2)?,
            specializations: row.get(3)?,
            bio: row.get(4)?,
            years_experience: row.get(5)?,
            gender: row.get(6)?,
            languages: row.get(7)?,
            therapy_approaches: row.get(8)?,
            session_rate_min: row.get(9)?,
            session_rate_max: row.get(10)?,
            accepts_insurance: row.get(11)?,
            verified: row.get(12)?,
            city: row.get(13)?,
            state: row.get(14)?,
            latitude: row.get(15)?,
            longitude: row.get(16)?,
        })
    }

    fn into_record(self) -> Result<TherapistLocationRecord, SqliteStoreError> {
        let specializations = decode_list(&self.id, "specializations", self.specializations)?;
        let languages = decode_list(&self.id, "languages", self.languages)?;
        let therapy_approaches =
            decode_list(&self.id, "therapy_approaches", self.therapy_approaches)?;
        let profile = TherapistProfile {
            id: self.id,
            full_name: self.full_name,
            credentials: self.credentials.unwrap_or_default(),
            specializations,
            bio: self.bio.unwrap_or_default(),
            years_experience: self.years_experience.unwrap_or_default(),
            gender: self.gender.unwrap_or_default(),
            languages,
            therapy_approaches,
            session_rate_min: self.session_rate_min.unwrap_or_default(),
            session_rate_max: self.session_rate_max.unwrap_or_default(),
            accepts_insurance: self.accepts_insurance,
            verified: self.verified,
            city: self.city.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
        };
        Ok(TherapistLocationRecord::new(
            profile,
            self.latitude,
            self.longitude,
        ))
    }
}

fn encode_list(
    id: &str,
    column: &'static str,
    values: &[String],
) -> Result<String, SqliteStoreError> {
    serde_json::to_string(values).map_err(|source| SqliteStoreError::Serialize {
        id: id.to_owned(),
        column,
        source,
    })
}

fn decode_list(
    id: &str,
    column: &'static str,
    raw: Option<String>,
) -> Result<Vec<String>, SqliteStoreError> {
    let Some(json) = raw.filter(|text| !text.trim().is_empty()) else {
        return Ok(Vec::new());
    };
    serde_json::from_str(&json).map_err(|source| SqliteStoreError::InvalidList {
        id: id.to_owned(),
        column,
        source,
    })
}

fn ensure_parent_dir(path: &Utf8Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }

    let (base, relative) = if parent.is_absolute() {
        ("/", parent.strip_prefix("/").unwrap_or(parent))
    } else {
        (".", parent)
    };
    let create_error = |source| SqliteStoreError::CreateDirectory {
        path: parent.to_path_buf(),
        source,
    };
    let dir = fs_utf8::Dir::open_ambient_dir(base, ambient_authority()).map_err(create_error)?;
    dir.create_dir_all(relative).map_err(create_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Category;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    #[fixture]
    fn store() -> SqliteStore {
        SqliteStore::open_in_memory().expect("open in-memory store")
    }

    fn therapist(id: &str, verified: bool, accepting: bool, at: Option<(f64, f64)>) -> TherapistRow {
        let profile = TherapistProfile {
            id: id.to_owned(),
            full_name: format!("Therapist {id}"),
            specializations: vec!["anxiety".into(), "grief".into()],
            verified,
            ..TherapistProfile::default()
        };
        TherapistRow {
            record: TherapistLocationRecord::new(profile, at.map(|p| p.0), at.map(|p| p.1)),
            is_accepting_clients: accepting,
        }
    }

    fn item(category: Category, title: &str) -> RecommendationItem {
        RecommendationItem::new(category, title, "Description", "Rationale", 6)
    }

    #[rstest]
    fn directory_lists_verified_accepting_therapists(store: SqliteStore) {
        store
            .upsert_therapists(&[
                therapist("a", true, true, Some((37.0, -122.0))),
                therapist("b", false, true, Some((37.0, -122.0))),
                therapist("c", true, false, None),
                therapist("d", true, true, None),
            ])
            .expect("import roster");

        let listed = store.nearby_candidates().expect("list therapists");
        let ids: Vec<_> = listed.iter().map(|t| t.profile.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "d"]);
        assert_eq!(listed[0].profile.specializations, vec!["anxiety", "grief"]);
        assert_eq!(listed[0].latitude, Some(37.0));
        assert!(listed[1].longitude.is_none());
    }

    #[rstest]
    fn missing_columns_normalise_to_defaults(store: SqliteStore) {
        store
            .connection
            .execute(
                "INSERT INTO therapists (id, verified) VALUES ('bare', 1)",
                [],
            )
            .expect("insert sparse row");

        let listed = store.nearby_candidates().expect("list therapists");
        assert_eq!(listed.len(), 1);
        assert!(listed[0].profile.languages.is_empty());
        assert_eq!(listed[0].profile.session_rate_max, 0);
        assert!(listed[0].profile.bio.is_empty());
    }

    #[rstest]
    fn invalid_list_json_is_reported(store: SqliteStore) {
        store
            .connection
            .execute(
                "INSERT INTO therapists (id, verified, languages) VALUES ('x', 1, 'not json')",
                [],
            )
            .expect("insert corrupt row");

        let err = store.nearby_candidates().expect_err("corrupt list");
        assert!(matches!(
            err,
            SqliteStoreError::InvalidList { column: "languages", .. }
        ));
    }

    #[rstest]
    fn replacement_discards_previous_set(store: SqliteStore) {
        store
            .replace_for_user("u1", &[item(Category::Music, "Old")])
            .expect("first set");
        store
            .replace_for_user("u2", &[item(Category::Book, "Other user")])
            .expect("other user");
        let fresh = store
            .replace_for_user(
                "u1",
                &[item(Category::Place, "New A"), item(Category::Activity, "New B")],
            )
            .expect("second set");

        let stored = store.recommendations_for("u1").expect("read back");
        assert_eq!(stored, fresh);
        let titles: Vec<_> = stored.iter().map(|s| s.item.title.as_str()).collect();
        assert_eq!(titles, vec!["New A", "New B"]);
        assert_eq!(store.recommendations_for("u2").expect("other").len(), 1);
    }

    #[rstest]
    fn feedback_requires_matching_owner(store: SqliteStore) {
        let stored = store
            .replace_for_user("owner", &[item(Category::Music, "Track")])
            .expect("store set");
        let id = stored[0].id;

        assert!(!store
            .record_feedback("intruder", id, Feedback::Saved)
            .expect("update"));
        assert!(store
            .record_feedback("owner", id, Feedback::Helpful)
            .expect("update"));

        let found = store
            .recommendation("owner", id)
            .expect("lookup")
            .expect("row exists");
        assert_eq!(found.user_feedback, Some(Feedback::Helpful));
        assert!(store.recommendation("intruder", id).expect("lookup").is_none());
    }

    #[rstest]
    fn single_lookup_selects_the_requested_row(store: SqliteStore) {
        let stored = store
            .replace_for_user(
                "owner",
                &[
                    item(Category::Music, "Track"),
                    item(Category::Book, "Book"),
                    item(Category::Place, "Park"),
                ],
            )
            .expect("store set");
        let book = stored[1].clone();

        assert_eq!(
            store.recommendation("owner", book.id).expect("lookup"),
            Some(book)
        );
        assert!(store.recommendation("owner", i64::MAX).expect("lookup").is_none());
    }

    #[rstest]
    fn single_lookup_reports_corrupt_feedback(store: SqliteStore) {
        let stored = store
            .replace_for_user("owner", &[item(Category::Music, "Track")])
            .expect("store set");
        let id = stored[0].id;
        store
            .connection
            .execute(
                "UPDATE recommendations SET user_feedback = 'meh' WHERE id = ?1",
                params![id],
            )
            .expect("corrupt feedback");

        let err = store.recommendation("owner", id).expect_err("corrupt feedback");
        assert!(matches!(
            err,
            SqliteStoreError::InvalidFeedback { id: found, .. } if found == id
        ));
    }

    #[rstest]
    fn unrecognised_tags_survive_storage(store: SqliteStore) {
        let podcast = RecommendationItem::new("podcast", "Calm Minds", "Talks", "Why", 4)
            .with_external_url("https://example.com/p");
        store
            .replace_for_user("u", std::slice::from_ref(&podcast))
            .expect("store podcast");
        let stored = store.recommendations_for("u").expect("read back");
        assert_eq!(stored[0].item, podcast);
    }

    #[rstest]
    fn open_creates_parent_directories() {
        let temp = TempDir::new().expect("create temp dir");
        let path = Utf8PathBuf::from_path_buf(temp.path().join("nested/deeper/solace.db"))
            .expect("utf-8 path");

        let reopened = {
            let store = SqliteStore::open(&path).expect("open file store");
            store
                .replace_for_user("u", &[item(Category::Book, "Kept")])
                .expect("write");
            drop(store);
            SqliteStore::open(&path).expect("reopen")
        };

        assert!(path.exists());
        assert_eq!(reopened.recommendations_for("u").expect("read").len(), 1);
    }
}
