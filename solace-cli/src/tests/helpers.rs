//! Temporary workspaces and fixtures shared by the CLI tests.

use camino::{Utf8Path, Utf8PathBuf};
use solace_core::{SqliteStore, TherapistLocationRecord, TherapistProfile, TherapistRow};
use tempfile::TempDir;

/// A temporary directory holding the database and input files.
#[derive(Debug)]
pub(super) struct Workspace {
    _dir: TempDir,
    root: Utf8PathBuf,
}

impl Workspace {
    pub(super) fn new() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let root = Utf8PathBuf::from_path_buf(dir.path().to_path_buf()).expect("utf-8 workspace");
        Self { _dir: dir, root }
    }

    pub(super) fn path(&self, name: &str) -> Utf8PathBuf {
        self.root.join(name)
    }

    pub(super) fn database(&self) -> Utf8PathBuf {
        self.path("solace.db")
    }

    pub(super) fn write(&self, name: &str, contents: &str) -> Utf8PathBuf {
        let path = self.path(name);
        write_utf8(&path, contents.as_bytes());
        path
    }

    pub(super) fn store(&self) -> SqliteStore {
        SqliteStore::open(&self.database()).expect("open database")
    }
}

pub(super) fn write_utf8(path: &Utf8Path, contents: &[u8]) {
    std::fs::write(path.as_std_path(), contents).expect("write file");
}

/// A verified therapist accepting clients, optionally placed.
pub(super) fn therapist(id: &str, location: Option<(f64, f64)>) -> TherapistRow {
    let profile = TherapistProfile {
        id: id.to_owned(),
        full_name: format!("Therapist {id}"),
        verified: true,
        ..TherapistProfile::default()
    };
    let (latitude, longitude) = location.unzip();
    TherapistRow::from(TherapistLocationRecord::new(profile, latitude, longitude))
}

/// Parse captured command output as JSON.
pub(super) fn output_json(buffer: &[u8]) -> serde_json::Value {
    let stdout = std::str::from_utf8(buffer).expect("stdout utf-8");
    serde_json::from_str(stdout).expect("output should be JSON")
}
