//! JSON input files, the database handle and command output.

use std::io::{BufReader, Write};

use camino::Utf8Path;
use cap_std::{ambient_authority, fs_utf8};
use serde::{Serialize, de::DeserializeOwned};
use solace_core::SqliteStore;

use crate::CliError;

/// Read and decode a JSON file named on the command line.
pub(crate) fn read_json<T>(path: &Utf8Path, field: &'static str) -> Result<T, CliError>
where
    T: DeserializeOwned,
{
    let file = fs_utf8::File::open_ambient(path, ambient_authority()).map_err(|source| {
        CliError::OpenInput {
            field,
            path: path.to_path_buf(),
            source,
        }
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::ParseInput {
        field,
        path: path.to_path_buf(),
        source,
    })
}

/// Write `value` as pretty JSON followed by a newline.
pub(crate) fn write_json<T>(writer: &mut dyn Write, value: &T) -> Result<(), CliError>
where
    T: Serialize + ?Sized,
{
    let payload = serde_json::to_string_pretty(value).map_err(CliError::SerializeOutput)?;
    writer
        .write_all(payload.as_bytes())
        .map_err(CliError::WriteOutput)?;
    writer.write_all(b"\n").map_err(CliError::WriteOutput)?;
    Ok(())
}

/// Open the SQLite database at `path`, creating it when absent.
pub(crate) fn open_store(path: &Utf8Path) -> Result<SqliteStore, CliError> {
    SqliteStore::open(path).map_err(|source| CliError::Store {
        path: path.to_path_buf(),
        source,
    })
}
