//! `import-therapists` command: load a roster into the database.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use solace_core::TherapistRow;

use crate::input::{open_store, read_json, write_json};
use crate::{ARG_DATABASE, ARG_ROSTER, CliError, DEFAULT_DATABASE, ENV_IMPORT_ROSTER};

/// CLI arguments for the `import-therapists` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "import-therapists",
    long_about = "Insert or update therapists from a JSON array of profiles. \
                 Entries without `is_accepting_clients` are treated as \
                 accepting new clients.",
    about = "Import a therapist roster"
)]
#[ortho_config(prefix = "SOLACE")]
pub(crate) struct ImportArgs {
    /// Path to a JSON array of therapist profiles.
    #[arg(value_name = "path")]
    #[serde(default)]
    pub(crate) roster: Option<Utf8PathBuf>,
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl ImportArgs {
    pub(crate) fn into_config(self) -> Result<ImportConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        ImportConfig::try_from(merged)
    }
}

/// Resolved `import-therapists` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ImportConfig {
    pub(crate) roster: Utf8PathBuf,
    pub(crate) database: Utf8PathBuf,
}

impl TryFrom<ImportArgs> for ImportConfig {
    type Error = CliError;

    fn try_from(args: ImportArgs) -> Result<Self, Self::Error> {
        let roster = args.roster.ok_or(CliError::MissingArgument {
            field: ARG_ROSTER,
            env: ENV_IMPORT_ROSTER,
        })?;
        Ok(Self {
            roster,
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
        })
    }
}

#[derive(Debug, Serialize)]
struct ImportResponse {
    imported: usize,
}

pub(super) fn run_import(args: ImportArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let rows: Vec<TherapistRow> = read_json(&config.roster, ARG_ROSTER)?;
    let store = open_store(&config.database)?;
    let imported = store
        .upsert_therapists(&rows)
        .map_err(|source| CliError::Store {
            path: config.database.clone(),
            source,
        })?;
    log::info!("imported {imported} therapists into {}", config.database);
    write_json(writer, &ImportResponse { imported })
}
