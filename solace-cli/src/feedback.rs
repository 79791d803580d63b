//! `feedback` command: record a reaction to a stored recommendation.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use solace_core::{Feedback, RecommendationStore};

use crate::input::{open_store, write_json};
use crate::{
    ARG_DATABASE, ARG_RECOMMENDATION, ARG_USER, ARG_VALUE, CliError, DEFAULT_DATABASE,
    ENV_FEEDBACK_RECOMMENDATION, ENV_FEEDBACK_USER, ENV_FEEDBACK_VALUE,
};

/// CLI arguments for the `feedback` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(name = "feedback", about = "Record feedback on a recommendation")]
#[ortho_config(prefix = "SOLACE")]
pub(crate) struct FeedbackArgs {
    /// Identifier of the user who owns the recommendation.
    #[arg(long = ARG_USER, value_name = "id")]
    #[serde(default)]
    pub(crate) user: Option<String>,
    /// Identifier of the stored recommendation.
    #[arg(long = ARG_RECOMMENDATION, value_name = "id")]
    #[serde(default)]
    pub(crate) recommendation: Option<i64>,
    /// One of helpful, not_helpful or saved.
    #[arg(long = ARG_VALUE, value_name = "feedback")]
    #[serde(default)]
    pub(crate) value: Option<String>,
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
}

impl FeedbackArgs {
    pub(crate) fn into_config(self) -> Result<FeedbackConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        FeedbackConfig::try_from(merged)
    }
}

/// Resolved `feedback` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FeedbackConfig {
    pub(crate) user: String,
    pub(crate) recommendation: i64,
    pub(crate) value: Feedback,
    pub(crate) database: Utf8PathBuf,
}

impl TryFrom<FeedbackArgs> for FeedbackConfig {
    type Error = CliError;

    fn try_from(args: FeedbackArgs) -> Result<Self, Self::Error> {
        let user = args.user.ok_or(CliError::MissingArgument {
            field: ARG_USER,
            env: ENV_FEEDBACK_USER,
        })?;
        let recommendation = args.recommendation.ok_or(CliError::MissingArgument {
            field: ARG_RECOMMENDATION,
            env: ENV_FEEDBACK_RECOMMENDATION,
        })?;
        let value = args
            .value
            .ok_or(CliError::MissingArgument {
                field: ARG_VALUE,
                env: ENV_FEEDBACK_VALUE,
            })?
            .parse::<Feedback>()?;
        Ok(Self {
            user,
            recommendation,
            value,
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
        })
    }
}

#[derive(Debug, Serialize)]
struct FeedbackResponse {
    success: bool,
}

pub(super) fn run_feedback(args: FeedbackArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let store = open_store(&config.database)?;
    let recorded = store
        .record_feedback(&config.user, config.recommendation, config.value)
        .map_err(|source| CliError::Store {
            path: config.database.clone(),
            source,
        })?;
    if !recorded {
        return Err(CliError::RecommendationNotFound {
            id: config.recommendation,
            user: config.user,
        });
    }
    log::info!(
        "recorded {} feedback on recommendation {}",
        config.value,
        config.recommendation
    );
    write_json(writer, &FeedbackResponse { success: true })
}
