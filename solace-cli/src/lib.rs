//! Command-line interface for the Solace recommendation engine.
//!
//! Each subcommand layers its options from CLI flags, configuration files
//! and `SOLACE_CMDS_<COMMAND>_<FIELD>` environment variables, resolves them
//! into a validated configuration and writes JSON to standard output.
#![forbid(unsafe_code)]

use std::io::Write;

use clap::{Parser, Subcommand};

mod error;
mod feedback;
mod goals;
mod import;
mod input;
mod nearby;
mod recommend;

pub use error::CliError;

use feedback::FeedbackArgs;
use goals::{DefaultGeneratorBuilder, GoalsArgs};
use import::ImportArgs;
use nearby::NearbyArgs;
use recommend::{DefaultPipelineBuilder, RecommendArgs};

pub(crate) const ARG_DATABASE: &str = "database";
pub(crate) const DEFAULT_DATABASE: &str = "solace.db";

pub(crate) const ARG_NEARBY_LAT: &str = "lat";
pub(crate) const ARG_NEARBY_LNG: &str = "lng";
pub(crate) const ARG_NEARBY_LIMIT: &str = "limit";

pub(crate) const ARG_USER: &str = "user";
pub(crate) const ARG_MOODS: &str = "moods";
pub(crate) const ARG_ONBOARDING: &str = "onboarding";
pub(crate) const ARG_NEAR: &str = "near";
pub(crate) const ARG_SPOTIFY_CLIENT_ID: &str = "spotify-client-id";
pub(crate) const ARG_SPOTIFY_CLIENT_SECRET: &str = "spotify-client-secret";
pub(crate) const ARG_FOURSQUARE_API_KEY: &str = "foursquare-api-key";
pub(crate) const ARG_OPENAI_API_KEY: &str = "openai-api-key";
pub(crate) const ARG_OPENAI_MODEL: &str = "openai-model";
pub(crate) const ENV_RECOMMEND_USER: &str = "SOLACE_CMDS_RECOMMEND_USER";

pub(crate) const ARG_RECOMMENDATION: &str = "recommendation";
pub(crate) const ARG_VALUE: &str = "value";
pub(crate) const ENV_FEEDBACK_USER: &str = "SOLACE_CMDS_FEEDBACK_USER";
pub(crate) const ENV_FEEDBACK_RECOMMENDATION: &str = "SOLACE_CMDS_FEEDBACK_RECOMMENDATION";
pub(crate) const ENV_FEEDBACK_VALUE: &str = "SOLACE_CMDS_FEEDBACK_VALUE";

pub(crate) const ARG_ROSTER: &str = "roster";
pub(crate) const ENV_IMPORT_ROSTER: &str = "SOLACE_CMDS_IMPORT_THERAPISTS_ROSTER";

pub(crate) const ENV_GOALS_MOODS: &str = "SOLACE_CMDS_GOALS_MOODS";

/// Run the Solace CLI with the current process arguments and environment.
///
/// # Errors
///
/// Returns [`CliError`] when arguments are invalid, configuration cannot be
/// resolved or the selected command fails.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    let mut stdout = std::io::stdout().lock();
    dispatch(cli.command, &mut stdout)
}

fn dispatch(command: Command, writer: &mut dyn Write) -> Result<(), CliError> {
    match command {
        Command::Nearby(args) => nearby::run_nearby(args, writer),
        Command::Recommend(args) => {
            recommend::run_recommend_with(args, &DefaultPipelineBuilder, writer)
        }
        Command::Feedback(args) => feedback::run_feedback(args, writer),
        Command::ImportTherapists(args) => import::run_import(args, writer),
        Command::Goals(args) => {
            goals::run_goals_with(args, &DefaultGeneratorBuilder, writer)
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "solace",
    about = "Mental wellness recommendations and therapist discovery",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List the closest verified therapists accepting clients.
    Nearby(NearbyArgs),
    /// Generate and store a fresh recommendation set for a user.
    Recommend(RecommendArgs),
    /// Record a user's feedback on one of their recommendations.
    Feedback(FeedbackArgs),
    /// Load a therapist roster from JSON into the database.
    ImportTherapists(ImportArgs),
    /// Suggest wellness goals from recent mood logs.
    Goals(GoalsArgs),
}

#[cfg(test)]
mod tests;
