//! `recommend` command: generate and store a user's recommendation set.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use solace_core::{
    MoodLog, MoodSummary, OnboardingAnswers, RecommendationRequest, StoredRecommendation,
};
use solace_data::{
    FoursquareConfig, OpenAiConfig, RecommendationPipeline, SpotifyConfig, SpotifyCredentials,
};

use crate::input::{open_store, read_json, write_json};
use crate::{
    ARG_DATABASE, ARG_FOURSQUARE_API_KEY, ARG_MOODS, ARG_NEAR, ARG_ONBOARDING, ARG_OPENAI_API_KEY,
    ARG_OPENAI_MODEL, ARG_SPOTIFY_CLIENT_ID, ARG_SPOTIFY_CLIENT_SECRET, ARG_USER, CliError,
    DEFAULT_DATABASE, ENV_RECOMMEND_USER,
};

/// CLI arguments for the `recommend` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "recommend",
    long_about = "Query the music, places and text-generation services for \
                 suggestions matching the user's recent moods and onboarding \
                 answers, backfill any missing category and replace the \
                 user's stored set. Services without credentials are skipped.",
    about = "Generate recommendations for a user"
)]
#[ortho_config(prefix = "SOLACE")]
pub(crate) struct RecommendArgs {
    /// Identifier of the user receiving the recommendations.
    #[arg(long = ARG_USER, value_name = "id")]
    #[serde(default)]
    pub(crate) user: Option<String>,
    /// Path to a JSON array of recent mood logs.
    #[arg(long = ARG_MOODS, value_name = "path")]
    #[serde(default)]
    pub(crate) moods: Option<Utf8PathBuf>,
    /// Path to a JSON object holding the onboarding answers.
    #[arg(long = ARG_ONBOARDING, value_name = "path")]
    #[serde(default)]
    pub(crate) onboarding: Option<Utf8PathBuf>,
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Spotify application client id.
    #[arg(long = ARG_SPOTIFY_CLIENT_ID, value_name = "id")]
    #[serde(default)]
    pub(crate) spotify_client_id: Option<String>,
    /// Spotify application client secret.
    #[arg(long = ARG_SPOTIFY_CLIENT_SECRET, value_name = "secret")]
    #[serde(default)]
    pub(crate) spotify_client_secret: Option<String>,
    /// Foursquare Places API key.
    #[arg(long = ARG_FOURSQUARE_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) foursquare_api_key: Option<String>,
    /// Locality searched for places (e.g. "San Francisco, CA").
    #[arg(long = ARG_NEAR, value_name = "locality")]
    #[serde(default)]
    pub(crate) near: Option<String>,
    /// API key for the OpenAI-compatible text-generation service.
    #[arg(long = ARG_OPENAI_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) openai_api_key: Option<String>,
    /// Model used for text generation.
    #[arg(long = ARG_OPENAI_MODEL, value_name = "model")]
    #[serde(default)]
    pub(crate) openai_model: Option<String>,
}

impl RecommendArgs {
    pub(crate) fn into_config(self) -> Result<RecommendConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        RecommendConfig::try_from(merged)
    }
}

/// Resolved `recommend` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct RecommendConfig {
    pub(crate) user: String,
    pub(crate) moods: Option<Utf8PathBuf>,
    pub(crate) onboarding: Option<Utf8PathBuf>,
    pub(crate) database: Utf8PathBuf,
    pub(crate) spotify: SpotifyConfig,
    pub(crate) foursquare: FoursquareConfig,
    pub(crate) openai: OpenAiConfig,
}

impl TryFrom<RecommendArgs> for RecommendConfig {
    type Error = CliError;

    fn try_from(args: RecommendArgs) -> Result<Self, Self::Error> {
        let user = args
            .user
            .filter(|user| !user.trim().is_empty())
            .ok_or(CliError::MissingArgument {
                field: ARG_USER,
                env: ENV_RECOMMEND_USER,
            })?;

        let credentials = match (args.spotify_client_id, args.spotify_client_secret) {
            (Some(id), Some(secret)) => Some(SpotifyCredentials::new(id, secret)),
            (None, None) => None,
            _ => {
                log::warn!(
                    "ignoring Spotify credentials: both --{ARG_SPOTIFY_CLIENT_ID} and \
                     --{ARG_SPOTIFY_CLIENT_SECRET} are required"
                );
                None
            }
        };
        let mut foursquare = FoursquareConfig::new(args.foursquare_api_key);
        if let Some(near) = args.near {
            foursquare = foursquare.with_near(near);
        }
        let mut openai = OpenAiConfig::new(args.openai_api_key);
        if let Some(model) = args.openai_model {
            openai = openai.with_model(model);
        }

        Ok(Self {
            user,
            moods: args.moods,
            onboarding: args.onboarding,
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            spotify: SpotifyConfig::new(credentials),
            foursquare,
            openai,
        })
    }
}

/// Builds the generation pipeline for the current invocation.
pub(super) trait PipelineBuilder {
    fn build(&self, config: &RecommendConfig) -> Result<RecommendationPipeline, CliError>;
}

pub(super) struct DefaultPipelineBuilder;

impl PipelineBuilder for DefaultPipelineBuilder {
    fn build(&self, config: &RecommendConfig) -> Result<RecommendationPipeline, CliError> {
        RecommendationPipeline::from_providers(
            config.spotify.clone(),
            config.foursquare.clone(),
            config.openai.clone(),
        )
        .map_err(|source| CliError::BuildClient {
            client: "recommendation",
            source,
        })
    }
}

#[derive(Debug, Serialize)]
struct RecommendResponse<'a> {
    success: bool,
    count: usize,
    recommendations: &'a [StoredRecommendation],
}

pub(super) fn run_recommend_with(
    args: RecommendArgs,
    builder: &dyn PipelineBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let request = load_request(&config)?;
    let pipeline = builder.build(&config)?;
    let store = open_store(&config.database)?;
    let outcome = pipeline
        .generate_and_store(&store, &config.user, &request)
        .map_err(|source| CliError::Store {
            path: config.database.clone(),
            source,
        })?;
    write_json(
        writer,
        &RecommendResponse {
            success: true,
            count: outcome.stored.len(),
            recommendations: &outcome.stored,
        },
    )
}

/// Assemble the request from the optional mood and onboarding files.
pub(crate) fn load_request(config: &RecommendConfig) -> Result<RecommendationRequest, CliError> {
    let logs: Vec<MoodLog> = match &config.moods {
        Some(path) => read_json(path, ARG_MOODS)?,
        None => Vec::new(),
    };
    let onboarding: OnboardingAnswers = match &config.onboarding {
        Some(path) => read_json(path, ARG_ONBOARDING)?,
        None => OnboardingAnswers::default(),
    };
    Ok(RecommendationRequest::new(
        MoodSummary::from_logs(&logs),
        onboarding,
    ))
}
