//! `goals` command: wellness goals suggested from mood history.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use solace_core::{MoodLog, TextGenerator};
use solace_data::{OpenAiConfig, OpenAiTextGenerator, WellnessGoal, suggest_wellness_goals};

use crate::input::{read_json, write_json};
use crate::{ARG_MOODS, ARG_OPENAI_API_KEY, ARG_OPENAI_MODEL, CliError, ENV_GOALS_MOODS};

/// CLI arguments for the `goals` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "goals",
    long_about = "Ask the text-generation service for up to three wellness \
                 goals based on the most recent mood logs. An empty list is \
                 printed when the service is unavailable.",
    about = "Suggest wellness goals"
)]
#[ortho_config(prefix = "SOLACE")]
pub(crate) struct GoalsArgs {
    /// Path to a JSON array of recent mood logs, newest first.
    #[arg(long = ARG_MOODS, value_name = "path")]
    #[serde(default)]
    pub(crate) moods: Option<Utf8PathBuf>,
    /// API key for the OpenAI-compatible text-generation service.
    #[arg(long = ARG_OPENAI_API_KEY, value_name = "key")]
    #[serde(default)]
    pub(crate) openai_api_key: Option<String>,
    /// Model used for text generation.
    #[arg(long = ARG_OPENAI_MODEL, value_name = "model")]
    #[serde(default)]
    pub(crate) openai_model: Option<String>,
}

impl GoalsArgs {
    pub(crate) fn into_config(self) -> Result<GoalsConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        GoalsConfig::try_from(merged)
    }
}

/// Resolved `goals` command configuration.
#[derive(Debug, Clone)]
pub(crate) struct GoalsConfig {
    pub(crate) moods: Utf8PathBuf,
    pub(crate) openai: OpenAiConfig,
}

impl TryFrom<GoalsArgs> for GoalsConfig {
    type Error = CliError;

    fn try_from(args: GoalsArgs) -> Result<Self, Self::Error> {
        let moods = args.moods.ok_or(CliError::MissingArgument {
            field: ARG_MOODS,
            env: ENV_GOALS_MOODS,
        })?;
        let mut openai = OpenAiConfig::new(args.openai_api_key);
        if let Some(model) = args.openai_model {
            openai = openai.with_model(model);
        }
        Ok(Self { moods, openai })
    }
}

/// Builds the text generator for the current invocation.
pub(super) trait GeneratorBuilder {
    fn build(&self, config: &GoalsConfig) -> Result<Box<dyn TextGenerator>, CliError>;
}

pub(super) struct DefaultGeneratorBuilder;

impl GeneratorBuilder for DefaultGeneratorBuilder {
    fn build(&self, config: &GoalsConfig) -> Result<Box<dyn TextGenerator>, CliError> {
        let generator = OpenAiTextGenerator::new(config.openai.clone()).map_err(|source| {
            CliError::BuildClient {
                client: "text generation",
                source,
            }
        })?;
        Ok(Box::new(generator))
    }
}

#[derive(Debug, Serialize)]
struct GoalsResponse {
    goals: Vec<WellnessGoal>,
}

pub(super) fn run_goals_with(
    args: GoalsArgs,
    builder: &dyn GeneratorBuilder,
    writer: &mut dyn Write,
) -> Result<(), CliError> {
    let config = args.into_config()?;
    let logs: Vec<MoodLog> = read_json(&config.moods, ARG_MOODS)?;
    let generator = builder.build(&config)?;
    let goals = suggest_wellness_goals(generator.as_ref(), &logs);
    write_json(writer, &GoalsResponse { goals })
}
