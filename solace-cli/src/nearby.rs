//! `nearby` command: closest listed therapists to a position.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use solace_core::{
    NEARBY_LIMIT, NearbyQuery, NearestRanker, Ranked, TherapistDirectory, TherapistLocationRecord,
    format_distance,
};

use crate::input::{open_store, write_json};
use crate::{
    ARG_DATABASE, ARG_NEARBY_LAT, ARG_NEARBY_LIMIT, ARG_NEARBY_LNG, CliError, DEFAULT_DATABASE,
};

/// CLI arguments for the `nearby` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    name = "nearby",
    long_about = "Rank the verified therapists who are accepting clients by \
                 great-circle distance from the given position. Therapists \
                 without a published location are left out.",
    about = "List the closest therapists"
)]
#[ortho_config(prefix = "SOLACE")]
pub(crate) struct NearbyArgs {
    /// Latitude in decimal degrees.
    #[arg(long = ARG_NEARBY_LAT, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) lat: Option<String>,
    /// Longitude in decimal degrees.
    #[arg(long = ARG_NEARBY_LNG, value_name = "degrees", allow_hyphen_values = true)]
    #[serde(default)]
    pub(crate) lng: Option<String>,
    /// Path to the SQLite database.
    #[arg(long = ARG_DATABASE, value_name = "path")]
    #[serde(default)]
    pub(crate) database: Option<Utf8PathBuf>,
    /// Maximum number of therapists to return.
    #[arg(long = ARG_NEARBY_LIMIT, value_name = "count")]
    #[serde(default)]
    pub(crate) limit: Option<usize>,
}

impl NearbyArgs {
    pub(crate) fn into_config(self) -> Result<NearbyConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        NearbyConfig::try_from(merged)
    }
}

/// Resolved `nearby` command configuration.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct NearbyConfig {
    pub(crate) query: NearbyQuery,
    pub(crate) database: Utf8PathBuf,
    pub(crate) limit: usize,
}

impl TryFrom<NearbyArgs> for NearbyConfig {
    type Error = CliError;

    fn try_from(args: NearbyArgs) -> Result<Self, Self::Error> {
        let query = NearbyQuery::parse(args.lat.as_deref(), args.lng.as_deref())?;
        let limit = args.limit.unwrap_or(NEARBY_LIMIT);
        if limit == 0 {
            return Err(CliError::ZeroLimit);
        }
        Ok(Self {
            query,
            database: args
                .database
                .unwrap_or_else(|| Utf8PathBuf::from(DEFAULT_DATABASE)),
            limit,
        })
    }
}

/// One ranked therapist with a human-readable distance.
#[derive(Debug, Serialize)]
pub(crate) struct NearbyTherapist {
    #[serde(flatten)]
    pub(crate) ranked: Ranked<TherapistLocationRecord>,
    pub(crate) distance: String,
}

#[derive(Debug, Serialize)]
struct NearbyResponse {
    therapists: Vec<NearbyTherapist>,
}

pub(super) fn run_nearby(args: NearbyArgs, writer: &mut dyn Write) -> Result<(), CliError> {
    let config = args.into_config()?;
    let store = open_store(&config.database)?;
    let therapists = find_nearby(&store, &config).map_err(|source| CliError::Store {
        path: config.database.clone(),
        source,
    })?;
    write_json(writer, &NearbyResponse { therapists })
}

/// Rank the directory's candidates against the configured origin.
pub(crate) fn find_nearby<D>(
    directory: &D,
    config: &NearbyConfig,
) -> Result<Vec<NearbyTherapist>, D::Error>
where
    D: TherapistDirectory + ?Sized,
{
    let candidates = directory.nearby_candidates()?;
    log::debug!("ranking {} therapist candidates", candidates.len());
    let ranked = NearestRanker::with_limit(config.limit)
        .rank(config.query.origin(), candidates)
        .into_iter()
        .map(|ranked| NearbyTherapist {
            distance: format_distance(ranked.distance_km),
            ranked,
        })
        .collect();
    Ok(ranked)
}

#[cfg(test)]
pub(crate) fn config_from_layers_for_test(
    layers: Vec<ortho_config::MergeLayer<'static>>,
) -> Result<NearbyConfig, CliError> {
    let merged = NearbyArgs::merge_from_layers(layers).map_err(CliError::from)?;
    NearbyConfig::try_from(merged)
}
