use meta_profile::assessment::{FactorCatalog, ProfilingEngine, SchoolLevel, FACTOR_COUNT};
use meta_profile::config::AppConfig;
use meta_profile::error::AppError;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Builds the engine from the configured store and deviation count.
pub(crate) fn engine_from_config(config: &AppConfig) -> Result<ProfilingEngine, AppError> {
    let store = config.profiles.load()?;
    Ok(
        ProfilingEngine::new(Arc::new(FactorCatalog::standard()), Arc::new(store))
            .with_deviation_top_n(config.analysis.deviation_top_n),
    )
}

pub(crate) fn parse_level(raw: &str) -> Result<SchoolLevel, String> {
    raw.parse::<SchoolLevel>().map_err(|err| err.to_string())
}

/// A full T-score vector given on the command line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScoreVector(pub(crate) Vec<f64>);

/// Parses a comma separated list of exactly one T-score per factor.
pub(crate) fn parse_scores(raw: &str) -> Result<ScoreVector, String> {
    let scores = raw
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| {
            value
                .parse::<f64>()
                .map_err(|err| format!("failed to parse '{value}' as a T-score ({err})"))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if scores.len() != FACTOR_COUNT {
        return Err(format!(
            "expected {FACTOR_COUNT} comma separated scores, got {}",
            scores.len()
        ));
    }
    Ok(ScoreVector(scores))
}
