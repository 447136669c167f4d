//! Plot Route
//!
//! The query entry point: runs the windowed query, renders the chart, and
//! publishes it into the monitored container under the fixed artifact key.
//!
//! - GET /api/v1/plot?bucket=<container>&window=<spec>

use axum::{
    extract::{Query, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::{PlotParams, PlotResponse};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::{ApiConfig, AppState};
use crate::artifact::CHART_KEY;
use crate::chart;
use crate::query::WindowQuery;

/// Parameters after resolution against configured defaults
///
/// Produced in full before any component logic runs; request parameters
/// take precedence over configured defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ResolvedParams {
    bucket: String,
    window_seconds: u64,
}

/// GET /api/v1/plot
///
/// Chart the trailing window for one container and publish the artifact.
pub async fn render_plot(
    State(state): State<Arc<AppState>>,
    Query(params): Query<PlotParams>,
) -> ApiResult<Json<PlotResponse>> {
    let resolved = resolve_params(&state.config, &params)?;

    let query = WindowQuery::new(Arc::clone(&state.samples));
    let result = query.query(&resolved.bucket, resolved.window_seconds).await?;

    let image = chart::render(&result.points, result.historical_high);
    state.publisher.publish(&resolved.bucket, image).await?;

    Ok(Json(PlotResponse {
        bucket: resolved.bucket,
        s3_key: CHART_KEY.to_string(),
        window_seconds: resolved.window_seconds,
        num_points: result.points.len(),
        historical_high: result.historical_high,
    }))
}

/// Resolve request parameters against configured defaults
///
/// Fails fast on a missing bucket: no store access has happened yet.
fn resolve_params(config: &ApiConfig, params: &PlotParams) -> ApiResult<ResolvedParams> {
    let bucket = params
        .bucket
        .clone()
        .or_else(|| config.default_bucket.clone())
        .ok_or_else(|| {
            ApiError::Validation(
                "Bucket not provided. Pass ?bucket= or configure a default".to_string(),
            )
        })?;

    let window_seconds = match &params.window {
        Some(spec) => crate::query::parse_window(spec).ok_or_else(|| {
            ApiError::Validation(format!(
                "Cannot parse window: {}. Use seconds or Ns/Nm/Nh",
                spec
            ))
        })?,
        None => config.default_window_seconds,
    };

    Ok(ResolvedParams {
        bucket,
        window_seconds,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(bucket: Option<&str>, window: u64) -> ApiConfig {
        ApiConfig {
            default_bucket: bucket.map(String::from),
            default_window_seconds: window,
            ..Default::default()
        }
    }

    #[test]
    fn test_bad_window_spec_is_validation_error() {
        let config = config_with(Some("b"), 10);
        let params = PlotParams {
            bucket: None,
            window: Some("5d".to_string()),
        };
        let err = resolve_params(&config, &params).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn test_request_param_overrides_default() {
        let config = config_with(Some("default-bucket"), 10);
        let params = PlotParams {
            bucket: Some("explicit".to_string()),
            window: Some("1m".to_string()),
        };

        let resolved = resolve_params(&config, &params).unwrap();
        assert_eq!(resolved.bucket, "explicit");
        assert_eq!(resolved.window_seconds, 60);
    }

    #[test]
    fn test_defaults_fill_missing_params() {
        let config = config_with(Some("default-bucket"), 10);
        let resolved = resolve_params(&config, &PlotParams::default()).unwrap();
        assert_eq!(resolved.bucket, "default-bucket");
        assert_eq!(resolved.window_seconds, 10);
    }

    #[test]
    fn test_missing_bucket_fails_fast() {
        let config = config_with(None, 10);
        let err = resolve_params(&config, &PlotParams::default()).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
