// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::stats::{MAX_YEAR, MIN_YEAR};
use crate::models::{ActivityStats, DistanceUnit, MotivationalMessage};
use crate::services::GenerateOptions;
use crate::AppState;
use axum::{
    extract::{Query, State},
    routing::{delete, get},
    Extension, Json, Router,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

const MAX_MODEL_NAME_LEN: usize = 100;
const MAX_TOKENS_LIMIT: u32 = 1000;
const MAX_TEMPERATURE: f32 = 2.0;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/motivation", get(get_motivation))
        .route("/api/motivation/cache", delete(clear_motivation_cache))
        .route("/api/stats/monthly", get(get_monthly_stats))
}

// ─── Query Parsing ───────────────────────────────────────────

#[derive(Deserialize)]
struct MonthQuery {
    /// Calendar year (defaults to the current year)
    year: Option<i32>,
    /// Month 1-12 (defaults to the current month)
    month: Option<u32>,
    /// "km" or "mi" (defaults to km)
    unit: Option<String>,
}

#[derive(Deserialize)]
struct MotivationQuery {
    year: Option<i32>,
    month: Option<u32>,
    unit: Option<String>,
    #[serde(default)]
    bypass_cache: bool,
    model: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
}

/// First day of the requested month, defaulting to the current UTC month.
fn resolve_reference(year: Option<i32>, month: Option<u32>) -> Result<NaiveDate> {
    let today = Utc::now().date_naive();
    let year = year.unwrap_or(today.year());
    let month = month.unwrap_or(today.month());

    if !(MIN_YEAR..=MAX_YEAR).contains(&year) {
        return Err(AppError::BadRequest(format!(
            "Invalid 'year' parameter: must be between {} and {}",
            MIN_YEAR, MAX_YEAR
        )));
    }

    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        AppError::BadRequest("Invalid 'month' parameter: must be between 1 and 12".to_string())
    })
}

fn parse_unit(unit: Option<&str>) -> Result<DistanceUnit> {
    unit.map(|raw| {
        raw.parse::<DistanceUnit>()
            .map_err(|_| AppError::BadRequest("Invalid 'unit' parameter: use km or mi".to_string()))
    })
    .transpose()
    .map(Option::unwrap_or_default)
}

fn parse_options(params: &MotivationQuery) -> Result<GenerateOptions> {
    if let Some(model) = &params.model {
        if model.trim().is_empty() || model.len() > MAX_MODEL_NAME_LEN {
            return Err(AppError::BadRequest("Invalid 'model' parameter".to_string()));
        }
    }

    if let Some(t) = params.temperature {
        if !(0.0..=MAX_TEMPERATURE).contains(&t) {
            return Err(AppError::BadRequest(format!(
                "Invalid 'temperature' parameter: must be between 0 and {}",
                MAX_TEMPERATURE
            )));
        }
    }

    if let Some(n) = params.max_tokens {
        if n == 0 || n > MAX_TOKENS_LIMIT {
            return Err(AppError::BadRequest(format!(
                "Invalid 'max_tokens' parameter: must be between 1 and {}",
                MAX_TOKENS_LIMIT
            )));
        }
    }

    Ok(GenerateOptions {
        model: params.model.clone(),
        temperature: params.temperature,
        max_tokens: params.max_tokens,
        bypass_cache: params.bypass_cache,
    })
}

// ─── Motivation ──────────────────────────────────────────────

/// Monthly stats together with the message generated for them.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MotivationResponse {
    pub stats: ActivityStats,
    pub insight: MotivationalMessage,
}

/// Get the motivational message for a month.
async fn get_motivation(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<MotivationQuery>,
) -> Result<Json<MotivationResponse>> {
    let reference = resolve_reference(params.year, params.month)?;
    let unit = parse_unit(params.unit.as_deref())?;
    let options = parse_options(&params)?;

    tracing::debug!(
        user_id = %user.user_id,
        month = %reference.format("%Y-%m"),
        bypass_cache = options.bypass_cache,
        "Fetching motivation"
    );

    let (stats, insight) = state
        .motivation_service
        .generate_for_month(
            &state.stats_aggregator,
            &user.user_id,
            reference,
            unit,
            &options,
        )
        .await?;

    Ok(Json(MotivationResponse { stats, insight }))
}

/// Response for cache clearing.
#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct ClearCacheResponse {
    pub success: bool,
}

/// Drop the caller's cached messages (e.g. after editing activities).
async fn clear_motivation_cache(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Json<ClearCacheResponse> {
    state.motivation_service.clear_cache(&user.user_id);
    tracing::info!(user_id = %user.user_id, "Motivation cache cleared");
    Json(ClearCacheResponse { success: true })
}

// ─── Stats ───────────────────────────────────────────────────

/// Get aggregated stats for a month.
async fn get_monthly_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<MonthQuery>,
) -> Result<Json<ActivityStats>> {
    let reference = resolve_reference(params.year, params.month)?;
    let unit = parse_unit(params.unit.as_deref())?;

    let stats = state
        .stats_aggregator
        .aggregate_month(&user.user_id, reference, unit)
        .await?;

    Ok(Json(stats))
}
