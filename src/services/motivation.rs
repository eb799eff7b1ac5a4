// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Motivational insight service.
//!
//! Handles the core workflow:
//! 1. Validate the caller's stats
//! 2. Serve from cache when the month's totals are unchanged
//! 3. Build the prompt and call the generation API
//! 4. Cache the result
//!
//! Any generation failure is absorbed here and answered with the rule-based
//! fallback, so callers always get a message back.

use crate::config::AiConfig;
use crate::error::InsightError;
use crate::models::{ActivityStats, DistanceUnit, MotivationalMessage};
use crate::services::ai_client::{GenerateOptions, ResilientClient};
use crate::services::cache::MessageCache;
use crate::services::fallback::fallback_message;
use crate::services::prompt::build_prompt;
use crate::services::stats::StatsAggregator;
use chrono::NaiveDate;
use std::sync::Arc;

/// Entry point for generating motivational messages.
///
/// Built once at startup and shared through the application state.
#[derive(Clone)]
pub struct MotivationService {
    client: ResilientClient,
    cache: Arc<dyn MessageCache>,
    enabled: bool,
}

impl MotivationService {
    pub fn new(client: ResilientClient, cache: Arc<dyn MessageCache>, enabled: bool) -> Self {
        Self {
            client,
            cache,
            enabled,
        }
    }

    /// Build the service against the configured HTTP endpoint.
    pub fn from_config(config: &AiConfig, cache: Arc<dyn MessageCache>) -> anyhow::Result<Self> {
        Ok(Self::new(
            ResilientClient::from_config(config)?,
            cache,
            config.enabled,
        ))
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Produce a motivational message for a user's month.
    ///
    /// Only malformed `stats` produce an error; every generation failure is
    /// answered with the fallback message.
    pub async fn generate_motivational_message(
        &self,
        user_id: &str,
        stats: &ActivityStats,
        options: &GenerateOptions,
    ) -> Result<MotivationalMessage, InsightError> {
        stats.validate()?;

        if !self.enabled {
            tracing::debug!(user_id, "AI insights disabled, using fallback");
            return Ok(fallback_message(stats));
        }

        if !options.bypass_cache {
            if let Some(cached) = self.cache.get(user_id, stats) {
                tracing::info!(
                    user_id,
                    year = stats.year,
                    month = stats.month,
                    "Motivation cache hit"
                );
                return Ok(cached);
            }
            tracing::debug!(user_id, "Motivation cache miss");
        }

        let prompt = build_prompt(stats);

        match self.client.generate(&prompt, options).await {
            Ok(mut message) => {
                message.cached = false;
                self.cache.set(user_id, stats, message.clone());
                Ok(message)
            }
            Err(e) => {
                tracing::warn!(
                    user_id,
                    error = %e,
                    kind = e.kind(),
                    "Generation failed, using fallback message"
                );
                Ok(fallback_message(stats))
            }
        }
    }

    /// Aggregate the month containing `reference` and generate its message.
    ///
    /// Data store failures propagate; generation failures do not.
    pub async fn generate_for_month(
        &self,
        aggregator: &StatsAggregator,
        user_id: &str,
        reference: NaiveDate,
        unit: DistanceUnit,
        options: &GenerateOptions,
    ) -> Result<(ActivityStats, MotivationalMessage), InsightError> {
        let stats = aggregator.aggregate_month(user_id, reference, unit).await?;
        let message = self
            .generate_motivational_message(user_id, &stats, options)
            .await?;
        Ok((stats, message))
    }

    /// Forget every cached message for a user.
    pub fn clear_cache(&self, user_id: &str) {
        self.cache.invalidate_all(user_id);
    }
}
