//! Grid configuration.
//!
//! Defaults reproduce the fixed constants of the grid: 72 cards, a batch
//! checkpoint every 12, an 8 ms idle floor, a 500 ms idle wait bound and a
//! 16 ms timer fallback.

use std::time::Duration;

use serde::Deserialize;

use crate::error::ConfigError;

/// Largest accepted `max_cards`.
pub const MAX_CARDS_LIMIT: usize = 1_000_000;

/// Tunables for an [`IdleBatchRenderer`](crate::renderer::IdleBatchRenderer)
/// and the scheduling strategies that drive it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    /// Total number of cards to produce.
    pub max_cards: usize,
    /// Modulus of the per-cycle batch checkpoint.
    pub batch_size: usize,
    /// A non-forced cycle yields once remaining idle time drops below this.
    pub min_idle_budget_ms: u64,
    /// Wait bound passed to the native idle primitive.
    pub idle_timeout_ms: u64,
    /// Delay used by the timer fallback.
    pub fallback_delay_ms: u64,
    /// Image source for every card thumbnail.
    pub thumbnail_src: String,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            max_cards: 72,
            batch_size: 12,
            min_idle_budget_ms: 8,
            idle_timeout_ms: 500,
            fallback_delay_ms: 16,
            thumbnail_src: "assets/thumb.svg".to_owned(),
        }
    }
}

impl GridConfig {
    /// Parse a JSON object and validate it. Missing fields take defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Json(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check field values the renderer cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_cards > MAX_CARDS_LIMIT {
            return Err(ConfigError::InvalidField {
                field: "max_cards",
                reason: "must not exceed 1000000",
            });
        }
        if self.batch_size == 0 {
            return Err(ConfigError::InvalidField {
                field: "batch_size",
                reason: "must be at least 1",
            });
        }
        if self.thumbnail_src.trim().is_empty() {
            return Err(ConfigError::InvalidField {
                field: "thumbnail_src",
                reason: "must not be empty",
            });
        }
        Ok(())
    }

    // ── Builder Methods ────────────────────────────────────────────────

    #[must_use]
    pub fn max_cards(mut self, max_cards: usize) -> Self {
        self.max_cards = max_cards;
        self
    }

    #[must_use]
    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    #[must_use]
    pub fn thumbnail_src(mut self, src: impl Into<String>) -> Self {
        self.thumbnail_src = src.into();
        self
    }

    // ── Durations ──────────────────────────────────────────────────────

    #[must_use]
    pub fn min_idle_budget(&self) -> Duration {
        Duration::from_millis(self.min_idle_budget_ms)
    }

    #[must_use]
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_millis(self.idle_timeout_ms)
    }

    #[must_use]
    pub fn fallback_delay(&self) -> Duration {
        Duration::from_millis(self.fallback_delay_ms)
    }
}
