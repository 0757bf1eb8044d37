use crate::engine::SearchError;
use serde::Deserialize;
use std::time::Duration;

/// Tuning and budget of a search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MctsConfig {
    /// Weight of the prior-driven exploration term.
    pub exploration_constant: f32,
    /// Penalty added to an edge while a selected path through it is pending.
    pub virtual_loss: f32,
    /// States whose square-rooted visit total is below this pick a uniformly
    /// random action.
    pub epsilon: f32,
    /// Paths selected per iteration. Their leaves share one oracle batch.
    pub leaves_per_iteration: usize,
    /// Iterations a single `solve` call may run.
    pub max_iterations: Option<u64>,
    /// Wall-clock seconds a single `solve` call may run.
    pub time_limit_secs: Option<f64>,
    /// Nodes the search tree may hold.
    pub max_nodes: Option<usize>,
    /// Allowed deviation of an oracle policy row's sum from one.
    pub policy_tolerance: f32,
    /// States expanded per batch by the fallback search.
    pub fallback_batch_size: usize,
    /// Seed of the tie-breaking random generator. Random when absent.
    pub seed: Option<u64>,
}

impl Default for MctsConfig {
    fn default() -> Self {
        Self {
            exploration_constant: 100.0,
            virtual_loss: 100.0,
            epsilon: 1e-6,
            leaves_per_iteration: 1,
            max_iterations: None,
            time_limit_secs: None,
            max_nodes: None,
            policy_tolerance: 1e-4,
            fallback_batch_size: 1000,
            seed: None,
        }
    }
}

impl MctsConfig {
    #[must_use]
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    #[must_use]
    pub fn with_time_limit(mut self, time_limit: Duration) -> Self {
        self.time_limit_secs = Some(time_limit.as_secs_f64());
        self
    }

    #[must_use]
    pub fn with_max_nodes(mut self, max_nodes: usize) -> Self {
        self.max_nodes = Some(max_nodes);
        self
    }

    #[must_use]
    pub fn with_leaves_per_iteration(mut self, leaves_per_iteration: usize) -> Self {
        self.leaves_per_iteration = leaves_per_iteration;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// The wall-clock budget. Limits beyond what a `Duration` can hold
    /// saturate to `Duration::MAX`.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs
            .map(|secs| Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX))
    }

    /// Check that every parameter is usable.
    ///
    /// # Errors
    ///
    /// `SearchError::InvalidConfig` naming the first offending parameter.
    pub fn validate(&self) -> Result<(), SearchError> {
        let invalid = |msg| Err(SearchError::InvalidConfig { msg });
        if !(self.exploration_constant.is_finite() && self.exploration_constant >= 0.0) {
            return invalid("exploration_constant must be finite and >= 0");
        }
        if !(self.virtual_loss.is_finite() && self.virtual_loss >= 0.0) {
            return invalid("virtual_loss must be finite and >= 0");
        }
        if !(self.epsilon.is_finite() && self.epsilon >= 0.0) {
            return invalid("epsilon must be finite and >= 0");
        }
        if self.leaves_per_iteration == 0 {
            return invalid("leaves_per_iteration must be > 0");
        }
        if self
            .time_limit_secs
            .is_some_and(|secs| !(secs.is_finite() && secs >= 0.0))
        {
            return invalid("time_limit_secs must be finite and >= 0");
        }
        if self.max_nodes == Some(0) {
            return invalid("max_nodes must be > 0");
        }
        if !(self.policy_tolerance.is_finite() && self.policy_tolerance >= 0.0) {
            return invalid("policy_tolerance must be finite and >= 0");
        }
        if self.fallback_batch_size == 0 {
            return invalid("fallback_batch_size must be > 0");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(MctsConfig::default().validate().is_ok());
    }

    #[test]
    fn invalid_parameters() {
        let configs = [
            MctsConfig {
                exploration_constant: f32::NAN,
                ..MctsConfig::default()
            },
            MctsConfig {
                virtual_loss: -1.0,
                ..MctsConfig::default()
            },
            MctsConfig::default().with_leaves_per_iteration(0),
            MctsConfig::default().with_max_nodes(0),
            MctsConfig {
                time_limit_secs: Some(f64::INFINITY),
                ..MctsConfig::default()
            },
            MctsConfig {
                fallback_batch_size: 0,
                ..MctsConfig::default()
            },
        ];
        for config in configs {
            assert!(
                matches!(config.validate(), Err(SearchError::InvalidConfig { .. })),
                "{config:?}"
            );
        }
    }

    #[test]
    fn partial_toml() {
        let config: MctsConfig = toml::from_str(
            r"
            exploration_constant = 4.0
            max_iterations = 500
            seed = 9
            ",
        )
        .unwrap();
        assert_eq!(
            config,
            MctsConfig {
                exploration_constant: 4.0,
                ..MctsConfig::default()
                    .with_max_iterations(500)
                    .with_seed(9)
            }
        );
        assert!(toml::from_str::<MctsConfig>("unknown = 1").is_err());
    }

    #[test]
    fn huge_time_limits_saturate() {
        let config = MctsConfig::default().with_time_limit(Duration::MAX);
        assert!(config.validate().is_ok());
        assert_eq!(config.time_limit(), Some(Duration::MAX));

        let config: MctsConfig = toml::from_str("time_limit_secs = 1e30").unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.time_limit(), Some(Duration::MAX));

        let config = MctsConfig::default().with_time_limit(Duration::from_millis(1500));
        assert_eq!(config.time_limit(), Some(Duration::from_millis(1500)));
    }
}
