//! Configuration for the graph renderer.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{GraphError, Result};
use crate::layout::DEFAULT_MIN_DIMENSION;
use crate::render::transition::Easing;

/// Renderer configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    /// Duration shared by every enter/update/exit transition.
    #[serde(with = "duration_millis", default = "default_transition")]
    pub transition: Duration,

    /// Grace period before a tooltip hides after the pointer leaves.
    #[serde(with = "duration_millis", default = "default_hide_delay")]
    pub hide_delay: Duration,

    /// Easing applied to every transition.
    #[serde(default)]
    pub easing: Easing,

    /// Circle radius of a visible node.
    #[serde(default = "default_node_radius")]
    pub node_radius: f64,

    /// Horizontal offset of the whole drawing inside the container.
    #[serde(default = "default_margin_left")]
    pub margin_left: f64,

    /// Smallest container width/height accepted by the layout.
    #[serde(default = "default_min_dimension")]
    pub min_dimension: f64,

    /// Points per connector when a host asks for sampled curves.
    #[serde(default = "default_curve_samples")]
    pub curve_samples: usize,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            transition: default_transition(),
            hide_delay: default_hide_delay(),
            easing: Easing::default(),
            node_radius: default_node_radius(),
            margin_left: default_margin_left(),
            min_dimension: default_min_dimension(),
            curve_samples: default_curve_samples(),
        }
    }
}

impl GraphConfig {
    /// Set the transition duration.
    #[must_use]
    pub const fn transition(mut self, duration: Duration) -> Self {
        self.transition = duration;
        self
    }

    /// Set the tooltip hide delay.
    #[must_use]
    pub const fn hide_delay(mut self, delay: Duration) -> Self {
        self.hide_delay = delay;
        self
    }

    /// Set the easing.
    #[must_use]
    pub const fn easing(mut self, easing: Easing) -> Self {
        self.easing = easing;
        self
    }

    /// Set the node radius.
    #[must_use]
    pub const fn node_radius(mut self, radius: f64) -> Self {
        self.node_radius = radius;
        self
    }

    /// Set the left margin.
    #[must_use]
    pub const fn margin_left(mut self, margin: f64) -> Self {
        self.margin_left = margin;
        self
    }

    /// Set how many points a connector is flattened into.
    #[must_use]
    pub const fn curve_samples(mut self, samples: usize) -> Self {
        self.curve_samples = samples;
        self
    }

    /// Set the minimum container dimension.
    #[must_use]
    pub const fn min_dimension(mut self, floor: f64) -> Self {
        self.min_dimension = floor;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Unparseable values are ignored and the default is kept.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration from `ETS_GRAPH_*` variables resolved by `lookup`.
    #[must_use]
    pub fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(ms) = parse_var::<u64>(&lookup, "ETS_GRAPH_TRANSITION_MS") {
            config.transition = Duration::from_millis(ms);
        }

        if let Some(ms) = parse_var::<u64>(&lookup, "ETS_GRAPH_HIDE_DELAY_MS") {
            config.hide_delay = Duration::from_millis(ms);
        }

        if let Some(margin) = parse_var::<f64>(&lookup, "ETS_GRAPH_MARGIN_LEFT") {
            config.margin_left = margin;
        }

        if let Some(samples) = parse_var::<usize>(&lookup, "ETS_GRAPH_CURVE_SAMPLES") {
            config.curve_samples = samples;
        }

        config
    }

    /// Load configuration from a file.
    ///
    /// `.json` files are parsed as JSON, anything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::Io` if the file cannot be read,
    /// `GraphError::JsonParseFailed` / `GraphError::ConfigInvalid` if it cannot
    /// be parsed, and any error from [`GraphConfig::validate`].
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Self = if path.extension().is_some_and(|e| e == "json") {
            serde_json::from_str(&content)?
        } else {
            toml::from_str(&content)
                .map_err(|e| GraphError::config_invalid(format!("Failed to parse config: {e}")))?
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks that every numeric setting is usable.
    ///
    /// # Errors
    ///
    /// Returns `GraphError::ConfigInvalid` naming the first bad setting.
    pub fn validate(&self) -> Result<()> {
        if !self.node_radius.is_finite() || self.node_radius <= 0.0 {
            return Err(GraphError::config_invalid(format!(
                "node_radius must be positive, got {}",
                self.node_radius
            )));
        }
        if !self.margin_left.is_finite() {
            return Err(GraphError::config_invalid("margin_left must be finite"));
        }
        if !self.min_dimension.is_finite() || self.min_dimension <= 0.0 {
            return Err(GraphError::config_invalid(format!(
                "min_dimension must be positive, got {}",
                self.min_dimension
            )));
        }
        if self.curve_samples < 2 {
            return Err(GraphError::config_invalid("curve_samples must be at least 2"));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    lookup(key).and_then(|value| value.trim().parse().ok())
}

const fn default_transition() -> Duration {
    Duration::from_millis(200)
}

const fn default_hide_delay() -> Duration {
    Duration::from_millis(150)
}

const fn default_node_radius() -> f64 {
    8.0
}

const fn default_margin_left() -> f64 {
    50.0
}

const fn default_min_dimension() -> f64 {
    DEFAULT_MIN_DIMENSION
}

const fn default_curve_samples() -> usize {
    20
}

/// Serialization helper for Duration as milliseconds.
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        u64::try_from(duration.as_millis())
            .unwrap_or(u64::MAX)
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let millis = u64::deserialize(deserializer)?;
        Ok(Duration::from_millis(millis))
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use std::collections::HashMap;

    use super::*;

    #[test]
    fn test_default_config() {
        let config = GraphConfig::default();
        assert_eq!(config.transition, Duration::from_millis(200));
        assert_eq!(config.hide_delay, Duration::from_millis(150));
        assert_eq!(config.easing, Easing::CubicInOut);
        assert!((config.node_radius - 8.0).abs() < f64::EPSILON);
        assert!((config.margin_left - 50.0).abs() < f64::EPSILON);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_builder() {
        let config = GraphConfig::default()
            .transition(Duration::from_millis(500))
            .hide_delay(Duration::from_millis(50))
            .easing(Easing::Linear)
            .node_radius(4.0)
            .margin_left(0.0)
            .min_dimension(10.0);

        assert_eq!(config.transition, Duration::from_millis(500));
        assert_eq!(config.hide_delay, Duration::from_millis(50));
        assert_eq!(config.easing, Easing::Linear);
        assert!((config.node_radius - 4.0).abs() < f64::EPSILON);
        assert!((config.min_dimension - 10.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: GraphConfig = serde_json::from_str(r#"{"transition": 750}"#).unwrap();
        assert_eq!(config.transition, Duration::from_millis(750));
        assert_eq!(config.hide_delay, Duration::from_millis(150));
    }

    #[test]
    fn test_toml_config() {
        let config: GraphConfig =
            toml::from_str("hide_delay = 300\neasing = \"linear\"\nmargin_left = 20.0\n").unwrap();
        assert_eq!(config.hide_delay, Duration::from_millis(300));
        assert_eq!(config.easing, Easing::Linear);
        assert!((config.margin_left - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(GraphConfig::default().node_radius(0.0).validate().is_err());
        assert!(GraphConfig::default().min_dimension(f64::NAN).validate().is_err());
        assert!(GraphConfig::default().margin_left(f64::INFINITY).validate().is_err());

        let config = GraphConfig {
            curve_samples: 1,
            ..GraphConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(GraphError::ConfigInvalid { .. })
        ));
    }

    #[test]
    fn test_from_vars_overrides_defaults() {
        let vars: HashMap<&str, &str> = HashMap::from([
            ("ETS_GRAPH_TRANSITION_MS", "400"),
            ("ETS_GRAPH_HIDE_DELAY_MS", " 75 "),
            ("ETS_GRAPH_MARGIN_LEFT", "12.5"),
            ("ETS_GRAPH_CURVE_SAMPLES", "32"),
        ]);
        let config = GraphConfig::from_vars(|key| vars.get(key).map(ToString::to_string));

        assert_eq!(config.transition, Duration::from_millis(400));
        assert_eq!(config.hide_delay, Duration::from_millis(75));
        assert!((config.margin_left - 12.5).abs() < f64::EPSILON);
        assert_eq!(config.curve_samples, 32);
        assert_eq!(config.easing, Easing::CubicInOut);
    }

    #[test]
    fn test_from_vars_ignores_garbage() {
        let config = GraphConfig::from_vars(|key| match key {
            "ETS_GRAPH_TRANSITION_MS" => Some("soon".to_string()),
            "ETS_GRAPH_MARGIN_LEFT" => Some(String::new()),
            _ => None,
        });
        assert_eq!(config, GraphConfig::default());
    }

    #[test]
    fn test_from_env_reads_process_environment() {
        let expected = GraphConfig::from_vars(|key| std::env::var(key).ok());
        assert_eq!(GraphConfig::from_env(), expected);
    }

    #[test]
    fn test_from_file_missing() {
        let result = GraphConfig::from_file(Path::new("/nonexistent/ets-graph.toml"));
        assert!(matches!(result, Err(GraphError::Io(_))));
    }
}
