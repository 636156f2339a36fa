use crate::core::models::atom::AtomSelector;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidParameter { name: &'static str, reason: String },
}

pub const DEFAULT_RADIUS: f64 = 15.0;
pub const DEFAULT_STEP: usize = 3;

/// Spatial window parameters; they also name output files.
#[derive(Debug, Clone, PartialEq)]
pub struct MappingParams {
    pub radius: f64,
    pub selector: AtomSelector,
}

impl Default for MappingParams {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            selector: AtomSelector::All,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MappingConfig {
    pub method: String,
    pub params: MappingParams,
    /// Reference sequence for the protein path, or genomic sequence for `tajimasd`.
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingConfigBuilder {
    method: Option<String>,
    radius: Option<f64>,
    selector: Option<AtomSelector>,
    reference: Option<String>,
}

impl MappingConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: &str) -> Self {
        self.method = Some(method.trim().to_string());
        self
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    pub fn selector(mut self, selector: AtomSelector) -> Self {
        self.selector = Some(selector);
        self
    }

    pub fn reference(mut self, reference: Option<String>) -> Self {
        self.reference = reference;
        self
    }

    pub fn build(self) -> Result<MappingConfig, ConfigError> {
        let method = self
            .method
            .filter(|m| !m.is_empty())
            .ok_or(ConfigError::MissingParameter("method"))?;
        let radius = self.radius.unwrap_or(DEFAULT_RADIUS);
        if !radius.is_finite() || radius < 0.0 {
            return Err(ConfigError::InvalidParameter {
                name: "radius",
                reason: format!("must be a finite, non-negative distance (got {})", radius),
            });
        }
        Ok(MappingConfig {
            method,
            params: MappingParams {
                radius,
                selector: self.selector.unwrap_or_default(),
            },
            reference: self.reference.filter(|r| !r.trim().is_empty()),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TajimaConfig {
    /// Columns per window; `None` evaluates the whole alignment.
    pub window: Option<usize>,
    pub step: usize,
}

impl Default for TajimaConfig {
    fn default() -> Self {
        Self {
            window: None,
            step: DEFAULT_STEP,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TajimaConfigBuilder {
    window: Option<usize>,
    step: Option<usize>,
}

impl TajimaConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn window(mut self, window: Option<usize>) -> Self {
        self.window = window;
        self
    }

    pub fn step(mut self, step: usize) -> Self {
        self.step = Some(step);
        self
    }

    pub fn build(self) -> Result<TajimaConfig, ConfigError> {
        if self.window == Some(0) {
            return Err(ConfigError::InvalidParameter {
                name: "window",
                reason: "must be positive".to_string(),
            });
        }
        let step = self.step.unwrap_or(DEFAULT_STEP);
        if step == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "step",
                reason: "must be positive".to_string(),
            });
        }
        Ok(TajimaConfig {
            window: self.window,
            step,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_builder_applies_defaults() {
        let config = MappingConfigBuilder::new().method("default").build().unwrap();
        assert_eq!(config.method, "default");
        assert_eq!(config.params, MappingParams::default());
        assert_eq!(config.params.radius, 15.0);
        assert!(config.reference.is_none());
    }

    #[test]
    fn mapping_builder_requires_a_method() {
        assert_eq!(
            MappingConfigBuilder::new().build().unwrap_err(),
            ConfigError::MissingParameter("method")
        );
        assert_eq!(
            MappingConfigBuilder::new().method("  ").build().unwrap_err(),
            ConfigError::MissingParameter("method")
        );
    }

    #[test]
    fn mapping_builder_rejects_invalid_radius() {
        for radius in [-1.0, f64::NAN, f64::INFINITY] {
            let err = MappingConfigBuilder::new()
                .method("snps")
                .radius(radius)
                .build()
                .unwrap_err();
            assert!(matches!(err, ConfigError::InvalidParameter { name: "radius", .. }));
        }
    }

    #[test]
    fn blank_reference_is_treated_as_absent() {
        let config = MappingConfigBuilder::new()
            .method("default")
            .reference(Some("   ".to_string()))
            .build()
            .unwrap();
        assert!(config.reference.is_none());
    }

    #[test]
    fn tajima_builder_validates_window_and_step() {
        let config = TajimaConfigBuilder::new().build().unwrap();
        assert_eq!(config, TajimaConfig::default());
        assert_eq!(config.step, 3);

        assert!(TajimaConfigBuilder::new().window(Some(0)).build().is_err());
        assert!(TajimaConfigBuilder::new().step(0).build().is_err());

        let windowed = TajimaConfigBuilder::new()
            .window(Some(30))
            .step(1)
            .build()
            .unwrap();
        assert_eq!(windowed.window, Some(30));
        assert_eq!(windowed.step, 1);
    }
}
