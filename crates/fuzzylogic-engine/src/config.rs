//! Engine-level configuration and operator presets.
//!
//! [`EngineConfig`] holds the numeric settings every engine carries with it
//! (scalar tolerance, text precision, integral resolution). Two engines with
//! different settings can run side by side since nothing here is global.
//!
//! [`OperatorConfig`] bundles the operators of a whole engine so a controller
//! can be set up in one call with [`Engine::configure`](crate::Engine::configure).

use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::defuzzifier::{Defuzzifier, WeightedType};
use crate::norm::{SNorm, TNorm};

/// Numeric settings attached to an engine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Number of decimals used when rendering scalars as text (default: 3)
    pub decimals: usize,
    /// Tolerance used for scalar equality (default: 1e-6)
    pub machine_epsilon: f64,
    /// Default sample count for integral defuzzifiers (default: 100)
    pub resolution: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            decimals: Self::DEFAULT_DECIMALS,
            machine_epsilon: Self::DEFAULT_MACHINE_EPSILON,
            resolution: Self::DEFAULT_RESOLUTION,
        }
    }
}

impl EngineConfig {
    pub const DEFAULT_DECIMALS: usize = 3;
    pub const DEFAULT_MACHINE_EPSILON: f64 = 1e-6;
    pub const DEFAULT_RESOLUTION: usize = 100;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_decimals(mut self, decimals: usize) -> Self {
        self.decimals = decimals;
        self
    }

    pub fn with_machine_epsilon(mut self, machine_epsilon: f64) -> Self {
        self.machine_epsilon = machine_epsilon;
        self
    }

    pub fn with_resolution(mut self, resolution: usize) -> Self {
        self.resolution = resolution;
        self
    }

    /// Equality within machine epsilon. Two NaNs compare equal.
    pub fn is_eq(&self, a: f64, b: f64) -> bool {
        a == b || (a - b).abs() < self.machine_epsilon || (a.is_nan() && b.is_nan())
    }

    pub fn is_lt(&self, a: f64, b: f64) -> bool {
        !self.is_eq(a, b) && a < b
    }

    pub fn is_le(&self, a: f64, b: f64) -> bool {
        self.is_eq(a, b) || a < b
    }

    pub fn is_gt(&self, a: f64, b: f64) -> bool {
        !self.is_eq(a, b) && a > b
    }

    pub fn is_ge(&self, a: f64, b: f64) -> bool {
        self.is_eq(a, b) || a > b
    }

    /// Renders a scalar with the configured number of decimals.
    ///
    /// NaN and infinities print as `nan`, `inf` and `-inf`; values within
    /// display precision of zero print as zero, never `-0.000`.
    pub fn format_scalar(&self, x: f64) -> String {
        if x.is_nan() {
            return "nan".to_string();
        }
        if x.is_infinite() {
            return if x < 0.0 { "-inf" } else { "inf" }.to_string();
        }
        let tolerance = 10f64.powi(-(self.decimals as i32));
        let x = if x.abs() < tolerance { 0.0 } else { x };
        format!("{:.*}", self.decimals, x)
    }
}

/// Operators applied to every rule block and output variable of an engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorConfig {
    /// T-norm for `and` in antecedents
    pub conjunction: Option<TNorm>,
    /// S-norm for `or` in antecedents
    pub disjunction: Option<SNorm>,
    /// T-norm combining rule degree and consequent term
    pub implication: Option<TNorm>,
    /// S-norm aggregating activated terms per output
    pub accumulation: Option<SNorm>,
    /// Defuzzifier for every output variable
    pub defuzzifier: Option<Defuzzifier>,
    /// Rule activation strategy for every rule block
    pub activation: Activation,
}

impl Default for OperatorConfig {
    fn default() -> Self {
        Self::mamdani()
    }
}

impl OperatorConfig {
    /// Mamdani controller (default).
    ///
    /// Min/max connectives, clipping implication, max accumulation and a
    /// centroid defuzzifier.
    pub fn mamdani() -> Self {
        Self {
            conjunction: Some(TNorm::Minimum),
            disjunction: Some(SNorm::Maximum),
            implication: Some(TNorm::Minimum),
            accumulation: Some(SNorm::Maximum),
            defuzzifier: Some(Defuzzifier::centroid(EngineConfig::DEFAULT_RESOLUTION)),
            activation: Activation::General,
        }
    }

    /// Larsen controller: Mamdani with scaling (product) implication.
    pub fn larsen() -> Self {
        Self {
            implication: Some(TNorm::AlgebraicProduct),
            ..Self::mamdani()
        }
    }

    /// Takagi-Sugeno controller.
    ///
    /// Consequents are constant, linear or function terms combined by a
    /// weighted average, so no implication or accumulation is set.
    pub fn takagi_sugeno() -> Self {
        Self {
            conjunction: Some(TNorm::AlgebraicProduct),
            disjunction: Some(SNorm::AlgebraicSum),
            implication: None,
            accumulation: None,
            defuzzifier: Some(Defuzzifier::weighted_average(WeightedType::TakagiSugeno)),
            activation: Activation::General,
        }
    }

    /// Tsukamoto controller with monotonic consequent terms.
    pub fn tsukamoto() -> Self {
        Self {
            conjunction: Some(TNorm::Minimum),
            disjunction: Some(SNorm::Maximum),
            implication: None,
            accumulation: None,
            defuzzifier: Some(Defuzzifier::weighted_average(WeightedType::Tsukamoto)),
            activation: Activation::General,
        }
    }

    /// Create a custom configuration.
    pub fn custom() -> OperatorConfigBuilder {
        OperatorConfigBuilder::default()
    }
}

/// Builder for custom operator configurations. Unset operators stay unset.
#[derive(Debug, Clone, Default)]
pub struct OperatorConfigBuilder {
    conjunction: Option<TNorm>,
    disjunction: Option<SNorm>,
    implication: Option<TNorm>,
    accumulation: Option<SNorm>,
    defuzzifier: Option<Defuzzifier>,
    activation: Option<Activation>,
}

impl OperatorConfigBuilder {
    pub fn conjunction(mut self, norm: TNorm) -> Self {
        self.conjunction = Some(norm);
        self
    }

    pub fn disjunction(mut self, norm: SNorm) -> Self {
        self.disjunction = Some(norm);
        self
    }

    pub fn implication(mut self, norm: TNorm) -> Self {
        self.implication = Some(norm);
        self
    }

    pub fn accumulation(mut self, norm: SNorm) -> Self {
        self.accumulation = Some(norm);
        self
    }

    pub fn defuzzifier(mut self, defuzzifier: Defuzzifier) -> Self {
        self.defuzzifier = Some(defuzzifier);
        self
    }

    pub fn activation(mut self, activation: Activation) -> Self {
        self.activation = Some(activation);
        self
    }

    /// Build the configuration. Activation defaults to `General`.
    pub fn build(self) -> OperatorConfig {
        OperatorConfig {
            conjunction: self.conjunction,
            disjunction: self.disjunction,
            implication: self.implication,
            accumulation: self.accumulation,
            defuzzifier: self.defuzzifier,
            activation: self.activation.unwrap_or(Activation::General),
        }
    }
}
