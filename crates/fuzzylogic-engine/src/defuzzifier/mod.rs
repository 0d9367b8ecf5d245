//! Defuzzification: reducing a fuzzy output to one crisp value.
//!
//! Integral methods sample the fuzzy output over the variable's range:
//! - **Centroid**: center of area
//! - **Bisector**: point splitting the area in two equal halves
//! - **SmallestOfMaximum**: leftmost point of maximum membership
//! - **LargestOfMaximum**: rightmost point of maximum membership
//! - **MeanOfMaximum**: middle of the maximum plateau
//!
//! Weighted methods combine activation degrees with the values of the
//! activated terms:
//! - **WeightedAverage**: Σw·z / Σw
//! - **WeightedSum**: Σw·z
//!
//! Every method yields NaN when there is nothing to defuzzify; the output
//! variable then falls back to its previous or default value.

mod integral;
mod weighted;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::FuzzyError;
use crate::term::{FuzzyOutput, Term};

/// Sampling methods of integral defuzzifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntegralMethod {
    Centroid,
    Bisector,
    SmallestOfMaximum,
    LargestOfMaximum,
    MeanOfMaximum,
}

impl IntegralMethod {
    pub const ALL: [IntegralMethod; 5] = [
        IntegralMethod::Centroid,
        IntegralMethod::Bisector,
        IntegralMethod::SmallestOfMaximum,
        IntegralMethod::LargestOfMaximum,
        IntegralMethod::MeanOfMaximum,
    ];

    pub fn name(self) -> &'static str {
        match self {
            IntegralMethod::Centroid => "Centroid",
            IntegralMethod::Bisector => "Bisector",
            IntegralMethod::SmallestOfMaximum => "SmallestOfMaximum",
            IntegralMethod::LargestOfMaximum => "LargestOfMaximum",
            IntegralMethod::MeanOfMaximum => "MeanOfMaximum",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeightedMethod {
    WeightedAverage,
    WeightedSum,
}

impl WeightedMethod {
    pub const ALL: [WeightedMethod; 2] = [WeightedMethod::WeightedAverage, WeightedMethod::WeightedSum];

    pub fn name(self) -> &'static str {
        match self {
            WeightedMethod::WeightedAverage => "WeightedAverage",
            WeightedMethod::WeightedSum => "WeightedSum",
        }
    }
}

/// How weighted defuzzifiers obtain the value of an activated term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum WeightedType {
    /// Decided per term: monotonic shapes are Tsukamoto, the rest
    /// Takagi-Sugeno.
    #[default]
    Automatic,
    TakagiSugeno,
    Tsukamoto,
}

impl WeightedType {
    pub const ALL: [WeightedType; 3] = [
        WeightedType::Automatic,
        WeightedType::TakagiSugeno,
        WeightedType::Tsukamoto,
    ];

    pub fn name(self) -> &'static str {
        match self {
            WeightedType::Automatic => "Automatic",
            WeightedType::TakagiSugeno => "TakagiSugeno",
            WeightedType::Tsukamoto => "Tsukamoto",
        }
    }

    /// Type a term calls for on its own.
    pub fn infer(term: &Term) -> WeightedType {
        if term.is_monotonic() {
            WeightedType::Tsukamoto
        } else {
            WeightedType::TakagiSugeno
        }
    }

    /// This type, or the inferred one when automatic.
    pub fn resolve(self, term: &Term) -> WeightedType {
        match self {
            WeightedType::Automatic => WeightedType::infer(term),
            kind => kind,
        }
    }
}

impl fmt::Display for WeightedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WeightedType {
    type Err = FuzzyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WeightedType::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| FuzzyError::not_found("weighted type", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Defuzzifier {
    Integral {
        method: IntegralMethod,
        resolution: usize,
    },
    Weighted {
        method: WeightedMethod,
        kind: WeightedType,
    },
}

impl Defuzzifier {
    pub fn centroid(resolution: usize) -> Self {
        Defuzzifier::integral(IntegralMethod::Centroid, resolution)
    }

    pub fn bisector(resolution: usize) -> Self {
        Defuzzifier::integral(IntegralMethod::Bisector, resolution)
    }

    pub fn smallest_of_maximum(resolution: usize) -> Self {
        Defuzzifier::integral(IntegralMethod::SmallestOfMaximum, resolution)
    }

    pub fn largest_of_maximum(resolution: usize) -> Self {
        Defuzzifier::integral(IntegralMethod::LargestOfMaximum, resolution)
    }

    pub fn mean_of_maximum(resolution: usize) -> Self {
        Defuzzifier::integral(IntegralMethod::MeanOfMaximum, resolution)
    }

    pub fn weighted_average(kind: WeightedType) -> Self {
        Defuzzifier::Weighted {
            method: WeightedMethod::WeightedAverage,
            kind,
        }
    }

    pub fn weighted_sum(kind: WeightedType) -> Self {
        Defuzzifier::Weighted {
            method: WeightedMethod::WeightedSum,
            kind,
        }
    }

    fn integral(method: IntegralMethod, resolution: usize) -> Self {
        Defuzzifier::Integral { method, resolution }
    }

    /// Every defuzzifier class with its default parameters.
    pub fn all(config: &EngineConfig) -> Vec<Defuzzifier> {
        IntegralMethod::ALL
            .into_iter()
            .map(|method| Defuzzifier::integral(method, config.resolution))
            .chain(WeightedMethod::ALL.into_iter().map(|method| Defuzzifier::Weighted {
                method,
                kind: WeightedType::Automatic,
            }))
            .collect()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Defuzzifier::Integral { method, .. } => method.name(),
            Defuzzifier::Weighted { method, .. } => method.name(),
        }
    }

    pub fn is_integral(&self) -> bool {
        matches!(self, Defuzzifier::Integral { .. })
    }

    /// The resolution or weighted type, as written after the class name.
    pub fn parameters(&self) -> String {
        match self {
            Defuzzifier::Integral { resolution, .. } => resolution.to_string(),
            Defuzzifier::Weighted { kind, .. } => kind.name().to_string(),
        }
    }

    /// Build a defuzzifier from its class name and optional parameter text.
    pub fn configure(name: &str, parameters: &str, config: &EngineConfig) -> Result<Self, FuzzyError> {
        let parameters = parameters.trim();
        if let Some(method) = IntegralMethod::ALL.into_iter().find(|m| m.name() == name) {
            let resolution = if parameters.is_empty() {
                config.resolution
            } else {
                parameters.parse::<usize>().map_err(|_| {
                    FuzzyError::invalid_parameters(name, format!("invalid resolution '{}'", parameters))
                })?
            };
            return Ok(Defuzzifier::integral(method, resolution));
        }
        if let Some(method) = WeightedMethod::ALL.into_iter().find(|m| m.name() == name) {
            let kind = if parameters.is_empty() {
                WeightedType::Automatic
            } else {
                parameters.parse()?
            };
            return Ok(Defuzzifier::Weighted { method, kind });
        }
        Err(FuzzyError::not_found("defuzzifier", name))
    }

    /// Crisp value of `output` over `[minimum, maximum]`, or NaN when it
    /// cannot be computed.
    pub fn defuzzify(&self, output: &FuzzyOutput<'_>, minimum: f64, maximum: f64) -> f64 {
        let value = match *self {
            Defuzzifier::Integral { method, resolution } => {
                let compute: fn(&FuzzyOutput<'_>, f64, f64, usize) -> Option<f64> = match method {
                    IntegralMethod::Centroid => integral::centroid,
                    IntegralMethod::Bisector => integral::bisector,
                    IntegralMethod::SmallestOfMaximum => integral::smallest_of_maximum,
                    IntegralMethod::LargestOfMaximum => integral::largest_of_maximum,
                    IntegralMethod::MeanOfMaximum => integral::mean_of_maximum,
                };
                compute(output, minimum, maximum, resolution)
            }
            Defuzzifier::Weighted { method, kind } => match method {
                WeightedMethod::WeightedAverage => {
                    weighted::weighted_average(output, kind, minimum, maximum)
                }
                WeightedMethod::WeightedSum => weighted::weighted_sum(output, kind, minimum, maximum),
            },
        };
        value.unwrap_or(f64::NAN)
    }
}

impl fmt::Display for Defuzzifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name(), self.parameters())
    }
}

impl FromStr for Defuzzifier {
    type Err = FuzzyError;

    /// Parses `Name [parameter]`, e.g. `Centroid 200` or `WeightedAverage`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, parameters) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
        Defuzzifier::configure(name, parameters, &EngineConfig::default())
    }
}
