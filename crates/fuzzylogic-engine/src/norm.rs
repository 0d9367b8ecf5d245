//! T-norms and S-norms.
//!
//! A t-norm is a binary operation T: \[0,1\] × \[0,1\] → \[0,1\] used for
//! conjunction and implication; an s-norm (t-conorm) is its dual, used for
//! disjunction and accumulation. Both families are stateless and `Copy`, so a
//! rule block or fuzzy output simply holds them by value.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FuzzyError, FuzzyResult};

/// T-norm (triangular norm) kinds for fuzzy AND operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TNorm {
    /// T(a,b) = a * b
    AlgebraicProduct,
    /// T(a,b) = max(0, a + b - 1)
    BoundedDifference,
    /// T(a,b) = { min(a,b) if max(a,b) = 1, 0 otherwise }
    DrasticProduct,
    /// T(a,b) = ab / (2 - (a + b - ab))
    EinsteinProduct,
    /// T(a,b) = { 0 if a + b = 0, ab / (a + b - ab) otherwise }
    HamacherProduct,
    /// T(a,b) = min(a,b)
    Minimum,
    /// T(a,b) = { min(a,b) if a + b > 1, 0 otherwise }
    NilpotentMinimum,
}

/// S-norm (triangular conorm) kinds for fuzzy OR operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SNorm {
    /// S(a,b) = a + b - ab
    AlgebraicSum,
    /// S(a,b) = min(1, a + b)
    BoundedSum,
    /// S(a,b) = { max(a,b) if min(a,b) = 0, 1 otherwise }
    DrasticSum,
    /// S(a,b) = (a + b) / (1 + ab)
    EinsteinSum,
    /// S(a,b) = { 1 if ab = 1, (a + b - 2ab) / (1 - ab) otherwise }
    HamacherSum,
    /// S(a,b) = max(a,b)
    Maximum,
    /// S(a,b) = { max(a,b) if a + b < 1, 1 otherwise }
    NilpotentMaximum,
}

impl TNorm {
    pub const ALL: [TNorm; 7] = [
        TNorm::AlgebraicProduct,
        TNorm::BoundedDifference,
        TNorm::DrasticProduct,
        TNorm::EinsteinProduct,
        TNorm::HamacherProduct,
        TNorm::Minimum,
        TNorm::NilpotentMinimum,
    ];

    pub fn compute(self, a: f64, b: f64) -> f64 {
        match self {
            TNorm::AlgebraicProduct => a * b,
            TNorm::BoundedDifference => (a + b - 1.0).max(0.0),
            TNorm::DrasticProduct => {
                if a.max(b) == 1.0 {
                    a.min(b)
                } else {
                    0.0
                }
            }
            TNorm::EinsteinProduct => (a * b) / (2.0 - (a + b - a * b)),
            TNorm::HamacherProduct => {
                if a + b == 0.0 {
                    0.0
                } else {
                    (a * b) / (a + b - a * b)
                }
            }
            TNorm::Minimum => a.min(b),
            TNorm::NilpotentMinimum => {
                if a + b > 1.0 {
                    a.min(b)
                } else {
                    0.0
                }
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            TNorm::AlgebraicProduct => "AlgebraicProduct",
            TNorm::BoundedDifference => "BoundedDifference",
            TNorm::DrasticProduct => "DrasticProduct",
            TNorm::EinsteinProduct => "EinsteinProduct",
            TNorm::HamacherProduct => "HamacherProduct",
            TNorm::Minimum => "Minimum",
            TNorm::NilpotentMinimum => "NilpotentMinimum",
        }
    }
}

impl SNorm {
    pub const ALL: [SNorm; 7] = [
        SNorm::AlgebraicSum,
        SNorm::BoundedSum,
        SNorm::DrasticSum,
        SNorm::EinsteinSum,
        SNorm::HamacherSum,
        SNorm::Maximum,
        SNorm::NilpotentMaximum,
    ];

    pub fn compute(self, a: f64, b: f64) -> f64 {
        match self {
            SNorm::AlgebraicSum => a + b - a * b,
            SNorm::BoundedSum => (a + b).min(1.0),
            SNorm::DrasticSum => {
                if a.min(b) == 0.0 {
                    a.max(b)
                } else {
                    1.0
                }
            }
            SNorm::EinsteinSum => (a + b) / (1.0 + a * b),
            SNorm::HamacherSum => {
                if a * b == 1.0 {
                    1.0
                } else {
                    (a + b - 2.0 * a * b) / (1.0 - a * b)
                }
            }
            SNorm::Maximum => a.max(b),
            SNorm::NilpotentMaximum => {
                if a + b < 1.0 {
                    a.max(b)
                } else {
                    1.0
                }
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            SNorm::AlgebraicSum => "AlgebraicSum",
            SNorm::BoundedSum => "BoundedSum",
            SNorm::DrasticSum => "DrasticSum",
            SNorm::EinsteinSum => "EinsteinSum",
            SNorm::HamacherSum => "HamacherSum",
            SNorm::Maximum => "Maximum",
            SNorm::NilpotentMaximum => "NilpotentMaximum",
        }
    }
}

impl fmt::Display for TNorm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for SNorm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TNorm {
    type Err = FuzzyError;

    fn from_str(name: &str) -> FuzzyResult<Self> {
        TNorm::ALL
            .into_iter()
            .find(|norm| norm.name() == name)
            .ok_or_else(|| FuzzyError::not_found("t-norm", name))
    }
}

impl FromStr for SNorm {
    type Err = FuzzyError;

    fn from_str(name: &str) -> FuzzyResult<Self> {
        SNorm::ALL
            .into_iter()
            .find(|norm| norm.name() == name)
            .ok_or_else(|| FuzzyError::not_found("s-norm", name))
    }
}
