//! Linguistic hedges applied to membership values.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{FuzzyError, FuzzyResult};

/// Unary modifiers on a membership value, listed from weakest to strongest.
///
/// `Any` is special in rule text: it closes a hedge chain without a term and
/// always evaluates to 1.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Hedge {
    /// 1 - x
    Not,
    /// x <= 0.5 ? sqrt(x/2) : 1 - sqrt((1-x)/2)
    Seldom,
    /// sqrt(x)
    Somewhat,
    /// x^2
    Very,
    /// x <= 0.5 ? 2x^2 : 1 - 2(1-x)^2
    Extremely,
    /// 1
    Any,
}

impl Hedge {
    pub const ALL: [Hedge; 6] = [
        Hedge::Not,
        Hedge::Seldom,
        Hedge::Somewhat,
        Hedge::Very,
        Hedge::Extremely,
        Hedge::Any,
    ];

    pub fn hedge(self, x: f64) -> f64 {
        match self {
            Hedge::Not => 1.0 - x,
            Hedge::Seldom => {
                if x <= 0.5 {
                    (x / 2.0).sqrt()
                } else {
                    1.0 - ((1.0 - x) / 2.0).sqrt()
                }
            }
            Hedge::Somewhat => x.sqrt(),
            Hedge::Very => x * x,
            Hedge::Extremely => {
                if x <= 0.5 {
                    2.0 * x * x
                } else {
                    let y = 1.0 - x;
                    1.0 - 2.0 * y * y
                }
            }
            Hedge::Any => 1.0,
        }
    }

    /// Keyword used in rule text.
    pub fn name(self) -> &'static str {
        match self {
            Hedge::Not => "not",
            Hedge::Seldom => "seldom",
            Hedge::Somewhat => "somewhat",
            Hedge::Very => "very",
            Hedge::Extremely => "extremely",
            Hedge::Any => "any",
        }
    }
}

impl fmt::Display for Hedge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Hedge {
    type Err = FuzzyError;

    fn from_str(name: &str) -> FuzzyResult<Self> {
        Hedge::ALL
            .into_iter()
            .find(|hedge| hedge.name() == name)
            .ok_or_else(|| FuzzyError::not_found("hedge", name))
    }
}

/// Applies a hedge chain as written in rule text: the hedge nearest the term
/// is applied first, the leftmost one last.
pub fn apply_chain(hedges: &[Hedge], x: f64) -> f64 {
    hedges.iter().rev().fold(x, |acc, hedge| hedge.hedge(acc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_seldom_branches() {
        assert_abs_diff_eq!(Hedge::Seldom.hedge(0.5), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(Hedge::Seldom.hedge(0.18), 0.3, epsilon = 1e-12);
        assert_abs_diff_eq!(Hedge::Seldom.hedge(0.82), 0.7, epsilon = 1e-12);
    }

    #[test]
    fn test_extremely_is_continuous_at_half() {
        assert_abs_diff_eq!(Hedge::Extremely.hedge(0.5), 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(Hedge::Extremely.hedge(0.9), 0.98, epsilon = 1e-12);
    }

    #[test]
    fn test_any_is_constant() {
        assert_eq!(Hedge::Any.hedge(0.0), 1.0);
        assert_eq!(Hedge::Any.hedge(0.3), 1.0);
    }

    #[test]
    fn test_chain_order() {
        // "not very" = not(very(x))
        assert_abs_diff_eq!(
            apply_chain(&[Hedge::Not, Hedge::Very], 0.5),
            0.75,
            epsilon = 1e-12
        );
        // "very not" = very(not(x))
        assert_abs_diff_eq!(
            apply_chain(&[Hedge::Very, Hedge::Not], 0.4),
            0.36,
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_parse_keywords() {
        assert_eq!("somewhat".parse::<Hedge>().unwrap(), Hedge::Somewhat);
        assert!("Very".parse::<Hedge>().is_err());
    }
}
