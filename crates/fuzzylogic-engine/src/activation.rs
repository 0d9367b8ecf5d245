//! Rule activation strategies.
//!
//! A strategy decides which rules of a block fire in a cycle. Every loaded
//! rule ends the cycle either activated, with its consequent applied, or
//! deactivated with a degree of 0. Unloaded rules are skipped.
//!
//! - **General**: every rule fires with its degree
//! - **First(n)** / **Last(n)**: the first or last `n` rules with a positive degree
//! - **Highest(n)** / **Lowest(n)**: the `n` rules with the highest or lowest
//!   positive degree, ties in block order
//! - **Threshold(op, θ)**: rules whose degree compares true against `θ`

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{FuzzyError, FuzzyResult};
use crate::rule::RuleBlock;
use crate::term::Scope;
use crate::variable::{InputVariable, OutputVariable, VariableSet};

/// Comparison operator of the threshold strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparison {
    EqualTo,
    NotEqualTo,
    LessThan,
    LessThanOrEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
}

impl Comparison {
    pub const ALL: [Comparison; 6] = [
        Comparison::EqualTo,
        Comparison::NotEqualTo,
        Comparison::LessThan,
        Comparison::LessThanOrEqualTo,
        Comparison::GreaterThan,
        Comparison::GreaterThanOrEqualTo,
    ];

    pub fn operator(self) -> &'static str {
        match self {
            Comparison::EqualTo => "==",
            Comparison::NotEqualTo => "!=",
            Comparison::LessThan => "<",
            Comparison::LessThanOrEqualTo => "<=",
            Comparison::GreaterThan => ">",
            Comparison::GreaterThanOrEqualTo => ">=",
        }
    }

    /// Whether `degree <op> threshold` holds within machine epsilon.
    pub fn activates(self, degree: f64, threshold: f64, config: &EngineConfig) -> bool {
        match self {
            Comparison::EqualTo => config.is_eq(degree, threshold),
            Comparison::NotEqualTo => !config.is_eq(degree, threshold),
            Comparison::LessThan => config.is_lt(degree, threshold),
            Comparison::LessThanOrEqualTo => config.is_le(degree, threshold),
            Comparison::GreaterThan => config.is_gt(degree, threshold),
            Comparison::GreaterThanOrEqualTo => config.is_ge(degree, threshold),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.operator())
    }
}

impl FromStr for Comparison {
    type Err = FuzzyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Comparison::ALL
            .into_iter()
            .find(|comparison| comparison.operator() == s)
            .ok_or_else(|| FuzzyError::not_found("comparison", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum Activation {
    #[default]
    General,
    First {
        rules: usize,
    },
    Last {
        rules: usize,
    },
    /// A negative count selects the lowest degrees instead.
    Highest {
        rules: i32,
    },
    /// A negative count selects the highest degrees instead.
    Lowest {
        rules: i32,
    },
    Threshold {
        comparison: Comparison,
        threshold: f64,
    },
}

impl Activation {
    pub const NAMES: [&'static str; 6] = ["General", "First", "Last", "Highest", "Lowest", "Threshold"];

    pub fn first(rules: usize) -> Self {
        Activation::First { rules }
    }

    pub fn last(rules: usize) -> Self {
        Activation::Last { rules }
    }

    pub fn highest(rules: i32) -> Self {
        Activation::Highest { rules }
    }

    pub fn lowest(rules: i32) -> Self {
        Activation::Lowest { rules }
    }

    pub fn threshold(comparison: Comparison, threshold: f64) -> Self {
        Activation::Threshold {
            comparison,
            threshold,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Activation::General => "General",
            Activation::First { .. } => "First",
            Activation::Last { .. } => "Last",
            Activation::Highest { .. } => "Highest",
            Activation::Lowest { .. } => "Lowest",
            Activation::Threshold { .. } => "Threshold",
        }
    }

    /// Parameters as written after the name; empty for `General`.
    pub fn parameters(&self, config: &EngineConfig) -> String {
        match self {
            Activation::General => String::new(),
            Activation::First { rules } | Activation::Last { rules } => rules.to_string(),
            Activation::Highest { rules } | Activation::Lowest { rules } => rules.to_string(),
            Activation::Threshold {
                comparison,
                threshold,
            } => format!("{} {}", comparison, config.format_scalar(*threshold)),
        }
    }

    /// Builds a strategy from its name and parameter text. Missing
    /// parameters take their defaults.
    pub fn configure(name: &str, parameters: &str) -> FuzzyResult<Self> {
        let parameters: Vec<&str> = parameters.split_whitespace().collect();
        let invalid = |reason: String| FuzzyError::invalid_parameters(name, reason);
        let count = |default: &str| -> FuzzyResult<i64> {
            let text = parameters.first().copied().unwrap_or(default);
            text.parse::<i64>()
                .map_err(|_| invalid(format!("expected a rule count, found '{}'", text)))
        };
        let unsigned = |value: i64| {
            usize::try_from(value)
                .map_err(|_| invalid(format!("expected a non-negative rule count, found {}", value)))
        };
        let signed = |value: i64| {
            i32::try_from(value).map_err(|_| invalid(format!("rule count {} out of range", value)))
        };
        let activation = match name {
            "General" => Activation::General,
            "First" => Activation::first(unsigned(count("1")?)?),
            "Last" => Activation::last(unsigned(count("1")?)?),
            "Highest" => Activation::highest(signed(count("1")?)?),
            "Lowest" => Activation::lowest(signed(count("1")?)?),
            "Threshold" => match parameters.as_slice() {
                [] => Activation::threshold(Comparison::GreaterThan, 0.0),
                [value] | [">", value] => Activation::threshold(Comparison::GreaterThan, parse_threshold(name, value)?),
                [comparison, value] => {
                    Activation::threshold(comparison.parse()?, parse_threshold(name, value)?)
                }
                _ => return Err(invalid(format!("unexpected parameters '{}'", parameters.join(" ")))),
            },
            _ => return Err(FuzzyError::not_found("activation", name)),
        };
        Ok(activation)
    }

    /// Activates the rules of `block` for the current variable values.
    pub fn activate(
        &self,
        block: &mut RuleBlock,
        inputs: &[InputVariable],
        outputs: &mut [OutputVariable],
        scope: &Scope,
    ) -> FuzzyResult<()> {
        match *self {
            Activation::General => general(block, inputs, outputs, scope),
            Activation::First { rules } => first(block, rules, false, inputs, outputs, scope),
            Activation::Last { rules } => first(block, rules, true, inputs, outputs, scope),
            Activation::Highest { rules } => {
                ranked(block, rules.unsigned_abs() as usize, rules >= 0, inputs, outputs, scope)
            }
            Activation::Lowest { rules } => {
                ranked(block, rules.unsigned_abs() as usize, rules < 0, inputs, outputs, scope)
            }
            Activation::Threshold {
                comparison,
                threshold,
            } => threshold_activation(block, comparison, threshold, inputs, outputs, scope),
        }
    }
}

impl fmt::Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parameters = self.parameters(&EngineConfig::default());
        if parameters.is_empty() {
            f.write_str(self.name())
        } else {
            write!(f, "{} {}", self.name(), parameters)
        }
    }
}

impl FromStr for Activation {
    type Err = FuzzyError;

    /// Parses `Name [parameters]`, e.g. `Highest 2` or `Threshold >= 0.5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (name, parameters) = s.split_once(char::is_whitespace).unwrap_or((s, ""));
        Activation::configure(name, parameters)
    }
}

fn parse_threshold(name: &str, value: &str) -> FuzzyResult<f64> {
    value.parse::<f64>().map_err(|_| {
        FuzzyError::invalid_parameters(name, format!("expected a threshold, found '{}'", value))
    })
}

fn general(
    block: &mut RuleBlock,
    inputs: &[InputVariable],
    outputs: &mut [OutputVariable],
    scope: &Scope,
) -> FuzzyResult<()> {
    let (conjunction, disjunction, implication) =
        (block.conjunction(), block.disjunction(), block.implication());
    for rule in block.rules_mut() {
        rule.deactivate();
        if rule.is_loaded() {
            let degree = rule.compute_activation_degree(
                conjunction,
                disjunction,
                VariableSet::new(inputs, outputs),
                scope,
            )?;
            rule.activate(degree, implication, outputs)?;
        }
    }
    Ok(())
}

/// First `limit` rules with a positive degree, from the end when `reverse`.
fn first(
    block: &mut RuleBlock,
    limit: usize,
    reverse: bool,
    inputs: &[InputVariable],
    outputs: &mut [OutputVariable],
    scope: &Scope,
) -> FuzzyResult<()> {
    let (conjunction, disjunction, implication) =
        (block.conjunction(), block.disjunction(), block.implication());
    let config = scope.config;
    let rules = block.rules_mut();
    let order: Vec<usize> = if reverse {
        (0..rules.len()).rev().collect()
    } else {
        (0..rules.len()).collect()
    };
    let mut activated = 0;
    for index in order {
        let rule = &mut rules[index];
        rule.deactivate();
        if !rule.is_loaded() || activated >= limit {
            continue;
        }
        let degree = rule.compute_activation_degree(
            conjunction,
            disjunction,
            VariableSet::new(inputs, outputs),
            scope,
        )?;
        if config.is_gt(degree, 0.0) {
            rule.activate(degree, implication, outputs)?;
            activated += 1;
        }
    }
    Ok(())
}

/// The `limit` rules with the highest (or lowest) positive degrees.
fn ranked(
    block: &mut RuleBlock,
    limit: usize,
    highest: bool,
    inputs: &[InputVariable],
    outputs: &mut [OutputVariable],
    scope: &Scope,
) -> FuzzyResult<()> {
    let (conjunction, disjunction, implication) =
        (block.conjunction(), block.disjunction(), block.implication());
    let config = scope.config;
    let rules = block.rules_mut();

    let mut candidates = Vec::new();
    for (index, rule) in rules.iter_mut().enumerate() {
        rule.deactivate();
        if !rule.is_loaded() {
            continue;
        }
        let degree = rule.compute_activation_degree(
            conjunction,
            disjunction,
            VariableSet::new(inputs, outputs),
            scope,
        )?;
        if config.is_gt(degree, 0.0) {
            candidates.push((index, degree));
        }
    }

    // Stable: equal degrees keep block order.
    if highest {
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    } else {
        candidates.sort_by(|a, b| a.1.total_cmp(&b.1));
    }
    for &(index, degree) in candidates.iter().take(limit) {
        rules[index].activate(degree, implication, outputs)?;
    }
    Ok(())
}

fn threshold_activation(
    block: &mut RuleBlock,
    comparison: Comparison,
    threshold: f64,
    inputs: &[InputVariable],
    outputs: &mut [OutputVariable],
    scope: &Scope,
) -> FuzzyResult<()> {
    let (conjunction, disjunction, implication) =
        (block.conjunction(), block.disjunction(), block.implication());
    let config = scope.config;
    for rule in block.rules_mut() {
        rule.deactivate();
        if !rule.is_loaded() {
            continue;
        }
        let degree = rule.compute_activation_degree(
            conjunction,
            disjunction,
            VariableSet::new(inputs, outputs),
            scope,
        )?;
        if comparison.activates(degree, threshold, &config) {
            rule.activate(degree, implication, outputs)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::norm::{SNorm, TNorm};
    use crate::rule::Rule;
    use crate::term::Term;

    /// One input whose terms give degrees 0.2, 0.0, 0.8, 0.5, 0.8 at x = 1.
    fn fixture() -> (Vec<InputVariable>, Vec<OutputVariable>, RuleBlock) {
        let degrees = [0.2, 0.0, 0.8, 0.5, 0.8];
        let mut input = InputVariable::new("x", 0.0, 1.0);
        for (i, degree) in degrees.iter().enumerate() {
            input
                .add_term(Term::ramp(format!("t{}", i), 0.0, 1.0).with_height(*degree))
                .unwrap();
        }
        input.set_value(1.0);
        let output = OutputVariable::new("y", 0.0, 1.0)
            .with_term(Term::ramp("up", 0.0, 1.0))
            .unwrap();
        let inputs = vec![input];
        let outputs = vec![output];
        let mut block = RuleBlock::new("rules")
            .with_conjunction(TNorm::Minimum)
            .with_disjunction(SNorm::Maximum)
            .with_implication(TNorm::Minimum);
        for i in 0..degrees.len() {
            block.add_rule(Rule::new(format!("if x is t{} then y is up", i)));
        }
        block
            .load_rules(VariableSet::new(&inputs, &outputs))
            .unwrap();
        (inputs, outputs, block)
    }

    fn activated(activation: Activation) -> Vec<usize> {
        let (inputs, mut outputs, mut block) = fixture();
        block.set_activation(activation);
        block
            .activate(&inputs, &mut outputs, &Scope::default())
            .unwrap();
        block
            .rules()
            .iter()
            .enumerate()
            .filter(|(_, rule)| rule.is_activated())
            .map(|(index, _)| index)
            .collect()
    }

    #[test]
    fn test_general_activates_positive_rules() {
        assert_eq!(activated(Activation::General), vec![0, 2, 3, 4]);
    }

    #[test]
    fn test_first_and_last() {
        assert_eq!(activated(Activation::first(2)), vec![0, 2]);
        assert_eq!(activated(Activation::last(2)), vec![3, 4]);
        assert_eq!(activated(Activation::first(10)), vec![0, 2, 3, 4]);
        assert!(activated(Activation::first(0)).is_empty());
    }

    #[test]
    fn test_highest_and_lowest() {
        // Ties between rules 2 and 4 keep block order.
        assert_eq!(activated(Activation::highest(1)), vec![2]);
        assert_eq!(activated(Activation::highest(3)), vec![2, 3, 4]);
        assert_eq!(activated(Activation::lowest(2)), vec![0, 3]);
        assert_eq!(activated(Activation::highest(-1)), vec![0]);
        assert_eq!(activated(Activation::lowest(-1)), vec![2]);
    }

    #[test]
    fn test_threshold() {
        assert_eq!(
            activated(Activation::threshold(Comparison::GreaterThanOrEqualTo, 0.5)),
            vec![2, 3, 4]
        );
        assert_eq!(
            activated(Activation::threshold(Comparison::EqualTo, 0.8)),
            vec![2, 4]
        );
        let config = EngineConfig::default();
        assert!(Comparison::GreaterThan.activates(0.6, 0.5, &config));
        assert!(!Comparison::GreaterThan.activates(0.5, 0.5, &config));
        assert!(!Comparison::GreaterThan.activates(0.4, 0.5, &config));
    }

    #[test]
    fn test_unloaded_rules_are_skipped() {
        let (inputs, mut outputs, mut block) = fixture();
        block.rules_mut()[0].unload();
        block
            .activate(&inputs, &mut outputs, &Scope::default())
            .unwrap();
        assert!(!block.rules()[0].is_activated());
        assert!(block.rules()[2].is_activated());
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("General".parse::<Activation>().unwrap(), Activation::General);
        assert_eq!("Highest 2".parse::<Activation>().unwrap(), Activation::highest(2));
        assert_eq!("First".parse::<Activation>().unwrap(), Activation::first(1));
        assert_eq!(
            "Threshold >= 0.5".parse::<Activation>().unwrap(),
            Activation::threshold(Comparison::GreaterThanOrEqualTo, 0.5)
        );
        assert_eq!(
            "Threshold".parse::<Activation>().unwrap(),
            Activation::threshold(Comparison::GreaterThan, 0.0)
        );
        assert!("First -1".parse::<Activation>().is_err());
        assert!("Random".parse::<Activation>().is_err());
        assert_eq!(Activation::threshold(Comparison::LessThan, 0.25).to_string(), "Threshold < 0.250");
        assert_eq!(Activation::last(3).to_string(), "Last 3");
        assert_eq!(Activation::General.to_string(), "General");
    }
}
