//! Canonical text of engines and their components.
//!
//! The layout is one `key: value` line per property with components nested
//! under their owner:
//!
//! ```text
//! Engine: tipper
//! InputVariable: service
//!   enabled: true
//!   range: 0.000 10.000
//!   lock-range: false
//!   term: poor Triangle 0.000 0.000 5.000
//! OutputVariable: tip
//!   ...
//!   accumulation: Maximum
//!   defuzzifier: Centroid 100
//!   default: nan
//!   lock-previous: false
//! RuleBlock: rules
//!   ...
//!   activation: General
//!   rule: if service is poor then tip is cheap
//! ```
//!
//! Scalars are printed with the engine's configured decimals; standalone
//! components use the default configuration.

use std::fmt::{self, Display, Formatter};

use crate::config::EngineConfig;
use crate::engine::Engine;
use crate::rule::{Rule, RuleBlock};
use crate::variable::{InputVariable, OutputVariable, Variable};

const INDENT: &str = "  ";

fn optional<T: Display>(value: Option<T>) -> String {
    value.map_or_else(|| "none".to_string(), |value| value.to_string())
}

fn write_variable_header(
    f: &mut Formatter<'_>,
    kind: &str,
    variable: &Variable,
    config: &EngineConfig,
) -> fmt::Result {
    writeln!(f, "{}: {}", kind, variable.name())?;
    if !variable.description().is_empty() {
        writeln!(f, "{}description: {}", INDENT, variable.description())?;
    }
    writeln!(f, "{}enabled: {}", INDENT, variable.is_enabled())?;
    writeln!(
        f,
        "{}range: {} {}",
        INDENT,
        config.format_scalar(variable.minimum()),
        config.format_scalar(variable.maximum())
    )?;
    writeln!(f, "{}lock-range: {}", INDENT, variable.is_lock_value_in_range())
}

fn write_terms(f: &mut Formatter<'_>, variable: &Variable, config: &EngineConfig) -> fmt::Result {
    for term in variable.terms() {
        f.write_str(INDENT)?;
        term.fmt_fll(f, config)?;
        writeln!(f)?;
    }
    Ok(())
}

fn write_input(f: &mut Formatter<'_>, input: &InputVariable, config: &EngineConfig) -> fmt::Result {
    write_variable_header(f, "InputVariable", input, config)?;
    write_terms(f, input, config)
}

fn write_output(
    f: &mut Formatter<'_>,
    output: &OutputVariable,
    config: &EngineConfig,
) -> fmt::Result {
    write_variable_header(f, "OutputVariable", output, config)?;
    writeln!(f, "{}accumulation: {}", INDENT, optional(output.accumulation()))?;
    writeln!(f, "{}defuzzifier: {}", INDENT, optional(output.defuzzifier()))?;
    writeln!(f, "{}default: {}", INDENT, config.format_scalar(output.default_value()))?;
    writeln!(f, "{}lock-previous: {}", INDENT, output.is_lock_previous_value())?;
    write_terms(f, output, config)
}

fn write_rule(f: &mut Formatter<'_>, rule: &Rule, config: &EngineConfig) -> fmt::Result {
    write!(f, "{}rule: {}", INDENT, rule.text())?;
    let has_weight = rule
        .text()
        .split_whitespace()
        .any(|token| token == Rule::WITH);
    if !has_weight && !config.is_eq(rule.weight(), 1.0) {
        write!(f, " {} {}", Rule::WITH, config.format_scalar(rule.weight()))?;
    }
    writeln!(f)
}

fn write_block(f: &mut Formatter<'_>, block: &RuleBlock, config: &EngineConfig) -> fmt::Result {
    writeln!(f, "RuleBlock: {}", block.name())?;
    if !block.description().is_empty() {
        writeln!(f, "{}description: {}", INDENT, block.description())?;
    }
    writeln!(f, "{}enabled: {}", INDENT, block.is_enabled())?;
    writeln!(f, "{}conjunction: {}", INDENT, optional(block.conjunction()))?;
    writeln!(f, "{}disjunction: {}", INDENT, optional(block.disjunction()))?;
    writeln!(f, "{}implication: {}", INDENT, optional(block.implication()))?;
    let activation = block.activation();
    let parameters = activation.parameters(config);
    if parameters.is_empty() {
        writeln!(f, "{}activation: {}", INDENT, activation.name())?;
    } else {
        writeln!(f, "{}activation: {} {}", INDENT, activation.name(), parameters)?;
    }
    for rule in block.rules() {
        write_rule(f, rule, config)?;
    }
    Ok(())
}

impl Display for InputVariable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_input(f, self, &EngineConfig::default())
    }
}

impl Display for OutputVariable {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_output(f, self, &EngineConfig::default())
    }
}

impl Display for RuleBlock {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write_block(f, self, &EngineConfig::default())
    }
}

impl Display for Engine {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let config = self.config();
        writeln!(f, "Engine: {}", self.name())?;
        if !self.description().is_empty() {
            writeln!(f, "description: {}", self.description())?;
        }
        for input in self.input_variables() {
            write_input(f, input, config)?;
        }
        for output in self.output_variables() {
            write_output(f, output, config)?;
        }
        for block in self.rule_blocks() {
            write_block(f, block, config)?;
        }
        Ok(())
    }
}
