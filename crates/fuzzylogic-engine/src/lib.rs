//! # Fuzzylogic Engine
//!
//! **Fuzzy logic inference for Mamdani, Takagi-Sugeno and Tsukamoto controllers**
//!
//! This crate models fuzzy sets, linguistic variables and fuzzy rules, and
//! runs them through an evaluation cycle that turns crisp input values into
//! crisp output values.
//!
//! ## Overview
//!
//! An [`Engine`] owns input variables, output variables and rule blocks. Each
//! cycle of [`Engine::process`]:
//!
//! 1. clears the fuzzy output of every output variable,
//! 2. evaluates the antecedent of every rule against the input values,
//! 3. lets each block's [`Activation`] strategy decide which rules fire,
//! 4. adds the consequent terms of fired rules to the fuzzy outputs,
//! 5. defuzzifies every output variable into a crisp value.
//!
//! ## Core Components
//!
//! ### Operators
//! - **T-norms** ([`TNorm`]) for `and` and implication, **S-norms** ([`SNorm`])
//!   for `or` and accumulation
//! - **Hedges** ([`Hedge`]): `not`, `seldom`, `somewhat`, `very`, `extremely`, `any`
//!
//! ### Terms ([`Term`])
//! Twenty-one membership function shapes ([`Shape`]), from `Triangle` and
//! `Gaussian` to `Linear` and `Function` terms that read the values of other
//! variables. [`Accumulated`] holds the activated terms of an output.
//!
//! ### Rules ([`Rule`], [`RuleBlock`])
//! Rules are written as text and loaded against the engine:
//!
//! ```text
//! if service is poor or food is rancid then tip is cheap
//! if service is very good and food is delicious then tip is generous with 0.8
//! ```
//!
//! ### Defuzzifiers ([`Defuzzifier`])
//! Integral methods (Centroid, Bisector, Smallest/Largest/Mean of Maximum)
//! and weighted methods (WeightedAverage, WeightedSum).
//!
//! ## Quick Start
//!
//! ```rust
//! use fuzzylogic_engine::{
//!     Engine, InputVariable, OperatorConfig, OutputVariable, Rule, RuleBlock, Term,
//! };
//!
//! let mut engine = Engine::new("tipper")
//!     .with_input_variable(
//!         InputVariable::new("service", 0.0, 10.0)
//!             .with_term(Term::triangle("poor", 0.0, 0.0, 5.0))?
//!             .with_term(Term::triangle("good", 5.0, 10.0, 10.0))?,
//!     )
//!     .with_output_variable(
//!         OutputVariable::new("tip", 0.0, 30.0)
//!             .with_term(Term::triangle("cheap", 0.0, 5.0, 10.0))?
//!             .with_term(Term::triangle("generous", 20.0, 25.0, 30.0))?,
//!     )
//!     .with_rule_block(
//!         RuleBlock::new("rules")
//!             .with_rule(Rule::new("if service is poor then tip is cheap"))
//!             .with_rule(Rule::new("if service is good then tip is generous")),
//!     );
//! engine.configure(&OperatorConfig::mamdani());
//! engine.load()?;
//! assert!(engine.is_ready());
//!
//! engine.set_input_value("service", 9.0)?;
//! engine.process()?;
//! let tip = engine.output_value("tip")?;
//! assert!(tip > 20.0 && tip < 30.0);
//! # Ok::<(), fuzzylogic_engine::FuzzyError>(())
//! ```
//!
//! ## Errors
//!
//! Configuration errors (unknown names, malformed rule text, missing
//! operators) are reported as [`FuzzyError`] with the source location of the
//! call that loaded the rule. Numeric degeneracies are not errors: an output
//! that cannot be defuzzified falls back to its previous or default value.
//!
//! ## Architecture
//!
//! - **norm**, **hedge**: scalar operators
//! - **term**: membership functions, formulas, activated and accumulated terms
//! - **variable**: input and output variables
//! - **rule**: rule parsing, antecedent and consequent evaluation, rule blocks
//! - **[`activation`]**: rule activation strategies
//! - **[`defuzzifier`]**: integral and weighted defuzzifiers
//! - **engine**: the evaluation cycle and engine management
//! - **[`factory`]**: name-keyed registries for text-driven configuration
//! - **[`serialization`]**: versioned JSON
//! - **config**: numeric settings and operator presets

pub mod activation;
mod config;
pub mod defuzzifier;
mod display;
mod engine;
mod error;
pub mod factory;
mod hedge;
mod metadata;
mod norm;
mod rule;
pub mod serialization;
mod term;
mod variable;

#[cfg(test)]
mod tests;

pub use activation::{Activation, Comparison};
pub use config::{EngineConfig, OperatorConfig, OperatorConfigBuilder};
pub use defuzzifier::{Defuzzifier, IntegralMethod, WeightedMethod, WeightedType};
pub use engine::{Engine, EngineType};
pub use error::{FuzzyError, FuzzyResult};
pub use hedge::{apply_chain, Hedge};
pub use metadata::SourceLocation;
pub use norm::{SNorm, TNorm};
pub use rule::{Antecedent, Consequent, Expression, Logical, Proposition, Rule, RuleBlock};
pub use serialization::{VersionedEngine, FORMAT_VERSION};
pub use term::{
    Accumulated, Activated, BinaryOperator, Builtin, Direction, Function, FuzzyOutput, Node,
    Scope, Shape, Term, UnaryOperator,
};
pub use variable::{InputVariable, OutputVariable, Variable, VariableRef, VariableSet};
