//! Fuzzy rules: `if antecedent then consequent [with weight]`.
//!
//! A rule keeps its text and is loaded against an engine's variables, which
//! parses the text and resolves variable and term names into indices. Only
//! loaded rules take part in activation.

mod antecedent;
mod block;
mod consequent;
mod expression;
mod parser;

pub use antecedent::Antecedent;
pub use block::RuleBlock;
pub use consequent::Consequent;
pub use expression::{Expression, Logical, Proposition};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::engine::Engine;
use crate::error::{FuzzyError, FuzzyResult};
use crate::metadata::SourceLocation;
use crate::norm::{SNorm, TNorm};
use crate::term::Scope;
use crate::variable::{OutputVariable, VariableSet};

fn default_weight() -> f64 {
    1.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule {
    text: String,
    #[serde(default = "default_weight")]
    weight: f64,
    #[serde(skip)]
    activation_degree: f64,
    #[serde(skip)]
    antecedent: Option<Antecedent>,
    #[serde(skip)]
    consequent: Option<Consequent>,
}

impl Rule {
    pub const IF: &'static str = "if";
    pub const IS: &'static str = "is";
    pub const THEN: &'static str = "then";
    pub const AND: &'static str = "and";
    pub const OR: &'static str = "or";
    pub const WITH: &'static str = "with";

    /// An unloaded rule with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            weight: 1.0,
            activation_degree: 0.0,
            antecedent: None,
            consequent: None,
        }
    }

    /// Creates a rule from text and loads it against the engine's variables.
    #[track_caller]
    pub fn parse(text: impl Into<String>, engine: &Engine) -> FuzzyResult<Self> {
        let mut rule = Rule::new(text);
        rule.load(engine.variable_set())?;
        Ok(rule)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replaces the text. The rule is unloaded until loaded again.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.unload();
    }

    pub fn weight(&self) -> f64 {
        self.weight
    }

    pub fn set_weight(&mut self, weight: f64) {
        self.weight = weight;
    }

    pub fn activation_degree(&self) -> f64 {
        self.activation_degree
    }

    pub fn antecedent(&self) -> Option<&Antecedent> {
        self.antecedent.as_ref()
    }

    pub fn consequent(&self) -> Option<&Consequent> {
        self.consequent.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.antecedent.is_some() && self.consequent.is_some()
    }

    /// Parses the text, resolving names against `variables`. A weight given
    /// with `with` replaces the current one. Errors carry the location of
    /// the caller.
    #[track_caller]
    pub fn load(&mut self, variables: VariableSet<'_>) -> FuzzyResult<()> {
        let location = SourceLocation::caller();
        self.unload();
        let parsed = parser::parse_rule(&self.text, variables, &location)?;
        if let Some(weight) = parsed.weight {
            self.weight = weight;
        }
        self.antecedent = Some(parsed.antecedent);
        self.consequent = Some(parsed.consequent);
        Ok(())
    }

    pub fn unload(&mut self) {
        self.deactivate();
        self.antecedent = None;
        self.consequent = None;
    }

    /// Weighted degree of the antecedent for the current variable values.
    pub fn compute_activation_degree(
        &self,
        conjunction: Option<TNorm>,
        disjunction: Option<SNorm>,
        variables: VariableSet<'_>,
        scope: &Scope,
    ) -> FuzzyResult<f64> {
        let antecedent = self.antecedent.as_ref().ok_or_else(|| self.not_loaded())?;
        let degree = antecedent.activation_degree(conjunction, disjunction, variables, scope)?;
        Ok(self.weight * degree)
    }

    /// Records `activation_degree` and, when positive, adds the consequent
    /// terms to the output variables.
    pub fn activate(
        &mut self,
        activation_degree: f64,
        implication: Option<TNorm>,
        outputs: &mut [OutputVariable],
    ) -> FuzzyResult<()> {
        let consequent = self.consequent.as_ref().ok_or_else(|| self.not_loaded())?;
        self.activation_degree = activation_degree;
        if activation_degree > 0.0 {
            consequent.modify(activation_degree, implication, outputs)?;
        }
        Ok(())
    }

    /// Resets the activation degree. Terms already added to output
    /// variables stay there until their fuzzy outputs are cleared.
    pub fn deactivate(&mut self) {
        self.activation_degree = 0.0;
    }

    pub fn is_activated(&self) -> bool {
        self.activation_degree > 0.0
    }

    fn not_loaded(&self) -> FuzzyError {
        FuzzyError::RuleNotLoaded {
            rule: self.text.clone(),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}
