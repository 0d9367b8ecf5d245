use std::fmt;

use super::expression::{Expression, Logical};
use crate::error::FuzzyResult;
use crate::norm::{SNorm, TNorm};
use crate::term::Scope;
use crate::variable::VariableSet;

/// The `if` part of a rule.
#[derive(Debug, Clone, PartialEq)]
pub struct Antecedent {
    root: Expression,
}

impl Antecedent {
    pub fn new(root: Expression) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &Expression {
        &self.root
    }

    pub fn activation_degree(
        &self,
        conjunction: Option<TNorm>,
        disjunction: Option<SNorm>,
        variables: VariableSet<'_>,
        scope: &Scope,
    ) -> FuzzyResult<f64> {
        self.root.evaluate(conjunction, disjunction, variables, scope)
    }

    pub fn requires_conjunction(&self) -> bool {
        self.root.uses(Logical::And)
    }

    pub fn requires_disjunction(&self) -> bool {
        self.root.uses(Logical::Or)
    }
}

impl fmt::Display for Antecedent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)
    }
}
