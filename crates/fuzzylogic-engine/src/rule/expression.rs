//! Expression tree of rule antecedents.

use std::fmt;

use crate::error::{FuzzyError, FuzzyResult};
use crate::hedge::{apply_chain, Hedge};
use crate::norm::{SNorm, TNorm};
use crate::term::Scope;
use crate::variable::{bound, VariableRef, VariableSet};

/// Logical connective between two antecedent expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Logical {
    And,
    Or,
}

impl Logical {
    pub fn keyword(self) -> &'static str {
        match self {
            Logical::And => "and",
            Logical::Or => "or",
        }
    }
}

/// `variable is [hedge]* term`, resolved against the engine's variables.
#[derive(Debug, Clone, PartialEq)]
pub struct Proposition {
    variable: String,
    reference: VariableRef,
    hedges: Vec<Hedge>,
    /// Term name and index; absent when the hedge chain ends with `any`.
    term: Option<(String, usize)>,
}

impl Proposition {
    pub(crate) fn new(
        variable: String,
        reference: VariableRef,
        hedges: Vec<Hedge>,
        term: Option<(String, usize)>,
    ) -> Self {
        Self {
            variable,
            reference,
            hedges,
            term,
        }
    }

    pub fn variable(&self) -> &str {
        &self.variable
    }

    pub fn reference(&self) -> VariableRef {
        self.reference
    }

    pub fn hedges(&self) -> &[Hedge] {
        &self.hedges
    }

    pub fn term(&self) -> Option<&str> {
        self.term.as_ref().map(|(name, _)| name.as_str())
    }

    pub fn term_index(&self) -> Option<usize> {
        self.term.as_ref().map(|&(_, index)| index)
    }

    /// Degree to which the proposition holds for the current values.
    ///
    /// A disabled variable gives 0. Input variables are fuzzified at their
    /// value; output variables give the degree their fuzzy output holds for
    /// the term. Hedges then modify the result.
    pub fn evaluate(&self, variables: VariableSet<'_>, scope: &Scope) -> FuzzyResult<f64> {
        let variable = variables
            .variable(self.reference)
            .ok_or_else(|| FuzzyError::not_found("variable", &self.variable))?;
        if !variable.is_enabled() {
            return Ok(0.0);
        }
        let Some(term) = self.term_index() else {
            // Only `any` ends a chain without a term.
            return Ok(apply_chain(&self.hedges, f64::NAN));
        };
        let degree = match self.reference {
            VariableRef::Input(_) => {
                let mut value = variable.value();
                if variable.is_lock_value_in_range() {
                    value = bound(value, variable.minimum(), variable.maximum());
                }
                variable
                    .term_at(term)
                    .map_or(f64::NAN, |term| term.evaluate(value, scope))
            }
            VariableRef::Output(index) => variables
                .output(index)
                .map_or(f64::NAN, |output| output.fuzzy_output().activation_degree(term)),
        };
        Ok(apply_chain(&self.hedges, degree))
    }
}

impl fmt::Display for Proposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} is", self.variable)?;
        for hedge in &self.hedges {
            write!(f, " {}", hedge)?;
        }
        if let Some(term) = self.term() {
            write!(f, " {}", term)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Proposition(Proposition),
    Operator {
        operator: Logical,
        left: Box<Expression>,
        right: Box<Expression>,
    },
}

impl Expression {
    pub fn operator(operator: Logical, left: Expression, right: Expression) -> Self {
        Expression::Operator {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Recursive evaluation. A connective without a configured norm is an
    /// error, raised only when that connective is reached.
    pub fn evaluate(
        &self,
        conjunction: Option<TNorm>,
        disjunction: Option<SNorm>,
        variables: VariableSet<'_>,
        scope: &Scope,
    ) -> FuzzyResult<f64> {
        match self {
            Expression::Proposition(proposition) => proposition.evaluate(variables, scope),
            Expression::Operator {
                operator,
                left,
                right,
            } => {
                let a = left.evaluate(conjunction, disjunction, variables, scope)?;
                let b = right.evaluate(conjunction, disjunction, variables, scope)?;
                match operator {
                    Logical::And => conjunction
                        .map(|norm| norm.compute(a, b))
                        .ok_or(FuzzyError::MissingOperator {
                            operator: "conjunction",
                            keyword: "and",
                        }),
                    Logical::Or => disjunction
                        .map(|norm| norm.compute(a, b))
                        .ok_or(FuzzyError::MissingOperator {
                            operator: "disjunction",
                            keyword: "or",
                        }),
                }
            }
        }
    }

    /// Whether any `and`/`or` node is present.
    pub fn uses(&self, logical: Logical) -> bool {
        match self {
            Expression::Proposition(_) => false,
            Expression::Operator {
                operator,
                left,
                right,
            } => *operator == logical || left.uses(logical) || right.uses(logical),
        }
    }

    pub fn propositions(&self) -> Vec<&Proposition> {
        let mut found = Vec::new();
        self.collect_propositions(&mut found);
        found
    }

    fn collect_propositions<'a>(&'a self, found: &mut Vec<&'a Proposition>) {
        match self {
            Expression::Proposition(proposition) => found.push(proposition),
            Expression::Operator { left, right, .. } => {
                left.collect_propositions(found);
                right.collect_propositions(found);
            }
        }
    }

    fn fmt_child(&self, f: &mut fmt::Formatter<'_>, parent: Logical) -> fmt::Result {
        match self {
            Expression::Operator {
                operator: Logical::Or,
                ..
            } if parent == Logical::And => write!(f, "({})", self),
            _ => write!(f, "{}", self),
        }
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Proposition(proposition) => write!(f, "{}", proposition),
            Expression::Operator {
                operator,
                left,
                right,
            } => {
                left.fmt_child(f, *operator)?;
                write!(f, " {} ", operator.keyword())?;
                // Same-precedence chains associate to the left.
                match right.as_ref() {
                    Expression::Operator { operator: inner, .. } if inner == operator => {
                        write!(f, "({})", right)
                    }
                    _ => right.fmt_child(f, *operator),
                }
            }
        }
    }
}
