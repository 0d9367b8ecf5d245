use std::fmt;

use super::expression::Proposition;
use crate::error::{FuzzyError, FuzzyResult};
use crate::hedge::apply_chain;
use crate::norm::TNorm;
use crate::variable::{OutputVariable, VariableRef};

/// The `then` part of a rule: output propositions joined by `and`.
#[derive(Debug, Clone, PartialEq)]
pub struct Consequent {
    conclusions: Vec<Proposition>,
}

impl Consequent {
    pub fn new(conclusions: Vec<Proposition>) -> Self {
        Self { conclusions }
    }

    pub fn conclusions(&self) -> &[Proposition] {
        &self.conclusions
    }

    /// Adds the activated term of every conclusion to its output variable.
    ///
    /// Conclusions over disabled variables are skipped. Hedges modify the
    /// degree of their own conclusion only.
    pub fn modify(
        &self,
        activation_degree: f64,
        implication: Option<TNorm>,
        outputs: &mut [OutputVariable],
    ) -> FuzzyResult<()> {
        for proposition in &self.conclusions {
            let VariableRef::Output(index) = proposition.reference() else {
                continue;
            };
            let output = outputs
                .get_mut(index)
                .ok_or_else(|| FuzzyError::not_found("output variable", proposition.variable()))?;
            if !output.is_enabled() {
                continue;
            }
            if let Some(term) = proposition.term_index() {
                let degree = apply_chain(proposition.hedges(), activation_degree);
                output.fuzzy_output_mut().add_term(term, degree, implication);
            }
        }
        Ok(())
    }

    /// Indices of the output variables this consequent writes to.
    pub fn outputs(&self) -> impl Iterator<Item = usize> + '_ {
        self.conclusions
            .iter()
            .filter_map(|proposition| match proposition.reference() {
                VariableRef::Output(index) => Some(index),
                VariableRef::Input(_) => None,
            })
    }
}

impl fmt::Display for Consequent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, proposition) in self.conclusions.iter().enumerate() {
            if i > 0 {
                f.write_str(" and ")?;
            }
            write!(f, "{}", proposition)?;
        }
        Ok(())
    }
}
