use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::norm::{SNorm, TNorm};
use crate::serialization::scalar;
use crate::term::{Activated, Scope, Term};

/// Fuzzy output of an output variable: the activated terms of one cycle
/// folded with the accumulation S-norm.
///
/// With an accumulation norm, adding a term that is already present folds
/// the new degree into the existing entry. Without one, every activation is
/// kept and memberships are summed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Accumulated {
    #[serde(with = "scalar")]
    minimum: f64,
    #[serde(with = "scalar")]
    maximum: f64,
    accumulation: Option<SNorm>,
    #[serde(skip)]
    terms: Vec<Activated>,
}

impl Default for Accumulated {
    fn default() -> Self {
        Self::new(f64::NEG_INFINITY, f64::INFINITY, None)
    }
}

impl Accumulated {
    pub fn new(minimum: f64, maximum: f64, accumulation: Option<SNorm>) -> Self {
        Self {
            minimum,
            maximum,
            accumulation,
            terms: Vec::new(),
        }
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    pub fn set_range(&mut self, minimum: f64, maximum: f64) {
        self.minimum = minimum;
        self.maximum = maximum;
    }

    pub fn accumulation(&self) -> Option<SNorm> {
        self.accumulation
    }

    pub fn set_accumulation(&mut self, accumulation: Option<SNorm>) {
        self.accumulation = accumulation;
    }

    pub fn terms(&self) -> &[Activated] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn add_term(&mut self, term: usize, degree: f64, implication: Option<TNorm>) {
        if let Some(accumulation) = self.accumulation {
            if let Some(existing) = self.terms.iter_mut().find(|a| a.term == term) {
                existing.degree = accumulation.compute(existing.degree, degree);
                return;
            }
        }
        self.terms.push(Activated::new(term, degree, implication));
    }

    /// Degree to which `term` was activated, folding repeated activations.
    pub fn activation_degree(&self, term: usize) -> f64 {
        self.terms
            .iter()
            .filter(|activated| activated.term == term)
            .fold(0.0, |result, activated| match self.accumulation {
                Some(accumulation) => accumulation.compute(result, activated.degree),
                None => result + activated.degree,
            })
    }

    pub fn clear(&mut self) {
        self.terms.clear();
    }

    /// Evaluation view over the terms of the owning variable.
    pub fn view<'a>(&'a self, terms: &'a [Term], scope: &'a Scope) -> FuzzyOutput<'a> {
        FuzzyOutput {
            accumulated: self,
            terms,
            scope,
        }
    }
}

/// Read-only view pairing a fuzzy output with the terms its activations
/// point to and the engine values those terms may read.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyOutput<'a> {
    accumulated: &'a Accumulated,
    terms: &'a [Term],
    scope: &'a Scope,
}

impl<'a> FuzzyOutput<'a> {
    pub fn accumulated(&self) -> &'a Accumulated {
        self.accumulated
    }

    pub fn scope(&self) -> &'a Scope {
        self.scope
    }

    pub fn config(&self) -> &'a EngineConfig {
        &self.scope.config
    }

    pub fn is_empty(&self) -> bool {
        self.accumulated.is_empty()
    }

    /// Activated entries paired with the terms they refer to. Entries whose
    /// term no longer exists are left out.
    pub fn activated(&self) -> impl Iterator<Item = (&'a Activated, &'a Term)> + 'a {
        let terms = self.terms;
        self.accumulated
            .terms
            .iter()
            .filter_map(move |activated| terms.get(activated.term).map(|term| (activated, term)))
    }

    pub fn membership(&self, x: f64) -> f64 {
        if x.is_nan() {
            return f64::NAN;
        }
        let accumulation = self.accumulated.accumulation;
        self.activated().fold(0.0, |result, (activated, term)| {
            let y = activated.membership(x, term, self.scope);
            match accumulation {
                Some(accumulation) => accumulation.compute(result, y),
                None => result + y,
            }
        })
    }
}
