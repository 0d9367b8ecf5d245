use serde::{Deserialize, Serialize};

use crate::norm::TNorm;
use crate::term::{Scope, Term};

/// A consequent term fired to some degree.
///
/// `term` is the position of the term in its output variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Activated {
    pub term: usize,
    pub degree: f64,
    pub implication: Option<TNorm>,
}

impl Activated {
    pub fn new(term: usize, degree: f64, implication: Option<TNorm>) -> Self {
        Self {
            term,
            degree,
            implication,
        }
    }

    /// `implication(degree, term(x))`, or `min(degree, term(x))` when no
    /// implication is configured.
    pub fn membership(&self, x: f64, term: &Term, scope: &Scope) -> f64 {
        let y = term.evaluate(x, scope);
        match self.implication {
            Some(implication) => implication.compute(self.degree, y),
            None => self.degree.min(y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_clipping_and_scaling() {
        let term = Term::triangle("A", 0.0, 1.0, 2.0);
        let scope = Scope::default();
        let clipped = Activated::new(0, 0.4, Some(TNorm::Minimum));
        let scaled = Activated::new(0, 0.4, Some(TNorm::AlgebraicProduct));
        assert_abs_diff_eq!(clipped.membership(1.0, &term, &scope), 0.4, epsilon = 1e-12);
        assert_abs_diff_eq!(scaled.membership(0.5, &term, &scope), 0.2, epsilon = 1e-12);
    }

    #[test]
    fn test_without_implication_uses_min() {
        let term = Term::triangle("A", 0.0, 1.0, 2.0);
        let activated = Activated::new(0, 0.7, None);
        assert_abs_diff_eq!(
            activated.membership(0.5, &term, &Scope::default()),
            0.5,
            epsilon = 1e-12
        );
    }
}
