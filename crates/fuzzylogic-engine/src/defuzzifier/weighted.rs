//! Defuzzifiers for Takagi-Sugeno and Tsukamoto outputs.
//!
//! Each activated term contributes a weight `w` (its activation degree) and a
//! value `z`. Takagi-Sugeno terms give `z` by evaluating the term itself;
//! Tsukamoto terms give the point of their monotonic curve where the
//! membership equals `w`, bounded to the range of the output. A term that is
//! not monotonic is evaluated as Takagi-Sugeno even when Tsukamoto is asked
//! for. Implication operators are not involved.

use super::WeightedType;
use crate::term::FuzzyOutput;

/// Weight and value pairs of every activated term.
fn contributions<'a>(
    output: &'a FuzzyOutput<'a>,
    kind: WeightedType,
    minimum: f64,
    maximum: f64,
) -> impl Iterator<Item = (f64, f64)> + 'a {
    let scope = output.scope();
    output.activated().map(move |(activated, term)| {
        let w = activated.degree;
        let z = match kind.resolve(term) {
            WeightedType::Tsukamoto if term.is_monotonic() => {
                term.tsukamoto(w, minimum, maximum, &scope.config)
            }
            _ => term.evaluate(w, scope),
        };
        (w, z)
    })
}

/// Weighted average: Σw·z / Σw
pub fn weighted_average(
    output: &FuzzyOutput<'_>,
    kind: WeightedType,
    minimum: f64,
    maximum: f64,
) -> Option<f64> {
    if output.is_empty() {
        return None;
    }
    let (sum, weights) = contributions(output, kind, minimum, maximum)
        .fold((0.0, 0.0), |(sum, weights), (w, z)| (sum + w * z, weights + w));
    Some(sum / weights)
}

/// Weighted sum: Σw·z
pub fn weighted_sum(
    output: &FuzzyOutput<'_>,
    kind: WeightedType,
    minimum: f64,
    maximum: f64,
) -> Option<f64> {
    if output.is_empty() {
        return None;
    }
    Some(
        contributions(output, kind, minimum, maximum)
            .map(|(w, z)| w * z)
            .sum(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::{Accumulated, Scope, Shape, Term};
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_takagi_sugeno_average() {
        let terms = vec![Term::constant("low", 5.0), Term::constant("high", 10.0)];
        let scope = Scope::default();
        let mut accumulated = Accumulated::new(0.0, 10.0, None);
        accumulated.add_term(0, 0.3, None);
        accumulated.add_term(1, 0.7, None);
        let output = accumulated.view(&terms, &scope);

        let average = weighted_average(&output, WeightedType::Automatic, 0.0, 10.0).unwrap();
        assert_abs_diff_eq!(average, 8.5, epsilon = 1e-12);
        let sum = weighted_sum(&output, WeightedType::TakagiSugeno, 0.0, 10.0).unwrap();
        assert_abs_diff_eq!(sum, 8.5, epsilon = 1e-12);
    }

    #[test]
    fn test_tsukamoto_ramp() {
        let terms = vec![Term::ramp("rising", 0.0, 10.0)];
        let scope = Scope::default();
        let mut accumulated = Accumulated::new(0.0, 10.0, None);
        accumulated.add_term(0, 0.4, None);
        let output = accumulated.view(&terms, &scope);
        let value = weighted_average(&output, WeightedType::Automatic, 0.0, 10.0).unwrap();
        assert_abs_diff_eq!(value, 4.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tsukamoto_stays_in_range() {
        let terms = vec![Term::ramp("rising", 0.0, 20.0)];
        let scope = Scope::default();
        let mut accumulated = Accumulated::new(0.0, 10.0, None);
        accumulated.add_term(0, 0.9, None);
        let output = accumulated.view(&terms, &scope);
        let value = weighted_average(&output, WeightedType::Automatic, 0.0, 10.0).unwrap();
        assert_abs_diff_eq!(value, 10.0, epsilon = 1e-12);
    }

    #[test]
    fn test_tsukamoto_zero_degree_concave() {
        let terms = vec![
            Term::new(
                "near",
                Shape::Concave {
                    inflection: 5.0,
                    end: 10.0,
                },
            ),
            Term::ramp("rising", 0.0, 10.0),
        ];
        let scope = Scope::default();
        let mut accumulated = Accumulated::new(0.0, 10.0, None);
        accumulated.add_term(0, 0.0, None);
        accumulated.add_term(1, 0.5, None);
        let output = accumulated.view(&terms, &scope);

        let average = weighted_average(&output, WeightedType::Automatic, 0.0, 10.0).unwrap();
        assert_abs_diff_eq!(average, 5.0, epsilon = 1e-12);
        let sum = weighted_sum(&output, WeightedType::Tsukamoto, 0.0, 10.0).unwrap();
        assert_abs_diff_eq!(sum, 2.5, epsilon = 1e-12);
    }

    #[test]
    fn test_tsukamoto_curved_shapes() {
        let terms = vec![
            Term::new(
                "s",
                Shape::SShape {
                    start: 0.0,
                    end: 10.0,
                },
            ),
            Term::new(
                "z",
                Shape::ZShape {
                    start: 0.0,
                    end: 10.0,
                },
            ),
            Term::new(
                "sigmoid",
                Shape::Sigmoid {
                    inflection: 5.0,
                    slope: 1.0,
                },
            ),
        ];
        let scope = Scope::default();
        let mut accumulated = Accumulated::new(0.0, 10.0, None);
        accumulated.add_term(0, 0.125, None);
        accumulated.add_term(1, 0.125, None);
        accumulated.add_term(2, 0.5, None);
        let output = accumulated.view(&terms, &scope);

        // 0.125 * 2.5 + 0.125 * 7.5 + 0.5 * 5
        let sum = weighted_sum(&output, WeightedType::Automatic, 0.0, 10.0).unwrap();
        assert_abs_diff_eq!(sum, 3.75, epsilon = 1e-9);
        let average = weighted_average(&output, WeightedType::Automatic, 0.0, 10.0).unwrap();
        assert_abs_diff_eq!(average, 5.0, epsilon = 1e-9);
    }

    #[test]
    fn test_tsukamoto_evaluates_non_monotonic_terms() {
        let terms = vec![Term::constant("k", 7.0), Term::ramp("rising", 0.0, 10.0)];
        let scope = Scope::default();
        let mut accumulated = Accumulated::new(0.0, 10.0, None);
        accumulated.add_term(0, 0.5, None);
        let output = accumulated.view(&terms, &scope);
        let value = weighted_average(&output, WeightedType::Tsukamoto, 0.0, 10.0).unwrap();
        assert_abs_diff_eq!(value, 7.0, epsilon = 1e-12);

        accumulated.add_term(1, 0.5, None);
        let output = accumulated.view(&terms, &scope);
        // 0.5 * 7 + 0.5 * 5
        let sum = weighted_sum(&output, WeightedType::Tsukamoto, 0.0, 10.0).unwrap();
        assert_abs_diff_eq!(sum, 6.0, epsilon = 1e-12);
    }

    #[test]
    fn test_empty_output() {
        let terms = vec![Term::constant("c", 1.0)];
        let scope = Scope::default();
        let accumulated = Accumulated::new(0.0, 10.0, None);
        let output = accumulated.view(&terms, &scope);
        assert!(weighted_average(&output, WeightedType::Automatic, 0.0, 10.0).is_none());
        assert!(weighted_sum(&output, WeightedType::Automatic, 0.0, 10.0).is_none());
    }

    #[test]
    fn test_zero_weights_give_nan() {
        let terms = vec![Term::constant("c", 1.0)];
        let scope = Scope::default();
        let mut accumulated = Accumulated::new(0.0, 10.0, None);
        accumulated.add_term(0, 0.0, None);
        let output = accumulated.view(&terms, &scope);
        let value = weighted_average(&output, WeightedType::TakagiSugeno, 0.0, 10.0).unwrap();
        assert!(value.is_nan());
    }
}
