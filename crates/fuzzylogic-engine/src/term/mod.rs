//! Membership functions (terms) and the fuzzy-output aggregates built on them.
//!
//! A [`Term`] pairs a name and a height with one of the [`Shape`]s below.
//! Most shapes are pure functions of `x`. `Linear` and `Function` also read
//! the current values of the engine's variables, which the engine hands over
//! as a [`Scope`] snapshot rather than through a back-pointer.

mod accumulated;
mod activated;
mod function;

pub use accumulated::{Accumulated, FuzzyOutput};
pub use activated::Activated;
pub use function::{BinaryOperator, Builtin, Function, Node, UnaryOperator};

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::error::{FuzzyError, FuzzyResult};
use crate::variable::bound;

/// Snapshot of engine values visible to terms during evaluation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Scope {
    /// Values of the input variables, in engine order
    pub inputs: Vec<f64>,
    /// Values of the output variables, in engine order
    pub outputs: Vec<f64>,
    pub config: EngineConfig,
}

impl Scope {
    pub fn new(inputs: Vec<f64>, outputs: Vec<f64>, config: EngineConfig) -> Self {
        Self {
            inputs,
            outputs,
            config,
        }
    }

    /// A scope with no variables, for evaluating pure shapes.
    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }
}

/// Direction in which a ramp rises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Positive,
    Zero,
    Negative,
}

/// Shapes of membership functions and their parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    /// Generalized bell: 1 / (1 + |(x - center) / width|^(2 slope))
    Bell { center: f64, width: f64, slope: f64 },
    /// Step at `start`, active on the side `direction` points to
    Binary { start: f64, direction: f64 },
    /// Monotonic concave curve reaching 1 at `end`
    Concave { inflection: f64, end: f64 },
    /// Constant value, independent of x
    Constant { value: f64 },
    /// Raised cosine of the given width around `center`
    Cosine { center: f64, width: f64 },
    /// Piecewise linear interpolation over `(x, y)` points sorted by x
    Discrete { points: Vec<(f64, f64)> },
    /// Infix formula over `x` and engine variables
    Function(Function),
    Gaussian { mean: f64, standard_deviation: f64 },
    /// Gaussian left of `mean_a` times Gaussian right of `mean_b`
    GaussianProduct {
        mean_a: f64,
        standard_deviation_a: f64,
        mean_b: f64,
        standard_deviation_b: f64,
    },
    /// Linear combination of the input values plus an optional constant
    Linear { coefficients: Vec<f64> },
    /// S-shape rising to `top_left` times Z-shape falling from `top_right`
    PiShape {
        bottom_left: f64,
        top_left: f64,
        top_right: f64,
        bottom_right: f64,
    },
    Ramp { start: f64, end: f64 },
    Rectangle { start: f64, end: f64 },
    Sigmoid { inflection: f64, slope: f64 },
    /// |sigmoid(rising, left) - sigmoid(falling, right)|
    SigmoidDifference {
        left: f64,
        rising: f64,
        falling: f64,
        right: f64,
    },
    /// sigmoid(rising, left) * sigmoid(falling, right)
    SigmoidProduct {
        left: f64,
        rising: f64,
        falling: f64,
        right: f64,
    },
    /// exp(-|10 / width * (x - center)|)
    Spike { center: f64, width: f64 },
    SShape { start: f64, end: f64 },
    Trapezoid {
        vertex_a: f64,
        vertex_b: f64,
        vertex_c: f64,
        vertex_d: f64,
    },
    Triangle {
        vertex_a: f64,
        vertex_b: f64,
        vertex_c: f64,
    },
    ZShape { start: f64, end: f64 },
}

/// A named fuzzy set.
///
/// Serializes as its class name and parameter text, the same form
/// [`Term::configure`] reads back.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TermRecord", into = "TermRecord")]
pub struct Term {
    pub name: String,
    /// Scales the membership of every shape except `Constant`, `Linear` and `Function`
    pub height: f64,
    pub shape: Shape,
}

impl Term {
    /// Class names accepted by [`Term::configure`].
    pub const CLASSES: [&'static str; 21] = [
        "Bell",
        "Binary",
        "Concave",
        "Constant",
        "Cosine",
        "Discrete",
        "Function",
        "Gaussian",
        "GaussianProduct",
        "Linear",
        "PiShape",
        "Ramp",
        "Rectangle",
        "Sigmoid",
        "SigmoidDifference",
        "SigmoidProduct",
        "Spike",
        "SShape",
        "Trapezoid",
        "Triangle",
        "ZShape",
    ];

    pub fn new(name: impl Into<String>, shape: Shape) -> Self {
        Self {
            name: name.into(),
            height: 1.0,
            shape,
        }
    }

    pub fn with_height(mut self, height: f64) -> Self {
        self.height = height;
        self
    }

    pub fn triangle(name: impl Into<String>, vertex_a: f64, vertex_b: f64, vertex_c: f64) -> Self {
        Self::new(
            name,
            Shape::Triangle {
                vertex_a,
                vertex_b,
                vertex_c,
            },
        )
    }

    pub fn trapezoid(
        name: impl Into<String>,
        vertex_a: f64,
        vertex_b: f64,
        vertex_c: f64,
        vertex_d: f64,
    ) -> Self {
        Self::new(
            name,
            Shape::Trapezoid {
                vertex_a,
                vertex_b,
                vertex_c,
                vertex_d,
            },
        )
    }

    pub fn ramp(name: impl Into<String>, start: f64, end: f64) -> Self {
        Self::new(name, Shape::Ramp { start, end })
    }

    pub fn gaussian(name: impl Into<String>, mean: f64, standard_deviation: f64) -> Self {
        Self::new(
            name,
            Shape::Gaussian {
                mean,
                standard_deviation,
            },
        )
    }

    pub fn constant(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, Shape::Constant { value })
    }

    pub fn linear(name: impl Into<String>, coefficients: Vec<f64>) -> Self {
        Self::new(name, Shape::Linear { coefficients })
    }

    /// Parses `formula` into a function term. Variable names are resolved
    /// when the engine is loaded.
    pub fn function(name: impl Into<String>, formula: &str) -> FuzzyResult<Self> {
        Ok(Self::new(name, Shape::Function(Function::parse(formula)?)))
    }

    /// Membership of `x` without any engine values in view.
    pub fn membership(&self, x: f64) -> f64 {
        self.evaluate(x, &Scope::default())
    }

    /// Membership of `x` given the engine values in `scope`.
    pub fn evaluate(&self, x: f64, scope: &Scope) -> f64 {
        match &self.shape {
            Shape::Constant { value } => *value,
            Shape::Linear { coefficients } => linear(coefficients, &scope.inputs),
            Shape::Function(function) => function.evaluate(x, scope),
            _ if x.is_nan() => f64::NAN,
            shape => self.height * shape.unit_membership(x, &scope.config),
        }
    }

    pub fn class_name(&self) -> &'static str {
        match self.shape {
            Shape::Bell { .. } => "Bell",
            Shape::Binary { .. } => "Binary",
            Shape::Concave { .. } => "Concave",
            Shape::Constant { .. } => "Constant",
            Shape::Cosine { .. } => "Cosine",
            Shape::Discrete { .. } => "Discrete",
            Shape::Function(_) => "Function",
            Shape::Gaussian { .. } => "Gaussian",
            Shape::GaussianProduct { .. } => "GaussianProduct",
            Shape::Linear { .. } => "Linear",
            Shape::PiShape { .. } => "PiShape",
            Shape::Ramp { .. } => "Ramp",
            Shape::Rectangle { .. } => "Rectangle",
            Shape::Sigmoid { .. } => "Sigmoid",
            Shape::SigmoidDifference { .. } => "SigmoidDifference",
            Shape::SigmoidProduct { .. } => "SigmoidProduct",
            Shape::Spike { .. } => "Spike",
            Shape::SShape { .. } => "SShape",
            Shape::Trapezoid { .. } => "Trapezoid",
            Shape::Triangle { .. } => "Triangle",
            Shape::ZShape { .. } => "ZShape",
        }
    }

    /// Shapes that can be inverted for Tsukamoto defuzzification.
    pub fn is_monotonic(&self) -> bool {
        matches!(
            self.shape,
            Shape::Concave { .. }
                | Shape::Ramp { .. }
                | Shape::Sigmoid { .. }
                | Shape::SShape { .. }
                | Shape::ZShape { .. }
        )
    }

    /// Shapes whose value does not depend on `x` in a Takagi-Sugeno consequent.
    pub fn is_takagi_sugeno(&self) -> bool {
        matches!(
            self.shape,
            Shape::Constant { .. } | Shape::Linear { .. } | Shape::Function(_)
        )
    }

    /// The `x` at which a monotonic shape reaches `activation_degree`,
    /// bounded to `[minimum, maximum]`.
    ///
    /// Height is not taken into account. Non-monotonic shapes yield NaN.
    pub fn tsukamoto(
        &self,
        activation_degree: f64,
        minimum: f64,
        maximum: f64,
        config: &EngineConfig,
    ) -> f64 {
        let w = activation_degree;
        let z = match self.shape {
            Shape::Concave { inflection, end } => {
                if config.is_eq(w, 0.0) {
                    if config.is_le(inflection, end) {
                        minimum
                    } else {
                        maximum
                    }
                } else if config.is_eq(w, 1.0) {
                    end
                } else {
                    (inflection - end) / w + 2.0 * end - inflection
                }
            }
            Shape::Ramp { start, end } => start + w * (end - start),
            Shape::Sigmoid { inflection, slope } => {
                if config.is_eq(w, 1.0) {
                    if config.is_ge(slope, 0.0) {
                        maximum
                    } else {
                        minimum
                    }
                } else if config.is_eq(w, 0.0) {
                    if config.is_ge(slope, 0.0) {
                        minimum
                    } else {
                        maximum
                    }
                } else {
                    inflection + (1.0 / w - 1.0).ln() / -slope
                }
            }
            Shape::SShape { start, end } => {
                if config.is_le(w, 0.5) {
                    start + (end - start) * (w / 2.0).sqrt()
                } else {
                    end - (end - start) * ((1.0 - w) / 2.0).sqrt()
                }
            }
            Shape::ZShape { start, end } => {
                if config.is_ge(w, 0.5) {
                    start + (end - start) * ((1.0 - w) / 2.0).sqrt()
                } else {
                    end - (end - start) * (w / 2.0).sqrt()
                }
            }
            _ => return f64::NAN,
        };
        bound(z, minimum, maximum)
    }

    /// Direction of a ramp, `None` for other shapes.
    pub fn direction(&self, config: &EngineConfig) -> Option<Direction> {
        match self.shape {
            Shape::Ramp { start, end } => Some(if config.is_gt(end, start) {
                Direction::Positive
            } else if config.is_lt(end, start) {
                Direction::Negative
            } else {
                Direction::Zero
            }),
            _ => None,
        }
    }

    /// The shape parameters as they are written in engine text, followed by
    /// the height when it differs from 1.
    pub fn parameters(&self, config: &EngineConfig) -> String {
        self.render_parameters(
            |value| config.format_scalar(value),
            !config.is_eq(self.height, 1.0),
        )
    }

    fn render_parameters(&self, format: impl Fn(f64) -> String, with_height: bool) -> String {
        let join = |values: &[f64]| {
            values
                .iter()
                .map(|&value| format(value))
                .collect::<Vec<_>>()
                .join(" ")
        };
        let values: Vec<f64> = match &self.shape {
            Shape::Function(function) => return function.formula().to_string(),
            Shape::Constant { value } => return format(*value),
            Shape::Linear { coefficients } => return join(coefficients),
            Shape::Discrete { points } => points.iter().flat_map(|&(x, y)| [x, y]).collect(),
            Shape::Bell {
                center,
                width,
                slope,
            } => vec![*center, *width, *slope],
            Shape::Binary { start, direction } => vec![*start, *direction],
            Shape::Concave { inflection, end } => vec![*inflection, *end],
            Shape::Cosine { center, width } => vec![*center, *width],
            Shape::Gaussian {
                mean,
                standard_deviation,
            } => vec![*mean, *standard_deviation],
            Shape::GaussianProduct {
                mean_a,
                standard_deviation_a,
                mean_b,
                standard_deviation_b,
            } => vec![
                *mean_a,
                *standard_deviation_a,
                *mean_b,
                *standard_deviation_b,
            ],
            Shape::PiShape {
                bottom_left,
                top_left,
                top_right,
                bottom_right,
            } => vec![*bottom_left, *top_left, *top_right, *bottom_right],
            Shape::Ramp { start, end }
            | Shape::Rectangle { start, end }
            | Shape::SShape { start, end }
            | Shape::ZShape { start, end } => vec![*start, *end],
            Shape::Sigmoid { inflection, slope } => vec![*inflection, *slope],
            Shape::SigmoidDifference {
                left,
                rising,
                falling,
                right,
            }
            | Shape::SigmoidProduct {
                left,
                rising,
                falling,
                right,
            } => vec![*left, *rising, *falling, *right],
            Shape::Spike { center, width } => vec![*center, *width],
            Shape::Trapezoid {
                vertex_a,
                vertex_b,
                vertex_c,
                vertex_d,
            } => vec![*vertex_a, *vertex_b, *vertex_c, *vertex_d],
            Shape::Triangle {
                vertex_a,
                vertex_b,
                vertex_c,
            } => vec![*vertex_a, *vertex_b, *vertex_c],
        };
        let mut text = join(&values);
        if with_height {
            text.push(' ');
            text.push_str(&format(self.height));
        }
        text
    }

    /// Builds a term from its class name and the text of its parameters.
    ///
    /// Shapes with a fixed number of parameters accept one extra trailing
    /// value as the height, as do `Discrete` point lists of odd length.
    pub fn configure(class: &str, name: &str, parameters: &str) -> FuzzyResult<Self> {
        if class == "Function" {
            return Self::function(name, parameters);
        }
        let values = parse_scalars(class, parameters)?;
        match class {
            "Constant" => {
                let [value] = values.as_slice() else {
                    return Err(arity_error(class, "1", values.len()));
                };
                return Ok(Self::constant(name, *value));
            }
            "Linear" => return Ok(Self::linear(name, values)),
            "Discrete" => {
                let (pairs, height) = if values.len() % 2 == 1 {
                    (&values[..values.len() - 1], values.last().copied())
                } else {
                    (&values[..], None)
                };
                let points = pairs.chunks_exact(2).map(|p| (p[0], p[1])).collect();
                let term = Self::new(name, Shape::Discrete { points });
                return Ok(term.with_height(height.unwrap_or(1.0)));
            }
            _ => {}
        }

        let required = match class {
            "Binary" | "Concave" | "Cosine" | "Gaussian" | "Ramp" | "Rectangle" | "Sigmoid"
            | "Spike" | "SShape" | "ZShape" => 2,
            "Bell" | "Triangle" => 3,
            "GaussianProduct" | "PiShape" | "SigmoidDifference" | "SigmoidProduct"
            | "Trapezoid" => 4,
            _ => return Err(FuzzyError::not_found("term class", class)),
        };
        if values.len() != required && values.len() != required + 1 {
            return Err(arity_error(
                class,
                &format!("{} (+1 optional height)", required),
                values.len(),
            ));
        }
        let p = &values;
        let shape = match class {
            "Bell" => Shape::Bell {
                center: p[0],
                width: p[1],
                slope: p[2],
            },
            "Binary" => Shape::Binary {
                start: p[0],
                direction: p[1],
            },
            "Concave" => Shape::Concave {
                inflection: p[0],
                end: p[1],
            },
            "Cosine" => Shape::Cosine {
                center: p[0],
                width: p[1],
            },
            "Gaussian" => Shape::Gaussian {
                mean: p[0],
                standard_deviation: p[1],
            },
            "GaussianProduct" => Shape::GaussianProduct {
                mean_a: p[0],
                standard_deviation_a: p[1],
                mean_b: p[2],
                standard_deviation_b: p[3],
            },
            "PiShape" => Shape::PiShape {
                bottom_left: p[0],
                top_left: p[1],
                top_right: p[2],
                bottom_right: p[3],
            },
            "Ramp" => Shape::Ramp {
                start: p[0],
                end: p[1],
            },
            "Rectangle" => Shape::Rectangle {
                start: p[0],
                end: p[1],
            },
            "Sigmoid" => Shape::Sigmoid {
                inflection: p[0],
                slope: p[1],
            },
            "SigmoidDifference" => Shape::SigmoidDifference {
                left: p[0],
                rising: p[1],
                falling: p[2],
                right: p[3],
            },
            "SigmoidProduct" => Shape::SigmoidProduct {
                left: p[0],
                rising: p[1],
                falling: p[2],
                right: p[3],
            },
            "Spike" => Shape::Spike {
                center: p[0],
                width: p[1],
            },
            "SShape" => Shape::SShape {
                start: p[0],
                end: p[1],
            },
            "Trapezoid" => Shape::Trapezoid {
                vertex_a: p[0],
                vertex_b: p[1],
                vertex_c: p[2],
                vertex_d: p[3],
            },
            "Triangle" => Shape::Triangle {
                vertex_a: p[0],
                vertex_b: p[1],
                vertex_c: p[2],
            },
            _ => Shape::ZShape {
                start: p[0],
                end: p[1],
            },
        };
        let term = Self::new(name, shape);
        Ok(match values.get(required) {
            Some(&height) => term.with_height(height),
            None => term,
        })
    }

    pub(crate) fn fmt_fll(&self, f: &mut fmt::Formatter<'_>, config: &EngineConfig) -> fmt::Result {
        write!(
            f,
            "term: {} {} {}",
            self.name,
            self.class_name(),
            self.parameters(config)
        )
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.fmt_fll(f, &EngineConfig::default())
    }
}

impl Shape {
    /// Membership of `x` at unit height. Shapes that depend on engine
    /// values yield NaN here.
    fn unit_membership(&self, x: f64, c: &EngineConfig) -> f64 {
        match *self {
            Shape::Bell {
                center,
                width,
                slope,
            } => 1.0 / (1.0 + ((x - center) / width).abs().powf(2.0 * slope)),
            Shape::Binary { start, direction } => {
                if (direction > start && c.is_ge(x, start))
                    || (direction < start && c.is_le(x, start))
                {
                    1.0
                } else {
                    0.0
                }
            }
            Shape::Concave { inflection, end } => {
                if c.is_le(inflection, end) {
                    if c.is_lt(x, end) {
                        return (end - inflection) / (2.0 * end - inflection - x);
                    }
                } else if c.is_gt(x, end) {
                    return (inflection - end) / (inflection - 2.0 * end + x);
                }
                1.0
            }
            Shape::Cosine { center, width } => {
                if c.is_lt(x, center - 0.5 * width) || c.is_gt(x, center + 0.5 * width) {
                    0.0
                } else {
                    0.5 * (1.0 + (2.0 / width * std::f64::consts::PI * (x - center)).cos())
                }
            }
            Shape::Discrete { ref points } => discrete(points, x, c),
            Shape::Gaussian {
                mean,
                standard_deviation,
            } => gaussian(x, mean, standard_deviation),
            Shape::GaussianProduct {
                mean_a,
                standard_deviation_a,
                mean_b,
                standard_deviation_b,
            } => {
                let a = if x < mean_a {
                    gaussian(x, mean_a, standard_deviation_a)
                } else {
                    1.0
                };
                let b = if x > mean_b {
                    gaussian(x, mean_b, standard_deviation_b)
                } else {
                    1.0
                };
                a * b
            }
            Shape::PiShape {
                bottom_left,
                top_left,
                top_right,
                bottom_right,
            } => {
                s_curve(x, bottom_left, top_left, c) * z_curve(x, top_right, bottom_right, c)
            }
            Shape::Ramp { start, end } => {
                if c.is_eq(start, end) {
                    0.0
                } else if c.is_lt(start, end) {
                    if c.is_le(x, start) {
                        0.0
                    } else if c.is_ge(x, end) {
                        1.0
                    } else {
                        (x - start) / (end - start)
                    }
                } else if c.is_ge(x, start) {
                    0.0
                } else if c.is_le(x, end) {
                    1.0
                } else {
                    (start - x) / (start - end)
                }
            }
            Shape::Rectangle { start, end } => {
                if c.is_ge(x, start) && c.is_le(x, end) {
                    1.0
                } else {
                    0.0
                }
            }
            Shape::Sigmoid { inflection, slope } => sigmoid(x, inflection, slope),
            Shape::SigmoidDifference {
                left,
                rising,
                falling,
                right,
            } => (sigmoid(x, left, rising) - sigmoid(x, right, falling)).abs(),
            Shape::SigmoidProduct {
                left,
                rising,
                falling,
                right,
            } => sigmoid(x, left, rising) * sigmoid(x, right, falling),
            Shape::Spike { center, width } => (-(10.0 / width * (x - center)).abs()).exp(),
            Shape::SShape { start, end } => s_curve(x, start, end, c),
            Shape::Trapezoid {
                vertex_a,
                vertex_b,
                vertex_c,
                vertex_d,
            } => {
                if c.is_lt(x, vertex_a) || c.is_gt(x, vertex_d) {
                    0.0
                } else if c.is_lt(x, vertex_b) {
                    if vertex_a == f64::NEG_INFINITY {
                        1.0
                    } else {
                        ((x - vertex_a) / (vertex_b - vertex_a)).min(1.0)
                    }
                } else if c.is_le(x, vertex_c) || vertex_d == f64::INFINITY {
                    1.0
                } else if c.is_lt(x, vertex_d) {
                    (vertex_d - x) / (vertex_d - vertex_c)
                } else {
                    0.0
                }
            }
            Shape::Triangle {
                vertex_a,
                vertex_b,
                vertex_c,
            } => {
                if c.is_lt(x, vertex_a) || c.is_gt(x, vertex_c) {
                    0.0
                } else if c.is_eq(x, vertex_b) {
                    1.0
                } else if c.is_lt(x, vertex_b) {
                    if vertex_a == f64::NEG_INFINITY {
                        1.0
                    } else {
                        (x - vertex_a) / (vertex_b - vertex_a)
                    }
                } else if vertex_c == f64::INFINITY {
                    1.0
                } else {
                    (vertex_c - x) / (vertex_c - vertex_b)
                }
            }
            Shape::ZShape { start, end } => z_curve(x, start, end, c),
            Shape::Constant { .. } | Shape::Linear { .. } | Shape::Function(_) => f64::NAN,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct TermRecord {
    name: String,
    class: String,
    parameters: String,
}

impl From<Term> for TermRecord {
    fn from(term: Term) -> Self {
        // Display of f64 is the shortest text that parses back to the same value.
        let parameters = term.render_parameters(|value| value.to_string(), term.height != 1.0);
        Self {
            class: term.class_name().to_string(),
            name: term.name,
            parameters,
        }
    }
}

impl TryFrom<TermRecord> for Term {
    type Error = FuzzyError;

    fn try_from(record: TermRecord) -> FuzzyResult<Self> {
        Term::configure(&record.class, &record.name, &record.parameters)
    }
}

fn gaussian(x: f64, mean: f64, standard_deviation: f64) -> f64 {
    (-(x - mean) * (x - mean) / (2.0 * standard_deviation * standard_deviation)).exp()
}

fn sigmoid(x: f64, inflection: f64, slope: f64) -> f64 {
    1.0 / (1.0 + (-slope * (x - inflection)).exp())
}

/// Rises from 0 at `start` to 1 at `end` along two parabolas.
fn s_curve(x: f64, start: f64, end: f64, c: &EngineConfig) -> f64 {
    if c.is_le(x, start) {
        0.0
    } else if c.is_le(x, 0.5 * (start + end)) {
        2.0 * ((x - start) / (end - start)).powi(2)
    } else if c.is_lt(x, end) {
        1.0 - 2.0 * ((x - end) / (end - start)).powi(2)
    } else {
        1.0
    }
}

/// Falls from 1 at `start` to 0 at `end` along two parabolas.
fn z_curve(x: f64, start: f64, end: f64, c: &EngineConfig) -> f64 {
    if c.is_le(x, start) {
        1.0
    } else if c.is_le(x, 0.5 * (start + end)) {
        1.0 - 2.0 * ((x - start) / (end - start)).powi(2)
    } else if c.is_lt(x, end) {
        2.0 * ((x - end) / (end - start)).powi(2)
    } else {
        0.0
    }
}

fn discrete(points: &[(f64, f64)], x: f64, c: &EngineConfig) -> f64 {
    let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
        return f64::NAN;
    };
    if c.is_le(x, first.0) {
        return first.1;
    }
    if c.is_ge(x, last.0) {
        return last.1;
    }
    let upper = points.partition_point(|&(px, _)| px <= x);
    let (Some(&(x0, y0)), Some(&(x1, y1))) = (
        upper.checked_sub(1).and_then(|lower| points.get(lower)),
        points.get(upper),
    ) else {
        return f64::NAN;
    };
    if c.is_eq(x0, x1) {
        return y1;
    }
    y0 + (y1 - y0) * (x - x0) / (x1 - x0)
}

fn linear(coefficients: &[f64], inputs: &[f64]) -> f64 {
    let mut result: f64 = coefficients
        .iter()
        .zip(inputs)
        .map(|(coefficient, value)| coefficient * value)
        .sum();
    if coefficients.len() > inputs.len() {
        if let Some(constant) = coefficients.last() {
            result += constant;
        }
    }
    result
}

fn parse_scalars(class: &str, text: &str) -> FuzzyResult<Vec<f64>> {
    text.split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| {
                FuzzyError::invalid_parameters(class, format!("'{}' is not a number", token))
            })
        })
        .collect()
}

fn arity_error(class: &str, expected: &str, found: usize) -> FuzzyError {
    FuzzyError::invalid_parameters(
        class,
        format!("expected {} parameters, found {}", expected, found),
    )
}
