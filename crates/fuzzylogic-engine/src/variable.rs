//! Linguistic variables.
//!
//! [`InputVariable`] and [`OutputVariable`] both wrap a [`Variable`] and
//! dereference to it. An output variable also owns the fuzzy output its rules
//! write into, the defuzzifier that reduces it, and the fallback values used
//! when defuzzification yields no finite result.

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::defuzzifier::Defuzzifier;
use crate::error::{FuzzyError, FuzzyResult};
use crate::norm::SNorm;
use crate::serialization::scalar;
use crate::term::{Accumulated, FuzzyOutput, Scope, Term};

/// Position of a variable in its engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableRef {
    Input(usize),
    Output(usize),
}

/// Bounds `x` to `[minimum, maximum]`, keeping NaN as is.
pub(crate) fn bound(x: f64, minimum: f64, maximum: f64) -> f64 {
    if x > maximum {
        maximum
    } else if x < minimum {
        minimum
    } else {
        x
    }
}

fn nan() -> f64 {
    f64::NAN
}

/// A named range with an ordered list of uniquely named terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Variable {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(skip, default = "nan")]
    value: f64,
    #[serde(with = "scalar")]
    minimum: f64,
    #[serde(with = "scalar")]
    maximum: f64,
    enabled: bool,
    lock_value_in_range: bool,
    terms: Vec<Term>,
}

impl Variable {
    pub fn new(name: impl Into<String>, minimum: f64, maximum: f64) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            value: f64::NAN,
            minimum,
            maximum,
            enabled: true,
            lock_value_in_range: false,
            terms: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Sets the value, bounded to the range when the lock is on.
    pub fn set_value(&mut self, value: f64) {
        self.value = if self.lock_value_in_range {
            bound(value, self.minimum, self.maximum)
        } else {
            value
        };
    }

    pub fn minimum(&self) -> f64 {
        self.minimum
    }

    pub fn maximum(&self) -> f64 {
        self.maximum
    }

    pub fn range(&self) -> f64 {
        self.maximum - self.minimum
    }

    pub fn set_range(&mut self, minimum: f64, maximum: f64) {
        self.minimum = minimum;
        self.maximum = maximum;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_lock_value_in_range(&self) -> bool {
        self.lock_value_in_range
    }

    pub fn set_lock_value_in_range(&mut self, lock: bool) {
        self.lock_value_in_range = lock;
        if lock {
            self.value = bound(self.value, self.minimum, self.maximum);
        }
    }

    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    pub fn add_term(&mut self, term: Term) -> FuzzyResult<()> {
        self.check_unique(&term.name)?;
        self.terms.push(term);
        Ok(())
    }

    /// Builder-style [`add_term`](Self::add_term).
    pub fn with_term(mut self, term: Term) -> FuzzyResult<Self> {
        self.add_term(term)?;
        Ok(self)
    }

    pub fn insert_term(&mut self, index: usize, term: Term) -> FuzzyResult<()> {
        self.check_unique(&term.name)?;
        if index > self.terms.len() {
            return Err(FuzzyError::invalid_parameters(
                "Variable",
                format!("term index {} out of bounds for '{}'", index, self.name),
            ));
        }
        self.terms.insert(index, term);
        Ok(())
    }

    pub fn remove_term(&mut self, name: &str) -> FuzzyResult<Term> {
        let index = self
            .term_index(name)
            .ok_or_else(|| FuzzyError::not_found("term", name))?;
        Ok(self.terms.remove(index))
    }

    pub fn term(&self, name: &str) -> FuzzyResult<&Term> {
        self.terms
            .iter()
            .find(|term| term.name == name)
            .ok_or_else(|| FuzzyError::not_found("term", name))
    }

    pub fn term_mut(&mut self, name: &str) -> FuzzyResult<&mut Term> {
        self.terms
            .iter_mut()
            .find(|term| term.name == name)
            .ok_or_else(|| FuzzyError::not_found("term", name))
    }

    pub fn term_at(&self, index: usize) -> Option<&Term> {
        self.terms.get(index)
    }

    pub fn term_index(&self, name: &str) -> Option<usize> {
        self.terms.iter().position(|term| term.name == name)
    }

    pub fn has_term(&self, name: &str) -> bool {
        self.term_index(name).is_some()
    }

    pub(crate) fn terms_mut(&mut self) -> &mut [Term] {
        &mut self.terms
    }

    fn check_unique(&self, name: &str) -> FuzzyResult<()> {
        if self.has_term(name) {
            return Err(FuzzyError::Duplicate {
                kind: "term",
                name: name.to_string(),
            });
        }
        Ok(())
    }

    /// Memberships of `x` in every term, as `μ1/term1 + μ2/term2 ...`.
    pub fn fuzzify(&self, x: f64, scope: &Scope) -> String {
        render_degrees(
            self.terms
                .iter()
                .map(|term| (term.evaluate(x, scope), term.name.as_str())),
            &scope.config,
        )
    }

    /// The term in which `x` has the highest membership, if any is above 0.
    pub fn highest_membership(&self, x: f64, scope: &Scope) -> Option<(&Term, f64)> {
        let mut best: Option<(&Term, f64)> = None;
        for term in &self.terms {
            let y = term.evaluate(x, scope);
            let threshold = best.map_or(0.0, |(_, ymax)| ymax);
            if scope.config.is_gt(y, threshold) {
                best = Some((term, y));
            }
        }
        best
    }
}

/// Renders `(degree, term)` pairs as `0.500/Low + 0.250/High`.
fn render_degrees<'a>(
    degrees: impl Iterator<Item = (f64, &'a str)>,
    config: &EngineConfig,
) -> String {
    let mut text = String::new();
    for (i, (degree, name)) in degrees.enumerate() {
        if i == 0 {
            text.push_str(&config.format_scalar(degree));
        } else if degree.is_nan() || degree >= 0.0 {
            text.push_str(" + ");
            text.push_str(&config.format_scalar(degree));
        } else {
            text.push_str(" - ");
            text.push_str(&config.format_scalar(degree.abs()));
        }
        text.push('/');
        text.push_str(name);
    }
    text
}

/// A variable whose value is set from outside the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InputVariable(Variable);

impl InputVariable {
    pub fn new(name: impl Into<String>, minimum: f64, maximum: f64) -> Self {
        Self(Variable::new(name, minimum, maximum))
    }

    pub fn with_term(mut self, term: Term) -> FuzzyResult<Self> {
        self.0.add_term(term)?;
        Ok(self)
    }
}

impl Deref for InputVariable {
    type Target = Variable;

    fn deref(&self) -> &Variable {
        &self.0
    }
}

impl DerefMut for InputVariable {
    fn deref_mut(&mut self) -> &mut Variable {
        &mut self.0
    }
}

/// A variable whose value is computed by defuzzifying its fuzzy output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputVariable {
    #[serde(flatten)]
    variable: Variable,
    fuzzy_output: Accumulated,
    defuzzifier: Option<Defuzzifier>,
    #[serde(skip, default = "nan")]
    previous_value: f64,
    #[serde(with = "scalar")]
    default_value: f64,
    lock_previous_value: bool,
}

impl OutputVariable {
    pub fn new(name: impl Into<String>, minimum: f64, maximum: f64) -> Self {
        Self {
            variable: Variable::new(name, minimum, maximum),
            fuzzy_output: Accumulated::new(minimum, maximum, None),
            defuzzifier: None,
            previous_value: f64::NAN,
            default_value: f64::NAN,
            lock_previous_value: false,
        }
    }

    pub fn with_term(mut self, term: Term) -> FuzzyResult<Self> {
        self.variable.add_term(term)?;
        Ok(self)
    }

    pub fn with_defuzzifier(mut self, defuzzifier: Defuzzifier) -> Self {
        self.defuzzifier = Some(defuzzifier);
        self
    }

    pub fn with_accumulation(mut self, accumulation: SNorm) -> Self {
        self.fuzzy_output.set_accumulation(Some(accumulation));
        self
    }

    pub fn with_default_value(mut self, default_value: f64) -> Self {
        self.default_value = default_value;
        self
    }

    pub fn set_range(&mut self, minimum: f64, maximum: f64) {
        self.variable.set_range(minimum, maximum);
        self.fuzzy_output.set_range(minimum, maximum);
    }

    pub fn set_minimum(&mut self, minimum: f64) {
        self.set_range(minimum, self.variable.maximum());
    }

    pub fn set_maximum(&mut self, maximum: f64) {
        self.set_range(self.variable.minimum(), maximum);
    }

    pub fn fuzzy_output(&self) -> &Accumulated {
        &self.fuzzy_output
    }

    pub fn fuzzy_output_mut(&mut self) -> &mut Accumulated {
        &mut self.fuzzy_output
    }

    /// The fuzzy output paired with this variable's terms.
    pub fn fuzzy_view<'a>(&'a self, scope: &'a Scope) -> FuzzyOutput<'a> {
        self.fuzzy_output.view(self.variable.terms(), scope)
    }

    pub fn accumulation(&self) -> Option<SNorm> {
        self.fuzzy_output.accumulation()
    }

    pub fn set_accumulation(&mut self, accumulation: Option<SNorm>) {
        self.fuzzy_output.set_accumulation(accumulation);
    }

    pub fn defuzzifier(&self) -> Option<&Defuzzifier> {
        self.defuzzifier.as_ref()
    }

    pub fn set_defuzzifier(&mut self, defuzzifier: Option<Defuzzifier>) {
        self.defuzzifier = defuzzifier;
    }

    pub fn previous_value(&self) -> f64 {
        self.previous_value
    }

    pub fn set_previous_value(&mut self, previous_value: f64) {
        self.previous_value = previous_value;
    }

    pub fn default_value(&self) -> f64 {
        self.default_value
    }

    pub fn set_default_value(&mut self, default_value: f64) {
        self.default_value = default_value;
    }

    pub fn is_lock_previous_value(&self) -> bool {
        self.lock_previous_value
    }

    pub fn set_lock_previous_value(&mut self, lock: bool) {
        self.lock_previous_value = lock;
    }

    /// Reduces the fuzzy output to a crisp value.
    ///
    /// A disabled variable keeps its value. A non-finite result falls back to
    /// the previous value when it is locked and finite, else to the default
    /// value. The fuzzy output is left untouched.
    pub fn defuzzify(&mut self, scope: &Scope) {
        if !self.variable.is_enabled() {
            return;
        }
        let current = self.variable.value();
        if current.is_finite() {
            self.previous_value = current;
        }

        let minimum = self.variable.minimum();
        let maximum = self.variable.maximum();
        let mut result = match &self.defuzzifier {
            Some(defuzzifier) => defuzzifier.defuzzify(&self.fuzzy_view(scope), minimum, maximum),
            None => f64::NAN,
        };

        if !result.is_finite() {
            result = if self.lock_previous_value && self.previous_value.is_finite() {
                self.previous_value
            } else {
                self.default_value
            };
            log::debug!(
                "output variable '{}' fell back to {} after a non-finite defuzzification",
                self.variable.name(),
                result
            );
        }

        if self.variable.is_lock_value_in_range() {
            result = bound(result, minimum, maximum);
        }
        self.variable.value = result;
    }

    /// Empties the fuzzy output and resets the value and previous value to NaN.
    pub fn clear(&mut self) {
        self.fuzzy_output.clear();
        self.variable.value = f64::NAN;
        self.previous_value = f64::NAN;
    }

    /// Activation degree of every term, as `0.500/Low + 0.000/High`.
    pub fn fuzzy_output_value(&self, config: &EngineConfig) -> String {
        render_degrees(
            self.variable
                .terms()
                .iter()
                .enumerate()
                .map(|(i, term)| (self.fuzzy_output.activation_degree(i), term.name.as_str())),
            config,
        )
    }
}

impl Deref for OutputVariable {
    type Target = Variable;

    fn deref(&self) -> &Variable {
        &self.variable
    }
}

impl DerefMut for OutputVariable {
    fn deref_mut(&mut self) -> &mut Variable {
        &mut self.variable
    }
}

/// Borrowed view of an engine's variables, used to resolve names in rules
/// and formulas.
#[derive(Debug, Clone, Copy)]
pub struct VariableSet<'a> {
    inputs: &'a [InputVariable],
    outputs: &'a [OutputVariable],
}

impl<'a> VariableSet<'a> {
    pub fn new(inputs: &'a [InputVariable], outputs: &'a [OutputVariable]) -> Self {
        Self { inputs, outputs }
    }

    pub fn inputs(&self) -> &'a [InputVariable] {
        self.inputs
    }

    pub fn outputs(&self) -> &'a [OutputVariable] {
        self.outputs
    }

    /// Looks a name up among the inputs first, then the outputs.
    pub fn find(&self, name: &str) -> Option<VariableRef> {
        if let Some(index) = self.inputs.iter().position(|v| v.name() == name) {
            return Some(VariableRef::Input(index));
        }
        self.outputs
            .iter()
            .position(|v| v.name() == name)
            .map(VariableRef::Output)
    }

    pub fn variable(&self, reference: VariableRef) -> Option<&'a Variable> {
        match reference {
            VariableRef::Input(index) => self.inputs.get(index).map(|v| &v.0),
            VariableRef::Output(index) => self.outputs.get(index).map(|v| &v.variable),
        }
    }

    pub fn output(&self, index: usize) -> Option<&'a OutputVariable> {
        self.outputs.get(index)
    }
}
