//! The engine: variables, rule blocks and the evaluation cycle.
//!
//! One call to [`Engine::process`] clears the fuzzy outputs, activates the
//! enabled rule blocks in order, and defuzzifies every output variable.
//! Rules and formula terms refer to variables by index, so they have to be
//! loaded with [`Engine::load`] after the structure is built, and again after
//! variables are inserted or removed.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::activation::Activation;
use crate::config::{EngineConfig, OperatorConfig};
use crate::defuzzifier::{Defuzzifier, WeightedType};
use crate::error::{FuzzyError, FuzzyResult};
use crate::factory;
use crate::norm::TNorm;
use crate::rule::RuleBlock;
use crate::term::{Scope, Shape};
use crate::variable::{InputVariable, OutputVariable, Variable, VariableRef, VariableSet};

/// Kind of controller an engine implements, judged from its operators and
/// output terms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EngineType {
    Mamdani,
    Larsen,
    TakagiSugeno,
    Tsukamoto,
    InverseTsukamoto,
    Hybrid,
    Unknown,
}

impl EngineType {
    pub fn name(self) -> &'static str {
        match self {
            EngineType::Mamdani => "Mamdani",
            EngineType::Larsen => "Larsen",
            EngineType::TakagiSugeno => "TakagiSugeno",
            EngineType::Tsukamoto => "Tsukamoto",
            EngineType::InverseTsukamoto => "InverseTsukamoto",
            EngineType::Hybrid => "Hybrid",
            EngineType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for EngineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engine {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    config: EngineConfig,
    input_variables: Vec<InputVariable>,
    output_variables: Vec<OutputVariable>,
    rule_blocks: Vec<RuleBlock>,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new("")
    }
}

impl Engine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            config: EngineConfig::default(),
            input_variables: Vec::new(),
            output_variables: Vec::new(),
            rule_blocks: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
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

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn set_config(&mut self, config: EngineConfig) {
        self.config = config;
    }

    /// Applies the operators to every rule block and output variable.
    pub fn configure(&mut self, operators: &OperatorConfig) {
        for block in &mut self.rule_blocks {
            block.set_conjunction(operators.conjunction);
            block.set_disjunction(operators.disjunction);
            block.set_implication(operators.implication);
            block.set_activation(operators.activation);
        }
        for output in &mut self.output_variables {
            output.set_accumulation(operators.accumulation);
            output.set_defuzzifier(operators.defuzzifier);
        }
    }

    /// Applies operators given by name. Empty names and `none` leave the
    /// operator unset; the defuzzifier and activation may carry parameters,
    /// as in `Centroid 200` or `Highest 2`.
    pub fn configure_by_name(
        &mut self,
        conjunction: &str,
        disjunction: &str,
        implication: &str,
        accumulation: &str,
        defuzzifier: &str,
        activation: &str,
    ) -> FuzzyResult<()> {
        let tnorms = factory::tnorms();
        let snorms = factory::snorms();
        let optional = |name: &str| {
            let name = name.trim();
            (!name.is_empty() && name != "none").then(|| name.to_string())
        };
        let operators = OperatorConfig {
            conjunction: optional(conjunction).map(|n| tnorms.construct(&n)).transpose()?,
            disjunction: optional(disjunction).map(|n| snorms.construct(&n)).transpose()?,
            implication: optional(implication).map(|n| tnorms.construct(&n)).transpose()?,
            accumulation: optional(accumulation).map(|n| snorms.construct(&n)).transpose()?,
            defuzzifier: optional(defuzzifier)
                .map(|text| {
                    let (name, parameters) =
                        text.split_once(char::is_whitespace).unwrap_or((text.as_str(), ""));
                    Defuzzifier::configure(name, parameters, &self.config)
                })
                .transpose()?,
            activation: match optional(activation) {
                Some(text) => text.parse::<Activation>()?,
                None => Activation::General,
            },
        };
        self.configure(&operators);
        Ok(())
    }

    /// Binds formula terms to variables and loads the rules of every block.
    ///
    /// All blocks are attempted; the first failure is returned.
    #[track_caller]
    pub fn load(&mut self) -> FuzzyResult<()> {
        self.load_functions();
        let variables = VariableSet::new(&self.input_variables, &self.output_variables);
        let mut result = Ok(());
        for block in &mut self.rule_blocks {
            if let Err(error) = block.load_rules(variables) {
                if result.is_ok() {
                    result = Err(error);
                }
            }
        }
        result
    }

    fn load_functions(&mut self) {
        let variables = VariableSet::new(&self.input_variables, &self.output_variables);
        let references = (0..self.input_variables.len())
            .map(VariableRef::Input)
            .chain((0..self.output_variables.len()).map(VariableRef::Output));
        let mut bound = Vec::new();
        for reference in references {
            let Some(variable) = variables.variable(reference) else {
                continue;
            };
            for (index, term) in variable.terms().iter().enumerate() {
                if let Shape::Function(function) = &term.shape {
                    let mut function = function.clone();
                    function.load(variables);
                    bound.push((reference, index, function));
                }
            }
        }
        for (reference, index, function) in bound {
            if let Some(term) = self
                .variable_mut(reference)
                .and_then(|variable| variable.terms_mut().get_mut(index))
            {
                term.shape = Shape::Function(function);
            }
        }
    }

    fn variable_mut(&mut self, reference: VariableRef) -> Option<&mut Variable> {
        match reference {
            VariableRef::Input(index) => self.input_variables.get_mut(index).map(|v| &mut **v),
            VariableRef::Output(index) => self.output_variables.get_mut(index).map(|v| &mut **v),
        }
    }

    /// Inserting or removing variables shifts indices: rules are unloaded
    /// and formulas rebound.
    fn structure_changed(&mut self) {
        for block in &mut self.rule_blocks {
            block.unload_rules();
        }
        self.load_functions();
    }

    pub fn is_ready(&self) -> bool {
        self.ready_status().is_empty()
    }

    /// Reasons the engine cannot be processed; empty when it is ready.
    pub fn ready_status(&self) -> Vec<String> {
        let mut reasons = Vec::new();
        if self.input_variables.is_empty() {
            reasons.push("engine has no input variables".to_string());
        }
        for input in &self.input_variables {
            if input.terms().is_empty() {
                reasons.push(format!("input variable '{}' has no terms", input.name()));
            }
        }
        if self.output_variables.is_empty() {
            reasons.push("engine has no output variables".to_string());
        }
        for output in &self.output_variables {
            if output.terms().is_empty() {
                reasons.push(format!("output variable '{}' has no terms", output.name()));
            }
            match output.defuzzifier() {
                None => reasons.push(format!("output variable '{}' has no defuzzifier", output.name())),
                Some(defuzzifier) if defuzzifier.is_integral() && output.accumulation().is_none() => {
                    reasons.push(format!(
                        "output variable '{}' has an integral defuzzifier but no accumulation",
                        output.name()
                    ))
                }
                Some(_) => {}
            }
        }
        if self.rule_blocks.is_empty() {
            reasons.push("engine has no rule blocks".to_string());
        }
        for block in &self.rule_blocks {
            if block.rules().is_empty() {
                reasons.push(format!("rule block '{}' has no rules", block.name()));
            }
            for rule in block.rules().iter().filter(|rule| !rule.is_loaded()) {
                reasons.push(format!(
                    "rule '{}' in block '{}' is not loaded",
                    rule.text(),
                    block.name()
                ));
            }
            if block.requires_conjunction() && block.conjunction().is_none() {
                reasons.push(format!(
                    "rule block '{}' uses 'and' but has no conjunction",
                    block.name()
                ));
            }
            if block.requires_disjunction() && block.disjunction().is_none() {
                reasons.push(format!(
                    "rule block '{}' uses 'or' but has no disjunction",
                    block.name()
                ));
            }
        }
        reasons
    }

    /// Value snapshot read by formula and linear terms.
    pub fn scope(&self) -> Scope {
        Scope::new(
            self.input_variables.iter().map(|v| v.value()).collect(),
            self.output_variables.iter().map(|v| v.value()).collect(),
            self.config,
        )
    }

    /// Runs one evaluation cycle.
    ///
    /// An error stops the cycle; outputs defuzzified in earlier cycles keep
    /// their values.
    pub fn process(&mut self) -> FuzzyResult<()> {
        log::debug!("processing engine '{}'", self.name);
        for output in &mut self.output_variables {
            output.fuzzy_output_mut().clear();
        }
        let mut scope = self.scope();
        let Engine {
            input_variables,
            output_variables,
            rule_blocks,
            ..
        } = self;
        for block in rule_blocks.iter_mut().filter(|block| block.is_enabled()) {
            block.activate(input_variables.as_slice(), output_variables.as_mut_slice(), &scope)?;
        }
        for (index, output) in output_variables.iter_mut().enumerate() {
            output.defuzzify(&scope);
            if let Some(value) = scope.outputs.get_mut(index) {
                *value = output.value();
            }
        }
        Ok(())
    }

    /// Resets every variable value to NaN and empties the fuzzy outputs.
    pub fn restart(&mut self) {
        for input in &mut self.input_variables {
            input.set_value(f64::NAN);
        }
        for output in &mut self.output_variables {
            output.clear();
        }
        for block in &mut self.rule_blocks {
            block.rules_mut().iter_mut().for_each(|rule| rule.deactivate());
        }
    }

    /// Infers the controller type, with the reasons for the decision.
    pub fn engine_type(&self) -> (EngineType, String) {
        let outputs = &self.output_variables;
        if outputs.is_empty() {
            return (EngineType::Unknown, "engine has no output variables".to_string());
        }

        let mamdani = outputs
            .iter()
            .all(|output| output.defuzzifier().is_some_and(Defuzzifier::is_integral));
        if mamdani {
            let larsen = !self.rule_blocks.is_empty()
                && self
                    .rule_blocks
                    .iter()
                    .all(|block| block.implication() == Some(TNorm::AlgebraicProduct));
            if larsen {
                return (
                    EngineType::Larsen,
                    "output variables have integral defuzzifiers; implication is AlgebraicProduct"
                        .to_string(),
                );
            }
            return (
                EngineType::Mamdani,
                "output variables have integral defuzzifiers".to_string(),
            );
        }

        let weighted = |accepts: WeightedType| {
            outputs.iter().all(|output| match output.defuzzifier() {
                Some(Defuzzifier::Weighted { kind, .. }) => {
                    *kind == WeightedType::Automatic || *kind == accepts
                }
                _ => false,
            })
        };
        let all_terms = |predicate: fn(&crate::term::Term) -> bool| {
            outputs
                .iter()
                .all(|output| output.terms().iter().all(predicate))
        };

        if weighted(WeightedType::TakagiSugeno) && all_terms(|term| term.is_takagi_sugeno()) {
            return (
                EngineType::TakagiSugeno,
                "output variables have weighted defuzzifiers and constant, linear or function terms"
                    .to_string(),
            );
        }
        if weighted(WeightedType::Tsukamoto) && all_terms(|term| term.is_monotonic()) {
            return (
                EngineType::Tsukamoto,
                "output variables have weighted defuzzifiers and monotonic terms".to_string(),
            );
        }
        if weighted(WeightedType::TakagiSugeno) {
            return (
                EngineType::InverseTsukamoto,
                "output variables have weighted defuzzifiers and terms that are neither monotonic nor constant, linear or function"
                    .to_string(),
            );
        }
        if outputs.iter().all(|output| output.defuzzifier().is_some()) {
            return (
                EngineType::Hybrid,
                "output variables have different defuzzifiers".to_string(),
            );
        }
        (
            EngineType::Unknown,
            "some output variables have no defuzzifier".to_string(),
        )
    }

    // Variables

    /// Input variables followed by output variables.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> + '_ {
        self.input_variables
            .iter()
            .map(|v| &**v)
            .chain(self.output_variables.iter().map(|v| &**v))
    }

    pub fn variable_set(&self) -> VariableSet<'_> {
        VariableSet::new(&self.input_variables, &self.output_variables)
    }

    pub fn variable(&self, name: &str) -> FuzzyResult<&Variable> {
        self.variables()
            .find(|v| v.name() == name)
            .ok_or_else(|| FuzzyError::not_found("variable", name))
    }

    pub fn has_variable(&self, name: &str) -> bool {
        self.variables().any(|v| v.name() == name)
    }

    pub fn set_input_value(&mut self, name: &str, value: f64) -> FuzzyResult<()> {
        self.input_variable_mut(name)?.set_value(value);
        Ok(())
    }

    pub fn output_value(&self, name: &str) -> FuzzyResult<f64> {
        Ok(self.output_variable(name)?.value())
    }

    // Input variables

    pub fn add_input_variable(&mut self, variable: InputVariable) {
        self.input_variables.push(variable);
    }

    pub fn with_input_variable(mut self, variable: InputVariable) -> Self {
        self.add_input_variable(variable);
        self
    }

    /// Inserts at `index` (clamped to the end). Rules must be loaded again.
    pub fn insert_input_variable(&mut self, index: usize, variable: InputVariable) {
        let index = index.min(self.input_variables.len());
        self.input_variables.insert(index, variable);
        self.structure_changed();
    }

    pub fn input_variables(&self) -> &[InputVariable] {
        &self.input_variables
    }

    pub fn input_variables_mut(&mut self) -> &mut [InputVariable] {
        &mut self.input_variables
    }

    pub fn input_variable(&self, name: &str) -> FuzzyResult<&InputVariable> {
        self.input_variables
            .iter()
            .find(|v| v.name() == name)
            .ok_or_else(|| FuzzyError::not_found("input variable", name))
    }

    pub fn input_variable_mut(&mut self, name: &str) -> FuzzyResult<&mut InputVariable> {
        self.input_variables
            .iter_mut()
            .find(|v| v.name() == name)
            .ok_or_else(|| FuzzyError::not_found("input variable", name))
    }

    pub fn input_variable_at(&self, index: usize) -> Option<&InputVariable> {
        self.input_variables.get(index)
    }

    pub fn has_input_variable(&self, name: &str) -> bool {
        self.input_variables.iter().any(|v| v.name() == name)
    }

    pub fn number_of_input_variables(&self) -> usize {
        self.input_variables.len()
    }

    /// Removes the first input variable with this name. Rules must be
    /// loaded again.
    pub fn remove_input_variable(&mut self, name: &str) -> FuzzyResult<InputVariable> {
        let index = self
            .input_variables
            .iter()
            .position(|v| v.name() == name)
            .ok_or_else(|| FuzzyError::not_found("input variable", name))?;
        let removed = self.input_variables.remove(index);
        self.structure_changed();
        Ok(removed)
    }

    pub fn remove_input_variable_at(&mut self, index: usize) -> Option<InputVariable> {
        let removed = (index < self.input_variables.len()).then(|| self.input_variables.remove(index))?;
        self.structure_changed();
        Some(removed)
    }

    // Output variables

    pub fn add_output_variable(&mut self, variable: OutputVariable) {
        self.output_variables.push(variable);
    }

    pub fn with_output_variable(mut self, variable: OutputVariable) -> Self {
        self.add_output_variable(variable);
        self
    }

    /// Inserts at `index` (clamped to the end). Rules must be loaded again.
    pub fn insert_output_variable(&mut self, index: usize, variable: OutputVariable) {
        let index = index.min(self.output_variables.len());
        self.output_variables.insert(index, variable);
        self.structure_changed();
    }

    pub fn output_variables(&self) -> &[OutputVariable] {
        &self.output_variables
    }

    pub fn output_variables_mut(&mut self) -> &mut [OutputVariable] {
        &mut self.output_variables
    }

    pub fn output_variable(&self, name: &str) -> FuzzyResult<&OutputVariable> {
        self.output_variables
            .iter()
            .find(|v| v.name() == name)
            .ok_or_else(|| FuzzyError::not_found("output variable", name))
    }

    pub fn output_variable_mut(&mut self, name: &str) -> FuzzyResult<&mut OutputVariable> {
        self.output_variables
            .iter_mut()
            .find(|v| v.name() == name)
            .ok_or_else(|| FuzzyError::not_found("output variable", name))
    }

    pub fn output_variable_at(&self, index: usize) -> Option<&OutputVariable> {
        self.output_variables.get(index)
    }

    pub fn has_output_variable(&self, name: &str) -> bool {
        self.output_variables.iter().any(|v| v.name() == name)
    }

    pub fn number_of_output_variables(&self) -> usize {
        self.output_variables.len()
    }

    /// Removes the first output variable with this name. Rules must be
    /// loaded again.
    pub fn remove_output_variable(&mut self, name: &str) -> FuzzyResult<OutputVariable> {
        let index = self
            .output_variables
            .iter()
            .position(|v| v.name() == name)
            .ok_or_else(|| FuzzyError::not_found("output variable", name))?;
        let removed = self.output_variables.remove(index);
        self.structure_changed();
        Ok(removed)
    }

    pub fn remove_output_variable_at(&mut self, index: usize) -> Option<OutputVariable> {
        let removed =
            (index < self.output_variables.len()).then(|| self.output_variables.remove(index))?;
        self.structure_changed();
        Some(removed)
    }

    // Rule blocks

    pub fn add_rule_block(&mut self, block: RuleBlock) {
        self.rule_blocks.push(block);
    }

    pub fn with_rule_block(mut self, block: RuleBlock) -> Self {
        self.add_rule_block(block);
        self
    }

    pub fn insert_rule_block(&mut self, index: usize, block: RuleBlock) {
        let index = index.min(self.rule_blocks.len());
        self.rule_blocks.insert(index, block);
    }

    pub fn rule_blocks(&self) -> &[RuleBlock] {
        &self.rule_blocks
    }

    pub fn rule_blocks_mut(&mut self) -> &mut [RuleBlock] {
        &mut self.rule_blocks
    }

    pub fn rule_block(&self, name: &str) -> FuzzyResult<&RuleBlock> {
        self.rule_blocks
            .iter()
            .find(|block| block.name() == name)
            .ok_or_else(|| FuzzyError::not_found("rule block", name))
    }

    pub fn rule_block_mut(&mut self, name: &str) -> FuzzyResult<&mut RuleBlock> {
        self.rule_blocks
            .iter_mut()
            .find(|block| block.name() == name)
            .ok_or_else(|| FuzzyError::not_found("rule block", name))
    }

    pub fn rule_block_at(&self, index: usize) -> Option<&RuleBlock> {
        self.rule_blocks.get(index)
    }

    pub fn has_rule_block(&self, name: &str) -> bool {
        self.rule_blocks.iter().any(|block| block.name() == name)
    }

    pub fn number_of_rule_blocks(&self) -> usize {
        self.rule_blocks.len()
    }

    pub fn remove_rule_block(&mut self, name: &str) -> FuzzyResult<RuleBlock> {
        let index = self
            .rule_blocks
            .iter()
            .position(|block| block.name() == name)
            .ok_or_else(|| FuzzyError::not_found("rule block", name))?;
        Ok(self.rule_blocks.remove(index))
    }

    pub fn remove_rule_block_at(&mut self, index: usize) -> Option<RuleBlock> {
        (index < self.rule_blocks.len()).then(|| self.rule_blocks.remove(index))
    }
}
