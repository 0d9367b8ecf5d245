use serde::{Deserialize, Serialize};

use super::Rule;
use crate::activation::Activation;
use crate::error::{FuzzyError, FuzzyResult};
use crate::norm::{SNorm, TNorm};
use crate::term::Scope;
use crate::variable::{InputVariable, OutputVariable, VariableSet};

fn enabled() -> bool {
    true
}

/// Ordered rules sharing the same operators and activation strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleBlock {
    name: String,
    #[serde(default)]
    description: String,
    #[serde(default = "enabled")]
    enabled: bool,
    conjunction: Option<TNorm>,
    disjunction: Option<SNorm>,
    implication: Option<TNorm>,
    #[serde(default)]
    activation: Activation,
    rules: Vec<Rule>,
}

impl RuleBlock {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            enabled: true,
            conjunction: None,
            disjunction: None,
            implication: None,
            activation: Activation::General,
            rules: Vec::new(),
        }
    }

    pub fn with_conjunction(mut self, conjunction: TNorm) -> Self {
        self.conjunction = Some(conjunction);
        self
    }

    pub fn with_disjunction(mut self, disjunction: SNorm) -> Self {
        self.disjunction = Some(disjunction);
        self
    }

    pub fn with_implication(mut self, implication: TNorm) -> Self {
        self.implication = Some(implication);
        self
    }

    pub fn with_activation(mut self, activation: Activation) -> Self {
        self.activation = activation;
        self
    }

    pub fn with_rule(mut self, rule: Rule) -> Self {
        self.rules.push(rule);
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

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn conjunction(&self) -> Option<TNorm> {
        self.conjunction
    }

    pub fn set_conjunction(&mut self, conjunction: Option<TNorm>) {
        self.conjunction = conjunction;
    }

    pub fn disjunction(&self) -> Option<SNorm> {
        self.disjunction
    }

    pub fn set_disjunction(&mut self, disjunction: Option<SNorm>) {
        self.disjunction = disjunction;
    }

    pub fn implication(&self) -> Option<TNorm> {
        self.implication
    }

    pub fn set_implication(&mut self, implication: Option<TNorm>) {
        self.implication = implication;
    }

    pub fn activation(&self) -> &Activation {
        &self.activation
    }

    pub fn set_activation(&mut self, activation: Activation) {
        self.activation = activation;
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn rules_mut(&mut self) -> &mut [Rule] {
        &mut self.rules
    }

    pub fn rule(&self, index: usize) -> Option<&Rule> {
        self.rules.get(index)
    }

    pub fn number_of_rules(&self) -> usize {
        self.rules.len()
    }

    pub fn add_rule(&mut self, rule: Rule) {
        self.rules.push(rule);
    }

    /// Inserts at `index`, or appends when `index` is past the end.
    pub fn insert_rule(&mut self, index: usize, rule: Rule) {
        let index = index.min(self.rules.len());
        self.rules.insert(index, rule);
    }

    pub fn remove_rule(&mut self, index: usize) -> Option<Rule> {
        (index < self.rules.len()).then(|| self.rules.remove(index))
    }

    /// Loads every rule. Rules that fail stay unloaded; their errors are
    /// gathered into one [`FuzzyError::RuleLoading`].
    #[track_caller]
    pub fn load_rules(&mut self, variables: VariableSet<'_>) -> FuzzyResult<()> {
        let mut failures = Vec::new();
        for rule in &mut self.rules {
            if let Err(error) = rule.load(variables) {
                log::debug!("rule block '{}' failed to load '{}': {}", self.name, rule.text(), error);
                failures.push(format!("[{}]: {}", rule.text(), error));
            }
        }
        if failures.is_empty() {
            Ok(())
        } else {
            Err(FuzzyError::RuleLoading {
                block: self.name.clone(),
                failures: failures.join("\n"),
            })
        }
    }

    pub fn unload_rules(&mut self) {
        self.rules.iter_mut().for_each(Rule::unload);
    }

    #[track_caller]
    pub fn reload_rules(&mut self, variables: VariableSet<'_>) -> FuzzyResult<()> {
        self.unload_rules();
        self.load_rules(variables)
    }

    /// Runs the activation strategy over the rules.
    pub fn activate(
        &mut self,
        inputs: &[InputVariable],
        outputs: &mut [OutputVariable],
        scope: &Scope,
    ) -> FuzzyResult<()> {
        log::debug!("activating rule block '{}' with {}", self.name, self.activation);
        let activation = self.activation;
        activation.activate(self, inputs, outputs, scope)
    }

    pub fn requires_conjunction(&self) -> bool {
        self.loaded_antecedents().any(|antecedent| antecedent.requires_conjunction())
    }

    pub fn requires_disjunction(&self) -> bool {
        self.loaded_antecedents().any(|antecedent| antecedent.requires_disjunction())
    }

    fn loaded_antecedents(&self) -> impl Iterator<Item = &super::Antecedent> {
        self.rules.iter().filter_map(Rule::antecedent)
    }
}
