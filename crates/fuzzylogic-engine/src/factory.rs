//! Name-keyed registries of operators, for layers that configure engines
//! from text.

use std::collections::BTreeMap;

use crate::error::{FuzzyError, FuzzyResult};
use crate::norm::{SNorm, TNorm};
use crate::term::Term;

pub type Constructor<T> = fn() -> T;

/// Maps names to constructors of `T`.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    kind: &'static str,
    constructors: BTreeMap<String, Constructor<T>>,
}

impl<T> Registry<T> {
    /// An empty registry; `kind` names what it builds in error messages.
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            constructors: BTreeMap::new(),
        }
    }

    /// Registers a constructor, replacing any previous one with that name.
    pub fn register(&mut self, name: impl Into<String>, constructor: Constructor<T>) {
        self.constructors.insert(name.into(), constructor);
    }

    pub fn deregister(&mut self, name: &str) -> bool {
        self.constructors.remove(name).is_some()
    }

    pub fn has(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    pub fn construct(&self, name: &str) -> FuzzyResult<T> {
        self.constructors
            .get(name)
            .map(|constructor| constructor())
            .ok_or_else(|| FuzzyError::not_found(self.kind, name))
    }

    /// Registered names in alphabetical order.
    pub fn available(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }
}

pub fn tnorms() -> Registry<TNorm> {
    let mut registry = Registry::new("t-norm");
    registry.register(TNorm::AlgebraicProduct.name(), || TNorm::AlgebraicProduct);
    registry.register(TNorm::BoundedDifference.name(), || TNorm::BoundedDifference);
    registry.register(TNorm::DrasticProduct.name(), || TNorm::DrasticProduct);
    registry.register(TNorm::EinsteinProduct.name(), || TNorm::EinsteinProduct);
    registry.register(TNorm::HamacherProduct.name(), || TNorm::HamacherProduct);
    registry.register(TNorm::Minimum.name(), || TNorm::Minimum);
    registry.register(TNorm::NilpotentMinimum.name(), || TNorm::NilpotentMinimum);
    registry
}

pub fn snorms() -> Registry<SNorm> {
    let mut registry = Registry::new("s-norm");
    registry.register(SNorm::AlgebraicSum.name(), || SNorm::AlgebraicSum);
    registry.register(SNorm::BoundedSum.name(), || SNorm::BoundedSum);
    registry.register(SNorm::DrasticSum.name(), || SNorm::DrasticSum);
    registry.register(SNorm::EinsteinSum.name(), || SNorm::EinsteinSum);
    registry.register(SNorm::HamacherSum.name(), || SNorm::HamacherSum);
    registry.register(SNorm::Maximum.name(), || SNorm::Maximum);
    registry.register(SNorm::NilpotentMaximum.name(), || SNorm::NilpotentMaximum);
    registry
}

/// Term class names accepted by [`term`].
pub fn term_classes() -> &'static [&'static str] {
    &Term::CLASSES
}

/// Builds a term from its class name and parameter text, as in
/// `term("Triangle", "low", "0 2.5 5")`.
pub fn term(class: &str, name: &str, parameters: &str) -> FuzzyResult<Term> {
    Term::configure(class, name, parameters)
}
