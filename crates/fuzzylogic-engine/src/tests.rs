//! Unit tests for whole engines.

use approx::assert_abs_diff_eq;

use crate::{
    Activation, Defuzzifier, Engine, EngineType, FuzzyError, InputVariable, OperatorConfig,
    OutputVariable, Rule, RuleBlock, SNorm, Shape, TNorm, Term, VersionedEngine, WeightedType,
};

/// `if x is Low then y is High` with Low = (0, 0, 5) and High = (5, 10, 15)
/// on [0, 10].
fn larsen() -> Engine {
    let mut engine = Engine::new("larsen")
        .with_input_variable(
            InputVariable::new("x", 0.0, 10.0)
                .with_term(Term::triangle("Low", 0.0, 0.0, 5.0))
                .unwrap(),
        )
        .with_output_variable(
            OutputVariable::new("y", 0.0, 10.0)
                .with_term(Term::triangle("High", 5.0, 10.0, 15.0))
                .unwrap(),
        )
        .with_rule_block(RuleBlock::new("rules").with_rule(Rule::new("if x is Low then y is High")));
    engine.configure(
        &OperatorConfig::custom()
            .conjunction(TNorm::Minimum)
            .disjunction(SNorm::Maximum)
            .implication(TNorm::AlgebraicProduct)
            .accumulation(SNorm::Maximum)
            .defuzzifier(Defuzzifier::centroid(100))
            .build(),
    );
    engine.load().unwrap();
    engine
}

/// Two triangles over [0, 10] that sum to 1 everywhere.
fn low_high_input() -> InputVariable {
    InputVariable::new("x", 0.0, 10.0)
        .with_term(Term::triangle("low", 0.0, 0.0, 10.0))
        .unwrap()
        .with_term(Term::triangle("high", 0.0, 10.0, 10.0))
        .unwrap()
}

#[test]
fn test_mamdani_centroid_matches_integration() {
    let mut engine = larsen();
    engine.set_input_value("x", 0.0).unwrap();
    engine.process().unwrap();

    // Direct integration of the part of High inside [0, 10].
    let high = Term::triangle("High", 5.0, 10.0, 15.0);
    let n = 100_000;
    let dx = 10.0 / n as f64;
    let (mut area, mut moment) = (0.0, 0.0);
    for i in 0..n {
        let x = (i as f64 + 0.5) * dx;
        let y = high.membership(x);
        area += y;
        moment += x * y;
    }
    let expected = moment / area;

    assert_abs_diff_eq!(engine.output_value("y").unwrap(), expected, epsilon = 1e-2);
    assert_abs_diff_eq!(expected, 25.0 / 3.0, epsilon = 1e-4);
    assert_eq!(engine.engine_type().0, EngineType::Larsen);
}

#[test]
fn test_no_activation_falls_back_to_default() {
    let mut engine = larsen();
    engine.output_variable_mut("y").unwrap().set_default_value(-1.0);
    engine.set_input_value("x", 8.0).unwrap();
    engine.process().unwrap();
    assert_eq!(engine.output_value("y").unwrap(), -1.0);
}

#[test]
fn test_takagi_sugeno_with_linear_term() {
    let mut engine = Engine::new("sugeno")
        .with_input_variable(low_high_input())
        .with_output_variable(
            OutputVariable::new("y", 0.0, 30.0)
                .with_term(Term::constant("five", 5.0))
                .unwrap()
                .with_term(Term::linear("line", vec![2.0, 1.0]))
                .unwrap(),
        )
        .with_rule_block(
            RuleBlock::new("rules")
                .with_rule(Rule::new("if x is low then y is five"))
                .with_rule(Rule::new("if x is high then y is line")),
        );
    engine.configure(&OperatorConfig::takagi_sugeno());
    engine.load().unwrap();
    assert!(engine.is_ready(), "{:?}", engine.ready_status());
    assert_eq!(engine.engine_type().0, EngineType::TakagiSugeno);

    engine.set_input_value("x", 4.0).unwrap();
    engine.process().unwrap();
    // 0.6 * 5 + 0.4 * (2 * 4 + 1)
    assert_abs_diff_eq!(engine.output_value("y").unwrap(), 6.6, epsilon = 1e-9);
}

#[test]
fn test_tsukamoto_inverts_ramps() {
    let mut engine = Engine::new("tsukamoto")
        .with_input_variable(low_high_input())
        .with_output_variable(
            OutputVariable::new("y", 0.0, 10.0)
                .with_term(Term::ramp("falling", 10.0, 0.0))
                .unwrap()
                .with_term(Term::ramp("rising", 0.0, 10.0))
                .unwrap(),
        )
        .with_rule_block(
            RuleBlock::new("rules")
                .with_rule(Rule::new("if x is low then y is falling"))
                .with_rule(Rule::new("if x is high then y is rising")),
        );
    engine.configure(&OperatorConfig::tsukamoto());
    engine.load().unwrap();
    assert_eq!(engine.engine_type().0, EngineType::Tsukamoto);

    for x in [1.0, 3.0, 7.5] {
        engine.set_input_value("x", x).unwrap();
        engine.process().unwrap();
        assert_abs_diff_eq!(engine.output_value("y").unwrap(), x, epsilon = 1e-9);
    }
}

#[test]
fn test_tsukamoto_negated_consequent() {
    let mut engine = Engine::new("tsukamoto")
        .with_input_variable(low_high_input())
        .with_output_variable(
            OutputVariable::new("y", 0.0, 10.0)
                .with_term(Term::new(
                    "near",
                    Shape::Concave {
                        inflection: 5.0,
                        end: 10.0,
                    },
                ))
                .unwrap()
                .with_term(Term::ramp("rising", 0.0, 10.0))
                .unwrap(),
        )
        .with_rule_block(
            RuleBlock::new("rules")
                .with_rule(Rule::new("if x is high then y is not near"))
                .with_rule(Rule::new("if x is high then y is rising")),
        );
    engine.configure(&OperatorConfig::tsukamoto());
    engine.load().unwrap();

    // `not near` lands at degree 0 and contributes nothing.
    engine.set_input_value("x", 10.0).unwrap();
    engine.process().unwrap();
    assert_abs_diff_eq!(engine.output_value("y").unwrap(), 10.0, epsilon = 1e-9);

    // `not near` at 0.25 inverts below the range and is bounded to 0.
    engine.set_input_value("x", 7.5).unwrap();
    engine.process().unwrap();
    assert_abs_diff_eq!(engine.output_value("y").unwrap(), 5.625, epsilon = 1e-9);
}

#[test]
fn test_function_term_reads_input_values() {
    let mut engine = Engine::new("function")
        .with_input_variable(
            InputVariable::new("speed", 0.0, 10.0)
                .with_term(Term::ramp("fast", 0.0, 10.0))
                .unwrap(),
        )
        .with_output_variable(
            OutputVariable::new("y", 0.0, 100.0)
                .with_term(Term::function("double", "speed * 2 + 1").unwrap())
                .unwrap(),
        )
        .with_rule_block(
            RuleBlock::new("rules").with_rule(Rule::new("if speed is fast then y is double")),
        );
    engine.configure(&OperatorConfig::takagi_sugeno());
    engine.load().unwrap();

    engine.set_input_value("speed", 3.0).unwrap();
    engine.process().unwrap();
    assert_abs_diff_eq!(engine.output_value("y").unwrap(), 7.0, epsilon = 1e-9);
}

#[test]
fn test_ready_status_reports_missing_defuzzifier() {
    let mut engine = larsen();
    assert!(engine.is_ready());
    engine
        .output_variable_mut("y")
        .unwrap()
        .set_defuzzifier(None);
    assert!(!engine.is_ready());
    let status = engine.ready_status();
    assert!(status.iter().any(|reason| reason.contains("no defuzzifier")));
}

#[test]
fn test_missing_conjunction_fails_process() {
    let mut engine = larsen();
    let block = engine.rule_block_mut("rules").unwrap();
    block.add_rule(Rule::new("if x is Low and x is Low then y is High"));
    block.set_conjunction(None);
    engine.load().unwrap();
    assert!(!engine.is_ready());

    engine.set_input_value("x", 1.0).unwrap();
    let error = engine.process().unwrap_err();
    assert!(matches!(error, FuzzyError::MissingOperator { .. }));
    assert!(error.is_evaluation_error());
}

#[test]
fn test_output_variable_in_antecedent() {
    let mut engine = larsen();
    engine.add_output_variable(
        OutputVariable::new("z", 0.0, 1.0)
            .with_term(Term::ramp("big", 0.0, 1.0))
            .unwrap()
            .with_accumulation(SNorm::Maximum)
            .with_defuzzifier(Defuzzifier::weighted_average(WeightedType::Tsukamoto)),
    );
    engine.add_rule_block(
        RuleBlock::new("chained")
            .with_conjunction(TNorm::Minimum)
            .with_rule(Rule::new("if y is High then z is big with 0.5")),
    );
    engine.load().unwrap();

    engine.set_input_value("x", 0.0).unwrap();
    engine.process().unwrap();
    assert_abs_diff_eq!(engine.output_value("z").unwrap(), 0.5, epsilon = 1e-9);
}

#[test]
fn test_disabled_block_and_output() {
    let mut engine = larsen();
    engine.rule_block_mut("rules").unwrap().set_enabled(false);
    engine.set_input_value("x", 0.0).unwrap();
    engine.process().unwrap();
    assert!(engine.output_value("y").unwrap().is_nan());

    engine.rule_block_mut("rules").unwrap().set_enabled(true);
    engine.process().unwrap();
    let value = engine.output_value("y").unwrap();
    assert!(value.is_finite());

    engine.output_variable_mut("y").unwrap().set_enabled(false);
    engine.set_input_value("x", 4.0).unwrap();
    engine.process().unwrap();
    assert_eq!(engine.output_value("y").unwrap(), value);
}

#[test]
fn test_restart_clears_values() {
    let mut engine = larsen();
    engine.set_input_value("x", 1.0).unwrap();
    engine.process().unwrap();
    engine.restart();
    assert!(engine.input_variable("x").unwrap().value().is_nan());
    let y = engine.output_variable("y").unwrap();
    assert!(y.value().is_nan());
    assert!(y.previous_value().is_nan());
    assert!(y.fuzzy_output().is_empty());
    assert!(engine.rule_blocks()[0].rules().iter().all(|rule| !rule.is_activated()));
}

#[test]
fn test_repeated_process_is_deterministic() {
    let mut engine = larsen();
    engine.set_input_value("x", 2.0).unwrap();
    engine.process().unwrap();
    let first = engine.output_value("y").unwrap();
    engine.process().unwrap();
    assert_eq!(engine.output_value("y").unwrap(), first);
}

#[test]
fn test_clone_is_independent() {
    let mut engine = larsen();
    let mut copy = engine.clone();
    engine.set_input_value("x", 0.0).unwrap();
    copy.set_input_value("x", 6.0).unwrap();
    engine.process().unwrap();
    copy.process().unwrap();
    assert_eq!(engine.input_variable("x").unwrap().value(), 0.0);
    assert!(engine.output_value("y").unwrap().is_finite());
    assert!(copy.output_value("y").unwrap().is_nan());
    assert!(copy.rule_blocks()[0].rules()[0].is_loaded());
}

#[test]
fn test_removing_variables_unloads_rules() {
    let mut engine = larsen();
    engine.insert_input_variable(0, InputVariable::new("w", 0.0, 1.0));
    assert!(!engine.rule_blocks()[0].rules()[0].is_loaded());
    engine.load().unwrap();
    assert!(engine.rule_blocks()[0].rules()[0].is_loaded());

    engine.remove_input_variable("x").unwrap();
    assert!(matches!(engine.load(), Err(FuzzyError::RuleLoading { .. })));
    assert!(matches!(
        engine.remove_input_variable("x"),
        Err(FuzzyError::NotFound { .. })
    ));
}

#[test]
fn test_lookup_by_name() {
    let engine = larsen();
    assert!(engine.has_variable("x"));
    assert!(engine.has_output_variable("y"));
    assert!(!engine.has_input_variable("y"));
    assert!(matches!(
        engine.output_value("missing"),
        Err(FuzzyError::NotFound { kind: "output variable", .. })
    ));
    let names: Vec<_> = engine.variables().map(|v| v.name()).collect();
    assert_eq!(names, vec!["x", "y"]);
}

#[test]
fn test_configure_by_name() {
    let mut engine = larsen();
    engine
        .configure_by_name("AlgebraicProduct", "AlgebraicSum", "none", "", "WeightedAverage TakagiSugeno", "Highest 2")
        .unwrap();
    let block = engine.rule_block("rules").unwrap();
    assert_eq!(block.conjunction(), Some(TNorm::AlgebraicProduct));
    assert_eq!(block.disjunction(), Some(SNorm::AlgebraicSum));
    assert_eq!(block.implication(), None);
    assert_eq!(*block.activation(), Activation::highest(2));
    let y = engine.output_variable("y").unwrap();
    assert_eq!(y.accumulation(), None);
    assert_eq!(
        y.defuzzifier(),
        Some(&Defuzzifier::weighted_average(WeightedType::TakagiSugeno))
    );

    assert!(engine
        .configure_by_name("Maximum", "", "", "", "", "")
        .is_err());
}

#[test]
fn test_json_round_trip_keeps_behavior() {
    let mut engine = larsen();
    engine.set_description("round trip");
    let json = VersionedEngine::new(engine.clone()).to_json_pretty().unwrap();
    let versioned = VersionedEngine::from_json(&json).unwrap();
    assert!(versioned.is_compatible());
    let mut restored = versioned.into_engine().unwrap();
    assert_eq!(restored.description(), "round trip");
    assert!(restored.is_ready());

    engine.set_input_value("x", 1.5).unwrap();
    restored.set_input_value("x", 1.5).unwrap();
    engine.process().unwrap();
    restored.process().unwrap();
    assert_eq!(
        engine.output_value("y").unwrap(),
        restored.output_value("y").unwrap()
    );
}
