//! Integration tests for complete engines
//!
//! - A light dimmer with one input and three rules
//! - A tipper with two inputs, hedges and parenthesized antecedents
//! - Text-driven configuration through the factory registries
//! - Versioned JSON

use approx::assert_abs_diff_eq;
use fuzzylogic_engine::factory;
use fuzzylogic_engine::*;

// ============================================================================
// Fixtures
// ============================================================================

fn levels(lower: &str, middle: &str, upper: &str) -> [Term; 3] {
    [
        Term::triangle(lower, 0.0, 0.25, 0.5),
        Term::triangle(middle, 0.25, 0.5, 0.75),
        Term::triangle(upper, 0.5, 0.75, 1.0),
    ]
}

fn dimmer(defuzzifier: Defuzzifier) -> Engine {
    let mut ambient = InputVariable::new("Ambient", 0.0, 1.0);
    for term in levels("DARK", "MEDIUM", "BRIGHT") {
        ambient.add_term(term).unwrap();
    }
    let mut power = OutputVariable::new("Power", 0.0, 1.0);
    for term in levels("LOW", "MEDIUM", "HIGH") {
        power.add_term(term).unwrap();
    }

    let mut engine = Engine::new("SimpleDimmer")
        .with_input_variable(ambient)
        .with_output_variable(power)
        .with_rule_block(
            RuleBlock::new("dimming")
                .with_rule(Rule::new("if Ambient is DARK then Power is HIGH"))
                .with_rule(Rule::new("if Ambient is MEDIUM then Power is MEDIUM"))
                .with_rule(Rule::new("if Ambient is BRIGHT then Power is LOW")),
        );
    engine.configure(
        &OperatorConfig::custom()
            .conjunction(TNorm::Minimum)
            .disjunction(SNorm::Maximum)
            .implication(TNorm::Minimum)
            .accumulation(SNorm::Maximum)
            .defuzzifier(defuzzifier)
            .build(),
    );
    engine.load().unwrap();
    engine
}

fn tipper() -> Engine {
    let mut engine = Engine::new("tipper")
        .with_input_variable(
            InputVariable::new("service", 0.0, 10.0)
                .with_term(Term::triangle("poor", 0.0, 0.0, 5.0))
                .unwrap()
                .with_term(Term::triangle("good", 5.0, 10.0, 10.0))
                .unwrap(),
        )
        .with_input_variable(
            InputVariable::new("food", 0.0, 10.0)
                .with_term(Term::triangle("rancid", 0.0, 0.0, 5.0))
                .unwrap()
                .with_term(Term::triangle("delicious", 5.0, 10.0, 10.0))
                .unwrap(),
        )
        .with_output_variable(
            OutputVariable::new("tip", 0.0, 30.0)
                .with_term(Term::triangle("cheap", 0.0, 5.0, 10.0))
                .unwrap()
                .with_term(Term::triangle("average", 10.0, 15.0, 20.0))
                .unwrap()
                .with_term(Term::triangle("generous", 20.0, 25.0, 30.0))
                .unwrap(),
        )
        .with_rule_block(
            RuleBlock::new("tipping")
                .with_rule(Rule::new("if service is poor or food is rancid then tip is cheap"))
                .with_rule(Rule::new(
                    "if service is very good and food is not rancid then tip is generous",
                ))
                .with_rule(Rule::new(
                    "if (service is poor or food is rancid) and service is good then tip is average",
                )),
        );
    engine.configure(&OperatorConfig::mamdani());
    engine.load().unwrap();
    engine
}

// ============================================================================
// Dimmer
// ============================================================================

#[test]
fn test_dimmer_known_points() {
    let mut engine = dimmer(Defuzzifier::centroid(100));
    assert_eq!(engine.engine_type().0, EngineType::Mamdani);

    engine.set_input_value("Ambient", 0.25).unwrap();
    engine.process().unwrap();
    assert_abs_diff_eq!(engine.output_value("Power").unwrap(), 0.75, epsilon = 1e-6);

    engine.set_input_value("Ambient", 0.5).unwrap();
    engine.process().unwrap();
    assert_abs_diff_eq!(engine.output_value("Power").unwrap(), 0.5, epsilon = 1e-6);
}

#[test]
fn test_dimmer_is_symmetric() {
    let mut engine = dimmer(Defuzzifier::centroid(100));
    for ambient in [0.3, 0.375, 0.42, 0.6] {
        engine.set_input_value("Ambient", ambient).unwrap();
        engine.process().unwrap();
        let power = engine.output_value("Power").unwrap();
        engine.set_input_value("Ambient", 1.0 - ambient).unwrap();
        engine.process().unwrap();
        let mirrored = engine.output_value("Power").unwrap();
        assert_abs_diff_eq!(power + mirrored, 1.0, epsilon = 1e-6);
    }
}

#[test]
fn test_dimmer_with_every_integral_defuzzifier() {
    for defuzzifier in [
        Defuzzifier::centroid(100),
        Defuzzifier::bisector(100),
        Defuzzifier::smallest_of_maximum(100),
        Defuzzifier::largest_of_maximum(100),
        Defuzzifier::mean_of_maximum(100),
    ] {
        let mut engine = dimmer(defuzzifier);
        engine.set_input_value("Ambient", 0.25).unwrap();
        engine.process().unwrap();
        assert_abs_diff_eq!(engine.output_value("Power").unwrap(), 0.75, epsilon = 1e-2);
    }
}

#[test]
fn test_fuzzy_output_text() {
    let mut engine = dimmer(Defuzzifier::centroid(100));
    engine.set_input_value("Ambient", 0.375).unwrap();
    engine.process().unwrap();
    let config = *engine.config();
    let power = engine.output_variable("Power").unwrap();
    assert_eq!(
        power.fuzzy_output_value(&config),
        "0.000/LOW + 0.500/MEDIUM + 0.500/HIGH"
    );
    let ambient = engine.input_variable("Ambient").unwrap();
    assert_eq!(
        ambient.fuzzify(0.375, &engine.scope()),
        "0.500/DARK + 0.500/MEDIUM + 0.000/BRIGHT"
    );
}

// ============================================================================
// Tipper
// ============================================================================

#[test]
fn test_tipper_rule_degrees() {
    let mut engine = tipper();
    engine.set_input_value("service", 7.5).unwrap();
    engine.set_input_value("food", 2.0).unwrap();
    engine.process().unwrap();

    let degrees: Vec<f64> = engine.rule_blocks()[0]
        .rules()
        .iter()
        .map(Rule::activation_degree)
        .collect();
    // poor = 0, rancid = 0.6, good = 0.5
    assert_abs_diff_eq!(degrees[0], 0.6, epsilon = 1e-9);
    assert_abs_diff_eq!(degrees[1], 0.25, epsilon = 1e-9);
    assert_abs_diff_eq!(degrees[2], 0.5, epsilon = 1e-9);

    let tip = engine.output_value("tip").unwrap();
    assert!(tip > 5.0 && tip < 25.0, "tip = {}", tip);
}

#[test]
fn test_tipper_generous_for_excellent_service() {
    let mut engine = tipper();
    engine.set_input_value("service", 10.0).unwrap();
    engine.set_input_value("food", 10.0).unwrap();
    engine.process().unwrap();
    assert_abs_diff_eq!(engine.output_value("tip").unwrap(), 25.0, epsilon = 1e-2);
}

#[test]
fn test_rule_parse_errors_carry_the_caller() {
    let engine = tipper();

    let error = Rule::parse("if speed is high then tip is cheap", &engine).unwrap_err();
    match error {
        FuzzyError::UnknownVariable { name, location } => {
            assert_eq!(name, "speed");
            assert!(location.file.ends_with("engine_integration.rs"));
        }
        other => panic!("unexpected error: {}", other),
    }

    assert!(matches!(
        Rule::parse("if service is superb then tip is cheap", &engine),
        Err(FuzzyError::UnknownTerm { .. })
    ));
    assert!(matches!(
        Rule::parse("if service is poor tip is cheap", &engine),
        Err(FuzzyError::Syntax { .. })
    ));
    assert!(Rule::parse("if service is poor then tip is cheap with 0.5", &engine).is_ok());
}

#[test]
fn test_engine_load_reports_every_broken_rule() {
    let mut engine = tipper();
    let block = engine.rule_block_mut("tipping").unwrap();
    block.add_rule(Rule::new("if service is poor then tip is stingy"));
    block.add_rule(Rule::new("if service then tip is cheap"));

    match engine.load() {
        Err(FuzzyError::RuleLoading { block, failures }) => {
            assert_eq!(block, "tipping");
            assert_eq!(failures.lines().count(), 2);
            assert!(failures.contains("stingy"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert!(!engine.is_ready());
}

// ============================================================================
// Text-driven configuration
// ============================================================================

#[test]
fn test_engine_built_from_names() {
    let mut engine = Engine::new("names")
        .with_input_variable(
            InputVariable::new("x", 0.0, 10.0)
                .with_term(factory::term("Trapezoid", "mid", "2 4 6 8").unwrap())
                .unwrap(),
        )
        .with_output_variable(
            OutputVariable::new("y", 0.0, 10.0)
                .with_term(factory::term("Gaussian", "center", "5 1").unwrap())
                .unwrap(),
        )
        .with_rule_block(RuleBlock::new("rules").with_rule(Rule::new("if x is mid then y is center")));
    engine
        .configure_by_name("Minimum", "Maximum", "Minimum", "Maximum", "Bisector 200", "General")
        .unwrap();
    engine.load().unwrap();
    assert!(engine.is_ready(), "{:?}", engine.ready_status());

    engine.set_input_value("x", 5.0).unwrap();
    engine.process().unwrap();
    assert_abs_diff_eq!(engine.output_value("y").unwrap(), 5.0, epsilon = 5e-2);
    assert_eq!(
        engine.output_variable("y").unwrap().defuzzifier(),
        Some(&Defuzzifier::bisector(200))
    );
}

#[test]
fn test_unknown_names_are_rejected() {
    let mut engine = tipper();
    assert!(matches!(
        engine.configure_by_name("Minimum", "Maximum", "Minimum", "Maximum", "Median", ""),
        Err(FuzzyError::NotFound { kind: "defuzzifier", .. })
    ));
    assert!(engine
        .configure_by_name("Minimum", "Maximum", "Minimum", "Maximum", "Centroid", "Sometimes")
        .is_err());
}

#[test]
fn test_engine_text() {
    let engine = tipper();
    let text = engine.to_string();
    assert!(text.starts_with("Engine: tipper\n"));
    assert!(text.contains("InputVariable: food\n"));
    assert!(text.contains("  term: generous Triangle 20.000 25.000 30.000\n"));
    assert!(text.contains("  defuzzifier: Centroid 100\n"));
    assert!(text.contains(
        "  rule: if service is very good and food is not rancid then tip is generous\n"
    ));
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_versioned_json_with_metadata() {
    let mut metadata = serde_json::Map::new();
    metadata.insert("author".to_string(), serde_json::json!("tests"));
    let versioned = VersionedEngine::with_metadata(tipper(), metadata);
    assert_eq!(versioned.version, FORMAT_VERSION);

    let json = versioned.to_json_compact().unwrap();
    let restored = VersionedEngine::from_json(&json).unwrap();
    assert_eq!(
        restored.metadata.as_ref().and_then(|m| m.get("author")),
        Some(&serde_json::json!("tests"))
    );

    let mut engine = restored.into_engine().unwrap();
    assert!(engine.output_variable("tip").unwrap().default_value().is_nan());
    engine.set_input_value("service", 10.0).unwrap();
    engine.set_input_value("food", 10.0).unwrap();
    engine.process().unwrap();
    assert_abs_diff_eq!(engine.output_value("tip").unwrap(), 25.0, epsilon = 1e-2);
}

#[test]
fn test_incompatible_version_is_detected() {
    let mut versioned = VersionedEngine::new(tipper());
    versioned.version = "2.0.0".to_string();
    assert!(!versioned.is_compatible());
    assert!(VersionedEngine::from_json("{\"version\": 1}").is_err());
}
