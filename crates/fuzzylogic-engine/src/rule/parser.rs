//! Parser for rule text.
//!
//! Grammar:
//! ```text
//! rule        := "if" antecedent "then" consequent ["with" weight]
//! antecedent  := and_expr ("or" and_expr)*
//! and_expr    := primary ("and" primary)*
//! primary     := "(" antecedent ")" | proposition
//! proposition := variable "is" hedge* (term | "any")
//! consequent  := proposition ("and" proposition)*
//! ```
//!
//! `and` binds tighter than `or`; both associate to the left. Consequent
//! propositions must name output variables and end with a term.

use super::antecedent::Antecedent;
use super::consequent::Consequent;
use super::expression::{Expression, Logical, Proposition};
use super::Rule;
use crate::error::{FuzzyError, FuzzyResult};
use crate::hedge::Hedge;
use crate::metadata::SourceLocation;
use crate::variable::{VariableRef, VariableSet};

pub(crate) struct ParsedRule {
    pub antecedent: Antecedent,
    pub consequent: Consequent,
    pub weight: Option<f64>,
}

fn tokenize(text: &str) -> Vec<&str> {
    let mut tokens = Vec::new();
    for word in text.split_whitespace() {
        let mut rest = word;
        while !rest.is_empty() {
            match rest.find(|c| c == '(' || c == ')') {
                Some(0) => {
                    tokens.push(&rest[..1]);
                    rest = &rest[1..];
                }
                Some(position) => {
                    tokens.push(&rest[..position]);
                    rest = &rest[position..];
                }
                None => {
                    tokens.push(rest);
                    rest = "";
                }
            }
        }
    }
    tokens
}

pub(crate) fn parse_rule(
    text: &str,
    variables: VariableSet<'_>,
    location: &SourceLocation,
) -> FuzzyResult<ParsedRule> {
    let tokens = tokenize(text);
    match tokens.first() {
        Some(&Rule::IF) => {}
        Some(token) => {
            return Err(FuzzyError::syntax(
                format!("expected keyword '{}', found '{}'", Rule::IF, token),
                location,
            ))
        }
        None => return Err(FuzzyError::syntax("empty rule", location)),
    }
    let then = tokens
        .iter()
        .position(|&token| token == Rule::THEN)
        .ok_or_else(|| {
            FuzzyError::syntax(format!("expected keyword '{}'", Rule::THEN), location)
        })?;
    let with = tokens
        .iter()
        .skip(then)
        .position(|&token| token == Rule::WITH)
        .map(|offset| then + offset);

    let antecedent_tokens = &tokens[1..then];
    let consequent_tokens = &tokens[then + 1..with.unwrap_or(tokens.len())];
    if antecedent_tokens.is_empty() {
        return Err(FuzzyError::syntax("expected an antecedent after 'if'", location));
    }
    if consequent_tokens.is_empty() {
        return Err(FuzzyError::syntax("expected a consequent after 'then'", location));
    }

    let weight = match with {
        None => None,
        Some(index) => match &tokens[index + 1..] {
            [value] => Some(value.parse::<f64>().map_err(|_| {
                FuzzyError::syntax(format!("expected a numeric weight, found '{}'", value), location)
            })?),
            [] => {
                return Err(FuzzyError::syntax(
                    format!("expected a weight after '{}'", Rule::WITH),
                    location,
                ))
            }
            [_, extra, ..] => {
                return Err(FuzzyError::syntax(
                    format!("unexpected token '{}' after the weight", extra),
                    location,
                ))
            }
        },
    };

    let mut parser = Parser {
        tokens: antecedent_tokens,
        position: 0,
        variables,
        location,
    };
    let root = parser.parse_or()?;
    if let Some(token) = parser.peek() {
        return Err(parser.error(format!("unexpected token '{}' in antecedent", token)));
    }

    let consequent = parse_consequent(consequent_tokens, variables, location)?;
    Ok(ParsedRule {
        antecedent: Antecedent::new(root),
        consequent,
        weight,
    })
}

fn parse_consequent(
    tokens: &[&str],
    variables: VariableSet<'_>,
    location: &SourceLocation,
) -> FuzzyResult<Consequent> {
    let mut conclusions = Vec::new();
    for clause in tokens.split(|&token| token == Rule::AND) {
        let mut parser = Parser {
            tokens: clause,
            position: 0,
            variables,
            location,
        };
        let proposition = parser.parse_proposition()?;
        if let Some(token) = parser.peek() {
            return Err(parser.error(format!("unexpected token '{}' in consequent", token)));
        }
        if matches!(proposition.reference(), VariableRef::Input(_)) {
            return Err(parser.error(format!(
                "consequent variable '{}' must be an output variable",
                proposition.variable()
            )));
        }
        if proposition.term_index().is_none() {
            return Err(parser.error(format!(
                "consequent on '{}' must end with a term",
                proposition.variable()
            )));
        }
        conclusions.push(proposition);
    }
    Ok(Consequent::new(conclusions))
}

struct Parser<'t, 'v> {
    tokens: &'t [&'t str],
    position: usize,
    variables: VariableSet<'v>,
    location: &'t SourceLocation,
}

impl<'t, 'v> Parser<'t, 'v> {
    fn peek(&self) -> Option<&'t str> {
        self.tokens.get(self.position).copied()
    }

    fn next(&mut self) -> Option<&'t str> {
        let token = self.peek();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn error(&self, message: String) -> FuzzyError {
        FuzzyError::syntax(message, self.location)
    }

    fn parse_or(&mut self) -> FuzzyResult<Expression> {
        let mut left = self.parse_and()?;
        while self.peek() == Some(Rule::OR) {
            self.next();
            let right = self.parse_and()?;
            left = Expression::operator(Logical::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> FuzzyResult<Expression> {
        let mut left = self.parse_primary()?;
        while self.peek() == Some(Rule::AND) {
            self.next();
            let right = self.parse_primary()?;
            left = Expression::operator(Logical::And, left, right);
        }
        Ok(left)
    }

    fn parse_primary(&mut self) -> FuzzyResult<Expression> {
        if self.peek() == Some("(") {
            self.next();
            let inner = self.parse_or()?;
            return match self.next() {
                Some(")") => Ok(inner),
                Some(token) => Err(self.error(format!("expected ')', found '{}'", token))),
                None => Err(self.error("expected ')'".to_string())),
            };
        }
        self.parse_proposition().map(Expression::Proposition)
    }

    fn parse_proposition(&mut self) -> FuzzyResult<Proposition> {
        let name = self
            .next()
            .ok_or_else(|| self.error("expected a variable".to_string()))?;
        let reference = self
            .variables
            .find(name)
            .ok_or_else(|| FuzzyError::UnknownVariable {
                name: name.to_string(),
                location: self.location.clone(),
            })?;
        match self.next() {
            Some(Rule::IS) => {}
            Some(token) => {
                return Err(self.error(format!(
                    "expected keyword '{}' after '{}', found '{}'",
                    Rule::IS,
                    name,
                    token
                )))
            }
            None => {
                return Err(self.error(format!("expected keyword '{}' after '{}'", Rule::IS, name)))
            }
        }

        let mut hedges = Vec::new();
        loop {
            let token = self
                .next()
                .ok_or_else(|| self.error(format!("expected a term for '{}'", name)))?;
            if let Ok(hedge) = token.parse::<Hedge>() {
                hedges.push(hedge);
                if hedge == Hedge::Any {
                    return Ok(Proposition::new(name.to_string(), reference, hedges, None));
                }
                continue;
            }
            let index = self
                .variables
                .variable(reference)
                .and_then(|variable| variable.term_index(token))
                .ok_or_else(|| FuzzyError::UnknownTerm {
                    variable: name.to_string(),
                    term: token.to_string(),
                    location: self.location.clone(),
                })?;
            return Ok(Proposition::new(
                name.to_string(),
                reference,
                hedges,
                Some((token.to_string(), index)),
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::term::Term;
    use crate::variable::{InputVariable, OutputVariable};

    fn variables() -> (Vec<InputVariable>, Vec<OutputVariable>) {
        let inputs = vec![
            InputVariable::new("service", 0.0, 10.0)
                .with_term(Term::triangle("poor", 0.0, 0.0, 5.0))
                .unwrap()
                .with_term(Term::triangle("good", 0.0, 5.0, 10.0))
                .unwrap(),
            InputVariable::new("food", 0.0, 10.0)
                .with_term(Term::ramp("rancid", 5.0, 0.0))
                .unwrap(),
        ];
        let outputs = vec![OutputVariable::new("tip", 0.0, 30.0)
            .with_term(Term::triangle("cheap", 0.0, 5.0, 10.0))
            .unwrap()];
        (inputs, outputs)
    }

    #[test]
    fn test_tokenize_splits_parentheses() {
        assert_eq!(
            tokenize("if (a is b) and(c is d)"),
            vec!["if", "(", "a", "is", "b", ")", "and", "(", "c", "is", "d", ")"]
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let (inputs, outputs) = variables();
        let parsed = parse_rule(
            "if service is poor or service is good and food is rancid then tip is cheap",
            VariableSet::new(&inputs, &outputs),
            &SourceLocation::unknown(),
        )
        .unwrap();
        match parsed.antecedent.root() {
            Expression::Operator {
                operator: Logical::Or,
                right,
                ..
            } => assert!(matches!(
                right.as_ref(),
                Expression::Operator {
                    operator: Logical::And,
                    ..
                }
            )),
            other => panic!("unexpected tree {:?}", other),
        }
        assert_eq!(parsed.weight, None);
    }

    #[test]
    fn test_hedges_weight_and_any() {
        let (inputs, outputs) = variables();
        let parsed = parse_rule(
            "if service is not very poor and food is any then tip is somewhat cheap with 0.5",
            VariableSet::new(&inputs, &outputs),
            &SourceLocation::unknown(),
        )
        .unwrap();
        let propositions = parsed.antecedent.root().propositions();
        assert_eq!(propositions[0].hedges(), &[Hedge::Not, Hedge::Very]);
        assert_eq!(propositions[0].term(), Some("poor"));
        assert_eq!(propositions[1].term(), None);
        assert_eq!(parsed.consequent.conclusions()[0].hedges(), &[Hedge::Somewhat]);
        assert_eq!(parsed.weight, Some(0.5));
    }

    #[test]
    fn test_errors() {
        let (inputs, outputs) = variables();
        let variables = VariableSet::new(&inputs, &outputs);
        let location = SourceLocation::unknown();
        let parse = |text: &str| parse_rule(text, variables, &location);

        assert!(matches!(
            parse("service is poor then tip is cheap"),
            Err(FuzzyError::Syntax { .. })
        ));
        assert!(matches!(
            parse("if service is poor"),
            Err(FuzzyError::Syntax { .. })
        ));
        assert!(matches!(
            parse("if speed is poor then tip is cheap"),
            Err(FuzzyError::UnknownVariable { .. })
        ));
        assert!(matches!(
            parse("if service is great then tip is cheap"),
            Err(FuzzyError::UnknownTerm { .. })
        ));
        assert!(matches!(
            parse("if service poor then tip is cheap"),
            Err(FuzzyError::Syntax { .. })
        ));
        assert!(matches!(
            parse("if (service is poor then tip is cheap"),
            Err(FuzzyError::Syntax { .. })
        ));
        assert!(matches!(
            parse("if service is poor then food is rancid"),
            Err(FuzzyError::Syntax { .. })
        ));
        assert!(matches!(
            parse("if service is poor then tip is cheap with heavy"),
            Err(FuzzyError::Syntax { .. })
        ));
        assert!(matches!(
            parse("if service is poor then tip is any"),
            Err(FuzzyError::Syntax { .. })
        ));
    }
}
