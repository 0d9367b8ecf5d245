//! Formula terms.
//!
//! Supports:
//! - Numbers, the argument `x` and engine variable names
//! - Unary operators: `!` (logical not), `~` and prefix `-` (negation)
//! - Binary operators: `^`, `* / %`, `+ -`, `and`, `or`
//! - Builtin functions such as `sin(x)`, `pow(x, 2)`, `gt(a, b)`
//! - Parentheses for grouping

use std::fmt;

use crate::error::{FuzzyError, FuzzyResult};
use crate::term::Scope;
use crate::variable::{VariableRef, VariableSet};

// Operator precedence (lowest to highest):
// 1. or
// 2. and
// 3. + -
// 4. * / %
// 5. ^ (right-associative)
// 6. ! ~ - (prefix)

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOperator {
    Not,
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOperator {
    Power,
    Multiply,
    Divide,
    Modulo,
    Add,
    Subtract,
    And,
    Or,
}

/// Builtin functions callable from a formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Gt,
    Ge,
    Eq,
    Neq,
    Le,
    Lt,
    Acos,
    Asin,
    Atan,
    Ceil,
    Cos,
    Cosh,
    Exp,
    Fabs,
    Floor,
    Log,
    Log10,
    Round,
    Sin,
    Sinh,
    Sqrt,
    Tan,
    Tanh,
    Log1p,
    Acosh,
    Asinh,
    Atanh,
    Pow,
    Atan2,
    Fmod,
}

impl Builtin {
    pub const ALL: [Builtin; 30] = [
        Builtin::Gt,
        Builtin::Ge,
        Builtin::Eq,
        Builtin::Neq,
        Builtin::Le,
        Builtin::Lt,
        Builtin::Acos,
        Builtin::Asin,
        Builtin::Atan,
        Builtin::Ceil,
        Builtin::Cos,
        Builtin::Cosh,
        Builtin::Exp,
        Builtin::Fabs,
        Builtin::Floor,
        Builtin::Log,
        Builtin::Log10,
        Builtin::Round,
        Builtin::Sin,
        Builtin::Sinh,
        Builtin::Sqrt,
        Builtin::Tan,
        Builtin::Tanh,
        Builtin::Log1p,
        Builtin::Acosh,
        Builtin::Asinh,
        Builtin::Atanh,
        Builtin::Pow,
        Builtin::Atan2,
        Builtin::Fmod,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Gt => "gt",
            Builtin::Ge => "ge",
            Builtin::Eq => "eq",
            Builtin::Neq => "neq",
            Builtin::Le => "le",
            Builtin::Lt => "lt",
            Builtin::Acos => "acos",
            Builtin::Asin => "asin",
            Builtin::Atan => "atan",
            Builtin::Ceil => "ceil",
            Builtin::Cos => "cos",
            Builtin::Cosh => "cosh",
            Builtin::Exp => "exp",
            Builtin::Fabs => "fabs",
            Builtin::Floor => "floor",
            Builtin::Log => "log",
            Builtin::Log10 => "log10",
            Builtin::Round => "round",
            Builtin::Sin => "sin",
            Builtin::Sinh => "sinh",
            Builtin::Sqrt => "sqrt",
            Builtin::Tan => "tan",
            Builtin::Tanh => "tanh",
            Builtin::Log1p => "log1p",
            Builtin::Acosh => "acosh",
            Builtin::Asinh => "asinh",
            Builtin::Atanh => "atanh",
            Builtin::Pow => "pow",
            Builtin::Atan2 => "atan2",
            Builtin::Fmod => "fmod",
        }
    }

    pub fn arity(self) -> usize {
        match self {
            Builtin::Gt
            | Builtin::Ge
            | Builtin::Eq
            | Builtin::Neq
            | Builtin::Le
            | Builtin::Lt
            | Builtin::Pow
            | Builtin::Atan2
            | Builtin::Fmod => 2,
            _ => 1,
        }
    }

    fn lookup(name: &str) -> Option<Builtin> {
        Builtin::ALL.into_iter().find(|builtin| builtin.name() == name)
    }
}

/// Node of a parsed formula.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Constant(f64),
    /// The term argument `x`
    Argument,
    /// An engine variable, bound to its position once the engine is loaded
    Variable {
        name: String,
        binding: Option<VariableRef>,
    },
    Unary {
        operator: UnaryOperator,
        operand: Box<Node>,
    },
    Binary {
        operator: BinaryOperator,
        left: Box<Node>,
        right: Box<Node>,
    },
    Call {
        function: Builtin,
        arguments: Vec<Node>,
    },
}

impl Node {
    fn evaluate(&self, x: f64, scope: &Scope) -> f64 {
        let config = &scope.config;
        let truth = |value: bool| if value { 1.0 } else { 0.0 };
        match self {
            Node::Constant(value) => *value,
            Node::Argument => x,
            Node::Variable { binding, .. } => match binding {
                Some(VariableRef::Input(index)) => {
                    scope.inputs.get(*index).copied().unwrap_or(f64::NAN)
                }
                Some(VariableRef::Output(index)) => {
                    scope.outputs.get(*index).copied().unwrap_or(f64::NAN)
                }
                None => f64::NAN,
            },
            Node::Unary { operator, operand } => {
                let a = operand.evaluate(x, scope);
                match operator {
                    UnaryOperator::Not => truth(!config.is_eq(a, 1.0)),
                    UnaryOperator::Negate => -a,
                }
            }
            Node::Binary {
                operator,
                left,
                right,
            } => {
                let a = left.evaluate(x, scope);
                let b = right.evaluate(x, scope);
                match operator {
                    BinaryOperator::Power => a.powf(b),
                    BinaryOperator::Multiply => a * b,
                    BinaryOperator::Divide => a / b,
                    BinaryOperator::Modulo => a % b,
                    BinaryOperator::Add => a + b,
                    BinaryOperator::Subtract => a - b,
                    BinaryOperator::And => truth(config.is_eq(a, 1.0) && config.is_eq(b, 1.0)),
                    BinaryOperator::Or => truth(config.is_eq(a, 1.0) || config.is_eq(b, 1.0)),
                }
            }
            Node::Call {
                function,
                arguments,
            } => {
                let a = arguments.first().map_or(f64::NAN, |arg| arg.evaluate(x, scope));
                let b = arguments.get(1).map_or(f64::NAN, |arg| arg.evaluate(x, scope));
                match function {
                    Builtin::Gt => truth(config.is_gt(a, b)),
                    Builtin::Ge => truth(config.is_ge(a, b)),
                    Builtin::Eq => truth(config.is_eq(a, b)),
                    Builtin::Neq => truth(!config.is_eq(a, b)),
                    Builtin::Le => truth(config.is_le(a, b)),
                    Builtin::Lt => truth(config.is_lt(a, b)),
                    Builtin::Acos => a.acos(),
                    Builtin::Asin => a.asin(),
                    Builtin::Atan => a.atan(),
                    Builtin::Ceil => a.ceil(),
                    Builtin::Cos => a.cos(),
                    Builtin::Cosh => a.cosh(),
                    Builtin::Exp => a.exp(),
                    Builtin::Fabs => a.abs(),
                    Builtin::Floor => a.floor(),
                    Builtin::Log => a.ln(),
                    Builtin::Log10 => a.log10(),
                    Builtin::Round => a.round(),
                    Builtin::Sin => a.sin(),
                    Builtin::Sinh => a.sinh(),
                    Builtin::Sqrt => a.sqrt(),
                    Builtin::Tan => a.tan(),
                    Builtin::Tanh => a.tanh(),
                    Builtin::Log1p => a.ln_1p(),
                    Builtin::Acosh => a.acosh(),
                    Builtin::Asinh => a.asinh(),
                    Builtin::Atanh => a.atanh(),
                    Builtin::Pow => a.powf(b),
                    Builtin::Atan2 => a.atan2(b),
                    Builtin::Fmod => a % b,
                }
            }
        }
    }

    fn bind(&mut self, variables: VariableSet<'_>) {
        match self {
            Node::Variable { name, binding } => *binding = variables.find(name),
            Node::Unary { operand, .. } => operand.bind(variables),
            Node::Binary { left, right, .. } => {
                left.bind(variables);
                right.bind(variables);
            }
            Node::Call { arguments, .. } => {
                for argument in arguments {
                    argument.bind(variables);
                }
            }
            Node::Constant(_) | Node::Argument => {}
        }
    }

    fn collect_unbound<'a>(&'a self, names: &mut Vec<&'a str>) {
        match self {
            Node::Variable {
                name,
                binding: None,
            } => names.push(name),
            Node::Unary { operand, .. } => operand.collect_unbound(names),
            Node::Binary { left, right, .. } => {
                left.collect_unbound(names);
                right.collect_unbound(names);
            }
            Node::Call { arguments, .. } => {
                for argument in arguments {
                    argument.collect_unbound(names);
                }
            }
            _ => {}
        }
    }
}

/// A term defined by an infix formula.
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    formula: String,
    root: Node,
}

impl Function {
    /// Parse a formula. Names other than `x` and the builtins stay unbound
    /// (and evaluate to NaN) until [`Function::load`] is called.
    pub fn parse(formula: &str) -> FuzzyResult<Self> {
        let tokens = tokenize(formula)?;
        let mut parser = Parser {
            formula,
            tokens,
            position: 0,
        };
        let root = parser.parse_or()?;
        if let Some(token) = parser.peek() {
            return Err(parser.error(format!("unexpected '{}'", token)));
        }
        Ok(Self {
            formula: formula.trim().to_string(),
            root,
        })
    }

    pub fn formula(&self) -> &str {
        &self.formula
    }

    pub fn root(&self) -> &Node {
        &self.root
    }

    /// Binds variable names to the engine's input and output variables.
    pub fn load(&mut self, variables: VariableSet<'_>) {
        self.root.bind(variables);
    }

    /// Names in the formula that are not bound to any variable.
    pub fn unbound_names(&self) -> Vec<&str> {
        let mut names = Vec::new();
        self.root.collect_unbound(&mut names);
        names
    }

    pub fn evaluate(&self, x: f64, scope: &Scope) -> f64 {
        self.root.evaluate(x, scope)
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.formula)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Identifier(String),
    Symbol(char),
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(value) => write!(f, "{}", value),
            Token::Identifier(name) => f.write_str(name),
            Token::Symbol(symbol) => write!(f, "{}", symbol),
        }
    }
}

fn formula_error(formula: &str, reason: impl Into<String>) -> FuzzyError {
    FuzzyError::Formula {
        formula: formula.to_string(),
        reason: reason.into(),
    }
}

fn tokenize(formula: &str) -> FuzzyResult<Vec<Token>> {
    let chars: Vec<char> = formula.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let ch = chars[i];
        if ch.is_whitespace() {
            i += 1;
        } else if ch.is_ascii_digit() || ch == '.' {
            let start = i;
            while i < chars.len() && (chars[i].is_ascii_digit() || chars[i] == '.') {
                i += 1;
            }
            if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
                let mut j = i + 1;
                if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
                    j += 1;
                }
                if j < chars.len() && chars[j].is_ascii_digit() {
                    i = j;
                    while i < chars.len() && chars[i].is_ascii_digit() {
                        i += 1;
                    }
                }
            }
            let text: String = chars[start..i].iter().collect();
            let value = text
                .parse::<f64>()
                .map_err(|_| formula_error(formula, format!("invalid number '{}'", text)))?;
            tokens.push(Token::Number(value));
        } else if ch.is_alphabetic() || ch == '_' {
            let start = i;
            while i < chars.len()
                && (chars[i].is_alphanumeric() || chars[i] == '_' || chars[i] == '.')
            {
                i += 1;
            }
            tokens.push(Token::Identifier(chars[start..i].iter().collect()));
        } else if "!~^*/%+-(),".contains(ch) {
            tokens.push(Token::Symbol(ch));
            i += 1;
        } else {
            return Err(formula_error(
                formula,
                format!("unexpected character '{}'", ch),
            ));
        }
    }
    if tokens.is_empty() {
        return Err(formula_error(formula, "empty formula"));
    }
    Ok(tokens)
}

struct Parser<'a> {
    formula: &'a str,
    tokens: Vec<Token>,
    position: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        self.position += 1;
        token
    }

    fn error(&self, reason: impl Into<String>) -> FuzzyError {
        formula_error(self.formula, reason)
    }

    fn eat_symbol(&mut self, symbol: char) -> bool {
        if self.peek() == Some(&Token::Symbol(symbol)) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Some(Token::Identifier(name)) if name == keyword) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn parse_or(&mut self) -> FuzzyResult<Node> {
        let mut node = self.parse_and()?;
        while self.eat_keyword("or") {
            node = binary(BinaryOperator::Or, node, self.parse_and()?);
        }
        Ok(node)
    }

    fn parse_and(&mut self) -> FuzzyResult<Node> {
        let mut node = self.parse_additive()?;
        while self.eat_keyword("and") {
            node = binary(BinaryOperator::And, node, self.parse_additive()?);
        }
        Ok(node)
    }

    fn parse_additive(&mut self) -> FuzzyResult<Node> {
        let mut node = self.parse_multiplicative()?;
        loop {
            let operator = if self.eat_symbol('+') {
                BinaryOperator::Add
            } else if self.eat_symbol('-') {
                BinaryOperator::Subtract
            } else {
                return Ok(node);
            };
            node = binary(operator, node, self.parse_multiplicative()?);
        }
    }

    fn parse_multiplicative(&mut self) -> FuzzyResult<Node> {
        let mut node = self.parse_power()?;
        loop {
            let operator = if self.eat_symbol('*') {
                BinaryOperator::Multiply
            } else if self.eat_symbol('/') {
                BinaryOperator::Divide
            } else if self.eat_symbol('%') {
                BinaryOperator::Modulo
            } else {
                return Ok(node);
            };
            node = binary(operator, node, self.parse_power()?);
        }
    }

    fn parse_power(&mut self) -> FuzzyResult<Node> {
        let base = self.parse_unary()?;
        if self.eat_symbol('^') {
            let exponent = self.parse_power()?;
            return Ok(binary(BinaryOperator::Power, base, exponent));
        }
        Ok(base)
    }

    fn parse_unary(&mut self) -> FuzzyResult<Node> {
        let operator = if self.eat_symbol('!') {
            UnaryOperator::Not
        } else if self.eat_symbol('~') || self.eat_symbol('-') {
            UnaryOperator::Negate
        } else if self.eat_symbol('+') {
            return self.parse_unary();
        } else {
            return self.parse_primary();
        };
        Ok(Node::Unary {
            operator,
            operand: Box::new(self.parse_unary()?),
        })
    }

    fn parse_primary(&mut self) -> FuzzyResult<Node> {
        match self.next() {
            Some(Token::Number(value)) => Ok(Node::Constant(value)),
            Some(Token::Symbol('(')) => {
                let node = self.parse_or()?;
                if !self.eat_symbol(')') {
                    return Err(self.error("missing ')'"));
                }
                Ok(node)
            }
            Some(Token::Identifier(name)) => {
                if self.eat_symbol('(') {
                    return self.parse_call(&name);
                }
                match name.as_str() {
                    "x" => Ok(Node::Argument),
                    "and" | "or" => Err(self.error(format!("operator '{}' is missing an operand", name))),
                    _ => Ok(Node::Variable {
                        name,
                        binding: None,
                    }),
                }
            }
            Some(token) => Err(self.error(format!("unexpected '{}'", token))),
            None => Err(self.error("unexpected end of formula")),
        }
    }

    fn parse_call(&mut self, name: &str) -> FuzzyResult<Node> {
        let function = Builtin::lookup(name)
            .ok_or_else(|| self.error(format!("unknown function '{}'", name)))?;
        let mut arguments = Vec::new();
        if !self.eat_symbol(')') {
            loop {
                arguments.push(self.parse_or()?);
                if self.eat_symbol(')') {
                    break;
                }
                if !self.eat_symbol(',') {
                    return Err(self.error(format!("expected ',' or ')' in call to '{}'", name)));
                }
            }
        }
        if arguments.len() != function.arity() {
            return Err(self.error(format!(
                "function '{}' takes {} argument(s), found {}",
                name,
                function.arity(),
                arguments.len()
            )));
        }
        Ok(Node::Call {
            function,
            arguments,
        })
    }
}

fn binary(operator: BinaryOperator, left: Node, right: Node) -> Node {
    Node::Binary {
        operator,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn eval(formula: &str, x: f64) -> f64 {
        Function::parse(formula)
            .unwrap()
            .evaluate(x, &Scope::default())
    }

    #[test]
    fn test_precedence() {
        assert_abs_diff_eq!(eval("1 + 2 * 3", 0.0), 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eval("(1 + 2) * 3", 0.0), 9.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eval("10 - 4 - 3", 0.0), 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eval("2 ^ 3 ^ 2", 0.0), 512.0, epsilon = 1e-9);
        assert_abs_diff_eq!(eval("7 % 4", 0.0), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_argument_and_builtins() {
        assert_abs_diff_eq!(eval("2 * x + 1", 3.0), 7.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eval("pow(x, 2) + sqrt(16)", 3.0), 13.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eval("-x", 2.5), -2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(eval("~x * 2", 1.0), -2.0, epsilon = 1e-12);
        assert_abs_diff_eq!(eval("1.5e1", 0.0), 15.0, epsilon = 1e-12);
    }

    #[test]
    fn test_logical_operators() {
        assert_eq!(eval("gt(x, 1) and lt(x, 3)", 2.0), 1.0);
        assert_eq!(eval("gt(x, 1) and lt(x, 3)", 4.0), 0.0);
        assert_eq!(eval("eq(x, 0) or eq(x, 1)", 1.0), 1.0);
        assert_eq!(eval("!eq(x, 1)", 1.0), 0.0);
    }

    #[test]
    fn test_unbound_variable_is_nan() {
        let function = Function::parse("speed * 2").unwrap();
        assert_eq!(function.unbound_names(), vec!["speed"]);
        assert!(function.evaluate(0.0, &Scope::default()).is_nan());
    }

    #[test]
    fn test_parse_errors() {
        assert!(Function::parse("").is_err());
        assert!(Function::parse("1 +").is_err());
        assert!(Function::parse("(1 + 2").is_err());
        assert!(Function::parse("foo(1)").is_err());
        assert!(Function::parse("pow(1)").is_err());
        assert!(Function::parse("1 $ 2").is_err());
        assert!(Function::parse("1 2").is_err());
    }

    #[test]
    fn test_load_binds_variables() {
        use crate::variable::{InputVariable, OutputVariable};

        let inputs = vec![InputVariable::new("speed", 0.0, 10.0)];
        let outputs = vec![OutputVariable::new("power", 0.0, 1.0)];
        let mut function = Function::parse("speed * 2 + power").unwrap();
        function.load(VariableSet::new(&inputs, &outputs));
        assert!(function.unbound_names().is_empty());

        let scope = Scope::new(vec![3.0], vec![0.5], Default::default());
        assert_abs_diff_eq!(function.evaluate(0.0, &scope), 6.5, epsilon = 1e-12);
        assert_eq!(function.to_string(), "speed * 2 + power");
    }
}
