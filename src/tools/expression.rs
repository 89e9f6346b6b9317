//! Restricted arithmetic evaluator behind the calculator tool.
//!
//! Evaluation happens in three passes:
//! 1. The lexer turns the input into tokens and resolves every identifier
//!    against a fixed allow-list of functions and constants. Anything else
//!    (unknown names, attribute access, subscripts, statements) fails closed.
//! 2. A recursive-descent parser builds an [`Expr`] tree that can only hold
//!    literals, constants, unary/binary arithmetic and allow-listed calls.
//! 3. The tree is interpreted directly on `f64`.
//!
//! The input string is never handed to any other evaluator.
use std::fmt;

use thiserror::Error;

const MAX_EXPRESSION_LENGTH: usize = 1000;
const MAX_NESTING_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExpressionError {
    #[error("Empty expression. Please provide a mathematical expression to evaluate.")]
    EmptyInput,
    #[error("Invalid syntax: {0}")]
    SyntaxError(String),
    #[error("Unsafe expression: {0}")]
    UnsafeExpression(String),
    #[error("Division by zero is not allowed")]
    DivisionByZero,
    #[error("Result is too large to calculate")]
    Overflow,
    #[error("Math domain error: {0}")]
    DomainError(String),
    #[error("Could not evaluate expression: {0}")]
    OtherEvaluationError(String),
}

/// Result of a successful evaluation.
///
/// Integral values print without a fractional part (every digit kept, even
/// for very large powers); other values are rounded to 6 decimal places.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    Integer(f64),
    Decimal(f64),
}

impl Number {
    fn normalize(value: f64) -> Self {
        // -0.0 would otherwise print as "-0"
        let value = if value == 0.0 { 0.0 } else { value };
        if value.fract() == 0.0 {
            return Number::Integer(value);
        }
        let rounded = (value * 1e6).round() / 1e6;
        if rounded.fract() == 0.0 {
            Number::Integer(if rounded == 0.0 { 0.0 } else { rounded })
        } else {
            Number::Decimal(rounded)
        }
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Integer(v) => write!(f, "{v:.0}"),
            Number::Decimal(v) => write!(f, "{v}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sqrt,
    Sin,
    Cos,
    Tan,
    Log,
    Log10,
    Abs,
    Ceil,
    Floor,
    Pow,
}

impl Function {
    pub const ALL: [Function; 10] = [
        Function::Sqrt,
        Function::Sin,
        Function::Cos,
        Function::Tan,
        Function::Log,
        Function::Log10,
        Function::Abs,
        Function::Ceil,
        Function::Floor,
        Function::Pow,
    ];

    fn lookup(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|function| function.name() == name)
    }

    pub fn name(self) -> &'static str {
        match self {
            Function::Sqrt => "sqrt",
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Tan => "tan",
            Function::Log => "log",
            Function::Log10 => "log10",
            Function::Abs => "abs",
            Function::Ceil => "ceil",
            Function::Floor => "floor",
            Function::Pow => "pow",
        }
    }

    /// Accepted argument count as (min, max).
    fn arity(self) -> (usize, usize) {
        match self {
            Function::Log => (1, 2),
            Function::Pow => (2, 2),
            _ => (1, 1),
        }
    }

    fn apply(self, args: &[f64]) -> Result<f64, ExpressionError> {
        let x = args[0];
        match self {
            Function::Sqrt => {
                if x < 0.0 {
                    return Err(ExpressionError::DomainError(
                        "square root of a negative number".to_string(),
                    ));
                }
                Ok(x.sqrt())
            }
            Function::Sin => Ok(x.sin()),
            Function::Cos => Ok(x.cos()),
            Function::Tan => Ok(x.tan()),
            Function::Log => {
                check_log_argument(x)?;
                match args.get(1) {
                    None => Ok(x.ln()),
                    Some(&base) => {
                        check_log_argument(base)?;
                        if base == 1.0 {
                            return Err(ExpressionError::DivisionByZero);
                        }
                        Ok(x.ln() / base.ln())
                    }
                }
            }
            Function::Log10 => {
                check_log_argument(x)?;
                Ok(x.log10())
            }
            Function::Abs => Ok(x.abs()),
            Function::Ceil => Ok(x.ceil()),
            Function::Floor => Ok(x.floor()),
            Function::Pow => {
                let y = args[1];
                if x == 0.0 && y < 0.0 {
                    return Err(ExpressionError::DomainError(
                        "zero cannot be raised to a negative power".to_string(),
                    ));
                }
                power(x, y)
            }
        }
    }
}

fn check_log_argument(x: f64) -> Result<(), ExpressionError> {
    if x <= 0.0 {
        return Err(ExpressionError::DomainError(
            "logarithm of a non-positive number".to_string(),
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    fn lookup(name: &str) -> Option<Self> {
        match name {
            "pi" => Some(Constant::Pi),
            "e" => Some(Constant::E),
            _ => None,
        }
    }

    fn value(self) -> f64 {
        match self {
            Constant::Pi => std::f64::consts::PI,
            Constant::E => std::f64::consts::E,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Token {
    Number(f64),
    Constant(Constant),
    Function(Function),
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Power,
    LParen,
    RParen,
    Comma,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Number(n) => write!(f, "{n}"),
            Token::Constant(Constant::Pi) => write!(f, "pi"),
            Token::Constant(Constant::E) => write!(f, "e"),
            Token::Function(function) => write!(f, "{}", function.name()),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::Percent => write!(f, "%"),
            Token::Power => write!(f, "**"),
            Token::LParen => write!(f, "("),
            Token::RParen => write!(f, ")"),
            Token::Comma => write!(f, ","),
        }
    }
}

fn unsafe_expression(reason: impl Into<String>) -> ExpressionError {
    ExpressionError::UnsafeExpression(reason.into())
}

fn syntax_error(reason: impl Into<String>) -> ExpressionError {
    ExpressionError::SyntaxError(reason.into())
}

fn tokenize(input: &str) -> Result<Vec<Token>, ExpressionError> {
    let chars: Vec<char> = input.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match c {
            c if c.is_whitespace() => i += 1,
            '0'..='9' | '.' => {
                if c == '.' && !chars.get(i + 1).is_some_and(|next| next.is_ascii_digit()) {
                    return Err(unsafe_expression("attribute access is not allowed"));
                }
                let (value, next) = lex_number(&chars, i)?;
                tokens.push(Token::Number(value));
                i = next;
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                let name: String = chars[start..i].iter().collect();
                let token = if let Some(function) = Function::lookup(&name) {
                    Token::Function(function)
                } else if let Some(constant) = Constant::lookup(&name) {
                    Token::Constant(constant)
                } else {
                    return Err(unsafe_expression(format!("name '{name}' is not allowed")));
                };
                tokens.push(token);
            }
            '+' => {
                tokens.push(Token::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Token::Minus);
                i += 1;
            }
            '*' => {
                if chars.get(i + 1) == Some(&'*') {
                    tokens.push(Token::Power);
                    i += 2;
                } else {
                    tokens.push(Token::Star);
                    i += 1;
                }
            }
            '^' => {
                tokens.push(Token::Power);
                i += 1;
            }
            '/' => {
                if chars.get(i + 1) == Some(&'/') {
                    return Err(unsafe_expression("operator '//' is not allowed"));
                }
                tokens.push(Token::Slash);
                i += 1;
            }
            '%' => {
                tokens.push(Token::Percent);
                i += 1;
            }
            '(' => {
                tokens.push(Token::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Token::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Token::Comma);
                i += 1;
            }
            '[' | ']' => return Err(unsafe_expression("subscripting is not allowed")),
            '{' | '}' => return Err(unsafe_expression("collections are not allowed")),
            '\'' | '"' => return Err(unsafe_expression("string literals are not allowed")),
            '=' | ';' => {
                return Err(unsafe_expression(
                    "statements and assignments are not allowed",
                ));
            }
            ':' => return Err(unsafe_expression("lambdas and slices are not allowed")),
            '<' | '>' | '!' | '&' | '|' | '~' | '@' => {
                return Err(unsafe_expression(format!("operator '{c}' is not allowed")));
            }
            _ => return Err(syntax_error(format!("unexpected character '{c}'"))),
        }
    }

    Ok(tokens)
}

/// Lexes a decimal literal with optional fraction and exponent starting at `start`.
fn lex_number(chars: &[char], start: usize) -> Result<(f64, usize), ExpressionError> {
    let mut i = start;
    let mut seen_dot = false;
    while i < chars.len() && (chars[i].is_ascii_digit() || (chars[i] == '.' && !seen_dot)) {
        if chars[i] == '.' {
            seen_dot = true;
        }
        i += 1;
    }

    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }

    if i < chars.len() && chars[i] == '.' {
        return Err(unsafe_expression("attribute access is not allowed"));
    }

    let text: String = chars[start..i].iter().collect();
    let value = text
        .parse::<f64>()
        .map_err(|_| syntax_error(format!("invalid number '{text}'")))?;
    Ok((value, i))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UnaryOp {
    Plus,
    Minus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Pow,
}

/// Everything the evaluator is able to express.
#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Number(f64),
    Constant(Constant),
    Unary(UnaryOp, Box<Expr>),
    Binary(BinaryOp, Box<Expr>, Box<Expr>),
    Call(Function, Vec<Expr>),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn enter(&mut self) -> Result<(), ExpressionError> {
        self.depth += 1;
        if self.depth > MAX_NESTING_DEPTH {
            return Err(syntax_error("expression is nested too deeply"));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn parse(mut self) -> Result<Expr, ExpressionError> {
        let expr = self.parse_expr()?;
        match self.peek() {
            None => Ok(expr),
            Some(token) => Err(syntax_error(format!("unexpected '{token}'"))),
        }
    }

    // expr := term (('+' | '-') term)*
    fn parse_expr(&mut self) -> Result<Expr, ExpressionError> {
        self.enter()?;
        let mut lhs = self.parse_term()?;
        while let Some(op) = self.peek().and_then(|token| match token {
            Token::Plus => Some(BinaryOp::Add),
            Token::Minus => Some(BinaryOp::Sub),
            _ => None,
        }) {
            self.advance();
            let rhs = self.parse_term()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        self.leave();
        Ok(lhs)
    }

    // term := unary (('*' | '/' | '%') unary)*
    fn parse_term(&mut self) -> Result<Expr, ExpressionError> {
        let mut lhs = self.parse_unary()?;
        while let Some(op) = self.peek().and_then(|token| match token {
            Token::Star => Some(BinaryOp::Mul),
            Token::Slash => Some(BinaryOp::Div),
            Token::Percent => Some(BinaryOp::Mod),
            _ => None,
        }) {
            self.advance();
            let rhs = self.parse_unary()?;
            lhs = Expr::Binary(op, Box::new(lhs), Box::new(rhs));
        }
        Ok(lhs)
    }

    // unary := ('+' | '-') unary | power
    fn parse_unary(&mut self) -> Result<Expr, ExpressionError> {
        let op = match self.peek() {
            Some(Token::Plus) => UnaryOp::Plus,
            Some(Token::Minus) => UnaryOp::Minus,
            _ => return self.parse_power(),
        };
        self.advance();
        self.enter()?;
        let operand = self.parse_unary()?;
        self.leave();
        Ok(Expr::Unary(op, Box::new(operand)))
    }

    // power := primary ('**' unary)?
    fn parse_power(&mut self) -> Result<Expr, ExpressionError> {
        let base = self.parse_primary()?;
        if self.peek() == Some(Token::Power) {
            self.advance();
            let exponent = self.parse_unary()?;
            return Ok(Expr::Binary(BinaryOp::Pow, Box::new(base), Box::new(exponent)));
        }
        Ok(base)
    }

    fn parse_primary(&mut self) -> Result<Expr, ExpressionError> {
        match self.advance() {
            Some(Token::Number(value)) => Ok(Expr::Number(value)),
            Some(Token::Constant(constant)) => Ok(Expr::Constant(constant)),
            Some(Token::Function(function)) => self.parse_call(function),
            Some(Token::LParen) => {
                let inner = self.parse_expr()?;
                self.expect_closing_paren()?;
                Ok(inner)
            }
            Some(token) => Err(syntax_error(format!("unexpected '{token}'"))),
            None => Err(syntax_error("unexpected end of expression")),
        }
    }

    fn parse_call(&mut self, function: Function) -> Result<Expr, ExpressionError> {
        if self.advance() != Some(Token::LParen) {
            return Err(syntax_error(format!(
                "function '{}' must be called with parentheses",
                function.name()
            )));
        }

        let mut args = Vec::new();
        if self.peek() != Some(Token::RParen) {
            args.push(self.parse_expr()?);
            while self.peek() == Some(Token::Comma) {
                self.advance();
                args.push(self.parse_expr()?);
            }
        }
        self.expect_closing_paren()?;

        let (min, max) = function.arity();
        if args.len() < min || args.len() > max {
            return Err(syntax_error(format!(
                "{}() takes {} argument(s), got {}",
                function.name(),
                if min == max {
                    min.to_string()
                } else {
                    format!("{min} to {max}")
                },
                args.len()
            )));
        }
        Ok(Expr::Call(function, args))
    }

    fn expect_closing_paren(&mut self) -> Result<(), ExpressionError> {
        match self.advance() {
            Some(Token::RParen) => Ok(()),
            Some(token) => Err(syntax_error(format!("expected ')' but found '{token}'"))),
            None => Err(syntax_error("missing closing parenthesis")),
        }
    }
}

fn finite(value: f64) -> Result<f64, ExpressionError> {
    if value.is_infinite() {
        Err(ExpressionError::Overflow)
    } else if value.is_nan() {
        Err(ExpressionError::OtherEvaluationError(
            "result is not a number".to_string(),
        ))
    } else {
        Ok(value)
    }
}

fn power(base: f64, exponent: f64) -> Result<f64, ExpressionError> {
    if base < 0.0 && exponent.fract() != 0.0 {
        return Err(ExpressionError::DomainError(
            "fractional power of a negative number".to_string(),
        ));
    }
    finite(base.powf(exponent))
}

/// Remainder with the sign of the divisor (floored modulo).
fn floored_mod(lhs: f64, rhs: f64) -> f64 {
    let r = lhs % rhs;
    if r != 0.0 && (r < 0.0) != (rhs < 0.0) {
        r + rhs
    } else {
        r
    }
}

fn eval(expr: &Expr) -> Result<f64, ExpressionError> {
    match expr {
        Expr::Number(value) => finite(*value),
        Expr::Constant(constant) => Ok(constant.value()),
        Expr::Unary(op, operand) => {
            let value = eval(operand)?;
            Ok(match op {
                UnaryOp::Plus => value,
                UnaryOp::Minus => -value,
            })
        }
        Expr::Binary(op, lhs, rhs) => {
            let lhs = eval(lhs)?;
            let rhs = eval(rhs)?;
            match op {
                BinaryOp::Add => finite(lhs + rhs),
                BinaryOp::Sub => finite(lhs - rhs),
                BinaryOp::Mul => finite(lhs * rhs),
                BinaryOp::Div => {
                    if rhs == 0.0 {
                        return Err(ExpressionError::DivisionByZero);
                    }
                    finite(lhs / rhs)
                }
                BinaryOp::Mod => {
                    if rhs == 0.0 {
                        return Err(ExpressionError::DivisionByZero);
                    }
                    finite(floored_mod(lhs, rhs))
                }
                BinaryOp::Pow => {
                    if lhs == 0.0 && rhs < 0.0 {
                        return Err(ExpressionError::DivisionByZero);
                    }
                    power(lhs, rhs)
                }
            }
        }
        Expr::Call(function, args) => {
            let values = args.iter().map(eval).collect::<Result<Vec<_>, _>>()?;
            finite(function.apply(&values)?)
        }
    }
}

/// Evaluates an arithmetic expression such as `"15 * 847 / 100"` or `"sqrt(16)"`.
pub fn evaluate(expression: &str) -> Result<Number, ExpressionError> {
    let expression = expression.trim();
    if expression.is_empty() {
        return Err(ExpressionError::EmptyInput);
    }
    if expression.chars().count() > MAX_EXPRESSION_LENGTH {
        return Err(syntax_error(format!(
            "expression is longer than {MAX_EXPRESSION_LENGTH} characters"
        )));
    }

    let tokens = tokenize(expression)?;
    let tree = Parser::new(tokens).parse()?;
    eval(&tree).map(Number::normalize)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn eval_str(expression: &str) -> String {
        evaluate(expression).unwrap().to_string()
    }

    #[test]
    fn test_operator_precedence() {
        assert_eq!(eval_str("2 + 3 * 4"), "14");
        assert_eq!(eval_str("(2 + 3) * 4"), "20");
        assert_eq!(eval_str("10 - 4 - 3"), "3");
        assert_eq!(eval_str("2 * 3 % 4"), "2");
    }

    #[test]
    fn test_percentage_calculation() {
        assert_eq!(eval_str("15 * 847 / 100"), "127.05");
        assert_eq!(evaluate("15 * 847 / 100").unwrap(), Number::Decimal(127.05));
    }

    #[test]
    fn test_functions_and_constants() {
        assert_eq!(eval_str("sqrt(16)"), "4");
        assert_eq!(eval_str("sin(pi/2)"), "1");
        assert_eq!(eval_str("abs(-5)"), "5");
        assert_eq!(eval_str("ceil(4.2)"), "5");
        assert_eq!(eval_str("floor(4.8)"), "4");
        assert_eq!(eval_str("pow(2, 10)"), "1024");
        assert_eq!(eval_str("log10(1000)"), "3");
        assert_eq!(eval_str("log(8, 2)"), "3");
        assert_eq!(eval_str("log(e)"), "1");
        assert_eq!(eval_str("cos(0) + tan(0)"), "1");
    }

    #[test]
    fn test_power_rules() {
        assert_eq!(eval_str("2 ** 10"), "1024");
        assert_eq!(eval_str("2 ^ 3"), "8");
        assert_eq!(eval_str("2 ** 3 ** 2"), "512");
        assert_eq!(eval_str("-2 ** 2"), "-4");
        assert_eq!(eval_str("2 ** -1"), "0.5");
    }

    #[test]
    fn test_unary_operators() {
        assert_eq!(eval_str("2 + + 3"), "5");
        assert_eq!(eval_str("--3"), "3");
        assert_eq!(eval_str("-(2 + 3)"), "-5");
    }

    #[test]
    fn test_floored_modulo() {
        assert_eq!(eval_str("7 % 3"), "1");
        assert_eq!(eval_str("-7 % 3"), "2");
        assert_eq!(eval_str("7 % -3"), "-2");
    }

    #[test]
    fn test_rounding_to_six_decimals() {
        assert_eq!(eval_str("1 / 3"), "0.333333");
        assert_eq!(eval_str("2 / 3"), "0.666667");
        assert_eq!(eval_str("sin(pi)"), "0");
        assert_eq!(eval_str("0.1 + 0.2"), "0.3");
        assert_eq!(eval_str("1.5e3"), "1500");
    }

    #[test]
    fn test_large_integral_results_keep_all_digits() {
        let result = eval_str("2 ** 100");
        assert_eq!(result, "1267650600228229401496703205376");
        assert!(evaluate("2 ** 1000").is_ok());
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(evaluate(""), Err(ExpressionError::EmptyInput));
        assert_eq!(evaluate("   "), Err(ExpressionError::EmptyInput));
    }

    #[test]
    fn test_division_by_zero() {
        assert_eq!(evaluate("10 / 0"), Err(ExpressionError::DivisionByZero));
        assert_eq!(evaluate("10 % 0"), Err(ExpressionError::DivisionByZero));
        assert_eq!(evaluate("0 ** -1"), Err(ExpressionError::DivisionByZero));
        assert_eq!(evaluate("log(8, 1)"), Err(ExpressionError::DivisionByZero));
    }

    #[test]
    fn test_overflow() {
        assert_eq!(evaluate("2 ** 10000"), Err(ExpressionError::Overflow));
        assert_eq!(evaluate("10 ** 300 * 10 ** 300"), Err(ExpressionError::Overflow));
    }

    #[test]
    fn test_domain_errors() {
        assert!(matches!(
            evaluate("sqrt(-1)"),
            Err(ExpressionError::DomainError(_))
        ));
        assert!(matches!(
            evaluate("log(0)"),
            Err(ExpressionError::DomainError(_))
        ));
        assert!(matches!(
            evaluate("(-8) ** 0.5"),
            Err(ExpressionError::DomainError(_))
        ));
        assert!(matches!(
            evaluate("pow(0, -2)"),
            Err(ExpressionError::DomainError(_))
        ));
    }

    #[test]
    fn test_syntax_errors() {
        for expression in [")", "2 +", "(1 + 2", "2 3", "sqrt 4", "sqrt()", "pow(2)", "1 $ 2"] {
            assert!(
                matches!(evaluate(expression), Err(ExpressionError::SyntaxError(_))),
                "expected syntax error for {expression:?}, got {:?}",
                evaluate(expression)
            );
        }
    }

    #[test]
    fn test_unsafe_expressions_fail_closed() {
        let attempts = [
            "import os",
            "__import__('os').system('ls')",
            "os.system('rm -rf /')",
            "hello + world",
            "math.sqrt(4)",
            "(1).real",
            "[1, 2][0]",
            "x = 5",
            "1; 2",
            "lambda: 1",
            "'a' * 3",
            "1 < 2",
            "exec('1')",
            "eval('1+1')",
            "open('/etc/passwd')",
            "10 // 3",
        ];
        for expression in attempts {
            assert!(
                matches!(
                    evaluate(expression),
                    Err(ExpressionError::UnsafeExpression(_))
                ),
                "expected unsafe expression for {expression:?}, got {:?}",
                evaluate(expression)
            );
        }
    }

    #[test]
    fn test_names_are_case_sensitive() {
        assert!(matches!(
            evaluate("SQRT(4)"),
            Err(ExpressionError::UnsafeExpression(_))
        ));
        assert!(matches!(
            evaluate("PI"),
            Err(ExpressionError::UnsafeExpression(_))
        ));
    }

    #[test]
    fn test_length_and_depth_limits() {
        let long = "1+".repeat(600) + "1";
        assert!(matches!(
            evaluate(&long),
            Err(ExpressionError::SyntaxError(_))
        ));

        let deep = format!("{}1{}", "(".repeat(100), ")".repeat(100));
        assert!(matches!(
            evaluate(&deep),
            Err(ExpressionError::SyntaxError(_))
        ));

        let shallow = format!("{}1{}", "(".repeat(10), ")".repeat(10));
        assert_eq!(eval_str(&shallow), "1");
    }

    #[test]
    fn test_error_messages_are_readable() {
        assert_eq!(
            ExpressionError::DivisionByZero.to_string(),
            "Division by zero is not allowed"
        );
        let message = evaluate("hello").unwrap_err().to_string();
        assert!(message.contains("name 'hello' is not allowed"));
    }
}
