//! The compiled form of a force expression: a sequence of units in
//! reverse-Polish order, and the stack machine that evaluates it.

use super::parser::ExprParser;
use crate::error::ExprError;
use std::fmt;
use std::str::FromStr;

/// The named unary functions that expressions may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Sin,
    Cos,
    Asin,
    Acos,
    Sgn,
    Floor,
    Exp,
    Log10,
    Tan,
}

impl Function {
    /// \returns the function called \p name, or None if there is no such
    /// function.
    pub fn from_name(name: &str) -> Option<Function> {
        match name {
            "sin" => Some(Function::Sin),
            "cos" => Some(Function::Cos),
            "asin" => Some(Function::Asin),
            "acos" => Some(Function::Acos),
            "sgn" => Some(Function::Sgn),
            "floor" => Some(Function::Floor),
            "exp" => Some(Function::Exp),
            "log10" => Some(Function::Log10),
            "tan" => Some(Function::Tan),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Function::Sin => "sin",
            Function::Cos => "cos",
            Function::Asin => "asin",
            Function::Acos => "acos",
            Function::Sgn => "sgn",
            Function::Floor => "floor",
            Function::Exp => "exp",
            Function::Log10 => "log10",
            Function::Tan => "tan",
        }
    }

    pub fn apply(&self, v: f64) -> f64 {
        match self {
            Function::Sin => v.sin(),
            Function::Cos => v.cos(),
            Function::Asin => v.asin(),
            Function::Acos => v.acos(),
            Function::Sgn => {
                if v > 0. {
                    1.
                } else if v < 0. {
                    -1.
                } else {
                    0.
                }
            }
            Function::Floor => v.floor(),
            Function::Exp => v.exp(),
            Function::Log10 => v.log10(),
            Function::Tan => v.tan(),
        }
    }
}

/// The binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Pow,
}

impl Operator {
    pub fn symbol(&self) -> char {
        match self {
            Operator::Add => '+',
            Operator::Sub => '-',
            Operator::Mul => '*',
            Operator::Div => '/',
            Operator::Rem => '%',
            Operator::Pow => '^',
        }
    }

    /// Binding strength. Parentheses bind weakest (1) and function
    /// application strongest (5).
    pub fn priority(&self) -> u8 {
        match self {
            Operator::Add | Operator::Sub => 2,
            Operator::Mul | Operator::Div | Operator::Rem => 3,
            Operator::Pow => 4,
        }
    }

    pub fn apply(&self, lhs: f64, rhs: f64) -> f64 {
        match self {
            Operator::Add => lhs + rhs,
            Operator::Sub => lhs - rhs,
            Operator::Mul => lhs * rhs,
            Operator::Div => lhs / rhs,
            Operator::Rem => {
                // Integer remainder of the truncated operands. A zero divisor
                // gives NaN, like the other undefined results.
                let a = lhs.trunc() as i64;
                let b = rhs.trunc() as i64;
                a.checked_rem(b).map_or(f64::NAN, |r| r as f64)
            }
            Operator::Pow => lhs.powf(rhs),
        }
    }
}

/// One element of the reverse-Polish sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Unit {
    Number(f64),
    Variable,
    Function(Function),
    Operator(Operator),
}

impl Unit {
    /// \returns how the unit changes the depth of the evaluation stack, and
    /// the depth that it needs before it runs.
    pub fn stack_effect(&self) -> (isize, usize) {
        match self {
            Unit::Number(_) | Unit::Variable => (1, 0),
            Unit::Function(_) => (0, 1),
            Unit::Operator(_) => (-1, 2),
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Unit::Number(v) => write!(f, "{}", v),
            Unit::Variable => write!(f, "x"),
            Unit::Function(func) => write!(f, "{}", func.name()),
            Unit::Operator(op) => write!(f, "{}", op.symbol()),
        }
    }
}

/// A scalar function of one variable, compiled from text such as
/// "1000 / x^2". Compilation validates the expression, so evaluating a
/// compiled expression never runs out of operands.
#[derive(Debug, Clone, PartialEq)]
pub struct Expression {
    source: String,
    rpn: Vec<Unit>,
}

impl Expression {
    pub fn compile(source: &str) -> Result<Expression, ExprError> {
        let mut parser = ExprParser::new(source);
        let rpn = parser.process()?;
        Ok(Expression {
            source: source.to_string(),
            rpn,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn units(&self) -> &[Unit] {
        &self.rpn
    }

    /// Run the program with the variable set to \p x. Division by zero and
    /// friends follow IEEE arithmetic and may return infinities or NaN.
    pub fn evaluate(&self, x: f64) -> f64 {
        let mut stack: Vec<f64> = Vec::with_capacity(self.rpn.len());
        for unit in &self.rpn {
            let value = match *unit {
                Unit::Number(v) => v,
                Unit::Variable => x,
                Unit::Function(func) => func.apply(pop(&mut stack)),
                Unit::Operator(op) => {
                    let rhs = pop(&mut stack);
                    let lhs = pop(&mut stack);
                    op.apply(lhs, rhs)
                }
            };
            stack.push(value);
        }
        pop(&mut stack)
    }
}

// The parser checks the stack depth of every unit that it emits, so this
// never sees an empty stack.
fn pop(stack: &mut Vec<f64>) -> f64 {
    stack.pop().unwrap_or(0.)
}

impl FromStr for Expression {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Expression::compile(s)
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.source)
    }
}

#[cfg(test)]
fn eval(source: &str, x: f64) -> f64 {
    Expression::compile(source).unwrap().evaluate(x)
}

#[test]
fn test_arithmetic() {
    assert_eq!(eval("2+3*4", 0.), 14.);
    assert_eq!(eval("2+3*4", 123.), 14.);
    assert_eq!(eval("(2+3)*4", 0.), 20.);
    assert_eq!(eval("x^2", 3.), 9.);
    assert_eq!(eval("10 - 4 - 3", 0.), 3.);
    assert_eq!(eval("2^3^2", 0.), 64.);
    assert_eq!(eval("7 % 3", 0.), 1.);
    assert_eq!(eval("7.9 % 3.2", 0.), 1.);
    assert_eq!(eval("-x", 4.), -4.);
    assert_eq!(eval("(-x)*2", 4.), -8.);
    assert_eq!(eval("1000 / x^2", 10.), 10.);
}

#[test]
fn test_functions() {
    assert!(eval("sin(x)", 0.).abs() < 1e-9);
    assert!((eval("cos(x)", 0.) - 1.).abs() < 1e-9);
    assert!((eval("log10(x)", 1000.) - 3.).abs() < 1e-12);
    assert_eq!(eval("floor(x)", 2.7), 2.);
    assert_eq!(eval("sgn(x)", -0.1), -1.);
    assert_eq!(eval("sgn(x)", f64::NAN), 0.);
    assert!((eval("exp(x)", 1.) - std::f64::consts::E).abs() < 1e-12);
    // Function application binds tighter than '^'.
    assert!((eval("sin(x)^2 + cos(x)^2", 0.7) - 1.).abs() < 1e-12);
    // Unknown names fall back to tan.
    assert!((eval("foo(x)", 0.5) - 0.5_f64.tan()).abs() < 1e-12);
}

#[test]
fn test_ieee_results() {
    assert_eq!(eval("1/x", 0.), f64::INFINITY);
    assert!(eval("0/x", 0.).is_nan());
    assert!(eval("5 % x", 0.).is_nan());
    assert!(eval("5 % x", 0.5).is_nan());
}

#[test]
fn test_parse_from_str() {
    let e: Expression = "x * 2".parse().unwrap();
    assert_eq!(e.evaluate(21.), 42.);
    assert_eq!(e.to_string(), "x * 2");
    assert!("x *".parse::<Expression>().is_err());
}
