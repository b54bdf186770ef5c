//! Compiles infix force expressions into reverse-Polish form, using the
//! shunting-yard algorithm.
//!
//! The grammar is the usual infix arithmetic over the variable 'x':
//!   expr := operand (op operand)*
//!   operand := number | 'x' | name operand | '(' expr ')'
//!   op := '+' | '-' | '*' | '/' | '%' | '^'
//! An operator at the start of the expression, or right after '(', gets an
//! implicit zero on its left, which is how "-x" and "(-x)" are spelled.

#[cfg(feature = "log")]
extern crate log;

use super::lexer::{Lexer, Token};
use super::rpn::{Function, Operator, Unit};
use crate::error::ExprError;

// The priority of an opening parenthesis on the operator stack.
const PAREN_PRIORITY: u8 = 1;
// Function application binds tighter than any operator.
const FUNCTION_PRIORITY: u8 = 5;

/// Entries of the operator stack.
#[derive(Debug, Clone, Copy)]
enum Pending {
    // An opening parenthesis, and its position.
    Open(usize),
    Operator(Operator),
    Function(Function),
}

impl Pending {
    fn priority(&self) -> u8 {
        match self {
            Pending::Open(_) => PAREN_PRIORITY,
            Pending::Operator(op) => op.priority(),
            Pending::Function(_) => FUNCTION_PRIORITY,
        }
    }
}

/// What the parser saw last. Decides if the next token may be an operand
/// or an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Prev {
    Start,
    Open,
    Operand,
    Operator,
    Function,
}

#[derive(Debug, Clone)]
pub struct ExprParser {
    lexer: Lexer,
    tok: Token,
    output: Vec<Unit>,
    stack: Vec<Pending>,
    // The number of values on the evaluation stack after running 'output'.
    depth: usize,
}

impl ExprParser {
    pub fn new(input: &str) -> Self {
        Self {
            lexer: Lexer::from_string(input),
            tok: Token::EOF,
            output: Vec::new(),
            stack: Vec::new(),
            depth: 0,
        }
    }

    pub fn print_error(&self) {
        self.lexer.print_error();
    }

    fn lex(&mut self) {
        self.tok = self.lexer.next_token();
    }

    fn pos(&self) -> usize {
        self.lexer.token_start()
    }

    /// Append \p unit to the program, checking that it has enough operands.
    fn emit(&mut self, unit: Unit) -> Result<(), ExprError> {
        let (delta, needs) = unit.stack_effect();
        if self.depth < needs {
            return Err(ExprError::MissingOperand(self.pos()));
        }
        self.depth = (self.depth as isize + delta) as usize;
        self.output.push(unit);
        Ok(())
    }

    /// Move the operators that bind at least as strongly as \p priority
    /// from the stack to the output. Stops at an opening parenthesis.
    fn flush_operators(&mut self, priority: u8) -> Result<(), ExprError> {
        while let Some(top) = self.stack.last().copied() {
            if top.priority() < priority || matches!(top, Pending::Open(_)) {
                break;
            }
            self.stack.pop();
            match top {
                Pending::Operator(op) => self.emit(Unit::Operator(op))?,
                Pending::Function(func) => self.emit(Unit::Function(func))?,
                Pending::Open(_) => {}
            }
        }
        Ok(())
    }

    fn parse_operand(&mut self, prev: Prev, unit: Unit) -> Result<Prev, ExprError> {
        if prev == Prev::Operand {
            return Err(ExprError::MissingOperator(self.pos()));
        }
        self.emit(unit)?;
        Ok(Prev::Operand)
    }

    fn parse_identifier(&mut self, prev: Prev, name: &str) -> Result<Prev, ExprError> {
        if name == "x" {
            return self.parse_operand(prev, Unit::Variable);
        }
        if prev == Prev::Operand {
            return Err(ExprError::MissingOperator(self.pos()));
        }
        let func = match Function::from_name(name) {
            Some(func) => func,
            None => {
                #[cfg(feature = "log")]
                log::warn!("Unknown function '{}', using 'tan'.", name);
                Function::Tan
            }
        };
        // Functions are prefix operators: they wait on the stack until their
        // argument is complete.
        self.stack.push(Pending::Function(func));
        Ok(Prev::Function)
    }

    fn parse_operator(&mut self, prev: Prev, op: Operator) -> Result<Prev, ExprError> {
        match prev {
            Prev::Start | Prev::Open => {
                // Unary minus (or plus) is rewritten as '0 - expr'.
                self.emit(Unit::Number(0.))?;
            }
            Prev::Operator | Prev::Function => {
                return Err(ExprError::MissingOperand(self.pos()));
            }
            Prev::Operand => {}
        }
        self.flush_operators(op.priority())?;
        self.stack.push(Pending::Operator(op));
        Ok(Prev::Operator)
    }

    fn parse_close_paren(&mut self, prev: Prev) -> Result<Prev, ExprError> {
        if prev != Prev::Operand {
            return Err(ExprError::MissingOperand(self.pos()));
        }
        self.flush_operators(0)?;
        match self.stack.pop() {
            Some(Pending::Open(_)) => Ok(Prev::Operand),
            _ => Err(ExprError::Unbalanced(self.pos())),
        }
    }

    fn finish(&mut self, prev: Prev) -> Result<Vec<Unit>, ExprError> {
        match prev {
            Prev::Start => return Err(ExprError::Empty),
            Prev::Operand => {}
            _ => return Err(ExprError::MissingOperand(self.pos())),
        }
        while let Some(top) = self.stack.pop() {
            match top {
                Pending::Open(pos) => return Err(ExprError::Unbalanced(pos)),
                Pending::Operator(op) => self.emit(Unit::Operator(op))?,
                Pending::Function(func) => self.emit(Unit::Function(func))?,
            }
        }
        if self.depth != 1 {
            return Err(ExprError::MissingOperator(self.pos()));
        }
        Ok(std::mem::take(&mut self.output))
    }

    /// Parse the whole input.
    /// \returns the program in reverse-Polish order.
    pub fn process(&mut self) -> Result<Vec<Unit>, ExprError> {
        let mut prev = Prev::Start;
        loop {
            self.lex();
            prev = match self.tok.clone() {
                Token::Number(v) => self.parse_operand(prev, Unit::Number(v))?,
                Token::Identifier(name) => self.parse_identifier(prev, &name)?,
                Token::Plus => self.parse_operator(prev, Operator::Add)?,
                Token::Minus => self.parse_operator(prev, Operator::Sub)?,
                Token::Star => self.parse_operator(prev, Operator::Mul)?,
                Token::Slash => self.parse_operator(prev, Operator::Div)?,
                Token::Percent => self.parse_operator(prev, Operator::Rem)?,
                Token::Caret => self.parse_operator(prev, Operator::Pow)?,
                Token::OpenParen => {
                    if prev == Prev::Operand {
                        return Err(ExprError::MissingOperator(self.pos()));
                    }
                    self.stack.push(Pending::Open(self.pos()));
                    Prev::Open
                }
                Token::CloseParen => self.parse_close_paren(prev)?,
                Token::BadNumber(pos) => return Err(ExprError::BadNumber(pos)),
                Token::Error(pos) => return Err(ExprError::UnexpectedChar(pos)),
                Token::EOF => return self.finish(prev),
            };
        }
    }
}

#[cfg(test)]
fn compile(source: &str) -> Result<Vec<Unit>, ExprError> {
    ExprParser::new(source).process()
}

#[cfg(test)]
fn rpn_string(source: &str) -> String {
    let units = compile(source).unwrap();
    let parts: Vec<String> = units.iter().map(|u| u.to_string()).collect();
    parts.join(" ")
}

#[test]
fn test_rpn_order() {
    assert_eq!(rpn_string("2+3*4"), "2 3 4 * +");
    assert_eq!(rpn_string("(2+3)*4"), "2 3 + 4 *");
    assert_eq!(rpn_string("-x"), "0 x -");
    assert_eq!(rpn_string("sin(x)"), "x sin");
    assert_eq!(rpn_string("sin(x)^2"), "x sin 2 ^");
    assert_eq!(rpn_string("cos sin x"), "x sin cos");
    assert_eq!(rpn_string("1000 / x ^ 2"), "1000 x 2 ^ /");
    assert_eq!(rpn_string("((x))"), "x");
}

#[test]
fn test_malformed_expressions() {
    assert_eq!(compile(""), Err(ExprError::Empty));
    assert_eq!(compile("   "), Err(ExprError::Empty));
    assert_eq!(compile("2 +"), Err(ExprError::MissingOperand(3)));
    assert_eq!(compile("2 * -3"), Err(ExprError::MissingOperand(4)));
    assert_eq!(compile("2 3"), Err(ExprError::MissingOperator(2)));
    assert_eq!(compile("x(2)"), Err(ExprError::MissingOperator(1)));
    assert_eq!(compile("(2 + 3"), Err(ExprError::Unbalanced(0)));
    assert_eq!(compile("2 + 3)"), Err(ExprError::Unbalanced(5)));
    assert_eq!(compile("()"), Err(ExprError::MissingOperand(1)));
    assert_eq!(compile("sin"), Err(ExprError::MissingOperand(3)));
    assert_eq!(compile("sin + 1"), Err(ExprError::MissingOperand(4)));
    assert_eq!(compile("2 # 3"), Err(ExprError::UnexpectedChar(2)));
    assert_eq!(compile(". + 1"), Err(ExprError::BadNumber(0)));
}
