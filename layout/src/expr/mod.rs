//! A small compiler for scalar functions of one variable, which is how force
//! magnitudes are written in configuration: "1000 / x^2", "x / 3" and so on.

pub mod lexer;
pub mod parser;
pub mod printer;
pub mod rpn;

pub use lexer::Lexer;
pub use lexer::Token;
pub use parser::ExprParser;
pub use printer::dump_rpn;
pub use rpn::{Expression, Function, Operator, Unit};
