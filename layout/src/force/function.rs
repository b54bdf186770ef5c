//! Force magnitudes are scalar functions of distance. They are either native
//! Rust closures or expressions that were compiled from text.

use crate::error::ExprError;
use crate::expr::Expression;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub type NativeFn = dyn Fn(f64) -> f64 + Send + Sync;

/// A scalar function that maps a distance to a force magnitude.
#[derive(Clone)]
pub enum ForceFunction {
    Native(Arc<NativeFn>),
    Expression(Expression),
    /// Another function, divided by a constant.
    Scaled(Box<ForceFunction>, f64),
}

impl ForceFunction {
    pub fn native<F>(f: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        ForceFunction::Native(Arc::new(f))
    }

    pub fn compile(source: &str) -> Result<Self, ExprError> {
        Ok(ForceFunction::Expression(Expression::compile(source)?))
    }

    /// \returns this function with the result divided by \p divisor.
    pub fn divided_by(&self, divisor: f64) -> Self {
        ForceFunction::Scaled(Box::new(self.clone()), divisor)
    }

    pub fn evaluate(&self, distance: f64) -> f64 {
        match self {
            ForceFunction::Native(f) => f(distance),
            ForceFunction::Expression(e) => e.evaluate(distance),
            ForceFunction::Scaled(inner, divisor) => {
                inner.evaluate(distance) / divisor
            }
        }
    }
}

impl From<Expression> for ForceFunction {
    fn from(e: Expression) -> Self {
        ForceFunction::Expression(e)
    }
}

impl FromStr for ForceFunction {
    type Err = ExprError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ForceFunction::compile(s)
    }
}

impl fmt::Debug for ForceFunction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ForceFunction::Native(_) => write!(f, "Native(..)"),
            ForceFunction::Expression(e) => write!(f, "Expression({:?})", e.source()),
            ForceFunction::Scaled(inner, d) => write!(f, "Scaled({:?}, {})", inner, d),
        }
    }
}

#[test]
fn test_force_function() {
    let native = ForceFunction::native(|d| 2. * d);
    let compiled: ForceFunction = "2 * x".parse().unwrap();
    assert_eq!(native.evaluate(21.), 42.);
    assert_eq!(compiled.evaluate(21.), 42.);
    assert_eq!(compiled.divided_by(7.).evaluate(21.), 6.);
    assert_eq!(format!("{:?}", compiled.divided_by(2.)), "Scaled(Expression(\"2 * x\"), 2)");
    assert!(ForceFunction::compile("2 *").is_err());
}
