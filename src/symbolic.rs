//! Exact symbolic expressions for closed-form chain analysis.
//!
//! A [`Expr`] is a small expression tree over named symbols and floating
//! literals. The solvers treat it as just another [`Field`], so the same
//! Gaussian elimination that inverts a numeric matrix produces closed-form
//! rational functions of the input symbols. The symbolic path exists to
//! validate the numeric solver by substitution and to support sensitivity
//! analysis; it is not on the evaluation hot path.
//!
//! Construction goes through smart constructors that fold constants and
//! apply the identity rewrites (`x + 0 = x`, `x · 1 = x`, `x · 0 = 0`,
//! `x − x = 0`, `x / x = 1`). The rewrites keep solver-produced pivots
//! structurally non-zero wherever the cancellation is visible in the tree;
//! anything non-constant that survives them is assumed non-zero, which is
//! the usual generic-parameter-values assumption for symbolic elimination.

use std::{
    collections::HashMap,
    fmt,
    ops::{Add, Div, Mul, Sub},
    rc::Rc,
};

use crate::{error::Result, field::Field, Error};

/// An exact expression in named parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Const(f64),
    Symbol(Rc<str>),
    Add(Rc<Expr>, Rc<Expr>),
    Sub(Rc<Expr>, Rc<Expr>),
    Mul(Rc<Expr>, Rc<Expr>),
    Div(Rc<Expr>, Rc<Expr>),
}

impl Expr {
    /// A literal constant.
    pub fn constant(value: f64) -> Self {
        Expr::Const(value)
    }

    /// A named free parameter.
    pub fn symbol(name: &str) -> Self {
        Expr::Symbol(Rc::from(name))
    }

    fn add_expr(lhs: Expr, rhs: Expr) -> Expr {
        match (lhs, rhs) {
            (Expr::Const(a), Expr::Const(b)) => Expr::Const(a + b),
            (Expr::Const(a), rhs) if a == 0.0 => rhs,
            (lhs, Expr::Const(b)) if b == 0.0 => lhs,
            (lhs, rhs) => Expr::Add(Rc::new(lhs), Rc::new(rhs)),
        }
    }

    fn sub_expr(lhs: Expr, rhs: Expr) -> Expr {
        match (lhs, rhs) {
            (Expr::Const(a), Expr::Const(b)) => Expr::Const(a - b),
            (lhs, Expr::Const(b)) if b == 0.0 => lhs,
            (lhs, rhs) if lhs == rhs => Expr::Const(0.0),
            (lhs, rhs) => Expr::Sub(Rc::new(lhs), Rc::new(rhs)),
        }
    }

    fn mul_expr(lhs: Expr, rhs: Expr) -> Expr {
        match (lhs, rhs) {
            (Expr::Const(a), Expr::Const(b)) => Expr::Const(a * b),
            (Expr::Const(a), _) | (_, Expr::Const(a)) if a == 0.0 => Expr::Const(0.0),
            (Expr::Const(a), rhs) if a == 1.0 => rhs,
            (lhs, Expr::Const(b)) if b == 1.0 => lhs,
            (lhs, rhs) => Expr::Mul(Rc::new(lhs), Rc::new(rhs)),
        }
    }

    fn div_expr(lhs: Expr, rhs: Expr) -> Expr {
        match (lhs, rhs) {
            (Expr::Const(a), Expr::Const(b)) if b != 0.0 => Expr::Const(a / b),
            (Expr::Const(a), _) if a == 0.0 => Expr::Const(0.0),
            (lhs, Expr::Const(b)) if b == 1.0 => lhs,
            (lhs, rhs) if lhs == rhs && !rhs.is_zero() => Expr::Const(1.0),
            (lhs, rhs) => Expr::Div(Rc::new(lhs), Rc::new(rhs)),
        }
    }

    /// Evaluate the expression with concrete values for every symbol.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnboundSymbol`] if a symbol has no binding and
    /// [`Error::DivisionByZero`] if a denominator evaluates to zero.
    pub fn eval(&self, bindings: &HashMap<String, f64>) -> Result<f64> {
        match self {
            Expr::Const(value) => Ok(*value),
            Expr::Symbol(name) => {
                bindings
                    .get(name.as_ref())
                    .copied()
                    .ok_or_else(|| Error::UnboundSymbol {
                        name: name.to_string(),
                    })
            }
            Expr::Add(lhs, rhs) => Ok(lhs.eval(bindings)? + rhs.eval(bindings)?),
            Expr::Sub(lhs, rhs) => Ok(lhs.eval(bindings)? - rhs.eval(bindings)?),
            Expr::Mul(lhs, rhs) => Ok(lhs.eval(bindings)? * rhs.eval(bindings)?),
            Expr::Div(lhs, rhs) => {
                let denominator = rhs.eval(bindings)?;
                if denominator == 0.0 {
                    return Err(Error::DivisionByZero);
                }
                Ok(lhs.eval(bindings)? / denominator)
            }
        }
    }

    /// The names of the free symbols appearing in the expression.
    pub fn symbols(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_symbols(&mut names);
        names.sort();
        names.dedup();
        names
    }

    fn collect_symbols(&self, names: &mut Vec<String>) {
        match self {
            Expr::Const(_) => {}
            Expr::Symbol(name) => names.push(name.to_string()),
            Expr::Add(lhs, rhs)
            | Expr::Sub(lhs, rhs)
            | Expr::Mul(lhs, rhs)
            | Expr::Div(lhs, rhs) => {
                lhs.collect_symbols(names);
                rhs.collect_symbols(names);
            }
        }
    }
}

impl From<f64> for Expr {
    fn from(value: f64) -> Self {
        Expr::Const(value)
    }
}

impl Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::add_expr(self, rhs)
    }
}

impl Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::sub_expr(self, rhs)
    }
}

impl Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::mul_expr(self, rhs)
    }
}

impl Div for Expr {
    type Output = Expr;

    fn div(self, rhs: Expr) -> Expr {
        Expr::div_expr(self, rhs)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Const(value) => write!(f, "{value}"),
            Expr::Symbol(name) => write!(f, "{name}"),
            Expr::Add(lhs, rhs) => write!(f, "({lhs} + {rhs})"),
            Expr::Sub(lhs, rhs) => write!(f, "({lhs} - {rhs})"),
            Expr::Mul(lhs, rhs) => write!(f, "({lhs} * {rhs})"),
            Expr::Div(lhs, rhs) => write!(f, "({lhs} / {rhs})"),
        }
    }
}

impl Field for Expr {
    fn zero() -> Self {
        Expr::Const(0.0)
    }

    fn one() -> Self {
        Expr::Const(1.0)
    }

    fn add(&self, other: &Self) -> Self {
        Expr::add_expr(self.clone(), other.clone())
    }

    fn sub(&self, other: &Self) -> Self {
        Expr::sub_expr(self.clone(), other.clone())
    }

    fn mul(&self, other: &Self) -> Self {
        Expr::mul_expr(self.clone(), other.clone())
    }

    fn div(&self, other: &Self) -> Self {
        Expr::div_expr(self.clone(), other.clone())
    }

    fn is_zero(&self) -> bool {
        matches!(self, Expr::Const(value) if *value == 0.0)
    }

    fn as_literal(&self) -> Option<f64> {
        match self {
            Expr::Const(value) => Some(*value),
            _ => None,
        }
    }
}
