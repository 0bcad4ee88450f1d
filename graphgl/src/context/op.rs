use crate::{context::Node, var::Var};

/// A one-argument math operation
///
/// Function names in expression text are the lowercase variant names, e.g.
/// `log10(x)` parses to [`UnaryOpcode::Log10`].
#[allow(missing_docs)]
#[derive(
    Copy,
    Clone,
    Debug,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum UnaryOpcode {
    Neg,
    Abs,
    Sqrt,
    Square,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sinh,
    Cosh,
    Tanh,
    Exp,
    Ln,
    Log10,
    Log2,
    Floor,
    Ceil,
    Round,
    Sign,
}

/// A two-argument math operation
#[allow(missing_docs)]
#[derive(
    Copy,
    Clone,
    Debug,
    Hash,
    Eq,
    PartialEq,
    Ord,
    PartialOrd,
    strum::EnumString,
    strum::IntoStaticStr,
    strum::EnumIter,
)]
#[strum(serialize_all = "lowercase")]
pub enum BinaryOpcode {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Min,
    Max,
    Mod,
    Atan2,
}

/// One operation in a [`Context`](crate::context::Context)
///
/// Child [`Node`] handles are only meaningful in the context that produced
/// them; build operations with
/// [`Context::unary`](crate::context::Context::unary) and
/// [`Context::binary`](crate::context::Context::binary).
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum Op {
    Input(Var),
    Const(Constant),
    Binary(BinaryOpcode, Node, Node),
    Unary(UnaryOpcode, Node),
}

/// Constant value stored in an [`Op`]
///
/// Two constants are the same only if their bit patterns match, so `0.0` and
/// `-0.0` stay distinct; ordering follows [`f64::total_cmp`].
#[derive(Copy, Clone, Debug)]
pub struct Constant(pub f64);

impl PartialEq for Constant {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for Constant {}

impl std::hash::Hash for Constant {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.to_bits().hash(state)
    }
}

impl PartialOrd for Constant {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Constant {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl Op {
    /// Returns the nodes this operation reads
    pub fn children(&self) -> impl Iterator<Item = Node> {
        let (a, b) = match *self {
            Op::Binary(_, a, b) => (Some(a), Some(b)),
            Op::Unary(_, a) => (Some(a), None),
            Op::Input(..) | Op::Const(..) => (None, None),
        };
        a.into_iter().chain(b)
    }
}

/// Clamps a raw floating-point result to the evaluation contract
///
/// Infinities are faults (overflow, division by zero) and become `NaN`.
#[inline]
pub(crate) fn total(v: f64) -> f64 {
    if v.is_finite() { v } else { f64::NAN }
}

impl UnaryOpcode {
    /// Applies this operation to a single value
    ///
    /// The result is always either finite or `NaN`.
    pub fn apply(&self, a: f64) -> f64 {
        if a.is_nan() {
            return f64::NAN;
        }
        let v = match self {
            UnaryOpcode::Neg => -a,
            UnaryOpcode::Abs => a.abs(),
            UnaryOpcode::Sqrt => a.sqrt(),
            UnaryOpcode::Square => a * a,
            UnaryOpcode::Sin => a.sin(),
            UnaryOpcode::Cos => a.cos(),
            UnaryOpcode::Tan => a.tan(),
            UnaryOpcode::Asin => a.asin(),
            UnaryOpcode::Acos => a.acos(),
            UnaryOpcode::Atan => a.atan(),
            UnaryOpcode::Sinh => a.sinh(),
            UnaryOpcode::Cosh => a.cosh(),
            UnaryOpcode::Tanh => a.tanh(),
            UnaryOpcode::Exp => a.exp(),
            UnaryOpcode::Ln => a.ln(),
            UnaryOpcode::Log10 => a.log10(),
            UnaryOpcode::Log2 => a.log2(),
            UnaryOpcode::Floor => a.floor(),
            UnaryOpcode::Ceil => a.ceil(),
            UnaryOpcode::Round => a.round(),
            UnaryOpcode::Sign => {
                if a > 0.0 {
                    1.0
                } else if a < 0.0 {
                    -1.0
                } else {
                    0.0
                }
            }
        };
        total(v)
    }
}

impl BinaryOpcode {
    /// Applies this operation to a pair of values
    ///
    /// `NaN` in either argument poisons the result, even for `min` and `max`.
    pub fn apply(&self, a: f64, b: f64) -> f64 {
        if a.is_nan() || b.is_nan() {
            return f64::NAN;
        }
        let v = match self {
            BinaryOpcode::Add => a + b,
            BinaryOpcode::Sub => a - b,
            BinaryOpcode::Mul => a * b,
            BinaryOpcode::Div => a / b,
            BinaryOpcode::Pow => a.powf(b),
            BinaryOpcode::Min => a.min(b),
            BinaryOpcode::Max => a.max(b),
            BinaryOpcode::Mod => a % b,
            BinaryOpcode::Atan2 => a.atan2(b),
        };
        total(v)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::str::FromStr;
    use strum::IntoEnumIterator;

    #[test]
    fn names_round_trip() {
        for op in UnaryOpcode::iter() {
            let s: &'static str = op.into();
            assert_eq!(UnaryOpcode::from_str(s).unwrap(), op);
        }
        for op in BinaryOpcode::iter() {
            let s: &'static str = op.into();
            assert_eq!(BinaryOpcode::from_str(s).unwrap(), op);
        }
        assert_eq!(UnaryOpcode::from_str("log10"), Ok(UnaryOpcode::Log10));
        assert_eq!(BinaryOpcode::from_str("atan2"), Ok(BinaryOpcode::Atan2));
        assert!(UnaryOpcode::from_str("Sin").is_err());
    }

    #[test]
    fn faults_are_nan() {
        assert!(BinaryOpcode::Div.apply(1.0, 0.0).is_nan());
        assert!(BinaryOpcode::Div.apply(0.0, 0.0).is_nan());
        assert!(UnaryOpcode::Sqrt.apply(-1.0).is_nan());
        assert!(UnaryOpcode::Ln.apply(0.0).is_nan());
        assert!(UnaryOpcode::Exp.apply(1000.0).is_nan());
        assert!(BinaryOpcode::Mod.apply(1.0, 0.0).is_nan());
    }

    #[test]
    fn nan_poisons_min_max() {
        assert!(BinaryOpcode::Min.apply(f64::NAN, 1.0).is_nan());
        assert!(BinaryOpcode::Max.apply(1.0, f64::NAN).is_nan());
        assert!(BinaryOpcode::Pow.apply(f64::NAN, 0.0).is_nan());
    }

    #[test]
    fn constants_keep_their_sign() {
        assert_ne!(Constant(0.0), Constant(-0.0));
        assert_eq!(Constant(1.5), Constant(1.5));
        assert_eq!(Constant(f64::NAN), Constant(f64::NAN));
        assert!(Constant(-0.0) < Constant(0.0));
    }

    #[test]
    fn sign() {
        assert_eq!(UnaryOpcode::Sign.apply(3.0), 1.0);
        assert_eq!(UnaryOpcode::Sign.apply(-0.5), -1.0);
        assert_eq!(UnaryOpcode::Sign.apply(0.0), 0.0);
    }
}
