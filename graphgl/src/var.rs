//! Input variables to math expressions

/// The [`Var`] type is a free variable in a math expression
///
/// Curves use only [`Var::X`]; surfaces use both.
#[allow(missing_docs)]
#[derive(Copy, Clone, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub enum Var {
    X,
    Y,
}

impl std::fmt::Display for Var {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Var::X => write!(f, "x"),
            Var::Y => write!(f, "y"),
        }
    }
}

/// Number of free variables an expression is evaluated with
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum Arity {
    /// Curves: `f(x)`
    One,
    /// Surfaces: `f(x, y)`
    #[default]
    Two,
}

impl Arity {
    /// Picks an arity based on a surface / curve flag
    pub fn from_3d(is_3d: bool) -> Self {
        if is_3d { Arity::Two } else { Arity::One }
    }

    /// Checks whether the given variable is bound at this arity
    pub fn binds(&self, v: Var) -> bool {
        match (self, v) {
            (_, Var::X) => true,
            (Arity::Two, Var::Y) => true,
            (Arity::One, Var::Y) => false,
        }
    }
}
