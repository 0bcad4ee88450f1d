//! Expression graphs
//!
//! A [`Context`] stores every operation of one or more expressions, with
//! identical subexpressions shared and constant subexpressions folded as they
//! are built.  Text is turned into nodes with [`Context::parse`].
mod indexed;
mod op;
mod parse;

use indexed::{Index, IndexMap, define_index};
pub use op::{BinaryOpcode, Constant, Op, UnaryOpcode};
pub(crate) use op::total;

use crate::{Error, var::Var};

define_index!(Node, "Handle to an operation stored in a [`Context`]");

impl Node {
    /// Returns the position of this node in its [`Context`]
    pub fn get(&self) -> usize {
        Index::get(self)
    }
}

/// Arena of deduplicated operations
///
/// Building the same operation twice returns the same [`Node`].  Nodes are
/// never removed individually; the whole arena is dropped (or
/// [cleared](Context::clear)) at once.
///
/// An operation can only refer to nodes that already exist, so storage order
/// is always a valid evaluation order.
#[derive(Clone, Debug, Default)]
pub struct Context {
    ops: IndexMap<Op, Node>,
}

impl Context {
    /// Builds an empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes every operation, invalidating all existing [`Node`] handles
    ///
    /// ```
    /// # use graphgl::context::Context;
    /// let mut ctx = Context::new();
    /// let x = ctx.x();
    /// ctx.clear();
    /// assert!(ctx.is_empty());
    /// assert!(ctx.eval_xy(x, 1.0, 0.0).is_err());
    /// ```
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    /// Returns the number of stored operations
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Checks whether the context has no operations
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Looks up an operation by handle
    pub fn get_op(&self, node: Node) -> Option<&Op> {
        self.ops.get_by_index(node)
    }

    /// Returns the value of a constant node
    ///
    /// Returns `Ok(None)` for any other kind of node, and an error if the
    /// handle does not belong to this context.
    pub fn const_value(&self, node: Node) -> Result<Option<f64>, Error> {
        match self.get_op(node).ok_or(Error::BadNode)? {
            Op::Const(c) => Ok(Some(c.0)),
            _ => Ok(None),
        }
    }

    /// Returns the node for `x`
    pub fn x(&mut self) -> Node {
        self.input(Var::X)
    }

    /// Returns the node for `y`
    pub fn y(&mut self) -> Node {
        self.input(Var::Y)
    }

    /// Returns the node for the given input variable
    pub fn input(&mut self, v: Var) -> Node {
        self.ops.insert(Op::Input(v))
    }

    /// Returns a node with a constant value
    ///
    /// Constants are deduplicated by bit pattern, so every `NaN` produced
    /// while folding shares one node.
    pub fn constant(&mut self, v: f64) -> Node {
        self.ops.insert(Op::Const(Constant(v)))
    }

    /// Builds a one-argument operation
    ///
    /// Constant arguments are folded immediately.
    /// ```
    /// # use graphgl::context::{Context, UnaryOpcode};
    /// let mut ctx = Context::new();
    /// let four = ctx.constant(4.0);
    /// let two = ctx.unary(UnaryOpcode::Sqrt, four)?;
    /// assert_eq!(ctx.const_value(two)?, Some(2.0));
    /// # Ok::<(), graphgl::Error>(())
    /// ```
    pub fn unary(&mut self, op: UnaryOpcode, a: Node) -> Result<Node, Error> {
        if let Some(v) = self.const_value(a)? {
            return Ok(self.constant(op.apply(v)));
        }
        // -(-a) is exact, including for NaN
        if let (UnaryOpcode::Neg, Some(Op::Unary(UnaryOpcode::Neg, inner))) =
            (op, self.get_op(a))
        {
            return Ok(*inner);
        }
        Ok(self.ops.insert(Op::Unary(op, a)))
    }

    /// Builds a two-argument operation
    ///
    /// Constant arguments are folded, and identities which are exact for
    /// every input (`a - 0`, `a * 1`, `a / 1`, `a ^ 1`, `min(a, a)`, ...) are
    /// simplified away.
    ///
    /// Identities that only hold up to the sign of zero are kept as written:
    /// `0 - a` is not `-a` and `a + 0` is not `a` when `a` is `-0.0`.
    /// Multiplication by zero is kept too, since `0 * sqrt(x)` must still be
    /// `NaN` for negative `x`.
    /// ```
    /// # use graphgl::context::{BinaryOpcode, Context};
    /// let mut ctx = Context::new();
    /// let x = ctx.x();
    /// let y = ctx.y();
    /// let a = ctx.binary(BinaryOpcode::Mul, x, y)?;
    /// let b = ctx.binary(BinaryOpcode::Mul, y, x)?;
    /// assert_eq!(a, b);
    /// assert_eq!(ctx.eval_xy(a, 3.0, 5.0)?, 15.0);
    /// # Ok::<(), graphgl::Error>(())
    /// ```
    pub fn binary(
        &mut self,
        op: BinaryOpcode,
        a: Node,
        b: Node,
    ) -> Result<Node, Error> {
        let (ca, cb) = (self.const_value(a)?, self.const_value(b)?);
        if let (Some(va), Some(vb)) = (ca, cb) {
            return Ok(self.constant(op.apply(va, vb)));
        }
        use BinaryOpcode as B;
        let out = match (op, ca, cb) {
            // Only `+0` leaves `-0` alone when subtracted, and only `-0`
            // when added
            (B::Sub, _, Some(z)) if z == 0.0 && z.is_sign_positive() => a,
            (B::Add, _, Some(z)) if z == 0.0 && z.is_sign_negative() => a,
            (B::Add, Some(z), _) if z == 0.0 && z.is_sign_negative() => b,
            (B::Mul, Some(one), _) if one == 1.0 => b,
            (B::Mul | B::Div | B::Pow, _, Some(one)) if one == 1.0 => a,
            (B::Pow, _, Some(two)) if two == 2.0 => {
                self.unary(UnaryOpcode::Square, a)?
            }
            (B::Mul, ..) if a == b => self.unary(UnaryOpcode::Square, a)?,
            (B::Min | B::Max, ..) if a == b => a,
            // Sorted operands let `x + y` and `y + x` share a node
            (B::Add | B::Mul | B::Min | B::Max, ..) => {
                self.ops.insert(Op::Binary(op, a.min(b), a.max(b)))
            }
            _ => self.ops.insert(Op::Binary(op, a, b)),
        };
        Ok(out)
    }

    /// Evaluates a node at a single `(x, y)` position
    ///
    /// The result is either finite or `NaN`; an error is only returned if
    /// `root` does not belong to this context.  This interprets the whole
    /// arena up to `root`; compile an [`Expression`](crate::eval::Expression)
    /// to evaluate many times.
    pub fn eval_xy(&self, root: Node, x: f64, y: f64) -> Result<f64, Error> {
        self.get_op(root).ok_or(Error::BadNode)?;
        let mut values = Vec::with_capacity(root.get() + 1);
        for op in self.ops_until(root) {
            let v = match *op {
                Op::Input(Var::X) => total(x),
                Op::Input(Var::Y) => total(y),
                Op::Const(c) => c.0,
                Op::Unary(op, a) => op.apply(values[a.get()]),
                Op::Binary(op, a, b) => {
                    op.apply(values[a.get()], values[b.get()])
                }
            };
            values.push(v);
        }
        values.pop().ok_or(Error::BadNode)
    }

    /// Iterates over operations from the start of the arena through `root`
    pub(crate) fn ops_until(&self, root: Node) -> impl Iterator<Item = &Op> {
        (0..=root.get()).filter_map(|i| self.ops.get_by_index(Node::new(i)))
    }
}
