//! Compiled expressions and total evaluation
//!
//! An [`Expression`] is parsed once, then flattened into a tape of slot
//! operations.  Evaluation walks the tape in order; every step is total, so
//! the result is always either finite or `NaN`.
//!
//! ```
//! use graphgl::{eval::Expression, var::Arity};
//!
//! let f = Expression::compile("2 * x + 1", Arity::One)?;
//! assert_eq!(f.eval(3.0, 0.0), 7.0);
//! assert!(Expression::compile("1 / x", Arity::One)?.eval(0.0, 0.0).is_nan());
//! # Ok::<(), graphgl::Error>(())
//! ```
use crate::{
    Error,
    context::{BinaryOpcode, Context, Node, Op, UnaryOpcode, total},
    var::{Arity, Var},
};

/// Operand of a tape step
#[derive(Copy, Clone, Debug, PartialEq)]
enum Arg {
    /// Output of an earlier step
    Slot(u32),
    /// Constant value, folded into the step
    Imm(f64),
}

/// A single step in a flattened tape
///
/// Step `i` writes its result into slot `i`.
#[derive(Copy, Clone, Debug, PartialEq)]
enum Step {
    Input(Var),
    Unary(UnaryOpcode, Arg),
    Binary(BinaryOpcode, Arg, Arg),
}

/// A compiled math expression
///
/// This is the opaque compiled form owned by an equation; it is immutable
/// once built, so recompiling always produces a new `Expression`.
#[derive(Clone, Debug)]
pub struct Expression {
    text: String,
    arity: Arity,
    ctx: Context,
    root: Node,
    tape: Vec<Step>,
    out: Arg,
}

impl Expression {
    /// Parses and compiles the given expression text
    ///
    /// Returns an error if the text is empty or malformed, or if it uses an
    /// unknown identifier or function.
    pub fn compile(text: &str, arity: Arity) -> Result<Self, Error> {
        let mut ctx = Context::new();
        let root = ctx.parse(text, arity)?;
        let (tape, out) = flatten(&ctx, root)?;
        Ok(Self {
            text: text.to_owned(),
            arity,
            ctx,
            root,
            tape,
            out,
        })
    }

    /// Returns the source text for this expression
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns the arity with which this expression was compiled
    pub fn arity(&self) -> Arity {
        self.arity
    }

    /// Returns the expression graph backing this expression
    pub fn context(&self) -> &Context {
        &self.ctx
    }

    /// Returns the root node of the expression graph
    pub fn root(&self) -> Node {
        self.root
    }

    /// Returns the number of steps in the flattened tape
    ///
    /// Constant expressions have an empty tape.
    pub fn len(&self) -> usize {
        self.tape.len()
    }

    /// Checks whether the flattened tape is empty
    pub fn is_empty(&self) -> bool {
        self.tape.is_empty()
    }

    /// Builds an evaluator with its own scratch memory
    ///
    /// Use this when evaluating many points, to avoid reallocating.
    pub fn evaluator(&self) -> PointEval<'_> {
        PointEval {
            expr: self,
            slots: Vec::with_capacity(self.tape.len()),
        }
    }

    /// Evaluates the expression at a single point
    ///
    /// `y` is ignored for single-variable expressions.  The result is either
    /// finite or `NaN`.
    pub fn eval(&self, x: f64, y: f64) -> f64 {
        self.evaluator().eval(x, y)
    }
}

/// Flattens the subgraph reachable from `root` into a tape
fn flatten(ctx: &Context, root: Node) -> Result<(Vec<Step>, Arg), Error> {
    // Children always have lower indices than their parents, so a single
    // backwards sweep finds every reachable node.
    let ops: Vec<&Op> = ctx.ops_until(root).collect();
    let mut live = vec![false; ops.len()];
    if let Some(r) = live.last_mut() {
        *r = true;
    }
    for i in (0..ops.len()).rev() {
        if live[i] {
            for c in ops[i].children() {
                live[c.get()] = true;
            }
        }
    }

    let mut tape = vec![];
    let mut args: Vec<Option<Arg>> = vec![None; ops.len()];
    let arg = |args: &[Option<Arg>], n: Node| {
        args.get(n.get()).copied().flatten().ok_or(Error::BadNode)
    };
    for (i, op) in ops.iter().enumerate() {
        if !live[i] {
            continue;
        }
        let step = match **op {
            Op::Const(c) => {
                args[i] = Some(Arg::Imm(c.0));
                continue;
            }
            Op::Input(v) => Step::Input(v),
            Op::Unary(op, a) => Step::Unary(op, arg(&args, a)?),
            Op::Binary(op, a, b) => {
                Step::Binary(op, arg(&args, a)?, arg(&args, b)?)
            }
        };
        args[i] = Some(Arg::Slot(tape.len() as u32));
        tape.push(step);
    }
    let out = args.last().copied().flatten().ok_or(Error::BadNode)?;
    Ok((tape, out))
}

/// Point evaluator for an [`Expression`], owning its scratch memory
pub struct PointEval<'a> {
    expr: &'a Expression,
    slots: Vec<f64>,
}

impl PointEval<'_> {
    /// Evaluates the expression at a single point
    pub fn eval(&mut self, x: f64, y: f64) -> f64 {
        let x = total(x);
        let y = match self.expr.arity {
            Arity::One => 0.0,
            Arity::Two => total(y),
        };
        self.slots.clear();
        for step in &self.expr.tape {
            let v = match *step {
                Step::Input(Var::X) => x,
                Step::Input(Var::Y) => y,
                Step::Unary(op, a) => op.apply(self.get(a)),
                Step::Binary(op, a, b) => op.apply(self.get(a), self.get(b)),
            };
            self.slots.push(v);
        }
        total(self.get(self.expr.out))
    }

    #[inline]
    fn get(&self, a: Arg) -> f64 {
        match a {
            Arg::Slot(i) => self.slots[i as usize],
            Arg::Imm(v) => v,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Stateful expression engine
///
/// This wraps an optional [`Expression`] with a compile status, matching the
/// interface that the rendering front end expects:
/// ```
/// use graphgl::{eval::Engine, var::Arity};
///
/// let mut engine = Engine::new();
/// assert!(engine.evaluate(1.0, 0.0).is_nan());
///
/// assert!(engine.compile("x^2", Arity::One));
/// assert_eq!(engine.evaluate(3.0, 0.0), 9.0);
///
/// assert!(!engine.compile("x +", Arity::One));
/// assert!(engine.last_error().is_some());
/// assert!(engine.evaluate(3.0, 0.0).is_nan());
/// ```
#[derive(Clone, Debug, Default)]
pub struct Engine {
    expr: Option<Expression>,
    valid: bool,
    last_error: Option<String>,
}

impl Engine {
    /// Builds a new engine, with no compiled expression
    pub fn new() -> Self {
        Self::default()
    }

    /// Compiles the given text, returning `true` on success
    ///
    /// On failure, the error message is available from
    /// [`last_error`](Self::last_error) and the engine is marked invalid until
    /// the next successful compile.
    pub fn compile(&mut self, text: &str, arity: Arity) -> bool {
        match Expression::compile(text, arity) {
            Ok(e) => {
                self.expr = Some(e);
                self.valid = true;
                self.last_error = None;
            }
            Err(e) => {
                self.valid = false;
                self.last_error = Some(e.to_string());
            }
        }
        self.valid
    }

    /// Evaluates the most recently compiled expression
    ///
    /// Returns `NaN` if the last compile failed or nothing was compiled.
    pub fn evaluate(&self, x: f64, y: f64) -> f64 {
        self.expression().map(|e| e.eval(x, y)).unwrap_or(f64::NAN)
    }

    /// Returns the message from the most recent failed compile
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Checks whether the most recent compile succeeded
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// Returns the compiled expression, if the last compile succeeded
    pub fn expression(&self) -> Option<&Expression> {
        self.expr.as_ref().filter(|_| self.valid)
    }
}
