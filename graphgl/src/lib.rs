//! `graphgl` is the core of a function plotter: it compiles math expressions
//! in one or two variables and turns them into curve and surface geometry.
//!
//! # Expressions
//! Expression text is parsed into a [`Context`](crate::context::Context), an
//! arena-style graph of deduplicated operations with constant folding, then
//! flattened into an [`Expression`](crate::eval::Expression) for evaluation:
//! ```
//! use graphgl::{eval::Expression, var::Arity};
//!
//! let f = Expression::compile("sin(x) * cos(y) + pi", Arity::Two)?;
//! let v = f.eval(0.0, 0.0);
//! assert_eq!(v, std::f64::consts::PI);
//! # Ok::<(), graphgl::Error>(())
//! ```
//!
//! Evaluation is total: faults such as division by zero, `sqrt` of a
//! negative number, or overflow produce `NaN` rather than an error.
//! ```
//! # use graphgl::{eval::Expression, var::Arity};
//! let f = Expression::compile("1 / x", Arity::One)?;
//! assert!(f.eval(0.0, 0.0).is_nan());
//! # Ok::<(), graphgl::Error>(())
//! ```
//!
//! # Sampling and geometry
//! Geometry is built by sampling each axis adaptively
//! ([`sample::adaptive_sample`]), concentrating points where the function is
//! steep, then evaluating the expression at every sample (for curves) or
//! every grid position (for surfaces).  Non-finite points are dropped, and
//! surface meshes only triangulate grid cells whose corners all survived.
//!
//! ```
//! use graphgl::{equation::Equation, mesh::Domain, sample::SampleSettings};
//!
//! let mut eq = Equation::new("x * y");
//! eq.is_mesh = true;
//! eq.domain = Domain { min_x: -1.0, max_x: 1.0, min_y: -1.0, max_y: 1.0 };
//!
//! let range = eq.render(&SampleSettings::default())?;
//! assert_eq!((range.min, range.max), (-1.0, 1.0));
//! assert_eq!(eq.geometry.indices.len() % 6, 0);
//! # Ok::<(), graphgl::Error>(())
//! ```
//!
//! # Scenes
//! A [`Scene`](crate::scene::Scene) holds a list of equations and points,
//! which can be saved to and loaded from plain-text `.mat` files (see
//! [`data`]).
#![warn(missing_docs)]

pub mod context;
pub mod data;
pub mod equation;
pub mod eval;
pub mod mesh;
pub mod sample;
pub mod scene;
pub mod var;

mod error;
pub use error::Error;
