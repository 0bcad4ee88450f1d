//! Geometry generation for curves and surfaces
//!
//! [`generate`] samples an [`Expression`](crate::eval::Expression) over an
//! equation's [`Domain`] and produces a [`Geometry`]: a list of
//! [`Vertex`] records plus (for meshed surfaces) triangle indices.
//!
//! Positions use a y-up frame: a curve `y = f(x)` is drawn in the XY plane,
//! and a surface `z = f(x, y)` puts its height on the vertical axis, so each
//! vertex is at `(x, f(x, y), y)`.
//!
//! Points where the expression is not finite are omitted entirely; meshes
//! only include grid cells whose four corners all exist.
mod generate;
mod output;

pub use generate::generate;

use nalgebra::Vector3;

/// Sampling bounds for an equation
///
/// `min_y` / `max_y` are only used by surfaces.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Domain {
    /// Lower bound on the X axis
    pub min_x: f64,
    /// Upper bound on the X axis
    pub max_x: f64,
    /// Lower bound on the Y axis
    pub min_y: f64,
    /// Upper bound on the Y axis
    pub max_y: f64,
}

impl Default for Domain {
    fn default() -> Self {
        Self {
            min_x: -25.0,
            max_x: 25.0,
            min_y: -25.0,
            max_y: 25.0,
        }
    }
}

/// A single vertex record
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Vertex {
    /// Position, in the y-up frame
    pub position: Vector3<f32>,
    /// RGB color
    pub color: Vector3<f32>,
}

/// Vertex and index buffers for an equation
///
/// Indices are in units of whole [`Vertex`] records, and are always a
/// multiple of 3 (one triangle per three indices).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Geometry {
    /// Vertex records, in generation order
    pub vertices: Vec<Vertex>,
    /// Triangle indices into `vertices`
    pub indices: Vec<u32>,
}

impl Geometry {
    /// Returns the vertex buffer in GPU layout
    ///
    /// Each vertex becomes a position triple followed by a color triple, so
    /// the buffer always holds an even number of `vec3` entries.
    /// ```
    /// # use graphgl::mesh::{Geometry, Vertex};
    /// # use nalgebra::Vector3;
    /// let g = Geometry {
    ///     vertices: vec![Vertex {
    ///         position: Vector3::new(1.0, 2.0, 3.0),
    ///         color: Vector3::new(0.5, 0.5, 0.5),
    ///     }],
    ///     indices: vec![],
    /// };
    /// assert_eq!(g.interleaved(), vec![1.0, 2.0, 3.0, 0.5, 0.5, 0.5]);
    /// ```
    pub fn interleaved(&self) -> Vec<f32> {
        self.vertices
            .iter()
            .flat_map(|v| v.position.iter().chain(v.color.iter()).copied())
            .collect()
    }

    /// Returns the number of triangles in the index buffer
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Checks whether there are no vertices
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Removes all vertices and indices
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.indices.clear();
    }
}

/// Range of heights seen during a single generation pass
///
/// A new range is empty, with `min = +inf` and `max = -inf`; callers must
/// check [`is_empty`](Self::is_empty) before using the bounds.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct HeightRange {
    /// Lowest height seen
    pub min: f32,
    /// Highest height seen
    pub max: f32,
}

impl Default for HeightRange {
    fn default() -> Self {
        Self {
            min: f32::INFINITY,
            max: f32::NEG_INFINITY,
        }
    }
}

impl HeightRange {
    /// Builds a new empty range
    pub fn new() -> Self {
        Self::default()
    }

    /// Expands the range to include the given height
    ///
    /// Non-finite heights are ignored.
    pub fn include(&mut self, h: f32) {
        if h.is_finite() {
            self.min = self.min.min(h);
            self.max = self.max.max(h);
        }
    }

    /// Checks whether no heights have been included
    pub fn is_empty(&self) -> bool {
        self.min > self.max
    }

    /// Expands this range to include another range
    /// ```
    /// # use graphgl::mesh::HeightRange;
    /// let mut a = HeightRange::new();
    /// a.include(1.0);
    /// let mut b = HeightRange::new();
    /// b.include(-2.0);
    /// a.merge(&b);
    /// assert_eq!((a.min, a.max), (-2.0, 1.0));
    ///
    /// a.merge(&HeightRange::new());
    /// assert_eq!((a.min, a.max), (-2.0, 1.0));
    /// ```
    pub fn merge(&mut self, other: &HeightRange) {
        if !other.is_empty() {
            self.include(other.min);
            self.include(other.max);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn height_range() {
        let mut r = HeightRange::new();
        assert!(r.is_empty());
        assert_eq!(r.min, f32::INFINITY);
        assert_eq!(r.max, f32::NEG_INFINITY);

        r.include(f32::NAN);
        r.include(f32::INFINITY);
        assert!(r.is_empty());

        r.include(3.0);
        assert!(!r.is_empty());
        assert_eq!((r.min, r.max), (3.0, 3.0));
        r.include(-1.0);
        assert_eq!((r.min, r.max), (-1.0, 3.0));
    }

    #[test]
    fn interleaved_pairs() {
        let v = Vertex {
            position: Vector3::new(1.0, 2.0, 3.0),
            color: Vector3::new(1.0, 0.5, 0.2),
        };
        let g = Geometry {
            vertices: vec![v; 5],
            indices: vec![0, 1, 2],
        };
        let buf = g.interleaved();
        assert_eq!(buf.len(), 5 * 6);
        assert_eq!((buf.len() / 3) % 2, 0);
        assert_eq!(&buf[6..12], &[1.0, 2.0, 3.0, 1.0, 0.5, 0.2]);
        assert_eq!(g.triangle_count(), 1);
    }

    #[test]
    fn domain_default() {
        let d = Domain::default();
        assert_eq!((d.min_x, d.max_x), (-25.0, 25.0));
        assert_eq!((d.min_y, d.max_y), (-25.0, 25.0));
    }
}
