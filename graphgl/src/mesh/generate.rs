use super::{Geometry, HeightRange, Vertex};
use crate::{
    equation::Equation,
    eval::Expression,
    sample::{SampleSettings, adaptive_sample},
};
use log::debug;
use nalgebra::Vector3;

/// Generates geometry for an equation
///
/// The equation's domain, color, and curve / surface / mesh flags are used,
/// but its expression text is not: `expr` is the already-compiled form, and
/// callers must not invoke this function if compilation failed.
///
/// Returns the new geometry (meant to replace the equation's geometry
/// wholesale) and the range of heights in that geometry.  The height range
/// is empty if no point evaluated to a finite value.
///
/// ```
/// use graphgl::{
///     equation::Equation, eval::Expression, mesh, sample::SampleSettings,
///     var::Arity,
/// };
///
/// let mut eq = Equation::new("x^2");
/// eq.set_3d(false);
/// eq.domain.min_x = -2.0;
/// eq.domain.max_x = 2.0;
///
/// let f = Expression::compile(eq.expression(), Arity::One)?;
/// let (geom, range) = mesh::generate(&eq, &f, &SampleSettings::default());
/// assert!(geom.indices.is_empty());
/// assert_eq!(range.max, 4.0);
/// # Ok::<(), graphgl::Error>(())
/// ```
pub fn generate(
    eq: &Equation,
    expr: &Expression,
    settings: &SampleSettings,
) -> (Geometry, HeightRange) {
    let color = Vector3::from(eq.color);
    let mut eval = expr.evaluator();
    let mut geom = Geometry::default();
    let mut range = HeightRange::new();
    let d = eq.domain;

    if eq.is_3d() {
        let xs = adaptive_sample(
            |x| eval.eval(x, d.min_y),
            d.min_x,
            d.max_x,
            settings,
        );
        let ys = adaptive_sample(
            |y| eval.eval(d.min_x, y),
            d.min_y,
            d.max_y,
            settings,
        );

        // Map from logical grid position (row-major, y outer) to the index of
        // the vertex generated there, if any.
        let cols = xs.len();
        let mut grid: Vec<Option<u32>> = Vec::with_capacity(cols * ys.len());
        for &y in &ys {
            for &x in &xs {
                let z = eval.eval(x, y) as f32;
                let position = Vector3::new(x as f32, z, y as f32);
                if is_finite(&position) {
                    grid.push(Some(geom.vertices.len() as u32));
                    geom.vertices.push(Vertex { position, color });
                    range.include(z);
                } else {
                    grid.push(None);
                }
            }
        }

        if eq.is_mesh {
            for j in 1..ys.len() {
                for i in 1..cols {
                    let corners = [
                        grid[(j - 1) * cols + (i - 1)],
                        grid[(j - 1) * cols + i],
                        grid[j * cols + (i - 1)],
                        grid[j * cols + i],
                    ];
                    if let [Some(i0), Some(i1), Some(i2), Some(i3)] = corners {
                        geom.indices.extend([i0, i1, i2, i1, i3, i2]);
                    }
                }
            }
        }
        debug!(
            "generated surface '{}': {}x{} grid, {} vertices, {} triangles",
            expr.text(),
            cols,
            ys.len(),
            geom.vertices.len(),
            geom.triangle_count()
        );
    } else {
        let xs = adaptive_sample(
            |x| eval.eval(x, 0.0),
            d.min_x,
            d.max_x,
            settings,
        );
        for x in xs {
            let y = eval.eval(x, 0.0) as f32;
            let position = Vector3::new(x as f32, y, 0.0);
            if is_finite(&position) {
                geom.vertices.push(Vertex { position, color });
                range.include(y);
            }
        }
        debug!(
            "generated curve '{}': {} vertices",
            expr.text(),
            geom.vertices.len()
        );
    }
    (geom, range)
}

/// Checks a position after narrowing to `f32`, which may overflow
fn is_finite(p: &Vector3<f32>) -> bool {
    p.iter().all(|v| v.is_finite())
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{mesh::Domain, var::Arity};
    use approx::assert_relative_eq;

    fn surface(text: &str, is_mesh: bool) -> (Geometry, HeightRange) {
        let mut eq = Equation::new(text);
        eq.is_mesh = is_mesh;
        eq.domain = Domain {
            min_x: -1.0,
            max_x: 1.0,
            min_y: -1.0,
            max_y: 1.0,
        };
        let f = Expression::compile(text, Arity::Two).unwrap();
        generate(&eq, &f, &small())
    }

    fn small() -> SampleSettings {
        SampleSettings {
            base_count: 5,
            max_depth: 0,
            derivative_threshold: 5.0,
        }
    }

    #[test]
    fn curve() {
        let mut eq = Equation::new("x^2");
        eq.set_3d(false);
        eq.domain.min_x = -2.0;
        eq.domain.max_x = 2.0;
        let f = Expression::compile("x^2", Arity::One).unwrap();
        let (g, r) = generate(&eq, &f, &SampleSettings::default());
        assert!(g.indices.is_empty());
        assert!(!g.vertices.is_empty());
        assert_relative_eq!(r.min, 0.0, epsilon = 1e-2);
        assert_relative_eq!(r.max, 4.0);
        for v in &g.vertices {
            assert_eq!(v.position.z, 0.0);
            assert_eq!(v.color, Vector3::new(1.0, 0.5, 0.2));
        }
        // Sorted along X
        assert!(
            g.vertices
                .windows(2)
                .all(|w| w[0].position.x < w[1].position.x)
        );
    }

    #[test]
    fn curve_with_gaps() {
        let mut eq = Equation::new("sqrt(x)");
        eq.set_3d(false);
        eq.domain.min_x = -1.0;
        eq.domain.max_x = 1.0;
        let f = Expression::compile("sqrt(x)", Arity::One).unwrap();
        let (g, r) = generate(&eq, &f, &SampleSettings::default());
        assert!(!g.vertices.is_empty());
        assert!(g.vertices.iter().all(|v| v.position.x >= 0.0));
        assert!(g.vertices.iter().all(|v| v.position.y.is_finite()));
        // The lowest sample lands somewhere in the first base interval past 0
        assert!(r.min >= 0.0 && r.min < 0.15, "{r:?}");
        assert_eq!(r.max, 1.0);
    }

    #[test]
    fn positions_outside_f32_are_skipped() {
        let mut eq = Equation::new("1");
        eq.is_mesh = true;
        eq.domain = Domain {
            min_x: -1e39,
            max_x: 1e39,
            min_y: -1.0,
            max_y: 1.0,
        };
        let settings = SampleSettings {
            base_count: 3,
            max_depth: 0,
            derivative_threshold: 5.0,
        };
        let f = Expression::compile("1", Arity::Two).unwrap();
        let (g, r) = generate(&eq, &f, &settings);

        // Only the x = 0 column fits in an f32, so no cell survives
        assert_eq!(g.vertices.len(), 3);
        assert!(
            g.vertices
                .iter()
                .all(|v| v.position.iter().all(|p| p.is_finite()))
        );
        assert!(g.indices.is_empty());
        assert_eq!((r.min, r.max), (1.0, 1.0));

        eq.set_3d(false);
        let f = Expression::compile("1", Arity::One).unwrap();
        let (g, _) = generate(&eq, &f, &settings);
        assert_eq!(g.vertices.len(), 1);
        assert_eq!(g.vertices[0].position.x, 0.0);
    }

    #[test]
    fn dense_surface() {
        let (g, r) = surface("x + 2 * y", true);
        // 5x5 grid, 4x4 cells
        assert_eq!(g.vertices.len(), 25);
        assert_eq!(g.indices.len(), 16 * 6);
        assert_eq!((r.min, r.max), (-3.0, 3.0));

        // Row-major, y outer: vertex 1 is one step along X
        assert_eq!(g.vertices[0].position, Vector3::new(-1.0, -3.0, -1.0));
        assert_eq!(g.vertices[1].position, Vector3::new(-0.5, -2.5, -1.0));
        assert_eq!(g.vertices[5].position, Vector3::new(-1.0, -2.0, -0.5));
        assert_eq!(&g.indices[..6], &[0, 1, 5, 1, 6, 5]);
    }

    #[test]
    fn surface_without_mesh() {
        let (g, _) = surface("x * y", false);
        assert_eq!(g.vertices.len(), 25);
        assert!(g.indices.is_empty());
    }

    #[test]
    fn holes_are_skipped() {
        // Undefined where x < 0
        let (g, r) = surface("sqrt(x) + y", true);
        // Columns at x = 0, 0.5, 1 survive
        assert_eq!(g.vertices.len(), 15);
        // 2 cells per row, 4 rows
        assert_eq!(g.indices.len(), 8 * 6);
        assert!(g.indices.iter().all(|&i| (i as usize) < g.vertices.len()));
        for v in &g.vertices {
            assert!(v.position.x >= 0.0);
            assert!(v.position.y.is_finite());
        }
        assert_eq!(r.min, -1.0);
        assert_relative_eq!(r.max, 2.0);

        // The first surviving triangle is the first cell in the first row
        let t: Vec<_> = g.indices[..3]
            .iter()
            .map(|&i| g.vertices[i as usize].position)
            .collect();
        assert_eq!(t[0], Vector3::new(0.0, -1.0, -1.0));
        assert_eq!(t[1].x, 0.5);
        assert_eq!(t[2], Vector3::new(0.0, -0.5, -0.5));
    }

    #[test]
    fn nothing_finite() {
        let (g, r) = surface("ln(-1 - x*x)", true);
        assert!(g.vertices.is_empty());
        assert!(g.indices.is_empty());
        assert!(r.is_empty());
    }

    #[test]
    fn deterministic() {
        let a = surface("sin(3 * x) * cos(5 * y)", true);
        let b = surface("sin(3 * x) * cos(5 * y)", true);
        assert_eq!(a, b);
    }
}
