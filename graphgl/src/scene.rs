//! A collection of equations and points, rendered together
use crate::{
    Error,
    equation::Equation,
    mesh::{HeightRange, Vertex},
    sample::SampleSettings,
};
use log::{info, warn};
use nalgebra::Vector3;

/// A standalone colored point
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Point {
    /// Position, in the same frame as generated vertices
    pub position: [f32; 3],
    /// RGB color
    pub color: [f32; 3],
}

impl Default for Point {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            color: [1.0, 0.5, 0.2],
        }
    }
}

impl Point {
    /// Returns the vertex record used to draw this point
    pub fn vertex(&self) -> Vertex {
        Vertex {
            position: Vector3::from(self.position),
            color: Vector3::from(self.color),
        }
    }
}

/// The full set of equations and points being plotted
#[derive(Clone, Debug, Default)]
pub struct Scene {
    /// Equations, in display order
    pub equations: Vec<Equation>,
    /// Points, in display order
    pub points: Vec<Point>,
    /// Sampling settings used for every equation
    pub settings: SampleSettings,
    /// Height range from the most recent render, used for color mapping
    pub heights: HeightRange,
}

impl Scene {
    /// Builds a new empty scene with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an equation, returning its index
    pub fn add_equation(&mut self, eq: Equation) -> usize {
        self.equations.push(eq);
        self.equations.len() - 1
    }

    /// Removes and returns the equation at the given index
    pub fn remove_equation(&mut self, i: usize) -> Result<Equation, Error> {
        if i < self.equations.len() {
            Ok(self.equations.remove(i))
        } else {
            Err(Error::BadIndex(i, self.equations.len()))
        }
    }

    /// Appends a point, returning its index
    pub fn add_point(&mut self, p: Point) -> usize {
        self.points.push(p);
        self.points.len() - 1
    }

    /// Removes and returns the point at the given index
    pub fn remove_point(&mut self, i: usize) -> Result<Point, Error> {
        if i < self.points.len() {
            Ok(self.points.remove(i))
        } else {
            Err(Error::BadIndex(i, self.points.len()))
        }
    }

    /// Renders a single equation
    ///
    /// On success, [`heights`](Self::heights) is replaced by the height range
    /// of that equation.  On failure, the scene is left unchanged.
    pub fn render_equation(&mut self, i: usize) -> Result<HeightRange, Error> {
        let n = self.equations.len();
        let eq = self.equations.get_mut(i).ok_or(Error::BadIndex(i, n))?;
        let range = eq.render(&self.settings)?;
        self.heights = range;
        Ok(range)
    }

    /// Renders every equation, returning the combined height range
    ///
    /// Equations that fail to compile are logged and skipped, keeping their
    /// previous geometry.
    pub fn render_all(&mut self) -> HeightRange {
        let mut heights = HeightRange::new();
        let mut failed = 0;
        for (i, eq) in self.equations.iter_mut().enumerate() {
            match eq.render(&self.settings) {
                Ok(r) => heights.merge(&r),
                Err(e) => {
                    warn!(
                        "failed to render equation {i} ('{}'): {e}",
                        eq.expression()
                    );
                    failed += 1;
                }
            }
        }
        info!(
            "rendered {} of {} equations",
            self.equations.len() - failed,
            self.equations.len()
        );
        self.heights = heights;
        heights
    }

    /// Returns vertex records for every point in the scene
    pub fn point_vertices(&self) -> Vec<Vertex> {
        self.points.iter().map(Point::vertex).collect()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mesh::Domain;

    fn unit(text: &str) -> Equation {
        let mut eq = Equation::new(text);
        eq.domain = Domain {
            min_x: -1.0,
            max_x: 1.0,
            min_y: -1.0,
            max_y: 1.0,
        };
        eq
    }

    #[test]
    fn add_remove() {
        let mut scene = Scene::new();
        assert_eq!(scene.add_equation(unit("x")), 0);
        assert_eq!(scene.add_equation(unit("y")), 1);
        assert_eq!(scene.add_point(Point::default()), 0);

        assert!(matches!(scene.remove_equation(5), Err(Error::BadIndex(5, 2))));
        assert_eq!(scene.remove_equation(0).unwrap().expression(), "x");
        assert_eq!(scene.equations[0].expression(), "y");

        assert!(scene.remove_point(1).is_err());
        assert!(scene.remove_point(0).is_ok());
        assert!(scene.points.is_empty());
    }

    #[test]
    fn render_one() {
        let mut scene = Scene::new();
        scene.add_equation(unit("x + y"));
        scene.add_equation(unit("x + "));

        let r = scene.render_equation(0).unwrap();
        assert_eq!((r.min, r.max), (-2.0, 2.0));
        assert_eq!(scene.heights, r);

        assert!(scene.render_equation(1).is_err());
        assert_eq!(scene.heights, r);
        assert!(matches!(
            scene.render_equation(2),
            Err(Error::BadIndex(2, 2))
        ));
    }

    #[test]
    fn render_all_merges() {
        let mut scene = Scene::new();
        scene.add_equation(unit("x"));
        scene.add_equation(unit("sin("));
        scene.add_equation(unit("3 * y"));
        let r = scene.render_all();
        assert_eq!((r.min, r.max), (-3.0, 3.0));
        assert_eq!(scene.heights, r);
        assert!(!scene.equations[0].geometry.is_empty());
        assert!(scene.equations[1].geometry.is_empty());
        assert!(!scene.equations[2].geometry.is_empty());
    }

    #[test]
    fn render_all_empty() {
        let mut scene = Scene::new();
        assert!(scene.render_all().is_empty());
    }

    #[test]
    fn point_vertex() {
        let p = Point {
            position: [1.0, 2.0, 3.0],
            color: [0.0, 1.0, 0.0],
        };
        let v = p.vertex();
        assert_eq!(v.position, Vector3::new(1.0, 2.0, 3.0));
        assert_eq!(v.color, Vector3::new(0.0, 1.0, 0.0));

        let mut scene = Scene::new();
        scene.add_point(p);
        assert_eq!(scene.point_vertices(), vec![v]);
    }
}
