//! User-facing equations, with their parameters and generated geometry
use crate::{
    Error,
    eval::Expression,
    mesh::{self, Domain, Geometry, HeightRange},
    sample::SampleSettings,
    var::Arity,
};

/// A single plotted equation
///
/// The expression text and curve / surface mode are private, because
/// changing either one invalidates the cached compiled form; use
/// [`set_expression`](Self::set_expression) and [`set_3d`](Self::set_3d).
///
/// Geometry is only rebuilt by [`render`](Self::render); editing parameters
/// leaves the previous geometry in place until then.
#[derive(Clone, Debug)]
pub struct Equation {
    expression: String,
    is_3d: bool,
    compiled: Option<Expression>,

    /// RGB color, applied to every vertex
    pub color: [f32; 3],
    /// Opacity, from 0 (transparent) to 1 (opaque)
    pub opacity: f32,
    /// Sample size shown to the user; stored and persisted, but not used
    /// during generation
    pub sample_size: u32,
    /// Sampling bounds
    pub domain: Domain,
    /// Whether the equation should be drawn
    pub is_visible: bool,
    /// Whether surfaces should generate triangle indices
    pub is_mesh: bool,
    /// Most recently generated geometry
    pub geometry: Geometry,
}

impl Default for Equation {
    fn default() -> Self {
        Self {
            expression: String::new(),
            is_3d: true,
            compiled: None,
            color: [1.0, 0.5, 0.2],
            opacity: 1.0,
            sample_size: 1000,
            domain: Domain::default(),
            is_visible: true,
            is_mesh: false,
            geometry: Geometry::default(),
        }
    }
}

impl Equation {
    /// Builds a new surface equation with default parameters
    pub fn new(expression: &str) -> Self {
        Self {
            expression: expression.to_owned(),
            ..Self::default()
        }
    }

    /// Returns the expression text
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// Sets the expression text, invalidating the compiled form if it changed
    pub fn set_expression(&mut self, text: &str) {
        if self.expression != text {
            self.expression = text.to_owned();
            self.compiled = None;
        }
    }

    /// Checks whether this equation is a surface (`true`) or curve (`false`)
    pub fn is_3d(&self) -> bool {
        self.is_3d
    }

    /// Switches between surface and curve mode, invalidating the compiled form
    /// if the mode changed
    pub fn set_3d(&mut self, is_3d: bool) {
        if self.is_3d != is_3d {
            self.is_3d = is_3d;
            self.compiled = None;
        }
    }

    /// Returns the arity used to compile this equation's expression
    pub fn arity(&self) -> Arity {
        Arity::from_3d(self.is_3d)
    }

    /// Returns the cached compiled form, if it is up to date
    pub fn compiled(&self) -> Option<&Expression> {
        self.compiled.as_ref()
    }

    /// Compiles the expression (if needed) and regenerates geometry
    ///
    /// On success, the geometry is replaced and the height range of the new
    /// geometry is returned.  If the expression fails to compile, generation
    /// is skipped: the error is returned and the existing geometry is left
    /// untouched.
    ///
    /// ```
    /// # use graphgl::{equation::Equation, mesh::Domain};
    /// # use graphgl::sample::SampleSettings;
    /// let settings = SampleSettings::default();
    /// let mut eq = Equation::new("x * y");
    /// eq.domain = Domain { min_x: -2.0, max_x: 3.0, min_y: -4.0, max_y: 5.0 };
    /// let range = eq.render(&settings)?;
    /// assert_eq!((range.min, range.max), (-12.0, 15.0));
    ///
    /// eq.set_expression("x * ");
    /// assert!(eq.render(&settings).is_err());
    /// assert!(!eq.geometry.is_empty());
    /// # Ok::<(), graphgl::Error>(())
    /// ```
    pub fn render(
        &mut self,
        settings: &SampleSettings,
    ) -> Result<HeightRange, Error> {
        let expr = match self.compiled.take() {
            Some(e) => e,
            None => Expression::compile(&self.expression, self.arity())?,
        };
        let (geometry, range) = mesh::generate(self, &expr, settings);
        self.geometry = geometry;
        self.compiled = Some(expr);
        Ok(range)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let eq = Equation::default();
        assert_eq!(eq.expression(), "");
        assert_eq!(eq.color, [1.0, 0.5, 0.2]);
        assert_eq!(eq.opacity, 1.0);
        assert_eq!(eq.sample_size, 1000);
        assert_eq!(eq.domain, Domain::default());
        assert!(eq.is_3d());
        assert!(eq.is_visible);
        assert!(!eq.is_mesh);
        assert!(eq.geometry.is_empty());
        assert!(eq.compiled().is_none());
    }

    #[test]
    fn empty_expression_fails() {
        let mut eq = Equation::default();
        assert!(matches!(
            eq.render(&SampleSettings::default()),
            Err(Error::EmptyExpression)
        ));
        assert!(eq.geometry.is_empty());
    }

    #[test]
    fn cache_invalidation() {
        let settings = SampleSettings::default();
        let mut eq = Equation::new("x + y");
        eq.render(&settings).unwrap();
        assert_eq!(eq.compiled().unwrap().arity(), Arity::Two);

        // Same text keeps the cache
        eq.set_expression("x + y");
        assert!(eq.compiled().is_some());

        eq.set_3d(false);
        assert!(eq.compiled().is_none());
        eq.render(&settings).unwrap();
        assert_eq!(eq.compiled().unwrap().arity(), Arity::One);
        // In curve mode, `y` is zero
        let g = &eq.geometry;
        assert!(g.vertices.iter().all(|v| v.position.x == v.position.y));

        eq.set_expression("2 * x");
        assert!(eq.compiled().is_none());
        let r = eq.render(&settings).unwrap();
        assert_eq!((r.min, r.max), (-50.0, 50.0));
        assert_eq!(eq.compiled().unwrap().text(), "2 * x");
    }

    #[test]
    fn failed_compile_keeps_geometry() {
        let settings = SampleSettings::default();
        let mut eq = Equation::new("x");
        eq.render(&settings).unwrap();
        let before = eq.geometry.clone();

        eq.set_expression("sin(");
        assert!(eq.render(&settings).is_err());
        assert_eq!(eq.geometry, before);
        assert!(eq.compiled().is_none());
    }

    #[test]
    fn regeneration_replaces_geometry() {
        let settings = SampleSettings::default();
        let mut eq = Equation::new("x * y");
        eq.is_mesh = true;
        eq.domain = Domain {
            min_x: -1.0,
            max_x: 1.0,
            min_y: -1.0,
            max_y: 1.0,
        };
        eq.render(&settings).unwrap();
        let n = eq.geometry.vertices.len();
        let m = eq.geometry.indices.len();
        assert!(m > 0);
        eq.render(&settings).unwrap();
        assert_eq!(eq.geometry.vertices.len(), n);
        assert_eq!(eq.geometry.indices.len(), m);
    }
}
