//! Plain-text scene files (`.mat`)
//!
//! Each line is one record.  Equations store their parameters (but never
//! their geometry) inside a quoted field, with the expression text last:
//!
//! ```text
//! Equation "1 0.5 0.2 1000 -25 25 -25 25 1 1 sin(x) * cos(y)"
//! Point 1 2 3 0 1 0
//! ```
//!
//! The equation fields are `r g b sample_size min_x max_x min_y max_y
//! visible is_3d expression`, with flags written as `0` or `1`; point fields
//! are `x y z r g b`.
//!
//! Blank lines are ignored, and records with an unknown tag are skipped with
//! a warning.
use crate::{Error, equation::Equation, mesh::Domain, scene::{Point, Scene}};
use log::{info, warn};
use std::{
    io::{BufRead, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
    str::FromStr,
};

/// File extension for scene files
pub const EXTENSION: &str = "mat";

/// Writes every equation and point in the scene
pub fn write_scene<W: Write>(scene: &Scene, mut out: W) -> Result<(), Error> {
    for eq in &scene.equations {
        let [r, g, b] = eq.color;
        let d = eq.domain;
        // A line break would split the record
        let text = eq.expression().replace(['\n', '\r'], " ");
        writeln!(
            out,
            "Equation \"{r} {g} {b} {} {} {} {} {} {} {} {text}\"",
            eq.sample_size,
            d.min_x,
            d.max_x,
            d.min_y,
            d.max_y,
            eq.is_visible as u8,
            eq.is_3d() as u8,
        )?;
    }
    for p in &scene.points {
        let [x, y, z] = p.position;
        let [r, g, b] = p.color;
        writeln!(out, "Point {x} {y} {z} {r} {g} {b}")?;
    }
    Ok(())
}

/// Reads equations and points from a scene file
///
/// Equations are returned without geometry; they must be rendered before
/// being drawn.
pub fn read_scene<R: BufRead>(
    input: R,
) -> Result<(Vec<Equation>, Vec<Point>), Error> {
    let mut equations = vec![];
    let mut points = vec![];
    for (i, line) in input.lines().enumerate() {
        let line = line?;
        let line_no = i + 1;
        let mut fields = Fields { rest: &line };
        match fields.next_token() {
            None => continue,
            Some("Equation") => {
                equations.push(parse_equation(&line, line_no)?)
            }
            Some("Point") => points.push(parse_point(fields, line_no)?),
            Some(tag) => {
                warn!("skipping unknown record '{tag}' on line {line_no}")
            }
        }
    }
    Ok((equations, points))
}

/// Whitespace-separated tokens, with access to the unparsed remainder
struct Fields<'a> {
    rest: &'a str,
}

impl<'a> Fields<'a> {
    fn next_token(&mut self) -> Option<&'a str> {
        let s = self.rest.trim_start();
        if s.is_empty() {
            self.rest = s;
            return None;
        }
        let end = s.find(char::is_whitespace).unwrap_or(s.len());
        let (tok, rest) = s.split_at(end);
        self.rest = rest;
        Some(tok)
    }

    fn parse<T: FromStr>(
        &mut self,
        line: usize,
        name: &str,
    ) -> Result<T, Error> {
        let tok = self.next_token().ok_or_else(|| Error::BadRecord {
            line,
            reason: format!("missing {name}"),
        })?;
        tok.parse().map_err(|_| Error::BadRecord {
            line,
            reason: format!("invalid {name} '{tok}'"),
        })
    }

    fn flag(&mut self, line: usize, name: &str) -> Result<bool, Error> {
        self.parse::<i64>(line, name).map(|v| v != 0)
    }
}

fn parse_equation(line: &str, line_no: usize) -> Result<Equation, Error> {
    let content = match (line.find('"'), line.rfind('"')) {
        (Some(a), Some(b)) if a < b => &line[a + 1..b],
        _ => {
            return Err(Error::BadRecord {
                line: line_no,
                reason: "equation fields must be quoted".to_owned(),
            });
        }
    };
    let mut f = Fields { rest: content };
    let color = [
        f.parse(line_no, "red")?,
        f.parse(line_no, "green")?,
        f.parse(line_no, "blue")?,
    ];
    let sample_size = f.parse(line_no, "sample size")?;
    let domain = Domain {
        min_x: f.parse(line_no, "min x")?,
        max_x: f.parse(line_no, "max x")?,
        min_y: f.parse(line_no, "min y")?,
        max_y: f.parse(line_no, "max y")?,
    };
    let is_visible = f.flag(line_no, "visibility flag")?;
    let is_3d = f.flag(line_no, "3D flag")?;

    let mut eq = Equation::new(f.rest.trim());
    eq.color = color;
    eq.sample_size = sample_size;
    eq.domain = domain;
    eq.is_visible = is_visible;
    eq.set_3d(is_3d);
    Ok(eq)
}

fn parse_point(mut f: Fields, line_no: usize) -> Result<Point, Error> {
    let position = [
        f.parse(line_no, "x")?,
        f.parse(line_no, "y")?,
        f.parse(line_no, "z")?,
    ];
    let color = [
        f.parse(line_no, "red")?,
        f.parse(line_no, "green")?,
        f.parse(line_no, "blue")?,
    ];
    if let Some(tok) = f.next_token() {
        return Err(Error::BadRecord {
            line: line_no,
            reason: format!("unexpected trailing data '{tok}'"),
        });
    }
    Ok(Point { position, color })
}

impl Scene {
    /// Writes this scene to a file, returning the path that was written
    ///
    /// The `.mat` extension is appended if `path` doesn't already have it.
    pub fn export<P: AsRef<Path>>(&self, path: P) -> Result<PathBuf, Error> {
        let path = with_extension(path.as_ref());
        let mut out = BufWriter::new(std::fs::File::create(&path)?);
        write_scene(self, &mut out)?;
        out.flush()?;
        info!(
            "exported {} equations and {} points to {path:?}",
            self.equations.len(),
            self.points.len()
        );
        Ok(path)
    }

    /// Reads a scene file, appending its equations and points to this scene
    ///
    /// The file is parsed completely before anything is added, so a
    /// malformed file leaves the scene unchanged.  Returns the number of
    /// equations and points that were added.
    pub fn import<P: AsRef<Path>>(
        &mut self,
        path: P,
    ) -> Result<(usize, usize), Error> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        let (equations, points) = read_scene(BufReader::new(file))?;
        let counts = (equations.len(), points.len());
        info!(
            "imported {} equations and {} points from {path:?}",
            counts.0, counts.1
        );
        self.equations.extend(equations);
        self.points.extend(points);
        Ok(counts)
    }
}

fn with_extension(path: &Path) -> PathBuf {
    if path.extension().is_some_and(|e| e == EXTENSION) {
        path.to_owned()
    } else {
        let mut s = path.as_os_str().to_owned();
        s.push(".");
        s.push(EXTENSION);
        PathBuf::from(s)
    }
}
