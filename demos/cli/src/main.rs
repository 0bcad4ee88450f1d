use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Result, bail};
use clap::{Parser, Subcommand};
use env_logger::Env;
use log::{info, warn};

use graphgl::{
    equation::Equation,
    eval::Expression,
    mesh::{self, Domain, HeightRange},
    sample::SampleSettings,
    scene::Scene,
    var::Arity,
};

/// Function plotter back end
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Args {
    #[clap(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Evaluates an expression at a single point
    Eval {
        /// Expression text
        #[clap(allow_hyphen_values = true)]
        expr: String,

        /// X coordinate
        #[clap(short, default_value_t = 0.0, allow_negative_numbers = true)]
        x: f64,

        /// Y coordinate (evaluates as a surface when given)
        #[clap(short, allow_negative_numbers = true)]
        y: Option<f64>,
    },

    /// Generates geometry for a single expression
    Generate {
        /// Expression text
        #[clap(allow_hyphen_values = true)]
        expr: String,

        /// Treat the expression as a surface `z = f(x, y)`
        #[clap(long)]
        surface: bool,

        /// Generate triangle indices (surfaces only)
        #[clap(long, requires = "surface")]
        mesh: bool,

        #[clap(flatten)]
        domain: DomainSettings,

        #[clap(flatten)]
        sampling: SampleArgs,

        /// Name of a `.stl` file to write
        #[clap(short, long)]
        out: Option<PathBuf>,

        /// Number of times to generate (for benchmarking)
        #[clap(
            short = 'N',
            default_value_t = 1,
            value_parser = clap::value_parser!(u64).range(1..)
        )]
        n: u64,
    },

    /// Loads a `.mat` scene and renders every equation
    Scene {
        /// Input file
        #[clap(short, long)]
        input: PathBuf,

        /// Name of a `.mat` file to write after rendering
        #[clap(short, long)]
        out: Option<PathBuf>,

        #[clap(flatten)]
        sampling: SampleArgs,
    },
}

#[derive(Parser)]
struct DomainSettings {
    /// Lower bound on the X axis
    #[clap(long, default_value_t = -25.0, allow_negative_numbers = true)]
    min_x: f64,

    /// Upper bound on the X axis
    #[clap(long, default_value_t = 25.0, allow_negative_numbers = true)]
    max_x: f64,

    /// Lower bound on the Y axis
    #[clap(long, default_value_t = -25.0, allow_negative_numbers = true)]
    min_y: f64,

    /// Upper bound on the Y axis
    #[clap(long, default_value_t = 25.0, allow_negative_numbers = true)]
    max_y: f64,
}

impl From<&DomainSettings> for Domain {
    fn from(d: &DomainSettings) -> Self {
        Domain {
            min_x: d.min_x,
            max_x: d.max_x,
            min_y: d.min_y,
            max_y: d.max_y,
        }
    }
}

#[derive(Parser)]
struct SampleArgs {
    /// Maximum subdivision depth per base interval
    #[clap(
        long,
        default_value_t = 6,
        value_parser = clap::value_parser!(u8).range(0..=12)
    )]
    depth: u8,

    /// Slope above which intervals are subdivided
    #[clap(long, default_value_t = 5.0)]
    threshold: f64,

    /// Number of evenly spaced base samples per axis
    #[clap(long, default_value_t = 100)]
    base: usize,
}

impl From<&SampleArgs> for SampleSettings {
    fn from(s: &SampleArgs) -> Self {
        SampleSettings {
            base_count: s.base,
            max_depth: s.depth as usize,
            derivative_threshold: s.threshold,
        }
    }
}

////////////////////////////////////////////////////////////////////////////////

fn main() -> Result<()> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .init();

    let args = Args::parse();
    match args.cmd {
        Command::Eval { expr, x, y } => {
            let arity = Arity::from_3d(y.is_some());
            let f = Expression::compile(&expr, arity)?;
            let v = f.eval(x, y.unwrap_or(0.0));
            println!("{v}");
        }
        Command::Generate {
            expr,
            surface,
            mesh: is_mesh,
            domain,
            sampling,
            out,
            n,
        } => {
            let mut eq = Equation::new(&expr);
            eq.set_3d(surface);
            eq.is_mesh = is_mesh;
            eq.domain = Domain::from(&domain);
            let settings = SampleSettings::from(&sampling);

            let start = Instant::now();
            let f = Expression::compile(eq.expression(), eq.arity())?;
            info!("Compiled expression in {:?}", start.elapsed());

            let start = Instant::now();
            let mut range = HeightRange::new();
            for _ in 0..n {
                (eq.geometry, range) = mesh::generate(&eq, &f, &settings);
            }
            info!(
                "Generated {}x at {:?} ms/iter",
                n,
                start.elapsed().as_micros() as f64 / 1000.0 / (n as f64)
            );
            info!(
                "{} vertices, {} triangles",
                eq.geometry.vertices.len(),
                eq.geometry.triangle_count()
            );
            if range.is_empty() {
                warn!("expression is not finite anywhere in the domain");
            } else {
                info!("height range: [{}, {}]", range.min, range.max);
            }

            if let Some(out) = out {
                if eq.geometry.indices.is_empty() {
                    warn!("geometry has no triangles; use --surface --mesh");
                }
                info!("Writing STL to {out:?}");
                let mut handle = std::fs::File::create(out)?;
                eq.geometry.write_stl(&mut handle)?;
            }
        }
        Command::Scene {
            input,
            out,
            sampling,
        } => {
            let mut scene = Scene::new();
            scene.settings = SampleSettings::from(&sampling);

            let start = Instant::now();
            let (equations, points) = scene.import(&input)?;
            info!("Loaded file in {:?}", start.elapsed());
            if equations == 0 && points == 0 {
                bail!("no equations or points in {input:?}");
            }

            let start = Instant::now();
            let range = scene.render_all();
            info!("Rendered scene in {:?}", start.elapsed());
            for (i, eq) in scene.equations.iter().enumerate() {
                info!(
                    "  [{i}] '{}' ({}): {} vertices, {} triangles",
                    eq.expression(),
                    if eq.is_3d() { "surface" } else { "curve" },
                    eq.geometry.vertices.len(),
                    eq.geometry.triangle_count()
                );
            }
            if !range.is_empty() {
                info!("height range: [{}, {}]", range.min, range.max);
            }

            if let Some(out) = out {
                scene.export(out)?;
            }
        }
    }

    Ok(())
}
