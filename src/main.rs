use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use fractal_engine::{Complex, EngineConfig, Exponent, HeadlessController, Variant};

/// Renders one escape-time raster without a UI and logs a summary.
#[derive(Debug, Parser)]
#[command(name = "fractal-engine")]
#[command(about = "Headless progressive escape-time fractal renderer")]
struct Args {
    /// JSON engine configuration to start from
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(long)]
    width: Option<u32>,

    #[arg(long)]
    height: Option<u32>,

    /// Worker threads; defaults to the available parallelism
    #[arg(long)]
    threads: Option<NonZeroUsize>,

    /// Render the Julia set for this parameter instead of the Mandelbrot set
    #[arg(long, num_args = 2, value_names = ["RE", "IM"], allow_negative_numbers = true)]
    julia: Option<Vec<f64>>,

    /// Integral exponent of the iterated map
    #[arg(long, conflicts_with = "real_exponent")]
    exponent: Option<i32>,

    /// Real exponent of the iterated map
    #[arg(long, allow_negative_numbers = true)]
    real_exponent: Option<f64>,

    /// Iterate the conjugate map
    #[arg(long)]
    conjugate: bool,

    #[arg(long, num_args = 2, value_names = ["RE", "IM"], allow_negative_numbers = true)]
    center: Option<Vec<f64>>,

    /// log10 of the magnification
    #[arg(long, allow_negative_numbers = true)]
    zoom: Option<f64>,

    /// Rotation in degrees
    #[arg(long, allow_negative_numbers = true)]
    angle: Option<f64>,

    #[arg(long)]
    depth: Option<f64>,

    #[arg(long)]
    threshold: Option<f64>,

    /// Stop after the coarse preview pass
    #[arg(long)]
    preview: bool,

    /// Render in a single rayon pass instead of progressively
    #[arg(long)]
    one_shot: bool,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, default_value = "info")]
    log: String,
}

impl Args {
    fn apply(&self, config: &mut EngineConfig) {
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(height) = self.height {
            config.height = height;
        }
        if self.threads.is_some() {
            config.worker_threads = self.threads;
        }

        if let Some(exponent) = self.exponent {
            config.fractal.exponent = Exponent::Integral(exponent);
        }
        if let Some(exponent) = self.real_exponent {
            config.fractal.exponent = Exponent::Real(exponent);
        }
        if let Some([real, imag]) = self.julia.as_deref().and_then(pair) {
            let position = config.position.julia_default_for(config.fractal.exponent.value());
            config.fractal = config.fractal.julia_at(Complex::new(real, imag));
            config.position = position;
        }
        if self.conjugate {
            config.fractal = config.fractal.with_variant(Variant::Conjugate);
        }

        if let Some([real, imag]) = self.center.as_deref().and_then(pair) {
            config.position.center = Complex::new(real, imag);
        }
        if let Some(zoom) = self.zoom {
            config.position.zoom_factor = zoom;
        }
        if let Some(angle) = self.angle {
            config.position.angle = angle;
        }

        if let Some(depth) = self.depth {
            config.settings.calculation_depth = depth;
        }
        if let Some(threshold) = self.threshold {
            config.settings.detail_threshold = threshold;
        }
        if self.preview {
            config.preview = true;
        }
    }
}

fn pair(values: &[f64]) -> Option<[f64; 2]> {
    values.try_into().ok()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&args.log))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut config = match &args.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    args.apply(&mut config);

    let mut controller = HeadlessController::new(&config);
    if args.one_shot {
        controller.run_one_shot()?;
    } else {
        controller.run_progressive()?;
    }

    Ok(())
}
