use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use log::{debug, info};

use rangefix::adjust::NEAR_EQUAL_ULPS;
use rangefix::{
    adjust_range, adjust_range_for_log, almost_equal, render, sanitize_name, Field, Scale,
};

#[derive(Parser)]
#[clap(version, about = "Fix up data ranges before they drive a color map or an axis")]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Widen a degenerate range, or make it usable on a log scale
    Adjust {
        #[clap(allow_hyphen_values = true)]
        low: f64,

        #[clap(allow_hyphen_values = true)]
        high: f64,

        /// Make the range log safe instead of widening it
        #[clap(long)]
        log: bool,
    },

    /// Check whether two values are within a number of ULPs of each other
    AlmostEqual {
        #[clap(allow_hyphen_values = true)]
        low: f64,

        #[clap(allow_hyphen_values = true)]
        high: f64,

        #[clap(long, default_value_t = NEAR_EQUAL_ULPS)]
        ulps: i32,
    },

    /// Render a whitespace separated grid of samples as a grayscale png
    Render {
        input: PathBuf,

        /// Map samples on a log scale
        #[clap(long)]
        log: bool,

        /// Name of the rendered field, defaults to the input file stem
        #[clap(long)]
        name: Option<String>,

        #[clap(long, default_value = ".")]
        out_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    let stdout = std::io::stdout();
    let mut stdout = stdout.lock();

    match cli.command {
        Command::Adjust { low, high, log } => {
            let mut range = [low, high];
            let changed = if log {
                ensure!(low <= high, "low ({}) must not exceed high ({})", low, high);
                adjust_range_for_log(&mut range)
            } else {
                adjust_range(&mut range)
            };

            writeln!(stdout, "{} {}", range[0], range[1])?;
            writeln!(stdout, "changed: {}", changed)?;
        }

        Command::AlmostEqual { low, high, ulps } => {
            writeln!(stdout, "{}", almost_equal(&[low, high], ulps))?;
        }

        Command::Render {
            input,
            log,
            name,
            out_dir,
        } => {
            let scale = if log { Scale::Log } else { Scale::Linear };
            let path = render_field(&input, scale, name.as_deref(), &out_dir)?;
            writeln!(stdout, "{}", path.display())?;
        }
    }

    Ok(())
}

fn render_field(
    input: &Path,
    scale: Scale,
    name: Option<&str>,
    out_dir: &Path,
) -> Result<PathBuf> {
    let start_ts = Instant::now();

    let text = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let field =
        Field::parse(&text).with_context(|| format!("failed to parse {}", input.display()))?;

    let (range, changed) = field.range().prepared(scale);
    if changed {
        info!(
            "range {:?} adjusted to [{}, {}] for {:?} scale",
            field.range(),
            range.low(),
            range.high(),
            scale
        );
    }

    let stem = name
        .map(str::to_string)
        .or_else(|| {
            input
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
        })
        .unwrap_or_default();
    let mut file_name = sanitize_name(&stem);
    if file_name.is_empty() {
        file_name = "field".to_string();
    }

    if !out_dir.exists() {
        fs::create_dir_all(out_dir)
            .with_context(|| format!("failed to create {}", out_dir.display()))?;
    }

    let path = out_dir.join(format!("{}.png", file_name));
    let img = render::render(&field, range, scale);
    img.save(&path)
        .with_context(|| format!("failed to write {}", path.display()))?;

    debug!(
        "rendered {}x{} field in {} ms",
        field.width(),
        field.height(),
        start_ts.elapsed().as_millis()
    );

    Ok(path)
}
