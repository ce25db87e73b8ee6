use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use raman_map::analysis::baseline;
use raman_map::data::loader::load_grid;
use raman_map::{
    area_heatmap, intensity_slice, BaselineMethod, ChordStrategy, Heatmap, MapperConfig, NearestPolicy,
    ScanLayout, SpectrumGrid,
};

#[derive(Parser)]
#[command(name = "raman-map")]
#[command(about = "Reconstruct heatmaps and image stacks from Raman map spectra", long_about = None)]
struct Cli {
    /// JSON configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Input layout (overrides the config)
    #[arg(long, value_enum, global = true)]
    layout: Option<LayoutArg>,

    /// Keep records with negative wavenumbers
    #[arg(long, global = true)]
    keep_negative: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Integrate a wavenumber window for every spectrum
    Heatmap {
        input: PathBuf,
        /// Lower window bound
        #[arg(long = "from", allow_negative_numbers = true)]
        w_low: f64,
        /// Upper window bound
        #[arg(long = "to", allow_negative_numbers = true)]
        w_high: f64,
        /// Chord subtraction (overrides the config)
        #[arg(long, value_enum)]
        chord: Option<ChordArg>,
        /// Return the lone intensity when only one point is in the window
        #[arg(long)]
        single_point_fallback: bool,
        /// Output CSV (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write one intensity slice per wavenumber
    Slices {
        input: PathBuf,
        #[arg(long)]
        out_dir: PathBuf,
        /// Lookup convention (overrides the config)
        #[arg(long, value_enum)]
        nearest: Option<NearestArg>,
        /// Divide each slice by its maximum
        #[arg(long)]
        normalize: bool,
    },
    /// Remove the baseline of a single spectrum
    Baseline {
        input: PathBuf,
        #[arg(long, allow_negative_numbers = true)]
        x: f64,
        #[arg(long, allow_negative_numbers = true)]
        y: f64,
        #[arg(long, value_enum, default_value = "rubberband")]
        method: MethodArg,
        #[arg(long = "from", allow_negative_numbers = true)]
        w_low: f64,
        #[arg(long = "to", allow_negative_numbers = true)]
        w_high: f64,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the stage columns and their Y values
    Grid { input: PathBuf },
}

#[derive(Clone, Copy, ValueEnum)]
enum LayoutArg {
    Auto,
    Line,
    Area,
}

#[derive(Clone, Copy, ValueEnum)]
enum ChordArg {
    Legacy,
    Geometric,
}

#[derive(Clone, Copy, ValueEnum)]
enum NearestArg {
    Lower,
    Higher,
}

#[derive(Clone, Copy, ValueEnum)]
enum MethodArg {
    Regression,
    Rubberband,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => MapperConfig::from_file(path)?,
        None => MapperConfig::default(),
    };
    if let Some(layout) = cli.layout {
        config.layout = match layout {
            LayoutArg::Auto => ScanLayout::Auto,
            LayoutArg::Line => ScanLayout::LineScan,
            LayoutArg::Area => ScanLayout::AreaScan,
        };
    }
    if cli.keep_negative {
        config.filter_negative_wavenumbers = false;
    }
    log::debug!("configuration: {config:?}");

    match cli.command {
        Command::Heatmap {
            input,
            w_low,
            w_high,
            chord,
            single_point_fallback,
            output,
        } => {
            if let Some(chord) = chord {
                config.integrator.chord_strategy = match chord {
                    ChordArg::Legacy => ChordStrategy::Legacy,
                    ChordArg::Geometric => ChordStrategy::Geometric,
                };
            }
            config.integrator.single_point_fallback |= single_point_fallback;

            let grid = open_grid(&input, &config)?;
            let map = area_heatmap(&grid, w_low, w_high, &config.integrator)
                .with_context(|| format!("heatmap over [{w_low}, {w_high}]"))?;
            write_heatmap(&map, output.as_deref())
        }
        Command::Slices {
            input,
            out_dir,
            nearest,
            normalize,
        } => {
            if let Some(nearest) = nearest {
                config.nearest = match nearest {
                    NearestArg::Lower => NearestPolicy::ExactOrLower,
                    NearestArg::Higher => NearestPolicy::ExactOrHigher,
                };
            }
            config.normalize_slices |= normalize;

            let grid = open_grid(&input, &config)?;
            write_slices(&grid, &out_dir, &config)
        }
        Command::Baseline {
            input,
            x,
            y,
            method,
            w_low,
            w_high,
            output,
        } => {
            let method = match method {
                MethodArg::Regression => BaselineMethod::LinearRegression,
                MethodArg::Rubberband => BaselineMethod::Rubberband,
            };
            let grid = open_grid(&input, &config)?;
            let original = grid.spectrum_at(x, y)?;
            let corrected = baseline::correct(original, w_low, w_high, method)
                .with_context(|| format!("baseline of spectrum ({x}, {y})"))?;

            let mut writer = csv_writer(output.as_deref())?;
            writer.write_record(["wavenumber", "original", "corrected"])?;
            for ((w, i), c) in original.series().zip(corrected.intensities()) {
                writer.write_record([w.to_string(), i.to_string(), c.to_string()])?;
            }
            writer.flush()?;
            Ok(())
        }
        Command::Grid { input } => {
            let grid = open_grid(&input, &config)?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            writeln!(out, "{} columns x {} rows", grid.width(), grid.height())?;
            for &x in grid.columns() {
                let ys = grid.rows_for(x).unwrap_or_default();
                writeln!(out, "X = {x}: {ys:?}")?;
            }
            Ok(())
        }
    }
}

fn open_grid(input: &Path, config: &MapperConfig) -> Result<SpectrumGrid> {
    load_grid(input, config.layout, config.filter_negative_wavenumbers)
        .with_context(|| format!("loading {}", input.display()))
}

/// Slices over the wavenumber axis of the first spectrum, one CSV each,
/// named by wavenumber.
fn write_slices(grid: &SpectrumGrid, out_dir: &Path, config: &MapperConfig) -> Result<()> {
    let axis = grid
        .wavenumber_axis()
        .context("grid holds no spectra")?
        .to_vec();
    std::fs::create_dir_all(out_dir).with_context(|| format!("creating {}", out_dir.display()))?;

    for wavenumber in &axis {
        let mut slice = intensity_slice(grid, *wavenumber, config.nearest)
            .with_context(|| format!("slice at {wavenumber}"))?;
        if config.normalize_slices {
            slice = slice.normalized();
        }
        let path = out_dir.join(format!("{wavenumber}.csv"));
        write_heatmap(&slice, Some(&path))?;
    }
    log::info!("Wrote {} slices to {}", axis.len(), out_dir.display());
    Ok(())
}

fn write_heatmap(map: &Heatmap, output: Option<&Path>) -> Result<()> {
    let mut writer = csv_writer(output)?;
    for row in map.rows() {
        writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

fn csv_writer(output: Option<&Path>) -> Result<csv::Writer<Box<dyn Write>>> {
    let sink: Box<dyn Write> = match output {
        Some(path) => Box::new(
            std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?,
        ),
        None => Box::new(std::io::stdout()),
    };
    Ok(csv::Writer::from_writer(sink))
}
