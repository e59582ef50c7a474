use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use tracing_subscriber::EnvFilter;

use gpx_art::config;
use gpx_art::export::{detect_format, export, export_multiple};
use gpx_art::markers::DistanceUnit;
use gpx_art::options::{ArtOptions, ExportFormat, LineStyle, OverlayField, OverlayPosition, Thickness};
use gpx_art::summary::{format_bounds, format_distance, format_duration, format_elevation};
use gpx_art::validate::ValidationReport;
use gpx_art::{Route, route_from_gpx};

#[derive(Parser, Debug)]
#[command(name = "gpx-art", author, version, about = "Turn GPX tracks into minimalist route artwork", long_about = None)]
struct Cli {
    /// Configuration file. Command-line flags override its values.
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a GPX file to PNG, SVG or GeoJSON artwork
    Convert(ConvertArgs),
    /// Show route statistics
    Info(InputArgs),
    /// Check a GPX file for problems
    Validate(InputArgs),
    /// Write a configuration file holding every default
    InitConfig(InitConfigArgs),
}

#[derive(Args, Debug)]
struct InputArgs {
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,
}

#[derive(Args, Debug)]
struct InitConfigArgs {
    /// Defaults to ~/.gpx-art/config.yml
    #[arg(long, value_hint = ValueHint::FilePath)]
    path: Option<PathBuf>,

    /// Overwrite an existing file
    #[arg(long, action = ArgAction::SetTrue)]
    force: bool,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Output path; its extension picks the format unless --format is given
    #[arg(value_hint = ValueHint::FilePath)]
    output: PathBuf,

    /// Output formats, comma-separated (png,svg,geojson)
    #[arg(long = "format", value_enum, value_delimiter = ',')]
    formats: Vec<ExportFormat>,

    /// Line color, hex or named
    #[arg(long)]
    color: Option<String>,

    #[arg(long, value_enum)]
    thickness: Option<Thickness>,

    #[arg(long, value_enum)]
    style: Option<LineStyle>,

    /// Resolution in dots per inch
    #[arg(long)]
    dpi: Option<u32>,

    /// Canvas width in inches
    #[arg(long)]
    width: Option<f64>,

    /// Canvas height in inches
    #[arg(long)]
    height: Option<f64>,

    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "no_markers")]
    markers: bool,

    #[arg(long, action = ArgAction::SetTrue)]
    no_markers: bool,

    /// km or miles
    #[arg(long)]
    markers_unit: Option<DistanceUnit>,

    /// Distance between markers, in the marker unit
    #[arg(long)]
    marker_interval: Option<f64>,

    #[arg(long)]
    marker_size: Option<f64>,

    /// Defaults to the line color
    #[arg(long)]
    marker_color: Option<String>,

    #[arg(long)]
    label_font_size: Option<u32>,

    /// Overlay fields, comma-separated
    #[arg(long, value_enum, value_delimiter = ',', conflicts_with = "no_overlay")]
    overlay: Option<Vec<OverlayField>>,

    #[arg(long, action = ArgAction::SetTrue)]
    no_overlay: bool,

    #[arg(long, value_enum)]
    overlay_position: Option<OverlayPosition>,

    #[arg(long)]
    font_size: Option<u32>,

    #[arg(long)]
    font_color: Option<String>,

    #[arg(long, action = ArgAction::SetTrue, conflicts_with = "no_background")]
    background: bool,

    #[arg(long, action = ArgAction::SetTrue)]
    no_background: bool,

    #[arg(long)]
    bg_color: Option<String>,

    /// Overlay background opacity, 0 to 1
    #[arg(long)]
    bg_alpha: Option<f64>,
}

impl ConvertArgs {
    /// Layer flags that were given on top of `opts`.
    fn apply(&self, opts: &mut ArtOptions) {
        fn set<T: Clone>(slot: &mut T, value: &Option<T>) {
            if let Some(v) = value {
                *slot = v.clone();
            }
        }

        set(&mut opts.color, &self.color);
        set(&mut opts.thickness, &self.thickness);
        set(&mut opts.style, &self.style);
        set(&mut opts.export.dpi, &self.dpi);
        set(&mut opts.export.width, &self.width);
        set(&mut opts.export.height, &self.height);
        if !self.formats.is_empty() {
            opts.export.formats = self.formats.clone();
        }

        if self.markers {
            opts.markers.enabled = true;
        }
        if self.no_markers {
            opts.markers.enabled = false;
        }
        set(&mut opts.markers.unit, &self.markers_unit);
        set(&mut opts.markers.interval, &self.marker_interval);
        set(&mut opts.markers.size, &self.marker_size);
        if self.marker_color.is_some() {
            opts.markers.color = self.marker_color.clone();
        }
        set(&mut opts.markers.label_font_size, &self.label_font_size);

        if let Some(fields) = &self.overlay {
            opts.overlay.enabled = !fields.is_empty();
            opts.overlay.fields = fields.clone();
        }
        if self.no_overlay {
            opts.overlay.enabled = false;
        }
        set(&mut opts.overlay.position, &self.overlay_position);
        set(&mut opts.overlay.font_size, &self.font_size);
        set(&mut opts.overlay.font_color, &self.font_color);
        if self.background {
            opts.overlay.background = true;
        }
        if self.no_background {
            opts.overlay.background = false;
        }
        set(&mut opts.overlay.bg_color, &self.bg_color);
        set(&mut opts.overlay.bg_alpha, &self.bg_alpha);
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Command::Convert(args) => handle_convert(cli.config.as_deref(), args),
        Command::Info(args) => handle_info(&args.input),
        Command::Validate(args) => handle_validate(&args.input),
        Command::InitConfig(args) => handle_init_config(args),
    }
}

fn load_options(config_path: Option<&Path>) -> Result<ArtOptions> {
    let path = match config_path {
        Some(path) => {
            if !path.exists() {
                bail!("config file {} does not exist", path.display());
            }
            Some(path.to_path_buf())
        }
        None => config::discover_config_path(),
    };
    match path {
        Some(path) => config::load_config(&path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ArtOptions::default()),
    }
}

fn read_route(input: &Path) -> Result<Route> {
    let xml = fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    route_from_gpx(&xml).with_context(|| format!("failed to parse {}", input.display()))
}

fn handle_convert(config_path: Option<&Path>, args: ConvertArgs) -> Result<ExitCode> {
    let mut opts = load_options(config_path)?;
    args.apply(&mut opts);
    opts.validate().context("invalid options")?;

    let route = read_route(&args.input)?;
    println!("Rendering route...");

    let written = if !args.formats.is_empty() || args.output.extension().is_none() {
        export_multiple(&route, &opts, &args.output, &opts.export.formats)?
    } else {
        let format = detect_format(&args.output)?;
        export(&route, &opts, &args.output, format)?;
        vec![args.output.clone()]
    };

    for path in &written {
        println!("Wrote {}", path.display());
    }
    println!(
        "Style: Color: {}, Thickness: {:?}, Style: {:?}",
        opts.color, opts.thickness, opts.style
    );
    if opts.markers.enabled {
        println!(
            "Markers: Every {} {}, Size: {}, Label size: {}",
            opts.markers.interval, opts.markers.unit, opts.markers.size, opts.markers.label_font_size
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_info(input: &Path) -> Result<ExitCode> {
    let route = read_route(input)?;

    println!("\n=== GPX File Information ===");
    println!("File: {}", display_abs(input));
    println!("Name: {}", route.name().unwrap_or("Unnamed route"));

    println!("\n=== Route Statistics ===");
    println!("Distance: {}", format_distance(route.total_distance()));
    println!("Duration: {}", format_duration(route.total_duration()));

    println!("\n=== Route Structure ===");
    println!("Segments: {}", route.segments().len());
    println!("Points: {}", route.total_points());

    println!("\n=== Elevation Profile ===");
    println!("{}", format_elevation(route.elevation_stats().as_ref()));

    println!("\n=== Geographic Bounds ===");
    println!("{}\n", format_bounds(&route.bounds()));
    Ok(ExitCode::SUCCESS)
}

fn handle_validate(input: &Path) -> Result<ExitCode> {
    let route = read_route(input)?;
    let report = ValidationReport::for_route(&route);

    println!("\n=== GPX Validation Results ===");
    println!("File: {}", display_abs(input));

    if report.is_valid() {
        println!("\n✓ GPX file is valid");
        println!("No issues found");
        return Ok(ExitCode::SUCCESS);
    }

    println!("\n✗ Found {} issues:", report.issue_count());
    for (title, issues) in report.groups() {
        println!("\n{title}:");
        for issue in issues {
            println!("- {issue}");
        }
    }
    println!("\nFix these issues to ensure proper processing of the GPX file.");
    Ok(ExitCode::FAILURE)
}

fn handle_init_config(args: InitConfigArgs) -> Result<ExitCode> {
    let Some(path) = args.path.or_else(config::home_config_path) else {
        bail!("no home directory found; pass --path");
    };
    config::write_sample_config(&path, args.force)?;
    println!("Created config file at {}", path.display());
    Ok(ExitCode::SUCCESS)
}

fn display_abs(path: &Path) -> String {
    fs::canonicalize(path)
        .unwrap_or_else(|_| path.to_path_buf())
        .display()
        .to_string()
}
