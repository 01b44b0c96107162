use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use continuous_canvas::Config;
use continuous_canvas::draw::{Bounds, Frame, LayerRenderer};
use std::io::Read;
use std::path::{Path, PathBuf};

const VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("CONTINUOUS_CANVAS_GIT_HASH"),
    ")"
);

#[derive(Parser, Debug)]
#[command(name = "continuous-canvas")]
#[command(version = VERSION, about = "Render layered agent portrayals onto a raster canvas")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one portrayal frame (JSON) to a PNG image
    Render(RenderArgs),

    /// Write the documented default config to ~/.config/continuous-canvas/config.toml
    InitConfig,

    /// Print the JSON schema of the config file
    Schema,
}

#[derive(Args, Debug)]
struct RenderArgs {
    /// Frame file: a map of layer keys to portrayal arrays, or a flat array.
    /// Use "-" to read from stdin
    #[arg(value_name = "FRAME")]
    frame: PathBuf,

    /// Where to write the PNG
    #[arg(long, short = 'o', value_name = "PNG")]
    output: PathBuf,

    /// Config file to use instead of ~/.config/continuous-canvas/config.toml
    #[arg(long, short = 'c', value_name = "PATH")]
    config: Option<PathBuf>,

    /// Canvas width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Canvas height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Logical bounds of the model space
    #[arg(
        long,
        value_name = "MIN_X,MAX_X,MIN_Y,MAX_Y",
        value_parser = parse_bounds,
        allow_hyphen_values = true
    )]
    bounds: Option<Bounds>,

    /// Directory custom shape images are loaded from
    #[arg(long, value_name = "DIR")]
    image_dir: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Render(args) => render(args),
        Command::InitConfig => {
            let path = Config::create_default_file()?;
            println!("Wrote default config to {}", path.display());
            Ok(())
        }
        Command::Schema => {
            let schema = Config::json_schema();
            println!("{}", serde_json::to_string_pretty(&schema)?);
            Ok(())
        }
    }
}

fn render(args: RenderArgs) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    if let Some(width) = args.width {
        config.canvas.width = width;
    }
    if let Some(height) = args.height {
        config.canvas.height = height;
    }
    if let Some(bounds) = args.bounds {
        config.canvas.min_x = bounds.min_x;
        config.canvas.max_x = bounds.max_x;
        config.canvas.min_y = bounds.min_y;
        config.canvas.max_y = bounds.max_y;
    }
    if let Some(dir) = args.image_dir {
        config.images.directory = dir;
    }
    config.validate_and_clamp();

    let json = read_frame(&args.frame)?;
    let frame = Frame::from_json(&json)
        .with_context(|| format!("Failed to parse frame from {}", args.frame.display()))?;
    log::info!(
        "Rendering {} portrayals in {} layers at {}x{}",
        frame.portrayal_count(),
        frame.layers().len(),
        config.canvas.width,
        config.canvas.height
    );

    let runtime = tokio::runtime::Runtime::new()
        .context("Failed to create Tokio runtime for image loading")?;
    let mut renderer = LayerRenderer::new(config.mapper(), config.render_options(), runtime.handle())
        .context("Failed to create canvas")?;

    renderer.render(&frame);
    let painted = renderer.finish_images();
    if painted > 0 {
        log::debug!("Painted {} custom images", painted);
    }

    renderer.surface().write_png(&args.output)?;
    log::info!("Wrote {}", args.output.display());
    Ok(())
}

fn read_frame(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut json = String::new();
        std::io::stdin()
            .read_to_string(&mut json)
            .context("Failed to read frame from stdin")?;
        return Ok(json);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read frame from {}", path.display()))
}

fn parse_bounds(value: &str) -> Result<Bounds, String> {
    let parts = value
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .map_err(|err| format!("invalid number in bounds: {err}"))?;

    match parts.as_slice() {
        &[min_x, max_x, min_y, max_y] => Ok(Bounds::new(min_x, max_x, min_y, max_y)),
        _ => Err(format!(
            "expected MIN_X,MAX_X,MIN_Y,MAX_Y, got {} values",
            parts.len()
        )),
    }
}
