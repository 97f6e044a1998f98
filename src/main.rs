use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use verse_canvas::{
    config::Config,
    overlay::{FontFamily, FontRegistry, TextAlignment, TextColor, TextOverlaySpec, TextPosition},
    raster::{Adjustments, Image, NamedFilter},
    Session,
};

#[derive(Parser)]
#[command(
    name = "verse-canvas",
    version,
    about = "Edit poem artwork and overlay the poem text",
    long_about = "VerseCanvas adjusts the brightness, contrast and blur of generated poem images and can lay the poem over them in a translucent text block. Each input is written to <output-dir>/<stem>_edited.png."
)]
struct Cli {
    /// Images to edit (one to three, PNG or JPEG)
    #[arg(short, long, required = true, num_args = 1..=3)]
    input: Vec<PathBuf>,

    /// Directory for the edited PNG files
    #[arg(short, long, default_value = ".")]
    output_dir: PathBuf,

    /// Brightness factor (0.1 - 2.0)
    #[arg(long, default_value_t = 1.0)]
    brightness: f32,

    /// Contrast factor (0.1 - 2.0)
    #[arg(long, default_value_t = 1.0)]
    contrast: f32,

    /// Blur level (0 - 5)
    #[arg(long, default_value_t = 0)]
    blur: u8,

    /// Saturation factor (0.0 = grayscale, 2.0 = vivid)
    #[arg(long, default_value_t = 1.0)]
    saturation: f32,

    /// Gamma correction (0.1 - 3.0, below 1.0 brightens)
    #[arg(long, default_value_t = 1.0)]
    gamma: f32,

    /// Sharpness factor (0.0 = soft, 2.0 = crisp)
    #[arg(long, default_value_t = 1.0)]
    sharpness: f32,

    /// Convolution filter applied after blur
    #[arg(long, value_enum)]
    filter: Option<NamedFilter>,

    /// Vignette strength (0.0 - 1.0)
    #[arg(long, default_value_t = 0.0)]
    vignette: f32,

    /// Poem text to overlay
    #[arg(short, long, conflicts_with = "text_file")]
    text: Option<String>,

    /// Read the poem text from a file
    #[arg(long)]
    text_file: Option<PathBuf>,

    /// Font family for the overlay
    #[arg(long, value_enum, default_value_t = FontFamily::Serif)]
    font: FontFamily,

    /// Font size in pixels (16 - 48)
    #[arg(long, default_value_t = 24)]
    font_size: u32,

    /// Text color
    #[arg(long, value_enum, default_value_t = TextColor::White)]
    color: TextColor,

    /// Where the text block goes
    #[arg(long, value_enum, default_value_t = TextPosition::Center)]
    position: TextPosition,

    /// Alignment of lines inside the text block
    #[arg(long, value_enum, default_value_t = TextAlignment::Center)]
    align: TextAlignment,

    /// Opacity of the box behind the text, in percent
    #[arg(long, default_value_t = 70)]
    background_opacity: u8,

    /// Configuration file (optional)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting VerseCanvas v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = match &cli.config {
        Some(config_path) => {
            info!("Loading configuration from {:?}", config_path);
            Config::from_file(config_path)?
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };

    let adjustments = Adjustments::new(cli.brightness, cli.contrast, cli.blur)?
        .with_saturation(cli.saturation)?
        .with_gamma(cli.gamma)?
        .with_sharpness(cli.sharpness)?
        .with_filter(cli.filter)
        .with_vignette(cli.vignette)?;
    let overlay = build_overlay(&cli)?;

    let originals = cli
        .input
        .iter()
        .map(|path| Image::open(path).with_context(|| format!("Failed to load image {:?}", path)))
        .collect::<Result<Vec<_>>>()?;

    // Font discovery is only worth paying for when text is drawn
    let fonts = if overlay.is_noop() {
        FontRegistry::empty()
    } else {
        FontRegistry::new(&config.fonts, config.overlay.font_fallback)
    };

    let mut session = Session::new(originals, Arc::new(fonts), &config)?;

    std::fs::create_dir_all(&cli.output_dir)
        .with_context(|| format!("Failed to create output directory {:?}", cli.output_dir))?;

    for (index, input) in cli.input.iter().enumerate() {
        if let Err(e) = session.apply(index, adjustments, overlay.clone()) {
            warn!("{}", e.user_message());
            return Err(e.into());
        }

        let output = output_path(&cli.output_dir, input);
        session.save_png(index, &output)?;
        info!("Wrote {:?}", output);
    }

    info!("Edited {} image(s)", session.len());
    Ok(())
}

fn build_overlay(cli: &Cli) -> Result<TextOverlaySpec> {
    let text = match (&cli.text, &cli.text_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read poem from {:?}", path))?,
        (None, None) => return Ok(TextOverlaySpec::disabled()),
    };

    let spec = TextOverlaySpec::new(text.trim_end())
        .with_font(cli.font)
        .with_font_size(cli.font_size)?
        .with_color(cli.color)
        .with_position(cli.position)
        .with_alignment(cli.align)
        .with_background_opacity(cli.background_opacity)?;

    Ok(spec)
}

fn output_path(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    output_dir.join(format!("{}_edited.png", stem))
}
