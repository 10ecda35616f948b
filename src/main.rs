use clap::{Parser, Subcommand};
use cropwise::config::{self, Config};
use cropwise::imaging::{
    AdjustmentRequest, Area, DEFAULT_ADJUSTMENT, Raster, identify, load_image, save_image,
};
use cropwise::{batch, mime, output};
use std::path::PathBuf;

/// Flags that describe one adjustment request.
#[derive(clap::Args, Clone, Default)]
struct SizingArgs {
    /// Named preset from config.toml; other sizing flags override its values
    #[arg(long)]
    preset: Option<String>,

    /// Adjustment to apply: fit, crop, fill or a configured alias.
    /// Unknown names fall back to fit.
    #[arg(long, short = 'a')]
    adjustment: Option<String>,

    /// Requested width in pixels
    #[arg(long, short = 'W')]
    width: Option<u32>,

    /// Requested height in pixels
    #[arg(long, short = 'H')]
    height: Option<u32>,

    /// Upper bound for the width when --width is omitted
    #[arg(long)]
    max_width: Option<u32>,

    /// Upper bound for the height when --height is omitted
    #[arg(long)]
    max_height: Option<u32>,
}

#[derive(Parser)]
#[command(name = "cropwise")]
#[command(about = "Fit, crop and fill images around their areas of interest")]
#[command(long_about = "\
Fit, crop and fill images around their areas of interest

Adjustments:

  fit   Resize to fit inside the requested box, keeping the aspect ratio.
        With one side given, the other follows the ratio and --max-* bounds it.
  crop  Cut a window of the requested size out of the image. With --area the
        window is placed to lose as little of the areas as possible;
        without areas it is centered.
  fill  Crop to the requested aspect ratio (honoring areas), then resize to
        the requested size.

Areas are given as x1,y1,x2,y2 or x1,y1,x2,y2:priority in source pixels.
For `batch`, areas come from a sidecar next to each image:

  photos/001-dawn.jpg
  photos/001-dawn.jpg.areas.json   # [{\"x1\": 10, \"y1\": 20, \"x2\": 200, \"y2\": 180}]

Run 'cropwise gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Directory containing config.toml
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the size an adjustment would produce, without decoding pixels
    Calculate {
        /// Source image
        image: PathBuf,
        #[command(flatten)]
        sizing: SizingArgs,
    },
    /// Adjust one image and write the result
    Adjust {
        /// Source image
        image: PathBuf,
        /// Output file; the format follows its extension unless --format is given
        #[arg(long, short = 'o')]
        output: PathBuf,
        #[command(flatten)]
        sizing: SizingArgs,
        /// Area of interest: x1,y1,x2,y2[:priority] (repeatable)
        #[arg(long = "area")]
        areas: Vec<Area>,
        /// Output format as an extension (.png) or MIME type (image/png)
        #[arg(long)]
        format: Option<String>,
    },
    /// Apply a preset to every image under a directory
    Batch {
        /// Directory to scan for images
        source: PathBuf,
        /// Directory for adjusted images and manifest.json
        output: PathBuf,
        /// Preset from config.toml
        #[arg(long)]
        preset: String,
    },
    /// Resolve a file extension or MIME type to a MIME type
    Mime {
        /// Extension (.jpg), file name (photo.JPG) or MIME type (image/png)
        value: String,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Calculate { image, sizing } => {
            let config = config::load_config(&cli.config_dir)?;
            let (slug, request) = resolve_request(&config, &sizing)?;
            request.validate()?;
            let kind = config.registry()?.lookup(&slug);
            let original = identify(&image)?;
            let calculated = kind.calculate(original, &request);
            output::print_calculation(&image, kind, original, calculated);
        }
        Command::Adjust {
            image,
            output: output_path,
            sizing,
            areas,
            format,
        } => {
            let config = config::load_config(&cli.config_dir)?;
            let (slug, request) = resolve_request(&config, &sizing)?;
            let area_count = areas.len();
            let request = request.with_areas(areas);
            let format = match format.as_deref() {
                Some(value) => Some(mime::image_format_for(value)?),
                None => config.output.image_format()?,
            };

            let source = load_image(&image)?;
            let original = Raster::dimensions(&source);
            let adjustment = config.registry()?.get_adjustment(&slug, &source, request)?;
            let kind = adjustment.kind();
            let adjusted = adjustment.into_adjusted();
            save_image(&adjusted, &output_path, format, config.output.quality())?;

            output::print_adjustment(
                &image,
                &output_path,
                kind,
                original,
                Raster::dimensions(&adjusted),
                area_count,
            );
        }
        Command::Batch {
            source,
            output: output_dir,
            preset,
        } => {
            let config = config::load_config(&cli.config_dir)?;
            init_thread_pool(&config.processing);
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = batch::batch(&source, &output_dir, &preset, &config, Some(tx));
            printer.join().map_err(|_| "output thread panicked")?;
            let manifest = result?;
            output::print_batch_summary(&manifest, &output_dir);
        }
        Command::Mime { value } => {
            let mime = mime::convert_filetype(&value)?;
            println!("{}", output::format_mime(&value, mime));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Adjustment slug and request from `--preset` plus explicit sizing flags.
fn resolve_request(
    config: &Config,
    sizing: &SizingArgs,
) -> Result<(String, AdjustmentRequest), config::ConfigError> {
    let (slug, base) = match &sizing.preset {
        Some(name) => {
            let preset = config.preset(name)?;
            (preset.adjustment.clone(), preset.request())
        }
        None => (DEFAULT_ADJUSTMENT.to_string(), AdjustmentRequest::default()),
    };
    let request = AdjustmentRequest {
        width: sizing.width.or(base.width),
        height: sizing.height.or(base.height),
        max_width: sizing.max_width.or(base.max_width),
        max_height: sizing.max_height.or(base.max_height),
        areas: Vec::new(),
    };
    Ok((sizing.adjustment.clone().unwrap_or(slug), request))
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores; config can only lower it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
