mod picker;
mod viewer;

use anyhow::{Context, Result};
use clap::Parser;
use dark_centroid::pipeline::{MarkPipeline, PipelineConfig};
use std::io;
use std::path::PathBuf;
use viewer::Viewer;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Mark the centroid of the dark pixels in a PNG with a red crosshair"
)]
struct Args {
    /// PNG to mark. Prompted for on stdin when omitted.
    input: Option<PathBuf>,

    /// Write the marked image here instead of next to the input.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Prefix for the derived output file name.
    #[arg(long, default_value = dark_centroid::core_modules::naming::DEFAULT_OUTPUT_PREFIX)]
    prefix: String,

    /// Decoder allocation limit in bytes (0 disables the limit).
    #[arg(long, default_value_t = dark_centroid::core_modules::decoder::DEFAULT_MAX_DECODE_ALLOC)]
    max_decode_alloc: u64,

    /// Application used to show the result instead of the desktop default.
    #[arg(long)]
    viewer: Option<String>,

    /// Do not open the result after writing it.
    #[arg(long)]
    no_view: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_writer(io::stderr).init();

    // --- 1. Argument Parsing & Input Selection ---
    let args = Args::parse();
    let input = match args.input {
        Some(path) => {
            picker::validate(path.as_os_str())?;
            path
        }
        None => picker::pick_from(io::stdin().lock(), io::stdout())?,
    };

    // --- 2. Pipeline Initialization ---
    let config = PipelineConfig {
        output_prefix: args.prefix,
        max_decode_alloc: (args.max_decode_alloc > 0).then_some(args.max_decode_alloc),
    };
    let pipeline = MarkPipeline::new(config);

    // --- 3. Decode, Mark, Encode ---
    let report = match &args.output {
        Some(output) => pipeline.run_to(&input, output),
        None => pipeline.run(&input),
    }
    .with_context(|| format!("cannot mark {}", input.display()))?;

    println!(
        "The geometric center of the image is x:{}, y:{}",
        report.centroid.x, report.centroid.y
    );
    tracing::info!("Output saved to {}", report.output.display());

    // --- 4. Show The Result ---
    // The file is already written; a viewer that fails to start is not fatal.
    let viewer = Viewer::from_args(args.no_view, args.viewer);
    if let Err(e) = viewer.launch(&report.output) {
        tracing::warn!("Failed to open viewer: {:#}", e);
    }

    Ok(())
}
