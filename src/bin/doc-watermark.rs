use std::path::{Path, PathBuf};
use std::process;

use clap::Parser;

use doc_watermark_removal::{
    default_output_path, ProcessOptions, ProcessResult, WatermarkEngine,
};

#[derive(Parser)]
#[command(
    name = "doc-watermark",
    about = "Remove light-gray watermarks from images and PDF documents",
    version,
    after_help = "Simple usage: doc-watermark <file>  (writes {name}_nowatermark.{ext})\n\n\
                  NOTE: Classification is heuristic (brightness + desaturation).\n\
                  Light gray content that is not a watermark may be affected too."
)]
struct Cli {
    /// Input image, PDF, or directory of images
    input: String,

    /// Output file or directory (default: {name}_nowatermark.{ext})
    #[arg(short, long)]
    output: Option<String>,

    /// Brightness threshold for watermark classification (0-255)
    #[arg(short, long, default_value_t = 200)]
    threshold: u8,

    /// Channel-difference tolerance for watermark classification (0-255)
    #[arg(long, default_value_t = 30)]
    tolerance: u8,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all non-error output
    #[arg(short, long)]
    quiet: bool,
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let opts = ProcessOptions {
        threshold: cli.threshold,
        tolerance: cli.tolerance,
        verbose: cli.verbose,
        quiet: cli.quiet,
    };

    let engine = WatermarkEngine::new();

    let input_path = Path::new(&cli.input);
    if !input_path.exists() {
        eprintln!("Error: Input path does not exist: {}", cli.input);
        process::exit(1);
    }

    if !opts.quiet {
        eprintln!(
            "Classifying with threshold {} / tolerance {}",
            opts.threshold, opts.tolerance
        );
        eprintln!();
    }

    let results = if input_path.is_dir() {
        let output_dir = if let Some(o) = &cli.output {
            PathBuf::from(o)
        } else {
            eprintln!("Error: Output directory is required for batch processing");
            eprintln!("Usage: doc-watermark <input_dir> -o <output_dir>");
            process::exit(1);
        };
        engine.process_directory(input_path, &output_dir, &opts)
    } else if is_pdf(input_path) {
        vec![process_pdf(&engine, input_path, cli.output.as_deref(), &opts)]
    } else {
        let output_path = match &cli.output {
            Some(o) => PathBuf::from(o),
            None => default_output_path(input_path),
        };
        vec![engine.process_file(input_path, &output_path, &opts)]
    };

    let mut success_count = 0u32;
    let mut fallback_count = 0u32;
    let mut fail_count = 0u32;

    for r in &results {
        print_result(r, &opts);
        if !r.success {
            fail_count += 1;
        } else if r.fell_back {
            fallback_count += 1;
        } else {
            success_count += 1;
        }
    }

    if results.len() > 1 && !opts.quiet {
        eprintln!();
        eprint!("[Summary] Processed: {success_count}");
        if fallback_count > 0 {
            eprint!(", Copied through: {fallback_count}");
        }
        if fail_count > 0 {
            eprint!(", Failed: {fail_count}");
        }
        eprintln!(" (Total: {})", results.len());
    }

    if fail_count > 0 {
        process::exit(1);
    }
}

#[cfg(feature = "pdf")]
fn process_pdf(
    engine: &WatermarkEngine,
    input: &Path,
    output: Option<&str>,
    opts: &ProcessOptions,
) -> ProcessResult {
    use doc_watermark_removal::{default_pdf_output_path, PdfCleaner};

    let output_path = match output {
        Some(o) => PathBuf::from(o),
        None => default_pdf_output_path(input),
    };
    PdfCleaner::new().process_file(engine, input, &output_path, opts)
}

#[cfg(not(feature = "pdf"))]
fn process_pdf(
    _engine: &WatermarkEngine,
    input: &Path,
    _output: Option<&str>,
    _opts: &ProcessOptions,
) -> ProcessResult {
    ProcessResult {
        path: input.to_path_buf(),
        success: false,
        fell_back: false,
        message: "PDF support is not compiled in (enable the `pdf` feature)".to_string(),
    }
}

fn print_result(result: &ProcessResult, opts: &ProcessOptions) {
    if opts.quiet && result.success {
        return;
    }

    let filename = result.path.file_name().map_or_else(
        || result.path.display().to_string(),
        |f| f.to_string_lossy().to_string(),
    );

    if !result.success {
        eprintln!("[FAIL] {filename}: {}", result.message);
    } else if result.fell_back {
        if !opts.quiet {
            eprintln!("[FALLBACK] {filename}: {}", result.message);
        }
    } else if !opts.quiet {
        eprintln!("[OK] {filename}");
    }

    if opts.verbose && !result.message.is_empty() {
        eprintln!("  -> {}", result.message);
    }
}
