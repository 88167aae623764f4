use clap::{Parser, Subcommand};
use font_delivery::build::{self, BuildContext};
use font_delivery::config::{self, BuildConfig};
use font_delivery::naming::OutputLayout;
use font_delivery::tools::CommandInvoker;
use font_delivery::types::FontFamily;
use font_delivery::{collect, emit, output};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "font-delivery")]
#[command(about = "Build a static web-font catalog from font metadata")]
#[command(long_about = "\
Build a static web-font catalog from font metadata

Reads every METADATA.pb under the input directory and produces subsetted
WOFF2 binaries, @font-face stylesheets and JSON indexes for a static host.

Input structure:

  fonts/
  ├── ofl/
  │   └── alegreyasans/            # lower-cased family name, spaces removed
  │       ├── METADATA.pb          # family record (protobuf text format)
  │       ├── OFL.txt              # license text, copied to licenses/<id>-LICENSE.txt
  │       └── AlegreyaSans-Thin.ttf
  └── apache/                      # license tag APACHE2
      └── ...

Output structure:

  out/api/v2/
  ├── fonts.json                   # catalog index
  ├── subsets.json                 # subset → unicode-range table
  ├── fonts/
  │   ├── alegreya-sans.json       # per-family detail
  │   ├── alegreya-sans.css        # @font-face rules
  │   └── alegreya-sans_latin_100_normal.woff2
  └── licenses/
      └── alegreya-sans-LICENSE.txt

External tools (configurable): hb-subset, woff2_compress.

Run 'font-delivery gen-config' to generate a documented font-delivery.toml.")]
#[command(version)]
struct Cli {
    /// Directory holding <license>/<family>/METADATA.pb and font sources
    #[arg(long, default_value = "fonts", global = true)]
    input_dir: PathBuf,

    /// Output directory
    #[arg(long, default_value = "out", global = true)]
    output_dir: PathBuf,

    /// Directory for scratch files (range lists, intermediate subsets)
    #[arg(long, default_value = "tmp", global = true)]
    temp_dir: PathBuf,

    /// Config file (default: ./font-delivery.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Collect family metadata and print the catalog
    Collect,
    /// Write fonts.json, subsets.json and per-family JSON and CSS
    Emit,
    /// Subset and compress every font, and copy licenses
    Fonts,
    /// Run the full pipeline: emit → fonts
    Build,
    /// Print a stock font-delivery.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let cwd = std::env::current_dir()?;
    let config = config::load_config(cli.config.as_deref(), &cwd)?;
    log::debug!("effective config: {config:?}");

    println!("==> Collecting {}", cli.input_dir.display());
    let families = collect::collect(&cli.input_dir, &config.ignored_families)?;

    match cli.command {
        Command::Collect => {
            output::print_collect_output(&families, &config.subsets);
        }
        Command::Emit => {
            run_emit(&cli, &config, &families)?;
        }
        Command::Fonts => {
            run_fonts(&cli, &config, &families)?;
        }
        Command::Build => {
            run_emit(&cli, &config, &families)?;
            run_fonts(&cli, &config, &families)?;
            println!("==> Build complete: {}", cli.output_dir.display());
        }
        Command::GenConfig => {}
    }

    Ok(())
}

fn layout(cli: &Cli, config: &BuildConfig) -> OutputLayout {
    OutputLayout::new(&cli.output_dir, &config.api_version)
}

fn run_emit(
    cli: &Cli,
    config: &BuildConfig,
    families: &[FontFamily],
) -> Result<(), Box<dyn std::error::Error>> {
    println!("==> Emitting indexes and stylesheets");
    let summary = emit::emit(families, &config.subsets, &config.css, &layout(cli, config))?;
    output::print_emit_output(&summary, &cli.output_dir);
    Ok(())
}

fn run_fonts(
    cli: &Cli,
    config: &BuildConfig,
    families: &[FontFamily],
) -> Result<(), Box<dyn std::error::Error>> {
    let threads = config::effective_threads(&config.processing);
    println!("==> Building fonts ({threads} workers)");

    let ctx = BuildContext {
        input_dir: cli.input_dir.clone(),
        temp_dir: cli.temp_dir.clone(),
        layout: layout(cli, config),
        subsets: config.subsets.clone(),
        copy_licenses: config.licenses.copy,
    };
    let invoker = CommandInvoker::new(&config.tools.subsetter, &config.tools.compressor);

    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_build_event(&event) {
                println!("{}", line);
            }
        }
    });
    // The sender moves into build_all and is dropped when it returns,
    // which ends the printer loop.
    let result = build::build_all(&invoker, families, &ctx, threads, Some(tx));
    let _ = printer.join();

    output::print_build_summary(&result?);
    Ok(())
}
