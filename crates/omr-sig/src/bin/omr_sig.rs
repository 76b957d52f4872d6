use clap::Parser;
use omr_sig::core::{init_with_directives, LogDirectives};
use omr_sig::{SheetConfig, SheetInput, SheetProcessor};
use std::path::PathBuf;

/// Resolve dot glyphs and stitch slurs of a sheet described in JSON.
#[derive(Parser, Debug)]
#[command(name = "omr-sig", version)]
struct Args {
    /// Sheet input JSON.
    #[arg(long, value_name = "FILE")]
    input: PathBuf,

    /// Configuration JSON, defaults when omitted.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Report JSON, printed to stdout when omitted.
    #[arg(long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Log directives: a level (off, error, warn, info, debug, trace),
    /// optionally followed by module overrides such as `stitch=debug`.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Emit JSON logs through `tracing` (needs the `tracing` feature).
    #[arg(long)]
    json_log: bool,
}

fn init_logging(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    #[cfg(feature = "tracing")]
    {
        if args.json_log {
            omr_sig::init_tracing(&args.log_level, true);
            return Ok(());
        }
    }
    #[cfg(not(feature = "tracing"))]
    {
        if args.json_log {
            eprintln!("--json-log needs the `tracing` feature, using plain logs");
        }
    }

    let directives: LogDirectives = args.log_level.parse()?;
    init_with_directives(directives)?;
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(&args)?;

    let config = match &args.config {
        Some(path) => SheetConfig::load_json(path)?,
        None => SheetConfig::default(),
    };
    let input = SheetInput::load_json(&args.input)?;
    let sheet = SheetProcessor::new(config).process(input)?;

    match &args.output {
        Some(path) => {
            sheet.report.write_json(path)?;
            println!("wrote report to {}", path.display());
        }
        None => println!("{}", sheet.report.to_json()?),
    }
    Ok(())
}
