use clap::Parser;
use cliloc::{ConvertOptions, Direction, convert};
use cliloc_cli::{validate_conversion, validate_file_path};
use tracing_subscriber::EnvFilter;

const EXAMPLES: &str = "\
Examples:
  Convert cliloc to csv:
    cliloc cliloc.deu german.csv
  Convert csv to cliloc:
    cliloc german.csv cliloc.deu";

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, after_help = EXAMPLES)]
struct Args {
    /// The input file: a cliloc file such as `cliloc.enu`, or a `.csv` file
    input: String,

    /// The output file to write; its extension must be the other format
    output: String,

    /// Reject CSV flags outside 0-255 instead of truncating them to 8 bits
    #[arg(long)]
    strict_flags: bool,

    /// Print the conversion report as JSON instead of the success line
    #[arg(long)]
    json: bool,

    /// Show debug diagnostics
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only show errors, suppressing warnings
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let args = Args::parse();
    init_tracing(&args);

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing(args: &Args) {
    let default_level = if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "warn"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(args: &Args) -> Result<(), String> {
    validate_file_path(&args.input)?;
    let direction = validate_conversion(&args.input, &args.output)?;

    if !args.json {
        let (from, to) = match direction {
            Direction::BinaryToText => ("cliloc", "csv"),
            Direction::TextToBinary => ("csv", "cliloc"),
        };
        println!("{} ({}) => {} ({}):", args.input, from, args.output, to);
    }

    let options = ConvertOptions::new().with_strict_flags(args.strict_flags);
    let report =
        convert(direction, &args.input, &args.output, &options).map_err(|e| e.to_string())?;

    if args.json {
        let json = serde_json::to_string_pretty(&report)
            .map_err(|e| format!("Error serializing report to JSON: {}", e))?;
        println!("{}", json);
    } else {
        println!("  success.");
    }
    Ok(())
}
