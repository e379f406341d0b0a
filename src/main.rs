use clap::Parser;
use std::{env, sync::Arc};
use tracing::{error, info};
use tracing_subscriber::{fmt::format::FmtSpan, EnvFilter};

use skd::{
    error::Result,
    extension::{BUILTIN_VERSION, LAYOUT},
    Database, DatabaseFile, SkdContext,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Input file path
    file: String,

    /// Parse even if the file does not have the accepted extension
    #[arg(long)]
    force: bool,

    /// Output file path
    #[arg(short, long)]
    output: Option<String>,

    /// Keep top-level blank lines when writing the document back
    #[arg(long)]
    preserve_blank_lines: bool,

    /// Print a summary of the declarations and top-level tags
    #[arg(short, long)]
    summary: bool,

    /// Log everything (same as SKD_VERBOSE=true)
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();

    let verbose = args.verbose
        || env::var("SKD_VERBOSE").is_ok_and(|value| value.eq_ignore_ascii_case("true"));
    let default_filter = if verbose { "trace" } else { "info" };

    // Initialize the default subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false) // Don't show target
        .without_time() // Don't show timestamps
        .with_writer(std::io::stderr)
        .init(); // Initialize the subscriber

    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> Result<()> {
    let context = Arc::new(SkdContext::new()?);
    if args.preserve_blank_lines {
        context.load_extension(LAYOUT, BUILTIN_VERSION)?;
    }

    info!("Reading file: {}", args.file);
    let config = context.service()?.parser_config();
    let source = DatabaseFile::new(&args.file).accepting(config.accepted_extension);
    let mut parser = context.parser(Box::new(source))?;
    parser.init(args.force)?;
    let database = parser.read()?;

    if args.summary {
        print_summary(&database);
    }

    // Write to file or print to stdout
    if let Some(output_path) = args.output {
        if !parser.write(&database, &DatabaseFile::new(&output_path))? {
            error!("Destination {} is not writable", output_path);
        }
    } else if !args.summary {
        print!("{}", database);
    }

    Ok(())
}

fn print_summary(database: &Database) {
    println!("doctype: {}", database.doctype().stylesheet());
    println!("version: {}", database.version().version());
    println!("variant: {}", database.variant());

    let tags: Vec<_> = match (database.structure(), database.main_tag()) {
        (Ok(structure), _) => structure.tags().collect(),
        (Err(_), Ok(tag)) => vec![tag],
        (Err(_), Err(_)) => Vec::new(),
    };
    for tag in tags {
        println!(
            "- {} ({}, {} children, {} properties)",
            tag.name(),
            tag.variant(),
            tag.children().len(),
            tag.properties().len()
        );
    }
}
