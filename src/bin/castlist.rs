//! castlist CLI
//!
//! Reads an extraction payload, resolves it and prints the characters as JSON.

use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use castlist::extraction::parse_mentions;
use castlist::{
    CastlistError, CastlistResult, ConfigError, EntityResolver, ExtractionError, ResolverConfig,
};

/// Command-line options.
#[derive(Debug, Default)]
struct Options {
    /// Resolver configuration (JSON); built-in defaults when absent.
    config: Option<PathBuf>,
    /// Extraction payload; stdin when absent.
    input: Option<PathBuf>,
    pretty: bool,
    summary: bool,
}

enum Command {
    Run(Options),
    Help,
}

const USAGE: &str = "\
castlist - resolve extracted character mentions into unique characters

USAGE:
    castlist [OPTIONS]

OPTIONS:
    -c, --config <PATH>     Resolver configuration (JSON) [default: built-in]
    -i, --input <PATH>      Extraction payload (JSON) [default: stdin]
        --pretty            Pretty-print the output
        --summary           Print the resolution summary to stderr
    -h, --help              Print help information";

fn parse_args(args: &[String]) -> Result<Command, String> {
    let mut options = Options::default();
    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "-c" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| "--config requires a value".to_string())?;
                options.config = Some(PathBuf::from(value));
                i += 2;
            }
            "--input" | "-i" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| "--input requires a value".to_string())?;
                options.input = Some(PathBuf::from(value));
                i += 2;
            }
            "--pretty" => {
                options.pretty = true;
                i += 1;
            }
            "--summary" => {
                options.summary = true;
                i += 1;
            }
            "--help" | "-h" => return Ok(Command::Help),
            other => return Err(format!("unknown argument: {other}")),
        }
    }
    Ok(Command::Run(options))
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "castlist=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();
}

fn read_payload(input: Option<&PathBuf>) -> Result<String, ExtractionError> {
    match input {
        Some(path) => std::fs::read_to_string(path).map_err(|e| ExtractionError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        }),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| ExtractionError::Io {
                    path: "<stdin>".to_string(),
                    message: e.to_string(),
                })?;
            Ok(buf)
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    // Output types are plain data with string keys; serialization cannot fail.
    rendered.unwrap_or_default()
}

fn run(options: &Options) -> CastlistResult<()> {
    let config = match &options.config {
        Some(path) => ResolverConfig::from_path(path)?,
        None => ResolverConfig::default(),
    };
    let resolver = EntityResolver::new(config)?;

    let payload = read_payload(options.input.as_ref())?;
    let mentions = parse_mentions(&payload)?;
    info!(mentions = mentions.len(), "parsed extraction payload");

    let resolution = resolver.resolve_detailed(&mentions);
    println!("{}", to_json(&resolution.characters, options.pretty));
    if options.summary {
        eprintln!("{}", to_json(&resolution.summary, options.pretty));
    }
    Ok(())
}

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let options = match parse_args(&args) {
        Ok(Command::Run(options)) => options,
        Ok(Command::Help) => {
            println!("{USAGE}");
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("error: {message}");
            eprintln!();
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    init_tracing();

    match run(&options) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            if let CastlistError::Config(ConfigError::InvalidPattern { pattern, .. }) = &err {
                eprintln!("hint: check the blacklist pattern {pattern:?} in the config file");
            }
            ExitCode::from(1)
        }
    }
}
