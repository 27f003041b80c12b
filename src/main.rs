//! arrayxml - JSON to XML converter

use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use arrayxml::{Options, Value, mapper};

#[derive(Parser)]
#[command(name = "arrayxml")]
#[command(version, about = "Convert JSON to XML using names encoded in the keys", long_about = None)]
#[command(after_help = "EXAMPLES:
    arrayxml data.json                      Print XML for data.json
    arrayxml data.json -o data.xml          Write XML to a file
    cat data.json | arrayxml --compact      Read stdin, no indentation
    arrayxml data.json --item-name 'element={name}{id}'
                                            Name <element> items by their id field")]
struct Cli {
    /// Input JSON file, `-` for stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    input: String,

    /// Output file (defaults to stdout)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<String>,

    /// XML version written in the declaration
    #[arg(long, value_name = "VERSION", default_value = "1.0")]
    xml_version: String,

    /// Declared encoding; output bytes are encoded accordingly
    #[arg(long, value_name = "ENCODING")]
    encoding: Option<String>,

    /// Omit the XML declaration
    #[arg(long)]
    no_declaration: bool,

    /// Spaces per nesting level
    #[arg(long, value_name = "N", default_value_t = 2, conflicts_with = "compact")]
    indent: usize,

    /// Write everything on one line
    #[arg(long)]
    compact: bool,

    /// Maximum nesting depth of the input
    #[arg(long, value_name = "N", default_value_t = arrayxml::options::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Name list items with a template, e.g. `element={name}{id}`
    #[arg(long = "item-name", value_name = "NAME=TEMPLATE", value_parser = parse_item_name)]
    item_names: Vec<(String, String)>,

    /// Log conversion details to stderr
    #[arg(short, long)]
    verbose: bool,

    /// Suppress error messages
    #[arg(short, long)]
    quiet: bool,
}

fn parse_item_name(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((name, template)) if !name.is_empty() => Ok((name.to_string(), template.to_string())),
        _ => Err(format!("expected NAME=TEMPLATE, got '{arg}'")),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "arrayxml=debug" } else { "arrayxml=warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(io::stderr)
        .init();

    match convert(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if !cli.quiet {
                eprintln!("error: {e}");
            }
            ExitCode::FAILURE
        }
    }
}

fn options(cli: &Cli) -> Options {
    let mut options = Options::new()
        .with_version(cli.xml_version.as_str())
        .with_declaration(!cli.no_declaration)
        .with_indent(if cli.compact { None } else { Some(cli.indent) })
        .with_max_depth(cli.max_depth);
    if let Some(ref encoding) = cli.encoding {
        options = options.with_encoding(encoding.as_str());
    }
    for (name, template) in &cli.item_names {
        options = options.with_shared_name_mapper(name.as_str(), mapper::template(template));
    }
    options
}

fn convert(cli: &Cli) -> Result<(), String> {
    let json = if cli.input == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("reading stdin: {e}"))?;
        buf
    } else {
        fs::read_to_string(&cli.input).map_err(|e| format!("reading {}: {e}", cli.input))?
    };

    let value: Value = serde_json::from_str(&json).map_err(|e| format!("parsing JSON: {e}"))?;
    let bytes = arrayxml::to_bytes(&value, &options(cli)).map_err(|e| e.to_string())?;
    debug!(bytes = bytes.len(), "converted");

    match cli.output {
        Some(ref path) => fs::write(path, &bytes).map_err(|e| format!("writing {path}: {e}"))?,
        None => io::stdout()
            .write_all(&bytes)
            .map_err(|e| format!("writing stdout: {e}"))?,
    }
    Ok(())
}
