//! Bin for inspecting how type declarations are parsed.
mod summary;

use clap::{Parser, ValueEnum};
use coltype::{ColumnDescriptor, ParserConfig, TypeParser};
use coltype_error::{ColtypeError, Result};
use logutil::{configure_global_logger, LogFormat, LogTarget};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Debug,
    Json,
    Summary,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Arguments {
    /// Parse the text as a `name type, ...` schema.
    #[clap(long)]
    schema: bool,

    /// Column name used when parsing a single type.
    #[clap(long, default_value = "")]
    name: String,

    #[clap(long, value_enum, default_value_t = OutputFormat::Summary)]
    format: OutputFormat,

    /// Maximum nesting depth of composite types.
    #[clap(long, default_value_t = ParserConfig::DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Log output format (json, pretty or compact).
    #[clap(long, default_value = "compact")]
    log_format: String,

    /// Type declaration or schema to parse.
    #[clap(value_name = "TEXT")]
    text: String,
}

fn main() {
    let args = Arguments::parse();

    let log_format = LogFormat::from_name(&args.log_format).unwrap_or_default();
    configure_global_logger(tracing::Level::ERROR, log_format, LogTarget::Stderr);

    match inner(&args) {
        Ok(out) => println!("{out}"),
        Err(e) => {
            println!("ERROR");
            println!("{e}");
            std::process::exit(1);
        }
    }
}

fn inner(args: &Arguments) -> Result<String> {
    let parser = TypeParser::with_config(ParserConfig::default().with_max_depth(args.max_depth));
    let columns = if args.schema {
        parser.parse_schema(&args.text)?
    } else {
        vec![parser.parse_column(&args.name, &args.text)?]
    };
    tracing::debug!(columns = columns.len(), "parsed");

    render(&columns, args.format)
}

fn render(columns: &[ColumnDescriptor], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Debug => Ok(format!("{columns:#?}")),
        OutputFormat::Json => serde_json::to_string_pretty(columns)
            .map_err(|e| ColtypeError::with_source("failed to serialize columns", Box::new(e))),
        OutputFormat::Summary => Ok(summary::summarize(columns)),
    }
}
