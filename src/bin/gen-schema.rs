//! Generation Schema CLI
//!
//! Command-line interface for converting tool input schemas.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use gen_schema::{
    convert_with_options, find_tool, load_schema_auto, load_tools, ConvertOptions,
    GenerationTool, Warning,
};
use serde::Serialize;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gen-schema")]
#[command(about = "Convert tool input schemas into constrained-generation schemas")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a single JSON Schema
    Convert {
        /// Schema source: file path or URL (http:// or https://)
        schema: String,

        /// Name for the root object when the schema has no title
        #[arg(long)]
        name: Option<String>,

        /// Prefix for generated object names
        #[arg(long, default_value = gen_schema::DEFAULT_NAME_PREFIX)]
        prefix: String,

        /// Output file (stdout if not specified)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Exit with status 1 if any warning was emitted
        #[arg(long)]
        strict: bool,

        /// Follow $ref objects that carry sibling keys, merging the siblings in
        #[arg(long)]
        merge_ref_siblings: bool,
    },

    /// Convert the input schemas of a tool listing (tools/list response)
    Tools {
        /// Listing source: file path or URL (http:// or https://)
        listing: String,

        /// Only convert the tool with this name
        #[arg(long)]
        tool: Option<String>,

        /// Prefix for generated object names
        #[arg(long, default_value = gen_schema::DEFAULT_NAME_PREFIX)]
        prefix: String,

        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,

        /// Exit with status 1 if any warning was emitted
        #[arg(long)]
        strict: bool,

        /// Follow $ref objects that carry sibling keys, merging the siblings in
        #[arg(long)]
        merge_ref_siblings: bool,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Convert {
            schema,
            name,
            prefix,
            output,
            pretty,
            strict,
            merge_ref_siblings,
        } => {
            let mut options = ConvertOptions::new()
                .name_prefix(prefix)
                .merge_ref_siblings(merge_ref_siblings);
            if let Some(name) = name {
                options = options.root_name(name);
            }
            run_convert(&schema, &options, output, pretty, strict)
        }

        Commands::Tools {
            listing,
            tool,
            prefix,
            pretty,
            strict,
            merge_ref_siblings,
        } => {
            let options = ConvertOptions::new()
                .name_prefix(prefix)
                .merge_ref_siblings(merge_ref_siblings);
            run_tools(&listing, tool.as_deref(), &options, pretty, strict)
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn run_convert(
    schema_source: &str,
    options: &ConvertOptions,
    output: Option<PathBuf>,
    pretty: bool,
    strict: bool,
) -> Result<(), u8> {
    let schema = load_schema_auto(schema_source).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let conversion = convert_with_options(&schema, options);
    report_warnings("", &conversion.warnings);

    let json_output = to_json(&conversion.schema, pretty)?;
    match output {
        Some(path) => {
            std::fs::write(&path, &json_output).map_err(|e| {
                eprintln!("Error writing to {}: {}", path.display(), e);
                3u8
            })?;
        }
        None => {
            println!("{}", json_output);
        }
    }

    check_strict(strict, conversion.warnings.len())
}

fn run_tools(
    listing: &str,
    only: Option<&str>,
    options: &ConvertOptions,
    pretty: bool,
    strict: bool,
) -> Result<(), u8> {
    let descriptors = load_tools(listing).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    let tools: Vec<GenerationTool> = match only {
        Some(name) => {
            let descriptor = find_tool(&descriptors, name).map_err(|e| {
                eprintln!("Error: {}", e);
                e.exit_code() as u8
            })?;
            vec![GenerationTool::from_descriptor(descriptor, options)]
        }
        None => descriptors
            .iter()
            .map(|d| GenerationTool::from_descriptor(d, options))
            .collect(),
    };

    let mut warning_count = 0;
    for tool in &tools {
        report_warnings(&tool.name, &tool.warnings);
        warning_count += tool.warnings.len();
    }

    println!("{}", to_json(&tools, pretty)?);
    check_strict(strict, warning_count)
}

/// Print warnings to stderr, prefixed with the tool name when there is one.
fn report_warnings(tool: &str, warnings: &[Warning]) {
    for warning in warnings {
        if tool.is_empty() {
            eprintln!("warning: {}", warning);
        } else {
            eprintln!("warning: {}: {}", tool, warning);
        }
    }
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String, u8> {
    if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| {
        eprintln!("Error serializing output: {}", e);
        2u8
    })
}

fn check_strict(strict: bool, warnings: usize) -> Result<(), u8> {
    if strict && warnings > 0 {
        eprintln!("{} warning(s) emitted (strict mode)", warnings);
        Err(1)
    } else {
        Ok(())
    }
}
