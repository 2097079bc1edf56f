//! Schema Tool CLI
//!
//! Sanitizes identifiers, lists type kinds, and checks definition documents.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use record_schema::{DefinitionDocument, TypeKind, ToolConfig, sanitize_connection_name};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "schema-tool")]
#[command(about = "Inspect and validate record schema descriptors")]
struct Cli {
    /// Config file layered over the default locations
    #[arg(short, long)]
    config: Option<String>,

    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the sanitized form of each name
    Sanitize {
        /// Names to sanitize
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// List type kinds and the value representations they accept
    Kinds,

    /// Build every schema of a definition document
    Check {
        /// Definition document (JSON)
        file: PathBuf,

        /// Print the built schemas as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose { "debug" } else { "warn" })
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ToolConfig::load_from(cli.config.as_deref()).context("loading configuration")?;

    match cli.command {
        Commands::Sanitize { names } => {
            for name in names {
                println!("{}\t{}", name, sanitize_connection_name(&name));
            }
            Ok(())
        }

        Commands::Kinds => {
            for kind in TypeKind::ALL {
                let accepted: Vec<String> = kind
                    .accepted()
                    .iter()
                    .map(|r| format!("{:?}", r).to_lowercase())
                    .collect();
                println!("{:<10} {}", kind, accepted.join(", "));
            }
            Ok(())
        }

        Commands::Check { file, json } => {
            let document = DefinitionDocument::from_path(&file)
                .with_context(|| format!("reading {}", file.display()))?;

            let catalog = match document.build(&config.definitions) {
                Ok(catalog) => catalog,
                Err(e) if e.is_validation() => {
                    println!("❌ {}", e);
                    std::process::exit(1);
                }
                Err(e) => return Err(e.into()),
            };

            if json {
                let mut out = serde_json::Map::new();
                for (name, schema) in catalog.iter() {
                    let mut view = schema.to_json();
                    if config.output.include_fingerprints {
                        view["fingerprint"] = serde_json::json!(schema.fingerprint().as_str());
                    }
                    out.insert(name.to_string(), view);
                }
                println!("{}", config.output.format.render(&serde_json::Value::Object(out))?);
                return Ok(());
            }

            for (name, schema) in catalog.iter() {
                let detail = match schema.kind() {
                    TypeKind::Record => format!("{} entries", schema.entries().len()),
                    TypeKind::Array => schema
                        .element_schema()
                        .map(|e| format!("of {}", e.kind()))
                        .unwrap_or_default(),
                    _ => String::new(),
                };
                if config.output.include_fingerprints {
                    println!("✅ {} ({}, {}) {}", name, schema.kind(), detail, schema.fingerprint().short());
                } else {
                    println!("✅ {} ({}, {})", name, schema.kind(), detail);
                }
            }
            println!();
            println!("✅ {} schema(s) valid", catalog.len());
            Ok(())
        }
    }
}
