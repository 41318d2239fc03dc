use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use rust_edmgen::project::{load_settings, ModelGenerationSettings, TargetSchemaVersion};
use rust_edmgen::schema::{SchemaObjectKind, SchemaQueryGenerator};
use rust_edmgen::{generate_model, GenerateOptions};

#[derive(Parser)]
#[command(name = "rust-edmgen")]
#[command(author, version, about = "Reverse engineer entity data models from database schemas")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the storage and conceptual models from a schema document
    Generate {
        /// Path to the JSON document holding the discovery rows
        #[arg(short, long)]
        schema: PathBuf,

        /// Path to a JSON settings file
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Conceptual model namespace (overrides the settings file)
        #[arg(short, long)]
        namespace: Option<String>,

        /// Target schema version (v1, v2, v3)
        #[arg(short, long)]
        target_version: Option<TargetSchemaVersion>,

        /// Do not keep foreign key columns as conceptual properties
        #[arg(long)]
        no_foreign_keys: bool,

        /// Do not pluralize entity set names
        #[arg(long)]
        no_pluralize: bool,

        /// Output path for the JSON report
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Enable verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the discovery query for one kind of schema object
    SchemaQuery {
        /// Object kind (tables, views, functions)
        #[arg(short, long)]
        kind: SchemaObjectKind,

        /// Path to a JSON settings file supplying the filters
        #[arg(long)]
        settings: Option<PathBuf>,
    },
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_env("EDMGEN_LOG").unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn read_settings(path: Option<&PathBuf>) -> Result<ModelGenerationSettings> {
    match path {
        Some(path) => Ok(load_settings(path)?),
        None => Ok(ModelGenerationSettings::default()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            schema,
            settings,
            namespace,
            target_version,
            no_foreign_keys,
            no_pluralize,
            output,
            verbose,
        } => {
            init_tracing(verbose);

            let mut settings = read_settings(settings.as_ref())?;
            if let Some(namespace) = namespace {
                settings.model_namespace = namespace;
            }
            if let Some(target_version) = target_version {
                settings.target_version = target_version;
            }
            if no_foreign_keys {
                settings.generate_foreign_key_properties = false;
            }
            if no_pluralize {
                settings.pluralize = false;
            }

            let options = GenerateOptions {
                schema_path: schema,
                settings,
                output_path: output,
                verbose,
            };

            let result = generate_model(options)?;
            for diagnostic in result.diagnostics() {
                eprintln!("{}", diagnostic);
            }
        }
        Commands::SchemaQuery { kind, settings } => {
            init_tracing(false);

            let settings = read_settings(settings.as_ref())?;
            let query = SchemaQueryGenerator::new(kind, &settings.filters).generate();

            println!("{}", query.text);
            for (name, value) in &query.parameters {
                println!("-- {} = '{}'", name, value);
            }
        }
    }

    Ok(())
}
