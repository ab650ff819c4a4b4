/*
 * main.rs
 *
 * ayaml command-line entry point.
 */

//! ayaml - inspect and edit YAML scalars in place

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "ayaml")]
#[command(version)]
#[command(about = "Edit YAML scalars without reformatting the file", long_about = None)]
struct Cli {
    /// Log mutation steps at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the value at a path
    Get {
        /// YAML file
        file: PathBuf,

        /// Dotted path, e.g. repos.poky.protocol
        path: String,
    },

    /// Rewrite string scalars in place
    Set {
        /// YAML file
        file: PathBuf,

        /// Dotted path of the scalar to rewrite
        path: String,

        /// New value
        value: String,

        /// Further edits applied after the first one (PATH=VALUE)
        #[arg(short, long = "edit", value_name = "PATH=VALUE")]
        edits: Vec<String>,
    },

    /// Add a key under an existing mapping and rewrite the file
    Add {
        /// YAML file
        file: PathBuf,

        /// Dotted path of the new key, e.g. repos.my-new-one
        path: String,

        /// Value of the new key
        value: String,
    },

    /// Print the re-serialized document
    Dump {
        /// YAML file
        file: PathBuf,
    },

    /// List spanned scalars with their offsets and quote styles
    Spans {
        /// YAML file
        file: PathBuf,

        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new("ayaml=debug,annotated_yaml=debug")
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "ayaml=info,annotated_yaml=warn".into())
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let mut stdout = io::stdout().lock();
    match cli.command {
        Commands::Get { file, path } => commands::get::execute(&file, &path, &mut stdout),
        Commands::Set {
            file,
            path,
            value,
            edits,
        } => commands::set::execute(commands::set::SetArgs {
            file,
            path,
            value,
            edits,
        }),
        Commands::Add { file, path, value } => commands::add::execute(&file, &path, &value),
        Commands::Dump { file } => commands::dump::execute(&file, &mut stdout),
        Commands::Spans { file, json } => commands::spans::execute(&file, json, &mut stdout),
    }
}
