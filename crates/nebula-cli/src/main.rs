//! Nebula CLI - drive the backdrop engine without a display

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{render, simulate, SceneArgs};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "nebula")]
#[command(about = "Headless driver for the Nebula particle backdrop", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the simulation for a number of frames and report statistics
    Simulate {
        #[command(flatten)]
        scene: SceneArgs,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,
    },

    /// Run the simulation and save the final frame as a PNG
    Render {
        #[command(flatten)]
        scene: SceneArgs,

        /// Output image path
        #[arg(short, long, default_value = "backdrop.png")]
        output: String,
    },
}

fn parse_format(s: &str) -> Result<String, String> {
    match s {
        "text" | "json" => Ok(s.to_string()),
        _ => Err(format!("unknown format '{}'; valid values: text, json", s)),
    }
}

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate { scene, format } => simulate::run(&scene, &format),
        Commands::Render { scene, output } => render::run(&scene, &output),
    }
}
