use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde_json::json;

use page_router::config::load_config;
use page_router::Deployment;

#[derive(Parser)]
#[command(name = "routectl")]
#[command(about = "Inspect page router configurations offline", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config and build every app
    Check { config: PathBuf },
    /// List templates in the order they are matched
    Routes {
        config: PathBuf,
        /// Only show this app
        #[arg(long)]
        app: Option<String>,
    },
    /// Show how a request URL would be dispatched
    Resolve {
        config: PathBuf,
        /// Path with optional query, e.g. /store/products?page=2
        url: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config } => {
            let deployment = Deployment::from_config(&load_config(&config)?)?;
            for app in deployment.apps() {
                println!(
                    "{:<20} {:<24} {} pages",
                    app.name(),
                    display_context(app.context_path()),
                    app.table().len()
                );
            }
            println!("OK: {} pages", deployment.page_count());
        }
        Commands::Routes { config, app } => {
            let deployment = Deployment::from_config(&load_config(&config)?)?;
            for deployed in deployment.apps() {
                if app.as_deref().is_some_and(|name| name != deployed.name()) {
                    continue;
                }
                println!("{} ({})", deployed.name(), display_context(deployed.context_path()));
                for (rank, template) in deployed.table().templates().enumerate() {
                    println!("  {:>3}. {}", rank + 1, template);
                }
            }
        }
        Commands::Resolve { config, url } => {
            let deployment = Deployment::from_config(&load_config(&config)?)?;
            let (path, query) = match url.split_once('?') {
                Some((path, query)) => (path, Some(query)),
                None => (url.as_str(), None),
            };
            let report = match deployment.route(path) {
                Some((app, rest)) => json!({
                    "app": app.name(),
                    "path": rest,
                    "dispatch": app.dispatch(rest, query)?,
                }),
                None => json!({ "app": null, "dispatch": { "outcome": "not_found", "path": path } }),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}

fn display_context(context_path: &str) -> &str {
    if context_path.is_empty() {
        "/"
    } else {
        context_path
    }
}
