use std::path::PathBuf;

use anyhow::{anyhow, bail, Context as _, Result};
use clap::{Parser, Subcommand};

use elmland::config::Config;
use elmland::logging::init_tracing;
use elmland::routing::{ParamValue, RouteTemplate, Router, Segment};

#[derive(Parser)]
#[command(name = "elmland")]
#[command(about = "Inspect and exercise an application's route manifest", long_about = None)]
struct Cli {
    /// Manifest to read instead of the default config location.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List routes in registration order
    Routes,
    /// Show which route a location resolves to
    Resolve { location: String },
    /// Render a link to a named route
    Href {
        name: String,
        /// Path parameters as name=value
        params: Vec<String>,
        /// Query parameters as name=value
        #[arg(short, long = "query")]
        query: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("failed to load configuration")?;
    init_tracing(&config.logging);

    let router = Router::from_config(&config).context("failed to build router")?;
    tracing::debug!(routes = router.templates().len(), "router ready");

    match cli.command {
        Commands::Routes => {
            for template in router.templates() {
                println!("{:<20} {}", template.name(), template);
            }
        }
        Commands::Resolve { location } => match router.resolve(&location) {
            Ok(route) => println!("{}", serde_json::to_string_pretty(&route)?),
            Err(reason) => {
                eprintln!("no match: {reason}");
                std::process::exit(1);
            }
        },
        Commands::Href {
            name,
            params,
            query,
        } => {
            let template = router
                .template(&name)
                .ok_or_else(|| anyhow!("unknown route '{name}'"))?;
            let params = typed_pairs(template, &params, false)?;
            let query = typed_pairs(template, &query, true)?;
            let params: Vec<(&str, ParamValue)> =
                params.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
            let query: Vec<(&str, ParamValue)> =
                query.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
            println!("{}", router.href(&name, &params, &query)?);
        }
    }

    Ok(())
}

/// Parse `name=value` arguments using the kinds declared by `template`.
fn typed_pairs(
    template: &RouteTemplate,
    raw: &[String],
    query: bool,
) -> Result<Vec<(String, ParamValue)>> {
    raw.iter()
        .map(|pair| {
            let (name, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow!("expected name=value, got '{pair}'"))?;
            let kind = if query {
                template
                    .query_fields()
                    .iter()
                    .find(|field| field.name == name)
                    .map(|field| &field.kind)
            } else {
                template.segments().iter().find_map(|segment| match segment {
                    Segment::Param { name: param, kind } if param == name => Some(kind),
                    _ => None,
                })
            };
            let Some(kind) = kind else {
                bail!("route '{}' has no parameter '{name}'", template.name());
            };
            let value = kind
                .parse_value(value)
                .ok_or_else(|| anyhow!("'{value}' is not a valid {kind} for '{name}'"))?;
            Ok((name.to_string(), value))
        })
        .collect()
}
