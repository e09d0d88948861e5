use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use mealfinder_core::{Language, Recommender, ResolutionQuery};
use serde::Deserialize;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "mealfinder")]
#[command(about = "Mealfinder CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Recommend recipes by ingredient, category or cuisine (random if none given)
    Recommend {
        /// Main ingredient, e.g. "chicken"
        #[arg(long)]
        ingredient: Option<String>,
        /// Dish category, e.g. "Dessert"
        #[arg(long)]
        category: Option<String>,
        /// Cuisine or region, e.g. "Japanese"
        #[arg(long)]
        cuisine: Option<String>,
        /// Number of recipes, 1-10
        #[arg(long)]
        limit: Option<i64>,
        /// Language code for the output text
        #[arg(long)]
        language: Option<String>,
        /// Skip keyword expansion and translation even if an API key is set
        #[arg(long)]
        no_ai: bool,
    },
    /// Show one recipe by provider id
    Lookup {
        id: String,
        /// Language code for the output text
        #[arg(long)]
        language: Option<String>,
        /// Skip translation even if an API key is set
        #[arg(long)]
        no_ai: bool,
    },
    /// Check that a running server is healthy
    Ping {
        /// Server URL (default: http://localhost:3000)
        #[arg(long, env = "MEALFINDER_SERVER", default_value = "http://localhost:3000")]
        server: String,
    },
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    source: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Recommend {
            ingredient,
            category,
            cuisine,
            limit,
            language,
            no_ai,
        } => {
            let query = ResolutionQuery {
                ingredient,
                category,
                cuisine,
                limit,
                language,
            };
            recommend(&query, !no_ai).await?;
        }
        Commands::Lookup {
            id,
            language,
            no_ai,
        } => {
            lookup(&id, language.as_deref(), !no_ai).await?;
        }
        Commands::Ping { server } => {
            ping(&server).await?;
        }
    }

    Ok(())
}

async fn recommend(query: &ResolutionQuery, use_ai: bool) -> Result<()> {
    let recommender =
        Recommender::from_env(use_ai).context("Failed to build recipe provider client")?;
    let result = recommender.recommend(query).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

async fn lookup(id: &str, language: Option<&str>, use_ai: bool) -> Result<()> {
    let language = Language::from_param(language)?;

    let recommender =
        Recommender::from_env(use_ai).context("Failed to build recipe provider client")?;

    match recommender.lookup(id, &language).await? {
        Some(recipe) => println!("{}", serde_json::to_string_pretty(&recipe)?),
        None => bail!("Recipe {} not found", id),
    }
    Ok(())
}

async fn ping(server: &str) -> Result<()> {
    let url = format!("{}/api/health", server.trim_end_matches('/'));
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(5))
        .build()?;

    let response: HealthResponse = client
        .get(&url)
        .send()
        .await
        .with_context(|| format!("Failed to reach {}", url))?
        .error_for_status()?
        .json()
        .await?;

    println!("{} ({})", response.status, response.source);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recommend_flags_parse() {
        let cli = Cli::parse_from([
            "mealfinder",
            "recommend",
            "--ingredient",
            "chicken",
            "--limit",
            "3",
            "--no-ai",
        ]);
        match cli.command {
            Commands::Recommend {
                ingredient,
                limit,
                no_ai,
                category,
                ..
            } => {
                assert_eq!(ingredient.as_deref(), Some("chicken"));
                assert_eq!(limit, Some(3));
                assert!(no_ai);
                assert_eq!(category, None);
            }
            _ => panic!("expected recommend"),
        }
    }

    #[test]
    fn test_lookup_takes_positional_id() {
        let cli = Cli::parse_from(["mealfinder", "lookup", "52772", "--language", "ko"]);
        match cli.command {
            Commands::Lookup { id, language, .. } => {
                assert_eq!(id, "52772");
                assert_eq!(language.as_deref(), Some("ko"));
            }
            _ => panic!("expected lookup"),
        }
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
