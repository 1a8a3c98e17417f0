

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*};

use creator_insight::utils::log_filter;
use creator_insight::toolkit::creator_search::report::{render_details, render_table};
use creator_insight::toolkit::creator_search::{write_csv, SessionPreferences, EXAMPLE_QUERIES};
use creator_insight::{
    CreatorDataset, HintParser, InsightConfig, LlmProviderFactory, QueryPipeline, WeightVector,
};


#[derive(Parser)]
#[command(
    name = "creator-insight",
    about = "Rank social media creators for a free-text campaign request",
    version
)]
struct Cli {
    /// Request such as "top fashion creators with >10000 followers"
    query: Option<String>,

    /// Category to rank; overrides detection from the query
    #[arg(short, long)]
    category: Option<String>,

    /// Follower filter such as ">10000", "<5000" or "show all"
    #[arg(short, long)]
    follower_filter: Option<String>,

    /// Engagement rate weight in [0, 1]
    #[arg(long)]
    weight_engagement: Option<f64>,

    /// Follower score weight in [0, 1]
    #[arg(long)]
    weight_followers: Option<f64>,

    /// Likes+comments weight in [0, 1]
    #[arg(long)]
    weight_likes: Option<f64>,

    /// Ask the query interpreter for a structured hint first
    #[arg(long)]
    use_llm: bool,

    /// Creator CSV to load
    #[arg(short, long, env = "CREATOR_INSIGHT_DATA_PATH")]
    data: Option<PathBuf>,

    /// Write the full ranking as CSV (default path when no value is given)
    #[arg(short, long, num_args = 0..=1)]
    export: Option<Option<PathBuf>>,

    /// Config file layered under the CREATOR_INSIGHT_* environment
    #[arg(long)]
    config: Option<PathBuf>,

    /// Print the outcome as JSON instead of text
    #[arg(long)]
    json: bool,

    /// List the dataset categories and exit
    #[arg(long)]
    list_categories: bool,
}


#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(log_filter(std::env::var("RUST_LOG").ok().as_deref()))
        .init();

    let cli = Cli::parse();

    let mut config = match cli.config.as_deref() {
        Some(path) => InsightConfig::load(Some(path))?,
        None => {
            let config = InsightConfig::from_env();
            config.validate()?;
            config
        }
    };
    if let Some(data) = &cli.data {
        config.data_path = data.display().to_string();
    }

    let dataset = CreatorDataset::from_path(&config.data_path)?;

    if cli.list_categories {
        for category in dataset.categories() {
            println!("{category}");
        }
        return Ok(());
    }

    let Some(query) = cli.query.as_deref() else {
        println!("No query given. Try one of:");
        for example in EXAMPLE_QUERIES {
            println!("  {example}");
        }
        return Ok(());
    };

    let defaults = SessionPreferences::from_config(&config)?.weights;
    let weights = WeightVector::new(
        cli.weight_engagement.unwrap_or(defaults.engagement()),
        cli.weight_followers.unwrap_or(defaults.follower()),
        cli.weight_likes.unwrap_or(defaults.likes()),
    )?;

    let provider = LlmProviderFactory::from_config(&config)?;
    let pipeline = QueryPipeline::new(Arc::new(dataset), HintParser::from_config(provider, &config));

    let mut request = creator_insight::QueryRequest::new(query)
        .with_weights(weights)
        .with_interpreter(cli.use_llm || config.llm_enabled);
    request.category = cli.category.clone();
    request.follower_filter = cli.follower_filter.clone();

    let outcome = pipeline.run(&request).await;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        if let Some(hint) = &outcome.hint {
            println!(
                "🤖 Interpreter hint: category={}, follower_filter={}, sort_by={}",
                hint.category.as_deref().unwrap_or("-"),
                hint.follower_filter.as_deref().unwrap_or("-"),
                hint.sort_by.as_deref().unwrap_or("-")
            );
            println!("   {}", serde_json::to_string(hint)?);
        }
        for diagnostic in &outcome.diagnostics {
            let marker = if diagnostic.is_warning() { "⚠️" } else { "ℹ️" };
            println!("{marker} {}", diagnostic.message());
        }
        if !outcome.is_empty() {
            println!();
            println!("Top {} creators", config.detail_limit.min(outcome.ranked.len()));
            print!("{}", render_details(&outcome.top_details(config.detail_limit)));
            println!();
            print!("{}", render_table(&outcome.top_table(config.table_limit)));
        }
    }

    if let Some(target) = cli.export {
        let path = target.unwrap_or_else(|| PathBuf::from(&config.export_path));
        write_csv(&outcome.ranked, &path)?;
        eprintln!("💾 Ranked data written to {}", path.display());
    }

    Ok(())
}
