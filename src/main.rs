use std::collections::HashSet;

use anyhow::{bail, Context};
use clap::Parser;
use inquire::error::InquireError;
use tracing_subscriber::EnvFilter;

mod catalog;
mod cli;
mod config;
mod display;
mod similarity;
mod storage;
#[cfg(test)]
mod tests;
use catalog::Catalog;
use cli::{DataArgs, OutputArgs};
use config::Config;
use similarity::{RecommendError, Recommender};

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn load_catalog(config: &Config, data: &DataArgs) -> anyhow::Result<Catalog> {
    let movies = data.movies.clone().unwrap_or_else(|| config.movies_file());
    let similarity = data
        .similarity
        .clone()
        .unwrap_or_else(|| config.similarity_file());

    log::debug!(
        "loading catalog from {} and {}",
        movies.display(),
        similarity.display()
    );

    Catalog::load(&movies, &similarity).with_context(|| {
        format!(
            "failed to load catalog from {} and {}",
            movies.display(),
            similarity.display()
        )
    })
}

fn load_recommender(config: &Config, data: &DataArgs) -> anyhow::Result<Recommender> {
    let catalog = load_catalog(config, data)?;
    Recommender::new(catalog).context("failed to build similarity index")
}

fn show_recommendations(
    recommender: &Recommender,
    config: &Config,
    title: &str,
    output: &OutputArgs,
) -> anyhow::Result<()> {
    let k = output.k.unwrap_or(config.recommendations);
    let search_url = config.search_url()?;

    let recs = match recommender.recommend(title, k) {
        Ok(recs) => recs,
        Err(RecommendError::UnknownItem(title)) => {
            bail!("{title:?} is not in the catalog, see `reel list` for known titles")
        }
        Err(err) => return Err(err.into()),
    };

    if output.json {
        println!("{}", display::render_json(&search_url, &recs)?);
    } else {
        print!("{}", display::render_text(&search_url, title, &recs));
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = cli::Args::parse();

    init_logging();
    tracing::debug!(command = ?args.command, "starting");

    let config = Config::load().context("failed to load config")?;

    match args.command {
        cli::Command::Recommend { title, output } => {
            let recommender = load_recommender(&config, &args.data)?;
            show_recommendations(&recommender, &config, &title, &output)
        }

        cli::Command::Pick { output } => {
            let recommender = load_recommender(&config, &args.data)?;

            let mut seen = HashSet::new();
            let options: Vec<&str> = recommender
                .catalog()
                .titles()
                .iter()
                .map(String::as_str)
                .filter(|title| seen.insert(*title))
                .collect();

            let title = match inquire::Select::new("Type or select a movie", options)
                .with_page_size(10)
                .prompt()
            {
                Ok(title) => title,
                Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => {
                    return Ok(())
                }
                Err(err) => bail!("An error occurred: {}", err),
            };

            show_recommendations(&recommender, &config, title, &output)
        }

        cli::Command::List { count } => {
            let catalog = load_catalog(&config, &args.data)?;

            if count {
                println!("{} movies found", catalog.len());
                return Ok(());
            }

            for title in catalog.titles() {
                println!("{title}");
            }
            Ok(())
        }

        cli::Command::Info {} => {
            let recommender = load_recommender(&config, &args.data)?;
            let stats = recommender.stats();

            println!("data directory: {}", config.base_path().display());
            println!("movies: {}", stats.items);
            println!("distinct titles: {}", stats.distinct_titles);
            println!("dimensions: {}", stats.dimensions);
            if !stats.repeated_titles.is_empty() {
                println!("repeated titles:");
                for title in &stats.repeated_titles {
                    println!("  {title}");
                }
            }
            Ok(())
        }
    }
}
