use std::path::PathBuf;

use clap::{Args as ClapArgs, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(flatten)]
    pub data: DataArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct DataArgs {
    /// Movie titles CSV. Overrides `movies_path` from config.yaml.
    #[clap(long, global = true)]
    pub movies: Option<PathBuf>,

    /// Similarity matrix CSV. Overrides `similarity_path` from config.yaml.
    #[clap(long, global = true)]
    pub similarity: Option<PathBuf>,
}

#[derive(ClapArgs, Debug, Clone)]
pub struct OutputArgs {
    /// Number of recommendations. Defaults to `recommendations` from config.yaml.
    #[clap(short, long)]
    pub k: Option<usize>,

    /// Print results as json
    #[clap(long, default_value = "false")]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Recommend movies similar to the given title
    Recommend {
        /// Exact movie title
        title: String,

        #[clap(flatten)]
        output: OutputArgs,
    },
    /// Type or select a movie, then show recommendations
    Pick {
        #[clap(flatten)]
        output: OutputArgs,
    },
    /// List catalog titles
    List {
        /// Print the count
        #[clap(short = 'c', long, default_value = "false")]
        count: bool,
    },
    /// Show catalog statistics
    Info {},
}
