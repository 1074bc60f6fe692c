use clap::{ArgAction, Parser};
use std::path::PathBuf;

/// Generates one PDF participation certificate per participant listed in a JSON file
#[derive(Parser, Debug)]
#[clap(author, version, about)]
pub struct Cli {
    /// JSON file describing the event and its participants
    #[clap(long, env = "CERTIFICADOS_JSON", default_value = "certificados.json")]
    pub json: PathBuf,

    /// Background image (overrides `background_image` in the JSON)
    #[clap(long)]
    pub bg: Option<PathBuf>,

    /// Output directory (overrides `output_directory` in the JSON)
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// Log more details (-v for info, -vv for debug)
    #[clap(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}
