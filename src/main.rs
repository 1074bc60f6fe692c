use anyhow::Result;
use cli::Cli;
use config::Settings;
use indicatif::{ProgressBar, ProgressStyle};
use std::process::ExitCode;

mod batch;
mod certificate;
mod cli;
mod config;
mod normalize;
mod pdf;
mod sanitize;

fn main() -> ExitCode {
    if let Err(e) = try_main() {
        eprintln!("{}: {e:#}", console::style("Error").red());
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

fn try_main() -> Result<()> {
    use clap::Parser;
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let data = config::load(&cli.json)?;
    let settings = Settings::resolve(&data, cli.bg.as_deref(), cli.output.as_deref());

    println!(
        "Generando certificados para {} participantes...",
        data.participants.len()
    );
    println!("Imagen de fondo: {}", settings.background.display());
    println!("Directorio de salida: {}\n", settings.output_directory.display());

    let progress = ProgressBar::new(data.participants.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let summary = batch::run(&data, &settings, None, &progress, &mut std::io::stdout());
    progress.finish_and_clear();

    println!("\n{summary}");
    Ok(())
}
