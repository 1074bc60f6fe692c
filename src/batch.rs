//! Generating every participant's certificate in one run.
//!
//! Participants are rendered one after another, in the order they appear in the
//! input. A failure only costs that participant its certificate: it is reported
//! and counted, and the run moves on.

use crate::certificate::{self, CertificateJobBuilder};
use crate::config::{CertificateData, Settings};
use crate::sanitize;
use anyhow::{Context, Result};
use indicatif::ProgressBar;
use std::collections::HashMap;
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};

const RULE: &str = "========================================";

/// The outcome of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub succeeded: usize,
    pub failed: usize,
    pub written: Vec<PathBuf>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "Proceso completado.")?;
        writeln!(f, "{} Exitosos: {}", console::style("✔").green(), self.succeeded)?;
        if self.failed > 0 {
            writeln!(f, "{} Errores: {}", console::style("❌").red(), self.failed)?;
        }
        write!(f, "{RULE}")
    }
}

/// Group participants whose names sanitize to the same file name.
///
/// Returns the shared file names together with the original names, sorted by
/// file name.
pub fn colliding_names(data: &CertificateData) -> Vec<(String, Vec<String>)> {
    let mut by_file: HashMap<String, Vec<String>> = HashMap::new();
    for participant in data.participants.iter() {
        by_file
            .entry(sanitize::certificate_filename(&participant.name))
            .or_default()
            .push(participant.name.clone());
    }

    let mut collisions: Vec<_> = by_file
        .into_iter()
        .filter(|(_, names)| names.len() > 1)
        .collect();
    collisions.sort();
    collisions
}

/// Render every participant's certificate.
///
/// `scratch_dir` is where interlaced PNGs are re-encoded; `None` uses the
/// system's temporary directory. One status line per participant is written to
/// `out` with the progress bar hidden for the duration.
pub fn run<W: Write>(
    data: &CertificateData,
    settings: &Settings,
    scratch_dir: Option<&Path>,
    progress: &ProgressBar,
    out: &mut W,
) -> Summary {
    for (file_name, names) in colliding_names(data) {
        log::warn!(
            "{} participantes comparten el archivo `{file_name}`, los últimos sobrescriben a los primeros: {}",
            names.len(),
            names.join(", ")
        );
    }

    let total = data.participants.len();
    let mut summary = Summary::default();

    for (i, participant) in data.participants.iter().enumerate() {
        progress.set_message(participant.name.clone());
        if participant.name.is_empty() {
            log::warn!(
                "El participante #{} no tiene nombre, se escribirá `{}`",
                i + 1,
                sanitize::certificate_filename("")
            );
        }

        let line = format!(
            "[{}/{}] Generando certificado para: {}...",
            i + 1,
            total,
            participant.name
        );
        let result = build_job(data, settings, scratch_dir, i)
            .and_then(|job| certificate::generate(&job));
        let status = match result {
            Ok(path) => {
                summary.succeeded += 1;
                summary.written.push(path);
                console::style("✔ OK").green()
            }
            Err(e) => {
                log::error!("{}: {e:#}", participant.name);
                summary.failed += 1;
                console::style("❌ ERROR").red()
            }
        };
        if let Err(e) = progress.suspend(|| writeln!(out, "{line} {status}")) {
            log::warn!("No se pudo escribir el progreso: {e}");
        }
        progress.inc(1);
    }

    summary
}

fn build_job(
    data: &CertificateData,
    settings: &Settings,
    scratch_dir: Option<&Path>,
    index: usize,
) -> Result<certificate::CertificateJob> {
    let mut builder = CertificateJobBuilder::default();
    builder
        .event(data.event.clone())
        .participant(data.participants[index].clone())
        .font_colour(data.font_color)
        .title_colour(data.title_color)
        .background(settings.background.clone())
        .output_directory(settings.output_directory.clone());
    if let Some(scratch_dir) = scratch_dir {
        builder.scratch_dir(scratch_dir.to_path_buf());
    }
    builder
        .build()
        .with_context(|| "Error preparando el certificado")
}
