//! Certificate rendering.
//!
//! Each certificate is a single landscape A4 page laid out top to bottom with
//! every line centred:
//!
//! 1. background image stretched over the page (or a flat fill)
//! 2. optional logo at a fixed position
//! 3. title, introduction, participant name and affiliation
//! 4. participation sentence, event name and work title
//! 5. dates and place, ISBN, organizers
//! 6. signature image, signer name and role
//!
//! Optional text is skipped when empty and optional images are skipped when
//! the file doesn't exist. Images that do exist but can't be used fail the
//! whole certificate.

mod layout;

use crate::config::{Event, Participant, Rgb};
use crate::normalize::{self, ScratchFiles};
use crate::pdf::{Colour, Document, Font, Image};
use crate::sanitize;
use anyhow::{Context, Result};
use derive_builder::Builder;
use layout::{Flow, TextStyle, PAGE_WIDTH};
use std::io::Write;
use std::path::{Path, PathBuf};

pub const DEFAULT_TITLE: &str = "CERTIFICADO DE PARTICIPACIÓN";
pub const DEFAULT_PARTICIPATION_TYPE: &str = "participante";
const INTRODUCTION: &str = "Se otorga el presente certificado a:";
const WORK_TITLE_LABEL: &str = "con el trabajo:";

const DEFAULT_LOGO_WIDTH: f32 = 30.0;
const DEFAULT_LOGO_POSITION: f32 = 10.0;
const DEFAULT_SIGNATURE_WIDTH: f32 = 40.0;
const TITLE_Y: f32 = 25.0;

/// Everything needed to render one participant's certificate.
#[derive(Builder, Debug, Clone)]
#[builder(setter(into))]
pub struct CertificateJob {
    pub event: Event,
    pub participant: Participant,
    #[builder(default = "Rgb::DEFAULT_FONT")]
    pub font_colour: Rgb,
    #[builder(default = "Rgb::DEFAULT_TITLE")]
    pub title_colour: Rgb,
    #[builder(default = "PathBuf::from(crate::config::DEFAULT_BACKGROUND)")]
    pub background: PathBuf,
    #[builder(default = "PathBuf::from(crate::config::DEFAULT_OUTPUT_DIRECTORY)")]
    pub output_directory: PathBuf,
    /// Where re-encoded images are written while the certificate is rendered
    #[builder(default = "std::env::temp_dir()")]
    pub scratch_dir: PathBuf,
}

impl CertificateJob {
    pub fn output_path(&self) -> PathBuf {
        sanitize::certificate_path(&self.output_directory, &self.participant.name)
    }

    fn title(&self) -> &str {
        non_empty_or(&self.event.certificate_title, DEFAULT_TITLE)
    }

    fn text_style(&self, font: Font, size: f32) -> TextStyle {
        TextStyle {
            font,
            size,
            colour: colour(self.font_colour),
        }
    }

    fn title_style(&self, font: Font, size: f32) -> TextStyle {
        TextStyle {
            font,
            size,
            colour: colour(self.title_colour),
        }
    }
}

fn colour(rgb: Rgb) -> Colour {
    Colour::new_rgb_bytes(rgb.r, rgb.g, rgb.b)
}

fn non_empty_or<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.is_empty() {
        default
    } else {
        value
    }
}

fn positive_or(value: f32, default: f32) -> f32 {
    if value > 0.0 {
        value
    } else {
        default
    }
}

/// Render `job` and write it into its output directory.
///
/// Returns the path of the written file. Temporary files created for the
/// certificate's images are gone by the time this returns, whether it succeeded
/// or not.
pub fn generate(job: &CertificateJob) -> Result<PathBuf> {
    let mut scratch = ScratchFiles::default();
    let doc = build_document(job, &mut scratch)?;

    std::fs::create_dir_all(&job.output_directory).with_context(|| {
        format!(
            "Error creando directorio de salida `{}`",
            job.output_directory.display()
        )
    })?;

    // written beside the target and renamed into place once complete
    let path = job.output_path();
    let mut builder = tempfile::Builder::new();
    builder.prefix(".certificado_").suffix(".pdf");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        // temporary files default to owner-only access
        builder.permissions(std::fs::Permissions::from_mode(0o644));
    }
    let mut file = builder
        .tempfile_in(&job.output_directory)
        .with_context(|| {
            format!(
                "Error creando archivo en `{}`",
                job.output_directory.display()
            )
        })?;
    {
        let mut out = std::io::BufWriter::new(file.as_file_mut());
        doc.write(&mut out)
            .with_context(|| format!("Error escribiendo PDF `{}`", path.display()))?;
        out.flush()
            .with_context(|| format!("Error escribiendo PDF `{}`", path.display()))?;
    }
    file.persist(&path)
        .with_context(|| format!("Error guardando PDF `{}`", path.display()))?;

    log::debug!(
        "wrote `{}`, removing {} temporary image(s)",
        path.display(),
        scratch.len()
    );
    Ok(path)
}

fn build_document(job: &CertificateJob, scratch: &mut ScratchFiles) -> Result<Document> {
    let mut doc = Document::default();
    let flow = lay_out(job, &mut doc, scratch)?;
    if flow.overflows() {
        log::warn!(
            "El certificado de `{}` invade el margen inferior",
            job.participant.name
        );
    }
    doc.add_page(flow.finish());

    doc.info
        .title(job.title())
        .creator(concat!(
            env!("CARGO_PKG_NAME"),
            " ",
            env!("CARGO_PKG_VERSION")
        ))
        .creation_date(chrono::Utc::now());
    if !job.event.name.is_empty() {
        doc.info.subject(job.event.name.as_str());
    }
    if !job.event.organizers.is_empty() {
        doc.info.author(job.event.organizers.as_str());
    }

    Ok(doc)
}

/// Normalize and load an image, returning its index in `doc` and its aspect ratio.
fn add_image(
    doc: &mut Document,
    path: &Path,
    job: &CertificateJob,
    scratch: &mut ScratchFiles,
    what: &str,
) -> Result<(usize, f32)> {
    let safe = normalize::safe_image_path(path, &job.scratch_dir)
        .with_context(|| format!("Error procesando {what}"))?;
    let image = Image::new_from_disk(safe.path())
        .with_context(|| format!("Error procesando {what} `{}`", path.display()))?;
    scratch.keep(safe);

    let aspect_ratio = image.aspect_ratio();
    Ok((doc.add_image(image), aspect_ratio))
}

/// An optional image path that is set and exists on disk.
fn existing(path: &str) -> Option<&Path> {
    let path = Path::new(path);
    (!path.as_os_str().is_empty() && path.exists()).then_some(path)
}

fn lay_out(job: &CertificateJob, doc: &mut Document, scratch: &mut ScratchFiles) -> Result<Flow> {
    let event = &job.event;
    let participant = &job.participant;
    let mut flow = Flow::new();

    if job.background.exists() {
        let (index, _) = add_image(doc, &job.background, job, scratch, "imagen de fondo")?;
        flow.image(index, 0.0, 0.0, PAGE_WIDTH, layout::PAGE_HEIGHT);
    } else {
        flow.fill_page(Colour::new_rgb_bytes(245, 245, 250));
    }

    if let Some(logo) = existing(&event.logo_image) {
        let width = positive_or(event.logo_width, DEFAULT_LOGO_WIDTH);
        let (index, aspect_ratio) = add_image(doc, logo, job, scratch, "logo")?;
        flow.image(
            index,
            event.logo_x.unwrap_or(DEFAULT_LOGO_POSITION),
            event.logo_y.unwrap_or(DEFAULT_LOGO_POSITION),
            width,
            width / aspect_ratio,
        );
    }

    flow.set_y(TITLE_Y);
    flow.cell(job.title(), job.title_style(Font::Bold, 32.0), 15.0);

    flow.ln(6.0);
    flow.cell(INTRODUCTION, job.text_style(Font::Regular, 13.0), 8.0);

    flow.ln(3.0);
    flow.cell(&participant.name, job.title_style(Font::Bold, 24.0), 12.0);

    if !participant.affiliation.is_empty() {
        flow.ln(1.0);
        flow.cell(
            &participant.affiliation,
            job.text_style(Font::Italic, 11.0),
            6.0,
        );
    }

    flow.ln(5.0);
    let participation_type =
        non_empty_or(&participant.participation_type, DEFAULT_PARTICIPATION_TYPE);
    flow.cell(
        &format!("Por su participación como {participation_type} en el evento"),
        job.text_style(Font::Regular, 13.0),
        7.0,
    );

    flow.ln(1.0);
    flow.wrapped(
        &format!("\"{}\"", event.name),
        job.title_style(Font::Bold, 15.0),
        7.0,
    );

    if !participant.work_title.is_empty() {
        flow.ln(2.0);
        flow.cell(WORK_TITLE_LABEL, job.text_style(Font::Italic, 12.0), 6.0);
        flow.ln(0.5);
        flow.wrapped(
            &format!("\"{}\"", participant.work_title),
            job.text_style(Font::Regular, 12.0),
            6.0,
        );
    }

    flow.ln(5.0);
    flow.cell(
        &format!(
            "Celebrado del {} al {} en {}",
            event.start_date, event.end_date, event.location
        ),
        job.text_style(Font::Regular, 10.0),
        5.0,
    );

    if !event.isbn.is_empty() {
        flow.ln(1.0);
        flow.cell(
            &format!("ISBN: {}", event.isbn),
            job.text_style(Font::Regular, 10.0),
            5.0,
        );
    }

    if !event.organizers.is_empty() {
        flow.ln(1.0);
        flow.cell(
            &format!("Organizado por: {}", event.organizers),
            job.text_style(Font::Italic, 9.0),
            5.0,
        );
    }

    flow.ln(8.0);
    if let Some(signature) = existing(&event.signature_image) {
        let width = positive_or(event.signature_width, DEFAULT_SIGNATURE_WIDTH);
        let (index, aspect_ratio) = add_image(doc, signature, job, scratch, "firma")?;
        flow.image(
            index,
            (PAGE_WIDTH - width) / 2.0,
            flow.y(),
            width,
            width / aspect_ratio,
        );
        // reserves a fixed share of the width rather than the real image height
        flow.ln(width * 0.4 + 5.0);
    }

    flow.cell(&event.signature_name, job.text_style(Font::Bold, 11.0), 5.0);
    if !event.signature_role.is_empty() {
        flow.cell(
            &event.signature_role,
            job.text_style(Font::Regular, 10.0),
            5.0,
        );
    }

    Ok(flow)
}
