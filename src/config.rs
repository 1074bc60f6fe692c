//! Loading the JSON event description.
//!
//! Every field is optional. Text fields treat the empty string as "not set",
//! which is also what a missing field deserializes to.
//!
//! ## Colour defaults
//!
//! A colour of `{0, 0, 0}` is indistinguishable from a missing colour and is
//! replaced with the default, so pure black can't be requested. Use `{1, 1, 1}`
//! for visually-black text.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_BACKGROUND: &str = "background.png";
pub const DEFAULT_OUTPUT_DIRECTORY: &str = "certificados";

/// The event every certificate in a run refers to.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Event {
    pub name: String,
    pub location: String,
    /// Free text, printed as-is
    pub start_date: String,
    /// Free text, printed as-is
    pub end_date: String,
    pub isbn: String,
    pub organizers: String,
    pub signature_name: String,
    pub signature_role: String,
    pub signature_image: String,
    /// Width of the signature image in mm; `<= 0` means the default
    pub signature_width: f32,
    pub certificate_title: String,
    pub logo_image: String,
    /// Width of the logo in mm; `<= 0` means the default
    pub logo_width: f32,
    pub logo_x: Option<f32>,
    pub logo_y: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Participant {
    pub name: String,
    pub work_title: String,
    /// e.g. "Ponente", "Asistente", "Autor"
    pub participation_type: String,
    pub affiliation: String,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const DEFAULT_FONT: Rgb = Rgb::new(50, 50, 50);
    pub const DEFAULT_TITLE: Rgb = Rgb::new(0, 51, 102);

    pub const fn new(r: u8, g: u8, b: u8) -> Rgb {
        Rgb { r, g, b }
    }

    pub fn is_zero(&self) -> bool {
        *self == Rgb::default()
    }

    fn or_default_when_zero(self, default: Rgb) -> Rgb {
        if self.is_zero() {
            default
        } else {
            self
        }
    }
}

/// The whole input document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CertificateData {
    pub event: Event,
    pub participants: Vec<Participant>,
    pub background_image: String,
    pub output_directory: String,
    pub font_color: Rgb,
    pub title_color: Rgb,
}

impl CertificateData {
    pub fn from_json(contents: &str) -> Result<CertificateData> {
        let mut data: CertificateData =
            serde_json::from_str(contents).with_context(|| "Error parseando JSON")?;
        data.apply_defaults();
        Ok(data)
    }

    fn apply_defaults(&mut self) {
        self.font_color = self.font_color.or_default_when_zero(Rgb::DEFAULT_FONT);
        self.title_color = self.title_color.or_default_when_zero(Rgb::DEFAULT_TITLE);
    }
}

/// Read and parse the JSON document at `path`, applying colour defaults.
pub fn load<P: AsRef<Path>>(path: P) -> Result<CertificateData> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Error leyendo JSON '{}'", path.display()))?;
    CertificateData::from_json(&contents)
}

/// Where a run reads its background from and writes its certificates to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub background: PathBuf,
    pub output_directory: PathBuf,
}

impl Settings {
    /// Resolve paths with the precedence flag > JSON > built-in default.
    ///
    /// Empty strings count as "not supplied" at every level.
    pub fn resolve(
        data: &CertificateData,
        background_flag: Option<&Path>,
        output_flag: Option<&Path>,
    ) -> Settings {
        Settings {
            background: pick(background_flag, &data.background_image, DEFAULT_BACKGROUND),
            output_directory: pick(output_flag, &data.output_directory, DEFAULT_OUTPUT_DIRECTORY),
        }
    }
}

fn pick(flag: Option<&Path>, json: &str, default: &str) -> PathBuf {
    flag.filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .or_else(|| (!json.is_empty()).then(|| PathBuf::from(json)))
        .unwrap_or_else(|| PathBuf::from(default))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn missing_colours_get_defaults() {
        let data = CertificateData::from_json(r#"{"participants": []}"#).expect("can parse");
        assert_eq!(data.font_color, Rgb::new(50, 50, 50));
        assert_eq!(data.title_color, Rgb::new(0, 51, 102));
    }

    #[test]
    fn explicit_colours_are_preserved() {
        let data = CertificateData::from_json(
            r#"{"font_color": {"r": 10, "g": 20, "b": 30}, "title_color": {"r": 200, "g": 0, "b": 0}}"#,
        )
        .expect("can parse");
        assert_eq!(data.font_color, Rgb::new(10, 20, 30));
        assert_eq!(data.title_color, Rgb::new(200, 0, 0));
    }

    #[test]
    fn explicit_black_is_treated_as_missing() {
        let data = CertificateData::from_json(
            r#"{"font_color": {"r": 0, "g": 0, "b": 0}, "title_color": {"r": 0, "g": 0, "b": 0}}"#,
        )
        .expect("can parse");
        assert_eq!(data.font_color, Rgb::DEFAULT_FONT);
        assert_eq!(data.title_color, Rgb::DEFAULT_TITLE);
    }

    #[test]
    fn partial_colours_fill_missing_channels_with_zero() {
        let data =
            CertificateData::from_json(r#"{"font_color": {"b": 90}}"#).expect("can parse");
        assert_eq!(data.font_color, Rgb::new(0, 0, 90));
    }

    #[test]
    fn can_parse_a_full_document() {
        let data = CertificateData::from_json(
            r#"{
                "event": {
                    "name": "Congreso Internacional",
                    "location": "Lima",
                    "start_date": "1 de marzo",
                    "end_date": "3 de marzo de 2025",
                    "isbn": "978-3-16-148410-0",
                    "organizers": "Universidad Nacional",
                    "signature_name": "Dra. Ana Pérez",
                    "signature_role": "Presidenta",
                    "signature_width": 50,
                    "logo_image": "logo.png",
                    "logo_x": 0
                },
                "participants": [
                    {"name": "Juan Núñez", "participation_type": "Ponente", "work_title": "Redes", "affiliation": "UNI"}
                ],
                "background_image": "fondo.jpg",
                "output_directory": "salida"
            }"#,
        )
        .expect("can parse");
        assert_eq!(data.event.signature_width, 50.0);
        assert_eq!(data.event.logo_x, Some(0.0));
        assert_eq!(data.event.logo_y, None);
        assert_eq!(data.participants.len(), 1);
        assert_eq!(data.participants[0].participation_type, "Ponente");
        assert_eq!(data.background_image, "fondo.jpg");
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(CertificateData::from_json("{ not json").is_err());
        assert!(CertificateData::from_json(r#"{"font_color": {"r": 300}}"#).is_err());
    }

    #[test]
    fn unreadable_file_is_an_error() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let err = load(dir.path().join("missing.json")).expect_err("file is missing");
        assert!(format!("{err:#}").contains("missing.json"));
    }

    #[test]
    fn flags_override_json_which_overrides_defaults() {
        let mut data = CertificateData::default();
        let settings = Settings::resolve(&data, None, None);
        assert_eq!(settings.background, PathBuf::from(DEFAULT_BACKGROUND));
        assert_eq!(settings.output_directory, PathBuf::from(DEFAULT_OUTPUT_DIRECTORY));

        data.background_image = "fondo.png".to_string();
        data.output_directory = "salida".to_string();
        let settings = Settings::resolve(&data, None, None);
        assert_eq!(settings.background, PathBuf::from("fondo.png"));
        assert_eq!(settings.output_directory, PathBuf::from("salida"));

        let settings = Settings::resolve(
            &data,
            Some(Path::new("otro.png")),
            Some(Path::new("otra_salida")),
        );
        assert_eq!(settings.background, PathBuf::from("otro.png"));
        assert_eq!(settings.output_directory, PathBuf::from("otra_salida"));
    }

    #[test]
    fn empty_flags_count_as_missing() {
        let data = CertificateData {
            output_directory: "salida".to_string(),
            ..CertificateData::default()
        };
        let settings = Settings::resolve(&data, Some(Path::new("")), Some(Path::new("")));
        assert_eq!(settings.background, PathBuf::from(DEFAULT_BACKGROUND));
        assert_eq!(settings.output_directory, PathBuf::from("salida"));
    }
}
