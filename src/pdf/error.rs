use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("Error de E/S: {0}")]
    Io(#[from] std::io::Error),

    #[error("Error leyendo imagen `{path}`")]
    ReadImage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error decodificando imagen: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Formato de imagen no soportado (se espera PNG o JPEG)")]
    UnsupportedImage,

    #[error("Error generando PDF: {0}")]
    Encode(#[from] lopdf::Error),
}
