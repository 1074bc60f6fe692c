//! A small page model for single-page documents, encoded with `lopdf`.
//!
//! Pages are built up as display lists of fills, images and text spans in PDF
//! space (points, origin at the bottom-left). Nothing touches the PDF object
//! graph until [`Document::write`], which keeps layout code free of encoding
//! concerns and makes laid-out pages directly comparable.

mod colour;
pub use colour::*;

mod document;
pub use document::*;

mod error;
pub use error::*;

mod fonts;
pub use fonts::Font;

mod image;
pub use self::image::*;

mod page;
pub use page::*;

mod units;
pub use units::*;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::io::Write;

pub(crate) fn deflate(data: &[u8]) -> std::io::Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data)?;
    encoder.finish()
}
