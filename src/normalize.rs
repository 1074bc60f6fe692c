//! Rewriting interlaced PNGs as progressive ones before they are embedded.
//!
//! Interlaced (Adam7) files are decoded and re-encoded into a temporary file so
//! every PNG handed to the page renderer stores its scanlines top to bottom.
//! Temporary files belong to a [`ScratchFiles`] guard that removes them when the
//! certificate that needed them is done, however it finishes.

use anyhow::{Context, Result};
use image::ImageFormat;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// An image path that is safe to hand to the embedder.
#[derive(Debug)]
pub enum SafeImage {
    Original(PathBuf),
    Temporary(NamedTempFile),
}

impl SafeImage {
    pub fn path(&self) -> &Path {
        match self {
            SafeImage::Original(path) => path,
            SafeImage::Temporary(file) => file.path(),
        }
    }

    pub fn is_temporary(&self) -> bool {
        matches!(self, SafeImage::Temporary(_))
    }
}

fn has_png_extension(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("png"))
}

/// Whether the PNG in `bytes` is stored with Adam7 interlacing.
pub fn is_interlaced(bytes: &[u8]) -> Result<bool, png::DecodingError> {
    let reader = png::Decoder::new(Cursor::new(bytes)).read_info()?;
    Ok(reader.info().interlaced)
}

/// Make `path` embeddable, writing any re-encoded copy into `scratch_dir`.
///
/// Only files with a `.png` extension are inspected; everything else is passed
/// through untouched. A `.png` whose contents aren't PNG at all is passed
/// through too, and left for the embedder to identify.
pub fn safe_image_path(path: &Path, scratch_dir: &Path) -> Result<SafeImage> {
    if !has_png_extension(path) {
        return Ok(SafeImage::Original(path.to_path_buf()));
    }

    let bytes = std::fs::read(path)
        .with_context(|| format!("Error leyendo imagen `{}`", path.display()))?;
    if image::guess_format(&bytes).ok() != Some(ImageFormat::Png) {
        return Ok(SafeImage::Original(path.to_path_buf()));
    }
    let interlaced = is_interlaced(&bytes)
        .with_context(|| format!("Cabecera PNG inválida en `{}`", path.display()))?;
    if !interlaced {
        return Ok(SafeImage::Original(path.to_path_buf()));
    }

    let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png)
        .with_context(|| format!("Error decodificando PNG `{}`", path.display()))?;

    let mut file = tempfile::Builder::new()
        .prefix("cert_")
        .suffix(".png")
        .tempfile_in(scratch_dir)
        .with_context(|| {
            format!(
                "Error creando archivo temporal en `{}`",
                scratch_dir.display()
            )
        })?;
    // the encoder always writes progressive scanlines
    decoded
        .write_to(file.as_file_mut(), ImageFormat::Png)
        .with_context(|| format!("Error recodificando PNG `{}`", path.display()))?;

    log::debug!(
        "re-encoded interlaced PNG `{}` to `{}`",
        path.display(),
        file.path().display()
    );
    Ok(SafeImage::Temporary(file))
}

/// Owns the temporary files created while rendering one certificate.
///
/// Dropping the guard removes them.
#[derive(Debug, Default)]
pub struct ScratchFiles {
    images: Vec<SafeImage>,
}

impl ScratchFiles {
    /// Keep `image` alive until the guard is dropped.
    pub fn keep(&mut self, image: SafeImage) {
        if image.is_temporary() {
            self.images.push(image);
        }
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }
}

impl Drop for ScratchFiles {
    fn drop(&mut self) {
        for image in self.images.drain(..) {
            if let SafeImage::Temporary(file) = image {
                let path = file.path().to_path_buf();
                if let Err(e) = file.close() {
                    log::warn!("No se pudo borrar el archivo temporal `{}`: {e}", path.display());
                }
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod test_images {
    //! Hand-built PNG fixtures; the `image` encoder never writes Adam7.

    use flate2::write::ZlibEncoder;
    use flate2::{Compression, Crc};
    use std::io::Write;

    const SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn chunk(out: &mut Vec<u8>, kind: &[u8; 4], data: &[u8]) {
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(kind);
        out.extend_from_slice(data);
        let mut crc = Crc::new();
        crc.update(kind);
        crc.update(data);
        out.extend_from_slice(&crc.sum().to_be_bytes());
    }

    /// A 2x2 RGB PNG with Adam7 interlacing.
    ///
    /// With only four pixels, pass 1 holds (0,0), pass 6 holds (1,0) and pass 7
    /// holds the second row; every other pass is empty.
    pub fn interlaced_2x2(pixels: [[u8; 3]; 4]) -> Vec<u8> {
        let [p00, p10, p01, p11] = pixels;
        let mut raw = Vec::new();
        raw.push(0);
        raw.extend_from_slice(&p00);
        raw.push(0);
        raw.extend_from_slice(&p10);
        raw.push(0);
        raw.extend_from_slice(&p01);
        raw.extend_from_slice(&p11);

        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&raw).expect("can compress scanlines");
        let idat = encoder.finish().expect("can finish compression");

        let mut ihdr = Vec::new();
        ihdr.extend_from_slice(&2u32.to_be_bytes());
        ihdr.extend_from_slice(&2u32.to_be_bytes());
        // bit depth, colour type (RGB), compression, filter, interlace (Adam7)
        ihdr.extend_from_slice(&[8, 2, 0, 0, 1]);

        let mut png = SIGNATURE.to_vec();
        chunk(&mut png, b"IHDR", &ihdr);
        chunk(&mut png, b"IDAT", &idat);
        chunk(&mut png, b"IEND", &[]);
        png
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use image::{GenericImageView, Rgb, RgbImage};

    fn count_files(dir: &Path) -> usize {
        std::fs::read_dir(dir)
            .expect("can read scratch dir")
            .count()
    }

    #[test]
    fn non_png_paths_are_untouched() {
        let scratch = tempfile::tempdir().expect("can create temp dir");
        // never opened, so it doesn't need to exist
        let safe = safe_image_path(Path::new("firma.jpg"), scratch.path())
            .expect("can pass through jpeg");
        assert!(!safe.is_temporary());
        assert_eq!(safe.path(), Path::new("firma.jpg"));
        assert_eq!(count_files(scratch.path()), 0);
    }

    #[test]
    fn progressive_pngs_are_untouched() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let scratch = tempfile::tempdir().expect("can create temp dir");
        let path = dir.path().join("logo.png");
        RgbImage::from_pixel(3, 2, Rgb([1, 2, 3]))
            .save(&path)
            .expect("can save png");

        let safe = safe_image_path(&path, scratch.path()).expect("can check png");
        assert!(!safe.is_temporary());
        assert_eq!(safe.path(), path.as_path());
        assert_eq!(count_files(scratch.path()), 0);
    }

    #[test]
    fn interlaced_pngs_are_reencoded() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let scratch = tempfile::tempdir().expect("can create temp dir");
        let path = dir.path().join("fondo.PNG");
        let pixels = [[255, 0, 0], [0, 255, 0], [0, 0, 255], [255, 255, 255]];
        std::fs::write(&path, test_images::interlaced_2x2(pixels)).expect("can write png");

        let safe = safe_image_path(&path, scratch.path()).expect("can normalize png");
        assert!(safe.is_temporary());
        assert_ne!(safe.path(), path.as_path());
        assert!(safe.path().starts_with(scratch.path()));
        assert_eq!(count_files(scratch.path()), 1);

        let bytes = std::fs::read(safe.path()).expect("can read normalized png");
        assert!(!is_interlaced(&bytes).expect("normalized file is a png"));

        let original = image::load_from_memory(&std::fs::read(&path).expect("can read original"))
            .expect("can decode original");
        let normalized = image::open(safe.path()).expect("can decode normalized");
        assert_eq!(original.dimensions(), normalized.dimensions());
        assert_eq!(original.to_rgb8(), normalized.to_rgb8());
        assert_eq!(normalized.to_rgb8().get_pixel(1, 0), &Rgb([0, 255, 0]));

        let mut scratch_files = ScratchFiles::default();
        scratch_files.keep(safe);
        assert_eq!(scratch_files.len(), 1);
        drop(scratch_files);
        assert_eq!(count_files(scratch.path()), 0);
    }

    #[test]
    fn png_extension_with_other_contents_is_passed_through() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let scratch = tempfile::tempdir().expect("can create temp dir");
        let path = dir.path().join("actually_a.png");
        image::DynamicImage::from(RgbImage::from_pixel(2, 2, Rgb([9, 9, 9])))
            .save_with_format(&path, ImageFormat::Jpeg)
            .expect("can save jpeg");

        let safe = safe_image_path(&path, scratch.path()).expect("can check file");
        assert!(!safe.is_temporary());
    }

    #[test]
    fn can_detect_interlacing() {
        let interlaced = test_images::interlaced_2x2([[1, 2, 3]; 4]);
        assert!(is_interlaced(&interlaced).expect("can read header"));
        assert!(is_interlaced(b"\x89PNG\r\n\x1a\ngarbage").is_err());
    }

    #[test]
    fn broken_png_header_is_an_error() {
        let dir = tempfile::tempdir().expect("can create temp dir");
        let path = dir.path().join("roto.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\ngarbage").expect("can write file");
        let err = safe_image_path(&path, dir.path()).expect_err("header is broken");
        assert!(format!("{err:#}").contains("Cabecera PNG"));
    }

    #[test]
    fn missing_png_is_an_error() {
        let scratch = tempfile::tempdir().expect("can create temp dir");
        let missing = scratch.path().join("nope.png");
        assert!(safe_image_path(&missing, scratch.path()).is_err());
    }

    #[test]
    fn originals_are_not_kept() {
        let mut scratch_files = ScratchFiles::default();
        scratch_files.keep(SafeImage::Original(PathBuf::from("logo.jpg")));
        assert_eq!(scratch_files.len(), 0);
    }
}
