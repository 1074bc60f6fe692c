//! Raster image embedding.
//!
//! Only PNG and JPEG are supported, chosen by sniffing the file contents rather
//! than trusting the extension. Grey and RGB JPEGs are embedded without
//! re-encoding, since PDF's `DCTDecode` filter reads those streams directly.
//! Everything else, CMYK JPEGs and every PNG flavour included, is decoded and
//! re-compressed as RGB samples with an alpha soft mask when any pixel isn't
//! opaque.

use super::{deflate, PdfError};
use image::codecs::jpeg::JpegDecoder;
use image::{DynamicImage, GenericImageView, ImageDecoder, ImageFormat};
use lopdf::{dictionary, Object, ObjectId, Stream};
use std::io::Cursor;
use std::path::Path;

/// The closed set of raster formats that can be placed on a page.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
}

impl RasterFormat {
    pub fn sniff(bytes: &[u8]) -> Option<RasterFormat> {
        match image::guess_format(bytes).ok()? {
            ImageFormat::Png => Some(RasterFormat::Png),
            ImageFormat::Jpeg => Some(RasterFormat::Jpeg),
            _ => None,
        }
    }
}

/// Number of colour components declared by a JPEG's start-of-frame segment.
fn jpeg_components(bytes: &[u8]) -> Option<u8> {
    let mut pos = 2;
    while pos + 4 <= bytes.len() {
        if bytes[pos] != 0xFF {
            return None;
        }
        let marker = bytes[pos + 1];
        match marker {
            // fill bytes
            0xFF => {
                pos += 1;
                continue;
            }
            // standalone markers carry no length
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            // scan data follows, so no frame header was found
            0xDA => return None,
            _ => {}
        }

        let length = u16::from_be_bytes([bytes[pos + 2], bytes[pos + 3]]) as usize;
        let is_frame = matches!(marker, 0xC0..=0xCF) && !matches!(marker, 0xC4 | 0xC8 | 0xCC);
        if is_frame {
            return bytes.get(pos + 9).copied();
        }
        pos += 2 + length;
    }
    None
}

#[derive(Debug)]
pub(crate) enum ImageData {
    Jpeg {
        bytes: Vec<u8>,
        colour_space: &'static str,
    },
    /// zlib-compressed RGB samples with an optional alpha plane
    Pixels {
        rgb: Vec<u8>,
        alpha: Option<Vec<u8>>,
    },
}

#[derive(Debug)]
pub struct Image {
    pub width: u32,
    pub height: u32,
    pub(crate) data: ImageData,
}

impl Image {
    pub fn new_from_disk<P: AsRef<Path>>(path: P) -> Result<Image, PdfError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| PdfError::ReadImage {
            path: path.to_path_buf(),
            source,
        })?;
        Image::new_from_bytes(bytes)
    }

    pub fn new_from_bytes(bytes: Vec<u8>) -> Result<Image, PdfError> {
        match RasterFormat::sniff(&bytes).ok_or(PdfError::UnsupportedImage)? {
            RasterFormat::Jpeg => Image::from_jpeg(bytes),
            RasterFormat::Png => {
                let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Png)?;
                Image::from_pixels(decoded)
            }
        }
    }

    /// Width divided by height
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    fn from_jpeg(bytes: Vec<u8>) -> Result<Image, PdfError> {
        let decoder = JpegDecoder::new(Cursor::new(bytes.as_slice()))?;
        let (width, height) = decoder.dimensions();
        let colour_space = match jpeg_components(&bytes) {
            Some(1) => "DeviceGray",
            Some(3) => "DeviceRGB",
            // the decoder converts CMYK and YCCK to RGB
            _ => return Image::from_pixels(DynamicImage::from_decoder(decoder)?),
        };
        drop(decoder);

        Ok(Image {
            width,
            height,
            data: ImageData::Jpeg {
                bytes,
                colour_space,
            },
        })
    }

    fn from_pixels(decoded: DynamicImage) -> Result<Image, PdfError> {
        let (width, height) = decoded.dimensions();
        let rgba = decoded.to_rgba8();

        let mut rgb = Vec::with_capacity((width * height * 3) as usize);
        let mut alpha = Vec::with_capacity((width * height) as usize);
        let mut has_alpha = false;
        for pixel in rgba.pixels() {
            let [r, g, b, a] = pixel.0;
            has_alpha |= a != 255;
            rgb.extend_from_slice(&[r, g, b]);
            alpha.push(a);
        }

        let alpha = if has_alpha {
            Some(deflate(&alpha)?)
        } else {
            None
        };
        Ok(Image {
            width,
            height,
            data: ImageData::Pixels {
                rgb: deflate(&rgb)?,
                alpha,
            },
        })
    }

    /// Add this image (and its soft mask, if any) to `doc` as an image XObject.
    pub(crate) fn add_to(&self, doc: &mut lopdf::Document) -> ObjectId {
        let width = self.width as i64;
        let height = self.height as i64;
        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width,
            "Height" => height,
            "BitsPerComponent" => 8,
        };

        let content = match &self.data {
            ImageData::Jpeg {
                bytes,
                colour_space,
            } => {
                dict.set("ColorSpace", *colour_space);
                dict.set("Filter", "DCTDecode");
                bytes.clone()
            }
            ImageData::Pixels { rgb, alpha } => {
                dict.set("ColorSpace", "DeviceRGB");
                dict.set("Filter", "FlateDecode");
                if let Some(alpha) = alpha {
                    let smask = Stream::new(
                        dictionary! {
                            "Type" => "XObject",
                            "Subtype" => "Image",
                            "Width" => width,
                            "Height" => height,
                            "ColorSpace" => "DeviceGray",
                            "BitsPerComponent" => 8,
                            "Filter" => "FlateDecode",
                        },
                        alpha.clone(),
                    );
                    let smask_id = doc.add_object(smask);
                    dict.set("SMask", Object::Reference(smask_id));
                }
                rgb.clone()
            }
        };

        doc.add_object(Stream::new(dict, content))
    }
}
