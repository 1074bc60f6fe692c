use super::fonts::encode_win_ansi;
use super::{deflate, Colour, Font, Image, Page, PageContents, PdfError};
use chrono::{DateTime, Utc};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Object, Stream, StringFormat};
use std::io::Write;

/// Document metadata, shown by readers under "Document Properties".
#[derive(Debug, Clone, Default)]
pub struct Info {
    title: Option<String>,
    subject: Option<String>,
    author: Option<String>,
    creator: Option<String>,
    creation_date: Option<DateTime<Utc>>,
}

impl Info {
    pub fn title<S: Into<String>>(&mut self, title: S) -> &mut Self {
        self.title = Some(title.into());
        self
    }

    pub fn subject<S: Into<String>>(&mut self, subject: S) -> &mut Self {
        self.subject = Some(subject.into());
        self
    }

    pub fn author<S: Into<String>>(&mut self, author: S) -> &mut Self {
        self.author = Some(author.into());
        self
    }

    pub fn creator<S: Into<String>>(&mut self, creator: S) -> &mut Self {
        self.creator = Some(creator.into());
        self
    }

    pub fn creation_date(&mut self, date: DateTime<Utc>) -> &mut Self {
        self.creation_date = Some(date);
        self
    }

    fn to_dictionary(&self) -> Dictionary {
        let mut dict = Dictionary::new();
        let fields = [
            ("Title", &self.title),
            ("Subject", &self.subject),
            ("Author", &self.author),
            ("Creator", &self.creator),
        ];
        for (key, value) in fields {
            if let Some(value) = value {
                dict.set(key, text_string(value));
            }
        }
        dict.set("Producer", text_string(env!("CARGO_PKG_NAME")));
        if let Some(date) = self.creation_date {
            let date = date.format("D:%Y%m%d%H%M%SZ").to_string();
            dict.set("CreationDate", Object::string_literal(date));
        }
        dict
    }
}

/// PDF text strings are either PDFDocEncoding or UTF-16BE with a byte order mark.
fn text_string(text: &str) -> Object {
    if text.is_ascii() {
        return Object::string_literal(text);
    }
    let mut bytes = vec![0xFE, 0xFF];
    for unit in text.encode_utf16() {
        bytes.extend_from_slice(&unit.to_be_bytes());
    }
    Object::String(bytes, StringFormat::Hexadecimal)
}

fn image_resource_name(index: usize) -> String {
    format!("Im{index}")
}

#[derive(Debug, Default)]
pub struct Document {
    pub pages: Vec<Page>,
    pub images: Vec<Image>,
    pub info: Info,
}

impl Document {
    /// Add an image to the document, returning the index pages refer to it by.
    pub fn add_image(&mut self, image: Image) -> usize {
        self.images.push(image);
        self.images.len() - 1
    }

    pub fn add_page(&mut self, page: Page) -> usize {
        self.pages.push(page);
        self.pages.len() - 1
    }

    /// Encode the document and write it to `out`.
    pub fn write<W: Write>(&self, out: &mut W) -> Result<(), PdfError> {
        let mut doc = lopdf::Document::with_version("1.4");
        let pages_id = doc.new_object_id();

        let mut fonts = Dictionary::new();
        for font in Font::all() {
            let font_id = doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            fonts.set(font.resource_name(), Object::Reference(font_id));
        }

        let mut xobjects = Dictionary::new();
        for (index, image) in self.images.iter().enumerate() {
            let image_id = image.add_to(&mut doc);
            xobjects.set(image_resource_name(index), Object::Reference(image_id));
        }

        // every page shares one resource dictionary
        let resources_id = doc.add_object(dictionary! {
            "Font" => fonts,
            "XObject" => xobjects,
        });

        let mut kids: Vec<Object> = Vec::with_capacity(self.pages.len());
        for page in self.pages.iter() {
            let content = render_contents(page).encode()?;
            let content_id = doc.add_object(Stream::new(
                dictionary! { "Filter" => "FlateDecode" },
                deflate(&content)?,
            ));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "MediaBox" => vec![0.into(), 0.into(), page.width.0.into(), page.height.0.into()],
                "Contents" => content_id,
                "Resources" => resources_id,
            });
            kids.push(page_id.into());
        }

        let count = kids.len() as i64;
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        let info_id = doc.add_object(self.info.to_dictionary());
        doc.trailer.set("Info", info_id);

        doc.save_to(out)?;
        Ok(())
    }
}

fn set_fill_colour(ops: &mut Vec<Operation>, colour: &Colour) {
    ops.push(Operation::new(
        "rg",
        vec![colour.r.into(), colour.g.into(), colour.b.into()],
    ));
}

fn render_contents(page: &Page) -> Content {
    let mut ops = Vec::new();
    for item in page.contents.iter() {
        match item {
            PageContents::Fill { rect, colour } => {
                ops.push(Operation::new("q", vec![]));
                set_fill_colour(&mut ops, colour);
                ops.push(Operation::new(
                    "re",
                    vec![
                        rect.x1.0.into(),
                        rect.y1.0.into(),
                        rect.width().0.into(),
                        rect.height().0.into(),
                    ],
                ));
                ops.push(Operation::new("f", vec![]));
                ops.push(Operation::new("Q", vec![]));
            }
            PageContents::Image(layout) => {
                let rect = &layout.position;
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new(
                    "cm",
                    vec![
                        rect.width().0.into(),
                        0.into(),
                        0.into(),
                        rect.height().0.into(),
                        rect.x1.0.into(),
                        rect.y1.0.into(),
                    ],
                ));
                ops.push(Operation::new(
                    "Do",
                    vec![Object::Name(
                        image_resource_name(layout.image_index).into_bytes(),
                    )],
                ));
                ops.push(Operation::new("Q", vec![]));
            }
            PageContents::Text(span) => {
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new(
                    "Tf",
                    vec![
                        span.font.font.resource_name().into(),
                        span.font.size.0.into(),
                    ],
                ));
                set_fill_colour(&mut ops, &span.colour);
                ops.push(Operation::new(
                    "Td",
                    vec![span.coords.0 .0.into(), span.coords.1 .0.into()],
                ));
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(
                        encode_win_ansi(&span.text),
                        StringFormat::Hexadecimal,
                    )],
                ));
                ops.push(Operation::new("ET", vec![]));
            }
        }
    }
    Content { operations: ops }
}
