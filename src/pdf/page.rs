use super::{Colour, Font, Pt};

/// A rectangle in page space, with the origin at the bottom-left corner.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Rect {
    pub x1: Pt,
    pub y1: Pt,
    pub x2: Pt,
    pub y2: Pt,
}

impl Rect {
    pub fn width(&self) -> Pt {
        self.x2 - self.x1
    }

    pub fn height(&self) -> Pt {
        self.y2 - self.y1
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpanFont {
    pub font: Font,
    pub size: Pt,
}

/// A single line of text whose baseline starts at `coords`.
#[derive(Clone, Debug, PartialEq)]
pub struct SpanLayout {
    pub text: String,
    pub font: SpanFont,
    pub colour: Colour,
    pub coords: (Pt, Pt),
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ImageLayout {
    pub image_index: usize,
    pub position: Rect,
}

#[derive(Clone, Debug, PartialEq)]
pub enum PageContents {
    Fill { rect: Rect, colour: Colour },
    Image(ImageLayout),
    Text(SpanLayout),
}

/// A page is a display list, painted in insertion order.
#[derive(Clone, Debug, PartialEq)]
pub struct Page {
    pub width: Pt,
    pub height: Pt,
    pub contents: Vec<PageContents>,
}

impl Page {
    pub fn new(size: (Pt, Pt)) -> Page {
        Page {
            width: size.0,
            height: size.1,
            contents: Vec::default(),
        }
    }

    pub fn add_fill(&mut self, rect: Rect, colour: Colour) {
        self.contents.push(PageContents::Fill { rect, colour });
    }

    pub fn add_image(&mut self, layout: ImageLayout) {
        self.contents.push(PageContents::Image(layout));
    }

    pub fn add_span(&mut self, span: SpanLayout) {
        self.contents.push(PageContents::Text(span));
    }

    #[cfg(test)]
    pub fn spans(&self) -> impl Iterator<Item = &SpanLayout> {
        self.contents.iter().filter_map(|c| match c {
            PageContents::Text(span) => Some(span),
            _ => None,
        })
    }

    #[cfg(test)]
    pub fn images(&self) -> impl Iterator<Item = &ImageLayout> {
        self.contents.iter().filter_map(|c| match c {
            PageContents::Image(image) => Some(image),
            _ => None,
        })
    }
}
