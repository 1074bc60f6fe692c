//! Line-flow layout on a fixed landscape A4 page.
//!
//! Positions are tracked in millimetres from the top-left corner, the way the
//! certificate template is specified, and converted to PDF space as items are
//! placed. Text lives in full-width cells between the side margins: each cell has
//! a fixed height, centres its text horizontally, and moves the cursor down by
//! that height.

use crate::pdf::{pagesize, Colour, Font, ImageLayout, Mm, Page, Pt, Rect, SpanFont, SpanLayout};

pub const PAGE_WIDTH: f32 = pagesize::A4_LANDSCAPE_MM.0 .0;
pub const PAGE_HEIGHT: f32 = pagesize::A4_LANDSCAPE_MM.1 .0;
const SIDE_MARGIN: f32 = 10.0;
const BOTTOM_MARGIN: f32 = 20.0;
/// Horizontal padding inside a cell when wrapping text
const CELL_PADDING: f32 = 1.0;

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    /// Font size in points
    pub size: f32,
    pub colour: Colour,
}

fn pt(mm: f32) -> Pt {
    Mm(mm).into()
}

fn mm(pt: Pt) -> f32 {
    Mm::from(pt).0
}

/// Convert a top-left anchored box in millimetres to a PDF rectangle.
pub fn rect_mm(x: f32, y: f32, width: f32, height: f32) -> Rect {
    Rect {
        x1: pt(x),
        y1: pt(PAGE_HEIGHT - y - height),
        x2: pt(x + width),
        y2: pt(PAGE_HEIGHT - y),
    }
}

pub struct Flow {
    page: Page,
    y: f32,
}

impl Flow {
    pub fn new() -> Flow {
        Flow {
            page: Page::new(pagesize::a4_landscape()),
            y: SIDE_MARGIN,
        }
    }

    pub fn y(&self) -> f32 {
        self.y
    }

    pub fn set_y(&mut self, y: f32) {
        self.y = y;
    }

    /// Move the cursor down by `height` mm.
    pub fn ln(&mut self, height: f32) {
        self.y += height;
    }

    /// Whether the cursor has moved into the bottom margin.
    pub fn overflows(&self) -> bool {
        self.y > PAGE_HEIGHT - BOTTOM_MARGIN
    }

    pub fn fill_page(&mut self, colour: Colour) {
        self.page
            .add_fill(rect_mm(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT), colour);
    }

    /// Place an image with its top-left corner at (`x`, `y`). The cursor doesn't move.
    pub fn image(&mut self, image_index: usize, x: f32, y: f32, width: f32, height: f32) {
        self.page.add_image(ImageLayout {
            image_index,
            position: rect_mm(x, y, width, height),
        });
    }

    /// A single centred line of text in a cell `height` mm tall.
    pub fn cell(&mut self, text: &str, style: TextStyle, height: f32) {
        if !text.is_empty() {
            let size = Pt(style.size);
            let width = mm(style.font.width_of_text(text, size));
            let x = SIDE_MARGIN + (PAGE_WIDTH - 2.0 * SIDE_MARGIN - width) / 2.0;
            let baseline = self.y + 0.5 * height + 0.3 * mm(size);
            self.page.add_span(SpanLayout {
                text: text.to_string(),
                font: SpanFont {
                    font: style.font,
                    size,
                },
                colour: style.colour,
                coords: (pt(x), pt(PAGE_HEIGHT - baseline)),
            });
        }
        self.ln(height);
    }

    /// Centred text wrapped to the cell width, one cell per line.
    pub fn wrapped(&mut self, text: &str, style: TextStyle, line_height: f32) {
        let max_width = pt(PAGE_WIDTH - 2.0 * SIDE_MARGIN - 2.0 * CELL_PADDING);
        for line in wrap_text(text, style.font, Pt(style.size), max_width) {
            self.cell(&line, style, line_height);
        }
    }

    pub fn finish(self) -> Page {
        self.page
    }
}

/// Break `text` into lines no wider than `max_width`.
///
/// Lines break at spaces; a word that doesn't fit on a line of its own is split
/// between characters. Explicit newlines always start a new line.
pub fn wrap_text(text: &str, font: Font, size: Pt, max_width: Pt) -> Vec<String> {
    let fits = |s: &str| font.width_of_text(s, size) <= max_width;
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut line = String::new();
        for word in paragraph.split(' ').filter(|w| !w.is_empty()) {
            let candidate = if line.is_empty() {
                word.to_string()
            } else {
                format!("{line} {word}")
            };
            if fits(&candidate) {
                line = candidate;
                continue;
            }

            if !line.is_empty() {
                lines.push(std::mem::take(&mut line));
            }
            if fits(word) {
                line = word.to_string();
                continue;
            }

            for c in word.chars() {
                line.push(c);
                if !fits(&line) && line.chars().count() > 1 {
                    line.pop();
                    lines.push(std::mem::take(&mut line));
                    line.push(c);
                }
            }
        }
        lines.push(line);
    }

    lines
}

#[cfg(test)]
mod test {
    use super::*;

    fn style() -> TextStyle {
        TextStyle {
            font: Font::Regular,
            size: 12.0,
            colour: Colour::new_rgb_bytes(50, 50, 50),
        }
    }

    #[test]
    fn short_text_stays_on_one_line() {
        let lines = wrap_text("Congreso de Ingeniería", Font::Bold, Pt(15.0), pt(275.0));
        assert_eq!(lines, vec!["Congreso de Ingeniería".to_string()]);
    }

    #[test]
    fn long_text_wraps_at_spaces() {
        let text = "uno dos tres cuatro cinco seis siete ocho nueve diez";
        let max_width = Font::Regular.width_of_text("uno dos tres cuatro", Pt(10.0));
        let lines = wrap_text(text, Font::Regular, Pt(10.0), max_width);
        assert!(lines.len() > 1);
        assert_eq!(lines[0], "uno dos tres cuatro");
        assert_eq!(lines.join(" "), text);
        for line in lines.iter() {
            assert!(Font::Regular.width_of_text(line, Pt(10.0)) <= max_width);
        }
    }

    #[test]
    fn overlong_words_are_split() {
        let max_width = Font::Regular.width_of_text("aaaa", Pt(10.0));
        let lines = wrap_text("aaaaaaaaaa", Font::Regular, Pt(10.0), max_width);
        assert_eq!(lines, vec!["aaaa", "aaaa", "aa"]);
    }

    #[test]
    fn empty_text_is_one_empty_line() {
        assert_eq!(
            wrap_text("", Font::Regular, Pt(10.0), pt(100.0)),
            vec![String::new()]
        );
    }

    #[test]
    fn cells_are_centred_and_advance_the_cursor() {
        let mut flow = Flow::new();
        flow.set_y(25.0);
        flow.cell("Hola", style(), 15.0);
        assert_eq!(flow.y(), 40.0);

        let page = flow.finish();
        let span = page.spans().next().expect("has a span");
        let width = Font::Regular.width_of_text("Hola", Pt(12.0));
        let centre = span.coords.0 + width / 2.0;
        assert!((mm(centre) - PAGE_WIDTH / 2.0).abs() < 1e-3);

        let baseline = PAGE_HEIGHT - mm(span.coords.1);
        assert!((baseline - (25.0 + 7.5 + 0.3 * mm(Pt(12.0)))).abs() < 1e-3);
    }

    #[test]
    fn empty_cells_only_advance() {
        let mut flow = Flow::new();
        flow.cell("", style(), 5.0);
        assert_eq!(flow.y(), SIDE_MARGIN + 5.0);
        assert_eq!(flow.finish().spans().count(), 0);
    }

    #[test]
    fn images_are_placed_from_the_top_left() {
        let rect = rect_mm(10.0, 10.0, 30.0, 15.0);
        assert!((mm(rect.x1) - 10.0).abs() < 1e-3);
        assert!((mm(rect.y2) - (PAGE_HEIGHT - 10.0)).abs() < 1e-3);
        assert!((mm(rect.y1) - (PAGE_HEIGHT - 25.0)).abs() < 1e-3);
        assert!((mm(rect.width()) - 30.0).abs() < 1e-3);
    }

    #[test]
    fn can_detect_overflow() {
        let mut flow = Flow::new();
        flow.set_y(180.0);
        assert!(!flow.overflows());
        flow.ln(15.0);
        assert!(flow.overflows());
    }
}
