//! The PDF core fonts used for certificate text.
//!
//! Core fonts are never embedded: every conforming reader ships them. In exchange
//! they only cover a single-byte encoding, so all text is transcoded to
//! Windows-1252 (`WinAnsiEncoding`) before it reaches a content stream. Accented
//! Latin letters and `ñ` survive the trip; anything else is replaced with `?`.
//!
//! Advance widths come from the Adobe font metrics, in 1/1000 em. Accented
//! letters share the width of their base letter.

use super::Pt;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Font {
    Regular,
    Bold,
    Italic,
}

impl Font {
    pub fn all() -> &'static [Font] {
        &[Font::Regular, Font::Bold, Font::Italic]
    }

    pub fn base_font(&self) -> &'static str {
        match self {
            Font::Regular => "Helvetica",
            Font::Bold => "Helvetica-Bold",
            Font::Italic => "Helvetica-Oblique",
        }
    }

    /// Name of the font in page resource dictionaries
    pub fn resource_name(&self) -> &'static str {
        match self {
            Font::Regular => "F1",
            Font::Bold => "F2",
            Font::Italic => "F3",
        }
    }

    fn widths(&self) -> &'static [u16; 95] {
        match self {
            // the oblique cut shares its metrics with the upright one
            Font::Regular | Font::Italic => &HELVETICA_WIDTHS,
            Font::Bold => &HELVETICA_BOLD_WIDTHS,
        }
    }

    fn glyph_width(&self, c: char) -> u16 {
        let widths = self.widths();
        let bold = matches!(self, Font::Bold);
        let c = to_win_ansi_char(c);
        match c {
            ' '..='~' => widths[c as usize - 32],
            'ì' | 'í' | 'î' | 'ï' => 278,
            'Æ' | '—' | '…' | '‰' => 1000,
            'æ' => 889,
            'Œ' | 'œ' => 1000,
            'ß' | '¿' => 611,
            '¡' => 333,
            'ª' => 370,
            'º' => 365,
            '°' => 400,
            '·' | '•' => 350,
            '‘' | '’' | '‚' => {
                if bold {
                    278
                } else {
                    222
                }
            }
            '“' | '”' | '„' => {
                if bold {
                    500
                } else {
                    333
                }
            }
            _ => match base_letter(c) {
                Some(base) => widths[base as usize - 32],
                None => 556,
            },
        }
    }

    /// Width of `text` when set at `size`.
    pub fn width_of_text(&self, text: &str, size: Pt) -> Pt {
        let units: u32 = text.chars().map(|c| self.glyph_width(c) as u32).sum();
        Pt(units as f32 * size.0 / 1000.0)
    }
}

/// Transcode `text` to Windows-1252 bytes for a `WinAnsiEncoding` font.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| {
            let c = to_win_ansi_char(c);
            match c as u32 {
                0x20..=0x7E | 0xA0..=0xFF => c as u8,
                _ => win_ansi_extra(c).unwrap_or(b'?'),
            }
        })
        .collect()
}

/// Map a character onto the one that will actually be shown.
fn to_win_ansi_char(c: char) -> char {
    match c as u32 {
        0x20..=0x7E | 0xA0..=0xFF => c,
        _ if c == '\t' || c == '\n' || c == '\r' => ' ',
        _ if win_ansi_extra(c).is_some() => c,
        _ => '?',
    }
}

/// The Windows-1252 code points in 0x80..=0x9F.
fn win_ansi_extra(c: char) -> Option<u8> {
    let b = match c {
        '€' => 0x80,
        '‚' => 0x82,
        'ƒ' => 0x83,
        '„' => 0x84,
        '…' => 0x85,
        '†' => 0x86,
        '‡' => 0x87,
        'ˆ' => 0x88,
        '‰' => 0x89,
        'Š' => 0x8A,
        '‹' => 0x8B,
        'Œ' => 0x8C,
        'Ž' => 0x8E,
        '‘' => 0x91,
        '’' => 0x92,
        '“' => 0x93,
        '”' => 0x94,
        '•' => 0x95,
        '–' => 0x96,
        '—' => 0x97,
        '˜' => 0x98,
        '™' => 0x99,
        'š' => 0x9A,
        '›' => 0x9B,
        'œ' => 0x9C,
        'ž' => 0x9E,
        'Ÿ' => 0x9F,
        _ => return None,
    };
    Some(b)
}

fn base_letter(c: char) -> Option<char> {
    let base = match c {
        'À'..='Å' => 'A',
        'Ç' => 'C',
        'È'..='Ë' => 'E',
        'Ì'..='Ï' => 'I',
        'Ð' => 'D',
        'Ñ' => 'N',
        'Ò'..='Ö' | 'Ø' => 'O',
        'Ù'..='Ü' => 'U',
        'Ý' | 'Ÿ' => 'Y',
        'Þ' => 'P',
        'Š' => 'S',
        'Ž' => 'Z',
        'à'..='å' => 'a',
        'ç' => 'c',
        'è'..='ë' => 'e',
        'ñ' => 'n',
        'ò'..='ö' | 'ø' | 'ð' => 'o',
        'ù'..='ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'þ' => 'p',
        'š' => 's',
        'ž' => 'z',
        '×' => '+',
        '÷' => '+',
        '«' | '»' | '‹' | '›' => 'a',
        '–' => '0',
        _ => return None,
    };
    Some(base)
}

#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    // space ! " # $ % & ' ( ) * + , - . /
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    // 0-9
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    // : ; < = > ? @
    278, 278, 584, 584, 584, 556, 1015,
    // A-Z
    667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    // [ \ ] ^ _ `
    278, 278, 278, 469, 556, 333,
    // a-z
    556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
    556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
    // { | } ~
    334, 260, 334, 584,
];

#[rustfmt::skip]
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
    333, 333, 584, 584, 584, 611, 975,
    722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
    722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
    333, 278, 333, 584, 556, 333,
    556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
    611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
    389, 280, 389, 584,
];
