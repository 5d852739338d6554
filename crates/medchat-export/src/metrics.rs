//! Font metrics for the two standard fonts the exporter draws with
//!
//! Widths are the Adobe AFM advance widths (1/1000 em) of Helvetica and
//! Helvetica-Bold for printable ASCII. Text is written in WinAnsiEncoding, so
//! measurement goes through the same byte mapping the PDF writer uses: what
//! gets measured is exactly what gets drawn.

use medchat_common::Rgb;
use medchat_common::constants::MM_PER_PT;

/// Advance widths for bytes 0x20..=0x7E
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, //
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, //
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, //
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278, //
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611, //
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778, //
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556, //
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611, //
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

/// One of the standard Type1 fonts every PDF reader ships
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Helvetica,
    HelveticaBold,
}

impl Font {
    pub const ALL: [Font; 2] = [Font::Helvetica, Font::HelveticaBold];

    /// PostScript base font name
    pub fn base_name(self) -> &'static str {
        match self {
            Font::Helvetica => "Helvetica",
            Font::HelveticaBold => "Helvetica-Bold",
        }
    }

    /// Resource name used inside page content streams
    pub fn resource_name(self) -> &'static str {
        match self {
            Font::Helvetica => "F1",
            Font::HelveticaBold => "F2",
        }
    }

    /// Advance width of one encoded byte in 1/1000 em
    pub fn glyph_width(self, byte: u8) -> u16 {
        let table = match self {
            Font::Helvetica => &HELVETICA_WIDTHS,
            Font::HelveticaBold => &HELVETICA_BOLD_WIDTHS,
        };
        match byte {
            0x20..=0x7E => table[usize::from(byte - 0x20)],
            _ => self.extended_width(byte),
        }
    }

    // Upper half of WinAnsi. Punctuation gets its real width; accented
    // letters and the rest are close enough to the lowercase average.
    fn extended_width(self, byte: u8) -> u16 {
        let bold = self == Font::HelveticaBold;
        match byte {
            0x85 | 0x89 | 0x97 | 0x99 => 1000,
            0x95 => 350,
            0x91 | 0x92 => {
                if bold {
                    278
                } else {
                    222
                }
            }
            0x93 | 0x94 => {
                if bold {
                    500
                } else {
                    333
                }
            }
            0xA0 => 278,
            0xB0 => 400,
            0xB7 => 278,
            _ => 556,
        }
    }
}

/// Map a character to its WinAnsiEncoding byte, `?` when unrepresentable
pub fn encode_char(c: char) -> u8 {
    match c {
        '\t' => b' ',
        ' '..='~' => c as u8,
        '\u{A0}'..='\u{FF}' => c as u32 as u8,
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
        _ => b'?',
    }
}

/// Encode a whole string to WinAnsi bytes
pub fn encode_text(text: &str) -> Vec<u8> {
    text.chars().map(encode_char).collect()
}

/// Font, size and colour of one piece of drawn text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    /// Size in points
    pub size: f64,
    pub color: Rgb,
}

impl TextStyle {
    pub fn new(font: Font, size: f64, color: Rgb) -> Self {
        Self { font, size, color }
    }

    pub fn regular(size: f64, color: Rgb) -> Self {
        Self::new(Font::Helvetica, size, color)
    }

    pub fn bold(size: f64, color: Rgb) -> Self {
        Self::new(Font::HelveticaBold, size, color)
    }

    /// Rendered width of `text` in millimetres
    pub fn width(&self, text: &str) -> f64 {
        let units: f64 = text
            .chars()
            .map(|c| f64::from(self.font.glyph_width(encode_char(c))))
            .sum();
        units / 1000.0 * self.size * MM_PER_PT
    }
}
