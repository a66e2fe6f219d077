//! Static font-metric tables for the PDF base-14 Helvetica family.
//!
//! Widths are in em units (glyph advance / 1000, as published in the Adobe AFM
//! files), so `measure_str(s) * font_size_pt` is the rendered width in points.
//! Tables cover ASCII 0x20..=0x7E (95 printable characters); index = (char as usize) - 32.
//! A handful of WinAnsi typographic characters have explicit widths; everything
//! else falls back to `average_char_width`.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font enum
// ────────────────────────────────────────────────────────────────────────────

/// The base-14 fonts the report uses. No font files are embedded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PdfFont {
    Helvetica,
    HelveticaBold,
    /// Same advances as regular Helvetica.
    HelveticaOblique,
}

impl PdfFont {
    pub const ALL: [PdfFont; 3] = [
        PdfFont::Helvetica,
        PdfFont::HelveticaBold,
        PdfFont::HelveticaOblique,
    ];

    /// PostScript name written into the font dictionary.
    pub fn base_font(&self) -> &'static str {
        match self {
            PdfFont::Helvetica => "Helvetica",
            PdfFont::HelveticaBold => "Helvetica-Bold",
            PdfFont::HelveticaOblique => "Helvetica-Oblique",
        }
    }

    /// Resource name used in content streams (`/F1 10 Tf`).
    pub fn resource_name(&self) -> &'static str {
        match self {
            PdfFont::Helvetica => "F1",
            PdfFont::HelveticaBold => "F2",
            PdfFont::HelveticaOblique => "F3",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Static character-width table for one font.
///
/// Width array slot layout:
/// ```text
/// [0]=sp  [1]=!   [2]="   [3]=#   [4]=$   [5]=%   [6]=&   [7]='
/// [8]=(   [9]=)   [10]=*  [11]=+  [12]=,  [13]=-  [14]=.  [15]=/
/// [16..25]=0-9
/// [26]=:  [27]=;  [28]=<  [29]==  [30]=>  [31]=?  [32]=@
/// [33..58]=A-Z
/// [59]=[  [60]=\  [61]=]  [62]=^  [63]=_  [64]=`
/// [65..90]=a-z
/// [91]={  [92]=|  [93]=}  [94]=~
/// ```
pub struct FontMetricTable {
    pub font: PdfFont,
    widths: [f32; 95],
    /// Fallback width for characters without an entry.
    pub average_char_width: f32,
    pub space_width: f32,
}

impl FontMetricTable {
    pub fn char_width(&self, c: char) -> f32 {
        let code = c as usize;
        if (32..=126).contains(&code) {
            return self.widths[code - 32];
        }
        match c {
            '\u{00A0}' => self.space_width,
            '\u{2013}' => 0.556,
            '\u{2014}' | '\u{2026}' => 1.0,
            '\u{2018}' | '\u{2019}' | '\u{201A}' => 0.222,
            '\u{201C}' | '\u{201D}' | '\u{201E}' => 0.333,
            '\u{2022}' => 0.35,
            '\u{20AC}' => 0.556,
            _ => self.average_char_width,
        }
    }

    /// Measures the rendered width of a string in em units.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars().map(|c| self.char_width(c)).sum()
    }

    /// Rendered width in points at the given font size.
    pub fn width_pt(&self, s: &str, font_size_pt: f32) -> f32 {
        self.measure_str(s) * font_size_pt
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static width tables  (95 ASCII printable characters each)
// ────────────────────────────────────────────────────────────────────────────

static HELVETICA_TABLE: FontMetricTable = FontMetricTable {
    font: PdfFont::Helvetica,
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.278, 0.355, 0.556, 0.556, 0.889, 0.667, 0.191, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.278, 0.278, 0.584, 0.584, 0.584, 0.556, 1.015,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.667, 0.667, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.500, 0.667, 0.556, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.278, 0.278, 0.278, 0.469, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.556, 0.500, 0.556, 0.556, 0.278, 0.556, 0.556, 0.222, 0.222, 0.500, 0.222, 0.833,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.556, 0.556, 0.556, 0.556, 0.333, 0.500, 0.278, 0.556, 0.500, 0.722, 0.500, 0.500, 0.500,
        // {      |      }      ~
        0.334, 0.260, 0.334, 0.584,
    ],
    average_char_width: 0.556,
    space_width: 0.278,
};

static HELVETICA_BOLD_TABLE: FontMetricTable = FontMetricTable {
    font: PdfFont::HelveticaBold,
    #[rustfmt::skip]
    widths: [
        // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
        0.278, 0.333, 0.474, 0.556, 0.556, 0.889, 0.722, 0.238, 0.333, 0.333, 0.389, 0.584, 0.278, 0.333, 0.278, 0.278,
        // 0      1      2      3      4      5      6      7      8      9
        0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556, 0.556,
        // :      ;      <      =      >      ?      @
        0.333, 0.333, 0.584, 0.584, 0.584, 0.611, 0.975,
        // A      B      C      D      E      F      G      H      I      J      K      L      M
        0.722, 0.722, 0.722, 0.722, 0.667, 0.611, 0.778, 0.722, 0.278, 0.556, 0.722, 0.611, 0.833,
        // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
        0.722, 0.778, 0.667, 0.778, 0.722, 0.667, 0.611, 0.722, 0.667, 0.944, 0.667, 0.667, 0.611,
        // [      \      ]      ^      _      `
        0.333, 0.278, 0.333, 0.584, 0.556, 0.333,
        // a      b      c      d      e      f      g      h      i      j      k      l      m
        0.556, 0.611, 0.556, 0.611, 0.556, 0.333, 0.611, 0.611, 0.278, 0.278, 0.556, 0.278, 0.889,
        // n      o      p      q      r      s      t      u      v      w      x      y      z
        0.611, 0.611, 0.611, 0.611, 0.389, 0.556, 0.333, 0.611, 0.556, 0.778, 0.556, 0.556, 0.500,
        // {      |      }      ~
        0.389, 0.280, 0.389, 0.584,
    ],
    average_char_width: 0.611,
    space_width: 0.278,
};

/// Returns the static metric table for a given font.
pub fn get_metrics(font: PdfFont) -> &'static FontMetricTable {
    match font {
        PdfFont::Helvetica | PdfFont::HelveticaOblique => &HELVETICA_TABLE,
        PdfFont::HelveticaBold => &HELVETICA_BOLD_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
