//! Static font-metric tables for the report's built-in fonts.
//!
//! Character widths are the Adobe AFM values for the base-14 Helvetica
//! family, in 1/1000 em units. Built-in Type1 fonts ship no embedded
//! metrics, so the renderer must know glyph widths itself to wrap lines and
//! to center or right-align cells.
//!
//! Tables cover ASCII 0x20..=0x7E (95 printable characters); everything
//! else in the Latin-1 range falls back to `default_width` — accented
//! French letters are within a few percent of their base letter, which is
//! accurate enough for greedy word-wrap against a 190 mm text column.
//! Index = (byte as usize) - 32.

/// Points per millimetre (PDF user space is 72 dpi).
pub const PT_PER_MM: f32 = 72.0 / 25.4;

/// Glyph-width table for one font face.
pub struct FontMetrics {
    widths: [u16; 95],
    /// Fallback width for Latin-1 bytes above 0x7E.
    default_width: u16,
}

impl FontMetrics {
    /// Width of a single Latin-1 byte, in 1/1000 em.
    pub fn char_width(&self, byte: u8) -> u16 {
        if (0x20..=0x7E).contains(&byte) {
            self.widths[(byte - 0x20) as usize]
        } else {
            self.default_width
        }
    }

    /// Rendered width of already-encoded text, in points, at `size_pt`.
    pub fn text_width_pt(&self, latin1: &[u8], size_pt: f32) -> f32 {
        let units: u32 = latin1.iter().map(|&b| self.char_width(b) as u32).sum();
        units as f32 / 1000.0 * size_pt
    }

    /// Rendered width of already-encoded text, in millimetres, at `size_pt`.
    pub fn text_width_mm(&self, latin1: &[u8], size_pt: f32) -> f32 {
        self.text_width_pt(latin1, size_pt) / PT_PER_MM
    }
}

/// Helvetica (regular and oblique share metrics).
pub static HELVETICA: FontMetrics = FontMetrics {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
         278,  278,  355,  556,  556,  889,  667,  191,  333,  333,  389,  584,  278,  333,  278,  278,
        // 0     1     2     3     4     5     6     7     8     9
         556,  556,  556,  556,  556,  556,  556,  556,  556,  556,
        // :     ;     <     =     >     ?     @
         278,  278,  584,  584,  584,  556, 1015,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
         667,  667,  722,  722,  667,  611,  778,  722,  278,  500,  667,  556,  833,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
         722,  778,  667,  778,  722,  667,  611,  722,  667,  944,  667,  667,  611,
        // [     \     ]     ^     _     `
         278,  278,  278,  469,  556,  333,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
         556,  556,  500,  556,  556,  278,  556,  556,  222,  222,  500,  222,  833,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
         556,  556,  556,  556,  333,  500,  278,  556,  500,  722,  500,  500,  500,
        // {     |     }     ~
         334,  260,  334,  584,
    ],
    default_width: 556,
};

/// Helvetica-Bold.
pub static HELVETICA_BOLD: FontMetrics = FontMetrics {
    #[rustfmt::skip]
    widths: [
        // sp    !     "     #     $     %     &     '     (     )     *     +     ,     -     .     /
         278,  333,  474,  556,  556,  889,  722,  238,  333,  333,  389,  584,  278,  333,  278,  278,
        // 0     1     2     3     4     5     6     7     8     9
         556,  556,  556,  556,  556,  556,  556,  556,  556,  556,
        // :     ;     <     =     >     ?     @
         333,  333,  584,  584,  584,  611,  975,
        // A     B     C     D     E     F     G     H     I     J     K     L     M
         722,  722,  722,  722,  667,  611,  778,  722,  278,  556,  722,  611,  833,
        // N     O     P     Q     R     S     T     U     V     W     X     Y     Z
         722,  778,  667,  778,  722,  667,  611,  722,  667,  944,  667,  667,  611,
        // [     \     ]     ^     _     `
         333,  278,  333,  584,  556,  333,
        // a     b     c     d     e     f     g     h     i     j     k     l     m
         556,  611,  556,  611,  556,  333,  611,  611,  278,  278,  556,  278,  889,
        // n     o     p     q     r     s     t     u     v     w     x     y     z
         611,  611,  611,  611,  389,  556,  333,  611,  556,  778,  556,  556,  500,
        // {     |     }     ~
         389,  280,  389,  584,
    ],
    default_width: 611,
};
