use embedded_graphics::mono_font::{MonoFont, MonoTextStyle, MonoTextStyleBuilder};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::{Baseline, Text};

/// Draw targets whose content can be moved vertically.
pub trait Scroll {
    /// Negative `dy` moves content up; vacated rows are cleared.
    fn scroll(&mut self, dy: i32);
}

/// Renders text at a pixel cursor with optional clipping at the edges.
///
/// Glyph cells are drawn with an opaque background, so rewriting a field in
/// place replaces the old text. The writer holds only the cursor, not the
/// target, so one display can be shared by several writers with different
/// fonts.
pub struct Writer<'a> {
    style: MonoTextStyle<'a, BinaryColor>,
    char_width: u32,
    char_height: u32,
    row: i32,
    col: i32,
    row_clip: bool,
    col_clip: bool,
}

impl<'a> Writer<'a> {
    pub fn new(font: &'a MonoFont<'a>) -> Self {
        let style = MonoTextStyleBuilder::new()
            .font(font)
            .text_color(BinaryColor::On)
            .background_color(BinaryColor::Off)
            .build();
        Self {
            style,
            char_width: font.character_size.width + font.character_spacing,
            char_height: font.character_size.height,
            row: 0,
            col: 0,
            row_clip: false,
            col_clip: false,
        }
    }

    pub fn set_textpos(&mut self, row: i32, col: i32) {
        self.row = row;
        self.col = col;
    }

    pub fn textpos(&self) -> (i32, i32) {
        (self.row, self.col)
    }

    /// `row_clip`: drop glyphs past the bottom instead of scrolling.
    /// `col_clip`: drop glyphs past the right edge instead of wrapping.
    pub fn set_clip(&mut self, row_clip: bool, col_clip: bool) {
        self.row_clip = row_clip;
        self.col_clip = col_clip;
    }

    pub fn print_str<D>(&mut self, target: &mut D, text: &str) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor> + OriginDimensions + Scroll,
    {
        for ch in text.chars() {
            self.print_char(target, ch)?;
        }
        Ok(())
    }

    pub fn print_char<D>(&mut self, target: &mut D, ch: char) -> Result<(), D::Error>
    where
        D: DrawTarget<Color = BinaryColor> + OriginDimensions + Scroll,
    {
        if ch == '\n' {
            self.newline(target);
            return Ok(());
        }

        let size = target.size();
        let (width, height) = (size.width as i32, size.height as i32);

        if self.row + self.char_height as i32 > height {
            if self.row_clip {
                return Ok(());
            }
            self.newline(target);
        }
        if self.col + self.char_width as i32 > width {
            if self.col_clip {
                return Ok(());
            }
            self.newline(target);
        }

        let mut utf8 = [0u8; 4];
        let glyph = ch.encode_utf8(&mut utf8);
        Text::with_baseline(glyph, Point::new(self.col, self.row), self.style, Baseline::Top)
            .draw(target)?;
        self.col += self.char_width as i32;
        Ok(())
    }

    fn newline<D>(&mut self, target: &mut D)
    where
        D: OriginDimensions + Scroll,
    {
        let height = self.char_height as i32;
        self.row += height;
        self.col = 0;
        let margin = target.size().height as i32 - (self.row + height);
        if margin < 0 && !self.row_clip {
            target.scroll(margin);
            self.row += margin;
        }
    }
}
