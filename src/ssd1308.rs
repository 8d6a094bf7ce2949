use embedded_hal_async::delay::DelayNs;
use display_interface::{DisplayError, AsyncWriteOnlyDataCommand, DataFormat};
use embedded_graphics::prelude::*;
use embedded_graphics::pixelcolor::BinaryColor;

use crate::writer::Scroll;

pub const WIDTH: u8 = 128;
pub const HEIGHT: u8 = 64;
const PAGES: u8 = HEIGHT / 8;
const BUFFER_SIZE: usize = (WIDTH as usize * HEIGHT as usize) / 8;

/// GRAM addressing mode (command 0x20).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AddressingMode {
    Horizontal = 0x00,
    Vertical = 0x01,
    Page = 0x02,
}

/// SSD1308 128x64 monochrome OLED (Grove 0.96") with a local framebuffer.
///
/// Pixel (x, y) lives in bit `y % 8` of byte `(y / 8) * 128 + x`, which is
/// the order the controller expects in page and horizontal mode. Drawing
/// only touches the framebuffer; `show()` transfers it.
pub struct Ssd1308<DI> {
    interface: DI,
    mode: AddressingMode,
    buffer: [u8; BUFFER_SIZE],
}

impl<DI> Ssd1308<DI>
where
    DI: AsyncWriteOnlyDataCommand,
{
    pub async fn init<D: DelayNs>(&mut self, delay: &mut D) -> Result<(), DisplayError> {
        self.off().await?;
        self.send_commands(&[0xD5, 0x80]).await?; // Clock divide ratio / oscillator frequency
        self.send_commands(&[0xA8, HEIGHT - 1]).await?; // Multiplex ratio (Display height - 1)
        self.send_commands(&[0xD3, 0x00]).await?; // Display offset
        self.send_commands(&[0x40]).await?; // Display start line 0
        self.send_commands(&[0xA1]).await?; // Segment remap (column 127 mapped to SEG0)
        self.send_commands(&[0xC8]).await?; // COM output scan direction (remapped)
        self.send_commands(&[0xDA, 0x12]).await?; // COM pins hardware configuration
        self.send_commands(&[0x81, 0xCF]).await?; // Contrast control
        self.send_commands(&[0xD9, 0xF1]).await?; // Pre-charge period
        self.send_commands(&[0xDB, 0x40]).await?; // VCOMH deselect level
        self.send_commands(&[0xA4]).await?; // Resume to RAM content
        self.send_commands(&[0xA6]).await?; // Normal (not inverted)
        self.set_addressing_mode(self.mode).await?;
        self.on().await?;
        delay.delay_ms(10).await;
        Ok(())
    }

    pub async fn off(&mut self) -> Result<(), DisplayError> {
        self.send_commands(&[0xAE]).await // Display OFF
    }

    pub async fn on(&mut self) -> Result<(), DisplayError> {
        self.send_commands(&[0xAF]).await // Display ON
    }

    pub async fn set_addressing_mode(&mut self, mode: AddressingMode) -> Result<(), DisplayError> {
        self.send_commands(&[0x20, mode as u8]).await?;
        self.mode = mode;
        Ok(())
    }

    pub fn addressing_mode(&self) -> AddressingMode {
        self.mode
    }

    pub async fn set_contrast(&mut self, contrast: u8) -> Result<(), DisplayError> {
        self.send_commands(&[0x81, contrast]).await
    }

    pub async fn invert(&mut self, inverted: bool) -> Result<(), DisplayError> {
        self.send_commands(&[if inverted { 0xA7 } else { 0xA6 }]).await
    }

    async fn send_commands(&mut self, commands: &[u8]) -> Result<(), DisplayError> {
        self.interface.send_commands(DataFormat::U8(commands)).await
    }

    async fn send_data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        self.interface.send_data(DataFormat::U8(data)).await
    }

    /// Transfer the framebuffer to GRAM using the current addressing mode.
    pub async fn show(&mut self) -> Result<(), DisplayError> {
        match self.mode {
            AddressingMode::Page => {
                for page in 0..PAGES {
                    // Page start, column low nibble 0, column high nibble 0
                    self.send_commands(&[0xB0 | page, 0x00, 0x10]).await?;
                    let start = page as usize * WIDTH as usize;
                    let mut chunk = [0u8; WIDTH as usize];
                    chunk.copy_from_slice(&self.buffer[start..start + WIDTH as usize]);
                    self.send_data(&chunk).await?;
                }
            }
            AddressingMode::Horizontal => {
                self.send_window().await?;
                let buffer = self.buffer;
                self.send_data(&buffer).await?;
            }
            AddressingMode::Vertical => {
                self.send_window().await?;
                for x in 0..WIDTH as usize {
                    let mut column = [0u8; PAGES as usize];
                    for (page, byte) in column.iter_mut().enumerate() {
                        *byte = self.buffer[page * WIDTH as usize + x];
                    }
                    self.send_data(&column).await?;
                }
            }
        }
        Ok(())
    }

    async fn send_window(&mut self) -> Result<(), DisplayError> {
        self.send_commands(&[0x21, 0, WIDTH - 1]).await?; // Column range
        self.send_commands(&[0x22, 0, PAGES - 1]).await // Page range
    }
}

impl<DI> Ssd1308<DI> {
    pub fn new(interface: DI) -> Self {
        Self::with_mode(interface, AddressingMode::Page)
    }

    pub fn with_mode(interface: DI, mode: AddressingMode) -> Self {
        Self {
            interface,
            mode,
            buffer: [0; BUFFER_SIZE],
        }
    }

    pub fn release(self) -> DI {
        self.interface
    }

    pub fn clear(&mut self) {
        self.buffer.fill(0x00);
    }

    pub fn fill(&mut self) {
        self.buffer.fill(0xFF);
    }

    pub fn set_pixel(&mut self, x: u32, y: u32, on: bool) {
        if x >= WIDTH as u32 || y >= HEIGHT as u32 {
            return;
        }
        let index = (y as usize / 8) * WIDTH as usize + x as usize;
        let mask = 1 << (y % 8);
        if on {
            self.buffer[index] |= mask;
        } else {
            self.buffer[index] &= !mask;
        }
    }

    pub fn get_pixel(&self, x: u32, y: u32) -> bool {
        if x >= WIDTH as u32 || y >= HEIGHT as u32 {
            return false;
        }
        let index = (y as usize / 8) * WIDTH as usize + x as usize;
        self.buffer[index] & (1 << (y % 8)) != 0
    }

    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }
}

impl<DI> Scroll for Ssd1308<DI> {
    /// Shift the framebuffer vertically by `dy` pixels (negative moves content up).
    fn scroll(&mut self, dy: i32) {
        let old = self.buffer;
        self.buffer.fill(0x00);
        for y in 0..HEIGHT as i32 {
            let source = y - dy;
            if !(0..HEIGHT as i32).contains(&source) {
                continue;
            }
            for x in 0..WIDTH as u32 {
                let index = (source as usize / 8) * WIDTH as usize + x as usize;
                if old[index] & (1 << (source % 8)) != 0 {
                    self.set_pixel(x, y as u32, true);
                }
            }
        }
    }
}

impl<DI> DrawTarget for Ssd1308<DI> {
    type Color = BinaryColor;
    type Error = DisplayError;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(coord, colour) in pixels {
            if coord.x >= 0 && coord.y >= 0 {
                self.set_pixel(coord.x as u32, coord.y as u32, colour.is_on());
            }
        }
        Ok(())
    }

    fn clear(&mut self, colour: Self::Color) -> Result<(), Self::Error> {
        self.buffer.fill(if colour.is_on() { 0xFF } else { 0x00 });
        Ok(())
    }
}

impl<DI> OriginDimensions for Ssd1308<DI> {
    fn size(&self) -> Size {
        Size::new(WIDTH as u32, HEIGHT as u32)
    }
}
