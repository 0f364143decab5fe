//! Driver for ILI9341-based TFT panels.
//!
//! The driver owns a packed 4-bit [`Framebuffer4`], a 16-entry [`Palette`]
//! and a small staging buffer. A full-frame [`show`](Ili9341::show)
//! expands the framebuffer through the palette one batch of scanlines at a
//! time, so the 16-bit frame never exists in memory at once.
pub use display_interface::DisplayError;

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;
use core::num::NonZeroU16;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

use crate::cmd::Cmd;
use crate::color::Palette;
use crate::flag::Flag;
use crate::framebuffer::Framebuffer4;
use crate::interface::SpiDisplayInterface;

use log::debug;

/// Panel orientation. Each variant selects a fixed MADCTL control byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Rotation {
    /// Portrait, connector at the top
    #[default]
    Rotate0,
    /// Landscape, rotated 90 degrees clockwise
    Rotate90,
    /// Portrait, rotated 180 degrees
    Rotate180,
    /// Landscape, rotated 270 degrees clockwise
    Rotate270,
}

impl Rotation {
    /// The MADCTL byte selecting this orientation.
    pub const fn madctl(self) -> u8 {
        match self {
            Rotation::Rotate0 => Flag::MADCTL_ROTATE_0,
            Rotation::Rotate90 => Flag::MADCTL_ROTATE_90,
            Rotation::Rotate180 => Flag::MADCTL_ROTATE_180,
            Rotation::Rotate270 => Flag::MADCTL_ROTATE_270,
        }
    }
}

/// Rejected rotation angle, carrying the offending value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidRotation(
    /// The rejected angle in degrees
    pub u16,
);

impl fmt::Display for InvalidRotation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "rotation must be 0, 90, 180 or 270, got {}", self.0)
    }
}

impl TryFrom<u16> for Rotation {
    type Error = InvalidRotation;

    /// Convert an angle in degrees. Anything outside {0, 90, 180, 270}
    /// fails; no coercion to a nearby orientation is attempted.
    fn try_from(degrees: u16) -> Result<Self, Self::Error> {
        match degrees {
            0 => Ok(Rotation::Rotate0),
            90 => Ok(Rotation::Rotate90),
            180 => Ok(Rotation::Rotate180),
            270 => Ok(Rotation::Rotate270),
            other => Err(InvalidRotation(other)),
        }
    }
}

/// Steps the power-on initialization sequence can contain.
#[derive(Clone, Copy, Debug)]
enum InitStep {
    /// Send a bare command byte
    Cmd(u8),
    /// Send a command with a static payload
    CmdData(u8, &'static [u8]),
    /// Send MADCTL with the byte for the configured rotation
    Madctl,
    /// Pause for the given number of milliseconds
    DelayMs(u16),
}

/// Power-on initialization sequence, sent unconditionally at construction.
///
/// Opcodes and payload bytes are the wire contract with the panel and match
/// the datasheet values exactly. The 100 ms pauses after software reset and
/// after sleep-exit are required by the controller.
const INIT_SEQUENCE: &[InitStep] = &[
    InitStep::Cmd(Cmd::SWRESET),
    InitStep::DelayMs(100),
    InitStep::CmdData(Cmd::PWCTRB, &[0x00, 0xC1, 0x30]),
    InitStep::CmdData(Cmd::POSC, &[0x64, 0x03, 0x12, 0x81]),
    InitStep::CmdData(Cmd::DTCA, &[0x85, 0x00, 0x78]),
    InitStep::CmdData(Cmd::PWCTRA, &[0x39, 0x2C, 0x00, 0x34, 0x02]),
    InitStep::CmdData(Cmd::PUMPRC, &[0x20]),
    InitStep::CmdData(Cmd::DTCB, &[0x00, 0x00]),
    InitStep::CmdData(Cmd::PWCTR1, &[0x23]),
    InitStep::CmdData(Cmd::PWCTR2, &[0x10]),
    InitStep::CmdData(Cmd::VMCTR1, &[0x3E, 0x28]),
    InitStep::CmdData(Cmd::VMCTR2, &[0x86]),
    InitStep::Madctl,
    InitStep::CmdData(Cmd::VSCRSADD, &[0x00]),
    InitStep::CmdData(Cmd::PIXFMT, &[Flag::PIXEL_FORMAT_16BPP]),
    InitStep::CmdData(Cmd::FRMCTR1, &[0x00, 0x18]),
    InitStep::CmdData(Cmd::DFUNCTR, &[0x08, 0x82, 0x27]),
    InitStep::CmdData(Cmd::ENABLE3G, &[0x00]),
    InitStep::CmdData(Cmd::GAMMASET, &[0x01]),
    InitStep::CmdData(
        Cmd::GMCTRP1,
        &[
            0x0F, 0x31, 0x2B, 0x0C, 0x0E, 0x08, 0x4E, 0xF1, 0x37, 0x07, 0x10, 0x03, 0x0E, 0x09,
            0x00,
        ],
    ),
    InitStep::CmdData(
        Cmd::GMCTRN1,
        &[
            0x00, 0x0E, 0x14, 0x03, 0x11, 0x07, 0x31, 0xC1, 0x48, 0x08, 0x0F, 0x0C, 0x31, 0x36,
            0x0F,
        ],
    ),
    InitStep::Cmd(Cmd::SLPOUT),
    InitStep::DelayMs(100),
    InitStep::Cmd(Cmd::DISPLAY_ON),
    InitStep::DelayMs(100),
];

/// A configured panel with its framebuffer, palette and staging buffer.
///
/// Construction resets the controller, plays the init sequence and pushes
/// one cleared frame; after that the driver sits in its single stable ready
/// state, from which [`show`](Self::show) and [`block`](Self::block)
/// operate. There is no re-initialization path short of reconstruction.
pub struct Ili9341<SPI, CS, DC, RST> {
    interface: SpiDisplayInterface<SPI, CS, DC, RST>,
    frame: Framebuffer4,
    palette: Palette,
    /// Scratch for one batch of expanded scanlines, `width * lines_per_batch * 2`
    /// bytes, reused by every transfer.
    staging: Vec<u8>,
    width: u16,
    height: u16,
    rotation: Rotation,
    lines_per_batch: NonZeroU16,
}

impl<SPI, CS, DC, RST> Ili9341<SPI, CS, DC, RST>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Create a driver for the native 240x320 panel with the classic
    /// palette.
    ///
    /// `lines_per_batch` trades staging memory (`width * lines_per_batch *
    /// 2` bytes) against the number of bus transactions per frame; 1 is the
    /// smallest footprint, larger values amortize per-batch overhead.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        spi: SPI,
        cs: CS,
        dc: DC,
        rst: RST,
        delay: &mut impl DelayNs,
        rotation: Rotation,
        lines_per_batch: NonZeroU16,
    ) -> Result<Self, DisplayError> {
        Self::with_palette(
            spi,
            cs,
            dc,
            rst,
            delay,
            crate::DEFAULT_WIDTH,
            crate::DEFAULT_HEIGHT,
            rotation,
            lines_per_batch,
            Palette::classic(),
        )
    }

    /// Create a driver with explicit panel geometry and palette.
    #[allow(clippy::too_many_arguments)]
    pub fn with_palette(
        spi: SPI,
        cs: CS,
        dc: DC,
        rst: RST,
        delay: &mut impl DelayNs,
        width: u16,
        height: u16,
        rotation: Rotation,
        lines_per_batch: NonZeroU16,
        palette: Palette,
    ) -> Result<Self, DisplayError> {
        debug!("creating new Ili9341 instance ({}x{})", width, height);
        let staging = vec![0; width as usize * lines_per_batch.get() as usize * 2];
        let mut display = Ili9341 {
            interface: SpiDisplayInterface::new(spi, cs, dc, rst),
            frame: Framebuffer4::new(width, height),
            palette,
            staging,
            width,
            height,
            rotation,
            lines_per_batch,
        };
        display.init(delay)?;
        display.show()?;
        Ok(display)
    }

    fn init(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        debug!("initializing ili9341");
        self.interface.hard_reset(delay)?;
        for step in INIT_SEQUENCE {
            debug!("init step: {:?}", step);
            match *step {
                InitStep::Cmd(op) => self.interface.cmd(op)?,
                InitStep::CmdData(op, data) => self.interface.cmd_with_data(op, data)?,
                InitStep::Madctl => self
                    .interface
                    .cmd_with_data(Cmd::MADCTL, &[self.rotation.madctl()])?,
                InitStep::DelayMs(ms) => delay.delay_ms(u32::from(ms)),
            }
        }
        Ok(())
    }

    /// Refresh the whole panel from the framebuffer.
    ///
    /// Sets the addressing window to the full panel, issues the memory
    /// write, then expands the frame through the palette in row-major
    /// batches of `lines_per_batch` scanlines, keeping chip-select asserted
    /// for the entire pixel stream. A height that is not a multiple of
    /// `lines_per_batch` ends with a short final batch; every frame streams
    /// exactly `width * height * 2` bytes.
    pub fn show(&mut self) -> Result<(), DisplayError> {
        debug!("showing full frame");
        self.set_window(0, 0, self.width - 1, self.height - 1)?;
        self.interface.cmd(Cmd::WRITE_RAM)?;

        // source bytes per batch; the expanded output is 4x as large
        let batch = self.width as usize / 2 * self.lines_per_batch.get() as usize;
        self.interface.start_data()?;
        for chunk in self.frame.as_bytes().chunks(batch) {
            let out = &mut self.staging[..chunk.len() * 4];
            self.palette.expand(chunk, out);
            self.interface.stream(out)?;
        }
        self.interface.end_data()
    }

    /// Write pre-converted pixel data into a rectangular window.
    ///
    /// `data` must already be RGB565 wire bytes, high byte first, covering
    /// the window `(x0, y0)-(x1, y1)` (inclusive) in row-major order. The
    /// palette and framebuffer are not involved and the payload goes out in
    /// a single write.
    pub fn block(
        &mut self,
        x0: u16,
        y0: u16,
        x1: u16,
        y1: u16,
        data: &[u8],
    ) -> Result<(), DisplayError> {
        debug!("block update ({},{})-({},{})", x0, y0, x1, y1);
        self.set_window(x0, y0, x1, y1)?;
        self.interface.cmd(Cmd::WRITE_RAM)?;
        self.interface.data(data)
    }

    /// Set the device addressing window, both bounds inclusive.
    fn set_window(&mut self, x0: u16, y0: u16, x1: u16, y1: u16) -> Result<(), DisplayError> {
        self.interface.cmd_with_data(
            Cmd::SET_COLUMN,
            &[
                (x0 >> 8) as u8,
                (x0 & 0xFF) as u8,
                (x1 >> 8) as u8,
                (x1 & 0xFF) as u8,
            ],
        )?;
        self.interface.cmd_with_data(
            Cmd::SET_PAGE,
            &[
                (y0 >> 8) as u8,
                (y0 & 0xFF) as u8,
                (y1 >> 8) as u8,
                (y1 & 0xFF) as u8,
            ],
        )
    }

    /// Turn the display output back on.
    pub fn display_on(&mut self) -> Result<(), DisplayError> {
        self.interface.cmd(Cmd::DISPLAY_ON)
    }

    /// Blank the panel output. Device RAM and the framebuffer keep their
    /// contents.
    pub fn display_off(&mut self) -> Result<(), DisplayError> {
        self.interface.cmd(Cmd::DISPLAY_OFF)
    }

    /// Put the controller into sleep mode.
    pub fn sleep(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        debug!("entering sleep mode");
        self.interface.cmd(Cmd::SLPIN)?;
        delay.delay_ms(5);
        Ok(())
    }

    /// Wake the controller from sleep mode.
    pub fn wake(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        debug!("leaving sleep mode");
        self.interface.cmd(Cmd::SLPOUT)?;
        delay.delay_ms(100);
        Ok(())
    }

    /// Invert the panel colors.
    pub fn invert(&mut self, inverted: bool) -> Result<(), DisplayError> {
        self.interface
            .cmd(if inverted { Cmd::INVON } else { Cmd::INVOFF })
    }

    /// The frame storage.
    pub fn framebuffer(&self) -> &Framebuffer4 {
        &self.frame
    }

    /// Exclusive access to the frame storage for the drawing layer.
    pub fn framebuffer_mut(&mut self) -> &mut Framebuffer4 {
        &mut self.frame
    }

    /// The palette used to expand framebuffer indices.
    pub fn palette(&self) -> &Palette {
        &self.palette
    }

    /// Panel width in pixels.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// Panel height in pixels.
    pub fn height(&self) -> u16 {
        self.height
    }

    /// The configured orientation.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Scanlines expanded and transmitted per streaming batch.
    pub fn lines_per_batch(&self) -> NonZeroU16 {
        self.lines_per_batch
    }
}
