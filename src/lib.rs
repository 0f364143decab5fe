//! ILI9341 TFT LCD Display Driver
//!
//! Driver for serial (4-wire SPI) ILI9341 panels on devices with kilobytes
//! of working memory. The whole frame lives in a packed 4-bit palette
//! framebuffer (two pixels per byte); on refresh each batch of scanlines is
//! expanded through a 16-entry RGB565 lookup table into a small reusable
//! staging buffer and streamed to the panel, so the 4x larger wire-format
//! frame never exists in memory at once.
//!
//! ## Architecture
//!
//! This driver separates hardware control from pixel storage:
//! - **[`driver::Ili9341`]** handles the controller protocol (reset, init
//!   sequence, addressing windows) and the batched streaming of frames
//! - **[`framebuffer::Framebuffer4`]** holds the packed 4-bit frame an
//!   external drawing layer renders into
//! - **[`color::Palette`]** maps 4-bit color indices to the RGB565 wire
//!   format
//!
//! ## Usage
//!
//! ```rust, ignore
//! use core::num::NonZeroU16;
//! use ili9341::prelude::*;
//!
//! // 1. Create the driver; this resets the panel, plays the init
//! //    sequence and pushes one cleared frame. 24 lines per batch trades
//! //    11.5 KiB of staging memory for fewer bus transactions.
//! let mut display = Ili9341::new(
//!     spi,
//!     cs,
//!     dc,
//!     rst,
//!     &mut delay,
//!     Rotation::Rotate0,
//!     NonZeroU16::new(24).unwrap(),
//! )?;
//!
//! // 2. Draw into the palette-indexed framebuffer
//! let fb = display.framebuffer_mut();
//! fb.fill(ili9341::color::BLACK);
//! fb.set_pixel(10, 10, ili9341::color::RED);
//!
//! // 3. Push the frame to the panel
//! display.show()?;
//! ```
//!
//! Partial updates that already have wire-format pixels bypass the palette
//! entirely via [`driver::Ili9341::block`].
#![no_std]
#![deny(missing_docs)]
#![allow(clippy::pedantic)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

extern crate alloc;

mod cmd;
pub mod color;
pub mod driver;
pub mod framebuffer;

mod flag;

/// Native width of the ILI9341 panel in pixels
pub const DEFAULT_WIDTH: u16 = 240;

/// Native height of the ILI9341 panel in pixels
pub const DEFAULT_HEIGHT: u16 = 320;

pub mod interface;

/// Useful exports
pub mod prelude {
    pub use crate::color::Palette;
    pub use crate::driver::{Ili9341, Rotation};
    pub use crate::framebuffer::Framebuffer4;
}
