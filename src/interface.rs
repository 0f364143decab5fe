//! Low-level 4-wire serial interface to the display controller.
//!
//! Owns the SPI bus and the chip-select, data/command and reset lines, and
//! implements the command framing the controller expects: opcodes go out
//! with DC low, payloads with DC high, each under its own chip-select
//! assertion. The streaming half (`start_data`/`stream`/`end_data`) lets a
//! caller keep chip-select asserted across many bus writes of one
//! memory-write envelope.

use display_interface::DisplayError;
use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::spi::SpiBus;

/// SPI bus plus the three control lines of the serial interface.
pub struct SpiDisplayInterface<SPI, CS, DC, RST> {
    spi: SPI,
    cs: CS,
    dc: DC,
    rst: RST,
}

impl<SPI, CS, DC, RST> SpiDisplayInterface<SPI, CS, DC, RST>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
    RST: OutputPin,
{
    /// Take ownership of the bus and control pins.
    pub fn new(spi: SPI, cs: CS, dc: DC, rst: RST) -> Self {
        SpiDisplayInterface { spi, cs, dc, rst }
    }

    /// Pulse the reset line: low for 50 ms, then high for 50 ms.
    ///
    /// Pure timing contract; the device gives no feedback and none is
    /// checked.
    pub fn hard_reset(&mut self, delay: &mut impl DelayNs) -> Result<(), DisplayError> {
        self.rst.set_low().map_err(|_| DisplayError::RSError)?;
        delay.delay_ms(50);
        self.rst.set_high().map_err(|_| DisplayError::RSError)?;
        delay.delay_ms(50);
        Ok(())
    }

    /// Send a bare command byte.
    pub fn cmd(&mut self, op: u8) -> Result<(), DisplayError> {
        self.dc.set_low().map_err(|_| DisplayError::DCError)?;
        self.select()?;
        let res = self.write(&[op]);
        self.deselect()?;
        res
    }

    /// Send payload bytes in data mode under one chip-select assertion.
    pub fn data(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.start_data()?;
        let res = self.write(bytes);
        self.end_data()?;
        res
    }

    /// Send a command followed by its payload.
    pub fn cmd_with_data(&mut self, op: u8, bytes: &[u8]) -> Result<(), DisplayError> {
        self.cmd(op)?;
        self.data(bytes)
    }

    /// Enter data mode and assert chip-select. Pair with [`end_data`].
    ///
    /// [`end_data`]: Self::end_data
    pub fn start_data(&mut self) -> Result<(), DisplayError> {
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        self.select()
    }

    /// Push bytes onto the bus inside a `start_data`/`end_data` envelope.
    pub fn stream(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.write(bytes)
    }

    /// Deassert chip-select, closing a data envelope.
    pub fn end_data(&mut self) -> Result<(), DisplayError> {
        self.deselect()
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), DisplayError> {
        self.spi
            .write(bytes)
            .map_err(|_| DisplayError::BusWriteError)
    }

    fn select(&mut self) -> Result<(), DisplayError> {
        self.cs.set_low().map_err(|_| DisplayError::CSError)
    }

    fn deselect(&mut self) -> Result<(), DisplayError> {
        // drain the bus before releasing the device
        self.spi.flush().map_err(|_| DisplayError::BusWriteError)?;
        self.cs.set_high().map_err(|_| DisplayError::CSError)
    }
}
