//! `RadioIc` implementation for the EZRadioPRO-family transceiver the
//! source firmware targets.
//!
//! The command framing mirrors the CC1101 driver's register access in
//! spirit (assert chip-select, clock out a command byte and its
//! payload over SPI, deassert) but EZRadioPRO addresses opcodes rather
//! than registers, so commands are plain byte sequences instead of a
//! read/write address scheme.

use embedded_hal::blocking::spi::{Transfer, Write};
use embedded_hal::digital::v2::OutputPin;

use crate::radio::{RadioIc, RxOptions};

mod opcode {
    pub const GPIO_PIN_CFG: u8 = 0x13;
    pub const START_RX: u8 = 0x31;
    pub const GET_MODEM_STATUS: u8 = 0x22;
}

/// SPI error, GPIO (chip-select) error.
#[derive(Debug)]
pub enum Error<SpiE, GpioE> {
    Spi(SpiE),
    Gpio(GpioE),
}

/// EZRadioPRO transceiver driven over SPI with a dedicated chip-select
/// line. `configure_gpios_for_rx` and `start_rx` are the two commands
/// the receive core's ISR path calls, so their SPI transactions are
/// kept to a single burst write each, no response poll.
pub struct EzRadioPro<SPI, CS> {
    spi: SPI,
    cs: CS,
}

impl<SPI, CS, SpiE, GpioE> EzRadioPro<SPI, CS>
where
    SPI: Transfer<u8, Error = SpiE> + Write<u8, Error = SpiE>,
    CS: OutputPin<Error = GpioE>,
{
    pub fn new(spi: SPI, cs: CS) -> Self {
        Self { spi, cs }
    }

    fn send_command(&mut self, opcode: u8, payload: &[u8]) -> Result<(), Error<SpiE, GpioE>> {
        self.cs.set_low().map_err(Error::Gpio)?;
        self.spi.write(&[opcode]).map_err(Error::Spi)?;
        self.spi.write(payload).map_err(Error::Spi)?;
        self.cs.set_high().map_err(Error::Gpio)?;
        Ok(())
    }

    /// Issues a command with no payload and clocks out `response.len()`
    /// bytes afterward, returning them.
    fn query<const N: usize>(&mut self, opcode: u8) -> Result<[u8; N], Error<SpiE, GpioE>> {
        let mut response = [0u8; N];
        self.cs.set_low().map_err(Error::Gpio)?;
        self.spi.write(&[opcode]).map_err(Error::Spi)?;
        self.spi.transfer(&mut response).map_err(Error::Spi)?;
        self.cs.set_high().map_err(Error::Gpio)?;
        Ok(response)
    }
}

impl<SPI, CS, SpiE, GpioE> RadioIc for EzRadioPro<SPI, CS>
where
    SPI: Transfer<u8, Error = SpiE> + Write<u8, Error = SpiE>,
    CS: OutputPin<Error = GpioE>,
{
    type Error = Error<SpiE, GpioE>;

    fn configure(&mut self) -> Result<(), Self::Error> {
        self.configure_gpios_for_rx()
    }

    fn configure_gpios_for_rx(&mut self) -> Result<(), Self::Error> {
        // GPIO0 no change, GPIO1 RX data bits, GPIO2 no change,
        // GPIO3 RX/TX data clock, NIRQ/SDO/GENCFG no change.
        let params = [0x00, 0x14, 0x00, 0x1F, 0x00, 0x00, 0x00];
        self.send_command(opcode::GPIO_PIN_CFG, &params)
    }

    fn start_rx(&mut self, options: RxOptions) -> Result<(), Self::Error> {
        let params = [
            options.channel,
            options.condition,
            options.rx_len,
            options.next_state[0],
            options.next_state[1],
            options.next_state[2],
        ];
        self.send_command(opcode::START_RX, &params)
    }

    fn read_rssi(&mut self) -> Result<u8, Self::Error> {
        // Response frame is [CTS, CURR_RSSI, ...]; only the RSSI byte
        // is needed here.
        let response: [u8; 2] = self.query(opcode::GET_MODEM_STATUS)?;
        Ok(response[1])
    }
}
