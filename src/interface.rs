//! This module provides shims for the `embedded-hal` hardware corresponding to the MAX22200's
//! serial bus. It is a shim between `embedded-hal` implementations and the driver's register
//! transactions.

use registers::{RegisterAddress, Width};

/// An interface for the MAX22200 implements this trait, which provides the basic operations for
/// sending pre-encoded register accesses to the chip via the interface.
pub trait Max22200Interface {
    /// The type of error that register reads and writes may return.
    type Error;
    /// Issue a write command to the device to write `value` into the register at `addr`. A
    /// `Width::OneByte` access writes only the low 8 bits of `value`.
    fn write_register(
        &mut self,
        addr: RegisterAddress,
        width: Width,
        value: u32,
    ) -> Result<(), Self::Error>;
    /// Issue a read command to the device to fetch the value of the register at `addr`. A
    /// `Width::OneByte` access yields only the low 8 bits of the register.
    fn read_register(&mut self, addr: RegisterAddress, width: Width) -> Result<u32, Self::Error>;
}

// This is here (and has to be pub) for doctests only. It's useless otherwise.
#[doc(hidden)]
pub mod noop {
    use super::Max22200Interface;
    use hal;
    use registers::{RegisterAddress, Width};
    pub struct NoopInterface;
    impl Max22200Interface for NoopInterface {
        type Error = core::convert::Infallible;
        fn write_register(
            &mut self,
            _addr: RegisterAddress,
            _width: Width,
            _value: u32,
        ) -> Result<(), Self::Error> {
            Ok(())
        }
        fn read_register(
            &mut self,
            _addr: RegisterAddress,
            _width: Width,
        ) -> Result<u32, Self::Error> {
            Ok(0u32)
        }
    }
    pub struct NoopDelay;
    impl hal::blocking::delay::DelayUs<u32> for NoopDelay {
        fn delay_us(&mut self, _us: u32) {}
    }
}

pub mod spi {
    //! The SPI interface controls a MAX22200 via its serial bus (SCK, SDI, SDO, CS) together
    //! with the CMD strobe that frames every transaction into a command phase and a data phase.

    use hal;

    use super::{Max22200Interface, RegisterAddress};
    use registers::{command_byte, Width, FRAME_SIZE};

    /// The union of all errors that may occur on the SPI interface. This primarily consists of
    /// variants for each of the error types for the chip select GPIO, the command strobe GPIO,
    /// SPI write, and SPI transfer.
    #[derive(Debug)]
    pub enum SpiInterfaceError<CSE, CPE, WE, TE> {
        /// The chip select GPIO threw an error.
        CSError(CSE),
        /// The command strobe GPIO threw an error.
        CmdError(CPE),
        /// An error occurred during SPI write.
        WriteError(WE),
        /// An error occurred during SPI transfer.
        TransferError(TE),
    }

    impl<CSE, CPE, WE, TE> SpiInterfaceError<CSE, CPE, WE, TE> {
        fn from_cs(e: CSE) -> Self {
            Self::CSError(e)
        }
        fn from_cmd(e: CPE) -> Self {
            Self::CmdError(e)
        }
        fn from_write(e: WE) -> Self {
            Self::WriteError(e)
        }
        fn from_transfer(e: TE) -> Self {
            Self::TransferError(e)
        }
    }

    /// A configured `Max22200Interface` for controlling a MAX22200 via SPI.
    pub struct SpiInterface<SPI, CS, CMD> {
        /// The SPI master device connected to the MAX22200.
        spi: SPI,
        /// A GPIO output pin connected to the CS pin of the MAX22200.
        cs: CS,
        /// A GPIO output pin connected to the CMD pin of the MAX22200. The device latches this
        /// pin at every CS falling edge to decide whether the incoming byte is a command byte or
        /// register data.
        cmd: CMD,
    }

    impl<SPI, CS, CMD> SpiInterface<SPI, CS, CMD>
    where
        SPI: hal::blocking::spi::Write<u8> + hal::blocking::spi::Transfer<u8>,
        CS: hal::digital::v2::OutputPin,
        CMD: hal::digital::v2::OutputPin,
    {
        /// Create a new SPI interface to communicate with the solenoid driver. `spi` is the SPI
        /// master device, `cs` is the GPIO output pin connected to the CS pin of the MAX22200,
        /// and `cmd` is the GPIO output pin connected to its CMD pin. `cmd` may be constructed
        /// at either level; the interface drives it at the start of every transaction.
        pub fn new(spi: SPI, cs: CS, cmd: CMD) -> Self {
            Self { spi, cs, cmd }
        }

        /// Destroy the interface and give back its bus and pin resources.
        pub fn release(self) -> (SPI, CS, CMD) {
            (self.spi, self.cs, self.cmd)
        }
    }

    impl<SPI, CS, CMD> Max22200Interface for SpiInterface<SPI, CS, CMD>
    where
        SPI: hal::blocking::spi::Write<u8> + hal::blocking::spi::Transfer<u8>,
        CS: hal::digital::v2::OutputPin,
        CMD: hal::digital::v2::OutputPin,
    {
        type Error = SpiInterfaceError<
            <CS as hal::digital::v2::OutputPin>::Error,
            <CMD as hal::digital::v2::OutputPin>::Error,
            <SPI as hal::blocking::spi::Write<u8>>::Error,
            <SPI as hal::blocking::spi::Transfer<u8>>::Error,
        >;

        fn write_register(
            &mut self,
            addr: RegisterAddress,
            width: Width,
            value: u32,
        ) -> Result<(), Self::Error> {
            let cmd_byte = [command_byte(true, addr, width)];
            let data = value.to_be_bytes();
            let frame = &data[FRAME_SIZE - width.frame_len()..];

            // Command phase: raise CMD so the device latches the next byte as a command.
            self.cmd.set_high().map_err(Self::Error::from_cmd)?;
            self.cs.set_low().map_err(Self::Error::from_cs)?;
            let cmd_result = self.spi.write(&cmd_byte);
            self.cs.set_high().map_err(Self::Error::from_cs)?;
            cmd_result.map_err(Self::Error::from_write)?;

            // Data phase: register contents, most significant byte first.
            self.cmd.set_low().map_err(Self::Error::from_cmd)?;
            self.cs.set_low().map_err(Self::Error::from_cs)?;
            let data_result = self.spi.write(frame);
            self.cs.set_high().map_err(Self::Error::from_cs)?;
            data_result.map_err(Self::Error::from_write)
        }

        fn read_register(
            &mut self,
            addr: RegisterAddress,
            width: Width,
        ) -> Result<u32, Self::Error> {
            let mut cmd_byte = [command_byte(false, addr, width)];

            // Command phase. The device shifts out its global fault flags while the command byte
            // goes in; they are latched in the status register as well, so they are ignored here.
            self.cmd.set_high().map_err(Self::Error::from_cmd)?;
            self.cs.set_low().map_err(Self::Error::from_cs)?;
            let cmd_result = self.spi.transfer(&mut cmd_byte);
            self.cs.set_high().map_err(Self::Error::from_cs)?;
            cmd_result.map_err(Self::Error::from_transfer)?;

            // Data phase: clock out zeroes while the device drives the register contents back,
            // most significant byte first.
            let mut buf = [0u8; FRAME_SIZE];
            self.cmd.set_low().map_err(Self::Error::from_cmd)?;
            self.cs.set_low().map_err(Self::Error::from_cs)?;
            let data_result = self.spi.transfer(&mut buf[..width.frame_len()]);
            self.cs.set_high().map_err(Self::Error::from_cs)?;
            let frame = data_result.map_err(Self::Error::from_transfer)?;

            let mut value = 0u32;
            for byte in frame {
                value = value << 8 | u32::from(*byte);
            }
            Ok(value)
        }
    }
}


#[cfg(test)]
mod tests {
    use super::spi::{SpiInterface, SpiInterfaceError};
    use super::Max22200Interface;
    use hal;
    use registers::{Register, RegisterAddress, Width};
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Debug, PartialEq)]
    enum BusEvent {
        CmdHigh,
        CmdLow,
        CsLow,
        CsHigh,
        Written(Vec<u8>),
        Transferred(Vec<u8>),
    }

    type EventLog = Arc<Mutex<Vec<BusEvent>>>;

    struct EventPin {
        log: EventLog,
        on_high: BusEvent,
        on_low: BusEvent,
        fail: bool,
    }

    impl EventPin {
        fn cs(log: &EventLog) -> Self {
            Self {
                log: log.clone(),
                on_high: BusEvent::CsHigh,
                on_low: BusEvent::CsLow,
                fail: false,
            }
        }

        fn cmd(log: &EventLog) -> Self {
            Self {
                log: log.clone(),
                on_high: BusEvent::CmdHigh,
                on_low: BusEvent::CmdLow,
                fail: false,
            }
        }

        fn failing(self) -> Self {
            Self { fail: true, ..self }
        }
    }

    impl hal::digital::v2::OutputPin for EventPin {
        type Error = ();

        fn set_low(&mut self) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.log.lock().unwrap().push(self.on_low.clone());
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), ()> {
            if self.fail {
                return Err(());
            }
            self.log.lock().unwrap().push(self.on_high.clone());
            Ok(())
        }
    }

    struct EventSpi {
        log: EventLog,
        responses: VecDeque<Vec<u8>>,
        fail_write: bool,
        fail_transfer: bool,
    }

    impl EventSpi {
        fn new(log: &EventLog, responses: Vec<Vec<u8>>) -> Self {
            Self {
                log: log.clone(),
                responses: responses.into(),
                fail_write: false,
                fail_transfer: false,
            }
        }
    }

    impl hal::blocking::spi::Write<u8> for EventSpi {
        type Error = ();

        fn write(&mut self, words: &[u8]) -> Result<(), ()> {
            if self.fail_write {
                return Err(());
            }
            self.log.lock().unwrap().push(BusEvent::Written(words.to_vec()));
            Ok(())
        }
    }

    impl hal::blocking::spi::Transfer<u8> for EventSpi {
        type Error = ();

        fn transfer<'w>(&mut self, words: &'w mut [u8]) -> Result<&'w [u8], ()> {
            if self.fail_transfer {
                return Err(());
            }
            self.log.lock().unwrap().push(BusEvent::Transferred(words.to_vec()));
            if let Some(response) = self.responses.pop_front() {
                for (word, byte) in words.iter_mut().zip(response) {
                    *word = byte;
                }
            }
            Ok(words)
        }
    }

    #[test]
    fn write_frames_command_then_data() {
        let log: EventLog = Arc::new(Mutex::new(Vec::new()));
        let mut iface = SpiInterface::new(
            EventSpi::new(&log, vec![]),
            EventPin::cs(&log),
            EventPin::cmd(&log),
        );

        iface
            .write_register(
                RegisterAddress::from(Register::ChannelConfig(2)),
                Width::FourByte,
                0x0102_0304,
            )
            .unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![
                BusEvent::CmdHigh,
                BusEvent::CsLow,
                BusEvent::Written(vec![0b1000_0110]),
                BusEvent::CsHigh,
                BusEvent::CmdLow,
                BusEvent::CsLow,
                BusEvent::Written(vec![0x01, 0x02, 0x03, 0x04]),
                BusEvent::CsHigh,
            ]
        );
    }

    #[test]
    fn one_byte_write_sends_low_byte_only() {
        let log: EventLog = Arc::new(Mutex::new(Vec::new()));
        let mut iface = SpiInterface::new(
            EventSpi::new(&log, vec![]),
            EventPin::cs(&log),
            EventPin::cmd(&log),
        );

        iface
            .write_register(
                RegisterAddress::from(Register::Status),
                Width::OneByte,
                0xDEAD_BEEF,
            )
            .unwrap();

        let events = log.lock().unwrap().clone();
        assert_eq!(events[2], BusEvent::Written(vec![0b1000_0001]));
        assert_eq!(events[6], BusEvent::Written(vec![0xEF]));
    }

    #[test]
    fn read_frames_command_then_data() {
        let log: EventLog = Arc::new(Mutex::new(Vec::new()));
        let responses = vec![vec![0x00], vec![0xAA, 0xBB, 0xCC, 0xDD]];
        let mut iface = SpiInterface::new(
            EventSpi::new(&log, responses),
            EventPin::cs(&log),
            EventPin::cmd(&log),
        );

        let value = iface
            .read_register(RegisterAddress::from(Register::Fault), Width::FourByte)
            .unwrap();

        assert_eq!(value, 0xAABB_CCDD);
        assert_eq!(
            *log.lock().unwrap(),
            vec![
                BusEvent::CmdHigh,
                BusEvent::CsLow,
                BusEvent::Transferred(vec![0b0001_0010]),
                BusEvent::CsHigh,
                BusEvent::CmdLow,
                BusEvent::CsLow,
                BusEvent::Transferred(vec![0x00, 0x00, 0x00, 0x00]),
                BusEvent::CsHigh,
            ]
        );
    }

    #[test]
    fn one_byte_read_yields_single_byte() {
        let log: EventLog = Arc::new(Mutex::new(Vec::new()));
        let responses = vec![vec![0x00], vec![0x5A]];
        let mut iface = SpiInterface::new(
            EventSpi::new(&log, responses),
            EventPin::cs(&log),
            EventPin::cmd(&log),
        );

        let value = iface
            .read_register(RegisterAddress::from(Register::Status), Width::OneByte)
            .unwrap();

        assert_eq!(value, 0x5A);
        let events = log.lock().unwrap().clone();
        assert_eq!(events[2], BusEvent::Transferred(vec![0b0000_0001]));
        assert_eq!(events[6], BusEvent::Transferred(vec![0x00]));
    }

    #[test]
    fn chip_select_errors_surface() {
        let log: EventLog = Arc::new(Mutex::new(Vec::new()));
        let mut iface = SpiInterface::new(
            EventSpi::new(&log, vec![]),
            EventPin::cs(&log).failing(),
            EventPin::cmd(&log),
        );

        match iface.write_register(RegisterAddress::from(Register::Status), Width::OneByte, 0) {
            Err(SpiInterfaceError::CSError(())) => {}
            res => panic!("unexpected result: {:?}", res),
        }
    }

    #[test]
    fn command_strobe_errors_surface() {
        let log: EventLog = Arc::new(Mutex::new(Vec::new()));
        let mut iface = SpiInterface::new(
            EventSpi::new(&log, vec![]),
            EventPin::cs(&log),
            EventPin::cmd(&log).failing(),
        );

        match iface.read_register(RegisterAddress::from(Register::Status), Width::OneByte) {
            Err(SpiInterfaceError::CmdError(())) => {}
            res => panic!("unexpected result: {:?}", res),
        }
        assert!(log.lock().unwrap().is_empty());
    }

    #[test]
    fn transfer_errors_surface() {
        let log: EventLog = Arc::new(Mutex::new(Vec::new()));
        let mut spi = EventSpi::new(&log, vec![]);
        spi.fail_transfer = true;
        let mut iface = SpiInterface::new(spi, EventPin::cs(&log), EventPin::cmd(&log));

        match iface.read_register(RegisterAddress::from(Register::Status), Width::FourByte) {
            Err(SpiInterfaceError::TransferError(())) => {}
            res => panic!("unexpected result: {:?}", res),
        }
    }

    #[test]
    fn write_errors_surface() {
        let log: EventLog = Arc::new(Mutex::new(Vec::new()));
        let mut spi = EventSpi::new(&log, vec![]);
        spi.fail_write = true;
        let mut iface = SpiInterface::new(spi, EventPin::cs(&log), EventPin::cmd(&log));

        match iface.write_register(RegisterAddress::from(Register::Status), Width::FourByte, 0) {
            Err(SpiInterfaceError::WriteError(())) => {}
            res => panic!("unexpected result: {:?}", res),
        }
    }
}
