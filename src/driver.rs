//! The MAX22200 device driver. It owns the register interface and the device control lines, and
//! walks the device through its power-up sequence before handing out register access.

use core::marker::PhantomData;

use config::{ChannelConfig, ChannelMode, ChopFrequency, DriveMode, Side};
use hal;
use interface::Max22200Interface;
use registers::{
    ch_mode_mask, field_prep, Register, RegisterAddress, Width, ACTIVE_MASK, CHANNELS,
    DPM_IPTH_MASK, DPM_ISTART_MASK, DPM_TDEB_MASK, ONCH_MASK, STATUS_MODE_MASK,
};

/// The union of the failures a device operation can produce: either the register interface
/// failed, or one of the driver-owned control lines did.
#[derive(Debug)]
pub enum Error<EIE, PE> {
    /// The register interface returned an error.
    Interface(EIE),
    /// A GPIO control line returned an error.
    Pin(PE),
}

/// A placeholder for a control line that is not wired up. As an output it accepts any drive
/// silently; as an input it always reads the idle (high) level. Its error type is generic so it
/// can stand in next to whatever real pins are present.
pub struct NoPin<E = core::convert::Infallible> {
    _errors: PhantomData<E>,
}

impl<E> NoPin<E> {
    pub fn new() -> Self {
        Self {
            _errors: PhantomData,
        }
    }
}

impl<E> Default for NoPin<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> hal::digital::v2::OutputPin for NoPin<E> {
    type Error = E;

    fn set_low(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(feature = "unproven")]
impl<E> hal::digital::v2::InputPin for NoPin<E> {
    type Error = E;

    fn is_high(&self) -> Result<bool, Self::Error> {
        Ok(true)
    }

    fn is_low(&self) -> Result<bool, Self::Error> {
        Ok(false)
    }
}

/// A MAX22200 octal solenoid driver attached to the register interface `EI`, holding the ENABLE
/// line and the optional TRIG and FAULT lines for the lifetime of the device.
///
/// ```
/// # use max22200::interface::noop::{NoopDelay, NoopInterface};
/// # use max22200::{ChannelMode, Max22200, NoPin};
/// let mut delay = NoopDelay;
/// let enable: NoPin = NoPin::new();
/// let max22200 = Max22200::new(
///     NoopInterface,
///     enable,
///     None::<NoPin>,
///     None::<NoPin>,
///     [ChannelMode::Independent; 8],
///     &mut delay,
/// )
/// .unwrap();
/// ```
pub struct Max22200<EI, EN, TRIG, FLT>
where
    EI: Max22200Interface,
{
    iface: EI,
    enable: EN,
    trigger: Option<TRIG>,
    fault: Option<FLT>,
    ch_modes: [ChannelMode; CHANNELS],
}

impl<EI, EN, TRIG, FLT, PE> Max22200<EI, EN, TRIG, FLT>
where
    EI: Max22200Interface,
    EN: hal::digital::v2::OutputPin<Error = PE>,
    TRIG: hal::digital::v2::OutputPin<Error = PE>,
{
    /// Bring up a MAX22200 on the register interface `iface` and hand back a driver for it.
    ///
    /// `enable` is the GPIO output wired to the ENABLE pin; it is driven high and the device is
    /// given its power-up settling time. `trigger`, if wired, is driven low so that channels
    /// trigger over SPI; it may later be driven high externally for pin-triggered full-bridge
    /// use. `fault`, if wired, can be sampled through `fault_asserted`. `modes` requests an
    /// operating mode per channel, where the mode of each even-numbered channel applies to its
    /// odd partner as well. Once the modes are programmed every channel is loaded with the same
    /// startup defaults (independent, quarter chopping frequency, voltage drive, high-side).
    ///
    /// Fails on the first control line or bus error, dropping the interface and all lines.
    pub fn new<D>(
        iface: EI,
        enable: EN,
        trigger: Option<TRIG>,
        fault: Option<FLT>,
        modes: [ChannelMode; CHANNELS],
        delay: &mut D,
    ) -> Result<Self, Error<EI::Error, PE>>
    where
        D: hal::blocking::delay::DelayUs<u32>,
    {
        let mut dev = Max22200 {
            iface,
            enable,
            trigger,
            fault,
            ch_modes: [ChannelMode::Independent; CHANNELS],
        };

        dev.enable.set_high().map_err(Error::Pin)?;
        // Power-up settling time after raising ENABLE.
        delay.delay_us(500);

        if let Some(ref mut trigger) = dev.trigger {
            // Channels trigger over SPI until the caller raises this line.
            trigger.set_low().map_err(Error::Pin)?;
        }

        // Liveness check only; the value is discarded.
        dev.read_register(Register::Status, Width::OneByte)?;

        // The requested mode of each even channel covers its whole pair.
        let mut status = 0u32;
        for ch in (0..CHANNELS).step_by(2) {
            dev.ch_modes[ch] = modes[ch];
            dev.ch_modes[ch + 1] = modes[ch];
            status |= field_prep(ch_mode_mask(ch as u8), u32::from(modes[ch]));
        }
        status |= field_prep(ACTIVE_MASK, 1);
        dev.update_register(
            Register::Status,
            ONCH_MASK | ACTIVE_MASK | STATUS_MODE_MASK,
            status,
            Width::FourByte,
        )?;

        // Mode changes need time to take effect before the channels are configured.
        delay.delay_us(2500);

        for ch in 0..CHANNELS {
            dev.set_channel_config(
                ch as u8,
                ChannelMode::Independent,
                ChopFrequency::MainDiv4,
                false,
                DriveMode::Voltage,
                Side::HighSide,
            )?;
        }

        // Confirmation read of the full status register.
        dev.read_register(Register::Status, Width::FourByte)?;

        Ok(dev)
    }

    /// Read the register `reg` at the given width. A `Width::OneByte` read yields only the low 8
    /// bits of the register.
    pub fn read_register(
        &mut self,
        reg: Register,
        width: Width,
    ) -> Result<u32, Error<EI::Error, PE>> {
        self.iface
            .read_register(reg.into(), width)
            .map_err(Error::Interface)
    }

    /// Write `value` into the register `reg` at the given width. A `Width::OneByte` write sends
    /// only the low 8 bits of `value`.
    pub fn write_register(
        &mut self,
        reg: Register,
        width: Width,
        value: u32,
    ) -> Result<(), Error<EI::Error, PE>> {
        self.iface
            .write_register(reg.into(), width, value)
            .map_err(Error::Interface)
    }

    /// Replace the bits of `reg` selected by `mask` with the corresponding bits of `value`,
    /// leaving the rest untouched. This takes two bus transactions with no lock between them, so
    /// nothing else may access the register in that window.
    pub fn update_register(
        &mut self,
        reg: Register,
        mask: u32,
        value: u32,
        width: Width,
    ) -> Result<(), Error<EI::Error, PE>> {
        let addr = RegisterAddress::from(reg);
        let mut reg_val = self
            .iface
            .read_register(addr, width)
            .map_err(Error::Interface)?;
        reg_val &= !mask;
        reg_val |= mask & value;
        self.iface
            .write_register(addr, width, reg_val)
            .map_err(Error::Interface)
    }

    /// Configure output channel `channel` (0-7) with the caller's chopping frequency, full-scale
    /// range, drive regulation, and switch side. The rest of the written configuration is fixed:
    /// hold and hit levels pinned at maximum with a zero hit time, SPI-controlled triggering,
    /// unlimited slew, and every fault detection enabled. The `op_mode` argument does not reach
    /// the hardware; operating modes are programmed per pair through the status register during
    /// initialization.
    pub fn set_channel_config(
        &mut self,
        channel: u8,
        _op_mode: ChannelMode,
        freq: ChopFrequency,
        full_scale: bool,
        drive: DriveMode,
        side: Side,
    ) -> Result<(), Error<EI::Error, PE>> {
        let word = u32::from(ChannelConfig {
            full_scale,
            drive,
            side,
            freq,
        });
        self.write_register(Register::ChannelConfig(channel), Width::FourByte, word)
    }

    /// Set the device-wide plunger-movement detection parameters: the starting current threshold
    /// `istart` (0-127), the debounce time `tdeb` (0-15), and the current ripple threshold `ipth`
    /// (0-15). Out-of-range values are truncated to their field widths.
    pub fn set_dpm_config(
        &mut self,
        istart: u8,
        tdeb: u8,
        ipth: u8,
    ) -> Result<(), Error<EI::Error, PE>> {
        let value = field_prep(DPM_ISTART_MASK, u32::from(istart))
            | field_prep(DPM_TDEB_MASK, u32::from(tdeb))
            | field_prep(DPM_IPTH_MASK, u32::from(ipth));
        self.update_register(
            Register::DpmConfig,
            DPM_ISTART_MASK | DPM_TDEB_MASK | DPM_IPTH_MASK,
            value,
            Width::FourByte,
        )
    }

    /// The operating mode each channel was programmed with at initialization. Adjacent channels
    /// always share a mode.
    pub fn channel_modes(&self) -> [ChannelMode; CHANNELS] {
        self.ch_modes
    }

    /// Destroy the driver and give back the register interface and the control lines. No
    /// register-level shutdown is performed; the device keeps running with its last-programmed
    /// state.
    pub fn release(self) -> (EI, EN, Option<TRIG>, Option<FLT>) {
        (self.iface, self.enable, self.trigger, self.fault)
    }
}

#[cfg(feature = "unproven")]
impl<EI, EN, TRIG, FLT, PE> Max22200<EI, EN, TRIG, FLT>
where
    EI: Max22200Interface,
    EN: hal::digital::v2::OutputPin<Error = PE>,
    TRIG: hal::digital::v2::OutputPin<Error = PE>,
    FLT: hal::digital::v2::InputPin,
{
    /// Sample the fault line, if one is wired up. The device holds the line low while a fault is
    /// latched, so `Ok(Some(true))` means a fault is pending. Yields `None` when no fault line
    /// was provided; the fault register carries the same flags over SPI.
    pub fn fault_asserted(&self) -> Result<Option<bool>, FLT::Error> {
        match self.fault.as_ref() {
            Some(fault) => Ok(Some(fault.is_low()?)),
            None => Ok(None),
        }
    }
}
