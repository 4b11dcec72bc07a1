//! Driver library for the Maxim MAX22200 octal serial-controlled solenoid driver.
//!
//! The MAX22200 drives up to 8 solenoid, relay, or motor loads from half-bridge output channels
//! that chop in either current- or voltage-regulated mode, with separate hit and hold drive
//! phases and built-in open-load, plunger-movement, and hit-current fault detection. All of this
//! is controlled through 32-bit registers reached over an SPI bus, with a CMD strobe line
//! marking whether each SPI transfer carries a command byte or register data.
//!
//! This driver is intended to work on embedded platforms using any implementation of the
//! `embedded-hal` trait library. It communicates with the device via any SPI master and GPIO
//! devices implementing the respective traits, walks the device through its power-up sequence,
//! and then exposes channel configuration and the raw register map.
//!
//! # Construction
//!
//! To set up the driver:
//!
//! - Use your platform's `embedded-hal` implementation to obtain the necessary I/Os where your
//!   MAX22200 is connected. You will need an SPI master device and push-pull output pins for
//!   chip select and the CMD strobe, plus an output pin for ENABLE; output TRIG and input FAULT
//!   pins are optional.
//! - Construct a [`Max22200Interface`] — the [`SpiInterface`] for the 4-wire bus — which will
//!   take ownership of the SPI device and the bus pins.
//! - Construct a [`Max22200`], which will take ownership of the interface and the control lines,
//!   power the device up, and program every channel with startup defaults.
//!
//! ```ignore
//! let spi = /* construct something implementing embedded_hal::blocking::spi::{Write,Transfer} */
//! let cs = /* construct something implementing embedded_hal::digital::v2::OutputPin */
//! let cmd = /* likewise, wired to the CMD strobe */
//! let enable = /* likewise, wired to ENABLE */
//!
//! let ei = max22200::SpiInterface::new(spi, cs, cmd);
//! let mut dev = max22200::Max22200::new(
//!     ei,
//!     enable,
//!     None,
//!     None,
//!     [max22200::ChannelMode::Independent; 8],
//!     &mut delay,
//! )?;
//! ```
//!
//! # Channel configuration
//!
//! *See [`Max22200::set_channel_config`].*
//!
//! Initialization leaves every channel in the same state: independent, chopping at a quarter of
//! the main frequency, voltage drive, high-side. Channels are reconfigured one at a time:
//!
//! ```
//! # use max22200::interface::noop::{NoopDelay, NoopInterface};
//! # use max22200::{ChannelMode, ChopFrequency, DriveMode, Max22200, NoPin, Side};
//! # let mut delay = NoopDelay;
//! # let enable: NoPin = NoPin::new();
//! # let mut dev = Max22200::new(NoopInterface, enable, None::<NoPin>, None::<NoPin>,
//! #     [ChannelMode::Independent; 8], &mut delay).unwrap();
//! dev.set_channel_config(
//!     0,
//!     ChannelMode::Independent,
//!     ChopFrequency::Main,
//!     false,
//!     DriveMode::Current,
//!     Side::LowSide,
//! )
//! .unwrap();
//! ```
//!
//! The hold and hit drive levels, the trigger source, and the fault detection enables are fixed
//! by this call; see its documentation for the exact policy.
//!
//! # Register access
//!
//! *See [`Max22200`].*
//!
//! Everything the higher-level calls do not cover goes through the register primitives, such as
//! switching channels on and off via the status register or inspecting latched faults:
//!
//! ```
//! # use max22200::interface::noop::{NoopDelay, NoopInterface};
//! # use max22200::registers::{field_prep, ONCH_MASK};
//! # use max22200::{ChannelMode, Max22200, NoPin, Register, Width};
//! # let mut delay = NoopDelay;
//! # let enable: NoPin = NoPin::new();
//! # let mut dev = Max22200::new(NoopInterface, enable, None::<NoPin>, None::<NoPin>,
//! #     [ChannelMode::Independent; 8], &mut delay).unwrap();
//! // Turn channel 3 on, leaving the rest of the status register alone.
//! dev.update_register(
//!     Register::Status,
//!     field_prep(ONCH_MASK, 1 << 3),
//!     field_prep(ONCH_MASK, 1 << 3),
//!     Width::FourByte,
//! )
//! .unwrap();
//! let faults = dev.read_register(Register::Fault, Width::FourByte).unwrap();
//! # let _ = faults;
//! ```
//!
//! # Fault monitoring
//!
//! *See [`Max22200::fault_asserted`].*
//!
//! The device latches fault flags in its status and fault registers, and in addition holds the
//! FAULT line low while any fault is pending. If that line is wired to an input pin, pass it to
//! the constructor and poll it with `fault_asserted` to notice faults without any bus traffic.
//! The accessor is gated on this crate's `unproven` feature (enabled by default), since the
//! `embedded-hal` digital input traits are themselves unproven. Building with
//! `default-features = false` produces a `no_std` crate; re-enable `unproven` there if the fault
//! accessor is wanted.

#![cfg_attr(not(feature = "std"), no_std)]

#[cfg(feature = "std")]
extern crate core;
#[cfg(test)]
extern crate proptest;

extern crate embedded_hal as hal;

pub mod config;
pub mod driver;
pub mod interface;
pub mod registers;

pub use config::{ChannelMode, ChopFrequency, DriveMode, Side};
pub use driver::{Error, Max22200, NoPin};
pub use interface::spi::SpiInterface;
pub use interface::Max22200Interface;
pub use registers::{Register, Width};
