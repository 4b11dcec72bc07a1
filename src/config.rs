//! Abstractions used to configure the MAX22200 hardware.

use registers::{
    field_prep, DPM_EN, FREQ_CFG_MASK, HFS_MASK, HHF_EN, HIT_MASK, HIT_T_MASK, HOLD_MASK,
    HSNLS_MASK, OL_EN, SRC_MASK, TRGNSP_IO_MASK, VDRNCDR_MASK,
};

/// A `ChannelMode` enumerates the supported operating modes for each pair of adjacent output
/// channels on the MAX22200.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ChannelMode {
    /// Both channels of the pair drive their own loads independently.
    Independent,
    /// Both channels of the pair are driven together to share the current of a single load.
    Parallel,
    /// The pair forms a half bridge for driving bidirectional loads.
    HalfBridge,
}

impl From<ChannelMode> for u32 {
    fn from(mode: ChannelMode) -> u32 {
        use self::ChannelMode::*;
        match mode {
            Independent => 0b00,
            Parallel => 0b01,
            HalfBridge => 0b10,
        }
    }
}

/// The chopping frequency used for drive regulation on a channel, expressed as a division of the
/// device's main chopping clock.
#[derive(Clone, Copy, Debug)]
pub enum ChopFrequency {
    /// One quarter of the main chopping frequency.
    MainDiv4,
    /// One third of the main chopping frequency.
    MainDiv3,
    /// One half of the main chopping frequency.
    MainDiv2,
    /// The full main chopping frequency.
    Main,
}

impl From<ChopFrequency> for u32 {
    fn from(freq: ChopFrequency) -> u32 {
        use self::ChopFrequency::*;
        match freq {
            MainDiv4 => 0b00,
            MainDiv3 => 0b01,
            MainDiv2 => 0b10,
            Main => 0b11,
        }
    }
}

/// The regulation scheme a channel uses to drive its load.
#[derive(Clone, Copy, Debug)]
pub enum DriveMode {
    /// Current-regulated drive (CDR).
    Current,
    /// Voltage-regulated drive (VDR).
    Voltage,
}

impl From<DriveMode> for u32 {
    fn from(drive: DriveMode) -> u32 {
        use self::DriveMode::*;
        match drive {
            Current => 0,
            Voltage => 1,
        }
    }
}

/// The switch a channel uses to connect its load.
#[derive(Clone, Copy, Debug)]
pub enum Side {
    /// The channel sinks current through its low-side switch.
    LowSide,
    /// The channel sources current through its high-side switch.
    HighSide,
}

impl From<Side> for u32 {
    fn from(side: Side) -> u32 {
        use self::Side::*;
        match side {
            LowSide => 0,
            HighSide => 1,
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) struct ChannelConfig {
    pub(crate) full_scale: bool,
    pub(crate) drive: DriveMode,
    pub(crate) side: Side,
    pub(crate) freq: ChopFrequency,
}

impl From<ChannelConfig> for u32 {
    fn from(cfg: ChannelConfig) -> u32 {
        // Channels always run at full hold and hit level with a zero hit time, trigger over SPI
        // with unlimited slew, and keep every fault detection enabled.
        field_prep(HFS_MASK, u32::from(cfg.full_scale))
            | field_prep(HOLD_MASK, 0x7F)
            | field_prep(TRGNSP_IO_MASK, 0)
            | field_prep(HIT_MASK, 0x7F)
            | field_prep(HIT_T_MASK, 0)
            | field_prep(VDRNCDR_MASK, u32::from(cfg.drive))
            | field_prep(HSNLS_MASK, u32::from(cfg.side))
            | field_prep(FREQ_CFG_MASK, u32::from(cfg.freq))
            | field_prep(SRC_MASK, 0)
            | OL_EN
            | DPM_EN
            | HHF_EN
    }
}
