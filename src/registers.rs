//! The register map and bit layouts of the MAX22200.

/// Number of data bytes in a full-width register transfer.
pub const FRAME_SIZE: usize = 4;

/// Number of output channels on the device.
pub const CHANNELS: usize = 8;

/// A register address within the MAX22200. These are created by conversion from `Register`. It is
/// a newtype around `u8` that prevents invalid addresses from being forged and passed to
/// `Max22200Interface` methods which may trigger UB on the device.
#[derive(PartialEq, Clone, Copy)]
pub struct RegisterAddress(pub(crate) u8);

impl From<RegisterAddress> for u8 {
    /// Convert a `RegisterAddress` into a `u8` corresponding to the hardware address.
    fn from(addr: RegisterAddress) -> u8 {
        addr.0
    }
}

pub enum Register {
    /// The status register. Holds the per-channel on bits, the fault summary bits, the channel
    /// operating modes, the global fault flags, and the device active bit.
    Status,

    /// Per-channel configuration register `ChannelConfig(ch)` for each channel `ch` (in the range
    /// 0-7). Holds the drive levels, trigger source, chopping frequency, and detection enables
    /// for that channel.
    ChannelConfig(u8),

    /// The fault register. Latches the per-channel open-load, plunger-movement, and
    /// hit-current-not-reached fault bits.
    Fault,

    /// The device-wide plunger-movement detection configuration register.
    DpmConfig,
}

pub(crate) fn valid_channel(ch: u8) -> u8 {
    match ch {
        0..=7 => ch,
        _ => panic!("MAX22200 does not have channel {}", ch),
    }
}

impl From<Register> for RegisterAddress {
    /// Convert a `Register` into a `RegisterAddress`.
    fn from(reg: Register) -> RegisterAddress {
        use self::Register::*;
        match reg {
            Status => RegisterAddress(0x00),
            ChannelConfig(ch) => RegisterAddress(valid_channel(ch) + 0x01),
            Fault => RegisterAddress(0x09),
            DpmConfig => RegisterAddress(0x0A),
        }
    }
}

/// The length of the data phase of a register transaction. Every register can be accessed at its
/// full 32-bit width, or as a single byte carrying its low 8 bits.
#[derive(PartialEq, Clone, Copy, Debug)]
pub enum Width {
    /// One-byte data phase.
    OneByte,
    /// Full four-byte data phase, most significant byte first.
    FourByte,
}

impl Width {
    pub(crate) fn frame_len(self) -> usize {
        match self {
            Width::OneByte => 1,
            Width::FourByte => FRAME_SIZE,
        }
    }
}

// Command byte layout. Bits 6:5 are reserved and always transmitted as zero.
pub(crate) const RW_MASK: u8 = 1 << 7;
pub(crate) const ADDR_MASK: u8 = 0b0001_1110;
pub(crate) const ONE_BYTE_MASK: u8 = 1 << 0;

/// Compose the command byte that opens every transaction: the read/write flag in the MSB, the
/// register address in bits 4:1, and the one-byte-mode flag in the LSB.
pub(crate) fn command_byte(write: bool, addr: RegisterAddress, width: Width) -> u8 {
    let mut cmd = (u8::from(addr) << 1) & ADDR_MASK;
    if write {
        cmd |= RW_MASK;
    }
    if let Width::OneByte = width {
        cmd |= ONE_BYTE_MASK;
    }
    cmd
}

/// Shift `value` into the field covered by `mask`, for composing register words.
pub const fn field_prep(mask: u32, value: u32) -> u32 {
    (value << mask.trailing_zeros()) & mask
}

/// Extract the field covered by `mask` from the register word `reg`.
pub const fn field_get(mask: u32, reg: u32) -> u32 {
    (reg & mask) >> mask.trailing_zeros()
}

// Status register fields.

/// Channel on/off bits, one per channel, channel 0 in bit 24.
pub const ONCH_MASK: u32 = 0xFF00_0000;
/// Per-channel fault summary bits.
pub const STATUS_FAULT_MASK: u32 = 0x00FF_0000;
/// Channel operating modes, two bits per channel pair.
pub const STATUS_MODE_MASK: u32 = 0x0000_FF00;
/// Global fault flag bits.
pub const STATUS_FLAG_MASK: u32 = 0x0000_00FF;
/// Device active bit. The device ignores channel triggers until this is set.
pub const ACTIVE_MASK: u32 = 1 << 0;

/// The two mode bits for the channel pair led by channel `ch` within the status register. Only
/// even `ch` in the range 0-6 denotes a pair; the masks for channels 4-7 fall below
/// [`STATUS_MODE_MASK`].
pub const fn ch_mode_mask(ch: u8) -> u32 {
    0b11 << (14 - 2 * ch as u32)
}

// Channel configuration register fields.

/// Full-scale drive range selection (HFS).
pub const HFS_MASK: u32 = 1 << 31;
/// Hold current or duty-cycle level, 0-127.
pub const HOLD_MASK: u32 = 0x7F00_0000;
/// Trigger source selection: trigger pin when set, on-channel status bit when clear (TRGnSPI).
pub const TRGNSP_IO_MASK: u32 = 1 << 23;
/// Hit current or duty-cycle level, 0-127.
pub const HIT_MASK: u32 = 0x007F_0000;
/// Hit phase duration in units of 40 chopping periods.
pub const HIT_T_MASK: u32 = 0x0000_FF00;
/// Voltage drive when set, current drive when clear (VDRnCDR).
pub const VDRNCDR_MASK: u32 = 1 << 7;
/// High-side drive when set, low-side drive when clear (HSnLS).
pub const HSNLS_MASK: u32 = 1 << 6;
/// Chopping frequency divider selection.
pub const FREQ_CFG_MASK: u32 = 0x0000_0030;
/// Slew-rate-controlled output transitions (SRC).
pub const SRC_MASK: u32 = 1 << 3;
/// Open-load detection enable.
pub const OL_EN: u32 = 1 << 2;
/// Plunger-movement detection enable.
pub const DPM_EN: u32 = 1 << 1;
/// Hit-current-not-reached detection enable.
pub const HHF_EN: u32 = 1 << 0;

// Plunger-movement detection configuration register fields.

/// Starting current threshold for plunger-movement detection, 0-127.
pub const DPM_ISTART_MASK: u32 = 0x0000_7F00;
/// Debounce time for plunger-movement detection.
pub const DPM_TDEB_MASK: u32 = 0x0000_00F0;
/// Current ripple threshold for plunger-movement detection.
pub const DPM_IPTH_MASK: u32 = 0x0000_000F;
