use std::fmt::{Display, Error, Formatter};

/// Extract `width` bits of `value` starting at bit `shift`.
pub fn shiftr(value: u32, shift: u32, width: u32) -> u32 {
    let mask = ((1u64 << width) - 1) as u32;
    (value >> shift) & mask
}

/// A single display list command.
///
/// Every command is 64 bits wide: the high word `w0` carries the opcode in its top byte
/// and opcode specific fields below it, the low word `w1` usually carries an address or
/// a second set of fields. Commands are stored big-endian in RDRAM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Command {
    pub w0: u32,
    pub w1: u32,
}

impl Command {
    /// Size of an encoded command in bytes
    pub const SIZE: u32 = 8;

    pub fn new(w0: u32, w1: u32) -> Self {
        Command { w0, w1 }
    }

    pub fn from_u64(raw: u64) -> Self {
        Command {
            w0: (raw >> 32) as u32,
            w1: raw as u32,
        }
    }

    pub fn to_u64(self) -> u64 {
        ((self.w0 as u64) << 32) | self.w1 as u64
    }

    pub fn from_be_bytes(bytes: [u8; 8]) -> Self {
        Command::from_u64(u64::from_be_bytes(bytes))
    }

    pub fn to_be_bytes(self) -> [u8; 8] {
        self.to_u64().to_be_bytes()
    }

    /// The raw opcode byte
    pub fn opcode(&self) -> u8 {
        (self.w0 >> 24) as u8
    }

    /// Bits of the high word
    pub fn hi(&self, shift: u32, width: u32) -> u32 {
        shiftr(self.w0, shift, width)
    }

    /// Bits of the low word
    pub fn lo(&self, shift: u32, width: u32) -> u32 {
        shiftr(self.w1, shift, width)
    }

    /// Everything below the opcode byte
    pub fn arguments(&self) -> u32 {
        self.w0 & 0x00FF_FFFF
    }

    /// Length field of the single-parameter DMA layout (`w0[0..16]`)
    pub fn dma_len(&self) -> u32 {
        self.hi(0, 16)
    }

    /// Parameter byte of the single-parameter DMA layout (`w0[16..24]`)
    pub fn dma_param(&self) -> u32 {
        self.hi(16, 8)
    }

    /// Segmented address carried by DMA style commands
    pub fn address(&self) -> u32 {
        self.w1
    }
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        write!(f, "0x{:08x}{:08x}", self.w0, self.w1)
    }
}
