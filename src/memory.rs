use crate::command::Command;
use crate::error::{GfxResult, ValidationError};

/// Read access to the memory holding the display lists.
///
/// The traversal only ever reads whole commands at physical addresses that have already
/// been translated and bounds checked, so an implementation can be a plain RAM dump, a
/// live view of emulated RDRAM, or a sparse test image.
pub trait DisplayListMemory {
    fn read_command(&self, address: u32) -> GfxResult<Command>;
}

/// A flat big-endian image of RDRAM starting at physical address zero
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RamImage {
    bytes: Vec<u8>,
}

impl RamImage {
    /// A zero filled image of `size` bytes
    pub fn new(size: usize) -> Self {
        RamImage {
            bytes: vec![0u8; size],
        }
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        RamImage { bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Store one command at `address`
    pub fn write_command(&mut self, address: u32, command: Command) -> Result<(), String> {
        self.write_bytes(address, &command.to_be_bytes())
    }

    /// Store consecutive commands starting at `address`
    pub fn write_commands(&mut self, address: u32, commands: &[Command]) -> Result<(), String> {
        let mut at = address;
        for command in commands {
            self.write_command(at, *command)?;
            at += Command::SIZE;
        }
        Ok(())
    }

    pub fn write_bytes(&mut self, address: u32, data: &[u8]) -> Result<(), String> {
        let start = address as usize;
        let end = start + data.len();
        if end > self.bytes.len() {
            return Err(format!(
                "Write of {} bytes at {:#010x} past end of {:#x} byte image",
                data.len(),
                address,
                self.bytes.len()
            ));
        }
        self.bytes[start..end].copy_from_slice(data);
        Ok(())
    }
}

impl DisplayListMemory for RamImage {
    fn read_command(&self, address: u32) -> GfxResult<Command> {
        let start = address as usize;
        let bytes = start
            .checked_add(Command::SIZE as usize)
            .and_then(|end| self.bytes.get(start..end))
            .ok_or_else(|| {
                ValidationError::invalid_address(format!(
                    "command at {:#010x} outside memory image",
                    address
                ))
            })?;

        let mut raw = [0u8; 8];
        raw.copy_from_slice(bytes);
        Ok(Command::from_be_bytes(raw))
    }
}
