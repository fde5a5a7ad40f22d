//! Segmented address translation.
//!
//! Display lists refer to memory through segmented addresses: bits 24..28 select one of
//! sixteen segment slots and the low 24 bits are an offset from that slot's base. A slot
//! is set by the move-word command and stays set for the rest of the run.

use log::debug;

use crate::error::{GfxResult, ValidationError};

pub const MAX_SEGMENTS: usize = 16;
/// First bit of the segment id inside a segmented address
pub const SEGMENT_SHIFT: u32 = 24;
pub const SEGMENT_ID_MASK: u32 = 0x0F;
pub const SEGMENT_OFFSET_MASK: u32 = 0x00FF_FFFF;
/// Strips the KSEG bits of a CPU virtual address
pub const PHYSICAL_ADDRESS_MASK: u32 = 0x1FFF_FFFF;
/// Segment table entries are pointer sized
pub const POINTER_SIZE: u32 = 4;
/// Setting a segment to this value clears the slot
pub const SEGMENT_RESET: u32 = 0xFFFF_FFFF;

pub fn is_aligned(address: u32, to: u32) -> bool {
    address & (to - 1) == 0
}

pub fn segment_id(logical: u32) -> usize {
    ((logical >> SEGMENT_SHIFT) & SEGMENT_ID_MASK) as usize
}

pub fn to_physical(address: u32) -> u32 {
    address & PHYSICAL_ADDRESS_MASK
}

/// The segment table of one validation run
#[derive(Debug, Clone)]
pub struct SegmentTable {
    slots: [Option<u32>; MAX_SEGMENTS],
    ram_size: u32,
}

impl SegmentTable {
    /// An empty table: every slot unset
    pub fn new(ram_size: u32) -> Self {
        SegmentTable {
            slots: [None; MAX_SEGMENTS],
            ram_size,
        }
    }

    pub fn get(&self, id: usize) -> Option<u32> {
        self.slots.get(id).copied().flatten()
    }

    pub fn ram_size(&self) -> u32 {
        self.ram_size
    }

    /// Whether an address, once stripped to its physical part, lies in RAM
    pub fn is_in_ram(&self, address: u32) -> bool {
        to_physical(address) < self.ram_size
    }

    /// Map a segmented address to a physical one
    pub fn translate(&self, logical: u32) -> GfxResult<u32> {
        let id = segment_id(logical);
        match self.get(id) {
            Some(base) => Ok(base.wrapping_add(logical & SEGMENT_OFFSET_MASK)),
            None => Err(ValidationError::segment(format!(
                "segment {} unset for address {:#010x}",
                id, logical
            ))),
        }
    }

    /// Check that an already translated address is aligned and inside RAM
    pub fn check_physical(&self, physical: u32, alignment: u32) -> GfxResult<()> {
        if !is_aligned(physical, alignment) {
            return Err(ValidationError::alignment(format!(
                "{:#010x} not aligned to {}",
                physical, alignment
            )));
        }

        if !self.is_in_ram(physical) {
            return Err(ValidationError::invalid_address(format!(
                "{:#010x} outside ram of {:#x} bytes",
                physical, self.ram_size
            )));
        }

        Ok(())
    }

    /// Translate, then check the physical result.
    ///
    /// Alignment is checked on the translated address, so an unaligned segment base makes
    /// an otherwise aligned offset fail.
    pub fn validate(&self, logical: u32, alignment: u32) -> GfxResult<u32> {
        let physical = self.translate(logical)?;
        self.check_physical(physical, alignment)?;
        Ok(physical)
    }

    /// Apply a move-word segment write. `offset` is the byte offset into the table.
    pub fn set_segment(&mut self, offset: u32, value: u32) -> GfxResult<()> {
        if offset % POINTER_SIZE != 0 {
            return Err(ValidationError::invalid_arguments(format!(
                "segment offset {:#x} not pointer aligned",
                offset
            )));
        }

        let id = (offset / POINTER_SIZE) as usize;
        if id >= MAX_SEGMENTS {
            return Err(ValidationError::invalid_arguments(format!(
                "segment offset {:#x} beyond table",
                offset
            )));
        }

        if value == SEGMENT_RESET {
            debug!("Segment {} cleared", id);
            self.slots[id] = None;
            return Ok(());
        }

        if !self.is_in_ram(value) {
            return Err(ValidationError::invalid_arguments(format!(
                "segment {} base {:#010x} outside ram",
                id, value
            )));
        }

        debug!("Segment {} = {:#010x}", id, value);
        self.slots[id] = Some(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use test_log::test;

    const RAM: u32 = 0x40_0000;

    #[test]
    fn test_translate_unset_segment() {
        let table = SegmentTable::new(RAM);
        for id in 0..16u32 {
            let err = table.translate((id << 24) | 0x10).unwrap_err();
            assert_eq!(err.kind, ErrorKind::SegmentError);
        }
    }

    #[test]
    fn test_translate_adds_offset() {
        let mut table = SegmentTable::new(RAM);
        table.set_segment(6 * 4, 0x1000).unwrap();
        assert_eq!(table.translate(0x0600_0020).unwrap(), 0x1020);
        assert_eq!(table.translate(0x0612_3456).unwrap(), 0x1000 + 0x12_3456);
        // Only bits 24..28 select the segment
        assert_eq!(table.translate(0x8600_0020).unwrap(), 0x1020);
        assert!(table.translate(0x0500_0020).is_err());
    }

    #[test]
    fn test_validate_alignment_on_physical_address() {
        let mut table = SegmentTable::new(RAM);
        // An unaligned base makes an aligned offset misaligned
        table.set_segment(1 * 4, 0x1004).unwrap();
        let err = table.validate(0x0100_0000, 8).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DataAlignment);
        // ... and the other way round
        assert_eq!(table.validate(0x0100_0004, 8).unwrap(), 0x1008);
    }

    #[test]
    fn test_validate_ram_bounds() {
        let mut table = SegmentTable::new(RAM);
        table.set_segment(0, 0).unwrap();
        assert_eq!(table.validate(0x0000_0000, 8).unwrap(), 0);
        assert_eq!(table.validate(0x003F_FFF8, 8).unwrap(), 0x3F_FFF8);
        let err = table.validate(0x0040_0000, 8).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidAddress);
    }

    #[test]
    fn test_validate_kseg0_base() {
        let mut table = SegmentTable::new(RAM);
        table.set_segment(2 * 4, 0x8010_0000).unwrap();
        assert_eq!(table.validate(0x0200_0008, 8).unwrap(), 0x8010_0008);
    }

    #[test]
    fn test_set_segment_argument_checks() {
        let mut table = SegmentTable::new(RAM);
        assert_eq!(
            table.set_segment(2, 0x1000).unwrap_err().kind,
            ErrorKind::InvalidArguments
        );
        assert_eq!(
            table.set_segment(16 * 4, 0x1000).unwrap_err().kind,
            ErrorKind::InvalidArguments
        );
        assert_eq!(
            table.set_segment(0, RAM).unwrap_err().kind,
            ErrorKind::InvalidArguments
        );
        assert!(table.set_segment(15 * 4, RAM - 8).is_ok());
        assert_eq!(table.get(15), Some(RAM - 8));
    }

    #[test]
    fn test_reset_sentinel_clears_slot() {
        let mut table = SegmentTable::new(RAM);
        table.set_segment(3 * 4, 0x2000).unwrap();
        assert!(table.translate(0x0300_0000).is_ok());
        table.set_segment(3 * 4, SEGMENT_RESET).unwrap();
        assert_eq!(table.get(3), None);
        assert!(table.translate(0x0300_0000).is_err());
    }
}
