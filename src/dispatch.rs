//! Opcode byte -> validator mapping.
//!
//! A table is built once per microcode variant and never changes afterwards. Each byte
//! maps to one of three capabilities: no such command, a command whose checks are
//! deliberately deferred, or a real validator.

use crate::command::Command;
use crate::config::Microcode;
use crate::error::GfxResult;
use crate::gbi::{opcode_codes, Opcode};
use crate::state::ValidatorState;
use crate::validators;

pub type CommandValidator = fn(&mut ValidatorState<'_>, Command) -> GfxResult<()>;

#[derive(Clone, Copy)]
pub enum DispatchEntry {
    /// The byte is not a command of this microcode
    Unrecognized,
    /// Known command, accepted without checks for now
    Placeholder,
    Validator(CommandValidator),
}

impl std::fmt::Debug for DispatchEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DispatchEntry::Unrecognized => write!(f, "Unrecognized"),
            DispatchEntry::Placeholder => write!(f, "Placeholder"),
            DispatchEntry::Validator(_) => write!(f, "Validator"),
        }
    }
}

/// The checks that apply to an opcode, independent of the variant's byte layout
pub fn capability(opcode: Opcode) -> DispatchEntry {
    match opcode {
        Opcode::SpNoop => DispatchEntry::Validator(validators::validate_noop),
        Opcode::Mtx => DispatchEntry::Validator(validators::validate_matrix),
        Opcode::MoveMem => DispatchEntry::Validator(validators::validate_move_mem),
        Opcode::Vtx => DispatchEntry::Validator(validators::validate_vertex),
        Opcode::Dl => DispatchEntry::Validator(validators::validate_display_list),
        Opcode::Sprite2dBase => DispatchEntry::Validator(validators::validate_sprite2d_base),
        Opcode::Tri1 | Opcode::Tri2 | Opcode::Quad => {
            DispatchEntry::Validator(validators::validate_triangles)
        }
        Opcode::CullDl => DispatchEntry::Validator(validators::validate_cull_display_list),
        Opcode::PopMtx => DispatchEntry::Validator(validators::validate_pop_matrix),
        Opcode::MoveWord => DispatchEntry::Validator(validators::validate_move_word),

        // The traversal handles the end of a list itself
        Opcode::EndDl => DispatchEntry::Placeholder,

        Opcode::Noop
        | Opcode::ModifyVtx
        | Opcode::BranchZ
        | Opcode::Line3d
        | Opcode::Texture
        | Opcode::SetOtherModeH
        | Opcode::SetOtherModeL
        | Opcode::SetGeometryMode
        | Opcode::ClearGeometryMode
        | Opcode::GeometryMode
        | Opcode::RdpHalf1
        | Opcode::RdpHalf2
        | Opcode::RdpHalfCont
        | Opcode::Special1
        | Opcode::Special2
        | Opcode::Special3
        | Opcode::DmaIo
        | Opcode::LoadUcode => DispatchEntry::Placeholder,

        Opcode::SetCImg
        | Opcode::SetZImg
        | Opcode::SetTImg
        | Opcode::SetCombine
        | Opcode::SetEnvColor
        | Opcode::SetPrimColor
        | Opcode::SetBlendColor
        | Opcode::SetFogColor
        | Opcode::SetFillColor
        | Opcode::FillRect
        | Opcode::SetTile
        | Opcode::LoadTile
        | Opcode::LoadBlock
        | Opcode::SetTileSize
        | Opcode::LoadTlut
        | Opcode::RdpSetOtherMode
        | Opcode::SetPrimDepth
        | Opcode::SetScissor
        | Opcode::SetConvert
        | Opcode::SetKeyR
        | Opcode::SetKeyGB
        | Opcode::RdpFullSync
        | Opcode::RdpTileSync
        | Opcode::RdpPipeSync
        | Opcode::RdpLoadSync
        | Opcode::TexRectFlip
        | Opcode::TexRect => DispatchEntry::Placeholder,
    }
}

lazy_static! {
    static ref F3D_TABLE: DispatchTable = DispatchTable::build(Microcode::F3d);
    static ref F3DEX2_TABLE: DispatchTable = DispatchTable::build(Microcode::F3dex2);
}

/// Total mapping from all 256 command bytes to an opcode of one microcode
#[derive(Debug)]
pub struct DispatchTable {
    microcode: Microcode,
    opcodes: [Option<Opcode>; 256],
}

impl DispatchTable {
    /// The shared table for a microcode variant
    pub fn for_microcode(microcode: Microcode) -> &'static DispatchTable {
        match microcode {
            Microcode::F3d => &*F3D_TABLE,
            Microcode::F3dex2 => &*F3DEX2_TABLE,
        }
    }

    fn build(microcode: Microcode) -> Self {
        let mut opcodes = [None; 256];
        for (code, opcode) in opcode_codes(microcode) {
            opcodes[*code as usize] = Some(*opcode);
        }
        DispatchTable { microcode, opcodes }
    }

    pub fn microcode(&self) -> Microcode {
        self.microcode
    }

    pub fn decode(&self, byte: u8) -> Option<Opcode> {
        self.opcodes[byte as usize]
    }

    pub fn entry(&self, byte: u8) -> DispatchEntry {
        match self.decode(byte) {
            Some(opcode) => capability(opcode),
            None => DispatchEntry::Unrecognized,
        }
    }
}
