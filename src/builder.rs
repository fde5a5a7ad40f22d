//! Display list assembly.
//!
//! [`Gbi`] encodes commands the way the usual `gSP*`/`gDP*` macros do, for either
//! microcode family. Commands that a family does not have come back as `None`.

use crate::command::Command;
use crate::config::{Microcode, DEFAULT_MATRIX_SIZE};
use crate::gbi::{
    f3d, f3dex2, rdp, MatrixFlags, G_DL_NOPUSH, G_DL_PUSH, G_MTX_MODELVIEW, G_MW_SEGMENT,
    LIGHT_SIZE, SPRITE_SIZE, VERTEX_SIZE, VIEWPORT_SIZE,
};
use crate::segment::POINTER_SIZE;

/// Command encoder for one microcode family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gbi {
    microcode: Microcode,
}

fn field(value: u32, shift: u32, width: u32) -> u32 {
    let mask = ((1u64 << width) - 1) as u32;
    (value & mask) << shift
}

fn op(byte: u8) -> u32 {
    (byte as u32) << 24
}

impl Gbi {
    pub fn new(microcode: Microcode) -> Self {
        Gbi { microcode }
    }

    pub fn microcode(&self) -> Microcode {
        self.microcode
    }

    fn byte(&self, f3d: u8, f3dex2: u8) -> u32 {
        match self.microcode {
            Microcode::F3d => op(f3d),
            Microcode::F3dex2 => op(f3dex2),
        }
    }

    /// Two-parameter DMA header used by F3DEX2: length, offset and index
    fn dma2(byte: u8, length: u32, offset: u32, index: u32) -> u32 {
        op(byte)
            | field(length.saturating_sub(1) / 8, 19, 5)
            | field(offset / 8, 8, 8)
            | field(index, 0, 8)
    }

    pub fn noop(&self) -> Command {
        Command::new(self.byte(f3d::G_SPNOOP, f3dex2::G_SPNOOP), 0)
    }

    pub fn matrix(&self, address: u32, flags: MatrixFlags) -> Command {
        let stored = flags.encode(self.microcode);
        let w0 = match self.microcode {
            Microcode::F3d => op(f3d::G_MTX) | field(stored, 16, 8) | DEFAULT_MATRIX_SIZE,
            Microcode::F3dex2 => Gbi::dma2(f3dex2::G_MTX, DEFAULT_MATRIX_SIZE, 0, stored),
        };
        Command::new(w0, address)
    }

    /// Raw move-mem with an explicit target id and byte length
    pub fn move_mem(&self, target: u32, length: u32, address: u32) -> Command {
        let w0 = match self.microcode {
            Microcode::F3d => op(f3d::G_MOVEMEM) | field(target, 16, 8) | field(length, 0, 16),
            Microcode::F3dex2 => Gbi::dma2(f3dex2::G_MOVEMEM, length, 0, target),
        };
        Command::new(w0, address)
    }

    pub fn viewport(&self, address: u32) -> Command {
        match self.microcode {
            Microcode::F3d => self.move_mem(f3d::G_MV_VIEWPORT, VIEWPORT_SIZE, address),
            Microcode::F3dex2 => self.move_mem(f3dex2::G_MV_VIEWPORT, VIEWPORT_SIZE, address),
        }
    }

    /// Load light `n` (0 based)
    pub fn light(&self, n: u32, address: u32) -> Command {
        match self.microcode {
            Microcode::F3d => self.move_mem(f3d::G_MV_L0 + n * 2, LIGHT_SIZE, address),
            Microcode::F3dex2 => Command::new(
                Gbi::dma2(f3dex2::G_MOVEMEM, LIGHT_SIZE, (n + 2) * 24, f3dex2::G_MV_LIGHT),
                address,
            ),
        }
    }

    /// Load `count` vertices into the buffer starting at slot `start`
    pub fn vertex(&self, address: u32, count: u32, start: u32) -> Command {
        let w0 = match self.microcode {
            Microcode::F3d => {
                let param = (count.wrapping_sub(1) << 4) | start;
                op(f3d::G_VTX) | field(param, 16, 8) | field(count * VERTEX_SIZE, 0, 16)
            }
            Microcode::F3dex2 => {
                op(f3dex2::G_VTX) | field(count, 12, 8) | field(start + count, 1, 7)
            }
        };
        Command::new(w0, address)
    }

    /// Call a list and return to the next command once it ends
    pub fn display_list(&self, address: u32) -> Command {
        Command::new(
            self.byte(f3d::G_DL, f3dex2::G_DL) | field(G_DL_PUSH, 16, 8),
            address,
        )
    }

    /// Jump to a list without returning
    pub fn branch_list(&self, address: u32) -> Command {
        Command::new(
            self.byte(f3d::G_DL, f3dex2::G_DL) | field(G_DL_NOPUSH, 16, 8),
            address,
        )
    }

    pub fn end_display_list(&self) -> Command {
        Command::new(self.byte(f3d::G_ENDDL, f3dex2::G_ENDDL), 0)
    }

    fn vertex_scale(&self) -> u32 {
        match self.microcode {
            Microcode::F3d => f3d::VERTEX_INDEX_SCALE,
            Microcode::F3dex2 => f3dex2::VERTEX_INDEX_SCALE,
        }
    }

    /// Vertex buffer slots packed the way triangle commands carry them
    fn triangle_word(&self, v0: u32, v1: u32, v2: u32) -> u32 {
        let scale = self.vertex_scale();
        field(v0 * scale, 16, 8) | field(v1 * scale, 8, 8) | field(v2 * scale, 0, 8)
    }

    pub fn triangle(&self, v0: u32, v1: u32, v2: u32) -> Command {
        let indices = self.triangle_word(v0, v1, v2);
        match self.microcode {
            Microcode::F3d => Command::new(op(f3d::G_TRI1), indices),
            Microcode::F3dex2 => Command::new(op(f3dex2::G_TRI1) | indices, 0),
        }
    }

    /// Two triangles in one command (F3DEX2 only)
    pub fn triangles(&self, first: [u32; 3], second: [u32; 3]) -> Option<Command> {
        match self.microcode {
            Microcode::F3d => None,
            Microcode::F3dex2 => Some(Command::new(
                op(f3dex2::G_TRI2) | self.triangle_word(first[0], first[1], first[2]),
                self.triangle_word(second[0], second[1], second[2]),
            )),
        }
    }

    /// Skip the rest of the list when vertices `start..=end` are all off screen
    pub fn cull_display_list(&self, start: u32, end: u32) -> Command {
        match self.microcode {
            Microcode::F3d => Command::new(
                op(f3d::G_CULLDL) | field((start & 0x0F) * f3d::CULL_INDEX_SCALE, 0, 16),
                field(((end + 1) & 0x0F) * f3d::CULL_INDEX_SCALE, 0, 16),
            ),
            Microcode::F3dex2 => Command::new(
                op(f3dex2::G_CULLDL) | field(start * f3dex2::CULL_INDEX_SCALE, 0, 16),
                field(end * f3dex2::CULL_INDEX_SCALE, 0, 16),
            ),
        }
    }

    /// Pop one model-view matrix
    pub fn pop_matrix(&self) -> Command {
        match self.microcode {
            Microcode::F3d => Command::new(op(f3d::G_POPMTX), G_MTX_MODELVIEW),
            Microcode::F3dex2 => self.pop_matrix_f3dex2(1),
        }
    }

    /// Pop `count` model-view matrices at once (F3DEX2 only)
    pub fn pop_matrix_n(&self, count: u32) -> Option<Command> {
        match self.microcode {
            Microcode::F3d => None,
            Microcode::F3dex2 => Some(self.pop_matrix_f3dex2(count)),
        }
    }

    fn pop_matrix_f3dex2(&self, count: u32) -> Command {
        Command::new(
            Gbi::dma2(f3dex2::G_POPMTX, DEFAULT_MATRIX_SIZE, 0, 2),
            count * DEFAULT_MATRIX_SIZE,
        )
    }

    pub fn move_word(&self, index: u32, offset: u32, value: u32) -> Command {
        let layout = self.microcode.move_word_layout();
        let w0 = self.byte(f3d::G_MOVEWORD, f3dex2::G_MOVEWORD)
            | field(index, layout.index_shift, layout.index_width)
            | field(offset, layout.offset_shift, layout.offset_width);
        Command::new(w0, value)
    }

    /// Point segment `id` at physical address `base`
    pub fn segment(&self, id: u32, base: u32) -> Command {
        self.move_word(G_MW_SEGMENT, id * POINTER_SIZE, base)
    }

    pub fn sprite2d_base(&self, address: u32) -> Option<Command> {
        match self.microcode {
            Microcode::F3d => Some(Command::new(
                op(f3d::G_SPRITE2D_BASE) | SPRITE_SIZE,
                address,
            )),
            Microcode::F3dex2 => None,
        }
    }

    pub fn rdp_pipe_sync(&self) -> Command {
        Command::new(op(rdp::G_RDPPIPESYNC), 0)
    }

    pub fn rdp_full_sync(&self) -> Command {
        Command::new(op(rdp::G_RDPFULLSYNC), 0)
    }
}
