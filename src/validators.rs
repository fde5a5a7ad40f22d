//! Per-command checks.
//!
//! Each validator looks at one command, may consult or update the run state, and either
//! accepts the command or returns the first violation it finds. Control transfer is not
//! handled here; the traversal follows call and branch targets after the validator for
//! the call command has accepted it.

use crate::command::{shiftr, Command};
use crate::config::Microcode;
use crate::error::{GfxResult, ValidationError};
use crate::gbi::{
    f3d, f3dex2, move_word_name, MatrixFlags, G_DL_NOPUSH, G_DL_PUSH, G_MTX_MODELVIEW,
    G_MTX_VALID_MASK, G_MW_SEGMENT, LIGHT_SIZE, SPRITE_SIZE, VERTEX_SIZE, VIEWPORT_SIZE,
};
use crate::state::ValidatorState;

/// Every DMA source read by the RSP must be 64-bit aligned
pub const DMA_ALIGNMENT: u32 = 8;

/// Byte length encoded in the five bit field of the two-parameter DMA layout
fn dma2_length(command: Command) -> u32 {
    (command.hi(19, 5) + 1) * 8
}

pub fn validate_noop(_state: &mut ValidatorState<'_>, command: Command) -> GfxResult<()> {
    if command.arguments() != 0 || command.w1 != 0 {
        return Err(ValidationError::invalid_arguments(format!(
            "no-op with arguments {}",
            command
        )));
    }
    Ok(())
}

pub fn validate_matrix(state: &mut ValidatorState<'_>, command: Command) -> GfxResult<()> {
    let microcode = state.config.microcode;
    let (length, stored) = match microcode {
        Microcode::F3d => (command.dma_len(), command.dma_param()),
        Microcode::F3dex2 => (dma2_length(command), command.hi(0, 8)),
    };

    if length != state.config.matrix_size {
        return Err(ValidationError::invalid_arguments(format!(
            "matrix length {} expected {}",
            length, state.config.matrix_size
        )));
    }

    let normalized = match microcode {
        Microcode::F3d => stored,
        Microcode::F3dex2 => stored ^ f3dex2::G_MTX_PUSH,
    };
    if normalized & !G_MTX_VALID_MASK != 0 {
        return Err(ValidationError::invalid_arguments(format!(
            "matrix flags {:#04x}",
            stored
        )));
    }

    let flags = MatrixFlags::decode(microcode, stored);

    if flags.push && !state.matrix_stack.has_room() {
        return Err(ValidationError::stack_overflow(format!(
            "matrix push at depth {}",
            state.matrix_stack.depth()
        )));
    }

    if flags.push && flags.projection {
        return Err(ValidationError::invalid_arguments(
            "projection matrix cannot be pushed",
        ));
    }

    if !flags.load && !state.initialized.is_loaded(flags.projection) {
        let which = if flags.projection {
            "projection"
        } else {
            "modelview"
        };
        return Err(ValidationError::uninitialized(format!(
            "multiply into unloaded {} matrix",
            which
        )));
    }

    state.segments.validate(command.address(), DMA_ALIGNMENT)?;

    state.initialized.mark_loaded(flags.projection);
    if flags.push {
        state.matrix_stack.push()?;
    }
    Ok(())
}

pub fn validate_move_mem(state: &mut ValidatorState<'_>, command: Command) -> GfxResult<()> {
    let matrix_size = state.config.matrix_size;
    let (target, length, expected) = match state.config.microcode {
        Microcode::F3d => {
            let target = command.dma_param();
            let expected = match target {
                f3d::G_MV_VIEWPORT => Some(VIEWPORT_SIZE),
                f3d::G_MV_LOOKATY | f3d::G_MV_LOOKATX => Some(LIGHT_SIZE),
                t if (f3d::G_MV_L0..=f3d::G_MV_L7).contains(&t) && t % 2 == 0 => {
                    Some(LIGHT_SIZE)
                }
                f3d::G_MV_TXTATT => None,
                f3d::G_MV_MATRIX_1
                | f3d::G_MV_MATRIX_2
                | f3d::G_MV_MATRIX_3
                | f3d::G_MV_MATRIX_4 => Some(matrix_size / 4),
                _ => return Err(unknown_move_mem_target(target)),
            };
            (target, command.dma_len(), expected)
        }
        Microcode::F3dex2 => {
            let target = command.hi(0, 8);
            let expected = match target {
                f3dex2::G_MV_MMTX | f3dex2::G_MV_PMTX | f3dex2::G_MV_MATRIX => Some(matrix_size),
                f3dex2::G_MV_VIEWPORT => Some(VIEWPORT_SIZE),
                f3dex2::G_MV_LIGHT => Some(LIGHT_SIZE),
                f3dex2::G_MV_POINT => None,
                _ => return Err(unknown_move_mem_target(target)),
            };
            (target, dma2_length(command), expected)
        }
    };

    if let Some(expected) = expected {
        if length != expected {
            return Err(ValidationError::invalid_arguments(format!(
                "move-mem {:#04x} length {} expected {}",
                target, length, expected
            )));
        }
    }

    state.segments.validate(command.address(), DMA_ALIGNMENT)?;
    Ok(())
}

fn unknown_move_mem_target(target: u32) -> ValidationError {
    ValidationError::invalid_arguments(format!("unknown move-mem target {:#04x}", target))
}

pub fn validate_vertex(state: &mut ValidatorState<'_>, command: Command) -> GfxResult<()> {
    let (count, start) = match state.config.microcode {
        Microcode::F3d => {
            let param = command.dma_param();
            let count = (param >> 4) + 1;
            let length = command.dma_len();
            if count * VERTEX_SIZE != length {
                return Err(ValidationError::invalid_arguments(format!(
                    "{} vertices in {} bytes",
                    count, length
                )));
            }
            (count, param & 0x0F)
        }
        Microcode::F3dex2 => {
            let count = command.hi(12, 8);
            let end = command.hi(1, 7);
            if end < count {
                return Err(ValidationError::invalid_arguments(format!(
                    "vertex end {} before count {}",
                    end, count
                )));
            }
            (count, end - count)
        }
    };

    if count == 0 {
        return Err(ValidationError::invalid_arguments("vertex load of 0 vertices"));
    }

    if start + count > state.config.vertex_buffer_size {
        return Err(ValidationError::invalid_arguments(format!(
            "vertices {}..{} past buffer of {}",
            start,
            start + count,
            state.config.vertex_buffer_size
        )));
    }

    state.segments.validate(command.address(), DMA_ALIGNMENT)?;
    Ok(())
}

/// Whether an accepted call command is a branch (no return)
pub fn is_branch(command: Command) -> bool {
    command.dma_param() == G_DL_NOPUSH
}

pub fn validate_display_list(state: &mut ValidatorState<'_>, command: Command) -> GfxResult<()> {
    if command.dma_len() != 0 {
        return Err(ValidationError::invalid_arguments(format!(
            "display list call with length {}",
            command.dma_len()
        )));
    }

    let param = command.dma_param();
    if param != G_DL_PUSH && param != G_DL_NOPUSH {
        return Err(ValidationError::invalid_arguments(format!(
            "display list call flags {:#04x}",
            param
        )));
    }

    state.segments.validate(command.address(), DMA_ALIGNMENT)?;
    Ok(())
}

pub fn validate_sprite2d_base(
    state: &mut ValidatorState<'_>,
    command: Command,
) -> GfxResult<()> {
    if command.dma_len() != SPRITE_SIZE || command.dma_param() != 0 {
        return Err(ValidationError::invalid_arguments(format!(
            "sprite base length {} param {:#04x}",
            command.dma_len(),
            command.dma_param()
        )));
    }

    state.segments.validate(command.address(), DMA_ALIGNMENT)?;
    Ok(())
}

fn triangle_indices(word: u32) -> [u32; 3] {
    [shiftr(word, 16, 8), shiftr(word, 8, 8), shiftr(word, 0, 8)]
}

/// Encoded indices are a vertex slot times the microcode's index scale
fn check_triangle(state: &ValidatorState<'_>, indices: [u32; 3]) -> GfxResult<()> {
    let max = state.config.max_vertex_value;
    let scale = match state.config.microcode {
        Microcode::F3d => f3d::VERTEX_INDEX_SCALE,
        Microcode::F3dex2 => f3dex2::VERTEX_INDEX_SCALE,
    };
    match indices
        .iter()
        .find(|index| **index >= max || **index % scale != 0)
    {
        Some(index) => Err(ValidationError::invalid_arguments(format!(
            "triangle vertex value {} is not a slot below {}",
            index, max
        ))),
        None => Ok(()),
    }
}

pub fn validate_triangles(state: &mut ValidatorState<'_>, command: Command) -> GfxResult<()> {
    match state.config.microcode {
        Microcode::F3d => {
            // Selects the vertex that supplies the flat shading color
            let flag = command.lo(24, 8);
            if flag > 3 {
                return Err(ValidationError::invalid_arguments(format!(
                    "triangle flag {}",
                    flag
                )));
            }
            check_triangle(state, triangle_indices(command.w1))
        }
        Microcode::F3dex2 => {
            check_triangle(state, triangle_indices(command.w0))?;
            if command.opcode() != f3dex2::G_TRI1 {
                check_triangle(state, triangle_indices(command.w1))?;
            }
            Ok(())
        }
    }
}

pub fn validate_cull_display_list(
    state: &mut ValidatorState<'_>,
    command: Command,
) -> GfxResult<()> {
    let capacity = state.config.vertex_buffer_size;
    let (start, last) = match state.config.microcode {
        Microcode::F3d => {
            let start = command.hi(0, 16) / f3d::CULL_INDEX_SCALE;
            // The end is stored exclusive and wraps to 0 for a full buffer
            let end = match command.lo(0, 16) / f3d::CULL_INDEX_SCALE {
                0 => capacity,
                end => end,
            };
            match end.checked_sub(1) {
                Some(last) => (start, last),
                None => {
                    return Err(ValidationError::invalid_arguments(
                        "cull range is empty".to_string(),
                    ))
                }
            }
        }
        Microcode::F3dex2 => (
            command.hi(0, 16) / f3dex2::CULL_INDEX_SCALE,
            command.lo(0, 16) / f3dex2::CULL_INDEX_SCALE,
        ),
    };

    if start > last || last >= capacity {
        return Err(ValidationError::invalid_arguments(format!(
            "cull range {}..={} outside buffer of {}",
            start, last, capacity
        )));
    }
    Ok(())
}

pub fn validate_pop_matrix(state: &mut ValidatorState<'_>, command: Command) -> GfxResult<()> {
    let count = match state.config.microcode {
        Microcode::F3d => {
            if command.w1 != G_MTX_MODELVIEW {
                return Err(ValidationError::invalid_arguments(format!(
                    "pop of matrix type {:#x}",
                    command.w1
                )));
            }
            1
        }
        Microcode::F3dex2 => {
            let size = state.config.matrix_size;
            match command.w1.checked_rem(size) {
                Some(0) => (command.w1 / size) as usize,
                _ => {
                    return Err(ValidationError::invalid_arguments(format!(
                        "pop of {} bytes is not whole matrices",
                        command.w1
                    )))
                }
            }
        }
    };

    state.matrix_stack.pop(count)
}

pub fn validate_move_word(state: &mut ValidatorState<'_>, command: Command) -> GfxResult<()> {
    let layout = state.config.move_word_layout();
    let index = command.hi(layout.index_shift, layout.index_width);
    let offset = command.hi(layout.offset_shift, layout.offset_width);

    if index == G_MW_SEGMENT {
        return state.segments.set_segment(offset, command.w1);
    }

    // Other known indices are accepted without checks for now
    match move_word_name(state.config.microcode, index) {
        Some(_) => Ok(()),
        None => Err(ValidationError::invalid_arguments(format!(
            "unknown move-word index {:#04x}",
            index
        ))),
    }
}
