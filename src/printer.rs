//! Human readable commands and results.
//!
//! Both printers write into fixed size buffers and silently cut the text at the end of
//! the buffer, so they can be used where allocation is not an option.

use std::fmt::{self, Display, Formatter, Write};

use crate::command::{shiftr, Command};
use crate::config::{Microcode, ValidatorConfig};
use crate::dispatch::DispatchTable;
use crate::gbi::{f3d, f3dex2, move_word_name, MatrixFlags, Opcode, G_DL_NOPUSH, G_MW_SEGMENT};
use crate::result::ValidationResult;
use crate::segment::POINTER_SIZE;

/// Size of the scratch buffer for one line of the readable message
pub const TMP_BUFFER_SIZE: usize = 64;

/// `fmt::Write` over a byte slice that drops whatever does not fit
struct BoundedWriter<'a> {
    buffer: &'a mut [u8],
    len: usize,
}

impl<'a> BoundedWriter<'a> {
    fn new(buffer: &'a mut [u8]) -> Self {
        BoundedWriter { buffer, len: 0 }
    }
}

impl Write for BoundedWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.buffer.len() - self.len;
        let take = s.len().min(room);
        self.buffer[self.len..self.len + take].copy_from_slice(&s.as_bytes()[..take]);
        self.len += take;
        Ok(())
    }
}

/// A command rendered for one configuration
struct CommandText {
    command: Command,
    microcode: Microcode,
    matrix_size: u32,
}

impl CommandText {
    fn raw(&self, f: &mut Formatter<'_>, name: &str) -> fmt::Result {
        write!(f, "{} {}", name, self.command)
    }

    fn triangle(&self, f: &mut Formatter<'_>, word: u32) -> fmt::Result {
        let scale = match self.microcode {
            Microcode::F3d => f3d::VERTEX_INDEX_SCALE,
            Microcode::F3dex2 => f3dex2::VERTEX_INDEX_SCALE,
        };
        write!(
            f,
            "{} {} {}",
            shiftr(word, 16, 8) / scale,
            shiftr(word, 8, 8) / scale,
            shiftr(word, 0, 8) / scale
        )
    }
}

impl Display for CommandText {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let command = self.command;
        let opcode = match DispatchTable::for_microcode(self.microcode).decode(command.opcode()) {
            Some(opcode) => opcode,
            None => return self.raw(f, "unknown"),
        };
        let name = opcode.name();

        match (opcode, self.microcode) {
            (Opcode::Mtx, microcode) => {
                let stored = match microcode {
                    Microcode::F3d => command.dma_param(),
                    Microcode::F3dex2 => command.hi(0, 8),
                };
                let flags = MatrixFlags::decode(microcode, stored);
                write!(
                    f,
                    "{} {} {} {} 0x{:08x}",
                    name,
                    if flags.projection { "projection" } else { "modelview" },
                    if flags.load { "load" } else { "mul" },
                    if flags.push { "push" } else { "nopush" },
                    command.address()
                )
            }
            (Opcode::Vtx, Microcode::F3d) => {
                let param = command.dma_param();
                write!(
                    f,
                    "{} n={} v0={} 0x{:08x}",
                    name,
                    (param >> 4) + 1,
                    param & 0x0F,
                    command.address()
                )
            }
            (Opcode::Vtx, Microcode::F3dex2) => {
                let count = command.hi(12, 8);
                write!(
                    f,
                    "{} n={} v0={} 0x{:08x}",
                    name,
                    count,
                    command.hi(1, 7).wrapping_sub(count),
                    command.address()
                )
            }
            (Opcode::Dl, _) => {
                let kind = if command.dma_param() == G_DL_NOPUSH {
                    "branch"
                } else {
                    "call"
                };
                write!(f, "{} {} 0x{:08x}", name, kind, command.address())
            }
            (Opcode::EndDl, _) => write!(f, "{}", name),
            (Opcode::PopMtx, Microcode::F3d) => write!(f, "{}", name),
            (Opcode::PopMtx, Microcode::F3dex2) => match command.w1.checked_div(self.matrix_size) {
                Some(count) => write!(f, "{} {}", name, count),
                None => self.raw(f, name),
            },
            (Opcode::Tri1, Microcode::F3d) => {
                write!(f, "{} ", name)?;
                self.triangle(f, command.w1)
            }
            (Opcode::Tri1, Microcode::F3dex2) => {
                write!(f, "{} ", name)?;
                self.triangle(f, command.w0)
            }
            (Opcode::Tri2, _) | (Opcode::Quad, _) => {
                write!(f, "{} ", name)?;
                self.triangle(f, command.w0)?;
                write!(f, ", ")?;
                self.triangle(f, command.w1)
            }
            (Opcode::MoveWord, microcode) => {
                let layout = microcode.move_word_layout();
                let index = command.hi(layout.index_shift, layout.index_width);
                let offset = command.hi(layout.offset_shift, layout.offset_width);
                match move_word_name(microcode, index) {
                    Some(_) if index == G_MW_SEGMENT => write!(
                        f,
                        "{} segment {} = 0x{:08x}",
                        name,
                        offset / POINTER_SIZE,
                        command.w1
                    ),
                    Some(index_name) => write!(
                        f,
                        "{} {} +{} 0x{:08x}",
                        name, index_name, offset, command.w1
                    ),
                    None => self.raw(f, name),
                }
            }
            (Opcode::MoveMem, Microcode::F3d) => write!(
                f,
                "{} 0x{:02x} len={} 0x{:08x}",
                name,
                command.dma_param(),
                command.dma_len(),
                command.address()
            ),
            (Opcode::MoveMem, Microcode::F3dex2) => write!(
                f,
                "{} 0x{:02x} len={} 0x{:08x}",
                name,
                command.hi(0, 8),
                (command.hi(19, 5) + 1) * 8,
                command.address()
            ),
            _ => self.raw(f, name),
        }
    }
}

/// Render `command` into `output`, returning the number of bytes written
pub fn print_command(command: Command, config: &ValidatorConfig, output: &mut [u8]) -> usize {
    let mut writer = BoundedWriter::new(output);
    let text = CommandText {
        command,
        microcode: config.microcode,
        matrix_size: config.matrix_size,
    };
    let _ = write!(writer, "{}", text);
    writer.len
}

/// Feed a readable description of `result` to `sink`, one chunk at a time.
///
/// A failure produces one line per active list, outermost first, followed by the error.
/// A success produces the single chunk `success`.
pub fn generate_readable_message<F>(result: &ValidationResult, config: &ValidatorConfig, mut sink: F)
where
    F: FnMut(&str),
{
    if result.is_success() {
        sink("success");
        return;
    }

    for entry in &result.stack {
        let mut buffer = [0u8; TMP_BUFFER_SIZE];
        let mut len = {
            let mut writer = BoundedWriter::new(&mut buffer);
            let _ = write!(writer, "0x{:08x}: ", entry.address);
            writer.len
        };

        let body = match entry.command {
            Some(command) => print_command(command, config, &mut buffer[len..]),
            None => {
                let mut writer = BoundedWriter::new(&mut buffer[len..]);
                let _ = write!(writer, "<unread>");
                writer.len
            }
        };
        len += body;

        if len < TMP_BUFFER_SIZE {
            buffer[len] = b'\n';
            len += 1;
        }

        sink(std::str::from_utf8(&buffer[..len]).unwrap_or_default());
    }

    sink(&result.to_string());
}
