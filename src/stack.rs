use log::debug;

use crate::command::Command;
use crate::error::{GfxResult, ValidationError};
use crate::result::StackEntry;

/// One entry per display list currently being walked, the top-level list included.
///
/// The call stack never drives control flow; the traversal recurses on its own. Each
/// frame tracks the position the traversal has reached in that list so that a failure
/// can report the active command at every nesting level.
#[derive(Debug, Clone)]
pub struct CallStack {
    frames: Vec<StackEntry>,
    max_depth: usize,
}

impl CallStack {
    pub fn new(max_depth: usize) -> Self {
        CallStack {
            frames: Vec::new(),
            max_depth,
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn is_full(&self) -> bool {
        self.frames.len() >= self.max_depth
    }

    /// Push a frame for a list starting at `address`
    pub fn enter_list(&mut self, address: u32) -> GfxResult<()> {
        if self.is_full() {
            return Err(ValidationError::stack_overflow(format!(
                "display list nesting exceeds {} entering {:#010x}",
                self.max_depth, address
            )));
        }

        self.frames.push(StackEntry {
            address,
            command: None,
        });
        debug!("Entered list {:#010x} (depth {})", address, self.frames.len());
        Ok(())
    }

    /// Pop the innermost frame
    pub fn exit_list(&mut self) {
        if let Some(frame) = self.frames.pop() {
            debug!(
                "Left list at {:#010x} (depth {})",
                frame.address,
                self.frames.len()
            );
        }
    }

    /// Move the innermost frame to the command at `address`
    pub fn record(&mut self, address: u32, command: Option<Command>) {
        if let Some(frame) = self.frames.last_mut() {
            frame.address = address;
            frame.command = command;
        }
    }

    pub fn frames(&self) -> &[StackEntry] {
        &self.frames
    }

    pub fn snapshot(&self) -> Vec<StackEntry> {
        self.frames.clone()
    }
}

/// Depth of the coprocessor's model-view matrix stack
#[derive(Debug, Clone)]
pub struct MatrixStack {
    depth: usize,
    max_depth: usize,
}

impl MatrixStack {
    pub fn new(max_depth: usize) -> Self {
        MatrixStack {
            depth: 0,
            max_depth,
        }
    }

    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn has_room(&self) -> bool {
        self.depth < self.max_depth
    }

    pub fn push(&mut self) -> GfxResult<()> {
        if !self.has_room() {
            return Err(ValidationError::stack_overflow(format!(
                "matrix stack full at depth {}",
                self.depth
            )));
        }
        self.depth += 1;
        debug!("Matrix push (depth {})", self.depth);
        Ok(())
    }

    pub fn pop(&mut self, count: usize) -> GfxResult<()> {
        if count > self.depth {
            return Err(ValidationError::stack_underflow(format!(
                "popping {} matrices with depth {}",
                count, self.depth
            )));
        }
        self.depth -= count;
        debug!("Matrix pop {} (depth {})", count, self.depth);
        Ok(())
    }
}
