//! Display list traversal.
//!
//! Walks a display list command by command, runs the check for each command, follows
//! call and branch commands into the lists they name and stops at the first violation.
//! Calls recurse; branches replace the current list and do not nest. The nesting limit
//! is enforced before recursing, and every visited command is charged to a budget so a
//! list that branches back onto itself still terminates.

use log::{debug, info, trace, warn};

use crate::command::Command;
use crate::config::ValidatorConfig;
use crate::dispatch::{DispatchEntry, DispatchTable};
use crate::error::{GfxResult, ValidationError};
use crate::gbi::Opcode;
use crate::memory::DisplayListMemory;
use crate::result::ValidationResult;
use crate::segment::to_physical;
use crate::state::ValidatorState;
use crate::validators::{self, DMA_ALIGNMENT};

pub const M_GFXTASK: u32 = 1;
pub const M_AUDTASK: u32 = 2;
pub const M_VIDTASK: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskType {
    Graphics,
    Audio,
    Video,
    Other(u32),
}

impl TaskType {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            M_GFXTASK => TaskType::Graphics,
            M_AUDTASK => TaskType::Audio,
            M_VIDTASK => TaskType::Video,
            other => TaskType::Other(other),
        }
    }
}

/// The parts of an RSP task descriptor the validator looks at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Task {
    pub task_type: u32,
    /// Address of the first command of the top-level list
    pub data_ptr: u32,
}

impl Task {
    pub fn graphics(data_ptr: u32) -> Self {
        Task {
            task_type: M_GFXTASK,
            data_ptr,
        }
    }

    pub fn kind(&self) -> TaskType {
        TaskType::from_raw(self.task_type)
    }
}

/// Validates display lists against one fixed configuration.
///
/// The validator itself holds no per-run state, so one instance can check any number of
/// lists, from any number of threads.
#[derive(Debug, Clone)]
pub struct Validator {
    config: ValidatorConfig,
    table: &'static DispatchTable,
}

impl Validator {
    /// Build a validator, rejecting configs that fail [`ValidatorConfig::check`]
    pub fn new(config: ValidatorConfig) -> Result<Self, String> {
        config.check()?;
        let table = DispatchTable::for_microcode(config.microcode);
        Ok(Validator { config, table })
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate the list a task points at, visiting at most `max_commands` commands.
    ///
    /// Tasks other than graphics tasks are accepted without looking at them.
    pub fn validate<M>(&self, task: &Task, memory: &M, max_commands: u32) -> ValidationResult
    where
        M: DisplayListMemory + ?Sized,
    {
        if task.kind() != TaskType::Graphics {
            debug!("Skipping {:?} task", task.kind());
            return ValidationResult::success();
        }

        let mut run = Traversal {
            state: ValidatorState::new(&self.config),
            table: self.table,
            memory,
            budget: max_commands,
            visited: 0,
        };

        match run.run(task.data_ptr) {
            Ok(()) => {
                info!(
                    "Display list at {:#010x} is valid ({} commands)",
                    task.data_ptr, run.visited
                );
                ValidationResult::success()
            }
            Err(error) => {
                warn!(
                    "Display list at {:#010x} rejected at depth {}: {}",
                    task.data_ptr,
                    run.state.call_stack.depth(),
                    error
                );
                ValidationResult::failure(error, run.state.call_stack.snapshot())
            }
        }
    }
}

/// One validation run
struct Traversal<'a, M: ?Sized> {
    state: ValidatorState<'a>,
    table: &'static DispatchTable,
    memory: &'a M,
    budget: u32,
    visited: u32,
}

impl<'a, M> Traversal<'a, M>
where
    M: DisplayListMemory + ?Sized,
{
    fn run(&mut self, data_ptr: u32) -> GfxResult<()> {
        let start = to_physical(data_ptr);
        self.state.segments.check_physical(start, DMA_ALIGNMENT)?;
        self.state.call_stack.enter_list(start)?;
        self.walk_list(start)
    }

    /// Walk the list at `start` (already on the call stack) up to its end command.
    /// Pops the list's frame when it ends normally.
    fn walk_list(&mut self, start: u32) -> GfxResult<()> {
        let mut cursor = start;

        loop {
            if self.visited >= self.budget {
                return Err(ValidationError::stack_overflow(format!(
                    "command budget of {} exhausted",
                    self.budget
                )));
            }
            self.visited += 1;

            self.state.call_stack.record(cursor, None);
            let command = self.memory.read_command(cursor)?;
            self.state.call_stack.record(cursor, Some(command));

            let byte = command.opcode();
            let opcode = self.table.decode(byte);
            trace!(
                "{:#010x}: {} {}",
                cursor,
                opcode.map(Opcode::name).unwrap_or("unknown"),
                command
            );

            match self.table.entry(byte) {
                DispatchEntry::Unrecognized => {
                    return Err(ValidationError::invalid_command(format!(
                        "unknown opcode {:#04x} for {}",
                        byte,
                        self.table.microcode()
                    )));
                }
                DispatchEntry::Placeholder => {}
                DispatchEntry::Validator(check) => check(&mut self.state, command)?,
            }

            match opcode {
                Some(Opcode::EndDl) => {
                    self.state.call_stack.exit_list();
                    return Ok(());
                }
                Some(Opcode::Dl) => {
                    let target = to_physical(self.state.segments.translate(command.address())?);
                    if validators::is_branch(command) {
                        debug!("Branch {:#010x} -> {:#010x}", cursor, target);
                        cursor = target;
                        continue;
                    }

                    self.state.call_stack.enter_list(target)?;
                    self.walk_list(target)?;
                }
                _ => {}
            }

            cursor = self.advance(cursor)?;
        }
    }

    fn advance(&self, cursor: u32) -> GfxResult<u32> {
        let next = cursor.checked_add(Command::SIZE).ok_or_else(|| {
            ValidationError::invalid_address(format!("list runs past {:#010x}", cursor))
        })?;
        self.state.segments.check_physical(next, DMA_ALIGNMENT)?;
        Ok(next)
    }
}
