#![crate_name = "gfxvalidator"]

#[macro_use]
extern crate lazy_static;

pub mod builder;
pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod gbi;
pub mod memory;
pub mod printer;
pub mod result;
pub mod segment;
pub mod stack;
pub mod state;
pub mod validator;
pub mod validators;

#[cfg(test)]
mod test_utils;
#[cfg(test)]
mod validator_tests;

pub use config::{Microcode, ValidatorConfig};
pub use error::{ErrorKind, GfxResult, ValidationError};
pub use memory::{DisplayListMemory, RamImage};
pub use result::{Outcome, StackEntry, ValidationResult};
pub use validator::{Task, TaskType, Validator};
