// Test utilities for assembling display lists in a small RAM image
use crate::builder::Gbi;
use crate::command::Command;
use crate::config::{Microcode, ValidatorConfig};
use crate::gbi::MatrixFlags;
use crate::memory::RamImage;
use crate::result::ValidationResult;
use crate::validator::{Task, Validator};

pub const TEST_RAM_SIZE: u32 = 0x10000;
pub const TEST_BUDGET: u32 = 1000;

pub fn test_config(microcode: Microcode) -> ValidatorConfig {
    let mut config = ValidatorConfig::for_microcode(microcode);
    config.ram_size = TEST_RAM_SIZE;
    config
}

pub fn load_modelview() -> MatrixFlags {
    MatrixFlags {
        projection: false,
        load: true,
        push: false,
    }
}

pub struct TestImage {
    pub gbi: Gbi,
    pub ram: RamImage,
    pub config: ValidatorConfig,
}

impl TestImage {
    pub fn new(microcode: Microcode) -> Self {
        TestImage {
            gbi: Gbi::new(microcode),
            ram: RamImage::new(TEST_RAM_SIZE as usize),
            config: test_config(microcode),
        }
    }

    pub fn write_list(&mut self, address: u32, commands: &[Command]) {
        self.ram.write_commands(address, commands).unwrap();
    }

    pub fn validate(&self, data_ptr: u32) -> ValidationResult {
        self.validate_with_budget(data_ptr, TEST_BUDGET)
    }

    pub fn validate_with_budget(&self, data_ptr: u32, budget: u32) -> ValidationResult {
        Validator::new(self.config.clone())
            .unwrap()
            .validate(&Task::graphics(data_ptr), &self.ram, budget)
    }
}
