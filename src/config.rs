use serde::Deserialize;
use std::fmt::{Display, Error, Formatter};
use std::fs;
use std::path::Path;

use crate::segment::PHYSICAL_ADDRESS_MASK;

/// Default amount of RDRAM (4 MiB, no expansion pak)
pub const DEFAULT_RAM_SIZE: u32 = 0x0040_0000;
/// Default list nesting limit
pub const DEFAULT_MAX_LIST_DEPTH: usize = 10;
/// Highest accepted list nesting limit. The traversal recurses once per nested call.
pub const MAX_LIST_DEPTH_LIMIT: usize = 64;
/// Default matrix stack limit
pub const DEFAULT_MAX_MATRIX_DEPTH: usize = 10;
/// Byte size of a fixed point `Mtx`
pub const DEFAULT_MATRIX_SIZE: u32 = 64;

/// Microcode family the display list was built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Microcode {
    /// Legacy Fast3D encoding
    F3d,
    /// Newer F3DEX2 encoding
    F3dex2,
}

impl Microcode {
    pub fn from_name(name: &str) -> Result<Self, String> {
        match name.to_ascii_lowercase().as_str() {
            "f3d" => Ok(Microcode::F3d),
            "f3dex2" => Ok(Microcode::F3dex2),
            _ => Err(format!("Unknown microcode '{}' (expected f3d or f3dex2)", name)),
        }
    }

    /// Field layout of the move-word command
    pub fn move_word_layout(self) -> MoveWordLayout {
        match self {
            Microcode::F3d => MoveWordLayout {
                index_shift: 0,
                index_width: 8,
                offset_shift: 8,
                offset_width: 16,
            },
            Microcode::F3dex2 => MoveWordLayout {
                index_shift: 16,
                index_width: 8,
                offset_shift: 0,
                offset_width: 16,
            },
        }
    }
}

impl Display for Microcode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            Microcode::F3d => write!(f, "f3d"),
            Microcode::F3dex2 => write!(f, "f3dex2"),
        }
    }
}

/// Where the index and offset live in `w0` of a move-word command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveWordLayout {
    pub index_shift: u32,
    pub index_width: u32,
    pub offset_shift: u32,
    pub offset_width: u32,
}

/// Build-time validator configuration.
///
/// A config is fixed for the lifetime of a [`crate::validator::Validator`]; nothing in it
/// changes per validated list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorConfig {
    pub microcode: Microcode,
    /// Size of addressable RAM in bytes
    pub ram_size: u32,
    /// Number of vertex slots in the coprocessor's vertex buffer
    pub vertex_buffer_size: u32,
    /// Exclusive bound on the encoded vertex index in triangle commands
    pub max_vertex_value: u32,
    /// Byte size of a matrix record
    pub matrix_size: u32,
    pub max_list_depth: usize,
    pub max_matrix_depth: usize,
}

impl ValidatorConfig {
    /// The defaults for a microcode family
    pub fn for_microcode(microcode: Microcode) -> Self {
        let (vertex_buffer_size, index_scale) = match microcode {
            Microcode::F3d => (16, crate::gbi::f3d::VERTEX_INDEX_SCALE),
            Microcode::F3dex2 => (32, crate::gbi::f3dex2::VERTEX_INDEX_SCALE),
        };

        ValidatorConfig {
            microcode,
            ram_size: DEFAULT_RAM_SIZE,
            vertex_buffer_size,
            max_vertex_value: vertex_buffer_size * index_scale,
            matrix_size: DEFAULT_MATRIX_SIZE,
            max_list_depth: DEFAULT_MAX_LIST_DEPTH,
            max_matrix_depth: DEFAULT_MAX_MATRIX_DEPTH,
        }
    }

    pub fn move_word_layout(&self) -> MoveWordLayout {
        self.microcode.move_word_layout()
    }

    /// Parse a TOML config. Missing keys take the defaults of the selected microcode.
    pub fn from_toml_str(text: &str) -> Result<Self, String> {
        ValidatorConfig::from_toml_str_with(text, None)
    }

    /// Parse a TOML config, letting `microcode` replace the one named in the file.
    ///
    /// The defaults come from the chosen microcode and every key in the file still
    /// overrides them.
    pub fn from_toml_str_with(text: &str, microcode: Option<Microcode>) -> Result<Self, String> {
        let file: ConfigFile =
            toml::from_str(text).map_err(|e| format!("Invalid validator config: {}", e))?;

        let microcode = microcode.or(file.microcode).unwrap_or(Microcode::F3d);
        let mut config = ValidatorConfig::for_microcode(microcode);
        if let Some(ram_size) = file.ram_size {
            config.ram_size = ram_size;
        }
        if let Some(size) = file.vertex_buffer_size {
            config.vertex_buffer_size = size;
        }
        if let Some(value) = file.max_vertex_value {
            config.max_vertex_value = value;
        }
        if let Some(size) = file.matrix_size {
            config.matrix_size = size;
        }
        if let Some(depth) = file.max_list_depth {
            config.max_list_depth = depth;
        }
        if let Some(depth) = file.max_matrix_depth {
            config.max_matrix_depth = depth;
        }

        config.check()?;
        Ok(config)
    }

    /// Read and parse a TOML config file
    pub fn load(path: &Path) -> Result<Self, String> {
        ValidatorConfig::load_with(path, None)
    }

    /// Read a TOML config file, see [`ValidatorConfig::from_toml_str_with`]
    pub fn load_with(path: &Path, microcode: Option<Microcode>) -> Result<Self, String> {
        let text = fs::read_to_string(path)
            .map_err(|e| format!("Cannot read config '{}': {}", path.display(), e))?;
        ValidatorConfig::from_toml_str_with(&text, microcode)
    }

    /// Reject settings the validator cannot work with
    pub fn check(&self) -> Result<(), String> {
        if self.ram_size == 0 {
            return Err("ram_size must be non-zero".to_string());
        }
        if self.ram_size > PHYSICAL_ADDRESS_MASK + 1 {
            return Err(format!(
                "ram_size {:#x} exceeds the physical address space",
                self.ram_size
            ));
        }
        if self.vertex_buffer_size == 0 || self.max_vertex_value == 0 {
            return Err("vertex buffer settings must be non-zero".to_string());
        }
        if self.matrix_size == 0 || self.matrix_size % 8 != 0 {
            return Err(format!(
                "matrix_size {} must be a non-zero multiple of 8",
                self.matrix_size
            ));
        }
        if self.max_list_depth == 0 {
            return Err("max_list_depth must allow the top-level list".to_string());
        }
        if self.max_list_depth > MAX_LIST_DEPTH_LIMIT {
            return Err(format!(
                "max_list_depth {} exceeds the limit of {}",
                self.max_list_depth, MAX_LIST_DEPTH_LIMIT
            ));
        }
        Ok(())
    }
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        ValidatorConfig::for_microcode(Microcode::F3d)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigFile {
    microcode: Option<Microcode>,
    ram_size: Option<u32>,
    vertex_buffer_size: Option<u32>,
    max_vertex_value: Option<u32>,
    matrix_size: Option<u32>,
    max_list_depth: Option<usize>,
    max_matrix_depth: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    #[test]
    fn test_defaults_per_microcode() {
        let f3d = ValidatorConfig::for_microcode(Microcode::F3d);
        assert_eq!(f3d.vertex_buffer_size, 16);
        assert_eq!(f3d.max_vertex_value, 160);
        assert_eq!(f3d.matrix_size, 64);
        assert_eq!(f3d.ram_size, 0x40_0000);

        let f3dex2 = ValidatorConfig::for_microcode(Microcode::F3dex2);
        assert_eq!(f3dex2.vertex_buffer_size, 32);
        assert_eq!(f3dex2.max_vertex_value, 64);
        assert_eq!(f3dex2.max_list_depth, 10);
        assert_eq!(f3dex2.max_matrix_depth, 10);
    }

    #[test]
    fn test_move_word_layouts_differ() {
        let legacy = Microcode::F3d.move_word_layout();
        let newer = Microcode::F3dex2.move_word_layout();
        assert_eq!(legacy.index_shift, 0);
        assert_eq!(legacy.offset_shift, 8);
        assert_eq!(newer.index_shift, 16);
        assert_eq!(newer.offset_shift, 0);
    }

    #[test]
    fn test_toml_partial_override() {
        let config = ValidatorConfig::from_toml_str(
            r#"
            microcode = "f3dex2"
            ram_size = 0x800000
            max_list_depth = 4
            "#,
        )
        .unwrap();

        assert_eq!(config.microcode, Microcode::F3dex2);
        assert_eq!(config.ram_size, 0x80_0000);
        assert_eq!(config.max_list_depth, 4);
        // Untouched keys keep the F3DEX2 defaults
        assert_eq!(config.vertex_buffer_size, 32);
        assert_eq!(config.max_vertex_value, 64);
    }

    #[test]
    fn test_toml_rejects_bad_values() {
        assert!(ValidatorConfig::from_toml_str("ram_size = 0").is_err());
        assert!(ValidatorConfig::from_toml_str("matrix_size = 60").is_err());
        assert!(ValidatorConfig::from_toml_str("max_list_depth = 0").is_err());
        assert!(ValidatorConfig::from_toml_str("max_list_depth = 65").is_err());
        assert!(ValidatorConfig::from_toml_str("max_list_depth = 9223372036854775807").is_err());
        assert!(ValidatorConfig::from_toml_str("max_list_depth = 64").is_ok());
        assert!(ValidatorConfig::from_toml_str("vertex_buffer_size = 0").is_err());
        assert!(ValidatorConfig::from_toml_str("microcode = \"f3dlx\"").is_err());
        assert!(ValidatorConfig::from_toml_str("colour = 3").is_err());
    }

    #[test]
    fn test_microcode_override_keeps_file_values() {
        let text = r#"
            microcode = "f3d"
            max_list_depth = 4
            matrix_size = 128
            max_vertex_value = 48
            "#;
        let config = ValidatorConfig::from_toml_str_with(text, Some(Microcode::F3dex2)).unwrap();

        assert_eq!(config.microcode, Microcode::F3dex2);
        assert_eq!(config.max_list_depth, 4);
        assert_eq!(config.matrix_size, 128);
        assert_eq!(config.max_vertex_value, 48);
        // Keys the file leaves out take the F3DEX2 defaults
        assert_eq!(config.vertex_buffer_size, 32);

        let unchanged = ValidatorConfig::from_toml_str_with(text, None).unwrap();
        assert_eq!(unchanged.microcode, Microcode::F3d);
        assert_eq!(unchanged.vertex_buffer_size, 16);
    }

    #[test]
    fn test_microcode_from_name() {
        assert_eq!(Microcode::from_name("F3DEX2"), Ok(Microcode::F3dex2));
        assert_eq!(Microcode::from_name("f3d"), Ok(Microcode::F3d));
        assert!(Microcode::from_name("s2dex").is_err());
    }
}
