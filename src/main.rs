use gfxvalidator::printer::generate_readable_message;
use gfxvalidator::{Microcode, RamImage, Task, Validator, ValidatorConfig};
use log::{debug, info};
use std::env;
use std::fs;
use std::path::Path;

const DEFAULT_MAX_COMMANDS: u32 = 1_000_000;

struct Options {
    image_path: String,
    list_address: u32,
    config_path: Option<String>,
    microcode: Option<Microcode>,
    max_commands: u32,
}

fn parse_number(text: &str) -> Result<u32, String> {
    let parsed = match text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => text.parse::<u32>(),
    };
    parsed.map_err(|_| format!("Invalid number: {}", text))
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut positional = Vec::new();
    let mut config_path = None;
    let mut microcode = None;
    let mut max_commands = DEFAULT_MAX_COMMANDS;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" | "--microcode" | "--max-commands" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| format!("{} requires a value", args[i]))?;
                match args[i].as_str() {
                    "--config" => config_path = Some(value.clone()),
                    "--microcode" => microcode = Some(Microcode::from_name(value)?),
                    _ => max_commands = parse_number(value)?,
                }
                i += 2;
            }
            flag if flag.starts_with("--") => return Err(format!("Unknown option: {}", flag)),
            _ => {
                positional.push(args[i].clone());
                i += 1;
            }
        }
    }

    if positional.len() != 2 {
        return Err("Expected an RDRAM image and a list address".to_string());
    }

    Ok(Options {
        image_path: positional[0].clone(),
        list_address: parse_number(&positional[1])?,
        config_path,
        microcode,
        max_commands,
    })
}

fn print_usage(program: &str) {
    println!("gfxcheck - validate an N64 display list inside an RDRAM dump");
    println!();
    println!(
        "Usage: {} <rdram-image> <list-address> [--config FILE] [--microcode f3d|f3dex2] [--max-commands N]",
        program
    );
    println!("Examples:");
    println!("  {} rdram.bin 0x80123400", program);
    println!("  {} rdram.bin 0x123400 --microcode f3dex2", program);
    println!();
    println!("Numbers may be decimal or hex with a 0x prefix. Exits with status 1 when");
    println!("the list is rejected.");
}

fn build_config(options: &Options) -> Result<ValidatorConfig, String> {
    // --microcode picks the defaults, keys from --config still override them
    let config = match &options.config_path {
        Some(path) => ValidatorConfig::load_with(Path::new(path), options.microcode)?,
        None => ValidatorConfig::for_microcode(options.microcode.unwrap_or(Microcode::F3d)),
    };

    config.check()?;
    Ok(config)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        print_usage(args.first().map(String::as_str).unwrap_or("gfxcheck"));
        return Ok(());
    }

    let options = parse_args(&args)?;
    let config = build_config(&options)?;
    info!(
        "Validating {} list at {:#010x} in {}",
        config.microcode, options.list_address, options.image_path
    );

    let bytes = fs::read(&options.image_path)
        .map_err(|e| format!("Cannot read image '{}': {}", options.image_path, e))?;
    debug!("Loaded {:#x} byte image", bytes.len());
    let ram = RamImage::from_bytes(bytes);

    let validator = Validator::new(config)?;
    let result = validator.validate(
        &Task::graphics(options.list_address),
        &ram,
        options.max_commands,
    );

    generate_readable_message(&result, validator.config(), |chunk| print!("{}", chunk));
    println!();

    if !result.is_success() {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use test_log::test;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| arg.to_string()).collect()
    }

    fn write_config(name: &str, text: &str) -> PathBuf {
        let path = env::temp_dir().join(format!("gfxcheck-{}-{}.toml", name, std::process::id()));
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_parse_args() {
        let options = parse_args(&args(&[
            "gfxcheck",
            "rdram.bin",
            "0x80001000",
            "--max-commands",
            "500",
        ]))
        .unwrap();
        assert_eq!(options.image_path, "rdram.bin");
        assert_eq!(options.list_address, 0x8000_1000);
        assert_eq!(options.max_commands, 500);
        assert_eq!(options.microcode, None);

        assert!(parse_args(&args(&["gfxcheck", "rdram.bin"])).is_err());
        assert!(parse_args(&args(&["gfxcheck", "a", "1", "--verbose"])).is_err());
        assert!(parse_args(&args(&["gfxcheck", "a", "1", "--config"])).is_err());
    }

    #[test]
    fn test_microcode_flag_without_config() {
        let options = parse_args(&args(&["gfxcheck", "a", "0", "--microcode", "f3dex2"])).unwrap();
        let config = build_config(&options).unwrap();
        assert_eq!(config, ValidatorConfig::for_microcode(Microcode::F3dex2));
    }

    #[test]
    fn test_microcode_flag_keeps_config_file_overrides() {
        let path = write_config(
            "override",
            "microcode = \"f3d\"\nram_size = 0x800000\nmax_list_depth = 3\nmax_matrix_depth = 4\nmatrix_size = 128\n",
        );
        let path_arg = path.to_string_lossy().into_owned();
        let options = parse_args(&args(&[
            "gfxcheck",
            "a",
            "0",
            "--config",
            &path_arg,
            "--microcode",
            "f3dex2",
        ]))
        .unwrap();
        let config = build_config(&options);
        fs::remove_file(&path).unwrap();

        let config = config.unwrap();
        assert_eq!(config.microcode, Microcode::F3dex2);
        assert_eq!(config.ram_size, 0x80_0000);
        assert_eq!(config.max_list_depth, 3);
        assert_eq!(config.max_matrix_depth, 4);
        assert_eq!(config.matrix_size, 128);
        assert_eq!(config.vertex_buffer_size, 32);
    }
}
