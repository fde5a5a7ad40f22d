use crate::command::Command;
use crate::config::Microcode;
use crate::error::ErrorKind;
use crate::memory::RamImage;
use crate::result::StackEntry;
use crate::test_utils::{load_modelview, TestImage, TEST_RAM_SIZE};
use crate::validator::{Task, TaskType, Validator, M_AUDTASK};
use test_log::test;

#[test]
fn test_task_types() {
    assert_eq!(TaskType::from_raw(1), TaskType::Graphics);
    assert_eq!(TaskType::from_raw(2), TaskType::Audio);
    assert_eq!(TaskType::from_raw(3), TaskType::Video);
    assert_eq!(TaskType::from_raw(9), TaskType::Other(9));
}

#[test]
fn test_non_graphics_task_is_not_inspected() {
    let image = TestImage::new(Microcode::F3d);
    let validator = Validator::new(image.config.clone()).unwrap();
    let task = Task {
        task_type: M_AUDTASK,
        data_ptr: 0x0000_0003,
    };
    let result = validator.validate(&task, &image.ram, 0);
    assert!(result.is_success());
    assert!(result.stack.is_empty());
}

#[test]
fn test_empty_list() {
    let mut image = TestImage::new(Microcode::F3d);
    let end = image.gbi.end_display_list();
    image.write_list(0x100, &[end]);
    assert!(image.validate(0x100).is_success());
}

#[test]
fn test_kseg0_pointer_is_masked() {
    let mut image = TestImage::new(Microcode::F3dex2);
    let end = image.gbi.end_display_list();
    image.write_list(0x100, &[end]);
    assert!(image.validate(0x8000_0100).is_success());
}

#[test]
fn test_bad_top_level_pointer() {
    let image = TestImage::new(Microcode::F3d);

    let result = image.validate(0x104);
    assert_eq!(result.error_kind(), Some(ErrorKind::DataAlignment));
    assert!(result.stack.is_empty());

    let result = image.validate(TEST_RAM_SIZE);
    assert_eq!(result.error_kind(), Some(ErrorKind::InvalidAddress));
}

#[test]
fn test_unknown_opcode() {
    let mut image = TestImage::new(Microcode::F3d);
    let noop = image.gbi.noop();
    let bogus = Command::new(0x0200_0000, 0);
    image.write_list(0x100, &[noop, bogus]);

    let result = image.validate(0x100);
    assert_eq!(result.error_kind(), Some(ErrorKind::InvalidCommand));
    assert_eq!(
        result.stack,
        vec![StackEntry {
            address: 0x108,
            command: Some(bogus),
        }]
    );
}

#[test]
fn test_opcode_tables_differ_per_microcode() {
    // 0xB8 ends an F3D list but is not an F3DEX2 command
    let mut image = TestImage::new(Microcode::F3dex2);
    image.write_list(0x100, &[Command::new(0xB800_0000, 0)]);
    assert_eq!(
        image.validate(0x100).error_kind(),
        Some(ErrorKind::InvalidCommand)
    );
}

#[test]
fn test_placeholders_accepted() {
    let mut image = TestImage::new(Microcode::F3d);
    let gbi = image.gbi;
    image.write_list(
        0x100,
        &[
            Command::new(0xBB00_0001, 0xFFFF_FFFF),
            Command::new(0xB900_0000, 0x1234_5678),
            gbi.rdp_pipe_sync(),
            Command::new(0xF600_0000, 0xDEAD_BEEF),
            gbi.rdp_full_sync(),
            gbi.end_display_list(),
        ],
    );
    assert!(image.validate(0x100).is_success());
}

#[test]
fn test_call_returns_to_caller() {
    let mut image = TestImage::new(Microcode::F3d);
    let gbi = image.gbi;
    image.write_list(
        0x100,
        &[
            gbi.segment(0, 0),
            gbi.display_list(0x200),
            gbi.matrix(0x300, load_modelview()),
            gbi.end_display_list(),
        ],
    );
    image.write_list(0x200, &[gbi.noop(), gbi.end_display_list()]);
    assert!(image.validate(0x100).is_success());

    // The matrix after the call is what fails, back in the top-level list
    image.write_list(0x110, &[gbi.matrix(0x304, load_modelview())]);
    let result = image.validate(0x100);
    assert_eq!(result.error_kind(), Some(ErrorKind::DataAlignment));
    assert_eq!(result.stack.len(), 1);
    assert_eq!(result.stack[0].address, 0x110);
}

#[test]
fn test_branch_does_not_return() {
    let mut image = TestImage::new(Microcode::F3dex2);
    let gbi = image.gbi;
    image.write_list(
        0x100,
        &[
            gbi.segment(0, 0),
            gbi.branch_list(0x200),
            Command::new(0x0900_0000, 0),
        ],
    );
    image.write_list(0x200, &[gbi.end_display_list()]);
    assert!(image.validate(0x100).is_success());
}

#[test]
fn test_call_target_needs_segment() {
    let mut image = TestImage::new(Microcode::F3d);
    let gbi = image.gbi;
    image.write_list(0x100, &[gbi.display_list(0x0300_0000)]);
    let result = image.validate(0x100);
    assert_eq!(result.error_kind(), Some(ErrorKind::SegmentError));
    assert_eq!(result.stack.len(), 1);
}

#[test]
fn test_failure_inside_call_reports_both_frames() {
    let mut image = TestImage::new(Microcode::F3d);
    let gbi = image.gbi;
    let call = gbi.display_list(0x0600_0000);
    image.write_list(
        0x100,
        &[gbi.segment(6, 0x400), call, gbi.end_display_list()],
    );
    image.write_list(0x400, &[gbi.noop(), gbi.pop_matrix()]);

    let result = image.validate(0x100);
    assert_eq!(result.error_kind(), Some(ErrorKind::StackUnderflow));
    assert_eq!(
        result.stack,
        vec![
            StackEntry {
                address: 0x108,
                command: Some(call),
            },
            StackEntry {
                address: 0x408,
                command: Some(gbi.pop_matrix()),
            },
        ]
    );
}

#[test]
fn test_list_running_off_ram() {
    let mut image = TestImage::new(Microcode::F3d);
    let noop = image.gbi.noop();
    image.write_list(TEST_RAM_SIZE - 8, &[noop]);
    let result = image.validate(TEST_RAM_SIZE - 8);
    assert_eq!(result.error_kind(), Some(ErrorKind::InvalidAddress));
}

#[test]
fn test_memory_smaller_than_ram() {
    let image = TestImage::new(Microcode::F3d);
    let validator = Validator::new(image.config.clone()).unwrap();
    let small = RamImage::new(0x40);
    let result = validator.validate(&Task::graphics(0x100), &small, 10);
    assert_eq!(result.error_kind(), Some(ErrorKind::InvalidAddress));
    assert_eq!(result.stack[0].command, None);
}

#[test]
fn test_budget_counts_every_command() {
    let mut image = TestImage::new(Microcode::F3d);
    let gbi = image.gbi;
    image.write_list(
        0x100,
        &[gbi.noop(), gbi.noop(), gbi.end_display_list()],
    );
    assert!(image.validate_with_budget(0x100, 3).is_success());

    let result = image.validate_with_budget(0x100, 2);
    assert_eq!(result.error_kind(), Some(ErrorKind::StackOverflow));
    assert!(result.message.contains("budget"));
}

#[test]
fn test_validator_is_reusable() {
    let mut image = TestImage::new(Microcode::F3d);
    let gbi = image.gbi;
    image.write_list(
        0x100,
        &[gbi.matrix(0x0600_0000, load_modelview()), gbi.end_display_list()],
    );
    image.write_list(
        0x200,
        &[
            gbi.segment(6, 0x800),
            gbi.matrix(0x0600_0000, load_modelview()),
            gbi.end_display_list(),
        ],
    );

    let validator = Validator::new(image.config.clone()).unwrap();
    let first = validator.validate(&Task::graphics(0x200), &image.ram, 100);
    assert!(first.is_success());

    // Segments from the first run do not leak into the second
    let second = validator.validate(&Task::graphics(0x100), &image.ram, 100);
    assert_eq!(second.error_kind(), Some(ErrorKind::SegmentError));
}
