//! VM Translator for the `Nand2Tetris` course (Jack VM -> Hack assembly)
//!
//! Translates one `.vm` file, or every `.vm` file in a directory, into Hack
//! assembly. Directory mode additionally emits the bootstrap sequence and
//! requires a `Sys.vm` to be present, matching the reference compiler's
//! contract for multi-file programs.
//!
//! # Architecture
//! - [`parser`]: splits a `.vm` file into whitespace-separated commands
//! - [`code_writer`]: lowers each command to Hack assembly
//! - [`error`]: the `VmError`/`ErrorKind` taxonomy shared by both

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod code_writer;
pub mod error;
pub mod parser;

pub use code_writer::CodeWriter;
pub use error::{ErrorKind, VmError};
pub use parser::{CommandType, Parser};

use std::path::Path;

/// Translates every command in `input_file`'s parser into `writer`.
///
/// Does not emit the bootstrap sequence; callers wanting project-8
/// multi-file semantics call [`CodeWriter::write_init`] themselves first.
pub fn translate_into(input_file: &str, writer: &mut CodeWriter) -> Result<(), VmError> {
    let mut parser = Parser::new(input_file)?;
    writer.set_filename(input_file);

    while parser.has_more_commands() {
        parser.advance();

        match parser.command_type() {
            CommandType::Arithmetic => writer.write_arithmetic(parser.arg1()?)?,
            CommandType::Push => writer.write_push_pop("push", parser.arg1()?, parser.arg2()?)?,
            CommandType::Pop => writer.write_push_pop("pop", parser.arg1()?, parser.arg2()?)?,
            CommandType::Label => writer.write_label(parser.arg1()?)?,
            CommandType::Goto => writer.write_goto(parser.arg1()?)?,
            CommandType::If => writer.write_if_goto(parser.arg1()?)?,
            CommandType::Function => {
                writer.write_function(parser.arg1()?, parser.arg2()?)?;
            }
            CommandType::Call => writer.write_call(parser.arg1()?, parser.arg2()?)?,
            CommandType::Return => writer.write_return()?,
        }
    }

    Ok(())
}

/// Translates a single `.vm` file into `output_file`, with no bootstrap.
pub fn translate_file(input_file: &str, output_file: &str) -> Result<(), VmError> {
    let mut writer = CodeWriter::new(output_file)?;
    translate_into(input_file, &mut writer)?;
    writer.close()
}

/// Translates every `.vm` file in `dir` into a single `dir/DIR.asm`,
/// emitting the bootstrap sequence first.
///
/// # Errors
/// Returns `InvalidInput` if `dir` contains no `Sys.vm`.
pub fn translate_directory(dir: &str) -> Result<String, VmError> {
    let dir_path = Path::new(dir);
    let dir_name = dir_path
        .file_name()
        .and_then(|s| s.to_str())
        .ok_or_else(|| VmError::invalid_input(format!("'{dir}' has no directory name")))?;

    let mut vm_files: Vec<String> = std::fs::read_dir(dir_path)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|e| e.to_str()) == Some("vm"))
        .filter_map(|path| path.to_str().map(str::to_string))
        .collect();
    vm_files.sort();

    let has_sys = vm_files
        .iter()
        .any(|f| Path::new(f).file_name().and_then(|s| s.to_str()) == Some("Sys.vm"));
    if !has_sys {
        return Err(VmError::invalid_input(format!(
            "directory '{dir}' has no Sys.vm"
        )));
    }

    let output_path = dir_path.join(format!("{dir_name}.asm"));
    let output_str = output_path.to_string_lossy().into_owned();
    let mut writer = CodeWriter::new(&output_str)?;

    writer.write_init()?;
    for file in &vm_files {
        translate_into(file, &mut writer)?;
    }
    writer.close()?;

    Ok(output_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    #[test]
    fn translates_push_constant_and_add() {
        let tmp_dir = std::env::temp_dir().join("vm_translator_lib_test_add");
        std::fs::create_dir_all(&tmp_dir).unwrap();
        let input = tmp_dir.join("Add.vm");
        std::fs::write(&input, "push constant 7\npush constant 8\nadd\n").unwrap();

        let output = tmp_dir.join("Add.asm");
        translate_file(input.to_str().unwrap(), output.to_str().unwrap()).unwrap();

        let mut contents = String::new();
        std::fs::File::open(&output)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();
        assert!(contents.contains("@SP"));
        assert!(contents.contains("D+M"));

        let _ = std::fs::remove_dir_all(&tmp_dir);
    }

    #[test]
    fn directory_mode_requires_sys_vm() {
        let tmp_dir = std::env::temp_dir().join("vm_translator_lib_test_no_sys");
        std::fs::create_dir_all(&tmp_dir).unwrap();
        std::fs::write(tmp_dir.join("Main.vm"), "push constant 1\n").unwrap();

        let err = translate_directory(tmp_dir.to_str().unwrap()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidInput);

        let _ = std::fs::remove_dir_all(&tmp_dir);
    }

    #[test]
    fn directory_mode_emits_bootstrap_and_concatenates_files_once() {
        let tmp_dir = std::env::temp_dir().join("vm_translator_lib_test_dir");
        std::fs::create_dir_all(&tmp_dir).unwrap();
        std::fs::write(
            tmp_dir.join("Sys.vm"),
            "function Sys.init 0\ncall Main.main 0\nreturn\n",
        )
        .unwrap();
        std::fs::write(
            tmp_dir.join("Main.vm"),
            "function Main.main 0\npush constant 1\nreturn\n",
        )
        .unwrap();

        let output_path = translate_directory(tmp_dir.to_str().unwrap()).unwrap();
        let mut contents = String::new();
        std::fs::File::open(&output_path)
            .unwrap()
            .read_to_string(&mut contents)
            .unwrap();

        assert!(contents.starts_with("// bootstrap"));
        assert_eq!(contents.matches("(Main.main)").count(), 1);
        assert_eq!(contents.matches("(Sys.init)").count(), 1);

        let _ = std::fs::remove_dir_all(&tmp_dir);
    }
}
