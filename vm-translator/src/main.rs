//! VM Translator - Main Entry Point
//!
//! Translates Jack VM code into Hack assembly (`Nand2Tetris` Project 7/8).
//!
//! # Usage
//! ```bash
//! cargo run <input.vm>       # single file -> input.asm
//! cargo run <directory>      # whole program -> directory/DIRECTORY.asm
//! ```

use std::env;
use std::path::Path;
use std::process;

use vm_translator::{VmError, translate_directory, translate_file};

fn get_output_filename(input_file: &str) -> String {
    let path = Path::new(input_file);
    match (path.file_stem(), path.parent()) {
        (Some(stem), Some(parent)) => {
            let mut output = parent.as_os_str().to_string_lossy().into_owned();
            if !output.is_empty() {
                output.push('/');
            }
            output.push_str(&stem.to_string_lossy());
            output.push_str(".asm");
            output
        }
        (Some(stem), None) => {
            let mut output = stem.to_string_lossy().into_owned();
            output.push_str(".asm");
            output
        }
        _ => format!("{input_file}.asm"),
    }
}

fn run(input: &str) -> Result<String, VmError> {
    let path = Path::new(input);
    if path.is_dir() {
        translate_directory(input)
    } else {
        if !input.ends_with(".vm") {
            return Err(VmError::invalid_input(format!(
                "input file '{input}' must have a .vm extension"
            )));
        }
        let output = get_output_filename(input);
        translate_file(input, &output)?;
        Ok(output)
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.vm | directory>", args[0]);
        process::exit(1);
    }

    match run(&args[1]) {
        Ok(output) => println!("Translation complete: {} -> {output}", args[1]),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
