//! Jack Compiler - Main Entry Point
//!
//! Compiles Jack source into VM code (`Nand2Tetris` Projects 10/11).
//!
//! # Usage
//! ```bash
//! cargo run <input.jack>    # single class -> input.vm
//! cargo run <directory>     # whole program -> one .vm file per class
//! ```

use std::env;
use std::path::Path;
use std::process;

use jack_compiler::{JackError, compile_directory, compile_file};

fn get_output_filename(input_file: &str) -> String {
    let path = Path::new(input_file);
    match (path.file_stem(), path.parent()) {
        (Some(stem), Some(parent)) => {
            let mut output = parent.as_os_str().to_string_lossy().into_owned();
            if !output.is_empty() {
                output.push('/');
            }
            output.push_str(&stem.to_string_lossy());
            output.push_str(".vm");
            output
        }
        (Some(stem), None) => {
            let mut output = stem.to_string_lossy().into_owned();
            output.push_str(".vm");
            output
        }
        _ => format!("{input_file}.vm"),
    }
}

fn run(input: &str) -> Result<Vec<String>, JackError> {
    let path = Path::new(input);
    if path.is_dir() {
        compile_directory(input)
    } else {
        if !input.ends_with(".jack") {
            return Err(JackError::invalid_input(format!(
                "input file '{input}' must have a .jack extension"
            )));
        }
        let output = get_output_filename(input);
        compile_file(input, &output)?;
        Ok(vec![output])
    }
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.jack | directory>", args[0]);
        process::exit(1);
    }

    match run(&args[1]) {
        Ok(outputs) => {
            for output in outputs {
                println!("Compiled: {output}");
            }
        }
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_filename_for_plain_file() {
        assert_eq!(get_output_filename("Main.jack"), "Main.vm");
    }

    #[test]
    fn output_filename_preserves_directory() {
        assert_eq!(get_output_filename("dir/Main.jack"), "dir/Main.vm");
    }
}
