//! Jack source -> Jack VM code, end to end.
//!
//! `compile_file` drives a single class through tokenizer, parser, and code
//! generator. `compile_directory` does the same for every `.jack` file in a
//! directory, each compiled independently — there is no cross-file state,
//! matching Jack's one-class-per-file model.

pub mod ast;
pub mod code_generator;
pub mod error;
pub mod parser;
pub mod symbol_table;
pub mod token;
pub mod tokenizer;

use std::fs;
use std::io::BufWriter;
use std::path::Path;

pub use error::{ErrorKind, JackError};

use code_generator::CodeGenerator;
use parser::Parser;

/// Compiles one `.jack` file to the given output path.
///
/// # Errors
/// Propagates `LexicalError`/`SyntaxError`/`SymbolError` from the tokenizer,
/// parser, or code generator, and `InvalidInput` for I/O failures.
pub fn compile_file(input_file: &str, output_file: &str) -> Result<(), JackError> {
    if !input_file.ends_with(".jack") {
        return Err(JackError::invalid_input(format!(
            "'{input_file}' is not a .jack file"
        )));
    }
    let source = fs::read_to_string(input_file)?;
    let tokens = tokenizer::tokenize(&source)?;
    let class = Parser::new(tokens).parse()?;

    let file = fs::File::create(output_file)?;
    let mut generator = CodeGenerator::new(BufWriter::new(file));
    generator.compile_class(&class)
}

fn output_path_for(input_file: &str) -> String {
    input_file
        .strip_suffix(".jack")
        .map_or_else(|| format!("{input_file}.vm"), |stem| format!("{stem}.vm"))
}

/// Compiles every `.jack` file in `dir`, each to its own `.vm` file.
///
/// A `Main.jack` file must be present, matching the convention that a
/// compilable Jack program has a `Main` class with a `main` function.
///
/// # Errors
/// `InvalidInput` if `dir` has no `Main.jack`. Otherwise propagates the
/// first compilation failure encountered, in file-name order.
pub fn compile_directory(dir: &str) -> Result<Vec<String>, JackError> {
    let mut jack_files: Vec<String> = fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "jack"))
        .map(|path| path.to_string_lossy().into_owned())
        .collect();
    jack_files.sort();

    let has_main = jack_files
        .iter()
        .any(|path| Path::new(path).file_name().is_some_and(|n| n == "Main.jack"));
    if !has_main {
        return Err(JackError::invalid_input(format!(
            "directory '{dir}' has no Main.jack"
        )));
    }

    let mut outputs = Vec::with_capacity(jack_files.len());
    for input in &jack_files {
        let output = output_path_for(input);
        compile_file(input, &output)?;
        outputs.push(output);
    }
    Ok(outputs)
}
