//! Translates parsed VM commands into Hack assembly.
//!
//! Segment addressing, stack arithmetic, and the push/pop machinery are a
//! direct descendant of the project-7 writer; label/goto/function/call/
//! return extend it to the full project-8 calling convention.

use crate::error::{ErrorKind, VmError};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};

macro_rules! write_asm {
    ($writer:expr, $($line:literal)*) => {
        $writer.write_all(concat!($($line, "\n"),*).as_bytes())
    };
}

#[derive(Clone, Copy)]
enum SegmentSymbol {
    Local,
    Argument,
    This,
    That,
    Temp,
    Pointer,
    Static,
    Constant,
}

impl SegmentSymbol {
    fn from_str(segment: &str) -> Option<Self> {
        match segment {
            "local" => Some(Self::Local),
            "argument" => Some(Self::Argument),
            "this" => Some(Self::This),
            "that" => Some(Self::That),
            "temp" => Some(Self::Temp),
            "pointer" => Some(Self::Pointer),
            "static" => Some(Self::Static),
            "constant" => Some(Self::Constant),
            _ => None,
        }
    }

    fn symbol(self) -> &'static str {
        match self {
            Self::Local => "LCL",
            Self::Argument => "ARG",
            Self::This => "THIS",
            Self::That => "THAT",
            Self::Temp => "R5",
            Self::Pointer => "THIS", // special-cased by caller
            Self::Static => "STATIC", // special-cased by caller
            Self::Constant => "CONSTANT", // special-cased by caller
        }
    }
}

pub struct CodeWriter {
    output_file: BufWriter<File>,
    label_counter: usize,
    filename: String,
    /// Per-callee return-label counters, keyed by callee name. Threaded
    /// explicitly through this writer instead of living in a global/static
    /// so two independent translation runs never share state.
    call_counts: HashMap<String, u32>,
}

impl CodeWriter {
    /// Creates a new `CodeWriter`, buffering output in 8KiB chunks.
    pub fn new(output_filename: &str) -> Result<Self, VmError> {
        let file = File::create(output_filename)?;
        let buffered = BufWriter::with_capacity(8192, file);
        Ok(Self {
            output_file: buffered,
            label_counter: 0,
            filename: String::new(),
            call_counts: HashMap::new(),
        })
    }

    #[inline]
    pub fn set_filename(&mut self, filename: &str) {
        let name = std::path::Path::new(filename)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("Unknown");
        self.filename.clear();
        self.filename.push_str(name);
    }

    /// Emits the fixed bootstrap sequence: `SP=256`, negative sentinels in
    /// `LCL`/`ARG`/`THIS`/`THAT` to catch stray pointer use before any frame
    /// is ever pushed, then `call Sys.init 0`.
    ///
    /// Only emitted once, by the directory-mode driver, before any
    /// translated file's code.
    pub fn write_init(&mut self) -> Result<(), VmError> {
        write_asm!(self.output_file,
            "// bootstrap"
            "@256"
            "D=A"
            "@SP"
            "M=D"
        )?;
        for (reg, magnitude) in [("LCL", 1), ("ARG", 2), ("THIS", 3), ("THAT", 4)] {
            write!(self.output_file, "@{magnitude}\nD=-A\n@{reg}\nM=D\n")?;
        }
        self.write_call("Sys.init", 0)
    }

    pub fn write_arithmetic(&mut self, command: &str) -> Result<(), VmError> {
        writeln!(self.output_file, "// vm command:{command}")?;

        match command {
            "add" => self.write_binary_op("D+M"),
            "sub" => self.write_binary_op("D-M"),
            "and" => self.write_binary_op("D&M"),
            "or" => self.write_binary_op("D|M"),
            "neg" => self.write_unary_op(true),
            "not" => self.write_unary_op(false),
            "eq" => self.write_comparison("JEQ"),
            "gt" => self.write_comparison("JGT"),
            "lt" => self.write_comparison("JLT"),
            _ => Err(VmError::syntax(format!(
                "unknown arithmetic command '{command}'"
            ))),
        }
    }

    #[inline]
    fn write_binary_op(&mut self, operation: &str) -> Result<(), VmError> {
        write!(
            self.output_file,
            "// get the top element of stack\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             // stash it\n\
             @R14\n\
             M=D\n\
             // get the new top element of stack\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             @R13\n\
             M=D\n\
             @R13\n\
             D=M\n\
             @R14\n\
             D={operation}\n"
        )?;

        self.write_push_d()?;
        self.output_file.write_all(b"\n")?;
        Ok(())
    }

    #[inline]
    fn write_unary_op(&mut self, is_neg: bool) -> Result<(), VmError> {
        write_asm!(self.output_file,
            "// get the top element of stack"
            "@SP"
            "M=M-1"
            "A=M"
            "D=M"
        )?;

        if is_neg {
            write_asm!(self.output_file,
                "@0"
                "D=A-D"
            )?;
        } else {
            write_asm!(self.output_file, "D=!D")?;
        }

        self.write_push_d()?;
        self.output_file.write_all(b"\n")?;
        Ok(())
    }

    /// Emits a comparison, namespacing its labels by `file_label` so the
    /// same comparison in two different `.vm` files never collides once
    /// their translated output is concatenated.
    #[inline]
    fn write_comparison(&mut self, jump: &str) -> Result<(), VmError> {
        let label_prefix = match jump {
            "JEQ" => "EQ",
            "JGT" => "GT",
            "JLT" => "LT",
            _ => jump,
        };
        let label_num = self.label_counter;
        self.label_counter += 1;
        let true_label = format!("{}${label_prefix}.{label_num}", self.filename);
        let end_label = format!("{}$END{label_prefix}.{label_num}", self.filename);

        write!(
            self.output_file,
            "// get the top element of stack\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             @R14\n\
             M=D\n\
             @SP\n\
             M=M-1\n\
             A=M\n\
             D=M\n\
             @R13\n\
             M=D\n\
             @R13\n\
             D=M\n\
             @R14\n\
             D=D-M\n\
             @{true_label}\n\
             D;{jump}\n\
             // push false\n\
             @SP\n\
             A=M\n\
             M=0\n\
             @SP\n\
             M=M+1\n\
             @{end_label}\n\
             0;JMP\n\
             ({true_label})\n\
             // push true\n\
             @SP\n\
             A=M\n\
             M=-1\n\
             @SP\n\
             M=M+1\n\
             ({end_label})\n\n"
        )?;
        Ok(())
    }

    pub fn write_push_pop(
        &mut self,
        command: &str,
        segment: &str,
        index: i32,
    ) -> Result<(), VmError> {
        writeln!(self.output_file, "// vm command:{command} {segment} {index}")?;

        match command {
            "push" => self.write_push(segment, index)?,
            "pop" => self.write_pop(segment, index)?,
            _ => {
                return Err(VmError::syntax(format!(
                    "unknown stack command '{command}'"
                )));
            }
        }

        self.output_file.write_all(b"\n")?;
        Ok(())
    }

    #[inline]
    fn write_push(&mut self, segment: &str, index: i32) -> Result<(), VmError> {
        match SegmentSymbol::from_str(segment) {
            Some(SegmentSymbol::Constant) => {
                write!(self.output_file, "@{index}\nD=A\n")?;
                self.write_push_d()
            }
            Some(
                seg @ (SegmentSymbol::Local
                | SegmentSymbol::Argument
                | SegmentSymbol::This
                | SegmentSymbol::That),
            ) => {
                write!(
                    self.output_file,
                    "@{}\nD=M\n@{index}\nA=D+A\nD=M\n",
                    seg.symbol()
                )?;
                self.write_push_d()
            }
            Some(SegmentSymbol::Temp) => {
                write!(self.output_file, "@R5\nD=A\n@{index}\nA=D+A\nD=M\n")?;
                self.write_push_d()
            }
            Some(SegmentSymbol::Pointer) => {
                write!(self.output_file, "@THIS\nD=A\n@{index}\nA=D+A\nD=M\n")?;
                self.write_push_d()
            }
            Some(SegmentSymbol::Static) => {
                write!(self.output_file, "@{}.{index}\nD=M\n", self.filename)?;
                self.write_push_d()
            }
            None => Err(VmError::syntax(format!("unknown segment '{segment}'"))),
        }
    }

    #[inline]
    fn write_pop(&mut self, segment: &str, index: i32) -> Result<(), VmError> {
        match SegmentSymbol::from_str(segment) {
            Some(
                seg @ (SegmentSymbol::Local
                | SegmentSymbol::Argument
                | SegmentSymbol::This
                | SegmentSymbol::That),
            ) => {
                write!(
                    self.output_file,
                    "@{}\n\
                     D=M\n\
                     @{index}\n\
                     D=D+A\n\
                     @R13\n\
                     M=D\n",
                    seg.symbol()
                )?;

                self.write_pop_to_d()?;

                write_asm!(self.output_file,
                    "// store the top value"
                    "@R13"
                    "A=M"
                    "M=D"
                )?;
                Ok(())
            }
            Some(SegmentSymbol::Temp) => {
                write!(
                    self.output_file,
                    "@5\n\
                     D=A\n\
                     @{index}\n\
                     D=D+A\n\
                     @R13\n\
                     M=D\n"
                )?;

                self.write_pop_to_d()?;

                write_asm!(self.output_file,
                    "// store the top value"
                    "@R13"
                    "A=M"
                    "M=D"
                )?;
                Ok(())
            }
            Some(SegmentSymbol::Pointer) => {
                write!(
                    self.output_file,
                    "@THIS\n\
                     D=A\n\
                     @{index}\n\
                     D=D+A\n\
                     @R13\n\
                     M=D\n"
                )?;

                self.write_pop_to_d()?;

                write_asm!(self.output_file,
                    "// store the top value"
                    "@R13"
                    "A=M"
                    "M=D"
                )?;
                Ok(())
            }
            Some(SegmentSymbol::Static) => {
                self.write_pop_to_d()?;
                write!(self.output_file, "@{}.{index}\nM=D\n", self.filename)?;
                Ok(())
            }
            None => Err(VmError::syntax(format!(
                "cannot pop to unknown segment '{segment}'"
            ))),
        }
    }

    /// `label L`, namespaced by `file_label` (`<file>$L`).
    pub fn write_label(&mut self, label: &str) -> Result<(), VmError> {
        writeln!(self.output_file, "({}${label})", self.filename)?;
        Ok(())
    }

    /// `goto L`, namespaced by `file_label`.
    pub fn write_goto(&mut self, label: &str) -> Result<(), VmError> {
        write_asm!(self.output_file, "@{}${label}\n0;JMP\n", self.filename)?;
        Ok(())
    }

    /// `if-goto L`, namespaced by `file_label`.
    pub fn write_if_goto(&mut self, label: &str) -> Result<(), VmError> {
        self.write_pop_to_d()?;
        write!(self.output_file, "@{}${label}\nD;JNE\n", self.filename)?;
        Ok(())
    }

    /// `function f k`: declares `f` and zero-initializes its `k` locals.
    pub fn write_function(&mut self, name: &str, num_locals: i32) -> Result<(), VmError> {
        writeln!(self.output_file, "({name})")?;
        for _ in 0..num_locals {
            write_asm!(self.output_file,
                "@SP"
                "A=M"
                "M=0"
                "@SP"
                "M=M+1"
            )?;
        }
        Ok(())
    }

    /// `call f k`: saves the caller's frame, sets up `ARG`/`LCL` for the
    /// callee, and jumps. The return label is unique per call site via
    /// `call_counts`, keyed by callee name.
    pub fn write_call(&mut self, name: &str, num_args: i32) -> Result<(), VmError> {
        let count = *self.call_counts.get(name).unwrap_or(&0);
        self.call_counts.insert(name.to_string(), count + 1);
        let return_label = format!("{name}$ret.{count}");

        write!(
            self.output_file,
            "// call {name} {num_args}\n\
             @{return_label}\n\
             D=A\n"
        )?;
        self.write_push_d()?;

        for segment in ["LCL", "ARG", "THIS", "THAT"] {
            write!(self.output_file, "@{segment}\nD=M\n")?;
            self.write_push_d()?;
        }

        write!(
            self.output_file,
            "// ARG = SP-k-5\n\
             @SP\n\
             D=M\n\
             @{}\n\
             D=D-A\n\
             @ARG\n\
             M=D\n\
             // LCL = SP\n\
             @SP\n\
             D=M\n\
             @LCL\n\
             M=D\n\
             @{name}\n\
             0;JMP\n\
             ({return_label})\n",
            num_args + 5
        )?;
        Ok(())
    }

    /// `return`: unwinds the callee's frame using `R13` (saved `LCL`) and
    /// `R14` (saved return address) as scratch.
    pub fn write_return(&mut self) -> Result<(), VmError> {
        write_asm!(self.output_file,
            "// return"
            "@LCL"
            "D=M"
            "@R13"
            "M=D"
            "@5"
            "A=D-A"
        )?;
        write_asm!(self.output_file,
            "D=M"
            "@R14"
            "M=D"
        )?;

        self.write_pop_to_d()?;
        write_asm!(self.output_file,
            "@ARG"
            "A=M"
            "M=D"
            "@ARG"
            "D=M+1"
            "@SP"
            "M=D"
        )?;

        for (offset, dest) in [(1, "THAT"), (2, "THIS"), (3, "ARG"), (4, "LCL")] {
            write!(
                self.output_file,
                "@R13\nD=M\n@{offset}\nA=D-A\nD=M\n@{dest}\nM=D\n"
            )?;
        }

        write_asm!(self.output_file,
            "@R14"
            "A=M"
            "0;JMP"
        )?;
        Ok(())
    }

    #[inline]
    fn write_push_d(&mut self) -> Result<(), VmError> {
        write_asm!(self.output_file,
            "// push the value into stack"
            "@SP"
            "A=M"
            "M=D"
            "@SP"
            "M=M+1"
        )?;
        Ok(())
    }

    #[inline]
    fn write_pop_to_d(&mut self) -> Result<(), VmError> {
        write_asm!(self.output_file,
            "// get the top element of stack"
            "@SP"
            "M=M-1"
            "A=M"
            "D=M"
        )?;
        Ok(())
    }

    #[inline]
    pub fn close(&mut self) -> Result<(), VmError> {
        self.output_file.flush()?;
        Ok(())
    }
}
