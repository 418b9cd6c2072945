//! AST -> Jack VM code.
//!
//! One `CodeGenerator` per class, writing straight to the caller's sink —
//! the same owned-writer-struct shape `vm_translator::CodeWriter` uses for
//! the next stage down. Label counters and the symbol tables are reset per
//! subroutine; method-vs-function call dispatch is resolved by symbol-table
//! lookup (object variable) or same-class subroutine-kind lookup
//! (unqualified call), never guessed from spelling.

use std::collections::HashMap;
use std::io::Write;

use crate::ast::{Node, Tag, TermKind};
use crate::error::JackError;
use crate::symbol_table::{Kind, SymbolTable};

pub struct CodeGenerator<W: Write> {
    out: W,
    class_name: String,
    symbols: SymbolTable,
    subroutine_name: String,
    subroutine_kinds: HashMap<String, String>,
    label_counts: HashMap<String, u32>,
}

fn segment_name(kind: Kind) -> &'static str {
    match kind {
        Kind::Static => "static",
        Kind::Field => "this",
        Kind::Argument => "argument",
        Kind::Local => "local",
    }
}

impl<W: Write> CodeGenerator<W> {
    #[must_use]
    pub fn new(out: W) -> Self {
        Self {
            out,
            class_name: String::new(),
            symbols: SymbolTable::new(),
            subroutine_name: String::new(),
            subroutine_kinds: HashMap::new(),
            label_counts: HashMap::new(),
        }
    }

    fn emit(&mut self, line: &str) -> Result<(), JackError> {
        writeln!(self.out, "{line}")?;
        Ok(())
    }

    fn new_label(&mut self, kind: &str) -> String {
        let counter = self.label_counts.entry(kind.to_string()).or_insert(0);
        let label = format!("{}.{}.{}.{}", self.class_name, self.subroutine_name, kind, counter);
        *counter += 1;
        label
    }

    pub fn compile_class(&mut self, class: &Node) -> Result<(), JackError> {
        self.class_name = class.class_name().to_string();

        for var_dec in class.class_var_decs() {
            let kind = match var_dec.var_kind() {
                "static" => Kind::Static,
                "field" => Kind::Field,
                other => return Err(JackError::symbol(format!("unknown class var kind '{other}'"))),
            };
            let ty = var_dec.var_type().to_string();
            for name in var_dec.var_names() {
                self.symbols.define(name, &ty, kind);
            }
        }

        for sub in class.subroutine_decs() {
            self.subroutine_kinds
                .insert(sub.subroutine_name().to_string(), sub.subroutine_kind().to_string());
        }

        for sub in class.subroutine_decs() {
            self.compile_subroutine(sub)?;
        }
        Ok(())
    }

    fn compile_subroutine(&mut self, sub: &Node) -> Result<(), JackError> {
        self.symbols.start_subroutine();
        self.subroutine_name = sub.subroutine_name().to_string();
        self.label_counts.clear();

        let kind = sub.subroutine_kind().to_string();
        if kind == "method" {
            self.symbols.define("this", &self.class_name.clone(), Kind::Argument);
        }
        for (ty, name) in sub.subroutine_parameters().parameters() {
            self.symbols.define(name, ty, Kind::Argument);
        }

        let body = sub.subroutine_body();
        for var_dec in body.body_var_decs() {
            let ty = var_dec.var_type().to_string();
            for name in var_dec.var_names() {
                self.symbols.define(name, &ty, Kind::Local);
            }
        }

        let n_locals = self.symbols.var_count(Kind::Local);
        self.emit(&format!(
            "function {}.{} {n_locals}",
            self.class_name, self.subroutine_name
        ))?;

        match kind.as_str() {
            "constructor" => {
                let n_fields = self.symbols.var_count(Kind::Field);
                self.emit(&format!("push constant {n_fields}"))?;
                self.emit("call Memory.alloc 1")?;
                self.emit("pop pointer 0")?;
            }
            "method" => {
                self.emit("push argument 0")?;
                self.emit("pop pointer 0")?;
            }
            _ => {}
        }

        self.compile_statements(body.body_statements())
    }

    fn compile_statements(&mut self, statements: &Node) -> Result<(), JackError> {
        for statement in statements.statement_list() {
            match statement.tag() {
                Some(Tag::LetStatement) => self.compile_let(statement)?,
                Some(Tag::IfStatement) => self.compile_if(statement)?,
                Some(Tag::WhileStatement) => self.compile_while(statement)?,
                Some(Tag::DoStatement) => self.compile_do(statement)?,
                Some(Tag::ReturnStatement) => self.compile_return(statement)?,
                other => {
                    return Err(JackError::syntax(format!(
                        "unexpected node in statement position: {other:?}"
                    )));
                }
            }
        }
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<(Kind, u16, String), JackError> {
        self.symbols
            .lookup(name)
            .map(|e| (e.kind, e.index, e.type_name.clone()))
            .ok_or_else(|| JackError::symbol(format!("undefined variable '{name}'")))
    }

    fn push_variable(&mut self, name: &str) -> Result<(), JackError> {
        let (kind, index, _) = self.resolve(name)?;
        self.emit(&format!("push {} {index}", segment_name(kind)))
    }

    fn pop_variable(&mut self, name: &str) -> Result<(), JackError> {
        let (kind, index, _) = self.resolve(name)?;
        self.emit(&format!("pop {} {index}", segment_name(kind)))
    }

    fn compile_let(&mut self, stmt: &Node) -> Result<(), JackError> {
        let name = stmt.let_var_name().to_string();
        if let Some(index_expr) = stmt.let_index() {
            self.push_variable(&name)?;
            self.compile_expression(index_expr)?;
            self.emit("add")?;
            self.compile_expression(stmt.let_value())?;
            self.emit("pop temp 0")?;
            self.emit("pop pointer 1")?;
            self.emit("push temp 0")?;
            self.emit("pop that 0")
        } else {
            self.compile_expression(stmt.let_value())?;
            self.pop_variable(&name)
        }
    }

    fn compile_if(&mut self, stmt: &Node) -> Result<(), JackError> {
        self.compile_expression(stmt.condition())?;
        self.emit("not")?;
        let else_label = self.new_label("IF");
        self.emit(&format!("if-goto {else_label}"))?;
        self.compile_statements(stmt.then_statements())?;
        if let Some(else_stmts) = stmt.else_statements() {
            let end_label = self.new_label("IF");
            self.emit(&format!("goto {end_label}"))?;
            self.emit(&format!("label {else_label}"))?;
            self.compile_statements(else_stmts)?;
            self.emit(&format!("label {end_label}"))
        } else {
            self.emit(&format!("label {else_label}"))
        }
    }

    fn compile_while(&mut self, stmt: &Node) -> Result<(), JackError> {
        let top_label = self.new_label("WHILE");
        let end_label = self.new_label("WHILE");
        self.emit(&format!("label {top_label}"))?;
        self.compile_expression(stmt.condition())?;
        self.emit("not")?;
        self.emit(&format!("if-goto {end_label}"))?;
        self.compile_statements(stmt.then_statements())?;
        self.emit(&format!("goto {top_label}"))?;
        self.emit(&format!("label {end_label}"))
    }

    fn compile_do(&mut self, stmt: &Node) -> Result<(), JackError> {
        self.compile_call(stmt.do_call_qualifier(), stmt.do_call_name(), stmt.do_call_args())?;
        self.emit("pop temp 0")
    }

    fn compile_return(&mut self, stmt: &Node) -> Result<(), JackError> {
        match stmt.return_value() {
            Some(expr) => self.compile_expression(expr)?,
            None => self.emit("push constant 0")?,
        }
        self.emit("return")
    }

    fn compile_call(&mut self, qualifier: Option<&str>, name: &str, args: &Node) -> Result<(), JackError> {
        let arg_exprs = args.expressions();
        let (callee, implicit_arg) = match qualifier {
            None => {
                let is_method = self
                    .subroutine_kinds
                    .get(name)
                    .is_some_and(|k| k == "method");
                if is_method {
                    self.emit("push pointer 0")?;
                }
                (format!("{}.{name}", self.class_name), usize::from(is_method))
            }
            Some(qualifier) => {
                if let Some(entry) = self.symbols.lookup(qualifier) {
                    let type_name = entry.type_name.clone();
                    self.push_variable(qualifier)?;
                    (format!("{type_name}.{name}"), 1)
                } else {
                    (format!("{qualifier}.{name}"), 0)
                }
            }
        };

        for expr in &arg_exprs {
            self.compile_expression(expr)?;
        }
        let n_args = implicit_arg + arg_exprs.len();
        self.emit(&format!("call {callee} {n_args}"))
    }

    fn compile_expression(&mut self, expr: &Node) -> Result<(), JackError> {
        let terms = expr.expression_terms();
        self.compile_term(&terms[0])?;
        let mut ops = Vec::new();
        let mut i = 1;
        while i < terms.len() {
            let op = match terms[i].as_token() {
                Some(crate::token::Token::Symbol(c)) => *c,
                other => {
                    return Err(JackError::syntax(format!(
                        "expected an operator in expression, found {other:?}"
                    )));
                }
            };
            self.compile_term(&terms[i + 1])?;
            ops.push(op);
            i += 2;
        }
        while let Some(op) = ops.pop() {
            self.emit_binary_op(op)?;
        }
        Ok(())
    }

    fn emit_binary_op(&mut self, op: char) -> Result<(), JackError> {
        match op {
            '+' => self.emit("add"),
            '-' => self.emit("sub"),
            '*' => self.emit("call Math.multiply 2"),
            '/' => self.emit("call Math.divide 2"),
            '&' => self.emit("and"),
            '|' => self.emit("or"),
            '<' => self.emit("lt"),
            '>' => self.emit("gt"),
            '=' => self.emit("eq"),
            other => Err(JackError::syntax(format!("unknown binary operator '{other}'"))),
        }
    }

    fn compile_string_const(&mut self, s: &str) -> Result<(), JackError> {
        self.emit(&format!("push constant {}", s.chars().count()))?;
        self.emit("call String.new 1")?;
        for ch in s.chars() {
            self.emit(&format!("push constant {}", ch as u32))?;
            self.emit("call String.appendChar 2")?;
        }
        Ok(())
    }

    fn compile_term(&mut self, term: &Node) -> Result<(), JackError> {
        match term.term_kind() {
            TermKind::IntConst => self.emit(&format!("push constant {}", term.term_int_const())),
            TermKind::StringConst => {
                let s = term.term_string_const().to_string();
                self.compile_string_const(&s)
            }
            TermKind::KeywordConst => match term.term_keyword_const() {
                "true" => {
                    self.emit("push constant 0")?;
                    self.emit("not")
                }
                "false" | "null" => self.emit("push constant 0"),
                "this" => self.emit("push pointer 0"),
                other => Err(JackError::syntax(format!("unknown keyword constant '{other}'"))),
            },
            TermKind::Var => {
                let name = term.term_var_name().to_string();
                self.push_variable(&name)
            }
            TermKind::IndexedVar => {
                let name = term.term_var_name().to_string();
                self.push_variable(&name)?;
                self.compile_expression(term.term_index())?;
                self.emit("add")?;
                self.emit("pop pointer 1")?;
                self.emit("push that 0")
            }
            TermKind::Parenthesized => self.compile_expression(term.term_parenthesized()),
            TermKind::Unary => {
                self.compile_term(term.term_unary_operand())?;
                match term.term_unary_op() {
                    '-' => self.emit("neg"),
                    '~' => self.emit("not"),
                    other => Err(JackError::syntax(format!("unknown unary operator '{other}'"))),
                }
            }
            TermKind::UnqualifiedCall => {
                let name = term.term_call_name().to_string();
                self.compile_call(None, &name, term.term_call_args())
            }
            TermKind::QualifiedCall => {
                let qualifier = term.term_call_qualifier().map(str::to_string);
                let name = term.term_call_name().to_string();
                self.compile_call(qualifier.as_deref(), &name, term.term_call_args())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use crate::tokenizer::tokenize;

    fn compile(src: &str) -> String {
        let class = Parser::new(tokenize(src).unwrap()).parse().unwrap();
        let mut out = Vec::new();
        CodeGenerator::new(&mut out).compile_class(&class).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn constructor_allocates_and_returns_this() {
        let vm = compile(
            "class Point {\n\
             field int x, y;\n\
             constructor Point new() {\n\
               return this;\n\
             }\n\
             }\n",
        );
        assert!(vm.contains("function Point.new 0\n"));
        assert!(vm.contains("push constant 2\n"));
        assert!(vm.contains("call Memory.alloc 1\n"));
        assert!(vm.contains("pop pointer 0\n"));
        assert!(vm.contains("push pointer 0\n"));
        assert!(vm.contains("return\n"));
    }

    #[test]
    fn method_call_pushes_receiver_then_args() {
        let vm = compile(
            "class Main {\n\
             function void run() {\n\
               var Foo f;\n\
               do f.bar(7);\n\
               return;\n\
             }\n\
             }\n",
        );
        assert!(vm.contains("push local 0\n"));
        assert!(vm.contains("push constant 7\n"));
        assert!(vm.contains("call Foo.bar 2\n"));
        assert!(vm.contains("pop temp 0\n"));
    }

    #[test]
    fn unqualified_method_call_pushes_implicit_this() {
        let vm = compile(
            "class Main {\n\
             method void helper() {\n\
               return;\n\
             }\n\
             method void run() {\n\
               do helper();\n\
               return;\n\
             }\n\
             }\n",
        );
        assert!(vm.contains("call Main.helper 1\n"));
    }

    #[test]
    fn while_and_if_labels_are_namespaced_per_subroutine() {
        let vm = compile(
            "class Main {\n\
             function void run() {\n\
               while (true) {\n\
                 if (true) {\n\
                 }\n\
               }\n\
               return;\n\
             }\n\
             }\n",
        );
        assert!(vm.contains("Main.run.WHILE.0"));
        assert!(vm.contains("Main.run.IF.0"));
    }

    #[test]
    fn array_assignment_uses_temp_and_pointer_dance() {
        let vm = compile(
            "class Main {\n\
             function void run() {\n\
               var Array a;\n\
               let a[0] = 5;\n\
               return;\n\
             }\n\
             }\n",
        );
        assert!(vm.contains("pop temp 0\n"));
        assert!(vm.contains("pop pointer 1\n"));
        assert!(vm.contains("pop that 0\n"));
    }

    #[test]
    fn user_class_typed_field_does_not_shift_following_indices() {
        let vm = compile(
            "class Main {\n\
             field Array data;\n\
             field int count;\n\
             function void run() {\n\
               return;\n\
             }\n\
             constructor Main new() {\n\
               let count = 0;\n\
               return this;\n\
             }\n\
             }\n",
        );
        assert!(vm.contains("push constant 2\n"));
        assert!(vm.contains("pop this 1\n"));
    }

    #[test]
    fn operators_are_reduced_right_to_left_via_lifo_pop() {
        let vm = compile(
            "class Main {\n\
             function int run() {\n\
               return 1 + 2 * 3;\n\
             }\n\
             }\n",
        );
        let lines: Vec<&str> = vm.lines().collect();
        let mul_at = lines.iter().position(|l| *l == "call Math.multiply 2").unwrap();
        let add_at = lines.iter().position(|l| *l == "add").unwrap();
        assert!(mul_at < add_at, "2*3 must be evaluated before the outer add: {vm}");
    }

    #[test]
    fn referencing_an_undefined_variable_is_a_symbol_error() {
        let class = Parser::new(
            tokenize("class Main {\nfunction void run() {\nlet x = 1;\nreturn;\n}\n}\n").unwrap(),
        )
        .parse()
        .unwrap();
        let mut out = Vec::new();
        let err = CodeGenerator::new(&mut out).compile_class(&class).unwrap_err();
        assert_eq!(err.kind, crate::error::ErrorKind::SymbolError);
    }
}
