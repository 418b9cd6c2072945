//! End-to-end Jack-source-to-VM-code tests exercising the public driver functions.

use std::fs;

fn compile(source: &str) -> String {
    let dir = std::env::temp_dir().join(format!(
        "jack_compiler_itest_{}",
        source.len() // cheap per-test uniqueness without Math.random/Date.now
    ));
    fs::create_dir_all(&dir).unwrap();
    let input = dir.join("Test.jack");
    fs::write(&input, source).unwrap();
    let output = dir.join("Test.vm");

    jack_compiler::compile_file(input.to_str().unwrap(), output.to_str().unwrap()).unwrap();
    let vm = fs::read_to_string(&output).unwrap();
    let _ = fs::remove_dir_all(&dir);
    vm
}

#[test]
fn constructor_allocates_fields_and_returns_this() {
    let vm = compile(
        "class Point {\n\
         field int x, y;\n\
         constructor Point new(int ax, int ay) {\n\
           let x = ax;\n\
           let y = ay;\n\
           return this;\n\
         }\n\
         }\n",
    );
    assert!(vm.contains("function Point.new 0\n"));
    assert!(vm.contains("push constant 2\n"));
    assert!(vm.contains("call Memory.alloc 1\n"));
    assert!(vm.contains("pop pointer 0\n"));
    assert!(vm.contains("push argument 0\n"));
    assert!(vm.contains("pop this 0\n"));
    assert!(vm.contains("push argument 1\n"));
    assert!(vm.contains("pop this 1\n"));
}

#[test]
fn method_dispatch_pushes_receiver_before_arguments() {
    let vm = compile(
        "class Main {\n\
         function void run() {\n\
           var Foo f;\n\
           let f = Foo.make();\n\
           do f.bar(7);\n\
           return;\n\
         }\n\
         }\n",
    );
    assert!(vm.contains("call Foo.make 0"));
    assert!(vm.contains("push local 0\n"));
    assert!(vm.contains("push constant 7\n"));
    assert!(vm.contains("call Foo.bar 2\n"));
    assert!(vm.contains("pop temp 0\n"));
}

#[test]
fn string_constants_lower_to_new_and_append_char_calls() {
    let vm = compile(
        "class Main {\n\
         function void run() {\n\
           do Output.printString(\"hi\");\n\
           return;\n\
         }\n\
         }\n",
    );
    assert!(vm.contains("push constant 2\n"));
    assert!(vm.contains("call String.new 1\n"));
    assert!(vm.contains(&format!("push constant {}\n", 'h' as u32)));
    assert!(vm.contains(&format!("push constant {}\n", 'i' as u32)));
    assert!(vm.contains("call String.appendChar 2\n"));
}

#[test]
fn invalid_jack_extension_is_rejected() {
    let dir = std::env::temp_dir().join("jack_compiler_itest_bad_ext");
    fs::create_dir_all(&dir).unwrap();
    let input = dir.join("Test.txt");
    fs::write(&input, "class Main {\n}\n").unwrap();

    let err = jack_compiler::compile_file(input.to_str().unwrap(), "out.vm").unwrap_err();
    assert_eq!(err.kind, jack_compiler::ErrorKind::InvalidInput);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn directory_mode_requires_main_jack() {
    let dir = std::env::temp_dir().join("jack_compiler_itest_no_main");
    fs::create_dir_all(&dir).unwrap();
    fs::write(&dir.join("Util.jack"), "class Util {\n}\n").unwrap();

    let err = jack_compiler::compile_directory(dir.to_str().unwrap()).unwrap_err();
    assert_eq!(err.kind, jack_compiler::ErrorKind::InvalidInput);

    let _ = fs::remove_dir_all(&dir);
}
