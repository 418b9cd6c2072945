//! End-to-end VM translation tests exercising the public driver functions.

use std::fs;
use std::io::Read;

fn read(path: &str) -> String {
    let mut s = String::new();
    fs::File::open(path).unwrap().read_to_string(&mut s).unwrap();
    s
}

#[test]
fn single_file_translation_has_no_bootstrap() {
    let dir = std::env::temp_dir().join("vm_translator_itest_single");
    fs::create_dir_all(&dir).unwrap();
    let input = dir.join("StackTest.vm");
    fs::write(&input, "push constant 17\npush constant 17\neq\n").unwrap();

    let output = dir.join("StackTest.asm");
    vm_translator::translate_file(input.to_str().unwrap(), output.to_str().unwrap()).unwrap();

    let asm = read(output.to_str().unwrap());
    assert!(!asm.contains("// bootstrap"));
    assert!(asm.contains("(StackTest$EQ.0)"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn directory_mode_wires_call_and_return_across_files() {
    let dir = std::env::temp_dir().join("vm_translator_itest_dir");
    fs::create_dir_all(&dir).unwrap();

    fs::write(
        dir.join("Sys.vm"),
        "function Sys.init 0\n\
         call Main.main 0\n\
         pop temp 0\n\
         label WHILE\n\
         goto WHILE\n",
    )
    .unwrap();
    fs::write(
        dir.join("Main.vm"),
        "function Main.main 0\n\
         push constant 42\n\
         return\n",
    )
    .unwrap();

    let output_path = vm_translator::translate_directory(dir.to_str().unwrap()).unwrap();
    let asm = read(&output_path);

    assert!(asm.starts_with("// bootstrap"));
    assert!(asm.contains("(Sys.init)"));
    assert!(asm.contains("(Main.main)"));
    assert!(asm.contains("(Main.main$ret.0)"));
    assert!(asm.contains("(Sys$WHILE)"));
    assert!(asm.contains("@Sys$WHILE"));

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn directory_mode_without_sys_vm_is_rejected() {
    let dir = std::env::temp_dir().join("vm_translator_itest_no_sys");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("Foo.vm"), "push constant 1\n").unwrap();

    let err = vm_translator::translate_directory(dir.to_str().unwrap()).unwrap_err();
    assert_eq!(err.kind, vm_translator::ErrorKind::InvalidInput);

    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn repeated_calls_to_same_function_get_distinct_return_labels() {
    let dir = std::env::temp_dir().join("vm_translator_itest_repeat_call");
    fs::create_dir_all(&dir).unwrap();
    fs::write(
        dir.join("Sys.vm"),
        "function Sys.init 0\n\
         call Math.double 1\n\
         call Math.double 1\n\
         return\n",
    )
    .unwrap();

    let output_path = vm_translator::translate_directory(dir.to_str().unwrap()).unwrap();
    let asm = read(&output_path);
    assert!(asm.contains("(Math.double$ret.0)"));
    assert!(asm.contains("(Math.double$ret.1)"));

    let _ = fs::remove_dir_all(&dir);
}
