//! Generated C++ must behave exactly like the interpreter.
//!
//! Needs `g++` on `PATH`; without it every case is skipped.

use len_core::{Platform, Preset, Target};
use len_ir::{Compiler, CompilerConfig, Program};
use len_runtime::{ExecutionContext, Machine, RuntimeConfig};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

struct Case {
    name: &'static str,
    slots: Vec<i32>,
    input: &'static [u8],
}

fn cases() -> Vec<Case> {
    vec![
        Case { name: "push_print", slots: vec![25, 5, 15], input: b"" },
        Case { name: "push_add_print", slots: vec![25, 2, 25, 3, 10, 15], input: b"" },
        Case { name: "empty", slots: vec![], input: b"" },
        Case { name: "unknown_noop", slots: vec![99, 25, 4, 99, 0, 12, 15, 15], input: b"" },
        Case {
            name: "arithmetic",
            slots: vec![25, 7, 25, 3, 11, 15, 25, 0, 25, 7, 11, 25, 2, 21, 15, 25, 6, 25, 7, 20, 15],
            input: b"",
        },
        Case { name: "countdown", slots: vec![25, 3, 12, 15, 25, 1, 11, 12, 13, 14, 2], input: b"" },
        Case { name: "skip_two_slot", slots: vec![25, 1, 25, 0, 13, 25, 7, 25, 9, 15, 15], input: b"" },
        Case { name: "chars", slots: vec![25, 72, 16, 25, 105, 16, 25, 10, 16], input: b"" },
        Case { name: "read_echo", slots: vec![9, 12, 16, 15, 9, 15], input: b"  Abc\nz" },
        Case { name: "read_eof", slots: vec![9, 15], input: b"" },
        Case { name: "fallbacks", slots: vec![15, 12, 15, 25, 9, 25, 0, 21, 15, 25], input: b"" },
        Case { name: "overflow", slots: vec![25, 2147483647, 25, 1, 10, 15], input: b"" },
    ]
}

fn gxx_available() -> bool {
    Command::new("g++")
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn interpret(program: &Program, input: &[u8], target: &Target) -> Vec<u8> {
    let mut input = input;
    let mut output = Vec::new();
    let mut ctx = ExecutionContext::new(&mut input, &mut output, target.input_mode());
    Machine::new(RuntimeConfig::with_max_steps(100_000))
        .run(program, &mut ctx)
        .unwrap();
    if target.trailing_newline() {
        ctx.write_newline().unwrap();
    }
    output
}

fn compile_and_run(dir: &Path, name: &str, source: &str, input: &[u8]) -> Vec<u8> {
    let source_path = dir.join(format!("{}.cpp", name));
    let binary_path = dir.join(name);
    fs::write(&source_path, source).unwrap();

    let build = Command::new("g++")
        .arg("-o")
        .arg(&binary_path)
        .arg(&source_path)
        .output()
        .unwrap();
    assert!(
        build.status.success(),
        "g++ rejected {}: {}\n{}",
        name,
        String::from_utf8_lossy(&build.stderr),
        source
    );

    let mut child = Command::new(&binary_path)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(input).unwrap();
    let run = child.wait_with_output().unwrap();
    assert!(run.status.success(), "{} exited with {}", name, run.status);
    run.stdout
}

#[test]
fn test_generated_code_matches_interpreter() {
    if cfg!(windows) || !gxx_available() {
        eprintln!("g++ not available, skipping codegen equivalence");
        return;
    }

    let dir: PathBuf = std::env::temp_dir().join(format!("lenc-equivalence-{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).unwrap();

    let target = Target::new(Some(Preset::Gxx), Platform::Unix);
    let compiler = Compiler::new(CompilerConfig { target });

    for case in cases() {
        let program = Program::from_slots(case.slots.clone());
        let source = compiler.generate(&program, &program.instruction_set());

        let expected = interpret(&program, case.input, &target);
        let actual = compile_and_run(&dir, case.name, &source, case.input);
        assert_eq!(
            String::from_utf8_lossy(&actual),
            String::from_utf8_lossy(&expected),
            "output mismatch for {}",
            case.name
        );
    }

    fs::remove_dir_all(&dir).unwrap();
}
