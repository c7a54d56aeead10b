use std::process::Command;

#[test]
fn run_prints_each_non_nil_result() {
    let output = Command::new(env!("CARGO_BIN_EXE_sigil"))
        .args(["run", "-i", "demos/showcase.lisp"])
        .output()
        .unwrap();

    assert!(output.status.success());
    assert_eq!(
        String::from_utf8(output.stdout).unwrap(),
        "square\n49\n18\n10\n36\n"
    );
}

#[test]
fn run_rejects_broken_source_without_evaluating() {
    let output = Command::new(env!("CARGO_BIN_EXE_sigil"))
        .args(["run", "-i", "demos/broken.lisp"])
        .output()
        .unwrap();

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("unexpected end of input"), "got {stderr:?}");
}

#[test]
fn run_without_input_file_fails() {
    let output = Command::new(env!("CARGO_BIN_EXE_sigil"))
        .arg("run")
        .output()
        .unwrap();
    assert!(!output.status.success());
}
