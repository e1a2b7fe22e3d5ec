use klink_util::process::CommandBuilder;

#[test]
#[cfg(unix)]
fn test_exec_captures_stdout() {
    let output = CommandBuilder::new("echo").arg("hello").exec().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "hello");
}

#[test]
#[cfg(unix)]
fn test_exec_with_env() {
    let output = CommandBuilder::new("sh")
        .arg("-c")
        .arg("echo $KLINK_TEST_VAR")
        .env("KLINK_TEST_VAR", "value")
        .exec()
        .unwrap();
    assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), "value");
}

#[test]
fn test_exec_missing_program_is_error() {
    let result = CommandBuilder::new("definitely-not-a-real-binary-12345").exec();
    assert!(result.is_err());
}

#[test]
#[cfg(unix)]
fn test_exec_checked_fails_on_nonzero_exit() {
    let result = CommandBuilder::new("sh").arg("-c").arg("exit 3").exec_checked();
    assert!(result.is_err());
}

#[test]
#[cfg(unix)]
fn test_exec_checked_passes_on_success() {
    let output = CommandBuilder::new("true").exec_checked().unwrap();
    assert!(output.status.success());
}
