use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;
use std::io::{Read, Write};
use std::process::{Command, Output, Stdio};
use std::time::{Duration, Instant};

const PROMPT: &str = "=> ";

fn run_shell(input: &str) -> (Output, u32) {
    let mut child = Command::new(env!("CARGO_BIN_EXE_fgsh"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn fgsh");
    let pid = child.id();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(input.as_bytes())
        .unwrap();
    (child.wait_with_output().unwrap(), pid)
}

fn stdout_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr_of(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

#[test]
fn child_output_comes_before_next_prompt() {
    let (output, _) = run_shell("echo hello\nexit\n");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_of(&output), "=> hello\n=> ");
}

#[test]
fn end_of_input_exits_cleanly() {
    let (output, _) = run_shell("\n\n");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_of(&output), "=> => => ");
}

#[test]
fn exit_ignores_trailing_whitespace() {
    let (output, _) = run_shell("exit \t \nmyinfo\n");
    assert_eq!(output.status.code(), Some(0));
    assert_eq!(stdout_of(&output), PROMPT);
}

#[test]
fn myinfo_prints_own_and_parent_pid() {
    let (output, pid) = run_shell("myinfo\nexit\n");
    let expected = format!(
        "=> The PID: {pid}\nThe PPID: {}\n=> ",
        std::process::id()
    );
    assert_eq!(stdout_of(&output), expected);
}

#[test]
fn cd_changes_where_children_run() {
    let (output, _) = run_shell("cd /\npwd\nexit\n");
    assert_eq!(stdout_of(&output), "=> => /\n=> ");
}

#[test]
fn cd_without_argument_goes_to_home() {
    let home = std::env::temp_dir().join(format!("fgsh_home_{}", std::process::id()));
    std::fs::create_dir_all(&home).unwrap();
    let home = std::fs::canonicalize(&home).unwrap();

    let mut child = Command::new(env!("CARGO_BIN_EXE_fgsh"))
        .env("HOME", &home)
        .current_dir("/")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"cd\npwd\nexit\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    let _ = std::fs::remove_dir_all(&home);

    assert_eq!(output.status.code(), Some(0));
    assert!(stderr_of(&output).is_empty(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), format!("=> => {}\n=> ", home.display()));
}

#[test]
fn line_of_exactly_the_limit_is_accepted() {
    let line = format!("echo {}", "x".repeat(1024 - 5));
    let (output, _) = run_shell(&format!("{line}\nexit\n"));
    assert!(stderr_of(&output).is_empty(), "stderr: {}", stderr_of(&output));
    assert_eq!(stdout_of(&output), format!("=> {}\n=> ", "x".repeat(1019)));
}

#[test]
fn cd_failure_is_reported_and_loop_continues() {
    let (output, _) = run_shell("cd /nonexistent/fgsh-it\npwd\nexit\n");
    assert_eq!(output.status.code(), Some(0));
    assert!(stderr_of(&output).contains("fgsh: cd: /nonexistent/fgsh-it"));
    let cwd = std::env::current_dir().unwrap();
    assert_eq!(stdout_of(&output), format!("=> => {}\n=> ", cwd.display()));
}

#[test]
fn missing_program_is_reported_by_child() {
    let (output, _) = run_shell("no-such-program-fgsh\necho still here\n");
    assert_eq!(output.status.code(), Some(0));
    assert!(stderr_of(&output).contains("fgsh: no-such-program-fgsh: "));
    assert_eq!(stdout_of(&output), "=> => still here\n=> ");
}

#[test]
fn over_limit_input_reprompts() {
    let input = format!("echo {}\necho ok\n", "a ".repeat(150));
    let (output, _) = run_shell(&input);
    assert_eq!(output.status.code(), Some(0));
    assert!(stderr_of(&output).contains("fgsh: input too long: more than 100 tokens"));
    assert_eq!(stdout_of(&output), "=> => ok\n=> ");
}

#[test]
fn limits_are_configurable() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_fgsh"))
        .args(["--max-tokens", "2", "--prompt", "$ "])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"echo a b\necho a\n")
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(stderr_of(&output).contains("more than 2 tokens"));
    assert_eq!(stdout_of(&output), "$ $ a\n$ ");
}

#[test]
fn zero_limit_is_rejected_at_startup() {
    let output = Command::new(env!("CARGO_BIN_EXE_fgsh"))
        .args(["--max-line", "0"])
        .stdin(Stdio::null())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(stderr_of(&output).contains("--max-line must be greater than zero"));
}

#[test]
fn interrupt_kills_foreground_child_not_shell() {
    let mut child = Command::new(env!("CARGO_BIN_EXE_fgsh"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .unwrap();
    let shell = Pid::from_raw(child.id() as i32);
    child
        .stdin
        .take()
        .unwrap()
        .write_all(b"sleep 30\nexit\n")
        .unwrap();

    // The first prompt is printed after the SIGINT handler is in place.
    let mut stdout = child.stdout.take().unwrap();
    let mut prompt = [0u8; 3];
    stdout.read_exact(&mut prompt).unwrap();
    assert_eq!(&prompt, PROMPT.as_bytes());

    let started = Instant::now();
    let status = loop {
        if let Some(status) = child.try_wait().unwrap() {
            break status;
        }
        assert!(
            started.elapsed() < Duration::from_secs(20),
            "sleep was never interrupted"
        );
        kill(shell, Signal::SIGINT).unwrap();
        std::thread::sleep(Duration::from_millis(100));
    };

    assert_eq!(status.code(), Some(0), "the shell itself must survive SIGINT");
    let mut rest = String::new();
    stdout.read_to_string(&mut rest).unwrap();
    assert!(rest.ends_with(PROMPT), "unexpected output: {rest:?}");
}
