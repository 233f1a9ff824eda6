// msvc-fix: MSVC toolchain environment patcher
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::builder::ProcessBuilder;
use crate::core::env::container::Env;
use crate::error::ProcessError;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

#[cfg(not(windows))]
fn sh(script: &str) -> ProcessBuilder {
    ProcessBuilder::new("sh").args(["-c", script])
}

#[tokio::test]
#[cfg(not(windows))]
async fn test_process_echo() {
    let output = sh("echo hello")
        .capture_stdout()
        .run()
        .await
        .expect("echo should succeed");

    assert!(output.success());
    insta::assert_snapshot!(output.stdout(), @"hello");
}

#[tokio::test]
#[cfg(not(windows))]
async fn test_process_exit_code_is_typed_error() {
    let err = sh("echo oops >&2; exit 3")
        .name("failing")
        .run()
        .await
        .unwrap_err();

    let process_err = err
        .downcast_ref::<ProcessError>()
        .expect("non-zero exit should be a ProcessError");
    insta::assert_snapshot!(process_err.to_string(), @"process 'failing' exited with code 3");
}

#[tokio::test]
#[cfg(not(windows))]
async fn test_process_env_replaces_inherited() {
    let mut env = Env::new();
    env.set("MSVC_FIX_PROBE", "from-env");

    let output = ProcessBuilder::new("/bin/sh")
        .args(["-c", "echo \"$MSVC_FIX_PROBE:${HOME:-unset}\""])
        .env(env)
        .capture_stdout()
        .run()
        .await
        .unwrap();

    assert_eq!(output.stdout(), "from-env:unset");
}

#[tokio::test]
#[cfg(not(windows))]
async fn test_process_captures_many_lines() {
    // more lines than any internal buffer; must not deadlock
    let output = sh("i=0; while [ $i -lt 500 ]; do echo K$i=V$i; i=$((i+1)); done")
        .capture_stdout()
        .run()
        .await
        .unwrap();

    let lines: Vec<_> = output.stdout().lines().collect();
    assert_eq!(lines.len(), 500);
    assert_eq!(lines[499], "K499=V499");
}

#[tokio::test]
#[cfg(not(windows))]
async fn test_process_captures_utf8_output() {
    let output = sh(r"printf 'USERPROFILE=C:\\Users\\Zo\303\253\r\n'")
        .capture_stdout()
        .run()
        .await
        .unwrap();

    assert_eq!(output.stdout(), r"USERPROFILE=C:\Users\Zoë");
}

#[tokio::test]
#[cfg(not(windows))]
async fn test_process_timeout_kills() {
    let result = sh("sleep 5")
        .timeout(Some(Duration::from_millis(100)))
        .run()
        .await;

    let message = result.unwrap_err().to_string();
    assert!(message.contains("timed out"), "unexpected error: {message}");
}

#[tokio::test]
async fn test_process_cancelled_before_start() {
    let token = CancellationToken::new();
    token.cancel();

    let output = ProcessBuilder::new("definitely-not-a-real-program")
        .run_with_cancellation(token)
        .await
        .unwrap();

    assert!(output.is_interrupted());
}

#[tokio::test]
#[cfg(not(windows))]
async fn test_process_cancelled_while_running() {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let output = sh("sleep 5").run_with_cancellation(token).await.unwrap();

    assert!(output.is_interrupted());
}

#[test]
fn test_command_line_quotes_spaces() {
    let builder = ProcessBuilder::new("scons").args(["platform=windows", "target dir"]);
    assert_eq!(
        builder.command_line(),
        "scons platform=windows \"target dir\""
    );
}
