#![cfg(not(target_arch = "wasm32"))]

use std::{
    io::Write,
    process::{Command, Stdio},
};

use engine::{EngineError, Luminance, WorkRequest, WorkResponse};

fn run_worker(input: &[u8]) -> std::process::Output {
    let mut child = Command::new(env!("CARGO_BIN_EXE_task_worker"))
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to start worker");

    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input)
        .expect("failed to send request");

    child.wait_with_output().expect("worker didn't exit")
}

fn exchange(request: &WorkRequest) -> WorkResponse {
    let output = run_worker(&serde_json::to_vec(request).unwrap());
    assert!(output.status.success(), "worker failed: {:?}", output);
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn answers_one_permutation_request() {
    let response = exchange(&WorkRequest::Permutations { size: 3, limit: 10 });
    assert_eq!(response, WorkResponse::Permutations(engine::permutations(3).unwrap()));
}

#[test]
fn answers_one_grayscale_request() {
    let response = exchange(&WorkRequest::Grayscale {
        pixels: vec![30, 60, 90, 200],
        width: 1,
        height: 1,
        luminance: Luminance::Average,
    });
    match response {
        WorkResponse::Grayscale(pixels) => assert_eq!(pixels.as_bytes(), &[60, 60, 60, 200]),
        other => panic!("unexpected response {:?}", other),
    }
}

#[test]
fn reports_invalid_input_as_failed_response() {
    let response = exchange(&WorkRequest::Permutations { size: -1, limit: 10 });
    assert_eq!(response, WorkResponse::Failed(EngineError::NegativeSize(-1)));
}

#[test]
fn malformed_request_exits_with_error() {
    let output = run_worker(b"not a request");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("task_worker"));
}
