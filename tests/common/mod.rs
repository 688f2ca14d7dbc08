#![allow(dead_code)]

use serde_json::{Value, json};
use shbuild::script::{Compiled, Compiler};
use shbuild::PayloadResolver;
use std::fs;
use std::process::Command;

/// Minimal job payload: repository, job and the given build config.
pub fn payload(config: Value) -> Value {
    json!({
        "repository": {
            "slug": "travis-ci/example",
            "source_url": "git://github.com/travis-ci/example.git"
        },
        "job": {
            "branch": "master",
            "commit": "313f61b",
            "ref": "refs/pull/118/merge",
            "pull_request": false,
            "secure_env_enabled": true
        },
        "config": config
    })
}

pub fn compile_payload(payload: Value) -> String {
    Compiler::new()
        .compile(&PayloadResolver::new(payload))
        .expect("compile failed")
}

pub fn build_payload(payload: Value) -> Compiled {
    Compiler::new()
        .build(&PayloadResolver::new(payload))
        .expect("build failed")
}

pub fn compile_with(compiler: &Compiler, payload: Value) -> String {
    compiler
        .compile(&PayloadResolver::new(payload))
        .expect("compile failed")
}

pub fn cache_slug_for(config: Value) -> String {
    Compiler::new()
        .cache_slug(&PayloadResolver::new(payload(config)))
        .expect("compile failed")
}

/// Asserts that every needle occurs in `haystack`, in the given order.
pub fn assert_in_order(haystack: &str, needles: &[&str]) {
    let mut from = 0;
    for needle in needles {
        match haystack[from..].find(needle) {
            Some(pos) => from += pos + needle.len(),
            None => panic!(
                "expected `{}` after byte {} in output:\n{}",
                needle, from, haystack
            ),
        }
    }
}

/// Defines the runtime helpers rendered commands call, without the
/// build-dir setup of the real header.
pub const TEST_PRELUDE: &str = "travis_terminate() {\n  exit $1\n}\n";

pub fn run_bash_script(bash: &str, env: &[(&str, &str)], args: &[&str]) -> (String, String, i32) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp dir");

    let script_path = temp_dir.path().join("script.sh");
    fs::write(&script_path, bash).expect("Failed to write temp script");

    let mut cmd = Command::new("bash");
    cmd.current_dir(temp_dir.path());
    for (k, v) in env {
        cmd.env(k, v);
    }
    cmd.arg(&script_path);
    for arg in args {
        cmd.arg(arg);
    }

    let output = cmd.output().expect("Failed to execute bash");

    let stdout = String::from_utf8_lossy(&output.stdout).replace("\r\n", "\n");
    let stderr = String::from_utf8_lossy(&output.stderr).replace("\r\n", "\n");

    (stdout, stderr, output.status.code().unwrap_or(0))
}
