mod common;
use common::*;
use serde_json::json;
use shbuild::ConfigStatus;
use shbuild::script::{NOT_FOUND_MSG, SERVER_ERROR_MSG};

#[test]
fn c_defaults_export_announce_and_asserted_script() {
    let out = compile_payload(payload(json!({ "language": "c" })));

    assert_in_order(
        &out,
        &[
            "echo '$ export CC=gcc'\nexport CC=gcc\n",
            "echo '$ gcc --version'\ngcc --version\n",
            "./configure && make && make test",
        ],
    );

    let script = r#"travis_start_00000001=$(date +%s%N)
echo -en "travis_time:start:00000001\r"
echo '$ ./configure && make && make test'
./configure && make && make test
travis_status=$?
travis_end_00000001=$(date +%s%N)
echo -en "travis_time:end:00000001:start=$travis_start_00000001,finish=$travis_end_00000001,duration=$((travis_end_00000001-travis_start_00000001))\r"
if [ $travis_status -ne 0 ]; then
  echo 'The command "./configure && make && make test" exited with '"$travis_status."
  travis_terminate $travis_status
fi
travis_result $?
"#;
    assert!(out.contains(script), "script block missing:\n{}", out);
}

#[test]
fn haskell_ghc_path_and_retried_cabal_update() {
    let out = compile_payload(payload(json!({ "language": "haskell", "ghc": "7.8" })));

    assert!(out.contains(
        "echo '$ export PATH=/usr/local/ghc/$(ghc_find 7.8)/bin/:$PATH'\nexport PATH=/usr/local/ghc/$(ghc_find 7.8)/bin/:$PATH\n"
    ));

    let update = r#"travis_start_00000001=$(date +%s%N)
echo -en "travis_time:start:00000001\r"
echo '$ cabal update'
travis_status=0
for travis_attempt in 1 2 3; do
  cabal update
  travis_status=$?
  [ $travis_status -eq 0 ] && break
  if [ $travis_attempt -lt 3 ]; then
    echo 'The command "cabal update" failed. Retrying, '"$travis_attempt of 3."
    sleep 1
  fi
done
travis_end_00000001=$(date +%s%N)
"#;
    assert!(out.contains(update), "cabal update block missing:\n{}", out);
    assert_in_order(
        &out,
        &[
            "cabal update",
            "if [ $travis_status -ne 0 ]; then\n  echo 'The command \"cabal update\" exited with '",
            "cabal install --only-dependencies --enable-tests",
            "cabal configure --enable-tests && cabal build && cabal test",
        ],
    );
}

#[test]
fn haskell_numeric_ghc_matches_string() {
    let from_number = compile_payload(payload(json!({ "language": "haskell", "ghc": 7.8 })));
    let from_string = compile_payload(payload(json!({ "language": "haskell", "ghc": "7.8" })));
    assert_eq!(from_number, from_string);
}

#[test]
fn not_found_warns_and_still_runs_every_stage() {
    let mut p = payload(json!({ "language": "c", ".result": "not_found" }));
    let compiled = build_payload(p.clone());
    assert_eq!(compiled.status, ConfigStatus::NotFound);

    p["config"]["script"] = json!(["make check"]);
    let out = compile_payload(p);
    assert_in_order(
        &out,
        &[
            NOT_FOUND_MSG,
            "git clone --depth=50 --branch=master",
            "export TRAVIS=true",
            "echo '$ gcc --version'",
            "make check",
            "travis_result $?",
        ],
    );
    assert!(!out.contains("travis_terminate 2"));
}

#[test]
fn server_error_terminates_before_any_stage() {
    let out = compile_payload(payload(json!({ "language": "c", ".result": "server_error" })));

    let terminate = out.find("travis_terminate 2\n").expect("terminate missing");
    let message = out.find(SERVER_ERROR_MSG).expect("message missing");
    assert!(message < terminate);

    for stage_output in ["git clone", "export TRAVIS=true", "CC=gcc", "gcc --version", "make test"] {
        assert!(!out.contains(stage_output), "`{}` rendered after server error", stage_output);
    }
    // The finish phase does not run either.
    assert!(out.contains("  travis_finished=1\n}\n"));
}

#[test]
fn server_error_has_empty_body() {
    let compiled = build_payload(payload(json!({ ".result": "server_error" })));
    assert_eq!(compiled.status, ConfigStatus::ServerError);
    assert_eq!(compiled.body.len(), 2);
    assert!(compiled.finish.is_empty());
}

#[test]
fn free_compile_matches_default_compiler() {
    let p = payload(json!({ "language": "c" }));
    let out = shbuild::compile(&shbuild::PayloadResolver::new(p.clone())).unwrap();
    assert_eq!(out, compile_payload(p));
}
