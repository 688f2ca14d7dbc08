mod common;
use common::*;
use serde_json::json;
use shbuild::error::Result;
use shbuild::langs::{ProfileEntry, Registry};
use shbuild::builder::ShellBuilder;
use shbuild::config::Data;
use shbuild::shared::{Capabilities, GitCheckout};
use shbuild::stages::StageKind;
use shbuild::template::{TemplateRenderer, TemplateVars};
use shbuild::{Compiler, PayloadResolver, Session, Stage, StageHooks};

struct Recording;

fn mark(cx: &mut Session<'_>, stage: &str) -> Result<()> {
    cx.sh.raw(format!("# stage:{}", stage));
    Ok(())
}

impl StageHooks for Recording {
    fn name(&self) -> &'static str {
        "recording"
    }
    fn configure(&self, cx: &mut Session<'_>) -> Result<()> {
        mark(cx, "configure")
    }
    fn checkout(&self, cx: &mut Session<'_>) -> Result<()> {
        mark(cx, "checkout")
    }
    fn pre_setup(&self, cx: &mut Session<'_>) -> Result<()> {
        mark(cx, "pre_setup")
    }
    fn paranoid_mode(&self, cx: &mut Session<'_>) -> Result<()> {
        mark(cx, "paranoid_mode")
    }
    fn export(&self, cx: &mut Session<'_>) -> Result<()> {
        mark(cx, "export")
    }
    fn setup(&self, cx: &mut Session<'_>) -> Result<()> {
        mark(cx, "setup")
    }
    fn announce(&self, cx: &mut Session<'_>) -> Result<()> {
        mark(cx, "announce")
    }
    fn before_install(&self, cx: &mut Session<'_>) -> Result<()> {
        mark(cx, "before_install")
    }
    fn install(&self, cx: &mut Session<'_>) -> Result<()> {
        mark(cx, "install")
    }
    fn before_script(&self, cx: &mut Session<'_>) -> Result<()> {
        mark(cx, "before_script")
    }
    fn script(&self, cx: &mut Session<'_>) -> Result<()> {
        mark(cx, "script")
    }
    fn after_result(&self, cx: &mut Session<'_>) -> Result<()> {
        mark(cx, "after_result")
    }
    fn after_script(&self, cx: &mut Session<'_>) -> Result<()> {
        mark(cx, "after_script")
    }
    fn finish(&self, cx: &mut Session<'_>) -> Result<()> {
        mark(cx, "finish")
    }
    fn cache_slug(&self, _data: &Data) -> String {
        "cache--recording".to_string()
    }
}

fn recording_compiler() -> Compiler {
    let mut registry = Registry::new();
    registry.register(
        &["recording"],
        ProfileEntry {
            name: "recording",
            defaults: || json!({}),
            build: || -> Box<dyn StageHooks> { Box::new(Recording) },
        },
    );
    Compiler::new().with_registry(registry)
}

#[test]
fn stages_run_once_in_fixed_order() {
    let out = compile_with(&recording_compiler(), payload(json!({ "language": "recording" })));

    let markers: Vec<String> = Stage::all().map(|s| format!("# stage:{}\n", s.name())).collect();
    let needles: Vec<&str> = markers.iter().map(String::as_str).collect();
    assert_in_order(&out, &needles);
    for marker in &markers {
        assert_eq!(out.matches(marker.as_str()).count(), 1, "{} not run exactly once", marker);
    }
    assert_in_order(&out, &["# stage:script\n", "travis_result $?\n", "# stage:after_result\n"]);
}

#[test]
fn builtin_stages_precede_custom_stages() {
    let kinds: Vec<StageKind> = Stage::all().map(Stage::kind).collect();
    assert_eq!(kinds.len(), 13);
    assert!(kinds[..7].iter().all(|k| *k == StageKind::Builtin));
    assert!(kinds[7..].iter().all(|k| *k == StageKind::Custom));
}

struct LocalCheckout;

impl GitCheckout for LocalCheckout {
    fn checkout(&self, sh: &mut ShellBuilder, data: &Data) -> Result<()> {
        let slug = data.slug().unwrap_or_default();
        sh.cmd(format!("cp -r /src/{} .", slug), Default::default());
        Ok(())
    }
}

struct Bare;

impl TemplateRenderer for Bare {
    fn header(&self, vars: &TemplateVars) -> String {
        format!("# header {}", vars.build_dir)
    }
    fn footer(&self, _vars: &TemplateVars) -> String {
        "# footer\n".to_string()
    }
}

#[test]
fn collaborators_and_templates_are_replaceable() {
    let caps = Capabilities {
        git: Box::new(LocalCheckout),
        ..Default::default()
    };
    let compiler = Compiler::new()
        .with_capabilities(caps)
        .with_templates(Box::new(Bare));
    assert_eq!(compiler.options().build_dir, "$HOME/build");

    let out = compile_with(&compiler, payload(json!({ "language": "c" })));
    assert!(out.starts_with("# header $HOME/build\n"));
    assert!(out.ends_with("# footer\n"));
    assert!(out.contains("cp -r /src/travis-ci/example .\n"));
    assert!(!out.contains("git clone"));
}

#[test]
fn finish_phase_renders_into_terminate_helper() {
    let out = compile_with(&recording_compiler(), payload(json!({ "language": "recording" })));
    assert!(out.contains("  travis_finished=1\n  # stage:finish\n}\n"));
    assert!(out.contains("trap travis_finish EXIT\n"));
    assert!(out.starts_with("#!/bin/bash\n"));
    assert!(out.trim_end().ends_with("travis_terminate ${TRAVIS_TEST_RESULT:-0}"));
}

#[test]
fn registry_without_fallback_rejects_unknown_language() {
    let err = recording_compiler()
        .compile(&PayloadResolver::new(payload(json!({ "language": "c" }))))
        .unwrap_err();
    assert_eq!(err.to_string(), "compile error: no profile registered for language `c`");
}

#[test]
fn unknown_language_uses_ruby() {
    let compiled = build_payload(payload(json!({ "language": "brainfuck" })));
    assert_eq!(compiled.language, "ruby");
    assert_eq!(compiled.data.language().as_deref(), Some("brainfuck"));
    let compiled = build_payload(payload(json!({})));
    assert_eq!(compiled.language, "ruby");
}

#[test]
fn builtin_registry_knows_every_profile() {
    let registry = Registry::builtin();
    let languages: Vec<&str> = registry.languages().collect();
    for id in [
        "android", "c", "clojure", "cpp", "erlang", "go", "groovy", "haskell", "java",
        "node_js", "perl", "php", "python", "ruby", "scala",
    ] {
        assert!(languages.contains(&id), "missing profile {}", id);
    }
}

#[test]
fn every_builtin_profile_compiles() {
    let registry = Registry::builtin();
    for id in registry.languages() {
        let out = compile_payload(payload(json!({ "language": id })));
        assert!(out.contains("git clone"), "{} did not check out", id);
        assert!(out.contains("travis_result $?"), "{} has no script result", id);
    }
}

#[test]
fn config_commands_replace_profile_stage() {
    let out = compile_payload(payload(json!({
        "language": "c",
        "before_install": ["sudo apt-get update"],
        "install": ["./bootstrap", "make deps"],
        "script": ["make check", "make lint"],
        "after_script": "echo bye"
    })));

    assert!(!out.contains("./configure && make && make test"));
    assert_in_order(
        &out,
        &[
            "travis_fold:start:before_install.1",
            "echo '$ sudo apt-get update'",
            "travis_fold:end:before_install.1",
            "travis_fold:start:install.1",
            "  ./bootstrap\n",
            "travis_fold:end:install.1",
            "travis_fold:start:install.2",
            "  make deps\n",
            "travis_fold:end:install.2",
            "make check\n",
            "travis_result $?\n",
            "make lint\n",
            "travis_result $?\n",
            "echo '$ echo bye'",
        ],
    );
    assert!(out.contains("  if [ $travis_status -ne 0 ]; then\n    echo 'The command \"./bootstrap\" exited with '"));
}

#[test]
fn empty_stage_in_config_skips_profile_hook() {
    let out = compile_payload(payload(json!({ "language": "haskell", "install": [] })));
    assert!(!out.contains("cabal update"));
    assert!(out.contains("cabal configure --enable-tests"));
}

#[test]
fn after_success_and_failure_branch_on_test_result() {
    let out = compile_payload(payload(json!({
        "language": "c",
        "after_success": ["./deploy.sh"],
        "after_failure": ["cat config.log"]
    })));
    assert_in_order(
        &out,
        &[
            "travis_result $?",
            "if [[ $TRAVIS_TEST_RESULT = 0 ]]; then\n",
            "./deploy.sh\n",
            "else\n",
            "cat config.log\n",
            "fi\n",
        ],
    );
}

#[test]
fn env_groups_render_in_order_with_secure_masking() {
    let mut p = payload(json!({
        "language": "c",
        "global_env": "G=1",
        "env": ["FOO=1 BAR=\"two words\"", "SECURE TOKEN=abc"]
    }));
    p["env_vars"] = json!([
        { "name": "SECRET", "value": "hidden", "public": false },
        { "name": "PUB", "value": "shown", "public": true }
    ]);
    let out = compile_payload(p);

    assert_in_order(
        &out,
        &[
            "Setting environment variables from repository settings",
            "echo '$ export SECRET=[secure]'\nexport SECRET=hidden\n",
            "echo '$ export PUB=shown'\nexport PUB=shown\n",
            "echo '$ export G=1'\nexport G=1\n",
            "echo '$ export FOO=1'\nexport FOO=1\n",
            "echo '$ export BAR=\"two words\"'\nexport BAR=\"two words\"\n",
            "echo '$ export TOKEN=[secure]'\nexport TOKEN=abc\n",
        ],
    );
    assert!(!out.contains("Setting environment variables from .travis.yml"));
    for line in out.lines().filter(|l| l.trim_start().starts_with("echo")) {
        assert!(!line.contains("hidden") && !line.contains("abc"), "leaked: {}", line);
    }
}

#[test]
fn secure_vars_dropped_without_secure_env() {
    let mut p = payload(json!({ "language": "c", "env": ["SECURE TOKEN=abc", "PLAIN=1"] }));
    p["job"]["secure_env_enabled"] = json!(false);
    p["env_vars"] = json!([{ "name": "SECRET", "value": "hidden" }]);
    let out = compile_payload(p);
    assert!(!out.contains("TOKEN"));
    assert!(!out.contains("SECRET"));
    assert!(out.contains("export PLAIN=1\n"));
}

#[test]
fn cache_slug_discriminates_toolchains() {
    assert_eq!(cache_slug_for(json!({ "language": "c" })), "cache--compiler-gcc");
    assert_eq!(
        cache_slug_for(json!({ "language": "c", "compiler": "clang" })),
        "cache--compiler-clang"
    );
    assert_eq!(cache_slug_for(json!({ "language": "haskell", "ghc": "7.8" })), "cache--ghc-7.8");
    assert_eq!(cache_slug_for(json!({ "language": "haskell" })), "cache");
    assert_eq!(cache_slug_for(json!({ "language": "java" })), "cache--jdk-default");
    assert_eq!(
        cache_slug_for(json!({ "language": "ruby", "rvm": "2.1" })),
        "cache--rvm-2.1--gemfile-Gemfile"
    );
    assert_ne!(
        cache_slug_for(json!({ "language": "python", "python": "3.3" })),
        cache_slug_for(json!({ "language": "python", "python": "2.7" }))
    );
}

#[test]
fn directory_cache_uses_profile_slug() {
    let out = compile_payload(payload(json!({
        "language": "c",
        "cache": { "directories": ["vendor/bundle"] }
    })));
    assert_in_order(
        &out,
        &[
            "travis_fold:start:cache.1",
            "fetch '$TRAVIS_CACHE_URL/travis-ci/example/master/cache--compiler-gcc.tgz'",
            "add 'vendor/bundle'",
            "travis_fold:end:cache.1",
        ],
    );
    assert!(out.contains("push '$TRAVIS_CACHE_URL/travis-ci/example/master/cache--compiler-gcc.tgz'"));
}

#[test]
fn pull_requests_fetch_ref_and_skip_cache_push() {
    let mut p = payload(json!({ "language": "c", "cache": { "directories": ["deps"] } }));
    p["job"]["pull_request"] = json!(118);
    let out = compile_payload(p);
    assert!(out.contains("git fetch origin +refs/pull/118/merge:"));
    assert!(!out.contains(" push '"));
}

#[test]
fn submodules_can_be_disabled() {
    let out = compile_payload(payload(json!({ "language": "c" })));
    assert!(out.contains("git submodule update"));
    let out = compile_payload(payload(json!({ "language": "c", "git": { "submodules": false } })));
    assert!(!out.contains("git submodule update"));
    assert!(out.contains("git clone --depth=50"));
}

#[test]
fn paranoid_mode_skips_services_and_addons() {
    let config = json!({
        "language": "c",
        "services": ["redis"],
        "addons": { "hosts": "example.local" }
    });
    let out = compile_payload(payload(config.clone()));
    assert!(out.contains("sudo service redis-server start"));
    assert!(out.contains("example.local"));

    let mut p = payload(config);
    p["paranoid"] = json!(true);
    let out = compile_payload(p);
    assert!(!out.contains("sudo service redis-server start"));
    assert!(!out.contains("example.local"));
    assert!(out.contains("Sudo, services, addons, setuid and setgid have been disabled."));
}

#[test]
fn android_keeps_installt() {
    let out = compile_payload(payload(json!({
        "language": "android",
        "android": { "components": ["build-tools-19.0.0"], "licenses": ["android-sdk-license-.+"] }
    })));
    assert_in_order(
        &out,
        &[
            "travis_fold:start:android.install",
            "android-update-sdk --components=build-tools-19.0.0 --accept-licenses='android-sdk-license-.+'",
            "travis_fold:end:android.install",
            "if [[ -f gradlew ]]; then",
            "else\n",
            "ant debug installt test\n",
        ],
    );
}

#[test]
fn java_install_prefers_gradle_wrapper() {
    let out = compile_payload(payload(json!({ "language": "java", "jdk": "oraclejdk7" })));
    assert_in_order(
        &out,
        &[
            "jdk_switcher use oraclejdk7",
            "java -version",
            "if [[ -f gradlew ]]; then",
            "./gradlew assemble",
            "elif [[ -f build.gradle ]]; then",
            "gradle assemble",
            "elif [[ -f pom.xml ]]; then",
            "mvn install -DskipTests=true -B -V",
            "./gradlew check",
            "ant test",
        ],
    );
}

#[test]
fn compile_is_deterministic() {
    let config = json!({
        "language": "ruby",
        "env": ["A=1 B=2"],
        "addons": { "apt_packages": ["cmake"], "hosts": ["a.local"] },
        "cache": { "directories": ["vendor"] }
    });
    assert_eq!(compile_payload(payload(config.clone())), compile_payload(payload(config)));
}

#[test]
fn timing_ids_are_unique_across_body_and_finish() {
    let out = compile_payload(payload(json!({
        "language": "c",
        "cache": { "directories": ["vendor"] }
    })));
    let ids: Vec<&str> = out
        .split("travis_time:start:")
        .skip(1)
        .map(|rest| rest.split(|c: char| !c.is_ascii_hexdigit()).next().unwrap_or(""))
        .collect();
    assert!(ids.len() > 1);
    let unique: std::collections::BTreeSet<&str> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len(), "duplicate timing ids: {:?}", ids);
}

#[test]
fn hosts_fixes_follow_skip_flag() {
    let out = compile_payload(payload(json!({ "language": "c" })));
    assert_in_order(
        &out,
        &[
            "/etc/resolv.conf",
            "-i'.bak' /etc/hosts",
            "sudo bash -c 'echo \"87.98.253.108 getcomposer.org\" >> /etc/hosts'",
        ],
    );

    let mut p = payload(json!({ "language": "c" }));
    p["skip_etc_hosts_fix"] = json!(true);
    let out = compile_payload(p);
    assert!(!out.contains("getcomposer.org"));
    assert!(!out.contains("-i'.bak' /etc/hosts"));
    assert!(out.contains("/etc/resolv.conf"));
}
