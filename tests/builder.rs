use shbuild::ShellBuilder;
use shbuild::ast::{self, CmdOpts, ExportOpts, Node};
use shbuild::error::{BlockKind, CompileError};

#[test]
fn nested_blocks_append_to_innermost() {
    let mut sh = ShellBuilder::new();
    sh.cmd("first", CmdOpts::new());
    sh.open_fold("outer");
    sh.open_conditional("-f Makefile");
    assert_eq!(sh.depth(), 2);
    sh.cmd("make", CmdOpts::new());
    sh.close().unwrap();
    sh.cmd("after", CmdOpts::new());
    sh.close().unwrap();
    assert_eq!(sh.depth(), 0);

    let nodes = sh.finish().unwrap();
    assert_eq!(nodes.len(), 2);
    let Node::Fold { label, body } = &nodes[1] else {
        panic!("expected fold, got {:?}", nodes[1]);
    };
    assert_eq!(label, "outer");
    assert_eq!(body.len(), 2);
    assert!(matches!(&body[0], Node::Conditional { branches } if branches.len() == 1));
    assert_eq!(body[1], Node::command("after", CmdOpts::new()));
}

#[test]
fn flatten_follows_render_order() {
    let mut sh = ShellBuilder::new();
    sh.fold("f", |sh| {
        sh.open_conditional("a");
        sh.raw("one");
        sh.else_()?;
        sh.raw("two");
        sh.close()
    })
    .unwrap();
    sh.export("K", "v", ExportOpts::silent());
    let nodes = sh.finish().unwrap();

    let raws: Vec<&str> = ast::flatten(&nodes)
        .into_iter()
        .filter_map(|n| match n {
            Node::Raw(text) => Some(text.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(raws, vec!["one", "two"]);
    assert_eq!(ast::flatten(&nodes).len(), 5);
}

#[test]
fn close_at_root_is_unbalanced() {
    let mut sh = ShellBuilder::new();
    let err = sh.close().unwrap_err();
    assert_eq!(err, CompileError::UnbalancedClose);
    assert!(err.is_structural());
}

#[test]
fn finish_with_open_block_names_innermost() {
    let mut sh = ShellBuilder::new();
    sh.open_fold("install");
    sh.open_conditional("-f Gemfile");
    assert_eq!(
        sh.finish().unwrap_err(),
        CompileError::UnclosedBlock {
            kind: BlockKind::Conditional,
            label: "-f Gemfile".to_string(),
        }
    );

    let mut sh = ShellBuilder::new();
    sh.open_fold("install");
    let err = sh.finish().unwrap_err();
    assert_eq!(err.to_string(), "compile error: unclosed fold block `install`");
}

#[test]
fn else_outside_conditional_is_rejected() {
    let mut sh = ShellBuilder::new();
    assert_eq!(
        sh.else_().unwrap_err(),
        CompileError::BranchOutsideConditional { op: "else" }
    );

    sh.open_fold("x");
    assert_eq!(
        sh.elif("-f y").unwrap_err(),
        CompileError::BranchOutsideConditional { op: "elif" }
    );
}

#[test]
fn branch_after_else_is_rejected() {
    let mut sh = ShellBuilder::new();
    sh.open_conditional("a");
    sh.else_().unwrap();
    assert_eq!(
        sh.elif("b").unwrap_err(),
        CompileError::BranchAfterElse { op: "elif" }
    );
}

#[test]
fn failing_closure_leaves_block_open() {
    let mut sh = ShellBuilder::new();
    let err = sh
        .fold("broken", |sh| sh.else_())
        .unwrap_err();
    assert!(err.is_structural());
    assert_eq!(sh.depth(), 1);
}

#[test]
fn non_structural_errors() {
    assert!(!CompileError::UnknownLanguage("cobol".into()).is_structural());
    assert!(!CompileError::Payload("bad".into()).is_structural());
}

#[test]
fn echo_quotes_message() {
    let mut sh = ShellBuilder::new();
    sh.echo("it's done", None);
    let nodes = sh.finish().unwrap();
    assert_eq!(nodes, vec![Node::command("echo 'it'\\''s done'", CmdOpts::new())]);
}
