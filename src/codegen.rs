use crate::ast::{Ansi, Branch, CmdOpts, ExportOpts, Node};

/// Printed in place of any secure value.
pub const SECURE_TOKEN: &str = "[secure]";

/// Attempts made by a `retry` command before its failure propagates.
pub const RETRY_ATTEMPTS: usize = 3;

/// Shell variable holding the status of the last wrapped command.
const STATUS: &str = "travis_status";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodegenOptions {
    /// Emit timing markers around `timing` commands.
    pub timing: bool,
    /// Emit fold markers; when off, fold bodies render inline.
    pub folds: bool,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            timing: true,
            folds: true,
        }
    }
}

/// Single-quotes `s` as one shell word.
pub fn sq(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

pub fn emit(nodes: &[Node]) -> String {
    emit_with_options(nodes, CodegenOptions::default())
}

pub fn emit_with_options(nodes: &[Node], options: CodegenOptions) -> String {
    Emitter::new(options).render(nodes, 0)
}

/// Renders several ASTs that end up in the same script. Timing ids keep
/// counting across calls, so no two timed commands share an id.
#[derive(Debug)]
pub struct Emitter {
    options: CodegenOptions,
    timers: usize,
}

/// Writes `text` at `indent`. Only the first line is padded; continuation
/// lines are literal (heredoc bodies and terminators must not move).
fn line(out: &mut String, indent: usize, text: &str) {
    let mut lines = text.lines();
    if let Some(first) = lines.next() {
        if !first.is_empty() {
            out.push_str(&" ".repeat(indent));
            out.push_str(first);
        }
        out.push('\n');
    }
    for l in lines {
        out.push_str(l);
        out.push('\n');
    }
    if text.is_empty() {
        out.push('\n');
    }
}

fn preview_line(preview: &str, color: Option<Ansi>) -> String {
    let shown = sq(&format!("$ {}", preview));
    match color {
        Some(c) => format!("echo -e \"\\033[{}m\"{}\"\\033[0m\"", c.code(), shown),
        None => format!("echo {}", shown),
    }
}

impl Emitter {
    pub fn new(options: CodegenOptions) -> Self {
        Self { options, timers: 0 }
    }

    /// Renders `nodes` with every top-level line padded by `indent`.
    pub fn render(&mut self, nodes: &[Node], indent: usize) -> String {
        let mut out = String::new();
        for node in nodes {
            self.emit_node(node, &mut out, indent);
        }
        out
    }

    fn emit_node(&mut self, node: &Node, out: &mut String, indent: usize) {
        match node {
            Node::Command { text, opts } => self.emit_command(text, opts, out, indent),
            Node::Export { key, value, opts } => emit_export(key, value, opts, out, indent),
            Node::Conditional { branches } => self.emit_conditional(branches, out, indent),
            Node::Fold { label, body } => {
                if !self.options.folds {
                    for child in body {
                        self.emit_node(child, out, indent);
                    }
                    return;
                }
                line(out, indent, &format!("echo -en \"travis_fold:start:{}\\r\"", label));
                for child in body {
                    self.emit_node(child, out, indent + 2);
                }
                line(out, indent, &format!("echo -en \"travis_fold:end:{}\\r\"", label));
            }
            Node::Raw(text) => line(out, indent, text),
        }
    }

    fn emit_command(&mut self, text: &str, opts: &CmdOpts, out: &mut String, indent: usize) {
        let preview = if opts.secure { SECURE_TOKEN } else { text };
        let timing = opts.timing && self.options.timing;
        let wrapped = timing || opts.retry || opts.assert;

        let timer = if timing {
            self.timers += 1;
            Some(format!("{:08x}", self.timers))
        } else {
            None
        };

        if let Some(id) = &timer {
            line(out, indent, &format!("travis_start_{id}=$(date +%s%N)"));
            line(out, indent, &format!("echo -en \"travis_time:start:{id}\\r\""));
        }

        if opts.echo {
            line(out, indent, &preview_line(preview, opts.color));
        }

        if opts.retry {
            let pad = indent + 2;
            line(out, indent, &format!("{STATUS}=0"));
            let attempts: Vec<String> = (1..=RETRY_ATTEMPTS).map(|n| n.to_string()).collect();
            line(out, indent, &format!("for travis_attempt in {}; do", attempts.join(" ")));
            line(out, pad, text);
            line(out, pad, &format!("{STATUS}=$?"));
            line(out, pad, &format!("[ ${STATUS} -eq 0 ] && break"));
            line(out, pad, &format!("if [ $travis_attempt -lt {RETRY_ATTEMPTS} ]; then"));
            let msg = sq(&format!("The command \"{}\" failed. Retrying, ", preview));
            line(out, pad + 2, &format!("echo {msg}\"$travis_attempt of {RETRY_ATTEMPTS}.\""));
            line(out, pad + 2, "sleep 1");
            line(out, pad, "fi");
            line(out, indent, "done");
        } else {
            line(out, indent, text);
            if wrapped {
                line(out, indent, &format!("{STATUS}=$?"));
            }
        }

        if let Some(id) = &timer {
            line(out, indent, &format!("travis_end_{id}=$(date +%s%N)"));
            line(
                out,
                indent,
                &format!(
                    "echo -en \"travis_time:end:{id}:start=$travis_start_{id},finish=$travis_end_{id},duration=$((travis_end_{id}-travis_start_{id}))\\r\""
                ),
            );
        }

        if opts.assert {
            let msg = sq(&format!("The command \"{}\" exited with ", preview));
            line(out, indent, &format!("if [ ${STATUS} -ne 0 ]; then"));
            line(out, indent + 2, &format!("echo {msg}\"${STATUS}.\""));
            line(out, indent + 2, &format!("travis_terminate ${STATUS}"));
            line(out, indent, "fi");
        } else if wrapped {
            line(out, indent, &format!("(exit ${STATUS})"));
        }
    }

    fn emit_conditional(&mut self, branches: &[Branch], out: &mut String, indent: usize) {
        for (i, branch) in branches.iter().enumerate() {
            let header = match (&branch.test, i) {
                (Some(test), 0) => format!("if [[ {test} ]]; then"),
                (Some(test), _) => format!("elif [[ {test} ]]; then"),
                // An else-only chain cannot be built, but stay total.
                (None, 0) => "if true; then".to_string(),
                (None, _) => "else".to_string(),
            };
            line(out, indent, &header);
            if branch.body.is_empty() {
                line(out, indent + 2, ":");
            }
            for child in &branch.body {
                self.emit_node(child, out, indent + 2);
            }
        }
        if !branches.is_empty() {
            line(out, indent, "fi");
        }
    }
}

fn emit_export(key: &str, value: &str, opts: &ExportOpts, out: &mut String, indent: usize) {
    if opts.echo {
        let shown = if opts.secure { SECURE_TOKEN } else { value };
        line(out, indent, &format!("echo {}", sq(&format!("$ export {}={}", key, shown))));
    }
    line(out, indent, &format!("export {}={}", key, value));
}
