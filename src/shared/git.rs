use serde_json::{Value, json};
use tracing::warn;

use super::GitCheckout;
use crate::ast::{CmdOpts, ExportOpts};
use crate::builder::ShellBuilder;
use crate::config::Data;
use crate::error::Result;

/// Config defaults every profile starts from.
pub fn defaults() -> Value {
    json!({
        "git": {
            "submodules": true,
            "depth": 50
        }
    })
}

/// Clones the repository and checks out the job's commit.
#[derive(Debug, Default, Clone, Copy)]
pub struct Git;

impl Git {
    fn clone_repo(&self, sh: &mut ShellBuilder, data: &Data, url: &str, slug: &str) {
        let depth = data.get_str("git/depth").unwrap_or_else(|| "50".to_string());
        let mut command = format!("git clone --depth={}", depth);
        if let Some(branch) = data.branch() {
            command.push_str(&format!(" --branch={}", branch));
        }
        command.push_str(&format!(" {} {}", url, slug));
        sh.cmd(command, CmdOpts::new().echo().assert().retry());
    }

    fn submodules(&self, sh: &mut ShellBuilder, data: &Data) -> Result<()> {
        let enabled = data.get("git/submodules").and_then(Value::as_bool).unwrap_or(true);
        if !enabled {
            return Ok(());
        }
        sh.if_("-f .gitmodules", |sh| {
            sh.cmd(
                "echo -e \"Host github.com\\n\\tStrictHostKeyChecking no\\n\" >> ~/.ssh/config",
                CmdOpts::new(),
            );
            sh.cmd("git submodule init", CmdOpts::new().echo());
            sh.cmd("git submodule update", CmdOpts::new().echo().assert().retry());
            Ok(())
        })
    }
}

impl GitCheckout for Git {
    fn checkout(&self, sh: &mut ShellBuilder, data: &Data) -> Result<()> {
        let (Some(url), Some(slug)) = (data.source_url(), data.slug()) else {
            warn!("payload has no repository source_url/slug; skipping checkout");
            return Ok(());
        };

        sh.export("GIT_ASKPASS", "echo", ExportOpts::silent());
        sh.fold("git.checkout", |sh| {
            self.clone_repo(sh, data, &url, &slug);
            sh.cmd(format!("cd {}", slug), CmdOpts::new().echo());
            if data.pull_request() {
                if let Some(git_ref) = data.git_ref() {
                    sh.cmd(
                        format!("git fetch origin +{}:", git_ref),
                        CmdOpts::new().echo().assert().retry(),
                    );
                }
            }
            if let Some(commit) = data.commit() {
                sh.cmd(format!("git checkout -qf {}", commit), CmdOpts::new().echo().assert());
            }
            Ok(())
        })?;
        sh.fold("git.submodule", |sh| self.submodules(sh, data))
    }
}
