use serde_json::Value;
use tracing::debug;

use super::AddonRunner;
use crate::ast::{CmdOpts, ExportOpts};
use crate::builder::ShellBuilder;
use crate::codegen::sq;
use crate::config::Data;
use crate::error::Result;

/// Addons this runner knows, with the hook each one runs in.
const KNOWN: &[(&str, &str)] = &[
    ("hosts", "after_pre_setup"),
    ("postgresql", "after_pre_setup"),
    ("apt_packages", "after_pre_setup"),
];

/// Runs the addons listed under `addons` in the config. Addons are skipped
/// entirely in paranoid mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct Addons;

fn words(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => s.split_whitespace().map(str::to_string).collect(),
        Value::Array(items) => items.iter().filter_map(Value::as_str).map(str::to_string).collect(),
        Value::Number(n) => vec![n.to_string()],
        _ => Vec::new(),
    }
}

fn hosts(sh: &mut ShellBuilder, names: &[String]) {
    let line = names.join(" ");
    sh.cmd(
        format!("sudo sed -e 's/^\\(127\\.0\\.0\\.1.*\\)$/\\1 '{}'/' -i'.bak' /etc/hosts", sq(&line)),
        CmdOpts::new(),
    );
    sh.cmd(
        format!("sudo sed -e 's/^\\(::1.*\\)$/\\1 '{}'/' -i'.bak' /etc/hosts", sq(&line)),
        CmdOpts::new(),
    );
}

fn postgresql(sh: &mut ShellBuilder, versions: &[String]) -> Result<()> {
    let Some(version) = versions.first() else {
        return Ok(());
    };
    sh.fold("postgresql", |sh| {
        sh.echo(&format!("Starting PostgreSQL v{}", version), None);
        sh.export("PATH", format!("/usr/lib/postgresql/{}/bin:$PATH", version), ExportOpts::echoed());
        sh.cmd("sudo service postgresql stop", CmdOpts::new().echo());
        sh.cmd(format!("sudo service postgresql start {}", version), CmdOpts::new().echo().assert());
        Ok(())
    })
}

fn apt_packages(sh: &mut ShellBuilder, packages: &[String]) -> Result<()> {
    if packages.is_empty() {
        return Ok(());
    }
    sh.fold("apt", |sh| {
        sh.echo("Installing APT Packages", None);
        sh.cmd("sudo apt-get update -qq", CmdOpts::new().echo().retry().timing());
        sh.cmd(
            format!("sudo apt-get install -yq --no-install-suggests {}", packages.join(" ")),
            CmdOpts::new().echo().assert().retry().timing(),
        );
        Ok(())
    })
}

impl AddonRunner for Addons {
    fn run(&self, hook: &str, sh: &mut ShellBuilder, data: &Data) -> Result<()> {
        if data.paranoid_mode() {
            return Ok(());
        }
        let Some(Value::Object(configured)) = data.get("addons") else {
            return Ok(());
        };

        for (name, value) in configured {
            let runs_here = KNOWN.iter().any(|(n, h)| n == name && *h == hook);
            if !runs_here {
                continue;
            }
            debug!(addon = name.as_str(), hook, "running addon");
            let args = words(value);
            match name.as_str() {
                "hosts" => hosts(sh, &args),
                "postgresql" => postgresql(sh, &args)?,
                "apt_packages" => apt_packages(sh, &args)?,
                _ => {}
            }
        }
        Ok(())
    }
}
