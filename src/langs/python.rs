use serde_json::{Value, json};

use super::ProfileEntry;
use crate::ast::{Ansi, CmdOpts, ExportOpts};
use crate::base;
use crate::config::Data;
use crate::error::Result;
use crate::stages::{Session, StageHooks};

pub fn entry() -> ProfileEntry {
    ProfileEntry {
        name: "python",
        defaults,
        build,
    }
}

fn defaults() -> Value {
    json!({ "python": "2.7", "virtualenv": { "system_site_packages": false } })
}

fn build() -> Box<dyn StageHooks> {
    Box::new(Python)
}

fn version(data: &Data) -> String {
    data.get_str("python").unwrap_or_else(|| "2.7".to_string())
}

/// Name of the pre-built virtualenv for the configured interpreter.
fn virtualenv(data: &Data) -> String {
    let v = version(data);
    let name = if v.starts_with("pypy") { v } else { format!("python{}", v) };
    let system = data
        .get("virtualenv/system_site_packages")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    if system { format!("{}_with_system_site_packages", name) } else { name }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Python;

impl StageHooks for Python {
    fn name(&self) -> &'static str {
        "python"
    }

    fn export(&self, cx: &mut Session<'_>) -> Result<()> {
        base::export(cx)?;
        cx.sh.export("TRAVIS_PYTHON_VERSION", version(cx.data), ExportOpts::silent());
        Ok(())
    }

    fn setup(&self, cx: &mut Session<'_>) -> Result<()> {
        base::setup(cx)?;
        cx.sh.cmd(
            format!("source ~/virtualenv/{}/bin/activate", virtualenv(cx.data)),
            CmdOpts::new().echo().assert(),
        );
        Ok(())
    }

    fn announce(&self, cx: &mut Session<'_>) -> Result<()> {
        base::announce(cx)?;
        cx.sh.cmd("python --version", CmdOpts::new().echo());
        cx.sh.cmd("pip --version", CmdOpts::new().echo());
        Ok(())
    }

    fn install(&self, cx: &mut Session<'_>) -> Result<()> {
        cx.sh.open_conditional("-f Requirements.txt");
        cx.sh.cmd(
            "pip install -r Requirements.txt",
            CmdOpts::new().echo().retry().timing(),
        );
        cx.sh.elif("-f requirements.txt")?;
        cx.sh.cmd(
            "pip install -r requirements.txt",
            CmdOpts::new().echo().retry().timing(),
        );
        cx.sh.else_()?;
        cx.sh.echo(
            "Could not locate requirements.txt. Override the install: key in your .travis.yml to install dependencies.",
            None,
        );
        cx.sh.close()
    }

    fn script(&self, cx: &mut Session<'_>) -> Result<()> {
        cx.sh.echo(
            "Please override the script: key in your .travis.yml to run tests.",
            Some(Ansi::Red),
        );
        cx.sh.cmd("false", CmdOpts::new());
        Ok(())
    }

    fn cache_slug(&self, data: &Data) -> String {
        format!("{}--python-{}", base::cache_slug(), version(data))
    }
}
