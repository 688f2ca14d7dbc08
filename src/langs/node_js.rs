use serde_json::{Value, json};

use super::ProfileEntry;
use crate::ast::{CmdOpts, ExportOpts};
use crate::base;
use crate::config::Data;
use crate::error::Result;
use crate::stages::{Session, StageHooks};

pub fn entry() -> ProfileEntry {
    ProfileEntry {
        name: "node_js",
        defaults,
        build,
    }
}

fn defaults() -> Value {
    json!({ "node_js": "0.10" })
}

fn build() -> Box<dyn StageHooks> {
    Box::new(NodeJs)
}

fn version(data: &Data) -> String {
    let v = data.get_str("node_js").unwrap_or_else(|| "0.10".to_string());
    // YAML turns `0.10` into the float 0.1
    if v == "0.1" { "0.10".to_string() } else { v }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NodeJs;

impl StageHooks for NodeJs {
    fn name(&self) -> &'static str {
        "node_js"
    }

    fn export(&self, cx: &mut Session<'_>) -> Result<()> {
        base::export(cx)?;
        cx.sh.export("TRAVIS_NODE_VERSION", version(cx.data), ExportOpts::silent());
        Ok(())
    }

    fn setup(&self, cx: &mut Session<'_>) -> Result<()> {
        base::setup(cx)?;
        cx.sh.cmd(format!("nvm use {}", version(cx.data)), CmdOpts::new().echo().assert());
        Ok(())
    }

    fn announce(&self, cx: &mut Session<'_>) -> Result<()> {
        base::announce(cx)?;
        cx.sh.cmd("node --version", CmdOpts::new().echo());
        cx.sh.cmd("npm --version", CmdOpts::new().echo());
        Ok(())
    }

    fn install(&self, cx: &mut Session<'_>) -> Result<()> {
        cx.sh.if_("-f package.json", |sh| {
            sh.cmd("npm install", CmdOpts::new().echo().assert().retry().timing());
            Ok(())
        })
    }

    fn script(&self, cx: &mut Session<'_>) -> Result<()> {
        let opts = CmdOpts::new().echo().timing();
        cx.sh.open_conditional("-f package.json");
        cx.sh.cmd("npm test", opts);
        cx.sh.else_()?;
        cx.sh.cmd("make test", opts);
        cx.sh.close()
    }

    fn cache_slug(&self, data: &Data) -> String {
        format!("{}--node-{}", base::cache_slug(), version(data))
    }
}
