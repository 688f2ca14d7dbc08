use serde_json::{Value, json};

use super::ProfileEntry;
use crate::ast::{CmdOpts, ExportOpts};
use crate::base;
use crate::config::Data;
use crate::error::Result;
use crate::stages::{Session, StageHooks};

pub fn entry() -> ProfileEntry {
    ProfileEntry {
        name: "c",
        defaults,
        build,
    }
}

fn defaults() -> Value {
    json!({ "compiler": "gcc" })
}

fn build() -> Box<dyn StageHooks> {
    Box::new(C)
}

fn compiler(data: &Data) -> String {
    data.get_str("compiler").unwrap_or_else(|| "gcc".to_string())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct C;

impl StageHooks for C {
    fn name(&self) -> &'static str {
        "c"
    }

    fn export(&self, cx: &mut Session<'_>) -> Result<()> {
        base::export(cx)?;
        cx.sh.export("CC", compiler(cx.data), ExportOpts::echoed());
        Ok(())
    }

    fn announce(&self, cx: &mut Session<'_>) -> Result<()> {
        base::announce(cx)?;
        cx.sh.cmd(format!("{} --version", compiler(cx.data)), CmdOpts::new().echo());
        Ok(())
    }

    fn script(&self, cx: &mut Session<'_>) -> Result<()> {
        cx.sh.cmd(
            "./configure && make && make test",
            CmdOpts::new().echo().assert().timing(),
        );
        Ok(())
    }

    fn cache_slug(&self, data: &Data) -> String {
        format!("{}--compiler-{}", base::cache_slug(), compiler(data))
    }
}
