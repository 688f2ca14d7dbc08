use serde_json::{Value, json};

use super::ProfileEntry;
use crate::ast::{CmdOpts, ExportOpts};
use crate::base;
use crate::config::Data;
use crate::error::Result;
use crate::stages::{Session, StageHooks};

pub fn entry() -> ProfileEntry {
    ProfileEntry {
        name: "cpp",
        defaults,
        build,
    }
}

fn defaults() -> Value {
    json!({ "compiler": "g++" })
}

fn build() -> Box<dyn StageHooks> {
    Box::new(Cpp)
}

/// `(CXX, CC)` for the configured compiler.
fn toolchain(data: &Data) -> (String, String) {
    let compiler = data.get_str("compiler").unwrap_or_else(|| "g++".to_string());
    match compiler.as_str() {
        "gcc" | "g++" => ("g++".to_string(), "gcc".to_string()),
        "clang" | "clang++" => ("clang++".to_string(), "clang".to_string()),
        other => (other.to_string(), other.to_string()),
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Cpp;

impl StageHooks for Cpp {
    fn name(&self) -> &'static str {
        "cpp"
    }

    fn export(&self, cx: &mut Session<'_>) -> Result<()> {
        base::export(cx)?;
        let (cxx, cc) = toolchain(cx.data);
        cx.sh.export("CXX", cxx, ExportOpts::echoed());
        cx.sh.export("CC", cc, ExportOpts::echoed());
        Ok(())
    }

    fn announce(&self, cx: &mut Session<'_>) -> Result<()> {
        base::announce(cx)?;
        let (cxx, _) = toolchain(cx.data);
        cx.sh.cmd(format!("{} --version", cxx), CmdOpts::new().echo());
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
        let (cxx, _) = toolchain(data);
        format!("{}--compiler-{}", base::cache_slug(), cxx)
    }
}
