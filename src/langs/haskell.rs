use serde_json::{Value, json};

use super::ProfileEntry;
use crate::ast::{CmdOpts, ExportOpts};
use crate::base;
use crate::config::Data;
use crate::error::Result;
use crate::stages::{Session, StageHooks};

pub fn entry() -> ProfileEntry {
    ProfileEntry {
        name: "haskell",
        defaults,
        build,
    }
}

fn defaults() -> Value {
    json!({})
}

fn build() -> Box<dyn StageHooks> {
    Box::new(Haskell)
}

fn ghc(data: &Data) -> Option<String> {
    data.get_str("ghc")
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Haskell;

impl StageHooks for Haskell {
    fn name(&self) -> &'static str {
        "haskell"
    }

    fn setup(&self, cx: &mut Session<'_>) -> Result<()> {
        base::setup(cx)?;
        if let Some(version) = ghc(cx.data) {
            cx.sh.export(
                "PATH",
                format!("/usr/local/ghc/$(ghc_find {})/bin/:$PATH", version),
                ExportOpts::echoed(),
            );
        }
        Ok(())
    }

    fn announce(&self, cx: &mut Session<'_>) -> Result<()> {
        base::announce(cx)?;
        cx.sh.cmd("ghc --version", CmdOpts::new().echo());
        cx.sh.cmd("cabal --version", CmdOpts::new().echo());
        Ok(())
    }

    fn install(&self, cx: &mut Session<'_>) -> Result<()> {
        let opts = CmdOpts::new().echo().assert().retry().timing();
        cx.sh.cmd("cabal update", opts);
        cx.sh.cmd("cabal install --only-dependencies --enable-tests", opts);
        Ok(())
    }

    fn script(&self, cx: &mut Session<'_>) -> Result<()> {
        cx.sh.cmd(
            "cabal configure --enable-tests && cabal build && cabal test",
            CmdOpts::new().echo().timing(),
        );
        Ok(())
    }

    fn cache_slug(&self, data: &Data) -> String {
        match ghc(data) {
            Some(version) => format!("{}--ghc-{}", base::cache_slug(), version),
            None => base::cache_slug(),
        }
    }
}
