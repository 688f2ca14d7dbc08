use serde_json::{Value, json};

use super::ProfileEntry;
use crate::ast::{CmdOpts, ExportOpts};
use crate::base;
use crate::config::Data;
use crate::error::Result;
use crate::stages::{Session, StageHooks};

pub fn entry() -> ProfileEntry {
    ProfileEntry {
        name: "perl",
        defaults,
        build,
    }
}

fn defaults() -> Value {
    json!({ "perl": "5.14" })
}

fn build() -> Box<dyn StageHooks> {
    Box::new(Perl)
}

fn version(data: &Data) -> String {
    data.get_str("perl").unwrap_or_else(|| "5.14".to_string())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Perl;

impl StageHooks for Perl {
    fn name(&self) -> &'static str {
        "perl"
    }

    fn export(&self, cx: &mut Session<'_>) -> Result<()> {
        base::export(cx)?;
        cx.sh.export("TRAVIS_PERL_VERSION", version(cx.data), ExportOpts::silent());
        Ok(())
    }

    fn setup(&self, cx: &mut Session<'_>) -> Result<()> {
        base::setup(cx)?;
        cx.sh.cmd(format!("perlbrew use {}", version(cx.data)), CmdOpts::new().echo().assert());
        Ok(())
    }

    fn announce(&self, cx: &mut Session<'_>) -> Result<()> {
        base::announce(cx)?;
        cx.sh.cmd("perl --version", CmdOpts::new().echo());
        cx.sh.cmd("cpanm --version", CmdOpts::new().echo());
        Ok(())
    }

    fn install(&self, cx: &mut Session<'_>) -> Result<()> {
        cx.sh.cmd(
            "cpanm --quiet --installdeps --notest .",
            CmdOpts::new().echo().retry().timing(),
        );
        Ok(())
    }

    fn script(&self, cx: &mut Session<'_>) -> Result<()> {
        let opts = CmdOpts::new().echo().timing();
        cx.sh.open_conditional("-f Build.PL");
        cx.sh.cmd("perl Build.PL && ./Build && ./Build test", opts);
        cx.sh.elif("-f Makefile.PL")?;
        cx.sh.cmd("perl Makefile.PL && make test", opts);
        cx.sh.else_()?;
        cx.sh.cmd("make test", opts);
        cx.sh.close()
    }

    fn cache_slug(&self, data: &Data) -> String {
        format!("{}--perl-{}", base::cache_slug(), version(data))
    }
}
