use serde_json::{Value, json};

use super::ProfileEntry;
use crate::ast::{CmdOpts, ExportOpts};
use crate::base;
use crate::config::Data;
use crate::error::Result;
use crate::stages::{Session, StageHooks};

pub fn entry() -> ProfileEntry {
    ProfileEntry {
        name: "ruby",
        defaults,
        build,
    }
}

fn defaults() -> Value {
    json!({ "rvm": "default", "gemfile": "Gemfile" })
}

fn build() -> Box<dyn StageHooks> {
    Box::new(Ruby)
}

fn rvm(data: &Data) -> String {
    data.get_str("rvm").unwrap_or_else(|| "default".to_string())
}

fn gemfile(data: &Data) -> String {
    data.get_str("gemfile").unwrap_or_else(|| "Gemfile".to_string())
}

/// Ruby via rvm and bundler. Also the profile for unknown languages.
#[derive(Debug, Default, Clone, Copy)]
pub struct Ruby;

impl StageHooks for Ruby {
    fn name(&self) -> &'static str {
        "ruby"
    }

    fn export(&self, cx: &mut Session<'_>) -> Result<()> {
        base::export(cx)?;
        cx.sh.export("TRAVIS_RUBY_VERSION", rvm(cx.data), ExportOpts::silent());
        cx.sh.export(
            "BUNDLE_GEMFILE",
            format!("$PWD/{}", gemfile(cx.data)),
            ExportOpts::echoed(),
        );
        Ok(())
    }

    fn setup(&self, cx: &mut Session<'_>) -> Result<()> {
        base::setup(cx)?;
        cx.sh.cmd(
            format!("rvm use {} --install --binary --fuzzy", rvm(cx.data)),
            CmdOpts::new().echo().assert().timing(),
        );
        Ok(())
    }

    fn announce(&self, cx: &mut Session<'_>) -> Result<()> {
        base::announce(cx)?;
        cx.sh.cmd("ruby --version", CmdOpts::new().echo());
        cx.sh.cmd("rvm --version", CmdOpts::new().echo());
        cx.sh.cmd("bundle --version", CmdOpts::new().echo());
        Ok(())
    }

    fn install(&self, cx: &mut Session<'_>) -> Result<()> {
        let gemfile = gemfile(cx.data);
        cx.sh.if_(format!("-f {}", gemfile), |sh| {
            sh.cmd(
                "bundle install --jobs=3 --retry=3",
                CmdOpts::new().echo().assert().retry().timing(),
            );
            Ok(())
        })
    }

    fn script(&self, cx: &mut Session<'_>) -> Result<()> {
        let opts = CmdOpts::new().echo().timing();
        cx.sh.open_conditional(format!("-f {}", gemfile(cx.data)));
        cx.sh.cmd("bundle exec rake", opts);
        cx.sh.else_()?;
        cx.sh.cmd("rake", opts);
        cx.sh.close()
    }

    fn cache_slug(&self, data: &Data) -> String {
        format!("{}--rvm-{}--gemfile-{}", base::cache_slug(), rvm(data), gemfile(data))
    }
}
