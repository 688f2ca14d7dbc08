use serde_json::{Value, json};

use super::ProfileEntry;
use crate::ast::{CmdOpts, ExportOpts};
use crate::base;
use crate::config::Data;
use crate::error::Result;
use crate::stages::{Session, StageHooks};

pub fn entry() -> ProfileEntry {
    ProfileEntry {
        name: "erlang",
        defaults,
        build,
    }
}

fn defaults() -> Value {
    json!({ "otp_release": "R16B" })
}

fn build() -> Box<dyn StageHooks> {
    Box::new(Erlang)
}

fn otp_release(data: &Data) -> String {
    data.get_str("otp_release").unwrap_or_else(|| "R16B".to_string())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Erlang;

impl StageHooks for Erlang {
    fn name(&self) -> &'static str {
        "erlang"
    }

    fn export(&self, cx: &mut Session<'_>) -> Result<()> {
        base::export(cx)?;
        cx.sh.export("TRAVIS_OTP_RELEASE", otp_release(cx.data), ExportOpts::silent());
        Ok(())
    }

    fn setup(&self, cx: &mut Session<'_>) -> Result<()> {
        base::setup(cx)?;
        cx.sh.cmd(
            format!("source $HOME/otp/{}/activate", otp_release(cx.data)),
            CmdOpts::new().echo().assert(),
        );
        Ok(())
    }

    fn install(&self, cx: &mut Session<'_>) -> Result<()> {
        let opts = CmdOpts::new().echo().retry().timing();
        cx.sh.open_conditional("(-f rebar.config || -f Rebar.config) && -f ./rebar");
        cx.sh.cmd("./rebar get-deps", opts);
        cx.sh.elif("-f rebar.config || -f Rebar.config")?;
        cx.sh.cmd("rebar get-deps", opts);
        cx.sh.close()
    }

    fn script(&self, cx: &mut Session<'_>) -> Result<()> {
        let opts = CmdOpts::new().echo().timing();
        cx.sh.open_conditional("(-f rebar.config || -f Rebar.config) && -f ./rebar");
        cx.sh.cmd("./rebar compile && ./rebar skip_deps=true eunit", opts);
        cx.sh.elif("-f rebar.config || -f Rebar.config")?;
        cx.sh.cmd("rebar compile && rebar skip_deps=true eunit", opts);
        cx.sh.else_()?;
        cx.sh.cmd("make test", opts);
        cx.sh.close()
    }

    fn cache_slug(&self, data: &Data) -> String {
        format!("{}--otp-{}", base::cache_slug(), otp_release(data))
    }
}
