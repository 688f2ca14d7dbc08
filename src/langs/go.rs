use serde_json::{Value, json};

use super::ProfileEntry;
use crate::ast::{CmdOpts, ExportOpts};
use crate::base;
use crate::config::Data;
use crate::error::Result;
use crate::stages::{Session, StageHooks};

pub fn entry() -> ProfileEntry {
    ProfileEntry {
        name: "go",
        defaults,
        build,
    }
}

fn defaults() -> Value {
    json!({ "go": "1.2" })
}

fn build() -> Box<dyn StageHooks> {
    Box::new(Go)
}

fn version(data: &Data) -> String {
    data.get_str("go").unwrap_or_else(|| "1.2".to_string())
}

/// Import path of the repository inside `$GOPATH`.
fn import_path(data: &Data) -> String {
    format!("github.com/{}", data.slug().unwrap_or_default())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Go;

impl StageHooks for Go {
    fn name(&self) -> &'static str {
        "go"
    }

    fn export(&self, cx: &mut Session<'_>) -> Result<()> {
        base::export(cx)?;
        cx.sh.export("TRAVIS_GO_VERSION", version(cx.data), ExportOpts::silent());
        Ok(())
    }

    fn setup(&self, cx: &mut Session<'_>) -> Result<()> {
        base::setup(cx)?;
        let path = import_path(cx.data);
        cx.sh.cmd(format!("gvm use go{}", version(cx.data)), CmdOpts::new().echo().assert());
        cx.sh.export("GOPATH", "$HOME/gopath", ExportOpts::echoed());
        cx.sh.export("PATH", "$HOME/gopath/bin:$PATH", ExportOpts::echoed());
        cx.sh.cmd(
            format!("mkdir -p $HOME/gopath/src/{}", path),
            CmdOpts::new(),
        );
        cx.sh.cmd(
            format!("rsync -az $PWD/ $HOME/gopath/src/{}/", path),
            CmdOpts::new(),
        );
        cx.sh.export(
            "TRAVIS_BUILD_DIR",
            format!("$HOME/gopath/src/{}", path),
            ExportOpts::echoed(),
        );
        cx.sh.cmd(format!("cd $HOME/gopath/src/{}", path), CmdOpts::new().assert());
        Ok(())
    }

    fn announce(&self, cx: &mut Session<'_>) -> Result<()> {
        base::announce(cx)?;
        cx.sh.cmd("go version", CmdOpts::new().echo());
        cx.sh.cmd("go env", CmdOpts::new().echo());
        Ok(())
    }

    fn install(&self, cx: &mut Session<'_>) -> Result<()> {
        let opts = CmdOpts::new().echo().retry().timing();
        cx.sh.open_conditional("-f Makefile");
        cx.sh.echo("Makefile detected", None);
        cx.sh.else_()?;
        cx.sh.cmd("go get -d -v ./... && go build -v ./...", opts);
        cx.sh.close()
    }

    fn script(&self, cx: &mut Session<'_>) -> Result<()> {
        let opts = CmdOpts::new().echo().timing();
        cx.sh.open_conditional("-f Makefile");
        cx.sh.cmd("make", opts);
        cx.sh.else_()?;
        cx.sh.cmd("go test -v ./...", opts);
        cx.sh.close()
    }

    fn cache_slug(&self, data: &Data) -> String {
        format!("{}--go-{}", base::cache_slug(), version(data))
    }
}
