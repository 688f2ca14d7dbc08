//! Fixed stage sequence and the hook contract every profile implements.

use tracing::debug;

use crate::ast::CmdOpts;
use crate::base;
use crate::builder::ShellBuilder;
use crate::config::Data;
use crate::error::Result;
use crate::shared::Capabilities;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageKind {
    Builtin,
    Custom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Configure,
    Checkout,
    PreSetup,
    ParanoidMode,
    Export,
    Setup,
    Announce,
    BeforeInstall,
    Install,
    BeforeScript,
    Script,
    AfterResult,
    AfterScript,
}

impl Stage {
    pub const BUILTIN: [Stage; 7] = [
        Stage::Configure,
        Stage::Checkout,
        Stage::PreSetup,
        Stage::ParanoidMode,
        Stage::Export,
        Stage::Setup,
        Stage::Announce,
    ];

    pub const CUSTOM: [Stage; 6] = [
        Stage::BeforeInstall,
        Stage::Install,
        Stage::BeforeScript,
        Stage::Script,
        Stage::AfterResult,
        Stage::AfterScript,
    ];

    /// Every stage in execution order.
    pub fn all() -> impl Iterator<Item = Stage> {
        Self::BUILTIN.into_iter().chain(Self::CUSTOM)
    }

    pub fn name(self) -> &'static str {
        match self {
            Stage::Configure => "configure",
            Stage::Checkout => "checkout",
            Stage::PreSetup => "pre_setup",
            Stage::ParanoidMode => "paranoid_mode",
            Stage::Export => "export",
            Stage::Setup => "setup",
            Stage::Announce => "announce",
            Stage::BeforeInstall => "before_install",
            Stage::Install => "install",
            Stage::BeforeScript => "before_script",
            Stage::Script => "script",
            Stage::AfterResult => "after_result",
            Stage::AfterScript => "after_script",
        }
    }

    pub fn kind(self) -> StageKind {
        if Self::BUILTIN.contains(&self) {
            StageKind::Builtin
        } else {
            StageKind::Custom
        }
    }
}

/// Everything a hook can reach during one compile: the builder, the
/// resolved config and the shared collaborators.
pub struct Session<'a> {
    pub sh: &'a mut ShellBuilder,
    pub data: &'a Data,
    pub caps: &'a Capabilities,
    pub cache_slug: &'a str,
}

/// One method per stage. Builtin stages default to the shared behaviour in
/// [`crate::base`]; custom stages default to doing nothing. A profile that
/// overrides a hook and still wants the shared behaviour calls the `base`
/// function itself.
pub trait StageHooks {
    /// Language identifier the profile is registered under.
    fn name(&self) -> &'static str;

    fn configure(&self, cx: &mut Session<'_>) -> Result<()> {
        base::configure(cx)
    }

    fn checkout(&self, cx: &mut Session<'_>) -> Result<()> {
        base::checkout(cx)
    }

    fn pre_setup(&self, cx: &mut Session<'_>) -> Result<()> {
        base::pre_setup(cx)
    }

    fn paranoid_mode(&self, cx: &mut Session<'_>) -> Result<()> {
        base::paranoid_mode(cx)
    }

    fn export(&self, cx: &mut Session<'_>) -> Result<()> {
        base::export(cx)
    }

    fn setup(&self, cx: &mut Session<'_>) -> Result<()> {
        base::setup(cx)
    }

    fn announce(&self, cx: &mut Session<'_>) -> Result<()> {
        base::announce(cx)
    }

    fn before_install(&self, _cx: &mut Session<'_>) -> Result<()> {
        Ok(())
    }

    fn install(&self, _cx: &mut Session<'_>) -> Result<()> {
        Ok(())
    }

    fn before_script(&self, _cx: &mut Session<'_>) -> Result<()> {
        Ok(())
    }

    fn script(&self, _cx: &mut Session<'_>) -> Result<()> {
        Ok(())
    }

    fn after_result(&self, _cx: &mut Session<'_>) -> Result<()> {
        Ok(())
    }

    fn after_script(&self, _cx: &mut Session<'_>) -> Result<()> {
        Ok(())
    }

    /// Runs once the build is over, including after an asserted failure.
    fn finish(&self, cx: &mut Session<'_>) -> Result<()> {
        base::finish(cx)
    }

    fn cache_slug(&self, _data: &Data) -> String {
        base::cache_slug()
    }
}

pub fn run_hook(profile: &dyn StageHooks, stage: Stage, cx: &mut Session<'_>) -> Result<()> {
    match stage {
        Stage::Configure => profile.configure(cx),
        Stage::Checkout => profile.checkout(cx),
        Stage::PreSetup => profile.pre_setup(cx),
        Stage::ParanoidMode => profile.paranoid_mode(cx),
        Stage::Export => profile.export(cx),
        Stage::Setup => profile.setup(cx),
        Stage::Announce => profile.announce(cx),
        Stage::BeforeInstall => profile.before_install(cx),
        Stage::Install => profile.install(cx),
        Stage::BeforeScript => profile.before_script(cx),
        Stage::Script => profile.script(cx),
        Stage::AfterResult => profile.after_result(cx),
        Stage::AfterScript => profile.after_script(cx),
    }
}

/// Runs every stage exactly once, builtin stages first.
pub fn run(profile: &dyn StageHooks, cx: &mut Session<'_>) -> Result<()> {
    for stage in Stage::BUILTIN {
        debug!(stage = stage.name(), profile = profile.name(), "running builtin stage");
        run_hook(profile, stage, cx)?;
    }
    for stage in Stage::CUSTOM {
        debug!(stage = stage.name(), profile = profile.name(), "running custom stage");
        run_custom(profile, stage, cx)?;
    }
    Ok(())
}

fn run_custom(profile: &dyn StageHooks, stage: Stage, cx: &mut Session<'_>) -> Result<()> {
    let caps = cx.caps;
    caps.addons.run(&format!("before_{}", stage.name()), cx.sh, cx.data)?;

    if stage == Stage::AfterResult {
        after_result(profile, cx)?;
    } else if cx.data.has(stage.name()) {
        let commands = cx.data.get_list(stage.name());
        debug!(stage = stage.name(), count = commands.len(), "using commands from config");
        user_commands(stage, &commands, cx.sh)?;
    } else {
        run_hook(profile, stage, cx)?;
        if stage == Stage::Script {
            cx.sh.raw("travis_result $?");
        }
    }

    caps.addons.run(&format!("after_{}", stage.name()), cx.sh, cx.data)
}

fn user_commands(stage: Stage, commands: &[String], sh: &mut ShellBuilder) -> Result<()> {
    for (i, command) in commands.iter().enumerate() {
        match stage {
            Stage::BeforeInstall | Stage::Install | Stage::BeforeScript => {
                sh.fold(format!("{}.{}", stage.name(), i + 1), |sh| {
                    sh.cmd(command.as_str(), CmdOpts::new().echo().assert().timing());
                    Ok(())
                })?;
            }
            Stage::Script => {
                sh.cmd(command.as_str(), CmdOpts::new().echo().timing());
                sh.raw("travis_result $?");
            }
            _ => sh.cmd(command.as_str(), CmdOpts::new().echo().timing()),
        }
    }
    Ok(())
}

fn after_result(profile: &dyn StageHooks, cx: &mut Session<'_>) -> Result<()> {
    let success = cx.data.get_list("after_success");
    let failure = cx.data.get_list("after_failure");
    if success.is_empty() && failure.is_empty() {
        return profile.after_result(cx);
    }

    cx.sh.open_conditional("$TRAVIS_TEST_RESULT = 0");
    for command in &success {
        cx.sh.cmd(command.as_str(), CmdOpts::new().echo().timing());
    }
    if !failure.is_empty() {
        cx.sh.else_()?;
        for command in &failure {
            cx.sh.cmd(command.as_str(), CmdOpts::new().echo().timing());
        }
    }
    cx.sh.close()
}
