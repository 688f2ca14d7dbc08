//! Shared stage behaviour. These are the defaults behind every
//! [`StageHooks`](crate::stages::StageHooks) method; profiles that override
//! a hook call the matching function here to keep it.

use crate::ast::{Ansi, CmdOpts, ExportOpts};
use crate::error::Result;
use crate::stages::Session;

pub const DEFAULT_CACHE_SLUG: &str = "cache";

const PARANOID_LOCKDOWN: &str = "sudo -n sh -c \"sed -e 's/^%.*//' -i.bak /etc/sudoers && rm -f /etc/sudoers.d/travis && find / -perm -4000 -exec chmod a-s {} \\; 2>/dev/null\"";

pub fn configure(cx: &mut Session<'_>) -> Result<()> {
    if !cx.data.skip_resolv_updates() {
        cx.sh.cmd(
            "grep '199.91.168' /etc/resolv.conf > /dev/null || echo 'nameserver 199.91.168.70\\nnameserver 199.91.168.71' | sudo tee /etc/resolv.conf &> /dev/null",
            CmdOpts::new(),
        );
    }
    if !cx.data.skip_etc_hosts_fix() {
        cx.sh.cmd(
            "sudo sed -e 's/^\\(127\\.0\\.0\\.1.*\\)$/\\1 '`hostname`'/' -i'.bak' /etc/hosts",
            CmdOpts::new(),
        );
        cx.sh.cmd(
            "sudo bash -c 'echo \"87.98.253.108 getcomposer.org\" >> /etc/hosts'",
            CmdOpts::new(),
        );
    }
    Ok(())
}

pub fn checkout(cx: &mut Session<'_>) -> Result<()> {
    cx.caps.git.checkout(cx.sh, cx.data)
}

pub fn pre_setup(cx: &mut Session<'_>) -> Result<()> {
    if !cx.data.paranoid_mode() {
        let services = cx.data.get_list("services");
        cx.caps.services.start(&services, cx.sh)?;
    }
    if cx.data.cache("apt") {
        if let Some(host) = cx.data.apt_cache_host() {
            cx.sh.echo("Setting up APT cache", Some(Ansi::Green));
            cx.sh.cmd(
                format!(
                    "echo 'Acquire::http {{ Proxy \"{}\"; }};' | sudo tee /etc/apt/apt.conf.d/01proxy &> /dev/null",
                    host
                ),
                CmdOpts::new(),
            );
        }
    }
    cx.sh.export("PS4", "\"+ \"", ExportOpts::echoed());
    cx.caps.addons.run("after_pre_setup", cx.sh, cx.data)
}

pub fn paranoid_mode(cx: &mut Session<'_>) -> Result<()> {
    if cx.data.paranoid_mode() {
        cx.sh.newline();
        cx.sh.echo(
            "Sudo, services, addons, setuid and setgid have been disabled.",
            Some(Ansi::Green),
        );
        cx.sh.newline();
        cx.sh.cmd(PARANOID_LOCKDOWN, CmdOpts::new());
    }
    Ok(())
}

pub fn export(cx: &mut Session<'_>) -> Result<()> {
    for key in ["TRAVIS", "CI", "CONTINUOUS_INTEGRATION", "HAS_JOSH_K_SEAL_OF_APPROVAL"] {
        cx.sh.export(key, "true", ExportOpts::silent());
    }

    let groups = cx.data.env_var_groups();
    let announce = groups.iter().any(|g| g.announce);
    if announce {
        cx.sh.newline();
    }
    for group in &groups {
        if group.announce {
            cx.sh.echo(
                &format!("Setting environment variables from {}", group.source),
                Some(Ansi::Green),
            );
        }
        for var in &group.vars {
            cx.sh.export(
                var.key.as_str(),
                var.value.as_str(),
                ExportOpts {
                    echo: var.echo,
                    secure: var.secure,
                },
            );
        }
    }
    if announce {
        cx.sh.newline();
    }
    Ok(())
}

pub fn setup(cx: &mut Session<'_>) -> Result<()> {
    cx.caps.cache.fetch(cx.sh, cx.data, cx.cache_slug)
}

pub fn announce(_cx: &mut Session<'_>) -> Result<()> {
    Ok(())
}

pub fn finish(cx: &mut Session<'_>) -> Result<()> {
    cx.caps.cache.push(cx.sh, cx.data, cx.cache_slug)
}

pub fn cache_slug() -> String {
    DEFAULT_CACHE_SLUG.to_string()
}
