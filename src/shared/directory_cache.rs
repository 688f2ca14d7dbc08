use serde_json::Value;

use super::DirectoryCacheManager;
use crate::ast::{CmdOpts, ExportOpts};
use crate::builder::ShellBuilder;
use crate::codegen::sq;
use crate::config::Data;
use crate::error::Result;

const CASHER_URL: &str = "https://raw.githubusercontent.com/travis-ci/casher/production/bin/casher";
const CASHER: &str = "rvm 1.9.3 --fuzzy do $CASHER_DIR/bin/casher";

/// Directory caching through the `casher` helper. Archives are keyed by
/// repository, branch and the profile's cache slug.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectoryCache;

impl DirectoryCache {
    fn base_url(data: &Data) -> String {
        data.raw()
            .pointer("/cache_options/url")
            .and_then(Value::as_str)
            .unwrap_or("$TRAVIS_CACHE_URL")
            .trim_end_matches('/')
            .to_string()
    }

    /// Archive location for `branch`.
    pub fn archive_url(data: &Data, branch: &str, slug: &str) -> String {
        let repo = data.slug().unwrap_or_else(|| "unknown".to_string());
        format!("{}/{}/{}/{}.tgz", Self::base_url(data), repo, branch, slug)
    }

    fn enabled(data: &Data) -> bool {
        !data.cache_directories().is_empty()
    }
}

impl DirectoryCacheManager for DirectoryCache {
    fn fetch(&self, sh: &mut ShellBuilder, data: &Data, slug: &str) -> Result<()> {
        if !Self::enabled(data) {
            return Ok(());
        }
        let branch = data.branch().unwrap_or_else(|| "master".to_string());
        let mut urls = vec![Self::archive_url(data, &branch, slug)];
        if branch != "master" {
            urls.push(Self::archive_url(data, "master", slug));
        }
        let urls: Vec<String> = urls.iter().map(|u| sq(u)).collect();
        let dirs: Vec<String> = data.cache_directories().iter().map(|d| sq(d)).collect();

        sh.export("CASHER_DIR", "$HOME/.casher", ExportOpts::silent());
        sh.fold("cache.1", |sh| {
            sh.echo("Setting up build cache", None);
            sh.cmd(
                format!("mkdir -p $CASHER_DIR/bin && curl {} -L -o $CASHER_DIR/bin/casher -s --fail", CASHER_URL),
                CmdOpts::new().retry(),
            );
            sh.cmd("chmod +x $CASHER_DIR/bin/casher", CmdOpts::new());
            sh.cmd(format!("{} fetch {}", CASHER, urls.join(" ")), CmdOpts::new().timing());
            sh.cmd(format!("{} add {}", CASHER, dirs.join(" ")), CmdOpts::new());
            Ok(())
        })
    }

    fn push(&self, sh: &mut ShellBuilder, data: &Data, slug: &str) -> Result<()> {
        if !Self::enabled(data) || data.pull_request() {
            return Ok(());
        }
        let branch = data.branch().unwrap_or_else(|| "master".to_string());
        let url = sq(&Self::archive_url(data, &branch, slug));
        sh.cmd(format!("{} push {}", CASHER, url), CmdOpts::new().timing());
        Ok(())
    }
}
