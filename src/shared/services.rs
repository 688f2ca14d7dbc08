use super::ServiceManager;
use crate::ast::CmdOpts;
use crate::builder::ShellBuilder;
use crate::error::Result;

/// Config names that differ from the init script they start.
const ALIASES: &[(&str, &str)] = &[
    ("hbase", "hbase-master"),
    ("memcache", "memcached"),
    ("neo4j-server", "neo4j"),
    ("rabbitmq", "rabbitmq-server"),
    ("redis", "redis-server"),
];

pub fn normalize(name: &str) -> &str {
    let lower = name.trim();
    ALIASES
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(lower))
        .map(|(_, service)| *service)
        .unwrap_or(lower)
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Services;

impl ServiceManager for Services {
    fn start(&self, services: &[String], sh: &mut ShellBuilder) -> Result<()> {
        if services.is_empty() {
            return Ok(());
        }
        sh.fold("services", |sh| {
            for name in services {
                sh.cmd(
                    format!("sudo service {} start", normalize(name)),
                    CmdOpts::new().echo(),
                );
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_map_to_init_scripts() {
        assert_eq!(normalize("redis"), "redis-server");
        assert_eq!(normalize("RabbitMQ"), "rabbitmq-server");
        assert_eq!(normalize("mysql"), "mysql");
    }
}
