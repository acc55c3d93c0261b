use std::env;

/// Config holds all application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub db_max_connections: u32,
    pub listen_addr: String,
    pub templates_dir: String,
    pub ssh_timeout_secs: u64,
    pub acl_alias_command: String,
    pub vlan_pool: String,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn load() -> Self {
        Self {
            db_path: get_env("DB_PATH", "/data/service-packs.db"),
            db_max_connections: get_env("DB_MAX_CONNECTIONS", "5")
                .parse()
                .unwrap_or(5),
            listen_addr: get_env("LISTEN_ADDR", "0.0.0.0:8080"),
            templates_dir: get_env("TEMPLATES_DIR", "/configs/templates"),
            ssh_timeout_secs: get_env("SSH_TIMEOUT_SECS", "30")
                .parse()
                .unwrap_or(30),
            acl_alias_command: get_env(
                "ACL_ALIAS_COMMAND",
                "access-list 199 permit tcp any any eq ?",
            ),
            vlan_pool: get_env("VLAN_POOL", "vlans"),
        }
    }
}

fn get_env(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}
