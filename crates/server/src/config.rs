use std::{
    fs,
    net::{IpAddr, SocketAddr},
    path::{Path, PathBuf},
};

use anyhow::Context;
use serde::Deserialize;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub bind_host: String,
    pub port: u16,
    pub log_filter: String,
    pub seed_path: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".into(),
            port: DEFAULT_PORT,
            log_filter: "info".into(),
            seed_path: None,
        }
    }
}

impl Settings {
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let ip: IpAddr = self
            .bind_host
            .parse()
            .with_context(|| format!("invalid bind host '{}'", self.bind_host))?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

#[derive(Debug, Default, Deserialize)]
struct FileSettings {
    bind_host: Option<String>,
    port: Option<u16>,
    log_filter: Option<String>,
    seed_path: Option<PathBuf>,
}

/// Defaults, then `path` if it exists, then the process environment.
pub fn load_settings(path: &Path) -> Settings {
    let mut settings = Settings::default();
    if let Ok(raw) = fs::read_to_string(path) {
        apply_file(&mut settings, &raw, path);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());
    settings
}

fn apply_file(settings: &mut Settings, raw: &str, path: &Path) {
    let file_cfg = match toml::from_str::<FileSettings>(raw) {
        Ok(cfg) => cfg,
        Err(error) => {
            warn!(path = %path.display(), %error, "ignoring unreadable config file");
            return;
        }
    };
    if let Some(v) = file_cfg.bind_host {
        settings.bind_host = v;
    }
    if let Some(v) = file_cfg.port {
        settings.port = v;
    }
    if let Some(v) = file_cfg.log_filter {
        settings.log_filter = v;
    }
    if let Some(v) = file_cfg.seed_path {
        settings.seed_path = Some(v);
    }
}

/// `PORT` is what hosting platforms set; the `APP__` names win when both are present.
fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    for key in ["PORT", "APP__PORT"] {
        if let Some(v) = lookup(key) {
            match v.trim().parse::<u16>() {
                Ok(port) => settings.port = port,
                Err(_) => warn!(key, value = %v, "ignoring invalid port"),
            }
        }
    }
    if let Some(v) = lookup("APP__BIND_HOST") {
        settings.bind_host = v;
    }
    if let Some(v) = lookup("RUST_LOG") {
        settings.log_filter = v;
    }
    if let Some(v) = lookup("APP__LOG_FILTER") {
        settings.log_filter = v;
    }
    if let Some(v) = lookup("APP__SEED_PATH") {
        settings.seed_path = Some(PathBuf::from(v));
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
