// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

static APP: Lazy<(&str, &str, &str)> = Lazy::new(|| ("com.alphavelocity", "Budgeta", "budgeta"));

/// Cold-starting backends can take most of a minute to answer.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub cache_path: PathBuf,
    pub user: Option<String>,
    pub api_url: Option<String>,
    pub token: Option<String>,
    pub timeout: Duration,
    pub log_json: bool,
}

pub fn data_dir() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    Ok(proj.data_dir().to_path_buf())
}

fn env_nonempty(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(default)
}

fn env_bool(name: &str, default: bool) -> bool {
    env::var(name)
        .ok()
        .and_then(|v| match v.trim() {
            "1" | "true" | "TRUE" | "yes" | "YES" => Some(true),
            "0" | "false" | "FALSE" | "no" | "NO" => Some(false),
            _ => None,
        })
        .unwrap_or(default)
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let db_path = match env_nonempty("BUDGETA_DB") {
            Some(p) => PathBuf::from(p),
            None => data_dir()?.join("budgeta.sqlite"),
        };
        let cache_path = match env_nonempty("BUDGETA_CACHE") {
            Some(p) => PathBuf::from(p),
            None => data_dir()?.join("ledger-cache.json"),
        };
        Ok(Config {
            db_path,
            cache_path,
            user: env_nonempty("BUDGETA_USER"),
            api_url: env_nonempty("BUDGETA_API_URL").map(|u| u.trim_end_matches('/').to_string()),
            token: env_nonempty("BUDGETA_TOKEN"),
            timeout: Duration::from_secs(env_u64("BUDGETA_TIMEOUT_SECS", DEFAULT_TIMEOUT_SECS)),
            log_json: env_bool("BUDGETA_LOG_JSON", false),
        })
    }

    /// `--user` on the command line wins over `BUDGETA_USER`.
    pub fn with_user(mut self, user: Option<&String>) -> Self {
        if let Some(u) = user {
            self.user = Some(u.trim().to_string());
        }
        self
    }
}
