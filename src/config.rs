use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,
    #[serde(default = "default_rules_path")]
    pub rules_path: String,
    #[serde(default = "default_database_url")]
    pub database_url: String,
}

fn default_credentials_path() -> String {
    "credentials.json".to_string()
}

fn default_rules_path() -> String {
    "rules.json".to_string()
}

fn default_database_url() -> String {
    "sqlite:grules.db?mode=rwc".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            credentials_path: default_credentials_path(),
            rules_path: default_rules_path(),
            database_url: default_database_url(),
        }
    }
}

impl Config {
    pub fn load() -> Self {
        use std::fs;
        if let Ok(content) = fs::read_to_string("settings.toml") {
            if let Ok(config) = toml::from_str(&content) {
                return config;
            }
        }
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_settings_fill_in_defaults() {
        let config: Config = toml::from_str("rules_path = \"work-rules.json\"").unwrap();
        assert_eq!(config.rules_path, "work-rules.json");
        assert_eq!(config.credentials_path, "credentials.json");
        assert_eq!(config.database_url, "sqlite:grules.db?mode=rwc");
    }

    #[test]
    fn empty_settings_are_all_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.rules_path, Config::default().rules_path);
    }
}
