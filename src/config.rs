use crate::selector::DrawSchedule;
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use tracing::{info, warn};

pub const API_KEY_VAR: &str = "GOOGLE_MAPS_API_KEY";

/// Every section falls back to its defaults, so a config.toml only needs
/// the keys the user actually changes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
#[serde(default)]
pub struct Config {
    pub location: LocationConfig,
    pub search: SearchConfig,
    pub selector: SelectorConfig,
    pub storage: StorageConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LocationConfig {
    pub auto_locate: bool,    // Try IP geolocation when nothing is stored
    pub lookup_ip: String,    // Empty means "the address this request comes from"
    pub fallback_lat: f64,    // Map picker center before any location is set
    pub fallback_lng: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub radius_meters: u32,
    pub language: String, // Response language and the "local" review language
    pub request_timeout_seconds: u64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct SelectorConfig {
    pub interval_ms: u64,
    pub draws: u32,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct StorageConfig {
    pub path: String,
}

impl Default for LocationConfig {
    fn default() -> Self {
        LocationConfig {
            auto_locate: false,
            lookup_ip: String::new(),
            // Taipei 101
            fallback_lat: 25.0330,
            fallback_lng: 121.5654,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            radius_meters: 500,
            language: "zh-TW".to_string(),
            request_timeout_seconds: 10,
        }
    }
}

impl Default for SelectorConfig {
    fn default() -> Self {
        SelectorConfig {
            interval_ms: 100,
            draws: 11,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig {
            path: "eat_roulette.db".to_string(),
        }
    }
}

impl Config {
    /// Loads config.toml from the working directory.
    /// If it doesn't exist, writes a default one for the user to edit.
    pub fn load() -> Self {
        let config_path = "config.toml";

        match fs::read_to_string(config_path) {
            Ok(content) => match Self::parse(&content) {
                Ok(config) => return config,
                Err(e) => {
                    warn!("Failed to parse config.toml: {}. Using defaults.", e);
                    return Config::default();
                }
            },
            Err(_) => info!("No config.toml found."),
        }

        let default_config = Config::default();
        match toml::to_string_pretty(&default_config) {
            Ok(toml_string) => {
                if fs::write(config_path, toml_string).is_err() {
                    warn!("Could not write default config.toml to disk.");
                }
            }
            Err(e) => warn!("Could not serialize default config: {}", e),
        }

        info!("Loaded default configuration.");
        default_config
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn draw_schedule(&self) -> DrawSchedule {
        DrawSchedule {
            // tokio intervals reject a zero period
            interval: Duration::from_millis(self.selector.interval_ms.max(1)),
            draws: self.selector.draws.max(1),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.search.request_timeout_seconds)
    }
}

/// Reads the maps API key from the environment. Without it the search
/// features stay inert.
pub fn api_key() -> Option<String> {
    match std::env::var(API_KEY_VAR) {
        Ok(key) if !key.trim().is_empty() => Some(key.trim().to_string()),
        _ => {
            warn!("{} not set; map search is disabled.", API_KEY_VAR);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_round_trip_through_toml() {
        let text = toml::to_string_pretty(&Config::default()).unwrap();
        assert_eq!(Config::parse(&text).unwrap(), Config::default());
    }

    #[test]
    fn default_schedule_is_eleven_draws_every_100ms() {
        assert_eq!(Config::default().draw_schedule(), DrawSchedule::default());
    }

    #[test]
    fn partial_file_keeps_defaults_for_the_rest() {
        let config = Config::parse("[search]\nradius_meters = 1000\n").unwrap();
        assert_eq!(config.search.radius_meters, 1000);
        assert_eq!(config.search.language, "zh-TW");
        assert_eq!(config.selector, SelectorConfig::default());
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn zero_interval_is_clamped() {
        let config = Config::parse("[selector]\ninterval_ms = 0\ndraws = 0\n").unwrap();
        let schedule = config.draw_schedule();
        assert_eq!(schedule.interval, Duration::from_millis(1));
        assert_eq!(schedule.draws, 1);
    }
}
