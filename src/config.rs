use config::Config;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;

/// The main config blob: write this as a JSON file and load it and it'll
/// make things go.
#[derive(Debug, Deserialize, Serialize, Eq, PartialEq, Clone)]
pub struct ConfigFile {
    /// DNS listener address, eg `127.0.0.1:15353`.
    pub listen_addr: String,
    /// Datagram read-buffer size.
    pub read_buf_size: usize,
    /// TTL applied to store records that don't carry one of their own.
    pub default_ttl: u32,
    /// Per-request wall-clock budget, in seconds.
    pub worker_budget_secs: u64,
    /// Concurrent in-flight worker cap.
    pub max_in_flight: usize,
    /// Tracing filter level, eg "info", "debug".
    pub log_level: String,
    /// Optional path to a JSON zone file loaded into the in-memory
    /// reference store at startup.
    pub zone_file: Option<String>,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            listen_addr: "127.0.0.1:15353".to_string(),
            read_buf_size: 512,
            default_ttl: 1080,
            worker_budget_secs: 5,
            max_in_flight: 1024,
            log_level: "info".to_string(),
            zone_file: None,
        }
    }
}

impl From<Config> for ConfigFile {
    fn from(config: Config) -> Self {
        config.try_deserialize().unwrap_or_default()
    }
}

/// Default search locations when no config path is given on the CLI.
const CONFIG_LOCATIONS: [&str; 2] = ["./authdns-core.json", "~/.config/authdns-core.json"];

impl ConfigFile {
    /// Loads the configuration from `config_path`, or from the default
    /// search locations if none was given, falling back to
    /// [`ConfigFile::default`] if nothing can be found or parsed.
    pub fn try_from_path(config_path: Option<&str>) -> Result<ConfigFile, std::io::Error> {
        let file_locations: Vec<String> = match config_path {
            Some(value) => vec![value.to_owned()],
            None => CONFIG_LOCATIONS.iter().map(|x| x.to_string()).collect(),
        };

        let found_files: Vec<String> = file_locations
            .iter()
            .filter_map(|f| {
                let path = shellexpand::tilde(f).into_owned();
                match std::path::Path::new(&path).exists() {
                    false => {
                        eprintln!("Config file {path} doesn't exist, skipping.");
                        None
                    }
                    true => Some(path),
                }
            })
            .collect();

        if found_files.is_empty() {
            if config_path.is_some() {
                return Err(std::io::Error::new(
                    ErrorKind::NotFound,
                    "No configuration files found",
                ));
            }
            eprintln!("No configuration files found, using defaults.");
            return Ok(ConfigFile::default());
        }

        let config_filename = &found_files[0];
        let builder = Config::builder()
            .add_source(config::File::new(config_filename, config::FileFormat::Json))
            .add_source(config::Environment::with_prefix("authdns_core"));

        match builder.build() {
            Ok(config) => {
                eprintln!("Successfully loaded config from: {config_filename}");
                Ok(ConfigFile::from(config))
            }
            Err(err) => {
                eprintln!("Couldn't load config from {config_filename}: {err:?}");
                Err(std::io::Error::new(ErrorKind::InvalidData, err.to_string()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConfigFile::default();
        assert_eq!(config.listen_addr, "127.0.0.1:15353");
        assert_eq!(config.max_in_flight, 1024);
    }

    #[test]
    fn test_try_from_path_missing_file_errors() {
        let result = ConfigFile::try_from_path(Some("/nonexistent/authdns-core-test.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_try_from_path_loads_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"listen_addr":"0.0.0.0:5353","read_buf_size":512,"default_ttl":60,"worker_budget_secs":5,"max_in_flight":8,"log_level":"debug","zone_file":null}"#,
        )
        .unwrap();
        let config = ConfigFile::try_from_path(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.listen_addr, "0.0.0.0:5353");
        assert_eq!(config.max_in_flight, 8);
    }
}
