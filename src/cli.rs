//! Code related to CLI things.

use clap::Parser;

/// Runs the authoritative DNS core: wire codec plus a UDP query-response
/// loop over a pluggable record store.
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to a configuration file. Falls back to the default search
    /// locations, then built-in defaults, if not given.
    pub config: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_with_no_args() {
        let cli = Cli::parse_from(["authdns-core"]);
        assert_eq!(cli.config, None);
    }

    #[test]
    fn test_cli_parses_config_path() {
        let cli = Cli::parse_from(["authdns-core", "myconfig.json"]);
        assert_eq!(cli.config, Some("myconfig.json".to_string()));
    }
}
