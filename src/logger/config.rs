/// Logger configuration: minimum level plus per-tag debug switches
use super::levels::LogLevel;
use super::tags::LogTag;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Messages above this level are dropped (Debug/Verbose have extra gates)
    pub min_level: LogLevel,
    /// Tags with debug output enabled
    pub debug_tags: HashSet<LogTag>,
    /// Prefix each line with the wall-clock time
    pub show_time: bool,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            min_level: LogLevel::Info,
            debug_tags: HashSet::new(),
            show_time: true,
        }
    }
}

impl LoggerConfig {
    /// Build a config from CLI style switches (`--debug <tag>` values and `--verbose`).
    /// Unknown tag names are returned so the caller can report them.
    pub fn from_switches<'a>(
        debug_keys: impl IntoIterator<Item = &'a str>,
        verbose: bool,
    ) -> (Self, Vec<String>) {
        let mut config = LoggerConfig::default();
        let mut unknown = Vec::new();

        for key in debug_keys {
            if key.eq_ignore_ascii_case("all") {
                config.debug_tags.extend(LogTag::ALL);
                continue;
            }
            match LogTag::from_debug_key(key) {
                Some(tag) => {
                    config.debug_tags.insert(tag);
                }
                None => unknown.push(key.to_string()),
            }
        }

        if verbose {
            config.min_level = LogLevel::Verbose;
        } else if !config.debug_tags.is_empty() {
            config.min_level = LogLevel::Debug;
        }

        (config, unknown)
    }
}

static LOGGER_CONFIG: Lazy<RwLock<LoggerConfig>> =
    Lazy::new(|| RwLock::new(LoggerConfig::default()));

pub fn get_logger_config() -> LoggerConfig {
    LOGGER_CONFIG.read().clone()
}

pub fn set_logger_config(config: LoggerConfig) {
    *LOGGER_CONFIG.write() = config;
}

pub fn is_debug_enabled_for_tag(tag: &LogTag) -> bool {
    LOGGER_CONFIG.read().debug_tags.contains(tag)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn switches_enable_debug_tags_and_report_unknown() {
        let (config, unknown) = LoggerConfig::from_switches(["swap", "Allowance", "nope"], false);
        assert!(config.debug_tags.contains(&LogTag::Swap));
        assert!(config.debug_tags.contains(&LogTag::Allowance));
        assert_eq!(config.min_level, LogLevel::Debug);
        assert_eq!(unknown, vec!["nope".to_string()]);
    }

    #[test]
    fn all_enables_every_tag_and_verbose_wins() {
        let (config, unknown) = LoggerConfig::from_switches(["all"], true);
        assert_eq!(config.debug_tags.len(), LogTag::ALL.len());
        assert_eq!(config.min_level, LogLevel::Verbose);
        assert!(unknown.is_empty());
    }
}
