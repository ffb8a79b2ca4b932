//! INI file configuration adapter.

use crate::ports::config_port::ConfigPort;
use configparser::ini::Ini;
use std::path::Path;

pub struct FileConfigAdapter {
    config: Ini,
}

impl FileConfigAdapter {
    pub fn from_file<P: AsRef<Path>>(path: P) -> std::io::Result<Self> {
        let mut config = Ini::new();
        config.load(path).map_err(std::io::Error::other)?;
        Ok(Self { config })
    }

    pub fn from_string(content: &str) -> Result<Self, String> {
        let mut config = Ini::new();
        config.read(content.to_string())?;
        Ok(Self { config })
    }

    fn parse_bool(value: &str) -> Option<bool> {
        match value.trim().to_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Some(true),
            "false" | "no" | "off" | "0" => Some(false),
            _ => None,
        }
    }
}

impl ConfigPort for FileConfigAdapter {
    fn get_string(&self, section: &str, key: &str) -> Option<String> {
        self.config.get(section, key)
    }

    fn get_int(&self, section: &str, key: &str, default: i64) -> i64 {
        self.config
            .getint(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_double(&self, section: &str, key: &str, default: f64) -> f64 {
        self.config
            .getfloat(section, key)
            .ok()
            .flatten()
            .unwrap_or(default)
    }

    fn get_bool(&self, section: &str, key: &str, default: bool) -> bool {
        self.config
            .get(section, key)
            .as_deref()
            .and_then(Self::parse_bool)
            .unwrap_or(default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = r#"
[strategy]
ma_fast = 10
ma_slow = 20
buy_pct = 0.15

[backtest]
initial_capital = 80000
commission_pct = 0.0005

[data]
path = data/BTCUSDT_1d.csv

[live]
state_path = state.json
reject_orders = no
"#;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", content).unwrap();
        file
    }

    #[test]
    fn from_string_parses_sections() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(
            adapter.get_string("data", "path"),
            Some("data/BTCUSDT_1d.csv".to_string())
        );
        assert_eq!(adapter.get_int("strategy", "ma_slow", 0), 20);
        assert_eq!(adapter.get_double("strategy", "buy_pct", 0.0), 0.15);
        assert_eq!(adapter.get_double("backtest", "initial_capital", 0.0), 80000.0);
        assert!(!adapter.get_bool("live", "reject_orders", true));
    }

    #[test]
    fn missing_keys_return_none_or_default() {
        let adapter = FileConfigAdapter::from_string(SAMPLE).unwrap();
        assert_eq!(adapter.get_string("strategy", "missing"), None);
        assert_eq!(adapter.get_string("missing_section", "key"), None);
        assert_eq!(adapter.get_int("strategy", "ma_trend", 120), 120);
        assert_eq!(adapter.get_double("strategy", "tp1_pct", 0.08), 0.08);
        assert!(adapter.get_bool("live", "missing", true));
    }

    #[test]
    fn non_numeric_values_fall_back_to_default() {
        let adapter =
            FileConfigAdapter::from_string("[strategy]\nma_fast = ten\nbuy_pct = lots\n").unwrap();
        assert_eq!(adapter.get_int("strategy", "ma_fast", 10), 10);
        assert_eq!(adapter.get_double("strategy", "buy_pct", 0.15), 0.15);
    }

    #[test]
    fn bool_spellings() {
        let adapter = FileConfigAdapter::from_string(
            "[live]\na = true\nb = Yes\nc = 1\nd = off\ne = 0\nf = maybe\n",
        )
        .unwrap();
        assert!(adapter.get_bool("live", "a", false));
        assert!(adapter.get_bool("live", "b", false));
        assert!(adapter.get_bool("live", "c", false));
        assert!(!adapter.get_bool("live", "d", true));
        assert!(!adapter.get_bool("live", "e", true));
        assert!(adapter.get_bool("live", "f", true));
    }

    #[test]
    fn from_file_reads_config() {
        let file = create_temp_config(SAMPLE);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        assert_eq!(
            adapter.get_string("live", "state_path"),
            Some("state.json".to_string())
        );
    }

    #[test]
    fn from_file_returns_error_for_missing_file() {
        assert!(FileConfigAdapter::from_file("/nonexistent/path/config.ini").is_err());
    }
}
