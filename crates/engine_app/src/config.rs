//! Command-line configuration.

use std::path::PathBuf;

use clap::Parser;

use crate::session::TickConfig;

#[derive(Debug, Clone, Parser)]
#[command(name = "engine_app", about = "Moddable grand-strategy simulation host")]
pub struct AppConfig {
    /// Directory containing one subdirectory per mod
    #[arg(short, long, default_value = "mods")]
    pub mods_dir: PathBuf,

    /// Target ticks per second
    #[arg(short, long, default_value_t = 60.0, value_parser = parse_tick_rate)]
    pub tick_rate: f64,

    /// Stop after this many ticks (0 = run until interrupted)
    #[arg(long, default_value_t = 0)]
    pub max_ticks: u64,

    /// Initial game speed, 1 (slowest) to 5
    #[arg(short, long, value_parser = clap::value_parser!(i64).range(1..=5))]
    pub speed: Option<i64>,
}

impl AppConfig {
    /// Tick loop settings from the command line.
    #[must_use]
    pub fn tick_config(&self) -> TickConfig {
        TickConfig {
            tick_rate: self.tick_rate,
            max_ticks: self.max_ticks,
        }
    }
}

fn parse_tick_rate(raw: &str) -> Result<f64, String> {
    let rate: f64 = raw.parse().map_err(|e| format!("{e}"))?;
    if rate.is_finite() && rate > 0.0 {
        Ok(rate)
    } else {
        Err(format!("tick rate must be a positive number, got {raw}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::try_parse_from(["engine_app"]).unwrap();
        assert_eq!(config.mods_dir, PathBuf::from("mods"));
        assert_eq!(config.tick_rate, 60.0);
        assert_eq!(config.max_ticks, 0);
        assert_eq!(config.speed, None);
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::try_parse_from([
            "engine_app",
            "--mods-dir",
            "/srv/mods",
            "--tick-rate",
            "20",
            "--max-ticks",
            "100",
            "--speed",
            "4",
        ])
        .unwrap();
        assert_eq!(config.mods_dir, PathBuf::from("/srv/mods"));
        assert_eq!(config.speed, Some(4));
        let tick = config.tick_config();
        assert_eq!(tick.tick_rate, 20.0);
        assert_eq!(tick.max_ticks, 100);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(AppConfig::try_parse_from(["engine_app", "--speed", "9"]).is_err());
        assert!(AppConfig::try_parse_from(["engine_app", "--tick-rate", "0"]).is_err());
        assert!(AppConfig::try_parse_from(["engine_app", "--tick-rate", "fast"]).is_err());
    }
}
