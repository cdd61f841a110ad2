//! Monitor configuration: TOML file, then environment overrides, then validation.
//!
//! ```toml
//! camera_index = 0
//!
//! [threshold]
//! min_gray = 100
//! max_gray = 250
//!
//! [occupancy]
//! min_percentage_covered = 5.0
//! slot_rank = 1
//!
//! [colors]
//! alert = "#ff0000"
//! clear = "#00ff00"
//! occlusion = "#0000ff"
//! ```

use std::path::Path;

use image::Rgb;
use serde::Deserialize;

use crate::{
    colors::{AnnotationPalette, parse_hex_color},
    error::ConfigError,
    occupancy::{
        AnalyzerSettings, CoverageRules, DEFAULT_MAX_GRAY, DEFAULT_MIN_GRAY,
        DEFAULT_MIN_PERCENTAGE_COVERED, DEFAULT_SLOT_RANK,
    },
};

pub const CONFIG_ENV: &str = "PARKING_CONFIG";
const CAMERA_INDEX_ENV: &str = "PARKING_CAMERA_INDEX";
const MIN_PERCENTAGE_ENV: &str = "PARKING_MIN_PERCENTAGE_COVERED";
const SLOT_RANK_ENV: &str = "PARKING_SLOT_RANK";

const DEFAULT_CAMERA_INDEX: u32 = 0;

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct MonitorConfigFile {
    camera_index: Option<u32>,
    threshold: Option<ThresholdConfigFile>,
    occupancy: Option<OccupancyConfigFile>,
    colors: Option<ColorsConfigFile>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ThresholdConfigFile {
    min_gray: Option<u8>,
    max_gray: Option<u8>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct OccupancyConfigFile {
    min_percentage_covered: Option<f64>,
    slot_rank: Option<usize>,
}

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
struct ColorsConfigFile {
    alert: Option<String>,
    clear: Option<String>,
    occlusion: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonitorConfig {
    pub camera_index: u32,
    pub analyzer: AnalyzerSettings,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            camera_index: DEFAULT_CAMERA_INDEX,
            analyzer: AnalyzerSettings::default(),
        }
    }
}

impl MonitorConfig {
    /// Loads from `path`, falling back to `$PARKING_CONFIG`, then defaults.
    /// Environment overrides are applied on top.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let env_path = std::env::var_os(CONFIG_ENV);
        let path = path.or(env_path.as_deref().map(Path::new));
        let mut cfg = match path {
            Some(path) => {
                log::debug!("loading config from {}", path.display());
                let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })?;
                Self::from_toml_str(&text)?
            }
            None => Self::default(),
        };
        cfg.apply_overrides(|key| std::env::var(key).ok())?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parses a TOML document; missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let file: MonitorConfigFile = toml::from_str(text)?;
        let cfg = Self::from_file(file)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn from_file(file: MonitorConfigFile) -> Result<Self, ConfigError> {
        let threshold = file.threshold.unwrap_or_default();
        let occupancy = file.occupancy.unwrap_or_default();
        let colors = file.colors.unwrap_or_default();
        let default_palette = AnnotationPalette::default();

        Ok(Self {
            camera_index: file.camera_index.unwrap_or(DEFAULT_CAMERA_INDEX),
            analyzer: AnalyzerSettings {
                min_gray: threshold.min_gray.unwrap_or(DEFAULT_MIN_GRAY),
                max_gray: threshold.max_gray.unwrap_or(DEFAULT_MAX_GRAY),
                rules: CoverageRules {
                    slot_rank: occupancy.slot_rank.unwrap_or(DEFAULT_SLOT_RANK),
                    min_percentage_covered: occupancy
                        .min_percentage_covered
                        .unwrap_or(DEFAULT_MIN_PERCENTAGE_COVERED),
                },
                palette: AnnotationPalette {
                    alert: color_or("alert", colors.alert, default_palette.alert)?,
                    clear: color_or("clear", colors.clear, default_palette.clear)?,
                    occlusion: color_or("occlusion", colors.occlusion, default_palette.occlusion)?,
                },
            },
        })
    }

    /// Applies `PARKING_*` overrides looked up through `lookup`.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup(CAMERA_INDEX_ENV) {
            self.camera_index = parse_env(CAMERA_INDEX_ENV, &value)?;
        }
        if let Some(value) = lookup(MIN_PERCENTAGE_ENV) {
            self.analyzer.rules.min_percentage_covered = parse_env(MIN_PERCENTAGE_ENV, &value)?;
        }
        if let Some(value) = lookup(SLOT_RANK_ENV) {
            self.analyzer.rules.slot_rank = parse_env(SLOT_RANK_ENV, &value)?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let settings = &self.analyzer;
        if settings.min_gray > settings.max_gray {
            return Err(ConfigError::Invalid(format!(
                "threshold.min_gray ({}) must not exceed threshold.max_gray ({})",
                settings.min_gray, settings.max_gray
            )));
        }
        let pct = settings.rules.min_percentage_covered;
        if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
            return Err(ConfigError::Invalid(format!(
                "occupancy.min_percentage_covered must be within 0..=100, got {pct}"
            )));
        }
        Ok(())
    }
}

fn color_or(
    field: &'static str,
    value: Option<String>,
    default: Rgb<u8>,
) -> Result<Rgb<u8>, ConfigError> {
    match value {
        Some(value) => parse_hex_color(&value).map_err(|e| ConfigError::Color {
            field,
            reason: e.to_string(),
            value,
        }),
        None => Ok(default),
    }
}

fn parse_env<T: std::str::FromStr>(key: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidEnv {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    #[test]
    fn test_empty_document_yields_defaults() {
        let cfg = MonitorConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, MonitorConfig::default());
        assert_eq!(cfg.camera_index, 0);
        assert_eq!(cfg.analyzer.min_gray, 100);
        assert_eq!(cfg.analyzer.max_gray, 250);
        assert_eq!(cfg.analyzer.rules.slot_rank, 1);
        assert_eq!(cfg.analyzer.rules.min_percentage_covered, 5.0);
    }

    #[test]
    fn test_full_document() {
        let cfg = MonitorConfig::from_toml_str(
            r##"
            camera_index = 1

            [threshold]
            min_gray = 90
            max_gray = 240

            [occupancy]
            min_percentage_covered = 12.5
            slot_rank = 0

            [colors]
            alert = "#ff00ff"
            occlusion = "#123"
            "##,
        )
        .unwrap();

        assert_eq!(cfg.camera_index, 1);
        assert_eq!(cfg.analyzer.min_gray, 90);
        assert_eq!(cfg.analyzer.max_gray, 240);
        assert_eq!(cfg.analyzer.rules.min_percentage_covered, 12.5);
        assert_eq!(cfg.analyzer.rules.slot_rank, 0);
        assert_eq!(cfg.analyzer.palette.alert, Rgb([255, 0, 255]));
        assert_eq!(cfg.analyzer.palette.clear, Rgb([0, 255, 0]));
        assert_eq!(cfg.analyzer.palette.occlusion, Rgb([0x11, 0x22, 0x33]));
    }

    #[test]
    fn test_rejects_bad_documents() {
        assert!(matches!(
            MonitorConfig::from_toml_str("[threshold]\nmin_gray = 200\nmax_gray = 100"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            MonitorConfig::from_toml_str("[occupancy]\nmin_percentage_covered = 150.0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            MonitorConfig::from_toml_str("[colors]\nclear = \"greenish\""),
            Err(ConfigError::Color { field: "clear", .. })
        ));
        assert!(matches!(
            MonitorConfig::from_toml_str("[threshold]\nmin_gray = 300"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            MonitorConfig::from_toml_str("camera = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_overrides_replace_file_values() {
        let mut cfg = MonitorConfig::from_toml_str("camera_index = 2").unwrap();
        let env: HashMap<&str, &str> = HashMap::from([
            ("PARKING_CAMERA_INDEX", "4"),
            ("PARKING_MIN_PERCENTAGE_COVERED", " 7.5 "),
            ("PARKING_SLOT_RANK", "2"),
        ]);
        cfg.apply_overrides(|key| env.get(key).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(cfg.camera_index, 4);
        assert_eq!(cfg.analyzer.rules.min_percentage_covered, 7.5);
        assert_eq!(cfg.analyzer.rules.slot_rank, 2);
    }

    #[test]
    fn test_invalid_override_names_the_key() {
        let mut cfg = MonitorConfig::default();
        let err = cfg
            .apply_overrides(|key| (key == "PARKING_SLOT_RANK").then(|| "second".to_string()))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidEnv {
                key: "PARKING_SLOT_RANK",
                ..
            }
        ));
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp config");
        file.write_all(b"[occupancy]\nmin_percentage_covered = 9.0\n")
            .expect("write config");

        let cfg = MonitorConfig::load(Some(file.path())).expect("load config");
        assert_eq!(cfg.analyzer.rules.min_percentage_covered, 9.0);

        let missing = MonitorConfig::load(Some(Path::new("/nonexistent/parking.toml")));
        assert!(matches!(missing, Err(ConfigError::Read { .. })));
    }
}
