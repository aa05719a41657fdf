use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::IslandError;

///
/// Parameters of a SICER or SICER-DF run.
///
/// Every field has a default, so a YAML file only needs the values it changes.
///
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SicerConfig {
    /// Window width in bp.
    #[serde(default = "default_window_size")]
    pub window_size: u32,

    /// Gap tolerance in bp. Must be a multiple of the window size.
    #[serde(default = "default_gap_size")]
    pub gap_size: u32,

    /// Fragment size used to shift reads to their tag position.
    #[serde(default = "default_fragment_size")]
    pub fragment_size: u32,

    /// Fraction of the genome considered mappable.
    #[serde(default = "default_effective_genome_fraction")]
    pub effective_genome_fraction: f64,

    /// Expected number of random islands tolerated at the score threshold.
    #[serde(default = "default_e_value")]
    pub e_value: f64,

    #[serde(default = "default_false_discovery_rate")]
    pub false_discovery_rate: f64,

    /// FDR cutoff of the differential calls.
    #[serde(default = "default_false_discovery_rate")]
    pub false_discovery_rate_df: f64,

    /// Copies of an identical read kept on each strand.
    #[serde(default = "default_redundancy_threshold")]
    pub redundancy_threshold: u32,

    #[serde(default = "default_cpu")]
    pub cpu: usize,

    /// Largest P(X >= min count) of an eligible window under the null.
    #[serde(default = "default_window_pvalue")]
    pub window_pvalue: f64,

    /// Score resolution of the background model.
    #[serde(default = "default_bin_size")]
    pub bin_size: f64,

    /// Recover and window the reads of FDR-filtered islands.
    #[serde(default)]
    pub significant_reads: bool,

    #[serde(default)]
    pub show_progress: bool,

    /// Replaces the background model's minimum window count.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_window_count: Option<u32>,

    /// Replaces the background model's score threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score_threshold: Option<f64>,
}

fn default_window_size() -> u32 {
    200
}
fn default_gap_size() -> u32 {
    600
}
fn default_fragment_size() -> u32 {
    150
}
fn default_effective_genome_fraction() -> f64 {
    0.74
}
fn default_e_value() -> f64 {
    1000.0
}
fn default_false_discovery_rate() -> f64 {
    0.01
}
fn default_redundancy_threshold() -> u32 {
    1
}
fn default_cpu() -> usize {
    1
}
fn default_window_pvalue() -> f64 {
    0.20
}
fn default_bin_size() -> f64 {
    0.001
}

impl Default for SicerConfig {
    fn default() -> Self {
        SicerConfig {
            window_size: default_window_size(),
            gap_size: default_gap_size(),
            fragment_size: default_fragment_size(),
            effective_genome_fraction: default_effective_genome_fraction(),
            e_value: default_e_value(),
            false_discovery_rate: default_false_discovery_rate(),
            false_discovery_rate_df: default_false_discovery_rate(),
            redundancy_threshold: default_redundancy_threshold(),
            cpu: default_cpu(),
            window_pvalue: default_window_pvalue(),
            bin_size: default_bin_size(),
            significant_reads: false,
            show_progress: false,
            min_window_count: None,
            score_threshold: None,
        }
    }
}

impl SicerConfig {
    pub fn from_yaml(path: &Path) -> Result<Self, IslandError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_yaml(&self, path: &Path) -> Result<(), IslandError> {
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    ///
    /// Reject parameter combinations no run can use.
    ///
    pub fn validate(&self) -> Result<(), IslandError> {
        if self.window_size == 0 {
            return Err(IslandError::InvalidConfig(
                "window size must be positive".to_string(),
            ));
        }
        if self.gap_size % self.window_size != 0 {
            return Err(IslandError::InvalidConfig(format!(
                "gap size {} is not a multiple of the window size {}",
                self.gap_size, self.window_size
            )));
        }
        if !(self.effective_genome_fraction > 0.0 && self.effective_genome_fraction <= 1.0) {
            return Err(IslandError::InvalidConfig(format!(
                "effective genome fraction {} is outside (0, 1]",
                self.effective_genome_fraction
            )));
        }
        for (name, rate) in [
            ("false discovery rate", self.false_discovery_rate),
            ("differential false discovery rate", self.false_discovery_rate_df),
        ] {
            if !(rate > 0.0 && rate <= 1.0) {
                return Err(IslandError::InvalidConfig(format!(
                    "{} {} is outside (0, 1]",
                    name, rate
                )));
            }
        }
        if !(self.window_pvalue > 0.0 && self.window_pvalue < 1.0) {
            return Err(IslandError::InvalidConfig(format!(
                "window p-value {} is outside (0, 1)",
                self.window_pvalue
            )));
        }
        if !(self.e_value > 0.0) {
            return Err(IslandError::InvalidConfig(format!(
                "e-value {} must be positive",
                self.e_value
            )));
        }
        if !(self.bin_size > 0.0) {
            return Err(IslandError::InvalidConfig(format!(
                "bin size {} must be positive",
                self.bin_size
            )));
        }
        if self.cpu == 0 {
            return Err(IslandError::InvalidConfig(
                "at least one cpu is required".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[rstest]
    fn test_defaults_are_valid() {
        let config = SicerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.window_size, 200);
        assert_eq!(config.gap_size, 600);
        assert_eq!(config.effective_genome_fraction, 0.74);
    }

    #[rstest]
    fn test_from_yaml_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "window_size: 100\ngap_size: 300\ncpu: 4\nscore_threshold: 12.5").unwrap();

        let config = SicerConfig::from_yaml(file.path()).unwrap();
        assert_eq!(
            config,
            SicerConfig {
                window_size: 100,
                gap_size: 300,
                cpu: 4,
                score_threshold: Some(12.5),
                ..SicerConfig::default()
            }
        );
    }

    #[rstest]
    fn test_yaml_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let config = SicerConfig {
            e_value: 100.0,
            significant_reads: true,
            ..SicerConfig::default()
        };

        config.to_yaml(&path).unwrap();
        assert_eq!(SicerConfig::from_yaml(&path).unwrap(), config);
    }

    #[rstest]
    fn test_malformed_yaml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "window_size: [1, 2").unwrap();
        assert!(matches!(
            SicerConfig::from_yaml(file.path()),
            Err(IslandError::ConfigParseError(_))
        ));
    }

    #[rstest]
    #[case(SicerConfig { window_size: 0, ..SicerConfig::default() })]
    #[case(SicerConfig { gap_size: 500, ..SicerConfig::default() })]
    #[case(SicerConfig { effective_genome_fraction: 1.5, ..SicerConfig::default() })]
    #[case(SicerConfig { false_discovery_rate: 0.0, ..SicerConfig::default() })]
    #[case(SicerConfig { false_discovery_rate_df: 2.0, ..SicerConfig::default() })]
    #[case(SicerConfig { window_pvalue: 1.0, ..SicerConfig::default() })]
    #[case(SicerConfig { cpu: 0, ..SicerConfig::default() })]
    fn test_invalid_config(#[case] config: SicerConfig) {
        assert!(matches!(
            config.validate(),
            Err(IslandError::InvalidConfig(_))
        ));
    }
}
