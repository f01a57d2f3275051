use serde::Deserialize;

use crate::Params;

#[derive(Debug, Deserialize)]
#[serde(default)]
#[non_exhaustive]
pub struct Config {
    pub sigma: f32,

    pub k: f32,

    pub min_size: usize,

    /// Seed for the visualization colors. Drawn from entropy when unset.
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        let params = Params::default();
        Self {
            sigma: params.sigma,
            k: params.k,
            min_size: params.min_size,
            seed: None,
        }
    }
}

impl Config {
    pub fn params(&self) -> Params {
        Params {
            sigma: self.sigma,
            k: self.k,
            min_size: self.min_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Config;

    #[test]
    fn missing_keys_use_defaults() {
        let config: Config = toml::from_str("k = 300.0").unwrap();
        assert_eq!(config.k, 300.0);
        assert_eq!(config.sigma, 0.5);
        assert_eq!(config.min_size, 20);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn reads_all_keys() {
        let config: Config = toml::from_str(
            r#"
            sigma = 0.8
            k = 1000.0
            min_size = 50
            seed = 42
            "#,
        )
        .unwrap();
        let params = config.params();
        assert_eq!(params.sigma, 0.8);
        assert_eq!(params.k, 1000.0);
        assert_eq!(params.min_size, 50);
        assert_eq!(config.seed, Some(42));
    }
}
