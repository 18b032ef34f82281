use super::{solver::SolverConfig, traits::ConfigSection};
use crate::error::EquigenError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    pub solver: SolverConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), EquigenError> {
        self.solver.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), EquigenError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| EquigenError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| EquigenError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;

        *self.config.write().unwrap() = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), EquigenError> {
        let config = self.config.read().unwrap();
        let toml_str = toml::to_string_pretty(&*config)
            .map_err(|e| EquigenError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| EquigenError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config.read().unwrap().clone()
    }

    pub fn update<F>(&self, f: F) -> Result<(), EquigenError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().unwrap();
        f(&mut config);
        config.validate()?;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_toml_round_trip() {
        let manager = ConfigManager::new();
        manager
            .update(|config| {
                config.solver.population_size = 80;
                config.solver.seed = Some(7);
            })
            .unwrap();

        let toml_str = toml::to_string_pretty(&manager.get()).unwrap();
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();

        assert_eq!(parsed.solver.population_size, 80);
        assert_eq!(parsed.solver.seed, Some(7));
    }

    #[test]
    fn test_update_rejects_invalid_config() {
        let manager = ConfigManager::new();
        let result = manager.update(|config| {
            config.solver.mutation_rate = 2.0;
        });

        assert!(result.is_err());
    }
}
