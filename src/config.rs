use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::network::{DegreeDistribution, DistKind};
use crate::simulation::SimulationParams;
use crate::{elog_debug, Error, Result};

/// Network generation defaults, one value per distribution parameter so that
/// switching distributions in the UI keeps what the user typed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSettings {
    pub size: usize,
    pub distribution: DistKind,
    pub poisson_lambda: f64,
    pub exponential_beta: f64,
    pub powerlaw_alpha: f64,
    pub powerlaw_kappa: f64,
    pub constant_k: usize,
}

impl Default for NetworkSettings {
    fn default() -> Self {
        Self {
            size: 10_000,
            distribution: DistKind::Poisson,
            poisson_lambda: 5.0,
            exponential_beta: 0.3,
            powerlaw_alpha: 1.5,
            powerlaw_kappa: 10.0,
            constant_k: 5,
        }
    }
}

impl NetworkSettings {
    /// The distribution currently selected, with its parameters.
    pub fn degree_distribution(&self) -> DegreeDistribution {
        match self.distribution {
            DistKind::Poisson => DegreeDistribution::Poisson {
                lambda: self.poisson_lambda,
            },
            DistKind::Exponential => DegreeDistribution::Exponential {
                beta: self.exponential_beta,
            },
            DistKind::PowerLaw => DegreeDistribution::PowerLaw {
                alpha: self.powerlaw_alpha,
                kappa: self.powerlaw_kappa,
            },
            DistKind::Urban => DegreeDistribution::Urban,
            DistKind::Constant => DegreeDistribution::Constant {
                k: self.constant_k,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub network: NetworkSettings,
    #[serde(default)]
    pub simulation: SimulationParams,
    /// Append new simulation runs to existing results instead of replacing them.
    #[serde(default)]
    pub retain_data: bool,
    /// Fixed RNG seed for reproducible runs; entropy-seeded when absent.
    pub seed: Option<u64>,
}

impl Config {
    pub fn app_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".epinet"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::app_dir()?.join("epinet.toml"))
    }

    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        elog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            elog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(&path)?)?;
        elog_debug!(
            "Config loaded: size={} distribution={:?} sim={:?} retain_data={} seed={:?}",
            config.network.size,
            config.network.distribution,
            config.simulation.sim_type,
            config.retain_data,
            config.seed
        );
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        Self::ensure_dirs()?;
        let path = Self::config_path()?;
        fs::write(&path, toml::to_string_pretty(self)?)?;
        elog_debug!("Config saved to {}", path.display());
        Ok(())
    }

    pub fn ensure_dirs() -> Result<()> {
        let dir = Self::app_dir()?;
        if !dir.exists() {
            elog_debug!("Creating app directory: {}", dir.display());
            fs::create_dir_all(&dir)?;
        }
        Ok(())
    }
}
