//! Editable parameter fields of the settings panel.

use crate::config::Config;
use crate::network::{degree, DegreeStats, DistKind, FIELD_PATH, FIELD_SIZE};
use crate::predict::{r0_from_t, t_from_r0, t_to_tcb, tcb_to_t};
use crate::simulation::{
    SimulationType, FIELD_INFECTIOUS_PERIOD, FIELD_P_ZERO, FIELD_RUNS, FIELD_TRANSMISSIBILITY,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    NetworkSize,
    Distribution,
    /// First parameter of the selected degree distribution.
    DistParam1,
    /// Second parameter (power law only).
    DistParam2,
    EdgeListPath,
    SimType,
    PZero,
    Transmissibility,
    /// Basic reproductive number; editing it sets the transmissibility for
    /// the loaded network.
    RZero,
    InfectiousPeriod,
    /// Per-day transmissibility of the chain-binomial model; editing it sets
    /// the overall transmissibility.
    DailyTransmissibility,
    Runs,
}

impl Field {
    pub const ALL: [Field; 12] = [
        Field::NetworkSize,
        Field::Distribution,
        Field::DistParam1,
        Field::DistParam2,
        Field::EdgeListPath,
        Field::SimType,
        Field::PZero,
        Field::Transmissibility,
        Field::RZero,
        Field::InfectiousPeriod,
        Field::DailyTransmissibility,
        Field::Runs,
    ];

    /// Label for the field, or `None` if it does not apply to the current
    /// settings.
    pub fn label(&self, config: &Config, stats: Option<&DegreeStats>) -> Option<&'static str> {
        let (first, second) = config.network.distribution.param_labels();
        let chain_binomial = config.simulation.sim_type == SimulationType::ChainBinomial;
        match self {
            Field::NetworkSize => Some("Network size"),
            Field::Distribution => Some("Degree distribution"),
            Field::DistParam1 => first,
            Field::DistParam2 => second,
            Field::EdgeListPath => Some("Edge list file"),
            Field::SimType => Some("Simulation type"),
            Field::PZero => Some("Patients zero"),
            Field::Transmissibility => Some("Transmissibility"),
            Field::RZero => stats.map(|_| "R0"),
            Field::InfectiousPeriod => chain_binomial.then_some("Infectious period"),
            Field::DailyTransmissibility => chain_binomial.then_some("Daily transmissibility"),
            Field::Runs => Some("Number of runs"),
        }
    }

    pub fn visible(config: &Config, stats: Option<&DegreeStats>) -> Vec<Field> {
        Self::ALL
            .into_iter()
            .filter(|f| f.label(config, stats).is_some())
            .collect()
    }

    /// Choice fields cycle on Enter instead of opening the editor.
    pub fn is_choice(&self) -> bool {
        matches!(self, Field::Distribution | Field::SimType)
    }

    /// Map a parameter name from a validation error back to its field.
    pub fn for_param(name: &str) -> Option<Field> {
        let field = match name {
            n if n == FIELD_SIZE => Field::NetworkSize,
            n if n == FIELD_PATH => Field::EdgeListPath,
            n if n == degree::FIELD_LAMBDA
                || n == degree::FIELD_BETA
                || n == degree::FIELD_ALPHA
                || n == degree::FIELD_K =>
            {
                Field::DistParam1
            }
            n if n == degree::FIELD_KAPPA => Field::DistParam2,
            n if n == FIELD_P_ZERO => Field::PZero,
            n if n == FIELD_TRANSMISSIBILITY => Field::Transmissibility,
            n if n == FIELD_INFECTIOUS_PERIOD => Field::InfectiousPeriod,
            n if n == FIELD_RUNS => Field::Runs,
            _ => return None,
        };
        Some(field)
    }

    pub fn value(&self, config: &Config, path: &str, stats: Option<&DegreeStats>) -> String {
        let net = &config.network;
        let sim = &config.simulation;
        match self {
            Field::NetworkSize => net.size.to_string(),
            Field::Distribution => net.distribution.label().to_string(),
            Field::DistParam1 => match net.distribution {
                DistKind::Poisson => net.poisson_lambda.to_string(),
                DistKind::Exponential => net.exponential_beta.to_string(),
                DistKind::PowerLaw => net.powerlaw_alpha.to_string(),
                DistKind::Constant => net.constant_k.to_string(),
                DistKind::Urban => String::new(),
            },
            Field::DistParam2 => net.powerlaw_kappa.to_string(),
            Field::EdgeListPath => path.to_string(),
            Field::SimType => sim.sim_type.label().to_string(),
            Field::PZero => sim.p_zero.to_string(),
            Field::Transmissibility => sim.transmissibility.to_string(),
            Field::RZero => stats
                .map(|stats| format!("{:.4}", r0_from_t(stats, sim.transmissibility)))
                .unwrap_or_default(),
            Field::InfectiousPeriod => sim.infectious_period.to_string(),
            Field::DailyTransmissibility => {
                format!("{:.4}", t_to_tcb(sim.transmissibility, sim.infectious_period))
            }
            Field::Runs => sim.num_runs.to_string(),
        }
    }

    /// Advance a choice field to its next option.
    pub fn cycle(&self, config: &mut Config) {
        match self {
            Field::Distribution => {
                config.network.distribution = config.network.distribution.next()
            }
            Field::SimType => config.simulation.sim_type = config.simulation.sim_type.next(),
            _ => {}
        }
    }

    /// Parse `input` into the setting behind this field. R0 and the daily
    /// transmissibility are converted and stored as the transmissibility.
    pub fn apply(
        &self,
        config: &mut Config,
        path: &mut String,
        stats: Option<&DegreeStats>,
        input: &str,
    ) -> Result<(), String> {
        let input = input.trim();
        let net = &mut config.network;
        let sim = &mut config.simulation;
        match self {
            Field::NetworkSize => net.size = parse(input)?,
            Field::DistParam1 => match net.distribution {
                DistKind::Poisson => net.poisson_lambda = parse(input)?,
                DistKind::Exponential => net.exponential_beta = parse(input)?,
                DistKind::PowerLaw => net.powerlaw_alpha = parse(input)?,
                DistKind::Constant => net.constant_k = parse(input)?,
                DistKind::Urban => {}
            },
            Field::DistParam2 => net.powerlaw_kappa = parse(input)?,
            Field::EdgeListPath => *path = input.to_string(),
            Field::PZero => sim.p_zero = parse(input)?,
            Field::Transmissibility => {
                let t: f64 = parse(input)?;
                if !(0.0..=1.0).contains(&t) {
                    return Err("must be between 0 and 1".to_string());
                }
                sim.transmissibility = t;
            }
            Field::RZero => {
                let r0: f64 = parse(input)?;
                if !(r0 >= 0.0 && r0.is_finite()) {
                    return Err("must be a non-negative number".to_string());
                }
                let stats = stats.ok_or("needs a loaded network")?;
                let t = t_from_r0(stats, r0)
                    .ok_or("no transmissibility reaches it on this network")?;
                if t > 1.0 {
                    return Err(format!(
                        "needs transmissibility {:.3}, the network supports at most R0 {:.3}",
                        t,
                        r0_from_t(stats, 1.0)
                    ));
                }
                sim.transmissibility = t;
            }
            Field::DailyTransmissibility => {
                let tcb: f64 = parse(input)?;
                if !(0.0..=1.0).contains(&tcb) {
                    return Err("must be between 0 and 1".to_string());
                }
                sim.transmissibility = tcb_to_t(tcb, sim.infectious_period);
            }
            Field::InfectiousPeriod => sim.infectious_period = parse(input)?,
            Field::Runs => sim.num_runs = parse(input)?,
            Field::Distribution | Field::SimType => {}
        }
        Ok(())
    }
}

fn parse<T: std::str::FromStr>(input: &str) -> Result<T, String> {
    input
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", input))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visible_fields_follow_settings() {
        let mut config = Config::default();
        let fields = Field::visible(&config, None);
        assert!(fields.contains(&Field::DistParam1));
        assert!(!fields.contains(&Field::DistParam2));
        assert!(!fields.contains(&Field::InfectiousPeriod));

        config.network.distribution = DistKind::PowerLaw;
        config.simulation.sim_type = SimulationType::ChainBinomial;
        let fields = Field::visible(&config, None);
        assert!(fields.contains(&Field::DistParam2));
        assert!(fields.contains(&Field::InfectiousPeriod));

        config.network.distribution = DistKind::Urban;
        assert!(!Field::visible(&config, None).contains(&Field::DistParam1));
    }

    #[test]
    fn test_apply_parses_into_selected_parameter() {
        let mut config = Config::default();
        let mut path = String::new();
        Field::DistParam1.apply(&mut config, &mut path, None, "7.5").unwrap();
        assert_eq!(config.network.poisson_lambda, 7.5);

        config.network.distribution = DistKind::Constant;
        Field::DistParam1.apply(&mut config, &mut path, None, " 3 ").unwrap();
        assert_eq!(config.network.constant_k, 3);

        Field::EdgeListPath
            .apply(&mut config, &mut path, None, "contacts.csv")
            .unwrap();
        assert_eq!(path, "contacts.csv");
    }

    #[test]
    fn test_apply_rejects_bad_input() {
        let mut config = Config::default();
        let mut path = String::new();
        assert!(Field::NetworkSize.apply(&mut config, &mut path, None, "lots").is_err());
        assert!(Field::Transmissibility
            .apply(&mut config, &mut path, None, "1.2")
            .is_err());
        assert_eq!(config.network.size, 10_000);
        assert_eq!(config.simulation.transmissibility, 0.1);
    }

    #[test]
    fn test_for_param_maps_validation_fields() {
        assert_eq!(Field::for_param(FIELD_SIZE), Some(Field::NetworkSize));
        assert_eq!(Field::for_param(degree::FIELD_KAPPA), Some(Field::DistParam2));
        assert_eq!(Field::for_param(FIELD_P_ZERO), Some(Field::PZero));
        assert_eq!(Field::for_param("nonsense"), None);
    }

    fn regular(k: usize, nodes: usize) -> DegreeStats {
        DegreeStats::from_degrees(&vec![k; nodes], k * nodes / 2)
    }

    #[test]
    fn test_r0_field_needs_a_network() {
        let mut config = Config::default();
        let stats = regular(4, 100);
        assert!(!Field::visible(&config, None).contains(&Field::RZero));
        assert!(Field::visible(&config, Some(&stats)).contains(&Field::RZero));

        let mut path = String::new();
        assert!(Field::RZero
            .apply(&mut config, &mut path, None, "1.5")
            .is_err());
        assert_eq!(config.simulation.transmissibility, 0.1);
    }

    #[test]
    fn test_r0_sets_transmissibility() {
        // k = 4: excess degree 3, so R0 = 3T.
        let stats = regular(4, 100);
        let mut config = Config::default();
        let mut path = String::new();
        assert_eq!(Field::RZero.value(&config, &path, Some(&stats)), "0.3000");

        Field::RZero
            .apply(&mut config, &mut path, Some(&stats), "1.5")
            .unwrap();
        assert!((config.simulation.transmissibility - 0.5).abs() < 1e-12);

        // R0 above 3 would need T > 1.
        assert!(Field::RZero
            .apply(&mut config, &mut path, Some(&stats), "4")
            .is_err());
        assert!(Field::RZero
            .apply(&mut config, &mut path, Some(&stats), "-1")
            .is_err());
        assert!((config.simulation.transmissibility - 0.5).abs() < 1e-12);

        // A network without excess degree cannot reach any R0.
        assert!(Field::RZero
            .apply(&mut config, &mut path, Some(&regular(1, 10)), "0.5")
            .is_err());
    }

    #[test]
    fn test_daily_transmissibility_converts() {
        let mut config = Config::default();
        let mut path = String::new();
        assert!(!Field::visible(&config, None).contains(&Field::DailyTransmissibility));

        config.simulation.sim_type = SimulationType::ChainBinomial;
        config.simulation.infectious_period = 2;
        assert!(Field::visible(&config, None).contains(&Field::DailyTransmissibility));

        // 1 - (1 - 0.5)^2 = 0.75
        Field::DailyTransmissibility
            .apply(&mut config, &mut path, None, "0.5")
            .unwrap();
        assert!((config.simulation.transmissibility - 0.75).abs() < 1e-12);
        assert_eq!(
            Field::DailyTransmissibility.value(&config, &path, None),
            "0.5000"
        );
        assert!(Field::DailyTransmissibility
            .apply(&mut config, &mut path, None, "1.5")
            .is_err());
    }

    #[test]
    fn test_cycle_choice_fields() {
        let mut config = Config::default();
        Field::Distribution.cycle(&mut config);
        assert_eq!(config.network.distribution, DistKind::Exponential);
        Field::SimType.cycle(&mut config);
        assert_eq!(config.simulation.sim_type, SimulationType::ChainBinomial);
    }
}
