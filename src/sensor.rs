//! Moisture sensor collaborator.
//!
//! The workflow depends only on the [`MoistureSource`] read operation, which
//! yields one of three outcomes per call. The simulated network reproduces the
//! failure modes of a real deployment (timeouts, corrupted hardware values)
//! behind the same interface, with all randomness confined here.

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Deserialize;

/// Outcome of a single sensor poll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorReading {
    /// A plausible moisture percentage in `[0, 100]`.
    Value(f64),
    /// No response within budget.
    Timeout,
    /// A physically impossible value reported by the hardware.
    HardwareFault(f64),
}

impl SensorReading {
    /// Classify a raw sample: anything outside `[0, 100]` is a hardware fault.
    pub fn from_raw(raw: f64) -> Self {
        if (0.0..=100.0).contains(&raw) {
            SensorReading::Value(raw)
        } else {
            SensorReading::HardwareFault(raw)
        }
    }
}

/// Produces one reading per call. Each call is independent; retrying is the
/// workflow's concern, never the source's.
pub trait MoistureSource {
    async fn read(&mut self, field_id: u32) -> SensorReading;
}

/// Failure-injection tuning for the simulated network.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationParams {
    /// Probability per poll that the sensor does not respond.
    #[serde(default = "default_timeout_rate")]
    pub timeout_rate: f64,
    /// Probability per poll of a corrupted hardware value.
    #[serde(default = "default_fault_rate")]
    pub fault_rate: f64,
    /// Half-width of the uniform noise band around the base reading.
    #[serde(default = "default_jitter")]
    pub jitter: f64,
}

fn default_timeout_rate() -> f64 {
    0.2
}

fn default_fault_rate() -> f64 {
    0.05
}

fn default_jitter() -> f64 {
    1.5
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            timeout_rate: default_timeout_rate(),
            fault_rate: default_fault_rate(),
            jitter: default_jitter(),
        }
    }
}

// Corrupted values a failing probe is known to emit.
const FAULT_VALUES: [f64; 4] = [-50.0, -99.9, 150.0, 999.0];

/// Simulated sensor network with injected timeouts and hardware faults.
pub struct SimulatedSensorNetwork {
    readings: HashMap<u32, f64>,
    params: SimulationParams,
    rng: StdRng,
}

impl SimulatedSensorNetwork {
    /// Network over the built-in demo fields, seeded from entropy.
    pub fn demo(params: SimulationParams) -> Self {
        Self::with_rng(params, StdRng::from_entropy())
    }

    /// Deterministic network for reproducible runs.
    pub fn seeded(params: SimulationParams, seed: u64) -> Self {
        Self::with_rng(params, StdRng::seed_from_u64(seed))
    }

    fn with_rng(params: SimulationParams, rng: StdRng) -> Self {
        let readings = HashMap::from([
            (1, 28.5),
            (2, 45.2),
            (12, 32.1),
            (15, 35.8),
            (20, 55.3),
        ]);
        Self {
            readings,
            params,
            rng,
        }
    }
}

impl MoistureSource for SimulatedSensorNetwork {
    async fn read(&mut self, field_id: u32) -> SensorReading {
        if self.rng.gen_range(0.0..1.0) < self.params.timeout_rate {
            return SensorReading::Timeout;
        }

        if self.rng.gen_range(0.0..1.0) < self.params.fault_rate {
            let raw = *FAULT_VALUES
                .choose(&mut self.rng)
                .expect("fault table is non-empty");
            return SensorReading::HardwareFault(raw);
        }

        // A field without an installed probe reads as a timeout.
        let Some(base) = self.readings.get(&field_id) else {
            return SensorReading::Timeout;
        };

        let jitter = self.params.jitter;
        let sample = base + self.rng.gen_range(-jitter..=jitter);
        SensorReading::from_raw(sample)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_params() -> SimulationParams {
        SimulationParams {
            timeout_rate: 0.0,
            fault_rate: 0.0,
            jitter: 1.5,
        }
    }

    #[test]
    fn from_raw_classifies_plausible_and_impossible() {
        assert_eq!(SensorReading::from_raw(0.0), SensorReading::Value(0.0));
        assert_eq!(SensorReading::from_raw(100.0), SensorReading::Value(100.0));
        assert_eq!(
            SensorReading::from_raw(-50.0),
            SensorReading::HardwareFault(-50.0)
        );
        assert_eq!(
            SensorReading::from_raw(150.0),
            SensorReading::HardwareFault(150.0)
        );
    }

    #[tokio::test]
    async fn quiet_network_reads_near_base() {
        let mut network = SimulatedSensorNetwork::seeded(quiet_params(), 7);
        for _ in 0..20 {
            match network.read(12).await {
                SensorReading::Value(v) => assert!((v - 32.1).abs() <= 1.5),
                other => panic!("expected a value, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn full_timeout_rate_always_times_out() {
        let params = SimulationParams {
            timeout_rate: 1.0,
            ..quiet_params()
        };
        let mut network = SimulatedSensorNetwork::seeded(params, 7);
        for _ in 0..10 {
            assert_eq!(network.read(12).await, SensorReading::Timeout);
        }
    }

    #[tokio::test]
    async fn full_fault_rate_yields_impossible_values() {
        let params = SimulationParams {
            fault_rate: 1.0,
            ..quiet_params()
        };
        let mut network = SimulatedSensorNetwork::seeded(params, 7);
        for _ in 0..10 {
            match network.read(12).await {
                SensorReading::HardwareFault(raw) => {
                    assert!(!(0.0..=100.0).contains(&raw));
                }
                other => panic!("expected a hardware fault, got {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn unknown_field_reads_as_timeout() {
        let mut network = SimulatedSensorNetwork::seeded(quiet_params(), 7);
        assert_eq!(network.read(999).await, SensorReading::Timeout);
    }

    #[tokio::test]
    async fn same_seed_same_sequence() {
        let params = SimulationParams::default();
        let mut a = SimulatedSensorNetwork::seeded(params.clone(), 42);
        let mut b = SimulatedSensorNetwork::seeded(params, 42);
        for _ in 0..20 {
            assert_eq!(a.read(12).await, b.read(12).await);
        }
    }

    #[test]
    fn simulation_params_defaults() {
        let params = SimulationParams::default();
        assert_eq!(params.timeout_rate, 0.2);
        assert_eq!(params.fault_rate, 0.05);
        assert_eq!(params.jitter, 1.5);
    }

    #[test]
    fn simulation_params_partial_toml() {
        let params: SimulationParams = toml::from_str("timeout_rate = 0.5").unwrap();
        assert_eq!(params.timeout_rate, 0.5);
        assert_eq!(params.fault_rate, 0.05);
    }
}
