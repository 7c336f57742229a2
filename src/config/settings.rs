// Policy configuration structs
//
// Every constant the scoring algorithm uses lives here so deployments can
// tune routing behavior without a rebuild. The defaults are the shipped
// policy; a partial TOML file overrides only the sections it names.

use serde::{Deserialize, Serialize};

use crate::router::{HardwareTier, Mode};

/// One value per hardware tier
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TierValues {
    pub light: f64,
    pub medium: f64,
    pub heavy: f64,
}

impl TierValues {
    pub fn for_tier(&self, tier: HardwareTier) -> f64 {
        match tier {
            HardwareTier::Light => self.light,
            HardwareTier::Medium => self.medium,
            HardwareTier::Heavy => self.heavy,
        }
    }
}

/// One value per interaction mode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModeValues {
    pub assistant: f64,
    pub coding: f64,
    pub search: f64,
}

impl ModeValues {
    pub fn for_mode(&self, mode: Mode) -> f64 {
        match mode {
            Mode::Assistant => self.assistant,
            Mode::Coding => self.coding,
            Mode::Search => self.search,
        }
    }
}

/// Weights of the four scoring factors. Must sum to 1.0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub capability: f64,
    pub cost: f64,
    pub latency: f64,
    pub privacy: f64,
}

impl ScoreWeights {
    pub fn sum(&self) -> f64 {
        self.capability + self.cost + self.latency + self.privacy
    }
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            capability: 0.35,
            cost: 0.25,
            latency: 0.20,
            privacy: 0.20,
        }
    }
}

/// Price model for one route: flat dispatch cost plus a per-kilotoken rate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoutePricing {
    pub base: f64,
    pub per_kilotoken: f64,
}

/// Estimated prices per route, in dollars
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricingTable {
    pub local: RoutePricing,
    pub cloud_small: RoutePricing,
    pub cloud_large: RoutePricing,
}

impl Default for PricingTable {
    fn default() -> Self {
        Self {
            // Local inference has zero marginal cost
            local: RoutePricing {
                base: 0.0,
                per_kilotoken: 0.0,
            },
            cloud_small: RoutePricing {
                base: 0.012,
                per_kilotoken: 0.0004,
            },
            cloud_large: RoutePricing {
                base: 0.045,
                per_kilotoken: 0.0025,
            },
        }
    }
}

/// Latency estimation model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatencyModel {
    /// Local inference startup latency per hardware tier, in ms
    pub local_base_ms: TierValues,
    /// Multiplier applied to the local estimate when an NPU is present
    pub npu_speedup: f64,
    pub local_per_kilotoken_ms: f64,
    pub cloud_small_base_ms: f64,
    pub cloud_small_per_kilotoken_ms: f64,
    pub cloud_large_base_ms: f64,
    pub cloud_large_per_kilotoken_ms: f64,
    /// Inflation applied to a route whose backing component is degraded
    pub degraded_multiplier: f64,
    /// Acceptable latency ceiling per mode, in ms; the latency factor
    /// scores a route by how far under its mode's ceiling it stays
    pub mode_ceiling_ms: ModeValues,
}

impl Default for LatencyModel {
    fn default() -> Self {
        Self {
            local_base_ms: TierValues {
                light: 1200.0,
                medium: 450.0,
                heavy: 180.0,
            },
            npu_speedup: 0.6,
            local_per_kilotoken_ms: 40.0,
            cloud_small_base_ms: 600.0,
            cloud_small_per_kilotoken_ms: 10.0,
            cloud_large_base_ms: 1500.0,
            cloud_large_per_kilotoken_ms: 15.0,
            degraded_multiplier: 1.5,
            mode_ceiling_ms: ModeValues {
                assistant: 2000.0,
                coding: 4000.0,
                search: 8000.0,
            },
        }
    }
}

/// Capability-fit model: how well each route's capacity matches a request
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CapabilityModel {
    /// Baseline local fit per hardware tier
    pub local_base: TierValues,
    /// Added to the local baseline when an NPU is present (capped at 1.0)
    pub npu_bonus: f64,
    /// Largest context (tokens) local hardware handles well, per tier
    pub local_context_capacity: TierValues,
    /// Local fit once the context overflows the tier's capacity
    pub local_overflow_fit: f64,
    /// Mode discount on local fit; coding and search demand more capability
    pub mode_local_factor: ModeValues,
    pub cloud_small_fit: f64,
    pub cloud_small_context_capacity: f64,
    pub cloud_small_overflow_fit: f64,
    /// Cloud-large fit for small requests it would be overkill for
    pub cloud_large_baseline_fit: f64,
    /// Cloud-large fit when a demanding mode runs on weak local hardware
    pub cloud_large_escalated_fit: f64,
    /// Cloud-large fit once the context crosses the big-context threshold
    pub cloud_large_big_context_fit: f64,
    pub big_context_threshold: f64,
}

impl Default for CapabilityModel {
    fn default() -> Self {
        Self {
            local_base: TierValues {
                light: 0.35,
                medium: 0.60,
                heavy: 0.90,
            },
            npu_bonus: 0.10,
            local_context_capacity: TierValues {
                light: 4_000.0,
                medium: 16_000.0,
                heavy: 32_000.0,
            },
            local_overflow_fit: 0.10,
            mode_local_factor: ModeValues {
                assistant: 1.0,
                coding: 0.8,
                search: 0.7,
            },
            cloud_small_fit: 0.70,
            cloud_small_context_capacity: 32_000.0,
            cloud_small_overflow_fit: 0.30,
            cloud_large_baseline_fit: 0.60,
            cloud_large_escalated_fit: 0.85,
            cloud_large_big_context_fit: 0.95,
            big_context_threshold: 16_000.0,
        }
    }
}

/// Near-tie resolution thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TieBreakPolicy {
    /// Scores closer than this are a near-tie; the cheaper route wins
    pub near_tie_margin: f64,
    /// Costs closer than this count as equal; stability order wins
    pub cost_epsilon: f64,
}

impl Default for TieBreakPolicy {
    fn default() -> Self {
        Self {
            near_tie_margin: 0.02,
            cost_epsilon: 0.001,
        }
    }
}

/// Complete routing policy: weights, estimate tables, tie-break thresholds
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyConfig {
    pub weights: ScoreWeights,
    pub pricing: PricingTable,
    pub latency: LatencyModel,
    pub capability: CapabilityModel,
    pub tie_break: TieBreakPolicy,
}

impl PolicyConfig {
    /// Check the config is usable: weights in range and summing to 1.0,
    /// non-negative prices and latencies
    pub fn validate(&self) -> anyhow::Result<()> {
        let w = &self.weights;
        for (name, value) in [
            ("capability", w.capability),
            ("cost", w.cost),
            ("latency", w.latency),
            ("privacy", w.privacy),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("weight '{}' out of range [0,1]: {}", name, value);
            }
        }
        if (w.sum() - 1.0).abs() > 1e-6 {
            anyhow::bail!("scoring weights must sum to 1.0, got {}", w.sum());
        }

        for (name, pricing) in [
            ("local", self.pricing.local),
            ("cloud_small", self.pricing.cloud_small),
            ("cloud_large", self.pricing.cloud_large),
        ] {
            if pricing.base < 0.0 || pricing.per_kilotoken < 0.0 {
                anyhow::bail!("negative price for route '{}'", name);
            }
        }

        if self.tie_break.near_tie_margin < 0.0 || self.tie_break.cost_epsilon < 0.0 {
            anyhow::bail!("tie-break thresholds must be non-negative");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let config = PolicyConfig::default();
        assert!((config.weights.sum() - 1.0).abs() < 1e-9);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_skewed_weights() {
        let mut config = PolicyConfig::default();
        config.weights.capability = 0.9;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_overrides_one_section() {
        let toml_str = r#"
            [weights]
            capability = 0.40
            cost = 0.20
            latency = 0.20
            privacy = 0.20
        "#;
        let config: PolicyConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.weights.capability, 0.40);
        // Untouched sections keep their defaults
        assert_eq!(config.pricing, PricingTable::default());
        assert!(config.validate().is_ok());
    }
}
