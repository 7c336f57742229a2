// Routing context - the immutable input to a routing decision
//
// Everything the policy engine reads lives in this struct. The caller
// assembles it from its own collaborators (hardware profile source,
// budget ledger, health monitor) before each call; the engine never
// mutates any of it.

use serde::{Deserialize, Serialize};

use crate::errors::ContextError;

/// A processing tier a request can be dispatched to.
///
/// Variant order is the stability preference used for deterministic
/// tie-breaks: local before cloud-small before cloud-large.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Route {
    Local,
    CloudSmall,
    CloudLarge,
}

impl Route {
    /// All routes, in stability-preference order
    pub const ALL: [Route; 3] = [Route::Local, Route::CloudSmall, Route::CloudLarge];

    /// Whether this route sends data off the local device
    pub fn is_cloud(&self) -> bool {
        !matches!(self, Route::Local)
    }

    /// Short name for logging and reasoning strings
    pub fn name(&self) -> &'static str {
        match self {
            Route::Local => "local",
            Route::CloudSmall => "cloud-small",
            Route::CloudLarge => "cloud-large",
        }
    }
}

/// Interaction mode of the request being routed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Assistant,
    Coding,
    Search,
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Assistant => "assistant",
            Mode::Coding => "coding",
            Mode::Search => "search",
        }
    }
}

/// How far the caller allows request data to travel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrivacyLevel {
    /// Data must never leave the device
    LocalOnly,
    /// First-party cloud backends are acceptable
    CloudAllowed,
    /// External providers are acceptable too
    ExternalOk,
}

/// Coarse capability class of the caller's hardware
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HardwareTier {
    Light,
    Medium,
    Heavy,
}

/// Hardware available for local processing, supplied by the caller
/// (by real detection or static configuration - never probed here)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HardwareProfile {
    pub tier: HardwareTier,
    pub npu_present: bool,
    pub gpu_memory_gb: Option<f64>,
    pub ram_gb: f64,
}

impl HardwareProfile {
    /// Derive a tier from raw specs the caller already measured.
    ///
    /// This is the pure tail end of a detection pipeline: the caller reads
    /// RAM/GPU/NPU however it likes and this maps the numbers to a tier.
    pub fn classify(ram_gb: f64, gpu_memory_gb: Option<f64>, npu_present: bool) -> Self {
        let gpu = gpu_memory_gb.unwrap_or(0.0);
        let tier = if ram_gb >= 32.0 || gpu >= 12.0 || (npu_present && ram_gb >= 16.0) {
            HardwareTier::Heavy
        } else if ram_gb >= 16.0 || gpu >= 4.0 || npu_present {
            HardwareTier::Medium
        } else {
            HardwareTier::Light
        };

        Self {
            tier,
            npu_present,
            gpu_memory_gb,
            ram_gb,
        }
    }
}

/// One budget window: a spend limit and the usage accumulated against it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetWindow {
    pub limit: f64,
    pub used: f64,
}

impl BudgetWindow {
    pub fn new(limit: f64, used: f64) -> Self {
        Self { limit, used }
    }

    /// Budget left in this window, clamped at zero
    pub fn remaining(&self) -> f64 {
        (self.limit - self.used).max(0.0)
    }

    /// Fraction of the window already spent (0.0 when the limit is zero)
    pub fn utilization(&self) -> f64 {
        if self.limit <= 0.0 {
            0.0
        } else {
            (self.used / self.limit).clamp(0.0, 1.0)
        }
    }
}

/// Qualitative budget health across all windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Healthy,
    Warning,
    Critical,
}

/// Spending state per rolling period.
///
/// The engine only reads `daily.remaining()` for exclusion and cost
/// scoring; the weekly and monthly windows ride along for the caller's
/// dashboards and for `status()`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetState {
    pub daily: BudgetWindow,
    pub weekly: BudgetWindow,
    pub monthly: BudgetWindow,
}

impl BudgetState {
    /// Classify overall budget health: Critical at 90% utilization of any
    /// window, Warning at 75%, Healthy otherwise.
    pub fn status(&self) -> BudgetStatus {
        let max_util = self
            .daily
            .utilization()
            .max(self.weekly.utilization())
            .max(self.monthly.utilization());

        if max_util >= 0.90 {
            BudgetStatus::Critical
        } else if max_util >= 0.75 {
            BudgetStatus::Warning
        } else {
            BudgetStatus::Healthy
        }
    }
}

/// Health of one route-backing component, as reported by the caller's
/// health monitor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentHealth {
    Healthy,
    Degraded,
    Offline,
}

/// Health snapshot of the components each route depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SystemHealth {
    pub local_runtime: ComponentHealth,
    pub cloud_small_gateway: ComponentHealth,
    pub cloud_large_gateway: ComponentHealth,
}

impl SystemHealth {
    /// Everything up - the common case
    pub fn all_healthy() -> Self {
        Self {
            local_runtime: ComponentHealth::Healthy,
            cloud_small_gateway: ComponentHealth::Healthy,
            cloud_large_gateway: ComponentHealth::Healthy,
        }
    }

    /// Health of the component backing a given route
    pub fn for_route(&self, route: Route) -> ComponentHealth {
        match route {
            Route::Local => self.local_runtime,
            Route::CloudSmall => self.cloud_small_gateway,
            Route::CloudLarge => self.cloud_large_gateway,
        }
    }
}

/// The complete, immutable input for one routing decision
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingContext {
    pub mode: Mode,
    /// Length of the user's input, in characters
    pub input_length: u32,
    /// Size of the accumulated conversation context, in tokens
    pub context_size: u32,
    pub privacy_level: PrivacyLevel,
    pub hardware: HardwareProfile,
    pub budget: BudgetState,
    pub health: SystemHealth,
}

impl RoutingContext {
    /// Check that the context is well-formed.
    ///
    /// The engine assumes valid input and never raises; callers run this
    /// once at their boundary (e.g. after deserializing a request) before
    /// invoking `decide`.
    pub fn validate(&self) -> Result<(), ContextError> {
        for (period, window) in [
            ("daily", &self.budget.daily),
            ("weekly", &self.budget.weekly),
            ("monthly", &self.budget.monthly),
        ] {
            if window.limit < 0.0 {
                return Err(ContextError::NegativeBudgetLimit {
                    period,
                    limit: window.limit,
                });
            }
            if window.used < 0.0 {
                return Err(ContextError::NegativeBudgetUsage {
                    period,
                    used: window.used,
                });
            }
            if window.used > window.limit {
                return Err(ContextError::OverdrawnBudget {
                    period,
                    used: window.used,
                    limit: window.limit,
                });
            }
        }

        if self.hardware.ram_gb < 0.0 {
            return Err(ContextError::NegativeHardwareSpec {
                field: "ram_gb",
                value: self.hardware.ram_gb,
            });
        }
        if let Some(gpu) = self.hardware.gpu_memory_gb {
            if gpu < 0.0 {
                return Err(ContextError::NegativeHardwareSpec {
                    field: "gpu_memory_gb",
                    value: gpu,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn budget(daily_limit: f64, daily_used: f64) -> BudgetState {
        BudgetState {
            daily: BudgetWindow::new(daily_limit, daily_used),
            weekly: BudgetWindow::new(daily_limit * 5.0, daily_used),
            monthly: BudgetWindow::new(daily_limit * 20.0, daily_used),
        }
    }

    #[test]
    fn test_route_stability_order() {
        assert!(Route::Local < Route::CloudSmall);
        assert!(Route::CloudSmall < Route::CloudLarge);
    }

    #[test]
    fn test_route_serde_spelling() {
        assert_eq!(
            serde_json::to_string(&Route::CloudSmall).unwrap(),
            "\"cloud-small\""
        );
        assert_eq!(
            serde_json::from_str::<PrivacyLevel>("\"local-only\"").unwrap(),
            PrivacyLevel::LocalOnly
        );
    }

    #[test]
    fn test_remaining_clamps_at_zero() {
        // Caller bugs can hand us used > limit; remaining() still never
        // goes negative
        let window = BudgetWindow::new(2.0, 2.5);
        assert_eq!(window.remaining(), 0.0);
    }

    #[test]
    fn test_budget_status_thresholds() {
        assert_eq!(budget(2.0, 0.5).status(), BudgetStatus::Healthy);
        assert_eq!(budget(2.0, 1.5).status(), BudgetStatus::Warning);
        assert_eq!(budget(2.0, 1.9).status(), BudgetStatus::Critical);
    }

    #[test]
    fn test_status_ignores_zero_limit_windows() {
        let state = BudgetState {
            daily: BudgetWindow::new(0.0, 0.0),
            weekly: BudgetWindow::new(10.0, 1.0),
            monthly: BudgetWindow::new(40.0, 1.0),
        };
        assert_eq!(state.status(), BudgetStatus::Healthy);
    }

    #[test]
    fn test_classify_tiers() {
        assert_eq!(
            HardwareProfile::classify(8.0, None, false).tier,
            HardwareTier::Light
        );
        assert_eq!(
            HardwareProfile::classify(16.0, None, false).tier,
            HardwareTier::Medium
        );
        assert_eq!(
            HardwareProfile::classify(8.0, Some(6.0), false).tier,
            HardwareTier::Medium
        );
        assert_eq!(
            HardwareProfile::classify(64.0, Some(24.0), false).tier,
            HardwareTier::Heavy
        );
        assert_eq!(
            HardwareProfile::classify(16.0, None, true).tier,
            HardwareTier::Heavy
        );
    }

    #[test]
    fn test_validate_rejects_overdrawn_budget() {
        let ctx = RoutingContext {
            mode: Mode::Assistant,
            input_length: 10,
            context_size: 100,
            privacy_level: PrivacyLevel::CloudAllowed,
            hardware: HardwareProfile::classify(16.0, None, false),
            budget: budget(2.0, 3.0),
            health: SystemHealth::all_healthy(),
        };
        assert!(matches!(
            ctx.validate(),
            Err(ContextError::OverdrawnBudget { period: "daily", .. })
        ));
    }

    #[test]
    fn test_validate_accepts_boundary_values() {
        let ctx = RoutingContext {
            mode: Mode::Search,
            input_length: 0,
            context_size: 0,
            privacy_level: PrivacyLevel::ExternalOk,
            hardware: HardwareProfile::classify(0.0, None, false),
            budget: budget(0.0, 0.0),
            health: SystemHealth::all_healthy(),
        };
        assert!(ctx.validate().is_ok());
    }
}
