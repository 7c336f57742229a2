// Routing decision - the immutable output of the policy engine

use serde::{Deserialize, Serialize};

use super::context::Route;

/// Qualitative exposure level of a route, based on whether request data
/// leaves the local device
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrivacyImpact {
    None,
    Low,
    Medium,
    High,
}

impl PrivacyImpact {
    pub fn name(&self) -> &'static str {
        match self {
            PrivacyImpact::None => "none",
            PrivacyImpact::Low => "low",
            PrivacyImpact::Medium => "medium",
            PrivacyImpact::High => "high",
        }
    }
}

/// A non-recommended route and the raw score it earned
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RouteScore {
    pub route: Route,
    pub score: f64,
}

/// The engine's answer for one request.
///
/// `confidence` is the winning route's own score, not a separate
/// statistic; `alternatives` holds every other eligible route sorted
/// descending by score. The reasoning strings are ordered: exclusions
/// first, then the factors that dominated the pick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutingDecision {
    pub recommended_route: Route,
    pub confidence: f64,
    pub estimated_cost: f64,
    pub estimated_latency_ms: f64,
    pub privacy_impact: PrivacyImpact,
    pub reasoning: Vec<String>,
    pub alternatives: Vec<RouteScore>,
}

/// Format a dollar amount the way the dashboards render it
pub fn format_currency(amount: f64) -> String {
    if amount > 0.0 && amount < 0.01 {
        format!("${:.4}", amount)
    } else {
        format!("${:.2}", amount)
    }
}

/// Format a latency estimate, switching to seconds past one second
pub fn format_latency_ms(ms: f64) -> String {
    if ms >= 1000.0 {
        format!("{:.1}s", ms / 1000.0)
    } else {
        format!("{}ms", ms.round() as i64)
    }
}
