// Router module
// Public interface for routing decisions

mod context;
mod decision;
mod engine;
mod estimates;

pub use context::{
    BudgetState, BudgetStatus, BudgetWindow, ComponentHealth, HardwareProfile, HardwareTier, Mode,
    PrivacyLevel, Route, RoutingContext, SystemHealth,
};
pub use decision::{format_currency, format_latency_ms, PrivacyImpact, RouteScore, RoutingDecision};
pub use engine::PolicyEngine;
pub use estimates::{estimated_cost, estimated_latency_ms, privacy_impact};
