// Waypoint - Hybrid local/cloud request-routing policy engine
// Library exports

// Core modules
pub mod config;
pub mod errors;
pub mod router;

pub use config::PolicyConfig;
pub use errors::ContextError;
pub use router::{PolicyEngine, Route, RoutingContext, RoutingDecision};
