// Configuration module
// Public interface for routing policy loading

mod loader;
mod settings;

pub use loader::{load_policy, load_policy_from};
pub use settings::{
    CapabilityModel, LatencyModel, ModeValues, PolicyConfig, PricingTable, RoutePricing,
    ScoreWeights, TieBreakPolicy, TierValues,
};
