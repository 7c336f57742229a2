// Error types
//
// The policy engine itself is infallible: every well-formed context yields
// a decision. The errors here belong to the caller's boundary - context
// validation before a call, and policy config loading at startup.

use thiserror::Error;

/// A malformed routing context, caught by `RoutingContext::validate`.
///
/// The engine assumes these never reach `decide`; callers report them
/// before invoking the policy.
#[derive(Debug, Error, PartialEq)]
pub enum ContextError {
    #[error("{period} budget limit is negative ({limit})")]
    NegativeBudgetLimit { period: &'static str, limit: f64 },

    #[error("{period} budget usage is negative ({used})")]
    NegativeBudgetUsage { period: &'static str, used: f64 },

    #[error("{period} budget is overdrawn: used {used} exceeds limit {limit}")]
    OverdrawnBudget {
        period: &'static str,
        used: f64,
        limit: f64,
    },

    #[error("hardware spec {field} is negative ({value})")]
    NegativeHardwareSpec { field: &'static str, value: f64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_period() {
        let err = ContextError::OverdrawnBudget {
            period: "daily",
            used: 3.0,
            limit: 2.0,
        };
        let msg = err.to_string();
        assert!(msg.contains("daily"));
        assert!(msg.contains("overdrawn"));
    }
}
