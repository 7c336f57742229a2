// Per-route cost, latency, and capability estimates
//
// These are the raw inputs the scoring pass consumes. All of them are
// pure functions of the policy config and the routing context, so the
// same context always produces the same estimates.

use crate::config::PolicyConfig;

use super::context::{ComponentHealth, HardwareTier, Mode, Route, RoutingContext};
use super::decision::PrivacyImpact;

/// Combined request size in kilotokens. Input characters are folded in
/// alongside context tokens; the estimate tables are calibrated for that.
pub fn request_kilotokens(ctx: &RoutingContext) -> f64 {
    (ctx.input_length as f64 + ctx.context_size as f64) / 1000.0
}

/// Estimated dollar cost of dispatching this request to `route`
pub fn estimated_cost(config: &PolicyConfig, route: Route, ctx: &RoutingContext) -> f64 {
    let pricing = match route {
        Route::Local => config.pricing.local,
        Route::CloudSmall => config.pricing.cloud_small,
        Route::CloudLarge => config.pricing.cloud_large,
    };
    pricing.base + pricing.per_kilotoken * request_kilotokens(ctx)
}

/// Estimated end-to-end latency of `route` for this request, in ms.
///
/// Local latency depends on the hardware tier (and drops when an NPU is
/// present); a degraded backing component inflates the estimate.
pub fn estimated_latency_ms(config: &PolicyConfig, route: Route, ctx: &RoutingContext) -> f64 {
    let kilotokens = request_kilotokens(ctx);
    let latency = &config.latency;

    let mut estimate = match route {
        Route::Local => {
            let base = latency.local_base_ms.for_tier(ctx.hardware.tier);
            let raw = base + latency.local_per_kilotoken_ms * kilotokens;
            if ctx.hardware.npu_present {
                raw * latency.npu_speedup
            } else {
                raw
            }
        }
        Route::CloudSmall => {
            latency.cloud_small_base_ms + latency.cloud_small_per_kilotoken_ms * kilotokens
        }
        Route::CloudLarge => {
            latency.cloud_large_base_ms + latency.cloud_large_per_kilotoken_ms * kilotokens
        }
    };

    if ctx.health.for_route(route) == ComponentHealth::Degraded {
        estimate *= latency.degraded_multiplier;
    }

    estimate
}

/// How well `route`'s effective capacity matches this request, in [0,1]
pub fn capability_fit(config: &PolicyConfig, route: Route, ctx: &RoutingContext) -> f64 {
    let cap = &config.capability;
    let context = ctx.context_size as f64;

    match route {
        Route::Local => {
            if context > cap.local_context_capacity.for_tier(ctx.hardware.tier) {
                return cap.local_overflow_fit;
            }
            let mut fit = cap.local_base.for_tier(ctx.hardware.tier);
            if ctx.hardware.npu_present {
                fit = (fit + cap.npu_bonus).min(1.0);
            }
            fit * cap.mode_local_factor.for_mode(ctx.mode)
        }
        Route::CloudSmall => {
            if context > cap.cloud_small_context_capacity {
                cap.cloud_small_overflow_fit
            } else {
                cap.cloud_small_fit
            }
        }
        Route::CloudLarge => {
            if context >= cap.big_context_threshold {
                cap.cloud_large_big_context_fit
            } else if demanding_mode(ctx.mode) && ctx.hardware.tier != HardwareTier::Heavy {
                cap.cloud_large_escalated_fit
            } else {
                cap.cloud_large_baseline_fit
            }
        }
    }
}

/// Qualitative exposure of each route: nothing leaves the device on
/// local, the small cloud tier stays first-party, the large tier may
/// reach external providers
pub fn privacy_impact(route: Route) -> PrivacyImpact {
    match route {
        Route::Local => PrivacyImpact::None,
        Route::CloudSmall => PrivacyImpact::Low,
        Route::CloudLarge => PrivacyImpact::Medium,
    }
}

fn demanding_mode(mode: Mode) -> bool {
    matches!(mode, Mode::Coding | Mode::Search)
}
