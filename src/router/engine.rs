// Routing policy engine
//
// Pure score-then-select decision function. Three passes:
// 1. Hard exclusions (privacy, offline gateways, unaffordable routes)
// 2. Weighted scoring of the survivors (capability, cost, latency, privacy)
// 3. Near-tie resolution biased toward the cheaper, safer route
//
// The engine holds only its policy config; it never mutates the context
// it is given and keeps no state between calls, so identical inputs
// always produce identical decisions.

use crate::config::PolicyConfig;

use super::context::{BudgetStatus, ComponentHealth, PrivacyLevel, Route, RoutingContext};
use super::decision::{format_currency, PrivacyImpact, RouteScore, RoutingDecision};
use super::estimates::{capability_fit, estimated_cost, estimated_latency_ms, privacy_impact};

/// Privacy-alignment factor per impact level when the caller tolerates
/// first-party cloud but nothing further
const CLOUD_ALLOWED_TOLERANCE: [(PrivacyImpact, f64); 4] = [
    (PrivacyImpact::None, 1.0),
    (PrivacyImpact::Low, 0.75),
    (PrivacyImpact::Medium, 0.5),
    (PrivacyImpact::High, 0.25),
];

/// One scored candidate, carried between the passes
#[derive(Debug, Clone, Copy)]
struct Candidate {
    route: Route,
    score: f64,
    cost: f64,
    latency_ms: f64,
    contributions: [f64; 4],
}

/// Stateless routing policy engine
#[derive(Debug, Clone)]
pub struct PolicyEngine {
    config: PolicyConfig,
}

impl Default for PolicyEngine {
    fn default() -> Self {
        Self::new(PolicyConfig::default())
    }
}

impl PolicyEngine {
    pub fn new(config: PolicyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PolicyConfig {
        &self.config
    }

    /// Decide which route should serve this request.
    ///
    /// Never fails: every well-formed context yields a decision, and the
    /// degenerate all-excluded case falls back to local processing with
    /// zero confidence.
    pub fn decide(&self, ctx: &RoutingContext) -> RoutingDecision {
        let mut reasoning = Vec::new();

        let eligible = self.exclusion_pass(ctx, &mut reasoning);

        if eligible.is_empty() {
            return self.local_fallback(ctx, reasoning);
        }

        let candidates: Vec<Candidate> = eligible
            .into_iter()
            .map(|route| self.score_route(route, ctx))
            .collect();

        let winner = self.select(&candidates, &mut reasoning);
        self.push_dominant_factors(&winner, ctx, &mut reasoning);

        let mut alternatives: Vec<RouteScore> = candidates
            .iter()
            .filter(|c| c.route != winner.route)
            .map(|c| RouteScore {
                route: c.route,
                score: c.score,
            })
            .collect();
        alternatives.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.route.cmp(&b.route))
        });

        let decision = RoutingDecision {
            recommended_route: winner.route,
            confidence: winner.score,
            estimated_cost: winner.cost,
            estimated_latency_ms: winner.latency_ms,
            privacy_impact: privacy_impact(winner.route),
            reasoning,
            alternatives,
        };

        tracing::info!(
            "Routing decision: {} (confidence: {:.2}, cost: {}, latency: {:.0}ms)",
            decision.recommended_route.name(),
            decision.confidence,
            format_currency(decision.estimated_cost),
            decision.estimated_latency_ms
        );

        decision
    }

    /// Pass 1: drop routes that are categorically unavailable.
    ///
    /// Local survives every check here: it costs nothing, exposes
    /// nothing, and is the guaranteed fallback even when its runtime is
    /// reported unhealthy.
    fn exclusion_pass(&self, ctx: &RoutingContext, reasoning: &mut Vec<String>) -> Vec<Route> {
        let mut eligible = Vec::with_capacity(Route::ALL.len());
        let remaining = ctx.budget.daily.remaining();

        if ctx.privacy_level == PrivacyLevel::LocalOnly {
            reasoning.push("local-only privacy mode forces local processing".to_string());
        }

        for route in Route::ALL {
            if route.is_cloud() {
                if ctx.privacy_level == PrivacyLevel::LocalOnly {
                    tracing::debug!("{} excluded: local-only privacy mode", route.name());
                    continue;
                }

                if ctx.health.for_route(route) == ComponentHealth::Offline {
                    reasoning.push(format!("{} gateway offline, route excluded", route.name()));
                    continue;
                }
            }

            // A route must be payable within the current period. Local is
            // free under the default pricing and so always survives, but a
            // tuned policy can price it out too.
            let cost = estimated_cost(&self.config, route, ctx);
            if cost > remaining {
                reasoning.push(format!(
                    "{} excluded: estimated cost {} exceeds remaining daily budget {}",
                    route.name(),
                    format_currency(cost),
                    format_currency(remaining)
                ));
                continue;
            }

            eligible.push(route);
        }

        eligible
    }

    /// Pass 2: weighted sum of the four normalized factors
    fn score_route(&self, route: Route, ctx: &RoutingContext) -> Candidate {
        let weights = &self.config.weights;

        let cost = estimated_cost(&self.config, route, ctx);
        let latency_ms = estimated_latency_ms(&self.config, route, ctx);

        let capability = capability_fit(&self.config, route, ctx).clamp(0.0, 1.0);
        let cost_efficiency = cost_efficiency(cost, ctx.budget.daily.remaining());
        let latency = latency_headroom(
            latency_ms,
            self.config.latency.mode_ceiling_ms.for_mode(ctx.mode),
        );
        let privacy = privacy_alignment(ctx.privacy_level, privacy_impact(route));

        let contributions = [
            weights.capability * capability,
            weights.cost * cost_efficiency,
            weights.latency * latency,
            weights.privacy * privacy,
        ];
        let score = contributions.iter().sum::<f64>().clamp(0.0, 1.0);

        Candidate {
            route,
            score,
            cost,
            latency_ms,
            contributions,
        }
    }

    /// Pass 3: pick the winner, resolving near-ties toward the cheaper
    /// route, then toward stability order (local < cloud-small <
    /// cloud-large) when costs are equal too.
    ///
    /// Candidates arrive in stability order, so "keep the incumbent on a
    /// true tie" is exactly the stability bias.
    fn select(&self, candidates: &[Candidate], reasoning: &mut Vec<String>) -> Candidate {
        let tie = &self.config.tie_break;
        let top_score = candidates
            .iter()
            .map(|c| c.score)
            .fold(f64::NEG_INFINITY, f64::max);

        let mut winner: Option<Candidate> = None;
        let mut contenders = 0usize;
        let mut min_cost = f64::INFINITY;
        let mut max_cost = f64::NEG_INFINITY;
        for candidate in candidates {
            if top_score - candidate.score >= tie.near_tie_margin {
                continue;
            }
            contenders += 1;
            min_cost = min_cost.min(candidate.cost);
            max_cost = max_cost.max(candidate.cost);
            winner = Some(match winner {
                None => *candidate,
                Some(incumbent) => {
                    if candidate.cost < incumbent.cost - tie.cost_epsilon {
                        *candidate
                    } else {
                        incumbent
                    }
                }
            });
        }

        // candidates is non-empty, so the max score always selects someone
        let winner = winner.unwrap_or(candidates[0]);

        if contenders > 1 {
            if max_cost - min_cost > tie.cost_epsilon {
                reasoning.push(format!(
                    "near-tie resolved toward {}: lower-cost route preferred",
                    winner.route.name()
                ));
            } else {
                reasoning.push(format!(
                    "near-tie resolved toward {}: stability order preferred",
                    winner.route.name()
                ));
            }
        }

        winner
    }

    /// Explain what carried the decision: the dominant weighted factor,
    /// plus the runner-up when it pulled nearly as much weight
    fn push_dominant_factors(
        &self,
        winner: &Candidate,
        ctx: &RoutingContext,
        reasoning: &mut Vec<String>,
    ) {
        let mut ranked: Vec<(usize, f64)> = winner
            .contributions
            .iter()
            .copied()
            .enumerate()
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(&b.0))
        });

        let top = ranked[0];
        reasoning.push(self.factor_message(top.0, winner, ctx));
        if ranked.len() > 1 && top.1 > 0.0 && ranked[1].1 >= 0.9 * top.1 {
            reasoning.push(self.factor_message(ranked[1].0, winner, ctx));
        }
    }

    fn factor_message(&self, factor: usize, winner: &Candidate, ctx: &RoutingContext) -> String {
        let route = winner.route.name();
        match factor {
            0 => {
                if winner.route == Route::CloudLarge
                    && (ctx.context_size as f64) >= self.config.capability.big_context_threshold
                {
                    "large context size favors higher-capacity route".to_string()
                } else {
                    format!("capability fit favors {} processing", route)
                }
            }
            1 => {
                if ctx.budget.status() != BudgetStatus::Healthy {
                    "budget remaining low, cost efficiency favored cheaper route".to_string()
                } else {
                    format!("cost efficiency favors {}", route)
                }
            }
            2 => format!(
                "latency headroom within the {} mode ceiling favors {}",
                ctx.mode.name(),
                route
            ),
            _ => format!("privacy alignment favors {}", route),
        }
    }

    /// Degenerate all-excluded case: local with zero confidence
    fn local_fallback(&self, ctx: &RoutingContext, mut reasoning: Vec<String>) -> RoutingDecision {
        reasoning.push(
            "no route satisfies all constraints; falling back to local processing".to_string(),
        );

        let decision = RoutingDecision {
            recommended_route: Route::Local,
            confidence: 0.0,
            estimated_cost: estimated_cost(&self.config, Route::Local, ctx),
            estimated_latency_ms: estimated_latency_ms(&self.config, Route::Local, ctx),
            privacy_impact: privacy_impact(Route::Local),
            reasoning,
            alternatives: Vec::new(),
        };

        tracing::info!("Routing decision: local (guaranteed fallback, confidence: 0.00)");
        decision
    }
}

/// Cost relative to remaining daily budget, inverted: cheaper scores
/// higher. A free route is always maximally efficient; with no budget
/// left, any paid route scores zero instead of dividing by zero.
fn cost_efficiency(cost: f64, remaining: f64) -> f64 {
    if cost <= 0.0 {
        1.0
    } else if remaining <= 0.0 {
        0.0
    } else {
        (1.0 - cost / remaining).clamp(0.0, 1.0)
    }
}

/// How far under the mode's acceptable ceiling the estimate stays
fn latency_headroom(latency_ms: f64, ceiling_ms: f64) -> f64 {
    if ceiling_ms <= 0.0 {
        0.0
    } else {
        (1.0 - latency_ms / ceiling_ms).clamp(0.0, 1.0)
    }
}

/// 1.0 when the route's exposure sits within the caller's tolerance;
/// partial tolerance discounts higher-impact routes
fn privacy_alignment(level: PrivacyLevel, impact: PrivacyImpact) -> f64 {
    match level {
        PrivacyLevel::ExternalOk => 1.0,
        PrivacyLevel::CloudAllowed => CLOUD_ALLOWED_TOLERANCE
            .iter()
            .find(|(i, _)| *i == impact)
            .map(|(_, score)| *score)
            .unwrap_or(0.25),
        // Only impact-free routes survive exclusion under local-only
        PrivacyLevel::LocalOnly => 1.0,
    }
}
