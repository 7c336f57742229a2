// Decision logging
//
// The engine reports every decision through tracing. This captures the
// output with a real subscriber and checks both the normal pick and the
// guaranteed-fallback path show up in the log stream.

use std::sync::{Arc, Mutex};

use tracing_subscriber::fmt::MakeWriter;

use waypoint::config::{PolicyConfig, RoutePricing};
use waypoint::router::{
    BudgetState, BudgetWindow, HardwareProfile, HardwareTier, Mode, PolicyEngine, PrivacyLevel,
    RoutingContext, SystemHealth,
};

/// Collects everything the subscriber writes, for assertions
#[derive(Clone, Default)]
struct LogSink(Arc<Mutex<Vec<u8>>>);

impl LogSink {
    fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

struct LogSinkWriter(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for LogSinkWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogSink {
    type Writer = LogSinkWriter;

    fn make_writer(&'a self) -> Self::Writer {
        LogSinkWriter(self.0.clone())
    }
}

fn context() -> RoutingContext {
    RoutingContext {
        mode: Mode::Assistant,
        input_length: 120,
        context_size: 2_000,
        privacy_level: PrivacyLevel::CloudAllowed,
        hardware: HardwareProfile {
            tier: HardwareTier::Medium,
            npu_present: false,
            gpu_memory_gb: None,
            ram_gb: 16.0,
        },
        budget: BudgetState {
            daily: BudgetWindow::new(2.0, 0.0),
            weekly: BudgetWindow::new(10.0, 0.0),
            monthly: BudgetWindow::new(40.0, 0.0),
        },
        health: SystemHealth::all_healthy(),
    }
}

fn capture<F: FnOnce()>(f: F) -> String {
    let sink = LogSink::default();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(sink.clone())
        .finish();

    tracing::subscriber::with_default(subscriber, f);
    sink.contents()
}

#[test]
fn test_decision_is_logged_at_info() {
    let engine = PolicyEngine::default();
    let ctx = context();

    let output = capture(|| {
        let decision = engine.decide(&ctx);
        assert!((0.0..=1.0).contains(&decision.confidence));
    });

    assert!(output.contains("Routing decision:"));
    assert!(output.contains("confidence:"));
}

#[test]
fn test_fallback_is_logged() {
    // Price local out and drain the budget so every route is excluded
    let mut config = PolicyConfig::default();
    config.pricing.local = RoutePricing {
        base: 0.5,
        per_kilotoken: 0.0,
    };
    let engine = PolicyEngine::new(config);

    let mut ctx = context();
    ctx.budget.daily = BudgetWindow::new(2.0, 2.0);

    let output = capture(|| {
        engine.decide(&ctx);
    });

    assert!(output.contains("guaranteed fallback"));
}

#[test]
fn test_privacy_exclusions_are_logged_at_debug() {
    let engine = PolicyEngine::default();
    let mut ctx = context();
    ctx.privacy_level = PrivacyLevel::LocalOnly;

    let output = capture(|| {
        engine.decide(&ctx);
    });

    assert!(output.contains("excluded: local-only privacy mode"));
}
