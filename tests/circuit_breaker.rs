use payin_router::circuit::monitor::CircuitMonitor;
use payin_router::circuit::state::{BreakerThresholds, CircuitState};
use payin_router::domain::endpoint::{NewEndpoint, Tier};
use payin_router::domain::request::{Outcome, PayinRequest};
use payin_router::error::EngineError;
use payin_router::registry::EndpointRegistry;
use payin_router::scoring::types::ScoreWeights;
use payin_router::service::engine::RoutingEngine;
use std::sync::Arc;

fn engine() -> RoutingEngine {
    RoutingEngine::new(
        Arc::new(EndpointRegistry::new()),
        Arc::new(CircuitMonitor::new(BreakerThresholds::default())),
        ScoreWeights::default(),
        3,
    )
}

fn endpoint(bank: &str) -> NewEndpoint {
    NewEndpoint {
        trader_id: "t1".to_string(),
        upi_address: format!("{}@ybl", bank.to_lowercase()),
        bank: bank.to_string(),
        tier: Tier::Small,
        bank_city: None,
        bank_state: None,
        daily_limit: 500_000,
        per_txn_limit: 10_000,
    }
}

fn request() -> PayinRequest {
    PayinRequest {
        amount: 3_000,
        user_city: None,
        user_state: None,
    }
}

fn run_outcomes(eng: &RoutingEngine, outcomes: &[Outcome]) {
    for outcome in outcomes {
        let s = eng.select(&request()).expect("selection while closed");
        eng.report_outcome(s.selection_id, *outcome).unwrap();
    }
}

fn bank_state(eng: &RoutingEngine, bank: &str) -> CircuitState {
    eng.circuit_status()
        .into_iter()
        .find(|r| r.bank == bank)
        .map(|r| r.state)
        .unwrap()
}

#[test]
fn six_outcomes_two_failures_opens_bank() {
    let eng = engine();
    eng.registry.insert(endpoint("HDFC"), chrono::Utc::now());
    eng.registry.insert(endpoint("HDFC"), chrono::Utc::now());

    use Outcome::{Completed as C, Failed as F};
    run_outcomes(&eng, &[C, C, F, C, C, F]); // 2/6 = 33% > 30%

    assert_eq!(bank_state(&eng, "HDFC"), CircuitState::Open);
    // Every endpoint of the bank is now ineligible, healthy or not.
    assert!(matches!(
        eng.select(&request()),
        Err(EngineError::NoEligibleEndpoint)
    ));
    // The open circuit raised an unacknowledged alert.
    let alerts = eng.alerts.list(false);
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].bank, "HDFC");
}

#[test]
fn below_min_samples_never_opens() {
    let eng = engine();
    eng.registry.insert(endpoint("HDFC"), chrono::Utc::now());

    use Outcome::Failed as F;
    run_outcomes(&eng, &[F, F, F, F]); // 100% failure but only 4 samples

    assert_eq!(bank_state(&eng, "HDFC"), CircuitState::Closed);
    assert!(eng.select(&request()).is_ok());
}

#[test]
fn other_banks_unaffected_by_open_circuit() {
    let eng = engine();
    eng.registry.insert(endpoint("HDFC"), chrono::Utc::now());
    let axis = eng.registry.insert(endpoint("AXIS"), chrono::Utc::now());

    // Drive HDFC open with direct monitor feedback so AXIS sees no traffic.
    for _ in 0..5 {
        eng.monitor.record_outcome("HDFC", false, false, chrono::Utc::now());
    }
    assert_eq!(bank_state(&eng, "HDFC"), CircuitState::Open);

    let s = eng.select(&request()).unwrap();
    assert_eq!(s.endpoint_id, axis.id);
}

#[test]
fn cooldown_then_successful_probe_closes() {
    let eng = engine();
    eng.registry.insert(endpoint("HDFC"), chrono::Utc::now());

    use Outcome::Failed as F;
    run_outcomes(&eng, &[F, F, F, F, F]);
    assert_eq!(bank_state(&eng, "HDFC"), CircuitState::Open);

    // Cooldown has not elapsed: still open.
    eng.tick_breakers(chrono::Utc::now() + chrono::Duration::minutes(5));
    assert_eq!(bank_state(&eng, "HDFC"), CircuitState::Open);

    eng.tick_breakers(chrono::Utc::now() + chrono::Duration::minutes(11));
    assert_eq!(bank_state(&eng, "HDFC"), CircuitState::HalfOpen);

    let probe = eng.select(&request()).expect("half-open admits one probe");
    eng.report_outcome(probe.selection_id, Outcome::Completed).unwrap();

    let status = eng
        .circuit_status()
        .into_iter()
        .find(|r| r.bank == "HDFC")
        .unwrap();
    assert_eq!(status.state, CircuitState::Closed);
    // Window reset with the close.
    assert!((status.failure_rate - 0.0).abs() < f64::EPSILON);
}

#[test]
fn failed_probe_reopens() {
    let eng = engine();
    eng.registry.insert(endpoint("HDFC"), chrono::Utc::now());

    use Outcome::Failed as F;
    run_outcomes(&eng, &[F, F, F, F, F]);
    eng.tick_breakers(chrono::Utc::now() + chrono::Duration::minutes(11));

    let probe = eng.select(&request()).unwrap();
    eng.report_outcome(probe.selection_id, Outcome::Failed).unwrap();
    assert_eq!(bank_state(&eng, "HDFC"), CircuitState::Open);
}

#[test]
fn half_open_admits_a_single_probe() {
    let eng = engine();
    eng.registry.insert(endpoint("HDFC"), chrono::Utc::now());
    eng.registry.insert(endpoint("HDFC"), chrono::Utc::now());

    use Outcome::Failed as F;
    run_outcomes(&eng, &[F, F, F, F, F]);
    eng.tick_breakers(chrono::Utc::now() + chrono::Duration::minutes(11));

    let _probe = eng.select(&request()).expect("first probe admitted");
    // Second endpoint is free but the probe slot is taken.
    assert!(matches!(
        eng.select(&request()),
        Err(EngineError::NoEligibleEndpoint)
    ));
}

#[test]
fn expired_probe_frees_the_slot() {
    let eng = engine();
    eng.registry.insert(endpoint("HDFC"), chrono::Utc::now());

    use Outcome::Failed as F;
    run_outcomes(&eng, &[F, F, F, F, F]);
    eng.tick_breakers(chrono::Utc::now() + chrono::Duration::minutes(11));

    let probe = eng.select(&request()).unwrap();
    eng.report_outcome(probe.selection_id, Outcome::Expired).unwrap();
    // Bank is still half-open and can probe again.
    assert_eq!(bank_state(&eng, "HDFC"), CircuitState::HalfOpen);
    assert!(eng.select(&request()).is_ok());
}

#[test]
fn duplicate_outcome_reports_do_not_double_count() {
    let eng = engine();
    eng.registry.insert(endpoint("HDFC"), chrono::Utc::now());

    let s = eng.select(&request()).unwrap();
    eng.report_outcome(s.selection_id, Outcome::Failed).unwrap();
    eng.report_outcome(s.selection_id, Outcome::Failed).unwrap();
    eng.report_outcome(s.selection_id, Outcome::Completed).unwrap();

    let snapshot = eng
        .monitor
        .snapshot(chrono::Utc::now())
        .into_iter()
        .find(|b| b.bank == "HDFC")
        .unwrap();
    assert_eq!(snapshot.samples_in_window, 1);
    assert!((snapshot.failure_rate - 1.0).abs() < f64::EPSILON);

    // The endpoint's own counters saw exactly one transaction too.
    let ep = eng.registry.list().into_iter().next().unwrap();
    assert_eq!(ep.total_txns, 1);
}

#[test]
fn admin_reset_restores_routing() {
    let eng = engine();
    eng.registry.insert(endpoint("HDFC"), chrono::Utc::now());

    use Outcome::Failed as F;
    run_outcomes(&eng, &[F, F, F, F, F]);
    assert!(matches!(
        eng.select(&request()),
        Err(EngineError::NoEligibleEndpoint)
    ));

    eng.reset_circuit("HDFC").unwrap();
    assert_eq!(bank_state(&eng, "HDFC"), CircuitState::Closed);
    assert!(eng.select(&request()).is_ok());
}

#[test]
fn reset_unknown_bank_errors() {
    let eng = engine();
    assert!(matches!(
        eng.reset_circuit("NOBODY"),
        Err(EngineError::UnknownBank(_))
    ));
}

#[test]
fn unknown_selection_outcome_errors() {
    let eng = engine();
    assert!(matches!(
        eng.report_outcome(uuid::Uuid::new_v4(), Outcome::Completed),
        Err(EngineError::UnknownSelection(_))
    ));
}
