use cucumber::{given, then, when};
use recon_engine::{GateLedger, ReconciliationStore};

use crate::{cucumber::ReconWorld, support};

#[given(expr = "user {int} completed order {word} for {word} RUB at {int}m {int}s")]
async fn local_transaction(world: &mut ReconWorld, user_id: i64, order_id: String, value: String, min: i64, sec: i64) {
    let system = world.system_mut();
    let completed_at = support::after(system.reference_time, min, sec);
    let id = support::seed_local_transaction(&system.db, user_id, &order_id, &value, completed_at).await;
    system.orders.insert(order_id, id);
}

#[given(expr = "user {int} sees gate payout {word} for {word} RUB approved at {int}m {int}s")]
async fn approved_payout(world: &mut ReconWorld, user_id: i64, tx_id: String, value: String, min: i64, sec: i64) {
    let system = world.system_mut();
    let approved_at = support::after(system.reference_time, min, sec);
    let tx = support::seed_gate_transaction(&system.db, user_id, &tx_id, &value, Some(approved_at)).await;
    system.payouts.insert(tx_id, tx.id);
}

#[given(expr = "user {int} sees gate payout {word} for {word} RUB that is not yet approved")]
async fn pending_payout(world: &mut ReconWorld, user_id: i64, tx_id: String, value: String) {
    let system = world.system_mut();
    let tx = support::seed_gate_transaction(&system.db, user_id, &tx_id, &value, None).await;
    system.payouts.insert(tx_id, tx.id);
}

#[when(expr = "the matcher runs for user {int}")]
async fn run_matcher(world: &mut ReconWorld, user_id: i64) {
    world.system().matcher.reconcile(user_id).await.expect("Error running the matcher");
}

#[then(expr = "user {int} has {int} match(es)")]
async fn match_count(world: &mut ReconWorld, user_id: i64, count: usize) {
    let matches = world.system().db.fetch_matches_for_user(user_id).await.expect("Error fetching matches");
    assert_eq!(matches.len(), count, "Unexpected number of matches for user {user_id}");
}

#[then(expr = "order {word} is matched with payout {word}, {int} minute(s) apart")]
async fn matched_pair(world: &mut ReconWorld, order_id: String, tx_id: String, minutes: i64) {
    let system = world.system();
    let gate_tx_id = system.payouts[&tx_id];
    let record = system
        .db
        .fetch_match_for_gate_transaction(gate_tx_id)
        .await
        .expect("Error fetching match")
        .expect("Payout is not matched");
    assert_eq!(record.local_tx_id, system.orders[&order_id]);
    assert_eq!(record.time_difference, minutes);
    let link = system.db.fetch_ownership_link(record.user_id, gate_tx_id).await.expect("Error fetching link");
    assert!(link.expect("Link is missing").matched, "Ownership link is not marked as matched");
}

#[then(expr = "order {word} is processed")]
async fn order_processed(world: &mut ReconWorld, order_id: String) {
    assert!(is_processed(world, &order_id).await, "Order {order_id} should be processed");
}

#[then(expr = "order {word} is not processed")]
async fn order_unprocessed(world: &mut ReconWorld, order_id: String) {
    assert!(!is_processed(world, &order_id).await, "Order {order_id} should not be processed");
}

async fn is_processed(world: &ReconWorld, order_id: &str) -> bool {
    let system = world.system();
    let id = system.orders[order_id];
    let tx = system.db.fetch_local_transaction(id).await.expect("Error fetching local transaction");
    tx.expect("Local transaction does not exist").processed
}
