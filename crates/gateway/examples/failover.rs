//! Failover example: a flaky primary carrier, a healthy backup, and a
//! critical message that must be confirmed.
//!
//! Run with: `cargo run -p courier-gateway --example failover`

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use courier_audit::{AuditQuery, AuditStore};
use courier_audit_memory::MemoryAuditStore;
use courier_core::{DeliveryStatus, Message, Priority, SubmitReceipt};
use courier_gateway::{OrchestratorBuilder, SendError};
use courier_provider::{Provider, ProviderError};

/// A carrier whose API refuses every connection.
struct FlakyCarrier;

impl Provider for FlakyCarrier {
    fn name(&self) -> &str {
        "a-flaky"
    }

    async fn submit(&self, _message: &Message) -> Result<SubmitReceipt, ProviderError> {
        Err(ProviderError::Connection("connection refused".into()))
    }

    async fn check_status(&self, _id: &str) -> Result<DeliveryStatus, ProviderError> {
        Err(ProviderError::Connection("connection refused".into()))
    }

    async fn probe(&self) -> Result<(), ProviderError> {
        Err(ProviderError::Connection("connection refused".into()))
    }
}

/// A carrier that confirms delivery on the second status query.
#[derive(Default)]
struct SteadyCarrier {
    polls: AtomicU32,
}

impl Provider for SteadyCarrier {
    fn name(&self) -> &str {
        "b-steady"
    }

    async fn submit(&self, message: &Message) -> Result<SubmitReceipt, ProviderError> {
        println!(
            "  [b-steady] accepted {} for {} recipient(s)",
            message.id,
            message.recipients.len()
        );
        Ok(SubmitReceipt::accepted(format!("steady-{}", message.id)))
    }

    async fn check_status(&self, _id: &str) -> Result<DeliveryStatus, ProviderError> {
        if self.polls.fetch_add(1, Ordering::SeqCst) == 0 {
            Ok(DeliveryStatus::Pending)
        } else {
            Ok(DeliveryStatus::Confirmed)
        }
    }

    async fn probe(&self) -> Result<(), ProviderError> {
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    let audit = Arc::new(MemoryAuditStore::new());
    let orchestrator = OrchestratorBuilder::new()
        .provider(Arc::new(FlakyCarrier))
        .provider(Arc::new(SteadyCarrier::default()))
        .audit(Arc::clone(&audit) as Arc<dyn AuditStore>)
        .build()
        .expect("failed to build orchestrator");

    println!("=== Scenario 1: critical page, primary carrier down ===");
    let message = Message::new(
        serde_json::json!({"text": "db-01 unreachable"}),
        ["+15550100", "+15550101"],
    )
    .with_priority(Priority::Critical);

    match orchestrator.send(&message).await {
        Ok(result) => {
            println!("  status:   {:?}", result.status);
            println!("  provider: {:?}", result.chosen_provider);
            for attempt in &result.attempts {
                println!(
                    "  attempt:  {} -> {} ({} ms)",
                    attempt.provider,
                    attempt.outcome.as_str(),
                    attempt.latency_ms
                );
            }
        }
        Err(e) => println!("  send failed: {e}"),
    }
    println!();

    println!("=== Scenario 2: standard sends prefer the degraded carrier ===");
    for i in 0..3 {
        let message = Message::new(serde_json::json!({"n": i}), ["ops@example.com"])
            .with_preferred_provider("a-flaky");
        match orchestrator.send(&message).await {
            Ok(result) => println!(
                "  {} -> {:?} via {:?}",
                message.id, result.status, result.chosen_provider
            ),
            Err(SendError::PoolExhausted(result)) => {
                println!("  exhausted after {} attempt(s)", result.attempts.len());
            }
            Err(e) => println!("  send failed: {e}"),
        }
    }
    for (id, health) in orchestrator.health_snapshot() {
        println!(
            "  {id}: {} (errors: {}, avg latency: {:.1} ms)",
            health.status, health.consecutive_errors, health.average_latency_ms
        );
    }
    println!();

    orchestrator.shutdown().await;

    let page = audit
        .query(&AuditQuery::default())
        .await
        .expect("audit query failed");
    println!("=== Audit trail: {} record(s) ===", page.total);
    for record in page.records.iter().rev() {
        println!(
            "  {} {:<9} {:<18} {}",
            record.message_id,
            record.kind.to_string(),
            record.outcome,
            record.provider.as_ref().map_or("-", |p| p.as_str())
        );
    }

    let snap = orchestrator.metrics().snapshot();
    println!();
    println!("=== Metrics ===");
    println!("  Sends:               {}", snap.sends);
    println!("  Confirmed:           {}", snap.confirmed);
    println!("  Confirmed fallback:  {}", snap.confirmed_fallback);
    println!("  Failed:              {}", snap.failed);
    println!("  Attempts:            {}", snap.attempts);
}
