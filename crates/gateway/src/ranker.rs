//! Failover ordering of candidate providers.

use std::collections::BTreeMap;

use courier_core::{HealthStatus, Message, ProviderHealth, ProviderId};

/// Order `providers` for delivery of `message`.
///
/// Down providers are dropped. The rest are ordered healthy before degraded,
/// then by ascending average latency, then by provider id so equal inputs
/// always rank the same way. A provider missing from `health` counts as
/// healthy with no latency history.
///
/// If the message names a preferred provider that is present and healthy,
/// it is moved to the front; a degraded or down preference is ignored.
///
/// This is a pure function: it reads the snapshot and never touches live
/// health state.
pub fn rank(
    providers: &[ProviderId],
    health: &BTreeMap<ProviderId, ProviderHealth>,
    message: &Message,
) -> Vec<ProviderId> {
    let key = |id: &ProviderId| -> (HealthStatus, f64) {
        health
            .get(id)
            .map_or((HealthStatus::Healthy, 0.0), |h| (h.status, h.average_latency_ms))
    };

    let mut ranked: Vec<(ProviderId, HealthStatus, f64)> = providers
        .iter()
        .map(|id| {
            let (status, latency) = key(id);
            (id.clone(), status, latency)
        })
        .filter(|(_, status, _)| *status != HealthStatus::Down)
        .collect();

    ranked.sort_by(|a, b| {
        a.1.cmp(&b.1)
            .then_with(|| a.2.total_cmp(&b.2))
            .then_with(|| a.0.cmp(&b.0))
    });
    ranked.dedup_by(|a, b| a.0 == b.0);

    let mut order: Vec<ProviderId> = ranked.into_iter().map(|(id, _, _)| id).collect();

    if let Some(preferred) = &message.preferred_provider
        && let Some(pos) = order.iter().position(|id| id == preferred)
        && key(preferred).0 == HealthStatus::Healthy
    {
        let id = order.remove(pos);
        order.insert(0, id);
    }

    order
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, status: HealthStatus, latency: f64) -> (ProviderId, ProviderHealth) {
        let mut h = ProviderHealth::new(id);
        h.status = status;
        h.average_latency_ms = latency;
        (ProviderId::new(id), h)
    }

    fn ids(names: &[&str]) -> Vec<ProviderId> {
        names.iter().map(|n| ProviderId::new(*n)).collect()
    }

    fn message() -> Message {
        Message::new(serde_json::Value::Null, ["a@example.com"])
    }

    #[test]
    fn healthy_before_degraded_then_by_latency() {
        let health = BTreeMap::from([
            entry("a", HealthStatus::Degraded, 10.0),
            entry("b", HealthStatus::Healthy, 300.0),
            entry("c", HealthStatus::Healthy, 100.0),
        ]);
        let order = rank(&ids(&["a", "b", "c"]), &health, &message());
        assert_eq!(order, ids(&["c", "b", "a"]));
    }

    #[test]
    fn down_providers_are_excluded() {
        let health = BTreeMap::from([
            entry("a", HealthStatus::Down, 1.0),
            entry("b", HealthStatus::Healthy, 50.0),
        ]);
        let order = rank(&ids(&["a", "b"]), &health, &message());
        assert_eq!(order, ids(&["b"]));
    }

    #[test]
    fn all_down_yields_empty() {
        let health = BTreeMap::from([
            entry("a", HealthStatus::Down, 1.0),
            entry("b", HealthStatus::Down, 2.0),
        ]);
        assert!(rank(&ids(&["a", "b"]), &health, &message()).is_empty());
    }

    #[test]
    fn ties_break_on_provider_id() {
        let health = BTreeMap::from([
            entry("zeta", HealthStatus::Healthy, 20.0),
            entry("alpha", HealthStatus::Healthy, 20.0),
        ]);
        let order = rank(&ids(&["zeta", "alpha"]), &health, &message());
        assert_eq!(order, ids(&["alpha", "zeta"]));
    }

    #[test]
    fn missing_health_counts_as_fresh_healthy() {
        let health = BTreeMap::from([entry("a", HealthStatus::Healthy, 40.0)]);
        let order = rank(&ids(&["a", "new"]), &health, &message());
        assert_eq!(order, ids(&["new", "a"]));
    }

    #[test]
    fn healthy_preference_moves_to_front() {
        let health = BTreeMap::from([
            entry("fast", HealthStatus::Healthy, 10.0),
            entry("slow", HealthStatus::Healthy, 900.0),
        ]);
        let msg = message().with_preferred_provider("slow");
        let order = rank(&ids(&["fast", "slow"]), &health, &msg);
        assert_eq!(order, ids(&["slow", "fast"]));
    }

    #[test]
    fn degraded_preference_is_ignored() {
        let health = BTreeMap::from([
            entry("fast", HealthStatus::Healthy, 10.0),
            entry("flaky", HealthStatus::Degraded, 1.0),
        ]);
        let msg = message().with_preferred_provider("flaky");
        let order = rank(&ids(&["fast", "flaky"]), &health, &msg);
        assert_eq!(order, ids(&["fast", "flaky"]));
    }

    #[test]
    fn down_or_unknown_preference_is_ignored() {
        let health = BTreeMap::from([
            entry("fast", HealthStatus::Healthy, 10.0),
            entry("dead", HealthStatus::Down, 1.0),
        ]);
        let msg = message().with_preferred_provider("dead");
        assert_eq!(rank(&ids(&["fast", "dead"]), &health, &msg), ids(&["fast"]));

        let msg = message().with_preferred_provider("nope");
        assert_eq!(rank(&ids(&["fast", "dead"]), &health, &msg), ids(&["fast"]));
    }

    #[test]
    fn output_is_a_subset_with_no_duplicates() {
        let health = BTreeMap::from([entry("a", HealthStatus::Healthy, 1.0)]);
        let order = rank(&ids(&["a", "b", "a"]), &health, &message());
        assert_eq!(order, ids(&["b", "a"]));
    }

    #[test]
    fn ranking_is_deterministic() {
        let health = BTreeMap::from([
            entry("a", HealthStatus::Healthy, 5.0),
            entry("b", HealthStatus::Degraded, 5.0),
            entry("c", HealthStatus::Healthy, 5.0),
        ]);
        let input = ids(&["c", "b", "a"]);
        let first = rank(&input, &health, &message());
        for _ in 0..10 {
            assert_eq!(rank(&input, &health, &message()), first);
        }
    }
}
