//! # Correlation Flows
//!
//! Demultiplexing of shared inbound channels into per-caller outcomes:
//!
//! 1. **Scenario A**: single request, single success event
//! 2. **Scenario B**: two requests, replies in reverse order
//! 3. **Scenario C**: 10ms deadline, no reply, stray event afterwards
//! 4. **Concurrency**: many requests, shuffled replies, no cross-routing
//! 5. **Exactly-once**: duplicate and stray events change nothing

#[cfg(test)]
mod tests {
    use crate::support::backend::OrderChannels;
    use crate::support::*;
    use futures::future::join_all;
    use order_gateway::{DispatchOptions, EngineConfig, OrderEngine, Outcome};
    use rand::seq::SliceRandom;
    use serde_json::json;
    use shared_bus::MessageChannel;
    use shared_types::{CorrelationId, Envelope, OrderFailedBody, OrderSucceededBody, PlaceOrderBody};
    use std::sync::Arc;
    use std::time::Duration;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    fn attach(channels: &OrderChannels) -> Arc<OrderEngine> {
        init_test_logging();
        Arc::new(OrderEngine::attach(channels.channel_set(), EngineConfig::default()).unwrap())
    }

    fn body(order_id: &str) -> PlaceOrderBody {
        PlaceOrderBody {
            order: sample_order(order_id),
        }
    }

    // =============================================================================
    // SCENARIOS
    // =============================================================================

    #[tokio::test]
    async fn test_scenario_a_single_success() {
        let channels = OrderChannels::with_capacity(64);
        let engine = attach(&channels);
        let backend = MockOrderBackend::accepting(&channels);

        let outcome = within(engine.request(body("A1"), DispatchOptions::default()))
            .await
            .unwrap();

        match outcome {
            Outcome::Success(body) => assert_eq!(body.events, vec![accepted_event("A1")]),
            other => panic!("expected success, got {:?}", other),
        }
        assert_eq!(backend.received_count(), 1);
        assert_eq!(engine.pending_count(), 0);
        assert_eq!(engine.metrics().total_fulfilled, 1);
    }

    #[tokio::test]
    async fn test_scenario_b_replies_out_of_order() {
        let channels = OrderChannels::with_capacity(64);
        let engine = attach(&channels);
        let backend = MockOrderBackend::holding(&channels);

        let a1 = engine.dispatch(body("A1"), DispatchOptions::default()).unwrap();
        let a2 = engine.dispatch(body("A2"), DispatchOptions::default()).unwrap();
        assert!(eventually(|| backend.held_count() == 2).await);

        // A2's failure first, then A1's success
        backend.fail(a2.correlation_id().clone(), json!({"error": "OutOfStock", "reason": "W1234"}));
        backend.succeed(a1.correlation_id().clone(), vec![accepted_event("A1")]);

        assert_eq!(
            within(a1).await,
            Outcome::Success(OrderSucceededBody {
                events: vec![accepted_event("A1")]
            })
        );
        assert_eq!(
            within(a2).await,
            Outcome::Failure(OrderFailedBody {
                error: json!({"error": "OutOfStock", "reason": "W1234"})
            })
        );
        assert_eq!(engine.metrics().unknown_events, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_scenario_c_deadline_then_stray_event() {
        let channels = OrderChannels::with_capacity(64);
        let engine = attach(&channels);

        let started = tokio::time::Instant::now();
        let pending = engine
            .dispatch(
                body("C1"),
                DispatchOptions::new().with_timeout(Duration::from_millis(10)),
            )
            .unwrap();
        let id = pending.correlation_id().clone();

        assert_eq!(pending.await, Outcome::TimedOut);
        assert!(started.elapsed() >= Duration::from_millis(10));
        assert!(started.elapsed() < Duration::from_millis(20));

        channels.succeeded.send(Envelope::new(
            id,
            OrderSucceededBody {
                events: vec![accepted_event("C1")],
            },
        ));
        assert!(eventually(|| engine.metrics().late_events == 1).await);

        let metrics = engine.metrics();
        assert_eq!(metrics.total_timeouts, 1);
        assert_eq!(metrics.total_fulfilled, 0);
        assert!(engine.is_attached());
    }

    // =============================================================================
    // CONCURRENCY
    // =============================================================================

    #[tokio::test]
    async fn test_shuffled_replies_are_never_cross_routed() {
        const N: usize = 64;

        let channels = OrderChannels::with_capacity(256);
        let engine = attach(&channels);
        let backend = MockOrderBackend::holding(&channels);

        let pending: Vec<_> = (0..N)
            .map(|i| {
                engine
                    .dispatch(body(&format!("order-{}", i)), DispatchOptions::default())
                    .unwrap()
            })
            .collect();
        assert!(eventually(|| backend.held_count() == N).await);

        let mut held = backend.take_held();
        held.shuffle(&mut rand::thread_rng());
        for (id, order) in held {
            let index: usize = order.order_id["order-".len()..].parse().unwrap();
            if index % 2 == 0 {
                backend.succeed(id, vec![accepted_event(&order.order_id)]);
            } else {
                backend.fail(id, json!({"error": "Rejected", "reason": order.order_id}));
            }
        }

        let outcomes = within(join_all(pending)).await;
        for (i, outcome) in outcomes.into_iter().enumerate() {
            let order_id = format!("order-{}", i);
            match outcome {
                Outcome::Success(body) if i % 2 == 0 => {
                    assert_eq!(body.events[0].data, order_id)
                }
                Outcome::Failure(body) if i % 2 == 1 => {
                    assert_eq!(body.error["reason"], json!(order_id))
                }
                other => panic!("request {} got {:?}", i, other),
            }
        }

        let metrics = engine.metrics();
        assert_eq!(metrics.total_fulfilled as usize, N / 2);
        assert_eq!(metrics.total_failed as usize, N / 2);
        assert_eq!(metrics.pending, 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_callers_across_threads() {
        const N: usize = 200;

        let channels = OrderChannels::with_capacity(1024);
        let engine = attach(&channels);
        let _backend = MockOrderBackend::accepting(&channels);

        let tasks: Vec<_> = (0..N)
            .map(|i| {
                let engine = Arc::clone(&engine);
                tokio::spawn(async move {
                    let order_id = format!("mt-{}", i);
                    let outcome = engine
                        .request(body(&order_id), DispatchOptions::default())
                        .await
                        .unwrap();
                    (order_id, outcome)
                })
            })
            .collect();

        for result in within(join_all(tasks)).await {
            let (order_id, outcome) = result.unwrap();
            match outcome {
                Outcome::Success(body) => assert_eq!(body.events[0].data, order_id),
                other => panic!("{} got {:?}", order_id, other),
            }
        }

        assert_eq!(engine.pending_count(), 0);
        assert_eq!(engine.metrics().total_fulfilled as usize, N);
        assert_eq!(channels.inbound_subscriber_count(), 2);
    }

    // =============================================================================
    // EXACTLY-ONCE
    // =============================================================================

    #[tokio::test]
    async fn test_duplicate_completion_is_dropped() {
        let channels = OrderChannels::with_capacity(64);
        let engine = attach(&channels);
        let _backend = MockOrderBackend::start(&channels, |order| {
            Reply::Twice(Box::new(Reply::Succeed(vec![accepted_event(&order.order_id)])))
        });

        let outcome = within(engine.request(body("D1"), DispatchOptions::default()))
            .await
            .unwrap();
        assert!(outcome.is_success());

        assert!(eventually(|| engine.metrics().duplicate_completions == 1).await);
        assert_eq!(engine.metrics().total_fulfilled, 1);
    }

    #[tokio::test]
    async fn test_failure_after_success_changes_nothing() {
        let channels = OrderChannels::with_capacity(64);
        let engine = attach(&channels);
        let backend = MockOrderBackend::holding(&channels);

        let pending = engine.dispatch(body("E1"), DispatchOptions::default()).unwrap();
        let id = pending.correlation_id().clone();
        assert!(eventually(|| backend.held_count() == 1).await);

        backend.succeed(id.clone(), vec![accepted_event("E1")]);
        backend.fail(id, json!({"error": "TooLate", "reason": "second answer"}));

        assert!(within(pending).await.is_success());
        assert!(eventually(|| engine.metrics().duplicate_completions == 1).await);
        assert_eq!(engine.metrics().total_failed, 0);
    }

    #[tokio::test]
    async fn test_unknown_and_blank_ids_are_absorbed() {
        let channels = OrderChannels::with_capacity(64);
        let engine = attach(&channels);
        let backend = MockOrderBackend::holding(&channels);

        let pending = engine.dispatch(body("U1"), DispatchOptions::default()).unwrap();
        assert!(eventually(|| backend.held_count() == 1).await);

        backend.succeed(CorrelationId::generate(), vec![accepted_event("nobody")]);
        channels.failed.send(Envelope::new(
            CorrelationId::blank(),
            OrderFailedBody { error: json!(null) },
        ));

        assert!(eventually(|| {
            let m = engine.metrics();
            m.unknown_events == 1 && m.protocol_errors == 1
        })
        .await);
        assert!(engine.is_pending(pending.correlation_id()));
        assert_eq!(engine.pending_count(), 1);

        // The real reply still lands
        backend.succeed(pending.correlation_id().clone(), vec![accepted_event("U1")]);
        assert!(within(pending).await.is_success());
    }

    #[tokio::test]
    async fn test_delayed_reply_within_deadline() {
        let channels = OrderChannels::with_capacity(64);
        let engine = attach(&channels);
        let _backend = MockOrderBackend::start(&channels, |order| {
            Reply::Delayed(
                Duration::from_millis(20),
                Box::new(Reply::Succeed(vec![accepted_event(&order.order_id)])),
            )
        });

        let outcome = within(engine.request(
            body("L1"),
            DispatchOptions::new().with_timeout(Duration::from_secs(2)),
        ))
        .await
        .unwrap();
        assert!(outcome.is_success());
    }
}
