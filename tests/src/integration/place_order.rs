//! # Place Order Flows
//!
//! `placeOrder` through the full service: config, engine and adapter.

#[cfg(test)]
mod tests {
    use crate::support::backend::OrderChannels;
    use crate::support::*;
    use order_gateway::{codes, FailureShape, GatewayConfig, OrderGatewayService};
    use serde_json::json;
    use shared_bus::DEFAULT_CHANNEL_CAPACITY;
    use shared_types::{ErrorInfo, FieldError};
    use std::time::Duration;

    fn service(channels: &OrderChannels, failure_shape: FailureShape) -> OrderGatewayService {
        init_test_logging();
        let config = GatewayConfig {
            failure_shape,
            ..GatewayConfig::default()
        };
        OrderGatewayService::new(config, channels.channel_set()).unwrap()
    }

    /// Rejects orders without lines, per field; accepts the rest.
    fn validating_backend(channels: &OrderChannels) -> MockOrderBackend {
        MockOrderBackend::start(channels, |order| {
            if order.lines.is_empty() {
                Reply::Fail(json!([
                    {"field": "lines", "errorDescription": "an order needs at least one line"}
                ]))
            } else {
                Reply::Succeed(vec![accepted_event(&order.order_id)])
            }
        })
    }

    #[tokio::test]
    async fn test_accepted_order() {
        let channels = OrderChannels::with_capacity(64);
        let service = service(&channels, FailureShape::FieldErrors);
        let _backend = validating_backend(&channels);

        let response = within(service.place_order(sample_order("P1"))).await;

        assert!(response.success);
        assert_eq!(response.order_id, "P1");
        assert_eq!(response.events, Some(vec![accepted_event("P1")]));
        assert!(response.error.is_none());
        assert!(response.errors.is_none());
    }

    #[tokio::test]
    async fn test_invalid_order_returns_field_errors() {
        let channels = OrderChannels::with_capacity(64);
        let service = service(&channels, FailureShape::FieldErrors);
        let _backend = validating_backend(&channels);

        let response = within(service.place_order(empty_order("P2"))).await;

        assert!(!response.success);
        assert_eq!(response.order_id, "P2");
        assert_eq!(
            response.errors,
            Some(vec![FieldError::new("lines", "an order needs at least one line")])
        );
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({
                "success": false,
                "orderId": "P2",
                "errors": [{"field": "lines", "errorDescription": "an order needs at least one line"}]
            })
        );
    }

    #[tokio::test]
    async fn test_business_rejection_returns_reason() {
        let channels = OrderChannels::with_capacity(64);
        let service = service(&channels, FailureShape::Reason);
        let _backend = MockOrderBackend::start(&channels, |order| {
            Reply::Fail(json!({"error": "OutOfStock", "reason": format!("{} cannot ship", order.order_id)}))
        });

        let response = within(service.place_order(sample_order("P3"))).await;

        assert!(!response.success);
        assert_eq!(
            response.error,
            Some(ErrorInfo::new("OutOfStock", "P3 cannot ship"))
        );
    }

    #[tokio::test]
    async fn test_shape_mismatch_surfaces_protocol_error() {
        let channels = OrderChannels::with_capacity(64);
        let service = service(&channels, FailureShape::Reason);
        let _backend = validating_backend(&channels);

        let response = within(service.place_order(empty_order("P4"))).await;
        assert_eq!(response.error_kind(), Some(codes::PROTOCOL_ERROR));
    }

    #[tokio::test(start_paused = true)]
    async fn test_silent_backend_times_out() {
        let channels = OrderChannels::with_capacity(64);
        let service = service(&channels, FailureShape::Reason);
        let _backend = MockOrderBackend::start(&channels, |_| Reply::Silent);

        let response = service
            .place_order_with(
                sample_order("P5"),
                order_gateway::DispatchOptions::new().with_timeout(Duration::from_millis(10)),
            )
            .await;

        assert!(!response.success);
        assert_eq!(response.order_id, "P5");
        assert_eq!(response.error_kind(), Some(codes::TIMEOUT));
        assert_eq!(service.metrics().total_timeouts, 1);
    }

    #[tokio::test]
    async fn test_shutdown_mid_flight_returns_cancelled() {
        let channels = OrderChannels::with_capacity(64);
        let service = std::sync::Arc::new(service(&channels, FailureShape::Reason));
        let backend = MockOrderBackend::holding(&channels);

        let caller = {
            let service = std::sync::Arc::clone(&service);
            tokio::spawn(async move { service.place_order(sample_order("P6")).await })
        };
        assert!(eventually(|| backend.held_count() == 1).await);

        assert_eq!(service.shutdown(), 1);
        let response = within(caller).await.unwrap();
        assert_eq!(response.error_kind(), Some(codes::CANCELLED));

        let response = service.place_order(sample_order("P7")).await;
        assert_eq!(response.error_kind(), Some(codes::UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_config_file_drives_service() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gateway.toml");
        std::fs::write(
            &path,
            "failure_shape = \"field_errors\"\n[engine]\ndefault_timeout = \"5s\"\n",
        )
        .unwrap();

        let config = GatewayConfig::from_file(&path).unwrap();
        let (service, channels) = OrderGatewayService::in_memory(config).unwrap();
        assert_eq!(channels.outbound.capacity(), DEFAULT_CHANNEL_CAPACITY);
        let _backend = validating_backend(&channels);

        assert_eq!(service.config().engine.default_timeout, Duration::from_secs(5));
        assert_eq!(service.version(), "1.0.0");

        let response = within(service.place_order(empty_order("P8"))).await;
        assert!(response.errors.is_some());
    }
}
