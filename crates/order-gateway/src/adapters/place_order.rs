//! The `placeOrder` operation: sync call over the order channel set.

use super::failure::OrderFailure;
use crate::domain::codes;
use crate::domain::{FailureShape, Outcome, PlaceOrderResponse};
use crate::engine::{CorrelationEngine, DispatchOptions};
use shared_types::{ErrorInfo, Order, OrderFailedBody, OrderSucceededBody, PlaceOrderBody};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Correlation engine bound to the order channels.
pub type OrderEngine = CorrelationEngine<PlaceOrderBody, OrderSucceededBody, OrderFailedBody>;

/// Outcome of one place-order request.
pub type OrderOutcome = Outcome<OrderSucceededBody, OrderFailedBody>;

/// Version reported by the `version` query.
pub const API_VERSION: &str = "1.0.0";

/// Maps `placeOrder(order)` onto the correlation engine.
///
/// Holds no correlation state of its own; cheap to clone.
#[derive(Clone)]
pub struct PlaceOrderAdapter {
    engine: Arc<OrderEngine>,
    failure_shape: FailureShape,
}

impl PlaceOrderAdapter {
    pub fn new(engine: Arc<OrderEngine>, failure_shape: FailureShape) -> Self {
        Self {
            engine,
            failure_shape,
        }
    }

    /// The `version` query.
    pub fn version(&self) -> &'static str {
        API_VERSION
    }

    /// Place `order` with the engine's default deadline.
    pub async fn place_order(&self, order: Order) -> PlaceOrderResponse {
        self.place_order_with(order, DispatchOptions::default()).await
    }

    /// Place `order` with explicit dispatch options.
    #[instrument(skip(self, order, options), fields(order_id = %order.order_id))]
    pub async fn place_order_with(&self, order: Order, options: DispatchOptions) -> PlaceOrderResponse {
        let order_id = order.order_id.clone();

        let pending = match self.engine.dispatch(PlaceOrderBody { order }, options) {
            Ok(pending) => pending,
            Err(e) => {
                warn!(error = %e, "Order could not be dispatched");
                return PlaceOrderResponse::rejected(
                    order_id,
                    ErrorInfo::new(codes::UNAVAILABLE, e.to_string()),
                );
            }
        };

        debug!(correlation_id = %pending.correlation_id(), "Order dispatched");
        let outcome = pending.await;
        self.to_response(order_id, outcome)
    }

    /// Map an engine outcome to the outward response.
    pub fn to_response(&self, order_id: String, outcome: OrderOutcome) -> PlaceOrderResponse {
        match outcome {
            Outcome::Success(body) => PlaceOrderResponse::succeeded(order_id, body.events),
            Outcome::Failure(body) => match OrderFailure::decode(self.failure_shape, &body.error) {
                Ok(OrderFailure::Rejected(error)) => PlaceOrderResponse::rejected(order_id, error),
                Ok(OrderFailure::Invalid(errors)) => PlaceOrderResponse::invalid(order_id, errors),
                Err(e) => {
                    warn!(order_id = %order_id, error = %e, "Unexpected failure payload");
                    PlaceOrderResponse::rejected(
                        order_id,
                        ErrorInfo::new(codes::PROTOCOL_ERROR, e.to_string()),
                    )
                }
            },
            Outcome::TimedOut => PlaceOrderResponse::rejected(
                order_id,
                ErrorInfo::new(codes::TIMEOUT, "no reply from order backend before the deadline"),
            ),
            Outcome::Cancelled => PlaceOrderResponse::rejected(
                order_id,
                ErrorInfo::new(codes::CANCELLED, "request cancelled before completion"),
            ),
        }
    }

    pub fn failure_shape(&self) -> FailureShape {
        self.failure_shape
    }

    pub fn engine(&self) -> &Arc<OrderEngine> {
        &self.engine
    }
}
