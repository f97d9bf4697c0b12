//! Order gateway service - wires config, engine and adapter together.

use crate::adapters::{OrderEngine, PlaceOrderAdapter};
use crate::domain::{EngineMetrics, GatewayConfig, GatewayError, PlaceOrderResponse};
use crate::engine::DispatchOptions;
use shared_bus::{InMemoryChannelSet, OrderChannelSet};
use shared_types::{Order, OrderFailedBody, OrderSucceededBody, PlaceOrderBody};
use std::sync::Arc;
use tracing::info;

/// In-process channels for the place-order flow.
pub type InMemoryOrderChannels =
    InMemoryChannelSet<PlaceOrderBody, OrderSucceededBody, OrderFailedBody>;

/// Order gateway service state
pub struct OrderGatewayService {
    config: GatewayConfig,
    engine: Arc<OrderEngine>,
    adapter: PlaceOrderAdapter,
}

impl OrderGatewayService {
    /// Validate `config` and attach a new engine to `channels`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: GatewayConfig, channels: OrderChannelSet) -> Result<Self, GatewayError> {
        config.validate()?;

        let engine = Arc::new(OrderEngine::attach(channels, config.engine.clone())?);
        let adapter = PlaceOrderAdapter::new(Arc::clone(&engine), config.failure_shape);

        info!(
            failure_shape = ?config.failure_shape,
            default_timeout_ms = config.engine.default_timeout.as_millis() as u64,
            "Order gateway started"
        );

        Ok(Self {
            config,
            engine,
            adapter,
        })
    }

    /// Build in-process channels sized by `engine.channel_capacity` and
    /// attach a service to them. The backend side is wired to the returned
    /// channels.
    pub fn in_memory(config: GatewayConfig) -> Result<(Self, InMemoryOrderChannels), GatewayError> {
        config.validate()?;
        let channels = InMemoryOrderChannels::with_capacity(config.engine.channel_capacity);
        let service = Self::new(config, channels.channel_set())?;
        Ok((service, channels))
    }

    /// The `placeOrder` mutation.
    pub async fn place_order(&self, order: Order) -> PlaceOrderResponse {
        self.adapter.place_order(order).await
    }

    pub async fn place_order_with(&self, order: Order, options: DispatchOptions) -> PlaceOrderResponse {
        self.adapter.place_order_with(order, options).await
    }

    /// The `version` query.
    pub fn version(&self) -> &'static str {
        self.adapter.version()
    }

    pub fn adapter(&self) -> &PlaceOrderAdapter {
        &self.adapter
    }

    pub fn engine(&self) -> &Arc<OrderEngine> {
        &self.engine
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn metrics(&self) -> EngineMetrics {
        self.engine.metrics()
    }

    /// Detach from the channels; in-flight orders resolve as cancelled.
    pub fn shutdown(&self) -> usize {
        let cancelled = self.engine.shutdown();
        info!(cancelled, "Order gateway stopped");
        cancelled
    }
}
