//! Scripted stand-in for the order backend.
//!
//! Subscribes to the outbound channel and answers each request according to
//! a script, echoing the request's correlation id. Requests scripted as
//! [`Reply::Hold`] are parked so a test can answer them later, in any order.

use parking_lot::Mutex;
use serde_json::Value;
use shared_bus::{InMemoryChannelSet, MessageChannel, SubscriptionHandle};
use shared_types::{
    CorrelationId, Envelope, Event, Order, OrderFailedBody, OrderSucceededBody, PlaceOrderBody,
};
use std::sync::Arc;
use std::time::Duration;

/// Channel set for the order flow with concrete in-memory channels.
pub type OrderChannels = InMemoryChannelSet<PlaceOrderBody, OrderSucceededBody, OrderFailedBody>;

/// How the backend answers one request.
#[derive(Debug, Clone)]
pub enum Reply {
    /// Emit a success event with these events.
    Succeed(Vec<Event>),
    /// Emit a failure event with this payload.
    Fail(Value),
    /// Never answer.
    Silent,
    /// Park the request until the test answers it.
    Hold,
    /// Answer after a delay.
    Delayed(Duration, Box<Reply>),
    /// Answer twice with the same reply.
    Twice(Box<Reply>),
}

type Script = Arc<dyn Fn(&Order) -> Reply + Send + Sync>;

struct BackendState {
    received: Vec<CorrelationId>,
    held: Vec<(CorrelationId, Order)>,
}

/// Mock backend bound to one channel set.
pub struct MockOrderBackend {
    channels: OrderChannels,
    state: Arc<Mutex<BackendState>>,
    subscription: SubscriptionHandle,
}

impl MockOrderBackend {
    /// Start answering requests on `channels` per `script`.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn start<S>(channels: &OrderChannels, script: S) -> Self
    where
        S: Fn(&Order) -> Reply + Send + Sync + 'static,
    {
        let script: Script = Arc::new(script);
        let state = Arc::new(Mutex::new(BackendState {
            received: Vec::new(),
            held: Vec::new(),
        }));

        let responder = channels.clone();
        let listener_state = Arc::clone(&state);
        let subscription = channels
            .outbound
            .subscribe(Arc::new(move |envelope: Envelope<PlaceOrderBody>| {
                let (id, body) = envelope.into_parts();
                let reply = script(&body.order);
                {
                    let mut state = listener_state.lock();
                    state.received.push(id.clone());
                    if matches!(reply, Reply::Hold) {
                        state.held.push((id, body.order));
                        return;
                    }
                }
                respond(&responder, id, reply);
            }))
            .unwrap_or_else(|e| panic!("mock backend must start inside a runtime: {}", e));

        Self {
            channels: channels.clone(),
            state,
            subscription,
        }
    }

    /// Backend that accepts every order, with one event carrying the order id.
    pub fn accepting(channels: &OrderChannels) -> Self {
        Self::start(channels, |order| {
            Reply::Succeed(vec![crate::support::accepted_event(&order.order_id)])
        })
    }

    /// Backend that parks every request.
    pub fn holding(channels: &OrderChannels) -> Self {
        Self::start(channels, |_| Reply::Hold)
    }

    /// Correlation ids of all requests seen so far, in arrival order.
    pub fn received(&self) -> Vec<CorrelationId> {
        self.state.lock().received.clone()
    }

    pub fn received_count(&self) -> usize {
        self.state.lock().received.len()
    }

    pub fn held_count(&self) -> usize {
        self.state.lock().held.len()
    }

    /// Take all parked requests.
    pub fn take_held(&self) -> Vec<(CorrelationId, Order)> {
        std::mem::take(&mut self.state.lock().held)
    }

    /// Answer `id` now, whether or not it was parked.
    pub fn reply(&self, id: CorrelationId, reply: Reply) {
        respond(&self.channels, id, reply);
    }

    /// Emit a success event for `id`.
    pub fn succeed(&self, id: CorrelationId, events: Vec<Event>) {
        self.reply(id, Reply::Succeed(events));
    }

    /// Emit a failure event for `id`.
    pub fn fail(&self, id: CorrelationId, error: Value) {
        self.reply(id, Reply::Fail(error));
    }

    /// Stop listening to the outbound channel.
    pub fn stop(&self) {
        self.channels.outbound.unsubscribe(self.subscription);
    }
}

impl Drop for MockOrderBackend {
    fn drop(&mut self) {
        self.stop();
    }
}

fn respond(channels: &OrderChannels, id: CorrelationId, reply: Reply) {
    match reply {
        Reply::Succeed(events) => channels
            .succeeded
            .send(Envelope::new(id, OrderSucceededBody { events })),
        Reply::Fail(error) => channels
            .failed
            .send(Envelope::new(id, OrderFailedBody { error })),
        Reply::Silent | Reply::Hold => {}
        Reply::Delayed(delay, reply) => {
            let channels = channels.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                respond(&channels, id, *reply);
            });
        }
        Reply::Twice(reply) => {
            respond(channels, id.clone(), (*reply).clone());
            respond(channels, id, *reply);
        }
    }
}
