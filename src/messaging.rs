//! Hooks for a real-time messaging side channel (websocket style).
//!
//! The protocol itself lives behind [`MessageBus`]; this module only routes the
//! bus's events to the callbacks registered on the `App` and offers send helpers.
//! The server pumps the bus once per accept-loop iteration.

use std::sync::Arc;

/// Identifies a client of the message bus.
pub type ClientId = u8;

/// Something that happened on the message bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsEvent {
    Connected,
    Disconnected,
    Text(String),
    Binary(Vec<u8>),
    /// Ping, pong and other protocol-level frames
    Other,
}

/// Transport for the side channel.
pub trait MessageBus: Send {
    /// Processes pending I/O without blocking and returns the resulting events.
    fn pump(&mut self) -> Vec<(ClientId, WsEvent)>;

    fn send_text(&mut self, client: ClientId, text: &str);
    fn send_binary(&mut self, client: ClientId, payload: &[u8]);
    fn broadcast_text(&mut self, text: &str);
    fn broadcast_binary(&mut self, payload: &[u8]);
}

/// Receives every event when registered; the specific callbacks are skipped.
pub trait EventCallback: Send + Sync {
    fn on_event(&self, bus: &mut dyn MessageBus, client: ClientId, event: &WsEvent);
}

/// Connect and disconnect notifications.
pub trait ClientCallback: Send + Sync {
    fn on_client(&self, bus: &mut dyn MessageBus, client: ClientId);
}

/// Text and binary payloads.
pub trait MessageCallback: Send + Sync {
    fn on_message(&self, bus: &mut dyn MessageBus, client: ClientId, payload: &[u8]);
}

impl<F> EventCallback for F
where
    F: Fn(&mut dyn MessageBus, ClientId, &WsEvent) + Send + Sync,
{
    fn on_event(&self, bus: &mut dyn MessageBus, client: ClientId, event: &WsEvent) {
        self(bus, client, event)
    }
}

impl<F> ClientCallback for F
where
    F: Fn(&mut dyn MessageBus, ClientId) + Send + Sync,
{
    fn on_client(&self, bus: &mut dyn MessageBus, client: ClientId) {
        self(bus, client)
    }
}

impl<F> MessageCallback for F
where
    F: Fn(&mut dyn MessageBus, ClientId, &[u8]) + Send + Sync,
{
    fn on_message(&self, bus: &mut dyn MessageBus, client: ClientId, payload: &[u8]) {
        self(bus, client, payload)
    }
}

/// Callbacks registered for the side channel, plus the path clients use to
/// ask for an upgrade over HTTP.
#[derive(Clone, Default)]
pub struct WsHandlers {
    pub path: Option<String>,
    pub on_event: Option<Arc<dyn EventCallback>>,
    pub on_connect: Option<Arc<dyn ClientCallback>>,
    pub on_disconnect: Option<Arc<dyn ClientCallback>>,
    pub on_message: Option<Arc<dyn MessageCallback>>,
}

impl WsHandlers {
    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Hands one event to the matching callback.
    pub fn dispatch(&self, bus: &mut dyn MessageBus, client: ClientId, event: &WsEvent) {
        if let Some(cb) = &self.on_event {
            cb.on_event(bus, client, event);
            return;
        }

        match event {
            WsEvent::Connected => {
                if let Some(cb) = &self.on_connect {
                    cb.on_client(bus, client);
                }
            }
            WsEvent::Disconnected => {
                if let Some(cb) = &self.on_disconnect {
                    cb.on_client(bus, client);
                }
            }
            WsEvent::Text(text) => {
                if let Some(cb) = &self.on_message {
                    cb.on_message(bus, client, text.as_bytes());
                }
            }
            WsEvent::Binary(payload) => {
                if let Some(cb) = &self.on_message {
                    cb.on_message(bus, client, payload);
                }
            }
            WsEvent::Other => {}
        }
    }
}

/// Couples an optional bus with the registered callbacks.
///
/// Every operation is a no-op while messaging is disabled or no bus is attached.
pub struct Messaging {
    handlers: WsHandlers,
    bus: Option<Box<dyn MessageBus>>,
}

impl Messaging {
    pub fn new(handlers: WsHandlers, bus: Option<Box<dyn MessageBus>>) -> Self {
        Self { handlers, bus }
    }

    pub fn is_active(&self) -> bool {
        self.handlers.is_enabled() && self.bus.is_some()
    }

    /// Pumps the bus once and dispatches what it produced. Returns the number of
    /// events handled.
    pub fn pump(&mut self) -> usize {
        if !self.handlers.is_enabled() {
            return 0;
        }
        let Some(bus) = self.bus.as_deref_mut() else {
            return 0;
        };

        let events = bus.pump();
        for (client, event) in &events {
            tracing::trace!(client, ?event, "message bus event");
            self.handlers.dispatch(bus, *client, event);
        }
        events.len()
    }

    pub fn send_text(&mut self, client: ClientId, text: &str) {
        if let Some(bus) = self.active_bus() {
            bus.send_text(client, text);
        }
    }

    pub fn send_binary(&mut self, client: ClientId, payload: &[u8]) {
        if let Some(bus) = self.active_bus() {
            bus.send_binary(client, payload);
        }
    }

    pub fn broadcast_text(&mut self, text: &str) {
        if let Some(bus) = self.active_bus() {
            bus.broadcast_text(text);
        }
    }

    pub fn broadcast_binary(&mut self, payload: &[u8]) {
        if let Some(bus) = self.active_bus() {
            bus.broadcast_binary(payload);
        }
    }

    fn active_bus(&mut self) -> Option<&mut (dyn MessageBus + 'static)> {
        if !self.handlers.is_enabled() {
            return None;
        }
        self.bus.as_deref_mut()
    }
}
