// src/client/events.rs
use std::{collections::HashMap, fmt::Debug, sync::Arc};

use futures::future::BoxFuture;
use tokio::task::JoinHandle;

/// Stable keys of the elements the chat client binds to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ElementKey {
    ChatInput,
    SendButton,
    ChatBox,
}

impl ElementKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKey::ChatInput => "chat-input",
            ElementKey::SendButton => "send-button",
            ElementKey::ChatBox => "chat-box",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Click,
    KeyDown,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    Click,
    KeyDown { key: String },
}

impl UiEvent {
    pub fn key(key: impl Into<String>) -> Self {
        UiEvent::KeyDown { key: key.into() }
    }

    pub fn kind(&self) -> EventKind {
        match self {
            UiEvent::Click => EventKind::Click,
            UiEvent::KeyDown { .. } => EventKind::KeyDown,
        }
    }

    pub fn is_key(&self, name: &str) -> bool {
        matches!(self, UiEvent::KeyDown { key } if key == name)
    }
}

pub type Handler = Arc<dyn Fn(UiEvent) -> BoxFuture<'static, ()> + Send + Sync>;

/// Registry of event handlers keyed by target element and event kind.
#[derive(Clone, Default)]
pub struct EventBindings {
    handlers: HashMap<(ElementKey, EventKind), Vec<Handler>>,
}

impl Debug for EventBindings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBindings")
            .field("bound", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl EventBindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind<F>(&mut self, target: ElementKey, kind: EventKind, handler: F)
    where
        F: Fn(UiEvent) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        self.handlers
            .entry((target, kind))
            .or_default()
            .push(Arc::new(handler));
    }

    pub fn handler_count(&self, target: ElementKey, kind: EventKind) -> usize {
        self.handlers.get(&(target, kind)).map_or(0, Vec::len)
    }

    /// Run every handler bound to `target` for this event as its own task.
    ///
    /// Returns immediately; await the handles to observe completion.
    pub fn dispatch(&self, target: ElementKey, event: UiEvent) -> Vec<JoinHandle<()>> {
        let Some(handlers) = self.handlers.get(&(target, event.kind())) else {
            return Vec::new();
        };
        handlers
            .iter()
            .map(|handler| tokio::spawn(handler(event.clone())))
            .collect()
    }
}
