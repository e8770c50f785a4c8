// src/client/view.rs
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{RwLock, broadcast};

use crate::message::{Message, Sender};

const EVENT_CAPACITY: usize = 256;

static NEXT_CHAT_BOX_ID: AtomicU64 = AtomicU64::new(0);

/// Handle to one rendered message in a [`ChatBox`].
///
/// Only valid for the container that issued it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ElementRef {
    container: u64,
    index: usize,
}

impl ElementRef {
    pub fn index(&self) -> usize {
        self.index
    }
}

/// Change notifications published by a [`ChatBox`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ViewEvent {
    Appended {
        element: ElementRef,
        sender: Sender,
        text: String,
    },
    TextChanged {
        element: ElementRef,
        text: String,
    },
    Scrolled {
        offset: usize,
    },
}

#[derive(Debug, Default)]
struct ChatBoxState {
    messages: Vec<Message>,
    scroll_top: usize,
}

impl ChatBoxState {
    fn scroll_height(&self) -> usize {
        self.messages.iter().map(|m| rendered_lines(&m.text)).sum()
    }
}

/// Scrollable, append-only message container (`chat-box`).
#[derive(Clone, Debug)]
pub struct ChatBox {
    id: u64,
    inner: Arc<RwLock<ChatBoxState>>,
    events: broadcast::Sender<ViewEvent>,
}

impl Default for ChatBox {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatBox {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            id: NEXT_CHAT_BOX_ID.fetch_add(1, Ordering::Relaxed),
            inner: Arc::new(RwLock::new(ChatBoxState::default())),
            events,
        }
    }

    /// Insert a new message tagged by `sender` and scroll it into view.
    pub async fn append_message(&self, text: impl Into<String>, sender: Sender) -> ElementRef {
        let text = text.into();
        let element = {
            let mut guard = self.inner.write().await;
            guard.messages.push(Message::new(sender, text.clone()));
            ElementRef {
                container: self.id,
                index: guard.messages.len() - 1,
            }
        };
        self.publish(ViewEvent::Appended { element, sender, text });
        self.scroll_to_latest().await;
        element
    }

    /// Replace the displayed text of an existing message.
    ///
    /// Returns `false` if `element` does not belong to this container.
    pub async fn set_text(&self, element: ElementRef, text: impl Into<String>) -> bool {
        if element.container != self.id {
            return false;
        }
        let text = text.into();
        {
            let mut guard = self.inner.write().await;
            match guard.messages.get_mut(element.index) {
                Some(message) => message.text = text.clone(),
                None => return false,
            }
        }
        self.publish(ViewEvent::TextChanged { element, text });
        true
    }

    pub async fn scroll_to_latest(&self) {
        let offset = {
            let mut guard = self.inner.write().await;
            guard.scroll_top = guard.scroll_height();
            guard.scroll_top
        };
        self.publish(ViewEvent::Scrolled { offset });
    }

    pub async fn text_of(&self, element: ElementRef) -> Option<String> {
        if element.container != self.id {
            return None;
        }
        let guard = self.inner.read().await;
        guard.messages.get(element.index).map(|m| m.text.clone())
    }

    /// Snapshot of the conversation in display order.
    pub async fn messages(&self) -> Vec<Message> {
        self.inner.read().await.messages.clone()
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.messages.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    pub async fn scroll_top(&self) -> usize {
        self.inner.read().await.scroll_top
    }

    pub async fn scroll_height(&self) -> usize {
        self.inner.read().await.scroll_height()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ViewEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: ViewEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn rendered_lines(text: &str) -> usize {
    text.lines().count().max(1)
}

/// Text input control (`chat-input`).
///
/// Synchronous so an event handler can capture the value at the moment the
/// event fires, before any task is spawned.
#[derive(Clone, Debug, Default)]
pub struct InputField {
    value: Arc<Mutex<String>>,
}

impl InputField {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> String {
        self.lock().clone()
    }

    pub fn set_value(&self, value: impl Into<String>) {
        *self.lock() = value.into();
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Take the trimmed value and clear the field in one step.
    ///
    /// Blank input is left in place and yields `None`.
    pub fn take_trimmed(&self) -> Option<String> {
        let mut value = self.lock();
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return None;
        }
        let taken = trimmed.to_owned();
        value.clear();
        Some(taken)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, String> {
        self.value.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Everything the chat client touches: the input control and the message container.
#[derive(Clone, Debug, Default)]
pub struct ChatSurface {
    pub input: InputField,
    pub chat_box: ChatBox,
}

impl ChatSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn append_returns_handles_in_order() {
        let chat_box = ChatBox::new();
        let first = chat_box.append_message("hello", Sender::User).await;
        let second = chat_box.append_message("...", Sender::Bot).await;

        assert_eq!(first.index(), 0);
        assert_eq!(second.index(), 1);
        assert_eq!(chat_box.text_of(second).await.as_deref(), Some("..."));
        assert_eq!(chat_box.scroll_top().await, 2);
    }

    #[tokio::test]
    async fn set_text_on_foreign_handle_is_rejected() {
        let chat_box = ChatBox::new();
        chat_box.append_message("mine", Sender::User).await;
        chat_box.append_message("also mine", Sender::Bot).await;

        let other = ChatBox::new();
        other.append_message("a", Sender::User).await;
        let foreign = other.append_message("b", Sender::Bot).await;
        assert_eq!(foreign.index(), 1);

        assert!(!chat_box.set_text(foreign, "x").await);
        assert_eq!(chat_box.text_of(foreign).await, None);
        assert_eq!(
            chat_box.messages().await,
            vec![
                Message::new(Sender::User, "mine"),
                Message::new(Sender::Bot, "also mine"),
            ]
        );
        assert_eq!(other.text_of(foreign).await.as_deref(), Some("b"));
    }

    #[test]
    fn take_trimmed_clears_only_real_input() {
        let input = InputField::new();
        input.set_value("  \t ");
        assert_eq!(input.take_trimmed(), None);
        assert_eq!(input.value(), "  \t ");

        input.set_value("  hello ");
        assert_eq!(input.take_trimmed().as_deref(), Some("hello"));
        assert_eq!(input.value(), "");
    }

    #[tokio::test]
    async fn multi_line_text_grows_scroll_height() {
        let chat_box = ChatBox::new();
        let bot = chat_box.append_message("", Sender::Bot).await;
        assert_eq!(chat_box.scroll_height().await, 1);

        chat_box.set_text(bot, "one\ntwo\nthree").await;
        chat_box.scroll_to_latest().await;
        assert_eq!(chat_box.scroll_top().await, 3);
    }
}
