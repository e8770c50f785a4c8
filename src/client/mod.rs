//! Streaming chat client.
//!
//! [`ChatClient::send_message`] turns the current input into one `POST /chat`
//! and renders the streamed reply into a placeholder bot message as chunks
//! arrive. [`ChatWidget::init`] wires the client to the send button and the
//! Enter key.

pub mod decoder;
pub mod events;
pub mod transport;
pub mod view;

use std::sync::Arc;

use futures::{
    FutureExt, StreamExt,
    future::{self, BoxFuture},
};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, error, info_span};
use uuid::Uuid;

use crate::{
    error::ChatError,
    message::{ChatRequest, Sender},
};
use decoder::Utf8StreamDecoder;
use events::{ElementKey, EventBindings, EventKind, UiEvent};
use transport::ChatTransport;
use view::{ChatSurface, ElementRef};

/// Bot text shown while waiting for the first response.
pub const PLACEHOLDER_TEXT: &str = "...";

/// Bot text shown when a message could not be answered.
pub const FAILURE_TEXT: &str = "Sorry, something went wrong. Please try again.";

/// What became of one `send_message` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// Blank input; nothing was rendered or sent.
    Skipped,
    Delivered {
        user: ElementRef,
        bot: ElementRef,
    },
    Failed {
        user: ElementRef,
        bot: ElementRef,
        error: ChatError,
    },
}

pub struct ChatClient<T> {
    transport: Arc<T>,
    surface: ChatSurface,
}

impl<T> Clone for ChatClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            surface: self.surface.clone(),
        }
    }
}

impl<T: ChatTransport> ChatClient<T> {
    pub fn new(transport: T, surface: ChatSurface) -> Self {
        Self {
            transport: Arc::new(transport),
            surface,
        }
    }

    pub fn surface(&self) -> &ChatSurface {
        &self.surface
    }

    /// Render a message and return its handle for later updates.
    pub async fn append_message(&self, text: impl Into<String>, sender: Sender) -> ElementRef {
        self.surface.chat_box.append_message(text, sender).await
    }

    /// Take the trimmed input and clear the field.
    ///
    /// Synchronous, so event handlers capture the value when the event fires.
    pub fn capture_input(&self) -> Result<String, ChatError> {
        self.surface
            .input
            .take_trimmed()
            .ok_or(ChatError::EmptyInput)
    }

    /// Send the current input and stream the reply into a new bot message.
    pub async fn send_message(&self) -> SendOutcome {
        match self.capture_input() {
            Ok(message) => self.send_text(message).await,
            Err(e) => {
                debug!(error = %e, "ignoring send");
                SendOutcome::Skipped
            }
        }
    }

    /// Send an already captured message.
    ///
    /// Every failure after the request is issued ends with [`FAILURE_TEXT`]
    /// on this call's placeholder; other messages are never touched.
    pub async fn send_text(&self, message: String) -> SendOutcome {
        let message = message.trim().to_owned();
        if message.is_empty() {
            debug!(error = %ChatError::EmptyInput, "ignoring send");
            return SendOutcome::Skipped;
        }

        let request_id = Uuid::new_v4();
        let span = info_span!("send_message", %request_id);
        async move {
            let user = self.append_message(message.clone(), Sender::User).await;
            let bot = self.append_message(PLACEHOLDER_TEXT, Sender::Bot).await;

            match self.stream_reply(message, bot).await {
                Ok(()) => {
                    debug!("reply complete");
                    SendOutcome::Delivered { user, bot }
                }
                Err(error) => {
                    error!(error = %error, "chat request failed");
                    self.surface.chat_box.set_text(bot, FAILURE_TEXT).await;
                    self.surface.chat_box.scroll_to_latest().await;
                    SendOutcome::Failed { user, bot, error }
                }
            }
        }
        .instrument(span)
        .await
    }

    async fn stream_reply(&self, message: String, bot: ElementRef) -> Result<(), ChatError> {
        let chat_box = &self.surface.chat_box;

        let reply = self.transport.post_message(ChatRequest::new(message)).await?;
        if !reply.is_success() {
            return Err(ChatError::Http {
                status: reply.status,
            });
        }

        chat_box.set_text(bot, "").await;

        let mut body = reply.body;
        let mut decoder = Utf8StreamDecoder::new();
        let mut accumulated = String::new();
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            accumulated.push_str(&decoder.decode(&chunk));
            chat_box.set_text(bot, accumulated.clone()).await;
            chat_box.scroll_to_latest().await;
        }

        let tail = decoder.finish();
        if !tail.is_empty() {
            accumulated.push_str(&tail);
            chat_box.set_text(bot, accumulated).await;
            chat_box.scroll_to_latest().await;
        }
        Ok(())
    }
}

/// A chat client bound to its controls.
#[derive(Debug)]
pub struct ChatWidget {
    surface: ChatSurface,
    bindings: EventBindings,
}

impl ChatWidget {
    /// Bind the send button and the Enter key to a send. Call once at startup.
    pub fn init<T: ChatTransport>(transport: T, surface: ChatSurface) -> Self {
        let client = ChatClient::new(transport, surface.clone());
        let mut bindings = EventBindings::new();

        // Handlers capture the input before returning their future, so a
        // later edit of the field cannot leak into an earlier send.
        let on_click = client.clone();
        bindings.bind(ElementKey::SendButton, EventKind::Click, move |_| {
            send_captured(&on_click)
        });

        let on_key = client;
        bindings.bind(ElementKey::ChatInput, EventKind::KeyDown, move |event| {
            if event.is_key("Enter") {
                send_captured(&on_key)
            } else {
                future::ready(()).boxed()
            }
        });

        Self { surface, bindings }
    }

    pub fn surface(&self) -> &ChatSurface {
        &self.surface
    }

    pub fn bindings(&self) -> &EventBindings {
        &self.bindings
    }

    pub fn dispatch(&self, target: ElementKey, event: UiEvent) -> Vec<JoinHandle<()>> {
        self.bindings.dispatch(target, event)
    }
}

fn send_captured<T: ChatTransport>(client: &ChatClient<T>) -> BoxFuture<'static, ()> {
    match client.capture_input() {
        Ok(message) => {
            let client = client.clone();
            async move {
                client.send_text(message).await;
            }
            .boxed()
        }
        Err(e) => {
            debug!(error = %e, "ignoring send");
            future::ready(()).boxed()
        }
    }
}
