//! Terminal front end for the chat client.
//!
//! Each line typed on stdin is placed in the input field and submitted with
//! an Enter key event; replies are printed as they stream in. `/quit` or EOF
//! exits once in-flight replies have finished.

use std::collections::HashMap;
use std::io::Write;

use faq_chat::{
    client::{
        ChatWidget,
        events::{ElementKey, UiEvent},
        transport::HttpTransport,
        view::{ChatSurface, ElementRef, ViewEvent},
    },
    config::{self, Config},
    message::Sender,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::broadcast::{Receiver, error::RecvError};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cfg = Config::from_env();
    config::init_tracing(&cfg.log_level);

    let surface = ChatSurface::new();
    let renderer = tokio::spawn(render(surface.chat_box.subscribe()));
    let widget = ChatWidget::init(HttpTransport::new(cfg.chat_endpoint.clone()), surface);
    info!(endpoint = %cfg.chat_endpoint, "chat client ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = Vec::new();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == "/quit" {
            break;
        }
        widget.surface().input.set_value(line);
        in_flight.extend(widget.dispatch(ElementKey::ChatInput, UiEvent::key("Enter")));
    }

    for handle in in_flight {
        if let Err(e) = handle.await {
            warn!(error = %e, "send task failed");
        }
    }

    // Dropping the last surface handle closes the event channel and ends the renderer.
    drop(widget);
    renderer.await?;
    println!();
    Ok(())
}

async fn render(mut events: Receiver<ViewEvent>) {
    let mut shown: HashMap<ElementRef, String> = HashMap::new();
    let mut current: Option<ElementRef> = None;

    loop {
        let event = match events.recv().await {
            Ok(event) => event,
            Err(RecvError::Lagged(skipped)) => {
                warn!(skipped, "renderer fell behind");
                continue;
            }
            Err(RecvError::Closed) => break,
        };

        match event {
            ViewEvent::Appended { element, sender, text } => {
                if current.is_some() {
                    println!();
                }
                match sender {
                    Sender::User => {
                        println!("you> {text}");
                        current = None;
                    }
                    Sender::Bot => {
                        print!("bot> {text}");
                        current = Some(element);
                    }
                }
                shown.insert(element, text);
            }
            ViewEvent::TextChanged { element, text } => {
                let previous = shown.get(&element).map(String::as_str).unwrap_or_default();
                if current == Some(element) {
                    match text.strip_prefix(previous) {
                        Some(suffix) => print!("{suffix}"),
                        None => print!("\r\x1b[2Kbot> {text}"),
                    }
                } else {
                    if current.is_some() {
                        println!();
                    }
                    print!("bot> {text}");
                    current = Some(element);
                }
                shown.insert(element, text);
            }
            ViewEvent::Scrolled { .. } => {}
        }
        if let Err(e) = std::io::stdout().flush() {
            warn!(error = %e, "stdout flush failed");
        }
    }
}
