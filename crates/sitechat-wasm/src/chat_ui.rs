use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use sitechat_client::{markdown, SendOutcome, SessionClient};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::spawn_local;
use web_sys::{Document, Element, HtmlButtonElement};

use crate::dom;
use crate::http::GlooApi;
use crate::storage::LocalSessionStore;

/// Delay before the process button is restored and the panel collapsed
const RESET_DELAY_MS: u32 = 2000;

/// Delay before a freshly inserted message gets its entrance class
const ANIMATION_DELAY_MS: u32 = 100;

const PROCESS_BUSY_LABEL: &str = r#"<i class="fas fa-spinner fa-spin"></i> Processing..."#;

/// Marker attribute preventing duplicate listener registration on re-init
const BOUND_ATTR: &str = "data-sitechat-bound";

type Client = Rc<SessionClient<GlooApi>>;

pub struct ChatApp {
    document: Document,
    client: Client,
}

impl ChatApp {
    pub fn new() -> Result<Self, JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
        let document = window.document().ok_or_else(|| JsValue::from_str("No document"))?;

        let client = Rc::new(SessionClient::new(GlooApi, &LocalSessionStore));
        log::info!("Chat client ready, session: {}", client.session_id());

        Ok(Self { document, client })
    }

    /// Wire up the page; binding is idempotent across re-initialization
    pub fn start(&self) -> Result<(), JsValue> {
        let body = self
            .document
            .body()
            .ok_or_else(|| JsValue::from_str("No body"))?;
        if body.has_attribute(BOUND_ATTR) {
            log::warn!("Listeners already bound, skipping re-registration");
            return Ok(());
        }
        body.set_attribute(BOUND_ATTR, "true")?;

        self.setup_send_button()?;
        self.setup_enter_key()?;
        self.setup_process_button()?;
        self.setup_clear_button()?;
        self.setup_upload_toggle()?;
        self.setup_unload_handler()?;

        // Replay any server-side history into the fresh transcript
        let client = self.client.clone();
        let document = self.document.clone();
        spawn_local(async move {
            restore_history(client, document).await;
        });

        Ok(())
    }

    fn setup_send_button(&self) -> Result<(), JsValue> {
        let button = match dom::get_element_by_id(&self.document, "sendButton") {
            Ok(button) => button,
            Err(_) => {
                log::debug!("No send button; Enter key only");
                return Ok(());
            }
        };

        let client = self.client.clone();
        let document = self.document.clone();
        dom::add_click_listener(&button, move || {
            let client = client.clone();
            let document = document.clone();
            spawn_local(async move {
                if let Err(e) = send_message_handler(client, document).await {
                    log::error!("Failed to send message: {:?}", e);
                }
            });
        })
    }

    fn setup_enter_key(&self) -> Result<(), JsValue> {
        let input = dom::get_input_by_id(&self.document, "messageInput")?;

        let client = self.client.clone();
        let document = self.document.clone();
        let closure = Closure::wrap(Box::new(move |event: web_sys::KeyboardEvent| {
            if event.key() == "Enter" {
                let client = client.clone();
                let document = document.clone();
                spawn_local(async move {
                    if let Err(e) = send_message_handler(client, document).await {
                        log::error!("Failed to send message: {:?}", e);
                    }
                });
            }
        }) as Box<dyn FnMut(_)>);

        input.add_event_listener_with_callback("keypress", closure.as_ref().unchecked_ref())?;
        closure.forget();

        Ok(())
    }

    fn setup_process_button(&self) -> Result<(), JsValue> {
        let button = dom::query_selector(&self.document, ".process-btn")?;

        let client = self.client.clone();
        let document = self.document.clone();
        dom::add_click_listener(&button, move || {
            let client = client.clone();
            let document = document.clone();
            spawn_local(async move {
                if let Err(e) = process_url_handler(client, document).await {
                    log::error!("Failed to process URL: {:?}", e);
                }
            });
        })
    }

    fn setup_clear_button(&self) -> Result<(), JsValue> {
        let button = match dom::get_element_by_id(&self.document, "clearHistory") {
            Ok(button) => button,
            Err(_) => {
                log::debug!("No clear-history control");
                return Ok(());
            }
        };

        let client = self.client.clone();
        let document = self.document.clone();
        dom::add_click_listener(&button, move || {
            let client = client.clone();
            let document = document.clone();
            spawn_local(async move {
                if let Err(e) = clear_history_handler(client, document).await {
                    log::error!("Failed to clear history: {:?}", e);
                }
            });
        })
    }

    fn setup_upload_toggle(&self) -> Result<(), JsValue> {
        let toggle = dom::query_selector(&self.document, ".upload-toggle")?;

        let document = self.document.clone();
        dom::add_click_listener(&toggle, move || {
            if let Err(e) = toggle_upload(&document) {
                log::error!("Failed to toggle upload panel: {:?}", e);
            }
        })
    }

    fn setup_unload_handler(&self) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;

        let client = self.client.clone();
        let document = self.document.clone();
        let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            // Read the toggle synchronously; the request itself is
            // fire-and-forget since the page is tearing down.
            let persist = dom::get_input_by_id(&document, "persistEmbeddings")
                .map(|input| input.checked())
                .unwrap_or(false);

            let client = client.clone();
            spawn_local(async move {
                client.end_session(persist).await;
            });
        }) as Box<dyn FnMut(_)>);

        window.add_event_listener_with_callback("beforeunload", closure.as_ref().unchecked_ref())?;
        closure.forget();

        Ok(())
    }
}

async fn send_message_handler(client: Client, document: Document) -> Result<(), JsValue> {
    let input = dom::get_input_by_id(&document, "messageInput")?;
    let message = input.value();
    let message = message.trim();

    if message.is_empty() {
        return Ok(());
    }

    // Optimistic append before the network call resolves
    append_user_message(&document, message)?;
    input.set_value("");

    match client.send_message(message).await {
        SendOutcome::Reply(content) => append_assistant_message(&document, &content),
        SendOutcome::Ignored => Ok(()),
    }
}

async fn process_url_handler(client: Client, document: Document) -> Result<(), JsValue> {
    let button = dom::query_selector(&document, ".process-btn")?
        .dyn_into::<HtmlButtonElement>()
        .map_err(|_| JsValue::from_str("process control is not a button"))?;

    let original_label = button.inner_html();
    button.set_inner_html(PROCESS_BUSY_LABEL);
    button.set_disabled(true);

    let url = dom::get_input_by_id(&document, "urlInput")?.value();
    let is_sitemap = dom::get_input_by_id(&document, "isSitemap")?.checked();
    let persist_embeddings = dom::get_input_by_id(&document, "persistEmbeddings")?.checked();

    update_status(&document, "Processing URL...")?;
    let outcome = client.process_url(&url, is_sitemap, persist_embeddings).await;
    update_status(&document, &outcome.status)?;

    // Reset button after processing, then collapse the upload panel
    TimeoutFuture::new(RESET_DELAY_MS).await;
    button.set_inner_html(&original_label);
    button.set_disabled(false);
    toggle_upload(&document)
}

async fn clear_history_handler(client: Client, document: Document) -> Result<(), JsValue> {
    match client.clear_history().await {
        Ok(confirmation) => {
            let container = dom::get_element_by_id(&document, "chat-messages")?;
            dom::clear_element(&container);
            append_assistant_message(&document, confirmation)
        }
        Err(e) => {
            // No user-visible feedback; the transcript stays as-is
            log::error!("Failed to clear history: {}", e);
            Ok(())
        }
    }
}

async fn restore_history(client: Client, document: Document) {
    for exchange in client.load_history().await {
        if let Err(e) = append_user_message(&document, &exchange.user) {
            log::error!("Failed to render history entry: {:?}", e);
        }
        if let Err(e) = append_assistant_message(&document, &exchange.assistant) {
            log::error!("Failed to render history entry: {:?}", e);
        }
    }
}

/// Append a user turn; inserted as plain text so input is never parsed as markup
fn append_user_message(document: &Document, content: &str) -> Result<(), JsValue> {
    let msg_div = new_message_element(document, "user")?;
    msg_div.set_text_content(Some(content));
    attach_message(document, msg_div)
}

/// Append an assistant turn, rendered as markdown
fn append_assistant_message(document: &Document, content: &str) -> Result<(), JsValue> {
    let msg_div = new_message_element(document, "assistant")?;
    msg_div.set_inner_html(&markdown::render_assistant_content(content));
    attach_message(document, msg_div)
}

fn new_message_element(document: &Document, role: &str) -> Result<Element, JsValue> {
    dom::create_element_with_class(
        document,
        "div",
        &format!("message {}-message message-animation", role),
    )
}

fn attach_message(document: &Document, msg_div: Element) -> Result<(), JsValue> {
    let container = dom::get_element_by_id(document, "chat-messages")?;
    container.append_child(&msg_div)?;
    dom::scroll_to_bottom(&container);

    // Trigger the entrance animation shortly after insertion
    spawn_local(async move {
        TimeoutFuture::new(ANIMATION_DELAY_MS).await;
        let _ = msg_div.class_list().add_1("show");
    });

    Ok(())
}

fn update_status(document: &Document, message: &str) -> Result<(), JsValue> {
    let status = dom::get_element_by_id(document, "status")?;
    status.set_text_content(Some(message));
    Ok(())
}

/// Toggle the upload panel and recompute the transcript height to match
fn toggle_upload(document: &Document) -> Result<(), JsValue> {
    let upload_section = dom::get_element_by_id(document, "uploadSection")?;
    let toggle_button = dom::query_selector(document, ".upload-toggle")?;

    dom::toggle_class(&upload_section, "expanded")?;
    dom::toggle_class(&toggle_button, "expanded")?;

    adjust_chat_messages(document)
}

fn adjust_chat_messages(document: &Document) -> Result<(), JsValue> {
    let chat_messages = dom::get_html_element_by_id(document, "chat-messages")?;
    let upload_section = dom::get_element_by_id(document, "uploadSection")?;

    let height = if dom::has_class(&upload_section, "expanded") {
        "calc(100% - 300px)"
    } else {
        "100%"
    };
    chat_messages.style().set_property("height", height)?;

    Ok(())
}
