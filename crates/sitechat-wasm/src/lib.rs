use wasm_bindgen::prelude::*;

mod chat_ui;
mod dom;
mod http;
mod storage;

/// Initialize the WASM application
/// This sets up panic hooks and logging
#[wasm_bindgen(start)]
pub fn init() {
    // Set panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    wasm_logger::init(wasm_logger::Config::default());

    log::info!("sitechat WASM initialized");
}

/// Initialize the chat page: wire up the DOM and restore server history
#[wasm_bindgen]
pub fn start_app() -> Result<(), JsValue> {
    chat_ui::ChatApp::new()?.start()
}
