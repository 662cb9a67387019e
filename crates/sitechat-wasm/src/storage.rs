use sitechat_client::SessionStore;

/// Local-storage key holding the persisted session identifier
pub const SESSION_ID_KEY: &str = "sessionId";

/// Session store backed by `window.localStorage`
///
/// Read-only for this unit: the id is written by whatever provisioned the
/// page, and absent storage simply yields no id.
pub struct LocalSessionStore;

impl SessionStore for LocalSessionStore {
    fn load_session_id(&self) -> Option<String> {
        let storage = web_sys::window()?.local_storage().ok()??;
        storage.get_item(SESSION_ID_KEY).ok()?
    }
}
