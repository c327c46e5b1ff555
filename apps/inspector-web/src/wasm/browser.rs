use super::*;

use inspector_core::config::CONFIG_GLOBAL;
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlDocument, Storage};

fn window() -> Result<web_sys::Window, String> {
    web_sys::window().ok_or_else(|| "window is unavailable".to_string())
}

pub(super) fn document() -> Result<web_sys::Document, String> {
    window()?
        .document()
        .ok_or_else(|| "document is unavailable".to_string())
}

/// `localStorage` or `sessionStorage` of the host page, looked up on each
/// access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum BrowserStorage {
    Local,
    Session,
}

impl BrowserStorage {
    fn storage(self) -> Result<Storage, StorageError> {
        let window = web_sys::window().ok_or(StorageError::Unavailable)?;
        let storage = match self {
            Self::Local => window.local_storage(),
            Self::Session => window.session_storage(),
        };
        storage
            .map_err(|_| StorageError::Unavailable)?
            .ok_or(StorageError::Unavailable)
    }
}

impl KeyValueStore for BrowserStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.storage()?
            .get_item(key)
            .map_err(|_| StorageError::Read {
                key: key.to_string(),
            })
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.storage()?
            .set_item(key, value)
            .map_err(|_| StorageError::Write {
                key: key.to_string(),
            })
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.storage()?.clear().map_err(|_| StorageError::Clear)
    }
}

/// Storage and cookies of the current document.
pub(super) struct BrowserSiteData;

impl BrowserSiteData {
    fn html_document() -> Result<HtmlDocument, StorageError> {
        document()
            .map_err(|_| StorageError::Cookies)?
            .dyn_into::<HtmlDocument>()
            .map_err(|_| StorageError::Cookies)
    }
}

impl SiteDataHost for BrowserSiteData {
    fn clear_local_storage(&self) -> Result<(), StorageError> {
        BrowserStorage::Local.clear()
    }

    fn clear_session_storage(&self) -> Result<(), StorageError> {
        BrowserStorage::Session.clear()
    }

    fn cookie_header(&self) -> Result<String, StorageError> {
        Self::html_document()?
            .cookie()
            .map_err(|_| StorageError::Cookies)
    }

    fn write_cookie(&self, directive: &str) -> Result<(), StorageError> {
        Self::html_document()?
            .set_cookie(directive)
            .map_err(|_| StorageError::Cookies)
    }
}

pub(super) struct GlooSleeper;

#[async_trait(?Send)]
impl Sleeper for GlooSleeper {
    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}

pub(super) struct PageReadiness;

impl DocumentReadiness for PageReadiness {
    fn is_fully_loaded(&self) -> bool {
        document()
            .ok()
            .and_then(|document| js_sys::Reflect::get(&document, &JsValue::from_str("readyState")).ok())
            .and_then(|state| state.as_string())
            .is_some_and(|state| state == "complete")
    }
}

pub(super) struct PageReload;

impl PageReloader for PageReload {
    fn reload(&self) {
        let reloaded = window().and_then(|window| {
            window
                .location()
                .reload()
                .map_err(|_| "location reload failed".to_string())
        });
        if let Err(error) = reloaded {
            warn!(%error, "failed to reload page");
        }
    }
}

pub(super) fn current_location() -> Result<PageLocation, String> {
    let location = window()?.location();
    let hostname = location
        .hostname()
        .map_err(|_| "location hostname is unavailable".to_string())?;
    let pathname = location
        .pathname()
        .map_err(|_| "location pathname is unavailable".to_string())?;
    Ok(PageLocation::new(hostname, pathname))
}

/// `navigator.clipboard.writeText`, reached through `Reflect` so no unstable
/// web-sys API is needed.
pub(super) struct JsClipboard;

#[async_trait(?Send)]
impl Clipboard for JsClipboard {
    async fn write_text(&self, text: &str) -> Result<(), ClipboardError> {
        let navigator = window()
            .map_err(|_| ClipboardError::Unavailable)?
            .navigator();
        let clipboard = js_sys::Reflect::get(&navigator, &JsValue::from_str(CLIPBOARD_GLOBAL))
            .ok()
            .filter(|value| !value.is_undefined() && !value.is_null())
            .ok_or(ClipboardError::Unavailable)?;
        let write_text = js_sys::Reflect::get(&clipboard, &JsValue::from_str(CLIPBOARD_WRITE_TEXT))
            .ok()
            .and_then(|value| value.dyn_into::<js_sys::Function>().ok())
            .ok_or(ClipboardError::Unavailable)?;
        let promise = write_text
            .call1(&clipboard, &JsValue::from_str(text))
            .map_err(|error| ClipboardError::Rejected(js_error_text(&error)))?
            .dyn_into::<js_sys::Promise>()
            .map_err(|_| ClipboardError::Unavailable)?;
        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|error| ClipboardError::Rejected(js_error_text(&error)))
    }
}

fn js_error_text(error: &JsValue) -> String {
    error
        .as_string()
        .or_else(|| {
            js_sys::Reflect::get(error, &JsValue::from_str("message"))
                .ok()
                .and_then(|message| message.as_string())
        })
        .unwrap_or_else(|| "unknown error".to_string())
}

/// The operator config global as JSON text. Objects are serialized with
/// `JSON.stringify`; strings are taken as-is.
pub(super) fn read_config_global() -> Option<String> {
    let window = web_sys::window()?;
    let value = js_sys::Reflect::get(&window, &JsValue::from_str(CONFIG_GLOBAL)).ok()?;
    if value.is_undefined() || value.is_null() {
        return None;
    }
    if let Some(raw) = value.as_string() {
        return Some(raw);
    }
    js_sys::JSON::stringify(&value)
        .ok()
        .and_then(|raw| raw.as_string())
}
