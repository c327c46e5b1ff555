#[cfg(any(target_arch = "wasm32", test))]
mod layout;
#[cfg(target_arch = "wasm32")]
mod wasm_constants;

#[cfg(target_arch = "wasm32")]
mod wasm {
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    use async_trait::async_trait;
    use inspector_core::{
        ActivationControl, ActivationState, CancelHandle, ClearDataLabel, Clipboard,
        ClipboardError, CopyFeedback, DocumentReadiness, DragPositionManager, HttpTransport,
        JsonReply, JsonRequest, KeyValueStore, Overlay, OverlayConfig, PageLocation,
        PageReloader, PanelAction, PanelController, PanelView, Placement, Point, PositionStore,
        RemoteActivationClient, SiteDataHost, SiteDataReset, Sleeper, StatusSink, StorageError,
        StorageWatcher, SurfaceHost, SurfaceKind, TransportError, WatchSchedule,
        copy_with_feedback, run_clear_data,
    };
    use serde::Serialize;
    use tracing::{debug, info, warn};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::spawn_local;
    use web_sys::{Element, HtmlElement, MouseEvent};

    use crate::layout::{config_from_global, placement_styles, rendered_position};
    use crate::wasm_constants::*;

    mod actions;
    mod browser;
    mod dom;
    mod logging;
    mod network;

    use actions::*;
    use browser::*;
    use dom::*;
    use network::*;

    type BrowserOverlay = Overlay<DomHost, BrowserStorage>;

    thread_local! {
        static OVERLAY: RefCell<Option<BrowserOverlay>> = const { RefCell::new(None) };
        static CONFIG: RefCell<OverlayConfig> = RefCell::new(OverlayConfig::default());
        static WATCH_CANCEL: RefCell<Option<CancelHandle>> = const { RefCell::new(None) };
    }

    #[derive(Debug, Serialize)]
    #[serde(rename_all = "camelCase")]
    struct InspectorStatus {
        running: bool,
        surface: Option<&'static str>,
        poll_interval_ms: u64,
    }

    #[wasm_bindgen(start)]
    pub fn start() {
        console_error_panic_hook::set_once();
        logging::install();
        if let Err(error) = boot() {
            warn!(%error, "user inspector failed to start");
        }
    }

    /// Stops polling and removes whatever surface is on screen.
    #[wasm_bindgen]
    pub fn stop_inspector() {
        if let Some(cancel) = WATCH_CANCEL.with(|slot| slot.borrow_mut().take()) {
            cancel.cancel();
        }
        with_overlay(|overlay| overlay.close());
        info!("user inspector stopped");
    }

    #[wasm_bindgen]
    pub fn inspector_state_json() -> String {
        let running = WATCH_CANCEL.with(|slot| slot.borrow().is_some());
        let surface = with_overlay(|overlay| overlay.controller().live_kind())
            .flatten()
            .map(|kind| match kind {
                SurfaceKind::Loader => "loader",
                SurfaceKind::Panel => "panel",
            });
        let status = InspectorStatus {
            running,
            surface,
            poll_interval_ms: config().poll_interval_ms,
        };
        serde_json::to_string(&status).unwrap_or_else(|_| "{}".to_string())
    }

    fn boot() -> Result<(), String> {
        let config = config_from_global(read_config_global().as_deref());
        CONFIG.with(|slot| *slot.borrow_mut() = config.clone());

        let positions = PositionStore::new(BrowserStorage::Local, &config.position_storage_key);
        let host = DomHost::new(positions.clone())?;
        let mut overlay = Overlay::new(PanelController::new(host, positions));
        if let Err(error) = overlay.start() {
            warn!(%error, "failed to show loader");
        }
        OVERLAY.with(|slot| *slot.borrow_mut() = Some(overlay));

        let cancel = CancelHandle::default();
        WATCH_CANCEL.with(|slot| *slot.borrow_mut() = Some(cancel.clone()));
        let watcher = StorageWatcher::new(
            BrowserStorage::Local,
            config.user_storage_key.clone(),
            GlooSleeper,
            WatchSchedule::from_config(&config),
        );
        spawn_local(async move {
            watcher
                .run(&PageReadiness, cancel, |event| {
                    with_overlay(|overlay| overlay.apply_event(event).map(|_| ()))
                        .unwrap_or(Ok(()))
                })
                .await;
        });
        info!(key = %config.user_storage_key, "user inspector started");
        Ok(())
    }

    pub(super) fn config() -> OverlayConfig {
        CONFIG.with(|slot| slot.borrow().clone())
    }

    pub(super) fn with_overlay<R>(f: impl FnOnce(&mut BrowserOverlay) -> R) -> Option<R> {
        OVERLAY.with(|slot| slot.borrow_mut().as_mut().map(f))
    }
}

#[cfg(target_arch = "wasm32")]
pub use wasm::inspector_state_json;

#[cfg(not(target_arch = "wasm32"))]
pub fn inspector_state_json() -> String {
    "{\"running\":false,\"detail\":\"the inspector only runs on wasm\"}".to_string()
}
