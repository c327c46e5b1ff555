use tracing::{debug, warn};

use crate::decode::{Decoded, decode};
use crate::panel::{PanelController, SurfaceHost};
use crate::storage::KeyValueStore;
use crate::watcher::WatchEvent;

/// What one observed record did to the screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Unchanged,
    Panel,
    Hidden,
    /// Malformed record. Whatever panel was up stays up.
    Rejected,
}

/// Decoder and panel controller glued together. Feed it raw records, in
/// order, from one watcher.
pub struct Overlay<H: SurfaceHost, S> {
    controller: PanelController<H, S>,
    last_raw: Option<String>,
}

impl<H: SurfaceHost, S: KeyValueStore> Overlay<H, S> {
    pub fn new(controller: PanelController<H, S>) -> Self {
        Self {
            controller,
            last_raw: None,
        }
    }

    /// Shows the startup loader.
    pub fn start(&mut self) -> Result<(), H::Error> {
        self.controller.show_loading()
    }

    pub fn apply_event(&mut self, event: WatchEvent) -> Result<Transition, H::Error> {
        match event {
            WatchEvent::Changed(raw) => self.apply_raw(Some(&raw)),
            WatchEvent::NothingStored => {
                debug!("no user record stored, removing loader");
                self.controller.hide_all();
                Ok(Transition::Hidden)
            }
        }
    }

    pub fn apply_raw(&mut self, raw: Option<&str>) -> Result<Transition, H::Error> {
        let decoded = decode(self.last_raw.as_deref(), raw);
        if !matches!(decoded, Ok(Decoded::Unchanged)) {
            self.last_raw = raw.map(str::to_string);
        }

        match decoded {
            Ok(Decoded::Unchanged) => Ok(Transition::Unchanged),
            Ok(Decoded::Changed(Some(model))) => {
                self.controller.show_panel(&model)?;
                Ok(Transition::Panel)
            }
            Ok(Decoded::Changed(None)) => {
                self.controller.hide_all();
                Ok(Transition::Hidden)
            }
            Err(error) => {
                warn!(%error, "ignoring unreadable user record");
                self.controller.hide_loader();
                Ok(Transition::Rejected)
            }
        }
    }

    /// The panel's close action.
    pub fn close(&mut self) {
        self.controller.hide_all();
    }

    pub fn controller(&self) -> &PanelController<H, S> {
        &self.controller
    }
}
