//! Host-agnostic engine behind the user inspector overlay.
//!
//! The browser crate implements the seams declared here (`KeyValueStore`,
//! `SurfaceHost`, `HttpTransport`, `Clipboard`, `SiteDataHost`, `Sleeper`,
//! `StatusSink`) and drives [`overlay::Overlay`] from a poll loop.

pub mod activation;
pub mod clipboard;
pub mod config;
pub mod decode;
pub mod drag;
pub mod host;
pub mod model;
pub mod overlay;
pub mod panel;
pub mod reset;
pub mod storage;
pub mod view;
pub mod watcher;

pub use activation::{
    ActivationControl, ActivationError, ActivationState, HttpTransport, JsonReply, JsonRequest,
    RemoteActivationClient, TransportError,
};
pub use clipboard::{Clipboard, ClipboardError, CopyFeedback, copy_with_feedback};
pub use config::{ActivationSettings, ConfigError, Credentials, OverlayConfig};
pub use decode::{DecodeError, Decoded, RecordLayer, decode, is_new_record, parse_user_record};
pub use drag::{DragPositionManager, DragSession, Point};
pub use host::{DocumentReadiness, PageLocation, PageReloader, Sleeper, StatusSink};
pub use model::{ActiveSubscription, PanelPosition, Scalar, UserModel};
pub use overlay::{Overlay, Transition};
pub use panel::{PanelAction, PanelController, Placement, SurfaceHost, SurfaceKind};
pub use reset::{ClearDataLabel, ResetError, SiteDataHost, SiteDataReset, run_clear_data};
pub use storage::{KeyValueStore, PositionStore, StorageError};
pub use view::{InfoLine, PanelView, Tone};
pub use watcher::{CancelHandle, ChangeDetector, StorageWatcher, WatchEvent, WatchSchedule};
