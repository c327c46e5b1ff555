use std::fmt;

use crate::model::{PanelPosition, UserModel};
use crate::storage::{KeyValueStore, PositionStore};
use crate::view::PanelView;

/// Distance of the default bottom-right anchor from the viewport edges.
pub const DEFAULT_ANCHOR_OFFSET_PX: f64 = 20.0;

/// User actions bound through the panel's single delegated listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelAction {
    Close,
    CopyId,
    ClearData,
    ActivateSubscription,
}

impl PanelAction {
    /// Attribute carrying the action tag on rendered controls.
    pub const ATTRIBUTE: &'static str = "data-action";

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Close => "close",
            Self::CopyId => "copy-id",
            Self::ClearData => "clear-data",
            Self::ActivateSubscription => "activate-sub",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "close" => Some(Self::Close),
            "copy-id" => Some(Self::CopyId),
            "clear-data" => Some(Self::ClearData),
            "activate-sub" => Some(Self::ActivateSubscription),
            _ => None,
        }
    }
}

impl fmt::Display for PanelAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Placement {
    /// Bottom-right corner, [`DEFAULT_ANCHOR_OFFSET_PX`] from both edges.
    Anchored,
    At(PanelPosition),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Loader,
    Panel,
}

/// Mounts and removes top-level surfaces on the host page.
pub trait SurfaceHost {
    type Surface;
    type Error: fmt::Display;

    fn mount_loader(&self) -> Result<Self::Surface, Self::Error>;
    fn mount_panel(
        &self,
        view: &PanelView,
        placement: Placement,
    ) -> Result<Self::Surface, Self::Error>;
    fn attach_drag(&self, surface: &mut Self::Surface) -> Result<(), Self::Error>;
    /// Installs one delegated listener dispatching `view.actions`.
    fn bind_actions(&self, surface: &mut Self::Surface, view: &PanelView)
    -> Result<(), Self::Error>;
    fn unmount(&self, surface: Self::Surface);
}

/// Owner of the single live surface. Every transition removes the old
/// surface before mounting the new one.
pub struct PanelController<H: SurfaceHost, S> {
    host: H,
    positions: PositionStore<S>,
    live: Option<(SurfaceKind, H::Surface)>,
}

impl<H: SurfaceHost, S: KeyValueStore> PanelController<H, S> {
    pub fn new(host: H, positions: PositionStore<S>) -> Self {
        Self {
            host,
            positions,
            live: None,
        }
    }

    #[must_use]
    pub fn live_kind(&self) -> Option<SurfaceKind> {
        self.live.as_ref().map(|(kind, _)| *kind)
    }

    pub fn show_loading(&mut self) -> Result<(), H::Error> {
        if self.live_kind() == Some(SurfaceKind::Loader) {
            return Ok(());
        }
        self.hide_all();
        let loader = self.host.mount_loader()?;
        self.live = Some((SurfaceKind::Loader, loader));
        Ok(())
    }

    pub fn show_panel(&mut self, model: &UserModel) -> Result<(), H::Error> {
        self.hide_all();

        let view = PanelView::from_model(model);
        let placement = self
            .positions
            .load()
            .map_or(Placement::Anchored, Placement::At);
        let mut panel = self.host.mount_panel(&view, placement)?;

        let wired = self
            .host
            .attach_drag(&mut panel)
            .and_then(|()| self.host.bind_actions(&mut panel, &view));
        if let Err(error) = wired {
            self.host.unmount(panel);
            return Err(error);
        }

        self.live = Some((SurfaceKind::Panel, panel));
        Ok(())
    }

    pub fn hide_loader(&mut self) {
        if self.live_kind() == Some(SurfaceKind::Loader) {
            self.hide_all();
        }
    }

    pub fn hide_all(&mut self) {
        if let Some((_, surface)) = self.live.take() {
            self.host.unmount(surface);
        }
    }
}
