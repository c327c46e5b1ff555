use tracing::warn;

use crate::model::PanelPosition;
use crate::panel::DEFAULT_ANCHOR_OFFSET_PX;
use crate::storage::{KeyValueStore, PositionStore, StorageError};

/// Distance from the viewport bottom used when a drag ends without a
/// readable position.
const FALLBACK_BOTTOM_CLEARANCE_PX: f64 = 100.0;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Pointer state for one surface. A second pointer-down re-captures the
/// offset of the same session instead of opening another one.
#[derive(Debug, Clone, Default)]
pub struct DragSession {
    dragging: bool,
    offset: Point,
}

impl DragSession {
    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.dragging
    }

    /// `surface_origin` is the top-left corner of the surface's rendered box.
    pub fn pointer_down(&mut self, pointer: Point, surface_origin: Point) {
        self.dragging = true;
        self.offset = Point::new(pointer.x - surface_origin.x, pointer.y - surface_origin.y);
    }

    /// New left/top for the surface, or `None` when no drag is active.
    pub fn pointer_move(&self, pointer: Point) -> Option<PanelPosition> {
        self.dragging.then(|| {
            PanelPosition::new(pointer.x - self.offset.x, pointer.y - self.offset.y)
        })
    }

    /// Ends the drag and returns the position to persist. A pointer-up
    /// outside a drag is a no-op.
    pub fn pointer_up(
        &mut self,
        final_position: Option<PanelPosition>,
        viewport_height: f64,
    ) -> Option<PanelPosition> {
        if !self.dragging {
            return None;
        }
        self.dragging = false;
        Some(
            final_position
                .filter(PanelPosition::is_finite)
                .unwrap_or_else(|| fallback_position(viewport_height)),
        )
    }
}

fn fallback_position(viewport_height: f64) -> PanelPosition {
    let top = if viewport_height.is_finite() {
        viewport_height - FALLBACK_BOTTOM_CLEARANCE_PX
    } else {
        DEFAULT_ANCHOR_OFFSET_PX
    };
    PanelPosition::new(DEFAULT_ANCHOR_OFFSET_PX, top)
}

/// Drag session bound to the persisted placement.
#[derive(Debug, Clone)]
pub struct DragPositionManager<S> {
    session: DragSession,
    positions: PositionStore<S>,
}

impl<S: KeyValueStore> DragPositionManager<S> {
    pub fn new(positions: PositionStore<S>) -> Self {
        Self {
            session: DragSession::default(),
            positions,
        }
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.session.is_dragging()
    }

    pub fn begin(&mut self, pointer: Point, surface_origin: Point) {
        self.session.pointer_down(pointer, surface_origin);
    }

    pub fn drag_to(&self, pointer: Point) -> Option<PanelPosition> {
        self.session.pointer_move(pointer)
    }

    /// Persists the final placement of a finished drag.
    pub fn end(
        &mut self,
        final_position: Option<PanelPosition>,
        viewport_height: f64,
    ) -> Result<Option<PanelPosition>, StorageError> {
        let Some(position) = self.session.pointer_up(final_position, viewport_height) else {
            return Ok(None);
        };
        if let Err(error) = self.positions.save(position) {
            warn!(%error, "failed to persist panel position");
            return Err(error);
        }
        Ok(Some(position))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::testing::MemoryStore;

    #[test]
    fn move_keeps_pointer_offset() {
        let mut session = DragSession::default();
        assert_eq!(session.pointer_move(Point::new(5.0, 5.0)), None);

        session.pointer_down(Point::new(110.0, 220.0), Point::new(100.0, 200.0));
        assert_eq!(
            session.pointer_move(Point::new(60.0, 120.0)),
            Some(PanelPosition::new(50.0, 100.0))
        );
    }

    #[test]
    fn pointer_up_without_drag_is_noop() {
        let store = MemoryStore::default();
        let mut manager = DragPositionManager::new(PositionStore::new(&store, "pos"));
        assert_eq!(
            manager.end(Some(PanelPosition::new(1.0, 2.0)), 800.0),
            Ok(None)
        );
        assert!(store.items.borrow().is_empty());
    }

    #[test]
    fn unreadable_final_position_falls_back() {
        let mut session = DragSession::default();
        session.pointer_down(Point::default(), Point::default());
        assert_eq!(
            session.pointer_up(Some(PanelPosition::new(f64::NAN, 3.0)), 900.0),
            Some(PanelPosition::new(20.0, 800.0))
        );
        assert!(!session.is_dragging());
    }

    #[test]
    fn only_last_gesture_is_persisted() {
        let store = MemoryStore::default();
        let positions = PositionStore::new(&store, "pos");
        let mut manager = DragPositionManager::new(positions.clone());

        manager.begin(Point::new(10.0, 10.0), Point::new(0.0, 0.0));
        let first = manager.drag_to(Point::new(30.0, 40.0));
        manager.end(first, 800.0).expect("first gesture");

        manager.begin(Point::new(30.0, 40.0), Point::new(20.0, 30.0));
        let intermediate = manager.drag_to(Point::new(100.0, 100.0));
        assert_eq!(intermediate, Some(PanelPosition::new(90.0, 90.0)));
        let last = manager.drag_to(Point::new(52.0, 109.0));
        manager.end(last, 800.0).expect("second gesture");

        assert_eq!(positions.load(), Some(PanelPosition::new(42.0, 99.0)));
    }
}
