use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use inspector_core::{
    CancelHandle, DocumentReadiness, DragPositionManager, KeyValueStore, Overlay, PanelController,
    PanelPosition, PanelView, Placement, Point, PositionStore, Sleeper, StorageError,
    StorageWatcher, SurfaceHost, SurfaceKind, Transition, WatchEvent, WatchSchedule,
};
use quickcheck::quickcheck;

const RECORD_U1: &str = r#"{"user":"{\"id\":\"u1\",\"isTUser\":true}"}"#;
const RECORD_U2: &str = r#"{"user":"{\"id\":\"u2\",\"isTUser\":false}"}"#;

#[derive(Default)]
struct Screen {
    next_id: u32,
    live: Vec<(u32, SurfaceKind)>,
    placements: Vec<Placement>,
    ids: Vec<String>,
}

#[derive(Clone, Default)]
struct RecordingHost(Rc<RefCell<Screen>>);

impl RecordingHost {
    fn live_kinds(&self) -> Vec<SurfaceKind> {
        self.0.borrow().live.iter().map(|(_, kind)| *kind).collect()
    }

    fn mount(&self, kind: SurfaceKind) -> u32 {
        let mut screen = self.0.borrow_mut();
        screen.next_id += 1;
        let id = screen.next_id;
        screen.live.push((id, kind));
        id
    }
}

impl SurfaceHost for RecordingHost {
    type Surface = u32;
    type Error = String;

    fn mount_loader(&self) -> Result<u32, String> {
        Ok(self.mount(SurfaceKind::Loader))
    }

    fn mount_panel(&self, view: &PanelView, placement: Placement) -> Result<u32, String> {
        {
            let mut screen = self.0.borrow_mut();
            screen.placements.push(placement);
            screen.ids.push(view.user_id.clone());
        }
        Ok(self.mount(SurfaceKind::Panel))
    }

    fn attach_drag(&self, _surface: &mut u32) -> Result<(), String> {
        Ok(())
    }

    fn bind_actions(&self, _surface: &mut u32, _view: &PanelView) -> Result<(), String> {
        Ok(())
    }

    fn unmount(&self, surface: u32) {
        self.0.borrow_mut().live.retain(|(id, _)| *id != surface);
    }
}

#[derive(Default)]
struct LocalStore(RefCell<BTreeMap<String, String>>);

impl KeyValueStore for LocalStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.0.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.0.borrow_mut().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StorageError> {
        self.0.borrow_mut().clear();
        Ok(())
    }
}

/// Plays back a fixed sequence of stored records, then stops the watcher.
struct Playback {
    records: RefCell<VecDeque<Option<&'static str>>>,
    cancel: CancelHandle,
}

impl KeyValueStore for Playback {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        let mut records = self.records.borrow_mut();
        let next = records.pop_front().flatten().map(str::to_string);
        if records.is_empty() {
            self.cancel.cancel();
        }
        Ok(next)
    }

    fn set_item(&self, key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Write {
            key: key.to_string(),
        })
    }

    fn clear(&self) -> Result<(), StorageError> {
        Err(StorageError::Clear)
    }
}

struct Instant;

#[async_trait(?Send)]
impl Sleeper for Instant {
    async fn sleep(&self, _duration: Duration) {}
}

struct Loaded(Cell<bool>);

impl DocumentReadiness for Loaded {
    fn is_fully_loaded(&self) -> bool {
        self.0.get()
    }
}

fn schedule() -> WatchSchedule {
    WatchSchedule {
        poll_interval: Duration::from_millis(1_000),
        settle_delay: Duration::from_millis(1_000),
        readiness_check_interval: Duration::from_millis(16),
    }
}

#[test]
fn dragged_position_is_restored_by_the_next_panel() -> Result<()> {
    let host = RecordingHost::default();
    let storage = LocalStore::default();
    let positions = PositionStore::new(&storage, "userInfoPanelPosition");
    let mut overlay = Overlay::new(PanelController::new(host.clone(), positions.clone()));
    let mut drag = DragPositionManager::new(positions);

    overlay.apply_raw(Some(RECORD_U1)).map_err(anyhow::Error::msg)?;

    drag.begin(Point::new(30.0, 30.0), Point::new(20.0, 20.0));
    let moved = drag.drag_to(Point::new(52.0, 109.0));
    let saved = drag.end(moved, 900.0)?.context("drag should persist")?;
    assert_eq!(saved, PanelPosition::new(42.0, 99.0));

    overlay.apply_raw(Some(RECORD_U2)).map_err(anyhow::Error::msg)?;

    let screen = host.0.borrow();
    assert_eq!(
        screen.placements,
        [
            Placement::Anchored,
            Placement::At(PanelPosition::new(42.0, 99.0))
        ]
    );
    assert_eq!(screen.ids, ["u1", "u2"]);
    Ok(())
}

#[test]
fn watcher_drives_loader_panel_and_hide() -> Result<()> {
    let host = RecordingHost::default();
    let storage = LocalStore::default();
    let mut overlay = Overlay::new(PanelController::new(
        host.clone(),
        PositionStore::new(&storage, "userInfoPanelPosition"),
    ));
    overlay.start().map_err(anyhow::Error::msg)?;
    assert_eq!(host.live_kinds(), [SurfaceKind::Loader]);

    let cancel = CancelHandle::default();
    let playback = Playback {
        records: RefCell::new(VecDeque::from([
            None,
            Some(RECORD_U1),
            Some(RECORD_U1),
            Some(r#"{"user":"null"}"#),
        ])),
        cancel: cancel.clone(),
    };
    let watcher = StorageWatcher::new(&playback, "persist:user", Instant, schedule());

    let mut transitions = Vec::new();
    pollster::block_on(watcher.run(&Loaded(Cell::new(true)), cancel, |event| {
        let first = event == WatchEvent::NothingStored;
        let transition = overlay.apply_event(event)?;
        transitions.push((first, transition));
        Ok::<(), String>(())
    }));

    assert_eq!(
        transitions,
        [
            (true, Transition::Hidden),
            (false, Transition::Panel),
            (false, Transition::Hidden)
        ]
    );
    assert!(host.live_kinds().is_empty());
    Ok(())
}

#[test]
fn showing_the_same_user_twice_keeps_one_panel() -> Result<()> {
    let host = RecordingHost::default();
    let storage = LocalStore::default();
    let mut controller = PanelController::new(
        host.clone(),
        PositionStore::new(&storage, "userInfoPanelPosition"),
    );
    let model = inspector_core::parse_user_record(RECORD_U1)?.context("renderable user")?;

    controller.show_panel(&model).map_err(anyhow::Error::msg)?;
    controller.show_panel(&model).map_err(anyhow::Error::msg)?;

    assert_eq!(host.live_kinds(), [SurfaceKind::Panel]);
    Ok(())
}

quickcheck! {
    fn identical_records_are_unchanged_the_second_time(raw: String) -> bool {
        let host = RecordingHost::default();
        let storage = LocalStore::default();
        let mut overlay = Overlay::new(PanelController::new(
            host,
            PositionStore::new(&storage, "pos"),
        ));
        let _ = overlay.apply_raw(Some(&raw));
        overlay.apply_raw(Some(&raw)) == Ok(Transition::Unchanged)
    }
}
