// Map Explorer - client state machine over the published preserve collection
// Loading -> Ready (optionally with a selection) | Error. One fetch, everything after is local.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::client::filter::FilterCriteria;
use crate::client::source::PreserveSource;
use crate::client::view::{ExplorerView, ListRow, Marker};
use crate::core::PreserveId;
use crate::models::{Amenity, AmenitySet, BoundingBox, PublicPreserve};

/// Observable state of the explorer
#[derive(Debug, Clone, PartialEq)]
pub enum ExplorerState {
    Loading,
    Ready,
    Selected(PreserveId),
    Error(String),
    TornDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other,
}

/// Where a selection came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Marker,
    ListRow,
}

/// Flips once when the page goes away; an in-flight fetch checks it before touching state.
#[derive(Debug, Clone, Default)]
pub struct TeardownHandle(Arc<AtomicBool>);

impl TeardownHandle {
    pub fn teardown(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_torn_down(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug)]
struct ReadyState {
    collection: Vec<PublicPreserve>,
    criteria: FilterCriteria,
    visible: Vec<usize>,
    selected: Option<PreserveId>,
}

impl ReadyState {
    fn find(&self, id: PreserveId) -> Option<&PublicPreserve> {
        self.collection.iter().find(|p| p.id == id)
    }

    fn is_visible(&self, id: PreserveId) -> bool {
        self.visible.iter().any(|&i| self.collection[i].id == id)
    }
}

#[derive(Debug)]
enum Phase {
    Loading,
    Ready(ReadyState),
    Failed(String),
    TornDown,
}

pub struct Explorer<V: ExplorerView> {
    source: Arc<dyn PreserveSource>,
    view: V,
    phase: Phase,
    teardown: TeardownHandle,
    fetch_started: bool,
}

impl<V: ExplorerView> Explorer<V> {
    pub fn new(source: Arc<dyn PreserveSource>, view: V) -> Self {
        Self {
            source,
            view,
            phase: Phase::Loading,
            teardown: TeardownHandle::default(),
            fetch_started: false,
        }
    }

    pub fn teardown_handle(&self) -> TeardownHandle {
        self.teardown.clone()
    }

    pub fn teardown(&mut self) {
        self.teardown.teardown();
        self.phase = Phase::TornDown;
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn state(&self) -> ExplorerState {
        match &self.phase {
            Phase::Loading => ExplorerState::Loading,
            Phase::Ready(ready) => match ready.selected {
                Some(id) => ExplorerState::Selected(id),
                None => ExplorerState::Ready,
            },
            Phase::Failed(message) => ExplorerState::Error(message.clone()),
            Phase::TornDown => ExplorerState::TornDown,
        }
    }

    /// Issue the one collection fetch. Calling again after the first attempt is a no-op;
    /// recovering from an error takes a fresh explorer (a page reload).
    pub async fn load(&mut self) {
        if self.fetch_started || self.teardown.is_torn_down() {
            return;
        }
        self.fetch_started = true;
        self.view.show_loading();

        let result = self.source.fetch_collection().await;

        if self.teardown.is_torn_down() {
            debug!("Explorer torn down during fetch; discarding result");
            self.phase = Phase::TornDown;
            return;
        }

        match result {
            Ok(collection) => {
                info!("Loaded {} preserves", collection.len());
                self.phase = Phase::Ready(ReadyState {
                    collection,
                    criteria: FilterCriteria::default(),
                    visible: Vec::new(),
                    selected: None,
                });
                self.refresh();
            }
            Err(err) => {
                warn!("Failed to load preserves: {}", err);
                let message =
                    "Preserves could not be loaded. Reload the page to try again.".to_string();
                self.view.show_error(&message);
                self.phase = Phase::Failed(message);
            }
        }
    }

    /// Preserves passing the current filters, in collection order
    pub fn visible(&self) -> Vec<&PublicPreserve> {
        match &self.phase {
            Phase::Ready(ready) => ready.visible.iter().map(|&i| &ready.collection[i]).collect(),
            _ => Vec::new(),
        }
    }

    pub fn selected(&self) -> Option<&PublicPreserve> {
        match &self.phase {
            Phase::Ready(ready) => ready.selected.and_then(|id| ready.find(id)),
            _ => None,
        }
    }

    pub fn criteria(&self) -> Option<&FilterCriteria> {
        match &self.phase {
            Phase::Ready(ready) => Some(&ready.criteria),
            _ => None,
        }
    }

    pub fn set_search_text(&mut self, text: &str) {
        self.update_criteria(|c| c.set_text(text));
    }

    pub fn toggle_amenity(&mut self, amenity: Amenity) {
        self.update_criteria(|c| {
            if !c.amenities.remove(&amenity) {
                c.amenities.insert(amenity);
            }
        });
    }

    pub fn set_amenities(&mut self, amenities: AmenitySet) {
        self.update_criteria(|c| c.amenities = amenities);
    }

    /// Called whenever the map viewport moves
    pub fn set_viewport(&mut self, viewport: Option<BoundingBox>) {
        self.update_criteria(|c| c.viewport = viewport);
    }

    pub fn set_viewport_filtering(&mut self, enabled: bool) {
        self.update_criteria(|c| c.viewport_filtering = enabled);
    }

    /// Reset text and amenity filters. The viewport toggle belongs to the map and stays.
    pub fn clear_filters(&mut self) {
        self.update_criteria(FilterCriteria::clear);
    }

    /// Select a visible preserve. Returns false when it is unknown or filtered out.
    pub fn select(&mut self, id: PreserveId, source: SelectionSource) -> bool {
        let Phase::Ready(ready) = &mut self.phase else {
            return false;
        };
        if !ready.is_visible(id) {
            debug!("Ignoring selection of hidden preserve {}", id);
            return false;
        }
        let location = ready.find(id).and_then(|p| p.location);
        if source == SelectionSource::Marker && location.is_none() {
            return false;
        }
        ready.selected = Some(id);

        self.refresh();
        self.view.highlight_row(Some(id));
        // Unlocated preserves are highlighted in the list without moving the map
        if let Some(point) = location {
            self.view.center_map(point);
        }
        true
    }

    pub fn deselect(&mut self) {
        let cleared = match &mut self.phase {
            Phase::Ready(ready) => ready.selected.take().is_some(),
            _ => false,
        };
        if cleared {
            self.refresh();
            self.view.highlight_row(None);
        }
    }

    pub fn handle_key(&mut self, key: Key) {
        if key == Key::Escape {
            self.deselect();
        }
    }

    /// Click on the map outside any marker
    pub fn click_map_background(&mut self) {
        self.deselect();
    }

    fn update_criteria<F: FnOnce(&mut FilterCriteria)>(&mut self, change: F) {
        if let Phase::Ready(ready) = &mut self.phase {
            change(&mut ready.criteria);
            self.refresh();
        }
    }

    /// Recompute the visible subset and redraw list and markers
    fn refresh(&mut self) {
        let Phase::Ready(ready) = &mut self.phase else {
            return;
        };

        ready.visible = ready
            .collection
            .iter()
            .enumerate()
            .filter(|(_, p)| ready.criteria.matches(p))
            .map(|(i, _)| i)
            .collect();

        if let Some(id) = ready.selected {
            if !ready.is_visible(id) {
                ready.selected = None;
                self.view.highlight_row(None);
            }
        }

        let selected = ready.selected;
        let rows: Vec<ListRow> = ready
            .visible
            .iter()
            .map(|&i| {
                let p = &ready.collection[i];
                ListRow {
                    id: p.id,
                    title: p.title.clone(),
                    has_location: p.location.is_some(),
                    selected: selected == Some(p.id),
                }
            })
            .collect();
        let markers: Vec<Marker> = ready
            .visible
            .iter()
            .filter_map(|&i| {
                let p = &ready.collection[i];
                p.location.map(|position| Marker {
                    id: p.id,
                    title: p.title.clone(),
                    position,
                    selected: selected == Some(p.id),
                })
            })
            .collect();

        if rows.is_empty() {
            self.view.show_no_matches();
        }
        self.view.render_list(&rows);
        self.view.render_markers(&markers);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};
    use crate::models::{GeoPoint, PreserveStatus};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::{oneshot, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Loading,
        Error(String),
        List(Vec<PreserveId>),
        Markers(Vec<PreserveId>),
        NoMatches,
        Highlight(Option<PreserveId>),
        Center(GeoPoint),
    }

    #[derive(Default)]
    struct RecordingView {
        events: Vec<Event>,
        selected_rows: Vec<PreserveId>,
        selected_markers: Vec<PreserveId>,
    }

    impl RecordingView {
        fn last_list(&self) -> Option<&Vec<PreserveId>> {
            self.events.iter().rev().find_map(|e| match e {
                Event::List(ids) => Some(ids),
                _ => None,
            })
        }

        fn last_markers(&self) -> Option<&Vec<PreserveId>> {
            self.events.iter().rev().find_map(|e| match e {
                Event::Markers(ids) => Some(ids),
                _ => None,
            })
        }
    }

    impl ExplorerView for RecordingView {
        fn show_loading(&mut self) {
            self.events.push(Event::Loading);
        }
        fn show_error(&mut self, message: &str) {
            self.events.push(Event::Error(message.to_string()));
        }
        fn render_list(&mut self, rows: &[ListRow]) {
            self.selected_rows = rows.iter().filter(|r| r.selected).map(|r| r.id).collect();
            self.events.push(Event::List(rows.iter().map(|r| r.id).collect()));
        }
        fn render_markers(&mut self, markers: &[Marker]) {
            self.selected_markers = markers.iter().filter(|m| m.selected).map(|m| m.id).collect();
            self.events.push(Event::Markers(markers.iter().map(|m| m.id).collect()));
        }
        fn show_no_matches(&mut self) {
            self.events.push(Event::NoMatches);
        }
        fn highlight_row(&mut self, id: Option<PreserveId>) {
            self.events.push(Event::Highlight(id));
        }
        fn center_map(&mut self, at: GeoPoint) {
            self.events.push(Event::Center(at));
        }
    }

    struct StaticSource {
        result: Result<Vec<PublicPreserve>, String>,
        calls: AtomicUsize,
    }

    impl StaticSource {
        fn ok(collection: Vec<PublicPreserve>) -> Arc<Self> {
            Arc::new(Self {
                result: Ok(collection),
                calls: AtomicUsize::new(0),
            })
        }

        fn failing() -> Arc<Self> {
            Arc::new(Self {
                result: Err("connection refused".into()),
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl PreserveSource for StaticSource {
        async fn fetch_collection(&self) -> AppResult<Vec<PublicPreserve>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone().map_err(AppError::Network)
        }
    }

    fn preserve(id: i64, title: &str, location: Option<(f64, f64)>, amenities: &[Amenity]) -> PublicPreserve {
        PublicPreserve {
            id: PreserveId(id),
            title: title.into(),
            description: None,
            location: location.map(|(lat, lon)| GeoPoint::new(lat, lon)),
            acreage: None,
            trail_length_miles: None,
            amenities: amenities.iter().copied().collect(),
            images: Vec::new(),
            status: PreserveStatus::Published,
            last_modified: Utc::now(),
        }
    }

    fn door_county() -> Vec<PublicPreserve> {
        vec![
            preserve(1, "Ridges", Some((44.9, -87.2)), &[Amenity::Parking, Amenity::Trails]),
            preserve(2, "Clay Banks", None, &[Amenity::Parking]),
        ]
    }

    async fn loaded(collection: Vec<PublicPreserve>) -> Explorer<RecordingView> {
        let mut explorer = Explorer::new(StaticSource::ok(collection), RecordingView::default());
        explorer.load().await;
        explorer
    }

    #[tokio::test]
    async fn test_marker_selection_highlights_row_and_centers_map() {
        let mut explorer = loaded(door_county()).await;
        assert_eq!(explorer.state(), ExplorerState::Ready);
        assert_eq!(explorer.view().last_list(), Some(&vec![PreserveId(1), PreserveId(2)]));
        assert_eq!(explorer.view().last_markers(), Some(&vec![PreserveId(1)]));

        assert!(explorer.select(PreserveId(1), SelectionSource::Marker));
        assert_eq!(explorer.state(), ExplorerState::Selected(PreserveId(1)));
        assert_eq!(explorer.selected().unwrap().title, "Ridges");

        let events = &explorer.view().events;
        assert_eq!(
            &events[events.len() - 2..],
            &[
                Event::Highlight(Some(PreserveId(1))),
                Event::Center(GeoPoint::new(44.9, -87.2)),
            ]
        );
    }

    #[tokio::test]
    async fn test_selection_redraws_selected_flags() {
        let mut explorer = loaded(door_county()).await;
        assert!(explorer.view().selected_markers.is_empty());

        explorer.select(PreserveId(1), SelectionSource::Marker);
        assert_eq!(explorer.view().selected_markers, vec![PreserveId(1)]);
        assert_eq!(explorer.view().selected_rows, vec![PreserveId(1)]);

        explorer.select(PreserveId(2), SelectionSource::ListRow);
        assert!(explorer.view().selected_markers.is_empty());
        assert_eq!(explorer.view().selected_rows, vec![PreserveId(2)]);

        explorer.deselect();
        assert!(explorer.view().selected_markers.is_empty());
        assert!(explorer.view().selected_rows.is_empty());
    }

    #[tokio::test]
    async fn test_clear_filters_keeps_viewport_toggle() {
        let mut explorer = loaded(door_county()).await;
        explorer.set_viewport(Some(BoundingBox::new(44.5, -87.5, 45.5, -86.5).unwrap()));
        explorer.set_viewport_filtering(true);
        explorer.set_search_text("clay");
        assert!(explorer.visible().is_empty());

        explorer.clear_filters();
        let criteria = explorer.criteria().unwrap();
        assert_eq!(criteria.text(), "");
        assert!(criteria.viewport_filtering);
        assert_eq!(explorer.view().last_list(), Some(&vec![PreserveId(1)]));
    }

    #[tokio::test]
    async fn test_list_selection_without_location_does_not_move_map() {
        let mut explorer = loaded(door_county()).await;
        assert!(explorer.select(PreserveId(2), SelectionSource::ListRow));
        assert_eq!(
            explorer.view().events.last(),
            Some(&Event::Highlight(Some(PreserveId(2))))
        );
        assert!(!explorer.view().events.iter().any(|e| matches!(e, Event::Center(_))));

        // There is no marker to click for an unlocated preserve
        explorer.deselect();
        assert!(!explorer.select(PreserveId(2), SelectionSource::Marker));
    }

    #[tokio::test]
    async fn test_escape_and_background_click_deselect() {
        let mut explorer = loaded(door_county()).await;
        explorer.select(PreserveId(1), SelectionSource::ListRow);
        explorer.handle_key(Key::Escape);
        assert_eq!(explorer.state(), ExplorerState::Ready);
        assert_eq!(explorer.view().events.last(), Some(&Event::Highlight(None)));

        explorer.select(PreserveId(1), SelectionSource::Marker);
        explorer.handle_key(Key::Other);
        assert_eq!(explorer.state(), ExplorerState::Selected(PreserveId(1)));
        explorer.click_map_background();
        assert_eq!(explorer.state(), ExplorerState::Ready);
    }

    #[tokio::test]
    async fn test_filters_recompute_locally() {
        let source = StaticSource::ok(door_county());
        let mut explorer = Explorer::new(source.clone(), RecordingView::default());
        explorer.load().await;

        explorer.set_search_text("clay");
        assert_eq!(explorer.view().last_list(), Some(&vec![PreserveId(2)]));
        assert_eq!(explorer.view().last_markers(), Some(&vec![]));

        explorer.set_search_text("");
        explorer.toggle_amenity(Amenity::Trails);
        assert_eq!(explorer.view().last_list(), Some(&vec![PreserveId(1)]));
        explorer.toggle_amenity(Amenity::Trails);
        assert_eq!(explorer.visible().len(), 2);

        explorer.set_viewport(Some(BoundingBox::new(40.0, -80.0, 41.0, -79.0).unwrap()));
        assert_eq!(explorer.visible().len(), 2);
        explorer.set_viewport_filtering(true);
        assert!(explorer.visible().is_empty());
        assert_eq!(explorer.state(), ExplorerState::Ready);

        // Only the initial fetch ever reaches the network
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_empty_result_is_displayable() {
        let mut explorer = loaded(door_county()).await;
        explorer.set_search_text("no such preserve");
        assert!(explorer.visible().is_empty());
        assert!(explorer.view().events.contains(&Event::NoMatches));
        assert_eq!(explorer.view().last_list(), Some(&vec![]));

        explorer.clear_filters();
        assert_eq!(explorer.visible().len(), 2);
    }

    #[tokio::test]
    async fn test_selection_cleared_when_filtered_out() {
        let mut explorer = loaded(door_county()).await;
        explorer.select(PreserveId(1), SelectionSource::Marker);
        explorer.set_search_text("clay");
        assert_eq!(explorer.state(), ExplorerState::Ready);
        assert!(explorer.view().events.contains(&Event::Highlight(None)));

        // Hidden preserves cannot be selected
        assert!(!explorer.select(PreserveId(1), SelectionSource::ListRow));
    }

    #[tokio::test]
    async fn test_network_failure_is_terminal() {
        let source = StaticSource::failing();
        let mut explorer = Explorer::new(source.clone(), RecordingView::default());
        explorer.load().await;

        assert!(matches!(explorer.state(), ExplorerState::Error(_)));
        assert!(matches!(explorer.view().events.last(), Some(Event::Error(_))));
        assert!(explorer.visible().is_empty());

        // No automatic retry, and filter events are ignored
        explorer.load().await;
        explorer.set_search_text("ridges");
        assert_eq!(source.calls.load(Ordering::SeqCst), 1);
        assert!(matches!(explorer.state(), ExplorerState::Error(_)));
    }

    struct GatedSource {
        gate: Mutex<Option<oneshot::Receiver<Vec<PublicPreserve>>>>,
    }

    #[async_trait]
    impl PreserveSource for GatedSource {
        async fn fetch_collection(&self) -> AppResult<Vec<PublicPreserve>> {
            let rx = self
                .gate
                .lock()
                .await
                .take()
                .ok_or_else(|| AppError::Network("already fetched".into()))?;
            rx.await.map_err(|_| AppError::Network("gate dropped".into()))
        }
    }

    #[tokio::test]
    async fn test_result_discarded_after_teardown() {
        let (tx, rx) = oneshot::channel();
        let source = Arc::new(GatedSource {
            gate: Mutex::new(Some(rx)),
        });
        let mut explorer = Explorer::new(source, RecordingView::default());
        let handle = explorer.teardown_handle();

        tokio::join!(explorer.load(), async {
            // Let the fetch start before the page goes away
            tokio::task::yield_now().await;
            handle.teardown();
            let _ = tx.send(door_county());
        });

        assert_eq!(explorer.state(), ExplorerState::TornDown);
        assert!(explorer.visible().is_empty());
        assert_eq!(explorer.view().events, vec![Event::Loading]);
    }

    #[tokio::test]
    async fn test_events_ignored_while_loading_or_torn_down() {
        let mut explorer = Explorer::new(StaticSource::ok(door_county()), RecordingView::default());
        explorer.set_search_text("ridges");
        assert!(!explorer.select(PreserveId(1), SelectionSource::ListRow));
        assert_eq!(explorer.state(), ExplorerState::Loading);

        explorer.teardown();
        explorer.load().await;
        assert_eq!(explorer.state(), ExplorerState::TornDown);
        assert!(explorer.view().events.is_empty());
    }
}
