// Explorer view - the rendering surface the explorer drives (map widget plus list)

use crate::core::PreserveId;
use crate::models::GeoPoint;

#[derive(Debug, Clone, PartialEq)]
pub struct ListRow {
    pub id: PreserveId,
    pub title: String,
    pub has_location: bool,
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: PreserveId,
    pub title: String,
    pub position: GeoPoint,
    pub selected: bool,
}

/// Implemented by whatever actually draws: a browser map binding, a terminal, a test recorder
pub trait ExplorerView {
    fn show_loading(&mut self);

    /// Terminal failure banner; the explorer never retries on its own
    fn show_error(&mut self, message: &str);

    fn render_list(&mut self, rows: &[ListRow]);

    fn render_markers(&mut self, markers: &[Marker]);

    /// Shown instead of an empty list when no preserve passes the filters
    fn show_no_matches(&mut self);

    fn highlight_row(&mut self, id: Option<PreserveId>);

    fn center_map(&mut self, at: GeoPoint);
}
