// Map Explorer Client - fetches the published collection once and filters it locally

pub mod explorer;
pub mod filter;
pub mod source;
pub mod view;

pub use explorer::{Explorer, ExplorerState, Key, SelectionSource, TeardownHandle};
pub use filter::{strip_markup, FilterCriteria};
pub use source::{ClientConfig, HttpPreserveSource, PreserveSource};
pub use view::{ExplorerView, ListRow, Marker};
