// Services - business logic above the storage backends

pub mod preserve_store;

pub use preserve_store::{PreserveFilter, PreserveStore};
