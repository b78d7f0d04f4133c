// Core types and primitives shared by the store, the read API and the explorer client

pub mod strong_types;

pub use strong_types::{PreserveId, MAX_SAFE_ID};
