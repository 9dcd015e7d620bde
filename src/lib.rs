pub mod app;
pub mod flatten;
pub mod registry;
pub mod report;
pub mod resolve;

pub use flatten::{flatten, flatten_with};
pub use registry::build_registry;
pub use resolve::resolve;
