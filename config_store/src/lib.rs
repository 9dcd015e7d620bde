mod compose;
pub mod error;
mod overrides;
mod store;
mod validate;

pub use compose::{Composer, Composition, Selection};
pub use error::{ConfigError, Result};
pub use overrides::Override;
pub use store::{ConfigStore, StoreBuilder, StoredSchema};
