pub mod load;
pub mod types;

pub use types::{Config, DEFAULT_DESTINATION_DIR, TargetFormat};
