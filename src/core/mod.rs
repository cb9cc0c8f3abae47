pub mod config;
pub mod config_loader;
pub mod error;
pub mod traits;
pub mod version;

pub use config::*;
pub use config_loader::{ConfigLoadOptions, ConfigLoader};
pub use error::*;
pub use traits::*;
pub use version::normalize_version;
