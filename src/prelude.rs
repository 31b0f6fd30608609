//! Prelude module for `fragstream`. Use as a star-import.

pub use crate::background::BackgroundManager;
pub use crate::backends::*;
pub use crate::mixers::{SilenceMixer, ToneMixer};
pub use crate::toml_config::TomlConfig;
pub use crate::*;
