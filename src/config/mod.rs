#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli::{BatchArgs, Cli, ClassifyArgs, Command, PredictArgs};
pub use toml_config::{ModelsConfig, TomlConfig};
