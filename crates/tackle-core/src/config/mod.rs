//! Project configuration (`tackle.toml`).

pub mod parser;
pub mod schema;
pub mod store;

pub use parser::{parse_tackle_toml, parse_tackle_toml_str, to_toml};
pub use schema::{SharedConfig, TackleConfig};
pub use store::{CONFIG_FILE, ConfigStore};
