// Package identity from Cargo metadata, logged at start-up and sent as the HTTP user agent

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const NAME: &str = env!("CARGO_PKG_NAME");

/// `panload/<version>`.
pub fn user_agent() -> String {
    format!("{NAME}/{VERSION}")
}
