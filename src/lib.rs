// Library for tests to access modules

pub mod config;
pub mod models;
pub mod output;
pub mod panos_repo;
pub mod report;
pub mod version;
pub mod worker;
