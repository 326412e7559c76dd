// Library for tests to access modules

pub mod client;
pub mod collector;
pub mod config;
pub mod models;
pub mod publish;
pub mod query;
pub mod routes;
pub mod version;
pub mod worker;
