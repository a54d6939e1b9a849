//! africa-energy-api - electricity and socio-economic indicators for the
//! 55 African countries, served over HTTP behind a RapidAPI key gate

pub mod auth;
pub mod cache;
pub mod cli;
pub mod http_server;
pub mod observability;
pub mod query;
pub mod records;
pub mod store;
