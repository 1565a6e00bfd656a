// feedsniff - util/mod.rs
//
// Utility modules: error types, named constants, logging setup.
// `error` names `core::model::FeedFormat`; nothing else here depends on
// core, app, or platform.

pub mod constants;
pub mod error;
pub mod logging;
