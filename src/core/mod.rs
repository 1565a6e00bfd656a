// feedsniff - core/mod.rs
//
// Core layer: classification, dispatch, format parsers, discovery and
// report export.
// Must NOT depend on: platform, app.
//
// `sniffer` and `dispatch` are pure functions over borrowed bytes and
// never log; everything else may emit tracing events.

pub mod discovery;
pub mod dispatch;
pub mod export;
pub mod model;
pub mod parsers;
pub mod sniffer;
