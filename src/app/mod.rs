// feedsniff - app/mod.rs
//
// Application layer: orchestration on top of the core.
// `batch` runs classification and parsing over many files on a worker
// pool; `stream` is the incremental accumulate-and-re-poll loop.
// Dependencies: core, platform, util.

pub mod batch;
pub mod stream;
