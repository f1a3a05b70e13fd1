//! Stock watcher daemon: polls the upstream stock page, diffs it against the
//! last snapshot on disk and emails availability changes.

pub mod config;
pub mod credentials;
pub mod fetch;
pub mod http;
pub mod notify;
pub mod scheduler;
pub mod service;
pub mod store;
