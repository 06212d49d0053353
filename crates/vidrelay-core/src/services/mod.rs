//! Application services built on top of the ports.

mod dispatcher;

pub use dispatcher::DownloadDispatcher;
