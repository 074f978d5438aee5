pub mod clock;
pub mod config;
pub mod error;
pub mod identity;
pub mod model;
pub mod options;
pub mod query;
pub mod session;
pub mod storage;
pub mod task_api;
