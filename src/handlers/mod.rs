//! Request handlers.

pub mod entity;
pub mod singleton;
pub mod storage;
