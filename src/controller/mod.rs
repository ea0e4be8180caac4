//! API controllers.

pub mod rollover_summary;
pub mod version;
