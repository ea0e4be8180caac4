pub use self::{
    aggregator::aggregate,
    paginator::{Completion, Pagination, Paginator, Progress},
    summary_service::SummaryService,
};

pub mod aggregator;
pub mod paginator;
pub mod summary_service;
