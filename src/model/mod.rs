pub use self::summary::{
    RecentEntry, Summary, SummaryReport, Window, WindowTotals,
};

mod summary;
