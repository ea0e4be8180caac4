pub use self::{
    credentials::{Credentials, SummaryRequest},
    ledger_entry::LedgerEntry,
    ledger_response::{LedgerPage, LedgerResponse},
};

mod credentials;
mod ledger_entry;
mod ledger_response;
