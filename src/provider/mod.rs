pub use self::{
    http::HTTP,
    ledger::{KrakenLedger, LedgerSource, PageError},
    signer::{NonceSource, RequestSigner},
};

mod http;
pub mod ledger;
pub mod signer;
