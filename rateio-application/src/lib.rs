#![warn(clippy::uninlined_format_args)]

pub mod aggregator;
pub mod error;
pub mod memo;
pub mod model;
pub mod payment_request;
pub mod ports;
pub mod processor;

pub use aggregator::{LedgerAggregator, amount_from_f64};
pub use error::{LedgerScriptError, LedgerValidationError, PaymentRequestError, RecordKind};
pub use memo::{CacheKey, CachedValue, MemoizedEngine};
pub use model::{
    Command, GroupLedger, LedgerScript, PaymentCounts, ScriptEntry, ScriptEntryWithLine,
    SettlementResult,
};
pub use payment_request::{PaymentRequest, PaymentRequestStatus};
pub use ports::{BalanceCache, LedgerScriptParser};
pub use processor::{CommandOutcome, LedgerProcessor};
