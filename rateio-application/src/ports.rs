use crate::{
    error::LedgerScriptError,
    memo::{CacheKey, CachedValue},
    model::LedgerScript,
};

pub trait LedgerScriptParser: Send + Sync {
    fn parse(&self, content: &str) -> Result<LedgerScript, LedgerScriptError>;
}

/// Shared store for memoized balance and payment results.
///
/// Implementations decide when an entry expires; a stale entry must read as a miss.
pub trait BalanceCache: Send + Sync {
    fn get(&self, key: &CacheKey) -> Option<CachedValue>;

    fn set(&self, key: CacheKey, value: CachedValue);

    /// Drops expired entries and returns how many were removed.
    fn sweep(&self) -> usize;

    fn clear(&self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
