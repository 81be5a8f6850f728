//! Daily message quota and paid subscription accounting.

pub mod ledger;
pub mod subscription;

/// Upper bound on compare-and-set attempts before a write is reported as a
/// conflict. Every attempt re-reads the row, so this only trips under
/// sustained contention on a single user.
pub(crate) const MAX_CAS_ATTEMPTS: usize = 8;
