//! Daily usage counter repository trait definition.

use parley_types::error::RepositoryError;
use parley_types::quota::UsageCounter;
use parley_types::user::UserId;

/// Repository trait for the one-row-per-user daily usage counter.
pub trait UsageRepository: Send + Sync {
    /// Fetch the user's counter row, whatever its date.
    fn fetch_counter(
        &self,
        user_id: UserId,
    ) -> impl std::future::Future<Output = Result<Option<UsageCounter>, RepositoryError>> + Send;

    /// Insert or replace the user's counter row.
    fn upsert_counter(
        &self,
        counter: &UsageCounter,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Atomically replace the row for `new.user_id` only if it still equals
    /// `expected` (`None` meaning no row exists).
    ///
    /// Returns `false`, without writing, when another writer got there first.
    fn compare_and_set_counter(
        &self,
        expected: Option<&UsageCounter>,
        new: &UsageCounter,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
