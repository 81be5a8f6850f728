//! Subscription window repository trait definition.

use parley_types::error::RepositoryError;
use parley_types::quota::SubscriptionWindow;
use parley_types::user::UserId;

/// Repository trait for the at-most-one-per-user subscription window.
pub trait SubscriptionRepository: Send + Sync {
    fn fetch_subscription(
        &self,
        user_id: UserId,
    ) -> impl std::future::Future<Output = Result<Option<SubscriptionWindow>, RepositoryError>> + Send;

    /// Insert or replace the user's window.
    fn upsert_subscription(
        &self,
        window: &SubscriptionWindow,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Atomically replace the window for `new.user_id` only if it still
    /// equals `expected` (`None` meaning no window exists).
    fn compare_and_set_subscription(
        &self,
        expected: Option<&SubscriptionWindow>,
        new: &SubscriptionWindow,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;
}
