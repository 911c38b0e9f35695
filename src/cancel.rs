//! Cooperative cancellation.

use thiserror::Error;
pub use tokio_util::sync::CancellationToken;

/// The operation was cancelled by its caller.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("operation cancelled")]
pub struct Cancelled;

/// Return `Err(Cancelled)` once `token` has been cancelled.
pub fn check(token: &CancellationToken) -> Result<(), Cancelled> {
    if token.is_cancelled() {
        Err(Cancelled)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_reports_cancellation() {
        let token = CancellationToken::new();
        assert_eq!(check(&token), Ok(()));
        token.cancel();
        assert_eq!(check(&token), Err(Cancelled));
    }
}
