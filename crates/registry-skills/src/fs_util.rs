//! Bounded filesystem calls.

use std::future::Future;
use std::io;
use std::time::Duration;

/// Run a filesystem future, failing with `TimedOut` after `limit`.
pub(crate) async fn bounded<T, F>(limit: Duration, fut: F) -> io::Result<T>
where
    F: Future<Output = io::Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(res) => res,
        Err(_) => Err(io::Error::new(
            io::ErrorKind::TimedOut,
            format!("filesystem call exceeded {:?}", limit),
        )),
    }
}
