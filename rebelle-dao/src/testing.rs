//! Fakes shared by unit tests

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::datasource::DataSource;

#[derive(Debug, thiserror::Error)]
#[error("connection pool exhausted")]
pub(crate) struct PoolExhausted;

/// Hands out numbered connections and counts how many came back.
#[derive(Debug, Default)]
pub(crate) struct FakeDataSource {
    exhausted: bool,
    acquired: AtomicUsize,
    released: Arc<AtomicUsize>,
}

impl FakeDataSource {
    pub(crate) fn exhausted() -> Self {
        Self {
            exhausted: true,
            ..Self::default()
        }
    }

    pub(crate) fn acquired(&self) -> usize {
        self.acquired.load(Ordering::SeqCst)
    }

    pub(crate) fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

pub(crate) struct FakeConnection {
    pub(crate) id: usize,
    released: Arc<AtomicUsize>,
}

impl Drop for FakeConnection {
    fn drop(&mut self) {
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

impl DataSource for FakeDataSource {
    type Connection = FakeConnection;
    type Error = PoolExhausted;

    fn get_connection(&self) -> BoxFuture<'_, Result<Self::Connection, Self::Error>> {
        Box::pin(async move {
            if self.exhausted {
                return Err(PoolExhausted);
            }
            let id = self.acquired.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(FakeConnection {
                id,
                released: Arc::clone(&self.released),
            })
        })
    }
}
