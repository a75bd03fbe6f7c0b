#![allow(dead_code)]

use std::collections::HashMap;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use parking_lot::Mutex;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use face_fetch::{
    ByteSource, DedupLedger, FetchError, FetchResult, ItemSource, LedgerEntry, MemoryLedger,
    NewPhoto, OwnerProfile, RemoteItem,
};

/// Byte source answering from a fixed table, counting every call
#[derive(Default)]
pub struct StubSource {
    bodies: Mutex<HashMap<String, Result<Bytes, String>>>,
    calls: AtomicUsize,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn serving(self, url: &str, body: &[u8]) -> Self {
        self.bodies
            .lock()
            .insert(url.to_string(), Ok(Bytes::copy_from_slice(body)));
        self
    }

    pub fn failing(self, url: &str, reason: &str) -> Self {
        self.bodies.lock().insert(url.to_string(), Err(reason.to_string()));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ByteSource for StubSource {
    async fn fetch(&self, url: &str) -> FetchResult<Bytes> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.bodies.lock().get(url) {
            Some(Ok(body)) => Ok(body.clone()),
            Some(Err(reason)) => Err(FetchError::fetch_failed(url, reason.clone())),
            None => Err(FetchError::fetch_failed(url, "HTTP 404 Not Found")),
        }
    }
}

/// Which ledger call should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Read,
    Write,
}

/// Ledger that works in memory except for the chosen operation
pub struct FailingLedger {
    inner: MemoryLedger,
    fail_on: FailOn,
}

impl FailingLedger {
    pub fn new(fail_on: FailOn) -> Self {
        Self {
            inner: MemoryLedger::new(),
            fail_on,
        }
    }

    fn offline() -> FetchError {
        FetchError::store_unavailable(io::Error::new(io::ErrorKind::Other, "ledger offline"))
    }
}

#[async_trait]
impl DedupLedger for FailingLedger {
    async fn photo_exists(&self, user_id: i64, photo_id: i64) -> FetchResult<bool> {
        if self.fail_on == FailOn::Read {
            return Err(Self::offline());
        }
        self.inner.photo_exists(user_id, photo_id).await
    }

    async fn add_photo(&self, photo: &NewPhoto) -> FetchResult<bool> {
        if self.fail_on == FailOn::Write {
            return Err(Self::offline());
        }
        self.inner.add_photo(photo).await
    }

    async fn get(&self, user_id: i64, photo_id: i64) -> FetchResult<Option<LedgerEntry>> {
        self.inner.get(user_id, photo_id).await
    }

    async fn count(&self) -> FetchResult<u64> {
        self.inner.count().await
    }
}

/// Item source with a fixed catalogue; owners missing from it fail to list
#[derive(Default)]
pub struct StubItems {
    pub owners: Vec<OwnerProfile>,
    pub items: HashMap<i64, Vec<RemoteItem>>,
}

#[async_trait]
impl ItemSource for StubItems {
    async fn owners_in_city(&self, _city_id: i64, count: u32) -> FetchResult<Vec<OwnerProfile>> {
        Ok(self.owners.iter().take(count as usize).cloned().collect())
    }

    async fn list_items(&self, owner_id: i64, count: u32) -> FetchResult<Vec<RemoteItem>> {
        self.items
            .get(&owner_id)
            .map(|items| items.iter().take(count as usize).cloned().collect())
            .ok_or_else(|| {
                FetchError::fetch_failed(
                    format!("stub://photos/{owner_id}"),
                    "API error 30: This profile is private",
                )
            })
    }
}

pub fn owner(id: i64) -> OwnerProfile {
    OwnerProfile {
        id,
        first_name: None,
        last_name: None,
    }
}

/// Canned answer of the test server
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: Vec<u8>,
    pub delay: Duration,
}

impl Reply {
    pub fn ok(body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Vec::new(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Minimal HTTP/1.1 server on a random local port
pub struct TestServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
    pub async fn spawn<F>(route: F) -> Self
    where
        F: Fn(&str) -> Reply + Send + Sync + 'static,
    {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let requests = Arc::new(Mutex::new(Vec::new()));
        let route = Arc::new(route);

        let seen = Arc::clone(&requests);
        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let route = Arc::clone(&route);
                let seen = Arc::clone(&seen);
                tokio::spawn(async move {
                    let mut head = Vec::new();
                    let mut chunk = [0u8; 1024];
                    loop {
                        let n = socket.read(&mut chunk).await.unwrap_or(0);
                        if n == 0 {
                            break;
                        }
                        head.extend_from_slice(&chunk[..n]);
                        if head.windows(4).any(|w| w == b"\r\n\r\n") {
                            break;
                        }
                    }

                    let head = String::from_utf8_lossy(&head).into_owned();
                    let target = head.split_whitespace().nth(1).unwrap_or("/").to_string();
                    seen.lock().push(target.clone());

                    let reply = (*route)(&target);
                    if !reply.delay.is_zero() {
                        tokio::time::sleep(reply.delay).await;
                    }

                    let header = format!(
                        "HTTP/1.1 {} Test\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                        reply.status,
                        reply.body.len()
                    );
                    let _ = socket.write_all(header.as_bytes()).await;
                    let _ = socket.write_all(&reply.body).await;
                    let _ = socket.shutdown().await;
                });
            }
        });

        Self { base_url, requests }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Request targets (path and query) in arrival order
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().clone()
    }
}
