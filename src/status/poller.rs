use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::error::{Result, SiteError};

/// Background task that refreshes a value on a fixed period and publishes
/// the latest result on a watch channel.
pub struct Poller<T> {
    name: &'static str,
    handle: Arc<Mutex<Option<JoinHandle<()>>>>,
    active: Arc<AtomicBool>,
    latest: Arc<watch::Sender<Option<T>>>,
}

impl<T> Poller<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(name: &'static str) -> Self {
        let (tx, _) = watch::channel(None);
        Self {
            name,
            handle: Arc::new(Mutex::new(None)),
            active: Arc::new(AtomicBool::new(false)),
            latest: Arc::new(tx),
        }
    }

    /// Runs `tick` right away and then every `every`. A tick returning
    /// `None` leaves the previous value in place.
    pub async fn start<F, Fut>(&self, every: Duration, mut tick: F) -> Result<()>
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = Option<T>> + Send + 'static,
    {
        if self.active.swap(true, Ordering::SeqCst) {
            return Err(SiteError::Custom(format!("{} poller is already running", self.name)));
        }

        let active = self.active.clone();
        let latest = self.latest.clone();
        let name = self.name;
        tracing::info!("Starting {name} poller every {}s", every.as_secs());

        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                if !active.load(Ordering::SeqCst) {
                    break;
                }
                match tick().await {
                    Some(value) => {
                        latest.send_replace(Some(value));
                    }
                    None => tracing::debug!("{name} poll produced no update"),
                }
            }
        });

        *self.handle.lock().await = Some(handle);
        Ok(())
    }

    pub async fn stop(&self) {
        self.active.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.lock().await.take() {
            handle.abort();
            tracing::info!("Stopped {} poller", self.name);
        }
    }

    /// Non-async stop for window-close and shutdown paths.
    pub fn kill_sync(&self) {
        self.active.store(false, Ordering::SeqCst);
        if let Ok(mut guard) = self.handle.try_lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    pub fn latest(&self) -> Option<T> {
        self.latest.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<T>> {
        self.latest.subscribe()
    }

    /// Publishes a value outside the schedule, e.g. after a manual refresh.
    pub fn publish(&self, value: T) {
        self.latest.send_replace(Some(value));
    }
}

impl<T> Drop for Poller<T> {
    fn drop(&mut self) {
        self.active.store(false, Ordering::SeqCst);
        if let Ok(mut guard) = self.handle.try_lock() {
            if let Some(handle) = guard.take() {
                handle.abort();
            }
        }
    }
}
