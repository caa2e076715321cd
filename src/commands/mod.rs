pub mod admin;
pub mod status;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::auth::AdminSession;
use crate::config::SiteConfig;
use crate::error::Result;
use crate::site::Site;
use crate::status::StatusBoard;
use crate::store::MemoryStorage;

/// Everything the admin window shares across commands.
pub struct AdminState {
    config: SiteConfig,
    session: AdminSession,
    site: Mutex<Site>,
    status: StatusBoard,
    forwarders: Mutex<Vec<JoinHandle<()>>>,
}

impl AdminState {
    pub fn new(config: SiteConfig, site: Site) -> Result<Self> {
        // Session flag lives only as long as the window.
        let session = AdminSession::new(
            std::sync::Arc::new(MemoryStorage::new()),
            config.admin_password_sha256.as_deref(),
        )?;
        let status = StatusBoard::new(&config);
        Ok(Self {
            config,
            session,
            site: Mutex::new(site),
            status,
            forwarders: Mutex::new(Vec::new()),
        })
    }

    pub fn kill_sync(&self) {
        self.status.kill_sync();
        if let Ok(mut guard) = self.forwarders.try_lock() {
            for handle in guard.drain(..) {
                handle.abort();
            }
        }
    }
}
