use log::info;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::{DeviceClient, DeviceError, EnvoyClient};
use crate::credential::Credential;

type Connector<C> = Box<dyn Fn(&str, &Credential) -> Result<C, DeviceError> + Send + Sync>;

/// Lazily connected client for one device target.
///
/// The client is built on the first [`DeviceHandle::get`] and shared by every
/// caller afterwards. Concurrent first calls wait for the same initialization,
/// the connector runs once. A failed or cancelled initialization publishes
/// nothing and the next call tries again.
///
/// The token is never re-resolved; once the device rejects it every fetch
/// fails with [`DeviceError::Status`] until the process is restarted.
pub struct DeviceHandle<C> {
    target: String,
    credential: Credential,
    connector: Connector<C>,
    client: OnceCell<Arc<C>>,
}

impl<C: DeviceClient> DeviceHandle<C> {
    pub fn new<F>(target: impl Into<String>, credential: Credential, connector: F) -> Self
    where
        F: Fn(&str, &Credential) -> Result<C, DeviceError> + Send + Sync + 'static,
    {
        DeviceHandle {
            target: target.into(),
            credential,
            connector: Box::new(connector),
            client: OnceCell::new(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn is_connected(&self) -> bool {
        self.client.initialized()
    }

    pub async fn get(&self) -> Result<Arc<C>, DeviceError> {
        let client = self
            .client
            .get_or_try_init(|| async {
                info!("[{}] Client init", self.target);
                (self.connector)(self.target.as_str(), &self.credential).map(Arc::new)
            })
            .await?;

        Ok(Arc::clone(client))
    }
}

impl DeviceHandle<EnvoyClient> {
    pub fn envoy(target: impl Into<String>, credential: Credential, timeout: Duration) -> Self {
        DeviceHandle::new(target, credential, move |target, credential| {
            EnvoyClient::connect(target, credential, timeout)
        })
    }
}
