//! Instance lifecycle endpoints

use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::info;

use crate::error::Result;
use crate::http::HttpClient;

/// Integration used for new instances unless overridden
pub const DEFAULT_INTEGRATION: &str = "WHATSAPP-BAILEYS";

/// Instance management. Unlike the other services these endpoints name the
/// instance explicitly.
#[derive(Debug, Clone, Copy)]
pub struct InstanceService<'a> {
    http: &'a HttpClient,
}

impl<'a> InstanceService<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    /// Create an instance. `settings` is merged over the defaults
    /// (`qrcode: true`, `integration: WHATSAPP-BAILEYS`).
    pub async fn create(&self, instance_name: &str, settings: Map<String, Value>) -> Result<Value> {
        let mut body = Map::new();
        body.insert("instanceName".into(), json!(instance_name));
        body.insert("qrcode".into(), json!(true));
        body.insert("integration".into(), json!(DEFAULT_INTEGRATION));
        body.extend(settings);

        info!(instance = %instance_name, "Creating instance");
        self.http.post("/instance/create", &body).await
    }

    /// Start pairing; the response carries the QR code
    pub async fn connect(&self, instance_name: &str) -> Result<Value> {
        self.http
            .get(&format!("/instance/connect/{}", instance_name), &[])
            .await
    }

    pub async fn info(&self, instance_name: &str) -> Result<Value> {
        self.http
            .get("/instance/fetchInstances", &[("instanceName", instance_name)])
            .await
    }

    pub async fn list(&self) -> Result<Value> {
        self.http.get("/instance/fetchInstances", &[]).await
    }

    pub async fn connection_state(&self, instance_name: &str) -> Result<Value> {
        self.http
            .get(&format!("/instance/connectionState/{}", instance_name), &[])
            .await
    }

    pub async fn logout(&self, instance_name: &str) -> Result<Value> {
        self.http
            .delete(&format!("/instance/logout/{}", instance_name))
            .await
    }

    pub async fn delete(&self, instance_name: &str) -> Result<Value> {
        self.http
            .delete(&format!("/instance/delete/{}", instance_name))
            .await
    }

    pub async fn restart(&self, instance_name: &str) -> Result<Value> {
        self.http
            .put_empty(&format!("/instance/restart/{}", instance_name))
            .await
    }

    pub async fn set_settings<S: Serialize + ?Sized>(
        &self,
        instance_name: &str,
        settings: &S,
    ) -> Result<Value> {
        self.http
            .put(&format!("/instance/settings/{}", instance_name), settings)
            .await
    }
}
