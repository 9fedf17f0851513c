//! Contact and own-profile endpoints

use serde_json::{Value, json};

use crate::error::Result;
use crate::http::HttpClient;
use crate::number::format_number;
use crate::types::NumberExists;

#[derive(Debug, Clone, Copy)]
pub struct ContactService<'a> {
    http: &'a HttpClient,
}

impl<'a> ContactService<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    fn endpoint(&self, action: &str) -> String {
        format!("/chat/{}/{}", action, self.http.instance())
    }

    pub async fn fetch_all(&self) -> Result<Value> {
        self.http.get(&self.endpoint("findContacts"), &[]).await
    }

    pub async fn fetch(&self, number: &str) -> Result<Value> {
        let body = json!({ "where": { "remoteJid": format_number(number) } });
        self.http.post(&self.endpoint("fetchContacts"), &body).await
    }

    /// Ask the gateway which numbers have a WhatsApp account. Results come
    /// back in request order.
    pub async fn check_exists(&self, numbers: &[&str]) -> Result<Vec<NumberExists>> {
        let numbers: Vec<String> = numbers.iter().map(|n| format_number(n)).collect();
        let body = json!({ "numbers": numbers });

        let response = self.http.post(&self.endpoint("whatsappNumbers"), &body).await?;
        match response {
            Value::Array(_) => Ok(serde_json::from_value(response)?),
            // An empty body decodes to `{}`: nothing was reported
            _ => Ok(Vec::new()),
        }
    }

    pub async fn profile_picture(&self, number: &str) -> Result<Value> {
        let body = json!({ "number": format_number(number) });
        self.http.post(&self.endpoint("fetchProfilePictureUrl"), &body).await
    }

    pub async fn profile(&self, number: &str) -> Result<Value> {
        let body = json!({ "number": format_number(number) });
        self.http.post(&self.endpoint("fetchProfile"), &body).await
    }

    pub async fn block(&self, number: &str) -> Result<Value> {
        let body = json!({ "number": format_number(number) });
        self.http.put(&self.endpoint("blockUser"), &body).await
    }

    pub async fn unblock(&self, number: &str) -> Result<Value> {
        let body = json!({ "number": format_number(number) });
        self.http.put(&self.endpoint("unblockUser"), &body).await
    }

    pub async fn update_profile_picture(&self, image_url: &str) -> Result<Value> {
        let body = json!({ "picture": image_url });
        self.http.put(&self.endpoint("updateProfilePicture"), &body).await
    }

    pub async fn update_profile_name(&self, name: &str) -> Result<Value> {
        let body = json!({ "name": name });
        self.http.put(&self.endpoint("updateProfileName"), &body).await
    }

    pub async fn update_profile_status(&self, status: &str) -> Result<Value> {
        let body = json!({ "status": status });
        self.http.put(&self.endpoint("updateProfileStatus"), &body).await
    }
}
