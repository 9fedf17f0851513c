//! Message sending and chat message endpoints

use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::debug;

use crate::error::Result;
use crate::http::HttpClient;
use crate::number::format_number;
use crate::types::{
    ContactCard, ListSection, MediaMessage, MediaType, SendMediaRequest, SendTextRequest,
};

#[derive(Debug, Clone, Copy)]
pub struct MessageService<'a> {
    http: &'a HttpClient,
}

impl<'a> MessageService<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    fn endpoint(&self, action: &str) -> String {
        format!("/message/{}/{}", action, self.http.instance())
    }

    pub async fn send_text(&self, number: &str, text: &str) -> Result<Value> {
        self.send_text_with(number, text, Map::new()).await
    }

    /// Send text with extra gateway options merged into the body
    pub async fn send_text_with(
        &self,
        number: &str,
        text: &str,
        options: Map<String, Value>,
    ) -> Result<Value> {
        let body = SendTextRequest {
            number: format_number(number),
            text: text.to_string(),
            options,
        };

        debug!(number = %body.number, chars = text.chars().count(), "Sending text");
        self.http.post(&self.endpoint("sendText"), &body).await
    }

    /// Send an image, video, audio or document by URL. Empty caption and
    /// file name are omitted.
    pub async fn send_media(
        &self,
        number: &str,
        media_url: &str,
        media_type: MediaType,
        caption: &str,
        file_name: &str,
    ) -> Result<Value> {
        let media_message = MediaMessage {
            caption: (!caption.is_empty()).then(|| caption.to_string()),
            file_name: (!file_name.is_empty()).then(|| file_name.to_string()),
        };
        let has_extras = media_message.caption.is_some() || media_message.file_name.is_some();

        let body = SendMediaRequest {
            number: format_number(number),
            mediatype: media_type,
            media: media_url.to_string(),
            media_message: has_extras.then_some(media_message),
        };

        self.http.post(&self.endpoint("sendMedia"), &body).await
    }

    /// Send a voice note (`ptt`) or a regular audio file
    pub async fn send_audio(&self, number: &str, audio_url: &str, ptt: bool) -> Result<Value> {
        let body = json!({
            "number": format_number(number),
            "audioMessage": { "audio": audio_url, "ptt": ptt }
        });
        self.http.post(&self.endpoint("sendWhatsAppAudio"), &body).await
    }

    pub async fn send_location(
        &self,
        number: &str,
        latitude: f64,
        longitude: f64,
        name: &str,
        address: &str,
    ) -> Result<Value> {
        let body = json!({
            "number": format_number(number),
            "latitude": latitude,
            "longitude": longitude,
            "name": name,
            "address": address
        });
        self.http.post(&self.endpoint("sendLocation"), &body).await
    }

    pub async fn send_contact(&self, number: &str, contacts: &[ContactCard]) -> Result<Value> {
        let body = json!({
            "number": format_number(number),
            "contactMessage": contacts
        });
        self.http.post(&self.endpoint("sendContact"), &body).await
    }

    pub async fn send_list(
        &self,
        number: &str,
        title: &str,
        description: &str,
        button_text: &str,
        sections: &[ListSection],
    ) -> Result<Value> {
        let body = json!({
            "number": format_number(number),
            "listMessage": {
                "title": title,
                "description": description,
                "buttonText": button_text,
                "footerText": "",
                "sections": sections
            }
        });
        self.http.post(&self.endpoint("sendList"), &body).await
    }

    /// Buttons are passed through as given; their shape varies across
    /// gateway versions.
    pub async fn send_buttons(
        &self,
        number: &str,
        title: &str,
        description: &str,
        buttons: &[Value],
        footer: &str,
    ) -> Result<Value> {
        let body = json!({
            "number": format_number(number),
            "buttonMessage": {
                "title": title,
                "description": description,
                "footer": footer,
                "buttons": buttons
            }
        });
        self.http.post(&self.endpoint("sendButtons"), &body).await
    }

    pub async fn find_messages<F: Serialize + ?Sized>(&self, filters: &F) -> Result<Value> {
        self.http
            .post(&format!("/chat/findMessages/{}", self.http.instance()), filters)
            .await
    }

    pub async fn mark_as_read(&self, remote_jid: &str, message_ids: &[&str]) -> Result<Value> {
        let body = json!({
            "readMessages": {
                "remoteJid": remote_jid,
                "fromMe": false,
                "id": message_ids
            }
        });
        self.http
            .put(&format!("/chat/markMessageAsRead/{}", self.http.instance()), &body)
            .await
    }

    pub async fn delete_message(&self, message_id: &str, remote_jid: &str, from_me: bool) -> Result<Value> {
        let body = json!({
            "id": message_id,
            "remoteJid": remote_jid,
            "fromMe": from_me
        });
        self.http.delete_with(&self.endpoint("delete"), &body).await
    }
}
