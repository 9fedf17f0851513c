//! Group management endpoints
//!
//! Group ids (`...@g.us`) are passed through untouched; participant numbers
//! are normalized.

use serde_json::{Map, Value, json};

use crate::error::Result;
use crate::http::HttpClient;
use crate::number::format_number;
use crate::types::ParticipantAction;

#[derive(Debug, Clone, Copy)]
pub struct GroupService<'a> {
    http: &'a HttpClient,
}

impl<'a> GroupService<'a> {
    pub fn new(http: &'a HttpClient) -> Self {
        Self { http }
    }

    fn endpoint(&self, action: &str) -> String {
        format!("/group/{}/{}", action, self.http.instance())
    }

    fn participants(numbers: &[&str]) -> Vec<String> {
        numbers.iter().map(|n| format_number(n)).collect()
    }

    pub async fn fetch_all(&self) -> Result<Value> {
        self.http.get(&self.endpoint("fetchAllGroups"), &[]).await
    }

    pub async fn create(&self, subject: &str, participants: &[&str], description: &str) -> Result<Value> {
        let body = json!({
            "subject": subject,
            "description": description,
            "participants": Self::participants(participants)
        });
        self.http.post(&self.endpoint("create"), &body).await
    }

    pub async fn info(&self, group_id: &str) -> Result<Value> {
        let body = json!({ "groupJid": group_id });
        self.http.post(&self.endpoint("findGroupInfos"), &body).await
    }

    pub async fn update_picture(&self, group_id: &str, image_url: &str) -> Result<Value> {
        let body = json!({ "groupJid": group_id, "image": image_url });
        self.http.put(&self.endpoint("updateGroupPicture"), &body).await
    }

    pub async fn update_subject(&self, group_id: &str, subject: &str) -> Result<Value> {
        let body = json!({ "groupJid": group_id, "subject": subject });
        self.http.put(&self.endpoint("updateGroupSubject"), &body).await
    }

    pub async fn update_description(&self, group_id: &str, description: &str) -> Result<Value> {
        let body = json!({ "groupJid": group_id, "description": description });
        self.http.put(&self.endpoint("updateGroupDescription"), &body).await
    }

    /// Add, remove, promote or demote participants
    pub async fn update_participants(
        &self,
        group_id: &str,
        action: ParticipantAction,
        participants: &[&str],
    ) -> Result<Value> {
        let body = json!({
            "groupJid": group_id,
            "participants": Self::participants(participants),
            "action": action
        });
        self.http.put(&self.endpoint("updateGroupParticipant"), &body).await
    }

    pub async fn add_participants(&self, group_id: &str, participants: &[&str]) -> Result<Value> {
        self.update_participants(group_id, ParticipantAction::Add, participants).await
    }

    pub async fn remove_participants(&self, group_id: &str, participants: &[&str]) -> Result<Value> {
        self.update_participants(group_id, ParticipantAction::Remove, participants).await
    }

    pub async fn promote_participants(&self, group_id: &str, participants: &[&str]) -> Result<Value> {
        self.update_participants(group_id, ParticipantAction::Promote, participants).await
    }

    pub async fn demote_participants(&self, group_id: &str, participants: &[&str]) -> Result<Value> {
        self.update_participants(group_id, ParticipantAction::Demote, participants).await
    }

    /// `settings` is merged into the body next to `groupJid`
    pub async fn update_settings(&self, group_id: &str, settings: Map<String, Value>) -> Result<Value> {
        let mut body = Map::new();
        body.insert("groupJid".into(), json!(group_id));
        body.extend(settings);
        self.http.put(&self.endpoint("updateGroupSetting"), &body).await
    }

    pub async fn leave(&self, group_id: &str) -> Result<Value> {
        let body = json!({ "groupJid": group_id });
        self.http.put(&self.endpoint("leaveGroup"), &body).await
    }

    pub async fn invite_code(&self, group_id: &str) -> Result<Value> {
        let body = json!({ "groupJid": group_id });
        self.http.post(&self.endpoint("inviteCode"), &body).await
    }

    pub async fn revoke_invite_code(&self, group_id: &str) -> Result<Value> {
        let body = json!({ "groupJid": group_id });
        self.http.put(&self.endpoint("revokeInviteCode"), &body).await
    }

    pub async fn send_invite(&self, group_id: &str, participants: &[&str]) -> Result<Value> {
        let body = json!({
            "groupJid": group_id,
            "participants": Self::participants(participants)
        });
        self.http.post(&self.endpoint("sendInvite"), &body).await
    }
}
