//! # Knowledge Base Submission
//!
//! Two-step client for the knowledge-base service: upload the payload to the
//! file endpoint, then link the returned file id into a knowledge base. The
//! two calls are sequential and not atomic — if the link step fails after a
//! successful upload, the remote file stays behind, unlinked. There is no
//! compensating delete.

use reqwest::header::ACCEPT;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use tracing::debug;

use crate::config::KnowledgeBaseConfig;
use crate::errors::IngestError;

#[derive(Serialize)]
struct FileAddBody<'a> {
    file_id: &'a str,
}

/// Authenticated client for the knowledge-base REST API.
pub struct KnowledgeClient {
    http: reqwest::Client,
    api_endpoint: String,
    api_token: String,
}

impl KnowledgeClient {
    pub fn new(config: &KnowledgeBaseConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_endpoint: config.api_endpoint.clone(),
            api_token: config.api_token.clone(),
        }
    }

    /// Uploads the payload and links it into the knowledge base. Returns the
    /// remote file id.
    pub async fn submit(
        &self,
        knowledge_base_id: &str,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, IngestError> {
        let file_id = self.upload_file(file_name, bytes).await?;
        debug!("uploaded '{file_name}' as remote file {file_id}");
        self.add_to_knowledge_base(knowledge_base_id, &file_id)
            .await?;
        Ok(file_id)
    }

    /// Step 1: multipart upload of a single `file` part. The response JSON
    /// must carry a string `id` — the handle the link step needs.
    pub async fn upload_file(
        &self,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<String, IngestError> {
        let url = format!("{}/v1/files/", self.api_endpoint);
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .header(ACCEPT, "application/json")
            .multipart(form)
            .send()
            .await
            .map_err(|e| IngestError::Submission(e.to_string()))?;

        let body: serde_json::Value = response.json().await.map_err(|e| {
            IngestError::Submission(format!("file upload returned an unreadable body: {e}"))
        })?;

        match body.get("id").and_then(|id| id.as_str()) {
            Some(id) => Ok(id.to_string()),
            None => Err(IngestError::Submission(
                "file upload response has no 'id' field".to_string(),
            )),
        }
    }

    /// Step 2: link the uploaded file into the knowledge base.
    pub async fn add_to_knowledge_base(
        &self,
        knowledge_base_id: &str,
        file_id: &str,
    ) -> Result<(), IngestError> {
        let url = format!(
            "{}/v1/knowledge/{}/file/add",
            self.api_endpoint, knowledge_base_id
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_token)
            .json(&FileAddBody { file_id })
            .send()
            .await
            .map_err(|e| IngestError::Submission(e.to_string()))?;

        if !response.status().is_success() {
            return Err(IngestError::Submission(format!(
                "knowledge base link returned status {}",
                response.status()
            )));
        }
        Ok(())
    }
}
