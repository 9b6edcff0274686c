//! MCP Resource providers
//!
//! Every stored playbook is exposed as a markdown resource at
//! `playbook://{title}`.

use super::protocol::{Resource, ResourceContent};
use crate::error::ServerError;
use playbook_core::PlaybookService;

pub const PLAYBOOK_URI_PREFIX: &str = "playbook://";
const MARKDOWN_MIME: &str = "text/markdown";

pub fn playbook_uri(title: &str) -> String {
    format!("{}{}", PLAYBOOK_URI_PREFIX, title)
}

/// Get all resource definitions
pub async fn get_resource_definitions(
    service: &PlaybookService,
) -> Result<Vec<Resource>, ServerError> {
    let resources = service
        .all_playbooks()
        .await?
        .iter()
        .map(|playbook| Resource {
            uri: playbook_uri(playbook.title()),
            name: playbook.title().to_string(),
            description: Some(playbook.metadata.description.clone()),
            mime_type: Some(MARKDOWN_MIME.to_string()),
        })
        .collect();

    Ok(resources)
}

/// Read a resource by URI
pub async fn read_resource(
    service: &PlaybookService,
    uri: &str,
) -> Result<ResourceContent, ServerError> {
    let title = uri
        .strip_prefix(PLAYBOOK_URI_PREFIX)
        .ok_or_else(|| ServerError::ResourceNotFound(uri.to_string()))?;

    let playbook = service
        .get_playbook(title)
        .await?
        .ok_or_else(|| ServerError::ResourceNotFound(uri.to_string()))?;

    Ok(ResourceContent {
        uri: uri.to_string(),
        mime_type: Some(MARKDOWN_MIME.to_string()),
        text: Some(playbook.content.clone()),
        blob: None,
    })
}
