//! MCP Tool definitions and handlers

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use super::protocol::{Tool, ToolResultContent};
use crate::error::ServerError;
use playbook_core::document::DEFAULT_TOP_K;
use playbook_core::PlaybookService;

/// Get all tool definitions
pub fn get_tool_definitions() -> Vec<Tool> {
    vec![
        Tool {
            name: "query_playbook".to_string(),
            description: Some(
                "Query the playbook repository with a natural language question and return the most relevant playbook"
                    .to_string(),
            ),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "question": {
                        "type": "string",
                        "description": "Natural language question (e.g., \"How do I get sunset times?\")"
                    },
                    "top_k": {
                        "type": "integer",
                        "description": "Maximum number of playbooks to consider (default: 3)",
                        "default": DEFAULT_TOP_K
                    },
                    "tags": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Only consider playbooks with at least one of these tags"
                    }
                },
                "required": ["question"]
            }),
        },
        Tool {
            name: "ingest_playbook".to_string(),
            description: Some("Ingest a new playbook into the repository".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "title": {
                        "type": "string",
                        "description": "Title of the playbook; an existing playbook with this title is replaced"
                    },
                    "content": {
                        "type": "string",
                        "description": "Markdown content of the playbook"
                    },
                    "description": {
                        "type": "string",
                        "description": "Brief description of what this playbook does"
                    },
                    "tags": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Tags for categorization"
                    },
                    "author": {
                        "type": "string",
                        "description": "Author name"
                    }
                },
                "required": ["title", "content", "description"]
            }),
        },
        Tool {
            name: "list_playbooks".to_string(),
            description: Some("List the titles of all available playbooks".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
        Tool {
            name: "get_playbook".to_string(),
            description: Some("Retrieve a specific playbook by exact title".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "title": {
                        "type": "string",
                        "description": "Exact title of the playbook"
                    }
                },
                "required": ["title"]
            }),
        },
        Tool {
            name: "delete_playbook".to_string(),
            description: Some("Delete a playbook by exact title".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "title": {
                        "type": "string",
                        "description": "Exact title of the playbook"
                    }
                },
                "required": ["title"]
            }),
        },
        Tool {
            name: "get_stats".to_string(),
            description: Some("Get repository statistics".to_string()),
            input_schema: json!({
                "type": "object",
                "properties": {}
            }),
        },
    ]
}

#[derive(Debug, Deserialize)]
struct QueryArgs {
    question: String,
    #[serde(default = "default_top_k")]
    top_k: i64,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

fn default_top_k() -> i64 {
    DEFAULT_TOP_K as i64
}

#[derive(Debug, Deserialize)]
struct IngestArgs {
    title: String,
    content: String,
    description: String,
    #[serde(default)]
    tags: Option<Vec<String>>,
    #[serde(default)]
    author: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TitleArgs {
    title: String,
}

fn parse_args<T: DeserializeOwned>(args: serde_json::Value) -> Result<T, ServerError> {
    serde_json::from_value(args).map_err(|e| ServerError::InvalidArgument(e.to_string()))
}

/// Handle a tool call
pub async fn handle_tool_call(
    service: &PlaybookService,
    name: &str,
    arguments: serde_json::Value,
) -> Result<Vec<ToolResultContent>, ServerError> {
    match name {
        "query_playbook" => handle_query_playbook(service, arguments).await,
        "ingest_playbook" => handle_ingest_playbook(service, arguments).await,
        "list_playbooks" => handle_list_playbooks(service).await,
        "get_playbook" => handle_get_playbook(service, arguments).await,
        "delete_playbook" => handle_delete_playbook(service, arguments).await,
        "get_stats" => handle_get_stats(service).await,
        _ => Err(ServerError::UnknownTool(name.to_string())),
    }
}

async fn handle_query_playbook(
    service: &PlaybookService,
    args: serde_json::Value,
) -> Result<Vec<ToolResultContent>, ServerError> {
    let args: QueryArgs = parse_args(args)?;
    tracing::info!("Querying playbooks: {}", args.question);

    // Negative limits behave like zero: nothing is returned
    let top_k = usize::try_from(args.top_k).unwrap_or(0);
    let playbooks = service
        .query_playbooks(&args.question, top_k, args.tags.as_deref())
        .await?;

    let text = match playbooks.first() {
        Some(top) => top.content.clone(),
        None => format!("No playbooks found matching: {}", args.question),
    };
    Ok(vec![ToolResultContent::text(text)])
}

async fn handle_ingest_playbook(
    service: &PlaybookService,
    args: serde_json::Value,
) -> Result<Vec<ToolResultContent>, ServerError> {
    let args: IngestArgs = parse_args(args)?;
    tracing::info!("Ingesting playbook: {}", args.title);

    let playbook = service
        .create_playbook(
            args.title,
            args.content,
            args.description,
            args.tags,
            args.author,
        )
        .await?;

    Ok(vec![ToolResultContent::text(format!(
        "Successfully ingested playbook: {}",
        playbook.title()
    ))])
}

async fn handle_list_playbooks(
    service: &PlaybookService,
) -> Result<Vec<ToolResultContent>, ServerError> {
    tracing::info!("Listing all playbooks");
    let titles = service.list_playbooks().await?;
    Ok(vec![ToolResultContent::text(serde_json::to_string_pretty(
        &titles,
    )?)])
}

async fn handle_get_playbook(
    service: &PlaybookService,
    args: serde_json::Value,
) -> Result<Vec<ToolResultContent>, ServerError> {
    let args: TitleArgs = parse_args(args)?;
    tracing::info!("Getting playbook: {}", args.title);

    let text = match service.get_playbook(&args.title).await? {
        Some(playbook) => playbook.content.clone(),
        None => format!("Playbook not found: {}", args.title),
    };
    Ok(vec![ToolResultContent::text(text)])
}

async fn handle_delete_playbook(
    service: &PlaybookService,
    args: serde_json::Value,
) -> Result<Vec<ToolResultContent>, ServerError> {
    let args: TitleArgs = parse_args(args)?;
    tracing::info!("Deleting playbook: {}", args.title);

    let text = if service.delete_playbook(&args.title).await? {
        format!("Deleted playbook: {}", args.title)
    } else {
        format!("Playbook not found: {}", args.title)
    };
    Ok(vec![ToolResultContent::text(text)])
}

async fn handle_get_stats(service: &PlaybookService) -> Result<Vec<ToolResultContent>, ServerError> {
    tracing::info!("Getting repository stats");
    let stats = service.get_stats().await?;
    Ok(vec![ToolResultContent::text(serde_json::to_string_pretty(
        &stats,
    )?)])
}

#[cfg(test)]
mod tests {
    use super::*;
    use playbook_core::PlaybookConfig;
    use pretty_assertions::assert_eq;

    fn text(content: &[ToolResultContent]) -> &str {
        match &content[0] {
            ToolResultContent::Text { text } => text,
        }
    }

    async fn service_with_sunset() -> PlaybookService {
        let service = PlaybookConfig::default().build_service();
        handle_tool_call(
            &service,
            "ingest_playbook",
            json!({
                "title": "Get Sunset Times",
                "content": "# Get Sunset Times\n\nCall the astronomy tool.",
                "description": "Sunset and sunrise lookup",
                "tags": ["weather", "sunset"]
            }),
        )
        .await
        .unwrap();
        service
    }

    #[test]
    fn test_tool_names() {
        let names: Vec<String> = get_tool_definitions().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            vec![
                "query_playbook",
                "ingest_playbook",
                "list_playbooks",
                "get_playbook",
                "delete_playbook",
                "get_stats"
            ]
        );
    }

    #[tokio::test]
    async fn test_query_returns_top_content() {
        let service = service_with_sunset().await;
        let result = handle_tool_call(
            &service,
            "query_playbook",
            json!({ "question": "How do I get sunset times?" }),
        )
        .await
        .unwrap();
        assert!(text(&result).starts_with("# Get Sunset Times"));
    }

    #[tokio::test]
    async fn test_query_not_found_message() {
        let service = service_with_sunset().await;
        let result = handle_tool_call(&service, "query_playbook", json!({ "question": "database" }))
            .await
            .unwrap();
        assert_eq!(text(&result), "No playbooks found matching: database");
    }

    #[tokio::test]
    async fn test_query_negative_top_k_is_empty() {
        let service = service_with_sunset().await;
        let result = handle_tool_call(
            &service,
            "query_playbook",
            json!({ "question": "sunset", "top_k": -2 }),
        )
        .await
        .unwrap();
        assert_eq!(text(&result), "No playbooks found matching: sunset");
    }

    #[tokio::test]
    async fn test_query_tag_filter() {
        let service = service_with_sunset().await;
        let result = handle_tool_call(
            &service,
            "query_playbook",
            json!({ "question": "sunset", "tags": ["database"] }),
        )
        .await
        .unwrap();
        assert_eq!(text(&result), "No playbooks found matching: sunset");
    }

    #[tokio::test]
    async fn test_ingest_confirmation_and_list() {
        let service = service_with_sunset().await;
        let result = handle_tool_call(
            &service,
            "ingest_playbook",
            json!({ "title": "Backup Database", "content": "pg_dump", "description": "Backups" }),
        )
        .await
        .unwrap();
        assert_eq!(text(&result), "Successfully ingested playbook: Backup Database");

        let result = handle_tool_call(&service, "list_playbooks", json!({})).await.unwrap();
        let titles: Vec<String> = serde_json::from_str(text(&result)).unwrap();
        assert_eq!(titles, vec!["Backup Database", "Get Sunset Times"]);
    }

    #[tokio::test]
    async fn test_get_and_delete() {
        let service = service_with_sunset().await;

        let result = handle_tool_call(&service, "get_playbook", json!({ "title": "Get Sunset Times" }))
            .await
            .unwrap();
        assert!(text(&result).contains("astronomy tool"));

        let result = handle_tool_call(&service, "get_playbook", json!({ "title": "Missing" }))
            .await
            .unwrap();
        assert_eq!(text(&result), "Playbook not found: Missing");

        let result =
            handle_tool_call(&service, "delete_playbook", json!({ "title": "Get Sunset Times" }))
                .await
                .unwrap();
        assert_eq!(text(&result), "Deleted playbook: Get Sunset Times");

        let result =
            handle_tool_call(&service, "delete_playbook", json!({ "title": "Get Sunset Times" }))
                .await
                .unwrap();
        assert_eq!(text(&result), "Playbook not found: Get Sunset Times");
    }

    #[tokio::test]
    async fn test_stats() {
        let service = service_with_sunset().await;
        let result = handle_tool_call(&service, "get_stats", json!({})).await.unwrap();
        let stats: serde_json::Value = serde_json::from_str(text(&result)).unwrap();
        assert_eq!(stats["total_playbooks"], 1);
    }

    #[tokio::test]
    async fn test_invalid_arguments() {
        let service = service_with_sunset().await;
        let err = handle_tool_call(&service, "get_playbook", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::InvalidArgument(_)));

        let err = handle_tool_call(&service, "render_document", json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ServerError::UnknownTool(_)));
    }
}
