//! Load playbooks from markdown files into a [`PlaybookService`]
//!
//! Metadata is taken from the markdown itself:
//! - title: the first `# ` heading, minus an optional `Playbook:` prefix
//! - description: the first non-blank line under `## Description`
//! - tags: the parts of the file name split on `_`, longer than two chars
//!
//! Index files list locations to load, one per line (`file://`, `github:`,
//! `http(s)://`). Only `file://` locations are loaded.

use std::path::{Path, PathBuf};

use lazy_static::lazy_static;
use regex::Regex;

use crate::config::PlaybookConfig;
use crate::document::Playbook;
use crate::error::{PlaybookError, Result};
use crate::service::PlaybookService;

lazy_static! {
    /// Top-level heading, with an optional "Playbook:" prefix
    static ref TITLE_PATTERN: Regex = Regex::new(r"^# (?:Playbook:)?\s*(.*?)\s*$").unwrap();

    /// Start of the description section
    static ref DESCRIPTION_HEADING: Regex = Regex::new(r"^## Description").unwrap();

    /// Location schemes accepted in an index file
    static ref INDEX_LOCATION_PATTERN: Regex =
        Regex::new(r"^(file://|github:|https?://)").unwrap();
}

/// File name of index files; never loaded as a playbook
pub const INDEX_FILE_NAME: &str = "index.md";

/// Metadata extracted from a markdown playbook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMetadata {
    pub title: String,
    pub description: String,
    pub tags: Vec<String>,
}

/// Extract title, description and tags from markdown content
pub fn extract_metadata(content: &str, filename: &str) -> ExtractedMetadata {
    let mut title = content
        .lines()
        .find_map(|line| TITLE_PATTERN.captures(line))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_default();

    let description = content
        .lines()
        .skip_while(|line| !DESCRIPTION_HEADING.is_match(line))
        .skip(1)
        .take_while(|line| !line.starts_with("##"))
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string);

    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let parts: Vec<&str> = stem.split('_').collect();

    let tags = parts
        .iter()
        .filter(|part| part.chars().count() > 2)
        .map(|part| part.to_string())
        .collect();

    if title.is_empty() {
        title = parts
            .iter()
            .map(|part| capitalize(part))
            .collect::<Vec<_>>()
            .join(" ");
    }

    let description = description.unwrap_or_else(|| format!("Playbook for {}", title));

    ExtractedMetadata {
        title,
        description,
        tags,
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// A location listed in an index file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndexLocation {
    /// Local file or directory (`file:///path`)
    File(PathBuf),
    /// GitHub repository (`github:owner/repo`), not loadable yet
    GitHub(String),
    /// Remote URL, not loadable yet
    Url(String),
}

/// Parse index file content into locations. Blank lines and `#` comments are skipped.
pub fn parse_index(content: &str) -> Vec<IndexLocation> {
    content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter(|line| INDEX_LOCATION_PATTERN.is_match(line))
        .map(|line| {
            if let Some(path) = line.strip_prefix("file://") {
                IndexLocation::File(PathBuf::from(path))
            } else if let Some(repo) = line.strip_prefix("github:") {
                IndexLocation::GitHub(repo.to_string())
            } else {
                IndexLocation::Url(line.to_string())
            }
        })
        .collect()
}

/// Loads markdown playbooks into a service
pub struct PlaybookLoader {
    service: PlaybookService,
}

impl PlaybookLoader {
    pub fn new(service: PlaybookService) -> Self {
        Self { service }
    }

    /// Load a single markdown file as a playbook
    pub async fn load_file(&self, path: &Path, author: Option<&str>) -> Result<Playbook> {
        if !path.is_file() {
            return Err(PlaybookError::FileNotFound(path.to_path_buf()));
        }

        let content = tokio::fs::read_to_string(path).await?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let metadata = extract_metadata(&content, &filename);

        tracing::debug!(path = %path.display(), title = %metadata.title, "Loading playbook");

        self.service
            .create_playbook(
                metadata.title,
                content,
                metadata.description,
                Some(metadata.tags),
                author.map(str::to_string),
            )
            .await
    }

    /// Load every `.md` file in a directory. Files that fail to load are
    /// logged and skipped. Returns the number of playbooks loaded.
    pub async fn load_directory(
        &self,
        dir: &Path,
        author: Option<&str>,
        recursive: bool,
    ) -> Result<usize> {
        if !dir.is_dir() {
            return Err(PlaybookError::DirectoryNotFound(dir.to_path_buf()));
        }

        let mut files = Vec::new();
        scan_markdown_dir(dir, recursive, &mut files);
        files.sort();

        let mut count = 0;
        for path in files {
            match self.load_file(&path, author).await {
                Ok(_) => count += 1,
                Err(e) => tracing::warn!("Error loading {}: {}", path.display(), e),
            }
        }

        tracing::info!("Loaded {} playbooks from {}", count, dir.display());
        Ok(count)
    }

    /// Load the locations listed in an index file. Returns the number loaded.
    pub async fn load_index(&self, index_path: &Path, author: Option<&str>) -> Result<usize> {
        if !index_path.is_file() {
            return Err(PlaybookError::FileNotFound(index_path.to_path_buf()));
        }

        let content = tokio::fs::read_to_string(index_path).await?;
        let mut total = 0;

        for location in parse_index(&content) {
            match location {
                IndexLocation::File(path) => {
                    if !path.exists() {
                        tracing::warn!("Location not found: {}", path.display());
                        continue;
                    }
                    if path.is_file() {
                        if path.file_name().is_some_and(|n| n == INDEX_FILE_NAME) {
                            continue;
                        }
                        match self.load_file(&path, author).await {
                            Ok(_) => total += 1,
                            Err(e) => tracing::warn!("Error loading {}: {}", path.display(), e),
                        }
                    } else {
                        match self.load_directory(&path, author, true).await {
                            Ok(count) => total += count,
                            Err(e) => tracing::warn!("Error loading {}: {}", path.display(), e),
                        }
                    }
                }
                IndexLocation::GitHub(repo) => {
                    tracing::warn!("GitHub ingestion not supported: github:{}", repo);
                }
                IndexLocation::Url(url) => {
                    tracing::warn!("URL ingestion not supported: {}", url);
                }
            }
        }

        tracing::info!("Loaded {} playbooks from {}", total, index_path.display());
        Ok(total)
    }

    /// Load the playbooks a configuration points at.
    ///
    /// Directories take precedence over the index file. Failures are logged
    /// and never abort loading. Returns the number of playbooks loaded.
    pub async fn load_configured(&self, config: &PlaybookConfig) -> usize {
        let author = config.author.as_deref();

        if !config.playbook_dirs.is_empty() {
            let mut total = 0;
            for dir in &config.playbook_dirs {
                match self.load_directory(dir, author, true).await {
                    Ok(count) => total += count,
                    Err(e) => tracing::warn!("{}", e),
                }
            }
            return total;
        }

        if let Some(index_path) = &config.index_path {
            return match self.load_index(index_path, author).await {
                Ok(count) => count,
                Err(e) => {
                    tracing::warn!("{}", e);
                    0
                }
            };
        }

        tracing::info!("No playbook locations configured");
        0
    }
}

/// Collect markdown files under `dir`
fn scan_markdown_dir(dir: &Path, recursive: bool, files: &mut Vec<PathBuf>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if path.is_dir() {
            if recursive {
                scan_markdown_dir(&path, recursive, files);
            }
        } else if path
            .extension()
            .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("md"))
        {
            files.push(path);
        }
    }
}
