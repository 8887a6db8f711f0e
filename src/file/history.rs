// src/file/history.rs
use super::FileHandler;
use crate::config::Query;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

/// Query history as a JSON array of queries, newest first
#[derive(Debug)]
pub struct HistoryFileHandler;

impl HistoryFileHandler {
    pub fn new() -> Self {
        Self
    }
}

impl FileHandler<Vec<Query>> for HistoryFileHandler {
    fn load(&self, path: &Path) -> Result<Vec<Query>> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read history file: {}", path.display()))?;
        let queries: Vec<Query> = serde_json::from_str(&content)
            .context("Failed to parse history file")?;
        Ok(queries.into_iter().map(Query::normalized).collect())
    }

    fn save(&self, data: &Vec<Query>, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string(data)?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write history file: {}", path.display()))?;
        Ok(())
    }
}
