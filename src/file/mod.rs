// src/file/mod.rs
use anyhow::Result;
use std::path::Path;

pub mod export;
pub mod history;

// Core trait for file operations
pub trait FileHandler<T> {
    fn load(&self, path: &Path) -> Result<T>;
    fn save(&self, data: &T, path: &Path) -> Result<()>;
}
