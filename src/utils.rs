use std::path::Path;

use anyhow::Result;
use log::{error, info};
use tokio::fs;

/// Creates the directory that will hold `file_path`, if it is missing.
/// A bare file name lives in the working directory and needs nothing.
pub async fn ensure_parent_directory(file_path: &Path) -> Result<()> {
    let Some(dir) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if fs::try_exists(dir).await? {
        return Ok(());
    }
    if let Err(e) = fs::create_dir_all(dir).await {
        error!("Failed to create directory at {:?}: {}", dir, e);
        return Err(e.into());
    }
    info!("Created directory at: {:?}", dir);
    Ok(())
}
