use std::path::{Path, PathBuf};

use anyhow::Result;
use fs4::tokio::AsyncFileExt;
use tokio::{fs::File, io::AsyncWriteExt};
use tracing::warn;
use uuid::Uuid;

/// Sibling of `path` that no other writer will pick, so two processes saving the same key
/// never share a temporary file.
fn temp_path_for(path: &Path) -> PathBuf {
    let token = Uuid::new_v4().simple().to_string();
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}.tmp", &token[..12]));
    path.with_file_name(name)
}

/// Replaces the contents of `path` so that readers either see the old or the new data, never a
/// partial write. The data is written to a sibling temporary file that is renamed over `path`.
/// Concurrent writers don't fail each other; the last rename wins.
pub async fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let temp_path = temp_path_for(path);

    let mut file = File::options()
        .write(true)
        .create_new(true)
        .open(&temp_path)
        .await?;

    // Held until the rename so a reader that opens the new file waits for the write to finish.
    file.lock_exclusive()?;
    let result = async {
        file.write_all(contents).await?;
        file.flush().await?;
        file.sync_all().await?;
        tokio::fs::rename(&temp_path, path).await?;
        Ok::<_, anyhow::Error>(())
    }
    .await;
    file.unlock_async().await?;

    if result.is_err() {
        if let Err(e) = tokio::fs::remove_file(&temp_path).await {
            warn!("Failed to remove {temp_path:?}: {e}");
        }
    }
    result
}
