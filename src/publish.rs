// Atomic artifact publication: temp-file write plus rename, so a reader
// polling the path never sees a partial document.

use std::path::{Path, PathBuf};

use crate::models::Snapshot;

/// Serialize the snapshot and replace the published artifact. The parent
/// directory is created if absent; the write lands in a sibling `.tmp`
/// file which is renamed over the target.
pub async fn publish(snapshot: &Snapshot, path: &Path) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(snapshot)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp = tmp_path(path);
    tokio::fs::write(&tmp, &json).await?;
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}
