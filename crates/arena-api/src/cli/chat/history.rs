//! JSON persistence for the conversation log (`arena chat --history <file>`).

use std::path::Path;

use arena_core::chat::log::ConversationLog;

/// Load a saved conversation. A missing file is an empty conversation.
pub async fn load_history(path: &Path) -> anyhow::Result<ConversationLog> {
    match tokio::fs::read_to_string(path).await {
        Ok(content) => serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid history file {}: {e}", path.display())),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(ConversationLog::new()),
        Err(err) => Err(anyhow::anyhow!("failed to read history file {}: {err}", path.display())),
    }
}

/// Write the conversation as a pretty-printed JSON array.
pub async fn save_history(path: &Path, log: &ConversationLog) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(log)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}
