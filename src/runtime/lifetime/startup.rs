use crate::errors::{AssignHubError, Result};
use crate::storage::Storage;
use std::sync::Arc;
use tracing::warn;

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
}

/// 准备服务器启动的上下文
/// 包括加密提供者与存储后端
pub async fn prepare_server_startup() -> Result<StartupContext> {
    // 重复安装时返回 Err，忽略即可
    if rustls::crypto::ring::default_provider()
        .install_default()
        .is_err()
    {
        warn!("Rustls crypto provider already installed");
    }

    let storage = crate::storage::create_storage().await.map_err(|e| {
        AssignHubError::database_connection(format!("Failed to create storage backend: {e}"))
    })?;
    warn!("Storage backend initialized and migrations completed");

    Ok(StartupContext { storage })
}
