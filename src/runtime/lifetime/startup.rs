use crate::cache::{
    ObjectCache,
    register::{get_object_cache_plugin, register_builtin_plugins},
};
use crate::config::AppConfig;
use crate::errors::{GradebookError, Result};
use crate::services::mail::{LogMailer, Mailer};
use crate::storage::Storage;
use std::sync::Arc;
use tracing::{debug, warn};

pub struct StartupContext {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub mailer: Arc<dyn Mailer>,
}

async fn build_cache(name: &str) -> Result<Arc<dyn ObjectCache>> {
    let constructor = get_object_cache_plugin(name).ok_or_else(|| {
        GradebookError::cache_plugin_not_found(format!("Cache backend '{name}' not found in registry"))
    })?;
    let cache = constructor().await?;
    Ok(Arc::from(cache))
}

/// 创建缓存实例，配置的后端不可用时回退到内存缓存
pub async fn create_cache() -> Result<Arc<dyn ObjectCache>> {
    let cache_type = &AppConfig::get().cache.cache_type;
    warn!("Attempting to create {} cache backend", cache_type);

    match build_cache(cache_type).await {
        Ok(cache) => {
            warn!("Successfully created {} cache backend", cache_type);
            Ok(cache)
        }
        Err(e) if cache_type != "moka" => {
            warn!("Failed to create {} cache: {}", cache_type, e);
            warn!("Falling back to memory cache");
            build_cache("moka").await
        }
        Err(e) => Err(e),
    }
}

/// 准备服务器启动的上下文
/// 包括存储、缓存和邮件发送器
pub async fn prepare_server_startup() -> StartupContext {
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    register_builtin_plugins();
    if cfg!(debug_assertions) {
        crate::cache::register::debug_object_cache_registry();
        debug!("Debug mode: Cache registry is enabled");
    }

    let storage = crate::storage::create_storage()
        .await
        .expect("Failed to create storage backend");
    warn!("Storage backend initialized and migrations completed");

    let cache = create_cache().await.expect("Failed to create cache");
    warn!("Cache backend initialized");

    // 未接入真实邮件服务时，邮件内容只写入日志
    let mailer: Arc<dyn Mailer> = Arc::new(LogMailer);

    StartupContext {
        storage,
        cache,
        mailer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[actix_web::test]
    async fn test_default_cache_is_memory() {
        register_builtin_plugins();
        let cache = create_cache().await.unwrap();
        cache
            .insert_raw("startup:probe".to_string(), "1".to_string(), 5)
            .await;
        assert_eq!(
            cache.get_raw("startup:probe").await.found(),
            Some("1".to_string())
        );
    }
}
