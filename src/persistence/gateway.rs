//! 持久化网关：组合内容存储与缓存失效

use std::sync::Arc;

use serde_json::Value;

use crate::persistence::{CacheInvalidator, ContentStore, NoopInvalidator, StoreError};

pub struct PersistenceGateway {
    store: Arc<dyn ContentStore>,
    invalidator: Arc<dyn CacheInvalidator>,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn ContentStore>, invalidator: Arc<dyn CacheInvalidator>) -> Self {
        Self { store, invalidator }
    }

    /// 不需要缓存失效时使用
    pub fn with_store(store: Arc<dyn ContentStore>) -> Self {
        Self::new(store, Arc::new(NoopInvalidator))
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    pub fn load(&self, section: &str) -> Result<Value, StoreError> {
        let document = self.store.load(section)?;
        tracing::info!("分区已加载: {}", section);
        Ok(document)
    }

    /// 整体替换文档；仅在写入成功后使缓存失效
    pub fn save(&self, section: &str, document: &Value) -> Result<(), StoreError> {
        if let Err(e) = self.store.save(section, document) {
            tracing::warn!("分区保存失败: {}: {}", section, e);
            return Err(e);
        }
        self.invalidator.invalidate(section);
        tracing::info!("分区已保存: {}", section);
        Ok(())
    }

    pub fn sections(&self) -> Result<Vec<String>, StoreError> {
        self.store.sections()
    }
}
