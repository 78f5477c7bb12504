//! 分区读缓存与缓存失效接口

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use serde_json::Value;

use crate::persistence::{ContentStore, StoreError};

/// 保存成功后由网关调用
pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, section: &str);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct NoopInvalidator;

impl CacheInvalidator for NoopInvalidator {
    fn invalidate(&self, _section: &str) {}
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<String, Value>,
    /// 每次失效递增，读取期间发生失效时放弃写入
    generations: HashMap<String, u64>,
}

impl CacheState {
    fn generation(&self, section: &str) -> u64 {
        self.generations.get(section).copied().unwrap_or_default()
    }
}

/// 站点渲染使用的分区读缓存
#[derive(Debug, Default)]
pub struct SectionCache {
    state: RwLock<CacheState>,
}

impl SectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cached(&self, section: &str) -> Option<Value> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .get(section)
            .cloned()
    }

    /// 命中直接返回，未命中则从存储读取并缓存；
    /// 读取期间若该分区被失效，结果只返回不缓存
    pub fn get_or_load(&self, section: &str, store: &dyn ContentStore) -> Result<Value, StoreError> {
        let generation = {
            let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(hit) = state.entries.get(section) {
                return Ok(hit.clone());
            }
            state.generation(section)
        };

        let document = store.load(section)?;

        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        if state.generation(section) == generation {
            state.entries.insert(section.to_string(), document.clone());
        } else {
            tracing::debug!("读取期间分区缓存已失效，跳过写入: {}", section);
        }
        Ok(document)
    }

    pub fn len(&self) -> usize {
        self.state.read().unwrap_or_else(PoisonError::into_inner).entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl CacheInvalidator for SectionCache {
    fn invalidate(&self, section: &str) {
        let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
        *state.generations.entry(section.to_string()).or_default() += 1;
        if state.entries.remove(section).is_some() {
            tracing::debug!("分区缓存已失效: {}", section);
        }
    }
}
