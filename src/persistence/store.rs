//! 内容存储：文件目录实现与内存实现

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use serde_json::Value;

use crate::persistence::StoreError;
use crate::utils::fs::{read_json_file, write_json_file};

/// 按分区键整体读写文档
pub trait ContentStore: Send + Sync {
    fn load(&self, section: &str) -> Result<Value, StoreError>;
    fn save(&self, section: &str, document: &Value) -> Result<(), StoreError>;
    /// 已存在的分区键（排序后）
    fn sections(&self) -> Result<Vec<String>, StoreError>;
}

/// 目录下每个分区一个 `<key>.json` 文件
#[derive(Debug, Clone)]
pub struct FileContentStore {
    root: PathBuf,
}

impl FileContentStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 分区键只允许字母、数字、下划线和连字符，防止路径穿越
    fn file_for(&self, section: &str) -> Result<PathBuf, StoreError> {
        let valid = !section.is_empty()
            && section.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(section.to_string()));
        }
        Ok(self.root.join(format!("{}.json", section)))
    }
}

impl ContentStore for FileContentStore {
    fn load(&self, section: &str) -> Result<Value, StoreError> {
        let path = self.file_for(section)?;
        if !path.exists() {
            return Err(StoreError::NotFound(section.to_string()));
        }
        read_json_file(&path)
    }

    fn save(&self, section: &str, document: &Value) -> Result<(), StoreError> {
        let path = self.file_for(section)?;
        std::fs::create_dir_all(&self.root)?;
        write_json_file(&path, document)
    }

    fn sections(&self) -> Result<Vec<String>, StoreError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                keys.push(stem.to_string());
            }
        }
        keys.sort();
        Ok(keys)
    }
}

/// 内存存储，可切换为不可用状态以模拟保存失败
#[derive(Debug, Default)]
pub struct MemoryContentStore {
    documents: Mutex<HashMap<String, Value>>,
    unavailable: AtomicBool,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_documents<I, K>(documents: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let store = Self::default();
        if let Ok(mut map) = store.documents.lock() {
            map.extend(documents.into_iter().map(|(k, v)| (k.into(), v)));
        }
        store
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn documents(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Value>>, StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("内存存储已被设为不可用".into()));
        }
        self.documents
            .lock()
            .map_err(|_| StoreError::Unavailable("存储锁已损坏".into()))
    }
}

impl ContentStore for MemoryContentStore {
    fn load(&self, section: &str) -> Result<Value, StoreError> {
        self.documents()?
            .get(section)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(section.to_string()))
    }

    fn save(&self, section: &str, document: &Value) -> Result<(), StoreError> {
        self.documents()?.insert(section.to_string(), document.clone());
        Ok(())
    }

    fn sections(&self) -> Result<Vec<String>, StoreError> {
        let mut keys: Vec<String> = self.documents()?.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}
