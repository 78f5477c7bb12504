//! 持久化网关：按分区键整体读写内容文档，保存成功后使读缓存失效

pub mod cache;
pub mod gateway;
pub mod store;

use thiserror::Error;

pub use cache::{CacheInvalidator, NoopInvalidator, SectionCache};
pub use gateway::PersistenceGateway;
pub use store::{ContentStore, FileContentStore, MemoryContentStore};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO失败: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON解析失败: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("分区不存在: {0}")]
    NotFound(String),
    #[error("分区键无效: {0}")]
    InvalidKey(String),
    #[error("存储不可用: {0}")]
    Unavailable(String),
}
