//! 无模式结构化内容编辑库
//!
//! 在没有预先声明结构的情况下编辑任意嵌套的JSON内容文档：
//! 运行时识别字段展示方式与双语配对，支持按模板追加数组项，
//! 并通过快照比较判断分区是否需要保存

pub mod config;
pub mod model;
pub mod persistence;
pub mod utils;
pub mod vm;

// 重新导出主要类型
pub use config::{ConfigError, EditorConfig};
pub use model::classifier::{classify, FieldPresentation};
pub use model::data_core::{EditorSession, SessionError};
pub use model::dirty::{DirtyTracker, WorkingCopy};
pub use model::editor::{EditError, NodeKind};
pub use model::pairing::{resolve_units, EditUnit, LanguagePair};
pub use model::path::{NodePath, PathSegment};
pub use model::shadow_tree::{build_outline, enumerate, EditEntry, FieldEntry, OutlineNode};
pub use model::template::{IdSource, TemplateCloner, TimeOrderedIds};
pub use persistence::{
    CacheInvalidator, ContentStore, FileContentStore, MemoryContentStore, NoopInvalidator,
    PersistenceGateway, SectionCache, StoreError,
};
