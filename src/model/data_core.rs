//! EditorSession：编辑会话核心状态，持有各分区的工作副本、快照与持久化网关

use std::collections::BTreeMap;
use std::sync::Arc;

use jsonpath_rust::{query::queryable::Queryable, JsonPath}; // 提供 query/query_only_path 等扩展
use serde_json::Value;
use thiserror::Error;

use crate::config::EditorConfig;
use crate::model::dirty::{DirtyTracker, WorkingCopy};
use crate::model::editor::{self, EditError};
use crate::model::path::NodePath;
use crate::model::shadow_tree::{apply_outline_filter, build_outline, enumerate, EditEntry, OutlineNode};
use crate::model::template::{IdSource, TemplateCloner, TimeOrderedIds};
use crate::persistence::{PersistenceGateway, StoreError};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error(transparent)]
    Edit(#[from] EditError),
    #[error("持久化失败（{section}）: {source}")]
    PersistenceFailure {
        section: String,
        #[source]
        source: StoreError,
    },
    #[error("分区尚未打开: {0}")]
    SectionNotOpen(String),
    #[error("JSONPath错误: {0}")]
    JsonPath(String),
}

pub struct EditorSession {
    config: EditorConfig,
    gateway: PersistenceGateway,
    cloner: TemplateCloner,
    working: BTreeMap<String, WorkingCopy>,
    tracker: DirtyTracker,
}

impl EditorSession {
    pub fn new(gateway: PersistenceGateway, config: EditorConfig) -> Self {
        Self::with_id_source(gateway, config, Arc::new(TimeOrderedIds::default()))
    }

    pub fn with_id_source(gateway: PersistenceGateway, config: EditorConfig, ids: Arc<dyn IdSource>) -> Self {
        let cloner = TemplateCloner::new(config.identifier_key.clone(), config.max_depth, ids);
        Self {
            config,
            gateway,
            cloner,
            working: BTreeMap::new(),
            tracker: DirtyTracker::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    /// 打开分区并返回根层编辑单元；已打开的分区保留当前工作副本
    pub fn open(&mut self, section: &str) -> Result<Vec<EditEntry>, SessionError> {
        if self.working.contains_key(section) {
            tracing::debug!("分区已打开，沿用工作副本: {}", section);
        } else {
            self.reload(section)?;
        }
        self.enumerate(section, &NodePath::root())
    }

    /// 从存储重新加载，丢弃未保存的修改；加载失败时工作副本保持不变
    pub fn reload(&mut self, section: &str) -> Result<(), SessionError> {
        let document = self
            .gateway
            .load(section)
            .map_err(|source| SessionError::PersistenceFailure { section: section.to_string(), source })?;
        let copy = WorkingCopy::new(document);
        self.tracker.track(section, &copy);
        self.working.insert(section.to_string(), copy);
        Ok(())
    }

    fn working_copy(&self, section: &str) -> Result<&WorkingCopy, SessionError> {
        self.working
            .get(section)
            .ok_or_else(|| SessionError::SectionNotOpen(section.to_string()))
    }

    pub fn document(&self, section: &str) -> Result<&Value, SessionError> {
        Ok(self.working_copy(section)?.document())
    }

    pub fn open_sections(&self) -> Vec<String> {
        self.working.keys().cloned().collect()
    }

    pub fn enumerate(&self, section: &str, path: &NodePath) -> Result<Vec<EditEntry>, SessionError> {
        Ok(enumerate(self.document(section)?, path, &self.config)?)
    }

    pub fn outline(&self, section: &str) -> Result<Vec<OutlineNode>, SessionError> {
        Ok(build_outline(self.document(section)?, self.config.max_depth))
    }

    pub fn outline_filtered(&self, section: &str, filter: &str) -> Result<Vec<OutlineNode>, SessionError> {
        let mut nodes = self.outline(section)?;
        apply_outline_filter(&mut nodes, filter);
        Ok(nodes)
    }

    /// 对工作副本执行修改，成功才提交
    fn apply<F>(&mut self, section: &str, op: F) -> Result<(), SessionError>
    where
        F: FnOnce(&Value, &TemplateCloner, usize) -> Result<Value, EditError>,
    {
        let max_depth = self.config.max_depth;
        let copy = self
            .working
            .get_mut(section)
            .ok_or_else(|| SessionError::SectionNotOpen(section.to_string()))?;
        match op(copy.document(), &self.cloner, max_depth) {
            Ok(next) => {
                copy.replace(next);
                Ok(())
            }
            Err(e) => {
                tracing::warn!("修改被拒绝（{}）: {}", section, e);
                Err(e.into())
            }
        }
    }

    pub fn set_scalar(&mut self, section: &str, path: &NodePath, text: &str) -> Result<(), SessionError> {
        self.apply(section, |doc, _, max_depth| editor::set_scalar(doc, path, text, max_depth))
    }

    /// 返回新项的索引
    pub fn append_array_item(&mut self, section: &str, path: &NodePath) -> Result<usize, SessionError> {
        self.apply(section, |doc, cloner, _| editor::append_array_item(doc, path, cloner))?;
        let len = editor::resolve(self.document(section)?, path, self.config.max_depth)?
            .as_array()
            .map(Vec::len)
            .unwrap_or_default();
        Ok(len.saturating_sub(1))
    }

    pub fn remove_array_item(&mut self, section: &str, path: &NodePath, index: usize) -> Result<(), SessionError> {
        self.apply(section, |doc, _, max_depth| editor::remove_array_item(doc, path, index, max_depth))
    }

    pub fn set_scalar_array_item(
        &mut self,
        section: &str,
        path: &NodePath,
        index: usize,
        text: &str,
    ) -> Result<(), SessionError> {
        self.apply(section, |doc, _, max_depth| {
            editor::set_scalar_array_item(doc, path, index, text, max_depth)
        })
    }

    pub fn is_dirty(&self, section: &str) -> Result<bool, SessionError> {
        Ok(self.tracker.is_dirty(section, self.working_copy(section)?))
    }

    pub fn mark_clean(&mut self, section: &str) -> Result<(), SessionError> {
        let copy = self
            .working
            .get(section)
            .ok_or_else(|| SessionError::SectionNotOpen(section.to_string()))?;
        self.tracker.mark_clean(section, copy);
        Ok(())
    }

    pub fn dirty_sections(&self) -> Vec<String> {
        self.working
            .iter()
            .filter(|(section, copy)| self.tracker.is_dirty(section, copy))
            .map(|(section, _)| section.clone())
            .collect()
    }

    /// 整体保存工作副本；失败时工作副本与快照都不变，可重试
    pub fn save(&mut self, section: &str) -> Result<(), SessionError> {
        let copy = self
            .working
            .get(section)
            .ok_or_else(|| SessionError::SectionNotOpen(section.to_string()))?;
        self.gateway
            .save(section, copy.document())
            .map_err(|source| SessionError::PersistenceFailure { section: section.to_string(), source })?;
        self.tracker.mark_clean(section, copy);
        Ok(())
    }

    /// 保存所有脏分区，逐个返回结果
    pub fn save_all(&mut self) -> Vec<(String, Result<(), SessionError>)> {
        self.dirty_sections()
            .into_iter()
            .map(|section| {
                let result = self.save(&section);
                (section, result)
            })
            .collect()
    }

    /// 放弃未保存的修改，恢复到快照
    pub fn revert(&mut self, section: &str) -> Result<(), SessionError> {
        let snapshot = self
            .tracker
            .snapshot(section)
            .cloned()
            .ok_or_else(|| SessionError::SectionNotOpen(section.to_string()))?;
        let copy = self
            .working
            .get_mut(section)
            .ok_or_else(|| SessionError::SectionNotOpen(section.to_string()))?;
        copy.replace(snapshot);
        tracing::info!("分区已恢复到上次保存的状态: {}", section);
        Ok(())
    }

    /// 关闭分区；返回关闭前是否有未保存的修改
    pub fn close(&mut self, section: &str) -> Result<bool, SessionError> {
        let dirty = self.is_dirty(section)?;
        if dirty {
            tracing::warn!("关闭分区时丢弃了未保存的修改: {}", section);
        }
        self.working.remove(section);
        self.tracker.forget(section);
        Ok(dirty)
    }

    /// 按 JSONPath 提取第一个匹配节点的 pretty 字符串
    pub fn extract_subtree_pretty(&self, section: &str, json_path: &str) -> Result<String, SessionError> {
        let dom = self.document(section)?;
        let hits: Vec<&Value> = dom
            .query(json_path)
            .map_err(|e| SessionError::JsonPath(e.to_string()))?;
        let first = hits
            .into_iter()
            .next()
            .ok_or_else(|| SessionError::JsonPath("未匹配到任何节点".into()))?;
        serde_json::to_string_pretty(first).map_err(|e| SessionError::JsonPath(e.to_string()))
    }

    /// 按 JSONPath 查找所有匹配节点的路径，可直接用于修改操作
    pub fn find_paths(&self, section: &str, json_path: &str) -> Result<Vec<NodePath>, SessionError> {
        let dom = self.document(section)?;
        let paths: Vec<String> = dom
            .query_only_path(json_path)
            .map_err(|e| SessionError::JsonPath(e.to_string()))?;
        paths
            .iter()
            .map(|p| NodePath::parse(p).map_err(|_| SessionError::JsonPath(format!("无法识别的路径: {}", p))))
            .collect()
    }
}
