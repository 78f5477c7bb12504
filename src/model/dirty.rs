//! 脏状态跟踪：为每个分区保存快照，与编辑中的工作副本做结构比较

use std::cell::Cell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde_json::Value;

/// 全局修订号，保证不同工作副本之间也不会重复
static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// 分区的工作副本：文档只能整体替换，每次替换都会换一个新的修订号
#[derive(Debug, Clone)]
pub struct WorkingCopy {
    document: Value,
    revision: u64,
}

impl WorkingCopy {
    pub fn new(document: Value) -> Self {
        Self { document, revision: next_revision() }
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn replace(&mut self, document: Value) {
        self.document = document;
        self.revision = next_revision();
    }
}

#[derive(Debug)]
struct TrackedSection {
    snapshot: Value,
    /// 上次比较时的（修订号，结果）
    last_check: Cell<Option<(u64, bool)>>,
}

#[derive(Debug, Default)]
pub struct DirtyTracker {
    sections: HashMap<String, TrackedSection>,
}

impl DirtyTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// 加载后记录快照
    pub fn track(&mut self, section: &str, live: &WorkingCopy) {
        self.sections.insert(
            section.to_string(),
            TrackedSection {
                snapshot: live.document().clone(),
                last_check: Cell::new(Some((live.revision(), false))),
            },
        );
    }

    /// 修订号未变化时直接返回上次的结果；没有快照的分区一律视为脏
    pub fn is_dirty(&self, section: &str, live: &WorkingCopy) -> bool {
        let Some(tracked) = self.sections.get(section) else {
            return true;
        };
        if let Some((revision, dirty)) = tracked.last_check.get() {
            if revision == live.revision() {
                return dirty;
            }
        }
        let dirty = live.document() != &tracked.snapshot;
        tracked.last_check.set(Some((live.revision(), dirty)));
        dirty
    }

    /// 保存成功后用刚保存的文档刷新快照
    pub fn mark_clean(&mut self, section: &str, saved: &WorkingCopy) {
        tracing::info!("分区已标记为干净: {}", section);
        self.track(section, saved);
    }

    pub fn snapshot(&self, section: &str) -> Option<&Value> {
        self.sections.get(section).map(|t| &t.snapshot)
    }

    pub fn forget(&mut self, section: &str) {
        self.sections.remove(section);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_clean_after_track() {
        let mut tracker = DirtyTracker::new();
        let live = WorkingCopy::new(json!({"a": 1}));
        tracker.track("home", &live);
        assert!(!tracker.is_dirty("home", &live));
    }

    #[test]
    fn test_dirty_after_change_and_clean_after_mark() {
        let mut tracker = DirtyTracker::new();
        let mut live = WorkingCopy::new(json!({"title": "A"}));
        tracker.track("home", &live);

        live.replace(json!({"title": "B"}));
        assert!(tracker.is_dirty("home", &live), "修改后应该为脏");
        assert!(tracker.is_dirty("home", &live), "重复查询结果一致");

        tracker.mark_clean("home", &live);
        assert!(!tracker.is_dirty("home", &live));
        assert_eq!(tracker.snapshot("home"), Some(&json!({"title": "B"})));
    }

    #[test]
    fn test_change_back_to_original_is_clean() {
        let mut tracker = DirtyTracker::new();
        let mut live = WorkingCopy::new(json!({"title": "A"}));
        tracker.track("home", &live);

        live.replace(json!({"title": "B"}));
        assert!(tracker.is_dirty("home", &live));
        live.replace(json!({"title": "A"}));
        assert!(!tracker.is_dirty("home", &live), "改回原值后不再是脏状态");
    }

    #[test]
    fn test_mapping_order_ignored_sequence_order_respected() {
        let mut tracker = DirtyTracker::new();
        let mut live = WorkingCopy::new(json!({"a": 1, "b": [1, 2]}));
        tracker.track("s", &live);

        let reordered: Value = serde_json::from_str(r#"{"b": [1, 2], "a": 1}"#).unwrap();
        live.replace(reordered);
        assert!(!tracker.is_dirty("s", &live), "对象键顺序不影响比较");

        live.replace(json!({"a": 1, "b": [2, 1]}));
        assert!(tracker.is_dirty("s", &live), "数组顺序变化应该被检测到");
    }

    #[test]
    fn test_untracked_section_reports_dirty() {
        let tracker = DirtyTracker::new();
        let live = WorkingCopy::new(json!({}));
        assert!(tracker.is_dirty("unknown", &live));
    }

    #[test]
    fn test_cached_result_does_not_leak_between_copies() {
        let mut tracker = DirtyTracker::new();
        let original = WorkingCopy::new(json!({"x": 1}));
        tracker.track("s", &original);

        let other = WorkingCopy::new(json!({"x": 2}));
        assert_ne!(other.revision(), original.revision());
        assert!(tracker.is_dirty("s", &other));
    }

    #[test]
    fn test_forget() {
        let mut tracker = DirtyTracker::new();
        let live = WorkingCopy::new(json!(1));
        tracker.track("s", &live);
        tracker.forget("s");
        assert!(tracker.snapshot("s").is_none());
    }
}
