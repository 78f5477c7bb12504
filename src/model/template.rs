//! 模板克隆：按示例节点生成结构相同、叶子清空的新节点，用于数组追加新项

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use serde_json::{Map, Value};

/// 新项标识的来源，返回值必须单调递增
pub trait IdSource: Send + Sync {
    fn next_token(&self) -> u64;
}

/// 基于毫秒时间戳的单调标识
#[derive(Debug, Default)]
pub struct TimeOrderedIds {
    last: AtomicU64,
}

impl IdSource for TimeOrderedIds {
    fn next_token(&self) -> u64 {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        let prev = self
            .last
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| Some(now.max(last + 1)))
            .unwrap_or_else(|v| v);
        now.max(prev + 1)
    }
}

/// 从给定值开始递增，便于得到可预测的标识
#[derive(Debug)]
pub struct SequentialIds {
    next: AtomicU64,
}

impl SequentialIds {
    pub fn starting_at(first: u64) -> Self {
        Self { next: AtomicU64::new(first) }
    }
}

impl IdSource for SequentialIds {
    fn next_token(&self) -> u64 {
        self.next.fetch_add(1, Ordering::SeqCst)
    }
}

pub struct TemplateCloner {
    identifier_key: String,
    max_depth: usize,
    ids: Arc<dyn IdSource>,
}

impl TemplateCloner {
    pub fn new(identifier_key: impl Into<String>, max_depth: usize, ids: Arc<dyn IdSource>) -> Self {
        Self {
            identifier_key: identifier_key.into(),
            max_depth,
            ids,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn identifier_key(&self) -> &str {
        &self.identifier_key
    }

    /// 生成与 `example` 结构相同的空节点：
    /// 标量叶子变为空串，标识字段换成新的标识，容器保持键集合与顺序
    pub fn clone_empty(&self, example: &Value) -> Value {
        self.blank(example, None, 0)
    }

    fn blank(&self, value: &Value, key: Option<&str>, depth: usize) -> Value {
        match value {
            // 超过深度上限的子树以同类型空容器代替
            Value::Object(_) if depth >= self.max_depth => Value::Object(Map::new()),
            Value::Array(_) if depth >= self.max_depth => Value::Array(Vec::new()),
            Value::Object(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), self.blank(v, Some(k), depth + 1)))
                    .collect(),
            ),
            Value::Array(items) => Value::Array(items.iter().map(|v| self.blank(v, None, depth + 1)).collect()),
            Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {
                if key == Some(self.identifier_key.as_str()) {
                    self.fresh_id_like(value)
                } else {
                    Value::String(String::new())
                }
            }
        }
    }

    /// 数字标识保持数字，其余使用字符串
    fn fresh_id_like(&self, example: &Value) -> Value {
        let token = self.ids.next_token();
        match example {
            Value::Number(_) => Value::from(token),
            _ => Value::String(token.to_string()),
        }
    }

    /// 若新项的标识与同级已有项重复则重新生成
    pub fn refresh_id_against(&self, item: &mut Value, siblings: &[Value]) {
        let key = self.identifier_key.as_str();
        let Value::Object(map) = item else {
            return;
        };
        loop {
            let Some(id) = map.get(key) else {
                return;
            };
            if !siblings.iter().any(|s| s.get(key) == Some(id)) {
                return;
            }
            let fresh = self.fresh_id_like(id);
            map.insert(key.to_string(), fresh);
        }
    }
}

impl Default for TemplateCloner {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_IDENTIFIER_KEY,
            crate::config::DEFAULT_MAX_DEPTH,
            Arc::new(TimeOrderedIds::default()),
        )
    }
}
