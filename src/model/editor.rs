//! 编辑核心：按路径定位节点并执行点修改
//!
//! 所有修改函数接收当前文档的只读引用并返回新文档；失败时原文档保持不变。

use serde_json::{Map, Value};
use thiserror::Error;

use crate::model::path::{NodePath, PathSegment};
use crate::model::template::TemplateCloner;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("路径无效: {path}")]
    InvalidPath { path: String },
    #[error("节点不是数组: {path}")]
    NotASequence { path: String },
    #[error("索引越界: {path}[{index}]，数组长度 {len}")]
    IndexOutOfRange { path: String, index: usize, len: usize },
}

/// 编辑视角下的节点类型：数字、布尔、null 都作为标量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Mapping,
    Sequence,
    Scalar,
}

pub fn kind_of(v: &Value) -> NodeKind {
    match v {
        Value::Object(_) => NodeKind::Mapping,
        Value::Array(_) => NodeKind::Sequence,
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => NodeKind::Scalar,
    }
}

/// 标量的可编辑文本；容器节点返回空串
pub fn scalar_text(v: &Value) -> String {
    match v {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Object(_) | Value::Array(_) => String::new(),
    }
}

/// 写回文本时尽量保持原标量类型，无法解析时退化为字符串
pub fn coerce_scalar(original: &Value, text: &str) -> Value {
    match original {
        Value::Number(_) => match serde_json::from_str::<serde_json::Number>(text.trim()) {
            Ok(n) => Value::Number(n),
            Err(_) => Value::String(text.to_string()),
        },
        Value::Bool(_) => match text.trim() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            _ => Value::String(text.to_string()),
        },
        _ => Value::String(text.to_string()),
    }
}

fn invalid_path(path: &NodePath) -> EditError {
    EditError::InvalidPath { path: path.to_string() }
}

fn not_a_sequence(path: &NodePath) -> EditError {
    EditError::NotASequence { path: path.to_string() }
}

/// 超过深度上限的路径一律视为无效
fn check_depth(path: &NodePath, max_depth: usize) -> Result<(), EditError> {
    if path.len() > max_depth {
        tracing::warn!("路径深度 {} 超过上限 {}: {}", path.len(), max_depth, path);
        return Err(invalid_path(path));
    }
    Ok(())
}

pub fn resolve<'a>(doc: &'a Value, path: &NodePath, max_depth: usize) -> Result<&'a Value, EditError> {
    check_depth(path, max_depth)?;
    let mut node = doc;
    for segment in path.segments() {
        node = match segment {
            PathSegment::Key(k) => node.as_object().and_then(|map| map.get(k)),
            PathSegment::Index(i) => node.as_array().and_then(|items| items.get(*i)),
        }
        .ok_or_else(|| invalid_path(path))?;
    }
    Ok(node)
}

fn resolve_mut<'a>(doc: &'a mut Value, path: &NodePath, max_depth: usize) -> Result<&'a mut Value, EditError> {
    check_depth(path, max_depth)?;
    let mut node = doc;
    for segment in path.segments() {
        node = match segment {
            PathSegment::Key(k) => node.as_object_mut().and_then(|map| map.get_mut(k)),
            PathSegment::Index(i) => node.as_array_mut().and_then(|items| items.get_mut(*i)),
        }
        .ok_or_else(|| invalid_path(path))?;
    }
    Ok(node)
}

fn sequence_at<'a>(doc: &'a Value, path: &NodePath, max_depth: usize) -> Result<&'a Vec<Value>, EditError> {
    check_depth(path, max_depth)?;
    match resolve(doc, path, max_depth) {
        Ok(Value::Array(items)) => Ok(items),
        _ => Err(not_a_sequence(path)),
    }
}

fn sequence_at_mut<'a>(doc: &'a mut Value, path: &NodePath, max_depth: usize) -> Result<&'a mut Vec<Value>, EditError> {
    resolve_mut(doc, path, max_depth)
        .ok()
        .and_then(Value::as_array_mut)
        .ok_or_else(|| not_a_sequence(path))
}

/// 替换 `path` 处的标量；路径不存在或不是标量时返回 InvalidPath
pub fn set_scalar(doc: &Value, path: &NodePath, text: &str, max_depth: usize) -> Result<Value, EditError> {
    let current = resolve(doc, path, max_depth)?;
    if kind_of(current) != NodeKind::Scalar {
        return Err(invalid_path(path));
    }

    let mut next = doc.clone();
    *resolve_mut(&mut next, path, max_depth)? = coerce_scalar(current, text);
    tracing::debug!("标量已更新: {}", path);
    Ok(next)
}

/// 在数组末尾追加一项：非空数组按首项克隆空模板，空数组追加空对象
pub fn append_array_item(doc: &Value, path: &NodePath, cloner: &TemplateCloner) -> Result<Value, EditError> {
    let items = sequence_at(doc, path, cloner.max_depth())?;
    let item = match items.first() {
        Some(first) => {
            let mut item = cloner.clone_empty(first);
            cloner.refresh_id_against(&mut item, items);
            item
        }
        None => Value::Object(Map::new()),
    };

    let mut next = doc.clone();
    sequence_at_mut(&mut next, path, cloner.max_depth())?.push(item);
    tracing::debug!("数组已追加新项: {}", path);
    Ok(next)
}

pub fn remove_array_item(doc: &Value, path: &NodePath, index: usize, max_depth: usize) -> Result<Value, EditError> {
    let len = sequence_at(doc, path, max_depth)?.len();
    if index >= len {
        return Err(EditError::IndexOutOfRange { path: path.to_string(), index, len });
    }

    let mut next = doc.clone();
    sequence_at_mut(&mut next, path, max_depth)?.remove(index);
    tracing::debug!("数组项已删除: {}[{}]", path, index);
    Ok(next)
}

/// 仅用于元素本身是标量的数组
pub fn set_scalar_array_item(
    doc: &Value,
    path: &NodePath,
    index: usize,
    text: &str,
    max_depth: usize,
) -> Result<Value, EditError> {
    let items = sequence_at(doc, path, max_depth)?;
    let current = items.get(index).ok_or_else(|| EditError::IndexOutOfRange {
        path: path.to_string(),
        index,
        len: items.len(),
    })?;
    if kind_of(current) != NodeKind::Scalar {
        return Err(invalid_path(&path.index(index)));
    }

    let replacement = coerce_scalar(current, text);
    let mut next = doc.clone();
    sequence_at_mut(&mut next, path, max_depth)?[index] = replacement;
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::template::SequentialIds;
    use serde_json::json;
    use std::sync::Arc;

    const MAX_DEPTH: usize = 128;

    fn p(text: &str) -> NodePath {
        NodePath::parse(text).expect("测试路径应该有效")
    }

    fn cloner() -> TemplateCloner {
        TemplateCloner::new("id", MAX_DEPTH, Arc::new(SequentialIds::starting_at(1000)))
    }

    #[test]
    fn test_set_scalar_returns_new_document() {
        let doc = json!({"hero": {"title_en": "Welcome"}});
        let next = set_scalar(&doc, &p("$.hero.title_en"), "Hello", MAX_DEPTH).unwrap();

        assert_eq!(next, json!({"hero": {"title_en": "Hello"}}));
        assert_eq!(doc, json!({"hero": {"title_en": "Welcome"}}), "原文档不应被修改");
    }

    #[test]
    fn test_set_scalar_rejects_missing_and_container_paths() {
        let doc = json!({"hero": {"items": []}});
        assert!(matches!(
            set_scalar(&doc, &p("$.hero.missing"), "x", MAX_DEPTH),
            Err(EditError::InvalidPath { .. })
        ));
        assert!(matches!(
            set_scalar(&doc, &p("$.hero.items"), "x", MAX_DEPTH),
            Err(EditError::InvalidPath { .. })
        ), "容器节点不能按标量写入");
        assert!(matches!(
            set_scalar(&doc, &p("$.hero[0]"), "x", MAX_DEPTH),
            Err(EditError::InvalidPath { .. })
        ), "对象不能按索引访问");
    }

    #[test]
    fn test_set_scalar_keeps_scalar_type_when_possible() {
        let doc = json!({"count": 3, "active": true, "note": null});
        let next = set_scalar(&doc, &p("$.count"), "42", MAX_DEPTH).unwrap();
        let next = set_scalar(&next, &p("$.active"), "false", MAX_DEPTH).unwrap();
        let next = set_scalar(&next, &p("$.note"), "hi", MAX_DEPTH).unwrap();
        assert_eq!(next, json!({"count": 42, "active": false, "note": "hi"}));

        let next = set_scalar(&doc, &p("$.count"), "many", MAX_DEPTH).unwrap();
        assert_eq!(next["count"], json!("many"), "无法解析为数字时退化为字符串");
    }

    #[test]
    fn test_append_clones_first_item_empty() {
        let doc = json!({"hero": {"items": [{"label_en": "A", "label_ka": "ა"}]}});
        let next = append_array_item(&doc, &p("$.hero.items"), &cloner()).unwrap();

        let items = next["hero"]["items"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1], json!({"label_en": "", "label_ka": ""}));
        assert_eq!(items[0], json!({"label_en": "A", "label_ka": "ა"}), "已有项保持不变");
    }

    #[test]
    fn test_append_to_empty_sequence_adds_empty_mapping() {
        let doc = json!({"items": []});
        let next = append_array_item(&doc, &p("$.items"), &cloner()).unwrap();
        assert_eq!(next, json!({"items": [{}]}));
    }

    #[test]
    fn test_append_to_scalar_sequence() {
        let doc = json!({"tags": ["a", "b"]});
        let next = append_array_item(&doc, &p("$.tags"), &cloner()).unwrap();
        assert_eq!(next, json!({"tags": ["a", "b", ""]}));
    }

    #[test]
    fn test_append_requires_sequence() {
        let doc = json!({"hero": {"title": "x"}});
        assert!(matches!(
            append_array_item(&doc, &p("$.hero"), &cloner()),
            Err(EditError::NotASequence { .. })
        ));
        assert!(matches!(
            append_array_item(&doc, &p("$.nothing"), &cloner()),
            Err(EditError::NotASequence { .. })
        ));
    }

    #[test]
    fn test_append_assigns_distinct_id() {
        let doc = json!({"items": [{"id": 1000, "name": "a"}, {"id": 1001, "name": "b"}]});
        let next = append_array_item(&doc, &p("$.items"), &cloner()).unwrap();

        let new_id = &next["items"][2]["id"];
        assert!(new_id.is_number(), "数字标识应该保持数字类型");
        assert_ne!(new_id, &json!(1000));
        assert_ne!(new_id, &json!(1001));
        assert_eq!(next["items"][2]["name"], json!(""));
    }

    #[test]
    fn test_append_then_remove_restores_document() {
        let doc = json!({"list": [{"id": "x1", "title": "T"}, {"id": "x2", "title": "U"}]});
        let appended = append_array_item(&doc, &p("$.list"), &cloner()).unwrap();
        let restored = remove_array_item(&appended, &p("$.list"), 2, MAX_DEPTH).unwrap();
        assert_eq!(restored, doc);
    }

    #[test]
    fn test_remove_out_of_range() {
        let doc = json!({"list": [1, 2]});
        let err = remove_array_item(&doc, &p("$.list"), 2, MAX_DEPTH).unwrap_err();
        assert_eq!(
            err,
            EditError::IndexOutOfRange { path: "$.list".to_string(), index: 2, len: 2 }
        );
        assert!(matches!(
            remove_array_item(&doc, &p("$.list[0]"), 0, MAX_DEPTH),
            Err(EditError::NotASequence { .. })
        ));
    }

    #[test]
    fn test_set_scalar_array_item() {
        let doc = json!({"tags": ["a", "b"], "cards": [{"t": "x"}]});
        let next = set_scalar_array_item(&doc, &p("$.tags"), 1, "z", MAX_DEPTH).unwrap();
        assert_eq!(next["tags"], json!(["a", "z"]));

        assert!(matches!(
            set_scalar_array_item(&doc, &p("$.tags"), 5, "z", MAX_DEPTH),
            Err(EditError::IndexOutOfRange { index: 5, len: 2, .. })
        ));
        assert!(matches!(
            set_scalar_array_item(&doc, &p("$.cards"), 0, "z", MAX_DEPTH),
            Err(EditError::InvalidPath { .. })
        ), "对象元素不能按标量替换");
    }

    #[test]
    fn test_depth_bound_reports_invalid_path() {
        let doc = json!({"a": {"b": {"c": "deep"}}});
        assert!(set_scalar(&doc, &p("$.a.b.c"), "x", 3).is_ok());
        assert!(matches!(
            set_scalar(&doc, &p("$.a.b.c"), "x", 2),
            Err(EditError::InvalidPath { .. })
        ));
        assert!(matches!(
            remove_array_item(&doc, &p("$.a.b.c"), 0, 2),
            Err(EditError::InvalidPath { .. })
        ), "超深路径视为无效路径而不是类型错误");
    }

    #[test]
    fn test_scalar_root_document() {
        let doc = json!("plain");
        let next = set_scalar(&doc, &NodePath::root(), "changed", MAX_DEPTH).unwrap();
        assert_eq!(next, json!("changed"));
    }
}
