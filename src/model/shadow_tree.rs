//! 影子树（Shadow Tree）：把文档某一层展开为编辑单元，嵌套容器保持折叠，按需再展开

use serde_json::Value;

use crate::config::EditorConfig;
use crate::model::classifier::{classify_value, FieldPresentation};
use crate::model::editor::{kind_of, resolve, scalar_text, EditError, NodeKind};
use crate::model::pairing::{resolve_units, EditUnit};
use crate::model::path::{NodePath, PathSegment};

/// 单个可编辑标量
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEntry {
    /// 显示名：对象键或 `[索引]`
    pub label: String,
    pub path: NodePath,
    pub text: String,
    pub presentation: FieldPresentation,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditEntry {
    Field(FieldEntry),
    Paired {
        base: String,
        primary: FieldEntry,
        secondary: FieldEntry,
    },
    /// 嵌套对象/数组，默认折叠，需要时以 `path` 再次 enumerate
    Section {
        label: String,
        path: NodePath,
        kind: NodeKind,
        children: usize,
    },
}

impl EditEntry {
    pub fn label(&self) -> &str {
        match self {
            EditEntry::Field(field) => &field.label,
            EditEntry::Paired { base, .. } => base,
            EditEntry::Section { label, .. } => label,
        }
    }
}

fn child_count(v: &Value) -> usize {
    match v {
        Value::Object(m) => m.len(),
        Value::Array(a) => a.len(),
        _ => 0,
    }
}

fn field_entry(label: &str, field_name: &str, path: NodePath, value: &Value, config: &EditorConfig) -> FieldEntry {
    FieldEntry {
        label: label.to_string(),
        path,
        text: scalar_text(value),
        presentation: classify_value(field_name, value, config.long_text_threshold),
    }
}

fn entry_for(label: &str, field_name: &str, path: NodePath, value: &Value, config: &EditorConfig) -> EditEntry {
    match kind_of(value) {
        NodeKind::Scalar => EditEntry::Field(field_entry(label, field_name, path, value, config)),
        kind => EditEntry::Section {
            label: label.to_string(),
            path,
            kind,
            children: child_count(value),
        },
    }
}

/// 列出 `path` 处节点的直接编辑单元
pub fn enumerate(doc: &Value, path: &NodePath, config: &EditorConfig) -> Result<Vec<EditEntry>, EditError> {
    let node = resolve(doc, path, config.max_depth)?;

    let entries = match node {
        Value::Object(map) => {
            let keys: Vec<&str> = map.keys().map(String::as_str).collect();
            let mut entries = Vec::with_capacity(keys.len());
            for unit in resolve_units(&keys, &config.languages) {
                match unit {
                    EditUnit::Paired { base, primary_key, secondary_key } => {
                        let first = &map[primary_key.as_str()];
                        let second = &map[secondary_key.as_str()];
                        if kind_of(first) == NodeKind::Scalar && kind_of(second) == NodeKind::Scalar {
                            entries.push(EditEntry::Paired {
                                base,
                                primary: field_entry(&primary_key, &primary_key, path.key(&primary_key), first, config),
                                secondary: field_entry(&secondary_key, &secondary_key, path.key(&secondary_key), second, config),
                            });
                        } else {
                            // 配对中含容器时按各自的键分别展示
                            entries.push(entry_for(&primary_key, &primary_key, path.key(&primary_key), first, config));
                            entries.push(entry_for(&secondary_key, &secondary_key, path.key(&secondary_key), second, config));
                        }
                    }
                    EditUnit::Singleton { key } => {
                        entries.push(entry_for(&key, &key, path.key(&key), &map[key.as_str()], config));
                    }
                }
            }
            entries
        }
        Value::Array(items) => {
            // 标量数组元素按所在字段名分类（例如 gallery_images）
            let field_name = match path.last() {
                Some(PathSegment::Key(k)) => k.as_str(),
                _ => "",
            };
            items
                .iter()
                .enumerate()
                .map(|(idx, item)| entry_for(&format!("[{}]", idx), field_name, path.index(idx), item, config))
                .collect()
        }
        Value::String(_) | Value::Number(_) | Value::Bool(_) | Value::Null => {
            let label = match path.last() {
                Some(PathSegment::Key(k)) => k.clone(),
                Some(PathSegment::Index(i)) => format!("[{}]", i),
                None => "$".to_string(),
            };
            vec![EditEntry::Field(field_entry(&label, &label, path.clone(), node, config))]
        }
    };

    Ok(entries)
}

/// 全文档扁平大纲中的一个节点
#[derive(Debug, Clone)]
pub struct OutlineNode {
    /// 节点在父级中的键名或索引的字符串形式
    pub name: String,
    pub path: NodePath,
    pub kind: NodeKind,
    /// 子元素数量（对象字段数 / 数组长度）
    pub children: usize,
    /// 轻量预览（字符串截断、数字/布尔/空的简短描述）
    pub preview: String,
    /// 节点深度（用于UI缩进显示）
    pub depth: usize,
    /// 是否可见（用于搜索过滤）
    pub visible: bool,
}

fn preview_of(v: &Value) -> String {
    match v {
        Value::String(s) => {
            let s = s.trim();
            if s.chars().count() > 32 {
                let truncated: String = s.chars().take(32).collect();
                format!("\"{}...\"", truncated)
            } else {
                format!("\"{}\"", s)
            }
        }
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Object(m) => format!("{{..}} ({} keys)", m.len()),
        Value::Array(a) => format!("[..] ({} items)", a.len()),
    }
}

/// 先序遍历整个文档构建扁平大纲；使用显式栈，超过深度上限的子树不展开
pub fn build_outline(root: &Value, max_depth: usize) -> Vec<OutlineNode> {
    let mut out = Vec::with_capacity(1024);
    let mut stack: Vec<(&Value, NodePath, String)> = vec![(root, NodePath::root(), "$".to_string())];
    let mut truncated = false;

    while let Some((v, path, name)) = stack.pop() {
        let depth = path.len();
        out.push(OutlineNode {
            name,
            path: path.clone(),
            kind: kind_of(v),
            children: child_count(v),
            preview: preview_of(v),
            depth,
            visible: true,
        });

        if depth >= max_depth {
            truncated |= child_count(v) > 0;
            continue;
        }
        // 逆序入栈以保持先序输出
        match v {
            Value::Object(map) => {
                for (k, child) in map.iter().rev() {
                    stack.push((child, path.key(k), k.clone()));
                }
            }
            Value::Array(arr) => {
                for (idx, child) in arr.iter().enumerate().rev() {
                    stack.push((child, path.index(idx), format!("[{}]", idx)));
                }
            }
            _ => {}
        }
    }

    if truncated {
        tracing::warn!("文档深度超过上限 {}，部分子树未展开", max_depth);
    }
    out
}

/// 按名称或路径做简单子串过滤；空过滤条件恢复全部可见
pub fn apply_outline_filter(nodes: &mut [OutlineNode], filter: &str) {
    let filter = filter.trim();
    for node in nodes {
        node.visible = filter.is_empty() || node.name.contains(filter) || node.path.to_string().contains(filter);
    }
}
