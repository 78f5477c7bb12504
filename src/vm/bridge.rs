//! VM桥接层：把编辑单元转换为宿主界面可直接展示的行

use std::fmt;

use crate::model::classifier::FieldPresentation;
use crate::model::editor::NodeKind;
use crate::model::shadow_tree::{EditEntry, FieldEntry};

// === 常量定义（消除魔法值） ===
pub const STATUS_READY: &str = "就绪";
pub const STATUS_LOADED: &str = "分区加载完成";
pub const STATUS_SAVED: &str = "保存成功";
pub const STATUS_UNCHANGED: &str = "没有需要保存的修改";
pub const STATUS_ERROR_PREFIX: &str = "错误: ";

/// 一行中的一个输入控件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowCell {
    pub key: String,
    pub path: String,
    pub text: String,
    pub widget: &'static str,
    /// 图片引用需要显示预览
    pub preview: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnitRow {
    pub label: String,
    /// 折叠的嵌套分区没有输入控件
    pub cells: Vec<RowCell>,
    pub section: Option<SectionInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionInfo {
    pub path: String,
    pub kind: NodeKind,
    pub children: usize,
}

fn widget_of(presentation: FieldPresentation) -> &'static str {
    match presentation {
        FieldPresentation::ShortText => "短文本",
        FieldPresentation::LongText => "长文本",
        FieldPresentation::ImageReference => "图片",
    }
}

impl From<&FieldEntry> for RowCell {
    fn from(field: &FieldEntry) -> Self {
        Self {
            key: field.label.clone(),
            path: field.path.to_string(),
            text: field.text.clone(),
            widget: widget_of(field.presentation),
            preview: field.presentation.shows_preview(),
        }
    }
}

impl From<&EditEntry> for UnitRow {
    fn from(entry: &EditEntry) -> Self {
        match entry {
            EditEntry::Field(field) => Self {
                label: field.label.clone(),
                cells: vec![RowCell::from(field)],
                section: None,
            },
            EditEntry::Paired { base, primary, secondary } => Self {
                label: base.clone(),
                cells: vec![RowCell::from(primary), RowCell::from(secondary)],
                section: None,
            },
            EditEntry::Section { label, path, kind, children } => Self {
                label: label.clone(),
                cells: Vec::new(),
                section: Some(SectionInfo {
                    path: path.to_string(),
                    kind: *kind,
                    children: *children,
                }),
            },
        }
    }
}

pub fn rows_for(entries: &[EditEntry]) -> Vec<UnitRow> {
    entries.iter().map(UnitRow::from).collect()
}

impl fmt::Display for UnitRow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(section) = &self.section {
            let marker = match section.kind {
                NodeKind::Sequence => format!("[..] ({} items)", section.children),
                _ => format!("{{..}} ({} keys)", section.children),
            };
            return write!(f, "▸ {} {}  {}", self.label, marker, section.path);
        }
        write!(f, "{}", self.label)?;
        for cell in &self.cells {
            write!(f, "\n    {} [{}] {:?}  {}", cell.key, cell.widget, cell.text, cell.path)?;
            if cell.preview {
                write!(f, "  (预览)")?;
            }
        }
        Ok(())
    }
}
