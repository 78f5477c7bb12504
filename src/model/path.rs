//! 节点路径：从根出发的键/索引序列，与 JSONPath 文本互相转换

use std::fmt;
use std::str::FromStr;

use crate::model::editor::EditError;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct NodePath(Vec<PathSegment>);

impl NodePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn new(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&PathSegment> {
        self.0.last()
    }

    /// 子路径：追加一个键
    pub fn key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Key(key.into()));
        Self(segments)
    }

    /// 子路径：追加一个索引
    pub fn index(&self, index: usize) -> Self {
        let mut segments = self.0.clone();
        segments.push(PathSegment::Index(index));
        Self(segments)
    }

    /// 解析 `$.a.b[0]`、`$['a b'][0]` 等形式的路径
    pub fn parse(text: &str) -> Result<Self, EditError> {
        let invalid = || EditError::InvalidPath { path: text.to_string() };

        let mut chars = text.trim().chars().peekable();
        if chars.next() != Some('$') {
            return Err(invalid());
        }

        let mut segments = Vec::new();
        while let Some(ch) = chars.next() {
            match ch {
                '.' => {
                    // 兼容 `$.['a']` 写法
                    if chars.peek() == Some(&'[') {
                        continue;
                    }
                    let mut key = String::new();
                    while let Some(&c) = chars.peek() {
                        if c == '.' || c == '[' {
                            break;
                        }
                        key.push(c);
                        chars.next();
                    }
                    if key.is_empty() {
                        return Err(invalid());
                    }
                    segments.push(PathSegment::Key(key));
                }
                '[' => match chars.peek().copied() {
                    Some(quote @ ('\'' | '"')) => {
                        chars.next();
                        let mut key = String::new();
                        loop {
                            match chars.next() {
                                Some('\\') => key.push(chars.next().ok_or_else(invalid)?),
                                Some(c) if c == quote => break,
                                Some(c) => key.push(c),
                                None => return Err(invalid()),
                            }
                        }
                        if chars.next() != Some(']') {
                            return Err(invalid());
                        }
                        segments.push(PathSegment::Key(key));
                    }
                    Some(_) => {
                        let mut digits = String::new();
                        for c in chars.by_ref() {
                            if c == ']' {
                                break;
                            }
                            digits.push(c);
                        }
                        let index = digits.trim().parse::<usize>().map_err(|_| invalid())?;
                        segments.push(PathSegment::Index(index));
                    }
                    None => return Err(invalid()),
                },
                _ => return Err(invalid()),
            }
        }

        Ok(Self(segments))
    }
}

impl From<Vec<PathSegment>> for NodePath {
    fn from(segments: Vec<PathSegment>) -> Self {
        Self(segments)
    }
}

impl FromStr for NodePath {
    type Err = EditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NodePath::parse(s)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("$")?;
        for segment in &self.0 {
            match segment {
                // 字段含特殊字符时使用 bracket-notation
                PathSegment::Key(k) if !k.is_empty() && k.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') => {
                    write!(f, ".{}", k)?
                }
                PathSegment::Key(k) => write!(f, "['{}']", k.replace('\\', "\\\\").replace('\'', "\\'"))?,
                PathSegment::Index(i) => write!(f, "[{}]", i)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_simple_and_nested() {
        let path = NodePath::root().key("hero").key("items").index(0).key("label_en");
        assert_eq!(path.to_string(), "$.hero.items[0].label_en");
        assert_eq!(NodePath::root().to_string(), "$");
    }

    #[test]
    fn test_display_special_characters() {
        assert_eq!(NodePath::root().key("key with spaces").to_string(), "$['key with spaces']");
        assert_eq!(NodePath::root().key("key.with.dots").to_string(), "$['key.with.dots']");
        assert_eq!(NodePath::root().key("key'with'quotes").to_string(), "$['key\\'with\\'quotes']");
    }

    #[test]
    fn test_parse_dot_and_bracket_forms() {
        let expected = NodePath::root().key("hero").key("items").index(2);
        assert_eq!(NodePath::parse("$.hero.items[2]").unwrap(), expected);
        assert_eq!(NodePath::parse("$['hero']['items'][2]").unwrap(), expected);
        assert_eq!(NodePath::parse("$.[\"hero\"].items[2]").unwrap(), expected);
    }

    #[test]
    fn test_special_keys_survive_display_and_parse() {
        let path = NodePath::root().key("a'b").key("c d").key("e\\f").index(3);
        let reparsed: NodePath = path.to_string().parse().expect("解析失败");
        assert_eq!(reparsed, path);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "hero", "$.", "$[abc]", "$['unterminated", "$['a'x", "$x"] {
            assert!(
                matches!(NodePath::parse(bad), Err(EditError::InvalidPath { .. })),
                "{:?} 应该解析失败",
                bad
            );
        }
    }

    #[test]
    fn test_root_parse() {
        assert!(NodePath::parse("$").unwrap().is_root());
    }
}
