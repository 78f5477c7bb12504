//! 双语配对：同一逻辑字段的两种语言版本（按后缀约定）合并为一个编辑单元

use std::collections::HashSet;

use serde::Deserialize;

/// 站点支持的两种语言后缀
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LanguagePair {
    pub primary: String,
    pub secondary: String,
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self {
            primary: "_en".to_string(),
            secondary: "_ka".to_string(),
        }
    }
}

impl LanguagePair {
    /// 去掉语言后缀得到基础名；无后缀或基础名为空时返回 None
    pub fn base_of<'a>(&self, key: &'a str) -> Option<&'a str> {
        [&self.primary, &self.secondary]
            .into_iter()
            .find_map(|suffix| key.strip_suffix(suffix.as_str()))
            .filter(|base| !base.is_empty())
    }

    pub fn primary_key(&self, base: &str) -> String {
        format!("{}{}", base, self.primary)
    }

    pub fn secondary_key(&self, base: &str) -> String {
        format!("{}{}", base, self.secondary)
    }
}

/// 编辑单元：单字段或双语配对
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditUnit {
    Paired {
        base: String,
        primary_key: String,
        secondary_key: String,
    },
    Singleton {
        key: String,
    },
}

impl EditUnit {
    /// 单元涉及的键（按写回顺序）
    pub fn keys(&self) -> Vec<&str> {
        match self {
            EditUnit::Paired { primary_key, secondary_key, .. } => {
                vec![primary_key.as_str(), secondary_key.as_str()]
            }
            EditUnit::Singleton { key } => vec![key.as_str()],
        }
    }
}

/// 按原始键顺序生成编辑单元；配对在遇到第一语言版本时输出，
/// 只存在单一语言版本的键保持为单字段，不推测缺失的语言
pub fn resolve_units<S: AsRef<str>>(keys: &[S], languages: &LanguagePair) -> Vec<EditUnit> {
    let present: HashSet<&str> = keys.iter().map(AsRef::as_ref).collect();
    let mut consumed: HashSet<&str> = HashSet::with_capacity(keys.len());
    let mut units = Vec::with_capacity(keys.len());

    for key in keys.iter().map(AsRef::as_ref) {
        if consumed.contains(key) {
            continue;
        }

        if let Some(base) = languages.base_of(key) {
            let primary_key = languages.primary_key(base);
            let secondary_key = languages.secondary_key(base);
            if present.contains(primary_key.as_str()) && present.contains(secondary_key.as_str()) {
                if key == primary_key {
                    consumed.insert(key);
                    if let Some(&sibling) = present.get(secondary_key.as_str()) {
                        consumed.insert(sibling);
                    }
                    units.push(EditUnit::Paired {
                        base: base.to_string(),
                        primary_key,
                        secondary_key,
                    });
                }
                // 第二语言版本在其配对处理时一并消费
                continue;
            }
        }

        consumed.insert(key);
        units.push(EditUnit::Singleton { key: key.to_string() });
    }

    units
}
