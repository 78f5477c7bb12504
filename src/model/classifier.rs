//! 字段分类：根据字段名与标量值决定展示方式（短文本/长文本/图片引用）

use serde_json::Value;

use crate::model::editor::scalar_text;

/// 字段名包含以下子串（不区分大小写）时视为图片引用
pub const IMAGE_PATTERNS: [&str; 4] = ["image", "logo", "photo", "avatar"];
/// 字段名以此结尾时同样视为图片引用
pub const IMAGE_SUFFIX: &str = "_url";
/// 字段名包含以下子串时视为长文本
pub const LONG_TEXT_PATTERNS: [&str; 6] =
    ["text", "description", "bio", "content", "subtitle", "paragraph"];

/// 字段的展示方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldPresentation {
    ShortText,
    LongText,
    ImageReference,
}

impl FieldPresentation {
    /// 图片引用需要渲染层展示URL预览
    pub fn shows_preview(self) -> bool {
        matches!(self, FieldPresentation::ImageReference)
    }
}

/// 按顺序匹配，先命中者生效
pub fn classify(field_name: &str, value: &str, long_text_threshold: usize) -> FieldPresentation {
    let name = field_name.to_lowercase();

    if IMAGE_PATTERNS.iter().any(|p| name.contains(p)) || name.ends_with(IMAGE_SUFFIX) {
        return FieldPresentation::ImageReference;
    }

    if value.chars().count() > long_text_threshold
        || LONG_TEXT_PATTERNS.iter().any(|p| name.contains(p))
    {
        return FieldPresentation::LongText;
    }

    FieldPresentation::ShortText
}

/// 对任意标量值分类；null 按空字符串处理
pub fn classify_value(field_name: &str, value: &Value, long_text_threshold: usize) -> FieldPresentation {
    classify(field_name, &scalar_text(value), long_text_threshold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const THRESHOLD: usize = 80;

    #[test]
    fn test_image_patterns() {
        for name in ["hero_image", "Logo", "team_photo", "avatar", "cta_url", "BACKGROUND_IMAGE_en"] {
            assert_eq!(
                classify(name, "x", THRESHOLD),
                FieldPresentation::ImageReference,
                "{} 应该被识别为图片引用",
                name
            );
        }
    }

    #[test]
    fn test_image_wins_over_long_text() {
        let long_value = "a".repeat(200);
        assert_eq!(classify("image_description", &long_value, THRESHOLD), FieldPresentation::ImageReference);
    }

    #[test]
    fn test_long_text_by_name() {
        for name in ["body_text", "description_en", "bio", "page_content", "subtitle_ka", "paragraph1"] {
            assert_eq!(classify(name, "短", THRESHOLD), FieldPresentation::LongText, "{} 应该是长文本", name);
        }
    }

    #[test]
    fn test_long_text_by_length() {
        let at_threshold = "a".repeat(80);
        let over_threshold = "a".repeat(81);
        assert_eq!(classify("title", &at_threshold, THRESHOLD), FieldPresentation::ShortText);
        assert_eq!(classify("title", &over_threshold, THRESHOLD), FieldPresentation::LongText);
    }

    #[test]
    fn test_length_counts_characters_not_bytes() {
        // 40个格鲁吉亚字母，超过80字节但不足80字符
        let georgian = "ა".repeat(40);
        assert!(georgian.len() > 80);
        assert_eq!(classify("title_ka", &georgian, THRESHOLD), FieldPresentation::ShortText);
    }

    #[test]
    fn test_url_suffix_must_be_at_end() {
        assert_eq!(classify("url_label", "x", THRESHOLD), FieldPresentation::ShortText);
        assert_eq!(classify("link_url", "x", THRESHOLD), FieldPresentation::ImageReference);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let inputs = [("title", "Welcome"), ("logo_url", "http://a"), ("bio", ""), ("x", "y")];
        for (name, value) in inputs {
            let first = classify(name, value, THRESHOLD);
            for _ in 0..10 {
                assert_eq!(classify(name, value, THRESHOLD), first);
            }
        }
    }

    #[test]
    fn test_null_and_non_string_scalars() {
        assert_eq!(classify_value("title", &Value::Null, THRESHOLD), FieldPresentation::ShortText);
        assert_eq!(classify_value("count", &json!(42), THRESHOLD), FieldPresentation::ShortText);
        assert!(classify_value("photo", &json!(true), THRESHOLD).shows_preview());
    }
}
