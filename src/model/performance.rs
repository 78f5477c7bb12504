//! 性能基准测试模块
//!
//! 用于测试大文档的单元枚举、大纲构建与高频脏检查的耗时

use std::fmt;
use std::time::Instant;

use serde_json::{json, Value};

use crate::config::EditorConfig;
use crate::model::dirty::{DirtyTracker, WorkingCopy};
use crate::model::editor::set_scalar;
use crate::model::path::NodePath;
use crate::model::shadow_tree::{build_outline, enumerate};

/// 性能测试结果
#[derive(Debug)]
pub struct PerformanceResult {
    pub operation: String,
    pub duration_ms: u128,
    pub success: bool,
    pub details: String,
}

impl PerformanceResult {
    pub fn new(operation: &str, duration_ms: u128, success: bool, details: &str) -> Self {
        Self {
            operation: operation.to_string(),
            duration_ms,
            success,
            details: details.to_string(),
        }
    }
}

impl fmt::Display for PerformanceResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.success { "✓" } else { "✗" };
        write!(f, "{} {}: {}ms ({})", mark, self.operation, self.duration_ms, self.details)
    }
}

/// 默认测试规模：(分区数, 每分区项数)
pub const DEFAULT_BENCH_CASES: [(usize, usize); 3] = [(5, 10), (20, 50), (50, 200)];

/// 生成双语内容文档：`sections` 个分区，每个分区带 `items` 项列表
pub fn generate_content_document(sections: usize, items: usize) -> Value {
    let mut root = serde_json::Map::new();
    for s in 0..sections {
        let list: Vec<Value> = (0..items)
            .map(|i| {
                json!({
                    "id": i,
                    "label_en": format!("Item {}", i),
                    "label_ka": format!("ელემენტი {}", i),
                    "image_url": format!("https://example.com/{}/{}.png", s, i),
                    "description_en": "Lorem ipsum dolor sit amet, consectetur adipiscing elit.",
                    "description_ka": "ლორემ იპსუმ"
                })
            })
            .collect();
        root.insert(
            format!("section_{}", s),
            json!({
                "title_en": format!("Section {}", s),
                "title_ka": format!("განყოფილება {}", s),
                "items": list
            }),
        );
    }
    Value::Object(root)
}

/// 逐个分区枚举编辑单元
pub fn benchmark_enumerate(doc: &Value, config: &EditorConfig) -> PerformanceResult {
    let start = Instant::now();
    let mut units = 0;
    let mut success = true;
    if let Value::Object(map) = doc {
        for key in map.keys() {
            match enumerate(doc, &NodePath::root().key(key), config) {
                Ok(entries) => units += entries.len(),
                Err(_) => success = false,
            }
        }
    }
    PerformanceResult::new("单元枚举", start.elapsed().as_millis(), success, &format!("枚举了 {} 个单元", units))
}

pub fn benchmark_outline(doc: &Value, config: &EditorConfig) -> PerformanceResult {
    let start = Instant::now();
    let outline = build_outline(doc, config.max_depth);
    PerformanceResult::new(
        "大纲构建",
        start.elapsed().as_millis(),
        !outline.is_empty(),
        &format!("构建了 {} 个节点", outline.len()),
    )
}

/// 模拟逐键输入：每次修改后立即做一次脏检查，再重复检查 `checks` 次
pub fn benchmark_dirty_checks(doc: &Value, edits: usize, checks: usize) -> PerformanceResult {
    let mut tracker = DirtyTracker::new();
    let mut live = WorkingCopy::new(doc.clone());
    tracker.track("bench", &live);

    let path = NodePath::root().key("section_0").key("title_en");
    let start = Instant::now();
    let mut success = true;
    for i in 0..edits {
        match set_scalar(live.document(), &path, &format!("Section {}", i + 1), usize::MAX) {
            Ok(next) => live.replace(next),
            Err(_) => {
                success = false;
                break;
            }
        }
        for _ in 0..checks {
            success &= tracker.is_dirty("bench", &live);
        }
    }
    PerformanceResult::new(
        "脏检查",
        start.elapsed().as_millis(),
        success,
        &format!("{} 次修改，每次 {} 次检查", edits, checks),
    )
}

/// 运行综合性能测试
pub fn run_performance_suite(config: &EditorConfig) -> Vec<PerformanceResult> {
    run_cases(config, &DEFAULT_BENCH_CASES)
}

pub fn run_cases(config: &EditorConfig, test_cases: &[(usize, usize)]) -> Vec<PerformanceResult> {
    let mut results = Vec::new();

    for &(sections, items) in test_cases {
        tracing::info!("测试规模：{}个分区，每个{}项", sections, items);

        let start = Instant::now();
        let doc = generate_content_document(sections, items);
        results.push(PerformanceResult::new(
            &format!("数据生成({}x{})", sections, items),
            start.elapsed().as_millis(),
            true,
            &format!("生成了{}个分区", sections),
        ));

        results.push(benchmark_enumerate(&doc, config));
        results.push(benchmark_outline(&doc, config));
        results.push(benchmark_dirty_checks(&doc, 20, 50));
    }

    results
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_content_document() {
        let doc = generate_content_document(2, 3);
        let obj = doc.as_object().unwrap();
        assert_eq!(obj.len(), 2);
        assert_eq!(doc["section_1"]["items"].as_array().unwrap().len(), 3);
    }

    #[test]
    fn test_performance_benchmarks() {
        let doc = generate_content_document(5, 20);
        let config = EditorConfig::default();

        let enumerate_result = benchmark_enumerate(&doc, &config);
        assert!(enumerate_result.success);
        assert!(enumerate_result.duration_ms < 1000); // 应该在1秒内完成

        let outline_result = benchmark_outline(&doc, &config);
        assert!(outline_result.success);

        let dirty_result = benchmark_dirty_checks(&doc, 10, 100);
        assert!(dirty_result.success, "每次修改后都应该检测到脏状态");
        assert!(dirty_result.duration_ms < 1000);
    }

    #[test]
    fn test_run_cases_reports_every_stage() {
        let results = run_cases(&EditorConfig::default(), &[(2, 3), (3, 1)]);
        assert_eq!(results.len(), 8, "每个规模产生四项结果");
        assert!(results.iter().all(|r| r.success));
        assert_eq!(results[0].operation, "数据生成(2x3)");

        let line = results[1].to_string();
        assert!(line.starts_with("✓ 单元枚举: "), "实际输出: {}", line);
        assert!(line.ends_with("(枚举了 4 个单元)"), "实际输出: {}", line);
    }
}
