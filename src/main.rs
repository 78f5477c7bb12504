//! 程序入口：初始化日志，打开内容目录中的一个分区并执行单条编辑命令
//!
//! 用法: neirong_bianji <内容目录> <分区键> <命令> [参数...]
//!       neirong_bianji bench      运行性能测试
//!
//! 命令:
//!   show [路径]                 列出编辑单元（默认根节点）
//!   outline [过滤]              显示整个文档的扁平大纲
//!   set <路径> <文本>           修改标量
//!   append <路径>               在数组末尾追加空模板项
//!   remove <路径> <索引>        删除数组项
//!   set-item <路径> <索引> <文本> 修改标量数组中的元素
//!   query <JSONPath>            输出第一个匹配节点
//!
//! 环境变量 NEIRONG_BIANJI_CONFIG 可指定编辑器配置文件。

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tracing_subscriber::fmt::SubscriberBuilder;

use neirong_bianji::model::performance::run_performance_suite;
use neirong_bianji::vm::bridge::{
    rows_for, STATUS_ERROR_PREFIX, STATUS_LOADED, STATUS_READY, STATUS_SAVED, STATUS_UNCHANGED,
};
use neirong_bianji::{EditorConfig, EditorSession, FileContentStore, NodePath, PersistenceGateway};

const CONFIG_ENV: &str = "NEIRONG_BIANJI_CONFIG";

fn load_config() -> Result<EditorConfig> {
    match std::env::var_os(CONFIG_ENV) {
        Some(path) => {
            let path = PathBuf::from(path);
            EditorConfig::from_file(&path).with_context(|| format!("读取配置失败: {}", path.display()))
        }
        None => Ok(EditorConfig::default()),
    }
}

fn arg<'a>(args: &'a [String], idx: usize, name: &str) -> Result<&'a str> {
    args.get(idx)
        .map(String::as_str)
        .with_context(|| format!("缺少参数: {}", name))
}

fn parse_path(text: &str) -> Result<NodePath> {
    NodePath::parse(text).with_context(|| format!("无法解析路径: {}", text))
}

fn parse_index(text: &str) -> Result<usize> {
    text.parse().with_context(|| format!("索引必须是非负整数: {}", text))
}

fn run_bench() -> Result<()> {
    let results = run_performance_suite(&load_config()?);
    for result in &results {
        println!("{}", result);
    }
    if results.iter().any(|r| !r.success) {
        bail!("部分性能测试失败");
    }
    Ok(())
}

fn run(args: &[String]) -> Result<()> {
    if args.first().map(String::as_str) == Some("bench") {
        return run_bench();
    }

    let content_dir = arg(args, 0, "内容目录")?;
    let section = arg(args, 1, "分区键")?;
    let command = arg(args, 2, "命令")?;
    let rest = &args[3..];

    let store = Arc::new(FileContentStore::new(content_dir));
    let mut session = EditorSession::new(PersistenceGateway::with_store(store), load_config()?);
    session.open(section)?;
    tracing::info!("{}: {}", STATUS_LOADED, section);

    match command {
        "show" => {
            let path = match rest.first() {
                Some(p) => parse_path(p)?,
                None => NodePath::root(),
            };
            for row in rows_for(&session.enumerate(section, &path)?) {
                println!("{}", row);
            }
            return Ok(());
        }
        "outline" => {
            let filter = rest.first().map(String::as_str).unwrap_or("");
            for node in session.outline_filtered(section, filter)?.iter().filter(|n| n.visible) {
                println!("{}{}  {}", "  ".repeat(node.depth), node.name, node.preview);
            }
            return Ok(());
        }
        "query" => {
            println!("{}", session.extract_subtree_pretty(section, arg(rest, 0, "JSONPath")?)?);
            return Ok(());
        }
        "set" => {
            let path = parse_path(arg(rest, 0, "路径")?)?;
            session.set_scalar(section, &path, arg(rest, 1, "文本")?)?;
        }
        "append" => {
            let path = parse_path(arg(rest, 0, "路径")?)?;
            let index = session.append_array_item(section, &path)?;
            println!("{}", path.index(index));
        }
        "remove" => {
            let path = parse_path(arg(rest, 0, "路径")?)?;
            session.remove_array_item(section, &path, parse_index(arg(rest, 1, "索引")?)?)?;
        }
        "set-item" => {
            let path = parse_path(arg(rest, 0, "路径")?)?;
            let index = parse_index(arg(rest, 1, "索引")?)?;
            session.set_scalar_array_item(section, &path, index, arg(rest, 2, "文本")?)?;
        }
        other => bail!("未知命令: {}", other),
    }

    if session.is_dirty(section)? {
        session.save(section)?;
        println!("{}", STATUS_SAVED);
    } else {
        println!("{}", STATUS_UNCHANGED);
    }
    Ok(())
}

fn main() {
    // 初始化日志输出
    let _ = SubscriberBuilder::default()
        .with_max_level(tracing::Level::INFO)
        .with_writer(std::io::stderr)
        .try_init();
    tracing::info!("{}", STATUS_READY);

    let args: Vec<String> = std::env::args().skip(1).collect();
    if let Err(e) = run(&args) {
        tracing::error!("命令执行失败: {:#}", e);
        eprintln!("{}{:#}", STATUS_ERROR_PREFIX, e);
        std::process::exit(1);
    }
}
