//! IO helper: safe file read/write for JSON

use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::Path,
};

use serde_json::Value;

use crate::persistence::StoreError;

/// 从文件读取JSON数据
pub fn read_json_file(p: &Path) -> Result<Value, StoreError> {
    let f = File::open(p)?;
    let rdr = BufReader::new(f);
    let v: Value = serde_json::from_reader(rdr)?;
    Ok(v)
}

/// 将JSON数据保存到文件（格式化输出）；先写临时文件再重命名，避免写到一半的文件
pub fn write_json_file(p: &Path, value: &Value) -> Result<(), StoreError> {
    let tmp = p.with_extension("json.tmp");
    let result = write_then_rename(&tmp, p, value);
    if result.is_err() {
        // 失败时不留下临时文件
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

fn write_then_rename(tmp: &Path, p: &Path, value: &Value) -> Result<(), StoreError> {
    {
        let mut writer = BufWriter::new(File::create(tmp)?);
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush()?;
    }
    std::fs::rename(tmp, p)?;
    Ok(())
}
