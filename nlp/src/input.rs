use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use walkdir::WalkDir;

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// Collects `.json`/`.jsonl` files under `input`, or `input` itself when it is a file.
pub fn input_files(input: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).sort_by_file_name().into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files
}

/// Reads every record from JSON (single object or array) and JSONL files.
pub fn load_records<T: DeserializeOwned>(input: &Path) -> Result<Vec<T>> {
    let mut records = Vec::new();
    for file in input_files(input) {
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            load_jsonl(&file, &mut records)?;
        } else {
            load_json(&file, &mut records)?;
        }
    }
    tracing::info!(records = records.len(), input = %input.display(), "loaded records");
    Ok(records)
}

fn load_jsonl<T: DeserializeOwned>(file: &Path, out: &mut Vec<T>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for (lineno, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        let record = serde_json::from_str(&line)
            .with_context(|| format!("{}:{}", file.display(), lineno + 1))?;
        out.push(record);
    }
    Ok(())
}

fn load_json<T: DeserializeOwned>(file: &Path, out: &mut Vec<T>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)
        .with_context(|| format!("parsing {}", file.display()))?;
    match json {
        serde_json::Value::Array(arr) => {
            for v in arr {
                out.push(serde_json::from_value(v).with_context(|| format!("record in {}", file.display()))?);
            }
        }
        serde_json::Value::Object(_) => {
            out.push(serde_json::from_value(json).with_context(|| format!("record in {}", file.display()))?);
        }
        _ => {}
    }
    Ok(())
}

/// One reference document per non-empty line.
pub fn load_lines(path: &Path) -> Result<Vec<String>> {
    let reader = BufReader::new(File::open(path).with_context(|| format!("opening {}", path.display()))?);
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if !line.is_empty() {
            lines.push(line.to_string());
        }
    }
    Ok(lines)
}
