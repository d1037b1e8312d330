//! JSON file output.
//!
//! A collection is written as `index.json` (the full array) plus one file
//! per item in the same directory.

use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{LmError, Result};
use crate::models::LogicModule;

/// Name of the per-collection index file.
pub const INDEX_FILE: &str = "index.json";

/// Longest filename fragment produced by [`safe_filename`], in characters.
pub const MAX_NAME_LEN: usize = 160;

fn unsafe_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^\w\-.()@\[\] ]+").expect("static pattern"))
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static pattern"))
}

/// Make a filesystem-safe filename fragment.
///
/// Runs of characters other than word characters, `-`, `.`, `(`, `)`, `@`,
/// `[`, `]` and space become a single `_`; whitespace runs collapse to one
/// space; the result is capped at [`MAX_NAME_LEN`] characters.
pub fn safe_filename(name: &str) -> String {
    let name = name.trim();
    let name = unsafe_chars().replace_all(name, "_");
    let name = whitespace_runs().replace_all(&name, " ");

    let mut name: String = name.chars().take(MAX_NAME_LEN).collect();
    name.truncate(name.trim_end().len());

    if name.is_empty() {
        "unnamed".to_string()
    } else {
        name
    }
}

/// File stem `<id>__<name>`, or just `<name>` without an id. A missing
/// name reads as `unnamed`.
pub fn item_file_stem(id: Option<&str>, name: Option<&str>) -> String {
    let name = safe_filename(name.unwrap_or("unnamed"));
    match id {
        Some(id) => format!("{}__{name}", safe_filename(id)),
        None => name,
    }
}

/// File stem for a module.
pub fn module_file_stem(module: &LogicModule) -> String {
    item_file_stem(module.id().as_deref(), module.name())
}

/// Write `value` as pretty-printed JSON (two-space indent, UTF-8).
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let file = File::create(path).map_err(|e| LmError::io(path, e))?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, value)?;
    writer.flush().map_err(|e| LmError::io(path, e))
}

/// Create `path` and its parents.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| LmError::io(path, e))
}

/// Files produced for one collection.
#[derive(Debug, Clone)]
pub struct CollectionFiles {
    pub dir: PathBuf,
    pub index: PathBuf,
    pub items: Vec<PathBuf>,
}

/// Hands out `<stem>.json` names, suffixing `__<n>` on repeats so no two
/// items share a file. Comparison ignores ASCII case to stay safe on
/// case-insensitive filesystems.
#[derive(Debug)]
struct UniqueNames {
    used: HashSet<String>,
}

impl UniqueNames {
    fn new() -> Self {
        let mut used = HashSet::new();
        used.insert(INDEX_FILE.to_string());
        Self { used }
    }

    fn claim(&mut self, stem: &str) -> String {
        let mut candidate = format!("{stem}.json");
        let mut n = 2;
        while !self.used.insert(candidate.to_ascii_lowercase()) {
            candidate = format!("{stem}__{n}.json");
            n += 1;
        }
        candidate
    }
}

/// Write a collection into `dir`: `index.json` with every item, then one
/// file per item named by `file_stem`.
///
/// # Errors
///
/// Returns the first filesystem or serialization error.
pub fn write_collection<T, F>(dir: &Path, items: &[T], file_stem: F) -> Result<CollectionFiles>
where
    T: Serialize,
    F: Fn(&T) -> String,
{
    ensure_dir(dir)?;

    let index = dir.join(INDEX_FILE);
    write_json(&index, items)?;

    let mut names = UniqueNames::new();
    let mut paths = Vec::with_capacity(items.len());
    for item in items {
        let path = dir.join(names.claim(&file_stem(item)));
        write_json(&path, item)?;
        paths.push(path);
    }

    Ok(CollectionFiles {
        dir: dir.to_path_buf(),
        index,
        items: paths,
    })
}
