//! Key-path conventions for the folder simulation.

use crate::error::AppError;
use regex::Regex;
use std::sync::OnceLock;

/// Pseudo-folder for keys without a `/`.
pub const ROOT_FOLDER: &str = "root";

/// Zero-byte object that makes an otherwise empty folder visible.
pub const FOLDER_PLACEHOLDER: &str = ".folder";

const SUFFIX_LEN: usize = 8;

/// Folder of a key: its parent path segment, or `root` for top-level keys.
pub fn folder_of(key: &str) -> &str {
    let mut parts = key.rsplit('/');
    parts.next();
    match parts.next() {
        Some(parent) if !parent.is_empty() => parent,
        _ => ROOT_FOLDER,
    }
}

/// Everything before the file part, trailing `/` included; empty for top-level keys.
pub fn parent_prefix(key: &str) -> &str {
    match key.rfind('/') {
        Some(i) => &key[..=i],
        None => "",
    }
}

/// File part of a key.
pub fn file_name(key: &str) -> &str {
    key.rsplit('/').next().unwrap_or(key)
}

pub fn is_placeholder(key: &str) -> bool {
    file_name(key) == FOLDER_PLACEHOLDER
}

/// Folder names are a single segment; `root` is reserved for the bucket top level.
pub fn validate_folder(name: &str) -> Result<(), AppError> {
    let name = name.trim();
    if name.is_empty() || name.contains('/') || name == "." || name == ".." {
        return Err(AppError::Validation(format!("invalid folder name '{}'", name)));
    }
    if name == ROOT_FOLDER {
        return Err(AppError::Validation("'root' is reserved".into()));
    }
    Ok(())
}

pub fn validate_key(key: &str) -> Result<(), AppError> {
    if key.is_empty() || key.starts_with('/') || key.split('/').any(|s| s == "..") {
        return Err(AppError::Validation(format!("invalid object key '{}'", key)));
    }
    Ok(())
}

/// Key prefix for a folder: empty for root.
pub fn folder_prefix(folder: &str) -> String {
    if folder == ROOT_FOLDER {
        String::new()
    } else {
        format!("{}/", folder)
    }
}

fn slug_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9]+").ok()).as_ref()
}

/// Lowercase label with runs of anything else collapsed to `-`.
pub fn slugify(label: &str) -> String {
    let lower = label.to_lowercase();
    match slug_re() {
        Some(re) => re.replace_all(&lower, "-").trim_matches('-').to_string(),
        None => lower,
    }
}

/// Split `photo.final.PNG` into (`photo.final`, Some(`png`)).
pub fn split_extension(name: &str) -> (&str, Option<String>) {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && !ext.is_empty() => (stem, Some(ext.to_lowercase())),
        _ => (name, None),
    }
}

fn random_suffix() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..SUFFIX_LEN].to_string()
}

/// `<folder>/<slug>-<suffix>.<ext>` (no folder part for root). The slug comes from the
/// label, falling back to the original file stem, then to `file`.
pub fn unique_key(folder: &str, label: &str, original_name: &str) -> String {
    let (stem, ext) = split_extension(file_name(original_name));
    let mut slug = slugify(label);
    if slug.is_empty() {
        slug = slugify(stem);
    }
    if slug.is_empty() {
        slug = "file".into();
    }
    let mut name = format!("{}-{}", slug, random_suffix());
    if let Some(ext) = ext {
        name.push('.');
        name.push_str(&ext);
    }
    format!("{}{}", folder_prefix(folder), name)
}
