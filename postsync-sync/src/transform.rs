//! Post transformer: front-matter merge, attribution, and the
//! new/changed/unchanged decision.
//!
//! The decision is a byte comparison against the existing local copy; there
//! is no separate ledger. Stamped dates are first taken from the existing
//! copy so an unchanged remote post renders byte-identically on re-sync.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde_yaml::{Mapping, Value};

use postsync_core::{MemberRecord, SyncConfig};
use postsync_fetch::RemotePost;

use crate::error::{format_err, io_err, SyncError};
use crate::frontmatter::{self, Checksum, CHECKSUM_KEY};

pub const MEMBER_POST_CATEGORY: &str = "member-post";

/// Everything the transformer reads besides the post itself.
#[derive(Debug, Clone, Copy)]
pub struct TransformContext<'a> {
    pub member: &'a MemberRecord,
    pub config: &'a SyncConfig,
    pub posts_dir: &'a Path,
    pub today: NaiveDate,
    /// Overwrite local copies that were edited by hand.
    pub force: bool,
}

/// What should happen to the target file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// New or changed content. `previous` is the current local copy, if any.
    Write {
        path: PathBuf,
        content: String,
        previous: Option<String>,
    },
    /// Local copy is byte-identical to what would be written.
    Unchanged { path: PathBuf },
    /// Local copy was edited after the last sync and `force` is off.
    LocallyModified { path: PathBuf },
}

impl Decision {
    pub fn path(&self) -> &Path {
        match self {
            Decision::Write { path, .. }
            | Decision::Unchanged { path }
            | Decision::LocallyModified { path } => path,
        }
    }
}

/// `<username lowercased>-<filename>`; rejects names that would escape the
/// publications directory.
pub fn target_filename(member: &MemberRecord, filename: &str) -> Result<String, SyncError> {
    let unsafe_name = filename.is_empty()
        || filename.contains('/')
        || filename.contains('\\')
        || filename.contains("..");
    if unsafe_name {
        return Err(format_err(filename, "unsafe post filename"));
    }
    Ok(format!("{}-{}", member.username.file_prefix(), filename))
}

/// The attribution footer appended to synced bodies.
pub fn attribution_footer(member: &MemberRecord, config: &SyncConfig) -> String {
    format!(
        "*This post was originally published by [{}]({}) and automatically synced to the {} website.*",
        member.name, member.profile_url, config.site_name
    )
}

/// Decide what to do with `post`.
pub fn transform(post: &RemotePost, ctx: &TransformContext<'_>) -> Result<Decision, SyncError> {
    let path = ctx.posts_dir.join(target_filename(ctx.member, &post.filename)?);

    let normalized = post.raw_content.replace("\r\n", "\n");
    let document =
        frontmatter::split(&normalized).map_err(|e| format_err(&post.filename, e))?;

    let previous = read_existing(&path)?;
    let today = Stamps::today(ctx.today);

    if let Some(existing) = previous.as_deref() {
        let stamps = Stamps::from_existing(existing, &today);
        let candidate = build(&document, post, ctx, &stamps)?;
        if candidate == existing {
            return Ok(Decision::Unchanged { path });
        }
        if !ctx.force && frontmatter::verify(existing) == Checksum::Mismatch {
            return Ok(Decision::LocallyModified { path });
        }
    }

    let content = build(&document, post, ctx, &today)?;
    Ok(Decision::Write {
        path,
        content,
        previous,
    })
}

fn read_existing(path: &Path) -> Result<Option<String>, SyncError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(Some(content)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(io_err(path, err)),
    }
}

/// Values stamped into the front-matter by the sync itself.
struct Stamps {
    date: Value,
    synced_date: Value,
}

impl Stamps {
    fn today(today: NaiveDate) -> Self {
        let stamp = Value::String(today.format("%Y-%m-%d").to_string());
        Self {
            date: stamp.clone(),
            synced_date: stamp,
        }
    }

    fn from_existing(existing: &str, fallback: &Stamps) -> Self {
        let front_matter = frontmatter::split(existing)
            .map(|doc| doc.front_matter)
            .unwrap_or_default();
        let pick = |key: &str, fallback: &Value| {
            front_matter.get(key).cloned().unwrap_or_else(|| fallback.clone())
        };
        Self {
            date: pick("date", &fallback.date),
            synced_date: pick("synced_date", &fallback.synced_date),
        }
    }
}

fn build(
    document: &frontmatter::Document,
    post: &RemotePost,
    ctx: &TransformContext<'_>,
    stamps: &Stamps,
) -> Result<String, SyncError> {
    let member = ctx.member;
    let config = ctx.config;

    let mut fm = document.front_matter.clone();
    fm.remove(CHECKSUM_KEY);

    if is_blank(fm.get("title")) {
        let title = title_from_filename(&post.filename, &config.post_extension);
        set(&mut fm, "title", Value::String(title));
    }
    if !fm.contains_key("author") {
        set(&mut fm, "author", Value::String(member.name.clone()));
    }

    let date = match fm.get("date") {
        Some(original) if config.preserve_dates => original.clone(),
        _ => stamps.date.clone(),
    };
    set(&mut fm, "date", date);
    ensure_category(&mut fm, MEMBER_POST_CATEGORY);

    if config.add_attribution {
        set(&mut fm, "original_author", Value::String(member.name.clone()));
        set(&mut fm, "source_url", Value::String(post.source_url.clone()));
        set(&mut fm, "source", provenance(member, post));
    }
    set(&mut fm, "synced_date", stamps.synced_date.clone());

    let mut body = document.body.trim().to_string();
    if config.add_attribution {
        let footer = attribution_footer(member, config);
        if !body.contains(&footer) {
            if !body.is_empty() {
                body.push_str("\n\n---\n\n");
            }
            body.push_str(&footer);
        }
    }
    body.push('\n');

    frontmatter::seal(&fm, &body).map_err(|e| format_err(&post.filename, e))
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        Some(_) => false,
    }
}

/// `my-first_post.qmd` becomes `My First Post`.
pub fn title_from_filename(filename: &str, extension: &str) -> String {
    let stem = filename.strip_suffix(extension).unwrap_or(filename);
    stem.split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// `source:` block recording where the synced copy came from.
fn provenance(member: &MemberRecord, post: &RemotePost) -> Value {
    let posts_dir = member.posts_dir();
    let github_path = if posts_dir.is_empty() {
        post.filename.clone()
    } else {
        format!("{posts_dir}/{}", post.filename)
    };
    let mut source = Mapping::new();
    set(&mut source, "member", Value::String(member.name.clone()));
    set(&mut source, "username", Value::String(member.username.0.clone()));
    set(&mut source, "original_url", Value::String(post.source_url.clone()));
    set(&mut source, "github_path", Value::String(github_path));
    Value::Mapping(source)
}

fn set(fm: &mut Mapping, key: &str, value: Value) {
    fm.insert(Value::String(key.to_string()), value);
}

fn ensure_category(fm: &mut Mapping, category: &str) {
    let tag = Value::String(category.to_string());
    let categories = match fm.get("categories") {
        Some(Value::Sequence(existing)) => {
            let mut list = existing.clone();
            if !list.iter().any(|c| c.as_str() == Some(category)) {
                list.push(tag);
            }
            list
        }
        Some(Value::Null) | None => vec![tag],
        Some(single) if single.as_str() == Some(category) => vec![tag],
        Some(single) => vec![single.clone(), tag],
    };
    set(fm, "categories", Value::Sequence(categories));
}
