use indexmap::IndexMap;

use super::types::Change;

/// How a change record affects the aggregate flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Add,
    Edit,
    Other,
}

impl ChangeKind {
    /// Classify a raw `changeType`, ignoring case. Anything that is not
    /// exactly "add" or "edit" (delete, rename, "edit, rename", ...) is `Other`.
    pub fn classify(raw: &str) -> Self {
        if raw.eq_ignore_ascii_case("edit") {
            ChangeKind::Edit
        } else if raw.eq_ignore_ascii_case("add") {
            ChangeKind::Add
        } else {
            ChangeKind::Other
        }
    }
}

/// Per-file summary across every commit of the pull request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileAggregate {
    /// Authors in order of first contribution, no duplicates
    pub users: Vec<String>,
    /// Set once any change to the file was an edit
    pub edited: bool,
    /// Set once any change to the file was an add
    pub added: bool,
}

impl FileAggregate {
    fn record(&mut self, user: &str, kind: ChangeKind) {
        if !self.users.iter().any(|u| u == user) {
            self.users.push(user.to_string());
        }
        match kind {
            ChangeKind::Edit => self.edited = true,
            ChangeKind::Add => self.added = true,
            ChangeKind::Other => {}
        }
    }
}

/// File aggregates keyed by base file name, iterated in order of first sighting.
///
/// Files sharing a base name in different directories collapse into a single
/// entry (`src/a/mod.rs` and `src/b/mod.rs` both count as `mod.rs`).
pub type FileAggregates = IndexMap<String, FileAggregate>;

/// Record one change to `file_name` by `user`.
pub fn record(aggregates: &mut FileAggregates, file_name: &str, user: &str, kind: ChangeKind) {
    aggregates
        .entry(file_name.to_string())
        .or_default()
        .record(user, kind);
}

/// Fold one commit's change list into the aggregates. Non-blob entries
/// are skipped. Returns the number of changes recorded.
pub fn fold_commit(aggregates: &mut FileAggregates, author: &str, changes: &[Change]) -> usize {
    let mut recorded = 0;
    for change in changes.iter().filter(|c| c.is_blob()) {
        let kind = ChangeKind::classify(&change.change_type);
        record(aggregates, base_name(&change.item.path), author, kind);
        recorded += 1;
    }
    recorded
}

/// Last `/`-separated segment of an item path.
pub fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}
