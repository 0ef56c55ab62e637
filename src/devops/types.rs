use serde::Deserialize;

/// Everything needed to open a session against one pull request.
/// Built by `input::validate_inputs`, immutable afterwards.
#[derive(Clone)]
pub struct Credentials {
    /// Personal access token, sent as the basic-auth password
    pub token: String,
    /// Organization name (e.g., "Contoso")
    pub organization: String,
    /// Project name within the organization
    pub project: String,
    /// Human-readable repository name, resolved to an id on connect
    pub repository: String,
    /// Pull request number
    pub pr_number: u64,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &"<redacted>")
            .field("organization", &self.organization)
            .field("project", &self.project)
            .field("repository", &self.repository)
            .field("pr_number", &self.pr_number)
            .finish()
    }
}

/// Envelope used by list endpoints: `{ "count": n, "value": [...] }`.
#[derive(Debug, Deserialize)]
pub struct ValueList<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Repository {
    pub id: String,
    pub name: String,
}

/// A commit belonging to the pull request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Commit {
    pub commit_id: String,
    pub author: Author,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Author {
    pub name: String,
}

/// Body of the per-commit changes endpoint.
#[derive(Debug, Deserialize)]
pub struct ChangeList {
    #[serde(default)]
    pub changes: Vec<Change>,
}

/// A single entry in a commit's change list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Change {
    #[serde(default)]
    pub item: ChangeItem,
    /// Raw change type, e.g. "add", "edit", "delete", "rename"
    #[serde(default)]
    pub change_type: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeItem {
    #[serde(default)]
    pub path: String,
    /// "blob" for files, "tree" for folders
    pub git_object_type: Option<String>,
}

impl Change {
    pub fn is_blob(&self) -> bool {
        self.item.git_object_type.as_deref() == Some("blob")
    }
}
