//! Entity kinds and the field allow-lists used to validate property paths.
//!
//! The field lists mirror the database tables of the backing store and are
//! the source of truth for which top-level properties a filter may
//! reference. Nested JSON fields (`attributes.energy`, `extras.tag`) are
//! admitted through their root column.

use std::collections::BTreeSet;

use strsim::levenshtein;

use crate::filter::PropertyPath;

/// Maximum Levenshtein distance to consider a name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Finds the best matching name from a list of candidates using Levenshtein
/// distance.
///
/// Returns the best match if its edit distance is within the threshold,
/// otherwise `None`.
pub(crate) fn closest_match<'a>(
    query: &str,
    candidates: impl Iterator<Item = &'a str>,
) -> Option<String> {
    let query_lower = query.to_lowercase();

    let (best_match, best_distance) = candidates
        .filter(|name| !name.is_empty())
        .map(|name| {
            let distance = levenshtein(&query_lower, &name.to_lowercase());
            (name.to_string(), distance)
        })
        .min_by_key(|(_, d)| *d)?;

    (best_distance > 0 && best_distance <= MAX_SUGGESTION_DISTANCE).then_some(best_match)
}

/// The entity kinds exposed by the query API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    /// Computer authorization records.
    AuthInfo,
    /// Comments attached to nodes.
    Comment,
    /// Registered compute resources.
    Computer,
    /// Node groupings.
    Group,
    /// Log messages attached to nodes.
    Log,
    /// Provenance-graph nodes.
    Node,
    /// User accounts.
    User,
    /// Provenance-graph links between nodes.
    Link,
}

impl EntityKind {
    /// All known entity kinds.
    pub const ALL: [EntityKind; 8] = [
        EntityKind::AuthInfo,
        EntityKind::Comment,
        EntityKind::Computer,
        EntityKind::Group,
        EntityKind::Log,
        EntityKind::Node,
        EntityKind::User,
        EntityKind::Link,
    ];

    /// Resolves a kind from its name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "authinfo" => Some(EntityKind::AuthInfo),
            "comment" => Some(EntityKind::Comment),
            "computer" => Some(EntityKind::Computer),
            "group" => Some(EntityKind::Group),
            "log" => Some(EntityKind::Log),
            "node" => Some(EntityKind::Node),
            "user" => Some(EntityKind::User),
            "link" => Some(EntityKind::Link),
            _ => None,
        }
    }

    /// The canonical name of the kind.
    pub fn name(self) -> &'static str {
        match self {
            EntityKind::AuthInfo => "AuthInfo",
            EntityKind::Comment => "Comment",
            EntityKind::Computer => "Computer",
            EntityKind::Group => "Group",
            EntityKind::Log => "Log",
            EntityKind::Node => "Node",
            EntityKind::User => "User",
            EntityKind::Link => "Link",
        }
    }

    /// The filterable database fields of this kind.
    pub fn fields(self) -> &'static [&'static str] {
        match self {
            EntityKind::AuthInfo => &[
                "id",
                "user_id",
                "dbcomputer_id",
                "metadata",
                "auth_params",
                "enabled",
            ],
            EntityKind::Comment => &[
                "id", "uuid", "ctime", "mtime", "content", "user_id", "dbnode_id",
            ],
            EntityKind::Computer => &[
                "id",
                "uuid",
                "label",
                "hostname",
                "description",
                "scheduler_type",
                "transport_type",
                "metadata",
            ],
            EntityKind::Group => &[
                "id",
                "uuid",
                "label",
                "type_string",
                "time",
                "description",
                "extras",
                "user_id",
            ],
            EntityKind::Log => &[
                "id",
                "uuid",
                "time",
                "loggername",
                "levelname",
                "message",
                "metadata",
                "dbnode_id",
            ],
            EntityKind::Node => &[
                "id",
                "uuid",
                "node_type",
                "process_type",
                "label",
                "description",
                "ctime",
                "mtime",
                "user_id",
                "dbcomputer_id",
                "attributes",
                "extras",
            ],
            EntityKind::User => &["id", "email", "first_name", "last_name", "institution"],
            EntityKind::Link => &["id", "input_id", "output_id", "label", "type"],
        }
    }
}

/// An allow-list of property names for one entity kind.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldSet {
    names: BTreeSet<String>,
}

impl FieldSet {
    /// Builds a field set from any collection of names.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FieldSet {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    /// The field set of a known entity kind.
    pub fn for_entity(kind: EntityKind) -> Self {
        Self::new(kind.fields().iter().copied())
    }

    /// Exact membership test for a single name.
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Whether a property path may be used in a filter.
    ///
    /// A path passes when its full dotted rendering or its first segment is
    /// in the set; the latter admits nested JSON-field paths such as
    /// `attributes.energy` without enumerating them.
    pub fn permits(&self, path: &PropertyPath) -> bool {
        self.contains(path.as_str()) || self.contains(path.root())
    }

    /// Closest known field within edit distance, for error messages.
    pub fn suggest(&self, name: &str) -> Option<String> {
        closest_match(name, self.names.iter().map(String::as_str))
    }

    /// The field names, sorted.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }
}

impl From<EntityKind> for FieldSet {
    fn from(kind: EntityKind) -> Self {
        FieldSet::for_entity(kind)
    }
}
