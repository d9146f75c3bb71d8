//! Find the owning user and the highlight collections inside an embedded document.
//!
//! The document is an unversioned, drifting contract, so nothing here indexes blindly:
//! each location is a [`KeyPath`] tried in priority order, and a path that does not
//! fully resolve simply means "not here". Only a root that is not a container at all
//! is reported as an error.

use super::path::Hop::{Index, Key};
use super::path::{KeyPath, entries, first_string, unwrap_node};
use super::types::{Extraction, MissReason};
use serde_json::Value;
use thiserror::Error;

/// Where the profile's user node has lived across page generations.
const USER_PATHS: &[KeyPath] = &[
    KeyPath::new(
        "entry_data.ProfilePage[0].graphql.user",
        &[
            Key("entry_data"),
            Key("ProfilePage"),
            Index(0),
            Key("graphql"),
            Key("user"),
        ],
    ),
    KeyPath::new("graphql.user", &[Key("graphql"), Key("user")]),
    KeyPath::new("data.user", &[Key("data"), Key("user")]),
    KeyPath::new("user", &[Key("user")]),
];

/// Highlight collections hanging off the user node.
const USER_COLLECTION_PATHS: &[KeyPath] = &[
    KeyPath::new(
        "edge_highlight_reels.edges",
        &[Key("edge_highlight_reels"), Key("edges")],
    ),
    KeyPath::new("highlight_reels", &[Key("highlight_reels")]),
];

/// Highlight collections addressed from the document root (GraphQL / reels feeds).
const ROOT_COLLECTION_PATHS: &[KeyPath] = &[
    KeyPath::new(
        "data.highlights.edges",
        &[Key("data"), Key("highlights"), Key("edges")],
    ),
    KeyPath::new("highlights.edges", &[Key("highlights"), Key("edges")]),
    KeyPath::new("data.reels_media", &[Key("data"), Key("reels_media")]),
    KeyPath::new("reels_media", &[Key("reels_media")]),
    KeyPath::new("reels", &[Key("reels")]),
];

/// The media list of one collection, relative to the collection node.
const MEDIA_PATHS: &[KeyPath] = &[
    KeyPath::new("items", &[Key("items")]),
    KeyPath::new(
        "edge_highlight_media.edges",
        &[Key("edge_highlight_media"), Key("edges")],
    ),
    KeyPath::new(
        "edge_story_media.edges",
        &[Key("edge_story_media"), Key("edges")],
    ),
    KeyPath::new("media.items", &[Key("media"), Key("items")]),
];

const ID_KEYS: &[&str] = &["id", "pk"];
const TITLE_KEYS: &[&str] = &["title", "name"];

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WalkError {
    #[error("document root is a {0}, not an object or array")]
    NotAContainer(&'static str),
}

/// One highlight collection: its identity plus an opaque handle on its media list.
#[derive(Debug, Clone, PartialEq)]
pub struct HighlightCollection<'a> {
    pub id: String,
    pub title: String,
    pub media: Option<&'a Value>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HighlightSet<'a> {
    pub user_id: Option<String>,
    /// Name of the key-path that located the collections.
    pub path: &'static str,
    pub collections: Vec<HighlightCollection<'a>>,
}

/// Walk the document for the user id and highlight collections.
pub fn walk_highlights(doc: &Value) -> Result<Extraction<HighlightSet<'_>>, WalkError> {
    match doc {
        Value::Object(_) | Value::Array(_) => {}
        other => return Err(WalkError::NotAContainer(kind_name(other))),
    }

    let user = USER_PATHS
        .iter()
        .find_map(|p| p.resolve(doc).filter(|v| v.is_object()).map(|v| (p.name, v)));

    if let Some((name, _)) = user {
        tracing::debug!(path = name, "walker.user.found");
    }
    let mut user_id = user.and_then(|(_, u)| first_string(u, ID_KEYS));

    let from_user = user.and_then(|(_, u)| first_resolving(u, USER_COLLECTION_PATHS));
    let Some((path, raw)) = from_user.or_else(|| first_resolving(doc, ROOT_COLLECTION_PATHS))
    else {
        tracing::debug!(user_id = ?user_id, "walker.highlights.none");
        return Ok(Extraction::Miss(MissReason::NoHighlights));
    };

    let mut collections = Vec::with_capacity(raw.len());
    for entry in raw {
        let node = unwrap_node(entry);
        if user_id.is_none() {
            user_id = owner_id(node);
        }
        match collection_from_node(node) {
            Some(c) => collections.push(c),
            None => tracing::debug!(path, "walker.collection.skipped_without_id"),
        }
    }

    if collections.is_empty() {
        return Ok(Extraction::Miss(MissReason::NoHighlights));
    }

    tracing::debug!(
        path,
        user_id = ?user_id,
        collections = collections.len(),
        "walker.highlights.found"
    );
    Ok(Extraction::Found(HighlightSet {
        user_id,
        path,
        collections,
    }))
}

/// First path resolving to a non-empty collection container.
fn first_resolving<'a>(
    start: &'a Value,
    paths: &[KeyPath],
) -> Option<(&'static str, Vec<&'a Value>)> {
    paths.iter().find_map(|p| {
        p.resolve(start)
            .and_then(entries)
            .filter(|e| !e.is_empty())
            .map(|e| (p.name, e))
    })
}

fn collection_from_node(node: &Value) -> Option<HighlightCollection<'_>> {
    if !node.is_object() {
        return None;
    }
    let id = first_string(node, ID_KEYS)?;
    let title = first_string(node, TITLE_KEYS).unwrap_or_default();
    let media = media_list(node);
    Some(HighlightCollection { id, title, media })
}

/// The media list of a collection. A path only counts when it ends on a container;
/// a populated container beats an empty one found earlier.
fn media_list(node: &Value) -> Option<&Value> {
    let mut empty = None;
    for value in MEDIA_PATHS.iter().filter_map(|p| p.resolve(node)) {
        match entries(value) {
            Some(e) if !e.is_empty() => return Some(value),
            Some(_) => {
                empty.get_or_insert(value);
            }
            None => {}
        }
    }
    empty
}

/// Reel feeds carry the owner on each collection instead of a user node.
fn owner_id(node: &Value) -> Option<String> {
    ["user", "owner"]
        .iter()
        .filter_map(|k| node.get(*k))
        .find_map(|owner| first_string(owner, ID_KEYS))
}

fn kind_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn shared_data_profile_page() {
        let doc = json!({
            "entry_data": {"ProfilePage": [{"graphql": {"user": {
                "id": "42",
                "edge_highlight_reels": {"edges": [
                    {"node": {"id": "h1", "title": "Trip", "items": [{"id": "m1"}]}},
                    {"node": {"id": 17890, "title": "Food"}}
                ]}
            }}}]}
        });
        let set = walk_highlights(&doc).unwrap().found().unwrap();
        assert_eq!(set.user_id.as_deref(), Some("42"));
        assert_eq!(set.path, "edge_highlight_reels.edges");
        assert_eq!(set.collections.len(), 2);
        assert_eq!(set.collections[0].id, "h1");
        assert_eq!(set.collections[0].title, "Trip");
        assert!(set.collections[0].media.is_some());
        assert_eq!(set.collections[1].id, "17890");
        assert!(set.collections[1].media.is_none());
    }

    #[test]
    fn graphql_user_with_highlight_reels() {
        let doc = json!({"data": {"user": {"pk": 7, "highlight_reels": [
            {"pk": "h9", "name": "Named", "edge_highlight_media": {"edges": []}}
        ]}}});
        let set = walk_highlights(&doc).unwrap().found().unwrap();
        assert_eq!(set.user_id.as_deref(), Some("7"));
        assert_eq!(set.collections[0].id, "h9");
        assert_eq!(set.collections[0].title, "Named");
        assert_eq!(set.collections[0].media, Some(&json!([])));
    }

    #[test]
    fn null_items_do_not_shadow_edge_media() {
        let edges = json!([{"node": {"id": "m1", "display_url": "https://cdn.example/m1.jpg"}}]);
        let doc = json!({"user": {"id": "1", "highlight_reels": [
            {"id": "h1", "title": "A", "items": null, "edge_highlight_media": {"edges": edges.clone()}},
            {"id": "h2", "title": "B", "items": {}, "edge_story_media": {"edges": edges.clone()}},
            {"id": "h3", "title": "C", "items": "n/a"}
        ]}});
        let set = walk_highlights(&doc).unwrap().found().unwrap();
        assert_eq!(set.collections[0].media, Some(&edges));
        assert_eq!(set.collections[1].media, Some(&edges));
        assert_eq!(set.collections[2].media, None);
    }

    #[test]
    fn root_reels_media_takes_owner_from_collection() {
        let doc = json!({"reels_media": [
            {"id": "highlight:1", "title": "A", "user": {"pk": "99"}, "items": []}
        ]});
        let set = walk_highlights(&doc).unwrap().found().unwrap();
        assert_eq!(set.path, "reels_media");
        assert_eq!(set.user_id.as_deref(), Some("99"));
        assert_eq!(set.collections[0].id, "highlight:1");
    }

    #[test]
    fn reels_map_is_walked_in_key_order() {
        let doc = json!({"reels": {
            "highlight:2": {"id": "highlight:2", "title": "Two"},
            "highlight:1": {"id": "highlight:1", "title": "One"}
        }});
        let set = walk_highlights(&doc).unwrap().found().unwrap();
        let ids: Vec<_> = set.collections.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["highlight:1", "highlight:2"]);
    }

    #[test]
    fn empty_user_collections_fall_back_to_root_paths() {
        let doc = json!({
            "graphql": {"user": {"id": "5", "edge_highlight_reels": {"edges": []}}},
            "highlights": {"edges": [{"node": {"id": "h1", "title": "T"}}]}
        });
        let set = walk_highlights(&doc).unwrap().found().unwrap();
        assert_eq!(set.user_id.as_deref(), Some("5"));
        assert_eq!(set.path, "highlights.edges");
    }

    #[test]
    fn collections_without_id_are_skipped() {
        let doc = json!({"user": {"id": "1", "highlight_reels": [
            {"title": "no id"}, "garbage", {"id": "h2", "title": "ok"}
        ]}});
        let set = walk_highlights(&doc).unwrap().found().unwrap();
        assert_eq!(set.collections.len(), 1);
        assert_eq!(set.collections[0].id, "h2");
    }

    #[test]
    fn missing_sections_are_a_miss_not_an_error() {
        for doc in [
            json!({}),
            json!([]),
            json!({"entry_data": {"ProfilePage": []}}),
            json!({"graphql": {"user": {"id": "1", "edge_highlight_reels": null}}}),
            json!({"user": {"highlight_reels": [{"title": "no id"}]}}),
        ] {
            assert_eq!(
                walk_highlights(&doc).unwrap(),
                Extraction::Miss(MissReason::NoHighlights),
                "doc {doc}"
            );
        }
    }

    #[test]
    fn scalar_root_is_an_error() {
        assert_eq!(
            walk_highlights(&json!("text")),
            Err(WalkError::NotAContainer("string"))
        );
        assert_eq!(
            walk_highlights(&json!(null)),
            Err(WalkError::NotAContainer("null"))
        );
    }
}
