//! Flatten one highlight collection into canonical media records.
//!
//! Failure is per unit: a media node without an id is skipped, an unreadable media
//! list yields nothing for that collection, and neither stops the others.

use super::path::Hop::{Index, Key};
use super::path::{KeyPath, entries, first_string, scalar_string, unwrap_node};
use super::timestamp::to_unix_timestamp;
use super::types::HighlightMediaItem;
use super::walker::HighlightCollection;
use serde_json::Value;

const ID_KEYS: &[&str] = &["id", "pk"];
const KIND_KEYS: &[&str] = &["type", "mediaType", "media_kind"];
const TIMESTAMP_KEYS: &[&str] = &[
    "taken_at",
    "taken_at_timestamp",
    "timestamp",
    "created_at",
    "device_timestamp",
];

const VIDEO_URLS: &[KeyPath] = &[
    KeyPath::new("video_url", &[Key("video_url")]),
    KeyPath::new("video_versions[0].url", &[Key("video_versions"), Index(0), Key("url")]),
];
const IMAGE_URLS: &[KeyPath] = &[
    KeyPath::new("display_url", &[Key("display_url")]),
    KeyPath::new(
        "image_versions2.candidates[0].url",
        &[Key("image_versions2"), Key("candidates"), Index(0), Key("url")],
    ),
];
const GENERIC_URLS: &[KeyPath] = &[
    KeyPath::new("media", &[Key("media")]),
    KeyPath::new("url", &[Key("url")]),
    KeyPath::new("src", &[Key("src")]),
];
const THUMBNAIL_URLS: &[KeyPath] = &[
    KeyPath::new("thumbnail_src", &[Key("thumbnail_src")]),
    KeyPath::new("thumbnail_url", &[Key("thumbnail_url")]),
    KeyPath::new("thumbnail", &[Key("thumbnail")]),
    KeyPath::new(
        "display_resources[0].src",
        &[Key("display_resources"), Index(0), Key("src")],
    ),
];

pub const IMAGE: &str = "image";
pub const VIDEO: &str = "video";

/// One record per media node of `collection`, in list order.
pub fn expand_collection(
    username: &str,
    user_id: Option<&str>,
    collection: &HighlightCollection<'_>,
) -> Vec<HighlightMediaItem> {
    if username.is_empty() || collection.id.is_empty() {
        return Vec::new();
    }

    let Some(nodes) = collection.media.and_then(entries) else {
        tracing::debug!(
            highlight_id = %collection.id,
            user_id = ?user_id,
            "media.list.unreadable"
        );
        return Vec::new();
    };

    let mut items = Vec::with_capacity(nodes.len());
    for raw in nodes {
        let node = unwrap_node(raw);
        match build_item(username, collection, node) {
            Some(item) => items.push(item),
            None => tracing::debug!(
                highlight_id = %collection.id,
                user_id = ?user_id,
                "media.node.skipped_without_id"
            ),
        }
    }

    tracing::debug!(
        highlight_id = %collection.id,
        user_id = ?user_id,
        count = items.len(),
        "media.collection.expanded"
    );
    items
}

fn build_item(
    username: &str,
    collection: &HighlightCollection<'_>,
    node: &Value,
) -> Option<HighlightMediaItem> {
    if !node.is_object() {
        return None;
    }
    let id = first_string(node, ID_KEYS)?;
    let media_type = media_type(node);
    let timestamp = TIMESTAMP_KEYS
        .iter()
        .filter_map(|k| node.get(*k))
        .map(|v| to_unix_timestamp(v))
        .find(|&secs| secs > 0)
        .unwrap_or(0);

    Some(HighlightMediaItem {
        username: username.to_string(),
        id,
        highlight_id: collection.id.clone(),
        highlight_title: collection.title.clone(),
        media: media_url(node, &media_type),
        thumbnail: thumbnail_url(node, &media_type),
        mentions: mentions(node),
        media_type,
        timestamp,
    })
}

/// `image`, `video`, or whatever lower-cased discriminator the node carried.
fn media_type(node: &Value) -> String {
    if let Some(code) = node.get("media_type") {
        match code.as_u64() {
            Some(1) => return IMAGE.into(),
            Some(2) => return VIDEO.into(),
            Some(8) => return "carousel".into(),
            _ => {
                if let Some(s) = scalar_string(code) {
                    return normalize_kind(&s);
                }
            }
        }
    }
    if let Some(name) = node.get("__typename").and_then(Value::as_str) {
        if name.contains("Video") {
            return VIDEO.into();
        }
        if name.contains("Image") {
            return IMAGE.into();
        }
    }
    if let Some(is_video) = node.get("is_video").and_then(Value::as_bool) {
        return if is_video { VIDEO } else { IMAGE }.into();
    }
    if let Some(s) = first_string(node, KIND_KEYS) {
        return normalize_kind(&s);
    }
    if first_path(node, VIDEO_URLS).is_some() {
        return VIDEO.into();
    }
    if first_path(node, IMAGE_URLS).is_some() {
        return IMAGE.into();
    }
    String::new()
}

fn normalize_kind(raw: &str) -> String {
    let lower = raw.trim().to_ascii_lowercase();
    if lower.contains("video") {
        VIDEO.into()
    } else if lower.contains("image") || lower.contains("photo") {
        IMAGE.into()
    } else {
        lower
    }
}

fn media_url(node: &Value, media_type: &str) -> String {
    let found = if media_type == VIDEO {
        first_path(node, VIDEO_URLS)
            .or_else(|| last_resource(node, "video_resources", "src"))
            .or_else(|| first_path(node, IMAGE_URLS))
    } else {
        first_path(node, IMAGE_URLS).or_else(|| last_resource(node, "display_resources", "src"))
    };
    found
        .or_else(|| first_path(node, GENERIC_URLS))
        .unwrap_or_default()
}

fn thumbnail_url(node: &Value, media_type: &str) -> String {
    first_path(node, THUMBNAIL_URLS)
        .or_else(|| last_resource(node, "candidates", "url"))
        .or_else(|| {
            // a video's still frame doubles as its preview
            (media_type == VIDEO)
                .then(|| first_path(node, IMAGE_URLS))
                .flatten()
        })
        .unwrap_or_default()
}

/// Tagged usernames, de-duplicated in first-seen order.
fn mentions(node: &Value) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    let mut push = |name: Option<String>| {
        if let Some(name) = name {
            if !out.contains(&name) {
                out.push(name);
            }
        }
    };

    for key in ["mentions", "reel_mentions"] {
        if let Some(list) = node.get(key).and_then(Value::as_array) {
            list.iter().for_each(|m| push(mention_name(m)));
        }
    }
    if let Some(list) = node.get("tappable_objects").and_then(Value::as_array) {
        list.iter()
            .filter(|t| {
                t.get("__typename")
                    .and_then(Value::as_str)
                    .is_some_and(|n| n.contains("Mention"))
            })
            .for_each(|t| push(mention_name(t)));
    }
    out
}

fn mention_name(v: &Value) -> Option<String> {
    let raw = match v {
        Value::String(s) => Some(s.clone()),
        Value::Object(_) => first_string(v, &["username"])
            .or_else(|| v.get("user").and_then(|u| first_string(u, &["username"]))),
        _ => None,
    }?;
    let name = raw.trim().trim_start_matches('@');
    (!name.is_empty()).then(|| name.to_string())
}

fn first_path(node: &Value, paths: &[KeyPath]) -> Option<String> {
    paths
        .iter()
        .filter_map(|p| p.resolve(node))
        .find_map(scalar_string)
}

/// `key` is a list of renditions ordered smallest to largest; take the largest.
fn last_resource(node: &Value, key: &str, field: &str) -> Option<String> {
    let list = match node.get(key) {
        Some(Value::Array(list)) => list,
        // image_versions2 nests its candidate list one level down
        _ => node.get("image_versions2")?.get(key)?.as_array()?,
    };
    list.iter().rev().find_map(|r| r.get(field).and_then(scalar_string))
}
