use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::num::NonZeroU32;
use time::OffsetDateTime;

pub type PostId = String;

pub const METAPOST: &str = "metapost";

/// Version state of a re-crawled entity. Stored as a plain integer where
/// `0` means the entity was disabled by an operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "u32", into = "u32")]
pub enum Version {
    Disabled,
    Active(NonZeroU32),
}

impl Version {
    pub const FIRST: Version = Version::Active(NonZeroU32::MIN);

    pub fn is_active(self) -> bool {
        matches!(self, Version::Active(_))
    }

    pub fn active(self) -> Option<NonZeroU32> {
        match self {
            Version::Active(v) => Some(v),
            Version::Disabled => None,
        }
    }

    /// The version following this one. Disabled entities stay disabled.
    pub fn next(self) -> Version {
        match self {
            Version::Active(v) => Version::Active(v.saturating_add(1)),
            Version::Disabled => Version::Disabled,
        }
    }
}

impl Default for Version {
    fn default() -> Self { Version::FIRST }
}

impl From<u32> for Version {
    fn from(raw: u32) -> Self {
        NonZeroU32::new(raw).map_or(Version::Disabled, Version::Active)
    }
}

impl From<Version> for u32 {
    fn from(v: Version) -> Self {
        v.active().map_or(0, NonZeroU32::get)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Version::Active(v) => write!(f, "v{v}"),
            Version::Disabled => f.write_str("disabled"),
        }
    }
}

/// A single scraped article as handed over by the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: PostId,
    /// Stable link shared by every version of the same article.
    #[serde(default)]
    pub short_link: Option<String>,
    #[serde(default = "default_kind", rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub caption: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub is_draft: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub publish_time: OffsetDateTime,
    #[serde(default)]
    pub version: Version,
}

fn default_kind() -> String { "default".to_string() }

impl Post {
    pub fn new(id: impl Into<PostId>, title: impl Into<String>, text: impl Into<String>, publish_time: OffsetDateTime) -> Self {
        Self {
            id: id.into(),
            short_link: None,
            kind: default_kind(),
            title: title.into(),
            text: Some(text.into()),
            excerpt: None,
            caption: None,
            summary: None,
            category: None,
            keywords: Vec::new(),
            images: Vec::new(),
            is_draft: false,
            publish_time,
            version: Version::FIRST,
        }
    }

    pub fn is_meta(&self) -> bool {
        self.kind.starts_with(METAPOST)
    }

    /// Kind with any `metapost.` prefix stripped.
    pub fn base_kind(&self) -> &str {
        self.kind
            .strip_prefix(METAPOST)
            .and_then(|k| k.strip_prefix('.'))
            .unwrap_or(self.kind.as_str())
    }
}

/// Orders two timestamps-with-ids: later first, then smaller id.
pub(crate) fn recency_order(a: (OffsetDateTime, &str), b: (OffsetDateTime, &str)) -> Ordering {
    b.0.cmp(&a.0).then_with(|| a.1.cmp(b.1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn zero_version_is_disabled() {
        assert_eq!(Version::from(0), Version::Disabled);
        assert_eq!(u32::from(Version::from(7)), 7);
        assert_eq!(Version::Disabled.next(), Version::Disabled);
        assert_eq!(u32::from(Version::from(2).next()), 3);
    }

    #[test]
    fn deserializes_wire_record() {
        let json = r#"{"id":"p1","type":"metapost.featured","title":"T","publish_time":"2022-05-17T10:00:00Z","version":0}"#;
        let post: Post = serde_json::from_str(json).unwrap();
        assert!(post.is_meta());
        assert_eq!(post.base_kind(), "featured");
        assert_eq!(post.version, Version::Disabled);
        assert_eq!(post.publish_time, datetime!(2022-05-17 10:00 UTC));
    }
}
