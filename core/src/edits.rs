use serde::Serialize;
use std::collections::HashSet;

use crate::config::EditsConfig;
use crate::crap::keyword_similarity;
use crate::post::{Post, PostId, Version};

/// What to do with a re-crawled post given the stored copy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EditStatus {
    /// Never stored before.
    New,
    /// Identical to the stored copy; drop it.
    Pristine,
    /// Small change; update the stored post in place.
    MinorEdit { id: PostId },
    /// Title or text changed; store as a new post with this version.
    NewVersion { version: Version },
}

fn list_changed(a: &[String], b: &[String], threshold: f32) -> bool {
    if threshold == 0.0 {
        let a: HashSet<&String> = a.iter().collect();
        let b: HashSet<&String> = b.iter().collect();
        a != b
    } else {
        keyword_similarity(a, b) < threshold
    }
}

pub fn check_edits(incoming: &Post, stored: Option<&Post>, cfg: &EditsConfig) -> EditStatus {
    let Some(stored) = stored else {
        return EditStatus::New;
    };

    if incoming.title != stored.title || incoming.text != stored.text {
        return EditStatus::NewVersion { version: stored.version.next() };
    }

    let changed = incoming.excerpt != stored.excerpt
        || incoming.kind != stored.kind
        || incoming.is_draft != stored.is_draft
        || list_changed(&incoming.keywords, &stored.keywords, cfg.keyword_threshold)
        || list_changed(&incoming.images, &stored.images, 0.0);

    if changed {
        EditStatus::MinorEdit { id: stored.id.clone() }
    } else {
        EditStatus::Pristine
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn stored() -> Post {
        let mut p = Post::new("db1", "Title", "Body text", datetime!(2022-05-17 08:00 UTC));
        p.version = Version::from(2);
        p.keywords = vec!["a".into(), "b".into(), "c".into()];
        p
    }

    #[test]
    fn unseen_post_is_new() {
        assert_eq!(check_edits(&stored(), None, &EditsConfig::default()), EditStatus::New);
    }

    #[test]
    fn identical_post_is_pristine() {
        let mut incoming = stored();
        incoming.keywords.reverse();
        assert_eq!(check_edits(&incoming, Some(&stored()), &EditsConfig::default()), EditStatus::Pristine);
    }

    #[test]
    fn text_change_bumps_version() {
        let mut incoming = stored();
        incoming.text = Some("Rewritten body".into());
        assert_eq!(
            check_edits(&incoming, Some(&stored()), &EditsConfig::default()),
            EditStatus::NewVersion { version: Version::from(3) }
        );
    }

    #[test]
    fn keyword_threshold_tolerates_small_changes() {
        let mut incoming = stored();
        incoming.keywords = vec!["a".into(), "b".into(), "c".into(), "d".into()];
        let strict = EditsConfig::default();
        assert_eq!(check_edits(&incoming, Some(&stored()), &strict), EditStatus::MinorEdit { id: "db1".into() });
        let loose = EditsConfig { keyword_threshold: 0.5 };
        assert_eq!(check_edits(&incoming, Some(&stored()), &loose), EditStatus::Pristine);
    }
}
