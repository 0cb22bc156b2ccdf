use newsnlp_core::versioning::{latest_posts, latest_spiders, resolve_by_group_key, resolve_latest, SpiderConfig, Versioned};
use newsnlp_core::{NlpError, Post, Version};
use time::macros::datetime;

fn post(id: &str, link: Option<&str>, version: u32) -> Post {
    let mut p = Post::new(id, "Title", "Body", datetime!(2022-05-17 09:00 UTC));
    p.short_link = link.map(str::to_string);
    p.version = Version::from(version);
    p
}

#[test]
fn max_active_version_wins() {
    let posts = vec![post("a3", Some("A"), 3), post("a5", Some("A"), 5), post("a0", Some("A"), 0)];
    let resolution = latest_posts(&posts).unwrap();
    assert_eq!(resolution.len(), 1);
    assert_eq!(resolution.get(&"A".to_string()).unwrap().id, "a5");
}

#[test]
fn fully_disabled_group_has_no_latest() {
    let posts = vec![post("b0", Some("B"), 0), post("c1", Some("C"), 1), post("b00", Some("B"), 0)];
    let resolution = latest_posts(&posts).unwrap();
    assert!(resolution.get(&"B".to_string()).is_none());
    assert_eq!(resolution.disabled_keys().collect::<Vec<_>>(), vec!["B"]);
    assert_eq!(resolution.get(&"C".to_string()).unwrap().id, "c1");
}

#[test]
fn at_most_one_per_group_and_order_independent() {
    let posts = vec![
        post("x1", Some("X"), 2),
        post("y1", Some("Y"), 1),
        post("x2", Some("X"), 2),
        post("y2", Some("Y"), 4),
    ];
    let mut reversed = posts.clone();
    reversed.reverse();
    let forward: Vec<_> = latest_posts(&posts).unwrap().iter().map(|(k, p)| (k.clone(), p.id.clone())).collect();
    let backward: Vec<_> = latest_posts(&reversed).unwrap().iter().map(|(k, p)| (k.clone(), p.id.clone())).collect();
    assert_eq!(forward, backward);
    assert_eq!(forward, vec![("X".to_string(), "x1".to_string()), ("Y".to_string(), "y2".to_string())]);
}

#[test]
fn no_groups_for_non_empty_input_is_an_error() {
    let posts = vec![post("a", None, 1), post("b", None, 2)];
    assert!(matches!(latest_posts(&posts), Err(NlpError::EmptyGroup { items: 2 })));
    let empty: Vec<Post> = Vec::new();
    assert!(latest_posts(&empty).unwrap().is_empty());
}

#[test]
fn custom_selector_groups_by_kind() {
    let mut a = post("a", None, 1);
    a.kind = "featured".into();
    let mut b = post("b", None, 2);
    b.kind = "featured".into();
    let posts = vec![a, b];
    let resolution = resolve_latest(&posts, |p| Some(p.kind.clone())).unwrap();
    assert_eq!(resolution.get(&"featured".to_string()).unwrap().id, "b");
}

#[test]
fn latest_spider_per_name_skips_disabled() {
    let raw = r#"[
        {"id":"1","name":"gn_africaguinee","version":1},
        {"id":"2","name":"gn_africaguinee","version":2},
        {"id":"3","name":"gn_guineematin","version":0},
        {"id":"4","name":"gn_guineematin","version":0}
    ]"#;
    let configs: Vec<SpiderConfig> = serde_json::from_str(raw).unwrap();
    let latest = latest_spiders(&configs).unwrap();
    assert_eq!(latest.len(), 1);
    assert_eq!(latest[0].id, "2");
}

#[test]
fn group_key_drives_resolution() {
    let posts = vec![post("a1", Some("A"), 1), post("loose", None, 7), post("a2", Some("A"), 2)];
    assert_eq!(posts[1].group_key(), None);
    let resolution = resolve_by_group_key(&posts).unwrap();
    assert_eq!(resolution.len(), 1);
    assert_eq!(resolution.get(&"A".to_string()).unwrap().id, "a2");
    assert!(resolution.iter().all(|(_, p)| p.id != "loose"));
}
