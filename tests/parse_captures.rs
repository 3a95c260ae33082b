use std::fs;
use std::path::PathBuf;

use profile_parser::capture::refined_name;
use profile_parser::records::{ActivityType, ReactionTargetKind};
use profile_parser::store::{JsonFileStore, ProfileStore, SqliteStore};
use profile_parser::{parse_activities, parse_capture, Capture, CaptureSection, ParsedSection};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(name);
    fs::read_to_string(&path).unwrap_or_else(|e| panic!("reading {}: {e}", path.display()))
}

fn capture(section: CaptureSection, file: &str) -> Capture {
    Capture::new("jane-doe", section, fixture(file))
}

#[test]
fn single_visible_post() {
    let raw = "Feed post number 1\nJane Doe\nLike\nComment\n\
               Feed post number 2\nVisible to anyone on or off LinkedIn\nHello #World\n2 comments";
    let records = parse_activities(raw, "Jane Doe");
    assert_eq!(records.len(), 1);
    let r = &records[0];
    assert_eq!(r.activity_type, ActivityType::OriginalPost);
    assert_eq!(r.authored_content.as_deref(), Some("Hello #World"));
    assert_eq!(r.hashtags, vec!["World"]);
    assert_eq!(r.engagement.comments_count, Some(2));
    assert_eq!(r.engagement.likes, None);
}

#[test]
fn posts_capture() {
    let ParsedSection::Posts(records) = parse_capture(&capture(CaptureSection::Posts, "posts.txt"), "Jane Doe") else {
        panic!("posts capture parsed into another section");
    };
    assert_eq!(records.len(), 2);

    assert_eq!(records[0].activity_type, ActivityType::OriginalPost);
    assert_eq!(records[0].engagement.likes, Some(1204));
    assert_eq!(records[0].hashtags, vec!["Rust", "launch"]);

    let repost = &records[1];
    assert_eq!(repost.activity_type, ActivityType::Repost);
    assert!(repost.authored_content.is_none());
    let original = repost.original_post.as_ref().unwrap();
    assert_eq!(original.author_name.as_deref(), Some("John Roe"));
    assert_eq!(original.content.as_deref(), Some("Our team is hiring #hiring"));
    assert_eq!(original.engagement.comments_count, Some(3));
}

#[test]
fn comments_capture() {
    let ParsedSection::Comments(records) =
        parse_capture(&capture(CaptureSection::Comments, "comments.txt"), "Jane Doe")
    else {
        panic!("comments capture parsed into another section");
    };
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].text, "Congrats, this is a great milestone for the team!");
    assert!(records[0].is_reply_to.is_none());
    assert_eq!(records[1].is_reply_to.as_ref().map(|p| p.author.as_str()), Some("John Roe"));
    assert_ne!(records[0].id, records[1].id);
}

#[test]
fn reactions_capture() {
    let ParsedSection::Reactions(records) =
        parse_capture(&capture(CaptureSection::Reactions, "reactions.txt"), "Jane Doe")
    else {
        panic!("reactions capture parsed into another section");
    };
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].reaction_type, "liked");
    assert_eq!(records[0].reacted_to.kind, ReactionTargetKind::Post);
    assert_eq!(records[1].reacted_to.kind, ReactionTargetKind::Comment);
    assert_eq!(
        records[1].original_post_context.as_ref().and_then(|c| c.author.as_deref()),
        Some("Ada Lovelace")
    );
}

#[test]
fn profile_name_feeds_later_captures() {
    let profile = parse_capture(&capture(CaptureSection::Profile, "profile.txt"), "");
    let name = refined_name("", &profile);
    assert_eq!(name, "Jane Doe");

    // Without a name the comments capture cannot be attributed.
    let comments = capture(CaptureSection::Comments, "comments.txt");
    assert!(parse_capture(&comments, "").is_empty());
    assert_eq!(parse_capture(&comments, &name).len(), 2);
}

#[test]
fn json_store_merge_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStore::new(dir.path());
    let posts = parse_capture(&capture(CaptureSection::Posts, "posts.txt"), "Jane Doe");

    let first = store.merge("jane-doe", posts.clone()).unwrap();
    assert_eq!((first.added, first.replaced), (2, 0));
    let second = store.merge("jane-doe", posts).unwrap();
    assert_eq!((second.added, second.replaced), (0, 2));

    let doc = store.load("jane-doe").unwrap();
    assert_eq!(doc.activities.len(), 2);
    assert!(doc.profile.is_none());
}

#[test]
fn sqlite_store_collects_every_section() {
    let store = SqliteStore::open_in_memory().unwrap();
    let parsed: Vec<ParsedSection> = [
        (CaptureSection::Profile, "profile.txt"),
        (CaptureSection::Posts, "posts.txt"),
        (CaptureSection::Comments, "comments.txt"),
        (CaptureSection::Reactions, "reactions.txt"),
    ]
    .into_iter()
    .map(|(section, file)| parse_capture(&capture(section, file), "Jane Doe"))
    .collect();

    let stats = store.merge_all("jane-doe", parsed).unwrap();
    assert_eq!((stats.added, stats.replaced), (7, 0));

    let doc = store.load("jane-doe").unwrap();
    assert_eq!(doc.profile.and_then(|p| p.name).as_deref(), Some("Jane Doe"));
    assert_eq!((doc.activities.len(), doc.comments.len(), doc.reactions.len()), (2, 2, 2));
}
