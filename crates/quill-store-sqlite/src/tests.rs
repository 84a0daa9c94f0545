//! Integration tests for `SqliteStore` against an in-memory database.

use quill_core::{
  ErrorKind,
  analytics::AnalyticsFields,
  comment::{DEFAULT_AUTHOR, NewComment},
  post::{NewPost, PostPatch},
  store::{BlogStore, StoreError},
  thread::build_thread,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn post(s: &SqliteStore, title: &str) -> Uuid {
  s.create_post(NewPost::new(title, "Some words about things."))
    .await
    .unwrap()
    .id
}

fn kind(e: &Error) -> Option<ErrorKind> { e.domain().map(quill_core::Error::kind) }

// ─── Comments ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_comment_assigns_id_timestamp_and_default_author() {
  let s = store().await;
  let post_id = post(&s, "Hello").await;

  let c = s
    .create_comment(NewComment::new(post_id, "First!"))
    .await
    .unwrap();
  assert_eq!(c.post_id, post_id);
  assert_eq!(c.author, DEFAULT_AUTHOR);
  assert!(c.parent_id.is_none());

  let fetched = s.get_comment(c.id).await.unwrap().unwrap();
  assert_eq!(fetched, c);
}

#[tokio::test]
async fn list_comments_is_ordered_by_creation() {
  let s = store().await;
  let post_id = post(&s, "Hello").await;

  let mut ids = Vec::new();
  for i in 0..5 {
    let c = s
      .create_comment(NewComment::new(post_id, format!("comment {i}")))
      .await
      .unwrap();
    ids.push(c.id);
  }

  let listed: Vec<Uuid> = s
    .list_comments(post_id)
    .await
    .unwrap()
    .into_iter()
    .map(|c| c.id)
    .collect();
  assert_eq!(listed, ids);
}

#[tokio::test]
async fn list_comments_for_post_without_comments_is_empty() {
  let s = store().await;
  let post_id = post(&s, "Quiet").await;
  assert!(s.list_comments(post_id).await.unwrap().is_empty());
  assert!(s.list_comments(Uuid::new_v4()).await.unwrap().is_empty());
}

#[tokio::test]
async fn list_comments_only_returns_that_post() {
  let s = store().await;
  let a = post(&s, "Post A").await;
  let b = post(&s, "Post B").await;
  s.create_comment(NewComment::new(a, "on a")).await.unwrap();
  s.create_comment(NewComment::new(b, "on b")).await.unwrap();

  let on_a = s.list_comments(a).await.unwrap();
  assert_eq!(on_a.len(), 1);
  assert_eq!(on_a[0].body, "on a");
}

#[tokio::test]
async fn empty_body_is_rejected_and_nothing_is_written() {
  let s = store().await;
  let post_id = post(&s, "Hello").await;

  let err = s
    .create_comment(NewComment::new(post_id, "   "))
    .await
    .unwrap_err();
  assert_eq!(kind(&err), Some(ErrorKind::Validation));
  assert!(s.list_comments(post_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn comment_on_missing_post_is_not_found() {
  let s = store().await;
  let err = s
    .create_comment(NewComment::new(Uuid::new_v4(), "hello?"))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(quill_core::Error::PostNotFound(_))));
}

#[tokio::test]
async fn reply_is_nested_under_parent_on_fetch() {
  let s = store().await;
  let post_id = post(&s, "Hello").await;

  let parent = s.create_comment(NewComment::new(post_id, "parent")).await.unwrap();
  let other  = s.create_comment(NewComment::new(post_id, "other")).await.unwrap();
  let reply  = s
    .create_comment(NewComment::new(post_id, "reply").reply_to(parent.id).by("Ruchi"))
    .await
    .unwrap();
  assert_eq!(reply.parent_id, Some(parent.id));
  assert_eq!(reply.author, "Ruchi");

  let flat = s.list_comments(post_id).await.unwrap();
  assert_eq!(flat[0].child_ids, vec![reply.id]);
  assert!(flat[1].child_ids.is_empty());

  let forest = build_thread(&flat);
  assert_eq!(forest.len(), 2);
  assert_eq!(forest[0].comment.id, parent.id);
  assert_eq!(forest[0].replies.len(), 1);
  assert_eq!(forest[0].replies[0].comment.id, reply.id);
  assert_eq!(forest[1].comment.id, other.id);
}

#[tokio::test]
async fn get_comment_lists_direct_children() {
  let s = store().await;
  let post_id = post(&s, "Hello").await;

  let root = s.create_comment(NewComment::new(post_id, "root")).await.unwrap();
  let r1 = s.create_comment(NewComment::new(post_id, "r1").reply_to(root.id)).await.unwrap();
  let r2 = s.create_comment(NewComment::new(post_id, "r2").reply_to(root.id)).await.unwrap();
  s.create_comment(NewComment::new(post_id, "r1a").reply_to(r1.id)).await.unwrap();

  let fetched = s.get_comment(root.id).await.unwrap().unwrap();
  assert_eq!(fetched.child_ids, vec![r1.id, r2.id]);
}

#[tokio::test]
async fn reply_to_missing_parent_is_not_found() {
  let s = store().await;
  let post_id = post(&s, "Hello").await;

  let missing = Uuid::new_v4();
  let err = s
    .create_comment(NewComment::new(post_id, "reply").reply_to(missing))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(quill_core::Error::CommentNotFound(id)) if id == missing));
  assert!(s.list_comments(post_id).await.unwrap().is_empty());
}

#[tokio::test]
async fn reply_across_posts_is_rejected() {
  let s = store().await;
  let a = post(&s, "Post A").await;
  let b = post(&s, "Post B").await;

  let on_a = s.create_comment(NewComment::new(a, "on a")).await.unwrap();
  let err = s
    .create_comment(NewComment::new(b, "sneaky").reply_to(on_a.id))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::Core(quill_core::Error::CrossPostParent { .. })));
  assert_eq!(kind(&err), Some(ErrorKind::Validation));
  assert!(s.list_comments(b).await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_parent_orphans_its_replies() {
  let s = store().await;
  let post_id = post(&s, "Hello").await;

  let parent = s.create_comment(NewComment::new(post_id, "parent")).await.unwrap();
  let reply = s
    .create_comment(NewComment::new(post_id, "reply").reply_to(parent.id))
    .await
    .unwrap();

  s.delete_comment(parent.id).await.unwrap();

  let flat = s.list_comments(post_id).await.unwrap();
  assert_eq!(flat.len(), 1);
  assert_eq!(flat[0].parent_id, Some(parent.id));

  let forest = build_thread(&flat);
  assert_eq!(forest.len(), 1);
  assert_eq!(forest[0].comment.id, reply.id);
}

#[tokio::test]
async fn delete_missing_comment_is_not_found() {
  let s = store().await;
  let err = s.delete_comment(Uuid::new_v4()).await.unwrap_err();
  assert_eq!(kind(&err), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn like_comment_increments_counter() {
  let s = store().await;
  let post_id = post(&s, "Hello").await;
  let c = s.create_comment(NewComment::new(post_id, "nice")).await.unwrap();

  s.like_comment(c.id).await.unwrap();
  let liked = s.like_comment(c.id).await.unwrap();
  assert_eq!(liked.like_count, 2);

  let err = s.like_comment(Uuid::new_v4()).await.unwrap_err();
  assert_eq!(kind(&err), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn repeated_reads_are_identical() {
  let s = store().await;
  let post_id = post(&s, "Hello").await;
  let root = s.create_comment(NewComment::new(post_id, "root")).await.unwrap();
  s.create_comment(NewComment::new(post_id, "reply").reply_to(root.id)).await.unwrap();

  let first = build_thread(&s.list_comments(post_id).await.unwrap());
  let second = build_thread(&s.list_comments(post_id).await.unwrap());
  assert_eq!(first, second);
}

// ─── Posts ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_and_get_post() {
  let s = store().await;
  let mut input = NewPost::new("  Hello, World!  ", "x".repeat(1500));
  input.tags = vec!["rust".into(), "blog".into()];

  let created = s.create_post(input).await.unwrap();
  assert_eq!(created.title, "Hello, World!");
  assert_eq!(created.slug, "hello-world");
  assert_eq!(created.reading_time, 2);
  assert_eq!(created.published_at, created.created_at);

  let by_id = s.get_post(created.id).await.unwrap().unwrap();
  assert_eq!(by_id, created);

  let by_slug = s.get_post_by_slug("hello-world".into()).await.unwrap().unwrap();
  assert_eq!(by_slug.id, created.id);

  assert!(s.get_post(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn duplicate_title_or_slug_is_a_conflict() {
  let s = store().await;
  post(&s, "Hello World").await;

  let err = s.create_post(NewPost::new("Hello World", "again")).await.unwrap_err();
  assert_eq!(kind(&err), Some(ErrorKind::Conflict));

  let err = s.create_post(NewPost::new("hello-world!", "again")).await.unwrap_err();
  assert_eq!(kind(&err), Some(ErrorKind::Conflict));
}

#[tokio::test]
async fn post_without_title_is_invalid() {
  let s = store().await;
  let err = s.create_post(NewPost::new(" ", "body")).await.unwrap_err();
  assert_eq!(kind(&err), Some(ErrorKind::Validation));
  assert!(s.list_posts().await.unwrap().is_empty());
}

#[tokio::test]
async fn update_counts_a_view_unless_views_given() {
  let s = store().await;
  let id = post(&s, "Counted").await;

  let p = s.update_post(id, PostPatch::default()).await.unwrap();
  assert_eq!(p.views, 1);
  let p = s.update_post(id, PostPatch::default()).await.unwrap();
  assert_eq!(p.views, 2);

  let p = s
    .update_post(id, PostPatch { views: Some(40), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(p.views, 40);
  assert_eq!(s.get_post(id).await.unwrap().unwrap().views, 40);
}

#[tokio::test]
async fn update_renames_and_rejects_taken_titles() {
  let s = store().await;
  let id = post(&s, "Draft").await;
  post(&s, "Taken").await;

  let p = s
    .update_post(id, PostPatch { title: Some("Final Cut".into()), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(p.slug, "final-cut");

  let err = s
    .update_post(id, PostPatch { title: Some("Taken".into()), ..Default::default() })
    .await
    .unwrap_err();
  assert_eq!(kind(&err), Some(ErrorKind::Conflict));

  // Keeping its own title is fine.
  s.update_post(id, PostPatch { title: Some("Final Cut".into()), ..Default::default() })
    .await
    .unwrap();
}

#[tokio::test]
async fn update_missing_post_is_not_found() {
  let s = store().await;
  let err = s.update_post(Uuid::new_v4(), PostPatch::default()).await.unwrap_err();
  assert_eq!(kind(&err), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn delete_post_removes_its_comments() {
  let s = store().await;
  let id = post(&s, "Doomed").await;
  s.create_comment(NewComment::new(id, "bye")).await.unwrap();

  s.delete_post(id).await.unwrap();
  assert!(s.get_post(id).await.unwrap().is_none());
  assert!(s.list_comments(id).await.unwrap().is_empty());

  let err = s.delete_post(id).await.unwrap_err();
  assert_eq!(kind(&err), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn refresh_featured_marks_most_viewed() {
  let s = store().await;
  let mut ids = Vec::new();
  for (i, views) in [5u64, 50, 1, 20].into_iter().enumerate() {
    let mut input = NewPost::new(format!("Post {i}"), "body");
    input.views = views;
    ids.push(s.create_post(input).await.unwrap().id);
  }

  s.refresh_featured(2).await.unwrap();

  let featured: Vec<Uuid> = s
    .list_posts()
    .await
    .unwrap()
    .into_iter()
    .filter(|p| p.is_featured)
    .map(|p| p.id)
    .collect();
  assert_eq!(featured.len(), 2);
  assert!(featured.contains(&ids[1]));
  assert!(featured.contains(&ids[3]));
}

// ─── Post analytics ──────────────────────────────────────────────────────────

fn counts(views: u64, likes: u64) -> AnalyticsFields {
  AnalyticsFields { views: Some(views), likes: Some(likes), ..Default::default() }
}

#[tokio::test]
async fn analytics_are_absent_until_created() {
  let s = store().await;
  let post_id = post(&s, "Measured").await;
  assert!(s.get_analytics(post_id).await.unwrap().is_none());

  let created = s.create_analytics(post_id, counts(5, 1)).await.unwrap();
  assert_eq!((created.views, created.likes, created.shares), (5, 1, 0));
  assert_eq!(s.get_analytics(post_id).await.unwrap().unwrap(), created);
}

#[tokio::test]
async fn analytics_for_missing_post_is_not_found() {
  let s = store().await;
  let err = s
    .create_analytics(Uuid::new_v4(), AnalyticsFields::default())
    .await
    .unwrap_err();
  assert_eq!(kind(&err), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn second_analytics_record_is_a_conflict() {
  let s = store().await;
  let post_id = post(&s, "Measured").await;
  s.create_analytics(post_id, AnalyticsFields::default()).await.unwrap();

  let err = s
    .create_analytics(post_id, AnalyticsFields::default())
    .await
    .unwrap_err();
  assert_eq!(kind(&err), Some(ErrorKind::Conflict));
}

#[tokio::test]
async fn replace_overwrites_and_increment_adds() {
  let s = store().await;
  let post_id = post(&s, "Measured").await;
  s.create_analytics(post_id, counts(10, 2)).await.unwrap();

  let replaced = s
    .replace_analytics(post_id, AnalyticsFields { views: Some(3), ..Default::default() })
    .await
    .unwrap();
  assert_eq!((replaced.views, replaced.likes), (3, 2));

  let bumped = s.increment_analytics(post_id, counts(1, 1)).await.unwrap();
  assert_eq!((bumped.views, bumped.likes), (4, 3));
  assert_eq!(s.get_analytics(post_id).await.unwrap().unwrap(), bumped);
}

#[tokio::test]
async fn updating_missing_analytics_is_not_found() {
  let s = store().await;
  let post_id = post(&s, "Measured").await;

  let err = s.increment_analytics(post_id, counts(1, 0)).await.unwrap_err();
  assert_eq!(kind(&err), Some(ErrorKind::NotFound));
  let err = s.replace_analytics(post_id, counts(1, 0)).await.unwrap_err();
  assert_eq!(kind(&err), Some(ErrorKind::NotFound));
  let err = s.delete_analytics(post_id).await.unwrap_err();
  assert_eq!(kind(&err), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn negative_engagement_rate_is_invalid() {
  let s = store().await;
  let post_id = post(&s, "Measured").await;
  let bad = AnalyticsFields { engagement_rate: Some(-1.0), ..Default::default() };

  let err = s.create_analytics(post_id, bad).await.unwrap_err();
  assert_eq!(kind(&err), Some(ErrorKind::Validation));
  assert!(s.get_analytics(post_id).await.unwrap().is_none());
}

#[tokio::test]
async fn deleting_post_removes_its_analytics() {
  let s = store().await;
  let post_id = post(&s, "Measured").await;
  s.create_analytics(post_id, counts(1, 1)).await.unwrap();

  s.delete_post(post_id).await.unwrap();
  assert!(s.get_analytics(post_id).await.unwrap().is_none());
}

#[tokio::test]
async fn delete_analytics_removes_the_record() {
  let s = store().await;
  let post_id = post(&s, "Measured").await;
  s.create_analytics(post_id, counts(1, 1)).await.unwrap();

  s.delete_analytics(post_id).await.unwrap();
  assert!(s.get_analytics(post_id).await.unwrap().is_none());
}

// ─── Subscribers ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn subscribe_list_and_remove() {
  let s = store().await;
  let sub = s.add_subscriber(" Reader@Example.com ".into()).await.unwrap();
  assert_eq!(sub.email, "reader@example.com");

  let all = s.list_subscribers().await.unwrap();
  assert_eq!(all, vec![sub.clone()]);

  s.remove_subscriber(sub.id).await.unwrap();
  assert!(s.list_subscribers().await.unwrap().is_empty());

  let err = s.remove_subscriber(sub.id).await.unwrap_err();
  assert_eq!(kind(&err), Some(ErrorKind::NotFound));
}

#[tokio::test]
async fn duplicate_subscriber_is_a_conflict() {
  let s = store().await;
  s.add_subscriber("reader@example.com".into()).await.unwrap();
  let err = s.add_subscriber("READER@example.com".into()).await.unwrap_err();
  assert_eq!(kind(&err), Some(ErrorKind::Conflict));
  assert_eq!(s.list_subscribers().await.unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_email_is_rejected() {
  let s = store().await;
  let err = s.add_subscriber("not-an-email".into()).await.unwrap_err();
  assert_eq!(kind(&err), Some(ErrorKind::Validation));
}

// ─── Site stats ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn stats_are_absent_until_recorded() {
  let s = store().await;
  assert!(s.get_stats().await.unwrap().is_none());

  let stats = s.set_visitors(12).await.unwrap();
  assert_eq!(stats.visitors, 12);
  assert_eq!(s.get_stats().await.unwrap().unwrap().visitors, 12);
}

#[tokio::test]
async fn record_visit_creates_then_increments() {
  let s = store().await;
  assert_eq!(s.record_visit().await.unwrap().visitors, 1);
  assert_eq!(s.record_visit().await.unwrap().visitors, 2);

  s.set_visitors(100).await.unwrap();
  assert_eq!(s.record_visit().await.unwrap().visitors, 101);
}

#[tokio::test]
async fn zero_visitors_is_invalid() {
  let s = store().await;
  let err = s.set_visitors(0).await.unwrap_err();
  assert_eq!(kind(&err), Some(ErrorKind::Validation));
}

#[tokio::test]
async fn ping_succeeds() {
  let s = store().await;
  s.ping().await.unwrap();
}
