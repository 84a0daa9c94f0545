//! [`SqliteStore`] — the SQLite implementation of [`BlogStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, params};
use uuid::Uuid;

use quill_core::{
  Error as CoreError,
  analytics::{AnalyticsFields, PostAnalytics},
  comment::{Comment, NewComment},
  post::{NewPost, Post, PostPatch, reading_time, slugify},
  stats::SiteStats,
  store::BlogStore,
  subscriber::{Subscriber, normalize_email},
};

use crate::{
  Error, Result,
  encode::{
    ANALYTICS_COLUMNS, COMMENT_COLUMNS, POST_COLUMNS, RawAnalytics, RawComment, RawPost, RawStats,
    RawSubscriber,
    attach_child_ids, encode_count, encode_dt, encode_list, encode_uuid, now,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Quill store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Every call
/// runs on the connection's own thread, one at a time, so a closure passed to
/// `call` sees no interleaved writes.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("sqlite schema initialised");
    Ok(())
  }

  /// Read, change and write back one analytics record in a single `call`.
  async fn modify_analytics(
    &self,
    post_id: Uuid,
    change: impl FnOnce(&mut PostAnalytics) + Send + 'static,
  ) -> Result<PostAnalytics> {
    let id_str = encode_uuid(post_id);
    let record = self
      .conn
      .call(move |conn| {
        let Some(raw) = query_analytics(conn, &id_str)? else {
          return Ok(Err(Error::from(CoreError::AnalyticsNotFound(post_id))));
        };
        let mut record = match raw.into_analytics() {
          Ok(a) => a,
          Err(e) => return Ok(Err(e)),
        };
        change(&mut record);
        write_analytics(conn, &record, false)?;
        Ok(Ok(record))
      })
      .await??;
    Ok(record)
  }
}

/// Read one post row inside a `call` closure.
fn query_post(
  conn: &rusqlite::Connection,
  column: &str,
  value: &str,
) -> rusqlite::Result<Option<RawPost>> {
  conn
    .query_row(
      &format!("SELECT {POST_COLUMNS} FROM posts WHERE {column} = ?1"),
      params![value],
      RawPost::from_row,
    )
    .optional()
}

/// Whether another post already uses `title` or `slug`.
fn post_name_taken(
  conn: &rusqlite::Connection,
  title: &str,
  slug: &str,
  except: &str,
) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM posts WHERE (title = ?1 OR slug = ?2) AND id != ?3",
        params![title, slug, except],
        |_| Ok(true),
      )
      .optional()?
      .unwrap_or(false),
  )
}

fn write_post(conn: &rusqlite::Connection, post: &Post, insert: bool) -> Result<()> {
  let sql = if insert {
    "INSERT INTO posts (
       id, title, slug, content, tags, views, is_featured, reading_time,
       meta_title, meta_description, meta_keywords, image, published_at, created_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)"
  } else {
    "UPDATE posts SET
       title = ?2, slug = ?3, content = ?4, tags = ?5, views = ?6,
       is_featured = ?7, reading_time = ?8, meta_title = ?9,
       meta_description = ?10, meta_keywords = ?11, image = ?12,
       published_at = ?13, created_at = ?14
     WHERE id = ?1"
  };
  conn
    .execute(
      sql,
      params![
        encode_uuid(post.id),
        post.title,
        post.slug,
        post.content,
        encode_list(&post.tags)?,
        encode_count(post.views),
        post.is_featured,
        post.reading_time,
        post.meta_title,
        post.meta_description,
        encode_list(&post.meta_keywords)?,
        post.image,
        encode_dt(post.published_at),
        encode_dt(post.created_at),
      ],
    )
    .map_err(tokio_rusqlite::Error::from)?;
  Ok(())
}

fn query_analytics(
  conn: &rusqlite::Connection,
  post_id: &str,
) -> rusqlite::Result<Option<RawAnalytics>> {
  conn
    .query_row(
      &format!("SELECT {ANALYTICS_COLUMNS} FROM post_analytics WHERE post_id = ?1"),
      params![post_id],
      RawAnalytics::from_row,
    )
    .optional()
}

fn write_analytics(
  conn: &rusqlite::Connection,
  record: &PostAnalytics,
  insert: bool,
) -> rusqlite::Result<usize> {
  let sql = if insert {
    "INSERT INTO post_analytics (
       post_id, views, shares, likes, comments, engagement_rate, updated_at
     ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"
  } else {
    "UPDATE post_analytics SET
       views = ?2, shares = ?3, likes = ?4, comments = ?5,
       engagement_rate = ?6, updated_at = ?7
     WHERE post_id = ?1"
  };
  conn.execute(
    sql,
    params![
      encode_uuid(record.post_id),
      encode_count(record.views),
      encode_count(record.shares),
      encode_count(record.likes),
      encode_count(record.comments),
      record.engagement_rate,
      encode_dt(record.updated_at),
    ],
  )
}

// ─── BlogStore impl ──────────────────────────────────────────────────────────

impl BlogStore for SqliteStore {
  type Error = Error;

  async fn ping(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |_| Ok(()))?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Posts ─────────────────────────────────────────────────────────────────

  async fn create_post(&self, input: NewPost) -> Result<Post> {
    input.validate()?;

    let created_at = now();
    let title = input.title.trim().to_owned();
    let post = Post {
      id: Uuid::new_v4(),
      slug: slugify(&title),
      reading_time: reading_time(&input.content),
      title,
      content: input.content,
      tags: input.tags,
      views: input.views,
      is_featured: input.is_featured,
      meta_title: input.meta_title,
      meta_description: input.meta_description,
      meta_keywords: input.meta_keywords,
      image: input.image,
      published_at: input.published_at.unwrap_or(created_at),
      created_at,
    };

    let row = post.clone();
    self
      .conn
      .call(move |conn| {
        if post_name_taken(conn, &row.title, &row.slug, "")? {
          return Ok(Err(Error::from(CoreError::DuplicatePost(row.title))));
        }
        Ok(write_post(conn, &row, true))
      })
      .await??;

    tracing::info!(post_id = %post.id, slug = %post.slug, "post created");
    Ok(post)
  }

  async fn get_post(&self, id: Uuid) -> Result<Option<Post>> {
    let id_str = encode_uuid(id);
    let raw = self
      .conn
      .call(move |conn| Ok(query_post(conn, "id", &id_str)?))
      .await?;
    raw.map(RawPost::into_post).transpose()
  }

  async fn get_post_by_slug(&self, slug: String) -> Result<Option<Post>> {
    let raw = self
      .conn
      .call(move |conn| Ok(query_post(conn, "slug", &slug)?))
      .await?;
    raw.map(RawPost::into_post).transpose()
  }

  async fn list_posts(&self) -> Result<Vec<Post>> {
    let raws: Vec<RawPost> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {POST_COLUMNS} FROM posts ORDER BY published_at DESC, created_at DESC"
        ))?;
        let rows = stmt
          .query_map([], RawPost::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawPost::into_post).collect()
  }

  async fn update_post(&self, id: Uuid, patch: PostPatch) -> Result<Post> {
    patch.validate()?;
    let id_str = encode_uuid(id);

    // Read, patch and write in one closure so concurrent updates cannot lose
    // a view increment.
    let post = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let Some(raw) = query_post(&tx, "id", &id_str)? else {
          return Ok(Err(Error::from(CoreError::PostNotFound(id))));
        };
        let mut post = match raw.into_post() {
          Ok(p) => p,
          Err(e) => return Ok(Err(e)),
        };
        patch.apply(&mut post);

        if post_name_taken(&tx, &post.title, &post.slug, &id_str)? {
          return Ok(Err(Error::from(CoreError::DuplicatePost(post.title))));
        }
        if let Err(e) = write_post(&tx, &post, false) {
          return Ok(Err(e));
        }
        tx.commit()?;
        Ok(Ok(post))
      })
      .await??;

    Ok(post)
  }

  async fn delete_post(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM posts WHERE id = ?1", params![id_str])?))
      .await?;

    if removed == 0 {
      return Err(CoreError::PostNotFound(id).into());
    }
    tracing::info!(post_id = %id, "post deleted");
    Ok(())
  }

  async fn refresh_featured(&self, limit: usize) -> Result<()> {
    let limit = i64::try_from(limit).unwrap_or(i64::MAX);
    self
      .conn
      .call(move |conn| {
        conn.execute(
          "UPDATE posts SET is_featured = 1
           WHERE id IN (
             SELECT id FROM posts ORDER BY views DESC, published_at DESC LIMIT ?1
           )",
          params![limit],
        )?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Post analytics ────────────────────────────────────────────────────────

  async fn get_analytics(&self, post_id: Uuid) -> Result<Option<PostAnalytics>> {
    let id_str = encode_uuid(post_id);
    let raw = self
      .conn
      .call(move |conn| Ok(query_analytics(conn, &id_str)?))
      .await?;
    raw.map(RawAnalytics::into_analytics).transpose()
  }

  async fn create_analytics(
    &self,
    post_id: Uuid,
    fields: AnalyticsFields,
  ) -> Result<PostAnalytics> {
    fields.validate()?;
    let record = fields.initial(post_id, now());

    let row = record.clone();
    self
      .conn
      .call(move |conn| {
        let id_str = encode_uuid(row.post_id);
        if query_post(conn, "id", &id_str)?.is_none() {
          return Ok(Err(Error::from(CoreError::PostNotFound(post_id))));
        }
        if query_analytics(conn, &id_str)?.is_some() {
          return Ok(Err(Error::from(CoreError::DuplicateAnalytics(post_id))));
        }
        write_analytics(conn, &row, true)?;
        Ok(Ok(()))
      })
      .await??;

    tracing::info!(post_id = %post_id, "post analytics created");
    Ok(record)
  }

  async fn replace_analytics(
    &self,
    post_id: Uuid,
    fields: AnalyticsFields,
  ) -> Result<PostAnalytics> {
    fields.validate()?;
    let at = now();
    self.modify_analytics(post_id, move |a| fields.replace(a, at)).await
  }

  async fn increment_analytics(
    &self,
    post_id: Uuid,
    fields: AnalyticsFields,
  ) -> Result<PostAnalytics> {
    fields.validate()?;
    let at = now();
    self.modify_analytics(post_id, move |a| fields.increment(a, at)).await
  }

  async fn delete_analytics(&self, post_id: Uuid) -> Result<()> {
    let id_str = encode_uuid(post_id);
    let removed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute("DELETE FROM post_analytics WHERE post_id = ?1", params![id_str])?)
      })
      .await?;

    if removed == 0 {
      return Err(CoreError::AnalyticsNotFound(post_id).into());
    }
    tracing::info!(post_id = %post_id, "post analytics deleted");
    Ok(())
  }

  // ── Comments ──────────────────────────────────────────────────────────────

  async fn list_comments(&self, post_id: Uuid) -> Result<Vec<Comment>> {
    let post_id_str = encode_uuid(post_id);

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS} FROM comments
           WHERE post_id = ?1
           ORDER BY created_at ASC, seq ASC"
        ))?;
        let rows = stmt
          .query_map(params![post_id_str], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    let mut comments: Vec<Comment> = raws
      .into_iter()
      .map(RawComment::into_comment)
      .collect::<Result<_>>()?;
    attach_child_ids(&mut comments);
    Ok(comments)
  }

  async fn get_comment(&self, id: Uuid) -> Result<Option<Comment>> {
    let id_str = encode_uuid(id);

    let found: Option<(RawComment, Vec<String>)> = self
      .conn
      .call(move |conn| {
        let Some(raw) = conn
          .query_row(
            &format!("SELECT {COMMENT_COLUMNS} FROM comments WHERE id = ?1"),
            params![id_str],
            RawComment::from_row,
          )
          .optional()?
        else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(
          "SELECT id FROM comments
           WHERE parent_id = ?1 AND post_id = ?2
           ORDER BY created_at ASC, seq ASC",
        )?;
        let children = stmt
          .query_map(params![raw.id, raw.post_id], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(Some((raw, children)))
      })
      .await?;

    let Some((raw, children)) = found else {
      return Ok(None);
    };
    let mut comment = raw.into_comment()?;
    comment.child_ids = children
      .iter()
      .map(|s| Uuid::parse_str(s))
      .collect::<std::result::Result<_, _>>()?;
    Ok(Some(comment))
  }

  async fn create_comment(&self, input: NewComment) -> Result<Comment> {
    input.validate()?;

    let comment = Comment {
      id:         Uuid::new_v4(),
      post_id:    input.post_id,
      author:     input.author_or_default().to_owned(),
      body:       input.body,
      created_at: now(),
      parent_id:  input.parent_id,
      child_ids:  Vec::new(),
      like_count: 0,
    };

    let id_str         = encode_uuid(comment.id);
    let post_id_str    = encode_uuid(comment.post_id);
    let parent_id_str  = comment.parent_id.map(encode_uuid);
    let created_at_str = encode_dt(comment.created_at);
    let author         = comment.author.clone();
    let body           = comment.body.clone();
    let post_id        = comment.post_id;
    let parent_id      = comment.parent_id;

    self
      .conn
      .call(move |conn| {
        let post_exists = conn
          .query_row("SELECT 1 FROM posts WHERE id = ?1", params![post_id_str], |_| Ok(true))
          .optional()?
          .unwrap_or(false);
        if !post_exists {
          return Ok(Err(CoreError::PostNotFound(post_id)));
        }

        if let (Some(parent), Some(parent_str)) = (parent_id, parent_id_str.as_deref()) {
          let parent_post: Option<String> = conn
            .query_row(
              "SELECT post_id FROM comments WHERE id = ?1",
              params![parent_str],
              |r| r.get(0),
            )
            .optional()?;
          match parent_post {
            None => return Ok(Err(CoreError::CommentNotFound(parent))),
            Some(p) if p != post_id_str => {
              return Ok(Err(CoreError::CrossPostParent { parent }));
            }
            Some(_) => {}
          }
        }

        conn.execute(
          "INSERT INTO comments (id, post_id, author, body, created_at, parent_id)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          params![id_str, post_id_str, author, body, created_at_str, parent_id_str],
        )?;
        Ok(Ok(()))
      })
      .await??;

    tracing::info!(
      comment_id = %comment.id,
      post_id = %comment.post_id,
      parent_id = ?comment.parent_id,
      "comment created"
    );
    Ok(comment)
  }

  async fn like_comment(&self, id: Uuid) -> Result<Comment> {
    let id_str = encode_uuid(id);
    let updated = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE comments SET like_count = like_count + 1 WHERE id = ?1",
          params![id_str],
        )?)
      })
      .await?;

    if updated == 0 {
      return Err(CoreError::CommentNotFound(id).into());
    }
    self
      .get_comment(id)
      .await?
      .ok_or_else(|| CoreError::CommentNotFound(id).into())
  }

  async fn delete_comment(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM comments WHERE id = ?1", params![id_str])?))
      .await?;

    if removed == 0 {
      return Err(CoreError::CommentNotFound(id).into());
    }
    tracing::info!(comment_id = %id, "comment deleted");
    Ok(())
  }

  // ── Subscribers ───────────────────────────────────────────────────────────

  async fn add_subscriber(&self, email: String) -> Result<Subscriber> {
    let subscriber = Subscriber {
      id:         Uuid::new_v4(),
      email:      normalize_email(&email)?,
      created_at: now(),
    };

    let id_str = encode_uuid(subscriber.id);
    let email  = subscriber.email.clone();
    let at_str = encode_dt(subscriber.created_at);

    self
      .conn
      .call(move |conn| {
        let exists = conn
          .query_row("SELECT 1 FROM subscribers WHERE email = ?1", params![email], |_| Ok(true))
          .optional()?
          .unwrap_or(false);
        if exists {
          return Ok(Err(CoreError::DuplicateSubscriber(email)));
        }
        conn.execute(
          "INSERT INTO subscribers (id, email, created_at) VALUES (?1, ?2, ?3)",
          params![id_str, email, at_str],
        )?;
        Ok(Ok(()))
      })
      .await??;

    Ok(subscriber)
  }

  async fn list_subscribers(&self) -> Result<Vec<Subscriber>> {
    let raws: Vec<RawSubscriber> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, email, created_at FROM subscribers ORDER BY created_at ASC, email ASC",
        )?;
        let rows = stmt
          .query_map([], RawSubscriber::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawSubscriber::into_subscriber).collect()
  }

  async fn remove_subscriber(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);
    let removed = self
      .conn
      .call(move |conn| Ok(conn.execute("DELETE FROM subscribers WHERE id = ?1", params![id_str])?))
      .await?;

    if removed == 0 {
      return Err(CoreError::SubscriberNotFound(id).into());
    }
    Ok(())
  }

  // ── Site stats ────────────────────────────────────────────────────────────

  async fn get_stats(&self) -> Result<Option<SiteStats>> {
    let raw: Option<RawStats> = self
      .conn
      .call(|conn| {
        Ok(
          conn
            .query_row(
              "SELECT visitors, updated_at FROM site_stats WHERE id = 1",
              [],
              RawStats::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawStats::into_stats).transpose()
  }

  async fn set_visitors(&self, visitors: u64) -> Result<SiteStats> {
    if visitors == 0 {
      return Err(CoreError::validation("visitors count is required").into());
    }
    let stats  = SiteStats { visitors, updated_at: now() };
    let count  = encode_count(visitors);
    let at_str = encode_dt(stats.updated_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO site_stats (id, visitors, updated_at) VALUES (1, ?1, ?2)
           ON CONFLICT(id) DO UPDATE SET
             visitors = excluded.visitors, updated_at = excluded.updated_at",
          params![count, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(stats)
  }

  async fn record_visit(&self) -> Result<SiteStats> {
    let at_str = encode_dt(now());

    let raw: RawStats = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO site_stats (id, visitors, updated_at) VALUES (1, 1, ?1)
           ON CONFLICT(id) DO UPDATE SET
             visitors = visitors + 1, updated_at = excluded.updated_at
           RETURNING visitors, updated_at",
          params![at_str],
          RawStats::from_row,
        )?)
      })
      .await?;

    raw.into_stats()
  }
}
