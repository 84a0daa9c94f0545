//! Comment thread assembly.
//!
//! [`build_thread`] turns the flat, `created_at`-ordered comment list of one
//! post into an ordered forest. Comments live in an arena indexed by input
//! position; parent links are resolved by id, so malformed links (missing
//! parents, self-references, cycles) can never produce a cyclic structure.

use std::collections::{HashMap, VecDeque};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::comment::Comment;

/// A comment together with its nested replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentNode {
  #[serde(flatten)]
  pub comment: Comment,
  pub replies: Vec<CommentNode>,
}

/// Build the reply forest for one post.
///
/// - Roots and every sibling group keep their relative input order.
/// - A comment whose parent is absent from `comments` is a root.
/// - A comment that names itself as parent is a root.
/// - For a cycle of comments that all reference each other, the member
///   appearing first in the input becomes a root.
///
/// Every input comment appears exactly once in the output.
pub fn build_thread(comments: &[Comment]) -> Vec<CommentNode> {
  let n = comments.len();

  // id → first index carrying it.
  let mut index: HashMap<Uuid, usize> = HashMap::with_capacity(n);
  for (i, c) in comments.iter().enumerate() {
    index.entry(c.id).or_insert(i);
  }

  let mut parent: Vec<Option<usize>> = comments
    .iter()
    .enumerate()
    .map(|(i, c)| {
      c.parent_id
        .and_then(|pid| index.get(&pid).copied())
        .filter(|&p| p != i)
    })
    .collect();

  let mut children: Vec<Vec<usize>> = vec![Vec::new(); n];
  for (i, p) in parent.iter().enumerate() {
    if let Some(p) = *p {
      children[p].push(i);
    }
  }

  // Walk down from the genuine roots; anything left unreached sits on a
  // parent cycle.
  let mut order: Vec<usize> = Vec::with_capacity(n);
  let mut reached = vec![false; n];
  for i in 0..n {
    if parent[i].is_none() {
      walk(i, &children, &mut reached, &mut order);
    }
  }
  for i in 0..n {
    if !reached[i] {
      if let Some(p) = parent[i].take() {
        children[p].retain(|&c| c != i);
      }
      walk(i, &children, &mut reached, &mut order);
    }
  }

  // Children always follow their parent in `order`, so building in reverse
  // finishes every subtree before its parent claims it.
  let mut built: Vec<Option<CommentNode>> = vec![None; n];
  for &i in order.iter().rev() {
    let replies = children[i]
      .iter()
      .filter_map(|&c| built[c].take())
      .collect();
    built[i] = Some(CommentNode { comment: comments[i].clone(), replies });
  }

  (0..n)
    .filter(|&i| parent[i].is_none())
    .filter_map(|i| built[i].take())
    .collect()
}

/// Breadth-first traversal from `root`, appending visit order.
fn walk(
  root: usize,
  children: &[Vec<usize>],
  reached: &mut [bool],
  order: &mut Vec<usize>,
) {
  let mut queue = VecDeque::from([root]);
  reached[root] = true;
  while let Some(i) = queue.pop_front() {
    order.push(i);
    for &c in &children[i] {
      if !reached[c] {
        reached[c] = true;
        queue.push_back(c);
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};

  use super::*;

  /// Ids are derived from a single letter so expectations read like the
  /// scenarios they encode.
  fn id(tag: char) -> Uuid { Uuid::from_u128(tag as u128) }

  fn comment(tag: char, parent: Option<char>, seq: i64) -> Comment {
    Comment {
      id:         id(tag),
      post_id:    Uuid::nil(),
      author:     "Guest User".into(),
      body:       format!("comment {tag}"),
      created_at: Utc.timestamp_opt(1_700_000_000 + seq, 0).unwrap(),
      parent_id:  parent.map(id),
      child_ids:  vec![],
      like_count: 0,
    }
  }

  fn input(edges: &[(char, Option<char>)]) -> Vec<Comment> {
    edges
      .iter()
      .enumerate()
      .map(|(i, (t, p))| comment(*t, *p, i as i64))
      .collect()
  }

  /// Render a forest as `A(B(),C())` for compact assertions.
  fn shape(forest: &[CommentNode]) -> String {
    forest
      .iter()
      .map(|n| {
        let tag = char::from_u32(n.comment.id.as_u128() as u32).unwrap();
        format!("{tag}({})", shape(&n.replies))
      })
      .collect::<Vec<_>>()
      .join(",")
  }

  fn subtree_size(node: &CommentNode) -> usize { 1 + count(&node.replies) }

  fn count(forest: &[CommentNode]) -> usize { forest.iter().map(subtree_size).sum() }

  #[test]
  fn reply_nests_under_its_parent() {
    let forest = build_thread(&input(&[('A', None), ('B', Some('A')), ('C', None)]));
    assert_eq!(shape(&forest), "A(B()),C()");
  }

  #[test]
  fn orphan_is_promoted_to_root() {
    let forest = build_thread(&input(&[('A', None), ('B', Some('Z'))]));
    assert_eq!(shape(&forest), "A(),B()");
  }

  #[test]
  fn empty_input_gives_empty_forest() {
    assert!(build_thread(&[]).is_empty());
  }

  #[test]
  fn self_reference_is_a_root() {
    let forest = build_thread(&input(&[('A', Some('A'))]));
    assert_eq!(shape(&forest), "A()");
  }

  #[test]
  fn sibling_order_follows_input_order() {
    let forest = build_thread(&input(&[
      ('A', None),
      ('D', Some('A')),
      ('B', None),
      ('C', Some('A')),
      ('E', Some('D')),
      ('F', Some('A')),
      ('G', Some('D')),
    ]));
    assert_eq!(shape(&forest), "A(D(E(),G()),C(),F()),B()");
  }

  #[test]
  fn reply_listed_before_parent_still_nests() {
    let forest = build_thread(&input(&[('B', Some('A')), ('A', None)]));
    assert_eq!(shape(&forest), "A(B())");
  }

  #[test]
  fn cycle_is_broken_at_first_member() {
    let forest = build_thread(&input(&[
      ('R', None),
      ('A', Some('B')),
      ('B', Some('A')),
      ('C', Some('B')),
    ]));
    assert_eq!(shape(&forest), "R(),A(B(C()))");
    assert_eq!(count(&forest), 4);
  }

  #[test]
  fn every_comment_appears_exactly_once() {
    let edges: Vec<(char, Option<char>)> = vec![
      ('A', None),
      ('B', Some('A')),
      ('C', Some('B')),
      ('D', Some('Q')),
      ('E', Some('E')),
      ('F', Some('C')),
      ('G', Some('H')),
      ('H', Some('G')),
      ('I', None),
      ('J', Some('I')),
    ];
    let forest = build_thread(&input(&edges));
    assert_eq!(count(&forest), edges.len());

    let mut seen = Vec::new();
    let mut stack: Vec<&CommentNode> = forest.iter().collect();
    while let Some(n) = stack.pop() {
      seen.push(n.comment.id);
      stack.extend(n.replies.iter());
    }
    seen.sort();
    seen.dedup();
    assert_eq!(seen.len(), edges.len());
  }

  #[test]
  fn long_reply_chain_builds_without_stack_growth() {
    let comments: Vec<Comment> = (0..2_000u128)
      .map(|i| Comment {
        id:         Uuid::from_u128(i + 1),
        post_id:    Uuid::nil(),
        author:     "Guest User".into(),
        body:       "deep".into(),
        created_at: Utc.timestamp_opt(i as i64, 0).unwrap(),
        parent_id:  (i > 0).then(|| Uuid::from_u128(i)),
        child_ids:  vec![],
        like_count: 0,
      })
      .collect();
    let forest = build_thread(&comments);
    assert_eq!(forest.len(), 1);

    let mut depth = 0;
    let mut node = &forest[0];
    while let Some(next) = node.replies.first() {
      depth += 1;
      node = next;
    }
    assert_eq!(depth, 1_999);
  }

  #[test]
  fn input_is_left_untouched_and_output_is_deterministic() {
    let comments = input(&[('A', None), ('B', Some('A')), ('C', Some('A'))]);
    let before = comments.clone();
    let first = build_thread(&comments);
    let second = build_thread(&comments);
    assert_eq!(comments, before);
    assert_eq!(first, second);
  }

  #[test]
  fn node_serialises_flat_with_replies() {
    let forest = build_thread(&input(&[('A', None), ('B', Some('A'))]));
    let v = serde_json::to_value(&forest).unwrap();
    assert_eq!(v[0]["id"], serde_json::json!(id('A')));
    assert_eq!(v[0]["replies"][0]["parentId"], serde_json::json!(id('A')));
    assert_eq!(v[0]["replies"][0]["replies"], serde_json::json!([]));
  }
}
