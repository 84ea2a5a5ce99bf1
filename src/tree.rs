//! Path-vector ordering for post trees
//!
//! Every post stores the ids of its ancestors from the root down to itself.
//! Comparing those vectors lexicographically gives a depth-first traversal
//! where parents precede children and siblings follow creation order, so a
//! single keyset comparison is enough to page through a tree.

use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::Post;
use crate::paging::{Direction, PostPage, PostSort};

/// Path of a new post: `[id]` for roots, otherwise the parent's path plus `id`
pub fn child_path(parent_path: Option<&[i64]>, id: i64) -> Vec<i64> {
    let mut path = parent_path.map(<[i64]>::to_vec).unwrap_or_default();
    path.push(id);
    path
}

/// Position of `b` relative to `a` in a listing sorted by `mode` and `direction`
pub fn compare(mode: PostSort, direction: Direction, a: &Post, b: &Post) -> Ordering {
    match mode {
        PostSort::Flat => direction.apply(a.id.cmp(&b.id)),
        PostSort::Tree => direction.apply(a.path.cmp(&b.path).then(a.id.cmp(&b.id))),
        // Roots flip with the direction, subtrees always read top-down
        PostSort::ParentTree => direction
            .apply(a.root_id().cmp(&b.root_id()))
            .then_with(|| a.path.cmp(&b.path))
            .then_with(|| a.id.cmp(&b.id)),
    }
}

/// Select one page of a thread's posts.
///
/// `posts` must hold every post of the thread. `anchor` is the post named by
/// `page.since`, if it exists. Flat pages compare ids against `since`
/// directly; tree pages need the anchor's path and come back empty without it.
pub fn select_page(posts: Vec<Post>, page: &PostPage, anchor: Option<&Post>) -> Vec<Post> {
    let limit = usize::try_from(page.limit).unwrap_or(0);
    let (mode, direction) = (page.sort, page.direction);

    if mode != PostSort::Flat && page.since.is_some() && anchor.is_none() {
        return Vec::new();
    }

    match mode {
        PostSort::Flat => {
            let mut selected: Vec<Post> = posts
                .into_iter()
                .filter(|p| {
                    page.since
                        .map_or(true, |since| direction.apply(since.cmp(&p.id)) == Ordering::Less)
                })
                .collect();
            selected.sort_by(|a, b| compare(mode, direction, a, b));
            selected.truncate(limit);
            selected
        }
        PostSort::Tree => {
            let mut selected: Vec<Post> = posts
                .into_iter()
                .filter(|p| anchor.map_or(true, |a| compare(mode, direction, a, p) == Ordering::Less))
                .collect();
            selected.sort_by(|a, b| compare(mode, direction, a, b));
            selected.truncate(limit);
            selected
        }
        PostSort::ParentTree => {
            let boundary = anchor.map(Post::root_id);
            let mut roots: Vec<i64> = posts
                .iter()
                .filter(|p| p.is_root())
                .map(|p| p.id)
                .filter(|id| boundary.map_or(true, |b| direction.apply(b.cmp(id)) == Ordering::Less))
                .collect();
            roots.sort_by(|a, b| direction.apply(a.cmp(b)));
            roots.truncate(limit);

            let roots: HashSet<i64> = roots.into_iter().collect();
            let mut selected: Vec<Post> = posts
                .into_iter()
                .filter(|p| roots.contains(&p.root_id()))
                .collect();
            selected.sort_by(|a, b| compare(mode, direction, a, b));
            selected
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    /// Builds a thread as (id, parent) pairs in creation order
    fn thread(shape: &[(i64, i64)]) -> Vec<Post> {
        let created = Utc::now();
        let mut posts: Vec<Post> = Vec::new();
        for &(id, parent) in shape {
            let parent_path = posts
                .iter()
                .find(|p| p.id == parent)
                .map(|p| p.path.clone());
            posts.push(Post {
                id,
                parent,
                author: "alice".to_string(),
                message: format!("post {}", id),
                is_edited: false,
                forum: "f".to_string(),
                thread: 1,
                created,
                path: child_path(parent_path.as_deref(), id),
            });
        }
        posts
    }

    fn ids(posts: &[Post]) -> Vec<i64> {
        posts.iter().map(|p| p.id).collect()
    }

    fn page(sort: PostSort, limit: i64, direction: Direction) -> PostPage {
        PostPage::new(sort, limit, None, direction)
    }

    // 1 -> 2 -> 4, 1 -> 3, 5 -> 6, 7
    const SHAPE: &[(i64, i64)] = &[(1, 0), (2, 1), (3, 1), (4, 2), (5, 0), (6, 5), (7, 0)];

    #[test]
    fn test_child_extends_parent_path() {
        let posts = thread(SHAPE);
        for post in &posts {
            if post.is_root() {
                assert_eq!(post.path, vec![post.id]);
            } else {
                let parent = posts.iter().find(|p| p.id == post.parent).unwrap();
                assert_eq!(post.path[..post.path.len() - 1], parent.path[..]);
                assert_eq!(post.path.last(), Some(&post.id));
            }
        }
    }

    #[test]
    fn test_flat_order() {
        let posts = thread(SHAPE);
        let asc = select_page(posts.clone(), &page(PostSort::Flat, 100, Direction::Asc), None);
        assert_eq!(ids(&asc), vec![1, 2, 3, 4, 5, 6, 7]);
        let desc = select_page(posts, &page(PostSort::Flat, 3, Direction::Desc), None);
        assert_eq!(ids(&desc), vec![7, 6, 5]);
    }

    #[test]
    fn test_flat_since_is_a_plain_id_bound() {
        let posts = thread(SHAPE);
        let mut request = page(PostSort::Flat, 100, Direction::Asc);
        request.since = Some(0);
        assert_eq!(ids(&select_page(posts.clone(), &request, None)), vec![1, 2, 3, 4, 5, 6, 7]);

        // An id between existing posts still bounds the page
        let posts: Vec<Post> = posts.into_iter().filter(|p| p.id != 4).collect();
        request.since = Some(4);
        assert_eq!(ids(&select_page(posts.clone(), &request, None)), vec![5, 6, 7]);

        request.direction = Direction::Desc;
        assert_eq!(ids(&select_page(posts, &request, None)), vec![3, 2, 1]);
    }

    #[test]
    fn test_tree_modes_need_the_anchor() {
        let posts = thread(SHAPE);
        for sort in [PostSort::Tree, PostSort::ParentTree] {
            let mut request = page(sort, 100, Direction::Asc);
            request.since = Some(99);
            assert!(select_page(posts.clone(), &request, None).is_empty());
        }
    }

    #[test]
    fn test_tree_order_is_depth_first() {
        let posts = thread(SHAPE);
        let asc = select_page(posts.clone(), &page(PostSort::Tree, 100, Direction::Asc), None);
        assert_eq!(ids(&asc), vec![1, 2, 4, 3, 5, 6, 7]);

        let mut desc = select_page(posts, &page(PostSort::Tree, 100, Direction::Desc), None);
        desc.reverse();
        assert_eq!(ids(&desc), ids(&asc));
    }

    #[test]
    fn test_tree_pages_after_anchor() {
        let posts = thread(SHAPE);
        let anchor = posts.iter().find(|p| p.id == 4).cloned();
        let mut request = page(PostSort::Tree, 2, Direction::Asc);
        request.since = Some(4);
        let next = select_page(posts.clone(), &request, anchor.as_ref());
        assert_eq!(ids(&next), vec![3, 5]);

        request.direction = Direction::Desc;
        let prev = select_page(posts, &request, anchor.as_ref());
        assert_eq!(ids(&prev), vec![2, 1]);
    }

    #[test]
    fn test_parent_tree_limits_roots() {
        let posts = thread(SHAPE);
        let asc = select_page(posts.clone(), &page(PostSort::ParentTree, 2, Direction::Asc), None);
        assert_eq!(ids(&asc), vec![1, 2, 4, 3, 5, 6]);

        let desc = select_page(posts, &page(PostSort::ParentTree, 2, Direction::Desc), None);
        assert_eq!(ids(&desc), vec![7, 5, 6]);
    }

    #[test]
    fn test_parent_tree_boundary_is_anchor_root() {
        let posts = thread(SHAPE);
        // Anchoring on a nested post pages past its whole root subtree
        let anchor = posts.iter().find(|p| p.id == 4).cloned();
        let mut request = page(PostSort::ParentTree, 1, Direction::Asc);
        request.since = Some(4);
        let next = select_page(posts.clone(), &request, anchor.as_ref());
        assert_eq!(ids(&next), vec![5, 6]);

        request.direction = Direction::Desc;
        let anchor = posts.iter().find(|p| p.id == 6).cloned();
        request.since = Some(6);
        let prev = select_page(posts, &request, anchor.as_ref());
        assert_eq!(ids(&prev), vec![1, 2, 4, 3]);
    }

    #[test]
    fn test_consecutive_pages_cover_everything_once() {
        let posts = thread(SHAPE);
        for sort in [PostSort::Flat, PostSort::Tree] {
            let mut request = page(sort, 3, Direction::Asc);
            let mut seen = Vec::new();
            loop {
                let anchor = request
                    .since
                    .and_then(|id| posts.iter().find(|p| p.id == id).cloned());
                let batch = select_page(posts.clone(), &request, anchor.as_ref());
                let Some(last) = batch.last() else { break };
                request = request.after(last.id);
                seen.extend(ids(&batch));
            }
            let mut sorted = seen.clone();
            sorted.sort_unstable();
            sorted.dedup();
            assert_eq!(sorted.len(), seen.len());
            assert_eq!(seen.len(), posts.len());
        }
    }
}
