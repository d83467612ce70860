//! Chronological previous/next links between posts.

use super::document::Document;

/// Link public posts chronologically.
///
/// `posts` must be sorted newest first. Walking the non-private posts from
/// oldest to newest, each post's `prev_id` is the next-older public post and
/// its `next_id` the next-newer one. Private posts get no links and are
/// skipped over, so the chain stays unbroken around them.
pub fn link_posts(posts: &mut [Document]) {
    for post in posts.iter_mut() {
        post.prev_id = None;
        post.next_id = None;
    }

    // Indices of public posts, oldest first
    let public: Vec<usize> = (0..posts.len())
        .rev()
        .filter(|&i| !posts[i].is_private())
        .collect();

    for pair in public.windows(2) {
        let (older, newer) = (pair[0], pair[1]);
        posts[older].next_id = Some(posts[newer].id);
        posts[newer].prev_id = Some(posts[older].id);
    }
}
