use std::collections::{HashMap, HashSet};

use crate::models::models::{FeedPost, Post, UserSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
struct FeedRef {
    post_id: String,
    author_id: String,
}

/// Cached posts, normalized: each post is stored once, keyed by id.
///
/// The personal, pinned and feed lists are ordered id lists over that
/// table, so liking, pinning or deleting a post is visible in every list
/// at once.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PostsState {
    posts: HashMap<String, Post>,
    authors: HashMap<String, UserSummary>,
    personal: Vec<String>,
    pinned: Vec<String>,
    feed: Vec<FeedRef>,
}

impl PostsState {
    fn upsert(&mut self, post: Post) -> String {
        let id = post.post_id.clone();
        self.posts.insert(id.clone(), post);
        id
    }

    fn resolve<'a>(&'a self, ids: &'a [String]) -> impl Iterator<Item = &'a Post> + 'a {
        ids.iter().filter_map(move |id| self.posts.get(id))
    }

    /// Drops table rows no list refers to any more.
    fn collect_garbage(&mut self) {
        let live: HashSet<&String> = self
            .personal
            .iter()
            .chain(self.pinned.iter())
            .chain(self.feed.iter().map(|f| &f.post_id))
            .collect();
        self.posts.retain(|id, _| live.contains(id));

        let authors: HashSet<&String> = self.feed.iter().map(|f| &f.author_id).collect();
        self.authors.retain(|id, _| authors.contains(id));
    }

    pub fn post(&self, post_id: &str) -> Option<&Post> {
        self.posts.get(post_id)
    }

    pub fn clear_all(&mut self) {
        *self = Self::default();
    }

    // Personal posts

    pub fn get_posts(&self) -> Vec<Post> {
        self.resolve(&self.personal).cloned().collect()
    }

    pub fn set_posts(&mut self, posts: Vec<Post>) {
        self.personal = posts.into_iter().map(|p| self.upsert(p)).collect();
        self.collect_garbage();
    }

    pub fn clear_posts(&mut self) {
        self.personal.clear();
        self.collect_garbage();
    }

    pub fn add_post(&mut self, post: Post) {
        let id = self.upsert(post);
        if !self.personal.contains(&id) {
            self.personal.push(id);
        }
    }

    /// Replaces a cached post everywhere it appears; unknown ids are ignored.
    pub fn update_post(&mut self, post_id: &str, updated: Post) {
        if let Some(post) = self.posts.get_mut(post_id) {
            *post = updated;
        }
    }

    /// Removes a post from the table and from every list.
    pub fn remove_post(&mut self, post_id: &str) {
        self.posts.remove(post_id);
        self.personal.retain(|id| id != post_id);
        self.pinned.retain(|id| id != post_id);
        self.feed.retain(|f| f.post_id != post_id);
        self.collect_garbage();
    }

    pub fn get_post_by_id(&self, post_id: &str) -> Option<&Post> {
        self.personal
            .iter()
            .any(|id| id == post_id)
            .then(|| self.posts.get(post_id))
            .flatten()
    }

    // Pinned posts

    pub fn get_pinned_posts(&self) -> Vec<Post> {
        self.resolve(&self.pinned).cloned().collect()
    }

    pub fn set_pinned_posts(&mut self, pinned: Vec<Post>) {
        let previous = std::mem::take(&mut self.pinned);
        for id in previous {
            if let Some(post) = self.posts.get_mut(&id) {
                post.is_pinned = false;
            }
        }
        self.pinned = pinned
            .into_iter()
            .map(|mut p| {
                p.is_pinned = true;
                self.upsert(p)
            })
            .collect();
        self.collect_garbage();
    }

    pub fn add_pinned_post(&mut self, mut post: Post) {
        post.is_pinned = true;
        let id = self.upsert(post);
        if !self.pinned.contains(&id) {
            self.pinned.push(id);
        }
    }

    /// Pins an already cached post. Returns whether anything changed.
    pub fn pin_post(&mut self, post_id: &str) -> bool {
        match self.posts.get_mut(post_id) {
            Some(post) if !self.pinned.iter().any(|id| id == post_id) => {
                post.is_pinned = true;
                self.pinned.push(post_id.to_string());
                true
            }
            _ => false,
        }
    }

    /// Unpins a post. A post that is not pinned is left alone.
    pub fn unpin_post(&mut self, post_id: &str) -> bool {
        let before = self.pinned.len();
        self.pinned.retain(|id| id != post_id);
        if self.pinned.len() == before {
            return false;
        }
        if let Some(post) = self.posts.get_mut(post_id) {
            post.is_pinned = false;
        }
        self.collect_garbage();
        true
    }

    pub fn remove_pinned_post(&mut self, post_id: &str) {
        self.unpin_post(post_id);
    }

    /// Empties the pinned list only; posts still shown elsewhere keep
    /// their pinned flag.
    pub fn clear_pinned_posts(&mut self) {
        self.pinned.clear();
        self.collect_garbage();
    }

    // Feed posts

    fn feed_post(&self, entry: &FeedRef) -> Option<FeedPost> {
        Some(FeedPost {
            post: self.posts.get(&entry.post_id)?.clone(),
            user: self.authors.get(&entry.author_id).cloned().unwrap_or_default(),
        })
    }

    pub fn get_feed_posts(&self) -> Vec<FeedPost> {
        self.feed.iter().filter_map(|f| self.feed_post(f)).collect()
    }

    pub fn get_feed_post_by_id(&self, post_id: &str) -> Option<FeedPost> {
        self.feed
            .iter()
            .find(|f| f.post_id == post_id)
            .and_then(|f| self.feed_post(f))
    }

    pub fn set_feed_posts(&mut self, feed: Vec<FeedPost>) {
        self.feed = feed
            .into_iter()
            .map(|FeedPost { post, user }| {
                let author_id = user.user_id.clone();
                self.authors.insert(author_id.clone(), user);
                FeedRef {
                    post_id: self.upsert(post),
                    author_id,
                }
            })
            .collect();
        self.collect_garbage();
    }

    pub fn update_feed_post(&mut self, post_id: &str, updated: FeedPost) {
        let Some(entry) = self.feed.iter_mut().find(|f| f.post_id == post_id) else {
            return;
        };
        entry.author_id = updated.user.user_id.clone();
        self.authors.insert(updated.user.user_id.clone(), updated.user);
        self.posts.insert(post_id.to_string(), updated.post);
        self.collect_garbage();
    }

    pub fn clear_feed_posts(&mut self) {
        self.feed.clear();
        self.collect_garbage();
    }

    // Engagement

    /// Flips the viewer's like and adjusts the count. Returns whether the
    /// post was cached and actually changed.
    pub fn set_liked(&mut self, post_id: &str, liked: bool) -> bool {
        match self.posts.get_mut(post_id) {
            Some(post) if post.is_liked != liked => {
                post.is_liked = liked;
                post.like_count = if liked {
                    post.like_count + 1
                } else {
                    post.like_count.saturating_sub(1)
                };
                true
            }
            _ => false,
        }
    }

    pub fn set_comment_count(&mut self, post_id: &str, count: u64) {
        if let Some(post) = self.posts.get_mut(post_id) {
            post.comment_count = count;
        }
    }

    pub fn adjust_comment_count(&mut self, post_id: &str, added: bool) {
        if let Some(post) = self.posts.get_mut(post_id) {
            post.comment_count = if added {
                post.comment_count + 1
            } else {
                post.comment_count.saturating_sub(1)
            };
        }
    }
}
