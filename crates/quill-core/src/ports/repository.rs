use async_trait::async_trait;

use crate::domain::{BlogPost, PostFields, PostId};
use crate::error::RepoError;

/// Blog post store.
///
/// Implementations assign `id` and `created` on insert and never touch them
/// afterwards.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert every record in order and return the persisted posts.
    async fn insert_many(&self, records: Vec<PostFields>) -> Result<Vec<BlogPost>, RepoError>;

    /// Insert a single record.
    async fn insert_one(&self, record: PostFields) -> Result<BlogPost, RepoError>;

    /// All posts, oldest first.
    async fn find_all(&self) -> Result<Vec<BlogPost>, RepoError>;

    /// Find a post by its unique ID.
    async fn find_by_id(&self, id: PostId) -> Result<Option<BlogPost>, RepoError>;

    /// The first post in `find_all` order, if any.
    async fn find_one(&self) -> Result<Option<BlogPost>, RepoError>;

    /// Replace title, content and author of an existing post.
    ///
    /// Fails with [`RepoError::NotFound`] when no post has this id.
    async fn update_by_id(&self, id: PostId, fields: PostFields) -> Result<BlogPost, RepoError>;

    /// Delete a post by its ID.
    ///
    /// Fails with [`RepoError::NotFound`] when no post has this id.
    async fn delete_by_id(&self, id: PostId) -> Result<(), RepoError>;

    async fn count(&self) -> Result<u64, RepoError>;

    /// Remove every post and return how many were removed.
    async fn delete_all(&self) -> Result<u64, RepoError>;
}
