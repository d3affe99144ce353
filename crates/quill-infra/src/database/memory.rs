//! In-memory post repository - used when no database is configured and by tests.

use async_trait::async_trait;
use tokio::sync::RwLock;

use quill_core::domain::{BlogPost, PostFields, PostId};
use quill_core::error::RepoError;
use quill_core::ports::PostRepository;

/// In-memory store keeping posts in insertion order behind an async RwLock.
///
/// Note: Data is lost on process restart.
pub struct InMemoryPostRepository {
    posts: RwLock<Vec<BlogPost>>,
}

impl InMemoryPostRepository {
    pub fn new() -> Self {
        Self {
            posts: RwLock::new(Vec::new()),
        }
    }
}

impl Default for InMemoryPostRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PostRepository for InMemoryPostRepository {
    async fn insert_many(&self, records: Vec<PostFields>) -> Result<Vec<BlogPost>, RepoError> {
        let inserted: Vec<BlogPost> = records.into_iter().map(BlogPost::new).collect();

        let mut posts = self.posts.write().await;
        posts.extend(inserted.iter().cloned());

        Ok(inserted)
    }

    async fn insert_one(&self, record: PostFields) -> Result<BlogPost, RepoError> {
        let post = BlogPost::new(record);

        let mut posts = self.posts.write().await;
        posts.push(post.clone());

        Ok(post)
    }

    async fn find_all(&self) -> Result<Vec<BlogPost>, RepoError> {
        Ok(self.posts.read().await.clone())
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<BlogPost>, RepoError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|p| p.id == id).cloned())
    }

    async fn find_one(&self) -> Result<Option<BlogPost>, RepoError> {
        Ok(self.posts.read().await.first().cloned())
    }

    async fn update_by_id(&self, id: PostId, fields: PostFields) -> Result<BlogPost, RepoError> {
        let mut posts = self.posts.write().await;
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;

        post.replace(fields);
        Ok(post.clone())
    }

    async fn delete_by_id(&self, id: PostId) -> Result<(), RepoError> {
        let mut posts = self.posts.write().await;
        let index = posts
            .iter()
            .position(|p| p.id == id)
            .ok_or(RepoError::NotFound)?;

        posts.remove(index);
        Ok(())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        Ok(self.posts.read().await.len() as u64)
    }

    async fn delete_all(&self) -> Result<u64, RepoError> {
        let mut posts = self.posts.write().await;
        let removed = posts.len() as u64;
        posts.clear();
        Ok(removed)
    }
}
