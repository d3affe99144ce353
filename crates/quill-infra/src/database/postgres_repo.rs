//! PostgreSQL repository implementation.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, DbConn, DbErr, EntityTrait, IntoActiveModel, PaginatorTrait, QueryOrder, Set,
};

use quill_core::domain::{BlogPost, PostFields, PostId};
use quill_core::error::RepoError;
use quill_core::ports::PostRepository;

use super::entity::post::{self, Entity as PostEntity};

/// PostgreSQL post repository.
pub struct PostgresPostRepository {
    pub(crate) db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Give back the connection, e.g. to close it.
    pub fn into_connection(self) -> DbConn {
        self.db
    }
}

fn map_db_err(err: DbErr) -> RepoError {
    match err {
        DbErr::Conn(e) => RepoError::Connection(e.to_string()),
        DbErr::ConnectionAcquire(e) => RepoError::Connection(e.to_string()),
        // The row vanished between the read and the write of an update.
        DbErr::RecordNotUpdated => RepoError::NotFound,
        other => RepoError::Query(other.to_string()),
    }
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert_many(&self, records: Vec<PostFields>) -> Result<Vec<BlogPost>, RepoError> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let posts: Vec<BlogPost> = records.into_iter().map(BlogPost::new).collect();
        tracing::debug!(count = posts.len(), "Inserting posts");

        PostEntity::insert_many(posts.iter().cloned().map(post::ActiveModel::from))
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(posts)
    }

    async fn insert_one(&self, record: PostFields) -> Result<BlogPost, RepoError> {
        let post = BlogPost::new(record);
        tracing::debug!(post_id = %post.id, "Inserting post");

        PostEntity::insert(post::ActiveModel::from(post.clone()))
            .exec_without_returning(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(post)
    }

    async fn find_all(&self) -> Result<Vec<BlogPost>, RepoError> {
        let result = PostEntity::find()
            .order_by_asc(post::Column::Created)
            .order_by_asc(post::Column::Id)
            .all(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.into_iter().map(Into::into).collect())
    }

    async fn find_by_id(&self, id: PostId) -> Result<Option<BlogPost>, RepoError> {
        tracing::debug!(post_id = %id, "Finding post by id");

        let result = PostEntity::find_by_id(id.as_uuid())
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn find_one(&self) -> Result<Option<BlogPost>, RepoError> {
        let result = PostEntity::find()
            .order_by_asc(post::Column::Created)
            .order_by_asc(post::Column::Id)
            .one(&self.db)
            .await
            .map_err(map_db_err)?;

        Ok(result.map(Into::into))
    }

    async fn update_by_id(&self, id: PostId, fields: PostFields) -> Result<BlogPost, RepoError> {
        tracing::debug!(post_id = %id, "Updating post");

        let existing = PostEntity::find_by_id(id.as_uuid())
            .one(&self.db)
            .await
            .map_err(map_db_err)?
            .ok_or(RepoError::NotFound)?;

        let mut active = existing.into_active_model();
        active.title = Set(fields.title);
        active.content = Set(fields.content);
        active.author_first_name = Set(fields.author.first_name);
        active.author_last_name = Set(fields.author.last_name);

        let updated = active.update(&self.db).await.map_err(map_db_err)?;
        Ok(updated.into())
    }

    async fn delete_by_id(&self, id: PostId) -> Result<(), RepoError> {
        tracing::debug!(post_id = %id, "Deleting post");

        let result = PostEntity::delete_by_id(id.as_uuid())
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        Ok(())
    }

    async fn count(&self) -> Result<u64, RepoError> {
        PostEntity::find()
            .count(&self.db)
            .await
            .map_err(map_db_err)
    }

    async fn delete_all(&self) -> Result<u64, RepoError> {
        let result = PostEntity::delete_many()
            .exec(&self.db)
            .await
            .map_err(map_db_err)?;

        tracing::debug!(removed = result.rows_affected, "Deleted all posts");
        Ok(result.rows_affected)
    }
}
