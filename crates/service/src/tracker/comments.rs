#![forbid(unsafe_code)]

use super::{IssueTracker, authorize, resolve_actor};
use crate::commands::{CreateComment, UpdateComment};
use crate::credentials::CredentialService;
use crate::error::ServiceError;
use crate::tokens::TokenService;
use tracker_core::ids::CommentId;
use tracker_core::model::EntityKind;
use tracker_core::policy::Action;
use tracker_core::query::{CommentQuery, QueryParams};
use tracker_core::view::{CommentView, Page};
use tracker_storage::SqliteStore;

impl<C: CredentialService, T: TokenService> IssueTracker<C, T> {
    pub fn list_comments(&self, params: &QueryParams) -> Result<Page<CommentView>, ServiceError> {
        let query = CommentQuery::from_params(params);
        let store = self.lock()?;
        Ok(store.list_comments(&query)?)
    }

    pub fn get_comment(&self, id: CommentId) -> Result<CommentView, ServiceError> {
        let store = self.lock()?;
        comment_view(&store, id)
    }

    /// Any authenticated user may comment on an existing issue.
    pub fn create_comment(
        &self,
        token: &str,
        command: CreateComment,
    ) -> Result<CommentView, ServiceError> {
        let user_id = self.token_user(token)?;
        let mut store = self.lock()?;
        let actor = resolve_actor(&store, user_id)?;
        let issue_id = command.issue_id()?;
        if store.get_issue(issue_id)?.is_none() {
            return Err(ServiceError::not_found(EntityKind::Issue, issue_id));
        }

        let request = command.validate(actor.id)?;
        let comment = store.create_comment(request)?;
        tracing::info!(
            comment_id = comment.id,
            issue_id,
            author_id = actor.id,
            "comment created"
        );
        comment_view(&store, comment.id)
    }

    pub fn update_comment(
        &self,
        token: &str,
        id: CommentId,
        command: UpdateComment,
    ) -> Result<CommentView, ServiceError> {
        let user_id = self.token_user(token)?;
        let mut store = self.lock()?;
        let actor = resolve_actor(&store, user_id)?;
        let comment = store
            .get_comment(id)?
            .ok_or(ServiceError::not_found(EntityKind::Comment, id))?;
        authorize(
            &actor,
            Action::MutateComment {
                author_id: comment.author_id,
            },
        )?;

        let content = command.validate()?;
        store.update_comment(id, &content)?;
        tracing::info!(comment_id = id, actor_id = actor.id, "comment updated");
        comment_view(&store, id)
    }

    pub fn delete_comment(&self, token: &str, id: CommentId) -> Result<(), ServiceError> {
        let user_id = self.token_user(token)?;
        let mut store = self.lock()?;
        let actor = resolve_actor(&store, user_id)?;
        let comment = store
            .get_comment(id)?
            .ok_or(ServiceError::not_found(EntityKind::Comment, id))?;
        authorize(
            &actor,
            Action::MutateComment {
                author_id: comment.author_id,
            },
        )?;

        store.delete_comment(id)?;
        tracing::info!(comment_id = id, actor_id = actor.id, "comment deleted");
        Ok(())
    }
}

fn comment_view(store: &SqliteStore, id: CommentId) -> Result<CommentView, ServiceError> {
    store
        .comment_view(id)?
        .ok_or(ServiceError::not_found(EntityKind::Comment, id))
}
