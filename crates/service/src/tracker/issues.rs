#![forbid(unsafe_code)]

use super::{IssueTracker, authorize, resolve_actor};
use crate::commands::{CreateIssue, UpdateIssue};
use crate::credentials::CredentialService;
use crate::error::ServiceError;
use crate::tokens::TokenService;
use tracker_core::ids::IssueId;
use tracker_core::model::EntityKind;
use tracker_core::policy::Action;
use tracker_core::query::{IssueQuery, QueryParams};
use tracker_core::view::{IssueView, Page};
use tracker_storage::SqliteStore;

impl<C: CredentialService, T: TokenService> IssueTracker<C, T> {
    /// Anonymous. Malformed filters are ignored rather than rejected.
    pub fn list_issues(&self, params: &QueryParams) -> Result<Page<IssueView>, ServiceError> {
        let query = IssueQuery::from_params(params);
        let store = self.lock()?;
        Ok(store.list_issues(&query)?)
    }

    pub fn get_issue(&self, id: IssueId) -> Result<IssueView, ServiceError> {
        let store = self.lock()?;
        issue_view(&store, id)
    }

    /// The actor becomes the author; any author named in the command is ignored.
    pub fn create_issue(&self, token: &str, command: CreateIssue) -> Result<IssueView, ServiceError> {
        let user_id = self.token_user(token)?;
        let mut store = self.lock()?;
        let actor = resolve_actor(&store, user_id)?;

        let request = command.validate(actor.id)?;
        let issue = store.create_issue(request)?;
        tracing::info!(issue_id = issue.id, author_id = actor.id, "issue created");
        issue_view(&store, issue.id)
    }

    pub fn update_issue(
        &self,
        token: &str,
        id: IssueId,
        command: UpdateIssue,
    ) -> Result<IssueView, ServiceError> {
        let user_id = self.token_user(token)?;
        let mut store = self.lock()?;
        let actor = resolve_actor(&store, user_id)?;
        let issue = store
            .get_issue(id)?
            .ok_or(ServiceError::not_found(EntityKind::Issue, id))?;
        authorize(
            &actor,
            Action::MutateIssue {
                author_id: issue.author_id,
            },
        )?;

        let patch = command.validate()?;
        store.update_issue(id, patch)?;
        tracing::info!(issue_id = id, actor_id = actor.id, "issue updated");
        issue_view(&store, id)
    }

    /// Comments and tag associations go with the issue.
    pub fn delete_issue(&self, token: &str, id: IssueId) -> Result<(), ServiceError> {
        let user_id = self.token_user(token)?;
        let mut store = self.lock()?;
        let actor = resolve_actor(&store, user_id)?;
        let issue = store
            .get_issue(id)?
            .ok_or(ServiceError::not_found(EntityKind::Issue, id))?;
        authorize(
            &actor,
            Action::MutateIssue {
                author_id: issue.author_id,
            },
        )?;

        store.delete_issue(id)?;
        tracing::info!(issue_id = id, actor_id = actor.id, "issue deleted");
        Ok(())
    }
}

fn issue_view(store: &SqliteStore, id: IssueId) -> Result<IssueView, ServiceError> {
    store
        .issue_view(id)?
        .ok_or(ServiceError::not_found(EntityKind::Issue, id))
}
