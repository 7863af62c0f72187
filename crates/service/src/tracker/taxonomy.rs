#![forbid(unsafe_code)]

//! Statuses, priorities and tags. Reads are anonymous; every write is
//! admin-only.

use super::{IssueTracker, authorize, resolve_actor};
use crate::commands::{CreateTag, TaxonomyName, UpdateTag};
use crate::credentials::CredentialService;
use crate::error::ServiceError;
use crate::tokens::TokenService;
use tracker_core::ids::TagId;
use tracker_core::model::{EntityKind, TaxonomyKind};
use tracker_core::policy::Action;
use tracker_core::view::{NamedRef, TagRef, TaxonomyUsage};

impl<C: CredentialService, T: TokenService> IssueTracker<C, T> {
    pub fn list_taxonomy(&self, kind: TaxonomyKind) -> Result<Vec<NamedRef>, ServiceError> {
        let store = self.lock()?;
        Ok(store
            .list_taxonomy(kind)?
            .iter()
            .map(NamedRef::from)
            .collect())
    }

    pub fn get_taxonomy(&self, kind: TaxonomyKind, id: i64) -> Result<NamedRef, ServiceError> {
        let store = self.lock()?;
        store
            .get_taxonomy(kind, id)?
            .map(|entry| NamedRef::from(&entry))
            .ok_or(ServiceError::not_found(kind, id))
    }

    pub fn create_taxonomy(
        &self,
        token: &str,
        kind: TaxonomyKind,
        command: TaxonomyName,
    ) -> Result<NamedRef, ServiceError> {
        let user_id = self.token_user(token)?;
        let mut store = self.lock()?;
        let actor = resolve_actor(&store, user_id)?;
        authorize(&actor, Action::ManageTaxonomy)?;

        let name = command.validate()?;
        let entry = store.create_taxonomy(kind, &name)?;
        tracing::info!(kind = kind.as_str(), id = entry.id, "taxonomy entry created");
        Ok(NamedRef::from(&entry))
    }

    pub fn rename_taxonomy(
        &self,
        token: &str,
        kind: TaxonomyKind,
        id: i64,
        command: TaxonomyName,
    ) -> Result<NamedRef, ServiceError> {
        let user_id = self.token_user(token)?;
        let mut store = self.lock()?;
        let actor = resolve_actor(&store, user_id)?;
        if store.get_taxonomy(kind, id)?.is_none() {
            return Err(ServiceError::not_found(kind, id));
        }
        authorize(&actor, Action::ManageTaxonomy)?;

        let name = command.validate()?;
        let entry = store.rename_taxonomy(kind, id, &name)?;
        tracing::info!(kind = kind.as_str(), id, "taxonomy entry renamed");
        Ok(NamedRef::from(&entry))
    }

    /// Fails with the full list of referencing issues while any remain.
    pub fn delete_taxonomy(
        &self,
        token: &str,
        kind: TaxonomyKind,
        id: i64,
    ) -> Result<(), ServiceError> {
        let user_id = self.token_user(token)?;
        let mut store = self.lock()?;
        let actor = resolve_actor(&store, user_id)?;
        if store.get_taxonomy(kind, id)?.is_none() {
            return Err(ServiceError::not_found(kind, id));
        }
        authorize(&actor, Action::ManageTaxonomy)?;

        store.delete_taxonomy(kind, id)?;
        tracing::info!(kind = kind.as_str(), id, "taxonomy entry deleted");
        Ok(())
    }

    pub fn taxonomy_usage(
        &self,
        kind: TaxonomyKind,
        id: i64,
    ) -> Result<TaxonomyUsage, ServiceError> {
        let store = self.lock()?;
        Ok(store.taxonomy_usage(kind, id)?)
    }

    pub fn status_usage(&self, id: i64) -> Result<TaxonomyUsage, ServiceError> {
        self.taxonomy_usage(TaxonomyKind::Status, id)
    }

    pub fn priority_usage(&self, id: i64) -> Result<TaxonomyUsage, ServiceError> {
        self.taxonomy_usage(TaxonomyKind::Priority, id)
    }

    pub fn list_tags(&self) -> Result<Vec<TagRef>, ServiceError> {
        let store = self.lock()?;
        Ok(store.list_tags()?.into_iter().map(TagRef::from).collect())
    }

    pub fn get_tag(&self, id: TagId) -> Result<TagRef, ServiceError> {
        let store = self.lock()?;
        store
            .get_tag(id)?
            .map(TagRef::from)
            .ok_or(ServiceError::not_found(EntityKind::Tag, id))
    }

    pub fn create_tag(&self, token: &str, command: CreateTag) -> Result<TagRef, ServiceError> {
        let user_id = self.token_user(token)?;
        let mut store = self.lock()?;
        let actor = resolve_actor(&store, user_id)?;
        authorize(&actor, Action::ManageTags)?;

        let request = command.validate()?;
        let tag = store.create_tag(request)?;
        tracing::info!(tag_id = tag.id, "tag created");
        Ok(TagRef::from(tag))
    }

    pub fn update_tag(
        &self,
        token: &str,
        id: TagId,
        command: UpdateTag,
    ) -> Result<TagRef, ServiceError> {
        let user_id = self.token_user(token)?;
        let mut store = self.lock()?;
        let actor = resolve_actor(&store, user_id)?;
        if store.get_tag(id)?.is_none() {
            return Err(ServiceError::not_found(EntityKind::Tag, id));
        }
        authorize(&actor, Action::ManageTags)?;

        let patch = command.validate()?;
        let tag = store.update_tag(id, patch)?;
        tracing::info!(tag_id = id, "tag updated");
        Ok(TagRef::from(tag))
    }

    /// Unconditional; issues simply lose the tag.
    pub fn delete_tag(&self, token: &str, id: TagId) -> Result<(), ServiceError> {
        let user_id = self.token_user(token)?;
        let mut store = self.lock()?;
        let actor = resolve_actor(&store, user_id)?;
        if store.get_tag(id)?.is_none() {
            return Err(ServiceError::not_found(EntityKind::Tag, id));
        }
        authorize(&actor, Action::ManageTags)?;

        store.delete_tag(id)?;
        tracing::info!(tag_id = id, "tag deleted");
        Ok(())
    }
}
