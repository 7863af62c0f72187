#![forbid(unsafe_code)]

use super::{IssueTracker, authorize, resolve_actor};
use crate::commands::{Login, RegisterUser, UpdateProfile};
use crate::credentials::CredentialService;
use crate::error::ServiceError;
use crate::tokens::TokenService;
use tracker_core::ids::UserId;
use tracker_core::model::{EntityKind, Role, User};
use tracker_core::policy::Action;
use tracker_core::view::ProfileView;
use tracker_storage::{CreateUserRequest, SqliteStore, UpdateUserRequest};

impl<C: CredentialService, T: TokenService> IssueTracker<C, T> {
    /// New accounts always start with the `user` role.
    pub fn register(&self, command: RegisterUser) -> Result<(ProfileView, String), ServiceError> {
        let registration = command.validate()?;
        let password_digest = self.credentials.hash(&registration.password)?;

        let user = {
            let mut store = self.lock()?;
            store.create_user(CreateUserRequest {
                name: registration.name,
                email: registration.email,
                password_digest,
            })?
        };
        let token = self.tokens.issue(user.id)?;
        tracing::info!(user_id = user.id, "user registered");
        Ok((ProfileView::from(&user), token))
    }

    /// Unknown email and wrong password fail identically.
    pub fn login(&self, command: Login) -> Result<(ProfileView, String), ServiceError> {
        let (email, password) = command.validate()?;
        let user = self.lock()?.find_user_by_email(&email)?;

        let verified = match &user {
            Some(user) => self.credentials.verify(&password, &user.password_digest),
            None => {
                if let Some(decoy) = self.decoy_digest() {
                    self.credentials.verify(&password, decoy);
                }
                false
            }
        };
        let Some(user) = user.filter(|_| verified) else {
            tracing::warn!("login rejected");
            return Err(ServiceError::InvalidCredentials);
        };
        let token = self.tokens.issue(user.id)?;
        tracing::info!(user_id = user.id, "user logged in");
        Ok((ProfileView::from(&user), token))
    }

    pub fn me(&self, token: &str) -> Result<ProfileView, ServiceError> {
        let user_id = self.token_user(token)?;
        let store = self.lock()?;
        let actor = resolve_actor(&store, user_id)?;
        let user = target_user(&store, actor.id)?;
        Ok(ProfileView::from(&user))
    }

    pub fn get_user_profile(&self, token: &str, id: UserId) -> Result<ProfileView, ServiceError> {
        let user_id = self.token_user(token)?;
        let store = self.lock()?;
        let actor = resolve_actor(&store, user_id)?;
        let user = target_user(&store, id)?;
        authorize(&actor, Action::AccessProfile { user_id: id })?;
        Ok(ProfileView::from(&user))
    }

    /// Name and password only; email and role are not editable here.
    pub fn update_user_profile(
        &self,
        token: &str,
        id: UserId,
        command: UpdateProfile,
    ) -> Result<ProfileView, ServiceError> {
        let user_id = self.token_user(token)?;
        let mut store = self.lock()?;
        let actor = resolve_actor(&store, user_id)?;
        target_user(&store, id)?;
        authorize(&actor, Action::AccessProfile { user_id: id })?;

        let changes = command.validate()?;
        let password_digest = changes
            .password
            .as_deref()
            .map(|password| self.credentials.hash(password))
            .transpose()?;
        let user = store.update_user(
            id,
            UpdateUserRequest {
                name: changes.name,
                password_digest,
            },
        )?;
        tracing::info!(user_id = id, actor_id = actor.id, "profile updated");
        Ok(ProfileView::from(&user))
    }

    /// Also removes the user's issues and comments and unassigns them
    /// everywhere else.
    pub fn delete_user(&self, token: &str, id: UserId) -> Result<(), ServiceError> {
        let user_id = self.token_user(token)?;
        let mut store = self.lock()?;
        let actor = resolve_actor(&store, user_id)?;
        target_user(&store, id)?;
        authorize(&actor, Action::AccessProfile { user_id: id })?;

        store.delete_user(id)?;
        tracing::info!(user_id = id, actor_id = actor.id, "user deleted");
        Ok(())
    }

    pub fn set_user_role(
        &self,
        token: &str,
        id: UserId,
        role: Role,
    ) -> Result<ProfileView, ServiceError> {
        let user_id = self.token_user(token)?;
        let mut store = self.lock()?;
        let actor = resolve_actor(&store, user_id)?;
        target_user(&store, id)?;
        authorize(&actor, Action::ManageUsers)?;

        let user = store.set_user_role(id, role)?;
        tracing::info!(user_id = id, role = role.as_str(), "role changed");
        Ok(ProfileView::from(&user))
    }

    pub fn list_users(&self, token: &str) -> Result<Vec<ProfileView>, ServiceError> {
        let user_id = self.token_user(token)?;
        let store = self.lock()?;
        let actor = resolve_actor(&store, user_id)?;
        authorize(&actor, Action::ManageUsers)?;
        Ok(store.list_users()?.iter().map(ProfileView::from).collect())
    }

    /// Operator bootstrap: grants `admin` without a token. `None` when no
    /// account uses the email.
    pub fn promote_admin(&self, email: &str) -> Result<Option<ProfileView>, ServiceError> {
        let mut store = self.lock()?;
        let Some(user) = store.find_user_by_email(email)? else {
            return Ok(None);
        };
        let user = store.set_user_role(user.id, Role::Admin)?;
        tracing::info!(user_id = user.id, "user promoted to admin");
        Ok(Some(ProfileView::from(&user)))
    }
}

fn target_user(store: &SqliteStore, id: UserId) -> Result<User, ServiceError> {
    store
        .get_user(id)?
        .ok_or(ServiceError::not_found(EntityKind::User, id))
}
