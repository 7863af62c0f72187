#![forbid(unsafe_code)]

//! Role-based authorization. Every mutation check in the service goes through
//! [`authorize`]; nothing else in the workspace compares roles or owner ids.

use crate::ids::UserId;
use crate::model::{Role, User};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<&User> for Actor {
    fn from(user: &User) -> Self {
        Self::new(user.id, user.role)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Update or delete an issue authored by `author_id`.
    MutateIssue { author_id: UserId },
    /// Update or delete a comment authored by `author_id`.
    MutateComment { author_id: UserId },
    /// Create, rename or delete a status or priority.
    ManageTaxonomy,
    /// Create, update or delete a tag.
    ManageTags,
    /// Read, update or delete the profile of `user_id`.
    AccessProfile { user_id: UserId },
    /// Change roles or enumerate every user.
    ManageUsers,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::MutateIssue { .. } => "mutate_issue",
            Action::MutateComment { .. } => "mutate_comment",
            Action::ManageTaxonomy => "manage_taxonomy",
            Action::ManageTags => "manage_tags",
            Action::AccessProfile { .. } => "access_profile",
            Action::ManageUsers => "manage_users",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PolicyDenied {
    pub actor_id: UserId,
    pub action: Action,
}

impl std::fmt::Display for PolicyDenied {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "user {} may not perform {}",
            self.actor_id,
            self.action.as_str()
        )
    }
}

impl std::error::Error for PolicyDenied {}

pub fn can_mutate(actor: &Actor, owner_id: UserId) -> bool {
    actor.is_admin() || actor.id == owner_id
}

pub fn is_allowed(actor: &Actor, action: Action) -> bool {
    match action {
        Action::MutateIssue { author_id } | Action::MutateComment { author_id } => {
            can_mutate(actor, author_id)
        }
        Action::AccessProfile { user_id } => can_mutate(actor, user_id),
        Action::ManageTaxonomy | Action::ManageTags | Action::ManageUsers => actor.is_admin(),
    }
}

pub fn authorize(actor: &Actor, action: Action) -> Result<(), PolicyDenied> {
    if is_allowed(actor, action) {
        Ok(())
    } else {
        Err(PolicyDenied {
            actor_id: actor.id,
            action,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const OWNER: Actor = Actor {
        id: 1,
        role: Role::User,
    };
    const STRANGER: Actor = Actor {
        id: 2,
        role: Role::User,
    };
    const ADMIN: Actor = Actor {
        id: 3,
        role: Role::Admin,
    };

    #[rstest]
    #[case(OWNER, Action::MutateIssue { author_id: 1 }, true)]
    #[case(STRANGER, Action::MutateIssue { author_id: 1 }, false)]
    #[case(ADMIN, Action::MutateIssue { author_id: 1 }, true)]
    #[case(OWNER, Action::MutateComment { author_id: 1 }, true)]
    #[case(STRANGER, Action::MutateComment { author_id: 1 }, false)]
    #[case(ADMIN, Action::MutateComment { author_id: 1 }, true)]
    #[case(OWNER, Action::AccessProfile { user_id: 1 }, true)]
    #[case(STRANGER, Action::AccessProfile { user_id: 1 }, false)]
    #[case(ADMIN, Action::AccessProfile { user_id: 1 }, true)]
    fn ownership_rules(#[case] actor: Actor, #[case] action: Action, #[case] allowed: bool) {
        assert_eq!(is_allowed(&actor, action), allowed);
    }

    #[rstest]
    #[case(Action::ManageTaxonomy)]
    #[case(Action::ManageTags)]
    #[case(Action::ManageUsers)]
    fn admin_only_actions_ignore_ownership(#[case] action: Action) {
        assert!(!is_allowed(&OWNER, action));
        assert!(is_allowed(&ADMIN, action));
    }

    #[test]
    fn authorize_reports_the_denied_action() {
        let err = authorize(&STRANGER, Action::MutateIssue { author_id: 1 })
            .expect_err("stranger must be denied");
        assert_eq!(err.actor_id, 2);
        assert_eq!(err.action.as_str(), "mutate_issue");
    }
}
