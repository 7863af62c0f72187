#![forbid(unsafe_code)]

use super::*;
use rusqlite::{OptionalExtension, Row, params};
use tracker_core::ids::UserId;
use tracker_core::model::{EntityKind, Role, User};
use tracker_core::text::{self, MAX_USER_NAME};

const MAX_DIGEST: usize = 512;

impl SqliteStore {
    pub fn create_user(&mut self, request: CreateUserRequest) -> Result<User, StoreError> {
        let name = text::required_line("name", &request.name, MAX_USER_NAME)?;
        let email = text::email(&request.email)?;
        let password_digest =
            text::required_line("password_digest", &request.password_digest, MAX_DIGEST)?;

        let tx = self.conn.transaction()?;
        if find_user_by_email(&tx, &email)?.is_some() {
            return Err(StoreError::DuplicateEmail);
        }

        let insert = tx.execute(
            "INSERT INTO users(name, email, password_digest, role, created_at_ms) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![name, email, password_digest, Role::User.as_str(), now_ms()],
        );
        if let Err(err) = insert {
            return Err(if is_constraint_violation(&err) {
                StoreError::DuplicateEmail
            } else {
                StoreError::Sql(err)
            });
        }
        let id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(User {
            id,
            name,
            email,
            password_digest,
            role: Role::User,
        })
    }

    pub fn get_user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        user_by_id(&self.conn, id)
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        find_user_by_email(&self.conn, email.trim())
    }

    pub fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, name, email, password_digest, role FROM users ORDER BY id ASC",
        )?;
        let rows = stmt.query_map([], user_from_row)?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Email is not patchable.
    pub fn update_user(
        &mut self,
        id: UserId,
        request: UpdateUserRequest,
    ) -> Result<User, StoreError> {
        let name = request
            .name
            .as_deref()
            .map(|value| text::required_line("name", value, MAX_USER_NAME))
            .transpose()?;
        let password_digest = request
            .password_digest
            .as_deref()
            .map(|value| text::required_line("password_digest", value, MAX_DIGEST))
            .transpose()?;

        let tx = self.conn.transaction()?;
        let mut user = user_by_id(&tx, id)?.ok_or(StoreError::not_found(EntityKind::User, id))?;
        if let Some(name) = name {
            user.name = name;
        }
        if let Some(password_digest) = password_digest {
            user.password_digest = password_digest;
        }
        tx.execute(
            "UPDATE users SET name=?2, password_digest=?3 WHERE id=?1",
            params![id, user.name, user.password_digest],
        )?;
        tx.commit()?;
        Ok(user)
    }

    pub fn set_user_role(&mut self, id: UserId, role: Role) -> Result<User, StoreError> {
        let tx = self.conn.transaction()?;
        let mut user = user_by_id(&tx, id)?.ok_or(StoreError::not_found(EntityKind::User, id))?;
        tx.execute(
            "UPDATE users SET role=?2 WHERE id=?1",
            params![id, role.as_str()],
        )?;
        tx.commit()?;
        user.role = role;
        Ok(user)
    }

    /// Removes the user together with the issues and comments they authored;
    /// issues merely assigned to them become unassigned.
    pub fn delete_user(&mut self, id: UserId) -> Result<(), StoreError> {
        let tx = self.conn.transaction()?;
        let deleted = tx.execute("DELETE FROM users WHERE id=?1", params![id])?;
        if deleted == 0 {
            return Err(StoreError::not_found(EntityKind::User, id));
        }
        tx.commit()?;
        Ok(())
    }
}

pub(super) fn user_by_id(conn: &Connection, id: UserId) -> Result<Option<User>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT id, name, email, password_digest, role FROM users WHERE id=?1",
            params![id],
            user_from_row,
        )
        .optional()?)
}

pub(super) fn user_exists(conn: &Connection, id: UserId) -> Result<bool, StoreError> {
    Ok(conn
        .query_row("SELECT 1 FROM users WHERE id=?1", params![id], |row| {
            row.get::<_, i64>(0)
        })
        .optional()?
        .is_some())
}

fn find_user_by_email(conn: &Connection, email: &str) -> Result<Option<User>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT id, name, email, password_digest, role FROM users WHERE email=?1",
            params![email],
            user_from_row,
        )
        .optional()?)
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let role = row.get::<_, String>(4)?;
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        password_digest: row.get(3)?,
        role: Role::parse(&role).unwrap_or_default(),
    })
}
