//! User records.
//!
//! Users register with doctors by id; the link list is kept on the user document and updated
//! atomically, so concurrent links never lose each other.

use crate::error::{ClinicError, ClinicResult};
use crate::records::{User, UserUpdate};
use crate::repositories::shared::{self, record_id, required};
use crate::store::{Collection, DocumentStore};
use chrono::Utc;
use clinic_types::{NonEmptyText, RecordId};
use std::sync::Arc;

#[derive(Clone)]
pub struct UserService {
    store: Arc<dyn DocumentStore>,
}

impl UserService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// All users, ordered by id.
    pub fn list_users(&self) -> ClinicResult<Vec<User>> {
        shared::list(self.store.as_ref(), Collection::Users)
    }

    /// Creates a user with no linked doctors.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::InvalidInput`] if any field is blank.
    pub fn add_user(&self, name: &str, login: &str, birth: &str) -> ClinicResult<User> {
        let user = User {
            id: RecordId::new(),
            name: required("name", name)?,
            login: required("login", login)?,
            birth: required("birth", birth)?,
            doctor_ids: Vec::new(),
            created_at: Utc::now(),
        };

        shared::insert(self.store.as_ref(), Collection::Users, user.id, &user)?;
        tracing::info!("created user {}", user.id);
        Ok(user)
    }

    pub fn get_user(&self, id: &str) -> ClinicResult<Option<User>> {
        let id = record_id(id)?;
        shared::find(self.store.as_ref(), Collection::Users, id)
    }

    /// Applies a partial update.
    ///
    /// Returns the updated user, or `None` if no user has this id.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::InvalidInput`] if the update sets nothing or sets a blank value.
    pub fn update_user(&self, id: &str, update: UserUpdate) -> ClinicResult<Option<User>> {
        let id = record_id(id)?;
        if update.is_empty() {
            return Err(ClinicError::InvalidInput(
                "update must set at least one field".into(),
            ));
        }

        let name = optional("name", update.name)?;
        let login = optional("login", update.login)?;
        let birth = optional("birth", update.birth)?;

        shared::update(self.store.as_ref(), Collection::Users, id, |user: &mut User| {
            if let Some(name) = name {
                user.name = name;
            }
            if let Some(login) = login {
                user.login = login;
            }
            if let Some(birth) = birth {
                user.birth = birth;
            }
            Ok(())
        })
    }

    /// Returns `false` if no user has this id.
    pub fn delete_user(&self, id: &str) -> ClinicResult<bool> {
        let id = record_id(id)?;
        let deleted = self.store.delete_record(Collection::Users, id)?;
        if deleted {
            tracing::info!("deleted user {}", id);
        }
        Ok(deleted)
    }

    /// Adds `doctor_id` to the user's doctor list unless it is already there.
    ///
    /// Returns the updated user, or `None` if no user has this id.
    ///
    /// # Errors
    ///
    /// Returns [`ClinicError::InvalidInput`] if the doctor does not exist.
    pub fn link_doctor(&self, user_id: &str, doctor_id: &str) -> ClinicResult<Option<User>> {
        let user_id = record_id(user_id)?;
        let doctor_id = record_id(doctor_id)?;

        if self
            .store
            .find_record(Collection::Doctors, doctor_id)?
            .is_none()
        {
            return Err(ClinicError::InvalidInput(format!(
                "unknown doctor: {doctor_id}"
            )));
        }

        shared::update(
            self.store.as_ref(),
            Collection::Users,
            user_id,
            |user: &mut User| {
                if !user.doctor_ids.contains(&doctor_id) {
                    user.doctor_ids.push(doctor_id);
                }
                Ok(())
            },
        )
    }
}

fn optional(field: &'static str, value: Option<String>) -> ClinicResult<Option<NonEmptyText>> {
    value.map(|v| required(field, &v)).transpose()
}
