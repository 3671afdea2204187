use log::info;

use crate::auth::{hash_password, verify_password};
use crate::db::{NewUser, User};
use crate::db_types::Role;
use crate::error::{CoreError, CoreResult, StoreContext};
use crate::store::UserStore;
use crate::validate::{Credentials, ValidationError};

const USER: &str = "user";

pub struct Users<'s, S> {
    store: &'s mut S,
}

impl<'s, S: UserStore> Users<'s, S> {
    pub fn new(store: &'s mut S) -> Self {
        Self { store }
    }

    /// Self-service sign-up. Admin accounts can't be obtained this way.
    pub fn register(&mut self, credentials: Credentials, role: Role) -> CoreResult<User> {
        if role == Role::Admin {
            return Err(ValidationError::Invalid {
                field: "role".to_string(),
                reason: "cannot be self-assigned as admin".to_string(),
            }.into());
        }
        self.create(credentials, role)
    }

    pub fn create(&mut self, credentials: Credentials, role: Role) -> CoreResult<User> {
        let password_hash = hash_password(&credentials.password)?;
        let result = self.store.insert_user(NewUser {
            username: credentials.username,
            password_hash,
            role,
        });

        match result {
            Ok(user) => {
                info!("Created {} user {} ({})", user.role, user.id, user.username);
                Ok(user)
            }
            Err(e) if e.is_unique_violation() => Err(CoreError::Conflict("Username already exists".to_string())),
            Err(e) => Err::<User, _>(e).during("create", USER, None),
        }
    }

    pub fn login(&mut self, credentials: &Credentials) -> CoreResult<User> {
        let user = self.store.find_user_by_name(&credentials.username)
            .during("look up", USER, None)?
            .ok_or(CoreError::InvalidCredentials)?;

        if !verify_password(&credentials.password, &user.password_hash) {
            return Err(CoreError::InvalidCredentials);
        }
        Ok(user)
    }

    pub fn get(&mut self, id: i32) -> CoreResult<User> {
        self.store.get_user(id)
            .during("fetch", USER, Some(id))?
            .ok_or_else(|| CoreError::not_found(USER, id))
    }

    pub fn list(&mut self) -> CoreResult<Vec<User>> {
        self.store.list_users()
            .during("list", "users", None)
    }

    pub fn update_role(&mut self, id: i32, role: Role) -> CoreResult<User> {
        let updated = self.store.update_user_role(id, role)
            .during("update", USER, Some(id))?;
        if updated == 0 {
            return Err(CoreError::not_found(USER, id));
        }
        info!("User {} is now {}", id, role);
        self.get(id)
    }

    pub fn delete(&mut self, id: i32) -> CoreResult<()> {
        let deleted = self.store.delete_user(id)
            .during("delete", USER, Some(id))?;
        if deleted == 0 {
            return Err(CoreError::not_found(USER, id));
        }
        info!("Deleted user {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn credentials(username: &str, password: &str) -> Credentials {
        Credentials { username: username.to_string(), password: password.to_string() }
    }

    #[test]
    fn register_then_login() {
        let mut store = MemoryStore::new();
        let mut users = Users::new(&mut store);

        let created = users.register(credentials("ana", "s3cret"), Role::Analyst).unwrap();
        assert_ne!(created.password_hash, "s3cret");

        let logged_in = users.login(&credentials("ana", "s3cret")).unwrap();
        assert_eq!(logged_in.id, created.id);
        assert_eq!(logged_in.role, Role::Analyst);
    }

    #[test]
    fn wrong_password_and_unknown_user_look_the_same() {
        let mut store = MemoryStore::new();
        let mut users = Users::new(&mut store);
        users.register(credentials("ana", "s3cret"), Role::Analyst).unwrap();

        assert!(matches!(users.login(&credentials("ana", "nope")), Err(CoreError::InvalidCredentials)));
        assert!(matches!(users.login(&credentials("bob", "s3cret")), Err(CoreError::InvalidCredentials)));
    }

    #[test]
    fn duplicate_username_is_a_conflict() {
        let mut store = MemoryStore::new();
        let mut users = Users::new(&mut store);
        users.register(credentials("ana", "one"), Role::Analyst).unwrap();

        let err = users.register(credentials("ana", "two"), Role::EnvironmentalOfficer).unwrap_err();
        assert!(matches!(err, CoreError::Conflict(_)));
    }

    #[test]
    fn admin_cannot_be_self_registered() {
        let mut store = MemoryStore::new();
        let mut users = Users::new(&mut store);

        let err = users.register(credentials("root", "pw"), Role::Admin).unwrap_err();
        assert!(matches!(err, CoreError::Validation(ref e) if e.field() == "role"));

        // The admin bootstrap path goes through create
        let admin = users.create(credentials("root", "pw"), Role::Admin).unwrap();
        assert_eq!(admin.role, Role::Admin);
    }

    #[test]
    fn role_updates_and_deletes_need_an_existing_user() {
        let mut store = MemoryStore::new();
        let mut users = Users::new(&mut store);
        let user = users.register(credentials("ana", "pw"), Role::Analyst).unwrap();

        let promoted = users.update_role(user.id, Role::EnvironmentalOfficer).unwrap();
        assert_eq!(promoted.role, Role::EnvironmentalOfficer);

        users.delete(user.id).unwrap();
        assert_eq!(users.delete(user.id).unwrap_err().missing_entity(), Some("user"));
        assert_eq!(users.update_role(user.id, Role::Admin).unwrap_err().missing_entity(), Some("user"));
    }
}
