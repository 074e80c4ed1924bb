use crate::domain::User;
use crate::errors::{GatorError, GatorResult};
use crate::storage::Store;

pub struct UserService<'a> {
    store: &'a Store,
}

impl<'a> UserService<'a> {
    pub fn new(store: &'a Store) -> Self {
        Self { store }
    }

    pub fn register(&self, name: &str) -> GatorResult<User> {
        let user = User::new(name.to_string());
        self.store
            .users
            .add(&user)
            .map_err(|e| GatorError::persistence("couldn't register user", e))?;
        Ok(user)
    }

    pub fn get(&self, name: &str) -> GatorResult<User> {
        self.store
            .users
            .get_by_name(name)?
            .ok_or_else(|| GatorError::UserNotFound(name.to_string()))
    }

    pub fn list(&self) -> GatorResult<Vec<User>> {
        self.store
            .users
            .get_all()
            .map_err(|e| GatorError::persistence("couldn't get users", e))
    }

    /// Remove every user together with their feeds, follows and posts.
    pub fn reset(&self) -> GatorResult<()> {
        self.store
            .users
            .delete_all()
            .map_err(|e| GatorError::persistence("couldn't delete users", e))
    }
}
