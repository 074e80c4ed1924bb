use crate::domain::User;
use crate::errors::{GatorError, GatorResult};
use crate::storage::sqlite::connection::is_unique_violation;
use crate::storage::sqlite::SqliteStorage;
use crate::storage::traits::UserRepository;

pub struct SqliteUserRepository {
    storage: SqliteStorage,
}

impl SqliteUserRepository {
    pub fn new(storage: SqliteStorage) -> Self {
        Self { storage }
    }
}

fn user_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        created_at: row.get(2)?,
        updated_at: row.get(3)?,
    })
}

impl UserRepository for SqliteUserRepository {
    fn add(&self, user: &User) -> GatorResult<()> {
        let conn = self.storage.connection()?;
        let inserted = conn.execute(
            "INSERT INTO users (id, name, created_at, updated_at) VALUES (?1, ?2, ?3, ?4)",
            (&user.id, &user.name, &user.created_at, &user.updated_at),
        );

        match inserted {
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => {
                Err(GatorError::UserAlreadyExists(user.name.clone()))
            }
            Err(e) => Err(GatorError::from(e)),
        }
    }

    fn get_by_name(&self, name: &str) -> GatorResult<Option<User>> {
        let conn = self.storage.connection()?;
        let mut stmt =
            conn.prepare("SELECT id, name, created_at, updated_at FROM users WHERE name = ?1")?;

        match stmt.query_row([name], user_from_row) {
            Ok(user) => Ok(Some(user)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(GatorError::from(e)),
        }
    }

    fn get_all(&self) -> GatorResult<Vec<User>> {
        let conn = self.storage.connection()?;
        let mut stmt =
            conn.prepare("SELECT id, name, created_at, updated_at FROM users ORDER BY name")?;

        let users = stmt.query_map([], user_from_row)?;
        users.collect::<Result<Vec<_>, _>>().map_err(GatorError::from)
    }

    fn delete_all(&self) -> GatorResult<()> {
        let conn = self.storage.connection()?;
        conn.execute("DELETE FROM users", [])?;
        Ok(())
    }
}
