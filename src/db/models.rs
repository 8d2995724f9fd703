use sqlx::FromRow;

pub const NOT_FOUND: &str = "Not Found";

/// One row of the `users` table.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct DirectoryEntry {
    pub username: String,
    pub email: String,
}

impl DirectoryEntry {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
        }
    }

    /// Placeholder row returned by a lookup that matched nothing.
    pub fn not_found() -> Self {
        Self::new(NOT_FOUND, NOT_FOUND)
    }

    pub fn is_not_found(&self) -> bool {
        self.username == NOT_FOUND && self.email == NOT_FOUND
    }
}

impl From<(&str, &str)> for DirectoryEntry {
    fn from((username, email): (&str, &str)) -> Self {
        Self::new(username, email)
    }
}
