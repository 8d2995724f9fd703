use crate::db::{DirectoryEntry, DirectoryStorage};
use crate::error::DirectoryError;
use std::fmt;
use tracing::{info, warn};

/// Result of an add request. Every variant renders as the message shown to
/// the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    EmptyField,
    AlreadyExists { username: String },
    Added { username: String, email: String },
}

impl fmt::Display for InsertOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InsertOutcome::EmptyField => write!(f, "Username or email cannot be empty!!"),
            InsertOutcome::AlreadyExists { username } => {
                write!(f, "User {username} already exist")
            }
            InsertOutcome::Added { username, email } => {
                write!(f, "User {username} and {email} have been added successfully")
            }
        }
    }
}

#[derive(Clone)]
pub struct DirectoryService {
    storage: DirectoryStorage,
}

impl DirectoryService {
    pub fn new(storage: DirectoryStorage) -> Self {
        Self { storage }
    }

    /// Substring search on username. An empty match yields the single
    /// `Not Found` sentinel entry, never an empty list.
    pub async fn lookup(&self, keyword: &str) -> Result<Vec<DirectoryEntry>, DirectoryError> {
        let entries = self.storage.search(keyword).await?;
        if entries.is_empty() {
            return Ok(vec![DirectoryEntry::not_found()]);
        }
        Ok(entries)
    }

    /// Check-then-insert. Two racing calls for the same new username can both
    /// pass the check; the primary key rejects the loser, which is reported as
    /// `AlreadyExists`.
    pub async fn insert(
        &self,
        username: &str,
        email: &str,
    ) -> Result<InsertOutcome, DirectoryError> {
        if username.is_empty() || email.is_empty() {
            return Ok(InsertOutcome::EmptyField);
        }

        if self.storage.find_matching(username).await?.is_some() {
            return Ok(InsertOutcome::AlreadyExists {
                username: username.to_string(),
            });
        }

        match self.storage.insert(username, email).await {
            Ok(()) => {
                info!(username, "directory entry added");
                Ok(InsertOutcome::Added {
                    username: username.to_string(),
                    email: email.to_string(),
                })
            }
            Err(e) if e.is_unique_violation() => {
                warn!(username, "lost insert race; username already stored");
                Ok(InsertOutcome::AlreadyExists {
                    username: username.to_string(),
                })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::temp_storage;

    impl InsertOutcome {
        fn is_added(&self) -> bool {
            matches!(self, InsertOutcome::Added { .. })
        }
    }

    #[tokio::test]
    async fn lookup_returns_only_substring_matches() {
        let db = temp_storage().await;
        let svc = DirectoryService::new(db.storage.clone());

        for keyword in ["r", "ra", "do", "s", "cansı"] {
            let entries = svc.lookup(keyword).await.unwrap();
            assert!(!entries.is_empty());
            for entry in &entries {
                assert!(
                    entry.username.contains(keyword),
                    "{} does not contain {}",
                    entry.username,
                    keyword
                );
            }
        }

        let names: Vec<_> = svc
            .lookup("ra")
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.username)
            .collect();
        assert_eq!(names, vec!["dora".to_string(), "uras".to_string()]);
    }

    #[tokio::test]
    async fn lookup_without_match_returns_sentinel() {
        let db = temp_storage().await;
        let svc = DirectoryService::new(db.storage.clone());

        let entries = svc.lookup("zzz").await.unwrap();
        assert_eq!(entries, vec![DirectoryEntry::not_found()]);
        assert!(entries[0].is_not_found());
    }

    #[tokio::test]
    async fn lookup_is_ascii_case_insensitive_on_sqlite() {
        let db = temp_storage().await;
        let svc = DirectoryService::new(db.storage.clone());

        let entries = svc.lookup("DORA").await.unwrap();
        assert_eq!(entries, vec![DirectoryEntry::new("dora", "dora@amazon.com")]);
    }

    #[tokio::test]
    async fn insert_rejects_empty_fields_without_writing() {
        let db = temp_storage().await;
        let svc = DirectoryService::new(db.storage.clone());

        let before = db.storage.count().await.unwrap();
        let a = svc.insert("", "x").await.unwrap();
        let b = svc.insert("x", "").await.unwrap();
        assert_eq!(a, InsertOutcome::EmptyField);
        assert_eq!(b, InsertOutcome::EmptyField);
        assert_eq!(a.to_string(), "Username or email cannot be empty!!");
        assert_eq!(db.storage.count().await.unwrap(), before);
    }

    #[tokio::test]
    async fn insert_existing_username_keeps_original_row() {
        let db = temp_storage().await;
        let svc = DirectoryService::new(db.storage.clone());

        let outcome = svc.insert("dora", "new@x.com").await.unwrap();
        assert_eq!(outcome.to_string(), "User dora already exist");
        assert_eq!(
            db.storage.get_by_username("dora").await.unwrap(),
            Some(DirectoryEntry::new("dora", "dora@amazon.com"))
        );
        assert_eq!(db.storage.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn inserted_entry_is_found_by_lookup() {
        let db = temp_storage().await;
        let svc = DirectoryService::new(db.storage.clone());

        let outcome = svc.insert("newuser", "n@x.com").await.unwrap();
        assert!(outcome.is_added());
        assert_eq!(
            outcome.to_string(),
            "User newuser and n@x.com have been added successfully"
        );

        let entries = svc.lookup("newuser").await.unwrap();
        assert_eq!(entries, vec![DirectoryEntry::new("newuser", "n@x.com")]);
    }

    #[tokio::test]
    async fn quoted_input_is_stored_verbatim() {
        let db = temp_storage().await;
        let svc = DirectoryService::new(db.storage.clone());

        let name = "o'brien'); DROP TABLE users; --";
        assert!(svc.insert(name, "ob@x.com").await.unwrap().is_added());
        assert_eq!(db.storage.count().await.unwrap(), 6);
        assert_eq!(
            svc.lookup("o'brien").await.unwrap(),
            vec![DirectoryEntry::new(name, "ob@x.com")]
        );
    }

    #[tokio::test]
    async fn concurrent_inserts_store_one_row() {
        let db = temp_storage().await;
        let svc = DirectoryService::new(db.storage.clone());

        let (a, b) = tokio::join!(
            svc.insert("race", "a@x.com"),
            svc.insert("race", "b@x.com")
        );
        let outcomes = [a.unwrap(), b.unwrap()];

        assert_eq!(outcomes.iter().filter(|o| o.is_added()).count(), 1);
        assert!(outcomes.iter().any(|o| matches!(
            o,
            InsertOutcome::AlreadyExists { username } if username == "race"
        )));

        let stored = db.storage.search("race").await.unwrap();
        assert_eq!(stored.len(), 1);
        assert!(stored[0].email == "a@x.com" || stored[0].email == "b@x.com");
    }
}
