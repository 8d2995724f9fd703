//! SQL for (re)creating the directory table.
//! Written to run unchanged on both SQLite and MySQL.

pub const DROP_USERS: &str = "DROP TABLE IF EXISTS users";

/// `username` is the primary key; `email` is free-form and nullable.
pub const CREATE_USERS: &str = r#"
CREATE TABLE users (
    username VARCHAR(255) NOT NULL PRIMARY KEY,
    email VARCHAR(255)
)
"#;

/// Rows loaded on every start, after the table is recreated.
pub const SEED_ENTRIES: [(&str, &str); 5] = [
    ("dora", "dora@amazon.com"),
    ("cansın", "cansın@google.com"),
    ("sencer", "sencer@bmw.com"),
    ("uras", "uras@mercedes.com"),
    ("ares", "ares@porsche.com"),
];
