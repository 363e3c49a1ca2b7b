/// Record-store primary keys are SQLite `INTEGER PRIMARY KEY AUTOINCREMENT`.
pub type DbId = i64;

/// Record-store timestamps are naive UTC (`CURRENT_TIMESTAMP`).
pub type Timestamp = chrono::NaiveDateTime;
