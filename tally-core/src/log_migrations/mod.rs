//! Embedded SQL migrations for `logs.duckdb`
//!
//! Applied in order. `000_migrations.sql` bootstraps the bookkeeping table
//! and must stay first.

pub const LOG_MIGRATIONS: &[(&str, &str)] = &[
    ("000_migrations.sql", include_str!("000_migrations.sql")),
    (
        "001_initial_schema.sql",
        include_str!("001_initial_schema.sql"),
    ),
];
