pub(crate) const SCHEMA_V1: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS departments (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    name        TEXT NOT NULL,
    parent_id   INTEGER REFERENCES departments(id),
    created_at  TEXT NOT NULL,
    updated_at  TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_departments_parent ON departments(parent_id);

CREATE TABLE IF NOT EXISTS budget_items (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    department_id     INTEGER NOT NULL REFERENCES departments(id) ON DELETE CASCADE,
    cost_code         TEXT NOT NULL,
    allocated_amount  TEXT NOT NULL DEFAULT '0',
    spent_amount      TEXT NOT NULL DEFAULT '0',
    created_at        TEXT NOT NULL,
    updated_at        TEXT NOT NULL,
    UNIQUE(department_id, cost_code)
);

CREATE INDEX IF NOT EXISTS idx_budget_items_department ON budget_items(department_id);
"#;

pub(crate) const CURRENT_VERSION: i32 = 1;

/// Migrations from version N to N+1.
/// Each entry is (from_version, sql).
pub(crate) const MIGRATIONS: &[(i32, &str)] = &[];
