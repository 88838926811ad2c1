#[cfg(test)]
mod memory;
mod schema;
mod store;

use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::Path;
use std::str::FromStr;

use crate::models::*;

#[cfg(test)]
pub(crate) use memory::MemoryStore;
pub(crate) use store::DepartmentStore;

const MUTATION_SAVEPOINT: &str = "budgettier_mutation";

pub(crate) struct Database {
    conn: Connection,
}

impl Database {
    pub(crate) fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open database: {}", path.display()))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")
            .context("Failed to set database pragmas")?;
        let mut db = Self { conn };
        db.migrate().context("Database migration failed")?;
        tracing::debug!(path = %path.display(), "database opened");
        Ok(db)
    }

    #[cfg(test)]
    pub(crate) fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let mut db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&mut self) -> Result<()> {
        let has_version_table: bool = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
            [],
            |row| row.get(0),
        )?;

        if !has_version_table {
            // Fresh database - apply full schema
            self.conn.execute_batch(schema::SCHEMA_V1)?;
            self.conn.execute(
                "INSERT INTO schema_version (version) VALUES (?1)",
                params![schema::CURRENT_VERSION],
            )?;
            return Ok(());
        }

        let current: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })
            .unwrap_or(0);

        for &(from_version, sql) in schema::MIGRATIONS {
            if current <= from_version {
                self.conn.execute_batch(sql)?;
            }
        }

        if current < schema::CURRENT_VERSION {
            self.conn.execute(
                "UPDATE schema_version SET version = ?1",
                params![schema::CURRENT_VERSION],
            )?;
        }

        Ok(())
    }

    // ── Row mapping ───────────────────────────────────────────

    fn query_departments<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<Department>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, department_from_row)?;
        let mut departments = rows.collect::<std::result::Result<Vec<_>, _>>()?;

        let mut items = self.budget_items_by_department()?;
        for dept in &mut departments {
            dept.budget_items = items.remove(&dept.id).unwrap_or_default();
        }
        Ok(departments)
    }

    fn budget_items_by_department(&self) -> Result<HashMap<i64, Vec<BudgetItem>>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, department_id, cost_code, allocated_amount, spent_amount
             FROM budget_items ORDER BY department_id, id",
        )?;
        let rows = stmt.query_map([], budget_item_from_row)?;
        let mut grouped: HashMap<i64, Vec<BudgetItem>> = HashMap::new();
        for item in rows {
            let item = item?;
            grouped.entry(item.department_id).or_default().push(item);
        }
        Ok(grouped)
    }
}

fn department_from_row(row: &Row<'_>) -> rusqlite::Result<Department> {
    Ok(Department {
        id: row.get(0)?,
        name: row.get(1)?,
        parent_id: row.get(2)?,
        budget_items: Vec::new(),
        created_at: row.get(3)?,
        updated_at: row.get(4)?,
    })
}

fn budget_item_from_row(row: &Row<'_>) -> rusqlite::Result<BudgetItem> {
    let code: String = row.get(2)?;
    let cost_code = CostCode::parse(&code).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown cost code: {code}").into(),
        )
    })?;
    let allocated: String = row.get(3)?;
    let spent: String = row.get(4)?;
    Ok(BudgetItem {
        id: row.get(0)?,
        department_id: row.get(1)?,
        cost_code,
        allocated_amount: Decimal::from_str(&allocated).unwrap_or_default(),
        spent_amount: Decimal::from_str(&spent).unwrap_or_default(),
    })
}

impl DepartmentStore for Database {
    fn list_departments_flat(&self) -> Result<Vec<Department>> {
        self.query_departments(
            "SELECT id, name, parent_id, created_at, updated_at FROM departments ORDER BY id",
            [],
        )
    }

    fn get_department(&self, id: i64) -> Result<Option<Department>> {
        let result = self.conn.query_row(
            "SELECT id, name, parent_id, created_at, updated_at FROM departments WHERE id = ?1",
            params![id],
            department_from_row,
        );
        let mut dept = match result {
            Ok(d) => d,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let mut stmt = self.conn.prepare(
            "SELECT id, department_id, cost_code, allocated_amount, spent_amount
             FROM budget_items WHERE department_id = ?1 ORDER BY id",
        )?;
        let rows = stmt.query_map(params![id], budget_item_from_row)?;
        dept.budget_items = rows.collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(Some(dept))
    }

    fn get_children(&self, parent_id: i64) -> Result<Vec<Department>> {
        self.query_departments(
            "SELECT id, name, parent_id, created_at, updated_at FROM departments
             WHERE parent_id = ?1 ORDER BY id",
            params![parent_id],
        )
    }

    fn count_children(&self, parent_id: i64) -> Result<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM departments WHERE parent_id = ?1",
            params![parent_id],
            |row| row.get(0),
        )?)
    }

    fn insert_department(&mut self, dept: &NewDepartment) -> Result<Department> {
        self.conn.execute(
            "INSERT INTO departments (name, parent_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?3)",
            params![dept.name, dept.parent_id, dept.created_at],
        )?;
        Ok(Department {
            id: self.conn.last_insert_rowid(),
            name: dept.name.clone(),
            parent_id: dept.parent_id,
            budget_items: Vec::new(),
            created_at: dept.created_at.clone(),
            updated_at: dept.created_at.clone(),
        })
    }

    fn update_department(&mut self, id: i64, patch: &DepartmentPatch) -> Result<()> {
        if patch.is_empty() {
            return Ok(());
        }
        let now = chrono::Utc::now().to_rfc3339();
        let sp = self.conn.savepoint()?;
        if let Some(name) = &patch.name {
            sp.execute(
                "UPDATE departments SET name = ?1, updated_at = ?2 WHERE id = ?3",
                params![name, now, id],
            )?;
        }
        if let Some(parent_id) = patch.parent_id {
            sp.execute(
                "UPDATE departments SET parent_id = ?1, updated_at = ?2 WHERE id = ?3",
                params![parent_id, now, id],
            )?;
        }
        sp.commit()?;
        Ok(())
    }

    fn delete_department(&mut self, id: i64) -> Result<()> {
        let sp = self.conn.savepoint()?;
        sp.execute(
            "DELETE FROM budget_items WHERE department_id = ?1",
            params![id],
        )?;
        sp.execute("DELETE FROM departments WHERE id = ?1", params![id])?;
        sp.commit()?;
        Ok(())
    }

    fn replace_budget_items(&mut self, department_id: i64, items: &[BudgetLine]) -> Result<()> {
        let now = chrono::Utc::now().to_rfc3339();
        let sp = self.conn.savepoint()?;
        sp.execute(
            "DELETE FROM budget_items WHERE department_id = ?1",
            params![department_id],
        )?;
        for item in items {
            sp.execute(
                "INSERT INTO budget_items (department_id, cost_code, allocated_amount, spent_amount, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
                params![
                    department_id,
                    item.cost_code.as_str(),
                    item.allocated_amount.to_string(),
                    item.spent_amount.to_string(),
                    now,
                ],
            )?;
        }
        sp.commit()?;
        Ok(())
    }

    fn clear(&mut self) -> Result<()> {
        self.conn.execute_batch(
            "DELETE FROM budget_items;
             DELETE FROM departments;
             DELETE FROM sqlite_sequence WHERE name IN ('departments', 'budget_items');",
        )?;
        Ok(())
    }

    fn atomically<T, E, F>(&mut self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Self) -> std::result::Result<T, E>,
        E: From<anyhow::Error>,
    {
        self.conn
            .execute_batch(&format!("SAVEPOINT {MUTATION_SAVEPOINT}"))
            .map_err(|e| E::from(anyhow::Error::from(e)))?;
        match f(self) {
            Ok(value) => {
                self.conn
                    .execute_batch(&format!("RELEASE {MUTATION_SAVEPOINT}"))
                    .map_err(|e| E::from(anyhow::Error::from(e)))?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback) = self.conn.execute_batch(&format!(
                    "ROLLBACK TO {MUTATION_SAVEPOINT}; RELEASE {MUTATION_SAVEPOINT}"
                )) {
                    tracing::error!(error = %rollback, "failed to roll back mutation");
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests;
