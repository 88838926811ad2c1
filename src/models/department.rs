use super::BudgetItem;

#[derive(Debug, Clone, PartialEq)]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub parent_id: Option<i64>,
    pub budget_items: Vec<BudgetItem>,
    pub created_at: String,
    pub updated_at: String,
}

/// Insert payload; the store assigns the id.
#[derive(Debug, Clone)]
pub struct NewDepartment {
    pub name: String,
    pub parent_id: Option<i64>,
    pub created_at: String,
}

impl NewDepartment {
    pub fn new(name: String, parent_id: Option<i64>) -> Self {
        Self {
            name,
            parent_id,
            created_at: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Partial update. `parent_id: Some(None)` moves the department to the root.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DepartmentPatch {
    pub name: Option<String>,
    pub parent_id: Option<Option<i64>>,
}

impl DepartmentPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            parent_id: None,
        }
    }

    pub fn reparent(parent_id: Option<i64>) -> Self {
        Self {
            name: None,
            parent_id: Some(parent_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.parent_id.is_none()
    }
}
