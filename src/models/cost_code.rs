use serde::{Deserialize, Serialize};

/// Fixed budget categories. Declaration order is the display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CostCode {
    Supplies,
    Hardware,
    Salary,
    Travel,
    Utilities,
    Marketing,
    Training,
    Software,
}

impl CostCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Supplies => "supplies",
            Self::Hardware => "hardware",
            Self::Salary => "salary",
            Self::Travel => "travel",
            Self::Utilities => "utilities",
            Self::Marketing => "marketing",
            Self::Training => "training",
            Self::Software => "software",
        }
    }

    /// Capitalised name for tables and detail panels.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Supplies => "Supplies",
            Self::Hardware => "Hardware",
            Self::Salary => "Salary",
            Self::Travel => "Travel",
            Self::Utilities => "Utilities",
            Self::Marketing => "Marketing",
            Self::Training => "Training",
            Self::Software => "Software",
        }
    }

    /// Strict parse: unknown codes are rejected rather than defaulted.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "supplies" => Some(Self::Supplies),
            "hardware" => Some(Self::Hardware),
            "salary" => Some(Self::Salary),
            "travel" => Some(Self::Travel),
            "utilities" => Some(Self::Utilities),
            "marketing" => Some(Self::Marketing),
            "training" => Some(Self::Training),
            "software" => Some(Self::Software),
            _ => None,
        }
    }

    pub fn all() -> &'static [CostCode] {
        &[
            Self::Supplies,
            Self::Hardware,
            Self::Salary,
            Self::Travel,
            Self::Utilities,
            Self::Marketing,
            Self::Training,
            Self::Software,
        ]
    }
}

impl std::fmt::Display for CostCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
