use serde::{Deserialize, Serialize};

/// Cost taxonomy shared by all four ledgers.
///
/// Internal categories (labor, management) carry no vendor-side paper trail,
/// so allocation tracking treats them separately from external spend.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CostCategory {
    Labor,
    Subcontractor,
    Materials,
    Equipment,
    Permits,
    Management,
    Tools,
    Software,
    VehicleMaintenance,
    Gas,
    Meals,
    Other,
}

impl CostCategory {
    pub const ALL: [Self; 12] = [
        Self::Labor,
        Self::Subcontractor,
        Self::Materials,
        Self::Equipment,
        Self::Permits,
        Self::Management,
        Self::Tools,
        Self::Software,
        Self::VehicleMaintenance,
        Self::Gas,
        Self::Meals,
        Self::Other,
    ];

    /// Internal cost centers are not expected to have vendor documentation.
    pub fn is_internal(self) -> bool {
        matches!(self, Self::Labor | Self::Management)
    }
}

impl std::fmt::Display for CostCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Labor => write!(f, "labor"),
            Self::Subcontractor => write!(f, "subcontractor"),
            Self::Materials => write!(f, "materials"),
            Self::Equipment => write!(f, "equipment"),
            Self::Permits => write!(f, "permits"),
            Self::Management => write!(f, "management"),
            Self::Tools => write!(f, "tools"),
            Self::Software => write!(f, "software"),
            Self::VehicleMaintenance => write!(f, "vehicle_maintenance"),
            Self::Gas => write!(f, "gas"),
            Self::Meals => write!(f, "meals"),
            Self::Other => write!(f, "other"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn internal_split() {
        assert!(CostCategory::Labor.is_internal());
        assert!(CostCategory::Management.is_internal());
        assert!(!CostCategory::Materials.is_internal());
        assert!(!CostCategory::Subcontractor.is_internal());
        assert_eq!(CostCategory::ALL.iter().filter(|c| c.is_internal()).count(), 2);
    }

    #[test]
    fn display_matches_serde() {
        for category in CostCategory::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json.trim_matches('"'), category.to_string());
        }
    }
}
