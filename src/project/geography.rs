use serde::{Deserialize, Serialize};

/// Group name marking the default planning boundary.
pub const DEFAULT_BOUNDARY_GROUP: &str = "default-boundary";

/// A planning region that precalculated totals are computed for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geography {
    pub geography_id: String,
    #[serde(default)]
    pub display: String,
    #[serde(default)]
    pub groups: Vec<String>,
    /// Whether totals exist for this geography.
    #[serde(default = "precalc_default")]
    pub precalc: bool,
}

fn precalc_default() -> bool { true }

impl Geography {
    pub fn new(geography_id: impl Into<String>, display: impl Into<String>) -> Self {
        Self { geography_id: geography_id.into(), display: display.into(), groups: Vec::new(), precalc: true }
    }

    pub fn with_group(mut self, group: impl Into<String>) -> Self {
        self.groups.push(group.into());
        self
    }

    #[inline] pub fn in_group(&self, group: &str) -> bool { self.groups.iter().any(|g| g == group) }
}
