//! Department and month discovery.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::config::FieldNames;
use crate::domain::record::{text_field, RawRecord};

/// The iteration grid for one run: departments in first-appearance order
/// and months in lexicographic (chronological) order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GroupGrid {
    pub departments: Vec<String>,
    pub months: Vec<String>,
    /// Distinct departments seen beyond `limit`.
    pub dropped_departments: usize,
}

impl GroupGrid {
    pub fn is_empty(&self) -> bool {
        self.departments.is_empty()
    }

    pub fn department_index(&self, department: &str) -> Option<usize> {
        self.departments.iter().position(|d| d == department)
    }

    pub fn month_index(&self, month: &str) -> Option<usize> {
        self.months.binary_search_by(|m| m.as_str().cmp(month)).ok()
    }
}

/// Extract up to `limit` departments and every distinct month.
///
/// Records with an empty or absent key are skipped for that key only.
pub fn extract_groups(records: &[RawRecord], fields: &FieldNames, limit: usize) -> GroupGrid {
    let mut seen = HashSet::new();
    let mut departments = Vec::new();
    let mut dropped_departments = 0;
    let mut months = BTreeSet::new();

    for record in records {
        if let Some(department) = text_field(record, &fields.department) {
            if seen.insert(department) {
                if departments.len() < limit {
                    departments.push(department.to_string());
                } else {
                    dropped_departments += 1;
                }
            }
        }
        if let Some(month) = text_field(record, &fields.month) {
            months.insert(month);
        }
    }

    GroupGrid {
        departments,
        months: months.into_iter().map(str::to_string).collect(),
        dropped_departments,
    }
}
