//! Roster data model.
//!
//! A [`GuardianRecord`] is the transient, parsed form of one CSV row. It fans
//! out into zero or more [`StudentRecord`]s, one per complete child slot.
//! [`CheckoutRecord`] mirrors the `checkouts` table that the pickup service
//! writes to.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::grade::normalize_grade;

/// One child slot of a guardian row.
///
/// `slot` is 1-based, matching the numbering in the CSV headers.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChildSlot {
    pub slot: usize,
    pub name: Option<String>,
    pub grade: Option<String>,
}

impl ChildSlot {
    /// Returns `true` if both the name and the raw grade are present.
    pub fn is_complete(&self) -> bool {
        self.name.is_some() && self.grade.is_some()
    }

    /// Returns `true` if neither the name nor the grade is present.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.grade.is_none()
    }
}

/// A parsed guardian row: family contact details plus child slots.
///
/// Every field is `None` when the source cell is missing or blank.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GuardianRecord {
    pub father_name: Option<String>,
    pub phone_number: Option<String>,
    pub wechat_id: Option<String>,
    pub email: Option<String>,
    pub mother_name: Option<String>,
    pub authorized_pickup_person: Option<String>,
    pub children: Vec<ChildSlot>,
}

impl GuardianRecord {
    /// Expands this guardian row into one [`StudentRecord`] per complete slot.
    ///
    /// Slots missing either a name or a grade are skipped. Output order
    /// follows slot order.
    pub fn students(&self) -> Vec<StudentRecord> {
        self.children
            .iter()
            .filter_map(|child| {
                let (Some(name), Some(grade)) = (&child.name, &child.grade) else {
                    if !child.is_empty() {
                        debug!(slot = child.slot, "skipping incomplete child slot");
                    }
                    return None;
                };
                Some(StudentRecord {
                    id: None,
                    name: name.clone(),
                    grade: normalize_grade(Some(grade)),
                    father_name: self.father_name.clone(),
                    mother_name: self.mother_name.clone(),
                    phone_number: self.phone_number.clone(),
                    wechat_id: self.wechat_id.clone(),
                    email: self.email.clone(),
                    authorized_pickup_person: self.authorized_pickup_person.clone(),
                })
            })
            .collect()
    }

    /// Number of slots that carry a name or a grade but not both.
    pub fn incomplete_slots(&self) -> usize {
        self.children
            .iter()
            .filter(|c| !c.is_complete() && !c.is_empty())
            .count()
    }
}

/// A row of the `students` table.
///
/// `id` is `None` until the record has been persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StudentRecord {
    pub id: Option<i64>,
    pub name: String,
    pub grade: Option<String>,
    pub father_name: Option<String>,
    pub mother_name: Option<String>,
    pub phone_number: Option<String>,
    pub wechat_id: Option<String>,
    pub email: Option<String>,
    pub authorized_pickup_person: Option<String>,
}

/// A row of the `checkouts` table.
///
/// Not produced by the importer; declared so callers can read pickup
/// events recorded by the check-out service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRecord {
    pub id: i64,
    pub student_id: i64,
    /// Timestamp as written by the check-out service.
    pub time: String,
    pub checked_out_by: Option<String>,
    pub pickup_person_name: Option<String>,
}
