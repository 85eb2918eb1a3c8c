//! Roster column layout configuration.
//!
//! Describes which CSV headers hold which guardian and child fields. The
//! default layout matches the registration form export; other exports can
//! be described in YAML.
//!
//! # Example YAML
//!
//! ```yaml
//! version: "1.0"
//! max_children: 4
//! guardian:
//!   primary_name: "Parent 1 Name"
//!   primary_phone: "Parent 1 Phone"
//!   primary_wechat: "Parent 1 WeChat"
//!   primary_email: "Parent 1 Email"
//!   secondary_name: "Parent 2 Name"
//!   authorized_pickup: "Authorized Pickup"
//! child_name_template: "Child {n} Name"
//! child_grade_template: "Child {n} Grade"
//! required_headers:
//!   - "Parent 1 Name"
//!   - "Parent 1 Phone"
//!   - "Parent 1 WeChat"
//!   - "Parent 1 Email"
//!   - "Parent 2 Name"
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, RosterError};

/// Placeholder replaced by the 1-based slot number in child header templates.
pub const SLOT_PLACEHOLDER: &str = "{n}";

/// Number of child slots on the registration form.
pub const DEFAULT_MAX_CHILDREN: usize = 4;

/// Header names for the guardian-level fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardianColumns {
    /// Guardian 1 name, stored as `father_name`.
    pub primary_name: String,
    pub primary_phone: String,
    pub primary_wechat: String,
    pub primary_email: String,
    /// Guardian 2 name, stored as `mother_name`.
    pub secondary_name: String,
    pub authorized_pickup: String,
}

impl Default for GuardianColumns {
    fn default() -> Self {
        Self {
            primary_name: "家长1 姓名（中/英，比如， 张三/Sam Zhang）".to_string(),
            primary_phone: "家长1 手机号码".to_string(),
            primary_wechat: "家长1 微信ID".to_string(),
            primary_email: "家长1 电子邮箱".to_string(),
            secondary_name: "家长2 姓名（中/英， 比如， 李华/Hua Li）".to_string(),
            authorized_pickup: "authorized_pickup_person".to_string(),
        }
    }
}

impl GuardianColumns {
    /// The fixed guardian headers every export must carry.
    ///
    /// `authorized_pickup` is left out: older exports predate it.
    pub fn fixed_headers(&self) -> Vec<String> {
        vec![
            self.primary_name.clone(),
            self.primary_phone.clone(),
            self.primary_wechat.clone(),
            self.primary_email.clone(),
            self.secondary_name.clone(),
        ]
    }
}

/// Full description of a roster CSV layout.
///
/// # Examples
///
/// ```
/// use checkin_roster_core::RosterLayout;
///
/// let layout = RosterLayout::default().with_max_children(2);
/// assert_eq!(layout.child_grade_header(2), "孩子2 班级");
/// assert!(layout.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterLayout {
    /// Configuration format version (e.g., `"1.0"`).
    pub version: String,
    /// Number of child slots to read per guardian row.
    pub max_children: usize,
    pub guardian: GuardianColumns,
    /// Header for a child's name; `{n}` is replaced by the slot number.
    pub child_name_template: String,
    /// Header for a child's grade; `{n}` is replaced by the slot number.
    pub child_grade_template: String,
    /// Headers that must appear in the file. Missing any of them aborts
    /// the import before rows are processed.
    pub required_headers: Vec<String>,
}

impl Default for RosterLayout {
    fn default() -> Self {
        let guardian = GuardianColumns::default();
        Self {
            version: "1.0".to_string(),
            max_children: DEFAULT_MAX_CHILDREN,
            required_headers: guardian.fixed_headers(),
            guardian,
            child_name_template: "孩子{n} 姓名 （中/英）".to_string(),
            child_grade_template: "孩子{n} 班级".to_string(),
        }
    }
}

impl RosterLayout {
    /// Loads a layout from a YAML file and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](RosterError::IoError) if the file cannot be read,
    /// [`YamlError`](RosterError::YamlError) if parsing fails, or
    /// [`InvalidLayout`](RosterError::InvalidLayout) if validation fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let layout: Self = serde_yaml::from_reader(reader)?;
        layout.validate()?;
        Ok(layout)
    }

    /// Saves the layout as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Returns a copy of this layout with a different slot count.
    pub fn with_max_children(mut self, max_children: usize) -> Self {
        self.max_children = max_children;
        self
    }

    /// Checks that the layout can address at least one child slot.
    pub fn validate(&self) -> Result<()> {
        if self.max_children == 0 {
            return Err(RosterError::InvalidLayout(
                "max_children must be at least 1".to_string(),
            ));
        }
        for (field, template) in [
            ("child_name_template", &self.child_name_template),
            ("child_grade_template", &self.child_grade_template),
        ] {
            if !template.contains(SLOT_PLACEHOLDER) {
                return Err(RosterError::InvalidLayout(format!(
                    "{field} '{template}' has no {SLOT_PLACEHOLDER} placeholder"
                )));
            }
        }
        Ok(())
    }

    /// Header of the name column for a 1-based child slot.
    pub fn child_name_header(&self, slot: usize) -> String {
        self.child_name_template
            .replace(SLOT_PLACEHOLDER, &slot.to_string())
    }

    /// Header of the grade column for a 1-based child slot.
    pub fn child_grade_header(&self, slot: usize) -> String {
        self.child_grade_template
            .replace(SLOT_PLACEHOLDER, &slot.to_string())
    }
}
