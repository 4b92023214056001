//! Student diary events.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{StudentId, TenantId};

/// A diary entry was created or edited for a student.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiaryUpdated {
    /// Tenant of the student.
    pub tenant_id: TenantId,
    /// The student whose diary changed.
    pub student_id: StudentId,
    /// Student display name.
    pub student_name: String,
    /// Day the diary entry covers.
    pub date: NaiveDate,
}
