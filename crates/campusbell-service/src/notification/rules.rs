//! Recipient resolution: who should receive a notification for an event.

use std::collections::BTreeSet;
use std::sync::Arc;

use campusbell_core::events::AudienceTag;
use campusbell_core::result::AppResult;
use campusbell_core::types::{ClassId, StudentId, TenantId, UserId};
use campusbell_database::RecipientDirectory;

/// Resolves recipient sets through the relational directory.
///
/// Every result is a set, so a user reachable through several paths
/// (a guardian of two students, a teacher who is also a guardian) appears
/// once.
#[derive(Debug, Clone)]
pub struct RecipientResolver {
    directory: Arc<dyn RecipientDirectory>,
}

impl RecipientResolver {
    /// Creates a new resolver.
    pub fn new(directory: Arc<dyn RecipientDirectory>) -> Self {
        Self { directory }
    }

    /// Guardians linked to one student.
    pub async fn guardians_of_student(
        &self,
        tenant_id: TenantId,
        student_id: StudentId,
    ) -> AppResult<BTreeSet<UserId>> {
        let guardians = self
            .directory
            .guardians_of_students(tenant_id, &[student_id])
            .await?;
        Ok(guardians.into_iter().collect())
    }

    /// Guardians of every student in the given classes.
    ///
    /// `None` or an empty list means every student of the tenant.
    pub async fn guardians_of_classes(
        &self,
        tenant_id: TenantId,
        class_ids: Option<&[ClassId]>,
    ) -> AppResult<BTreeSet<UserId>> {
        let scope = class_ids.filter(|ids| !ids.is_empty());
        let students = self.directory.students_in_classes(tenant_id, scope).await?;
        if students.is_empty() {
            return Ok(BTreeSet::new());
        }
        let guardians = self
            .directory
            .guardians_of_students(tenant_id, &students)
            .await?;
        Ok(guardians.into_iter().collect())
    }

    /// Teachers assigned to a class.
    pub async fn teachers_of_class(
        &self,
        tenant_id: TenantId,
        class_id: ClassId,
    ) -> AppResult<BTreeSet<UserId>> {
        let teachers = self.directory.teachers_of_class(tenant_id, class_id).await?;
        Ok(teachers.into_iter().collect())
    }

    /// Union of the recipients of every audience tag.
    ///
    /// `guardians` resolves through the (optionally class-scoped) students;
    /// any other tag selects users whose role equals the tag.
    pub async fn announcement_audience(
        &self,
        tenant_id: TenantId,
        audience: &[AudienceTag],
        class_ids: Option<&[ClassId]>,
    ) -> AppResult<BTreeSet<UserId>> {
        let mut recipients = BTreeSet::new();
        let unique_tags: BTreeSet<&str> = audience.iter().map(AudienceTag::as_str).collect();

        for tag in unique_tags {
            match AudienceTag::from(tag) {
                AudienceTag::Guardians => {
                    recipients.extend(self.guardians_of_classes(tenant_id, class_ids).await?);
                }
                AudienceTag::Role(role) => {
                    recipients.extend(self.directory.users_by_role(tenant_id, &role).await?);
                }
            }
        }

        Ok(recipients)
    }
}
