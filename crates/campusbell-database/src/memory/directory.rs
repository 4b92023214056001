//! In-memory recipient directory.

use std::collections::BTreeSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use campusbell_core::error::AppError;
use campusbell_core::result::AppResult;
use campusbell_core::types::{ClassId, StudentId, TenantId, UserId};

use super::lock;
use crate::repositories::directory::RecipientDirectory;

#[derive(Debug, Default)]
struct DirectoryData {
    /// (tenant, student, class)
    students: Vec<(TenantId, StudentId, Option<ClassId>)>,
    /// (tenant, student, guardian)
    guardians: Vec<(TenantId, StudentId, UserId)>,
    /// (tenant, class, teacher)
    teachers: Vec<(TenantId, ClassId, UserId)>,
    /// (tenant, user, role)
    roles: Vec<(TenantId, UserId, String)>,
}

/// Directory seeded by tests.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    data: Mutex<DirectoryData>,
    fail_lookups: AtomicBool,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a student, optionally enrolled in a class.
    pub fn add_student(&self, tenant_id: TenantId, student_id: StudentId, class_id: Option<ClassId>) {
        lock(&self.data).students.push((tenant_id, student_id, class_id));
    }

    /// Link a guardian to a student.
    pub fn add_guardian(&self, tenant_id: TenantId, student_id: StudentId, guardian_id: UserId) {
        lock(&self.data).guardians.push((tenant_id, student_id, guardian_id));
    }

    /// Assign a teacher to a class.
    pub fn add_teacher(&self, tenant_id: TenantId, class_id: ClassId, teacher_id: UserId) {
        lock(&self.data).teachers.push((tenant_id, class_id, teacher_id));
    }

    /// Give a user a role.
    pub fn add_user(&self, tenant_id: TenantId, user_id: UserId, role: &str) {
        lock(&self.data).roles.push((tenant_id, user_id, role.to_string()));
    }

    /// Make every lookup return a database error.
    pub fn fail_lookups(&self, fail: bool) {
        self.fail_lookups.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> AppResult<()> {
        if self.fail_lookups.load(Ordering::SeqCst) {
            return Err(AppError::database("directory unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl RecipientDirectory for InMemoryDirectory {
    async fn guardians_of_students(
        &self,
        tenant_id: TenantId,
        student_ids: &[StudentId],
    ) -> AppResult<Vec<UserId>> {
        self.check()?;
        let guardians: BTreeSet<UserId> = lock(&self.data)
            .guardians
            .iter()
            .filter(|(t, s, _)| *t == tenant_id && student_ids.contains(s))
            .map(|(_, _, g)| *g)
            .collect();
        Ok(guardians.into_iter().collect())
    }

    async fn students_in_classes(
        &self,
        tenant_id: TenantId,
        class_ids: Option<&[ClassId]>,
    ) -> AppResult<Vec<StudentId>> {
        self.check()?;
        Ok(lock(&self.data)
            .students
            .iter()
            .filter(|(t, _, class)| {
                *t == tenant_id
                    && match class_ids {
                        Some(ids) => class.is_some_and(|c| ids.contains(&c)),
                        None => true,
                    }
            })
            .map(|(_, s, _)| *s)
            .collect())
    }

    async fn teachers_of_class(
        &self,
        tenant_id: TenantId,
        class_id: ClassId,
    ) -> AppResult<Vec<UserId>> {
        self.check()?;
        Ok(lock(&self.data)
            .teachers
            .iter()
            .filter(|(t, c, _)| *t == tenant_id && *c == class_id)
            .map(|(_, _, u)| *u)
            .collect())
    }

    async fn users_by_role(&self, tenant_id: TenantId, role: &str) -> AppResult<Vec<UserId>> {
        self.check()?;
        Ok(lock(&self.data)
            .roles
            .iter()
            .filter(|(t, _, r)| *t == tenant_id && r == role)
            .map(|(_, u, _)| *u)
            .collect())
    }
}
