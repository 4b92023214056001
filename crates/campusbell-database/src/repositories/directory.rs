//! Read-only relational lookups used to resolve fan-out recipients.
//!
//! The tables queried here (`students`, `student_guardians`,
//! `class_teachers`, `users`) belong to other modules of the platform.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use campusbell_core::error::{AppError, ErrorKind};
use campusbell_core::result::AppResult;
use campusbell_core::types::{ClassId, StudentId, TenantId, UserId};

/// Relational lookups owned by other services.
#[async_trait]
pub trait RecipientDirectory: Send + Sync + std::fmt::Debug + 'static {
    /// Guardian user ids linked to any of the given students.
    async fn guardians_of_students(
        &self,
        tenant_id: TenantId,
        student_ids: &[StudentId],
    ) -> AppResult<Vec<UserId>>;

    /// Students in the given classes, or every student of the tenant when
    /// `class_ids` is `None`.
    async fn students_in_classes(
        &self,
        tenant_id: TenantId,
        class_ids: Option<&[ClassId]>,
    ) -> AppResult<Vec<StudentId>>;

    /// Teachers assigned to a class.
    async fn teachers_of_class(
        &self,
        tenant_id: TenantId,
        class_id: ClassId,
    ) -> AppResult<Vec<UserId>>;

    /// Users whose role equals `role`.
    async fn users_by_role(&self, tenant_id: TenantId, role: &str) -> AppResult<Vec<UserId>>;
}

/// PostgreSQL-backed directory.
#[derive(Debug, Clone)]
pub struct DirectoryRepository {
    pool: PgPool,
}

impl DirectoryRepository {
    /// Create a new directory repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn lookup_error(what: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| AppError::with_source(ErrorKind::Database, format!("Failed to look up {what}"), e)
}

#[async_trait]
impl RecipientDirectory for DirectoryRepository {
    async fn guardians_of_students(
        &self,
        tenant_id: TenantId,
        student_ids: &[StudentId],
    ) -> AppResult<Vec<UserId>> {
        if student_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = student_ids.iter().map(|id| id.into_uuid()).collect();
        sqlx::query_scalar::<_, UserId>(
            "SELECT DISTINCT guardian_id FROM student_guardians \
             WHERE tenant_id = $1 AND student_id = ANY($2)",
        )
        .bind(tenant_id)
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(lookup_error("guardians"))
    }

    async fn students_in_classes(
        &self,
        tenant_id: TenantId,
        class_ids: Option<&[ClassId]>,
    ) -> AppResult<Vec<StudentId>> {
        let query = match class_ids {
            Some(classes) => {
                let ids: Vec<Uuid> = classes.iter().map(|id| id.into_uuid()).collect();
                sqlx::query_scalar::<_, StudentId>(
                    "SELECT id FROM students WHERE tenant_id = $1 AND class_id = ANY($2)",
                )
                .bind(tenant_id)
                .bind(ids)
            }
            None => sqlx::query_scalar::<_, StudentId>(
                "SELECT id FROM students WHERE tenant_id = $1",
            )
            .bind(tenant_id),
        };
        query
            .fetch_all(&self.pool)
            .await
            .map_err(lookup_error("students"))
    }

    async fn teachers_of_class(
        &self,
        tenant_id: TenantId,
        class_id: ClassId,
    ) -> AppResult<Vec<UserId>> {
        sqlx::query_scalar::<_, UserId>(
            "SELECT teacher_id FROM class_teachers WHERE tenant_id = $1 AND class_id = $2",
        )
        .bind(tenant_id)
        .bind(class_id)
        .fetch_all(&self.pool)
        .await
        .map_err(lookup_error("teachers"))
    }

    async fn users_by_role(&self, tenant_id: TenantId, role: &str) -> AppResult<Vec<UserId>> {
        sqlx::query_scalar::<_, UserId>("SELECT id FROM users WHERE tenant_id = $1 AND role = $2")
            .bind(tenant_id)
            .bind(role)
            .fetch_all(&self.pool)
            .await
            .map_err(lookup_error("users by role"))
    }
}
