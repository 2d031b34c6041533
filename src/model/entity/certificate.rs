use crate::model::repo::ResourceTyped;
use crate::model::{ModelManager, error::DatabaseResult};
use crate::web::AuthenticatedUser;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::prelude::FromRow;
use uuid::Uuid;

/// Issued exactly once per completed enrollment, never mutated.
/// UNIQUE (enrollment_id) makes the issuance race (two simultaneous
/// completion submits) collapse into a single row.
#[derive(Debug, Serialize, Deserialize, FromRow, utoipa::ToSchema)]
pub struct Certificate {
    id: Uuid,
    enrollment_id: Uuid,
    certificate_number: String,
    issued_at: DateTime<Utc>,
}

impl ResourceTyped for Certificate {
    fn get_resource_type() -> crate::model::ResourceType {
        crate::model::ResourceType::Certificate
    }
}

impl Certificate {
    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn enrollment_id(&self) -> Uuid {
        self.enrollment_id
    }

    pub fn certificate_number(&self) -> &str {
        &self.certificate_number
    }

    pub fn issued_at(&self) -> &DateTime<Utc> {
        &self.issued_at
    }
}

impl Certificate {
    pub async fn find_by_id(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM certificates WHERE id = $1")
            .bind(id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn find_by_enrollment(
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
        enrollment_id: Uuid,
    ) -> DatabaseResult<Option<Self>> {
        let result = sqlx::query_as("SELECT * FROM certificates WHERE enrollment_id = $1")
            .bind(enrollment_id)
            .fetch_optional(mm.executor())
            .await?;
        Ok(result)
    }

    pub async fn all_by_student(
        mm: &ModelManager,
        actor: &AuthenticatedUser,
    ) -> DatabaseResult<Vec<Self>> {
        let result = sqlx::query_as(
            r#"
            SELECT c.*
            FROM certificates c
            JOIN enrollments e ON e.id = c.enrollment_id
            WHERE e.student_id = $1
            ORDER BY c.issued_at DESC
            "#,
        )
        .bind(actor.user_id())
        .fetch_all(mm.executor())
        .await?;
        Ok(result)
    }

    /// Who the certificate belongs to, through its enrollment.
    pub async fn student_id(
        &self,
        mm: &ModelManager,
        _actor: &AuthenticatedUser,
    ) -> DatabaseResult<Uuid> {
        let student: Uuid = sqlx::query_scalar("SELECT student_id FROM enrollments WHERE id = $1")
            .bind(self.enrollment_id)
            .fetch_one(mm.executor())
            .await?;
        Ok(student)
    }
}
