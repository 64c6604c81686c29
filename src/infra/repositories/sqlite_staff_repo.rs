use crate::domain::models::staff::StaffMember;
use crate::domain::ports::StaffDirectory;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteStaffRepo {
    pool: SqlitePool,
}

impl SqliteStaffRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StaffDirectory for SqliteStaffRepo {
    async fn list_active(&self) -> Result<Vec<StaffMember>, AppError> {
        sqlx::query_as::<_, StaffMember>("SELECT * FROM staff WHERE is_active = TRUE ORDER BY display_name ASC")
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_active(&self, id: &str) -> Result<Option<StaffMember>, AppError> {
        sqlx::query_as::<_, StaffMember>("SELECT * FROM staff WHERE id = ? AND is_active = TRUE")
            .bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
}
