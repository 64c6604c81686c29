use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A staff member as seen by the reservation engine. Identity lifecycle is
/// owned elsewhere; this service only reads the directory.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct StaffMember {
    pub id: String,
    pub display_name: String,
    pub is_active: bool,
}
