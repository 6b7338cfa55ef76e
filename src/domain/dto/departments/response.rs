use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::domain::entities::departments::department::Department;

/// 부서 응답 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepartmentResponse {
    pub id: String,
    pub name: String,
    pub manager_id: String,
    pub collaborator_ids: Vec<String>,
    pub created_at: DateTime,
}

impl From<Department> for DepartmentResponse {
    fn from(department: Department) -> Self {
        let Department {
            id,
            name,
            manager_id,
            collaborator_ids,
            created_at,
        } = department;

        Self {
            id: id.map(|id| id.to_hex()).unwrap_or_default(),
            name,
            manager_id,
            collaborator_ids,
            created_at,
        }
    }
}

/// 부서 생성 응답 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateDepartmentResponse {
    pub department: DepartmentResponse,
    pub message: String,
}
