use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::domain::entities::collaborators::collaborator::{Collaborator, Level};

/// 협업자 응답 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaboratorResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub department: String,
    pub job_title: String,
    pub admission_date: String,
    pub level: Level,
    pub manager_id: String,
    pub salary: String,
    pub status: String,
    pub active: bool,
    pub created_at: DateTime,
}

impl From<Collaborator> for CollaboratorResponse {
    fn from(collaborator: Collaborator) -> Self {
        let Collaborator {
            id,
            name,
            email,
            department,
            job_title,
            admission_date,
            level,
            manager_id,
            salary,
            status,
            active,
            created_at,
        } = collaborator;

        Self {
            id: id.map(|id| id.to_hex()).unwrap_or_default(),
            name,
            email,
            department,
            job_title,
            admission_date,
            level,
            manager_id,
            salary,
            status,
            active,
            created_at,
        }
    }
}

/// 협업자 생성 응답 DTO
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateCollaboratorResponse {
    pub collaborator: CollaboratorResponse,
    pub message: String,
}

/// 협업자 일괄 삭제 응답 DTO
///
/// 일괄 경로는 부서 측 정리를 생략하므로 그 사실을 응답에 명시합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkDeleteResponse {
    /// 삭제 배치에 포함된 id 수
    pub requested: usize,
    pub message: String,
}
