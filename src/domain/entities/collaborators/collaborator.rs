//! Collaborator Entity Implementation
//!
//! 협업자(직원) 엔티티의 핵심 구현체입니다.
//! 부서와의 관계는 비정규화된 부서 *이름* 문자열로, 상급자와의 관계는
//! 다른 협업자 문서의 id 문자열로 표현됩니다.

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// 협업자 직급 단계
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Level {
    /// 주니어
    Junior,
    /// 미드레벨
    Mid,
    /// 시니어
    Senior,
    /// 매니저 (부서 관리자 후보)
    Manager,
}

/// 협업자 엔티티
///
/// 디렉터리의 모든 직원을 표현하는 핵심 도메인 엔티티입니다.
///
/// 관계 필드의 의미:
/// - `department`: 소속 부서의 이름 (id가 아님). 빈 문자열은 무소속.
/// - `manager_id`: 상급자 협업자 id의 16진수 문자열. 빈 문자열은 없음.
///   자기 자신의 id와 같아질 수 없으며, 이 규칙은 저장소가 아닌
///   정합성 엔진이 절차적으로 보장합니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collaborator {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// 이름
    pub name: String,
    /// 이메일 (unique)
    pub email: String,
    /// 소속 부서 이름 (비정규화, "" = 무소속)
    #[serde(default)]
    pub department: String,
    /// 직무
    pub job_title: String,
    /// 입사일 (ISO 날짜 문자열)
    pub admission_date: String,
    /// 직급
    pub level: Level,
    /// 상급자 협업자 id ("" = 없음)
    #[serde(default)]
    pub manager_id: String,
    /// 급여 (표시용 문자열)
    pub salary: String,
    /// 상태 라벨 ("Active" / "Inactive", active 플래그에서 파생)
    pub status: String,
    /// 재직 여부
    pub active: bool,
    /// 생성 시간
    pub created_at: DateTime,
}

impl Collaborator {
    /// MongoDB 컬렉션 이름
    pub const COLLECTION: &'static str = "collaborators";

    /// 재직 중 상태 라벨
    pub const STATUS_ACTIVE: &'static str = "Active";
    /// 퇴사/비활성 상태 라벨
    pub const STATUS_INACTIVE: &'static str = "Inactive";

    /// 새 협업자 엔티티 생성
    ///
    /// `status`는 `active` 플래그에서 파생되고, `created_at`은 현재 시간으로
    /// 설정됩니다. id는 호출자가 사전 생성한 값을 넣거나 비워둘 수 있습니다.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        name: String,
        email: String,
        department: String,
        job_title: String,
        admission_date: String,
        level: Level,
        manager_id: String,
        salary: String,
        active: bool,
    ) -> Self {
        Self {
            id: None,
            name,
            email,
            department,
            job_title,
            admission_date,
            level,
            manager_id,
            salary,
            status: Self::status_label(active).to_string(),
            active,
            created_at: DateTime::now(),
        }
    }

    /// active 플래그에 해당하는 상태 라벨을 반환합니다.
    pub fn status_label(active: bool) -> &'static str {
        if active {
            Self::STATUS_ACTIVE
        } else {
            Self::STATUS_INACTIVE
        }
    }

    /// ID 문자열로 변환
    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.to_hex())
    }

    /// 부서에 소속되어 있는지 확인
    pub fn has_department(&self) -> bool {
        !self.department.is_empty()
    }

    /// 상급자가 지정되어 있는지 확인
    pub fn has_manager(&self) -> bool {
        !self.manager_id.is_empty()
    }

    /// 자기 자신을 상급자로 가리키고 있는지 확인
    ///
    /// 정상 상태에서는 어떤 연산 후에도 false여야 합니다.
    pub fn is_own_manager(&self) -> bool {
        match self.id_string() {
            Some(id) => !self.manager_id.is_empty() && self.manager_id == id,
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(active: bool) -> Collaborator {
        Collaborator::new(
            "Alice".to_string(),
            "alice@example.com".to_string(),
            "Engineering".to_string(),
            "Backend Engineer".to_string(),
            "2024-03-01".to_string(),
            Level::Senior,
            String::new(),
            "9000".to_string(),
            active,
        )
    }

    #[test]
    fn test_status_derived_from_active_flag() {
        assert_eq!(sample(true).status, "Active");
        assert_eq!(sample(false).status, "Inactive");
    }

    #[test]
    fn test_own_manager_detection() {
        let mut collaborator = sample(true);
        let id = ObjectId::new();
        collaborator.id = Some(id);

        assert!(!collaborator.is_own_manager());

        collaborator.manager_id = id.to_hex();
        assert!(collaborator.is_own_manager());
    }

    #[test]
    fn test_empty_relationship_fields() {
        let mut collaborator = sample(true);
        assert!(collaborator.has_department());
        assert!(!collaborator.has_manager());

        collaborator.department = String::new();
        assert!(!collaborator.has_department());
    }
}
