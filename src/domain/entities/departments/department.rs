//! Department Entity Implementation
//!
//! 부서 엔티티의 핵심 구현체입니다.
//! 소속 협업자들과의 관계는 협업자 id 문자열의 집합(`collaborator_ids`)으로,
//! 부서 관리자와의 관계는 협업자 id 문자열(`manager_id`)로 표현됩니다.

use mongodb::bson::{oid::ObjectId, DateTime};
use serde::{Deserialize, Serialize};

/// 부서 엔티티
///
/// 부서 이름은 관례상 유일하지만 저장소가 유일성을 강제하지는 않습니다.
/// 협업자 문서는 부서를 id가 아닌 *이름*으로 참조하므로, 이름 동등 조회가
/// 두 컬렉션 사이의 유일한 색인 수단입니다.
///
/// `collaborator_ids`는 순서가 의미 없는 집합이며, 추가/제거는 배열 지시자
/// (`$addToSet`/`$pull`)를 통해 멱등하게 이루어집니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Department {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    /// 부서 이름 (관례상 unique)
    pub name: String,
    /// 부서 관리자 협업자 id ("" = 없음)
    #[serde(default)]
    pub manager_id: String,
    /// 소속 협업자 id 집합
    #[serde(default)]
    pub collaborator_ids: Vec<String>,
    /// 생성 시간
    pub created_at: DateTime,
}

impl Department {
    /// MongoDB 컬렉션 이름
    pub const COLLECTION: &'static str = "departments";

    /// 새 부서 엔티티 생성
    pub fn new(name: String, manager_id: String, collaborator_ids: Vec<String>) -> Self {
        Self {
            id: None,
            name,
            manager_id,
            collaborator_ids,
            created_at: DateTime::now(),
        }
    }

    /// ID 문자열로 변환
    pub fn id_string(&self) -> Option<String> {
        self.id.as_ref().map(|id| id.to_hex())
    }

    /// 부서 관리자가 지정되어 있는지 확인
    pub fn has_manager(&self) -> bool {
        !self.manager_id.is_empty()
    }

    /// 해당 협업자가 이 부서 소속으로 기록되어 있는지 확인
    pub fn contains(&self, collaborator_id: &str) -> bool {
        self.collaborator_ids.iter().any(|id| id == collaborator_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_membership_check() {
        let department = Department::new(
            "Engineering".to_string(),
            String::new(),
            vec!["a".to_string(), "b".to_string()],
        );

        assert!(department.contains("a"));
        assert!(!department.contains("c"));
        assert!(!department.has_manager());
    }
}
