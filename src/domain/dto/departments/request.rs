//! 부서 요청 DTO
//!
//! 부서 생성/수정을 위한 HTTP 요청 데이터 구조를 정의합니다.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::entities::departments::department::Department;
use crate::utils::string_utils::is_object_id_hex;

/// 새로운 부서 생성을 위한 요청 DTO
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateDepartmentRequest {
    /// 부서 이름 (관례상 unique - 저장소가 강제하지는 않음)
    #[validate(length(min = 1, max = 80, message = "부서 이름은 1-80자 사이여야 합니다"))]
    pub name: String,

    /// 부서 관리자 협업자 id (빈 문자열 = 없음)
    #[serde(default)]
    #[validate(custom(function = "validate_optional_id"))]
    pub manager_id: String,

    /// 초기 소속 협업자 id 목록 (일반적으로 빈 목록으로 시작)
    #[serde(default)]
    pub collaborator_ids: Vec<String>,
}

impl CreateDepartmentRequest {
    /// 요청을 부서 엔티티로 변환합니다.
    pub fn into_department(self) -> Department {
        Department::new(self.name, self.manager_id, self.collaborator_ids)
    }
}

/// 부서 부분 수정을 위한 요청 DTO
///
/// 제공된 필드만 적용됩니다. 필드별 의미:
/// - `name`: 부서 이름 변경 → 최종 소속원 전원의 `department` 필드 팬아웃 갱신
/// - `manager_id`: Some("")을 포함한 명시적 값 → 최종 소속원 전원의 관리자 갱신
/// - `collaborator_ids`: 새 소속 목록 전체 → 추가/제거 멤버십 델타 계산.
///   필드 생략(None)은 "멤버십 변경 없음"을 뜻합니다.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateDepartmentRequest {
    #[validate(length(min = 1, max = 80, message = "부서 이름은 1-80자 사이여야 합니다"))]
    pub name: Option<String>,

    /// 새 부서 관리자 id (Some("") = 지정 해제, None = 변경 없음)
    #[validate(custom(function = "validate_optional_id_opt"))]
    pub manager_id: Option<String>,

    /// 새 소속 협업자 id 목록 전체 (None = 변경 없음)
    pub collaborator_ids: Option<Vec<String>>,
}

/// 협업자 id 형식 검증 (빈 문자열 또는 24자리 16진수)
fn validate_optional_id(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || is_object_id_hex(value) {
        return Ok(());
    }
    Err(ValidationError::new("invalid_id")
        .with_message("유효하지 않은 협업자 id 형식입니다".into()))
}

fn validate_optional_id_opt(value: &String) -> Result<(), ValidationError> {
    validate_optional_id(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_into_department() {
        let request = CreateDepartmentRequest {
            name: "Engineering".to_string(),
            manager_id: String::new(),
            collaborator_ids: vec![],
        };

        let department = request.into_department();
        assert_eq!(department.name, "Engineering");
        assert!(department.collaborator_ids.is_empty());
        assert!(!department.has_manager());
    }
}
