//! 협업자 요청 DTO
//!
//! 협업자 생성/수정/일괄 삭제를 위한 HTTP 요청 데이터 구조를 정의합니다.
//! 클라이언트 입력 데이터의 검증과 타입 안전성을 보장합니다.

use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::domain::entities::collaborators::collaborator::{Collaborator, Level};
use crate::utils::string_utils::is_object_id_hex;

/// 새로운 협업자 생성을 위한 요청 DTO
///
/// JSON 역직렬화와 입력 검증을 자동으로 수행합니다.
/// `department`는 부서 *이름*이며, 아직 존재하지 않는 부서 이름도
/// 허용됩니다 (부서 측 동기화가 조용히 생략될 뿐 에러가 아닙니다).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateCollaboratorRequest {
    /// 이름 (1-120자)
    #[validate(length(min = 1, max = 120, message = "이름은 1-120자 사이여야 합니다"))]
    pub name: String,

    /// 이메일 주소 (RFC 5322 표준)
    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: String,

    /// 소속 부서 이름 (빈 문자열 = 무소속)
    #[serde(default)]
    #[validate(length(max = 80, message = "부서 이름은 80자를 넘을 수 없습니다"))]
    pub department: String,

    /// 직무 (1-80자)
    #[validate(length(min = 1, max = 80, message = "직무는 1-80자 사이여야 합니다"))]
    pub job_title: String,

    /// 입사일 (ISO 날짜 문자열)
    #[validate(length(min = 1, max = 32, message = "입사일을 입력해주세요"))]
    pub admission_date: String,

    /// 직급
    pub level: Level,

    /// 요청된 상급자 협업자 id (빈 문자열 = 없음)
    ///
    /// 대상 부서에 관리자가 지정되어 있으면 엔진이 이 값을 덮어씁니다.
    #[serde(default)]
    #[validate(custom(function = "validate_optional_id"))]
    pub manager_id: String,

    /// 급여 (표시용 문자열)
    #[validate(length(max = 32, message = "급여는 32자를 넘을 수 없습니다"))]
    pub salary: String,

    /// 재직 여부 (status 라벨이 여기서 파생됩니다)
    pub active: bool,
}

impl CreateCollaboratorRequest {
    /// 요청을 협업자 엔티티로 변환합니다.
    ///
    /// `status` 파생과 `created_at` 스탬프는 엔티티 생성자가 수행합니다.
    pub fn into_collaborator(self) -> Collaborator {
        Collaborator::new(
            self.name,
            self.email,
            self.department,
            self.job_title,
            self.admission_date,
            self.level,
            self.manager_id,
            self.salary,
            self.active,
        )
    }
}

/// 협업자 부분 수정을 위한 요청 DTO
///
/// 제공된 필드만 적용됩니다. `department`에 빈 문자열을 명시하면
/// 무소속으로의 이동으로 취급됩니다 (필드 생략과는 다릅니다).
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateCollaboratorRequest {
    #[validate(length(min = 1, max = 120, message = "이름은 1-120자 사이여야 합니다"))]
    pub name: Option<String>,

    #[validate(email(message = "유효한 이메일 주소를 입력해주세요"))]
    pub email: Option<String>,

    /// 새 소속 부서 이름 (Some("") = 무소속으로 이동, None = 변경 없음)
    #[validate(length(max = 80, message = "부서 이름은 80자를 넘을 수 없습니다"))]
    pub department: Option<String>,

    #[validate(length(min = 1, max = 80, message = "직무는 1-80자 사이여야 합니다"))]
    pub job_title: Option<String>,

    #[validate(length(min = 1, max = 32, message = "입사일을 입력해주세요"))]
    pub admission_date: Option<String>,

    pub level: Option<Level>,

    /// 새 상급자 id (Some("") = 지정 해제, None = 변경 없음)
    ///
    /// 부서 이동이 함께 일어나면 엔진의 관리자 상속 규칙이 이 값을 덮어씁니다.
    #[validate(custom(function = "validate_optional_id_opt"))]
    pub manager_id: Option<String>,

    #[validate(length(max = 32, message = "급여는 32자를 넘을 수 없습니다"))]
    pub salary: Option<String>,

    pub active: Option<bool>,
}

impl UpdateCollaboratorRequest {
    /// 제공된 필드들을 `$set` 문서로 변환합니다.
    ///
    /// `active`가 제공되면 파생 필드 `status`도 함께 설정됩니다.
    pub fn to_set_document(&self) -> Document {
        let mut set = Document::new();

        if let Some(name) = &self.name {
            set.insert("name", name.clone());
        }
        if let Some(email) = &self.email {
            set.insert("email", email.clone());
        }
        if let Some(department) = &self.department {
            set.insert("department", department.clone());
        }
        if let Some(job_title) = &self.job_title {
            set.insert("job_title", job_title.clone());
        }
        if let Some(admission_date) = &self.admission_date {
            set.insert("admission_date", admission_date.clone());
        }
        if let Some(level) = &self.level {
            set.insert(
                "level",
                mongodb::bson::to_bson(level).unwrap_or(Bson::Null),
            );
        }
        if let Some(manager_id) = &self.manager_id {
            set.insert("manager_id", manager_id.clone());
        }
        if let Some(salary) = &self.salary {
            set.insert("salary", salary.clone());
        }
        if let Some(active) = self.active {
            set.insert("active", active);
            set.insert("status", Collaborator::status_label(active));
        }

        set
    }
}

/// 협업자 일괄 삭제 요청 DTO
///
/// 단건 삭제 경로와 달리 부서 측 정리를 수행하지 않는 빠른 경로입니다.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct BulkDeleteRequest {
    /// 삭제할 협업자 id 목록
    #[validate(length(min = 1, message = "삭제할 id를 하나 이상 지정해주세요"))]
    pub ids: Vec<String>,
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
    fn test_update_request_set_document_derives_status() {
        let request = UpdateCollaboratorRequest {
            active: Some(false),
            ..Default::default()
        };

        let set = request.to_set_document();
        assert_eq!(set.get_bool("active").unwrap(), false);
        assert_eq!(set.get_str("status").unwrap(), "Inactive");
    }

    #[test]
    fn test_update_request_omits_missing_fields() {
        let request = UpdateCollaboratorRequest {
            name: Some("Alice".to_string()),
            ..Default::default()
        };

        let set = request.to_set_document();
        assert_eq!(set.len(), 1);
        assert_eq!(set.get_str("name").unwrap(), "Alice");
    }

    #[test]
    fn test_manager_id_validation() {
        assert!(validate_optional_id("").is_ok());
        assert!(validate_optional_id("507f1f77bcf86cd799439011").is_ok());
        assert!(validate_optional_id("not-an-id").is_err());
    }
}
