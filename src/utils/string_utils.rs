//! # 문자열 유틸리티
//!
//! 문자열 처리와 관련된 공통 유틸리티 함수들입니다.

use crate::core::errors::AppError;

/// 필수 문자열 필드 검증 및 정리
///
/// 빈 문자열이나 공백만 있는 경우 ValidationError를 반환하고,
/// 유효한 문자열인 경우 앞뒤 공백을 제거한 문자열을 반환합니다.
///
/// # 인자
/// * `value` - 검증할 문자열
/// * `field_name` - 필드명 (에러 메시지용)
///
/// # 반환값
/// * `Ok(String)` - 정리된 유효한 문자열
/// * `Err(AppError)` - 빈 문자열이거나 공백만 있는 경우
pub fn validate_required_string(value: &str, field_name: &str) -> Result<String, AppError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::ValidationError(
            format!("{}은(는) 필수입니다", field_name)
        ));
    }
    Ok(trimmed.to_string())
}

/// 앞뒤 공백을 제거한 문자열을 반환합니다.
pub fn trim_string(value: &str) -> String {
    value.trim().to_string()
}

/// MongoDB ObjectId의 16진수 문자열 형식인지 확인합니다.
///
/// 24자리의 ASCII 16진수 문자로만 구성된 경우 true를 반환합니다.
/// 관계 필드(`manager_id`, `collaborator_ids`)의 형식 검증에 사용됩니다.
///
/// # 예제
/// ```rust,ignore
/// assert!(is_object_id_hex("507f1f77bcf86cd799439011"));
/// assert!(!is_object_id_hex(""));
/// assert!(!is_object_id_hex("not-an-id"));
/// ```
pub fn is_object_id_hex(value: &str) -> bool {
    value.len() == 24 && value.chars().all(|c| c.is_ascii_hexdigit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_required_string() {
        assert_eq!(
            validate_required_string("  Engineering  ", "name").unwrap(),
            "Engineering"
        );
        assert!(validate_required_string("   ", "name").is_err());
        assert!(validate_required_string("", "name").is_err());
    }

    #[test]
    fn test_trim_string() {
        assert_eq!(trim_string("  Sales "), "Sales");
    }

    #[test]
    fn test_is_object_id_hex() {
        assert!(is_object_id_hex("507f1f77bcf86cd799439011"));
        assert!(!is_object_id_hex(""));
        assert!(!is_object_id_hex("507f1f77bcf86cd79943901"));
        assert!(!is_object_id_hex("zzzf1f77bcf86cd799439011"));
    }
}
