//! # Application Error Handling System
//!
//! 백엔드 서비스를 위한 통합 에러 처리 시스템입니다.
//! `thiserror`와 `actix_web::ResponseError`를 결합하여 서비스 계층의 에러를
//! 일관된 HTTP 응답으로 변환합니다.
//!
//! ## 설계 철학
//!
//! - **계층화된 분류**: 인프라(데이터베이스/캐시), 비즈니스(검증/충돌/부재),
//!   시스템(내부 오류) 에러를 구분합니다
//! - **자동 HTTP 변환**: 모든 에러가 표준화된 JSON 응답과 상태 코드로 매핑됩니다
//! - **컨텍스트 보존**: `ErrorContext` trait으로 원본 에러 정보를 잃지 않고 전달합니다
//!
//! ## HTTP 응답 매핑
//!
//! | AppError | HTTP Status | 사용 시나리오 |
//! |----------|-------------|---------------|
//! | `ValidationError` | 400 Bad Request | 입력값 검증 실패, 잘못된 ObjectId 형식 |
//! | `NotFound` | 404 Not Found | 협업자/부서 문서 없음 |
//! | `ConflictError` | 409 Conflict | 중복 데이터, 비즈니스 규칙 위반 |
//! | `DatabaseError` | 500 Internal Server Error | MongoDB 오류, 배치 커밋 실패 |
//! | `RedisError` | 500 Internal Server Error | 캐시 오류 |
//! | `InternalError` | 500 Internal Server Error | 예상치 못한 오류 |
//!
//! ## 사용 패턴
//!
//! ```rust,ignore
//! use crate::core::errors::AppError;
//!
//! impl CollaboratorService {
//!     async fn update_collaborator(&self, id: &str, req: UpdateCollaboratorRequest)
//!         -> Result<CollaboratorResponse, AppError>
//!     {
//!         let current = self.collaborator_repo.find_by_id(id).await?
//!             .ok_or_else(|| AppError::NotFound("협업자를 찾을 수 없습니다".to_string()))?;
//!         // ...
//!     }
//! }
//! ```

use thiserror::Error;

/// 애플리케이션 전역 에러 타입
///
/// 백엔드 서비스에서 발생할 수 있는 모든 종류의 에러를 포괄하는 열거형입니다.
/// `thiserror` 크레이트를 사용하여 자동으로 `Error` trait을 구현하고,
/// `actix_web::ResponseError`를 구현하여 HTTP 응답으로 자동 변환됩니다.
///
/// ## 에러 변환 패턴
///
/// ```rust,ignore
/// // MongoDB 에러 변환
/// collection.find_one(filter).await
///     .map_err(|e| AppError::DatabaseError(e.to_string()))?;
///
/// // Redis 에러 변환
/// redis_client.get::<Collaborator>("collaborator:123").await
///     .map_err(|e| AppError::RedisError(e.to_string()))?;
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// 데이터베이스 관련 에러
    ///
    /// MongoDB 연산(조회, 배치 커밋, 인덱스 생성 등) 중 발생하는 오류입니다.
    /// 트랜잭션 커밋 실패도 여기에 포함되며, 원자적 배치의 특성상 부분 적용은
    /// 발생하지 않습니다.
    #[error("Database error: {0}")]
    DatabaseError(String),

    /// Redis 캐시 관련 에러
    ///
    /// Redis 서버와의 통신 오류나 캐시 연산 실패를 나타냅니다.
    /// 조회 경로의 캐시 실패는 대부분 무시되고 DB 조회로 넘어가므로,
    /// 이 에러가 호출자까지 전파되는 경우는 드뭅니다.
    #[error("Redis error: {0}")]
    RedisError(String),

    /// 입력값 검증 에러
    ///
    /// 클라이언트가 제공한 데이터가 형식 요구사항을 만족하지 않을 때 발생합니다.
    /// 잘못된 ObjectId 형식, 빈 필수 필드, 형식에 맞지 않는 이메일 등이 해당됩니다.
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// 리소스 찾을 수 없음 에러
    ///
    /// 요청된 협업자 또는 부서 문서가 존재하지 않을 때 발생합니다.
    /// 수정 연산은 선행 조회가 실패하면 아무것도 쓰지 않고 이 에러로 중단됩니다.
    #[error("Not found: {0}")]
    NotFound(String),

    /// 충돌/중복 에러
    ///
    /// 비즈니스 규칙 위반이나 중복 데이터 생성 시도 시 발생합니다.
    /// 중복 이메일로 협업자 생성 시도 등이 해당됩니다.
    #[error("Conflict error: {0}")]
    ConflictError(String),

    /// 내부 서버 에러
    ///
    /// 예상하지 못한 시스템 오류나 프로그래밍 오류 시 발생합니다.
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl actix_web::ResponseError for AppError {
    /// HTTP 에러 응답을 생성합니다.
    ///
    /// 각 `AppError` 변형을 적절한 HTTP 상태 코드와 JSON 응답으로 변환합니다.
    ///
    /// 모든 에러 응답은 다음과 같은 표준 JSON 형식을 따릅니다:
    ///
    /// ```json
    /// {
    ///   "error": "Human readable error message"
    /// }
    /// ```
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::http::StatusCode;

        let status = match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConflictError(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        actix_web::HttpResponse::build(status)
            .json(serde_json::json!({
                "error": self.to_string()
            }))
    }
}

/// 편의성을 위한 Result 타입 별칭
///
/// 애플리케이션 전체에서 자주 사용되는 `Result<T, AppError>` 패턴을
/// 간소화하기 위한 타입 별칭입니다.
pub type AppResult<T> = Result<T, AppError>;

/// 외부 라이브러리 에러를 AppError로 변환하는 확장 trait
///
/// 다양한 외부 라이브러리의 에러 타입을 `AppError`로 쉽게 변환할 수 있도록
/// 도와주는 확장 trait입니다.
///
/// # 예제
///
/// ```rust,ignore
/// use crate::core::errors::{AppError, ErrorContext};
///
/// let session = db.client().start_session().await
///     .context("Failed to start batch session")?;
/// ```
pub trait ErrorContext<T> {
    /// 컨텍스트 정보와 함께 에러를 변환합니다.
    fn context(self, msg: &str) -> AppResult<T>;

    /// 클로저를 사용하여 지연 평가된 컨텍스트를 제공합니다.
    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String;
}

impl<T, E> ErrorContext<T> for Result<T, E>
where
    E: std::fmt::Display,
{
    fn context(self, msg: &str) -> AppResult<T> {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", msg, e)))
    }

    fn with_context<F>(self, f: F) -> AppResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| AppError::InternalError(format!("{}: {}", f(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn test_validation_error_response() {
        let error = AppError::ValidationError("Name is required".to_string());
        let response = error.error_response();

        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_not_found_error_response() {
        let error = AppError::NotFound("Collaborator not found".to_string());
        let response = error.error_response();

        assert_eq!(response.status(), actix_web::http::StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_conflict_error_response() {
        let error = AppError::ConflictError("Email already in use".to_string());
        let response = error.error_response();

        assert_eq!(response.status(), actix_web::http::StatusCode::CONFLICT);
    }

    #[test]
    fn test_database_error_response() {
        let error = AppError::DatabaseError("connection reset".to_string());
        let response = error.error_response();

        assert_eq!(
            response.status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_context_trait() {
        let result: Result<(), &str> = Err("original error");
        let app_result = result.context("Additional context");

        assert!(app_result.is_err());
        if let Err(AppError::InternalError(msg)) = app_result {
            assert!(msg.contains("Additional context"));
            assert!(msg.contains("original error"));
        } else {
            panic!("Expected InternalError");
        }
    }
}
