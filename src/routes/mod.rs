//! API 라우트 설정 모듈
//!
//! RESTful API 엔드포인트들을 기능별로 그룹화하여 제공합니다.
//! 협업자, 부서 관련 라우트와 헬스체크 엔드포인트를 포함합니다.
//!
//! # Features
//!
//! - 협업자 CRUD + 일괄 삭제 + 실시간 스냅샷 스트림
//! - 부서 CRUD + 실시간 스냅샷 스트림
//! - 헬스체크 엔드포인트
//!
//! 인증은 이 서비스의 범위가 아닙니다. 배포 환경에서는 앞단의 게이트웨이가
//! 호스팅 인증 제공자의 토큰을 검증한 뒤 트래픽을 전달한다고 가정합니다.
//!
//! # Examples
//!
//! ```rust,ignore
//! use actix_web::web;
//!
//! let mut cfg = web::ServiceConfig::new();
//! configure_all_routes(&mut cfg);
//! ```

use crate::handlers;
use actix_web::web;
use chrono;
use serde_json::json;

/// 모든 라우트를 설정합니다
///
/// 기능별로 분할된 라우트들을 통합하여 애플리케이션에 등록합니다.
///
/// # Arguments
///
/// * `cfg` - Actix-web 서비스 설정 객체
pub fn configure_all_routes(cfg: &mut web::ServiceConfig) {
    // Health check endpoint
    cfg.service(health_check);

    // Feature-specific routes
    configure_collaborator_routes(cfg);
    configure_department_routes(cfg);
}

/// 협업자 관련 라우트를 설정합니다
///
/// # Available Routes
///
/// - `GET /api/v1/collaborators` - 목록 조회
/// - `GET /api/v1/collaborators/stream` - SSE 스냅샷 스트림
/// - `POST /api/v1/collaborators/batch-delete` - 일괄 삭제 (부서 정리 생략)
/// - `GET /api/v1/collaborators/{id}` - 단건 조회
/// - `POST /api/v1/collaborators` - 생성
/// - `PUT /api/v1/collaborators/{id}` - 수정
/// - `DELETE /api/v1/collaborators/{id}` - 단건 삭제
///
/// # Arguments
///
/// * `cfg` - Actix-web 서비스 설정 객체
///
/// # Examples
///
/// ```bash
/// curl -X POST http://localhost:8080/api/v1/collaborators \
///   -H "Content-Type: application/json" \
///   -d '{"name":"Alice Kim","email":"alice@example.com","department":"Engineering",
///        "job_title":"Backend Engineer","admission_date":"2024-03-01",
///        "level":"Senior","salary":"9000","active":true}'
/// ```
fn configure_collaborator_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/collaborators")
            // 고정 경로를 {id} 매칭보다 먼저 등록한다
            .service(handlers::collaborators::stream_collaborators)
            .service(handlers::collaborators::delete_many_collaborators)
            .service(handlers::collaborators::list_collaborators)
            .service(handlers::collaborators::create_collaborator)
            .service(handlers::collaborators::get_collaborator)
            .service(handlers::collaborators::update_collaborator)
            .service(handlers::collaborators::delete_collaborator)
    );
}

/// 부서 관련 라우트를 설정합니다
///
/// # Available Routes
///
/// - `GET /api/v1/departments` - 목록 조회
/// - `GET /api/v1/departments/stream` - SSE 스냅샷 스트림
/// - `GET /api/v1/departments/{id}` - 단건 조회
/// - `POST /api/v1/departments` - 생성
/// - `PUT /api/v1/departments/{id}` - 수정 (협업자 팬아웃 포함)
/// - `DELETE /api/v1/departments/{id}` - 삭제
///
/// # Arguments
///
/// * `cfg` - Actix-web 서비스 설정 객체
fn configure_department_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1/departments")
            // 고정 경로를 {id} 매칭보다 먼저 등록한다
            .service(handlers::departments::stream_departments)
            .service(handlers::departments::list_departments)
            .service(handlers::departments::create_department)
            .service(handlers::departments::get_department)
            .service(handlers::departments::update_department)
            .service(handlers::departments::delete_department)
    );
}

/// 서비스 상태를 확인하는 헬스체크 엔드포인트
///
/// 로드밸런서나 모니터링 시스템에서 서비스 상태를 확인하는 데 사용됩니다.
///
/// # Returns
///
/// * `HttpResponse` - 서비스 상태 정보를 포함한 JSON 응답
///
/// # Examples
///
/// ```bash
/// curl http://localhost:8080/health
/// ```
///
/// Response:
/// ```json
/// {
///   "status": "healthy",
///   "service": "hr_directory_service",
///   "version": "0.1.0",
///   "timestamp": "2025-01-01T00:00:00Z",
///   "features": {
///     "database": "MongoDB",
///     "cache": "Redis",
///     "dependency_injection": "Singleton Macro"
///   }
/// }
/// ```
#[actix_web::get("/health")]
async fn health_check() -> actix_web::HttpResponse {
    actix_web::HttpResponse::Ok().json(json!({
        "status": "healthy",
        "service": "hr_directory_service",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "features": {
            "database": "MongoDB",
            "cache": "Redis",
            "dependency_injection": "Singleton Macro"
        }
    }))
}
