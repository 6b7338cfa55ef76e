//! # Department HTTP Handlers
//!
//! 부서 관리와 관련된 HTTP 엔드포인트를 처리하는 핸들러 함수들입니다.
//!
//! ## 엔드포인트
//!
//! | 메서드 | 경로 | 설명 | 상태 코드 |
//! |--------|------|------|-----------|
//! | `GET` | `/departments` | 전체 목록 (생성 시간 내림차순) | 200 OK |
//! | `GET` | `/departments/stream` | SSE 전체 스냅샷 스트림 | 200 OK |
//! | `GET` | `/departments/{id}` | 단건 조회 | 200 OK |
//! | `POST` | `/departments` | 생성 | 201 Created |
//! | `PUT` | `/departments/{id}` | 부분 수정 (협업자 팬아웃 동기화 포함) | 200 OK |
//! | `DELETE` | `/departments/{id}` | 삭제 (협업자 측 정리 없음) | 204 No Content |

use actix_web::{delete, get, post, put, web, HttpResponse};
use futures_util::StreamExt;
use validator::Validate;

use crate::core::errors::AppError;
use crate::domain::dto::departments::request::{CreateDepartmentRequest, UpdateDepartmentRequest};
use crate::domain::dto::departments::response::DepartmentResponse;
use crate::services::departments::department_service::DepartmentService;

/// 부서 목록 조회 핸들러
///
/// # 엔드포인트
///
/// `GET /departments`
#[get("")]
pub async fn list_departments() -> Result<HttpResponse, AppError> {
    let service = DepartmentService::instance();
    let departments = service.list_departments().await?;

    Ok(HttpResponse::Ok().json(departments))
}

/// 부서 실시간 스냅샷 스트림 핸들러
///
/// Server-Sent Events로 전체 결과 집합의 스냅샷 시퀀스를 전달합니다.
///
/// # 엔드포인트
///
/// `GET /departments/stream`
#[get("/stream")]
pub async fn stream_departments() -> Result<HttpResponse, AppError> {
    let service = DepartmentService::instance();
    let snapshots = service.stream_departments().await?;

    let body = snapshots.map(|snapshot| -> Result<web::Bytes, AppError> {
        let departments: Vec<DepartmentResponse> = snapshot?
            .into_iter()
            .map(DepartmentResponse::from)
            .collect();
        let json = serde_json::to_string(&departments)
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        Ok(web::Bytes::from(format!("data: {}\n\n", json)))
    });

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(body))
}

/// 부서 단건 조회 핸들러
///
/// # 엔드포인트
///
/// `GET /departments/{department_id}`
#[get("/{department_id}")]
pub async fn get_department(
    department_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = DepartmentService::instance();
    let department = service.get_department_by_id(&department_id).await?;

    Ok(HttpResponse::Ok().json(department))
}

/// 부서 생성 핸들러
///
/// # 엔드포인트
///
/// `POST /departments`
///
/// # 요청 본문
///
/// ```json
/// {
///   "name": "Engineering",
///   "manager_id": "",
///   "collaborator_ids": []
/// }
/// ```
#[post("")]
pub async fn create_department(
    payload: web::Json<CreateDepartmentRequest>,
) -> Result<HttpResponse, AppError> {
    // 유효성 검사
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = DepartmentService::instance();
    let response = service.create_department(payload.into_inner()).await?;

    Ok(HttpResponse::Created().json(response))
}

/// 부서 수정 핸들러
///
/// 이름 변경은 최종 소속원 전원의 `department` 필드로, 관리자 변경은
/// 소속원 전원의 `manager_id`로, 소속 목록 변경은 합류/제외 협업자의
/// 필드로 팬아웃되며, 전체가 하나의 원자적 배치로 커밋됩니다.
///
/// # 엔드포인트
///
/// `PUT /departments/{department_id}`
///
/// # 요청 본문
///
/// ```json
/// {
///   "name": "Platform",
///   "manager_id": "507f1f77bcf86cd799439011",
///   "collaborator_ids": ["507f1f77bcf86cd799439011", "507f1f77bcf86cd799439012"]
/// }
/// ```
#[put("/{department_id}")]
pub async fn update_department(
    department_id: web::Path<String>,
    payload: web::Json<UpdateDepartmentRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = DepartmentService::instance();
    let department = service
        .update_department(&department_id, payload.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(department))
}

/// 부서 삭제 핸들러
///
/// 부서 문서만 제거합니다. 소속 협업자 문서는 건드리지 않습니다.
///
/// # 엔드포인트
///
/// `DELETE /departments/{department_id}`
#[delete("/{department_id}")]
pub async fn delete_department(
    department_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = DepartmentService::instance();
    service.delete_department(&department_id).await?;

    Ok(HttpResponse::NoContent().finish())
}
