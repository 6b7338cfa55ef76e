//! # Collaborator HTTP Handlers
//!
//! 협업자 관리와 관련된 HTTP 엔드포인트를 처리하는 핸들러 함수들입니다.
//! RESTful API 설계 원칙을 따릅니다.
//!
//! ## 엔드포인트
//!
//! | 메서드 | 경로 | 설명 | 상태 코드 |
//! |--------|------|------|-----------|
//! | `GET` | `/collaborators` | 전체 목록 (생성 시간 내림차순) | 200 OK |
//! | `GET` | `/collaborators/stream` | SSE 전체 스냅샷 스트림 | 200 OK |
//! | `GET` | `/collaborators/{id}` | 단건 조회 | 200 OK |
//! | `POST` | `/collaborators` | 생성 (부서 멤버십 동기화 포함) | 201 Created |
//! | `PUT` | `/collaborators/{id}` | 부분 수정 (부서 이동 동기화 포함) | 200 OK |
//! | `DELETE` | `/collaborators/{id}` | 단건 삭제 (부서 정리 포함) | 204 No Content |
//! | `POST` | `/collaborators/batch-delete` | 일괄 삭제 (부서 정리 생략) | 200 OK |
//!
//! 모든 변이 핸들러는 본문 역직렬화 직후 `validate()`를 호출하며,
//! 서비스 에러는 `AppError`의 `ResponseError` 구현을 통해 표준 JSON
//! 에러 응답으로 변환됩니다.

use actix_web::{delete, get, post, put, web, HttpResponse};
use futures_util::StreamExt;
use validator::Validate;

use crate::core::errors::AppError;
use crate::domain::dto::collaborators::request::{
    BulkDeleteRequest, CreateCollaboratorRequest, UpdateCollaboratorRequest,
};
use crate::domain::dto::collaborators::response::CollaboratorResponse;
use crate::services::collaborators::collaborator_service::CollaboratorService;

/// 협업자 목록 조회 핸들러
///
/// # 엔드포인트
///
/// `GET /collaborators`
#[get("")]
pub async fn list_collaborators() -> Result<HttpResponse, AppError> {
    let service = CollaboratorService::instance();
    let collaborators = service.list_collaborators().await?;

    Ok(HttpResponse::Ok().json(collaborators))
}

/// 협업자 실시간 스냅샷 스트림 핸들러
///
/// Server-Sent Events로 전체 결과 집합의 스냅샷 시퀀스를 전달합니다.
/// 연결 직후 현재 상태가 한 번 내려가고, 이후 컬렉션에 변경이 있을
/// 때마다 새 전체 스냅샷이 내려갑니다. 클라이언트가 연결을 끊으면
/// 구독이 종료됩니다.
///
/// # 엔드포인트
///
/// `GET /collaborators/stream`
#[get("/stream")]
pub async fn stream_collaborators() -> Result<HttpResponse, AppError> {
    let service = CollaboratorService::instance();
    let snapshots = service.stream_collaborators().await?;

    let body = snapshots.map(|snapshot| -> Result<web::Bytes, AppError> {
        let collaborators: Vec<CollaboratorResponse> = snapshot?
            .into_iter()
            .map(CollaboratorResponse::from)
            .collect();
        let json = serde_json::to_string(&collaborators)
            .map_err(|e| AppError::InternalError(e.to_string()))?;
        Ok(web::Bytes::from(format!("data: {}\n\n", json)))
    });

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(body))
}

/// 협업자 단건 조회 핸들러
///
/// # 엔드포인트
///
/// `GET /collaborators/{collaborator_id}`
#[get("/{collaborator_id}")]
pub async fn get_collaborator(
    collaborator_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = CollaboratorService::instance();
    let collaborator = service.get_collaborator_by_id(&collaborator_id).await?;

    Ok(HttpResponse::Ok().json(collaborator))
}

/// 협업자 생성 핸들러
///
/// 새 협업자를 생성하고, 요청된 부서가 존재하면 같은 원자적 배치로
/// 그 부서의 소속 목록에 추가합니다. 부서에 관리자가 지정되어 있으면
/// 응답의 `manager_id`는 요청값이 아닌 상속된 값입니다.
///
/// # 엔드포인트
///
/// `POST /collaborators`
///
/// # 요청 본문
///
/// ```json
/// {
///   "name": "Alice Kim",
///   "email": "alice@example.com",
///   "department": "Engineering",
///   "job_title": "Backend Engineer",
///   "admission_date": "2024-03-01",
///   "level": "Senior",
///   "manager_id": "",
///   "salary": "9000",
///   "active": true
/// }
/// ```
#[post("")]
pub async fn create_collaborator(
    payload: web::Json<CreateCollaboratorRequest>,
) -> Result<HttpResponse, AppError> {
    // 유효성 검사
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = CollaboratorService::instance();
    let response = service.create_collaborator(payload.into_inner()).await?;

    Ok(HttpResponse::Created().json(response))
}

/// 협업자 수정 핸들러
///
/// 제공된 필드만 적용합니다. `department`가 저장된 값과 다르면 이전/새
/// 부서의 소속 목록 갱신과 관리자 재계산이 같은 배치에 포함됩니다.
///
/// # 엔드포인트
///
/// `PUT /collaborators/{collaborator_id}`
#[put("/{collaborator_id}")]
pub async fn update_collaborator(
    collaborator_id: web::Path<String>,
    payload: web::Json<UpdateCollaboratorRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = CollaboratorService::instance();
    let collaborator = service
        .update_collaborator(&collaborator_id, payload.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(collaborator))
}

/// 협업자 단건 삭제 핸들러
///
/// 삭제 전 소속 부서를 해석해 멤버십 정리를 같은 배치로 수행합니다.
/// 이미 삭제된 id에 대한 재요청은 멱등한 no-op으로 성공 처리됩니다.
///
/// # 엔드포인트
///
/// `DELETE /collaborators/{collaborator_id}`
#[delete("/{collaborator_id}")]
pub async fn delete_collaborator(
    collaborator_id: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let service = CollaboratorService::instance();
    service.delete_collaborator(&collaborator_id).await?;

    Ok(HttpResponse::NoContent().finish())
}

/// 협업자 일괄 삭제 핸들러
///
/// 모든 id를 하나의 배치로 삭제하되 부서 측 정리를 생략하는 빠른
/// 경로입니다. 응답 메시지에 정리가 생략되었음이 명시됩니다.
///
/// # 엔드포인트
///
/// `POST /collaborators/batch-delete`
///
/// # 요청 본문
///
/// ```json
/// { "ids": ["507f1f77bcf86cd799439011", "507f1f77bcf86cd799439012"] }
/// ```
#[post("/batch-delete")]
pub async fn delete_many_collaborators(
    payload: web::Json<BulkDeleteRequest>,
) -> Result<HttpResponse, AppError> {
    payload.validate()
        .map_err(|e| AppError::ValidationError(e.to_string()))?;

    let service = CollaboratorService::instance();
    let response = service.delete_many_collaborators(payload.into_inner()).await?;

    Ok(HttpResponse::Ok().json(response))
}
