//! # 협업자 관리 서비스 구현
//!
//! 협업자 생명주기(생성/조회/수정/삭제)와 그에 따르는 부서 측 정합성
//! 유지를 담당하는 비즈니스 로직입니다.
//!
//! ## 처리 구조
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                  CollaboratorService                    │
//! │                                                         │
//! │  읽기(리포지토리) ─▶ 계획(sync 순수 함수) ─▶ 원자 커밋   │
//! │                                        (store::commit)  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! 모든 다중 문서 갱신은 "한 번 읽고, write-set을 만들고, 원자적으로
//! 커밋"하는 단일 라운드입니다. 커밋 전 읽기가 실패하면 아무 쓰기도
//! 일어나지 않고, 커밋이 실패하면 배치 전체가 반영되지 않습니다.
//! 재시도나 보상 롤백은 수행하지 않습니다.

use std::sync::Arc;

use futures_util::stream::BoxStream;
use mongodb::bson::oid::ObjectId;
use singleton_macro::service;

use crate::{
    core::errors::AppError,
    db::Database,
    domain::{
        dto::collaborators::{
            request::{BulkDeleteRequest, CreateCollaboratorRequest, UpdateCollaboratorRequest},
            response::{BulkDeleteResponse, CollaboratorResponse, CreateCollaboratorResponse},
        },
        entities::{
            collaborators::collaborator::Collaborator,
            departments::department::Department,
        },
    },
    repositories::{
        collaborators::collaborator_repo::CollaboratorRepository,
        departments::department_repo::DepartmentRepository,
    },
    services::sync::{self, DepartmentMove},
    store,
    utils::string_utils::trim_string,
};

/// 협업자 비즈니스 로직 서비스
///
/// ## 주요 책임
///
/// 1. **생성**: id 사전 생성 → 부서 해석 → 관리자 상속 → 삽입+멤버십을
///    한 배치로 커밋
/// 2. **수정**: 부분 필드 적용, 부서 이동 시 이전/새 부서 멤버십과
///    관리자 재계산을 같은 배치에 포함
/// 3. **삭제**: 단건은 부서 멤버십 정리 포함, 일괄은 정리를 생략하는
///    빠른 경로
/// 4. **조회/구독**: 생성 시간 내림차순 목록과 전체 스냅샷 스트림
#[service(name = "collaborator")]
pub struct CollaboratorService {
    /// 협업자 데이터 액세스 리포지토리
    collaborator_repo: Arc<CollaboratorRepository>,

    /// 부서 데이터 액세스 리포지토리
    ///
    /// 협업자가 가진 관계 키는 부서 *이름*뿐이므로, 모든 부서 측 갱신은
    /// 이름 동등 조회로 시작합니다.
    department_repo: Arc<DepartmentRepository>,

    /// 원자적 배치 커밋에 사용하는 데이터베이스 연결
    db: Arc<Database>,
}

impl CollaboratorService {
    /// 전체 협업자 목록 조회 (생성 시간 내림차순)
    pub async fn list_collaborators(&self) -> Result<Vec<CollaboratorResponse>, AppError> {
        let collaborators = self.collaborator_repo.list_ordered().await?;
        Ok(collaborators.into_iter().map(CollaboratorResponse::from).collect())
    }

    /// ID로 협업자 조회
    pub async fn get_collaborator_by_id(&self, id: &str) -> Result<CollaboratorResponse, AppError> {
        let collaborator = self.collaborator_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("협업자를 찾을 수 없습니다".to_string()))?;

        Ok(CollaboratorResponse::from(collaborator))
    }

    /// 새 협업자 생성
    ///
    /// # 처리 과정
    ///
    /// 1. 이메일 중복 검사
    /// 2. 새 협업자의 id를 **쓰기 전에** 생성 (같은 배치 안에서 부서
    ///    문서가 이 id를 참조할 수 있어야 하므로)
    /// 3. 요청된 부서 이름 해석. 부서에 관리자가 기록되어 있으면 요청된
    ///    `manager_id`를 상속 규칙으로 덮어쓰고, 부서가 없으면 요청값을
    ///    유지하며 부서 문서는 건드리지 않음
    /// 4. 협업자 삽입 + (해당 시) 부서 멤버십 추가를 한 배치로 커밋
    ///
    /// # 반환값
    ///
    /// * `Ok(CreateCollaboratorResponse)` - 생성된 협업자 (유효 필드 반영)
    /// * `Err(AppError::ConflictError)` - 이메일 중복
    /// * `Err(AppError::DatabaseError)` - 조회/커밋 실패 (아무것도 반영 안 됨)
    pub async fn create_collaborator(
        &self,
        mut request: CreateCollaboratorRequest,
    ) -> Result<CreateCollaboratorResponse, AppError> {
        let start_time = std::time::Instant::now();

        // 부서 이름은 동등 조회의 조인 키이므로 앞뒤 공백을 정규화한다
        request.department = trim_string(&request.department);

        // 중복 확인
        if self.collaborator_repo.find_by_email(&request.email).await?.is_some() {
            return Err(AppError::ConflictError("이미 사용 중인 이메일입니다".to_string()));
        }

        // 배치 안에서 부서 문서가 참조할 수 있도록 id를 미리 생성
        let new_id = ObjectId::new();

        // 대상 부서 해석 - 존재하지 않는 이름은 에러가 아니다
        let department = self.department_repo.find_by_name(&request.department).await?;

        let (collaborator, batch) =
            sync::plan_collaborator_create(new_id, request.into_collaborator(), department.as_ref())?;

        let department_ids = batch.touched_ids(Department::COLLECTION);
        store::commit(&self.db, batch).await?;

        self.collaborator_repo.invalidate_many(&[new_id]).await;
        self.department_repo.invalidate_many(&department_ids).await;

        log::info!(
            "협업자 생성 완료: {} ({:?} 소요)",
            collaborator.name,
            start_time.elapsed()
        );

        Ok(CreateCollaboratorResponse {
            collaborator: CollaboratorResponse::from(collaborator),
            message: "협업자가 성공적으로 생성되었습니다".to_string(),
        })
    }

    /// 협업자 부분 수정
    ///
    /// 제공된 필드만 적용합니다. 패치가 `department`를 저장된 이름과 다른
    /// 값으로 바꾸면 (빈 문자열 포함):
    ///
    /// - 이전 부서를 이전 이름으로 해석해 멤버십에서 제거
    /// - 새 부서를 새 이름으로 해석해 멤버십에 추가하고, `manager_id`를
    ///   생성 경로와 같은 규칙으로 재계산. 새 부서가 없으면 `manager_id`는
    ///   빈 문자열로 강제
    ///
    /// 협업자 필드 갱신과 양쪽 부서 갱신은 하나의 원자적 배치로 커밋됩니다.
    ///
    /// # 반환값
    ///
    /// * `Ok(CollaboratorResponse)` - 갱신 후 상태
    /// * `Err(AppError::NotFound)` - 대상 협업자가 없음 (아무것도 쓰지 않음)
    /// * `Err(AppError::ValidationError)` - 자기 자신을 상급자로 지정
    pub async fn update_collaborator(
        &self,
        id: &str,
        request: UpdateCollaboratorRequest,
    ) -> Result<CollaboratorResponse, AppError> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| AppError::ValidationError("유효하지 않은 ID 형식입니다".to_string()))?;

        // 변경분 계산의 기준이 되는 저장 상태 - 캐시를 우회해 읽는다
        let current = self.collaborator_repo
            .find_by_id_uncached(id)
            .await?
            .ok_or_else(|| AppError::NotFound("협업자를 찾을 수 없습니다".to_string()))?;

        // 협업자는 자기 자신의 상급자가 될 수 없다
        if request.manager_id.as_deref() == Some(id) {
            return Err(AppError::ValidationError(
                "협업자는 자기 자신의 상급자가 될 수 없습니다".to_string(),
            ));
        }

        let set_fields = request.to_set_document();

        let department_changed = request
            .department
            .as_ref()
            .is_some_and(|name| *name != current.department);

        let (old_department, new_department) = if department_changed {
            let old = self.department_repo.find_by_name(&current.department).await?;
            let new = self
                .department_repo
                .find_by_name(request.department.as_deref().unwrap_or_default())
                .await?;
            (old, new)
        } else {
            (None, None)
        };

        let department_move = department_changed.then(|| DepartmentMove {
            old: old_department.as_ref(),
            new: new_department.as_ref(),
        });

        let batch = sync::plan_collaborator_edit(object_id, &current, set_fields, department_move);

        let department_ids = batch.touched_ids(Department::COLLECTION);
        store::commit(&self.db, batch).await?;

        self.collaborator_repo.invalidate_many(&[object_id]).await;
        self.department_repo.invalidate_many(&department_ids).await;

        let updated = self.collaborator_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("협업자를 찾을 수 없습니다".to_string()))?;

        Ok(CollaboratorResponse::from(updated))
    }

    /// 협업자 단건 삭제
    ///
    /// 삭제 전에 현재 레코드를 읽어 소속 부서를 알아내고, 부서가 해석되면
    /// 멤버십 제거와 문서 삭제를 한 배치로 커밋합니다. 레코드가 이미 없으면
    /// 부서 정리를 건너뛰고 삭제만 시도합니다 (멱등 no-op).
    pub async fn delete_collaborator(&self, id: &str) -> Result<(), AppError> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| AppError::ValidationError("유효하지 않은 ID 형식입니다".to_string()))?;

        // 소속 부서를 알아내기 위한 선행 읽기 - 이미 없으면 정리 생략
        let current = self.collaborator_repo.find_by_id_uncached(id).await?;

        let department = match &current {
            Some(collaborator) => {
                self.department_repo.find_by_name(&collaborator.department).await?
            }
            None => None,
        };

        let batch = sync::plan_collaborator_delete(object_id, department.as_ref());

        let department_ids = batch.touched_ids(Department::COLLECTION);
        store::commit(&self.db, batch).await?;

        self.collaborator_repo.invalidate_many(&[object_id]).await;
        self.department_repo.invalidate_many(&department_ids).await;

        Ok(())
    }

    /// 협업자 일괄 삭제 (빠른 경로)
    ///
    /// 모든 id를 하나의 원자적 배치로 삭제하되 **부서 측 정리를 수행하지
    /// 않습니다**. 대량 선택에서 id당 추가 읽기를 피하기 위한 의도된
    /// 트레이드오프이며, 부서 문서의 `collaborator_ids`에 남는 고아 id는
    /// 문서화된 비정합 상태입니다.
    pub async fn delete_many_collaborators(
        &self,
        request: BulkDeleteRequest,
    ) -> Result<BulkDeleteResponse, AppError> {
        let ids = request
            .ids
            .iter()
            .map(|id| {
                ObjectId::parse_str(id)
                    .map_err(|_| AppError::ValidationError("유효하지 않은 ID 형식입니다".to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let batch = sync::plan_bulk_delete(&ids);
        store::commit(&self.db, batch).await?;

        self.collaborator_repo.invalidate_many(&ids).await;

        log::info!("협업자 일괄 삭제: {}건 (부서 측 정리 생략)", ids.len());

        Ok(BulkDeleteResponse {
            requested: ids.len(),
            message: "협업자가 일괄 삭제되었습니다 (부서 멤버십 정리는 수행되지 않음)".to_string(),
        })
    }

    /// 협업자 컬렉션의 전체 스냅샷 스트림 구독
    ///
    /// 변경이 있을 때마다 생성 시간 내림차순의 전체 결과 집합을 다시
    /// 내보냅니다.
    pub async fn stream_collaborators(
        &self,
    ) -> Result<BoxStream<'static, Result<Vec<Collaborator>, AppError>>, AppError> {
        self.collaborator_repo.watch_snapshots().await
    }
}
