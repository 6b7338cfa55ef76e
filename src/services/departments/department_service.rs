//! # 부서 관리 서비스 구현
//!
//! 부서 생명주기와, 부서 편집이 함축하는 협업자 측 팬아웃 갱신을 담당하는
//! 비즈니스 로직입니다. 단일 부서 편집이 무제한 수의 협업자 문서 갱신으로
//! 번질 수 있으므로 이 서비스가 정합성 엔진에서 가장 복잡한 경로입니다.
//!
//! ## 팬아웃 지연 특성
//!
//! 이전 소속 정리 단계는 영향을 받는 협업자마다 순차적으로 추가 읽기를
//! 수행하므로, 부서 편집의 지연 시간은 팬아웃 크기에 선형으로 비례합니다.
//! (병렬화하지 않는 것은 의도된 단순화입니다)

use std::sync::Arc;

use futures_util::stream::BoxStream;
use mongodb::bson::oid::ObjectId;
use singleton_macro::service;

use crate::{
    core::errors::AppError,
    db::Database,
    domain::{
        dto::departments::{
            request::{CreateDepartmentRequest, UpdateDepartmentRequest},
            response::{CreateDepartmentResponse, DepartmentResponse},
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
    services::sync::{self, DepartmentPatch},
    store::{self, UpdateSpec, WriteBatch},
    utils::string_utils::validate_required_string,
};

/// 부서 비즈니스 로직 서비스
///
/// ## 주요 책임
///
/// 1. **생성/삭제**: 단건 문서 연산 (다른 문서에 영향 없음 - 삭제 후
///    협업자에 남는 부서 이름 문자열은 문서화된 비정합 상태)
/// 2. **편집**: 이름/관리자/소속 목록 변경을 협업자별 병합 패치로 계산하고,
///    다른 부서에서 끌려온 협업자의 이전 소속까지 정리하여 전체를 하나의
///    원자적 배치로 커밋
/// 3. **조회/구독**: 생성 시간 내림차순 목록과 전체 스냅샷 스트림
#[service(name = "department")]
pub struct DepartmentService {
    /// 부서 데이터 액세스 리포지토리
    department_repo: Arc<DepartmentRepository>,

    /// 협업자 데이터 액세스 리포지토리
    ///
    /// 팬아웃 패치 대상 확인과 이전 소속 정리의 재조회에 사용됩니다.
    collaborator_repo: Arc<CollaboratorRepository>,

    /// 원자적 배치 커밋에 사용하는 데이터베이스 연결
    db: Arc<Database>,
}

impl DepartmentService {
    /// 전체 부서 목록 조회 (생성 시간 내림차순)
    pub async fn list_departments(&self) -> Result<Vec<DepartmentResponse>, AppError> {
        let departments = self.department_repo.list_ordered().await?;
        Ok(departments.into_iter().map(DepartmentResponse::from).collect())
    }

    /// ID로 부서 조회
    pub async fn get_department_by_id(&self, id: &str) -> Result<DepartmentResponse, AppError> {
        let department = self.department_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("부서를 찾을 수 없습니다".to_string()))?;

        Ok(DepartmentResponse::from(department))
    }

    /// 새 부서 생성
    ///
    /// 부서 생성은 협업자 문서에 영향을 주지 않으므로 단건 삽입입니다.
    /// 이름 유일성은 관례일 뿐 저장소가 강제하지 않으므로, 생성 시점의
    /// 중복 검사는 최선 노력입니다 (동시 생성 경합은 막지 못합니다).
    ///
    /// # 반환값
    ///
    /// * `Ok(CreateDepartmentResponse)` - 생성된 부서
    /// * `Err(AppError::ConflictError)` - 같은 이름의 부서가 이미 존재
    pub async fn create_department(
        &self,
        mut request: CreateDepartmentRequest,
    ) -> Result<CreateDepartmentResponse, AppError> {
        // 이름은 동등 조회의 조인 키이므로 앞뒤 공백을 정규화해 저장한다
        request.name = validate_required_string(&request.name, "부서 이름")?;

        // 이름 중복 검사 (관례 강제 - 저장소 수준 유니크 제약은 없다)
        if self.department_repo.find_by_name(&request.name).await?.is_some() {
            return Err(AppError::ConflictError("이미 존재하는 부서 이름입니다".to_string()));
        }

        let department = self.department_repo.create(request.into_department()).await?;

        log::info!("부서 생성 완료: {}", department.name);

        Ok(CreateDepartmentResponse {
            department: DepartmentResponse::from(department),
            message: "부서가 성공적으로 생성되었습니다".to_string(),
        })
    }

    /// 부서 편집
    ///
    /// # 처리 과정
    ///
    /// 1. 현재 부서 문서를 캐시 우회로 읽는다 (없으면 아무것도 쓰지 않고
    ///    NotFound)
    /// 2. 순수 계획 함수로 부서 갱신 + 협업자별 병합 패치를 계산한다
    /// 3. 편집 중인 부서의 (새) 이름이 스탬프된 협업자마다 커밋 전 저장
    ///    상태를 **순차적으로** 재조회한다. 저장된 부서가 다른 실제 부서로
    ///    해석되면 그 부서의 소속 목록에서 이 협업자를 같은 배치에서
    ///    제거한다 (소속 목록 편집으로 다른 부서에서 끌려온 경우의 정리)
    /// 4. 부서 갱신 + 협업자 패치 + 이전 소속 정리를 하나의 원자적 배치로
    ///    커밋한다
    ///
    /// # 반환값
    ///
    /// * `Ok(DepartmentResponse)` - 갱신 후 상태
    /// * `Err(AppError::NotFound)` - 대상 부서가 없음
    /// * `Err(AppError::ValidationError)` - 소속 목록에 잘못된 형식의 id
    pub async fn update_department(
        &self,
        id: &str,
        request: UpdateDepartmentRequest,
    ) -> Result<DepartmentResponse, AppError> {
        let start_time = std::time::Instant::now();

        let object_id = ObjectId::parse_str(id)
            .map_err(|_| AppError::ValidationError("유효하지 않은 ID 형식입니다".to_string()))?;

        // 변경분 계산의 기준이 되는 저장 상태 - 캐시를 우회해 읽는다
        let current = self.department_repo
            .find_by_id_uncached(id)
            .await?
            .ok_or_else(|| AppError::NotFound("부서를 찾을 수 없습니다".to_string()))?;

        let patch = DepartmentPatch {
            name: request.name,
            manager_id: request.manager_id,
            collaborator_ids: request.collaborator_ids,
        };

        let plan = sync::plan_department_edit(&current, &patch);
        let fanout_size = plan.collaborator_patches.len();

        let mut batch = WriteBatch::new();
        batch.update(
            Department::COLLECTION,
            object_id,
            UpdateSpec::from_set(plan.department_update.clone()),
        );

        for (collaborator_id, fields) in &plan.collaborator_patches {
            let collaborator_oid = ObjectId::parse_str(collaborator_id).map_err(|_| {
                AppError::ValidationError(
                    "소속 목록에 유효하지 않은 협업자 id가 있습니다".to_string(),
                )
            })?;

            batch.update(
                Collaborator::COLLECTION,
                collaborator_oid,
                UpdateSpec::from_set(fields.clone()),
            );

            // 이전 소속 정리: 이 부서의 이름이 스탬프된 협업자만 검사 대상
            if sync::needs_stale_cleanup(fields, &plan.final_name) {
                let stored = self.collaborator_repo
                    .find_by_id_uncached(collaborator_id)
                    .await?;

                if let Some(stored) = stored {
                    if !stored.department.is_empty() && stored.department != plan.final_name {
                        let other = self.department_repo
                            .find_by_name(&stored.department)
                            .await?;

                        if let Some(other) = other {
                            if let Some((other_id, removal)) =
                                sync::stale_cleanup_op(&object_id, &other, collaborator_id)
                            {
                                batch.update(Department::COLLECTION, other_id, removal);
                            }
                        }
                    }
                }
            }
        }

        let collaborator_ids = batch.touched_ids(Collaborator::COLLECTION);
        let department_ids = batch.touched_ids(Department::COLLECTION);

        store::commit(&self.db, batch).await?;

        self.collaborator_repo.invalidate_many(&collaborator_ids).await;
        self.department_repo.invalidate_many(&department_ids).await;

        if fanout_size > 0 {
            log::info!(
                "부서 편집 팬아웃 완료: {} - 협업자 {}명 갱신 ({:?} 소요)",
                plan.final_name,
                fanout_size,
                start_time.elapsed()
            );
        }

        let updated = self.department_repo
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("부서를 찾을 수 없습니다".to_string()))?;

        Ok(DepartmentResponse::from(updated))
    }

    /// 부서 삭제
    ///
    /// 부서 문서만 제거합니다. 소속 협업자들의 `department` 문자열은
    /// 건드리지 않습니다 (남은 참조는 알려진 비정합 상태).
    ///
    /// # 반환값
    ///
    /// * `Ok(())` - 삭제 성공
    /// * `Err(AppError::NotFound)` - 해당 ID의 부서가 존재하지 않음
    pub async fn delete_department(&self, id: &str) -> Result<(), AppError> {
        let deleted = self.department_repo.delete(id).await?;

        if !deleted {
            return Err(AppError::NotFound("부서를 찾을 수 없습니다".to_string()));
        }

        Ok(())
    }

    /// 부서 컬렉션의 전체 스냅샷 스트림 구독
    pub async fn stream_departments(
        &self,
    ) -> Result<BoxStream<'static, Result<Vec<Department>, AppError>>, AppError> {
        self.department_repo.watch_snapshots().await
    }
}
