//! # 부서 리포지토리 구현
//!
//! 부서 엔티티의 데이터 액세스 계층을 담당하는 리포지토리입니다.
//! 이름 동등 조회는 협업자 → 부서 방향의 유일한 색인 수단이며,
//! 배치 계획의 입력이 되므로 캐시를 거치지 않습니다.

use std::sync::Arc;
use futures_util::stream::{BoxStream, TryStreamExt};
use mongodb::{bson::{doc, oid::ObjectId}, options::IndexOptions, IndexModel};
use singleton_macro::repository;

use crate::{
    caching::redis::RedisClient,
    config::CacheConfig,
    core::errors::AppError,
    core::registry::Repository,
    db::Database,
    domain::entities::departments::department::Department,
    store::subscribe::snapshot_stream,
};

/// 부서 데이터 액세스 리포지토리
///
/// ## 캐싱 전략
///
/// - 단건 id 조회만 캐싱합니다 (키 `department:{id}`, TTL `CACHE_TTL_SECONDS`)
/// - **이름 조회는 캐싱하지 않습니다**: write-set 계산의 입력이 되는 읽기라
///   오래된 스냅샷이 배치에 끼어들면 안 되기 때문입니다
///
/// ## 인덱스
///
/// - `name` (오름차순, **non-unique**): 이름 유일성은 관례일 뿐 저장소가
///   강제하지 않으므로 유니크 인덱스를 걸지 않습니다. 중복 이름이 있으면
///   조회는 첫 매치를 반환합니다.
/// - `created_at` (내림차순): 목록/스냅샷 정렬
#[repository(name = "department", collection = "departments")]
pub struct DepartmentRepository {
    /// MongoDB 데이터베이스 연결
    db: Arc<Database>,

    /// Redis 캐시 클라이언트
    redis: Arc<RedisClient>,
}

impl DepartmentRepository {
    /// ID로 부서 조회
    ///
    /// 캐시 우선 조회를 통해 성능을 최적화합니다.
    ///
    /// # 반환값
    ///
    /// * `Ok(Some(Department))` - 부서를 찾은 경우
    /// * `Ok(None)` - 해당 ID의 부서가 없는 경우
    /// * `Err(AppError::ValidationError)` - 잘못된 ObjectId 형식
    /// * `Err(AppError::DatabaseError)` - 데이터베이스 오류
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Department>, AppError> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| AppError::ValidationError("유효하지 않은 ID 형식입니다".to_string()))?;

        let cache_key = self.cache_key(id);

        // 캐시 확인
        if let Ok(Some(cached)) = self.redis.get::<Department>(&cache_key).await {
            return Ok(Some(cached));
        }

        // DB 조회
        let department = self.collection::<Department>()
            .find_one(doc! { "_id": object_id })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        // 캐시 저장
        if let Some(ref department) = department {
            let _ = self.redis
                .set_with_expiry(&cache_key, department, CacheConfig::ttl_seconds())
                .await;
        }

        Ok(department)
    }

    /// ID로 부서를 저장소에서 직접 조회 (캐시 우회)
    ///
    /// 부서 편집처럼 "현재 저장된 상태 대비 변경분"을 계산해야 하는 경로에서
    /// 사용됩니다.
    pub async fn find_by_id_uncached(&self, id: &str) -> Result<Option<Department>, AppError> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| AppError::ValidationError("유효하지 않은 ID 형식입니다".to_string()))?;

        self.collection::<Department>()
            .find_one(doc! { "_id": object_id })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// 이름으로 부서 조회
    ///
    /// 협업자 문서가 가지고 있는 유일한 관계 키(부서 이름)로 부서를 찾습니다.
    ///
    /// # 동작
    ///
    /// - 빈 이름 → 쿼리를 보내지 않고 즉시 `Ok(None)`
    /// - 하나 이상 일치 → **첫 번째** 일치 문서 반환 (중복 이름은 에러가 아닌
    ///   알려진 모호성)
    /// - 일치 없음 → `Ok(None)`
    ///
    /// 저장소 오류 외의 에러 조건은 없습니다.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<Department>, AppError> {
        if name.is_empty() {
            return Ok(None);
        }

        self.collection::<Department>()
            .find_one(doc! { "name": name })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// 생성 시간 내림차순으로 전체 부서 목록 조회
    pub async fn list_ordered(&self) -> Result<Vec<Department>, AppError> {
        self.collection::<Department>()
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// 새 부서 생성
    ///
    /// 부서 생성은 다른 문서에 영향을 주지 않으므로 배치 없이 단건 삽입합니다.
    ///
    /// # 반환값
    ///
    /// * `Ok(Department)` - 생성된 부서 (ID 포함)
    /// * `Err(AppError::DatabaseError)` - 데이터베이스 오류
    pub async fn create(&self, mut department: Department) -> Result<Department, AppError> {
        let result = self.collection::<Department>()
            .insert_one(&department)
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        department.id = result.inserted_id.as_object_id();

        // 컬렉션 캐시 무효화
        let _ = self.invalidate_collection_cache(None).await;

        Ok(department)
    }

    /// 부서 삭제
    ///
    /// 부서 문서만 제거합니다. 소속 협업자들의 `department` 문자열은
    /// 건드리지 않으며, 남은 참조는 알려진 비정합 상태로 문서화되어 있습니다.
    ///
    /// # 반환값
    ///
    /// * `Ok(true)` - 부서가 삭제됨
    /// * `Ok(false)` - 해당 ID의 부서가 존재하지 않음
    /// * `Err(AppError::ValidationError)` - 잘못된 ObjectId 형식
    /// * `Err(AppError::DatabaseError)` - 데이터베이스 오류
    pub async fn delete(&self, id: &str) -> Result<bool, AppError> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| AppError::ValidationError("유효하지 않은 ID 형식입니다".to_string()))?;

        let result = self.collection::<Department>()
            .delete_one(doc! { "_id": object_id })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        if result.deleted_count > 0 {
            // 캐시 무효화
            let _ = self.invalidate_cache(id).await;
            let _ = self.invalidate_collection_cache(None).await;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// 부서 컬렉션의 전체 스냅샷 스트림을 생성합니다.
    pub async fn watch_snapshots(
        &self,
    ) -> Result<BoxStream<'static, Result<Vec<Department>, AppError>>, AppError> {
        snapshot_stream(
            self.collection::<Department>(),
            doc! { "created_at": -1 },
        )
        .await
    }

    /// 배치 커밋이 건드린 부서 캐시 키들을 일괄 무효화합니다.
    pub async fn invalidate_many(&self, ids: &[ObjectId]) {
        let keys: Vec<String> = ids.iter().map(|id| self.cache_key(&id.to_hex())).collect();
        let _ = self.redis.del_multiple(&keys).await;
        let _ = self.invalidate_collection_cache(None).await;
    }

    /// 데이터베이스 인덱스 생성
    ///
    /// # 생성되는 인덱스
    ///
    /// 1. **이름 인덱스** (non-unique) - 이름 동등 조회 최적화.
    ///    이름 유일성은 관례일 뿐이므로 유니크 제약을 걸지 않습니다.
    /// 2. **생성일 인덱스** (내림차순) - 목록/스냅샷 정렬 최적화
    pub async fn create_indexes(&self) -> Result<(), AppError> {
        let collection = self.collection::<Department>();

        // 이름 인덱스 (non-unique)
        let name_index = IndexModel::builder()
            .keys(doc! { "name": 1 })
            .options(IndexOptions::builder()
                .name("name_lookup".to_string())
                .build())
            .build();

        // 생성일 인덱스
        let created_at_index = IndexModel::builder()
            .keys(doc! { "created_at": -1 })
            .options(IndexOptions::builder()
                .name("created_at_desc".to_string())
                .build())
            .build();

        collection
            .create_indexes([name_index, created_at_index])
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
