//! # 협업자 리포지토리 구현
//!
//! 협업자 엔티티의 데이터 액세스 계층을 담당하는 리포지토리입니다.
//! MongoDB를 주 저장소로 사용하고, Redis를 통한 단건 조회 캐싱을 지원합니다.
//!
//! ## 특징
//!
//! - **하이브리드 스토리지**: MongoDB + Redis 캐싱
//! - **자동 의존성 주입**: 싱글톤 매크로를 통한 DI
//! - **읽기 전용 경계**: 다중 문서 쓰기는 모두 정합성 엔진의 원자적 배치로
//!   수행되므로, 이 리포지토리는 조회/인덱스/캐시 무효화만 제공합니다

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
    domain::entities::collaborators::collaborator::Collaborator,
    store::subscribe::snapshot_stream,
};

/// 협업자 데이터 액세스 리포지토리
///
/// ## 캐싱 전략
///
/// ### L1 Cache (Redis)
/// - **TTL**: `CACHE_TTL_SECONDS` (기본 600초)
/// - **키 패턴**: 개별 협업자 `collaborator:{id}`
///
/// ### L2 Storage (MongoDB)
/// - **컬렉션명**: `collaborators`
/// - **인덱스**: email(unique), created_at(desc)
///
/// 배치 커밋이 협업자 문서를 건드린 뒤에는 서비스가 [`Self::invalidate_many`]로
/// 건드린 id들의 캐시 키를 일괄 무효화합니다.
#[repository(name = "collaborator", collection = "collaborators")]
pub struct CollaboratorRepository {
    /// MongoDB 데이터베이스 연결
    ///
    /// 자동 주입되는 데이터베이스 컴포넌트입니다.
    /// `collaborators` 컬렉션에 대한 모든 MongoDB 연산을 담당합니다.
    db: Arc<Database>,

    /// Redis 캐시 클라이언트
    ///
    /// 자동 주입되는 Redis 클라이언트입니다.
    /// 단건 조회 성능 향상을 위한 캐싱 레이어를 제공합니다.
    redis: Arc<RedisClient>,
}

impl CollaboratorRepository {
    /// ID로 협업자 조회
    ///
    /// 캐시 우선 조회를 통해 성능을 최적화합니다.
    ///
    /// # 인자
    ///
    /// * `id` - MongoDB ObjectId의 16진수 문자열 표현
    ///
    /// # 반환값
    ///
    /// * `Ok(Some(Collaborator))` - 협업자를 찾은 경우
    /// * `Ok(None)` - 해당 ID의 협업자가 없는 경우
    /// * `Err(AppError::ValidationError)` - 잘못된 ObjectId 형식
    /// * `Err(AppError::DatabaseError)` - 데이터베이스 오류
    pub async fn find_by_id(&self, id: &str) -> Result<Option<Collaborator>, AppError> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| AppError::ValidationError("유효하지 않은 ID 형식입니다".to_string()))?;

        let cache_key = self.cache_key(id);

        // 캐시 확인
        if let Ok(Some(cached)) = self.redis.get::<Collaborator>(&cache_key).await {
            return Ok(Some(cached));
        }

        // DB 조회
        let collaborator = self.collection::<Collaborator>()
            .find_one(doc! { "_id": object_id })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        // 캐시 저장
        if let Some(ref collaborator) = collaborator {
            let _ = self.redis
                .set_with_expiry(&cache_key, collaborator, CacheConfig::ttl_seconds())
                .await;
        }

        Ok(collaborator)
    }

    /// ID로 협업자를 저장소에서 직접 조회 (캐시 우회)
    ///
    /// 부서 편집 팬아웃의 이전 소속 정리 단계처럼 커밋 직전의 저장된 상태가
    /// 필요한 읽기에 사용됩니다. 캐시에 남은 이전 스냅샷이 write-set 계산에
    /// 끼어들면 안 되기 때문에 항상 DB를 읽습니다.
    pub async fn find_by_id_uncached(&self, id: &str) -> Result<Option<Collaborator>, AppError> {
        let object_id = ObjectId::parse_str(id)
            .map_err(|_| AppError::ValidationError("유효하지 않은 ID 형식입니다".to_string()))?;

        self.collection::<Collaborator>()
            .find_one(doc! { "_id": object_id })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// 이메일 주소로 협업자 조회
    ///
    /// 협업자 생성 시의 중복 검사에 사용되므로 캐시를 사용하지 않습니다.
    ///
    /// # 인자
    ///
    /// * `email` - 조회할 협업자의 이메일 주소
    ///
    /// # 반환값
    ///
    /// * `Ok(Some(Collaborator))` - 협업자를 찾은 경우
    /// * `Ok(None)` - 해당 이메일의 협업자가 없는 경우
    /// * `Err(AppError::DatabaseError)` - 데이터베이스 오류
    pub async fn find_by_email(&self, email: &str) -> Result<Option<Collaborator>, AppError> {
        self.collection::<Collaborator>()
            .find_one(doc! { "email": email })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// 생성 시간 내림차순으로 전체 협업자 목록 조회
    ///
    /// 실시간 구독의 스냅샷과 동일한 정렬을 사용합니다.
    pub async fn list_ordered(&self) -> Result<Vec<Collaborator>, AppError> {
        self.collection::<Collaborator>()
            .find(doc! {})
            .sort(doc! { "created_at": -1 })
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?
            .try_collect()
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))
    }

    /// 협업자 컬렉션의 전체 스냅샷 스트림을 생성합니다.
    ///
    /// 변경이 감지될 때마다 생성 시간 내림차순의 전체 결과 집합을
    /// 다시 내보냅니다. 소비자가 스트림을 드롭하면 구독이 종료됩니다.
    pub async fn watch_snapshots(
        &self,
    ) -> Result<BoxStream<'static, Result<Vec<Collaborator>, AppError>>, AppError> {
        snapshot_stream(
            self.collection::<Collaborator>(),
            doc! { "created_at": -1 },
        )
        .await
    }

    /// 배치 커밋이 건드린 협업자 캐시 키들을 일괄 무효화합니다.
    ///
    /// 원자적 배치는 리포지토리를 거치지 않고 쓰기 때문에,
    /// 커밋 성공 후 서비스가 이 메서드로 캐시 정합성을 복구합니다.
    pub async fn invalidate_many(&self, ids: &[ObjectId]) {
        let keys: Vec<String> = ids.iter().map(|id| self.cache_key(&id.to_hex())).collect();
        let _ = self.redis.del_multiple(&keys).await;
        let _ = self.invalidate_collection_cache(None).await;
    }

    /// 데이터베이스 인덱스 생성
    ///
    /// 애플리케이션 초기화 시점에 한 번 실행하여 쿼리 성능을 최적화합니다.
    ///
    /// # 생성되는 인덱스
    ///
    /// 1. **이메일 유니크 인덱스** - 중복 이메일 방지 및 이메일 조회 최적화
    /// 2. **생성일 인덱스** (내림차순) - 목록/스냅샷 정렬 최적화
    pub async fn create_indexes(&self) -> Result<(), AppError> {
        let collection = self.collection::<Collaborator>();

        // 이메일 유니크 인덱스
        let email_index = IndexModel::builder()
            .keys(doc! { "email": 1 })
            .options(IndexOptions::builder()
                .unique(true)
                .name("email_unique".to_string())
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
            .create_indexes([email_index, created_at_index])
            .await
            .map_err(|e| AppError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
