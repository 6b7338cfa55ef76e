//! # 실시간 스냅샷 구독
//!
//! 컬렉션의 변경을 감지할 때마다 전체 정렬 결과 집합을 다시 내보내는
//! 스트림을 제공합니다. Firestore의 `onSnapshot`처럼 델타가 아닌
//! 전체 스냅샷 교체의 시퀀스이며, 소비자가 스트림을 드롭하면 구독이
//! 종료됩니다.
//!
//! MongoDB 변경 스트림(change stream)을 트리거로만 사용하고, 실제 내용은
//! 매번 정렬 조회로 다시 읽습니다. 스냅샷 전달 간격은 저장소의 이벤트
//! 전달 시점에 따라 달라지며 순서 보장 외의 시간 보장은 없습니다.

use futures_util::stream::{self, BoxStream, StreamExt, TryStreamExt};
use mongodb::bson::Document;
use mongodb::Collection;
use serde::de::DeserializeOwned;

use crate::core::errors::AppError;

/// 컬렉션에 대한 전체 스냅샷 스트림을 생성합니다.
///
/// 첫 항목으로 현재 상태의 전체 결과 집합을 내보내고, 이후 컬렉션에
/// 변경이 감지될 때마다 새로 조회한 전체 결과 집합을 내보냅니다.
///
/// # 인자
///
/// * `collection` - 구독할 타입 지정 컬렉션 핸들
/// * `sort` - 매 스냅샷에 적용할 정렬 문서 (예: `doc! { "created_at": -1 }`)
///
/// # 반환값
///
/// * `Ok(stream)` - 전체 결과 집합(`Vec<T>`)의 지연 시퀀스
/// * `Err(AppError::DatabaseError)` - 초기 조회 또는 변경 스트림 구독 실패
///
/// # 예제
///
/// ```rust,ignore
/// let stream = snapshot_stream(
///     db.get_database().collection::<Collaborator>("collaborators"),
///     doc! { "created_at": -1 },
/// ).await?;
/// ```
pub async fn snapshot_stream<T>(
    collection: Collection<T>,
    sort: Document,
) -> Result<BoxStream<'static, Result<Vec<T>, AppError>>, AppError>
where
    T: DeserializeOwned + Send + Sync + Unpin + 'static,
{
    // 변경 스트림을 먼저 열고 초기 스냅샷을 읽는다
    // (반대 순서면 그 사이의 변경이 다음 이벤트까지 보이지 않는다)
    let events = collection
        .watch()
        .await
        .map_err(|e| AppError::DatabaseError(format!("변경 스트림 구독 실패: {}", e)))?;

    let initial = fetch_snapshot(&collection, sort.clone()).await?;

    let tail = stream::unfold(
        (collection, sort, events),
        |(collection, sort, mut events)| async move {
            match events.next().await {
                Some(Ok(_event)) => {
                    // 이벤트 내용과 무관하게 전체 결과를 다시 조회
                    let snapshot = fetch_snapshot(&collection, sort.clone()).await;
                    Some((snapshot, (collection, sort, events)))
                }
                Some(Err(e)) => Some((
                    Err(AppError::DatabaseError(e.to_string())),
                    (collection, sort, events),
                )),
                None => None,
            }
        },
    );

    Ok(stream::once(async move { Ok(initial) }).chain(tail).boxed())
}

/// 정렬이 적용된 전체 결과 집합을 한 번 조회합니다.
async fn fetch_snapshot<T>(collection: &Collection<T>, sort: Document) -> Result<Vec<T>, AppError>
where
    T: DeserializeOwned + Send + Sync + Unpin,
{
    collection
        .find(Document::new())
        .sort(sort)
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))?
        .try_collect()
        .await
        .map_err(|e| AppError::DatabaseError(e.to_string()))
}
