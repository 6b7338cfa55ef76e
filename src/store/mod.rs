//! # Document Store Batch Module
//!
//! 외부 문서 저장소(MongoDB)에 대한 원자적 다중 문서 배치 커밋과
//! 실시간 스냅샷 구독을 제공하는 모듈입니다.
//!
//! 정합성 엔진의 모든 다중 문서 갱신은 "한 번 읽고, 이미 읽은 데이터로
//! write-set을 만들고, 단일 라운드로 원자 커밋"하는 형태입니다.
//! 읽기-수정-쓰기 대화형 트랜잭션이나 충돌 재시도는 수행하지 않으며,
//! 배치를 만들기 전의 읽기가 실패하면 어떤 쓰기도 시도되지 않습니다.
//!
//! ## 모듈 구성
//!
//! - [`batch`] - 순수 자료구조인 `WriteBatch`/`UpdateSpec` (계획 계층의 출력)
//! - [`subscribe`] - 변경 이벤트마다 전체 정렬 결과를 다시 내보내는 스냅샷 스트림
//!
//! ## 원자성
//!
//! [`commit`]은 배치 전체를 하나의 MongoDB 트랜잭션 세션으로 적용합니다.
//! 커밋이 성공하면 전부 반영되고, 실패하면 아무것도 반영되지 않습니다.

pub mod batch;
pub mod subscribe;

pub use batch::{UpdateSpec, WriteBatch, WriteOp};

use log::{debug, error};
use mongodb::bson::{doc, Document};

use crate::core::errors::AppError;
use crate::db::Database;

/// 쓰기 배치를 하나의 트랜잭션으로 커밋합니다.
///
/// 누적된 연산들을 순서대로 실행한 뒤 트랜잭션을 커밋합니다.
/// 어느 연산이든 실패하면 트랜잭션을 중단하고 `DatabaseError`를 반환하며,
/// 이 경우 저장소에는 아무 변경도 남지 않습니다. 재시도는 하지 않습니다.
///
/// # 인자
///
/// * `db` - 데이터베이스 연결 래퍼
/// * `batch` - 커밋할 쓰기 배치 (비어 있으면 즉시 성공)
///
/// # 반환값
///
/// * `Ok(())` - 배치 전체가 원자적으로 반영됨
/// * `Err(AppError::DatabaseError)` - 세션/연산/커밋 실패 (아무것도 반영되지 않음)
pub async fn commit(db: &Database, batch: WriteBatch) -> Result<(), AppError> {
    if batch.is_empty() {
        debug!("빈 배치 커밋 요청 - 무시");
        return Ok(());
    }

    let mut session = db
        .client()
        .start_session()
        .await
        .map_err(|e| AppError::DatabaseError(format!("배치 세션 시작 실패: {}", e)))?;

    session
        .start_transaction()
        .await
        .map_err(|e| AppError::DatabaseError(format!("트랜잭션 시작 실패: {}", e)))?;

    let database = db.get_database();
    let op_count = batch.len();

    for op in batch.into_ops() {
        let result = match op {
            WriteOp::Set {
                collection,
                document,
                ..
            } => database
                .collection::<Document>(collection)
                .insert_one(document)
                .session(&mut session)
                .await
                .map(|_| ()),
            WriteOp::Update {
                collection,
                id,
                update,
            } => database
                .collection::<Document>(collection)
                .update_one(doc! { "_id": id }, update.into_document())
                .session(&mut session)
                .await
                .map(|_| ()),
            WriteOp::Delete { collection, id } => database
                .collection::<Document>(collection)
                .delete_one(doc! { "_id": id })
                .session(&mut session)
                .await
                .map(|_| ()),
        };

        if let Err(e) = result {
            let _ = session.abort_transaction().await;
            error!("배치 쓰기 실패, 트랜잭션 중단: {}", e);
            return Err(AppError::DatabaseError(e.to_string()));
        }
    }

    if let Err(e) = session.commit_transaction().await {
        let _ = session.abort_transaction().await;
        error!("배치 커밋 실패 ({}개 연산): {}", op_count, e);
        return Err(AppError::DatabaseError(format!("배치 커밋 실패: {}", e)));
    }

    debug!("원자적 배치 커밋 완료: {}개 연산", op_count);
    Ok(())
}
