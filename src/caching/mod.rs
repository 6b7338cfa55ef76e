//! # Caching Module
//!
//! Redis 기반 캐싱 계층을 제공하는 모듈입니다.
//!
//! ## 모듈 구성
//!
//! - [`redis`] - Redis 캐시 클라이언트 래퍼
//!
//! ## 캐싱 전략
//!
//! 리포지토리의 단건 조회(`find_by_id`)만 캐싱합니다.
//! 부서 이름 동등 조회는 배치 계획(write-set 계산)의 입력이 되므로
//! 캐시를 거치지 않고 항상 데이터베이스를 직접 조회합니다.
//! 문서를 수정하는 모든 경로(배치 커밋 포함)는 건드린 문서의
//! 캐시 키를 무효화합니다.

pub mod redis;
