//! 저장소 구현.
//!
//! - `csv`: 종목별 CSV 파일 디렉토리
//! - `postgres`: PostgreSQL `prices` / `stocks` 테이블

pub mod csv;
pub mod postgres;
