//! # Swing Core
//!
//! 돌파/리테스트 가격 패턴 분석기의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 분석 시스템 전반에서 사용되는 기본 타입을 제공합니다:
//! - 일봉 가격 데이터 (`PricePoint`)
//! - 돌파(B) / 고점(T) / 리테스트 / 목표가 레코드
//! - 종목 식별 정보
//! - 설정 관리
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
