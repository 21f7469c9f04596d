//! CLI 명령어 구현 모듈.

pub mod analyze;
pub mod output;
pub mod rank;
pub mod source;
pub mod track;
pub mod zones;
