//! 가격 데이터 접근 및 캐싱.
//!
//! 이 crate는 다음을 제공합니다:
//! - 가격 저장소 / 종목 목록 추상화 (`PriceStore`, `InstrumentCatalog`)
//! - CSV 디렉토리 저장소
//! - PostgreSQL 저장소
//! - 종목 코드별 TTL 시계열 캐시

pub mod cache;
pub mod error;
pub mod provider;
pub mod storage;

pub use error::{DataError, Result};

pub use cache::{SeriesCache, SeriesCacheStats};
pub use provider::{InstrumentCatalog, PriceStore, RawPriceRow};
pub use storage::csv::{CsvInstrumentCatalog, CsvPriceStore};
pub use storage::postgres::{Database, DatabaseConfig, PgInstrumentCatalog, PgPriceStore};
