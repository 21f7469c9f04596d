//! 종목 식별 정보.

use serde::{Deserialize, Serialize};
use std::fmt;

/// 종목 코드와 표시 이름.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Instrument {
    /// 종목 코드 (예: "005930")
    pub code: String,
    /// 종목명 (예: "삼성전자")
    pub name: String,
}

impl Instrument {
    /// 새 종목을 생성합니다.
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Instrument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.code)
    }
}
