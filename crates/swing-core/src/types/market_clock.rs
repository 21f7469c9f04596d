//! 한국 시장 기준 날짜.

use chrono::{NaiveDate, Utc};
use chrono_tz::Asia::Seoul;

/// 한국 표준시(KST) 기준 오늘 날짜를 반환합니다.
///
/// 목표 도달일은 "오늘 + 예상 기간"으로 계산되므로, 서버 시간대와 무관하게
/// 국내 시장 날짜를 기준으로 삼습니다.
pub fn kst_today() -> NaiveDate {
    Utc::now().with_timezone(&Seoul).date_naive()
}
