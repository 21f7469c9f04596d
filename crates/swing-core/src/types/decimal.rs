//! 정밀한 가격 계산을 위한 Decimal 유틸리티.
//!
//! 모든 가격과 임계값은 `rust_decimal::Decimal`로 다룹니다.

use rust_decimal::{Decimal, RoundingStrategy};

/// 금융 정밀도를 위한 가격 타입.
pub type Price = Decimal;

/// 비율 타입 (0.3 = 30%).
pub type Ratio = Decimal;

/// Decimal 연산을 위한 확장 트레이트.
pub trait DecimalExt {
    /// 사사오입(0.5는 0에서 멀어지는 방향)으로 반올림합니다.
    fn round_half_up(&self, dp: u32) -> Decimal;

    /// `base` 대비 변동률(%)을 반환합니다. `base`가 0이면 `None`.
    fn pct_change_from(&self, base: Decimal) -> Option<Decimal>;

    /// 퍼센트 문자열로 변환합니다 (예: "5.25%").
    fn to_percentage_string(&self) -> String;
}

impl DecimalExt for Decimal {
    fn round_half_up(&self, dp: u32) -> Decimal {
        self.round_dp_with_strategy(dp, RoundingStrategy::MidpointAwayFromZero)
    }

    fn pct_change_from(&self, base: Decimal) -> Option<Decimal> {
        if base.is_zero() {
            return None;
        }
        Some((*self - base) / base * Decimal::ONE_HUNDRED)
    }

    fn to_percentage_string(&self) -> String {
        let pct = *self * Decimal::ONE_HUNDRED;
        format!("{:.2}%", pct)
    }
}
