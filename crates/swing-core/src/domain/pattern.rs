//! 돌파/리테스트 패턴 분석 결과 레코드.
//!
//! 모든 레코드는 한 번의 분석 호출 안에서 생성·소비되는 값 타입이며,
//! 생성 이후 변경되지 않습니다.

use crate::types::{Price, Ratio};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 불연속 보정 내역 (감사용).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeriesAdjustment {
    /// 불연속이 발생한 날짜
    pub date: NaiveDate,
    /// 직전 일봉의 보정 전 종가
    pub close_before: Price,
    /// 직전 일봉의 보정 후 종가
    pub close_after: Price,
    /// 적용한 보정 비율 (당일 종가 / 직전 종가)
    pub ratio: Ratio,
}

/// 돌파 지점 (B).
///
/// 스캔 중 관측된 최고가를 넘어선 날짜와 종가.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakoutPoint {
    /// 돌파일
    pub date: NaiveDate,
    /// 돌파 종가
    pub price: Price,
    /// 시계열 내 위치
    pub index: usize,
}

/// 고점 (T).
///
/// B 대비 상승 임계값 이상 오른 상승 구간의 마지막 고점.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeakPoint {
    /// 고점일 (비감소 구간의 마지막 날)
    pub date: NaiveDate,
    /// 고점 종가
    pub price: Price,
    /// 시계열 내 위치
    pub index: usize,
    /// 이 고점을 확정시킨 B의 날짜
    pub breakout_date: NaiveDate,
}

/// 리테스트 이후 목표 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TargetKind {
    /// 리테스트 이후 나타난 다음 T
    NextPeak,
    /// 리테스트 이후 최고 종가
    FutureHigh,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::NextPeak => write!(f, "NEXT_PEAK"),
            TargetKind::FutureHigh => write!(f, "FUTURE_HIGH"),
        }
    }
}

/// 리테스트 레코드.
///
/// T 이후 가격이 짝지어진 B 가격 이하로 되돌아온 경우에만 생성됩니다.
/// `period_days = target_date - b_date >= 0`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetestRecord {
    /// B 날짜
    pub b_date: NaiveDate,
    /// B 가격
    pub b_price: Price,
    /// 리테스트를 판정한 T 날짜
    pub t_date: NaiveDate,
    /// 리테스트일 (T 이후 최저 종가의 첫 날짜)
    pub retest_date: NaiveDate,
    /// 리테스트 종가
    pub retest_price: Price,
    /// 목표 유형
    pub target_kind: TargetKind,
    /// 목표 가격
    pub target_price: Price,
    /// 목표 도달일
    pub target_date: NaiveDate,
    /// B 날짜부터 목표 도달일까지 일수
    pub period_days: i64,
}

/// 목표가 산출 근거.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProjectionBasis {
    /// 확정된 리테스트 패턴
    Retest {
        /// 사용한 레코드의 목표 유형
        target_kind: TargetKind,
        /// 사용한 레코드의 B 날짜
        b_date: NaiveDate,
    },
    /// 최근 변동성 기반 폴백
    Volatility {
        /// 산출된 변동성 (0.2 = 20%)
        volatility: Ratio,
        /// 최소 상승률 적용 후 성장률
        growth: Ratio,
    },
}

/// 목표가 예측 결과.
///
/// 종목별 분석 1회당 정확히 하나가 생성됩니다.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Projection {
    /// 현재가 (마지막 종가)
    pub current_price: Price,
    /// 목표가
    pub target_price: Price,
    /// 기대 수익률 (%, 소수 첫째 자리)
    pub expected_return_pct: Price,
    /// 예상 기간 (일)
    pub period_days: i64,
    /// 예상 도달일 (기준일 + 기간)
    pub target_date: NaiveDate,
    /// 산출 근거
    pub basis: ProjectionBasis,
}

impl Projection {
    /// 확정 패턴 기반 예측인지 확인합니다.
    pub fn is_confirmed(&self) -> bool {
        matches!(self.basis, ProjectionBasis::Retest { .. })
    }
}
