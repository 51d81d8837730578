//! 차트 조회 기간(타임프레임) 정의.
//!
//! 프론트엔드가 보내는 기간 토큰("7d", "ytd" 등)을 업스트림의 `days`
//! 파라미터로 변환합니다.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::error::MarketError;

/// 차트 조회 기간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Timeframe {
    /// 1시간 (업스트림은 1일 5분봉으로 대체)
    #[serde(rename = "1h")]
    H1,
    /// 1일
    #[serde(rename = "1d")]
    D1,
    /// 7일
    #[serde(rename = "7d")]
    D7,
    /// 1개월
    #[serde(rename = "1m")]
    M1,
    /// 6개월
    #[serde(rename = "6m")]
    M6,
    /// 연초 대비
    #[serde(rename = "ytd")]
    Ytd,
    /// 1년
    #[serde(rename = "1y")]
    Y1,
    /// 5년
    #[serde(rename = "5y")]
    Y5,
    /// 10년
    #[serde(rename = "10y")]
    Y10,
    /// 전체 기간
    #[serde(rename = "max")]
    Max,
}

impl Timeframe {
    /// 인식되는 모든 타임프레임.
    pub const ALL: [Timeframe; 10] = [
        Timeframe::H1,
        Timeframe::D1,
        Timeframe::D7,
        Timeframe::M1,
        Timeframe::M6,
        Timeframe::Ytd,
        Timeframe::Y1,
        Timeframe::Y5,
        Timeframe::Y10,
        Timeframe::Max,
    ];

    /// 토큰 문자열로 변환합니다.
    pub fn as_token(&self) -> &'static str {
        match self {
            Timeframe::H1 => "1h",
            Timeframe::D1 => "1d",
            Timeframe::D7 => "7d",
            Timeframe::M1 => "1m",
            Timeframe::M6 => "6m",
            Timeframe::Ytd => "ytd",
            Timeframe::Y1 => "1y",
            Timeframe::Y5 => "5y",
            Timeframe::Y10 => "10y",
            Timeframe::Max => "max",
        }
    }

    /// 토큰 문자열에서 파싱합니다.
    pub fn from_token(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "1h" => Some(Timeframe::H1),
            "1d" => Some(Timeframe::D1),
            "7d" => Some(Timeframe::D7),
            "1m" => Some(Timeframe::M1),
            "6m" => Some(Timeframe::M6),
            "ytd" => Some(Timeframe::Ytd),
            "1y" => Some(Timeframe::Y1),
            "5y" => Some(Timeframe::Y5),
            "10y" => Some(Timeframe::Y10),
            "max" => Some(Timeframe::Max),
            _ => None,
        }
    }

    /// 알 수 없는 토큰은 기본 기간(30일)으로 대체합니다.
    ///
    /// 오타가 별도의 캐시 키를 만들지 않도록 모든 미인식 토큰이
    /// 같은 키로 모입니다.
    pub fn parse_lenient(s: &str) -> Self {
        Self::from_token(s).unwrap_or_default()
    }
}

impl Default for Timeframe {
    fn default() -> Self {
        Timeframe::M1
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_token())
    }
}

impl FromStr for Timeframe {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_token(s)
            .ok_or_else(|| MarketError::InvalidInput(format!("Invalid timeframe: {}", s)))
    }
}

/// 업스트림 `days` 파라미터로 해석된 값.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartDays {
    /// 일 수
    Days(u32),
    /// 전체 기간
    Max,
}

impl fmt::Display for ChartDays {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartDays::Days(days) => write!(f, "{}", days),
            ChartDays::Max => f.write_str("max"),
        }
    }
}

/// 타임프레임별 기간 규칙.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySpec {
    /// 고정 일 수
    Fixed(u32),
    /// 1월 1일 이후 경과 일 수 (매 호출 시 재계산)
    YearToDate,
    /// 전체 기간
    Max,
}

impl FromStr for DaySpec {
    type Err = MarketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ytd" => Ok(DaySpec::YearToDate),
            "max" => Ok(DaySpec::Max),
            other => other
                .parse::<u32>()
                .ok()
                .filter(|days| *days > 0)
                .map(DaySpec::Fixed)
                .ok_or_else(|| MarketError::Config(format!("잘못된 기간 값: {}", s))),
        }
    }
}

/// 타임프레임 → 업스트림 기간 조회 테이블.
#[derive(Debug, Clone)]
pub struct TimeframeTable {
    entries: HashMap<Timeframe, DaySpec>,
}

impl Default for TimeframeTable {
    fn default() -> Self {
        let entries = HashMap::from([
            (Timeframe::H1, DaySpec::Fixed(1)),
            (Timeframe::D1, DaySpec::Fixed(1)),
            (Timeframe::D7, DaySpec::Fixed(7)),
            (Timeframe::M1, DaySpec::Fixed(30)),
            (Timeframe::M6, DaySpec::Fixed(180)),
            (Timeframe::Ytd, DaySpec::YearToDate),
            (Timeframe::Y1, DaySpec::Fixed(365)),
            (Timeframe::Y5, DaySpec::Fixed(1825)),
            (Timeframe::Y10, DaySpec::Fixed(3650)),
            (Timeframe::Max, DaySpec::Max),
        ]);
        Self { entries }
    }
}

impl TimeframeTable {
    /// 테이블에 없는 항목의 기본 기간.
    pub const FALLBACK_DAYS: u32 = 30;

    /// 설정의 토큰 → 기간 문자열 맵으로 기본 테이블을 덮어씁니다.
    pub fn with_overrides(overrides: &HashMap<String, String>) -> Result<Self, MarketError> {
        let mut table = Self::default();
        for (token, days) in overrides {
            let timeframe: Timeframe = token.parse()?;
            table.entries.insert(timeframe, days.parse()?);
        }
        Ok(table)
    }

    /// 타임프레임의 기간 규칙을 조회합니다.
    pub fn spec(&self, timeframe: Timeframe) -> DaySpec {
        self.entries
            .get(&timeframe)
            .copied()
            .unwrap_or(DaySpec::Fixed(Self::FALLBACK_DAYS))
    }

    /// 기준일(`today`)에 맞춰 업스트림 기간 파라미터를 계산합니다.
    pub fn resolve(&self, timeframe: Timeframe, today: NaiveDate) -> ChartDays {
        match self.spec(timeframe) {
            DaySpec::Fixed(days) => ChartDays::Days(days),
            DaySpec::YearToDate => ChartDays::Days(days_since_new_year(today)),
            DaySpec::Max => ChartDays::Max,
        }
    }
}

/// 1월 1일 이후 경과 일 수 (최소 1).
pub fn days_since_new_year(today: NaiveDate) -> u32 {
    // 0-based ordinal = 1월 1일부터 경과한 일 수
    today.ordinal0().max(1)
}
