//! 설정 관리.
//!
//! 기본값 → 설정 파일(선택) → 환경 변수 순으로 덮어씁니다.
//! 환경 변수는 `MARKET` 접두사와 `__` 구분자를 사용합니다
//! (예: `MARKET__CHART__REFRESH_AFTER_SECS=60`).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use crate::error::MarketResult;
use crate::types::{TimeframeTable, DEFAULT_CURRENCIES};

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 서버 설정
    #[serde(default)]
    pub server: ServerConfig,
    /// 업스트림 API 설정
    #[serde(default)]
    pub upstream: UpstreamConfig,
    /// 차트 캐시 설정
    #[serde(default)]
    pub chart: ChartCacheConfig,
    /// 시세 스냅샷 설정
    #[serde(default)]
    pub snapshot: SnapshotConfig,
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// 서버 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 바인딩할 호스트
    pub host: String,
    /// 리스닝할 포트
    pub port: u16,
    /// 허용할 CORS origin 목록 (비어 있으면 모두 허용)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8000,
            cors_origins: Vec::new(),
        }
    }
}

/// 업스트림(CoinGecko) API 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// REST API 기본 URL
    pub base_url: String,
    /// 조회할 자산 ID
    pub coin_id: String,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,
    /// 데모 API 키 (선택)
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_fetch_timeout() -> u64 {
    12
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            coin_id: "bitcoin".to_string(),
            fetch_timeout_secs: default_fetch_timeout(),
            api_key: None,
        }
    }
}

impl UpstreamConfig {
    /// 요청 타임아웃을 Duration으로 반환
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// 차트 캐시 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChartCacheConfig {
    /// 이 시간이 지난 항목은 다음 조회 시 백그라운드 갱신 (초)
    #[serde(default = "default_refresh_after")]
    pub refresh_after_secs: u64,
    /// 권장 최대 보관 시간 (초)
    #[serde(default = "default_chart_ttl")]
    pub ttl_secs: u64,
    /// `ttl_secs`를 실제 만료로 취급할지 여부
    #[serde(default)]
    pub enforce_ttl: bool,
    /// 기간 토큰별 일 수 덮어쓰기 (예: "7d" = "14")
    #[serde(default)]
    pub timeframe_table: HashMap<String, String>,
}

fn default_refresh_after() -> u64 {
    15 * 60
}

fn default_chart_ttl() -> u64 {
    60 * 60
}

impl Default for ChartCacheConfig {
    fn default() -> Self {
        Self {
            refresh_after_secs: default_refresh_after(),
            ttl_secs: default_chart_ttl(),
            enforce_ttl: false,
            timeframe_table: HashMap::new(),
        }
    }
}

impl ChartCacheConfig {
    pub fn refresh_after(&self) -> Duration {
        Duration::from_secs(self.refresh_after_secs)
    }

    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// 덮어쓰기가 적용된 기간 테이블을 생성합니다.
    pub fn timeframe_table(&self) -> MarketResult<TimeframeTable> {
        TimeframeTable::with_overrides(&self.timeframe_table)
    }
}

/// 시세 스냅샷 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SnapshotConfig {
    /// 스냅샷 캐시 TTL (초)
    #[serde(default = "default_snapshot_ttl")]
    pub ttl_secs: u64,
    /// 조회할 통화 목록
    #[serde(default = "default_snapshot_currencies")]
    pub currencies: Vec<String>,
    /// 조회할 ETF 티커 목록
    #[serde(default = "default_snapshot_etfs")]
    pub etfs: Vec<String>,
}

fn default_snapshot_ttl() -> u64 {
    60
}

fn default_snapshot_currencies() -> Vec<String> {
    DEFAULT_CURRENCIES.iter().map(|c| c.to_string()).collect()
}

fn default_snapshot_etfs() -> Vec<String> {
    vec!["SPY".to_string(), "VOO".to_string(), "QQQ".to_string()]
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            ttl_secs: default_snapshot_ttl(),
            currencies: default_snapshot_currencies(),
            etfs: default_snapshot_etfs(),
        }
    }
}

impl SnapshotConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 파일이 없으면 기본값과 환경 변수만 사용합니다.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            // 파일에서 로드 (선택)
            .add_source(config::File::from(path.as_ref()).required(false))
            // 환경 변수로 오버라이드
            .add_source(
                config::Environment::with_prefix("MARKET")
                    .separator("__")
                    .try_parsing(true)
                    // 목록 값은 쉼표로 구분 (예: MARKET__SNAPSHOT__ETFS=SPY,QQQ)
                    .list_separator(",")
                    .with_list_parse_key("server.cors_origins")
                    .with_list_parse_key("snapshot.currencies")
                    .with_list_parse_key("snapshot.etfs"),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// 기본 경로에서 설정을 로드합니다.
    pub fn load_default() -> Result<Self, config::ConfigError> {
        Self::load("config/default.toml")
    }
}
