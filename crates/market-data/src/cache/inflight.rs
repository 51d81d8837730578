//! 백그라운드 갱신 중인 키 집합.
//!
//! [`InFlightRegistry::try_acquire`]는 "없으면 삽입"을 한 번의 원자적
//! 연산으로 수행합니다. 반환된 [`InFlightGuard`]가 drop될 때 키가
//! 제거되므로 갱신 태스크가 성공하든 실패하든 패닉하든 표시가 남지 않습니다.

use dashmap::DashSet;
use market_core::ChartKey;
use std::sync::Arc;

/// 갱신 중인 키 레지스트리.
#[derive(Debug, Clone, Default)]
pub struct InFlightRegistry {
    keys: Arc<DashSet<ChartKey>>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 키를 선점합니다. 이미 갱신 중이면 `None`.
    pub fn try_acquire(&self, key: &ChartKey) -> Option<InFlightGuard> {
        if self.keys.insert(key.clone()) {
            Some(InFlightGuard {
                keys: self.keys.clone(),
                key: key.clone(),
            })
        } else {
            None
        }
    }

    pub fn contains(&self, key: &ChartKey) -> bool {
        self.keys.contains(key)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

/// 선점한 키. drop 시 레지스트리에서 제거됩니다.
#[derive(Debug)]
#[must_use = "guard를 버리면 즉시 선점이 해제됩니다"]
pub struct InFlightGuard {
    keys: Arc<DashSet<ChartKey>>,
    key: ChartKey,
}

impl InFlightGuard {
    pub fn key(&self) -> &ChartKey {
        &self.key
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.keys.remove(&self.key);
    }
}
