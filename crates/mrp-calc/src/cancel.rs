//! 協作式取消（較新的請求取代進行中的計算）

use mrp_core::MrpError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// 計算世代計數器
#[derive(Debug, Clone, Default)]
pub struct GenerationCounter {
    latest: Arc<AtomicU64>,
}

impl GenerationCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 開始新的一代，使先前的所有計算失效
    pub fn advance(&self) -> RunGuard {
        let generation = self.latest.fetch_add(1, Ordering::SeqCst) + 1;
        RunGuard {
            latest: Arc::clone(&self.latest),
            generation,
        }
    }

    /// 目前最新的世代
    pub fn current(&self) -> u64 {
        self.latest.load(Ordering::SeqCst)
    }
}

/// 單次計算的取消檢查點
#[derive(Debug, Clone)]
pub struct RunGuard {
    latest: Arc<AtomicU64>,
    generation: u64,
}

impl RunGuard {
    /// 不受任何計數器管理的守衛（永遠不會被取代）
    pub fn detached() -> Self {
        GenerationCounter::new().advance()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// 是否已有較新的計算開始
    pub fn is_superseded(&self) -> bool {
        self.latest.load(Ordering::SeqCst) != self.generation
    }

    /// 已被取代時回傳錯誤
    pub fn check(&self) -> mrp_core::Result<()> {
        if self.is_superseded() {
            Err(MrpError::Superseded {
                generation: self.generation,
            })
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_run_supersedes() {
        let counter = GenerationCounter::new();
        let first = counter.advance();
        assert!(first.check().is_ok());

        let second = counter.advance();
        assert!(first.is_superseded());
        assert_eq!(
            first.check().unwrap_err(),
            MrpError::Superseded { generation: 1 }
        );
        assert!(!second.is_superseded());
        assert_eq!(counter.current(), 2);
    }

    #[test]
    fn test_detached_guard_never_superseded() {
        assert!(RunGuard::detached().check().is_ok());
    }
}
