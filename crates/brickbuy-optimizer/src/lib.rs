//! # BrickBuy Optimizer
//!
//! 限時隨機搜尋：抽選賣家組合 → 組裝訂單 → 驗證 → 計分 → 保留最佳候選

pub mod assembler;
pub mod generator;
pub mod pool;
pub mod search;

// Re-export 主要類型
pub use assembler::OrderAssembler;
pub use generator::{CandidateGenerator, Tier, TierQuotas};
pub use pool::CandidatePool;
pub use search::{OrderSearch, SearchState};

use brickbuy_calc::Diagnostics;
use brickbuy_core::{Order, PartIdx, VendorIdx};
use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

/// 隨機配額不可行
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DrawError {
    #[error("賣家名額不足：已預選 {preselected} 家，上限 {max_vendors} 家")]
    VendorBudgetExhausted { preselected: usize, max_vendors: usize },

    #[error("沒有剩餘的賣家名額可抽選")]
    NoChoicesLeft,

    #[error("近距離次要賣家配額為負: {0}")]
    NegativeQuota(i64),

    #[error("{tier} 層只有 {available} 家賣家，無法抽選 {requested} 家")]
    TierTooSmall {
        tier: Tier,
        requested: usize,
        available: usize,
    },
}

/// 訂單組裝失敗
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AssemblyError {
    #[error("候選賣家無法涵蓋 {missing} 種零件")]
    UncoveredParts { missing: usize },

    #[error("候選賣家沒有足夠數量的零件 {part}")]
    NoSufficientLot { part: PartIdx },

    #[error("賣家數 {count} 超過上限 {max_vendors}")]
    TooManyVendors { count: usize, max_vendors: usize },

    #[error("賣家 {vendor} 消費 {spend} 未達最低消費")]
    MinBuyNotMet { vendor: VendorIdx, spend: Decimal },
}

/// 單次迭代被略過的原因
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkipReason {
    #[error("抽選不可行: {0}")]
    InfeasibleDraw(#[from] DrawError),

    #[error("組裝不可行: {0}")]
    InfeasibleAssembly(#[from] AssemblyError),
}

/// 搜尋統計
#[derive(Debug, Clone, Default, Serialize)]
pub struct SearchStats {
    /// 迭代次數
    pub attempts: u64,

    /// 有效訂單數
    pub valid_orders: u64,

    /// 抽選不可行次數
    pub infeasible_draws: u64,

    /// 組裝不可行次數
    pub infeasible_assemblies: u64,

    /// 候選池修剪次數
    pub trims: u64,
}

impl SearchStats {
    /// 有效訂單比例（百分比）
    pub fn success_rate(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        self.valid_orders as f64 / self.attempts as f64 * 100.0
    }
}

/// 搜尋結果
#[derive(Debug, Clone, Serialize)]
pub enum SearchOutcome {
    /// 找到可行訂單：最佳訂單與依分數排序的候選（含最佳）
    Found { best: Order, ranked: Vec<Order> },

    /// 期限內沒有任何可行訂單
    NoFeasibleOrder,
}

/// 優化結果
#[derive(Debug, Clone, Serialize)]
pub struct OptimizationResult {
    /// 本次搜尋ID
    pub run_id: Uuid,

    /// 開始時間
    pub started_at: DateTime<Local>,

    /// 結束時間
    pub finished_at: DateTime<Local>,

    /// 搜尋結果
    pub outcome: SearchOutcome,

    /// 零件診斷
    pub diagnostics: Diagnostics,

    /// 統計
    pub stats: SearchStats,
}

impl OptimizationResult {
    /// 是否可行
    pub fn is_feasible(&self) -> bool {
        matches!(self.outcome, SearchOutcome::Found { .. })
    }

    /// 最佳訂單
    pub fn best(&self) -> Option<&Order> {
        match &self.outcome {
            SearchOutcome::Found { best, .. } => Some(best),
            SearchOutcome::NoFeasibleOrder => None,
        }
    }

    /// 依分數排序的候選訂單
    pub fn ranked(&self) -> &[Order] {
        match &self.outcome {
            SearchOutcome::Found { ranked, .. } => ranked,
            SearchOutcome::NoFeasibleOrder => &[],
        }
    }
}
