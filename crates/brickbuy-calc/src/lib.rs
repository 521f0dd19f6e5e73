//! # BrickBuy Calculation
//!
//! 搜尋前的分析步驟：零件分類、賣家分層、稀缺零件的多批次組合

pub mod classifier;
pub mod covering;
pub mod stratifier;

// Re-export 主要類型
pub use classifier::{Classification, PartClassifier};
pub use covering::{ScarceCoverer, ScarceSelection};
pub use stratifier::{VendorStratifier, VendorTiers};

use brickbuy_core::{Catalog, PartId};
use serde::Serialize;

/// 列出「可選零件中批次最少」的數量
pub const FEWEST_LOTS_REPORT: usize = 10;

/// 分類診斷資訊（交給呼叫端顯示）
#[derive(Debug, Clone, Default, Serialize)]
pub struct Diagnostics {
    /// 永遠湊不齊的零件
    pub never_enough: Vec<PartId>,

    /// 沒有單一批次足夠、必須拆單的零件
    pub not_enough: Vec<PartId>,

    /// 批次最少的可選零件（零件, 批次數）
    pub fewest_lots: Vec<(PartId, usize)>,

    /// 警告信息
    pub warnings: Vec<PartWarning>,
}

impl Diagnostics {
    /// 由分類結果產生診斷資訊
    pub fn from_classification(catalog: &Catalog, classification: &Classification) -> Self {
        let mut diagnostics = Self {
            never_enough: classification
                .never_enough
                .iter()
                .map(|&part| catalog.part(part).id.clone())
                .collect(),
            not_enough: classification
                .not_enough
                .iter()
                .map(|&part| catalog.part(part).id.clone())
                .collect(),
            fewest_lots: classification
                .optimizable
                .iter()
                .take(FEWEST_LOTS_REPORT)
                .map(|&part| (catalog.part(part).id.clone(), catalog.lots_of(part).len()))
                .collect(),
            warnings: Vec::new(),
        };

        for &part in &classification.never_enough {
            diagnostics.add_warning(PartWarning::error(
                catalog.part(part).id.to_string(),
                format!(
                    "所有賣家合計只有 {} 個，需求 {} 個，永遠湊不齊；請考慮改用其他顏色",
                    catalog.available_total(part),
                    catalog.part(part).required_qty
                ),
            ));
        }
        for &part in &classification.single_source {
            diagnostics.add_warning(PartWarning::info(
                catalog.part(part).id.to_string(),
                "只有一家賣家供應，該賣家必定列入訂單".to_string(),
            ));
        }
        for &part in &classification.not_enough {
            diagnostics.add_warning(PartWarning::warning(
                catalog.part(part).id.to_string(),
                "沒有單一批次足夠，必須向多個賣家拆單購買".to_string(),
            ));
        }

        diagnostics
    }

    /// 添加警告
    pub fn add_warning(&mut self, warning: PartWarning) {
        self.warnings.push(warning);
    }

    pub fn has_unsatisfiable_parts(&self) -> bool {
        !self.never_enough.is_empty()
    }
}

/// 零件警告
#[derive(Debug, Clone, Serialize)]
pub struct PartWarning {
    pub part_id: String,
    pub message: String,
    pub severity: WarningSeverity,
}

impl PartWarning {
    pub fn new(part_id: String, message: String, severity: WarningSeverity) -> Self {
        Self {
            part_id,
            message,
            severity,
        }
    }

    pub fn info(part_id: String, message: String) -> Self {
        Self::new(part_id, message, WarningSeverity::Info)
    }

    pub fn warning(part_id: String, message: String) -> Self {
        Self::new(part_id, message, WarningSeverity::Warning)
    }

    pub fn error(part_id: String, message: String) -> Self {
        Self::new(part_id, message, WarningSeverity::Error)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WarningSeverity {
    Info,
    Warning,
    Error,
}
