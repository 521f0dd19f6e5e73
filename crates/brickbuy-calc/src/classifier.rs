//! 零件分類
//!
//! 一次走訪所有零件，分成互不重疊的四組：
//! - 永遠湊不齊：所有批次訂購數量合計仍低於需求
//! - 單一來源：只有一個賣家，該賣家的批次必定購買
//! - 不足（稀缺）：沒有單一批次足夠，每次迭代重新組合多個批次
//! - 可選：其餘零件，每次迭代從候選賣家中選最便宜的批次

use brickbuy_core::{Catalog, LotIdx, PartIdx, VendorIdx};
use std::collections::BTreeSet;

/// 分類結果
#[derive(Debug, Clone, Default)]
pub struct Classification {
    /// 永遠湊不齊的零件
    pub never_enough: Vec<PartIdx>,

    /// 單一來源零件
    pub single_source: Vec<PartIdx>,

    /// 稀缺零件
    pub not_enough: Vec<PartIdx>,

    /// 可選零件（依批次數由少到多）
    pub optimizable: Vec<PartIdx>,

    /// 必買批次（來自單一來源零件）
    pub mandatory_lots: Vec<LotIdx>,

    /// 必選賣家
    pub mandatory_vendors: BTreeSet<VendorIdx>,
}

impl Classification {
    /// 訂單必須涵蓋的零件（排除永遠湊不齊者）
    pub fn required_parts(&self) -> impl Iterator<Item = PartIdx> + '_ {
        self.single_source
            .iter()
            .chain(&self.not_enough)
            .chain(&self.optimizable)
            .copied()
    }

    pub fn is_never_enough(&self, part: PartIdx) -> bool {
        self.never_enough.contains(&part)
    }
}

/// 零件分類器
pub struct PartClassifier;

impl PartClassifier {
    /// 分類所有零件
    pub fn classify(catalog: &Catalog) -> Classification {
        let mut classification = Classification::default();

        for part in catalog.part_indices() {
            let required_qty = catalog.part(part).required_qty;

            if catalog.available_total(part) < u64::from(required_qty) {
                classification.never_enough.push(part);
                continue;
            }

            if let [vendor] = catalog.vendors_of(part) {
                classification.single_source.push(part);
                classification.mandatory_vendors.insert(*vendor);
                classification
                    .mandatory_lots
                    .extend(Self::single_source_lots(catalog, part));
                continue;
            }

            let any_lot_covers = catalog
                .lots_of(part)
                .iter()
                .any(|&lot| catalog.lot(lot).covers(required_qty));

            if any_lot_covers {
                classification.optimizable.push(part);
            } else {
                classification.not_enough.push(part);
            }
        }

        // 最難取得的零件排在前面
        classification
            .optimizable
            .sort_by_key(|&part| catalog.lots_of(part).len());

        tracing::info!(
            "零件分類完成：可選 {}，單一來源 {}，稀缺 {}，永遠湊不齊 {}",
            classification.optimizable.len(),
            classification.single_source.len(),
            classification.not_enough.len(),
            classification.never_enough.len()
        );

        classification
    }

    /// 單一來源零件的必買批次
    ///
    /// 優先取最便宜且單獨足夠的批次；否則依價格由低到高累加到滿足需求。
    fn single_source_lots(catalog: &Catalog, part: PartIdx) -> Vec<LotIdx> {
        let required_qty = catalog.part(part).required_qty;
        let lots = catalog.lots_of(part);

        if let Some(&lot) = lots.iter().find(|&&lot| catalog.lot(lot).covers(required_qty)) {
            return vec![lot];
        }

        let mut chosen = Vec::new();
        let mut covered = 0u64;
        for &lot in lots {
            if covered >= u64::from(required_qty) {
                break;
            }
            covered += u64::from(catalog.lot(lot).order_amount);
            chosen.push(lot);
        }
        chosen
    }
}
