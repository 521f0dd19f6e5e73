//! 訂單組裝與驗證

use brickbuy_calc::{Classification, ScarceSelection};
use brickbuy_core::{Catalog, LotIdx, OptimizerConfig, Order, PartIdx, VendorIdx};
use std::collections::BTreeSet;

use crate::AssemblyError;

/// 訂單組裝器
#[derive(Debug, Clone)]
pub struct OrderAssembler {
    /// 訂單必須涵蓋的零件
    required_parts: BTreeSet<PartIdx>,

    /// 每次迭代挑最便宜批次的零件
    optimizable: Vec<PartIdx>,

    /// 必買批次
    mandatory_lots: Vec<LotIdx>,
}

impl OrderAssembler {
    /// 創建新的組裝器
    pub fn new(classification: &Classification) -> Self {
        Self {
            required_parts: classification.required_parts().collect(),
            optimizable: classification.optimizable.clone(),
            mandatory_lots: classification.mandatory_lots.clone(),
        }
    }

    /// 用候選賣家組裝並驗證訂單
    pub fn assemble(
        &self,
        catalog: &Catalog,
        config: &OptimizerConfig,
        trial: &BTreeSet<VendorIdx>,
        scarce: &ScarceSelection,
    ) -> Result<Order, AssemblyError> {
        // 候選賣家必須涵蓋所有零件，否則直接放棄
        let stocked: BTreeSet<PartIdx> = trial
            .iter()
            .flat_map(|&vendor| catalog.stocked_parts(vendor).iter().copied())
            .collect();
        let missing = self.required_parts.difference(&stocked).count();
        if missing > 0 {
            return Err(AssemblyError::UncoveredParts { missing });
        }

        let mut lots = Vec::with_capacity(
            self.mandatory_lots.len() + scarce.lots.len() + self.optimizable.len(),
        );
        lots.extend_from_slice(&self.mandatory_lots);
        lots.extend_from_slice(&scarce.lots);
        for &part in &self.optimizable {
            lots.push(Self::cheapest_lot(catalog, part, trial)?);
        }

        let order = Order::new(catalog, lots, config);

        if order.vendor_count() > config.max_vendors {
            return Err(AssemblyError::TooManyVendors {
                count: order.vendor_count(),
                max_vendors: config.max_vendors,
            });
        }
        if let Some((vendor, spend)) = order.first_min_buy_violation(catalog) {
            return Err(AssemblyError::MinBuyNotMet { vendor, spend });
        }

        Ok(order)
    }

    /// 候選賣家中最便宜且單獨足夠的批次（批次已依總價排序，同價取先出現者）
    pub fn cheapest_lot(
        catalog: &Catalog,
        part: PartIdx,
        trial: &BTreeSet<VendorIdx>,
    ) -> Result<LotIdx, AssemblyError> {
        let required_qty = catalog.part(part).required_qty;
        catalog
            .lots_of(part)
            .iter()
            .copied()
            .find(|&lot| {
                let lot = catalog.lot(lot);
                trial.contains(&lot.vendor) && lot.covers(required_qty)
            })
            .ok_or(AssemblyError::NoSufficientLot { part })
    }
}
