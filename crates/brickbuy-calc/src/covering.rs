//! 稀缺零件的多批次組合
//!
//! 每次迭代重新隨機組合，讓搜尋能探索不同的賣家搭配。

use brickbuy_core::{Catalog, LotIdx, PartIdx, VendorIdx};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;

/// 本次迭代所有稀缺零件的選擇
#[derive(Debug, Clone, Default)]
pub struct ScarceSelection {
    pub lots: Vec<LotIdx>,
    pub vendors: BTreeSet<VendorIdx>,
}

/// 稀缺零件組合器
pub struct ScarceCoverer;

impl ScarceCoverer {
    /// 為所有稀缺零件各自組合一組批次
    pub fn select<R: Rng + ?Sized>(
        catalog: &Catalog,
        scarce_parts: &[PartIdx],
        rng: &mut R,
    ) -> ScarceSelection {
        let mut selection = ScarceSelection::default();

        for &part in scarce_parts {
            let lots = Self::cover_part(catalog, part, rng);
            selection
                .vendors
                .extend(lots.iter().map(|&lot| catalog.lot(lot).vendor));
            selection.lots.extend(lots);
        }

        selection
    }

    /// 為單一零件組合批次
    ///
    /// 1. 隨機排列批次，依序加入直到數量足夠
    /// 2. 若超出需求，依訂購數量由小到大排序，反覆移除最大的批次，
    ///    直到再移除就會不足為止
    pub fn cover_part<R: Rng + ?Sized>(catalog: &Catalog, part: PartIdx, rng: &mut R) -> Vec<LotIdx> {
        let required = u64::from(catalog.part(part).required_qty);
        let amount_of = |lot: LotIdx| u64::from(catalog.lot(lot).order_amount);

        let mut candidates = catalog.lots_of(part).to_vec();
        candidates.shuffle(rng);

        let mut chosen = Vec::new();
        let mut covered = 0u64;
        for lot in candidates {
            if covered >= required {
                break;
            }
            covered += amount_of(lot);
            chosen.push(lot);
        }

        if covered <= required {
            return chosen;
        }

        chosen.sort_by_key(|&lot| amount_of(lot));
        while let Some(&largest) = chosen.last() {
            if covered - amount_of(largest) < required {
                break;
            }
            covered -= amount_of(largest);
            chosen.pop();
        }

        chosen
    }
}
