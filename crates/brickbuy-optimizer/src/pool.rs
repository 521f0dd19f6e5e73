//! 候選訂單池
//!
//! 以分數為鍵：分數相同的訂單只保留最先加入者。

use brickbuy_core::Order;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// 候選訂單池
#[derive(Debug, Clone)]
pub struct CandidatePool {
    entries: BTreeMap<Decimal, Order>,
    high_water: usize,
    keep: usize,
}

impl CandidatePool {
    /// 創建新的候選池
    pub fn new(high_water: usize, keep: usize) -> Self {
        Self {
            entries: BTreeMap::new(),
            high_water,
            keep,
        }
    }

    /// 加入訂單；分數已存在時回傳 false
    pub fn insert(&mut self, order: Order) -> bool {
        if self.entries.contains_key(&order.score) {
            return false;
        }
        self.entries.insert(order.score, order);
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 是否已達上限，需要修剪
    pub fn needs_trim(&self) -> bool {
        self.entries.len() >= self.high_water
    }

    /// 目前最佳（分數最低）的訂單
    pub fn best(&self) -> Option<&Order> {
        self.entries.values().next()
    }

    /// 只保留分數最低的 `keep` 張訂單
    pub fn trim(&mut self) {
        if let Some(&cutoff) = self.entries.keys().nth(self.keep) {
            let discarded = self.entries.split_off(&cutoff);
            tracing::debug!(
                "修剪候選池：保留 {} 張，丟棄 {} 張",
                self.entries.len(),
                discarded.len()
            );
        }
    }

    /// 結束搜尋：依分數排序、去除重複、保留前 `keep` 張
    pub fn finish(&mut self) -> Vec<Order> {
        self.trim();
        std::mem::take(&mut self.entries).into_values().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickbuy_core::{Catalog, CatalogBuilder, LotIdx, OptimizerConfig, PartId, RequiredPart, VendorOffer};
    use proptest::prelude::*;

    /// 一種零件，每個賣家一個批次；第 n 個批次總價為 n + 1
    fn catalog(lots: usize) -> (Catalog, OptimizerConfig) {
        let config = OptimizerConfig::new(["Netherlands"]).with_weights(Decimal::ZERO, Decimal::ZERO);
        let brick = PartId::new("3001", "0");
        let mut builder = CatalogBuilder::new(&config)
            .with_parts([RequiredPart::new("3001", "0", 1)])
            .unwrap();
        for n in 0..lots {
            builder
                .add_offer(
                    &brick,
                    VendorOffer::new(format!("v{n}"), "Netherlands", Decimal::from(n + 1), 1, n.to_string()),
                )
                .unwrap();
        }
        (builder.build(), config)
    }

    fn order(catalog: &Catalog, config: &OptimizerConfig, lot: usize) -> Order {
        Order::new(catalog, vec![LotIdx(lot)], config)
    }

    fn scores(orders: &[Order]) -> Vec<Decimal> {
        orders.iter().map(|o| o.score).collect()
    }

    #[test]
    fn test_duplicate_scores_collapse() {
        let (catalog, config) = catalog(3);
        let mut pool = CandidatePool::new(400, 50);

        assert!(pool.insert(order(&catalog, &config, 1)));
        assert!(!pool.insert(order(&catalog, &config, 1)));
        assert!(pool.insert(order(&catalog, &config, 0)));

        assert_eq!(pool.len(), 2);
        assert_eq!(pool.best().unwrap().score, Decimal::from(1));
    }

    #[test]
    fn test_trim_keeps_best() {
        let (catalog, config) = catalog(12);
        let mut pool = CandidatePool::new(10, 4);

        for lot in (0..12).rev() {
            pool.insert(order(&catalog, &config, lot));
        }
        assert!(pool.needs_trim());

        pool.trim();
        assert_eq!(pool.len(), 4);
        assert!(!pool.needs_trim());

        let ranked = pool.finish();
        assert_eq!(scores(&ranked), (1..=4).map(Decimal::from).collect::<Vec<_>>());
        assert!(pool.is_empty());
    }

    #[test]
    fn test_finish_on_empty_pool() {
        let mut pool = CandidatePool::new(400, 50);
        assert!(pool.finish().is_empty());
    }

    proptest! {
        #[test]
        fn prop_trim_is_idempotent(lots in prop::collection::vec(0usize..40, 0..80), keep in 1usize..10) {
            let (catalog, config) = catalog(40);
            let mut pool = CandidatePool::new(keep * 2, keep);
            for lot in lots {
                pool.insert(order(&catalog, &config, lot));
            }

            pool.trim();
            let once: Vec<Decimal> = pool.entries.keys().copied().collect();
            pool.trim();
            let twice: Vec<Decimal> = pool.entries.keys().copied().collect();

            prop_assert!(once.len() <= keep);
            prop_assert_eq!(once, twice);
        }
    }
}
