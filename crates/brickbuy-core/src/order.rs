//! 訂單模型（優化的候選解）

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::hash::{Hash, Hasher};

use crate::catalog::{Catalog, LotIdx, PartIdx, VendorIdx};
use crate::config::OptimizerConfig;

/// 訂單
///
/// 訂單之間的相等、排序與雜湊只依分數比較：分數相同但批次不同的
/// 兩張訂單會被視為重複。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    /// 選擇的批次（稀缺零件可能有多個批次）
    pub lots: Vec<LotIdx>,

    /// 使用的賣家
    pub vendors: BTreeSet<VendorIdx>,

    /// 總價
    pub total_price: Decimal,

    /// 近距離賣家數
    pub near_vendors: usize,

    /// 遠距離賣家數
    pub far_vendors: usize,

    /// 分數（總價 + 賣家懲罰，取整）
    pub score: Decimal,
}

impl Order {
    /// 由批次建立訂單並計算分數
    pub fn new(catalog: &Catalog, lots: Vec<LotIdx>, config: &OptimizerConfig) -> Self {
        let vendors: BTreeSet<VendorIdx> = lots.iter().map(|&lot| catalog.lot(lot).vendor).collect();
        let total_price: Decimal = lots.iter().map(|&lot| catalog.lot(lot).total_price).sum();
        let near_vendors = vendors
            .iter()
            .filter(|&&vendor| catalog.vendor(vendor).is_near)
            .count();
        let far_vendors = vendors.len() - near_vendors;

        let score = (total_price
            + config.weight_near * Decimal::from(near_vendors)
            + config.weight_far * Decimal::from(far_vendors))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);

        Self {
            lots,
            vendors,
            total_price,
            near_vendors,
            far_vendors,
            score,
        }
    }

    /// 賣家數量
    pub fn vendor_count(&self) -> usize {
        self.vendors.len()
    }

    /// 每個賣家的消費金額
    pub fn money_per_vendor(&self, catalog: &Catalog) -> BTreeMap<VendorIdx, Decimal> {
        let mut spend = BTreeMap::new();
        for &lot_idx in &self.lots {
            let lot = catalog.lot(lot_idx);
            *spend.entry(lot.vendor).or_insert(Decimal::ZERO) += lot.total_price;
        }
        spend
    }

    /// 每個賣家的批次數
    pub fn lots_per_vendor(&self, catalog: &Catalog) -> BTreeMap<VendorIdx, usize> {
        let mut counts = BTreeMap::new();
        for &lot_idx in &self.lots {
            *counts.entry(catalog.lot(lot_idx).vendor).or_insert(0) += 1;
        }
        counts
    }

    /// 第一個未達最低消費的賣家
    pub fn first_min_buy_violation(&self, catalog: &Catalog) -> Option<(VendorIdx, Decimal)> {
        self.money_per_vendor(catalog)
            .into_iter()
            .find(|&(vendor, spend)| spend < catalog.vendor(vendor).min_buy)
    }

    /// 所有賣家的消費是否都達到最低消費
    pub fn valid_min_buy(&self, catalog: &Catalog) -> bool {
        self.first_min_buy_violation(catalog).is_none()
    }

    /// 訂單涵蓋的零件
    pub fn covered_parts(&self, catalog: &Catalog) -> BTreeSet<PartIdx> {
        self.lots.iter().map(|&lot| catalog.lot(lot).part).collect()
    }

    /// 某零件在訂單中的訂購數量
    pub fn ordered_amount(&self, catalog: &Catalog, part: PartIdx) -> u64 {
        self.lots
            .iter()
            .map(|&lot| catalog.lot(lot))
            .filter(|lot| lot.part == part)
            .map(|lot| u64::from(lot.order_amount))
            .sum()
    }

    /// 購買清單：(購買連結, 訂購數量)，依連結排序
    pub fn purchase_lines(&self, catalog: &Catalog) -> Vec<(String, u32)> {
        let mut lines: Vec<(String, u32)> = self
            .lots
            .iter()
            .map(|&lot_idx| {
                let lot = catalog.lot(lot_idx);
                (lot.purchase_url(catalog.vendor(lot.vendor)), lot.order_amount)
            })
            .collect();
        lines.sort();
        lines
    }

    /// 訂單檔內容：每行 `連結 | 數量`，結尾不含換行
    pub fn render_order_file(&self, catalog: &Catalog) -> String {
        self.purchase_lines(catalog)
            .into_iter()
            .map(|(url, amount)| format!("{} | {}", url, amount))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl PartialEq for Order {
    fn eq(&self, other: &Self) -> bool {
        self.score == other.score
    }
}

impl Eq for Order {}

impl PartialOrd for Order {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Order {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score.cmp(&other.score)
    }
}

impl Hash for Order {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.score.hash(state);
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Order (Score {:>5}; Price {:>8.2}; Vendors {:>3})",
            self.score,
            self.total_price,
            self.vendors.len()
        )
    }
}
