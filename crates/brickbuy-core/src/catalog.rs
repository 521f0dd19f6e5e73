//! 目錄模型（零件、賣家、批次及其關聯）
//!
//! 目錄在建構後不再變動；優化過程只讀取。

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;

use crate::config::OptimizerConfig;
use crate::lot::Lot;
use crate::part::{Part, PartId, RequiredPart};
use crate::vendor::{Vendor, VendorId};
use crate::{BrickBuyError, Result};

/// 零件索引
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartIdx(pub usize);

/// 賣家索引
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VendorIdx(pub usize);

/// 批次索引
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LotIdx(pub usize);

macro_rules! impl_index_display {
    ($($name:ident),*) => {
        $(
            impl fmt::Display for $name {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    write!(f, "#{}", self.0)
                }
            }
        )*
    };
}

impl_index_display!(PartIdx, VendorIdx, LotIdx);

fn default_step() -> u32 {
    1
}

/// 賣家報價（由外部清單服務取得）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VendorOffer {
    /// 商店代號
    pub vendor_id: String,

    /// 商店顯示名稱
    #[serde(default)]
    pub vendor_name: Option<String>,

    /// 所在地
    pub location: String,

    /// 最低消費金額
    #[serde(default)]
    pub min_buy: Decimal,

    /// 單價
    pub unit_price: Decimal,

    /// 可售數量
    pub quantity: u32,

    /// 銷售倍數
    #[serde(default = "default_step")]
    pub step: u32,

    /// 批次編號
    pub lot_ref: String,
}

impl VendorOffer {
    /// 創建新的報價
    pub fn new(
        vendor_id: impl Into<String>,
        location: impl Into<String>,
        unit_price: Decimal,
        quantity: u32,
        lot_ref: impl Into<String>,
    ) -> Self {
        Self {
            vendor_id: vendor_id.into(),
            vendor_name: None,
            location: location.into(),
            min_buy: Decimal::ZERO,
            unit_price,
            quantity,
            step: 1,
            lot_ref: lot_ref.into(),
        }
    }

    /// 建構器模式：設置最低消費
    pub fn with_min_buy(mut self, min_buy: Decimal) -> Self {
        self.min_buy = min_buy;
        self
    }

    /// 建構器模式：設置銷售倍數
    pub fn with_step(mut self, step: u32) -> Self {
        self.step = step;
        self
    }

    /// 建構器模式：設置商店顯示名稱
    pub fn with_vendor_name(mut self, name: impl Into<String>) -> Self {
        self.vendor_name = Some(name.into());
        self
    }
}

/// 目錄
#[derive(Debug, Clone)]
pub struct Catalog {
    parts: Vec<Part>,
    vendors: Vec<Vendor>,
    lots: Vec<Lot>,

    /// 每個零件的批次（依總價由低到高）
    part_lots: Vec<Vec<LotIdx>>,

    /// 每個零件的賣家
    part_vendors: Vec<Vec<VendorIdx>>,

    /// 每個賣家的批次
    vendor_lots: Vec<Vec<LotIdx>>,

    /// 每個賣家供應的零件
    vendor_parts: Vec<BTreeSet<PartIdx>>,
}

impl Catalog {
    pub fn part(&self, idx: PartIdx) -> &Part {
        &self.parts[idx.0]
    }

    pub fn vendor(&self, idx: VendorIdx) -> &Vendor {
        &self.vendors[idx.0]
    }

    pub fn lot(&self, idx: LotIdx) -> &Lot {
        &self.lots[idx.0]
    }

    pub fn part_count(&self) -> usize {
        self.parts.len()
    }

    pub fn vendor_count(&self) -> usize {
        self.vendors.len()
    }

    pub fn lot_count(&self) -> usize {
        self.lots.len()
    }

    /// 所有零件索引
    pub fn part_indices(&self) -> impl Iterator<Item = PartIdx> + '_ {
        (0..self.parts.len()).map(PartIdx)
    }

    /// 所有賣家索引
    pub fn vendor_indices(&self) -> impl Iterator<Item = VendorIdx> + '_ {
        (0..self.vendors.len()).map(VendorIdx)
    }

    /// 零件的批次（依總價由低到高）
    pub fn lots_of(&self, part: PartIdx) -> &[LotIdx] {
        &self.part_lots[part.0]
    }

    /// 提供此零件的賣家
    pub fn vendors_of(&self, part: PartIdx) -> &[VendorIdx] {
        &self.part_vendors[part.0]
    }

    /// 賣家的所有批次
    pub fn stock_of(&self, vendor: VendorIdx) -> &[LotIdx] {
        &self.vendor_lots[vendor.0]
    }

    /// 賣家供應的零件
    pub fn stocked_parts(&self, vendor: VendorIdx) -> &BTreeSet<PartIdx> {
        &self.vendor_parts[vendor.0]
    }

    /// 零件所有批次的訂購數量總和
    pub fn available_total(&self, part: PartIdx) -> u64 {
        self.lots_of(part)
            .iter()
            .map(|&lot| u64::from(self.lot(lot).order_amount))
            .sum()
    }

    pub fn find_part(&self, id: &PartId) -> Option<PartIdx> {
        self.parts.iter().position(|p| &p.id == id).map(PartIdx)
    }

    pub fn find_vendor(&self, id: &VendorId) -> Option<VendorIdx> {
        self.vendors.iter().position(|v| &v.id == id).map(VendorIdx)
    }
}

/// 尚未轉為批次的報價
struct PendingOffer {
    part: PartIdx,
    vendor: usize,
    offer: VendorOffer,
}

/// 目錄建構器
pub struct CatalogBuilder {
    preferred_locations: BTreeSet<String>,
    blacklist: BTreeSet<String>,
    harsh: bool,
    parts: Vec<Part>,
    part_index: HashMap<PartId, PartIdx>,
    vendors: Vec<Vendor>,
    vendor_index: HashMap<VendorId, usize>,
    offers: Vec<PendingOffer>,
}

impl CatalogBuilder {
    /// 創建新的建構器（偏好地區與黑名單取自配置）
    pub fn new(config: &OptimizerConfig) -> Self {
        Self {
            preferred_locations: config.preferred_locations.clone(),
            blacklist: config.blacklist.clone(),
            harsh: config.harsh,
            parts: Vec::new(),
            part_index: HashMap::new(),
            vendors: Vec::new(),
            vendor_index: HashMap::new(),
            offers: Vec::new(),
        }
    }

    /// 加入需求零件；重複的零件會合併數量
    pub fn add_part(&mut self, required: RequiredPart) -> Result<PartIdx> {
        let part = Part::from(required);

        if let Some(&idx) = self.part_index.get(&part.id) {
            tracing::debug!("發現重複零件: {}", part.id);
            self.parts[idx.0].merge(&part)?;
            return Ok(idx);
        }

        let idx = PartIdx(self.parts.len());
        self.part_index.insert(part.id.clone(), idx);
        self.parts.push(part);
        Ok(idx)
    }

    /// 建構器模式：加入多個需求零件
    pub fn with_parts<I>(mut self, parts: I) -> Result<Self>
    where
        I: IntoIterator<Item = RequiredPart>,
    {
        for part in parts {
            self.add_part(part)?;
        }
        Ok(self)
    }

    /// 加入賣家報價
    ///
    /// 黑名單賣家的報價會被忽略；嚴格模式下也忽略偏好地區以外的賣家。
    pub fn add_offer(&mut self, part_id: &PartId, offer: VendorOffer) -> Result<()> {
        let part = *self
            .part_index
            .get(part_id)
            .ok_or_else(|| BrickBuyError::UnknownPart(part_id.to_string()))?;

        if self.blacklist.contains(&offer.vendor_id) {
            tracing::debug!("略過黑名單賣家 {} 的報價", offer.vendor_id);
            return Ok(());
        }
        if self.harsh && !self.preferred_locations.contains(&offer.location) {
            tracing::debug!("嚴格模式：略過 {} 的賣家 {}", offer.location, offer.vendor_id);
            return Ok(());
        }

        let vendor_id = VendorId::new(offer.vendor_id.clone());
        let vendor = match self.vendor_index.get(&vendor_id) {
            Some(&idx) => idx,
            None => {
                let is_near = self.preferred_locations.contains(&offer.location);
                let mut vendor =
                    Vendor::new(vendor_id.clone(), offer.location.clone(), offer.min_buy, is_near);
                if let Some(name) = &offer.vendor_name {
                    vendor = vendor.with_name(name.clone());
                }
                let idx = self.vendors.len();
                self.vendor_index.insert(vendor_id, idx);
                self.vendors.push(vendor);
                idx
            }
        };

        self.offers.push(PendingOffer { part, vendor, offer });
        Ok(())
    }

    /// 建立目錄
    ///
    /// 1. 依最終需求數量計算每個批次的訂購數量，丟棄無法使用的批次
    /// 2. 移除整體庫存永遠達不到最低消費的賣家
    /// 3. 建立零件與賣家之間的關聯
    pub fn build(self) -> Catalog {
        let CatalogBuilder {
            parts,
            vendors,
            offers,
            ..
        } = self;

        // Step 1: 建立批次
        let mut draft_lots: Vec<Lot> = Vec::with_capacity(offers.len());
        for pending in offers {
            let required_qty = parts[pending.part.0].required_qty;
            let lot = Lot::new(
                pending.part,
                VendorIdx(pending.vendor),
                required_qty,
                pending.offer.unit_price,
                pending.offer.quantity,
                pending.offer.step,
                pending.offer.lot_ref,
            );
            if lot.is_usable() {
                draft_lots.push(lot);
            } else {
                tracing::debug!(
                    "丟棄無法使用的批次 {}（零件 {}）",
                    lot.lot_ref,
                    parts[pending.part.0].id
                );
            }
        }

        // Step 2: 移除永遠達不到最低消費的賣家
        let mut stock_value = vec![Decimal::ZERO; vendors.len()];
        let mut usable_lots = vec![0usize; vendors.len()];
        for lot in &draft_lots {
            stock_value[lot.vendor.0] += lot.total_price;
            usable_lots[lot.vendor.0] += 1;
        }

        let mut remap: Vec<Option<VendorIdx>> = vec![None; vendors.len()];
        let mut kept_vendors = Vec::with_capacity(vendors.len());
        for (old_idx, vendor) in vendors.into_iter().enumerate() {
            if usable_lots[old_idx] == 0 {
                continue;
            }
            if stock_value[old_idx] < vendor.min_buy {
                tracing::debug!(
                    "移除賣家 {}：庫存總值 {} 低於最低消費 {}",
                    vendor.id,
                    stock_value[old_idx],
                    vendor.min_buy
                );
                continue;
            }
            remap[old_idx] = Some(VendorIdx(kept_vendors.len()));
            kept_vendors.push(vendor);
        }

        let lots: Vec<Lot> = draft_lots
            .into_iter()
            .filter_map(|mut lot| {
                remap[lot.vendor.0].map(|vendor| {
                    lot.vendor = vendor;
                    lot
                })
            })
            .collect();

        // Step 3: 建立關聯
        let mut part_lots = vec![Vec::new(); parts.len()];
        let mut part_vendors: Vec<Vec<VendorIdx>> = vec![Vec::new(); parts.len()];
        let mut vendor_lots = vec![Vec::new(); kept_vendors.len()];
        let mut vendor_parts = vec![BTreeSet::new(); kept_vendors.len()];

        for (idx, lot) in lots.iter().enumerate() {
            let lot_idx = LotIdx(idx);
            part_lots[lot.part.0].push(lot_idx);
            if !part_vendors[lot.part.0].contains(&lot.vendor) {
                part_vendors[lot.part.0].push(lot.vendor);
            }
            vendor_lots[lot.vendor.0].push(lot_idx);
            vendor_parts[lot.vendor.0].insert(lot.part);
        }

        for part_lot_list in &mut part_lots {
            part_lot_list.sort_by_key(|&lot: &LotIdx| lots[lot.0].total_price);
        }

        tracing::info!(
            "目錄建立完成：零件 {} 種，賣家 {} 家，批次 {} 筆",
            parts.len(),
            kept_vendors.len(),
            lots.len()
        );

        Catalog {
            parts,
            vendors: kept_vendors,
            lots,
            part_lots,
            part_vendors,
            vendor_lots,
            vendor_parts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn config() -> OptimizerConfig {
        OptimizerConfig::new(["Netherlands"]).with_blacklisted("badshop")
    }

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_build_simple_catalog() {
        let brick = PartId::new("3001", "11");
        let mut builder = CatalogBuilder::new(&config())
            .with_parts([RequiredPart::new("3001", "11", 10)])
            .unwrap();

        builder
            .add_offer(&brick, VendorOffer::new("shop-a", "Netherlands", dec("0.20"), 50, "1"))
            .unwrap();
        builder
            .add_offer(&brick, VendorOffer::new("shop-b", "France", dec("0.10"), 50, "2"))
            .unwrap();

        let catalog = builder.build();
        let part = catalog.find_part(&brick).unwrap();

        assert_eq!(catalog.part_count(), 1);
        assert_eq!(catalog.vendor_count(), 2);
        assert_eq!(catalog.vendors_of(part).len(), 2);

        // 依總價排序：shop-b (1.00) 在 shop-a (2.00) 之前
        let cheapest = catalog.lot(catalog.lots_of(part)[0]);
        assert_eq!(catalog.vendor(cheapest.vendor).id, VendorId::new("shop-b"));
        assert_eq!(cheapest.total_price, dec("1.00"));

        let shop_a = catalog.find_vendor(&VendorId::new("shop-a")).unwrap();
        assert!(catalog.vendor(shop_a).is_near);
        assert!(catalog.stocked_parts(shop_a).contains(&part));
    }

    #[test]
    fn test_duplicate_parts_are_merged() {
        let catalog = CatalogBuilder::new(&config())
            .with_parts([
                RequiredPart::new("3001", "11", 10),
                RequiredPart::new("3023", "1", 4),
                RequiredPart::new("3001", "11", 6),
            ])
            .unwrap()
            .build();

        assert_eq!(catalog.part_count(), 2);
        let part = catalog.find_part(&PartId::new("3001", "11")).unwrap();
        assert_eq!(catalog.part(part).required_qty, 16);
    }

    #[test]
    fn test_offer_for_unknown_part_fails() {
        let mut builder = CatalogBuilder::new(&config());
        let result = builder.add_offer(
            &PartId::new("9999", "0"),
            VendorOffer::new("shop-a", "Netherlands", Decimal::ONE, 1, "1"),
        );
        assert!(matches!(result, Err(BrickBuyError::UnknownPart(_))));
    }

    #[test]
    fn test_blacklisted_vendor_is_skipped() {
        let brick = PartId::new("3001", "11");
        let mut builder = CatalogBuilder::new(&config())
            .with_parts([RequiredPart::new("3001", "11", 10)])
            .unwrap();
        builder
            .add_offer(&brick, VendorOffer::new("badshop", "Netherlands", Decimal::ONE, 50, "1"))
            .unwrap();

        let catalog = builder.build();
        assert_eq!(catalog.vendor_count(), 0);
        assert_eq!(catalog.available_total(PartIdx(0)), 0);
    }

    #[test]
    fn test_harsh_mode_skips_non_preferred_vendors() {
        let brick = PartId::new("3001", "11");
        let mut builder = CatalogBuilder::new(&config().with_harsh(true))
            .with_parts([RequiredPart::new("3001", "11", 10)])
            .unwrap();
        builder
            .add_offer(&brick, VendorOffer::new("near", "Netherlands", Decimal::ONE, 50, "1"))
            .unwrap();
        builder
            .add_offer(&brick, VendorOffer::new("far", "Japan", dec("0.01"), 50, "2"))
            .unwrap();

        let catalog = builder.build();
        assert_eq!(catalog.vendor_count(), 1);
        assert_eq!(catalog.vendor(VendorIdx(0)).id, VendorId::new("near"));
        assert!(catalog.find_vendor(&VendorId::new("far")).is_none());
    }

    #[test]
    fn test_free_lots_keep_their_vendor() {
        let brick = PartId::new("3001", "11");
        let mut builder = CatalogBuilder::new(&config())
            .with_parts([RequiredPart::new("3001", "11", 2)])
            .unwrap();
        // 0.001 × 2 四捨五入為 0.00，最低消費為 0，仍可購買
        builder
            .add_offer(&brick, VendorOffer::new("freebie", "Netherlands", dec("0.001"), 2, "1"))
            .unwrap();

        let catalog = builder.build();
        assert_eq!(catalog.vendor_count(), 1);
        assert_eq!(catalog.lot(LotIdx(0)).total_price, Decimal::ZERO);
        assert_eq!(catalog.available_total(PartIdx(0)), 2);
    }

    #[test]
    fn test_unusable_lots_and_unreachable_vendors_are_dropped() {
        let brick = PartId::new("3001", "11");
        let mut builder = CatalogBuilder::new(&config())
            .with_parts([RequiredPart::new("3001", "11", 10)])
            .unwrap();

        // 庫存低於銷售倍數 → 訂購數量 0
        builder
            .add_offer(
                &brick,
                VendorOffer::new("tiny", "Netherlands", Decimal::ONE, 3, "1").with_step(4),
            )
            .unwrap();
        // 庫存總值 10.00 永遠達不到最低消費 25
        builder
            .add_offer(
                &brick,
                VendorOffer::new("pricey", "Netherlands", Decimal::ONE, 10, "2")
                    .with_min_buy(Decimal::from(25)),
            )
            .unwrap();
        builder
            .add_offer(&brick, VendorOffer::new("fine", "Netherlands", Decimal::ONE, 10, "3"))
            .unwrap();

        let catalog = builder.build();
        assert_eq!(catalog.vendor_count(), 1);
        assert_eq!(catalog.lot_count(), 1);
        assert_eq!(catalog.vendor(VendorIdx(0)).id, VendorId::new("fine"));
        assert_eq!(catalog.lot(LotIdx(0)).vendor, VendorIdx(0));
        assert_eq!(catalog.available_total(PartIdx(0)), 10);
    }

    #[test]
    fn test_order_amount_uses_merged_quantity() {
        let brick = PartId::new("3001", "11");
        let mut builder = CatalogBuilder::new(&config())
            .with_parts([RequiredPart::new("3001", "11", 4)])
            .unwrap();
        builder
            .add_offer(&brick, VendorOffer::new("shop-a", "Netherlands", Decimal::ONE, 50, "1"))
            .unwrap();
        builder.add_part(RequiredPart::new("3001", "11", 6)).unwrap();

        let catalog = builder.build();
        assert_eq!(catalog.lot(LotIdx(0)).order_amount, 10);
    }
}
