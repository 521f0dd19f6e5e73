//! # BrickBuy
//!
//! 在有限時間內，從多家賣家的批次報價中找出總價加賣家懲罰最低的零件訂單。

pub use brickbuy_calc as calc;
pub use brickbuy_core as model;
pub use brickbuy_optimizer as optimizer;

pub use brickbuy_calc::{Classification, Diagnostics, PartClassifier, VendorTiers};
pub use brickbuy_core::{
    BrickBuyError, Catalog, CatalogBuilder, OptimizerConfig, Order, PartId, RequiredPart, Result,
    VendorOffer,
};
pub use brickbuy_optimizer::{OptimizationResult, OrderSearch, SearchOutcome, SearchStats};

/// 依配置的搜尋時間執行訂單優化
pub fn optimize(catalog: &Catalog, config: OptimizerConfig) -> Result<OptimizationResult> {
    let mut search = OrderSearch::new(catalog, config)?;
    Ok(search.run_with_timeout())
}

/// 由需求清單與報價建立目錄
///
/// `offers` 的每一筆為 (零件, 報價)。
pub fn build_catalog<P, O>(config: &OptimizerConfig, parts: P, offers: O) -> Result<Catalog>
where
    P: IntoIterator<Item = RequiredPart>,
    O: IntoIterator<Item = (PartId, VendorOffer)>,
{
    let mut builder = CatalogBuilder::new(config).with_parts(parts)?;
    for (part_id, offer) in offers {
        builder.add_offer(&part_id, offer)?;
    }
    tracing::debug!("需求與報價讀取完成");
    Ok(builder.build())
}
