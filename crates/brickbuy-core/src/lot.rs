//! 批次模型（賣家對單一零件的報價）

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::catalog::{PartIdx, VendorIdx};
use crate::vendor::Vendor;

/// 金額小數位數
pub const PRICE_DECIMALS: u32 = 2;

/// 批次
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lot {
    /// 所屬零件
    pub part: PartIdx,

    /// 所屬賣家
    pub vendor: VendorIdx,

    /// 單價
    pub unit_price: Decimal,

    /// 可售數量
    pub available_qty: u32,

    /// 銷售倍數
    pub step: u32,

    /// 批次編號（用於組成購買連結）
    pub lot_ref: String,

    /// 訂購數量（建構時計算）
    pub order_amount: u32,

    /// 訂購總價（建構時計算，四捨五入到兩位小數）
    pub total_price: Decimal,
}

impl Lot {
    /// 創建新的批次
    ///
    /// `required_qty` 為所屬零件的需求數量，用於計算訂購數量。
    pub fn new(
        part: PartIdx,
        vendor: VendorIdx,
        required_qty: u32,
        unit_price: Decimal,
        available_qty: u32,
        step: u32,
        lot_ref: impl Into<String>,
    ) -> Self {
        let step = step.max(1);
        let order_amount = order_amount(required_qty, available_qty, step);
        let total_price = round_price(Decimal::from(order_amount) * unit_price);

        Self {
            part,
            vendor,
            unit_price,
            available_qty,
            step,
            lot_ref: lot_ref.into(),
            order_amount,
            total_price,
        }
    }

    /// 是否可用（訂購數量大於零）
    pub fn is_usable(&self) -> bool {
        self.order_amount > 0
    }

    /// 單一批次是否足以滿足需求
    pub fn covers(&self, required_qty: u32) -> bool {
        self.order_amount >= required_qty
    }

    /// 購買連結
    pub fn purchase_url(&self, vendor: &Vendor) -> String {
        format!(
            "{}#/shop?o={{\"showHomeItems\":0,\"q\":\"{}\"}}",
            vendor.store_url(),
            self.lot_ref
        )
    }
}

/// 計算訂購數量
///
/// 先取 `min(可售數量, 需求數量)`，向上調整到銷售倍數；
/// 若超過可售數量，改取不超過可售數量的最大倍數（可能為 0）。
pub fn order_amount(required_qty: u32, available_qty: u32, step: u32) -> u32 {
    let step = step.max(1);
    let wanted = available_qty.min(required_qty);

    let remainder = wanted % step;
    let rounded_up = if remainder > 0 {
        u64::from(wanted - remainder) + u64::from(step)
    } else {
        u64::from(wanted)
    };

    if rounded_up <= u64::from(available_qty) {
        // rounded_up <= available_qty，必在 u32 範圍內
        rounded_up as u32
    } else {
        available_qty - available_qty % step
    }
}

/// 金額四捨五入到兩位小數
pub fn round_price(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(PRICE_DECIMALS, RoundingStrategy::MidpointAwayFromZero)
}
