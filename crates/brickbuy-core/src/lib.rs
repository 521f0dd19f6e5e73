//! # BrickBuy Core
//!
//! 核心資料模型與類型定義（零件、批次、賣家、訂單、配置）

pub mod catalog;
pub mod config;
pub mod lot;
pub mod order;
pub mod part;
pub mod vendor;

// Re-export 主要類型
pub use catalog::{Catalog, CatalogBuilder, LotIdx, PartIdx, VendorIdx, VendorOffer};
pub use config::OptimizerConfig;
pub use lot::Lot;
pub use order::Order;
pub use part::{Part, PartId, RequiredPart};
pub use vendor::{Vendor, VendorId};

/// BrickBuy 錯誤類型
#[derive(Debug, thiserror::Error)]
pub enum BrickBuyError {
    #[error("找不到零件: {0}")]
    UnknownPart(String),

    #[error("無法合併不同零件: {expected} 與 {found}")]
    PartMismatch { expected: String, found: String },

    #[error("無效的配置: {0}")]
    InvalidConfig(String),

    #[error("配置解析錯誤: {0}")]
    ConfigParse(#[from] serde_json::Error),

    #[error("其他錯誤: {0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, BrickBuyError>;
