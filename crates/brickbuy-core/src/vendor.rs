//! 賣家模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

/// 商店網址前綴
pub const STORE_BASE_URL: &str = "https://store.bricklink.com";

/// 賣家識別（商店代號）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VendorId(pub String);

impl VendorId {
    pub fn new(handle: impl Into<String>) -> Self {
        Self(handle.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VendorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 賣家
///
/// 兩個賣家只要商店代號相同即視為同一賣家。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vendor {
    /// 商店代號
    pub id: VendorId,

    /// 顯示名稱
    pub name: String,

    /// 所在地
    pub location: String,

    /// 最低消費金額
    pub min_buy: Decimal,

    /// 是否位於偏好地區
    pub is_near: bool,
}

impl Vendor {
    /// 創建新的賣家
    pub fn new(id: VendorId, location: impl Into<String>, min_buy: Decimal, is_near: bool) -> Self {
        Self {
            name: id.0.clone(),
            id,
            location: location.into(),
            min_buy,
            is_near,
        }
    }

    /// 建構器模式：設置顯示名稱
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// 商店網址
    pub fn store_url(&self) -> String {
        format!("{}/{}", STORE_BASE_URL, self.id)
    }
}

impl PartialEq for Vendor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Vendor {}

impl Hash for Vendor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for Vendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.id, self.location)
    }
}
