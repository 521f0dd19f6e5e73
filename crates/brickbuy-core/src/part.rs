//! 零件模型

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{BrickBuyError, Result};

/// 零件識別（款式 + 顏色）
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PartId {
    /// 款式ID
    pub item_id: String,

    /// 顏色ID
    pub color_id: String,
}

impl PartId {
    pub fn new(item_id: impl Into<String>, color_id: impl Into<String>) -> Self {
        Self {
            item_id: item_id.into(),
            color_id: color_id.into(),
        }
    }
}

impl fmt::Display for PartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.item_id, self.color_id)
    }
}

/// 需求清單中的一筆零件（由外部庫存檔案解析而來）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequiredPart {
    pub item_id: String,
    pub color_id: String,
    pub quantity: u32,
    #[serde(default)]
    pub condition: String,
    #[serde(default)]
    pub item_name: Option<String>,
    #[serde(default)]
    pub color_name: Option<String>,
}

impl RequiredPart {
    /// 創建新的需求零件
    pub fn new(item_id: impl Into<String>, color_id: impl Into<String>, quantity: u32) -> Self {
        Self {
            item_id: item_id.into(),
            color_id: color_id.into(),
            quantity,
            condition: String::new(),
            item_name: None,
            color_name: None,
        }
    }

    /// 建構器模式：設置名稱
    pub fn with_names(mut self, item_name: impl Into<String>, color_name: impl Into<String>) -> Self {
        self.item_name = Some(item_name.into());
        self.color_name = Some(color_name.into());
        self
    }

    /// 建構器模式：設置新舊狀態
    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }
}

/// 零件
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Part {
    /// 零件識別
    pub id: PartId,

    /// 需求數量
    pub required_qty: u32,

    /// 新舊狀態（N/U）
    pub condition: String,

    /// 款式名稱
    pub item_name: String,

    /// 顏色名稱
    pub color_name: String,
}

impl Part {
    /// 創建新的零件
    pub fn new(id: PartId, required_qty: u32) -> Self {
        Self {
            id,
            required_qty,
            condition: String::new(),
            item_name: "itemName?".to_string(),
            color_name: "colourName?".to_string(),
        }
    }

    /// 合併重複的零件條目（數量相加）
    ///
    /// 只在目錄建構階段使用；優化過程中需求數量不會改變。
    pub fn merge(&mut self, other: &Part) -> Result<()> {
        if other.id != self.id {
            return Err(BrickBuyError::PartMismatch {
                expected: self.id.to_string(),
                found: other.id.to_string(),
            });
        }
        self.required_qty = self
            .required_qty
            .checked_add(other.required_qty)
            .ok_or_else(|| BrickBuyError::Other(format!("零件 {} 的需求數量溢位", self.id)))?;
        Ok(())
    }
}

impl From<RequiredPart> for Part {
    fn from(required: RequiredPart) -> Self {
        let mut part = Part::new(PartId::new(required.item_id, required.color_id), required.quantity);
        part.condition = required.condition;
        if let Some(name) = required.item_name {
            part.item_name = name;
        }
        if let Some(name) = required.color_name {
            part.color_name = name;
        }
        part
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_part_id_display() {
        let id = PartId::new("3001", "11");
        assert_eq!(id.to_string(), "3001|11");
    }

    #[test]
    fn test_merge_duplicate_part() {
        let mut part = Part::new(PartId::new("3001", "11"), 5);
        let other = Part::new(PartId::new("3001", "11"), 7);

        part.merge(&other).unwrap();
        assert_eq!(part.required_qty, 12);
    }

    #[test]
    fn test_merge_different_part_fails() {
        let mut part = Part::new(PartId::new("3001", "11"), 5);
        let other = Part::new(PartId::new("3001", "5"), 7);

        let err = part.merge(&other).unwrap_err();
        assert!(matches!(err, BrickBuyError::PartMismatch { .. }));
        assert_eq!(part.required_qty, 5);
    }

    #[test]
    fn test_merge_overflow_fails() {
        let mut part = Part::new(PartId::new("3001", "11"), u32::MAX);
        let other = Part::new(PartId::new("3001", "11"), 1);

        let err = part.merge(&other).unwrap_err();
        assert!(matches!(err, BrickBuyError::Other(_)));
        assert_eq!(part.required_qty, u32::MAX);
    }

    #[test]
    fn test_from_required_part() {
        let part: Part = RequiredPart::new("3023", "1", 40)
            .with_names("Plate 1 x 2", "White")
            .with_condition("N")
            .into();

        assert_eq!(part.id, PartId::new("3023", "1"));
        assert_eq!(part.required_qty, 40);
        assert_eq!(part.item_name, "Plate 1 x 2");
        assert_eq!(part.color_name, "White");
        assert_eq!(part.condition, "N");
    }
}
