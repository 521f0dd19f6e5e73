//! 優化器配置模型

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;

use crate::{BrickBuyError, Result};

/// 訂單優化配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OptimizerConfig {
    /// 每個近距離賣家的懲罰分數
    pub weight_near: Decimal,

    /// 每個遠距離賣家的懲罰分數
    pub weight_far: Decimal,

    /// 最多賣家數量
    pub max_vendors: usize,

    /// 搜尋時間（秒）
    pub timeout_secs: u64,

    /// 嚴格模式：只向偏好地區的賣家購買
    pub harsh: bool,

    /// 偏好地區
    pub preferred_locations: BTreeSet<String>,

    /// 黑名單賣家（商店代號）
    pub blacklist: BTreeSet<String>,

    /// 隨機種子（None 表示使用系統熵）
    pub seed: Option<u64>,

    /// 最多迭代次數（None 表示只受時間限制）
    pub max_iterations: Option<u64>,

    /// 近距離主要賣家層的大小
    pub near_major_size: usize,

    /// 候選池上限，達到後觸發修剪
    pub pool_high_water: usize,

    /// 修剪後保留的訂單數
    pub pool_keep: usize,

    /// 稀有零件比例的分母（25 即前 4%）
    pub rare_part_divisor: usize,
}

impl Default for OptimizerConfig {
    fn default() -> Self {
        Self {
            weight_near: Decimal::from(20),
            weight_far: Decimal::from(100),
            max_vendors: 5,
            timeout_secs: 60,
            harsh: false,
            preferred_locations: BTreeSet::new(),
            blacklist: BTreeSet::new(),
            seed: None,
            max_iterations: None,
            near_major_size: 20,
            pool_high_water: 400,
            pool_keep: 50,
            rare_part_divisor: 25,
        }
    }
}

impl OptimizerConfig {
    /// 創建新的配置
    pub fn new<I, S>(preferred_locations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            preferred_locations: preferred_locations.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// 從 JSON 字串解析配置
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置賣家懲罰分數
    pub fn with_weights(mut self, weight_near: Decimal, weight_far: Decimal) -> Self {
        self.weight_near = weight_near;
        self.weight_far = weight_far;
        self
    }

    /// 建構器模式：設置最多賣家數量
    pub fn with_max_vendors(mut self, max_vendors: usize) -> Self {
        self.max_vendors = max_vendors;
        self
    }

    /// 建構器模式：設置搜尋時間
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// 建構器模式：設置嚴格模式
    pub fn with_harsh(mut self, harsh: bool) -> Self {
        self.harsh = harsh;
        self
    }

    /// 建構器模式：加入黑名單賣家
    pub fn with_blacklisted(mut self, handle: impl Into<String>) -> Self {
        self.blacklist.insert(handle.into());
        self
    }

    /// 建構器模式：設置隨機種子
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// 建構器模式：設置最多迭代次數
    pub fn with_max_iterations(mut self, max_iterations: u64) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    /// 建構器模式：設置候選池大小
    pub fn with_pool_limits(mut self, high_water: usize, keep: usize) -> Self {
        self.pool_high_water = high_water;
        self.pool_keep = keep;
        self
    }

    /// 搜尋時間
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// 地點是否屬於偏好地區
    pub fn is_preferred(&self, location: &str) -> bool {
        self.preferred_locations.contains(location)
    }

    /// 賣家是否在黑名單中
    pub fn is_blacklisted(&self, handle: &str) -> bool {
        self.blacklist.contains(handle)
    }

    /// 驗證配置
    pub fn validate(&self) -> Result<()> {
        if self.max_vendors == 0 {
            return Err(BrickBuyError::InvalidConfig("max_vendors 必須大於 0".to_string()));
        }
        if self.preferred_locations.is_empty() {
            return Err(BrickBuyError::InvalidConfig(
                "至少需要一個偏好地區".to_string(),
            ));
        }
        if self.weight_near.is_sign_negative() || self.weight_far.is_sign_negative() {
            return Err(BrickBuyError::InvalidConfig("懲罰分數不可為負".to_string()));
        }
        if self.pool_keep == 0 || self.pool_high_water < self.pool_keep {
            return Err(BrickBuyError::InvalidConfig(format!(
                "候選池設定無效: high_water={}, keep={}",
                self.pool_high_water, self.pool_keep
            )));
        }
        if self.rare_part_divisor == 0 {
            return Err(BrickBuyError::InvalidConfig(
                "rare_part_divisor 必須大於 0".to_string(),
            ));
        }
        Ok(())
    }
}
