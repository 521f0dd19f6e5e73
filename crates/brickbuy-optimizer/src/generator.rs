//! 候選賣家組合產生器

use brickbuy_calc::{Classification, ScarceSelection, VendorTiers};
use brickbuy_core::{Catalog, OptimizerConfig, VendorIdx};
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;
use std::fmt;

use crate::DrawError;

/// 賣家層
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    NearMajor,
    NearMinor,
    Far,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::NearMajor => "近距離主要",
            Tier::NearMinor => "近距離次要",
            Tier::Far => "遠距離",
        };
        f.write_str(name)
    }
}

/// 各層抽選數量
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierQuotas {
    pub near_major: usize,
    pub near_minor: usize,
    pub far: usize,
}

impl TierQuotas {
    /// 抽選各層數量
    ///
    /// `how_many ∈ [1, choices_left]`，遠距離 `∈ [0, how_many / 7]`（嚴格模式為 0），
    /// 近距離主要 `∈ [1, how_many / 2 + 1]`，剩下的給近距離次要。
    pub fn draw<R: Rng + ?Sized>(choices_left: usize, harsh: bool, rng: &mut R) -> Result<Self, DrawError> {
        if choices_left == 0 {
            return Err(DrawError::NoChoicesLeft);
        }
        let how_many = rng.gen_range(1..=choices_left);
        let far = if harsh {
            0
        } else {
            rng.gen_range(0..=how_many / 7)
        };
        let near_major = rng.gen_range(1..=how_many / 2 + 1);

        let near_minor = how_many as i64 - near_major as i64 - far as i64;
        if near_minor < 0 {
            return Err(DrawError::NegativeQuota(near_minor));
        }

        Ok(Self {
            near_major,
            near_minor: near_minor as usize,
            far,
        })
    }
}

/// 候選賣家組合產生器
///
/// 所需資料在建構時從分類與分層結果複製一份，搜尋期間不再變動。
#[derive(Debug, Clone)]
pub struct CandidateGenerator {
    mandatory: BTreeSet<VendorIdx>,
    tiers: VendorTiers,

    /// 每個稀有零件「單獨足夠」的賣家
    rare_candidates: Vec<Vec<VendorIdx>>,

    max_vendors: usize,
    harsh: bool,
}

impl CandidateGenerator {
    /// 創建新的產生器
    pub fn new(
        catalog: &Catalog,
        classification: &Classification,
        tiers: VendorTiers,
        config: &OptimizerConfig,
    ) -> Self {
        let optimizable = &classification.optimizable;
        let rare_count = (optimizable.len() / config.rare_part_divisor)
            .max(1)
            .min(optimizable.len());

        let rare_candidates = optimizable[..rare_count]
            .iter()
            .map(|&part| {
                let required_qty = catalog.part(part).required_qty;
                let mut vendors: Vec<VendorIdx> = catalog
                    .lots_of(part)
                    .iter()
                    .map(|&lot| catalog.lot(lot))
                    .filter(|lot| lot.covers(required_qty))
                    .map(|lot| lot.vendor)
                    .collect();
                vendors.sort();
                vendors.dedup();
                vendors
            })
            .collect();

        Self {
            mandatory: classification.mandatory_vendors.clone(),
            tiers,
            rare_candidates,
            max_vendors: config.max_vendors,
            harsh: config.harsh,
        }
    }

    pub fn tiers(&self) -> &VendorTiers {
        &self.tiers
    }

    /// 為每個稀有零件隨機挑一個單獨足夠的賣家
    pub fn rare_vendors<R: Rng + ?Sized>(&self, rng: &mut R) -> BTreeSet<VendorIdx> {
        self.rare_candidates
            .iter()
            .filter_map(|vendors| vendors.choose(rng).copied())
            .collect()
    }

    /// 抽選本次迭代的候選賣家組合
    pub fn draw<R: Rng + ?Sized>(
        &self,
        scarce: &ScarceSelection,
        rng: &mut R,
    ) -> Result<BTreeSet<VendorIdx>, DrawError> {
        let rare = self.rare_vendors(rng);

        let mut trial: BTreeSet<VendorIdx> = self.mandatory.clone();
        trial.extend(scarce.vendors.iter().copied());
        trial.extend(rare);

        let preselected = trial.len();
        if preselected >= self.max_vendors {
            return Err(DrawError::VendorBudgetExhausted {
                preselected,
                max_vendors: self.max_vendors,
            });
        }
        let choices_left = self.max_vendors - preselected;

        let quotas = TierQuotas::draw(choices_left, self.harsh, rng)?;

        Self::sample_into(&mut trial, &self.tiers.near_major, quotas.near_major, Tier::NearMajor, rng)?;
        Self::sample_into(&mut trial, &self.tiers.near_minor, quotas.near_minor, Tier::NearMinor, rng)?;
        Self::sample_into(&mut trial, &self.tiers.far, quotas.far, Tier::Far, rng)?;

        Ok(trial)
    }

    /// 從一層中不重複抽選
    fn sample_into<R: Rng + ?Sized>(
        trial: &mut BTreeSet<VendorIdx>,
        tier_vendors: &[VendorIdx],
        count: usize,
        tier: Tier,
        rng: &mut R,
    ) -> Result<(), DrawError> {
        if count > tier_vendors.len() {
            return Err(DrawError::TierTooSmall {
                tier,
                requested: count,
                available: tier_vendors.len(),
            });
        }
        trial.extend(tier_vendors.choose_multiple(rng, count).copied());
        Ok(())
    }
}
