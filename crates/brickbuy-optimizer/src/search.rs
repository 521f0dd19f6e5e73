//! 限時搜尋主迴圈

use brickbuy_calc::{Classification, Diagnostics, PartClassifier, ScarceCoverer, VendorStratifier};
use brickbuy_core::{Catalog, OptimizerConfig, Order};
use chrono::Local;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Instant;
use uuid::Uuid;

use crate::assembler::OrderAssembler;
use crate::generator::CandidateGenerator;
use crate::pool::CandidatePool;
use crate::{OptimizationResult, SearchOutcome, SearchStats, SkipReason};

/// 搜尋狀態
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchState {
    Running,
    Trimming,
    Finished,
}

/// 訂單搜尋
///
/// 持有整個搜尋期間的狀態（候選池、統計、隨機數來源）。
/// 目錄只讀，分類與分層在建構時計算一次。
pub struct OrderSearch<'c> {
    catalog: &'c Catalog,
    config: OptimizerConfig,
    classification: Classification,
    generator: CandidateGenerator,
    assembler: OrderAssembler,
    pool: CandidatePool,
    rng: StdRng,
    state: SearchState,
    stats: SearchStats,
    draw_warning_given: bool,
}

impl<'c> OrderSearch<'c> {
    /// 創建新的搜尋
    pub fn new(catalog: &'c Catalog, config: OptimizerConfig) -> brickbuy_core::Result<Self> {
        config.validate()?;

        let classification = PartClassifier::classify(catalog);
        let tiers = VendorStratifier::stratify(
            catalog,
            &classification.mandatory_vendors,
            config.near_major_size,
        );
        let generator = CandidateGenerator::new(catalog, &classification, tiers, &config);
        let assembler = OrderAssembler::new(&classification);
        let pool = CandidatePool::new(config.pool_high_water, config.pool_keep);
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            catalog,
            config,
            classification,
            generator,
            assembler,
            pool,
            rng,
            state: SearchState::Running,
            stats: SearchStats::default(),
            draw_warning_given: false,
        })
    }

    pub fn classification(&self) -> &Classification {
        &self.classification
    }

    pub fn state(&self) -> SearchState {
        self.state
    }

    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// 單次迭代：稀缺零件組合 → 抽選賣家 → 組裝訂單
    pub fn attempt_once(&mut self) -> Result<Order, SkipReason> {
        let scarce = ScarceCoverer::select(self.catalog, &self.classification.not_enough, &mut self.rng);
        let trial = self.generator.draw(&scarce, &mut self.rng)?;
        let order = self
            .assembler
            .assemble(self.catalog, &self.config, &trial, &scarce)?;
        Ok(order)
    }

    /// 以配置的搜尋時間執行
    ///
    /// 搜尋時間大到無法表示為時間點時，只以迭代上限停止。
    pub fn run_with_timeout(&mut self) -> OptimizationResult {
        let deadline = Instant::now().checked_add(self.config.timeout());
        if deadline.is_none() {
            tracing::warn!("搜尋時間 {} 秒超出範圍，視為不限時", self.config.timeout_secs);
        }
        self.run_until(deadline)
    }

    /// 執行搜尋直到期限（或達到迭代上限）
    ///
    /// 期限只在每次迭代開始前檢查，進行中的迭代一定會完成。
    pub fn run(&mut self, deadline: Instant) -> OptimizationResult {
        self.run_until(Some(deadline))
    }

    fn run_until(&mut self, deadline: Option<Instant>) -> OptimizationResult {
        let run_id = Uuid::new_v4();
        let started_at = Local::now();
        let span = tracing::info_span!("order_search", %run_id);
        let _guard = span.enter();

        tracing::info!(
            "開始訂單優化：零件 {} 種，賣家 {} 家，最多 {} 家賣家，搜尋 {} 秒",
            self.catalog.part_count(),
            self.catalog.vendor_count(),
            self.config.max_vendors,
            deadline.map_or(self.config.timeout_secs, |d| {
                d.saturating_duration_since(Instant::now()).as_secs()
            })
        );

        self.state = SearchState::Running;
        while deadline.map_or(true, |d| Instant::now() < d) && !self.iteration_limit_reached() {
            self.step();
        }
        self.state = SearchState::Finished;

        let ranked = self.pool.finish();
        let outcome = match ranked.first() {
            Some(best) => SearchOutcome::Found {
                best: best.clone(),
                ranked,
            },
            None => SearchOutcome::NoFeasibleOrder,
        };

        tracing::info!(
            "訂單優化完成：有效訂單 {} 張 / 嘗試 {} 次（{:.1}%）",
            self.stats.valid_orders,
            self.stats.attempts,
            self.stats.success_rate()
        );
        match &outcome {
            SearchOutcome::Found { best, .. } => tracing::info!("最佳訂單: {}", best),
            SearchOutcome::NoFeasibleOrder => {
                tracing::warn!("找不到任何可行訂單；請考慮調整 max_vendors 或搜尋時間")
            }
        }

        OptimizationResult {
            run_id,
            started_at,
            finished_at: Local::now(),
            outcome,
            diagnostics: Diagnostics::from_classification(self.catalog, &self.classification),
            stats: self.stats.clone(),
        }
    }

    fn iteration_limit_reached(&self) -> bool {
        self.config
            .max_iterations
            .is_some_and(|max| self.stats.attempts >= max)
    }

    /// 執行一次迭代並記錄結果
    fn step(&mut self) {
        self.stats.attempts += 1;

        match self.attempt_once() {
            Ok(order) => {
                self.stats.valid_orders += 1;
                tracing::trace!("{} {}", self.stats.valid_orders, order);
                self.pool.insert(order);

                if self.pool.needs_trim() {
                    self.state = SearchState::Trimming;
                    self.pool.trim();
                    self.stats.trims += 1;
                    self.state = SearchState::Running;
                }
            }
            Err(SkipReason::InfeasibleDraw(err)) => {
                self.stats.infeasible_draws += 1;
                if !self.draw_warning_given {
                    tracing::warn!("無法抽選賣家組合（可能賣家太少）: {}", err);
                    self.draw_warning_given = true;
                }
            }
            Err(SkipReason::InfeasibleAssembly(_)) => {
                self.stats.infeasible_assemblies += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use brickbuy_core::{CatalogBuilder, PartId, RequiredPart, VendorOffer};
    use rust_decimal::Decimal;
    use std::time::Duration;

    /// 三種零件，十家近距離賣家、兩家遠距離賣家，價格各異
    fn catalog(config: &OptimizerConfig) -> Catalog {
        let parts = [("3001", 10), ("3023", 6), ("3004", 4)];
        let mut builder = CatalogBuilder::new(config)
            .with_parts(parts.iter().map(|&(item, qty)| RequiredPart::new(item, "0", qty)))
            .unwrap();

        for v in 0..12usize {
            let location = if v < 10 { "Netherlands" } else { "Japan" };
            for (p, &(item, _)) in parts.iter().enumerate() {
                let price = Decimal::new(((v * 7 + p * 3) % 11 + 1) as i64, 1);
                builder
                    .add_offer(
                        &PartId::new(item, "0"),
                        VendorOffer::new(format!("v{v}"), location, price, 20, format!("{v}-{p}")),
                    )
                    .unwrap();
            }
        }
        builder.build()
    }

    fn config() -> OptimizerConfig {
        OptimizerConfig::new(["Netherlands"])
            .with_max_vendors(3)
            .with_seed(42)
            .with_max_iterations(500)
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = OptimizerConfig::default();
        let catalog = CatalogBuilder::new(&config).build();
        assert!(OrderSearch::new(&catalog, config).is_err());
    }

    #[test]
    fn test_run_finds_order() {
        let config = config();
        let catalog = catalog(&config);
        let mut search = OrderSearch::new(&catalog, config).unwrap();

        let result = search.run(Instant::now() + Duration::from_secs(30));

        assert!(result.is_feasible());
        assert_eq!(result.stats.attempts, 500);
        assert_eq!(search.state(), SearchState::Finished);

        let ranked = result.ranked();
        assert!(!ranked.is_empty() && ranked.len() <= 50);
        assert!(ranked.windows(2).all(|w| w[0].score < w[1].score));
        assert_eq!(result.best().unwrap().score, ranked[0].score);
    }

    #[test]
    fn test_same_seed_same_result() {
        let config = config();
        let catalog = catalog(&config);

        let first = OrderSearch::new(&catalog, config.clone())
            .unwrap()
            .run(Instant::now() + Duration::from_secs(30));
        let second = OrderSearch::new(&catalog, config)
            .unwrap()
            .run(Instant::now() + Duration::from_secs(30));

        assert_eq!(first.best().unwrap().lots, second.best().unwrap().lots);
        assert_eq!(first.stats.valid_orders, second.stats.valid_orders);
    }

    #[test]
    fn test_pool_is_trimmed_during_run() {
        let config = config().with_pool_limits(4, 2).with_max_iterations(2000);
        let catalog = catalog(&config);
        let mut search = OrderSearch::new(&catalog, config).unwrap();

        let result = search.run(Instant::now() + Duration::from_secs(30));

        assert!(result.stats.trims > 0);
        assert!(result.ranked().len() <= 2);
    }

    #[test]
    fn test_huge_timeout_falls_back_to_iteration_limit() {
        let config = OptimizerConfig::from_json_str(
            r#"{"preferred_locations":["Netherlands"],"timeout_secs":18446744073709551615}"#,
        )
        .unwrap()
        .with_max_vendors(3)
        .with_seed(42)
        .with_max_iterations(20);
        let catalog = catalog(&config);
        let mut search = OrderSearch::new(&catalog, config).unwrap();

        // 期限無法表示：不可 panic，跑滿迭代上限後停止
        let result = search.run_with_timeout();

        assert_eq!(result.stats.attempts, 20);
        assert_eq!(search.state(), SearchState::Finished);
    }

    #[test]
    fn test_expired_deadline_reports_no_feasible_order() {
        let config = config();
        let catalog = catalog(&config);
        let mut search = OrderSearch::new(&catalog, config).unwrap();

        let result = search.run(Instant::now());

        assert!(!result.is_feasible());
        assert_eq!(result.stats.attempts, 0);
        assert!(result.best().is_none());
    }
}
