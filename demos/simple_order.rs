//! # 簡單零件訂單優化範例
//!
//! - 需求：四種零件
//! - 賣家：荷蘭、德國的近距離賣家與一家遠距離賣家
//! - 配置：以 JSON 載入，固定隨機種子

use brickbuy::{build_catalog, optimize, OptimizerConfig, PartId, RequiredPart, SearchOutcome, VendorOffer};
use rust_decimal::Decimal;

const CONFIG_JSON: &str = r#"{
    "weight_near": "20",
    "weight_far": "100",
    "max_vendors": 3,
    "timeout_secs": 2,
    "preferred_locations": ["Netherlands", "Germany"],
    "blacklist": ["scamshop"],
    "seed": 7
}"#;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "brickbuy=info".into()),
        )
        .init();

    println!("🧱 ===== 零件訂單優化範例 =====");
    println!();

    // ========== 1. 載入配置 ==========
    println!("⚙️  步驟 1: 載入配置");
    let config = OptimizerConfig::from_json_str(CONFIG_JSON)?;
    println!("   ✓ 最多 {} 家賣家，搜尋 {} 秒", config.max_vendors, config.timeout_secs);
    println!();

    // ========== 2. 建立目錄 ==========
    println!("📦 步驟 2: 讀取需求與報價");
    let parts = vec![
        RequiredPart::new("3001", "5", 12).with_names("Brick 2 x 4", "Red"),
        RequiredPart::new("3023", "11", 20).with_names("Plate 1 x 2", "Black"),
        RequiredPart::new("3069b", "1", 8).with_names("Tile 1 x 2", "White"),
        RequiredPart::new("32028", "86", 30).with_names("Plate 1 x 2 with Door Rail", "Light Bluish Gray"),
    ];
    let catalog = build_catalog(&config, parts, offers())?;
    println!(
        "   ✓ 零件 {} 種，賣家 {} 家，批次 {} 筆",
        catalog.part_count(),
        catalog.vendor_count(),
        catalog.lot_count()
    );
    println!();

    // ========== 3. 執行優化 ==========
    println!("🔍 步驟 3: 執行訂單優化");
    let result = optimize(&catalog, config)?;
    println!(
        "   ✓ 嘗試 {} 次，有效訂單 {} 張（{:.1}%）",
        result.stats.attempts,
        result.stats.valid_orders,
        result.stats.success_rate()
    );
    println!();

    // ========== 4. 診斷 ==========
    println!("🩺 步驟 4: 診斷");
    for part in &result.diagnostics.never_enough {
        println!("   ⚠ 永遠湊不齊: {}", part);
    }
    for part in &result.diagnostics.not_enough {
        println!("   • 需要多個批次: {}", part);
    }
    for (part, lots) in &result.diagnostics.fewest_lots {
        println!("   • {} 只有 {} 個批次", part, lots);
    }
    if result.diagnostics.has_unsatisfiable_parts() {
        println!("{}", serde_json::to_string_pretty(&result.diagnostics.warnings)?);
    }
    println!();

    // ========== 5. 輸出訂單 ==========
    println!("🧾 步驟 5: 最佳訂單");
    match &result.outcome {
        SearchOutcome::Found { best, ranked } => {
            println!("   {}", best);
            println!("   （保留 {} 張候選訂單）", ranked.len());
            for (vendor, spend) in best.money_per_vendor(&catalog) {
                println!("   - {}: {}", catalog.vendor(vendor), spend);
            }
            println!();
            println!("{}", best.render_order_file(&catalog));
        }
        SearchOutcome::NoFeasibleOrder => {
            println!("   ✗ 找不到可行訂單，請放寬賣家上限或延長搜尋時間");
        }
    }

    Ok(())
}

fn offers() -> Vec<(PartId, VendorOffer)> {
    let cents = |value: i64| Decimal::new(value, 2);
    let brick = PartId::new("3001", "5");
    let plate = PartId::new("3023", "11");
    let tile = PartId::new("3069b", "1");
    let rail = PartId::new("32028", "86");

    vec![
        (brick.clone(), VendorOffer::new("brickhaus", "Germany", cents(12), 40, "101").with_vendor_name("Brickhaus")),
        (plate.clone(), VendorOffer::new("brickhaus", "Germany", cents(4), 100, "102").with_vendor_name("Brickhaus")),
        (rail.clone(), VendorOffer::new("brickhaus", "Germany", cents(9), 12, "103").with_vendor_name("Brickhaus")),
        (brick.clone(), VendorOffer::new("steentjes", "Netherlands", cents(10), 15, "201").with_min_buy(cents(300))),
        (plate.clone(), VendorOffer::new("steentjes", "Netherlands", cents(5), 50, "202").with_min_buy(cents(300))),
        (tile.clone(), VendorOffer::new("steentjes", "Netherlands", cents(6), 10, "203").with_min_buy(cents(300))),
        (rail.clone(), VendorOffer::new("steentjes", "Netherlands", cents(8), 20, "204").with_min_buy(cents(300))),
        (plate.clone(), VendorOffer::new("plattenladen", "Germany", cents(3), 200, "301").with_step(10)),
        (rail, VendorOffer::new("plattenladen", "Germany", cents(7), 15, "302")),
        (brick.clone(), VendorOffer::new("tokyobricks", "Japan", cents(5), 500, "401")),
        (tile.clone(), VendorOffer::new("tokyobricks", "Japan", cents(2), 500, "402")),
        (brick, VendorOffer::new("scamshop", "Netherlands", cents(1), 999, "501")),
        (tile, VendorOffer::new("scamshop", "Netherlands", cents(1), 999, "502")),
    ]
}
