//! 賣家分層

use brickbuy_core::{Catalog, VendorIdx};
use std::cmp::Reverse;
use std::collections::BTreeSet;

/// 賣家分層結果（每次搜尋只計算一次）
#[derive(Debug, Clone, Default)]
pub struct VendorTiers {
    /// 近距離主要賣家（供應零件種類最多的前 N 家）
    pub near_major: Vec<VendorIdx>,

    /// 近距離次要賣家
    pub near_minor: Vec<VendorIdx>,

    /// 遠距離賣家
    pub far: Vec<VendorIdx>,
}

impl VendorTiers {
    pub fn len(&self) -> usize {
        self.near_major.len() + self.near_minor.len() + self.far.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// 賣家分層器
pub struct VendorStratifier;

impl VendorStratifier {
    /// 將必選賣家以外的賣家分層
    ///
    /// 近/遠兩組各自依供應零件種類數由多到少排序（同數量依商店代號），
    /// 近距離組的前 `near_major_size` 家為主要層，其餘為次要層。
    pub fn stratify(
        catalog: &Catalog,
        mandatory: &BTreeSet<VendorIdx>,
        near_major_size: usize,
    ) -> VendorTiers {
        let (mut near, mut far): (Vec<VendorIdx>, Vec<VendorIdx>) = catalog
            .vendor_indices()
            .filter(|vendor| !mandatory.contains(vendor))
            .partition(|&vendor| catalog.vendor(vendor).is_near);

        for group in [&mut near, &mut far] {
            group.sort_by_key(|&vendor| {
                (
                    Reverse(catalog.stocked_parts(vendor).len()),
                    catalog.vendor(vendor).id.clone(),
                )
            });
        }

        let near_minor = near.split_off(near_major_size.min(near.len()));

        tracing::debug!(
            "賣家分層：近距離主要 {}，近距離次要 {}，遠距離 {}",
            near.len(),
            near_minor.len(),
            far.len()
        );

        VendorTiers {
            near_major: near,
            near_minor,
            far,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::catalog;
    use brickbuy_core::VendorId;

    fn handles(catalog: &Catalog, vendors: &[VendorIdx]) -> Vec<String> {
        vendors
            .iter()
            .map(|&v| catalog.vendor(v).id.to_string())
            .collect()
    }

    #[test]
    fn test_stratify_by_location_and_stock() {
        let (catalog, _) = catalog(
            &[("p1", 1), ("p2", 1), ("p3", 1)],
            &[
                ("p1", "small", "Netherlands", 5),
                ("p1", "big", "Netherlands", 5),
                ("p2", "big", "Netherlands", 5),
                ("p3", "big", "Netherlands", 5),
                ("p1", "mid", "Netherlands", 5),
                ("p2", "mid", "Netherlands", 5),
                ("p1", "faraway", "Japan", 5),
            ],
        );

        let tiers = VendorStratifier::stratify(&catalog, &BTreeSet::new(), 2);

        assert_eq!(handles(&catalog, &tiers.near_major), vec!["big", "mid"]);
        assert_eq!(handles(&catalog, &tiers.near_minor), vec!["small"]);
        assert_eq!(handles(&catalog, &tiers.far), vec!["faraway"]);
        assert_eq!(tiers.len(), 4);
    }

    #[test]
    fn test_mandatory_vendors_are_excluded() {
        let (catalog, _) = catalog(
            &[("p1", 1)],
            &[("p1", "a", "Netherlands", 5), ("p1", "b", "Netherlands", 5)],
        );
        let a = catalog.find_vendor(&VendorId::new("a")).unwrap();
        let mandatory: BTreeSet<VendorIdx> = [a].into_iter().collect();

        let tiers = VendorStratifier::stratify(&catalog, &mandatory, 20);

        assert_eq!(handles(&catalog, &tiers.near_major), vec!["b"]);
        assert!(tiers.near_minor.is_empty());
        assert!(tiers.far.is_empty());
    }
}
