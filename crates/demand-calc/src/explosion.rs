//! 套組展開

use demand_core::ProductShape;

use crate::catalog::ResolvedProduct;

/// 展開後的需求項目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DemandItem {
    pub product_id: i64,
    pub variant: Option<String>,
    pub required_qty: i64,
}

/// 套組展開計算器
pub struct KitExplosion;

impl KitExplosion {
    /// 將需求展開為待彙總的項目
    ///
    /// 套組依所解析 grade 項目的組成展開（需求量 × 每套用量）；
    /// 單品直接以自身及其變體作為唯一項目。
    pub fn explode(resolved: &ResolvedProduct<'_>, quantity_requested: i64) -> Vec<DemandItem> {
        match &resolved.product.shape {
            ProductShape::Kit { .. } => resolved
                .variant
                .map(|entry| {
                    entry
                        .composition
                        .iter()
                        .map(|component| DemandItem {
                            product_id: component.component_product_id,
                            variant: component.component_variant.clone(),
                            required_qty: quantity_requested * component.quantity_per_kit,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            ProductShape::Simple { .. } => vec![DemandItem {
                product_id: resolved.product.id,
                variant: resolved.variant_name().map(str::to_string),
                required_qty: quantity_requested,
            }],
        }
    }
}
