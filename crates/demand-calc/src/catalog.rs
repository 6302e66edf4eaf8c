//! 產品目錄索引

use demand_core::{normalize_sku, GradeEntry, Product, ProductRow};
use std::collections::HashMap;

use crate::DiagnosticWarning;

/// SKU 指向的目標：產品，以及（套組時）對應的 grade 項目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SkuTarget {
    product_id: i64,
    variant_index: Option<usize>,
}

/// SKU 解析結果
#[derive(Debug, Clone, Copy)]
pub struct ResolvedProduct<'a> {
    pub product: &'a Product,
    pub variant: Option<&'a GradeEntry>,
}

impl<'a> ResolvedProduct<'a> {
    pub fn variant_name(&self) -> Option<&'a str> {
        self.variant.map(|entry| entry.variation_name.as_str())
    }
}

/// 產品目錄索引（依ID、依正規化 SKU）
#[derive(Debug, Clone, Default)]
pub struct ProductCatalog {
    by_id: HashMap<i64, Product>,
    by_sku: HashMap<String, SkuTarget>,
}

impl ProductCatalog {
    /// 從原始資料列建立索引
    ///
    /// grade 解析失敗的產品仍會建立索引，只是沒有變體。
    pub fn build(rows: Vec<ProductRow>) -> (Self, Vec<DiagnosticWarning>) {
        let mut catalog = Self::default();
        let mut warnings = Vec::new();

        for row in rows {
            let variants = match row.parse_grade() {
                Ok(variants) => variants,
                Err(err) => {
                    tracing::warn!("產品 {} grade 解析失敗，視為無變體: {}", row.id, err);
                    warnings.push(DiagnosticWarning::malformed_grade(row.id, &err));
                    Vec::new()
                }
            };
            catalog.insert(Product::from_parts(row, variants));
        }

        tracing::debug!(
            "目錄索引: 產品 {} 筆, SKU {} 筆",
            catalog.by_id.len(),
            catalog.by_sku.len()
        );

        (catalog, warnings)
    }

    /// 從已解析的產品建立索引
    pub fn from_products(products: impl IntoIterator<Item = Product>) -> Self {
        let mut catalog = Self::default();
        for product in products {
            catalog.insert(product);
        }
        catalog
    }

    /// 加入產品；SKU 衝突時後加入者覆蓋
    pub fn insert(&mut self, product: Product) {
        let product_id = product.id;

        if let Some(sku) = product.normalized_sku() {
            self.by_sku.insert(
                sku,
                SkuTarget {
                    product_id,
                    variant_index: None,
                },
            );
        }

        // 套組的每個 grade SKU 也直接指向該 grade 項目
        if product.is_kit() {
            for (index, entry) in product.variants().iter().enumerate() {
                let Some(sku) = entry.sku.as_deref().map(normalize_sku) else {
                    continue;
                };
                if sku.is_empty() {
                    continue;
                }
                self.by_sku.insert(
                    sku,
                    SkuTarget {
                        product_id,
                        variant_index: Some(index),
                    },
                );
            }
        }

        self.by_id.insert(product_id, product);
    }

    /// 依ID查找
    pub fn get(&self, product_id: i64) -> Option<&Product> {
        self.by_id.get(&product_id)
    }

    /// 依 SKU 查找（不分大小寫、忽略前後空白）
    pub fn resolve_sku(&self, sku: &str) -> Option<ResolvedProduct<'_>> {
        let target = self.by_sku.get(&normalize_sku(sku))?;
        let product = self.by_id.get(&target.product_id)?;
        let variant = target
            .variant_index
            .and_then(|index| product.variants().get(index));

        Some(ResolvedProduct { product, variant })
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}
