//! 產品目錄模型

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::demand::normalize_sku;

/// 套組組成項目（BOM 行）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositionEntry {
    /// 子件產品ID
    pub component_product_id: i64,

    /// 子件變體
    #[serde(default)]
    pub component_variant: Option<String>,

    /// 每套用量
    pub quantity_per_kit: i64,
}

impl CompositionEntry {
    pub fn new(component_product_id: i64, component_variant: Option<&str>, quantity_per_kit: i64) -> Self {
        Self {
            component_product_id,
            component_variant: component_variant.map(str::to_string),
            quantity_per_kit,
        }
    }
}

/// grade 變體描述
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeEntry {
    /// 變體名稱
    pub variation_name: String,

    #[serde(default)]
    pub sku: Option<String>,

    #[serde(default)]
    pub image: Option<String>,

    /// 套組組成（僅套組產品有意義）
    #[serde(default)]
    pub composition: Vec<CompositionEntry>,
}

impl GradeEntry {
    pub fn new(variation_name: impl Into<String>) -> Self {
        Self {
            variation_name: variation_name.into(),
            sku: None,
            image: None,
            composition: Vec::new(),
        }
    }

    /// 建構器模式：設置 SKU
    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    /// 建構器模式：設置圖片
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// 建構器模式：設置組成
    pub fn with_composition(mut self, composition: Vec<CompositionEntry>) -> Self {
        self.composition = composition;
        self
    }
}

/// 產品目錄原始資料列
///
/// `grade` 可能是 JSON 陣列，也可能是被編碼成字串的 JSON。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub is_kit: bool,
    #[serde(default)]
    pub grade: Option<Value>,
    #[serde(default)]
    pub image: Option<String>,
}

impl ProductRow {
    /// 解析 grade 欄位
    ///
    /// 空值或空字串視為沒有變體；格式錯誤時回傳錯誤，由呼叫端決定如何降級。
    pub fn parse_grade(&self) -> crate::Result<Vec<GradeEntry>> {
        match &self.grade {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::String(raw)) if raw.trim().is_empty() => Ok(Vec::new()),
            Some(Value::String(raw)) => Ok(serde_json::from_str(raw)?),
            Some(other) => Ok(serde_json::from_value(other.clone())?),
        }
    }
}

/// 產品形態
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductShape {
    /// 單品
    Simple { variants: Vec<GradeEntry> },
    /// 套組，變體帶有組成
    Kit { variants: Vec<GradeEntry> },
}

/// 產品
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub sku: Option<String>,
    pub image: Option<String>,
    pub shape: ProductShape,
}

impl Product {
    /// 創建單品
    pub fn simple(id: i64, name: impl Into<String>, variants: Vec<GradeEntry>) -> Self {
        Self {
            id,
            name: name.into(),
            sku: None,
            image: None,
            shape: ProductShape::Simple { variants },
        }
    }

    /// 創建套組
    pub fn kit(id: i64, name: impl Into<String>, variants: Vec<GradeEntry>) -> Self {
        Self {
            id,
            name: name.into(),
            sku: None,
            image: None,
            shape: ProductShape::Kit { variants },
        }
    }

    /// 由原始資料列與已解析的 grade 組成產品
    pub fn from_parts(row: ProductRow, variants: Vec<GradeEntry>) -> Self {
        let shape = if row.is_kit {
            ProductShape::Kit { variants }
        } else {
            ProductShape::Simple { variants }
        };
        Self {
            id: row.id,
            name: row.name,
            sku: row.sku,
            image: row.image,
            shape,
        }
    }

    /// 建構器模式：設置 SKU
    pub fn with_sku(mut self, sku: impl Into<String>) -> Self {
        self.sku = Some(sku.into());
        self
    }

    /// 建構器模式：設置圖片
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn variants(&self) -> &[GradeEntry] {
        match &self.shape {
            ProductShape::Simple { variants } | ProductShape::Kit { variants } => variants,
        }
    }

    pub fn is_kit(&self) -> bool {
        matches!(self.shape, ProductShape::Kit { .. })
    }

    /// 正規化後的 SKU
    pub fn normalized_sku(&self) -> Option<String> {
        self.sku
            .as_deref()
            .map(normalize_sku)
            .filter(|sku| !sku.is_empty())
    }

    /// 依變體名稱查找 grade
    pub fn find_variant(&self, variation_name: &str) -> Option<&GradeEntry> {
        self.variants()
            .iter()
            .find(|entry| entry.variation_name == variation_name)
    }
}
