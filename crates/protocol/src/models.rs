use {
    chrono::{DateTime, Utc},
    serde::{Deserialize, Serialize},
};

// ── Catalog ──────────────────────────────────────────────────────────────────

/// A persisted catalog product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub stock: i64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub thumbnails: Vec<String>,
}

/// Client-supplied fields for a new product. Everything except `title` and
/// `price` is optional and defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductDraft {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub thumbnails: Vec<String>,
}

/// Partial update for an existing product. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub price: Option<f64>,
    pub stock: Option<i64>,
    pub category: Option<String>,
    pub thumbnails: Option<Vec<String>>,
}

/// One page of a paginated listing, with paginate-style metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u32,
    pub has_prev_page: bool,
    pub has_next_page: bool,
    pub prev_page: Option<u32>,
    pub next_page: Option<u32>,
}

// ── Chat ─────────────────────────────────────────────────────────────────────

/// A persisted chat message. Append-only; messages are never edited.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub sender: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
}

/// Client-supplied fields for a new chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatDraft {
    pub sender: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn product_draft_defaults_optional_fields() {
        let draft: ProductDraft =
            serde_json::from_value(serde_json::json!({"title": "X", "price": 10})).unwrap();
        assert_eq!(draft.title, "X");
        assert_eq!(draft.stock, 0);
        assert!(draft.thumbnails.is_empty());
    }

    #[test]
    fn product_patch_skips_absent_fields() {
        let patch: ProductPatch =
            serde_json::from_value(serde_json::json!({"price": 5.5})).unwrap();
        assert_eq!(patch.price, Some(5.5));
        assert!(patch.title.is_none());
    }
}
