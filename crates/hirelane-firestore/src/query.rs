//! Structured query wire types and a small builder over them.
//!
//! Only the subset of Firestore's `structuredQuery` the repositories need:
//! equality filters under a composite `AND`, a single order-by, and a limit.
//! Range and substring predicates are evaluated in memory by callers because
//! Firestore restricts range filters to one field and has no case-insensitive
//! substring operator.

use serde::{Deserialize, Serialize};

use crate::types::{Document, Value};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryRequest {
    pub structured_query: StructuredQuery,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredQuery {
    pub from: Vec<CollectionSelector>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub r#where: Option<Filter>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<Order>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionSelector {
    pub collection_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Filter {
    CompositeFilter(CompositeFilter),
    FieldFilter(FieldFilter),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeFilter {
    /// Always "AND" for our queries.
    pub op: String,
    pub filters: Vec<Filter>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldFilter {
    pub field: FieldReference,
    pub op: String,
    pub value: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldReference {
    pub field_path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub field: FieldReference,
    /// "ASCENDING" or "DESCENDING".
    pub direction: String,
}

/// Each element of a `runQuery` response stream. Firestore interleaves
/// documents with progress markers that carry no `document` key.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunQueryResponse {
    pub document: Option<Document>,
}

/// Builder for the query subset above.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    collection: String,
    filters: Vec<Filter>,
    order_by: Option<Order>,
    limit: Option<i32>,
}

impl QueryBuilder {
    pub fn collection(collection_id: impl Into<String>) -> Self {
        Self {
            collection: collection_id.into(),
            filters: Vec::new(),
            order_by: None,
            limit: None,
        }
    }

    /// Add an equality filter on a field.
    pub fn filter_eq(mut self, field_path: impl Into<String>, value: Value) -> Self {
        self.filters.push(Filter::FieldFilter(FieldFilter {
            field: FieldReference {
                field_path: field_path.into(),
            },
            op: "EQUAL".to_string(),
            value,
        }));
        self
    }

    /// Order results by a field, newest first.
    pub fn order_by_desc(mut self, field_path: impl Into<String>) -> Self {
        self.order_by = Some(Order {
            field: FieldReference {
                field_path: field_path.into(),
            },
            direction: "DESCENDING".to_string(),
        });
        self
    }

    pub fn limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn build(self) -> StructuredQuery {
        let r#where = match self.filters.len() {
            0 => None,
            1 => Some(self.filters.into_iter().next().unwrap()),
            _ => Some(Filter::CompositeFilter(CompositeFilter {
                op: "AND".to_string(),
                filters: self.filters,
            })),
        };
        StructuredQuery {
            from: vec![CollectionSelector {
                collection_id: self.collection,
            }],
            r#where,
            order_by: self.order_by.map(|o| vec![o]),
            limit: self.limit,
        }
    }
}
