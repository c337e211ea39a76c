//! Product list options: `search`, `ordering`, `limit`, `offset`.

use crate::models::Product;
use std::cmp::Ordering;
use std::collections::HashMap;

pub const MAX_LIMIT: u32 = 1000;

/// Fields a product list may be ordered by.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OrderField {
    Price,
    CreatedDate,
}

impl OrderField {
    fn parse(s: &str) -> Option<Self> {
        match s {
            "price" => Some(OrderField::Price),
            "created_date" => Some(OrderField::CreatedDate),
            _ => None,
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            OrderField::Price => "price",
            OrderField::CreatedDate => "created_date",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OrderKey {
    pub field: OrderField,
    pub descending: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ProductQuery {
    /// Lowercased terms; every term must match the product or category name.
    pub search_terms: Vec<String>,
    pub ordering: Vec<OrderKey>,
    pub limit: Option<u32>,
    pub offset: u32,
}

impl ProductQuery {
    /// Build from raw query parameters. Unknown parameters and ordering fields are ignored.
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let mut query = ProductQuery::default();
        if let Some(search) = params.get("search") {
            query.search_terms = parse_search_terms(search);
        }
        if let Some(ordering) = params.get("ordering") {
            query.ordering = parse_ordering(ordering);
        }
        query.limit = params
            .get("limit")
            .and_then(|v| v.trim().parse::<u32>().ok())
            .map(|n| n.clamp(1, MAX_LIMIT));
        // Offset only applies to paginated requests.
        query.offset = match query.limit {
            Some(_) => params
                .get("offset")
                .and_then(|v| v.trim().parse::<u32>().ok())
                .unwrap_or(0),
            None => 0,
        };
        query
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.search_terms = parse_search_terms(search);
        self
    }

    pub fn with_ordering(mut self, ordering: &str) -> Self {
        self.ordering = parse_ordering(ordering);
        self
    }

    /// Case-insensitive substring match of every term against product or category name.
    pub fn matches(&self, product: &Product) -> bool {
        if self.search_terms.is_empty() {
            return true;
        }
        let name = product.name.to_lowercase();
        let category = product.category.name.to_lowercase();
        self.search_terms
            .iter()
            .all(|term| name.contains(term.as_str()) || category.contains(term.as_str()))
    }

    /// Requested ordering, then ascending id.
    pub fn compare(&self, a: &Product, b: &Product) -> Ordering {
        for key in &self.ordering {
            let ord = match key.field {
                OrderField::Price => a.price.cmp(&b.price),
                OrderField::CreatedDate => a.created_date.cmp(&b.created_date),
            };
            let ord = if key.descending { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        a.id.cmp(&b.id)
    }
}

fn parse_search_terms(search: &str) -> Vec<String> {
    search
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}

fn parse_ordering(ordering: &str) -> Vec<OrderKey> {
    let mut keys: Vec<OrderKey> = Vec::new();
    for raw in ordering.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        let Some(field) = OrderField::parse(name) else {
            continue;
        };
        if keys.iter().any(|k| k.field == field) {
            continue;
        }
        keys.push(OrderKey { field, descending });
    }
    keys
}
