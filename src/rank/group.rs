//! Partitioning of the order collection into per-company buckets.

use std::collections::HashMap;

use crate::domain::Order;

/// Orders partitioned by company key.
#[derive(Debug, Clone, Default)]
pub struct CompanyBuckets {
    /// Company key -> that company's orders, input order preserved.
    pub buckets: HashMap<String, Vec<Order>>,
    /// Distinct company keys, alphabetical (ordinal, case-sensitive).
    /// Companies without orders never appear.
    pub companies: Vec<String>,
}

impl CompanyBuckets {
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    /// Orders for one company, empty slice if unknown.
    pub fn orders_for(&self, company: &str) -> &[Order] {
        self.buckets.get(company).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Partition orders by company, substituting the sentinel for absent names.
pub fn group_by_company(orders: &[Order]) -> CompanyBuckets {
    let mut buckets: HashMap<String, Vec<Order>> = HashMap::new();

    for order in orders {
        buckets
            .entry(order.company().to_string())
            .or_default()
            .push(order.clone());
    }

    let mut companies: Vec<String> = buckets.keys().cloned().collect();
    companies.sort();

    CompanyBuckets { buckets, companies }
}
