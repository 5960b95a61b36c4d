//! Work order records as stored in the backend `orders` table.
//!
//! The dashboard never mutates an [`Order`] in place; the working copy is
//! replaced wholesale on every refetch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Grouping key used when an order carries no company name.
pub const NO_COMPANY: &str = "Sin Empresa";

/// Order priority, ordered from least to most important.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderPriority {
    Low,
    Normal,
    High,
    Critical,
}

impl OrderPriority {
    /// Name as stored in the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

impl Default for OrderPriority {
    fn default() -> Self {
        Self::Normal
    }
}

impl fmt::Display for OrderPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            "critical" => Ok(Self::Critical),
            other => Err(format!(
                "unknown priority '{}' (expected low|normal|high|critical)",
                other
            )),
        }
    }
}

/// Production status of an order.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    Scheduled,
    Production,
    Quality,
    Hold,
}

impl OrderStatus {
    /// Name as stored in the backend.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Production => "production",
            Self::Quality => "quality",
            Self::Hold => "hold",
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        Self::Scheduled
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "scheduled" => Ok(Self::Scheduled),
            "production" => Ok(Self::Production),
            "quality" => Ok(Self::Quality),
            "hold" => Ok(Self::Hold),
            other => Err(format!(
                "unknown status '{}' (expected scheduled|production|quality|hold)",
                other
            )),
        }
    }
}

/// A manufacturing work order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Opaque unique identifier, stable for the order's lifetime.
    pub id: String,
    /// Grouping key; `None`/empty maps to [`NO_COMPANY`].
    #[serde(default)]
    pub company_name: Option<String>,
    /// Free text, scanned case-insensitively for the "URGENTE" marker.
    #[serde(default)]
    pub part_name: String,
    pub quantity_total: u32,
    pub quantity_completed: u32,
    pub priority: OrderPriority,
    pub status: OrderStatus,
    /// Creation time; drives the FIFO tie-break and overdue classification.
    pub created_at: DateTime<Utc>,
}

impl Order {
    /// Company key, with the sentinel substituted for absent/empty names.
    pub fn company(&self) -> &str {
        match self.company_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => NO_COMPANY,
        }
    }

    /// Completion percentage for display (0-100).
    pub fn progress_pct(&self) -> u16 {
        if self.quantity_total == 0 {
            return 0;
        }
        let pct = (self.quantity_completed as u64 * 100) / self.quantity_total as u64;
        pct.min(100) as u16
    }
}

/// Fields for creating a new order.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OrderDraft {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    pub part_name: String,
    pub quantity_total: u32,
    #[serde(default)]
    pub quantity_completed: u32,
    pub priority: OrderPriority,
    pub status: OrderStatus,
}

/// Partial update of an existing order; only set fields are sent.
#[derive(Debug, Clone, Serialize, Default)]
pub struct OrderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub part_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_total: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity_completed: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub priority: Option<OrderPriority>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<OrderStatus>,
}

impl OrderPatch {
    /// Whether this patch carries any change at all.
    pub fn is_empty(&self) -> bool {
        self.company_name.is_none()
            && self.part_name.is_none()
            && self.quantity_total.is_none()
            && self.quantity_completed.is_none()
            && self.priority.is_none()
            && self.status.is_none()
    }
}

/// Kind of change recorded in the audit-history table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChangeType {
    Create,
    Update,
    Delete,
}

impl ChangeType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChangeType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "create" => Ok(Self::Create),
            "update" => Ok(Self::Update),
            "delete" => Ok(Self::Delete),
            other => Err(format!(
                "unknown change type '{}' (expected create|update|delete)",
                other
            )),
        }
    }
}

/// One per-field change event from the `order_history` audit table.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderChange {
    pub id: String,
    pub order_id: String,
    pub changed_field: String,
    #[serde(default)]
    pub old_value: Option<String>,
    #[serde(default)]
    pub new_value: Option<String>,
    pub change_type: ChangeType,
    pub changed_at: DateTime<Utc>,
}
