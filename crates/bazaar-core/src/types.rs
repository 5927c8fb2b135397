//! # Domain Types
//!
//! Core domain types shared by the reconciliation services.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │     Order       │   │    Product      │   │     Vendor      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  items[]        │──►│  vendor_id      │──►│  auto_stock_    │       │
//! │  │  is_paid        │   │  stock          │   │   deduction     │       │
//! │  │  status         │   └────────┬────────┘   └─────────────────┘       │
//! │  └────────┬────────┘            │                                       │
//! │           │ one per line        │ one per stock change                  │
//! │           ▼                     ▼                                       │
//! │  ┌─────────────────┐   ┌─────────────────┐                             │
//! │  │  SalesRecord    │   │ StockMovement   │                             │
//! │  │  commission     │   │ previous → new  │                             │
//! │  │  net_amount     │   │ (append-only)   │                             │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Identifiers are UUID v4 strings; money columns are integer minor units
//! with a `_cents` suffix.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{CommissionRate, Money};

// =============================================================================
// Order Status
// =============================================================================

/// Lifecycle status of a customer order.
///
/// ```text
/// pending ──► processing ──► shipped ──► delivered
///    │             │
///    └─────────────┴──► cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Pending,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

impl OrderStatus {
    /// Delivered and cancelled orders never change status again.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
    }

    fn rank(&self) -> u8 {
        match self {
            OrderStatus::Pending => 0,
            OrderStatus::Processing => 1,
            OrderStatus::Shipped => 2,
            OrderStatus::Delivered => 3,
            OrderStatus::Cancelled => 4,
        }
    }

    /// Single-step transitions made by the normal order flow.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Processing)
                | (Pending, Cancelled)
                | (Processing, Shipped)
                | (Processing, Cancelled)
                | (Shipped, Delivered)
        )
    }

    /// Admin override: may skip forward, may cancel before shipping, never
    /// leaves a terminal state.
    pub fn can_override_to(&self, next: OrderStatus) -> bool {
        if self.is_terminal() || *self == next {
            return false;
        }
        match next {
            OrderStatus::Cancelled => self.rank() < OrderStatus::Shipped.rank(),
            _ => next.rank() > self.rank(),
        }
    }

    /// Validates an admin override, returning the typed error on refusal.
    pub fn check_override(&self, next: OrderStatus) -> CoreResult<()> {
        if self.can_override_to(next) {
            Ok(())
        } else {
            Err(CoreError::InvalidTransition { from: *self, to: next })
        }
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Card,
    Upi,
    NetBanking,
    Wallet,
    /// Collected by the courier at delivery.
    CashOnDelivery,
    /// In-store cash, offline sales only.
    Cash,
}

// =============================================================================
// Order
// =============================================================================

/// A customer purchase spanning one or more vendors.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub user_id: String,
    pub coupon_id: Option<String>,
    pub payment_method: PaymentMethod,
    /// Sum of line totals before discount.
    pub items_price_cents: i64,
    pub discount_cents: i64,
    pub total_price_cents: i64,
    pub status: OrderStatus,
    pub is_paid: bool,
    #[ts(as = "Option<String>")]
    pub paid_at: Option<DateTime<Utc>>,
    pub is_delivered: bool,
    #[ts(as = "Option<String>")]
    pub delivered_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
    /// Line items, loaded separately by the repository.
    #[cfg_attr(feature = "sqlx", sqlx(skip))]
    pub items: Vec<OrderItem>,
}

impl Order {
    /// Creates an unpaid, pending order with no lines.
    pub fn new(user_id: impl Into<String>, payment_method: PaymentMethod) -> Self {
        let now = Utc::now();
        Order {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            coupon_id: None,
            payment_method,
            items_price_cents: 0,
            discount_cents: 0,
            total_price_cents: 0,
            status: OrderStatus::Pending,
            is_paid: false,
            paid_at: None,
            is_delivered: false,
            delivered_at: None,
            created_at: now,
            updated_at: now,
            items: Vec::new(),
        }
    }

    /// Appends a line and refreshes the order totals.
    pub fn push_item(
        &mut self,
        product_id: impl Into<String>,
        name_snapshot: impl Into<String>,
        quantity: i64,
        unit_price_cents: i64,
    ) -> &OrderItem {
        let item = OrderItem {
            id: uuid::Uuid::new_v4().to_string(),
            order_id: self.id.clone(),
            line_no: self.items.len() as i64 + 1,
            product_id: product_id.into(),
            name_snapshot: name_snapshot.into(),
            quantity,
            unit_price_cents,
            unit_mrp_cents: unit_price_cents,
        };
        self.items.push(item);

        let items_price: Money = self.items.iter().map(OrderItem::line_total).sum();
        self.items_price_cents = items_price.cents();
        self.total_price_cents = self.items_price_cents - self.discount_cents;

        &self.items[self.items.len() - 1]
    }

    #[inline]
    pub fn total_price(&self) -> Money {
        Money::from_cents(self.total_price_cents)
    }
}

/// One product/quantity/price tuple within an order.
/// Snapshot of the product at checkout; immutable afterwards.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    /// Position within the order, starting at 1.
    pub line_no: i64,
    pub product_id: String,
    pub name_snapshot: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub unit_mrp_cents: i64,
}

impl OrderItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }
}

// =============================================================================
// Product & Vendor
// =============================================================================

/// A vendor-owned product. `stock` is the only counter the stock ledger
/// is allowed to change.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    pub id: String,
    pub vendor_id: String,
    pub sku: String,
    pub name: String,
    pub price_cents: i64,
    pub mrp_cents: i64,
    pub stock: i64,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Creates an active product with zero stock.
    pub fn new(
        vendor_id: impl Into<String>,
        sku: impl Into<String>,
        name: impl Into<String>,
        price_cents: i64,
    ) -> Self {
        let now = Utc::now();
        Product {
            id: uuid::Uuid::new_v4().to_string(),
            vendor_id: vendor_id.into(),
            sku: sku.into(),
            name: name.into(),
            price_cents,
            mrp_cents: price_cents,
            stock: 0,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

/// A seller on the marketplace.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Vendor {
    pub id: String,
    pub business_name: String,
    pub email: String,
    /// Recording a sale also deducts product stock when set.
    pub auto_stock_deduction: bool,
    pub is_active: bool,
    /// Cumulative figures maintained by the stats recompute.
    pub total_sales_cents: i64,
    pub total_commission_cents: i64,
    pub total_net_cents: i64,
    pub total_orders: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Vendor {
    /// Creates an active vendor with empty stats and stock deduction off.
    pub fn new(business_name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Vendor {
            id: uuid::Uuid::new_v4().to_string(),
            business_name: business_name.into(),
            email: email.into(),
            auto_stock_deduction: false,
            is_active: true,
            total_sales_cents: 0,
            total_commission_cents: 0,
            total_net_cents: 0,
            total_orders: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn stats(&self) -> VendorSalesStats {
        VendorSalesStats {
            total_sales_cents: self.total_sales_cents,
            total_commission_cents: self.total_commission_cents,
            total_net_cents: self.total_net_cents,
            total_orders: self.total_orders,
        }
    }
}

/// Cumulative totals recomputed from a vendor's completed sales records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct VendorSalesStats {
    pub total_sales_cents: i64,
    pub total_commission_cents: i64,
    pub total_net_cents: i64,
    pub total_orders: i64,
}

// =============================================================================
// Sales Record
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleType {
    /// Derived from a storefront order.
    Online,
    /// Entered by the vendor for an in-store sale.
    Offline,
}

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    Completed,
    Refunded,
    Cancelled,
}

impl Default for SaleStatus {
    fn default() -> Self {
        SaleStatus::Completed
    }
}

/// One vendor's share of one order line (or one offline sale).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SalesRecord {
    pub id: String,
    pub vendor_id: String,
    pub product_id: String,
    /// Originating order; `None` for offline sales.
    pub order_id: Option<String>,
    /// Originating order line; unique across all records.
    pub order_item_id: Option<String>,
    pub sale_type: SaleType,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub total_amount_cents: i64,
    pub platform_commission_cents: i64,
    pub net_amount_cents: i64,
    /// Rate the commission was computed with, kept for audit.
    pub commission_rate_bps: i64,
    pub payment_method: PaymentMethod,
    pub status: SaleStatus,
    /// Reporting date. For online sales this is the order's creation time.
    #[ts(as = "String")]
    pub sale_date: DateTime<Utc>,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl SalesRecord {
    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_cents(self.total_amount_cents)
    }

    #[inline]
    pub fn platform_commission(&self) -> Money {
        Money::from_cents(self.platform_commission_cents)
    }

    #[inline]
    pub fn net_amount(&self) -> Money {
        Money::from_cents(self.net_amount_cents)
    }

    #[inline]
    pub fn commission_rate(&self) -> CommissionRate {
        CommissionRate::from_bps(self.commission_rate_bps as u32)
    }
}

// =============================================================================
// Stock Movement
// =============================================================================

/// Kind of stock change. Sign rules live in [`crate::stock`].
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum MovementType {
    In,
    Out,
    Adjustment,
    Return,
    Damage,
    Transfer,
}

impl MovementType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            MovementType::In => "in",
            MovementType::Out => "out",
            MovementType::Adjustment => "adjustment",
            MovementType::Return => "return",
            MovementType::Damage => "damage",
            MovementType::Transfer => "transfer",
        }
    }
}

impl std::fmt::Display for MovementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What caused a stock movement.
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceType {
    OnlineOrder,
    OfflineSale,
    Manual,
}

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ApprovalStatus {
    Approved,
    Pending,
    Rejected,
}

impl Default for ApprovalStatus {
    fn default() -> Self {
        ApprovalStatus::Approved
    }
}

/// Append-only audit entry for a product stock change.
///
/// Invariant: `new_stock == previous_stock + quantity`.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct StockMovement {
    pub id: String,
    pub vendor_id: String,
    pub product_id: String,
    pub movement_type: MovementType,
    /// Signed delta applied to stock.
    pub quantity: i64,
    pub previous_stock: i64,
    pub new_stock: i64,
    pub reference_type: ReferenceType,
    pub reference_id: Option<String>,
    pub reason: String,
    pub unit_cost_cents: Option<i64>,
    pub total_cost_cents: Option<i64>,
    pub approval_status: ApprovalStatus,
    /// User or system actor that caused the movement.
    pub created_by: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Reconciliation Claim
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReconciliationStatus {
    InProgress,
    /// Every line produced a sales record.
    Completed,
    /// Some lines were skipped; eligible for resume.
    Partial,
}

/// Per-order claim row guarding the sales recorder.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderReconciliation {
    pub order_id: String,
    pub status: ReconciliationStatus,
    pub line_count: i64,
    pub recorded_count: i64,
    #[ts(as = "String")]
    pub started_at: DateTime<Utc>,
    #[ts(as = "Option<String>")]
    pub finished_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Sales Breakdown (read projection)
// =============================================================================

/// One vendor's slice of an order's recorded sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct VendorSalesBreakdown {
    pub vendor_id: String,
    pub business_name: Option<String>,
    pub quantity: i64,
    pub total_sales_cents: i64,
    pub total_commission_cents: i64,
    pub net_amount_cents: i64,
    pub record_count: i64,
}

/// Aggregate totals for an order plus the per-vendor rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct SalesBreakdown {
    pub order_id: String,
    pub total_sales_cents: i64,
    pub total_commission_cents: i64,
    pub total_net_to_vendors_cents: i64,
    pub vendors: Vec<VendorSalesBreakdown>,
}

impl SalesBreakdown {
    /// Builds the order totals from per-vendor rows.
    pub fn from_vendor_rows(order_id: impl Into<String>, vendors: Vec<VendorSalesBreakdown>) -> Self {
        let total_sales: Money = vendors.iter().map(|v| Money::from_cents(v.total_sales_cents)).sum();
        let total_commission: Money = vendors
            .iter()
            .map(|v| Money::from_cents(v.total_commission_cents))
            .sum();
        let total_net: Money = vendors.iter().map(|v| Money::from_cents(v.net_amount_cents)).sum();

        SalesBreakdown {
            order_id: order_id.into(),
            total_sales_cents: total_sales.cents(),
            total_commission_cents: total_commission.cents(),
            total_net_to_vendors_cents: total_net.cents(),
            vendors,
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_status_flow() {
        use OrderStatus::*;
        assert!(Pending.can_transition_to(Processing));
        assert!(Processing.can_transition_to(Shipped));
        assert!(Shipped.can_transition_to(Delivered));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Processing.can_transition_to(Cancelled));

        assert!(!Shipped.can_transition_to(Cancelled));
        assert!(!Delivered.can_transition_to(Cancelled));
        assert!(!Pending.can_transition_to(Delivered));
    }

    #[test]
    fn test_order_status_override() {
        use OrderStatus::*;
        assert!(Pending.can_override_to(Delivered));
        assert!(Processing.can_override_to(Cancelled));
        assert!(!Shipped.can_override_to(Cancelled));
        assert!(!Shipped.can_override_to(Processing));
        assert!(!Delivered.can_override_to(Shipped));
        assert!(!Cancelled.can_override_to(Pending));
        assert!(!Pending.can_override_to(Pending));

        assert!(matches!(
            Delivered.check_override(Cancelled),
            Err(CoreError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_order_push_item_updates_totals() {
        let mut order = Order::new("user-1", PaymentMethod::Upi);
        order.push_item("p1", "Silk Scarf", 2, 20_000);
        let second = order.push_item("p2", "Clay Mug", 5, 5_000).clone();

        assert_eq!(second.line_no, 2);
        assert_eq!(second.order_id, order.id);
        assert_eq!(order.items_price_cents, 65_000);
        assert_eq!(order.total_price().cents(), 65_000);
        assert!(!order.is_paid);
        assert_eq!(order.status, OrderStatus::Pending);
    }

    #[test]
    fn test_defaults() {
        assert_eq!(OrderStatus::default(), OrderStatus::Pending);
        assert_eq!(SaleStatus::default(), SaleStatus::Completed);
        assert_eq!(ApprovalStatus::default(), ApprovalStatus::Approved);
    }

    #[test]
    fn test_movement_type_serde_names() {
        let json = serde_json::to_string(&MovementType::Out).unwrap();
        assert_eq!(json, "\"out\"");
        let json = serde_json::to_string(&ReferenceType::OnlineOrder).unwrap();
        assert_eq!(json, "\"online_order\"");
        assert_eq!(MovementType::Damage.to_string(), "damage");
    }

    #[test]
    fn test_breakdown_totals() {
        let rows = vec![
            VendorSalesBreakdown {
                vendor_id: "v1".to_string(),
                business_name: Some("Loom & Co".to_string()),
                quantity: 2,
                total_sales_cents: 40_000,
                total_commission_cents: 2_000,
                net_amount_cents: 38_000,
                record_count: 1,
            },
            VendorSalesBreakdown {
                vendor_id: "v2".to_string(),
                business_name: None,
                quantity: 5,
                total_sales_cents: 25_000,
                total_commission_cents: 1_250,
                net_amount_cents: 23_750,
                record_count: 1,
            },
        ];

        let breakdown = SalesBreakdown::from_vendor_rows("order-1", rows);
        assert_eq!(breakdown.total_sales_cents, 65_000);
        assert_eq!(breakdown.total_commission_cents, 3_250);
        assert_eq!(breakdown.total_net_to_vendors_cents, 61_750);
        assert_eq!(breakdown.vendors.len(), 2);
    }
}
