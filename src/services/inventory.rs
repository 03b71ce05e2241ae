use crate::{
    attachments::PhotoStore,
    db::{with_transaction, DbPool},
    entities::{
        item::{self, Entity as Item},
        transaction::{self, Entity as Transaction, TransactionStatus},
    },
    errors::ServiceError,
    notifications::{notify_best_effort, NotificationSink},
    reports::{self, ExportFormat},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    entity::*,
    query::*,
    sea_query::{Expr, LikeExpr},
    ConnectionTrait,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};
use validator::Validate;

use super::{non_blank, DateRange};

/// Editable item fields, used for both creation and full updates.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ItemFields {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub location: String,
    #[validate(range(min = 0, message = "Quantity cannot be negative"))]
    pub quantity: i32,
    #[serde(default)]
    pub unit: String,
    #[validate(range(min = 0, message = "Threshold cannot be negative"))]
    pub threshold: i32,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub supplier_contact: Option<String>,
    #[serde(default)]
    pub supplier_sku: Option<String>,
    #[serde(default)]
    pub unit_cost: Option<f64>,
}

impl ItemFields {
    pub fn new(name: impl Into<String>, quantity: i32, threshold: i32) -> Self {
        Self {
            name: name.into(),
            category: String::new(),
            location: String::new(),
            quantity,
            unit: String::new(),
            threshold,
            supplier: None,
            supplier_contact: None,
            supplier_sku: None,
            unit_cost: None,
        }
    }

    fn check(&self) -> Result<(), ServiceError> {
        self.validate()?;
        if let Some(cost) = self.unit_cost {
            if !cost.is_finite() || cost < 0.0 {
                return Err(ServiceError::ValidationError(format!(
                    "unit cost {} is invalid",
                    cost
                )));
            }
        }
        Ok(())
    }

    fn apply(self, active: &mut item::ActiveModel) {
        active.name = Set(self.name.trim().to_string());
        active.category = Set(self.category.trim().to_string());
        active.location = Set(self.location.trim().to_string());
        active.quantity = Set(self.quantity);
        active.unit = Set(self.unit.trim().to_string());
        active.threshold = Set(self.threshold);
        active.supplier = Set(non_blank(self.supplier));
        active.supplier_contact = Set(non_blank(self.supplier_contact));
        active.supplier_sku = Set(non_blank(self.supplier_sku));
        active.unit_cost = Set(self.unit_cost);
    }
}

/// An item as shown in listings, with its low-stock flag.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: item::Model,
    pub low_stock: bool,
}

impl From<item::Model> for ItemView {
    fn from(item: item::Model) -> Self {
        let low_stock = item.is_low_stock();
        Self { item, low_stock }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LowStockEntry {
    pub item_id: i32,
    pub name: String,
    pub quantity: i32,
    pub threshold: i32,
}

impl From<&item::Model> for LowStockEntry {
    fn from(item: &item::Model) -> Self {
        Self {
            item_id: item.id,
            name: item.name.clone(),
            quantity: item.quantity,
            threshold: item.threshold,
        }
    }
}

#[derive(Debug, Clone, Validate)]
pub struct CheckOut {
    pub item_id: i32,
    #[validate(length(min = 1, message = "Person is required"))]
    pub person: String,
    pub expected_return_date: Option<NaiveDate>,
    pub notes: Option<String>,
    pub photo: Option<PathBuf>,
}

impl CheckOut {
    pub fn new(item_id: i32, person: impl Into<String>) -> Self {
        Self {
            item_id,
            person: person.into(),
            expected_return_date: None,
            notes: None,
            photo: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct CheckIn {
    pub notes: Option<String>,
    pub photo: Option<PathBuf>,
}

/// Equipment inventory and custody ledger
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
    photos: PhotoStore,
    notifier: Arc<dyn NotificationSink>,
}

impl InventoryService {
    pub fn new(
        db_pool: Arc<DbPool>,
        photos: PhotoStore,
        notifier: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            db_pool,
            photos,
            notifier,
        }
    }

    #[instrument(skip(self, request), fields(name = %request.name))]
    pub async fn add_item(&self, request: ItemFields) -> Result<item::Model, ServiceError> {
        request.check()?;
        let mut active = item::ActiveModel {
            ..Default::default()
        };
        request.apply(&mut active);
        let model = active.insert(&*self.db_pool).await?;
        info!(item_id = model.id, quantity = model.quantity, "Item added");
        Ok(model)
    }

    #[instrument(skip(self, request))]
    pub async fn update_item(
        &self,
        id: i32,
        request: ItemFields,
    ) -> Result<item::Model, ServiceError> {
        request.check()?;
        let existing = self.get_item(id).await?;
        let mut active: item::ActiveModel = existing.into();
        request.apply(&mut active);
        let model = active.update(&*self.db_pool).await.map_err(|e| {
            error!(error = %e, item_id = id, "Failed to update item");
            ServiceError::db_error(e)
        })?;
        info!(item_id = id, quantity = model.quantity, "Item updated");
        Ok(model)
    }

    /// Deletes the item. Ledger rows pointing at it are kept.
    #[instrument(skip(self))]
    pub async fn delete_item(&self, id: i32) -> Result<(), ServiceError> {
        let result = Item::delete_by_id(id).exec(&*self.db_pool).await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Item", id));
        }
        info!(item_id = id, "Item deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn get_item(&self, id: i32) -> Result<item::Model, ServiceError> {
        Item::find_by_id(id)
            .one(&*self.db_pool)
            .await?
            .ok_or_else(|| ServiceError::not_found("Item", id))
    }

    /// Items whose name or category contains `term`, by name.
    ///
    /// Matching uses SQL `LIKE`, which SQLite compares case-insensitively for
    /// ASCII. An empty or missing term returns every item. Raises a low-stock
    /// notification when any returned item is low.
    #[instrument(skip(self))]
    pub async fn search_items(&self, term: Option<&str>) -> Result<Vec<ItemView>, ServiceError> {
        let items = self.find_items(term).await?;
        let low: Vec<LowStockEntry> = items
            .iter()
            .filter(|i| i.is_low_stock())
            .map(LowStockEntry::from)
            .collect();
        self.alert_low_stock(&low).await;
        Ok(items.into_iter().map(ItemView::from).collect())
    }

    /// Every item at or below its threshold, by name. Notifies when non-empty.
    #[instrument(skip(self))]
    pub async fn low_stock_report(&self) -> Result<Vec<LowStockEntry>, ServiceError> {
        let items = Item::find()
            .filter(Expr::col(item::Column::Quantity).lte(Expr::col(item::Column::Threshold)))
            .order_by_asc(item::Column::Name)
            .order_by_asc(item::Column::Id)
            .all(&*self.db_pool)
            .await?;
        let entries: Vec<LowStockEntry> = items.iter().map(LowStockEntry::from).collect();
        self.alert_low_stock(&entries).await;
        Ok(entries)
    }

    /// Hands one unit to `person`: decrements stock and opens an `out` ledger
    /// row in a single transaction. Fails with `InsufficientStock` at zero.
    #[instrument(skip(self, request), fields(item_id = request.item_id))]
    pub async fn check_out(&self, request: CheckOut) -> Result<transaction::Model, ServiceError> {
        request.validate()?;

        let photo_path = match &request.photo {
            Some(src) => Some(self.photos.store(src, "trans_out").await?),
            None => None,
        };

        let item_id = request.item_id;
        let ledger_row = transaction::ActiveModel {
            item_id: Set(item_id),
            person: Set(request.person.trim().to_string()),
            out_date: Set(Utc::now()),
            expected_return_date: Set(request.expected_return_date),
            actual_return_date: Set(None),
            out_notes: Set(non_blank(request.notes)),
            return_notes: Set(None),
            out_photo: Set(photo_path.clone()),
            return_photo: Set(None),
            status: Set(TransactionStatus::Out),
            ..Default::default()
        };

        let result = with_transaction(&self.db_pool, move |txn| {
            Box::pin(async move {
                let updated = Item::update_many()
                    .col_expr(
                        item::Column::Quantity,
                        Expr::col(item::Column::Quantity).sub(1),
                    )
                    .filter(item::Column::Id.eq(item_id))
                    .filter(item::Column::Quantity.gt(0))
                    .exec(txn)
                    .await?;

                if updated.rows_affected == 0 {
                    return Err(match Item::find_by_id(item_id).one(txn).await? {
                        Some(item) => ServiceError::InsufficientStock(format!(
                            "{} has no units left to check out",
                            item.name
                        )),
                        None => ServiceError::not_found("Item", item_id),
                    });
                }

                Ok(ledger_row.insert(txn).await?)
            })
        })
        .await;

        match result {
            Ok(model) => {
                info!(transaction_id = model.id, item_id, person = %model.person, "Item checked out");
                Ok(model)
            }
            Err(e) => {
                if let Some(path) = photo_path {
                    self.photos.discard(&path).await;
                }
                Err(e)
            }
        }
    }

    /// Closes an `out` ledger row and restocks one unit in a single
    /// transaction. Fails with `NotFound` for an unknown transaction and
    /// `InvalidStatus` when it was already returned.
    #[instrument(skip(self, request))]
    pub async fn check_in(
        &self,
        transaction_id: i32,
        request: CheckIn,
    ) -> Result<transaction::Model, ServiceError> {
        let photo_path = match &request.photo {
            Some(src) => Some(self.photos.store(src, "trans_in").await?),
            None => None,
        };

        let notes = non_blank(request.notes);
        let stored_photo = photo_path.clone();
        let result = with_transaction(&self.db_pool, move |txn| {
            Box::pin(async move {
                let closed = Transaction::update_many()
                    .col_expr(
                        transaction::Column::Status,
                        Expr::value(TransactionStatus::Returned.as_str()),
                    )
                    .col_expr(transaction::Column::ActualReturnDate, Expr::value(Utc::now()))
                    .col_expr(transaction::Column::ReturnNotes, Expr::value(notes))
                    .col_expr(transaction::Column::ReturnPhoto, Expr::value(stored_photo))
                    .filter(transaction::Column::Id.eq(transaction_id))
                    .filter(transaction::Column::Status.eq(TransactionStatus::Out))
                    .exec(txn)
                    .await?;

                if closed.rows_affected == 0 {
                    return Err(match Transaction::find_by_id(transaction_id).one(txn).await? {
                        Some(row) if !row.status.can_transition_to(TransactionStatus::Returned) => {
                            ServiceError::InvalidStatus(format!(
                                "transaction {} is already {}",
                                transaction_id, row.status
                            ))
                        }
                        Some(row) => ServiceError::InternalError(format!(
                            "transaction {} is {} but was not closed",
                            transaction_id, row.status
                        )),
                        None => ServiceError::not_found("Transaction", transaction_id),
                    });
                }

                let row = Transaction::find_by_id(transaction_id)
                    .one(txn)
                    .await?
                    .ok_or_else(|| ServiceError::not_found("Transaction", transaction_id))?;
                restock(txn, row.item_id).await?;
                Ok(row)
            })
        })
        .await;

        match result {
            Ok(model) => {
                info!(transaction_id, item_id = model.item_id, "Item checked in");
                Ok(model)
            }
            Err(e) => {
                if let Some(path) = photo_path {
                    self.photos.discard(&path).await;
                }
                Err(e)
            }
        }
    }

    /// Ledger rows, most recent check-out first, optionally for one item.
    #[instrument(skip(self))]
    pub async fn history(
        &self,
        item_id: Option<i32>,
    ) -> Result<Vec<transaction::Model>, ServiceError> {
        self.history_in_range(item_id, &DateRange::default()).await
    }

    /// Ledger rows whose out date falls inside `range` (inclusive days, UTC).
    #[instrument(skip(self))]
    pub async fn history_in_range(
        &self,
        item_id: Option<i32>,
        range: &DateRange,
    ) -> Result<Vec<transaction::Model>, ServiceError> {
        range.validate()?;
        let mut query = Transaction::find();
        if let Some(item_id) = item_id {
            query = query.filter(transaction::Column::ItemId.eq(item_id));
        }
        if let Some(lower) = range.lower() {
            query = query.filter(transaction::Column::OutDate.gte(lower));
        }
        if let Some(upper) = range.upper() {
            query = query.filter(transaction::Column::OutDate.lt(upper));
        }
        let rows = query
            .order_by_desc(transaction::Column::OutDate)
            .order_by_desc(transaction::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(rows)
    }

    /// Items matching `term` as CSV or an inventory report.
    #[instrument(skip(self))]
    pub async fn export_items(
        &self,
        term: Option<&str>,
        format: ExportFormat,
    ) -> Result<Vec<u8>, ServiceError> {
        let items = self.find_items(term).await?;
        info!(rows = items.len(), %format, "Exporting items");
        reports::render(format, "Inventory Report", &items)
    }

    /// Ledger rows checked out within `range`.
    #[instrument(skip(self))]
    pub async fn export_history(
        &self,
        range: &DateRange,
        format: ExportFormat,
    ) -> Result<Vec<u8>, ServiceError> {
        let rows = self.history_in_range(None, range).await?;
        info!(rows = rows.len(), %format, "Exporting transaction history");
        reports::render(format, "Transaction History", &rows)
    }

    async fn find_items(&self, term: Option<&str>) -> Result<Vec<item::Model>, ServiceError> {
        let mut query = Item::find();
        if let Some(term) = term.map(str::trim).filter(|t| !t.is_empty()) {
            let pattern = contains_pattern(term);
            query = query.filter(
                Condition::any()
                    .add(Expr::col(item::Column::Name).like(LikeExpr::new(&pattern).escape('\\')))
                    .add(Expr::col(item::Column::Category).like(LikeExpr::new(&pattern).escape('\\'))),
            );
        }
        let items = query
            .order_by_asc(item::Column::Name)
            .order_by_asc(item::Column::Id)
            .all(&*self.db_pool)
            .await?;
        Ok(items)
    }

    async fn alert_low_stock(&self, entries: &[LowStockEntry]) {
        if let Some(message) = low_stock_message(entries) {
            notify_best_effort(self.notifier.as_ref(), &message).await;
        }
    }
}

async fn restock<C: ConnectionTrait>(conn: &C, item_id: i32) -> Result<(), ServiceError> {
    let updated = Item::update_many()
        .col_expr(
            item::Column::Quantity,
            Expr::col(item::Column::Quantity).add(1),
        )
        .filter(item::Column::Id.eq(item_id))
        .exec(conn)
        .await?;
    if updated.rows_affected == 0 {
        warn!(item_id, "Returned item no longer exists; stock not restored");
    }
    Ok(())
}

/// `LIKE` pattern matching `term` anywhere, with its own wildcards escaped.
fn contains_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// `Low stock: Rope (2 <= 2), Gloves (0 <= 5)`
pub fn low_stock_message(entries: &[LowStockEntry]) -> Option<String> {
    if entries.is_empty() {
        return None;
    }
    let parts: Vec<String> = entries
        .iter()
        .map(|e| format!("{} ({} <= {})", e.name, e.quantity, e.threshold))
        .collect();
    Some(format!("Low stock: {}", parts.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{establish_connection, run_migrations};
    use crate::notifications::{MockNotificationSink, NotificationError};

    #[test]
    fn search_pattern_escapes_like_wildcards() {
        assert_eq!(contains_pattern("rope"), "%rope%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
        assert_eq!(contains_pattern("a\\b"), "%a\\\\b%");
    }

    fn entry(name: &str, quantity: i32, threshold: i32) -> LowStockEntry {
        LowStockEntry {
            item_id: 1,
            name: name.into(),
            quantity,
            threshold,
        }
    }

    #[test]
    fn message_lists_every_low_item() {
        assert_eq!(low_stock_message(&[]), None);
        assert_eq!(
            low_stock_message(&[entry("Rope", 2, 2), entry("Gloves", 0, 5)]).as_deref(),
            Some("Low stock: Rope (2 <= 2), Gloves (0 <= 5)")
        );
    }

    #[test]
    fn negative_quantities_fail_validation() {
        let fields = ItemFields::new("Rope", -1, 2);
        assert!(fields.check().is_err());

        let mut fields = ItemFields::new("Rope", 1, 2);
        fields.unit_cost = Some(-3.0);
        assert!(fields.check().is_err());
    }

    #[tokio::test]
    async fn failed_delivery_does_not_fail_the_report() {
        let db = establish_connection("sqlite::memory:").await.unwrap();
        run_migrations(&db).await.unwrap();
        let root = tempfile::tempdir().unwrap();

        let mut sink = MockNotificationSink::new();
        sink.expect_notify()
            .withf(|message: &str| message.starts_with("Low stock: Rope"))
            .times(1)
            .returning(|_| Err(NotificationError::Internal("receiver offline".into())));

        let service =
            InventoryService::new(Arc::new(db), PhotoStore::new(root.path()), Arc::new(sink));
        service.add_item(ItemFields::new("Rope", 1, 2)).await.unwrap();

        let report = service.low_stock_report().await.unwrap();
        assert_eq!(report.len(), 1);
        assert_eq!(report[0].name, "Rope");
    }
}
