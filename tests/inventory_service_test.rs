mod common;

use assert_matches::assert_matches;
use chrono::{Duration, NaiveDate, Utc};
use common::TestApp;
use site_safety::{
    entities::transaction::{self, TransactionStatus},
    reports::ExportFormat,
    services::{
        inventory::{CheckIn, CheckOut, ItemFields},
        DateRange,
    },
    ServiceError,
};

fn item(name: &str, category: &str, quantity: i32, threshold: i32) -> ItemFields {
    ItemFields {
        category: category.into(),
        ..ItemFields::new(name, quantity, threshold)
    }
}

fn count(rows: &[transaction::Model], status: TransactionStatus) -> usize {
    rows.iter().filter(|r| r.status == status).count()
}

#[tokio::test]
async fn rope_checkout_and_return_scenario() {
    let app = TestApp::new().await;
    let service = &app.services.inventory;

    let rope = service.add_item(item("Rope", "Rigging", 5, 2)).await.unwrap();

    let mut out = Vec::new();
    for person in ["Ana", "Ben", "Chloe"] {
        out.push(service.check_out(CheckOut::new(rope.id, person)).await.unwrap());
    }

    let after_out = service.get_item(rope.id).await.unwrap();
    assert_eq!(after_out.quantity, 2);
    assert!(after_out.is_low_stock());
    let views = service.search_items(Some("Rope")).await.unwrap();
    assert!(views[0].low_stock);

    let history = service.history(Some(rope.id)).await.unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(count(&history, TransactionStatus::Out), 3);

    let returned = service
        .check_in(out[1].id, CheckIn::default())
        .await
        .unwrap();
    assert_eq!(returned.status, TransactionStatus::Returned);
    assert!(returned.actual_return_date.is_some());

    let after_in = service.get_item(rope.id).await.unwrap();
    assert_eq!(after_in.quantity, 3);
    assert!(!after_in.is_low_stock());

    let history = service.history(Some(rope.id)).await.unwrap();
    assert_eq!(count(&history, TransactionStatus::Returned), 1);
    assert_eq!(count(&history, TransactionStatus::Out), 2);
}

#[tokio::test]
async fn second_check_in_is_rejected_without_restocking() {
    let app = TestApp::new().await;
    let service = &app.services.inventory;

    let harness = service.add_item(item("Harness", "PPE", 1, 0)).await.unwrap();
    let row = service
        .check_out(CheckOut::new(harness.id, "Dana"))
        .await
        .unwrap();
    service.check_in(row.id, CheckIn::default()).await.unwrap();

    let err = service
        .check_in(row.id, CheckIn::default())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidStatus(_));
    assert_eq!(service.get_item(harness.id).await.unwrap().quantity, 1);

    let err = service
        .check_in(98765, CheckIn::default())
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn checkout_at_zero_stock_fails_atomically() {
    let app = TestApp::new().await;
    let service = &app.services.inventory;

    let radio = service.add_item(item("Radio", "Comms", 1, 0)).await.unwrap();
    service.check_out(CheckOut::new(radio.id, "Eli")).await.unwrap();

    let err = service
        .check_out(CheckOut {
            photo: Some(app.sample_photo("radio.jpg")),
            ..CheckOut::new(radio.id, "Fay")
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InsufficientStock(_));

    assert_eq!(service.get_item(radio.id).await.unwrap().quantity, 0);
    assert_eq!(service.history(Some(radio.id)).await.unwrap().len(), 1);
    assert_eq!(app.stored_photo_count(), 0);

    let err = service
        .check_out(CheckOut::new(31337, "Gus"))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn checkout_records_notes_dates_and_photos() {
    let app = TestApp::new().await;
    let service = &app.services.inventory;
    let drill = service.add_item(item("Drill", "Tools", 2, 0)).await.unwrap();
    let due = NaiveDate::from_ymd_opt(2024, 6, 8).unwrap();

    let row = service
        .check_out(CheckOut {
            expected_return_date: Some(due),
            notes: Some("battery at 80%".into()),
            photo: Some(app.sample_photo("drill.jpg")),
            ..CheckOut::new(drill.id, "Hana")
        })
        .await
        .unwrap();
    assert_eq!(row.expected_return_date, Some(due));
    assert_eq!(row.out_notes.as_deref(), Some("battery at 80%"));
    assert!(row.out_photo.as_deref().unwrap().starts_with("images/trans_out_"));

    let back = service
        .check_in(
            row.id,
            CheckIn {
                notes: Some("chuck loose".into()),
                photo: Some(app.sample_photo("drill-back.jpg")),
            },
        )
        .await
        .unwrap();
    assert_eq!(back.return_notes.as_deref(), Some("chuck loose"));
    assert!(app.attachment_exists(back.return_photo.as_deref().unwrap()));
}

#[tokio::test]
async fn search_matches_name_or_category() {
    let app = TestApp::new().await;
    let service = &app.services.inventory;

    service.add_item(item("Hard hat", "PPE", 10, 2)).await.unwrap();
    service.add_item(item("Gloves", "PPE", 40, 10)).await.unwrap();
    service.add_item(item("Ladder", "Access", 3, 1)).await.unwrap();

    assert_eq!(service.search_items(None).await.unwrap().len(), 3);
    assert_eq!(service.search_items(Some("")).await.unwrap().len(), 3);

    let ppe: Vec<String> = service
        .search_items(Some("PPE"))
        .await
        .unwrap()
        .into_iter()
        .map(|v| v.item.name)
        .collect();
    assert_eq!(ppe, vec!["Gloves", "Hard hat"]);

    let by_name = service.search_items(Some("ladd")).await.unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].item.name, "Ladder");

    assert!(service.search_items(Some("crane")).await.unwrap().is_empty());
}

#[tokio::test]
async fn search_treats_wildcard_characters_literally() {
    let app = TestApp::new().await;
    let service = &app.services.inventory;

    service.add_item(item("Rope", "Rigging", 5, 1)).await.unwrap();
    service.add_item(item("Gloves", "PPE", 40, 10)).await.unwrap();
    service.add_item(item("Tape_50mm", "Marking", 12, 2)).await.unwrap();

    let underscored = service.search_items(Some("_")).await.unwrap();
    assert_eq!(underscored.len(), 1);
    assert_eq!(underscored[0].item.name, "Tape_50mm");

    assert!(service.search_items(Some("%")).await.unwrap().is_empty());
    assert!(service.search_items(Some("R_pe")).await.unwrap().is_empty());
}

#[tokio::test]
async fn low_stock_listings_notify_the_sink() {
    let app = TestApp::new().await;
    let service = &app.services.inventory;

    service.add_item(item("Ear plugs", "PPE", 100, 20)).await.unwrap();
    assert!(service.low_stock_report().await.unwrap().is_empty());
    service.search_items(None).await.unwrap();
    assert!(app.notifications.messages().await.is_empty());

    service.add_item(item("Fuel", "Consumables", 3, 5)).await.unwrap();
    let report = service.low_stock_report().await.unwrap();
    assert_eq!(report.len(), 1);
    assert_eq!(report[0].name, "Fuel");
    assert_eq!((report[0].quantity, report[0].threshold), (3, 5));

    service.search_items(Some("Fuel")).await.unwrap();
    let messages = app.notifications.messages().await;
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0], "Low stock: Fuel (3 <= 5)");
}

#[tokio::test]
async fn update_and_delete_items() {
    let app = TestApp::new().await;
    let service = &app.services.inventory;

    let cones = service.add_item(item("Cones", "Traffic", 12, 4)).await.unwrap();
    let updated = service
        .update_item(
            cones.id,
            ItemFields {
                supplier: Some("RoadSafe Ltd".into()),
                unit_cost: Some(4.5),
                ..item("Traffic cones", "Traffic", 15, 4)
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Traffic cones");
    assert_eq!(updated.quantity, 15);
    assert_eq!(updated.supplier.as_deref(), Some("RoadSafe Ltd"));

    assert_matches!(
        service.update_item(555, item("x", "", 1, 0)).await,
        Err(ServiceError::NotFound(_))
    );
    assert_matches!(
        service.add_item(item("", "", 1, 0)).await,
        Err(ServiceError::ValidationError(_))
    );

    service.delete_item(cones.id).await.unwrap();
    assert_matches!(service.get_item(cones.id).await, Err(ServiceError::NotFound(_)));
    assert_matches!(service.delete_item(cones.id).await, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn returning_a_deleted_item_still_closes_the_ledger_row() {
    let app = TestApp::new().await;
    let service = &app.services.inventory;

    let saw = service.add_item(item("Saw", "Tools", 1, 0)).await.unwrap();
    let row = service.check_out(CheckOut::new(saw.id, "Ivo")).await.unwrap();
    service.delete_item(saw.id).await.unwrap();

    let closed = service.check_in(row.id, CheckIn::default()).await.unwrap();
    assert_eq!(closed.status, TransactionStatus::Returned);
}

#[tokio::test]
async fn history_is_newest_first_and_range_bounded() {
    let app = TestApp::new().await;
    let service = &app.services.inventory;

    let tape = service.add_item(item("Tape", "Consumables", 10, 1)).await.unwrap();
    let vest = service.add_item(item("Vest", "PPE", 10, 1)).await.unwrap();
    let first = service.check_out(CheckOut::new(tape.id, "Jo")).await.unwrap();
    let second = service.check_out(CheckOut::new(vest.id, "Kai")).await.unwrap();

    let all: Vec<i32> = service
        .history(None)
        .await
        .unwrap()
        .iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(all, vec![second.id, first.id]);

    let only_tape = service.history(Some(tape.id)).await.unwrap();
    assert_eq!(only_tape.len(), 1);

    let today = Utc::now().date_naive();
    let inclusive = DateRange::new(Some(today), Some(today));
    assert_eq!(service.history_in_range(None, &inclusive).await.unwrap().len(), 2);

    let yesterday = today - Duration::days(1);
    let before = DateRange::new(None, Some(yesterday));
    assert!(service.history_in_range(None, &before).await.unwrap().is_empty());

    let inverted = DateRange::new(Some(today), Some(yesterday));
    assert_matches!(
        service.history_in_range(None, &inverted).await,
        Err(ServiceError::ValidationError(_))
    );
}

#[tokio::test]
async fn exports_cover_items_and_ledger() {
    let app = TestApp::new().await;
    let service = &app.services.inventory;

    let rope = service.add_item(item("Rope", "Rigging", 5, 2)).await.unwrap();
    service.add_item(item("Shackle", "Rigging", 8, 2)).await.unwrap();
    service.add_item(item("Goggles", "PPE", 8, 2)).await.unwrap();
    service.check_out(CheckOut::new(rope.id, "Lee")).await.unwrap();

    let csv = String::from_utf8(
        service
            .export_items(Some("Rigging"), ExportFormat::Csv)
            .await
            .unwrap(),
    )
    .unwrap();
    assert_eq!(csv.lines().count(), 3);
    assert!(csv.starts_with("id,name,category,location,quantity"));

    let today = Utc::now().date_naive();
    let ledger = String::from_utf8(
        service
            .export_history(&DateRange::new(Some(today), None), ExportFormat::Csv)
            .await
            .unwrap(),
    )
    .unwrap();
    assert_eq!(ledger.lines().count(), 2);
    assert!(ledger.lines().nth(1).unwrap().ends_with(",out"));

    let pdf = service
        .export_history(&DateRange::default(), ExportFormat::Pdf)
        .await
        .unwrap();
    assert!(pdf.starts_with(b"%PDF"));
    let pdf = service.export_items(None, ExportFormat::Pdf).await.unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}
