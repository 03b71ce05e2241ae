mod common;

use assert_matches::assert_matches;
use common::TestApp;
use site_safety::{
    entities::hazard::{HazardStatus, Severity},
    reports::ExportFormat,
    services::hazards::{
        HazardFilter, HazardRecord, HazardUpdate, NewHazard, NewMitigationNote, RowOutcome,
    },
    ServiceError,
};

fn hazard(lat: f64, lon: f64, description: &str, severity: Severity) -> NewHazard {
    NewHazard {
        description: Some(description.to_string()),
        severity: Some(severity),
        ..NewHazard::at(lat, lon)
    }
}

#[tokio::test]
async fn report_applies_defaults_and_lists_newest_first() {
    let app = TestApp::new().await;
    let service = &app.services.hazards;

    let first = service.report_hazard(NewHazard::at(51.5, -0.12)).await.unwrap();
    assert_eq!(first.severity, Severity::Low);
    assert_eq!(first.status, HazardStatus::Logged);
    assert_eq!(first.description, "");

    let second = service
        .report_hazard(NewHazard::named("Loading bay 3"))
        .await
        .unwrap();
    assert_eq!(second.location.as_deref(), Some("Loading bay 3"));
    assert_eq!(second.latitude, None);

    let listed = service.list_hazards(&HazardFilter::default()).await.unwrap();
    let ids: Vec<i32> = listed.iter().map(|h| h.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn out_of_range_coordinates_are_rejected() {
    let app = TestApp::new().await;
    let err = app
        .services
        .hazards
        .report_hazard(NewHazard::at(123.0, 0.0))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn filters_compose_severity_and_status() {
    let app = TestApp::new().await;
    let service = &app.services.hazards;

    let high = service
        .report_hazard(hazard(1.0, 1.0, "Open trench", Severity::High))
        .await
        .unwrap();
    service
        .report_hazard(hazard(2.0, 2.0, "Loose cable", Severity::Low))
        .await
        .unwrap();
    let mitigated = service
        .report_hazard(NewHazard {
            status: Some(HazardStatus::Mitigated),
            ..hazard(3.0, 3.0, "Spill", Severity::High)
        })
        .await
        .unwrap();

    let by_severity = service
        .list_hazards(&HazardFilter {
            severity: Some(Severity::High),
            status: None,
        })
        .await
        .unwrap();
    assert_eq!(by_severity.len(), 2);

    let both = service
        .list_hazards(&HazardFilter {
            severity: Some(Severity::High),
            status: Some(HazardStatus::Logged),
        })
        .await
        .unwrap();
    assert_eq!(both.len(), 1);
    assert_eq!(both[0].id, high.id);
    assert_ne!(both[0].id, mitigated.id);
}

#[tokio::test]
async fn filtered_csv_export_matches_stored_rows() {
    let app = TestApp::new().await;
    let service = &app.services.hazards;

    for (i, severity) in [Severity::High, Severity::Low, Severity::High, Severity::AreaClosed]
        .into_iter()
        .enumerate()
    {
        service
            .report_hazard(hazard(i as f64, i as f64, &format!("hazard, #{}", i), severity))
            .await
            .unwrap();
    }

    let filter = HazardFilter {
        severity: Some(Severity::High),
        status: None,
    };
    let csv = service.export_hazards(&filter, ExportFormat::Csv).await.unwrap();
    let mut reader = csv::Reader::from_reader(csv.as_slice());
    let headers = reader.headers().unwrap().clone();
    assert_eq!(&headers[5], "severity");

    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    let stored = service.list_hazards(&filter).await.unwrap();
    assert_eq!(rows.len(), stored.len());
    assert_eq!(rows.len(), 2);
    for (row, hazard) in rows.iter().zip(&stored) {
        assert_eq!(row[0].parse::<i32>().unwrap(), hazard.id);
        assert_eq!(&row[4], hazard.description);
        assert_eq!(&row[5], "High");
    }

    let pdf = service.export_hazards(&filter, ExportFormat::Pdf).await.unwrap();
    assert!(pdf.starts_with(b"%PDF"));
}

#[tokio::test]
async fn export_then_import_reproduces_records() {
    let app = TestApp::new().await;
    let service = &app.services.hazards;

    service
        .report_hazard(hazard(51.5, -0.12, "Scaffold \"B\", east side", Severity::Medium))
        .await
        .unwrap();
    service
        .report_hazard(NewHazard {
            status: Some(HazardStatus::InProgress),
            ..hazard(-33.9, 151.2, "Blocked exit", Severity::AreaClosed)
        })
        .await
        .unwrap();

    let originals = service.list_hazards(&HazardFilter::default()).await.unwrap();
    let csv = service
        .export_hazards(&HazardFilter::default(), ExportFormat::Csv)
        .await
        .unwrap();

    let report = service.import_csv(csv.as_slice()).await.unwrap();
    assert_eq!(report.imported(), 2);
    assert_eq!(report.rejected(), 0);

    let all = service.list_hazards(&HazardFilter::default()).await.unwrap();
    assert_eq!(all.len(), 4);
    for original in &originals {
        let copy = all
            .iter()
            .find(|h| h.id != original.id && h.description == original.description)
            .expect("imported copy");
        assert_eq!(copy.severity, original.severity);
        assert_eq!(copy.status, original.status);
        assert_eq!(copy.latitude, original.latitude);
        assert_eq!(copy.longitude, original.longitude);
        assert_eq!(copy.reported_at, original.reported_at);
    }
}

#[tokio::test]
async fn named_location_hazards_survive_export_and_import() {
    let app = TestApp::new().await;
    let service = &app.services.hazards;

    service
        .report_hazard(NewHazard {
            description: Some("Gate off its hinges".into()),
            ..NewHazard::named("North gate")
        })
        .await
        .unwrap();
    service
        .report_hazard(hazard(51.5, -0.12, "Open trench", Severity::High))
        .await
        .unwrap();

    let csv = service
        .export_hazards(&HazardFilter::default(), ExportFormat::Csv)
        .await
        .unwrap();
    let report = service.import_csv(csv.as_slice()).await.unwrap();
    assert_eq!(report.imported(), 2);
    assert_eq!(report.rejected(), 0);

    let all = service.list_hazards(&HazardFilter::default()).await.unwrap();
    assert_eq!(all.len(), 4);
    let gates: Vec<_> = all
        .iter()
        .filter(|h| h.location.as_deref() == Some("North gate"))
        .collect();
    assert_eq!(gates.len(), 2);
    for gate in gates {
        assert_eq!(gate.latitude, None);
        assert_eq!(gate.longitude, None);
        assert_eq!(gate.description, "Gate off its hinges");
    }
}

#[tokio::test]
async fn short_rows_take_defaults_for_missing_columns() {
    let app = TestApp::new().await;
    let service = &app.services.hazards;

    let csv = "\
latitude,longitude,description,severity,status,date_reported,extra
1.0,2.0
3.0,4.0,Loose cable
";
    let report = service.import_csv(csv.as_bytes()).await.unwrap();
    assert_eq!(report.rejected(), 0);
    assert_eq!(report.imported(), 2);

    let stored = service.list_hazards(&HazardFilter::default()).await.unwrap();
    let cable = stored.iter().find(|h| h.description == "Loose cable").unwrap();
    assert_eq!(cable.severity, Severity::Low);
    assert_eq!(cable.status, HazardStatus::Logged);
    assert_eq!(cable.latitude, Some(3.0));
}

#[tokio::test]
async fn import_skips_bad_rows_and_keeps_the_rest() {
    let app = TestApp::new().await;
    let service = &app.services.hazards;

    let csv = "\
latitude,longitude,description,severity,status,date_reported,extra
51.5,-0.1,Wet floor,Medium,,,ignored
north,-0.1,Bad latitude,Low,Logged,,
,-0.1,Missing latitude,,,,
40.7,-74.0,Broken rail,High,Mitigated,2024-05-01T12:00:00Z,
40.7,-74.0,Unknown severity,Severe,,,
1.0,2.0
";
    let report = service.import_csv(csv.as_bytes()).await.unwrap();
    assert_eq!(report.imported(), 3);
    assert_eq!(report.rejected(), 3);
    assert_matches!(&report.outcomes[0], RowOutcome::Imported { row: 1, .. });
    assert_matches!(&report.outcomes[1], RowOutcome::Rejected { row: 2, reason } if reason.contains("latitude"));
    assert_matches!(&report.outcomes[2], RowOutcome::Rejected { row: 3, .. });
    assert_matches!(&report.outcomes[4], RowOutcome::Rejected { row: 5, .. });
    assert_matches!(&report.outcomes[5], RowOutcome::Imported { row: 6, .. });

    let stored = service.list_hazards(&HazardFilter::default()).await.unwrap();
    assert_eq!(stored.len(), 3);

    let wet = stored.iter().find(|h| h.description == "Wet floor").unwrap();
    assert_eq!(wet.severity, Severity::Medium);
    assert_eq!(wet.status, HazardStatus::Logged);

    let rail = stored.iter().find(|h| h.description == "Broken rail").unwrap();
    assert_eq!(rail.status, HazardStatus::Mitigated);
    assert_eq!(rail.reported_at.to_rfc3339(), "2024-05-01T12:00:00+00:00");

    let bare = stored.iter().find(|h| h.description.is_empty()).unwrap();
    assert_eq!(bare.severity, Severity::Low);
}

#[tokio::test]
async fn import_records_accepts_prebuilt_rows() {
    let app = TestApp::new().await;
    let report = app
        .services
        .hazards
        .import_records(vec![
            HazardRecord {
                latitude: Some("10".into()),
                longitude: Some("20".into()),
                description: Some("Fallen tree".into()),
                ..Default::default()
            },
            HazardRecord::default(),
        ])
        .await
        .unwrap();
    assert_eq!(report.imported(), 1);
    assert_eq!(report.rejected(), 1);
}

#[tokio::test]
async fn update_changes_fields_and_rejects_unknown_ids() {
    let app = TestApp::new().await;
    let service = &app.services.hazards;
    let created = service.report_hazard(NewHazard::at(1.0, 1.0)).await.unwrap();

    let updated = service
        .update_hazard(
            created.id,
            HazardUpdate {
                description: "Barrier installed".into(),
                severity: Severity::Medium,
                status: HazardStatus::Mitigated,
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, HazardStatus::Mitigated);
    assert_eq!(updated.reported_at, created.reported_at);

    let err = service
        .update_hazard(
            9999,
            HazardUpdate {
                description: String::new(),
                severity: Severity::Low,
                status: HazardStatus::Logged,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    assert_matches!(service.get_hazard(9999).await, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn photos_are_copied_under_the_hazard_id() {
    let app = TestApp::new().await;
    let service = &app.services.hazards;

    let created = service
        .report_hazard(NewHazard {
            photo: Some(app.sample_photo("pothole.png")),
            ..NewHazard::at(1.0, 1.0)
        })
        .await
        .unwrap();
    let path = created.photo_path.clone().unwrap();
    assert!(path.starts_with(&format!("images/hazard_{}_", created.id)));
    assert!(path.ends_with(".png"));
    assert!(app.attachment_exists(&path));

    let replaced = service
        .attach_hazard_photo(created.id, app.sample_photo("after.jpg"))
        .await
        .unwrap();
    assert_ne!(replaced.photo_path, created.photo_path);
    assert_eq!(app.stored_photo_count(), 2);

    let err = service
        .attach_hazard_photo(4242, app.sample_photo("orphan.jpg"))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
    assert_eq!(app.stored_photo_count(), 2);
}

#[tokio::test]
async fn missing_photo_rolls_back_the_report() {
    let app = TestApp::new().await;
    let service = &app.services.hazards;

    let err = service
        .report_hazard(NewHazard {
            photo: Some(app.attachments.path().join("missing.jpg")),
            ..NewHazard::at(1.0, 1.0)
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::AttachmentError(_));
    assert!(service
        .list_hazards(&HazardFilter::default())
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn mitigation_notes_are_append_only_and_ordered() {
    let app = TestApp::new().await;
    let service = &app.services.hazards;
    let hazard = service.report_hazard(NewHazard::at(1.0, 1.0)).await.unwrap();

    for text in ["Cordoned off", "Contractor called"] {
        service
            .add_mitigation_note(NewMitigationNote {
                hazard_id: hazard.id,
                note_text: text.into(),
                author: "J. Ortiz".into(),
                photo: None,
            })
            .await
            .unwrap();
    }

    let notes = service.list_mitigation_notes(hazard.id).await.unwrap();
    let texts: Vec<&str> = notes.iter().map(|n| n.note_text.as_str()).collect();
    assert_eq!(texts, vec!["Cordoned off", "Contractor called"]);

    let err = service
        .add_mitigation_note(NewMitigationNote {
            hazard_id: 777,
            note_text: "Nowhere".into(),
            author: "J. Ortiz".into(),
            photo: None,
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));

    let err = service
        .add_mitigation_note(NewMitigationNote {
            hazard_id: hazard.id,
            note_text: String::new(),
            author: "J. Ortiz".into(),
            photo: None,
        })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}
