use chrono::{Duration, TimeZone, Utc};
use engine::{
    BbFields, BbKind, BbOrder, BbSubmission, EngineError, ListingRules, Price, ValidationKind,
};

mod common;

use common::{engine_with_db, set_published};

fn fields(title: &str, rubric_id: Option<i32>, price: Option<i64>) -> BbFields {
    BbFields {
        kind: BbKind::Sell,
        rubric_id,
        title: title.to_string(),
        content: Some("Runs fine, one owner".to_string()),
        price: price.map(Price::from_minor),
        photo: None,
    }
}

fn submission(title: &str, content: &str, price: &str, rubric_id: i32) -> BbSubmission {
    BbSubmission {
        kind: Some(BbKind::Sell),
        rubric_id: Some(rubric_id),
        title: title.to_string(),
        content: Some(content.to_string()),
        price: Some(price.to_string()),
        photo: None,
    }
}

#[tokio::test]
async fn create_then_get_round_trips_fields() {
    let (engine, _db) = engine_with_db().await;
    let transport = engine.new_rubric("Transport", None).await.unwrap();

    let input = BbFields {
        kind: BbKind::Exchange,
        rubric_id: Some(transport.id),
        title: "Toyota Camry".to_string(),
        content: Some("[b]2015[/b], white".to_string()),
        price: Some(Price::from_minor(1_500_000)),
        photo: Some("photos/2024/03/07/camry.jpg".to_string()),
    };
    let created = engine.new_bb(input.clone()).await.unwrap();
    let fetched = engine.bb(created.id).await.unwrap();

    assert_eq!(fetched.fields(), input);
    assert_eq!(fetched.published, created.published);
    assert_eq!(fetched.updated_at, fetched.published);
}

#[tokio::test]
async fn short_title_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let err = engine.new_bb(fields("Car", None, None)).await.unwrap_err();
    assert!(err.has_kind(ValidationKind::InvalidTitle));
}

#[tokio::test]
async fn negative_price_is_rejected_and_missing_price_accepted() {
    let (engine, _db) = engine_with_db().await;
    let err = engine
        .new_bb(fields("Bicycle", None, Some(-1)))
        .await
        .unwrap_err();
    assert!(err.has_kind(ValidationKind::NegativePrice));

    let bike = engine.new_bb(fields("Bicycle", None, None)).await.unwrap();
    assert_eq!(bike.price, None);

    let err = engine
        .update_bb(bike.id, fields("Bicycle", None, Some(-500)))
        .await
        .unwrap_err();
    assert!(err.has_kind(ValidationKind::NegativePrice));
}

#[tokio::test]
async fn unknown_rubric_is_a_field_error() {
    let (engine, _db) = engine_with_db().await;
    let err = engine
        .new_bb(fields("Bicycle", Some(99), None))
        .await
        .unwrap_err();
    assert!(err.has_kind(ValidationKind::UnknownRubric));
}

#[tokio::test]
async fn by_rubric_orders_by_price() {
    let (engine, _db) = engine_with_db().await;
    let transport = engine.new_rubric("Transport", None).await.unwrap();

    let pricier = engine
        .new_bb(fields("Honda Accord", Some(transport.id), Some(2_000_000)))
        .await
        .unwrap();
    let camry = engine
        .new_bb(fields("Toyota Camry", Some(transport.id), Some(1_500_000)))
        .await
        .unwrap();

    let ids: Vec<_> = engine
        .bbs_by_rubric(transport.id, BbOrder::Price)
        .await
        .unwrap()
        .into_iter()
        .map(|bb| bb.id)
        .collect();
    assert_eq!(ids, vec![camry.id, pricier.id]);
}

#[tokio::test]
async fn by_rubric_can_order_by_recency() {
    let (engine, db) = engine_with_db().await;
    let transport = engine.new_rubric("Transport", None).await.unwrap();
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();

    let older_cheap = engine
        .new_bb(fields("Lada Niva", Some(transport.id), Some(300_000)))
        .await
        .unwrap();
    set_published(&db, older_cheap.id, base).await;
    let newer_pricey = engine
        .new_bb(fields("Honda Accord", Some(transport.id), Some(2_000_000)))
        .await
        .unwrap();
    set_published(&db, newer_pricey.id, base + Duration::days(1)).await;

    let by_price: Vec<_> = engine
        .bbs_by_rubric(transport.id, BbOrder::Price)
        .await
        .unwrap()
        .into_iter()
        .map(|bb| bb.id)
        .collect();
    assert_eq!(by_price, vec![older_cheap.id, newer_pricey.id]);

    let by_recency: Vec<_> = engine
        .bbs_by_rubric(transport.id, BbOrder::Recency)
        .await
        .unwrap()
        .into_iter()
        .map(|bb| bb.id)
        .collect();
    assert_eq!(by_recency, vec![newer_pricey.id, older_cheap.id]);
}

#[tokio::test]
async fn by_rubric_without_listings_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    let empty = engine.new_rubric("Empty", None).await.unwrap();
    assert!(matches!(
        engine.bbs_by_rubric(empty.id, BbOrder::Price).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.bbs_by_rubric(1234, BbOrder::Recency).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn search_is_case_insensitive_and_scoped_to_rubric() {
    let (engine, _db) = engine_with_db().await;
    let transport = engine.new_rubric("Transport", None).await.unwrap();
    let toys = engine.new_rubric("Toys", None).await.unwrap();

    let camry = engine
        .new_bb(fields("Toyota Camry", Some(transport.id), Some(1_500_000)))
        .await
        .unwrap();
    engine
        .new_bb(fields("Toy robot", Some(toys.id), Some(1_000)))
        .await
        .unwrap();

    let found = engine.search_bbs("toy", transport.id).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, camry.id);

    let found = engine.search_bbs("^CAMRY", transport.id).await.unwrap();
    assert!(found.is_empty());

    let found = engine.search_bbs("cam.y$", transport.id).await.unwrap();
    assert_eq!(found.len(), 1);
}

#[tokio::test]
async fn search_rejects_bad_keyword_and_unknown_rubric() {
    let (engine, _db) = engine_with_db().await;
    let transport = engine.new_rubric("Transport", None).await.unwrap();

    let err = engine.search_bbs("(unclosed", transport.id).await.unwrap_err();
    assert!(err.has_kind(ValidationKind::InvalidKeyword));
    let err = engine.search_bbs("  ", transport.id).await.unwrap_err();
    assert!(err.has_kind(ValidationKind::InvalidKeyword));
    assert!(matches!(
        engine.search_bbs("toy", 77).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn identical_update_writes_nothing() {
    let (engine, _db) = engine_with_db().await;
    let transport = engine.new_rubric("Transport", None).await.unwrap();
    let camry = engine
        .new_bb(fields("Toyota Camry", Some(transport.id), Some(1_500_000)))
        .await
        .unwrap();

    let same = engine.update_bb(camry.id, camry.fields()).await.unwrap();
    assert_eq!(same, camry);

    let resubmitted = engine
        .submit_bb_update(
            camry.id,
            submission("Toyota Camry", "Runs fine, one owner", "15000", transport.id),
        )
        .await
        .unwrap();
    assert_eq!(resubmitted.updated_at, camry.updated_at);

    let changed = engine
        .update_bb(
            camry.id,
            fields("Toyota Camry", Some(transport.id), Some(1_400_000)),
        )
        .await
        .unwrap();
    assert_eq!(changed.price, Some(Price::from_minor(1_400_000)));
    assert_eq!(changed.published, camry.published);
    assert!(changed.updated_at >= camry.updated_at);
}

#[tokio::test]
async fn edit_without_kind_or_photo_keeps_them() {
    let (engine, _db) = engine_with_db().await;
    let transport = engine.new_rubric("Transport", None).await.unwrap();
    let camry = engine
        .new_bb(BbFields {
            kind: BbKind::Buy,
            photo: Some("photos/2024/03/07/camry.jpg".to_string()),
            ..fields("Toyota Camry", Some(transport.id), Some(1_500_000))
        })
        .await
        .unwrap();

    let mut edit = submission("Toyota Camry", "Runs fine, one owner", "15000", transport.id);
    edit.kind = None;
    edit.photo = None;
    let same = engine.submit_bb_update(camry.id, edit.clone()).await.unwrap();
    assert_eq!(same, camry);

    edit.price = Some("14000".to_string());
    let edited = engine.submit_bb_update(camry.id, edit.clone()).await.unwrap();
    assert_eq!(edited.kind, BbKind::Buy);
    assert_eq!(edited.photo.as_deref(), Some("photos/2024/03/07/camry.jpg"));
    assert_eq!(edited.price, Some(Price::from_minor(1_400_000)));

    edit.photo = Some(" ".to_string());
    let cleared = engine.submit_bb_update(camry.id, edit).await.unwrap();
    assert_eq!(cleared.photo, None);
    assert_eq!(cleared.kind, BbKind::Buy);
}

#[tokio::test]
async fn update_unknown_listing_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    assert!(matches!(
        engine.update_bb(5, fields("Bicycle", None, None)).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine.delete_bb(5).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn submission_reports_every_failure_together() {
    let (engine, _db) = engine_with_db().await;
    let transport = engine.new_rubric("Transport", None).await.unwrap();

    let err = engine
        .submit_bb(submission("Car", "", "100", transport.id))
        .await
        .unwrap_err();
    let EngineError::Validation(errors) = err else {
        panic!("expected validation errors, got {err:?}");
    };
    assert!(errors.contains(ValidationKind::MissingDescription));
    assert!(errors.contains(ValidationKind::InvalidTitle));
    // The description failure is reported once, with the form message.
    assert_eq!(
        errors
            .iter()
            .filter(|e| e.kind == ValidationKind::MissingDescription)
            .count(),
        1
    );
    assert!(engine.bbs_page(None, 6).await.unwrap().items.is_empty());
}

#[tokio::test]
async fn submission_applies_denylist_and_rubric_requirement() {
    let (engine, _db) = engine_with_db().await;
    let transport = engine.new_rubric("Transport", None).await.unwrap();

    let err = engine
        .submit_bb(submission("Прошлогодний снег", "white", "0", transport.id))
        .await
        .unwrap_err();
    assert!(err.has_kind(ValidationKind::BannedTitle));

    // The storage path does not know about the denylist.
    engine
        .new_bb(fields("Прошлогодний снег", Some(transport.id), None))
        .await
        .unwrap();

    let mut no_rubric = submission("Bicycle", "red", "10", transport.id);
    no_rubric.rubric_id = None;
    let err = engine.submit_bb(no_rubric).await.unwrap_err();
    assert!(err.has_kind(ValidationKind::MissingRubric));

    let err = engine
        .submit_bb(submission("Bicycle", "red", "ten", transport.id))
        .await
        .unwrap_err();
    assert!(err.has_kind(ValidationKind::InvalidPrice));
}

#[tokio::test]
async fn custom_denylist_replaces_default() {
    let (_, db) = engine_with_db().await;
    let engine = engine::Engine::builder()
        .database(db)
        .rules(ListingRules::new(vec!["Moon rock".to_string()]))
        .build()
        .await
        .unwrap();
    let rubric = engine.new_rubric("Space", None).await.unwrap();

    let err = engine
        .submit_bb(submission("Moon rock", "grey", "1", rubric.id))
        .await
        .unwrap_err();
    assert!(err.has_kind(ValidationKind::BannedTitle));
}

#[tokio::test]
async fn submission_trims_title_and_parses_price() {
    let (engine, _db) = engine_with_db().await;
    let transport = engine.new_rubric("Transport", None).await.unwrap();

    let bb = engine
        .submit_bb(submission("  Toyota Camry  ", "white", "15000,5", transport.id))
        .await
        .unwrap();
    assert_eq!(bb.title, "Toyota Camry");
    assert_eq!(bb.price, Some(Price::from_minor(1_500_050)));
    assert_eq!(bb.kind, BbKind::Sell);
}

#[tokio::test]
async fn pages_hold_six_newest_first() {
    let (engine, db) = engine_with_db().await;
    let base = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
    let mut ids = Vec::new();
    for n in 0..8 {
        let bb = engine
            .new_bb(fields(&format!("Listing {n}"), None, None))
            .await
            .unwrap();
        set_published(&db, bb.id, base + Duration::minutes(n)).await;
        ids.push(bb.id);
    }

    let first = engine.bbs_page(None, 6).await.unwrap();
    assert_eq!(first.number, 1);
    assert_eq!(first.num_pages, 2);
    assert_eq!(first.total, 8);
    assert!(first.has_next());
    let first_ids: Vec<_> = first.items.iter().map(|bb| bb.id).collect();
    assert_eq!(
        first_ids,
        vec![ids[7], ids[6], ids[5], ids[4], ids[3], ids[2]]
    );

    let second = engine.bbs_page(Some("2"), 6).await.unwrap();
    assert!(!second.has_next());
    assert!(second.has_previous());
    let second_ids: Vec<_> = second.items.iter().map(|bb| bb.id).collect();
    assert_eq!(second_ids, vec![ids[1], ids[0]]);

    let clamped = engine.bbs_page(Some("40"), 6).await.unwrap();
    assert_eq!(clamped.number, 2);
    let fallback = engine.bbs_page(Some("first"), 6).await.unwrap();
    assert_eq!(fallback.number, 1);
}

#[tokio::test]
async fn equal_publication_times_fall_back_to_title() {
    let (engine, db) = engine_with_db().await;
    let at = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
    for title in ["Charlie sofa", "Alpha chair", "Bravo table"] {
        let bb = engine.new_bb(fields(title, None, None)).await.unwrap();
        set_published(&db, bb.id, at).await;
    }
    let newer = engine.new_bb(fields("Zulu lamp", None, None)).await.unwrap();
    set_published(&db, newer.id, at + Duration::hours(1)).await;

    let titles: Vec<_> = engine
        .bbs_page(None, 6)
        .await
        .unwrap()
        .items
        .into_iter()
        .map(|bb| bb.title)
        .collect();
    assert_eq!(
        titles,
        vec!["Zulu lamp", "Alpha chair", "Bravo table", "Charlie sofa"]
    );
}

#[tokio::test]
async fn empty_board_has_one_empty_page() {
    let (engine, _db) = engine_with_db().await;
    let page = engine.bbs_page(Some("3"), 6).await.unwrap();
    assert_eq!(page.number, 1);
    assert_eq!(page.num_pages, 1);
    assert!(page.items.is_empty());
}
