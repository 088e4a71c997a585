use engine::{BbFields, EngineError, Price, ValidationKind};

mod common;

use common::engine_with_db;

fn listing(title: &str, rubric_id: i32, price: i64) -> BbFields {
    BbFields {
        rubric_id: Some(rubric_id),
        title: title.to_string(),
        content: Some("in good shape".to_string()),
        price: Some(Price::from_minor(price)),
        ..Default::default()
    }
}

#[tokio::test]
async fn duplicate_name_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    engine.new_rubric("Transport", None).await.unwrap();

    let err = engine.new_rubric(" Transport ", None).await.unwrap_err();
    assert!(err.has_kind(ValidationKind::DuplicateName));
}

#[tokio::test]
async fn name_must_be_short_and_present() {
    let (engine, _db) = engine_with_db().await;
    let err = engine.new_rubric("", None).await.unwrap_err();
    assert!(err.has_kind(ValidationKind::InvalidName));
    let err = engine
        .new_rubric("A name that is far too long", None)
        .await
        .unwrap_err();
    assert!(err.has_kind(ValidationKind::InvalidName));
}

#[tokio::test]
async fn default_order_is_name_then_photo_first() {
    let (engine, _db) = engine_with_db().await;
    engine.new_rubric("Furniture", None).await.unwrap();
    engine
        .new_rubric("Books", Some("photos/2024/01/01/b.jpg"))
        .await
        .unwrap();
    engine.new_rubric("Appliances", None).await.unwrap();

    let names: Vec<_> = engine
        .rubrics()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["Appliances", "Books", "Furniture"]);
}

#[tokio::test]
async fn delete_is_blocked_while_listings_reference_it() {
    let (engine, _db) = engine_with_db().await;
    let transport = engine.new_rubric("Transport", None).await.unwrap();
    let camry = engine
        .new_bb(listing("Toyota Camry", transport.id, 1_500_000))
        .await
        .unwrap();

    let err = engine.delete_rubric(transport.id).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::ReferentialIntegrity("Transport".to_string())
    );

    engine.delete_bb(camry.id).await.unwrap();
    engine.delete_rubric(transport.id).await.unwrap();
    assert!(matches!(
        engine.rubric(transport.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn delete_unknown_rubric_is_not_found() {
    let (engine, _db) = engine_with_db().await;
    assert!(matches!(
        engine.delete_rubric(42).await,
        Err(EngineError::KeyNotFound(_))
    ));
}

#[tokio::test]
async fn popularity_counts_listings_at_query_time() {
    let (engine, _db) = engine_with_db().await;
    let transport = engine.new_rubric("Transport", None).await.unwrap();
    let furniture = engine.new_rubric("Furniture", None).await.unwrap();
    engine.new_rubric("Empty", None).await.unwrap();

    engine
        .new_bb(listing("Toyota Camry", transport.id, 100))
        .await
        .unwrap();
    engine
        .new_bb(listing("Honda Civic", transport.id, 200))
        .await
        .unwrap();
    let sofa = engine
        .new_bb(listing("Blue sofa", furniture.id, 300))
        .await
        .unwrap();

    let ranked: Vec<_> = engine
        .rubrics_by_popularity()
        .await
        .unwrap()
        .into_iter()
        .map(|r| (r.name, r.count))
        .collect();
    assert_eq!(
        ranked,
        vec![
            ("Transport".to_string(), 2),
            ("Furniture".to_string(), 1),
            ("Empty".to_string(), 0),
        ]
    );

    let non_empty: Vec<_> = engine
        .rubrics_with_bbs()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(non_empty, vec!["Transport", "Furniture"]);

    // Moving the sofa away is reflected immediately, no counter to drift.
    engine.delete_bb(sofa.id).await.unwrap();
    let non_empty: Vec<_> = engine
        .rubrics_with_bbs()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(non_empty, vec!["Transport"]);
}

#[tokio::test]
async fn popularity_ties_are_ordered_by_name() {
    let (engine, _db) = engine_with_db().await;
    engine.new_rubric("Zoo", None).await.unwrap();
    engine.new_rubric("Antiques", None).await.unwrap();

    let names: Vec<_> = engine
        .rubrics_by_popularity()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.name)
        .collect();
    assert_eq!(names, vec!["Antiques", "Zoo"]);
}

#[tokio::test]
async fn update_renames_and_keeps_uniqueness() {
    let (engine, _db) = engine_with_db().await;
    let transport = engine.new_rubric("Transport", None).await.unwrap();
    engine.new_rubric("Furniture", None).await.unwrap();

    let err = engine
        .update_rubric(transport.id, "Furniture", None)
        .await
        .unwrap_err();
    assert!(err.has_kind(ValidationKind::DuplicateName));

    let renamed = engine
        .update_rubric(transport.id, "Vehicles", Some("photos/2024/02/02/car.png"))
        .await
        .unwrap();
    assert_eq!(renamed.name, "Vehicles");
    assert_eq!(renamed.photo.as_deref(), Some("photos/2024/02/02/car.png"));

    // Saving the same values again is accepted.
    let same = engine
        .update_rubric(transport.id, "Vehicles", Some("photos/2024/02/02/car.png"))
        .await
        .unwrap();
    assert_eq!(same, renamed);
}

#[tokio::test]
async fn rename_without_photo_keeps_it() {
    let (engine, _db) = engine_with_db().await;
    let transport = engine
        .new_rubric("Transport", Some("photos/2024/02/02/car.png"))
        .await
        .unwrap();

    let renamed = engine
        .update_rubric(transport.id, "Vehicles", None)
        .await
        .unwrap();
    assert_eq!(renamed.name, "Vehicles");
    assert_eq!(renamed.photo.as_deref(), Some("photos/2024/02/02/car.png"));

    let cleared = engine
        .update_rubric(transport.id, "Vehicles", Some(""))
        .await
        .unwrap();
    assert_eq!(cleared.photo, None);
}
