use shelf_core::{
    CoreError, Entity, EntityId, EntityKind, EventType, LifecycleEvent, Product, ProductVariant,
    RequestContext,
};

#[test]
fn test_snapshot_roundtrip_preserves_all_fields() {
    let mut product = Product::new(42, "Cafe Moulu");
    product.variant_ids = vec![EntityId::new(420), EntityId::new(421)];
    product.custom_fields.brand_name = Some("Carte Noire".to_string());
    product.custom_fields.origin_country = Some("Colombie".to_string());

    let json = serde_json::to_string(&product).unwrap();
    let restored: Product = serde_json::from_str(&json).unwrap();

    assert_eq!(restored, product);
}

#[test]
fn test_variant_from_catalog_json() {
    let json = r#"{
        "id": 420,
        "productId": 42,
        "name": "Cafe Moulu 250g",
        "sku": "CAFE-250",
        "price": 459,
        "currencyCode": "EUR",
        "stockOnHand": 12,
        "customFields": { "availability": true, "pricePerUnit": 18.36 }
    }"#;

    let variant: ProductVariant = serde_json::from_str(json).unwrap();
    assert_eq!(variant.id(), EntityId::new(420));
    assert_eq!(variant.stock_on_hand, 12);
    assert!(variant.enabled);
    assert_eq!(variant.custom_fields.availability, Some(true));
    assert_eq!(variant.custom_fields.price_per_unit, Some(18.36));
}

#[test]
fn test_kind_and_id_parsing_from_path_segments() {
    fn parse(kind: &str, id: &str) -> shelf_core::Result<(EntityKind, EntityId)> {
        Ok((kind.parse()?, id.parse()?))
    }

    assert_eq!(
        parse("variant", "7").unwrap(),
        (EntityKind::ProductVariant, EntityId::new(7))
    );

    match parse("order", "7") {
        Err(CoreError::UnknownEntityKind(kind)) => assert_eq!(kind, "order"),
        other => panic!("Expected UnknownEntityKind, got {:?}", other),
    }

    let err = parse("product", "x7").unwrap_err();
    assert!(matches!(err, CoreError::InvalidEntityId { .. }));
    assert!(err.to_string().contains("x7"));
}

#[test]
fn test_batched_event_from_json() {
    let json = r#"{
        "kind": "product",
        "event_type": "updated",
        "entity_ids": [1, 2, 3],
        "ctx": { "channel": "fr", "api_type": "admin", "is_authorized": true }
    }"#;

    let event: LifecycleEvent = serde_json::from_str(json).unwrap();
    assert_eq!(event.kind, EntityKind::Product);
    assert_eq!(event.event_type, EventType::Updated);
    assert_eq!(event.entity_ids.len(), 3);
    assert_eq!(event.ctx.channel, "fr");
    assert!(event.ctx.request_id.is_none());
    assert_ne!(event.ctx, RequestContext::default());
}
