//! Integration coverage for the site configuration singleton and the
//! listing-image staging gateway.

mod common {
    use std::sync::Arc;

    use chrono::Utc;

    use casamercato::identity::{CurrentUser, UserId};
    use casamercato::media::{MediaService, MemoryBlobStore};
    use casamercato::store::MemoryStore;
    use casamercato::workflows::directory::{
        AccountStatus, DirectoryRepository, UserProfile, UserRole,
    };
    use casamercato::workflows::settings::SettingsService;

    pub(super) fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for (id, email, role) in [
            ("usr-admin", "admin@casamercato.local", UserRole::Admin),
            ("usr-anna", "anna@example.it", UserRole::Inserzionista),
            ("usr-marco", "marco@example.it", UserRole::Utente),
        ] {
            let now = Utc::now();
            DirectoryRepository::insert(
                store.as_ref(),
                UserProfile {
                    id: UserId::from(id),
                    email: email.to_string(),
                    full_name: None,
                    phone: None,
                    role,
                    status: AccountStatus::Attivo,
                    created_at: now,
                    updated_at: now,
                },
            )
            .expect("seed profile");
        }
        store
    }

    pub(super) fn settings_service(
        store: &Arc<MemoryStore>,
    ) -> SettingsService<MemoryStore, MemoryStore> {
        SettingsService::new(store.clone(), store.clone())
    }

    pub(super) fn media_service(
        store: &Arc<MemoryStore>,
    ) -> (Arc<MemoryBlobStore>, MediaService<MemoryBlobStore, MemoryStore>) {
        let blobs = Arc::new(MemoryBlobStore::new("https://media.casamercato.local"));
        let service = MediaService::new(blobs.clone(), store.clone());
        (blobs, service)
    }

    pub(super) fn admin() -> CurrentUser {
        CurrentUser::new("usr-admin", "admin@casamercato.local")
    }

    pub(super) fn advertiser() -> CurrentUser {
        CurrentUser::new("usr-anna", "anna@example.it")
    }

    pub(super) fn browser() -> CurrentUser {
        CurrentUser::new("usr-marco", "marco@example.it")
    }
}

mod configuration {
    use super::common::*;

    use casamercato::workflows::settings::SettingsUpdate;
    use casamercato::workflows::{ValidationError, WorkflowError};

    #[test]
    fn storefront_reads_the_seeded_defaults() {
        let store = seeded_store();
        let settings = settings_service(&store);

        let site = settings.site().expect("public read");
        assert_eq!(site.site_name, "CasaMercato");
        assert_eq!(site.contact_email, "info@casamercato.local");
        assert_eq!(site.logo_url, None);
    }

    #[test]
    fn partial_update_leaves_other_fields_alone() {
        let store = seeded_store();
        let settings = settings_service(&store);

        let updated = settings
            .update(
                Some(&admin()),
                SettingsUpdate {
                    site_description: Some("Il mercato immobiliare di quartiere".to_string()),
                    contact_phone: Some("+39 02 1234567".to_string()),
                    ..SettingsUpdate::default()
                },
            )
            .expect("admin update");
        assert_eq!(
            updated.site_description,
            "Il mercato immobiliare di quartiere"
        );
        assert_eq!(updated.contact_phone.as_deref(), Some("+39 02 1234567"));
        assert_eq!(updated.site_name, "CasaMercato");
        assert!(updated.updated_at >= updated.created_at);
    }

    #[test]
    fn update_is_admin_only() {
        let store = seeded_store();
        let settings = settings_service(&store);

        let err = settings
            .update(
                Some(&browser()),
                SettingsUpdate {
                    site_name: Some("MercatoMio".to_string()),
                    ..SettingsUpdate::default()
                },
            )
            .expect_err("plain account must not update settings");
        assert!(matches!(err, WorkflowError::Forbidden(_)));

        let site = settings.site().expect("public read");
        assert_eq!(site.site_name, "CasaMercato");
    }

    #[test]
    fn blank_site_name_fails_validation() {
        let store = seeded_store();
        let settings = settings_service(&store);

        let err = settings
            .update(
                Some(&admin()),
                SettingsUpdate {
                    site_name: Some("  ".to_string()),
                    ..SettingsUpdate::default()
                },
            )
            .expect_err("blank site name must fail");
        assert!(matches!(
            err,
            WorkflowError::Validation(ValidationError::EmptySiteName)
        ));
    }
}

mod media {
    use super::common::*;

    use casamercato::workflows::WorkflowError;

    #[test]
    fn advertiser_stages_an_image_under_their_prefix() {
        let store = seeded_store();
        let (blobs, media) = media_service(&store);

        let url = media
            .stage_listing_image(
                Some(&advertiser()),
                "soggiorno (1).jpg",
                b"jpeg bytes",
                "image/jpeg",
            )
            .expect("stage image");
        assert!(url.starts_with("https://media.casamercato.local/listing-images/usr-anna/"));
        assert!(url.ends_with("-soggiorno__1_.jpg"));
        assert_eq!(blobs.object_count(), 1);
    }

    #[test]
    fn plain_account_cannot_stage_images() {
        let store = seeded_store();
        let (blobs, media) = media_service(&store);

        let err = media
            .stage_listing_image(Some(&browser()), "casa.jpg", b"jpeg", "image/jpeg")
            .expect_err("plain account must not upload");
        assert!(matches!(err, WorkflowError::Forbidden(_)));
        assert_eq!(blobs.object_count(), 0);
    }

    #[test]
    fn anonymous_upload_is_refused() {
        let store = seeded_store();
        let (_, media) = media_service(&store);

        let err = media
            .stage_listing_image(None, "casa.jpg", b"jpeg", "image/jpeg")
            .expect_err("anonymous upload must fail");
        assert!(matches!(err, WorkflowError::Unauthenticated));
    }
}

mod routing {
    use super::common::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use casamercato::media::media_router;
    use casamercato::workflows::settings::settings_router;

    async fn read_json(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        serde_json::from_slice(&body).expect("json")
    }

    #[tokio::test]
    async fn settings_are_public_over_http() {
        let store = seeded_store();
        let router = settings_router(Arc::new(settings_service(&store)));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/settings")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;
        assert_eq!(payload.get("site_name"), Some(&json!("CasaMercato")));
    }

    #[tokio::test]
    async fn admin_updates_settings_over_http() {
        let store = seeded_store();
        let router = settings_router(Arc::new(settings_service(&store)));

        let response = router
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/v1/admin/settings")
                    .header("content-type", "application/json")
                    .header("x-user-id", "usr-admin")
                    .header("x-user-email", "admin@casamercato.local")
                    .body(Body::from(
                        serde_json::to_vec(&json!({ "primary_color": "#0f766e" }))
                            .expect("serialize"),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::OK);
        let payload = read_json(response).await;
        assert_eq!(payload.get("primary_color"), Some(&json!("#0f766e")));
    }

    #[tokio::test]
    async fn non_admin_update_is_forbidden_over_http() {
        let store = seeded_store();
        let router = settings_router(Arc::new(settings_service(&store)));

        let response = router
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/api/v1/admin/settings")
                    .header("content-type", "application/json")
                    .header("x-user-id", "usr-marco")
                    .header("x-user-email", "marco@example.it")
                    .body(Body::from(
                        serde_json::to_vec(&json!({ "site_name": "MercatoMio" }))
                            .expect("serialize"),
                    ))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn image_upload_over_http_returns_the_public_url() {
        let store = seeded_store();
        let (_, media) = media_service(&store);
        let router = media_router(Arc::new(media));

        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/v1/media/listing-images?filename=facciata.jpg")
                    .header("content-type", "image/jpeg")
                    .header("x-user-id", "usr-anna")
                    .header("x-user-email", "anna@example.it")
                    .body(Body::from(&b"jpeg bytes"[..]))
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::CREATED);
        let payload = read_json(response).await;
        let url = payload.get("url").and_then(Value::as_str).expect("url");
        assert!(url.starts_with("https://media.casamercato.local/listing-images/usr-anna/"));
        assert!(url.ends_with("-facciata.jpg"));
    }
}
