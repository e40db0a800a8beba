//! Integration coverage for the saved-listings ledger: the idempotent
//! toggle, the owner-only remove, and dangling-tolerant reads.

mod common {
    use std::collections::BTreeSet;
    use std::sync::Arc;

    use chrono::Utc;

    use casamercato::identity::{CurrentUser, UserId};
    use casamercato::store::MemoryStore;
    use casamercato::workflows::directory::{
        AccountStatus, DirectoryRepository, UserProfile, UserRole,
    };
    use casamercato::workflows::favorites::FavoriteService;
    use casamercato::workflows::listings::{
        Listing, ListingDraft, ListingService, ListingType, SubmissionMode,
    };

    pub(super) fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        for (id, email, role) in [
            ("usr-admin", "admin@casamercato.local", UserRole::Admin),
            ("usr-anna", "anna@example.it", UserRole::Inserzionista),
            ("usr-marco", "marco@example.it", UserRole::Utente),
            ("usr-giulia", "giulia@example.it", UserRole::Utente),
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

    pub(super) fn favorite_service(
        store: &Arc<MemoryStore>,
    ) -> FavoriteService<MemoryStore, MemoryStore> {
        FavoriteService::new(store.clone(), store.clone())
    }

    pub(super) fn listing_service(
        store: &Arc<MemoryStore>,
    ) -> ListingService<MemoryStore, MemoryStore> {
        ListingService::new(store.clone(), store.clone())
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

    pub(super) fn other_browser() -> CurrentUser {
        CurrentUser::new("usr-giulia", "giulia@example.it")
    }

    pub(super) fn torino_draft() -> ListingDraft {
        ListingDraft {
            title: "Quadrilocale in Crocetta".to_string(),
            description: "Piano alto, doppi servizi, cantina.".to_string(),
            listing_type: ListingType::Vendita,
            category: casamercato::workflows::listings::ListingCategory::Appartamento,
            price: 320_000.0,
            location: "Crocetta".to_string(),
            city: "Torino".to_string(),
            province: "Torino".to_string(),
            address: None,
            images: Vec::new(),
            surface: Some(110.0),
            rooms: Some(4),
            bathrooms: Some(2),
            floor: Some(5),
            energy_class: None,
            features: BTreeSet::new(),
        }
    }

    /// A listing taken through review so it is publicly visible.
    pub(super) fn published_listing(store: &Arc<MemoryStore>) -> Listing {
        let listings = listing_service(store);
        let pending = listings
            .create(Some(&advertiser()), torino_draft(), SubmissionMode::InAttesa)
            .expect("create pending listing");
        listings
            .approve(Some(&admin()), &pending.id)
            .expect("approve listing")
    }
}

mod ledger {
    use super::common::*;

    use casamercato::identity::UserId;
    use casamercato::workflows::directory::{AccountStatus, DirectoryService};
    use casamercato::workflows::listings::ListingId;
    use casamercato::workflows::WorkflowError;

    #[test]
    fn toggle_flips_membership_each_call() {
        let store = seeded_store();
        let favorites = favorite_service(&store);
        let listing = published_listing(&store);

        assert!(favorites
            .toggle(Some(&browser()), &listing.id)
            .expect("first toggle saves"));
        assert!(!favorites
            .toggle(Some(&browser()), &listing.id)
            .expect("second toggle unsaves"));
        assert!(favorites
            .toggle(Some(&browser()), &listing.id)
            .expect("third toggle saves again"));

        let saved = favorites.saved(Some(&browser())).expect("saved list");
        assert_eq!(saved.len(), 1);
    }

    #[test]
    fn saved_rows_join_their_listing() {
        let store = seeded_store();
        let favorites = favorite_service(&store);
        let listing = published_listing(&store);

        favorites
            .toggle(Some(&browser()), &listing.id)
            .expect("save listing");

        let saved = favorites.saved(Some(&browser())).expect("saved list");
        let row = saved.first().expect("one saved row");
        assert_eq!(row.favorite.listing_id, listing.id);
        let joined = row.listing.as_ref().expect("joined listing");
        assert_eq!(joined.title, listing.title);
    }

    #[test]
    fn ledgers_are_per_user() {
        let store = seeded_store();
        let favorites = favorite_service(&store);
        let listing = published_listing(&store);

        favorites
            .toggle(Some(&browser()), &listing.id)
            .expect("marco saves");

        let other = favorites
            .saved(Some(&other_browser()))
            .expect("giulia's list");
        assert!(other.is_empty());

        assert!(favorites
            .toggle(Some(&other_browser()), &listing.id)
            .expect("giulia saves the same listing"));
    }

    #[test]
    fn listing_deletion_empties_the_ledger() {
        let store = seeded_store();
        let favorites = favorite_service(&store);
        let listings = listing_service(&store);
        let listing = published_listing(&store);

        favorites
            .toggle(Some(&browser()), &listing.id)
            .expect("save listing");

        let purge = listings
            .delete(Some(&advertiser()), &listing.id)
            .expect("owner deletes listing");
        assert_eq!(purge.favorites_removed, 1);

        let saved = favorites.saved(Some(&browser())).expect("saved list");
        assert!(saved.is_empty());
    }

    #[test]
    fn removing_someone_elses_favorite_is_forbidden() {
        let store = seeded_store();
        let favorites = favorite_service(&store);
        let listing = published_listing(&store);

        favorites
            .toggle(Some(&browser()), &listing.id)
            .expect("marco saves");
        let saved = favorites.saved(Some(&browser())).expect("saved list");
        let favorite_id = saved.first().expect("one saved row").favorite.id.clone();

        let err = favorites
            .remove(Some(&other_browser()), &favorite_id)
            .expect_err("giulia must not remove marco's favorite");
        assert!(matches!(err, WorkflowError::Forbidden(_)));

        favorites
            .remove(Some(&browser()), &favorite_id)
            .expect("marco removes his own favorite");
        let saved = favorites.saved(Some(&browser())).expect("saved list");
        assert!(saved.is_empty());
    }

    #[test]
    fn unknown_listing_reads_as_not_found() {
        let store = seeded_store();
        let favorites = favorite_service(&store);

        let err = favorites
            .toggle(Some(&browser()), &ListingId::from("lst-ghost"))
            .expect_err("unknown listing must fail");
        assert!(matches!(err, WorkflowError::NotFound("listing")));
    }

    #[test]
    fn suspended_account_cannot_toggle() {
        let store = seeded_store();
        let favorites = favorite_service(&store);
        let directory = DirectoryService::new(store.clone());
        let listing = published_listing(&store);

        favorites
            .toggle(Some(&browser()), &listing.id)
            .expect("save before suspension");
        directory
            .set_status(
                Some(&admin()),
                &UserId::from("usr-marco"),
                AccountStatus::Sospeso,
            )
            .expect("suspend account");

        let err = favorites
            .toggle(Some(&browser()), &listing.id)
            .expect_err("suspended account must not toggle");
        assert!(matches!(err, WorkflowError::Forbidden(_)));

        let saved = favorites
            .saved(Some(&browser()))
            .expect("suspended account keeps read access");
        assert_eq!(saved.len(), 1);
    }
}

mod routing {
    use super::common::*;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use casamercato::workflows::favorites::favorite_router;

    async fn read_json(response: axum::response::Response) -> Value {
        let body = to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("body");
        serde_json::from_slice(&body).expect("json")
    }

    fn toggle_request(listing_id: &str, user: (&str, &str)) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(format!("/api/v1/listings/{listing_id}/favorite"))
            .header("x-user-id", user.0)
            .header("x-user-email", user.1)
            .body(Body::empty())
            .expect("request")
    }

    #[tokio::test]
    async fn toggle_over_http_reports_membership() {
        let store = seeded_store();
        let listing = published_listing(&store);
        let router = favorite_router(Arc::new(favorite_service(&store)));
        let marco = ("usr-marco", "marco@example.it");

        let saved = router
            .clone()
            .oneshot(toggle_request(&listing.id.0, marco))
            .await
            .expect("router dispatch");
        assert_eq!(saved.status(), StatusCode::OK);
        let payload = read_json(saved).await;
        assert_eq!(payload.get("is_favorite"), Some(&json!(true)));

        let unsaved = router
            .oneshot(toggle_request(&listing.id.0, marco))
            .await
            .expect("router dispatch");
        let payload = read_json(unsaved).await;
        assert_eq!(payload.get("is_favorite"), Some(&json!(false)));
    }

    #[tokio::test]
    async fn saved_list_requires_identity() {
        let store = seeded_store();
        let router = favorite_router(Arc::new(favorite_service(&store)));

        let response = router
            .oneshot(
                Request::builder()
                    .uri("/api/v1/favorites")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn deleting_anothers_favorite_is_forbidden_over_http() {
        let store = seeded_store();
        let listing = published_listing(&store);
        let router = favorite_router(Arc::new(favorite_service(&store)));

        router
            .clone()
            .oneshot(toggle_request(&listing.id.0, ("usr-marco", "marco@example.it")))
            .await
            .expect("router dispatch");

        let saved = router
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/v1/favorites")
                    .header("x-user-id", "usr-marco")
                    .header("x-user-email", "marco@example.it")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        let rows = read_json(saved).await;
        let favorite_id = rows
            .as_array()
            .and_then(|rows| rows.first())
            .and_then(|row| row.pointer("/favorite/id"))
            .and_then(Value::as_str)
            .expect("favorite id")
            .to_string();

        let refused = router
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri(format!("/api/v1/favorites/{favorite_id}"))
                    .header("x-user-id", "usr-giulia")
                    .header("x-user-email", "giulia@example.it")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("router dispatch");
        assert_eq!(refused.status(), StatusCode::FORBIDDEN);
    }
}
