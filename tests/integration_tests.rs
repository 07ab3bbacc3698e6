// Integration tests for the estate catalog HTTP API

use std::sync::Arc;

use actix_web::http::header;
use actix_web::{test, web, App};
use serde_json::{json, Value};

use estate_catalog::config::{AuthSettings, PaginationSettings};
use estate_catalog::routes::{configure_routes, AppState};
use estate_catalog::services::CatalogStore;

const API_KEY: &str = "integration-test-key";

async fn test_state() -> web::Data<AppState> {
    let store = CatalogStore::connect("sqlite::memory:", 1)
        .await
        .expect("in-memory store");
    web::Data::new(AppState {
        store,
        auth: Arc::new(AuthSettings {
            api_keys: vec![API_KEY.to_string()],
        }),
        pagination: PaginationSettings::default(),
    })
}

fn authorized(req: test::TestRequest) -> test::TestRequest {
    req.insert_header((header::AUTHORIZATION, format!("Bearer {}", API_KEY)))
}

fn listing_payload(listing_number: &str, city: &str, price: i64) -> Value {
    json!({
        "address": {
            "street_address": "100 Regina St. S.",
            "unit_number": "1",
            "city": city,
            "state": "Ontario",
            "zipcode": "N2J4P9",
            "country": "Canada",
            "latitude": 43.46340842,
            "longitude": -80.52039787
        },
        "listing_number": listing_number,
        "date_accessed": "2021-05-16",
        "price": price,
        "details_url": "realtor.ca/real-estate/",
        "size_interior": "1050.00",
        "bedrooms": "3 + 1",
        "num_bathrooms": 1.5,
        "property_type": "Single Family",
        "building_type": "House",
        "ownership_type": "Freehold",
        "description": "Move to Waterloo today!"
    })
}

macro_rules! service {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .configure(configure_routes),
        )
        .await
    };
}

#[actix_web::test]
async fn test_unauthenticated_requests_are_forbidden() {
    let state = test_state().await;
    let app = service!(state);

    for path in ["/api/v1/listings", "/api/v1/addresses", "/api/v1/listings/1"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(path).to_request()).await;
        assert_eq!(resp.status(), 403, "GET {} should be forbidden", path);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "forbidden");
        assert!(body.get("results").is_none());
    }

    let resp = test::call_service(
        &app,
        test::TestRequest::post()
            .uri("/api/v1/listings")
            .insert_header((header::AUTHORIZATION, "Bearer wrong-key"))
            .set_json(listing_payload("99995555", "Waterloo", 1_000_000))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 403);
}

#[actix_web::test]
async fn test_health_check_needs_no_credentials() {
    let state = test_state().await;
    let app = service!(state);

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/v1/health").to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "healthy");
}

#[actix_web::test]
async fn test_nested_address_payloads_share_one_address_row() {
    let state = test_state().await;
    let app = service!(state);

    let first = test::call_service(
        &app,
        authorized(test::TestRequest::post().uri("/api/v1/listings"))
            .set_json(listing_payload("99995555", "Waterloo", 1_000_000))
            .to_request(),
    )
    .await;
    assert_eq!(first.status(), 201);
    let first: Value = test::read_body_json(first).await;

    let second = test::call_service(
        &app,
        authorized(test::TestRequest::post().uri("/api/v1/listings"))
            .set_json(listing_payload("99996666", "Waterloo", 1_200_000))
            .to_request(),
    )
    .await;
    assert_eq!(second.status(), 201);
    let second: Value = test::read_body_json(second).await;

    assert_ne!(first["id"], second["id"]);
    assert_eq!(first["address"]["id"], second["address"]["id"]);

    let addresses = test::call_service(
        &app,
        authorized(test::TestRequest::get().uri("/api/v1/addresses")).to_request(),
    )
    .await;
    let addresses: Value = test::read_body_json(addresses).await;
    assert_eq!(addresses["count"], 1);
}

#[actix_web::test]
async fn test_identical_listing_payload_collapses_onto_one_record() {
    let state = test_state().await;
    let app = service!(state);

    let payload = listing_payload("99995555", "Waterloo", 1_000_000);
    let mut ids = Vec::new();
    for _ in 0..2 {
        let resp = test::call_service(
            &app,
            authorized(test::TestRequest::post().uri("/api/v1/listings"))
                .set_json(payload.clone())
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 201);
        let body: Value = test::read_body_json(resp).await;
        ids.push(body["id"].clone());
    }
    assert_eq!(ids[0], ids[1]);
}

#[actix_web::test]
async fn test_city_filter_is_case_insensitive_on_the_joined_address() {
    let state = test_state().await;
    let app = service!(state);

    for (number, city) in [("11110000", "Cambridge"), ("22220000", "Waterloo")] {
        let resp = test::call_service(
            &app,
            authorized(test::TestRequest::post().uri("/api/v1/listings"))
                .set_json(listing_payload(number, city, 800_000))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), 201);
    }

    let resp = test::call_service(
        &app,
        authorized(test::TestRequest::get().uri("/api/v1/listings?city=cambridge")).to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;

    assert_eq!(body["count"], 1);
    assert_eq!(body["results"][0]["listing_number"], "11110000");
    assert_eq!(body["results"][0]["address"]["city"], "Cambridge");
}

#[actix_web::test]
async fn test_price_ordering_runs_both_directions() {
    let state = test_state().await;
    let app = service!(state);

    for (number, price) in [("1", 900_000), ("2", 500_000), ("3", 700_000)] {
        test::call_service(
            &app,
            authorized(test::TestRequest::post().uri("/api/v1/listings"))
                .set_json(listing_payload(number, "Waterloo", price))
                .to_request(),
        )
        .await;
    }

    let ascending = test::call_service(
        &app,
        authorized(test::TestRequest::get().uri("/api/v1/listings?ordering=price")).to_request(),
    )
    .await;
    let ascending: Value = test::read_body_json(ascending).await;
    let prices: Vec<i64> = ascending["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["price"].as_i64().unwrap())
        .collect();
    assert_eq!(prices, vec![500_000, 700_000, 900_000]);

    let descending = test::call_service(
        &app,
        authorized(test::TestRequest::get().uri("/api/v1/listings?ordering=-price")).to_request(),
    )
    .await;
    let descending: Value = test::read_body_json(descending).await;
    let prices: Vec<i64> = descending["results"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["price"].as_i64().unwrap())
        .collect();
    assert_eq!(prices, vec![900_000, 700_000, 500_000]);
}

#[actix_web::test]
async fn test_list_and_detail_projections_differ() {
    let state = test_state().await;
    let app = service!(state);

    let created = test::call_service(
        &app,
        authorized(test::TestRequest::post().uri("/api/v1/listings"))
            .set_json(listing_payload("99995555", "Waterloo", 1_000_000))
            .to_request(),
    )
    .await;
    let created: Value = test::read_body_json(created).await;
    let id = created["id"].as_i64().unwrap();

    let list = test::call_service(
        &app,
        authorized(test::TestRequest::get().uri("/api/v1/listings")).to_request(),
    )
    .await;
    let list: Value = test::read_body_json(list).await;
    let summary = &list["results"][0];
    assert!(summary.get("details_url").is_none());
    assert!(summary.get("description").is_none());
    assert!(summary["address"].get("country").is_none());
    assert_eq!(summary["bedrooms"], "3 + 1");

    let detail = test::call_service(
        &app,
        authorized(test::TestRequest::get().uri(&format!("/api/v1/listings/{}", id))).to_request(),
    )
    .await;
    let detail: Value = test::read_body_json(detail).await;
    assert_eq!(detail["details_url"], "realtor.ca/real-estate/");
    assert_eq!(detail["description"], "Move to Waterloo today!");
    assert_eq!(detail["address"]["country"], "Canada");
    assert_eq!(detail["address"]["latitude"], 43.46340842);

    let addresses = test::call_service(
        &app,
        authorized(test::TestRequest::get().uri("/api/v1/addresses")).to_request(),
    )
    .await;
    let addresses: Value = test::read_body_json(addresses).await;
    assert!(addresses["results"][0].get("country").is_none());

    let address_id = addresses["results"][0]["id"].as_i64().unwrap();
    let address = test::call_service(
        &app,
        authorized(test::TestRequest::get().uri(&format!("/api/v1/addresses/{}", address_id)))
            .to_request(),
    )
    .await;
    let address: Value = test::read_body_json(address).await;
    assert_eq!(address["country"], "Canada");
}

#[actix_web::test]
async fn test_missing_records_return_404() {
    let state = test_state().await;
    let app = service!(state);

    for path in ["/api/v1/listings/42", "/api/v1/addresses/42"] {
        let resp = test::call_service(
            &app,
            authorized(test::TestRequest::get().uri(path)).to_request(),
        )
        .await;
        assert_eq!(resp.status(), 404);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "not_found");
    }
}

#[actix_web::test]
async fn test_invalid_payload_reports_field_problems() {
    let state = test_state().await;
    let app = service!(state);

    let mut payload = listing_payload("99995555", "Waterloo", 1_000_000);
    payload["address"]["city"] = json!("");

    let resp = test::call_service(
        &app,
        authorized(test::TestRequest::post().uri("/api/v1/listings"))
            .set_json(payload)
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 400);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_failed");
    assert!(body["details"]["address"]["city"].is_array());
}

#[actix_web::test]
async fn test_deleting_an_address_deletes_its_listings() {
    let state = test_state().await;
    let app = service!(state);

    let created = test::call_service(
        &app,
        authorized(test::TestRequest::post().uri("/api/v1/listings"))
            .set_json(listing_payload("99995555", "Waterloo", 1_000_000))
            .to_request(),
    )
    .await;
    let created: Value = test::read_body_json(created).await;
    let listing_id = created["id"].as_i64().unwrap();
    let address_id = created["address"]["id"].as_i64().unwrap();

    let resp = test::call_service(
        &app,
        authorized(test::TestRequest::delete().uri(&format!("/api/v1/addresses/{}", address_id)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 204);

    let resp = test::call_service(
        &app,
        authorized(test::TestRequest::get().uri(&format!("/api/v1/listings/{}", listing_id)))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 404);
}

#[actix_web::test]
async fn test_pagination_envelope_walks_pages() {
    let state = test_state().await;
    let app = service!(state);

    for i in 0..5i64 {
        test::call_service(
            &app,
            authorized(test::TestRequest::post().uri("/api/v1/listings"))
                .set_json(listing_payload(&format!("1000{}", i), "Waterloo", 500_000 + i))
                .to_request(),
        )
        .await;
    }

    let resp = test::call_service(
        &app,
        authorized(test::TestRequest::get().uri("/api/v1/listings?page=2&page_size=2"))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;

    assert_eq!(body["count"], 5);
    assert_eq!(body["previous"], 1);
    assert_eq!(body["next"], 3);
    assert_eq!(body["results"].as_array().unwrap().len(), 2);

    // A page beyond the data is empty but still reports the true count
    let resp = test::call_service(
        &app,
        authorized(test::TestRequest::get().uri("/api/v1/listings?page=9&page_size=2"))
            .to_request(),
    )
    .await;
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["count"], 5);
    assert!(body["results"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn test_update_replaces_and_recomputes_identity() {
    let state = test_state().await;
    let app = service!(state);

    let created = test::call_service(
        &app,
        authorized(test::TestRequest::post().uri("/api/v1/listings"))
            .set_json(listing_payload("99995555", "Waterloo", 1_000_000))
            .to_request(),
    )
    .await;
    let created: Value = test::read_body_json(created).await;
    let id = created["id"].as_i64().unwrap();

    let resp = test::call_service(
        &app,
        authorized(test::TestRequest::put().uri(&format!("/api/v1/listings/{}", id)))
            .set_json(listing_payload("99995555", "Waterloo", 950_000))
            .to_request(),
    )
    .await;
    assert_eq!(resp.status(), 200);
    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["price"], 950_000);

    // Re-posting the updated attribute set resolves to the same record
    let resp = test::call_service(
        &app,
        authorized(test::TestRequest::post().uri("/api/v1/listings"))
            .set_json(listing_payload("99995555", "Waterloo", 950_000))
            .to_request(),
    )
    .await;
    let matched: Value = test::read_body_json(resp).await;
    assert_eq!(matched["id"].as_i64().unwrap(), id);
}
