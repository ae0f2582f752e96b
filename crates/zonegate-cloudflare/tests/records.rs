//! Integration tests for the records API against a mocked provider.

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};
use zonegate_cloudflare::{CloudflareClient, CloudflareError, NewRecord, RecordPatch, ZoneConfig};
use zonegate_core::RecordType;

fn client_for(server: &MockServer) -> CloudflareClient {
    CloudflareClient::builder("test-token")
        .base_url(server.uri())
        .zone(ZoneConfig::by_id("zone123"))
        .build()
}

fn record_json(id: &str, rtype: &str, name: &str, content: &str) -> serde_json::Value {
    json!({
        "id": id,
        "type": rtype,
        "name": name,
        "content": content,
        "ttl": 300,
        "proxied": false,
        "created_on": "2024-01-15T09:30:00Z",
        "modified_on": "2024-01-15T09:30:00Z"
    })
}

fn envelope(result: serde_json::Value) -> serde_json::Value {
    json!({
        "success": true,
        "errors": [],
        "messages": [],
        "result": result
    })
}

#[tokio::test]
async fn list_records_with_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones/zone123/dns_records"))
        .and(query_param("type", "A"))
        .and(query_param("per_page", "50"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": [record_json("r1", "A", "www.example.com", "192.0.2.1")],
            "result_info": { "page": 1, "per_page": 50, "count": 1, "total_count": 7 }
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let page = client
        .records()
        .list()
        .record_type(RecordType::A)
        .per_page(50)
        .send()
        .await
        .unwrap();

    assert_eq!(page.total, 7);
    assert_eq!(page.records.len(), 1);
    assert_eq!(page.records[0].name, "www.example.com");
    assert_eq!(page.records[0].record_type, RecordType::A);
}

#[tokio::test]
async fn zone_name_lookup_is_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones"))
        .and(query_param("name", "example.com"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(json!([{ "id": "resolved-zone", "name": "example.com" }]))),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/zones/resolved-zone/dns_records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "errors": [],
            "messages": [],
            "result": [],
            "result_info": { "page": 1, "per_page": 50, "count": 0, "total_count": 0 }
        })))
        .expect(2)
        .mount(&server)
        .await;

    let client = CloudflareClient::builder("test-token")
        .base_url(server.uri())
        .zone_name("example.com")
        .build();

    // Two list calls, one zone lookup.
    client.records().list().send().await.unwrap();
    client.records().list().send().await.unwrap();
}

#[tokio::test]
async fn create_record_posts_payload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/zones/zone123/dns_records"))
        .and(body_partial_json(json!({
            "type": "TXT",
            "name": "x.example.com",
            "content": "v=spf1 -all"
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(record_json("new1", "TXT", "x.example.com", "v=spf1 -all"))),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let created = client
        .records()
        .create(&NewRecord::new(RecordType::Txt, "x.example.com", "v=spf1 -all"))
        .await
        .unwrap();
    assert_eq!(created.id, "new1");
}

#[tokio::test]
async fn update_record_patches_changed_fields_only() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/zones/zone123/dns_records/r9"))
        .and(body_partial_json(json!({ "content": "198.51.100.9" })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(envelope(record_json("r9", "A", "app.example.com", "198.51.100.9"))),
        )
        .mount(&server)
        .await;

    let client = client_for(&server);
    let patch = RecordPatch {
        content: Some("198.51.100.9".to_string()),
        ..RecordPatch::default()
    };
    let updated = client.records().update("r9", &patch).await.unwrap();
    assert_eq!(updated.content, "198.51.100.9");
}

#[tokio::test]
async fn delete_record_returns_id() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/zones/zone123/dns_records/r2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(json!({ "id": "r2" }))))
        .mount(&server)
        .await;

    let client = client_for(&server);
    assert_eq!(client.records().delete("r2").await.unwrap(), "r2");
}

#[tokio::test]
async fn envelope_failure_maps_to_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/zones/zone123/dns_records"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": false,
            "errors": [{ "code": 81057, "message": "Record already exists." }],
            "messages": [],
            "result": null
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client
        .records()
        .create(&NewRecord::new(RecordType::A, "dup.example.com", "192.0.2.1"))
        .await
        .unwrap_err();
    match err {
        CloudflareError::Provider { code, message } => {
            assert_eq!(code, 81057);
            assert!(message.contains("already exists"));
        }
        other => panic!("expected Provider error, got {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_status_maps_to_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones/zone123/dns_records"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "success": false,
            "errors": [{ "code": 9109, "message": "Invalid access token" }],
            "messages": [],
            "result": null
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.records().list().send().await.unwrap_err();
    assert!(err.is_auth_error());
    assert_eq!(err.status_code(), Some(401));
}

#[tokio::test]
async fn missing_record_maps_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/zones/zone123/dns_records/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "success": false,
            "errors": [{ "code": 81044, "message": "Record not found." }],
            "messages": [],
            "result": null
        })))
        .mount(&server)
        .await;

    let client = client_for(&server);
    let err = client.records().get("nope").await.unwrap_err();
    match err {
        CloudflareError::NotFound { resource } => assert!(resource.contains("not found")),
        other => panic!("expected NotFound, got {other:?}"),
    }
}
