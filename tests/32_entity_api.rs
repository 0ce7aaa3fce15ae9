mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

fn aspirin() -> Value {
    json!({
        "name": "Aspirin",
        "genericName": null,
        "strength": "300mg",
        "form": "tablet",
        "unitPrice": "0.25",
        "stockQuantity": 120,
        "isActive": true
    })
}

#[tokio::test]
async fn create_get_update_delete_round_trip() -> Result<()> {
    let server = common::start_server().await?;
    let token = server.admin_token();

    let id = server.create("medication", &aspirin()).await?;

    // Get by id returns what was stored, with the assigned id
    let res = server
        .client
        .get(server.url(&format!("/api/medication/{}", id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let record = res.json::<Value>().await?;
    assert_eq!(record["id"], json!(id));
    assert_eq!(record["name"], "Aspirin");
    assert_eq!(record["stockQuantity"], 120);

    // Full replacement
    let mut replacement = aspirin();
    replacement["id"] = json!(id);
    replacement["stockQuantity"] = json!(80);
    replacement["genericName"] = json!("acetylsalicylic acid");
    let res = server
        .client
        .put(server.url(&format!("/api/medication/{}", id)))
        .bearer_auth(&token)
        .json(&replacement)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"status": true}));

    let record = server
        .client
        .get(server.url(&format!("/api/medication/{}", id)))
        .bearer_auth(&token)
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(record["stockQuantity"], 80);
    assert_eq!(record["genericName"], "acetylsalicylic acid");

    // Delete, then the record is gone
    let res = server
        .client
        .delete(server.url(&format!("/api/medication/{}", id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"status": true}));

    let res = server
        .client
        .get(server.url(&format!("/api/medication/{}", id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(res.json::<Value>().await?["code"], "NOT_FOUND");

    let res = server
        .client
        .delete(server.url(&format!("/api/medication/{}", id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn create_keeps_a_supplied_id_and_rejects_duplicates() -> Result<()> {
    let server = common::start_server().await?;
    let id = "6f1c2a52-4d0b-4e57-9a3e-2a4c1d9e8b10";

    let mut body = aspirin();
    body["id"] = json!(id);
    assert_eq!(server.create("medication", &body).await?, id);

    let res = server
        .client
        .post(server.url("/api/medication"))
        .bearer_auth(server.admin_token())
        .json(&body)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(res.json::<Value>().await?["code"], "CONFLICT");
    Ok(())
}

#[tokio::test]
async fn get_by_id_expands_the_related_medication() -> Result<()> {
    let server = common::start_server().await?;
    let medication_id = server.create("medication", &aspirin()).await?;

    let requisition = json!({
        "requisitionNumber": "REQ-0042",
        "medicationId": medication_id,
        "requestedBy": "Ward 3",
        "quantity": 40,
        "status": "Pending",
        "requestedOn": "2024-05-01T09:30:00Z",
        "approvedOn": null
    });
    let id = server.create("requisition", &requisition).await?;

    let record = server
        .client
        .get(server.url(&format!("/api/requisition/{}", id)))
        .bearer_auth(server.admin_token())
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(record["requisitionNumber"], "REQ-0042");
    assert_eq!(record["medication"]["id"], json!(medication_id));
    assert_eq!(record["medication"]["name"], "Aspirin");

    // List rows carry the same expansion
    let (status, rows) = server.list("requisition", &[]).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows[0]["requisitionNumber"], "REQ-0042");
    assert_eq!(rows[0]["medication"]["name"], "Aspirin", "{}", rows);
    Ok(())
}

#[tokio::test]
async fn null_and_dangling_relations_expand_to_null() -> Result<()> {
    let server = common::start_server().await?;
    let token = server.admin_token();
    let medication_id = server.create("medication", &aspirin()).await?;

    let line = server
        .create(
            "invoiceline",
            &json!({
                "invoiceId": "3b0f7a1e-9c2d-4f8a-b6e4-1d2c3b4a5f60",
                "medicationId": null,
                "description": "Consultation",
                "quantity": 1,
                "unitPrice": "45.00",
                "discount": null,
                "lineTotal": "45.00"
            }),
        )
        .await?;
    let record = server
        .client
        .get(server.url(&format!("/api/invoiceline/{}", line)))
        .bearer_auth(&token)
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(record["description"], "Consultation");
    assert_eq!(record["medication"], Value::Null);
    assert!(record.get("medication").is_some(), "{}", record);

    let requisition = server
        .create(
            "requisition",
            &json!({
                "requisitionNumber": "REQ-0043",
                "medicationId": medication_id,
                "requestedBy": "Ward 5",
                "quantity": 2,
                "status": "Pending",
                "requestedOn": "2024-05-02T08:00:00Z",
                "approvedOn": null
            }),
        )
        .await?;
    let res = server
        .client
        .delete(server.url(&format!("/api/medication/{}", medication_id)))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let record = server
        .client
        .get(server.url(&format!("/api/requisition/{}", requisition)))
        .bearer_auth(&token)
        .send()
        .await?
        .json::<Value>()
        .await?;
    assert_eq!(record["medicationId"], json!(medication_id));
    assert_eq!(record["medication"], Value::Null);

    let (_, rows) = server.list("requisition", &[]).await?;
    assert_eq!(rows[0]["medication"], Value::Null);
    Ok(())
}

#[tokio::test]
async fn patch_cannot_replace_the_document_with_another_id() -> Result<()> {
    let server = common::start_server().await?;
    let token = server.admin_token();
    let id = server.create("medication", &aspirin()).await?;
    let url = server.url(&format!("/api/medication/{}", id));

    let mut replacement = aspirin();
    replacement["id"] = json!("00000000-0000-4000-8000-00000000002a");
    replacement["name"] = json!("Ibuprofen");
    let res = server
        .client
        .patch(&url)
        .bearer_auth(&token)
        .json(&json!([{"op": "replace", "path": "", "value": replacement}]))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["message"], "Cannot modify id with patch");

    let record = server.client.get(&url).bearer_auth(&token).send().await?.json::<Value>().await?;
    assert_eq!(record["id"], json!(id));
    assert_eq!(record["name"], "Aspirin");
    Ok(())
}

#[tokio::test]
async fn update_with_mismatched_id_is_rejected() -> Result<()> {
    let server = common::start_server().await?;
    let id = server.create("medication", &aspirin()).await?;

    let mut body = aspirin();
    body["id"] = json!("00000000-0000-4000-8000-000000000001");
    let res = server
        .client
        .put(server.url(&format!("/api/medication/{}", id)))
        .bearer_auth(server.admin_token())
        .json(&body)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["message"], "Mismatched Id");
    Ok(())
}

#[tokio::test]
async fn update_of_missing_record_is_not_found() -> Result<()> {
    let server = common::start_server().await?;
    let id = "00000000-0000-4000-8000-0000000000aa";

    let mut body = aspirin();
    body["id"] = json!(id);
    let res = server
        .client
        .put(server.url(&format!("/api/medication/{}", id)))
        .bearer_auth(server.admin_token())
        .json(&body)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn patch_applies_operations_and_guards_the_id() -> Result<()> {
    let server = common::start_server().await?;
    let token = server.admin_token();
    let id = server.create("medication", &aspirin()).await?;
    let url = server.url(&format!("/api/medication/{}", id));

    let res = server
        .client
        .patch(&url)
        .bearer_auth(&token)
        .json(&json!([
            {"op": "replace", "path": "/stockQuantity", "value": 5},
            {"op": "replace", "path": "/isActive", "value": false}
        ]))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.json::<Value>().await?, json!({"status": true}));

    let record = server.client.get(&url).bearer_auth(&token).send().await?.json::<Value>().await?;
    assert_eq!(record["stockQuantity"], 5);
    assert_eq!(record["isActive"], false);
    assert_eq!(record["name"], "Aspirin");

    // A null document
    let res = server.client.patch(&url).bearer_auth(&token).json(&Value::Null).send().await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["message"], "Patch document is missing");

    // The id cannot be patched
    let res = server
        .client
        .patch(&url)
        .bearer_auth(&token)
        .json(&json!([{"op": "replace", "path": "/id", "value": "00000000-0000-4000-8000-000000000002"}]))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    // A result the entity cannot hold is rejected and nothing changes
    let res = server
        .client
        .patch(&url)
        .bearer_auth(&token)
        .json(&json!([{"op": "replace", "path": "/stockQuantity", "value": "plenty"}]))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let record = server.client.get(&url).bearer_auth(&token).send().await?.json::<Value>().await?;
    assert_eq!(record["stockQuantity"], 5);

    // Patching a missing record
    let res = server
        .client
        .patch(server.url("/api/medication/00000000-0000-4000-8000-0000000000bb"))
        .bearer_auth(&token)
        .json(&json!([]))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn malformed_ids_and_bodies_are_bad_requests() -> Result<()> {
    let server = common::start_server().await?;
    let token = server.admin_token();

    let res = server
        .client
        .get(server.url("/api/medication/not-a-uuid"))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["error"], true);

    let res = server
        .client
        .post(server.url("/api/medication"))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{\"name\": ")
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(res.json::<Value>().await?["code"], "INVALID_JSON");

    // Well-formed JSON missing required fields
    let res = server
        .client
        .post(server.url("/api/medication"))
        .bearer_auth(&token)
        .json(&json!({"name": "Aspirin"}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn every_entity_route_is_served() -> Result<()> {
    let server = common::start_server().await?;
    for route in [
        "financesetting",
        "invoiceline",
        "medication",
        "notification",
        "patienthospitalisationhistory",
        "visitvitaltemplateparameter",
        "requisition",
    ] {
        let (status, rows) = server.list(route, &[]).await?;
        assert_eq!(status, StatusCode::OK, "GET /api/{}", route);
        assert_eq!(rows, json!([]), "GET /api/{}", route);
    }
    Ok(())
}
