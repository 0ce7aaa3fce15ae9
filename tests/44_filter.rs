mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::{json, Value};

// Seeds five medications and exercises the list surface: filters, search,
// sort and paging.
async fn seeded() -> Result<common::TestServer> {
    let server = common::start_server().await?;
    let rows = [
        ("Morphine", Some("morphine sulfate"), "10mg", "12.00", 5, true),
        ("aspirin", None, "300mg", "0.25", 120, true),
        ("Codeine", Some("codeine phosphate"), "30mg", "1.10", 0, false),
        ("Zinc", None, "50mg", "0.05", 300, true),
        ("Ibuprofen", Some("ibuprofen"), "400mg", "0.30", 60, true),
    ];
    for (name, generic, strength, price, stock, active) in rows {
        server
            .create(
                "medication",
                &json!({
                    "name": name,
                    "genericName": generic,
                    "strength": strength,
                    "form": "tablet",
                    "unitPrice": price,
                    "stockQuantity": stock,
                    "isActive": active
                }),
            )
            .await?;
    }
    Ok(server)
}

fn names(rows: &Value) -> Vec<String> {
    rows.as_array()
        .map(|a| a.iter().filter_map(|r| r["name"].as_str().map(str::to_string)).collect())
        .unwrap_or_default()
}

#[tokio::test]
async fn default_listing_returns_first_page_of_ten() -> Result<()> {
    let server = seeded().await?;
    let (status, rows) = server.list("medication", &[]).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.as_array().map(Vec::len), Some(5));
    Ok(())
}

#[tokio::test]
async fn filters_are_conjoined_and_typed() -> Result<()> {
    let server = seeded().await?;
    let filters = json!([
        {"PropertyName": "stockQuantity", "Operator": "GreaterThan", "Value": "10"},
        {"PropertyName": "isActive", "Operator": "Equal", "Value": true}
    ])
    .to_string();

    let (status, rows) = server
        .list("medication", &[("filters", &filters), ("sortField", "stockQuantity")])
        .await?;
    assert_eq!(status, StatusCode::OK, "{}", rows);
    assert_eq!(names(&rows), vec!["Ibuprofen", "aspirin", "Zinc"]);
    Ok(())
}

#[tokio::test]
async fn null_values_test_for_presence() -> Result<()> {
    let server = seeded().await?;
    let is_null = json!([{"PropertyName": "genericName", "Operator": "Equal", "Value": null}]).to_string();
    let not_null = json!([{"PropertyName": "genericName", "Operator": "NotEqual", "Value": null}]).to_string();

    let (_, rows) = server
        .list("medication", &[("filters", &is_null), ("sortField", "name")])
        .await?;
    assert_eq!(names(&rows), vec!["Zinc", "aspirin"]);

    let (_, rows) = server
        .list("medication", &[("filters", &not_null), ("sortField", "name")])
        .await?;
    assert_eq!(names(&rows), vec!["Codeine", "Ibuprofen", "Morphine"]);
    Ok(())
}

#[tokio::test]
async fn text_operators_ignore_case() -> Result<()> {
    let server = seeded().await?;
    let filters = json!([{"PropertyName": "name", "Operator": "StartsWith", "Value": "A"}]).to_string();
    let (_, rows) = server.list("medication", &[("filters", &filters)]).await?;
    assert_eq!(names(&rows), vec!["aspirin"]);

    // Equal on text is exact
    let filters = json!([{"PropertyName": "name", "Operator": "Equal", "Value": "Aspirin"}]).to_string();
    let (_, rows) = server.list("medication", &[("filters", &filters)]).await?;
    assert_eq!(rows, json!([]));
    Ok(())
}

#[tokio::test]
async fn search_term_matches_any_text_field() -> Result<()> {
    let server = seeded().await?;
    let (status, rows) = server
        .list("medication", &[("searchTerm", "PHOS"), ("sortField", "name")])
        .await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(names(&rows), vec!["Codeine"]);

    // Search and filters combine
    let filters = json!([{"PropertyName": "isActive", "Operator": "Equal", "Value": "true"}]).to_string();
    let (_, rows) = server
        .list("medication", &[("searchTerm", "in"), ("filters", &filters), ("sortField", "name")])
        .await?;
    assert_eq!(names(&rows), vec!["Morphine", "Zinc", "aspirin"]);
    Ok(())
}

#[tokio::test]
async fn sorting_and_paging_produce_disjoint_pages() -> Result<()> {
    let server = seeded().await?;
    let page = |n: &'static str| {
        vec![
            ("sortField", "unitPrice"),
            ("sortOrder", "DESC"),
            ("pageSize", "2"),
            ("pageNumber", n),
        ]
    };

    let (_, first) = server.list("medication", &page("1")).await?;
    let (_, second) = server.list("medication", &page("2")).await?;
    let (_, third) = server.list("medication", &page("3")).await?;
    let (_, fourth) = server.list("medication", &page("4")).await?;

    assert_eq!(names(&first), vec!["Morphine", "Codeine"]);
    assert_eq!(names(&second), vec!["Ibuprofen", "aspirin"]);
    assert_eq!(names(&third), vec!["Zinc"]);
    assert_eq!(fourth, json!([]));
    Ok(())
}

#[tokio::test]
async fn oversized_pages_are_capped() -> Result<()> {
    let server = seeded().await?;
    // test_config caps pages at 50; a larger request still succeeds
    let (status, rows) = server.list("medication", &[("pageSize", "5000")]).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(rows.as_array().map(Vec::len), Some(5));
    Ok(())
}

#[tokio::test]
async fn invalid_list_requests_are_bad_requests() -> Result<()> {
    let server = seeded().await?;

    let cases: Vec<(Vec<(&str, String)>, &str)> = vec![
        (vec![("pageSize", "0".into())], "BAD_REQUEST"),
        (vec![("pageNumber", "0".into())], "BAD_REQUEST"),
        (vec![("pageNumber", "abc".into())], "BAD_REQUEST"),
        (vec![("sortField", "shelf".into())], "BAD_REQUEST"),
        (vec![("sortField", "name".into()), ("sortOrder", "up".into())], "BAD_REQUEST"),
        (vec![("filters", "[{\"PropertyName\": ".into())], "INVALID_JSON"),
        (
            vec![("filters", json!([{"PropertyName": "shelf", "Operator": "Equal", "Value": "A"}]).to_string())],
            "BAD_REQUEST",
        ),
        (
            vec![(
                "filters",
                json!([{"PropertyName": "stockQuantity", "Operator": "Contains", "Value": "1"}]).to_string(),
            )],
            "BAD_REQUEST",
        ),
        (
            vec![(
                "filters",
                json!([{"PropertyName": "stockQuantity", "Operator": "Equal", "Value": "many"}]).to_string(),
            )],
            "BAD_REQUEST",
        ),
        (
            vec![("filters", json!([{"PropertyName": "name", "Operator": "Like", "Value": "A"}]).to_string())],
            "INVALID_JSON",
        ),
    ];

    for (query, code) in cases {
        let pairs: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let (status, body) = server.list("medication", &pairs).await?;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{:?} -> {}", pairs, body);
        assert_eq!(body["code"], code, "{:?} -> {}", pairs, body);
        assert_eq!(body["error"], true);
    }
    Ok(())
}
