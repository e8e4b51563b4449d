mod common;

use common::TestApp;
use reqwest::StatusCode;
use serde_json::{json, Value};

// ── Health ──────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
    let app = common::spawn_app().await;

    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");

    common::cleanup(app).await;
}

// ── Projects ────────────────────────────────────────────────────

#[tokio::test]
async fn create_project_with_initial_version() {
    let app = common::spawn_app().await;

    let state = app
        .create_project(
            "Customer Portal",
            json!({
                "category": "Web",
                "fields": [
                    { "field": "status", "value": "In progress" },
                    { "field": "progress", "value": "40" },
                    { "field": "team_members", "value": "Alice, Bob" },
                    { "field": "not_a_field", "value": "ignored" }
                ],
                "custom_fields": [{ "name": "Sponsor", "value": "Operations" }]
            }),
        )
        .await;

    assert_eq!(state["project"]["name"], "Customer Portal");
    assert_eq!(state["project"]["category"], "Web");
    assert_eq!(state["current_version"]["version_number"], "V1.0.0");
    assert_eq!(state["current_version"]["parent_id"], Value::Null);
    assert_eq!(state["attributes"]["status"], "In progress");
    assert_eq!(state["attributes"]["progress"], 40);
    assert_eq!(state["attributes"]["team"], json!(["Alice", "Bob"]));
    assert_eq!(state["suggested_next_version"], "V1.0.0");

    let id = TestApp::project_id(&state);
    let (body, status) = app.get(&format!("/api/v1/projects/{id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["custom_fields"].as_array().unwrap().len(), 1);
    assert_eq!(body["custom_fields"][0]["name"], "Sponsor");
    assert!(body["documents"].as_array().unwrap().is_empty());

    common::cleanup(app).await;
}

#[tokio::test]
async fn create_project_rejects_bad_names() {
    let app = common::spawn_app().await;

    let (_, status) = app.post("/api/v1/projects", &json!({ "name": "   " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let long = "x".repeat(101);
    let (_, status) = app.post("/api/v1/projects", &json!({ "name": long })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (body, status) = app
        .post(
            "/api/v1/projects",
            &json!({ "name": "Dated", "fields": [{ "field": "deadline", "value": "31/12/2024" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("deadline"));

    // Nothing was half-written.
    let (list, _) = app.get("/api/v1/projects").await;
    assert!(list.as_array().unwrap().is_empty());

    common::cleanup(app).await;
}

#[tokio::test]
async fn list_and_update_projects() {
    let app = common::spawn_app().await;

    let a = app.create_project("Alpha", json!({})).await;
    app.create_project("Beta", json!({ "category": "Data" })).await;

    let (list, status) = app.get("/api/v1/projects").await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["project"]["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alpha", "Beta"]);

    let id = TestApp::project_id(&a);
    let (updated, status) = app
        .put(
            &format!("/api/v1/projects/{id}"),
            &json!({
                "name": "Alpha Prime",
                "category": "Infra",
                "version_number": "V1.0.1",
                "fields": [{ "field": "phase", "value": "Build" }]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["project"]["name"], "Alpha Prime");
    assert_eq!(updated["current_version"]["version_number"], "V1.0.1");
    assert_eq!(updated["attributes"]["phase"], "Build");

    common::cleanup(app).await;
}

#[tokio::test]
async fn unknown_project_is_not_found() {
    let app = common::spawn_app().await;
    let missing = uuid::Uuid::now_v7();

    let (body, status) = app.get(&format!("/api/v1/projects/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Project not found");

    let (_, status) = app.delete(&format!("/api/v1/projects/{missing}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

#[tokio::test]
async fn delete_project_removes_everything() {
    let app = common::spawn_app().await;
    let state = app.create_project("Doomed", json!({})).await;
    let id = TestApp::project_id(&state);
    let version_id = TestApp::version_id(&state);

    let (_, status) = app
        .post(&format!("/api/v1/versions/{version_id}/requests"), &json!({ "requester": "Ann" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, status) = app.delete(&format!("/api/v1/projects/{id}")).await;
    assert_eq!(status, StatusCode::OK);

    let (_, status) = app.get(&format!("/api/v1/projects/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (_, status) = app.get(&format!("/api/v1/versions/{version_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (requests, _) = app.get("/api/v1/requests").await;
    assert!(requests["requests"].as_array().unwrap().is_empty());

    common::cleanup(app).await;
}

// ── Status & phase ──────────────────────────────────────────────

#[tokio::test]
async fn status_and_phase_are_validated() {
    let app = common::spawn_app().await;
    let state = app.create_project("Vocab", json!({})).await;
    let id = TestApp::project_id(&state);

    let (body, status) = app
        .post(&format!("/api/v1/projects/{id}/status"), &json!({ "status": "Review" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);

    let (_, status) = app
        .post(&format!("/api/v1/projects/{id}/status"), &json!({ "status": "Finished" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, status) = app
        .post(&format!("/api/v1/projects/{id}/phase"), &json!({ "phase": "Test & QA" }))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, status) = app
        .post(&format!("/api/v1/projects/{id}/phase"), &json!({ "phase": "Development" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (body, _) = app.get(&format!("/api/v1/projects/{id}")).await;
    assert_eq!(body["attributes"]["status"], "Review");
    assert_eq!(body["attributes"]["phase"], "Test & QA");

    common::cleanup(app).await;
}

#[tokio::test]
async fn status_without_version_is_not_found() {
    let app = common::spawn_app().await;
    let bare = projtrack::db::projects::create(&app.pool, "Bare", None)
        .await
        .unwrap();

    let (body, status) = app.get(&format!("/api/v1/projects/{}", bare.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["current_version"], Value::Null);
    assert_eq!(body["attributes"]["status"], "Not started");
    assert_eq!(body["attributes"]["phase"], "Intake");
    assert_eq!(body["attributes"]["progress"], 0);

    let (_, status) = app
        .post(&format!("/api/v1/projects/{}/status", bare.id), &json!({ "status": "Done" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

// ── Versions ────────────────────────────────────────────────────

#[tokio::test]
async fn new_version_uses_suggested_label_and_becomes_current() {
    let app = common::spawn_app().await;
    let state = app
        .create_project(
            "Lineage",
            json!({
                "fields": [
                    { "field": "status", "value": "In progress" },
                    { "field": "improvement_type", "value": "Minor" },
                    { "field": "requester", "value": "Sales" },
                    { "field": "whats_new", "value": "First cut" },
                    { "field": "cost", "value": "1200" }
                ]
            }),
        )
        .await;
    let id = TestApp::project_id(&state);
    let first = TestApp::version_id(&state);
    assert_eq!(state["suggested_next_version"], "V1.1.0");

    // No body at all.
    let resp = app
        .client
        .post(app.url(&format!("/api/v1/projects/{id}/versions")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let created: Value = resp.json().await.unwrap();
    assert_eq!(created["version_number"], "V1.1.0");
    assert_eq!(created["parent_id"], first.as_str());
    assert_eq!(created["status"], "In progress");
    assert_eq!(created["cost"], 1200.0);
    assert_eq!(created["improvement_type"], "Not decided");
    assert_eq!(created["priority_level"], "Medium");
    assert_eq!(created["requester"], Value::Null);
    assert_eq!(created["whats_new"], Value::Null);

    let (body, _) = app.get(&format!("/api/v1/projects/{id}")).await;
    assert_eq!(body["current_version"]["id"], created["id"]);
    assert_eq!(body["suggested_next_version"], "V1.1.0");

    let (versions, status) = app.get(&format!("/api/v1/projects/{id}/versions")).await;
    assert_eq!(status, StatusCode::OK);
    let labels: Vec<&str> = versions
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["version_number"].as_str().unwrap())
        .collect();
    assert_eq!(labels, vec!["V1.1.0", "V1.0.0"]);

    common::cleanup(app).await;
}

#[tokio::test]
async fn new_version_with_explicit_label() {
    let app = common::spawn_app().await;
    let state = app.create_project("Labels", json!({})).await;
    let id = TestApp::project_id(&state);

    let (created, status) = app
        .post(&format!("/api/v1/projects/{id}/versions"), &json!({ "version_number": "V3.0.0" }))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["version_number"], "V3.0.0");

    let (_, status) = app
        .post(
            &format!("/api/v1/projects/{id}/versions"),
            &json!({ "version_number": "V".repeat(21) }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    common::cleanup(app).await;
}

#[tokio::test]
async fn deleting_versions() {
    let app = common::spawn_app().await;
    let state = app.create_project("Versions", json!({})).await;
    let id = TestApp::project_id(&state);
    let first = TestApp::version_id(&state);

    // Last version cannot go.
    let (_, status) = app
        .delete(&format!("/api/v1/projects/{id}/versions/{first}"))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (second, _) = app
        .post(&format!("/api/v1/projects/{id}/versions"), &json!({ "version_number": "V2.0.0" }))
        .await;
    let second_id = second["id"].as_str().unwrap();

    // Version of another project.
    let other = app.create_project("Other", json!({})).await;
    let other_id = TestApp::project_id(&other);
    let (_, status) = app
        .delete(&format!("/api/v1/projects/{other_id}/versions/{second_id}"))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, status) = app
        .delete(&format!("/api/v1/projects/{id}/versions/{second_id}"))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (body, _) = app.get(&format!("/api/v1/projects/{id}")).await;
    assert_eq!(body["current_version"]["id"], first.as_str());

    common::cleanup(app).await;
}

#[tokio::test]
async fn deleting_a_parent_keeps_the_child() {
    let app = common::spawn_app().await;
    let state = app.create_project("Orphans", json!({})).await;
    let id = TestApp::project_id(&state);
    let first = TestApp::version_id(&state);

    let (child, _) = app
        .post(&format!("/api/v1/projects/{id}/versions"), &json!({}))
        .await;
    let (_, status) = app
        .delete(&format!("/api/v1/projects/{id}/versions/{first}"))
        .await;
    assert_eq!(status, StatusCode::OK);

    let child_id = child["id"].as_str().unwrap();
    let (child, status) = app.get(&format!("/api/v1/versions/{child_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(child["parent_id"], Value::Null);

    common::cleanup(app).await;
}

// ── Inline field edits ──────────────────────────────────────────

#[tokio::test]
async fn single_field_edits() {
    let app = common::spawn_app().await;
    let state = app.create_project("Inline", json!({})).await;
    let version_id = TestApp::version_id(&state);
    let path = format!("/api/v1/versions/{version_id}/field");

    let (_, status) = app.post(&path, &json!({ "field": "hosting", "value": "Cloud" })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, status) = app.post(&path, &json!({ "field": "cost", "value": "not money" })).await;
    assert_eq!(status, StatusCode::OK);

    let (body, status) = app.post(&path, &json!({ "field": "version_number", "value": "V9" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Field version_number not editable");

    let (_, status) = app.post(&path, &json!({ "field": "deadline", "value": "tomorrow" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, status) = app.post(&path, &json!({ "field": "", "value": "x" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (version, _) = app.get(&format!("/api/v1/versions/{version_id}")).await;
    assert_eq!(version["hosting"], "Cloud");
    assert_eq!(version["cost"], 0.0);
    assert_eq!(version["deadline"], Value::Null);

    let missing = uuid::Uuid::now_v7();
    let (_, status) = app
        .post(
            &format!("/api/v1/versions/{missing}/field"),
            &json!({ "field": "hosting", "value": "Cloud" }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

#[tokio::test]
async fn batch_edits_and_schedule() {
    let app = common::spawn_app().await;
    let state = app.create_project("Schedule", json!({})).await;
    let version_id = TestApp::version_id(&state);

    let (body, status) = app
        .post(
            &format!("/api/v1/versions/{version_id}/fields"),
            &json!({
                "updates": [
                    { "field": "start_date", "value": "2024-01-01" },
                    { "field": "duration_days", "value": "5" },
                    { "field": "bogus", "value": "skipped" }
                ]
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["applied"], 2);

    let (schedule, status) = app.get(&format!("/api/v1/versions/{version_id}/schedule")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(schedule["theoretical_end_date"], "2024-01-05");
    assert_eq!(schedule["display_start"], "2024-01-01");
    assert_eq!(schedule["display_end"], "2024-01-05");

    // A pause over Tuesday and Wednesday moves the end two working days.
    app.post(
        &format!("/api/v1/versions/{version_id}/fields"),
        &json!({
            "updates": [
                { "field": "pause_start", "value": "2024-01-02" },
                { "field": "pause_end", "value": "2024-01-03" }
            ]
        }),
    )
    .await;
    let (schedule, _) = app.get(&format!("/api/v1/versions/{version_id}/schedule")).await;
    assert_eq!(schedule["theoretical_end_date"], "2024-01-09");

    let (project, _) = app
        .get(&format!("/api/v1/projects/{}", TestApp::project_id(&state)))
        .await;
    assert_eq!(project["attributes"]["theoretical_end_date"], "2024-01-09");

    let (_, status) = app
        .post(&format!("/api/v1/versions/{version_id}/fields"), &json!({ "updates": [] }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    common::cleanup(app).await;
}

// ── Context requests ────────────────────────────────────────────

#[tokio::test]
async fn context_request_lifecycle() {
    let app = common::spawn_app().await;
    let state = app.create_project("Requests", json!({})).await;
    let version_id = TestApp::version_id(&state);

    let (created, status) = app
        .post(
            &format!("/api/v1/versions/{version_id}/requests"),
            &json!({
                "requester": "Nina",
                "requester_role": "Support",
                "description": "Bulk export",
                "user_request_type": "Export, Reporting",
                "priority_level": "High"
            }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["success"], true);
    let request_id = created["id"].as_str().unwrap().to_string();

    let (request, status) = app.get(&format!("/api/v1/requests/{request_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(request["priority_level"], "High");
    assert_eq!(request["difficulty_level"], "Not decided");
    assert_eq!(request["approved"], "Pending");

    let (_, status) = app
        .put(
            &format!("/api/v1/requests/{request_id}"),
            &json!({ "field": "approved", "value": "Maybe" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, status) = app
        .put(
            &format!("/api/v1/requests/{request_id}"),
            &json!({ "field": "approved", "value": "Approved" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, status) = app
        .put(
            &format!("/api/v1/requests/{request_id}"),
            &json!({ "difficulty_level": "Hard", "description": "Bulk CSV export", "unknown": 1 }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (request, _) = app.get(&format!("/api/v1/requests/{request_id}")).await;
    assert_eq!(request["approved"], "Approved");
    assert_eq!(request["difficulty_level"], "Hard");
    assert_eq!(request["description"], "Bulk CSV export");

    let (_, status) = app.delete(&format!("/api/v1/requests/{request_id}")).await;
    assert_eq!(status, StatusCode::OK);
    let (_, status) = app.get(&format!("/api/v1/requests/{request_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

#[tokio::test]
async fn request_creation_validates_input() {
    let app = common::spawn_app().await;
    let state = app.create_project("Checks", json!({})).await;
    let version_id = TestApp::version_id(&state);

    let (_, status) = app
        .post(
            &format!("/api/v1/versions/{version_id}/requests"),
            &json!({ "approved": "Perhaps" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let missing = uuid::Uuid::now_v7();
    let (_, status) = app
        .post(&format!("/api/v1/versions/{missing}/requests"), &json!({}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

#[tokio::test]
async fn request_listing_filters_and_stats() {
    let app = common::spawn_app().await;
    let a = app.create_project("Alpha", json!({})).await;
    let b = app.create_project("Beta", json!({})).await;
    let a_version = TestApp::version_id(&a);
    let b_version = TestApp::version_id(&b);

    for (version, body) in [
        (&a_version, json!({ "priority_level": "High", "requester_role": "Sales", "tech_request_type": "API" })),
        (&a_version, json!({ "priority_level": "Low", "difficulty_level": "Easy" })),
        (&b_version, json!({ "priority_level": "High", "user_request_type": "Mobile, API" })),
    ] {
        let (_, status) = app
            .post(&format!("/api/v1/versions/{version}/requests"), &body)
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (all, status) = app.get("/api/v1/requests").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(all["requests"].as_array().unwrap().len(), 3);
    assert_eq!(all["stats"]["total_requests"], 3);
    assert_eq!(all["stats"]["priority"]["High"], 2);
    assert_eq!(all["stats"]["priority"]["Low"], 1);
    assert_eq!(all["stats"]["approval"]["Pending"], 3);

    let (high, _) = app.get("/api/v1/requests?priority=High&difficulty=all").await;
    assert_eq!(high["requests"].as_array().unwrap().len(), 2);

    let (by_project, _) = app
        .get(&format!("/api/v1/requests?project_id={}", TestApp::project_id(&a)))
        .await;
    let rows = by_project["requests"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r["project_name"] == "Alpha"));
    assert!(rows.iter().all(|r| r["version_number"] == "V1.0.0"));

    let (api, _) = app.get("/api/v1/requests?type=API").await;
    assert_eq!(api["requests"].as_array().unwrap().len(), 2);

    let (sales, _) = app.get("/api/v1/requests?role=Sales").await;
    assert_eq!(sales["requests"].as_array().unwrap().len(), 1);

    let (newest, _) = app.get("/api/v1/requests").await;
    let (oldest, _) = app.get("/api/v1/requests?sort=oldest").await;
    assert_eq!(
        newest["requests"][0]["id"],
        oldest["requests"][2]["id"],
        "sort order should flip"
    );

    common::cleanup(app).await;
}

// ── Custom fields & documents ───────────────────────────────────

#[tokio::test]
async fn custom_fields_add_and_delete() {
    let app = common::spawn_app().await;
    let state = app.create_project("Custom", json!({})).await;
    let id = TestApp::project_id(&state);
    let path = format!("/api/v1/projects/{id}/custom-fields");

    let (_, status) = app.post(&path, &json!({ "name": "Budget owner", "value": "Finance" })).await;
    assert_eq!(status, StatusCode::OK);

    let (_, status) = app.post(&path, &json!({ "name": "", "value": "Finance" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (fields, _) = app.get(&path).await;
    let fields = fields.as_array().unwrap();
    assert_eq!(fields.len(), 1);
    let field_id = fields[0]["id"].as_str().unwrap();

    let (body, status) = app.delete(&format!("/api/v1/custom-fields/{field_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["project_id"], id.as_str());

    let (_, status) = app.delete(&format!("/api/v1/custom-fields/{field_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

#[tokio::test]
async fn documents_upload_download_delete() {
    let app = common::spawn_app().await;
    let state = app.create_project("Docs", json!({})).await;
    let id = TestApp::project_id(&state);

    let form = reqwest::multipart::Form::new()
        .text("name", "Kickoff notes")
        .part(
            "file",
            reqwest::multipart::Part::bytes(b"agenda".to_vec()).file_name("kickoff notes.txt"),
        );
    let resp = app
        .client
        .post(app.url(&format!("/api/v1/projects/{id}/documents")))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let document: Value = resp.json().await.unwrap();
    assert_eq!(document["name"], "Kickoff notes");
    let filename = document["filename"].as_str().unwrap().to_string();
    assert!(filename.ends_with("_kickoff_notes.txt"));
    assert!(app.upload_dir.path().join(&filename).exists());

    let document_id = document["id"].as_str().unwrap();
    let resp = app
        .client
        .get(app.url(&format!("/api/v1/documents/{document_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()["content-type"].to_str().unwrap(),
        "text/plain; charset=utf-8"
    );
    assert!(resp.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .starts_with("inline;"));
    assert_eq!(resp.headers()["content-security-policy"], "sandbox");
    assert_eq!(resp.bytes().await.unwrap().as_ref(), b"agenda");

    let (_, status) = app.delete(&format!("/api/v1/documents/{document_id}")).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!app.upload_dir.path().join(&filename).exists());

    let (_, status) = app.get(&format!("/api/v1/documents/{document_id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    common::cleanup(app).await;
}

#[tokio::test]
async fn upload_without_file_is_rejected() {
    let app = common::spawn_app().await;
    let state = app.create_project("Empty upload", json!({})).await;
    let id = TestApp::project_id(&state);

    let form = reqwest::multipart::Form::new().text("name", "Nothing");
    let resp = app
        .client
        .post(app.url(&format!("/api/v1/projects/{id}/documents")))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    common::cleanup(app).await;
}

#[tokio::test]
async fn svg_documents_download_as_attachments() {
    let app = common::spawn_app().await;
    let state = app.create_project("Vector docs", json!({})).await;
    let id = TestApp::project_id(&state);

    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(b"<svg onload=\"alert(1)\"/>".to_vec())
            .file_name("diagram.svg"),
    );
    let resp = app
        .client
        .post(app.url(&format!("/api/v1/projects/{id}/documents")))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let document: Value = resp.json().await.unwrap();
    let document_id = document["id"].as_str().unwrap();

    let resp = app
        .client
        .get(app.url(&format!("/api/v1/documents/{document_id}")))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .starts_with("attachment;"));
    assert_eq!(resp.headers()["content-security-policy"], "sandbox");

    common::cleanup(app).await;
}

#[tokio::test]
async fn long_upload_names_are_shortened() {
    let app = common::spawn_app().await;
    let state = app.create_project("Long names", json!({})).await;
    let id = TestApp::project_id(&state);

    let original = format!("{}.pdf", "quarterly_report_".repeat(12));
    let form = reqwest::multipart::Form::new()
        .part("file", reqwest::multipart::Part::bytes(b"%PDF".to_vec()).file_name(original));
    let resp = app
        .client
        .post(app.url(&format!("/api/v1/projects/{id}/documents")))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let document: Value = resp.json().await.unwrap();
    let filename = document["filename"].as_str().unwrap();
    assert!(filename.len() <= 200);
    assert!(filename.ends_with(".pdf"));
    assert!(app.upload_dir.path().join(filename).exists());
    assert_eq!(std::fs::read_dir(app.upload_dir.path()).unwrap().count(), 1);

    common::cleanup(app).await;
}

#[tokio::test]
async fn oversized_upload_rejected() {
    let app = common::spawn_app().await;
    let state = app.create_project("Big upload", json!({})).await;
    let id = TestApp::project_id(&state);

    // Just over the 1 MiB test limit, still inside the request body allowance.
    let form = reqwest::multipart::Form::new().part(
        "file",
        reqwest::multipart::Part::bytes(vec![b'x'; 1_048_576 + 1]).file_name("big.bin"),
    );
    let resp = app
        .client
        .post(app.url(&format!("/api/v1/projects/{id}/documents")))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(std::fs::read_dir(app.upload_dir.path()).unwrap().count(), 0);

    common::cleanup(app).await;
}

// ── HTML views ──────────────────────────────────────────────────

#[tokio::test]
async fn pages_render() {
    let app = common::spawn_app().await;
    let state = app
        .create_project(
            "Rendered Project",
            json!({ "fields": [{ "field": "start_date", "value": "2024-01-01" }] }),
        )
        .await;
    let id = TestApp::project_id(&state);

    for path in [
        "/".to_string(),
        "/projects".to_string(),
        "/projects/new".to_string(),
        format!("/projects/{id}"),
        format!("/projects/{id}/edit"),
        "/requests".to_string(),
        "/stats".to_string(),
        "/gantt".to_string(),
    ] {
        let resp = app.client.get(app.url(&path)).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{path}");
        let html = resp.text().await.unwrap();
        assert!(html.contains("<html"), "{path} should render a page");
    }

    let html = app.client.get(app.url("/")).send().await.unwrap().text().await.unwrap();
    assert!(html.contains("Rendered Project"));

    common::cleanup(app).await;
}

#[tokio::test]
async fn form_posts_redirect_with_flash() {
    let app = common::spawn_app().await;

    let resp = app
        .post_form(
            "/projects/new",
            &[
                ("name", "From the form"),
                ("category", "Web"),
                ("version_number", "V0.1.0"),
                ("status", "In progress"),
                ("custom_field_name[]", "Owner"),
                ("custom_field_value[]", "Maya"),
                ("custom_field_name[]", ""),
                ("custom_field_value[]", ""),
            ],
        )
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/projects");
    let cookie = resp.headers()["set-cookie"].to_str().unwrap().to_string();
    assert!(cookie.starts_with("flash="));

    let (list, _) = app.get("/api/v1/projects").await;
    let project = &list[0];
    assert_eq!(project["project"]["name"], "From the form");
    assert_eq!(project["current_version"]["version_number"], "V0.1.0");
    assert_eq!(project["attributes"]["status"], "In progress");

    let id = TestApp::project_id(project);
    let (detail, _) = app.get(&format!("/api/v1/projects/{id}")).await;
    assert_eq!(detail["custom_fields"].as_array().unwrap().len(), 1);

    // Invalid input goes back to the form with an error.
    let resp = app.post_form("/projects/new", &[("name", "")]).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers()["location"], "/projects/new");

    // Deleting the only version is refused and reported.
    let version_id = TestApp::version_id(project);
    let resp = app
        .post_form(&format!("/projects/{id}/versions/{version_id}/delete"), &[])
        .await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    let flash_cookie = resp.headers()["set-cookie"].to_str().unwrap().to_string();
    let page = app
        .client
        .get(app.url(&format!("/projects/{id}")))
        .header("cookie", flash_cookie.split(';').next().unwrap())
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(page.contains("Cannot delete the last version"));

    common::cleanup(app).await;
}
