use serde_json::{json, Value};

use crate::helpers::TestApp;

async fn json_body(response: reqwest::Response) -> Value {
    response
        .json()
        .await
        .expect("Response body is not valid JSON.")
}

#[tokio::test]
async fn create_returns_the_stored_entry() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app.create_email("a@x.com").await;

    assert_eq!(200, response.status().as_u16());
    let body = json_body(response).await;
    assert_eq!(body["Email"], "a@x.com");
    assert_eq!(body["ConfirmedAt"], 0);
    assert_eq!(body["OptOut"], false);
    assert!(body["Id"].as_i64().unwrap() > 0);
}

#[tokio::test]
async fn create_persists_the_new_subscriber() {
    let test_app = TestApp::spawn_app().await;

    test_app.create_email("a@x.com").await;

    let stored = test_app
        .store
        .get("a@x.com")
        .await
        .expect("Query to fetch the subscriber failed.")
        .expect("The subscriber was not stored.");
    assert_eq!(stored.email, "a@x.com");
    assert!(!stored.opt_out);
}

#[tokio::test]
async fn create_of_an_existing_email_returns_400_with_an_error_envelope() {
    let test_app = TestApp::spawn_app().await;
    test_app.create_email("a@x.com").await;

    let response = test_app.create_email("a@x.com").await;

    assert_eq!(400, response.status().as_u16());
    let body = json_body(response).await;
    assert!(body["Err"].as_str().unwrap().contains("a@x.com"));
}

#[tokio::test]
async fn create_returns_400_when_email_is_not_valid() {
    let test_app = TestApp::spawn_app().await;

    // This is a common practice and it is called table-driven tests. In this case, it simulates different kind of possible request bodies
    // where API should return 400.
    let test_cases = vec![
        (json!({}), "missing email"),
        (json!({ "Email": "" }), "empty email"),
        (json!({ "Email": "ax.com" }), "email without @"),
        (json!({ "Email": "@x.com" }), "email without subject"),
    ];

    for (invalid_body, error_message) in test_cases {
        let response = test_app
            .send(reqwest::Method::POST, "/email/create", invalid_body)
            .await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status when payload was {}",
            error_message
        );
        assert!(json_body(response).await["Err"].is_string());
    }
    assert!(test_app.store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn malformed_json_returns_400() {
    let test_app = TestApp::spawn_app().await;

    let response = reqwest::Client::new()
        .post(&format!("{}/email/create", test_app.address))
        .header("Content-Type", "application/json")
        .body("{\"Email\": ")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(400, response.status().as_u16());
    assert!(json_body(response).await["Err"].is_string());
}

#[tokio::test]
async fn get_of_an_absent_email_returns_404_with_an_error_envelope() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app.get_email("absent@x.com").await;

    assert_eq!(404, response.status().as_u16());
    assert!(json_body(response).await["Err"].is_string());
}

#[tokio::test]
async fn get_accepts_the_email_in_the_query_string() {
    let test_app = TestApp::spawn_app().await;
    test_app.create_email("a@x.com").await;

    let response = reqwest::Client::new()
        .get(&format!("{}/email/get?Email=a@x.com", test_app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    assert_eq!(json_body(response).await["Email"], "a@x.com");
}

#[tokio::test]
async fn update_returns_the_entry_as_stored() {
    let test_app = TestApp::spawn_app().await;
    let created = json_body(test_app.create_email("a@x.com").await).await;

    let response = test_app
        .update_email(json!({
            "Id": 999,
            "Email": "a@x.com",
            "ConfirmedAt": 1_700_000_000,
            "OptOut": false
        }))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body = json_body(response).await;
    assert_eq!(body["Id"], created["Id"]);
    assert_eq!(body["ConfirmedAt"], 1_700_000_000);
    assert_eq!(body["OptOut"], false);

    let fetched = json_body(test_app.get_email("a@x.com").await).await;
    assert_eq!(fetched, body);
}

#[tokio::test]
async fn update_inserts_an_unknown_email() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app
        .update_email(json!({
            "Email": "new@x.com",
            "ConfirmedAt": 1_650_000_000,
            "OptOut": true
        }))
        .await;

    assert_eq!(200, response.status().as_u16());
    let body = json_body(response).await;
    assert_eq!(body["Email"], "new@x.com");
    assert_eq!(body["OptOut"], true);
}

#[tokio::test]
async fn delete_opts_out_without_removing_the_subscriber() {
    let test_app = TestApp::spawn_app().await;
    test_app.create_email("a@x.com").await;
    test_app.create_email("b@x.com").await;

    let response = test_app.delete_email("a@x.com").await;

    assert_eq!(200, response.status().as_u16());
    assert_eq!(json_body(response).await["OptOut"], true);

    let batch = json_body(test_app.get_email_batch(1, 10).await).await;
    let emails: Vec<&str> = batch
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["Email"].as_str().unwrap())
        .collect();
    assert_eq!(emails, vec!["b@x.com"]);

    let fetched = json_body(test_app.get_email("a@x.com").await).await;
    assert_eq!(fetched["OptOut"], true);
    assert_eq!(400, test_app.create_email("a@x.com").await.status().as_u16());
}

#[tokio::test]
async fn delete_of_an_absent_email_returns_404() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app.delete_email("absent@x.com").await;

    assert_eq!(404, response.status().as_u16());
    assert!(test_app.store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn get_batch_returns_400_when_page_or_count_is_not_positive() {
    let test_app = TestApp::spawn_app().await;
    test_app.create_email("a@x.com").await;

    let test_cases = vec![(0, 10), (1, 0), (-1, 10), (1, -10)];

    for (page, count) in test_cases {
        let response = test_app.get_email_batch(page, count).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 status for page {} and count {}",
            page,
            count
        );
        assert!(json_body(response).await["Err"].is_string());
    }
}

#[tokio::test]
async fn get_batch_pages_through_subscribers_in_creation_order() {
    let test_app = TestApp::spawn_app().await;
    let emails: Vec<String> = (0..5).map(|i| format!("user{}@x.com", i)).collect();
    for email in &emails {
        test_app.create_email(email).await;
    }

    let mut paged = Vec::new();
    for page in 1..=3 {
        let batch = json_body(test_app.get_email_batch(page, 2).await).await;
        let batch = batch.as_array().unwrap().clone();
        assert!(batch.len() <= 2);
        paged.extend(
            batch
                .iter()
                .map(|entry| entry["Email"].as_str().unwrap().to_string()),
        );
    }

    assert_eq!(paged, emails);
}

#[tokio::test]
async fn get_batch_accepts_the_query_string() {
    let test_app = TestApp::spawn_app().await;
    test_app.create_email("a@x.com").await;
    test_app.create_email("b@x.com").await;

    let response = reqwest::Client::new()
        .get(&format!("{}/email/get_batch?Page=2&Count=1", test_app.address))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(200, response.status().as_u16());
    let batch = json_body(response).await;
    assert_eq!(batch.as_array().unwrap().len(), 1);
    assert_eq!(batch[0]["Email"], "b@x.com");
}

#[tokio::test]
async fn get_all_includes_opted_out_subscribers() {
    let test_app = TestApp::spawn_app().await;
    test_app.create_email("a@x.com").await;
    test_app.create_email("b@x.com").await;
    test_app.delete_email("a@x.com").await;

    let response = test_app.get_all_rows().await;

    assert_eq!(200, response.status().as_u16());
    let rows = json_body(response).await;
    let rows = rows.as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["Email"], "a@x.com");
    assert_eq!(rows[0]["OptOut"], true);
    assert_eq!(rows[1]["OptOut"], false);
}

#[tokio::test]
async fn wrong_method_is_not_routed() {
    let test_app = TestApp::spawn_app().await;

    let response = test_app
        .send(
            reqwest::Method::GET,
            "/email/create",
            json!({ "Email": "a@x.com" }),
        )
        .await;

    assert!(response.status().is_client_error());
    assert!(test_app.store.list_all().await.unwrap().is_empty());
}
