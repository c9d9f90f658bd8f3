/// End-to-end booking workflow through the HTTP API
#[cfg(test)]
mod workflow_tests {
    use axum::http::StatusCode;
    use futures::FutureExt;
    use serde_json::{json, Value};
    use std::sync::Arc;
    use tempfile::tempdir;

    use crate::client::MockIntakeTransport;
    use crate::error::BookingError;
    use crate::models::booking::DispatchOutcome;
    use crate::services::submission_log::SubmissionLog;
    use crate::tests::common::fixtures::{
        create_form, create_test_server, create_test_state, fill_valid_form,
    };

    #[tokio::test]
    async fn test_health_endpoint() {
        let server = create_test_server(create_test_state(MockIntakeTransport::new(), None), false);

        let response = server.get("/health").await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.text(), "OK");
    }

    #[tokio::test]
    async fn test_complete_booking_workflow() {
        let dir = tempdir().unwrap();
        let csv_path = dir.path().join("submissions.csv");
        let ledger = Arc::new(SubmissionLog::new(csv_path.to_str().unwrap()).unwrap());

        let mut transport = MockIntakeTransport::new();
        transport.expect_dispatch().times(1).returning(|payload| {
            assert_eq!(payload.full_name, "Jo");
            assert_eq!(payload.service, "Vaccination");
            async { Ok(()) }.boxed()
        });

        let server =
            create_test_server(create_test_state(transport, Some(Arc::clone(&ledger))), false);

        // Step 1: open a form
        let form_id = create_form(&server).await;
        let snapshot: Value = server.get(&format!("/forms/{}", form_id)).await.json();
        assert_eq!(snapshot["state"], "idle");
        assert_eq!(snapshot["submitAttempted"], false);

        // Step 2: fill it in
        fill_valid_form(&server, &form_id).await;
        let response = server
            .put(&format!("/forms/{}/fields/service", form_id))
            .json(&json!({ "value": "Vaccination" }))
            .await;
        let snapshot: Value = response.json();
        assert_eq!(snapshot["request"]["service"], "Vaccination");
        assert_eq!(snapshot["request"]["petType"], "dog");

        // Step 3: submit
        let response = server.post(&format!("/forms/{}/submit", form_id)).await;
        assert_eq!(response.status_code(), StatusCode::ACCEPTED);

        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert!(body.get("errors").is_none());
        assert_eq!(body["form"]["state"], "submitted");
        assert_eq!(body["form"]["request"]["fullName"], Value::Null);

        // Step 4: the hand-off was recorded
        let records = ledger.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].outcome, DispatchOutcome::Delivered);

        let logged: Value = server.get("/admin/submissions").await.json();
        assert_eq!(logged.as_array().unwrap().len(), 1);
        assert_eq!(logged[0]["outcome"], "delivered");

        // Step 5: discard the form
        let response = server.delete(&format!("/forms/{}", form_id)).await;
        assert_eq!(response.status_code(), StatusCode::NO_CONTENT);

        let response = server.get(&format!("/forms/{}", form_id)).await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_invalid_submission_returns_field_errors() {
        let mut transport = MockIntakeTransport::new();
        transport.expect_dispatch().times(0);

        let server = create_test_server(create_test_state(transport, None), false);
        let form_id = create_form(&server).await;
        fill_valid_form(&server, &form_id).await;

        server
            .put(&format!("/forms/{}/fields/email", form_id))
            .json(&json!({ "value": "not-an-email" }))
            .await
            .assert_status_ok();

        let response = server.post(&format!("/forms/{}/submit", form_id)).await;
        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = response.json();
        assert_eq!(body["success"], false);
        assert_eq!(body["errors"]["email"], "Invalid email address");
        assert_eq!(body["errors"].as_object().unwrap().len(), 1);
        assert_eq!(body["form"]["state"], "idle");
        assert_eq!(body["form"]["submitAttempted"], true);

        // Correcting the field clears its error immediately
        let snapshot: Value = server
            .put(&format!("/forms/{}/fields/email", form_id))
            .json(&json!({ "value": "jo@x.com" }))
            .await
            .json();
        assert_eq!(snapshot["errors"], json!({}));
    }

    #[tokio::test]
    async fn test_transport_failure_still_confirms_booking() {
        let mut transport = MockIntakeTransport::new();
        transport.expect_dispatch().times(1).returning(|_| {
            async { Err(BookingError::Transport("connection reset".to_string())) }.boxed()
        });

        let server = create_test_server(create_test_state(transport, None), false);
        let form_id = create_form(&server).await;
        fill_valid_form(&server, &form_id).await;

        let response = server.post(&format!("/forms/{}/submit", form_id)).await;
        assert_eq!(response.status_code(), StatusCode::ACCEPTED);

        let body: Value = response.json();
        assert_eq!(body["success"], true);
        assert_eq!(body["form"]["state"], "submitted");
    }

    #[tokio::test]
    async fn test_unknown_field_and_form() {
        let server = create_test_server(create_test_state(MockIntakeTransport::new(), None), false);
        let form_id = create_form(&server).await;

        let response = server
            .put(&format!("/forms/{}/fields/petName", form_id))
            .json(&json!({ "value": "Rex" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);

        let response = server.post("/forms/does-not-exist/submit").await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reset_clears_form() {
        let server = create_test_server(create_test_state(MockIntakeTransport::new(), None), false);
        let form_id = create_form(&server).await;
        fill_valid_form(&server, &form_id).await;

        let snapshot: Value = server.post(&format!("/forms/{}/reset", form_id)).await.json();
        assert_eq!(snapshot["state"], "idle");
        assert_eq!(snapshot["request"]["fullName"], Value::Null);
    }

    #[tokio::test]
    async fn test_content_endpoints() {
        let server = create_test_server(create_test_state(MockIntakeTransport::new(), None), true);

        let categories: Vec<String> = server.get("/services/categories").await.json();
        assert_eq!(categories[0], "All");
        assert!(categories.contains(&"Preventive Care".to_string()));

        let preventive: Value = server
            .get("/services")
            .add_query_param("category", "Preventive Care")
            .await
            .json();
        let preventive = preventive.as_array().unwrap();
        assert!(!preventive.is_empty());
        assert!(preventive.iter().all(|s| s["category"] == "Preventive Care"));

        let all: Value = server.get("/services").await.json();
        assert!(all.as_array().unwrap().len() > preventive.len());

        let faq: Value = server.get("/faq").add_query_param("q", "EMERGENCY").await.json();
        assert!(!faq.as_array().unwrap().is_empty());

        let clinic: Value = server.get("/clinic").await.json();
        assert_eq!(clinic["name"], "Lifecare Pet Specialty Clinic");
    }

    #[tokio::test]
    async fn test_management_routes_hidden_in_production() {
        let server = create_test_server(create_test_state(MockIntakeTransport::new(), None), true);
        assert_eq!(
            server.get("/admin/forms").await.status_code(),
            StatusCode::NOT_FOUND
        );

        let server = create_test_server(create_test_state(MockIntakeTransport::new(), None), false);
        create_form(&server).await;
        let forms: Value = server.get("/admin/forms").await.json();
        assert_eq!(forms.as_array().unwrap().len(), 1);
        assert_eq!(forms[0]["state"], "idle");

        // No ledger configured
        assert_eq!(
            server.get("/admin/submissions").await.status_code(),
            StatusCode::NOT_FOUND
        );
    }
}
