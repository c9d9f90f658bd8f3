#[cfg(test)]
mod api_tests {
    use axum::{
        extract::{Path, Query, State},
        http::StatusCode,
        Json,
    };
    use futures::FutureExt;

    use crate::client::MockIntakeTransport;
    use crate::handlers::api::{
        create_form, get_form, list_services, search_faqs, submit_form, update_field,
        REJECTED_MESSAGE, SUBMITTED_MESSAGE,
    };
    use crate::models::booking::{BookingField, SubmissionState};
    use crate::models::common::{CategoryParams, FieldUpdate, SearchParams};
    use crate::tests::common::fixtures::{create_test_state, valid_booking_fields};

    #[tokio::test]
    async fn test_create_form_returns_idle_snapshot() {
        let state = create_test_state(MockIntakeTransport::new(), None);

        let (status, Json(snapshot)) = create_form(State(state.clone())).await.unwrap();

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(snapshot.state, SubmissionState::Idle);
        assert!(snapshot.request.is_empty());
        assert!(state.sessions.get(&snapshot.id).is_ok());
    }

    #[tokio::test]
    async fn test_get_unknown_form_is_not_found() {
        let state = create_test_state(MockIntakeTransport::new(), None);

        let result = get_form(State(state), Path("missing".to_string())).await;
        assert_eq!(result.unwrap_err(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_field_rejects_unknown_field() {
        let state = create_test_state(MockIntakeTransport::new(), None);
        let (_, Json(snapshot)) = create_form(State(state.clone())).await.unwrap();

        let result = update_field(
            State(state),
            Path((snapshot.id, "favouriteToy".to_string())),
            Json(FieldUpdate {
                value: "Ball".to_string(),
            }),
        )
        .await;

        assert_eq!(result.unwrap_err(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_submit_form_handler() {
        let mut transport = MockIntakeTransport::new();
        transport
            .expect_dispatch()
            .times(1)
            .returning(|_| async { Ok(()) }.boxed());
        let state = create_test_state(transport, None);
        let (_, Json(snapshot)) = create_form(State(state.clone())).await.unwrap();

        // Submitting an empty form is rejected without dispatch
        let (status, Json(response)) = submit_form(State(state.clone()), Path(snapshot.id.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.message, REJECTED_MESSAGE);
        let errors = response.errors.unwrap();
        assert!(errors.contains(BookingField::FullName));
        assert!(!errors.contains(BookingField::Service));

        for (field, value) in valid_booking_fields() {
            let Json(updated) = update_field(
                State(state.clone()),
                Path((snapshot.id.clone(), field.to_string())),
                Json(FieldUpdate {
                    value: value.to_string(),
                }),
            )
            .await
            .unwrap();
            assert_eq!(updated.state, SubmissionState::Idle);
        }

        let (status, Json(response)) = submit_form(State(state.clone()), Path(snapshot.id.clone()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::ACCEPTED);
        assert!(response.success);
        assert_eq!(response.message, SUBMITTED_MESSAGE);
        assert_eq!(response.form.state, SubmissionState::Submitted);
    }

    #[tokio::test]
    async fn test_content_handlers() {
        let state = create_test_state(MockIntakeTransport::new(), None);

        let Json(surgical) = list_services(
            State(state.clone()),
            Query(CategoryParams {
                category: Some("Surgical Care".to_string()),
            }),
        )
        .await;
        assert_eq!(surgical.len(), 1);
        assert_eq!(surgical[0].id, "surgery");

        let Json(faq) = search_faqs(
            State(state),
            Query(SearchParams {
                q: "walk-ins".to_string(),
            }),
        )
        .await;
        assert_eq!(faq.len(), 1);
        assert_eq!(faq[0].category, "Appointments");
    }
}
