//! Authorization and rejection paths through the HTTP router

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;
use uuid::Uuid;

use common::*;

#[tokio::test]
async fn test_missing_and_forged_tokens_are_unauthenticated() {
    let app = test_app();

    let (status, body) = call(&app, Method::GET, "/auth/profile", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "UNAUTHENTICATED");

    let forged = "ab".repeat(32);
    let (status, _) = get(&app, "/broker/deals", &forged).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_registration_rejections() {
    let app = test_app();
    sign_up(&app, "dup@brokerage.test", "broker").await;

    let register = |email: &str, role: &str| {
        json!({
            "email": email,
            "password": "correct horse battery",
            "name": "Someone",
            "role": role,
        })
    };

    let (status, body) = call(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(register("DUP@brokerage.test", "lender")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "DUPLICATE_IDENTITY");

    let (status, body) = call(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(register("new@brokerage.test", "admin")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_login_with_wrong_role_or_password_fails() {
    let app = test_app();
    sign_up(&app, "lena@lending.test", "lender").await;

    for (password, role) in [
        ("correct horse battery", "broker"),
        ("wrong password", "lender"),
    ] {
        let (status, body) = call(
            &app,
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "email": "lena@lending.test", "password": password, "role": role })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["code"], "AUTHENTICATION_FAILED");
    }
}

#[tokio::test]
async fn test_role_endpoints_reject_the_other_role() {
    let app = test_app();
    let (_, broker) = sign_up(&app, "bo@brokerage.test", "broker").await;
    let (_, lender) = sign_up(&app, "li@lending.test", "lender").await;

    assert_eq!(
        post(&app, "/broker/deals", &lender, residential_deal()).await.0,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        post(&app, "/lender/criteria", &broker, residential_criteria()).await.0,
        StatusCode::FORBIDDEN
    );
    assert_eq!(get(&app, "/lender/deals", &broker).await.0, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_brokers_only_see_their_own_deals() {
    let app = test_app();
    let (_, owner) = sign_up(&app, "owner@brokerage.test", "broker").await;
    let (_, other) = sign_up(&app, "other@brokerage.test", "broker").await;
    let deal_id = create_deal(&app, &owner).await;

    let (_, deals) = get(&app, "/broker/deals", &other).await;
    assert_eq!(deals, json!([]));

    let (status, body) = get(&app, &format!("/deals/{}/interests", deal_id), &other).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "ACCESS_DENIED");
}

#[tokio::test]
async fn test_unselected_lender_cannot_participate() {
    let app = test_app();
    let (_, broker) = sign_up(&app, "b@brokerage.test", "broker").await;
    let (chosen_id, chosen) = sign_up(&app, "chosen@lending.test", "lender").await;
    let (_, rival) = sign_up(&app, "rival@lending.test", "lender").await;
    let deal_id = create_deal(&app, &broker).await;

    express_interest(&app, &chosen, &deal_id).await;
    express_interest(&app, &rival, &deal_id).await;

    // Before selection nobody but the broker participates
    let messages_uri = format!("/deals/{}/messages", deal_id);
    assert_eq!(
        post(&app, &messages_uri, &chosen, json!({ "message": "hi" })).await.0,
        StatusCode::FORBIDDEN
    );

    post(
        &app,
        &format!("/deals/{}/select-lender", deal_id),
        &broker,
        json!({ "lender_id": chosen_id }),
    )
    .await;

    assert_eq!(
        post(&app, &messages_uri, &rival, json!({ "message": "hi" })).await.0,
        StatusCode::FORBIDDEN
    );
    assert_eq!(get(&app, &messages_uri, &rival).await.0, StatusCode::FORBIDDEN);
    assert_eq!(
        post(
            &app,
            &format!("/deals/{}/documents", deal_id),
            &rival,
            json!({ "filename": "x.txt", "content": "x", "content_type": "text/plain" }),
        )
        .await
        .0,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        get(&app, &format!("/deals/{}/documents", deal_id), &rival).await.0,
        StatusCode::FORBIDDEN
    );
    assert_eq!(
        post(&app, &format!("/deals/{}/complete", deal_id), &rival, json!({})).await.0,
        StatusCode::FORBIDDEN
    );

    assert_eq!(
        post(&app, &messages_uri, &chosen, json!({ "message": "hi" })).await.0,
        StatusCode::OK
    );
}

#[tokio::test]
async fn test_complete_before_selection_is_rejected() {
    let app = test_app();
    let (_, broker) = sign_up(&app, "c@brokerage.test", "broker").await;
    let (_, lender) = sign_up(&app, "c@lending.test", "lender").await;
    let deal_id = create_deal(&app, &broker).await;
    express_interest(&app, &lender, &deal_id).await;

    let complete_uri = format!("/deals/{}/complete", deal_id);
    assert_eq!(
        post(&app, &complete_uri, &lender, json!({})).await.0,
        StatusCode::FORBIDDEN
    );

    let (status, body) = post(&app, &complete_uri, &broker, json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "INVALID_STATE");

    let (_, deals) = get(&app, "/broker/deals", &broker).await;
    assert_eq!(deals[0]["status"], "pending");
}

#[tokio::test]
async fn test_selection_rules() {
    let app = test_app();
    let (_, broker) = sign_up(&app, "s@brokerage.test", "broker").await;
    let (lender_id, lender) = sign_up(&app, "s@lending.test", "lender").await;
    let (bystander_id, _) = sign_up(&app, "by@lending.test", "lender").await;
    let deal_id = create_deal(&app, &broker).await;
    let select_uri = format!("/deals/{}/select-lender", deal_id);

    // Missing lender id
    assert_eq!(
        post(&app, &select_uri, &broker, json!({})).await.0,
        StatusCode::BAD_REQUEST
    );

    // Lender never expressed interest
    express_interest(&app, &lender, &deal_id).await;
    assert_eq!(
        post(&app, &select_uri, &broker, json!({ "lender_id": bystander_id })).await.0,
        StatusCode::BAD_REQUEST
    );

    // Lenders cannot select
    assert_eq!(
        post(&app, &select_uri, &lender, json!({ "lender_id": lender_id })).await.0,
        StatusCode::FORBIDDEN
    );

    assert_eq!(
        post(&app, &select_uri, &broker, json!({ "lender_id": lender_id })).await.0,
        StatusCode::OK
    );

    // Selection happens once
    assert_eq!(
        post(&app, &select_uri, &broker, json!({ "lender_id": lender_id })).await.0,
        StatusCode::CONFLICT
    );
}

#[tokio::test]
async fn test_matched_lenders_counts_distinct_lenders() {
    let app = test_app();
    let (_, broker) = sign_up(&app, "m@brokerage.test", "broker").await;
    let (_, first) = sign_up(&app, "m1@lending.test", "lender").await;
    let (_, second) = sign_up(&app, "m2@lending.test", "lender").await;
    let deal_id = create_deal(&app, &broker).await;

    for token in [&first, &first, &second] {
        assert_eq!(express_interest(&app, token, &deal_id).await, StatusCode::OK);
    }

    let (_, interests) = get(&app, &format!("/deals/{}/interests", deal_id), &broker).await;
    assert_eq!(interests.as_array().unwrap().len(), 3);

    let (_, deals) = get(&app, "/broker/deals", &broker).await;
    assert_eq!(deals[0]["matched_lenders"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_lender_without_criteria_sees_no_deals() {
    let app = test_app();
    let (_, broker) = sign_up(&app, "n@brokerage.test", "broker").await;
    let (_, lender) = sign_up(&app, "n@lending.test", "lender").await;
    create_deal(&app, &broker).await;

    let (status, deals) = get(&app, "/lender/deals", &lender).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(deals, json!([]));
}

#[tokio::test]
async fn test_unknown_deal_is_not_found() {
    let app = test_app();
    let (_, broker) = sign_up(&app, "u@brokerage.test", "broker").await;
    let (_, lender) = sign_up(&app, "u@lending.test", "lender").await;
    let missing = Uuid::new_v4();

    let (status, body) = get(&app, &format!("/deals/{}/messages", missing), &broker).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    assert_eq!(
        express_interest(&app, &lender, &missing.to_string()).await,
        StatusCode::NOT_FOUND
    );
}

#[tokio::test]
async fn test_malformed_deal_id_is_not_found() {
    let app = test_app();
    let (_, broker) = sign_up(&app, "mal@brokerage.test", "broker").await;

    let (status, body) = get(&app, "/deals/not-a-deal/messages", &broker).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");

    let (status, body) = post(
        &app,
        "/deals/12345/complete",
        &broker,
        json!({}),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_invalid_bodies_are_rejected() {
    let app = test_app();
    let (_, broker) = sign_up(&app, "v@brokerage.test", "broker").await;
    let (_, lender) = sign_up(&app, "v@lending.test", "lender").await;

    let mut inverted = residential_criteria();
    inverted["min_amount"] = json!(600000.0);
    let (status, body) = post(&app, "/lender/criteria", &lender, inverted).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_INPUT");

    let deal_id = create_deal(&app, &broker).await;
    let (status, _) = post(
        &app,
        "/lender/interest",
        &lender,
        json!({ "deal_id": deal_id, "interest_type": "partial" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(
        &app,
        &format!("/deals/{}/messages", deal_id),
        &broker,
        json!({ "message": "" }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
