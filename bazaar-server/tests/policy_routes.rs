use axum::http::StatusCode;
use serde_json::json;

use bazaar_core::api::routes::v1;

#[path = "support/mod.rs"]
mod support;
use support::{PASSWORD, bearer, build_test_app};

#[tokio::test]
async fn policy_routes_require_a_bearer_token() {
    let app = build_test_app();

    app.server
        .post(v1::policy::CUSTOMER)
        .json(&json!({ "token": "anything" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .post(v1::policy::VENDOR)
        .add_header("Authorization", bearer("not-a-jwt"))
        .json(&json!({ "token": "anything" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn bearer_without_the_role_is_forbidden() {
    let app = build_test_app();
    let (jw_token, _) = app.member("c@x.com", "Customer").await;

    app.server
        .post(v1::policy::VENDOR)
        .add_header("Authorization", bearer(&jw_token))
        .json(&json!({ "token": jw_token }))
        .await
        .assert_status(StatusCode::FORBIDDEN);

    app.server
        .post(v1::policy::ADMIN)
        .add_header("Authorization", bearer(&jw_token))
        .json(&json!({ "token": jw_token }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn confirmed_members_pass_their_policy() {
    let app = build_test_app();
    let (customer, _) = app.member("c@x.com", "Customer").await;
    let (vendor, _) = app.member("v@x.com", "Vendor").await;

    app.server
        .post(v1::policy::CUSTOMER)
        .add_header("Authorization", bearer(&customer))
        .json(&json!({ "token": customer }))
        .await
        .assert_status_ok();

    app.server
        .post(v1::policy::VENDOR)
        .add_header("Authorization", bearer(&vendor))
        .json(&json!({ "token": vendor }))
        .await
        .assert_status_ok();
}

#[tokio::test]
async fn policy_failures_are_unauthorized() {
    let app = build_test_app();
    let (customer, _) = app.member("c@x.com", "Customer").await;
    let (vendor, _) = app.member("v@x.com", "Vendor").await;

    // Gate passes on the bearer; the checked token lacks the role.
    app.server
        .post(v1::policy::CUSTOMER)
        .add_header("Authorization", bearer(&customer))
        .json(&json!({ "token": vendor }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    app.server
        .post(v1::policy::CUSTOMER)
        .add_header("Authorization", bearer(&customer))
        .json(&json!({ "token": "forged" }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    // Registered and signed in, but never confirmed.
    app.register("late@x.com", "Customer").await;
    let (unconfirmed, _) = app.sign_in("late@x.com", PASSWORD).await;
    app.server
        .post(v1::policy::CUSTOMER)
        .add_header("Authorization", bearer(&unconfirmed))
        .json(&json!({ "token": unconfirmed }))
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_policy_accepts_provisioned_admin() {
    let app = build_test_app();
    let (admin, _) = app.admin().await;

    app.server
        .post(v1::policy::ADMIN)
        .add_header("Authorization", bearer(&admin))
        .json(&json!({ "token": admin }))
        .await
        .assert_status_ok();
}
