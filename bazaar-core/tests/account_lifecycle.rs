use bazaar_core::domain::users::auth::domain::repositories::CredentialStore;
use bazaar_core::domain::users::auth::domain::services::{
    AuthenticationOutcome, ConfirmEmailOutcome, ConfirmPasswordResetOutcome,
    PasswordResetOutcome, RefreshTokenOutcome, RegisterOutcome,
    UpdateUserInfoOutcome, UserInfoOutcome,
};
use bazaar_core::domain::users::{
    AuthenticationRequest, ConfirmEmailRequest, ConfirmPasswordResetRequest,
    CustomerProfile, PasswordResetRequest, TokenPair, UpdateCustomerRequest,
    UpdateVendorRequest, UserInfo, UserType, VendorProfile,
};
use bazaar_core::infrastructure::memory::DeliveryMode;

#[path = "support/mod.rs"]
mod support;
use support::{Harness, PASSWORD};

async fn sign_in(harness: &Harness, email: &str, password: &str) -> TokenPair {
    match harness
        .services
        .accounts
        .authenticate(AuthenticationRequest {
            email: email.into(),
            password: password.into(),
        })
        .await
    {
        AuthenticationOutcome::Success(pair) => pair,
        other => panic!("expected successful sign-in, got {other:?}"),
    }
}

#[tokio::test]
async fn register_authenticate_refresh_and_reject_reuse() {
    let harness = Harness::new();

    assert_eq!(
        harness.register("a@x.com", UserType::Customer).await,
        RegisterOutcome::Success
    );

    let pair = sign_in(&harness, "a@x.com", PASSWORD).await;
    assert!(!pair.jw_token.is_empty());
    assert!(!pair.refresh_token.is_empty());

    let rotated = match harness.services.tokens.refresh(&pair.refresh_token).await {
        RefreshTokenOutcome::Success(rotated) => rotated,
        other => panic!("expected rotation, got {other:?}"),
    };
    assert_ne!(rotated.refresh_token, pair.refresh_token);
    assert!(harness.services.tokens.validate_access_token(&rotated.jw_token));

    assert!(matches!(
        harness.services.tokens.refresh(&pair.refresh_token).await,
        RefreshTokenOutcome::Expired
    ));
    assert!(matches!(
        harness.services.tokens.refresh(&rotated.refresh_token).await,
        RefreshTokenOutcome::Success(_)
    ));
}

#[tokio::test]
async fn duplicate_registration_keeps_a_single_user() {
    let harness = Harness::new();

    assert_eq!(
        harness.register("dup@x.com", UserType::Customer).await,
        RegisterOutcome::Success
    );
    assert_eq!(
        harness.register("DUP@x.com", UserType::Vendor).await,
        RegisterOutcome::EmailAlreadyExists
    );
    assert_eq!(harness.store.user_count(), 1);
}

#[tokio::test]
async fn failed_confirmation_mail_removes_the_account() {
    let harness = Harness::new();
    harness.email.set_mode(DeliveryMode::Fail);

    assert_eq!(
        harness.register("lost@x.com", UserType::Vendor).await,
        RegisterOutcome::EmailCantBeSend
    );
    assert!(harness.store.find_by_email("lost@x.com").await.unwrap().is_none());
    assert_eq!(harness.store.user_count(), 0);

    harness.email.set_mode(DeliveryMode::Deliver);
    assert_eq!(
        harness.register("lost@x.com", UserType::Vendor).await,
        RegisterOutcome::Success
    );
}

#[tokio::test]
async fn authentication_distinguishes_unknown_email_and_wrong_password() {
    let harness = Harness::new();
    harness.register("a@x.com", UserType::Customer).await;

    let unknown = harness
        .services
        .accounts
        .authenticate(AuthenticationRequest {
            email: "b@x.com".into(),
            password: PASSWORD.into(),
        })
        .await;
    assert!(matches!(unknown, AuthenticationOutcome::EmailNotFound));

    let wrong = harness
        .services
        .accounts
        .authenticate(AuthenticationRequest {
            email: "a@x.com".into(),
            password: "Wrong-pass1".into(),
        })
        .await;
    assert!(matches!(wrong, AuthenticationOutcome::WrongPassword));
}

#[tokio::test]
async fn confirmation_code_is_single_use() {
    let harness = Harness::new();
    harness.register("c@x.com", UserType::Customer).await;
    let code = harness.mailed_code("c@x.com");
    let confirm = |token: String| ConfirmEmailRequest {
        email: "c@x.com".into(),
        token,
    };

    assert_eq!(
        harness.services.accounts.confirm_email(confirm("bm9wZQ".into())).await,
        ConfirmEmailOutcome::InvalidToken
    );
    assert_eq!(
        harness.services.accounts.confirm_email(confirm(code.clone())).await,
        ConfirmEmailOutcome::Success
    );
    assert_eq!(
        harness.services.accounts.confirm_email(confirm(code)).await,
        ConfirmEmailOutcome::InvalidToken
    );

    let user = harness.store.find_by_email("c@x.com").await.unwrap().unwrap();
    assert!(user.email_confirmed);
}

#[tokio::test]
async fn password_reset_replaces_password_and_revokes_sessions() {
    let harness = Harness::new();
    harness.register("r@x.com", UserType::Vendor).await;
    let before = sign_in(&harness, "r@x.com", PASSWORD).await;

    assert_eq!(
        harness
            .services
            .accounts
            .request_password_reset(PasswordResetRequest {
                email: "r@x.com".into()
            })
            .await,
        PasswordResetOutcome::Success
    );
    let code = harness.mailed_code("r@x.com");
    let new_password = "N3w-Secret";

    let weak = harness
        .services
        .accounts
        .confirm_password_reset(ConfirmPasswordResetRequest {
            email: "r@x.com".into(),
            token: code.clone(),
            password: "weakpassword".into(),
        })
        .await;
    assert_eq!(weak, ConfirmPasswordResetOutcome::UnsupportedPasswordFormat);

    let done = harness
        .services
        .accounts
        .confirm_password_reset(ConfirmPasswordResetRequest {
            email: "r@x.com".into(),
            token: code,
            password: new_password.into(),
        })
        .await;
    assert_eq!(done, ConfirmPasswordResetOutcome::Success);

    assert!(matches!(
        harness.services.tokens.refresh(&before.refresh_token).await,
        RefreshTokenOutcome::Expired
    ));
    sign_in(&harness, "r@x.com", new_password).await;
}

#[tokio::test]
async fn reset_request_for_unknown_email_sends_nothing() {
    let harness = Harness::new();
    let outcome = harness
        .services
        .accounts
        .request_password_reset(PasswordResetRequest {
            email: "ghost@x.com".into(),
        })
        .await;
    assert_eq!(outcome, PasswordResetOutcome::EmailNotFound);
    assert!(harness.email.sent().is_empty());
}

#[tokio::test]
async fn customer_update_against_vendor_is_wrong_user_type() {
    let harness = Harness::new();
    harness.register("v@x.com", UserType::Vendor).await;
    harness.register("c@x.com", UserType::Customer).await;
    let pair = sign_in(&harness, "v@x.com", PASSWORD).await;
    let accounts = &harness.services.accounts;

    let vendor_profile = VendorProfile {
        business_name: Some("Night Market".into()),
        address: Some("1 Lantern Way".into()),
        phone_number: Some("555-0101".into()),
    };
    assert_eq!(
        accounts
            .update_vendor_info(
                "v@x.com",
                UpdateVendorRequest {
                    jw_token: pair.jw_token.clone(),
                    profile: vendor_profile.clone(),
                },
            )
            .await,
        UpdateUserInfoOutcome::Success
    );

    let outcome = accounts
        .update_customer_info(
            "v@x.com",
            UpdateCustomerRequest {
                jw_token: pair.jw_token.clone(),
                profile: CustomerProfile {
                    full_name: Some("Not A Vendor".into()),
                    ..CustomerProfile::default()
                },
            },
        )
        .await;
    assert_eq!(outcome, UpdateUserInfoOutcome::WrongUserType);

    assert_eq!(
        accounts.get_user_info("v@x.com").await,
        UserInfoOutcome::Success(UserInfo::Vendor(vendor_profile))
    );
    assert_eq!(
        accounts.get_user_info("c@x.com").await,
        UserInfoOutcome::Success(UserInfo::Customer(CustomerProfile::default()))
    );
}

#[tokio::test]
async fn profile_update_requires_valid_token_and_field_limits() {
    let harness = Harness::new();
    harness.register("c@x.com", UserType::Customer).await;
    let pair = sign_in(&harness, "c@x.com", PASSWORD).await;
    let accounts = &harness.services.accounts;

    let bad_token = accounts
        .update_customer_info(
            "c@x.com",
            UpdateCustomerRequest {
                jw_token: "forged".into(),
                profile: CustomerProfile::default(),
            },
        )
        .await;
    assert_eq!(bad_token, UpdateUserInfoOutcome::InvalidToken);

    let too_long = accounts
        .update_customer_info(
            "c@x.com",
            UpdateCustomerRequest {
                jw_token: pair.jw_token.clone(),
                profile: CustomerProfile {
                    phone_number: Some("1".repeat(21)),
                    ..CustomerProfile::default()
                },
            },
        )
        .await;
    assert!(matches!(too_long, UpdateUserInfoOutcome::InvalidProfile(_)));

    let missing = accounts
        .update_customer_info(
            "nobody@x.com",
            UpdateCustomerRequest {
                jw_token: pair.jw_token,
                profile: CustomerProfile::default(),
            },
        )
        .await;
    assert_eq!(missing, UpdateUserInfoOutcome::EmailNotFound);
}
