use std::sync::Arc;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{Duration, Utc};
use futures::future::join_all;

use bazaar_core::domain::users::auth::TokenSettings;
use bazaar_core::domain::users::auth::domain::repositories::CredentialStore;
use bazaar_core::domain::users::auth::domain::services::{
    RefreshTokenOutcome, RotationResult, TokenService,
};
use bazaar_core::domain::users::{Role, User};
use bazaar_core::infrastructure::memory::InMemoryCredentialStore;

#[path = "support/mod.rs"]
mod support;
use support::{AUDIENCE, ISSUER, SIGNING_KEY, token_settings};

fn service() -> (TokenService, Arc<InMemoryCredentialStore>) {
    let store = Arc::new(InMemoryCredentialStore::new());
    (TokenService::new(token_settings(), store.clone()), store)
}

fn with_signature(token: &str, signature: &[u8]) -> String {
    let (signed, _) = token.rsplit_once('.').unwrap();
    format!("{signed}.{}", URL_SAFE_NO_PAD.encode(signature))
}

#[test]
fn access_token_is_valid_until_it_expires() {
    let (tokens, _) = service();
    let user = User::new("a@x.com", "hash".into(), Role::Customer);

    let fresh = tokens.issue_access_token(&user).unwrap();
    assert!(tokens.validate_access_token(&fresh));

    let almost = tokens
        .issue_access_token_at(&user, Utc::now() - Duration::minutes(14))
        .unwrap();
    assert!(tokens.validate_access_token(&almost));

    let expired = tokens
        .issue_access_token_at(&user, Utc::now() - Duration::minutes(15) - Duration::seconds(5))
        .unwrap();
    assert!(!tokens.validate_access_token(&expired));
}

#[test]
fn any_single_bit_flip_in_the_signature_invalidates() {
    let (tokens, _) = service();
    let user = User::new("a@x.com", "hash".into(), Role::Vendor);
    let token = tokens.issue_access_token(&user).unwrap();
    let (_, encoded) = token.rsplit_once('.').unwrap();
    let signature = URL_SAFE_NO_PAD.decode(encoded).unwrap();

    for bit in 0..signature.len() * 8 {
        let mut mutated = signature.clone();
        mutated[bit / 8] ^= 1 << (bit % 8);
        assert!(
            !tokens.validate_access_token(&with_signature(&token, &mutated)),
            "bit {bit} flip was accepted"
        );
    }
    assert!(tokens.validate_access_token(&with_signature(&token, &signature)));
}

#[test]
fn tokens_from_other_issuers_audiences_or_keys_are_rejected() {
    let (tokens, store) = service();
    let user = User::new("a@x.com", "hash".into(), Role::Customer);

    let foreign = [
        TokenSettings::new(SIGNING_KEY, "someone-else", AUDIENCE, 15).unwrap(),
        TokenSettings::new(SIGNING_KEY, ISSUER, "other-clients", 15).unwrap(),
        TokenSettings::new("a-different-key", ISSUER, AUDIENCE, 15).unwrap(),
    ];
    for settings in foreign {
        let other = TokenService::new(settings, store.clone());
        let token = other.issue_access_token(&user).unwrap();
        assert!(other.validate_access_token(&token));
        assert!(!tokens.validate_access_token(&token));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_rotations_have_a_single_winner() {
    let (tokens, store) = service();
    let tokens = Arc::new(tokens);
    let user = User::new("a@x.com", "hash".into(), Role::Customer);
    store.create_user(&user).await.unwrap();
    let pair = tokens.issue_token_pair(&user).await.unwrap();

    let attempts = (0..16).map(|_| {
        let tokens = tokens.clone();
        let presented = pair.refresh_token.clone();
        tokio::spawn(async move { tokens.refresh(&presented).await })
    });
    let results = join_all(attempts).await;

    let mut winners = 0;
    for result in results {
        match result.unwrap() {
            RefreshTokenOutcome::Success(_) => winners += 1,
            RefreshTokenOutcome::Expired => {}
            other => panic!("unexpected rotation outcome {other:?}"),
        }
    }
    assert_eq!(winners, 1);
}

#[tokio::test]
async fn rotating_a_stale_snapshot_reports_expired() {
    let (tokens, store) = service();
    let user = User::new("a@x.com", "hash".into(), Role::Customer);
    store.create_user(&user).await.unwrap();
    let pair = tokens.issue_token_pair(&user).await.unwrap();

    let snapshot = store.find_by_id(user.id).await.unwrap().unwrap();
    assert!(matches!(
        tokens.rotate_refresh_token(&snapshot, &pair.refresh_token).await,
        RotationResult::Success(_)
    ));
    // The snapshot still shows the old token as active; the store does not.
    assert!(matches!(
        tokens.rotate_refresh_token(&snapshot, &pair.refresh_token).await,
        RotationResult::Expired
    ));
}
