//! Tests for bearer token issue and validation.

use super::*;
use crate::test_support::{MutableClock, fixture_now, token_service, user};
use rstest::{fixture, rstest};

#[fixture]
fn clock() -> Arc<MutableClock> {
    Arc::new(MutableClock::new(fixture_now()))
}

#[fixture]
fn alice() -> User {
    user("alice@x.com", Role::User)
}

#[rstest]
fn issued_token_validates_for_its_subject(clock: Arc<MutableClock>, alice: User) {
    let tokens = token_service(clock);
    let issued = tokens.issue(&alice).expect("issue token");

    assert!(tokens.validate(&issued.token, "alice@x.com"));
    assert_eq!(issued.expires_at, fixture_now() + token_ttl());
}

#[rstest]
fn claims_carry_identity_and_role(clock: Arc<MutableClock>) {
    let staff = user("sam@x.com", Role::Staff);
    let tokens = token_service(clock);
    let issued = tokens.issue(&staff).expect("issue token");

    let claims = tokens.decode(&issued.token).expect("decode claims");
    assert_eq!(claims.sub, "sam@x.com");
    assert_eq!(claims.uid, staff.id);
    assert_eq!(claims.name, "sam");
    assert_eq!(claims.role, Role::Staff);
    assert_eq!(claims.exp - claims.iat, 86_400);
}

#[rstest]
fn other_subjects_fail(clock: Arc<MutableClock>, alice: User) {
    let tokens = token_service(clock);
    let issued = tokens.issue(&alice).expect("issue token");

    assert!(!tokens.validate(&issued.token, "bob@x.com"));
    assert!(!tokens.validate(&issued.token, ""));
}

#[rstest]
#[case(TimeDelta::hours(23), true)]
#[case(TimeDelta::hours(24) - TimeDelta::seconds(1), true)]
#[case(TimeDelta::hours(24), false)]
#[case(TimeDelta::hours(48), false)]
fn expiry_is_strict(
    clock: Arc<MutableClock>,
    alice: User,
    #[case] elapsed: TimeDelta,
    #[case] expected: bool,
) {
    let tokens = token_service(Arc::clone(&clock));
    let issued = tokens.issue(&alice).expect("issue token");

    clock.advance(elapsed);
    assert_eq!(tokens.validate(&issued.token, "alice@x.com"), expected);
}

#[rstest]
fn extract_subject_ignores_expiry(clock: Arc<MutableClock>, alice: User) {
    let tokens = token_service(Arc::clone(&clock));
    let issued = tokens.issue(&alice).expect("issue token");

    clock.advance(TimeDelta::days(30));
    assert_eq!(
        tokens.extract_subject(&issued.token),
        Ok("alice@x.com".to_owned())
    );
}

#[rstest]
fn tokens_signed_with_another_key_fail(clock: Arc<MutableClock>, alice: User) {
    let foreign = TokenService::new(
        TokenSigningKey::from_bytes(vec![7_u8; MIN_SIGNING_KEY_BYTES]).expect("key"),
        Arc::clone(&clock) as Arc<dyn Clock>,
    );
    let issued = foreign.issue(&alice).expect("issue token");
    let tokens = token_service(clock);

    assert!(!tokens.validate(&issued.token, "alice@x.com"));
    assert_eq!(
        tokens.extract_subject(&issued.token),
        Err(TokenError::BadSignature)
    );
}

#[rstest]
fn tampered_claims_fail(clock: Arc<MutableClock>, alice: User) {
    let tokens = token_service(clock);
    let issued = tokens.issue(&alice).expect("issue token");
    let mut parts: Vec<&str> = issued.token.split('.').collect();
    let forged = URL_SAFE_NO_PAD.encode(
        br#"{"sub":"alice@x.com","uid":"00000000-0000-0000-0000-000000000000","name":"a","role":"ADMIN","iat":0,"exp":9999999999}"#,
    );
    parts[1] = forged.as_str();
    let tampered = parts.join(".");

    assert!(!tokens.validate(&tampered, "alice@x.com"));
}

#[rstest]
#[case("")]
#[case("abc")]
#[case("a.b")]
#[case("a.b.c.d")]
#[case("!!!.???.***")]
fn malformed_tokens_fail_closed(clock: Arc<MutableClock>, #[case] token: &str) {
    let tokens = token_service(clock);
    assert!(!tokens.validate(token, "alice@x.com"));
    assert!(tokens.extract_subject(token).is_err());
}

#[rstest]
fn unsupported_algorithm_is_rejected(clock: Arc<MutableClock>, alice: User) {
    let tokens = token_service(clock);
    let issued = tokens.issue(&alice).expect("issue token");
    let rest = issued
        .token
        .split_once('.')
        .map(|(_, rest)| rest)
        .expect("token has segments");
    let none_header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
    let token = format!("{none_header}.{rest}");

    assert_eq!(tokens.decode(&token), Err(TokenError::UnsupportedAlgorithm));
}

#[rstest]
#[case("not base64!", TokenKeyError::InvalidBase64)]
#[case("c2hvcnQ=", TokenKeyError::TooShort { min: MIN_SIGNING_KEY_BYTES, actual: 5 })]
fn key_loading_validates_material(#[case] encoded: &str, #[case] expected: TokenKeyError) {
    assert_eq!(TokenSigningKey::from_base64(encoded).map(|_| ()), Err(expected));
}

#[rstest]
fn generated_keys_meet_minimum_length() {
    let key = TokenSigningKey::generate();
    assert_eq!(key.0.len(), MIN_SIGNING_KEY_BYTES);
    assert_eq!(format!("{key:?}"), "TokenSigningKey(..)");
}
