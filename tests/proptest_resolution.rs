//! Property-based tests using proptest
//!
//! These tests verify the credential-merge precedence and the exact-name
//! scan classification using randomized inputs.

use proptest::prelude::*;
use rbkctl::cdm::auth::{AuthScheme, ConnectionContext, Credentials};
use rbkctl::cdm::error::CdmError;
use rbkctl::modules::{find_exact, Match};

/// Generate an optional credential field: absent, empty (which must count
/// as absent), or a usable value
fn arb_field() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some(String::new())),
        "[a-zA-Z0-9._-]{1,24}".prop_map(Some),
    ]
}

fn arb_credentials() -> impl Strategy<Value = Credentials> {
    (arb_field(), arb_field(), arb_field(), arb_field()).prop_map(
        |(node_ip, username, password, api_token)| Credentials {
            node_ip,
            username,
            password,
            api_token,
        },
    )
}

fn usable(field: &Option<String>) -> bool {
    field.as_deref().map(|v| !v.trim().is_empty()).unwrap_or(false)
}

/// Reference model of the merge: first usable value wins, source order
/// explicit > provider > env
fn model_merge(sources: [&Option<String>; 3]) -> Option<String> {
    sources.into_iter().find(|field| usable(field)).cloned().flatten()
}

proptest! {
    /// Resolution succeeds exactly when a node address plus either a
    /// token or a username/password pair survives the merge
    #[test]
    fn resolution_matches_credential_invariant(
        explicit in arb_credentials(),
        provider in arb_credentials(),
        env in arb_credentials(),
    ) {
        let node_ip = model_merge([&explicit.node_ip, &provider.node_ip, &env.node_ip]);
        let username = model_merge([&explicit.username, &provider.username, &env.username]);
        let password = model_merge([&explicit.password, &provider.password, &env.password]);
        let api_token = model_merge([&explicit.api_token, &provider.api_token, &env.api_token]);

        let expect_ok = node_ip.is_some()
            && (api_token.is_some() || (username.is_some() && password.is_some()));

        let result = ConnectionContext::resolve_with(explicit, provider, env);

        match result {
            Ok(context) => {
                prop_assert!(expect_ok);
                prop_assert_eq!(Some(context.node_ip), node_ip);
                match context.auth {
                    AuthScheme::Token(token) => prop_assert_eq!(Some(token), api_token),
                    AuthScheme::Basic { username: u, password: p } => {
                        prop_assert!(api_token.is_none());
                        prop_assert_eq!(Some(u), username);
                        prop_assert_eq!(Some(p), password);
                    }
                }
            }
            Err(CdmError::CredentialsMissing) => prop_assert!(!expect_ok),
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }

    /// TLS verification is on unless the insecure flag is set
    #[test]
    fn tls_verification_defaults_on(insecure in any::<bool>()) {
        let context = ConnectionContext::resolve_with(
            Credentials {
                node_ip: Some("cluster.lab".to_string()),
                username: Some("admin".to_string()),
                password: Some("pw".to_string()),
                api_token: None,
            },
            Credentials::default(),
            Credentials::default(),
        )
        .unwrap()
        .with_insecure_tls(insecure);

        prop_assert_eq!(context.verify_tls, !insecure);
    }
}

/// Generate a list of object names with controlled duplication
fn arb_names() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-z][a-z0-9-]{0,16}", 0..40)
}

proptest! {
    /// The scan classification always agrees with a straight count of
    /// matching entries
    #[test]
    fn find_exact_agrees_with_match_count(names in arb_names(), needle in "[a-z][a-z0-9-]{0,16}") {
        let expected = names.iter().filter(|n| **n == needle).count();
        let result = find_exact(names, |n| *n == needle);

        match (expected, result) {
            (0, Match::None) => {}
            (1, Match::One(found)) => prop_assert_eq!(found, needle),
            (n, Match::Many(count)) => prop_assert_eq!(count, n),
            (expected, other) => {
                prop_assert!(false, "count {} classified as {:?}", expected, other)
            }
        }
    }
}
