use super::*;

#[test]
fn fragment_with_full_session() {
    let session =
        parse_session_fragment("#access_token=abc.def.ghi&expires_in=3600&refresh_token=r1&token_type=bearer&type=magiclink")
            .unwrap();
    assert_eq!(session.access_token, "abc.def.ghi");
    assert_eq!(session.refresh_token.as_deref(), Some("r1"));
    assert_eq!(session.expires_in, Some(3600));
    assert_eq!(session.token_type.as_deref(), Some("bearer"));
}

#[test]
fn fragment_without_hash_prefix() {
    let session = parse_session_fragment("access_token=t").unwrap();
    assert_eq!(session.access_token, "t");
    assert_eq!(session.expires_in, None);
}

#[test]
fn fragment_without_token_is_none() {
    assert!(parse_session_fragment("").is_none());
    assert!(parse_session_fragment("#").is_none());
    assert!(parse_session_fragment("#error=access_denied&error_description=Email+link+is+invalid").is_none());
    assert!(parse_session_fragment("#access_token=&refresh_token=r").is_none());
}

#[test]
fn fragment_ignores_malformed_pairs() {
    let session = parse_session_fragment("#junk&access_token=t&expires_in=soon").unwrap();
    assert_eq!(session.access_token, "t");
    assert_eq!(session.expires_in, None);
}

#[test]
fn email_shape() {
    assert!(looks_like_email("me@example.com"));
    assert!(looks_like_email("  me@example.com "));
    assert!(!looks_like_email("me@example"));
    assert!(!looks_like_email("@example.com"));
    assert!(!looks_like_email("me example@x.com"));
    assert!(!looks_like_email("me@.com"));
}

#[test]
fn otp_body_trims_email() {
    let body = otp_body(" me@example.com ");
    assert_eq!(body["email"], "me@example.com");
    assert_eq!(body["create_user"], true);
}
