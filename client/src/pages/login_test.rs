use super::*;

#[test]
fn login_email_is_trimmed_and_required() {
    assert_eq!(validate_login_email("  me@example.com "), Ok("me@example.com".to_owned()));
    assert_eq!(validate_login_email("   "), Err("Please enter your email."));
    assert_eq!(validate_login_email("not-an-email"), Err("That doesn't look like an email address."));
}

#[test]
fn redirect_keeps_in_app_paths() {
    assert_eq!(redirect_target(Some("/my-bricks")), "/my-bricks");
    assert_eq!(redirect_target(Some("/wall?brick=12")), "/wall?brick=12");
    assert_eq!(redirect_target(Some("/wall#buy")), "/wall#buy");
}

#[test]
fn redirect_rejects_external_or_missing_targets() {
    assert_eq!(redirect_target(None), "/");
    assert_eq!(redirect_target(Some("")), "/");
    assert_eq!(redirect_target(Some("https://evil.example")), "/");
    assert_eq!(redirect_target(Some("//evil.example")), "/");
}

#[test]
fn emailed_link_drops_own_fragment() {
    assert_eq!(link_return_path("/wall#buy"), "/wall");
    assert_eq!(link_return_path("/my-bricks"), "/my-bricks");
}
