//! Access token cookie helpers.

/// Cookie carrying the access token
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Finds `name` in a `Cookie` request header.
pub fn get_cookie(cookie_header: &str, name: &str) -> Option<String> {
    cookie_header.split(';').find_map(|part| {
        let (key, value) = part.trim().split_once('=')?;
        (key.trim() == name).then(|| value.trim().to_string())
    })
}

/// `Set-Cookie` value storing the access token for `max_age_secs`.
pub fn build_access_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let secure_attr = if secure { "; Secure" } else { "" };
    format!(
        "{ACCESS_TOKEN_COOKIE}={token}; HttpOnly{secure_attr}; Path=/; Max-Age={}; SameSite=Strict",
        max_age_secs.max(0)
    )
}

/// `Set-Cookie` value that expires the access token cookie.
pub fn clear_access_cookie(secure: bool) -> String {
    build_access_cookie("", 0, secure)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_cookie() {
        let header = "theme=dark; accessToken=abc.def.ghi ; other=1";
        assert_eq!(get_cookie(header, ACCESS_TOKEN_COOKIE).as_deref(), Some("abc.def.ghi"));
        assert_eq!(get_cookie(header, "missing"), None);
        assert_eq!(get_cookie("", ACCESS_TOKEN_COOKIE), None);
    }

    #[test]
    fn test_build_access_cookie() {
        assert_eq!(
            build_access_cookie("tok", 86_400, false),
            "accessToken=tok; HttpOnly; Path=/; Max-Age=86400; SameSite=Strict"
        );
        assert_eq!(
            build_access_cookie("tok", -5, true),
            "accessToken=tok; HttpOnly; Secure; Path=/; Max-Age=0; SameSite=Strict"
        );
    }

    #[test]
    fn test_clear_access_cookie() {
        assert!(clear_access_cookie(false).starts_with("accessToken=; HttpOnly"));
        assert!(clear_access_cookie(false).contains("Max-Age=0"));
    }
}
