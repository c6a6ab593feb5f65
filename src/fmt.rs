//! Debug formatting helpers for [`custom_debug_derive`].

use std::fmt;

/// Formats a connection string with its password masked, whether it sits in
/// the user-info part or in a `password` query parameter.
///
/// Use with `#[debug(with = "crate::fmt::redacted_url")]`. Strings that do not
/// parse as URLs are hidden entirely.
pub fn redacted_url<S: AsRef<str>>(value: &S, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match url::Url::parse(value.as_ref()) {
        Ok(mut parsed) => {
            if parsed.password().is_some() {
                // Only fails for cannot-be-a-base URLs, which carry no password.
                let _ = parsed.set_password(Some(MASK));
            }
            mask_password_param(&mut parsed);
            fmt::Debug::fmt(parsed.as_str(), f)
        }
        Err(_) => f.write_str("\"<redacted>\""),
    }
}

const MASK: &str = "****";

fn mask_password_param(url: &mut url::Url) {
    let is_password = |key: &str| key.eq_ignore_ascii_case("password");
    if !url.query_pairs().any(|(key, _)| is_password(&key)) {
        return;
    }

    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(key, value)| {
            let value = if is_password(&key) {
                MASK.to_owned()
            } else {
                value.into_owned()
            };
            (key.into_owned(), value)
        })
        .collect();
    url.query_pairs_mut().clear().extend_pairs(pairs);
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Wrapper(&'static str);

    impl fmt::Debug for Wrapper {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            redacted_url(&self.0, f)
        }
    }

    #[test]
    fn masks_password() {
        let out = format!("{:?}", Wrapper("postgres://app:hunter2@db:5432/orders"));
        assert_eq!(out, "\"postgres://app:****@db:5432/orders\"");
    }

    #[test]
    fn leaves_passwordless_urls_alone() {
        let out = format!("{:?}", Wrapper("postgres://app@db/orders"));
        assert_eq!(out, "\"postgres://app@db/orders\"");
    }

    #[test]
    fn masks_password_query_parameter() {
        let out = format!(
            "{:?}",
            Wrapper("postgres://app@db/orders?sslmode=require&password=hunter2")
        );
        assert!(!out.contains("hunter2"), "leaked: {out}");
        assert_eq!(out, "\"postgres://app@db/orders?sslmode=require&password=****\"");
    }

    #[test]
    fn hides_unparseable_values() {
        let out = format!("{:?}", Wrapper("host=db password=hunter2"));
        assert_eq!(out, "\"<redacted>\"");
    }
}
