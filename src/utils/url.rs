// src/utils/url.rs

//! URL helpers for profile, post and reel pages.

/// Non-empty path segments of a URL, or `None` if it does not parse.
fn segments(url: &str) -> Option<Vec<String>> {
    let parsed = url::Url::parse(url).ok()?;
    Some(
        parsed
            .path_segments()
            .map(|s| s.filter(|p| !p.is_empty()).map(str::to_string).collect())
            .unwrap_or_default(),
    )
}

/// Shortcode of a post or reel page: the second path segment.
///
/// # Examples
/// ```
/// use ig_sniffer::utils::url::shortcode_from_url;
///
/// assert_eq!(
///     shortcode_from_url("https://www.instagram.com/p/C1a2B3c4/"),
///     Some("C1a2B3c4".to_string())
/// );
/// ```
pub fn shortcode_from_url(url: &str) -> Option<String> {
    segments(url)?.into_iter().nth(1)
}

/// Username of a profile page: the last path segment.
pub fn username_from_url(url: &str) -> Option<String> {
    segments(url)?.pop()
}

/// Detail page URL for a shortcode.
pub fn post_url(base: &str, shortcode: &str, is_reel: bool) -> String {
    let seg = if is_reel { "reel" } else { "p" };
    format!("{}/{}/{}/", base.trim_end_matches('/'), seg, shortcode)
}

/// Profile page URL for a username.
pub fn profile_url(base: &str, username: &str) -> String {
    format!("{}/{}/", base.trim_end_matches('/'), username)
}

/// Same-origin API path that makes the page fetch a post's full media detail.
pub fn detail_request_path(shortcode: &str) -> String {
    format!("/api/v1/media/shortcode/{shortcode}/?children=true")
}
