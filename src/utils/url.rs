//! URL helpers for the chat endpoint and the paper search feed.

/// Strip trailing slashes so endpoint paths can be appended safely.
///
/// ```
/// use quantoptik::utils::url::normalize_base_url;
///
/// assert_eq!(normalize_base_url("https://api.deepseek.com/v1/"), "https://api.deepseek.com/v1");
/// ```
pub fn normalize_base_url(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}

/// Join a base URL and an endpoint path with exactly one slash.
///
/// ```
/// use quantoptik::utils::url::construct_api_url;
///
/// assert_eq!(
///     construct_api_url("https://api.deepseek.com/v1/", "/chat/completions"),
///     "https://api.deepseek.com/v1/chat/completions"
/// );
/// ```
pub fn construct_api_url(base_url: &str, endpoint: &str) -> String {
    let normalized_base = normalize_base_url(base_url);
    let endpoint = endpoint.trim_start_matches('/');
    format!("{normalized_base}/{endpoint}")
}

/// Template the paper search URL. The query is inserted as-is; whatever
/// encoding happens is left to the HTTP client's URL parser.
pub fn paper_search_url(search_base: &str, query: &str) -> String {
    format!(
        "{}?search_query=all:{}",
        normalize_base_url(search_base),
        query
    )
}
