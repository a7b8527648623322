//! Free-text list queries with filter prefixes.

use crate::cache::ListParams;

/// Parse a raw list query into list parameters.
///
/// Filters use prefixes, everything else is search text:
/// - `client:12` - numbers of one client
/// - `status:active` - by status
/// - `page:3` - start on a page
///
/// A prefixed token whose value does not parse is kept as search text.
///
/// # Examples
///
/// ```ignore
/// let params = parse_list_query("client:4 status:active +1555");
/// assert_eq!(params.search, "+1555");
/// assert_eq!(params.client, Some(4));
/// ```
pub fn parse_list_query(raw: &str) -> ListParams {
    let mut params = ListParams::default();
    let mut remaining = Vec::new();

    for token in raw.split_whitespace() {
        if let Some(value) = token.strip_prefix("client:") {
            match value.parse() {
                Ok(id) => params.client = Some(id),
                Err(_) => remaining.push(token),
            }
        } else if let Some(value) = token.strip_prefix("status:") {
            if value.is_empty() {
                remaining.push(token);
            } else {
                params.status = Some(value.to_string());
            }
        } else if let Some(value) = token.strip_prefix("page:") {
            match value.parse::<u32>() {
                Ok(page) if page > 0 => params.page = page,
                _ => remaining.push(token),
            }
        } else {
            remaining.push(token);
        }
    }

    params.search = remaining.join(" ");
    params
}
