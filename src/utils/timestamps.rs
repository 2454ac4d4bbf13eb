use chrono::NaiveDateTime;

/// Parses a `paid_at` value from the gateway.
///
/// The gateway reports timestamps like `2024-02-02T08:00:00Z` but the `Z` is
/// a fixed suffix, not a real offset. Compatibility requires treating it as a
/// string edit: drop the suffix, parse the rest as a local timestamp. Both
/// the reconciliation path and the API response path go through here.
pub fn parse_gateway_timestamp(raw: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    raw.strip_suffix('Z').unwrap_or(raw).parse::<NaiveDateTime>()
}

/// Renders a parsed gateway timestamp back into the wire format used in
/// verification responses.
pub fn format_gateway_timestamp(ts: &NaiveDateTime) -> String {
    ts.format("%Y-%m-%dT%H:%M:%S").to_string()
}
