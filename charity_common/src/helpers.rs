/// Interprets an optional environment value as a boolean switch.
///
/// Accepts the usual spellings (`1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off`), ignoring case and surrounding
/// whitespace. Anything else, including a missing value, yields `default`.
pub fn parse_boolean_flag(value: Option<String>, default: bool) -> bool {
    let Some(value) = value else {
        return default;
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
