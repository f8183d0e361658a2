//! Turns raw column expressions into dotted facet names for display.
//!
//! `toString(LogAttributes.`http`.`status-code`)` becomes
//! `LogAttributes.http.status-code`. Map access such as
//! `toString(LogAttributes['a.b'])` is left as is, and so is anything that does
//! not parse; this is cosmetic cleanup and never fails.

pub const STRING_WRAPPER: &str = "toString(";

const SEGMENT_QUOTE: char = '`';

pub fn cleaned_facet_name(expr: &str) -> String {
    let mut current = match unwrap_once(expr) {
        Some(cleaned) => cleaned,
        None => return expr.to_string(),
    };
    // a quoted segment may itself look like a wrapped expression
    while let Some(next) = unwrap_once(&current) {
        current = next;
    }
    current
}

fn unwrap_once(expr: &str) -> Option<String> {
    let inner = expr.strip_prefix(STRING_WRAPPER)?.strip_suffix(')')?;
    if inner.is_empty() || inner.contains(['[', ']']) {
        return None;
    }
    let segments = split_segments(inner);
    if segments.is_none() {
        tracing::trace!(expr, "leaving malformed expression untouched");
    }
    Some(segments?.join("."))
}

fn split_segments(path: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    let mut rest = path;
    loop {
        if let Some(quoted) = rest.strip_prefix(SEGMENT_QUOTE) {
            let end = quoted.find(SEGMENT_QUOTE)?;
            segments.push(&quoted[..end]);
            rest = &quoted[end + 1..];
        } else {
            let end = rest.find('.').unwrap_or(rest.len());
            let segment = &rest[..end];
            if segment.contains([SEGMENT_QUOTE, '(', ')']) {
                return None;
            }
            segments.push(segment);
            rest = &rest[end..];
        }
        if rest.is_empty() {
            return Some(segments);
        }
        rest = rest.strip_prefix('.')?;
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn strips_wrapper_and_segment_quotes() {
        assert_eq!(
            cleaned_facet_name("toString(ResourceAttributes.`hdx`.`sdk`.`version`)"),
            "ResourceAttributes.hdx.sdk.version"
        );
    }

    #[test]
    fn keeps_special_characters_inside_segments() {
        assert_eq!(
            cleaned_facet_name("toString(LogAttributes.`user agent`.`http-2`.`404`)"),
            "LogAttributes.user agent.http-2.404"
        );
        assert_eq!(cleaned_facet_name("toString(LogAttributes.`a.b`)"), "LogAttributes.a.b");
        assert_eq!(cleaned_facet_name("toString(LogAttributes.`f(x)`)"), "LogAttributes.f(x)");
    }

    #[test]
    fn unwrapped_expressions_are_unchanged() {
        assert_eq!(cleaned_facet_name("ServiceName"), "ServiceName");
        assert_eq!(cleaned_facet_name("ResourceAttributes.k8s.pod"), "ResourceAttributes.k8s.pod");
    }

    #[test]
    fn map_access_is_returned_verbatim() {
        let expr = "toString(LogAttributes['key.with.dots'])";
        assert_eq!(cleaned_facet_name(expr), expr);
        assert_eq!(cleaned_facet_name("LogAttributes['x']"), "LogAttributes['x']");
    }

    #[test]
    fn malformed_input_is_returned_verbatim() {
        for expr in [
            "toString(LogAttributes.`open)",
            "toString(LogAttributes.`a`b)",
            "toString(LogAttributes.x",
            "toString()",
            "toString(a).toString(b)",
            "toString(LogAttributes.f(x))",
        ] {
            assert_eq!(cleaned_facet_name(expr), expr);
        }
    }

    #[test]
    fn nested_wrappers_collapse() {
        assert_eq!(cleaned_facet_name("toString(`toString(a.b)`)"), "a.b");
    }

    fn segment() -> impl Strategy<Value = String> {
        prop_oneof![
            "[A-Za-z][A-Za-z0-9_]{0,8}",
            "[A-Za-z0-9 ._-]{0,8}".prop_map(|s| format!("`{s}`")),
        ]
    }

    fn expression() -> impl Strategy<Value = String> {
        prop_oneof![
            prop::collection::vec(segment(), 1..5).prop_map(|segments| format!("toString({})", segments.join("."))),
            prop::collection::vec(segment(), 1..5).prop_map(|segments| segments.join(".")),
            "[A-Za-z]{1,6}\\['[a-z.]{0,6}'\\]".prop_map(|s| format!("toString({s})")),
            "[ -~]{0,24}",
        ]
    }

    proptest! {
        #[test]
        fn cleaning_is_idempotent(expr in expression()) {
            let once = cleaned_facet_name(&expr);
            prop_assert_eq!(cleaned_facet_name(&once), once);
        }

        #[test]
        fn quoted_paths_lose_only_their_quotes(
            parts in prop::collection::vec("[A-Za-z0-9 _-]{1,8}", 1..5)
        ) {
            let expr = format!(
                "toString({})",
                parts.iter().map(|p| format!("`{p}`")).collect::<Vec<_>>().join(".")
            );
            prop_assert_eq!(cleaned_facet_name(&expr), parts.join("."));
        }
    }
}
