//! Expansion of ad-platform URL templating syntax
//!
//! Final URLs may contain conditional tags such as `{ifmobile:...}` whose
//! value is only inserted for some traffic, and generic ValueTrack parameters
//! such as `{keyword}` which are filled in at click time. Checking a templated
//! URL therefore means checking every concrete variant it can produce.

/// A parsed piece of a templated URL
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment<'a> {
    /// Literal text copied into every variant
    Text(&'a str),

    /// A bracketed tag; `name` is lowercased
    Tag { name: String, value: &'a str },
}

/// The two mutually exclusive conditional tag pairs
const MOBILE_TAGS: (&str, &str) = ("ifmobile", "ifnotmobile");
const NETWORK_TAGS: (&str, &str) = ("ifsearch", "ifcontent");

/// Expands a templated URL into every concrete URL it can produce
///
/// # Expansion Rules
///
/// | Syntax | Behaviour |
/// |--------|-----------|
/// | `{ifmobile:v}` / `{ifnotmobile:v}` | branch: one variant keeps the first tag's value and drops the second tag, the other the reverse |
/// | `{ifsearch:v}` / `{ifcontent:v}` | same, on the network axis |
/// | both pairs present | cross product of the two axes |
/// | any other `{...}` | removed from every variant |
///
/// Tag names are matched case-insensitively. Duplicate variants are removed;
/// the result is never empty.
///
/// # Examples
///
/// ```
/// use adlink_audit::url::expand_url;
///
/// let mut urls = expand_url("https://shop.example/{ifmobile:m}{ifnotmobile:d}");
/// urls.sort();
/// assert_eq!(urls, vec!["https://shop.example/d", "https://shop.example/m"]);
///
/// assert_eq!(expand_url("https://shop.example/?q={keyword}"), vec!["https://shop.example/?q="]);
/// ```
pub fn expand_url(url: &str) -> Vec<String> {
    if !url.contains('{') {
        return vec![url.to_string()];
    }

    let segments = parse_segments(url);

    let mobile_axis = axis_choices(&segments, MOBILE_TAGS);
    let network_axis = axis_choices(&segments, NETWORK_TAGS);

    let mut variants: Vec<String> = Vec::new();
    for &mobile in &mobile_axis {
        for &network in &network_axis {
            let rendered = render(&segments, mobile, network);
            if !variants.contains(&rendered) {
                variants.push(rendered);
            }
        }
    }

    variants
}

/// Splits a URL into literal text and bracketed tags
///
/// An opening brace without a matching closing brace is kept as text.
fn parse_segments(url: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = url;

    while let Some(open) = rest.find('{') {
        let Some(close_offset) = rest[open..].find('}') else {
            break;
        };
        let close = open + close_offset;

        if open > 0 {
            segments.push(Segment::Text(&rest[..open]));
        }

        let inner = &rest[open + 1..close];
        let (name, value) = match inner.split_once(':') {
            Some((name, value)) => (name, value),
            None => (inner, ""),
        };
        segments.push(Segment::Tag {
            name: name.trim().to_ascii_lowercase(),
            value,
        });

        rest = &rest[close + 1..];
    }

    if !rest.is_empty() {
        segments.push(Segment::Text(rest));
    }

    segments
}

/// Returns the branches of one axis: `[Some(true), Some(false)]` if either
/// tag of the pair occurs, `[None]` otherwise
fn axis_choices(segments: &[Segment<'_>], (first, second): (&str, &str)) -> Vec<Option<bool>> {
    let present = segments.iter().any(|segment| {
        matches!(segment, Segment::Tag { name, .. } if name == first || name == second)
    });

    if present {
        vec![Some(true), Some(false)]
    } else {
        vec![None]
    }
}

/// Renders one variant; `mobile`/`network` select the first tag of the
/// respective pair when `Some(true)`
fn render(segments: &[Segment<'_>], mobile: Option<bool>, network: Option<bool>) -> String {
    let mut out = String::new();

    for segment in segments {
        match segment {
            Segment::Text(text) => out.push_str(text),
            Segment::Tag { name, value } => {
                let keep = match name.as_str() {
                    n if n == MOBILE_TAGS.0 => mobile == Some(true),
                    n if n == MOBILE_TAGS.1 => mobile == Some(false),
                    n if n == NETWORK_TAGS.0 => network == Some(true),
                    n if n == NETWORK_TAGS.1 => network == Some(false),
                    // Generic ValueTrack parameter
                    _ => false,
                };
                if keep {
                    out.push_str(value);
                }
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn expand_set(url: &str) -> HashSet<String> {
        expand_url(url).into_iter().collect()
    }

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_mobile_pair() {
        assert_eq!(expand_set("{ifmobile:a}{ifnotmobile:b}"), set(&["a", "b"]));
    }

    #[test]
    fn test_both_axes_cross_product() {
        let urls = expand_url("{ifsearch:x}{ifcontent:y}{ifmobile:m}{ifnotmobile:n}");
        assert_eq!(urls.len(), 4);
        assert_eq!(
            urls.into_iter().collect::<HashSet<_>>(),
            set(&["xm", "xn", "ym", "yn"])
        );
    }

    #[test]
    fn test_plain_url_unchanged() {
        let url = "https://shop.example/products?id=7";
        assert_eq!(expand_url(url), vec![url.to_string()]);
    }

    #[test]
    fn test_unknown_placeholder_stripped() {
        assert_eq!(
            expand_url("https://shop.example/{foo}/landing"),
            vec!["https://shop.example//landing".to_string()]
        );
    }

    #[test]
    fn test_tag_names_case_insensitive() {
        assert_eq!(
            expand_set("https://shop.example/{IfMobile:m}{IFNOTMOBILE:d}"),
            set(&["https://shop.example/m", "https://shop.example/d"])
        );
    }

    #[test]
    fn test_single_member_of_pair_still_branches() {
        assert_eq!(
            expand_set("https://shop.example/{ifmobile:mobile/}home"),
            set(&["https://shop.example/mobile/home", "https://shop.example/home"])
        );
    }

    #[test]
    fn test_duplicate_variants_removed() {
        // Both branches render the same URL
        assert_eq!(
            expand_url("https://shop.example/{ifsearch:}{ifcontent:}"),
            vec!["https://shop.example/".to_string()]
        );
    }

    #[test]
    fn test_generic_params_stripped_from_every_variant() {
        assert_eq!(
            expand_set("https://shop.example/?kw={keyword}&d={ifmobile:m}{ifnotmobile:d}"),
            set(&["https://shop.example/?kw=&d=m", "https://shop.example/?kw=&d=d"])
        );
    }

    #[test]
    fn test_value_may_contain_colons() {
        assert_eq!(
            expand_set("{ifmobile:https://m.shop.example}{ifnotmobile:https://shop.example}"),
            set(&["https://m.shop.example", "https://shop.example"])
        );
    }

    #[test]
    fn test_unclosed_brace_kept_as_text() {
        assert_eq!(
            expand_url("https://shop.example/{ifmobile:m"),
            vec!["https://shop.example/{ifmobile:m".to_string()]
        );
    }
}
