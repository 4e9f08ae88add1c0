use std::cmp::Ordering;

use regex::Regex;

use super::VersionTriple;

/// Evaluate whether `version` satisfies `range`.
///
/// Rules are tried in order; the first that applies decides:
/// 1. empty / `*` / `any` — always satisfied
/// 2. space-separated, non-bracketed — AND of each part
/// 3. wildcard (`x` / `*`) without a leading comparator — pattern match
/// 4. wildcard behind a comparator — wildcards become `0`, fall through
/// 5. `~v` — at least `v`, below the next minor of `v`
/// 6. `>=` / `>` / `<=` / `<` — comparator against the parsed bound
/// 7. `[a,b]` and friends — maven-style interval
/// 8. otherwise — exact equality after normalization
pub fn satisfies(version: &str, range: &str) -> bool {
    let range = range.trim();

    // Rule 1: unbounded.
    if range.is_empty() || range == "*" || range.eq_ignore_ascii_case("any") {
        return true;
    }

    // Rule 2: conjunction of parts. Bracketed intervals contain a comma,
    // not spaces, so they never enter this branch.
    if range.contains(' ') && !is_bracketed(range) {
        return range
            .split_whitespace()
            .all(|part| satisfies(version, part));
    }

    let has_wildcard = range.contains('x') || range.contains('*');
    let has_operator = starts_with_operator(range);

    // Rule 3: bare wildcard pattern, e.g. `1.20.x`.
    if has_wildcard && !has_operator {
        return wildcard_matches(version, range);
    }

    // Rule 4: wildcard behind an operator collapses to zero, e.g. `>=1.x`
    // is evaluated as `>=1.0`.
    let range = if has_wildcard && has_operator {
        range.replace(['x', '*'], "0")
    } else {
        range.to_string()
    };
    let range = range.as_str();

    let parsed = VersionTriple::parse(version);

    // Rule 5: tilde — compatible within the same minor.
    if let Some(rest) = range.strip_prefix('~') {
        let floor = VersionTriple::parse(rest);
        return parsed.compare(&floor) != Ordering::Less
            && parsed.compare(&floor.next_minor()) == Ordering::Less;
    }

    // Rule 6: comparators. Two-char forms first.
    if let Some(rest) = range.strip_prefix(">=") {
        return parsed.compare(&VersionTriple::parse(rest)) != Ordering::Less;
    }
    if let Some(rest) = range.strip_prefix("<=") {
        return parsed.compare(&VersionTriple::parse(rest)) != Ordering::Greater;
    }
    if let Some(rest) = range.strip_prefix('>') {
        return parsed.compare(&VersionTriple::parse(rest)) == Ordering::Greater;
    }
    if let Some(rest) = range.strip_prefix('<') {
        return parsed.compare(&VersionTriple::parse(rest)) == Ordering::Less;
    }

    // Rule 7: maven interval with a single comma.
    if is_bracketed(range) && range.matches(',').count() == 1 {
        return interval_contains(&parsed, range);
    }

    // Rule 8: exact equality.
    parsed.compare(&VersionTriple::parse(range)) == Ordering::Equal
}

fn is_bracketed(range: &str) -> bool {
    (range.starts_with('[') || range.starts_with('('))
        && (range.ends_with(']') || range.ends_with(')'))
}

fn starts_with_operator(range: &str) -> bool {
    range.starts_with(">=")
        || range.starts_with('>')
        || range.starts_with("<=")
        || range.starts_with('<')
}

/// Compile a wildcard range to an anchored pattern and match it against the
/// raw version string. `.` is escaped, `x`/`*` become `.*`, and a trailing
/// `+metadata` suffix on the version is tolerated.
fn wildcard_matches(version: &str, range: &str) -> bool {
    let mut body = String::with_capacity(range.len() * 2);
    for c in range.chars() {
        match c {
            '.' => body.push_str("\\."),
            'x' | '*' => body.push_str(".*"),
            other => body.push(other),
        }
    }

    let pattern = format!("^{body}(\\+.*)?$");
    match Regex::new(&pattern) {
        Ok(re) => re.is_match(version),
        Err(_) => false,
    }
}

/// `[a,b]` inclusive, `(a,b)` exclusive, mixed forms allowed; an empty
/// bound is unbounded on that side.
fn interval_contains(version: &VersionTriple, range: &str) -> bool {
    let low_inclusive = range.starts_with('[');
    let high_inclusive = range.ends_with(']');

    let inner = &range[1..range.len() - 1];
    let Some((low, high)) = inner.split_once(',') else {
        return false;
    };

    let low = low.trim();
    let high = high.trim();

    if !low.is_empty() {
        let bound = VersionTriple::parse(low);
        let ord = version.compare(&bound);
        if ord == Ordering::Less || (ord == Ordering::Equal && !low_inclusive) {
            return false;
        }
    }

    if !high.is_empty() {
        let bound = VersionTriple::parse(high);
        let ord = version.compare(&bound);
        if ord == Ordering::Greater || (ord == Ordering::Equal && !high_inclusive) {
            return false;
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn star_and_empty_accept_everything() {
        for v in ["1.0.0", "0.0.0", "99.99.99", "garbage"] {
            assert!(satisfies(v, "*"));
            assert!(satisfies(v, ""));
            assert!(satisfies(v, "any"));
        }
    }

    #[test]
    fn space_separated_is_conjunction() {
        assert!(satisfies("1.5.0", ">=1.0.0 <2.0.0"));
        assert!(!satisfies("2.5.0", ">=1.0.0 <2.0.0"));
    }

    #[test]
    fn wildcard_pattern_matches_prefix() {
        assert!(satisfies("1.20.1", "1.20.x"));
        assert!(satisfies("1.20.4", "1.20.*"));
        assert!(!satisfies("1.19.2", "1.20.x"));
    }

    #[test]
    fn wildcard_tolerates_build_metadata() {
        assert!(satisfies("1.20.1+build.5", "1.20.x"));
    }

    #[test]
    fn wildcard_behind_operator_becomes_zero() {
        assert!(satisfies("1.2.0", ">=1.x"));
        assert!(!satisfies("0.9.0", ">=1.x"));
    }

    #[test]
    fn tilde_stays_within_minor() {
        assert!(satisfies("1.2.3", "~1.2.3"));
        assert!(satisfies("1.2.99", "~1.2.3"));
        assert!(!satisfies("1.3.0", "~1.2.3"));
        assert!(!satisfies("1.2.2", "~1.2.3"));
    }

    #[test]
    fn comparators() {
        assert!(satisfies("2.0.0", ">=2.0.0"));
        assert!(!satisfies("1.9.9", ">=2.0.0"));
        assert!(satisfies("2.0.1", ">2.0.0"));
        assert!(!satisfies("2.0.0", ">2.0.0"));
        assert!(satisfies("2.0.0", "<=2.0.0"));
        assert!(satisfies("1.9.9", "<2.0.0"));
        assert!(!satisfies("2.0.0", "<2.0.0"));
    }

    #[test]
    fn interval_half_open() {
        assert!(satisfies("1.0", "[1.0,2.0)"));
        assert!(satisfies("1.9.9", "[1.0,2.0)"));
        assert!(!satisfies("0.9.9", "[1.0,2.0)"));
        assert!(!satisfies("2.0", "[1.0,2.0)"));
    }

    #[test]
    fn interval_open_bounds_are_unbounded() {
        assert!(satisfies("99.0.0", "[1.0,)"));
        assert!(!satisfies("0.9.0", "[1.0,)"));
        assert!(satisfies("0.1.0", "(,2.0]"));
        assert!(satisfies("2.0.0", "(,2.0]"));
    }

    #[test]
    fn exclusive_low_bound() {
        assert!(!satisfies("1.0.0", "(1.0,2.0]"));
        assert!(satisfies("1.0.1", "(1.0,2.0]"));
    }

    #[test]
    fn exact_equality_fallback() {
        assert!(satisfies("1.2.3", "1.2.3"));
        assert!(!satisfies("1.2.4", "1.2.3"));
        // Normalized equality: trailing noise is ignored.
        assert!(satisfies("1.2.3-beta", "1.2.3"));
    }
}
