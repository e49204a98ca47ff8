//! Locality string conversion and rule matching.
//!
//! Mesh localities are written as `region/zone/subzone`. A fourth `rack`
//! segment is accepted on input for compatibility and dropped, since Envoy's
//! `Locality` has nowhere to put it. Formatting therefore never reproduces a
//! four-segment string.

use envoy_types::pb::envoy::config::core::v3::Locality;

const WILDCARD: &str = "*";

/// Parse a `region/zone/subzone[/rack]` string. Empty input yields `None`.
pub fn convert_locality(locality: &str) -> Option<Locality> {
    if locality.is_empty() {
        return None;
    }

    let mut parts = locality.splitn(4, '/');
    let mut next = || parts.next().unwrap_or_default().to_string();

    Some(Locality { region: next(), zone: next(), sub_zone: next() })
}

/// Format a locality back into its slash-delimited form.
///
/// Stops at the first unset level, so a locality without a zone prints as
/// just its region. An empty locality prints as the empty string.
pub fn locality_to_string(locality: Option<&Locality>) -> String {
    let Some(locality) = locality else {
        return String::new();
    };

    let levels = [&locality.region, &locality.zone, &locality.sub_zone];
    levels
        .iter()
        .take_while(|level| !level.is_empty())
        .map(|level| level.as_str())
        .collect::<Vec<_>>()
        .join("/")
}

/// Match a locality against a rule such as `region1/zone1/*`.
///
/// A `*` or empty segment matches any value at its level. Levels past the
/// end of the rule are not compared, so `region1/*` covers every zone and
/// sub-zone of `region1` while `*/zone1` still requires `zone1`.
pub fn locality_match(locality: Option<&Locality>, rule: &str) -> bool {
    if rule == WILDCARD {
        return true;
    }

    let (region, zone, sub_zone) = match locality {
        Some(l) => (l.region.as_str(), l.zone.as_str(), l.sub_zone.as_str()),
        None => ("", "", ""),
    };

    for (segment, field) in rule.splitn(3, '/').zip([region, zone, sub_zone]) {
        if segment == WILDCARD || segment.is_empty() {
            continue;
        }
        if segment != field {
            return false;
        }
    }

    true
}

/// A locality is empty when it is absent or has no region.
pub fn is_locality_empty(locality: Option<&Locality>) -> bool {
    locality.map_or(true, |l| l.region.is_empty())
}
