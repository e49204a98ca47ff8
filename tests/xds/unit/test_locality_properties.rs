use flowplane_xds::xds::locality::{
    convert_locality, is_locality_empty, locality_match, locality_to_string,
};
use proptest::prelude::*;

const SEGMENT: &str = "[a-z0-9\\-]{1,12}";

proptest! {
    #[test]
    fn one_to_three_segments_round_trip(parts in prop::collection::vec(SEGMENT, 1..=3)) {
        let text = parts.join("/");
        let locality = convert_locality(&text);
        prop_assert_eq!(locality_to_string(locality.as_ref()), text);
    }

    #[test]
    fn rack_segment_is_dropped(
        region in SEGMENT,
        zone in SEGMENT,
        sub_zone in SEGMENT,
        rack in SEGMENT,
    ) {
        let locality = convert_locality(&format!("{}/{}/{}/{}", region, zone, sub_zone, rack));
        prop_assert_eq!(
            locality_to_string(locality.as_ref()),
            format!("{}/{}/{}", region, zone, sub_zone)
        );
    }

    #[test]
    fn wildcard_matches_everything(parts in prop::collection::vec(SEGMENT, 0..=3)) {
        let locality = convert_locality(&parts.join("/"));
        prop_assert!(locality_match(locality.as_ref(), "*"));
    }

    #[test]
    fn locality_matches_itself(parts in prop::collection::vec(SEGMENT, 1..=3)) {
        let text = parts.join("/");
        let locality = convert_locality(&text);
        prop_assert!(locality_match(locality.as_ref(), &text));
    }

    #[test]
    fn zone_wildcard_matches_any_sub_zone(
        region in SEGMENT,
        zone in SEGMENT,
        sub_zone in SEGMENT,
    ) {
        let locality = convert_locality(&format!("{}/{}/{}", region, zone, sub_zone));
        let zone_rule = format!("{}/{}/*", region, zone);
        let region_rule = format!("{}/*", region);
        prop_assert!(locality_match(locality.as_ref(), &zone_rule));
        prop_assert!(locality_match(locality.as_ref(), &region_rule));
    }

    #[test]
    fn different_region_never_matches(region in SEGMENT, other in SEGMENT, zone in SEGMENT) {
        prop_assume!(region != other);
        let locality = convert_locality(&format!("{}/{}", region, zone));
        let rule = format!("{}/*", other);
        prop_assert!(!locality_match(locality.as_ref(), &rule));
    }

    #[test]
    fn region_wildcard_still_checks_zone(region in SEGMENT, zone in SEGMENT, other in SEGMENT) {
        prop_assume!(zone != other);
        let locality = convert_locality(&format!("{}/{}", region, zone));
        let matching = format!("*/{}", zone);
        let mismatched = format!("*/{}", other);
        prop_assert!(locality_match(locality.as_ref(), &matching));
        prop_assert!(!locality_match(locality.as_ref(), &mismatched));
    }

    #[test]
    fn parsed_locality_is_not_empty(parts in prop::collection::vec(SEGMENT, 1..=3)) {
        let locality = convert_locality(&parts.join("/"));
        prop_assert!(!is_locality_empty(locality.as_ref()));
    }
}

#[test]
fn empty_string_is_empty_locality() {
    let locality = convert_locality("");
    assert!(locality.is_none());
    assert!(is_locality_empty(locality.as_ref()));
    assert_eq!(locality_to_string(locality.as_ref()), "");
}
