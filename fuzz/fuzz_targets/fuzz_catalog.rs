#![no_main]
use libfuzzer_sys::fuzz_target;

use homestay_finder::domain::criteria::FilterCriteria;
use homestay_finder::domain::filter::evaluate;

fuzz_target!(|data: &[u8]| {
    if let Ok(json) = std::str::from_utf8(data)
        && let Ok(listings) = homestay_finder::adapters::source::catalog::parse_catalog(json)
    {
        let all = evaluate(&listings, &FilterCriteria::default());
        assert_eq!(all.len(), listings.len());
    }
});
