#![no_main]
use libfuzzer_sys::fuzz_target;

use homestay_finder::domain::search_query::SearchQuery;

fuzz_target!(|data: &[u8]| {
    if let Ok(raw) = std::str::from_utf8(data)
        && let Ok(query) = SearchQuery::parse(raw)
    {
        let _ = query.validate();
        let _ = query.to_criteria(&[2, 4, 6, 8]);
        let _ = query.to_query_string();
    }
});
