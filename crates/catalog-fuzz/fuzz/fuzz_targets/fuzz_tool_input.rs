#![no_main]

use harvard_library_mcp::models::{AdvancedSearchInput, DateRangeSearchInput, RecordDetailsInput};
use harvard_library_mcp::search::{self, Paging};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(json) = serde_json::from_slice::<serde_json::Value>(data) {
        if let Ok(input) = serde_json::from_value::<AdvancedSearchInput>(json.clone()) {
            let fields = search::advanced_fields(&input);
            let sort = input.sort_by.as_deref().map(|key| (key, input.sort_order));
            let _ = search::advanced(&fields, sort, Paging::from(&input.page));
        }
        if let Ok(input) = serde_json::from_value::<DateRangeSearchInput>(json.clone()) {
            let _ = search::by_date_range(&input.start_date, &input.end_date, input.query.as_deref(), Paging::from(&input.page));
        }
        let _ = serde_json::from_value::<RecordDetailsInput>(json);
    }
});
