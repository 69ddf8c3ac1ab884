#![no_main]

use decycle_core::{EdgeSet, Relabeling, extract_edges, parse_forest};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(forest) = parse_forest(text) else {
        return;
    };
    let Ok(edges) = extract_edges(&forest) else {
        return;
    };

    let relabeling = Relabeling::from_edges(&edges);
    assert_eq!(relabeling.edges().len(), edges.len());
    let restored: EdgeSet = relabeling
        .edges()
        .iter()
        .map(|&(s, t)| {
            (
                relabeling.key(s).expect("id in range").to_string(),
                relabeling.key(t).expect("id in range").to_string(),
            )
        })
        .collect();
    assert_eq!(restored, edges);
});
