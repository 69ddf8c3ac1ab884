#![no_main]

use std::path::Path;

use decycle_core::NodeType;
use decycle_core::graph::parse_edge_list;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    for node_type in [NodeType::Int, NodeType::Str] {
        let _ = parse_edge_list(data, Path::new("fuzz.txt"), node_type);
    }
});
