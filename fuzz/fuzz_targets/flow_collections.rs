#![no_main]

use libfuzzer_sys::fuzz_target;

// Wraps the input into flow collections in several ways.
fuzz_target!(|data: &[u8]| {
    if data.len() > 16 * 1024 {
        return;
    }

    let s = String::from_utf8_lossy(data);

    let yaml_seq = format!("[{s}]");
    let yaml_map = format!("{{{s}}}");
    let yaml_doc = format!("root: {{{s}}}\narray: [{s}]\n");
    let yaml_nested = format!("- [{s}, {{? {s} : {s}}}]\n");

    for y in [&yaml_seq, &yaml_map, &yaml_doc, &yaml_nested] {
        let _ = yaml_loader::load_all(y);
        let _ = yaml_loader::parse_nodes(y, &yaml_loader::Options::default());
    }
});
