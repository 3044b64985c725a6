#![no_main]

use libfuzzer_sys::fuzz_target;

// Biases inputs toward anchors and aliases, including aliases used as keys.
fuzz_target!(|data: &[u8]| {
    if data.len() > 16 * 1024 {
        return;
    }

    let s = String::from_utf8_lossy(data);

    let yaml_alias = format!("a: &A {s}\nb: *A\nseq: &S [1, *A, 3]\nseq_alias: *S\n");
    let yaml_keys = format!("base: &K {s}\n? *K\n: value\nlist: [*K, *K, *K]\n");
    let yaml_nested = format!("- &X [{s}, &Y {{k: *X}}]\n- *Y\n");

    let tight = yaml_loader::options! {
        budget: Some(yaml_loader::budget! {
            max_materialized_values: 10_000,
        }),
    };
    for y in [&yaml_alias, &yaml_keys, &yaml_nested] {
        let _ = yaml_loader::load(y);
        let _ = yaml_loader::load_with_options(y, tight.clone());
    }
});
