#![no_main]

use libfuzzer_sys::fuzz_target;

// Mappings whose keys come from the input, so equal keys in different spellings meet.
fuzz_target!(|data: &[u8]| {
    if data.len() > 16 * 1024 {
        return;
    }

    let s = String::from_utf8_lossy(data);
    let mut parts = s.splitn(2, '\n');
    let first = parts.next().unwrap_or_default();
    let second = parts.next().unwrap_or_default();

    let yaml_block = format!("{first}: 1\n{second}: 2\n");
    let yaml_flow = format!("{{{first}: 1, {second}: 2}}");
    let yaml_complex = format!("? [{first}]\n: 1\n? [{second}]\n: 2\n");

    for y in [&yaml_block, &yaml_flow, &yaml_complex] {
        let _ = yaml_loader::load(y);
    }
});
