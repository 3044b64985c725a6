#![no_main]

use libfuzzer_sys::fuzz_target;

// Block scalar headers and bodies: indentation indicators, chomping, blank lines.
fuzz_target!(|data: &[u8]| {
    if data.len() > 16 * 1024 {
        return;
    }

    let s = String::from_utf8_lossy(data);
    let indented: String = s.lines().map(|line| format!("  {line}\n")).collect();

    for header in ["|", ">", "|-", ">+", "|2", ">1-", "|+3"] {
        let yaml_top = format!("--- {header}\n{indented}");
        let yaml_value = format!("key: {header}\n{indented}next: 1\n");
        let yaml_seq = format!("- {header}\n{indented}- {header}\n{s}");
        for y in [&yaml_top, &yaml_value, &yaml_seq] {
            let _ = yaml_loader::load_all(y);
        }
    }
});
