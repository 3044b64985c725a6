#![no_main]

use libfuzzer_sys::fuzz_target;

// Raw bytes through every entry point. Only panics are bugs; errors are expected.
fuzz_target!(|data: &[u8]| {
    if data.len() > 64 * 1024 {
        return;
    }

    let _ = yaml_loader::load_slice(data);
    let _ = yaml_loader::load_all_reader(data);

    if let Ok(text) = std::str::from_utf8(data) {
        for schema in [
            yaml_loader::SchemaKind::Failsafe,
            yaml_loader::SchemaKind::Json,
            yaml_loader::SchemaKind::Core,
        ] {
            let options = yaml_loader::options! { schema: schema };
            if let Err(err) = yaml_loader::load_all_with_options(text, options) {
                let _ = err.to_string();
                let _ = err.render(text, "fuzz.yaml");
            }
        }
    }
});
