//! Generate JSON Schema for the composer configuration
//!
//! Hosts use the output to render a settings editor for the recovery and
//! detector sections.
//!
//! Usage:
//!   cargo run --features dev-bins --bin generate_schema > config-schema.json

use mirror::config::config_schema;

fn main() {
    let mut json = config_schema();

    // The keyword lists are data, not something to validate against
    if let Some(keywords) = json.pointer_mut("/$defs/DetectorConfig/properties/keywords") {
        if let Some(obj) = keywords.as_object_mut() {
            obj.remove("default");
        }
    }

    match serde_json::to_string_pretty(&json) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("Failed to serialize schema: {e}");
            std::process::exit(1);
        }
    }
}
