use anyhow::Result;
use serde::Serialize;

use crate::commands::util::load_config;

#[derive(Debug, Serialize)]
pub struct PrimitivesInfo {
    pub input_primitives: Vec<String>,
    pub format_primitives: Vec<String>,
}

/// List the callees treated as input sources and as format-string functions.
pub fn primitives_command(config_path: Option<&str>, json: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let mut info = PrimitivesInfo {
        input_primitives: config.input_primitives,
        format_primitives: config.format_primitives,
    };
    info.input_primitives.sort();
    info.format_primitives.sort();

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!("Input primitives:");
    for name in &info.input_primitives {
        println!("- {name}");
    }
    println!("Format primitives:");
    for name in &info.format_primitives {
        println!("- {name}");
    }
    Ok(())
}
