//! Show one native file dialog and print the result.
//!
//! Run with: cargo run -p horizon-filedialog --example pick -- [open|multiple|save|folder] [FILTER_JSON]
//!
//! FILTER_JSON is any accepted filter shape, for example
//! `'{"PDF-Files": "*.pdf", "Python Project": ["*.py", "*.md"]}'`.
//! Set `RUST_LOG=horizon_filedialog=debug` to see backend selection and the
//! helper invocation.

use std::path::Path;

use horizon_filedialog::{DialogError, FileDialogs, FilterSpec};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let mode = args.next().unwrap_or_else(|| "open".to_string());
    let filter = match args.next() {
        Some(json) => FilterSpec::from_json(&serde_json::from_str(&json)?)?,
        None => Some(
            horizon_filedialog::LabeledFilters::new()
                .entry("PDF-Files", "*.pdf")
                .entry("Python Project", ["*.py", "*.md"])
                .build(),
        ),
    };

    let dialogs = FileDialogs::detect()?;
    println!("Using backend: {}", dialogs.backend_kind());

    let home = std::env::var_os("HOME");
    let start_dir = home.as_deref().map(Path::new);

    match mode.as_str() {
        "open" => println!("{:?}", dialogs.open_file(None, start_dir, filter.as_ref())?),
        "multiple" => println!("{:?}", dialogs.open_multiple(None, start_dir, filter.as_ref())?),
        "save" => println!("{:?}", dialogs.save_file(None, start_dir)?),
        "folder" => println!("{:?}", dialogs.choose_folder(None, start_dir)?),
        other => {
            return Err(DialogError::config(format!(
                "unknown mode '{other}', expected open, multiple, save or folder"
            ))
            .into());
        }
    }

    println!("Next dialog starts in: {:?}", dialogs.memory().preferred());
    Ok(())
}
