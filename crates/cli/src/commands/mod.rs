pub mod convert;
pub mod create;
pub mod delete;
pub mod get;
pub mod info;
pub mod list;
pub mod update;

use std::io::{Read, Write};
use std::path::Path;
use std::sync::Arc;

use fragments_core::{FragmentRecord, OwnerId, TypePolicy};
use fragments_store::FragmentStore;

use crate::OutputFormat;

/// Everything a command needs to act on behalf of one owner.
pub struct Context {
    pub store: Arc<dyn FragmentStore>,
    pub owner: OwnerId,
    pub policy: TypePolicy,
}

/// Read a payload from `file`, or from stdin when no file is given.
pub fn read_input(file: Option<&Path>) -> anyhow::Result<Vec<u8>> {
    match file {
        Some(path) => Ok(std::fs::read(path)?),
        None => {
            let mut buf = Vec::new();
            std::io::stdin().read_to_end(&mut buf)?;
            Ok(buf)
        }
    }
}

pub fn print_record(record: &FragmentRecord, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(record)?);
        }
        OutputFormat::Text => {
            println!("ID:      {}", record.id);
            println!("Owner:   {}", record.owner_id);
            println!("Type:    {}", record.media_type);
            println!("Size:    {}", record.size);
            println!("Created: {}", record.created.to_rfc3339());
            println!("Updated: {}", record.updated.to_rfc3339());
        }
    }
    Ok(())
}

/// Write a payload to stdout: raw bytes for text output, or a JSON object
/// carrying the content type and the lossily decoded body.
pub fn write_payload(data: &[u8], content_type: &str, format: &OutputFormat) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => {
            let value = serde_json::json!({
                "type": content_type,
                "data": String::from_utf8_lossy(data),
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Text => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(data)?;
            stdout.flush()?;
        }
    }
    Ok(())
}
