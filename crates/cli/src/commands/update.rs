use std::path::PathBuf;

use clap::Args;

use fragments_model::Fragment;

use super::get::load;
use super::{Context, print_record, read_input};
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Fragment ID.
    pub id: String,
    /// Content type of the new payload; must match the fragment's type.
    #[arg(long = "type", short = 't')]
    pub content_type: String,
    /// Read the payload from this file instead of stdin.
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
}

pub async fn update(ctx: &Context, args: &UpdateArgs) -> anyhow::Result<Fragment> {
    let mut fragment = load(ctx, &args.id).await?;
    let data = read_input(args.file.as_deref())?;
    fragment.replace_data(&args.content_type, data)?;
    fragment.save().await?;
    Ok(fragment)
}

pub async fn run(ctx: &Context, args: &UpdateArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let fragment = update(ctx, args).await?;
    match format {
        OutputFormat::Json => print_record(&fragment.snapshot(), format)?,
        OutputFormat::Text => {
            println!("Updated fragment: {} ({} bytes)", fragment.id(), fragment.size());
        }
    }
    Ok(())
}
