use std::path::PathBuf;

use clap::Args;

use fragments_model::{Fragment, NewFragment};

use super::{Context, print_record, read_input};
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct CreateArgs {
    /// Content type of the payload (e.g. `text/markdown`).
    #[arg(long = "type", short = 't')]
    pub content_type: String,
    /// Read the payload from this file instead of stdin.
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,
}

pub async fn create(ctx: &Context, args: &CreateArgs) -> anyhow::Result<Fragment> {
    let data = read_input(args.file.as_deref())?;
    let fragment = Fragment::new(
        ctx.store.clone(),
        NewFragment::new(ctx.owner.clone(), args.content_type.as_str())
            .with_policy(ctx.policy)
            .with_data(data),
    )?;
    fragment.save().await?;
    Ok(fragment)
}

pub async fn run(ctx: &Context, args: &CreateArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let fragment = create(ctx, args).await?;
    match format {
        OutputFormat::Json => print_record(&fragment.snapshot(), format)?,
        OutputFormat::Text => {
            println!("Created fragment: {}", fragment.id());
        }
    }
    Ok(())
}
