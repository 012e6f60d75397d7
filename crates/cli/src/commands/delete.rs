use clap::Args;

use super::Context;
use super::get::load;
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Fragment ID.
    pub id: String,
}

pub async fn delete(ctx: &Context, args: &DeleteArgs) -> anyhow::Result<()> {
    let fragment = load(ctx, &args.id).await?;
    if !fragment.delete().await? {
        anyhow::bail!("fragment not found: {}", fragment.key());
    }
    Ok(())
}

pub async fn run(ctx: &Context, args: &DeleteArgs, format: &OutputFormat) -> anyhow::Result<()> {
    delete(ctx, args).await?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::json!({ "id": args.id, "deleted": true }));
        }
        OutputFormat::Text => {
            println!("Deleted fragment: {}", args.id);
        }
    }
    Ok(())
}
