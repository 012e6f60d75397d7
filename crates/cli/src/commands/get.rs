use clap::Args;

use fragments_core::FragmentId;
use fragments_model::Fragment;

use super::{Context, write_payload};
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct GetArgs {
    /// Fragment ID.
    pub id: String,
}

pub async fn load(ctx: &Context, id: &str) -> anyhow::Result<Fragment> {
    Ok(Fragment::load(&ctx.store, &ctx.owner, &FragmentId::new(id)).await?)
}

pub async fn run(ctx: &Context, args: &GetArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let fragment = load(ctx, &args.id).await?;
    let data = fragment.data().await?;
    write_payload(&data, fragment.media_type(), format)
}
