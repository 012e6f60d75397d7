use clap::Args;

use fragments_convert::{ConversionService, Converted};
use fragments_core::FragmentId;

use super::{Context, write_payload};
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Fragment ID.
    pub id: String,
    /// Target extension (e.g. `html`).
    pub extension: String,
}

pub async fn convert(ctx: &Context, args: &ConvertArgs) -> anyhow::Result<Converted> {
    let service = ConversionService::with_defaults(ctx.store.clone());
    Ok(service
        .convert(&ctx.owner, &FragmentId::new(args.id.as_str()), &args.extension)
        .await?)
}

pub async fn run(ctx: &Context, args: &ConvertArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let converted = convert(ctx, args).await?;
    write_payload(&converted.data, &converted.content_type, format)
}
