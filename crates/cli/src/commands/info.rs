use clap::Args;

use super::get::load;
use super::{Context, print_record};
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Fragment ID.
    pub id: String,
}

pub async fn run(ctx: &Context, args: &InfoArgs, format: &OutputFormat) -> anyhow::Result<()> {
    let fragment = load(ctx, &args.id).await?;
    print_record(&fragment.snapshot(), format)
}
