use clap::Args;

use fragments_core::FragmentId;
use fragments_model::Fragment;

use super::Context;
use crate::OutputFormat;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Show full metadata instead of bare ids.
    #[arg(long)]
    pub expand: bool,
}

pub async fn ids(ctx: &Context) -> anyhow::Result<Vec<FragmentId>> {
    let mut ids = Fragment::list_ids(&ctx.store, &ctx.owner).await?;
    ids.sort_unstable();
    Ok(ids)
}

pub async fn run(ctx: &Context, args: &ListArgs, format: &OutputFormat) -> anyhow::Result<()> {
    if args.expand {
        let mut records: Vec<_> = Fragment::list(&ctx.store, &ctx.owner)
            .await?
            .iter()
            .map(Fragment::snapshot)
            .collect();
        records.sort_by(|a, b| a.created.cmp(&b.created).then_with(|| a.id.cmp(&b.id)));

        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&records)?);
            }
            OutputFormat::Text => {
                println!("{} fragments:", records.len());
                for r in &records {
                    println!(
                        "  {id} | {ty} | {size} bytes | updated {updated}",
                        id = r.id,
                        ty = r.media_type,
                        size = r.size,
                        updated = r.updated.to_rfc3339(),
                    );
                }
            }
        }
        return Ok(());
    }

    let ids = ids(ctx).await?;
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&ids)?);
        }
        OutputFormat::Text => {
            for id in &ids {
                println!("{id}");
            }
        }
    }
    Ok(())
}
