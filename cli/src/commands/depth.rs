use anyhow::Result;
use mpa_report::Report;
use serde_json::json;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::DepthArgs) -> Result<()> {
    let inputs = super::load(&args.project)?;
    let report = Report::new(&inputs.project, &args.group, inputs.source.as_ref())?;

    let rows = report.depth(&inputs.sketch)?.into_iter()
        .map(|stats| json!({ "display": stats.display_range(), "stats": stats }))
        .collect::<Vec<_>>();

    println!("{}", serde_json::to_string_pretty(&rows)?);
    Ok(())
}
