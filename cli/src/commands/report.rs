use anyhow::Result;
use mpa_report::{overlap::OverlapOptions, Report};
use serde_json::{json, Map};
use tracing::info;

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::RunArgs) -> Result<()> {
    let inputs = super::load(&args.project)?;

    let options = OverlapOptions {
        area_method: inputs.project.area_method(),
        include_children: !args.no_child_metrics,
    };
    let report = Report::new(&inputs.project, &args.group, inputs.source.as_ref())?
        .with_options(options);

    let percent = args.percent || args.objectives;
    let result = if percent {
        let (result, warnings) = report.run_with_percent(&inputs.sketch, args.geography.as_deref())?;
        if !warnings.is_empty() {
            info!("{} percent metrics have no regional total", warnings.len());
        }
        result
    } else {
        report.run(&inputs.sketch)?
    };

    let mut output = Map::new();
    output.insert("metrics".into(), json!(result.metrics));
    if args.objectives {
        output.insert("objectives".into(), json!(report.objectives(&result.metrics)?));
    }
    if args.children {
        let mut children = Map::new();
        children.insert(args.group.clone(), json!(report.child_table(&inputs.sketch, &result.metrics, &args.group)));
        if percent {
            let perc_id = report.group().perc_metric_id();
            let rows = report.child_table(&inputs.sketch, &result.metrics, &perc_id);
            children.insert(perc_id, json!(rows));
        }
        output.insert("children".into(), json!(children));
    }

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
