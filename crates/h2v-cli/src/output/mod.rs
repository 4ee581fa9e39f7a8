use h2v_core::NodeVector;

use crate::cli::OutputFormat;

/// Render fitted records to a string in the requested format.
pub fn render(records: &[NodeVector], format: OutputFormat) -> anyhow::Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(records)?),
        OutputFormat::Jsonl => render_jsonl(records),
        OutputFormat::Summary => Ok(render_summary(records)),
    }
}

/// Print fitted records in the requested format.
pub fn output(records: &[NodeVector], format: OutputFormat) -> anyhow::Result<()> {
    let rendered = render(records, format)?;
    println!("{rendered}");
    Ok(())
}

fn render_jsonl(records: &[NodeVector]) -> anyhow::Result<String> {
    let lines = records
        .iter()
        .map(serde_json::to_string)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(lines.join("\n"))
}

fn render_summary(records: &[NodeVector]) -> String {
    if records.is_empty() {
        return String::from("(no elements)");
    }

    let path_width = records.iter().map(|r| r.path.len()).max().unwrap_or(0);
    records
        .iter()
        .map(|record| {
            let (channels, width) = record.vector.shape();
            format!(
                "{:<path_width$}  pos={:.4}  shape=({channels}, {width})  norm={:.4}",
                record.path,
                record.position,
                record.vector.norm(),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
