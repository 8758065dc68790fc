use crate::cli::args::CliArgs;

pub fn validate(args: &CliArgs) -> Result<(), String> {
    for raw in args.select.iter() {
        crate::utils::parse_cell_ref(raw).map_err(|e| format!("invalid --select: {e}"))?;
    }
    if let Some(raw) = args.variant.as_deref() {
        crate::utils::parse_variant(raw).map_err(|e| format!("invalid --variant '{raw}': {e}"))?;
    }
    if let Some(raw) = args.date.as_deref() {
        crate::catalog::parse_date(raw).map_err(|e| format!("invalid --date: {e}"))?;
    }
    if let Some(raw) = args.output_format.as_deref() {
        if crate::output::OutputFormat::parse(raw).is_none() {
            return Err(format!(
                "invalid --output-format '{raw}', expected text, json, xml or html"
            ));
        }
    }
    if let Some(timeout) = args.timeout {
        if timeout == 0 {
            return Err("invalid timeout, expected positive integer".to_string());
        }
    }
    if args.input.is_some() && args.api_url.is_some() {
        return Err("use either --input or --api-url, not both".to_string());
    }
    Ok(())
}
