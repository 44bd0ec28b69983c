//! `<dataValidations>` fragment

use cellforge_core::{DataValidation, ValidationErrorStyle, ValidationType};
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

/// Render a sheet's validations, or `None` if none can be written
///
/// Ranges beyond the sheet limits are dropped; validations left without a
/// target range are skipped.
pub(crate) fn data_validations_xml(
    validations: &[DataValidation],
) -> Result<Option<Vec<u8>>, quick_xml::Error> {
    let writable: Vec<(&DataValidation, String)> = validations
        .iter()
        .filter_map(|v| {
            let kind = v.validation_type.xlsx_type();
            for range in v.ranges.iter().filter(|r| !r.is_valid()) {
                log::warn!(
                    "{kind} data validation: dropping range {}, beyond sheet limits",
                    range.to_a1_string()
                );
            }
            let sqref = v
                .ranges
                .iter()
                .filter(|r| r.is_valid())
                .map(|r| r.to_a1_string())
                .collect::<Vec<_>>()
                .join(" ");
            if sqref.is_empty() {
                log::warn!("skipping {kind} data validation without ranges");
                return None;
            }
            Some((v, sqref))
        })
        .collect();
    if writable.is_empty() {
        return Ok(None);
    }

    let mut writer = Writer::new(Vec::new());
    let mut dvs = BytesStart::new("dataValidations");
    dvs.push_attribute(("count", itoa::Buffer::new().format(writable.len())));
    writer.write_event(Event::Start(dvs))?;

    for (validation, sqref) in writable {
        write_validation(&mut writer, validation, &sqref)?;
    }

    writer.write_event(Event::End(BytesEnd::new("dataValidations")))?;
    Ok(Some(writer.into_inner()))
}

fn write_validation(
    writer: &mut Writer<Vec<u8>>,
    validation: &DataValidation,
    sqref: &str,
) -> Result<(), quick_xml::Error> {
    let kind = &validation.validation_type;
    let mut dv = BytesStart::new("dataValidation");

    if !matches!(kind, ValidationType::None) {
        dv.push_attribute(("type", kind.xlsx_type()));
    }
    if let Some(comparison) = kind.comparison() {
        dv.push_attribute(("operator", comparison.operator.xlsx_operator()));
    }
    if validation.allow_blank {
        dv.push_attribute(("allowBlank", "1"));
    }
    if validation.show_input_message {
        dv.push_attribute(("showInputMessage", "1"));
    }
    if validation.show_error_alert {
        dv.push_attribute(("showErrorMessage", "1"));
    }
    if validation.error_style != ValidationErrorStyle::Stop {
        dv.push_attribute(("errorStyle", validation.error_style.xlsx_style()));
    }
    if let Some(title) = &validation.error_title {
        dv.push_attribute(("errorTitle", title.as_str()));
    }
    if let Some(message) = &validation.error_message {
        dv.push_attribute(("error", message.as_str()));
    }
    if let Some(title) = &validation.input_title {
        dv.push_attribute(("promptTitle", title.as_str()));
    }
    if let Some(message) = &validation.input_message {
        dv.push_attribute(("prompt", message.as_str()));
    }
    dv.push_attribute(("sqref", sqref));

    let formula1 = match kind {
        ValidationType::List { source } => Some(list_source(source)),
        _ => kind.formula1().map(|f| f.strip_prefix('=').unwrap_or(f).to_string()),
    };
    let formula2 = kind.formula2().map(|f| f.strip_prefix('=').unwrap_or(f));

    if formula1.is_none() {
        writer.write_event(Event::Empty(dv))?;
        return Ok(());
    }

    writer.write_event(Event::Start(dv))?;
    if let Some(f) = &formula1 {
        write_formula(writer, "formula1", f)?;
    }
    if let Some(f) = formula2 {
        write_formula(writer, "formula2", f)?;
    }
    writer.write_event(Event::End(BytesEnd::new("dataValidation")))?;
    Ok(())
}

fn write_formula(
    writer: &mut Writer<Vec<u8>>,
    name: &str,
    text: &str,
) -> Result<(), quick_xml::Error> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

/// List sources are either a reference (`$A$1:$A$5`, `Lists!A1:A3`) or an
/// inline comma separated list, which must be quoted
fn list_source(source: &str) -> String {
    if let Some(formula) = source.strip_prefix('=') {
        formula.to_string()
    } else if source.contains('!')
        || source
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '$' || c == ':')
    {
        source.to_string()
    } else {
        format!("\"{source}\"")
    }
}
