//! `<autoFilter>` fragment

use cellforge_core::{AutoFilter, FilterCriterion, FilterJoin, NumberFormatter};
use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Writer;

/// A column holds at most this many `<customFilter>` entries
const MAX_CUSTOM_FILTERS: usize = 2;

/// Render an auto filter, conditions grouped per column
///
/// `colId` is relative to the first column of the filter range. Each
/// `<filterColumn>` holds one kind of filter; the kind of the column's
/// first condition wins and conflicting conditions are dropped. Returns
/// `None` when the range lies beyond the sheet limits. Conditions on columns
/// outside the range are dropped.
pub(crate) fn auto_filter_xml(filter: &AutoFilter) -> Result<Option<Vec<u8>>, quick_xml::Error> {
    if !filter.range.is_valid() {
        log::warn!(
            "skipping autoFilter {}, range beyond sheet limits",
            filter.range.to_a1_string()
        );
        return Ok(None);
    }

    let mut writer = Writer::new(Vec::new());
    let reference = filter.range.to_a1_string();

    let mut auto_filter = BytesStart::new("autoFilter");
    auto_filter.push_attribute(("ref", reference.as_str()));

    let columns: Vec<_> = filter
        .columns()
        .into_iter()
        .filter_map(|(column, criteria)| {
            match column.checked_sub(filter.range.start.col) {
                Some(col_id) if column <= filter.range.end.col => Some((col_id, column, criteria)),
                _ => {
                    log::warn!(
                        "autoFilter {reference}: dropping conditions on column {column}, outside the range"
                    );
                    None
                }
            }
        })
        .collect();

    if columns.is_empty() {
        writer.write_event(Event::Empty(auto_filter))?;
        return Ok(Some(writer.into_inner()));
    }
    writer.write_event(Event::Start(auto_filter))?;

    for (col_id, column, criteria) in columns {
        let mut fc = BytesStart::new("filterColumn");
        fc.push_attribute(("colId", itoa::Buffer::new().format(col_id)));
        writer.write_event(Event::Start(fc))?;

        match criteria.first() {
            Some(FilterCriterion::Custom { .. }) => {
                write_custom_filters(&mut writer, column, filter.join(column), &criteria)?
            }
            Some(FilterCriterion::Top10 { .. }) => write_top10(&mut writer, column, &criteria)?,
            Some(FilterCriterion::Values(_)) => write_values(&mut writer, column, &criteria)?,
            None => {}
        }

        writer.write_event(Event::End(BytesEnd::new("filterColumn")))?;
    }

    writer.write_event(Event::End(BytesEnd::new("autoFilter")))?;
    Ok(Some(writer.into_inner()))
}

fn write_custom_filters(
    writer: &mut Writer<Vec<u8>>,
    column: u16,
    join: FilterJoin,
    criteria: &[&FilterCriterion],
) -> Result<(), quick_xml::Error> {
    let entries: Vec<_> = criteria
        .iter()
        .filter_map(|c| match c {
            FilterCriterion::Custom { operator, value } => Some((operator, value)),
            _ => None,
        })
        .collect();
    if entries.len() != criteria.len() {
        log::warn!("autoFilter column {column}: mixed filter kinds, keeping custom filters only");
    }
    if entries.len() > MAX_CUSTOM_FILTERS {
        log::warn!(
            "autoFilter column {column}: {} custom filters, keeping the first {MAX_CUSTOM_FILTERS}",
            entries.len()
        );
    }

    let mut custom = BytesStart::new("customFilters");
    if join == FilterJoin::And {
        custom.push_attribute(("and", "1"));
    }
    writer.write_event(Event::Start(custom))?;

    for (operator, value) in entries.into_iter().take(MAX_CUSTOM_FILTERS) {
        let mut cf = BytesStart::new("customFilter");
        cf.push_attribute(("operator", operator.xlsx_operator()));
        cf.push_attribute(("val", value.as_str()));
        writer.write_event(Event::Empty(cf))?;
    }

    writer.write_event(Event::End(BytesEnd::new("customFilters")))?;
    Ok(())
}

fn write_top10(
    writer: &mut Writer<Vec<u8>>,
    column: u16,
    criteria: &[&FilterCriterion],
) -> Result<(), quick_xml::Error> {
    if criteria.len() > 1 {
        log::warn!("autoFilter column {column}: only one top10 filter is kept");
    }
    let Some(FilterCriterion::Top10 {
        top,
        percent,
        value,
    }) = criteria.first()
    else {
        return Ok(());
    };

    let value = match NumberFormatter::round_trip().format(*value) {
        Ok(v) => v,
        Err(e) => {
            log::warn!("autoFilter column {column}: skipping top10 filter, {e}");
            return Ok(());
        }
    };

    let mut top10 = BytesStart::new("top10");
    if !top {
        top10.push_attribute(("top", "0"));
    }
    if *percent {
        top10.push_attribute(("percent", "1"));
    }
    top10.push_attribute(("val", value.as_str()));
    writer.write_event(Event::Empty(top10))?;
    Ok(())
}

fn write_values(
    writer: &mut Writer<Vec<u8>>,
    column: u16,
    criteria: &[&FilterCriterion],
) -> Result<(), quick_xml::Error> {
    let mut values: Vec<&str> = Vec::new();
    for criterion in criteria {
        match criterion {
            FilterCriterion::Values(list) => {
                values.extend(list.iter().map(String::as_str));
            }
            _ => log::warn!("autoFilter column {column}: mixed filter kinds, keeping value lists only"),
        }
    }

    writer.write_event(Event::Start(BytesStart::new("filters")))?;
    for value in values {
        let mut f = BytesStart::new("filter");
        f.push_attribute(("val", value));
        writer.write_event(Event::Empty(f))?;
    }
    writer.write_event(Event::End(BytesEnd::new("filters")))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use cellforge_core::{CellRange, FilterOperator};
    use pretty_assertions::assert_eq;

    fn render(filter: &AutoFilter) -> String {
        String::from_utf8(auto_filter_xml(filter).unwrap().unwrap()).unwrap()
    }

    #[test]
    fn test_filter_without_conditions() {
        let filter = AutoFilter::new(CellRange::parse("A1:D20").unwrap());
        assert_eq!(render(&filter), r#"<autoFilter ref="A1:D20"/>"#);
    }

    #[test]
    fn test_range_filter_joins_with_and() {
        let mut filter = AutoFilter::new(CellRange::parse("B1:D20").unwrap());
        filter.add_between(2, "10", "50").unwrap();

        assert_eq!(
            render(&filter),
            "<autoFilter ref=\"B1:D20\"><filterColumn colId=\"1\">\
<customFilters and=\"1\">\
<customFilter operator=\"greaterThanOrEqual\" val=\"10\"/>\
<customFilter operator=\"lessThanOrEqual\" val=\"50\"/>\
</customFilters></filterColumn></autoFilter>"
        );
    }

    #[test]
    fn test_or_join_and_escaping() {
        let mut filter = AutoFilter::new(CellRange::parse("A1:A9").unwrap());
        filter
            .add_custom(0, FilterOperator::Equal, "R&D")
            .unwrap();
        filter
            .add_custom(0, FilterOperator::NotEqual, "Ops")
            .unwrap();

        let xml = render(&filter);
        assert!(xml.contains("<customFilters><customFilter operator=\"equal\" val=\"R&amp;D\"/>"));
        assert!(xml.contains("<customFilter operator=\"notEqual\" val=\"Ops\"/>"));
    }

    #[test]
    fn test_extra_custom_filters_are_dropped() {
        let mut filter = AutoFilter::new(CellRange::parse("A1:A9").unwrap());
        for v in ["1", "2", "3"] {
            filter.add_custom(0, FilterOperator::GreaterThan, v).unwrap();
        }
        let xml = render(&filter);
        assert_eq!(xml.matches("<customFilter ").count(), 2);
        assert!(!xml.contains("val=\"3\""));
    }

    #[test]
    fn test_top10_and_values() {
        let mut filter = AutoFilter::new(CellRange::parse("A1:C9").unwrap());
        filter.add_top10(0, false, true, 5.0).unwrap();
        filter.add_values(2, ["North", "South"]).unwrap();

        assert_eq!(
            render(&filter),
            "<autoFilter ref=\"A1:C9\">\
<filterColumn colId=\"0\"><top10 top=\"0\" percent=\"1\" val=\"5\"/></filterColumn>\
<filterColumn colId=\"2\"><filters><filter val=\"North\"/><filter val=\"South\"/></filters></filterColumn>\
</autoFilter>"
        );
    }

    #[test]
    fn test_range_beyond_sheet_limits_is_skipped() {
        let filter = AutoFilter::new(CellRange::from_indices(0, 0, 5, 20_000));
        assert_eq!(auto_filter_xml(&filter).unwrap(), None);
    }

    #[test]
    fn test_conditions_outside_moved_range_are_dropped() {
        let mut filter = AutoFilter::new(CellRange::parse("B1:D5").unwrap());
        filter.add_custom(1, FilterOperator::Equal, "x").unwrap();
        filter.add_custom(3, FilterOperator::Equal, "y").unwrap();
        filter.range = CellRange::parse("C1:D5").unwrap();

        assert_eq!(
            render(&filter),
            "<autoFilter ref=\"C1:D5\"><filterColumn colId=\"1\">\
<customFilters><customFilter operator=\"equal\" val=\"y\"/></customFilters>\
</filterColumn></autoFilter>"
        );

        filter.range = CellRange::parse("A1:B5").unwrap();
        assert_eq!(
            render(&filter),
            "<autoFilter ref=\"A1:B5\"><filterColumn colId=\"1\">\
<customFilters><customFilter operator=\"equal\" val=\"x\"/></customFilters>\
</filterColumn></autoFilter>"
        );
    }
}
