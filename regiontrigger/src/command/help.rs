//! `--help` text and pagination.

use regiontrigger_core::Event;

use super::ReplyLine;
use super::property::Property;
use crate::error::PolicyError;

/// Width at which the property list wraps.
const PROPERTY_LINE_WIDTH: usize = 75;

/// Every help line, unpaginated.
#[must_use]
pub fn help_lines() -> Vec<String> {
    let mut lines = vec![
        "*** Usage: /rt set-<prop> <region> [--del] <value>".to_string(),
        "           /rt show <region>".to_string(),
        "           /rt reload".to_string(),
        "           /rt --help [page]".to_string(),
        "*** Available properties:".to_string(),
    ];

    let terms: Vec<String> = Property::ALL
        .iter()
        .map(|p| format!("{}({})", p.short(), p.aliases()[1..].join("/")))
        .collect();
    lines.extend(wrap_terms(&terms, PROPERTY_LINE_WIDTH).into_iter().map(|l| format!("   * {l}")));

    lines.push("*** Available events:".to_string());
    lines.extend(
        Event::ALL
            .iter()
            .map(|e| format!("   * {} - {}", e.name(), e.description())),
    );
    lines
}

/// Joins `terms` with ", " into lines no longer than `width` where possible.
fn wrap_terms(terms: &[String], width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for term in terms {
        if !current.is_empty() && current.len() + 2 + term.len() > width {
            current.push(',');
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push_str(", ");
        }
        current.push_str(term);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Parses the optional page argument (1-based).
///
/// # Errors
///
/// Returns [`PolicyError::Syntax`] for anything but a positive integer.
pub fn parse_page(raw: Option<&str>) -> Result<usize, PolicyError> {
    let Some(raw) = raw else {
        return Ok(1);
    };
    match raw.parse::<usize>() {
        Ok(page) if page >= 1 => Ok(page),
        _ => Err(PolicyError::Syntax(format!(
            "\"{raw}\" is not a valid page number."
        ))),
    }
}

/// Renders one page of `lines` with a header and, unless it is the last
/// page, a footer pointing at the next one.
///
/// # Errors
///
/// Returns [`PolicyError::Syntax`] when `page` is past the last page.
pub fn paginate(lines: &[String], page: usize, page_size: usize) -> Result<Vec<ReplyLine>, PolicyError> {
    let page_size = page_size.max(1);
    let total = lines.len().div_ceil(page_size).max(1);
    if page > total {
        return Err(PolicyError::Syntax(format!("Page {page} does not exist.")));
    }

    let mut out = Vec::with_capacity(page_size + 2);
    out.push(ReplyLine::success(format!(
        "RegionTrigger Sub-Commands Instructions ({page}/{total}):"
    )));
    out.extend(
        lines
            .iter()
            .skip((page - 1) * page_size)
            .take(page_size)
            .cloned()
            .map(ReplyLine::info),
    );
    if page < total {
        out.push(ReplyLine::info(format!(
            "Type /rt --help {} for more instructions.",
            page + 1
        )));
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_every_event_and_property() {
        let lines = help_lines();
        for event in Event::ALL {
            assert!(lines.iter().any(|l| l.contains(&format!("* {} - ", event.name()))));
        }
        let text = lines.join("\n");
        for property in Property::ALL {
            assert!(text.contains(property.short()));
        }
        assert!(text.contains("mi(msgitv/msginterval/messageinterval)"));
    }

    #[test]
    fn wrapped_property_lines_stay_narrow() {
        for line in wrap_terms(
            &Property::ALL
                .iter()
                .map(|p| format!("{}({})", p.short(), p.aliases()[1..].join("/")))
                .collect::<Vec<_>>(),
            PROPERTY_LINE_WIDTH,
        ) {
            assert!(line.len() <= PROPERTY_LINE_WIDTH + 1, "{line}");
        }
    }

    #[test]
    fn pagination() {
        let lines: Vec<String> = (1..=25).map(|n| format!("line {n}")).collect();

        let first = paginate(&lines, 1, 10).unwrap();
        assert_eq!(first[0].text, "RegionTrigger Sub-Commands Instructions (1/3):");
        assert_eq!(first[1].text, "line 1");
        assert_eq!(first.last().unwrap().text, "Type /rt --help 2 for more instructions.");
        assert_eq!(first.len(), 12);

        let last = paginate(&lines, 3, 10).unwrap();
        assert_eq!(last.len(), 6);
        assert_eq!(last.last().unwrap().text, "line 25");

        assert!(paginate(&lines, 4, 10).is_err());
    }

    #[test]
    fn page_argument() {
        assert_eq!(parse_page(None).unwrap(), 1);
        assert_eq!(parse_page(Some("3")).unwrap(), 3);
        assert!(parse_page(Some("0")).is_err());
        assert!(parse_page(Some("two")).is_err());
    }
}
