use crate::types::ReportFormat;

/// Sentinel line opening an async action's region in a report file.
pub fn start_line(action_id: &str, format: ReportFormat) -> String {
    wrap_label(&format!("ASYNC action {action_id} start"), format)
}

/// Sentinel line closing an async action's region.
pub fn end_line(action_id: &str, format: ReportFormat) -> String {
    wrap_label(&format!("ASYNC action {action_id} end"), format)
}

// Comment syntax keeps the line syntactically inert in the target format.
fn wrap_label(label: &str, format: ReportFormat) -> String {
    match format {
        ReportFormat::Html => format!("<!-- {label} -->"),
        ReportFormat::Json => format!("/* {label} */"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_markers_are_comments() {
        assert_eq!(
            start_line("id42", ReportFormat::Html),
            "<!-- ASYNC action id42 start -->"
        );
        assert_eq!(
            end_line("id42", ReportFormat::Html),
            "<!-- ASYNC action id42 end -->"
        );
    }

    #[test]
    fn json_markers_are_comments() {
        assert_eq!(
            start_line("id42", ReportFormat::Json),
            "/* ASYNC action id42 start */"
        );
        assert_eq!(end_line("id42", ReportFormat::Json), "/* ASYNC action id42 end */");
    }

    #[test]
    fn start_and_end_differ_per_action_and_format() {
        for format in [ReportFormat::Html, ReportFormat::Json] {
            assert_ne!(start_line("a", format), end_line("a", format));
            assert_ne!(start_line("a", format), start_line("b", format));
        }
        assert_ne!(
            start_line("a", ReportFormat::Html),
            start_line("a", ReportFormat::Json)
        );
    }
}
