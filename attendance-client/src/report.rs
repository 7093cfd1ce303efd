//! Plain-text rendering of a student report

use std::fmt::Write;

use crate::models::stats::format_number;
use crate::models::{DatasetKey, StudentReport};

pub fn render_report(report: &StudentReport, key: &DatasetKey, module_name: &str) -> String {
    let stats = &report.stats;
    let mut output = String::new();

    let _ = writeln!(
        output,
        "# {}",
        report.name.as_deref().unwrap_or("Unnamed student")
    );
    let _ = writeln!(output, "Student ID: {}", report.student_id);
    let _ = writeln!(
        output,
        "Year {} - {} ({})",
        key.academic_year(),
        module_name,
        key.module_id()
    );
    if let Some(group) = report.group.as_deref() {
        let _ = writeln!(output, "Group: {}", group);
    }
    let _ = writeln!(output);

    let _ = writeln!(output, "## Overall");
    let _ = writeln!(
        output,
        "Attended {} of {} required sessions ({}%)",
        format_number(stats.total_attended),
        format_number(stats.total_required),
        stats.percentage
    );
    let _ = writeln!(
        output,
        "Status: {} [{}] {}",
        stats.status_label,
        stats.status.icon(),
        stats.status_message()
    );
    let _ = writeln!(output);

    let _ = writeln!(output, "## Subjects");
    if report.subjects.is_empty() {
        let _ = writeln!(output, "No subject breakdown recorded for this student.");
    }
    for subject in &report.subjects {
        let _ = writeln!(
            output,
            "- {}: {}/{} ({:.1}%)",
            subject.name,
            format_number(subject.attended),
            format_number(subject.required),
            subject.percentage
        );
        for session in &subject.sessions {
            let _ = writeln!(
                output,
                "    S{}: {}/{}",
                session.number,
                format_number(session.attended),
                format_number(session.required)
            );
        }
    }

    output
}
