//! Final itinerary synthesis task

use crate::agents::AgentKind;
use crate::instructions::TaskPrompt;
use crate::models::ReportSet;

const SYNTHESIS_INSTRUCTION: &str = "Create one travel itinerary in markdown using all sections \
     (destination, events, weather, flights, hotels) from the reports in the context. \
     Preserve every image markdown reference exactly as given, together with its caption. \
     Organise the document clearly with headers and sections, and do not drop any information \
     from any of the reports.";

/// Build the synthesis task from all five category reports.
///
/// Each report is labelled with its heading and separated by a blank line,
/// always in the order destination, events, weather, flights, hotels.
#[must_use]
pub fn build(reports: &ReportSet) -> TaskPrompt {
    let context = reports
        .iter()
        .map(|(category, markdown)| format!("{}:\n{}", category.report_label(), markdown))
        .collect::<Vec<_>>()
        .join("\n\n");

    TaskPrompt {
        agent: AgentKind::Reporter,
        instruction: SYNTHESIS_INSTRUCTION.to_string(),
        context,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, CategoryReport};

    fn reports() -> ReportSet {
        let mut reports: Vec<CategoryReport> = Category::ALL
            .into_iter()
            .map(|c| CategoryReport::new(c, format!("{} findings", c.id())))
            .collect();
        // arrival order must not matter
        reports.rotate_left(2);
        ReportSet::collect(reports).unwrap()
    }

    #[test]
    fn test_context_layout() {
        let prompt = build(&reports());
        assert_eq!(
            prompt.context,
            "Destination Report:\ndestination findings\n\n\
             Events Report:\nevents findings\n\n\
             Weather Report:\nweather findings\n\n\
             Flight Report:\nflights findings\n\n\
             Hotel Report:\nhotels findings"
        );
        assert_eq!(prompt.agent, AgentKind::Reporter);
    }

    #[test]
    fn test_instruction_demands_preservation() {
        let prompt = build(&reports());
        assert!(prompt.instruction.contains("Preserve every image markdown reference"));
        assert!(prompt.instruction.contains("do not drop any information"));
    }
}
