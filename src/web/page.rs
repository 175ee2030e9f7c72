//! HTML fragments for the planning pages
//!
//! The result page is streamed: `document_head` and `result_intro` go out
//! first, then one fragment per finished category, then the itinerary
//! (with its download link) and `document_tail`.

use crate::markdown::{escape_html, render_or_plain};
use crate::models::{Category, download_file_name};

const APP_TITLE: &str = "TRIPSAGE: Your Travel Planning Begins Here!";

const STYLE: &str = "\
.block-container { padding: 1rem; max-width: 960px; margin: 0 auto; font-family: sans-serif; }
.section-header { margin: 1.5rem 0 1rem; padding: 0.5rem; background-color: #1e3a8a; color: white; border-radius: 0.3rem; }
.content-section { padding: 1.5rem; border-radius: 0.5rem; margin-bottom: 1.5rem; border: 1px solid #e5e7eb; }
.content-section img { max-width: 100%; }
.fields { display: grid; grid-template-columns: 1fr 1fr; gap: 0.5rem 1rem; }
.fields label { display: flex; flex-direction: column; }
.success, .error, .warning { padding: 0.75rem; border-radius: 0.3rem; margin: 1rem 0; }
.success { background-color: #dcfce7; }
.error { background-color: #fee2e2; }
.warning { background-color: #fef9c3; }
button { width: 100%; margin: 1rem 0; padding: 0.6rem; }
pre.plain { white-space: pre-wrap; }
a.download { display: block; text-align: center; margin: 1rem 0; padding: 0.6rem; border: 1px solid #1e3a8a; border-radius: 0.3rem; }
footer { text-align: center; margin-top: 2rem; }";

/// Raw form values, echoed back when validation fails
#[derive(Debug, Default, Clone)]
pub struct FormValues<'a> {
    pub departure_city: &'a str,
    pub destination_city: &'a str,
    pub dates: &'a str,
    pub interests: &'a str,
    pub budget: &'a str,
}

pub fn document_head() -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{APP_TITLE}</title>\n<style>\n{STYLE}\n</style>\n</head>\n\
         <body>\n<div class=\"block-container\">\n<h1>{APP_TITLE}</h1>\n"
    )
}

pub fn document_tail() -> &'static str {
    "<footer>Happy Travelling 🌟</footer>\n</div>\n</body>\n</html>\n"
}

fn input(name: &str, label: &str, placeholder: &str, value: &str) -> String {
    format!(
        "<label>{label}<input type=\"text\" name=\"{name}\" placeholder=\"{placeholder}\" value=\"{}\"></label>\n",
        escape_html(value)
    )
}

/// The trip form, optionally preceded by a validation warning
pub fn form_page(values: &FormValues<'_>, warning: Option<&str>) -> String {
    let mut page = document_head();
    if let Some(warning) = warning {
        page.push_str(&format!(
            "<div class=\"warning\">🔔 {}</div>\n",
            escape_html(warning)
        ));
    }
    page.push_str("<h2>📝 Enter Trip Details</h2>\n<form method=\"post\" action=\"/plan\">\n<div class=\"fields\">\n");
    page.push_str(&input("departure_city", "Departure City", "e.g., Mumbai", values.departure_city));
    page.push_str(&input("dates", "Travel Dates", "Dec 20-25, 2024", values.dates));
    page.push_str(&input("destination_city", "Destination City", "e.g., Paris", values.destination_city));
    page.push_str(&input("interests", "Your Interests", "e.g., museums, food, hiking", values.interests));
    page.push_str(&input("budget", "Your Budget (in INR)", "e.g., 80000", values.budget));
    page.push_str("</div>\n<button type=\"submit\">Create My Travel Itinerary 🚀</button>\n</form>\n");
    page.push_str(document_tail());
    page
}

pub fn result_intro() -> &'static str {
    "<div class=\"success\">🎈 Sit tight! Preparing your travel planning journey!</div>\n"
}

fn section(title: &str, body: &str) -> String {
    format!(
        "<div class=\"section-header\"><h3>{}</h3></div>\n<div class=\"content-section\">\n{body}\n</div>\n",
        escape_html(title)
    )
}

fn error_box(message: &str) -> String {
    format!("<div class=\"error\">🚨 {}</div>", escape_html(message))
}

pub fn category_section(category: Category, markdown: &str) -> String {
    section(category.title(), &render_or_plain(markdown))
}

pub fn category_failure(category: Category, message: &str) -> String {
    section(category.title(), &error_box(message))
}

const ITINERARY_TITLE: &str = "📋 Here's your Complete Travel Plan";

/// `data:` URL carrying the markdown byte for byte
fn markdown_data_url(markdown: &str) -> String {
    format!(
        "data:text/markdown;charset=utf-8,{}",
        urlencoding::encode(markdown)
    )
}

/// The final itinerary followed by a download link. The markdown travels in
/// the link itself, so the saved file is exactly the synthesised report.
pub fn itinerary_section(destination: &str, markdown: &str) -> String {
    let mut html = section(ITINERARY_TITLE, &render_or_plain(markdown));
    let file_name = escape_html(&download_file_name(destination));
    html.push_str(&format!(
        "<p><a class=\"download\" href=\"{}\" download=\"{file_name}\">\
         📥 Download your itinerary ({file_name})</a></p>\n",
        markdown_data_url(markdown)
    ));
    html
}

pub fn itinerary_failure(message: &str) -> String {
    section(ITINERARY_TITLE, &error_box(message))
}
