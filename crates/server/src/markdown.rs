use pulldown_cmark::{html, Event, Options, Parser};

/// Renders model output (markdown) to HTML for the chat UI. Single
/// newlines become hard breaks so answers keep their line structure,
/// and tables are enabled.
pub fn markdown_to_html(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(text, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        other => other,
    });

    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);
    html_output
}
