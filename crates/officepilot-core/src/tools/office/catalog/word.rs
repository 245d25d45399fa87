use serde_json::json;

use super::{boolean, color, integer, lifecycle_specs, number, one_of, props, string, OfficeToolSpec};
use crate::tools::office::normalize::normalize_colors;
use crate::tools::office::OfficeApp;

const APP: OfficeApp = OfficeApp::Word;

pub fn word_specs() -> Vec<OfficeToolSpec> {
    let mut specs = lifecycle_specs(APP);
    specs.extend([
        OfficeToolSpec::post(APP, "write", "Insert text at the cursor. Use \\n for new paragraphs.")
            .params(props(vec![("text", string("Text to insert"))]), &["text"]),
        OfficeToolSpec::get(APP, "read", "Return the full text of the active document."),
        OfficeToolSpec::post(APP, "set_font", "Set font properties of the current selection.")
            .params(
                props(vec![
                    ("font_name", string("Font family, e.g. Arial")),
                    ("font_size", number("Size in points")),
                    ("bold", boolean("Bold")),
                    ("italic", boolean("Italic")),
                    ("underline", boolean("Underline")),
                    ("color", color("Text color")),
                ]),
                &[],
            )
            .normalize_with(normalize_colors),
        OfficeToolSpec::post(APP, "set_paragraph", "Format the paragraph(s) in the current selection.")
            .params(
                props(vec![
                    ("alignment", one_of(&["left", "center", "right", "justify"], "Horizontal alignment")),
                    ("line_spacing", number("Line spacing multiple, e.g. 1.5")),
                    ("space_before", number("Points before the paragraph")),
                    ("space_after", number("Points after the paragraph")),
                    ("first_line_indent", number("First line indent in points")),
                ]),
                &[],
            ),
        OfficeToolSpec::post(APP, "add_hyperlink", "Insert a hyperlink at the cursor.")
            .params(
                props(vec![
                    ("url", string("Link target")),
                    ("display_text", string("Visible text (defaults to the URL)")),
                    ("tooltip", string("Hover text")),
                ]),
                &["url"],
            ),
        OfficeToolSpec::post(APP, "insert_break", "Insert a line, page, or section break at the cursor.")
            .params(props(vec![("type", one_of(&["line", "page", "section"], "Kind of break"))]), &["type"]),
        OfficeToolSpec::post(APP, "add_table", "Insert a table at the cursor, optionally filled with values.")
            .params(
                props(vec![
                    ("rows", integer("Number of rows")),
                    ("cols", integer("Number of columns")),
                    (
                        "values",
                        json!({
                            "type": "array",
                            "description": "Row-major cell text",
                            "items": { "type": "array", "items": { "type": "string" } }
                        }),
                    ),
                ]),
                &["rows", "cols"],
            ),
        OfficeToolSpec::post(APP, "find_replace", "Find text in the document and replace it.")
            .params(
                props(vec![
                    ("find", string("Text to search for")),
                    ("replace", string("Replacement text")),
                    ("replace_all", boolean("Replace every occurrence (default true)")),
                    ("match_case", boolean("Case-sensitive match")),
                ]),
                &["find", "replace"],
            ),
        OfficeToolSpec::post(APP, "set_style", "Apply a named style (e.g. \"Heading 1\", \"Normal\") to the selection.")
            .params(props(vec![("style", string("Style name"))]), &["style"]),
        OfficeToolSpec::post(APP, "select_all", "Select the whole document."),
        OfficeToolSpec::get(APP, "get_selection", "Return the currently selected text."),
        OfficeToolSpec::post(APP, "add_comment", "Attach a review comment to the current selection.")
            .params(
                props(vec![
                    ("text", string("Comment text")),
                    ("author", string("Author name shown on the comment")),
                ]),
                &["text"],
            ),
    ]);
    specs
}
