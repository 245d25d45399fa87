use super::{boolean, color, integer, lifecycle_specs, number, one_of, props, string, OfficeToolSpec};
use crate::tools::office::normalize::normalize_colors;
use crate::tools::office::OfficeApp;

const APP: OfficeApp = OfficeApp::PowerPoint;

fn slide() -> serde_json::Value {
    integer("1-based slide number")
}

fn shape() -> serde_json::Value {
    integer("1-based shape index on the slide (see read_slide)")
}

pub fn powerpoint_specs() -> Vec<OfficeToolSpec> {
    let mut specs = lifecycle_specs(APP);
    specs.extend([
        OfficeToolSpec::post(APP, "add_slide", "Append a slide with the given layout.")
            .params(
                props(vec![
                    ("layout", integer("Layout id: 1 title, 2 title and content, 11 title only, 12 blank")),
                    ("position", integer("1-based insert position (default: end)")),
                ]),
                &[],
            ),
        OfficeToolSpec::get(APP, "get_slide_count", "Return the number of slides."),
        OfficeToolSpec::post(APP, "write_text", "Replace the text of a shape on a slide.")
            .params(
                props(vec![("slide", slide()), ("shape", shape()), ("text", string("New text"))]),
                &["slide", "shape", "text"],
            ),
        OfficeToolSpec::post(APP, "add_textbox", "Add a text box to a slide. Positions are in points.")
            .params(
                props(vec![
                    ("slide", slide()),
                    ("text", string("Text content")),
                    ("left", number("Distance from the left edge")),
                    ("top", number("Distance from the top edge")),
                    ("width", number("Box width")),
                    ("height", number("Box height")),
                ]),
                &["slide", "text"],
            ),
        OfficeToolSpec::post(APP, "set_font", "Set font properties for the text of a shape.")
            .params(
                props(vec![
                    ("slide", slide()),
                    ("shape", shape()),
                    ("font_name", string("Font family")),
                    ("font_size", number("Size in points")),
                    ("bold", boolean("Bold")),
                    ("italic", boolean("Italic")),
                    ("color", color("Text color")),
                ]),
                &["slide", "shape"],
            )
            .normalize_with(normalize_colors),
        OfficeToolSpec::post(APP, "read_slide", "List the shapes on a slide with their text.")
            .params(props(vec![("slide", slide())]), &["slide"]),
        OfficeToolSpec::post(APP, "set_background", "Set a solid background color for a slide.")
            .params(props(vec![("slide", slide()), ("color", color("Background color"))]), &["slide", "color"])
            .normalize_with(normalize_colors),
        OfficeToolSpec::post(APP, "add_animation", "Add an entrance animation to a shape.")
            .params(
                props(vec![
                    ("slide", slide()),
                    ("shape", shape()),
                    ("effect", one_of(&["appear", "fade", "fly_in", "wipe", "zoom", "split"], "Animation effect")),
                    ("trigger", one_of(&["on_click", "with_previous", "after_previous"], "When the animation starts")),
                ]),
                &["slide", "shape"],
            ),
    ]);
    specs
}
