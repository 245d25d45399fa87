use serde_json::json;

use super::{boolean, color, integer, lifecycle_specs, number, one_of, props, string, OfficeToolSpec};
use crate::tools::office::normalize::{
    build_average, build_countif, build_sumif, ensure_formula_prefix, normalize_colors,
};
use crate::tools::office::OfficeApp;

const APP: OfficeApp = OfficeApp::Excel;

fn range() -> serde_json::Value {
    string("A1-style range, e.g. A1:D5")
}

fn cell() -> serde_json::Value {
    string("A1-style cell reference")
}

fn criteria() -> serde_json::Value {
    json!({
        "description": "Condition: a value (\"Apple\", 5), a comparison (\">100\"), or an absolute cell reference ($F$1)"
    })
}

fn criteria_is_reference() -> serde_json::Value {
    boolean("Treat a relative criteria like F1 as a cell reference")
}

pub fn excel_specs() -> Vec<OfficeToolSpec> {
    let mut specs = lifecycle_specs(APP);
    specs.extend([
        OfficeToolSpec::post(APP, "write_cell", "Write a value to one cell.")
            .params(
                props(vec![
                    ("cell", cell()),
                    ("value", json!({ "description": "Text, number, or boolean to write" })),
                ]),
                &["cell", "value"],
            ),
        OfficeToolSpec::post(APP, "read_cell", "Read the value of one cell.")
            .params(props(vec![("cell", cell())]), &["cell"]),
        OfficeToolSpec::post(APP, "write_range", "Write a 2-D block of values starting at start_cell.")
            .params(
                props(vec![
                    ("start_cell", string("Top-left cell of the block")),
                    (
                        "values",
                        json!({
                            "type": "array",
                            "description": "Rows of values",
                            "minItems": 1,
                            "items": { "type": "array" }
                        }),
                    ),
                ]),
                &["start_cell", "values"],
            ),
        OfficeToolSpec::post(APP, "read_range", "Read a rectangular range as rows of values.")
            .params(props(vec![("range", range())]), &["range"]),
        OfficeToolSpec::post(APP, "set_formula", "Put a formula into a cell (leading = optional).")
            .params(
                props(vec![("cell", cell()), ("formula", string("Formula, e.g. =SUM(B2:B9)"))]),
                &["cell", "formula"],
            )
            .normalize_with(ensure_formula_prefix),
        OfficeToolSpec::post(APP, "set_formula", "Write a SUMIF formula into a cell.")
            .named("sumif")
            .params(
                props(vec![
                    ("cell", string("Cell that receives the formula")),
                    ("range", string("Range tested against the criteria")),
                    ("criteria", criteria()),
                    ("criteria_is_reference", criteria_is_reference()),
                    ("sum_range", string("Range to sum (defaults to range)")),
                ]),
                &["cell", "range", "criteria"],
            )
            .normalize_with(build_sumif),
        OfficeToolSpec::post(APP, "set_formula", "Write a COUNTIF formula into a cell.")
            .named("countif")
            .params(
                props(vec![
                    ("cell", string("Cell that receives the formula")),
                    ("range", string("Range to count in")),
                    ("criteria", criteria()),
                    ("criteria_is_reference", criteria_is_reference()),
                ]),
                &["cell", "range", "criteria"],
            )
            .normalize_with(build_countif),
        OfficeToolSpec::post(APP, "set_formula", "Write an AVERAGE formula into a cell.")
            .named("average")
            .params(
                props(vec![
                    ("cell", string("Cell that receives the formula")),
                    ("range", string("Range to average")),
                ]),
                &["cell", "range"],
            )
            .normalize_with(build_average),
        OfficeToolSpec::post(APP, "set_font", "Set font properties for a range.")
            .params(
                props(vec![
                    ("range", range()),
                    ("font_name", string("Font family")),
                    ("font_size", number("Size in points")),
                    ("bold", boolean("Bold")),
                    ("italic", boolean("Italic")),
                    ("color", color("Text color")),
                ]),
                &["range"],
            )
            .normalize_with(normalize_colors),
        OfficeToolSpec::post(APP, "set_alignment", "Align the contents of a range.")
            .params(
                props(vec![
                    ("range", range()),
                    ("horizontal", one_of(&["left", "center", "right", "justify"], "Horizontal alignment")),
                    ("vertical", one_of(&["top", "center", "bottom"], "Vertical alignment")),
                    ("wrap_text", boolean("Wrap text within cells")),
                ]),
                &["range"],
            ),
        OfficeToolSpec::post(APP, "set_column_width", "Set a column's width, or auto-fit it to its contents.")
            .params(
                props(vec![
                    ("column", string("Column letter, e.g. B")),
                    ("width", number("Width in characters")),
                    ("auto_fit", boolean("Fit to contents instead of a fixed width")),
                ]),
                &["column"],
            ),
        OfficeToolSpec::post(APP, "set_row_height", "Set a row's height.")
            .params(
                props(vec![("row", integer("1-based row number")), ("height", number("Height in points"))]),
                &["row", "height"],
            ),
        OfficeToolSpec::post(APP, "set_fill", "Fill a range with a background color.")
            .params(props(vec![("range", range()), ("color", color("Fill color"))]), &["range", "color"])
            .normalize_with(normalize_colors),
        OfficeToolSpec::post(APP, "set_border", "Draw borders around or inside a range.")
            .params(
                props(vec![
                    ("range", range()),
                    ("style", one_of(&["thin", "medium", "thick", "double", "dashed", "dotted", "none"], "Line style")),
                    ("edges", one_of(&["all", "outline", "inside", "top", "bottom", "left", "right"], "Which edges")),
                    ("color", color("Border color")),
                ]),
                &["range"],
            )
            .normalize_with(normalize_colors),
        OfficeToolSpec::post(APP, "set_number_format", "Apply a number format code to a range.")
            .params(
                props(vec![("range", range()), ("format", string("Format code, e.g. #,##0.00 or 0%"))]),
                &["range", "format"],
            ),
        OfficeToolSpec::post(APP, "merge_cells", "Merge a range into one cell.")
            .params(props(vec![("range", range())]), &["range"]),
        OfficeToolSpec::get(APP, "get_sheets", "List the worksheet names of the active workbook."),
        OfficeToolSpec::post(APP, "add_sheet", "Add a worksheet.")
            .params(props(vec![("name", string("Name of the new sheet"))]), &[]),
        OfficeToolSpec::post(APP, "rename_sheet", "Rename a worksheet.")
            .params(
                props(vec![("old_name", string("Current name")), ("new_name", string("New name"))]),
                &["old_name", "new_name"],
            ),
        OfficeToolSpec::post(APP, "delete_sheet", "Delete a worksheet.")
            .params(props(vec![("name", string("Sheet to delete"))]), &["name"]),
        OfficeToolSpec::post(APP, "insert_row", "Insert rows above the given row.")
            .params(
                props(vec![("row", integer("1-based row number")), ("count", integer("Rows to insert (default 1)"))]),
                &["row"],
            ),
        OfficeToolSpec::post(APP, "insert_column", "Insert columns left of the given column.")
            .params(
                props(vec![("column", string("Column letter")), ("count", integer("Columns to insert (default 1)"))]),
                &["column"],
            ),
        OfficeToolSpec::post(APP, "delete_row", "Delete rows starting at the given row.")
            .params(
                props(vec![("row", integer("1-based row number")), ("count", integer("Rows to delete (default 1)"))]),
                &["row"],
            ),
        OfficeToolSpec::post(APP, "delete_column", "Delete columns starting at the given column.")
            .params(
                props(vec![("column", string("Column letter")), ("count", integer("Columns to delete (default 1)"))]),
                &["column"],
            ),
        OfficeToolSpec::post(APP, "auto_filter", "Turn on AutoFilter for a range, or remove it.")
            .params(
                props(vec![("range", range()), ("remove", boolean("Remove the existing AutoFilter"))]),
                &[],
            ),
        OfficeToolSpec::post(APP, "freeze_panes", "Freeze rows/columns above and left of a cell, or unfreeze.")
            .params(
                props(vec![
                    ("cell", string("First unfrozen cell, e.g. A2 freezes the top row")),
                    ("unfreeze", boolean("Remove existing freeze panes")),
                ]),
                &[],
            ),
    ]);
    specs
}
