//! Argument normalizers for Office tools
//!
//! A normalizer runs after schema validation and before the automation
//! call. It may rewrite the arguments, including into the body of a
//! different endpoint (the formula helpers forward to `set_formula`).

use serde_json::{json, Map, Value};

/// Rewrites validated tool arguments into the endpoint's request body
pub type Normalizer = fn(Value) -> Result<Value, String>;

const COLOR_KEYS: &[&str] = &["color", "font_color", "fill_color", "background_color"];

const NAMED_COLORS: &[(&str, &str)] = &[
    ("black", "#000000"),
    ("white", "#FFFFFF"),
    ("red", "#FF0000"),
    ("green", "#008000"),
    ("blue", "#0000FF"),
    ("yellow", "#FFFF00"),
    ("orange", "#FFA500"),
    ("purple", "#800080"),
    ("gray", "#808080"),
    ("grey", "#808080"),
    ("navy", "#000080"),
];

/// Normalize a colour to `#RRGGBB`
///
/// Accepts `#RRGGBB`, `RRGGBB`, `#RGB`, `RGB`, `0xRRGGBB` and a few names.
pub fn normalize_color(input: &str) -> Result<String, String> {
    let trimmed = input.trim();
    let lower = trimmed.to_ascii_lowercase();

    if let Some((_, hex)) = NAMED_COLORS.iter().find(|(name, _)| *name == lower) {
        return Ok((*hex).to_string());
    }

    let digits = lower
        .strip_prefix('#')
        .or_else(|| lower.strip_prefix("0x"))
        .unwrap_or(&lower);

    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(format!("Invalid color '{}': expected #RRGGBB", input));
    }

    let expanded = match digits.len() {
        6 => digits.to_string(),
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        _ => return Err(format!("Invalid color '{}': expected #RRGGBB", input)),
    };

    Ok(format!("#{}", expanded.to_ascii_uppercase()))
}

/// Normalize every colour field present in the arguments
pub fn normalize_colors(mut args: Value) -> Result<Value, String> {
    if let Some(map) = args.as_object_mut() {
        for key in COLOR_KEYS {
            if let Some(Value::String(raw)) = map.get(*key) {
                let normalized = normalize_color(raw)?;
                map.insert((*key).to_string(), Value::String(normalized));
            }
        }
    }
    Ok(args)
}

/// Ensure a formula starts with `=`
pub fn ensure_formula_prefix(mut args: Value) -> Result<Value, String> {
    if let Some(Value::String(formula)) = args.get_mut("formula") {
        let trimmed = formula.trim();
        if trimmed.is_empty() {
            return Err("formula must not be empty".into());
        }
        *formula = if trimmed.starts_with('=') {
            trimmed.to_string()
        } else {
            format!("={}", trimmed)
        };
    }
    Ok(args)
}

fn str_field<'a>(map: &'a Map<String, Value>, key: &str) -> Result<&'a str, String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("Missing required parameter '{}'", key))
}

/// Render a SUMIF/COUNTIF criterion
///
/// Numbers pass through. A string is taken as a cell reference only when
/// it is absolute (`$F$1`) or the caller sets `criteria_is_reference`;
/// otherwise it becomes a string literal with embedded quotes doubled, so
/// text such as `FY2024` is never read as a cell.
fn criteria_literal(map: &Map<String, Value>) -> Result<String, String> {
    let as_reference = map
        .get("criteria_is_reference")
        .and_then(Value::as_bool)
        .unwrap_or(false);

    match map.get("criteria").unwrap_or(&Value::Null) {
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(if *b { "TRUE".into() } else { "FALSE".into() }),
        Value::String(s) => {
            let s = s.trim();
            let reference = is_cell_reference(s) && (as_reference || s.contains('$'));
            if reference {
                Ok(s.to_string())
            } else if as_reference {
                Err(format!("criteria '{}' is not a cell reference", s))
            } else {
                Ok(format!("\"{}\"", s.replace('"', "\"\"")))
            }
        }
        _ => Err("criteria must be a string or number".into()),
    }
}

fn is_cell_reference(s: &str) -> bool {
    let s = s.replace('$', "");
    let letters = s.chars().take_while(|c| c.is_ascii_alphabetic()).count();
    let rest = &s[letters..];
    (1..=3).contains(&letters) && !rest.is_empty() && rest.chars().all(|c| c.is_ascii_digit())
}

fn object(args: &Value) -> Result<&Map<String, Value>, String> {
    args.as_object().ok_or_else(|| "arguments must be an object".to_string())
}

fn formula_body(cell: &str, formula: String) -> Value {
    json!({ "cell": cell, "formula": formula })
}

/// `{cell, range, criteria, sum_range?}` to a `set_formula` body with SUMIF
pub fn build_sumif(args: Value) -> Result<Value, String> {
    let map = object(&args)?;
    let cell = str_field(map, "cell")?;
    let range = str_field(map, "range")?;
    let criteria = criteria_literal(map)?;

    let formula = match map.get("sum_range").and_then(Value::as_str).map(str::trim) {
        Some(sum_range) if !sum_range.is_empty() => {
            format!("=SUMIF({},{},{})", range, criteria, sum_range)
        }
        _ => format!("=SUMIF({},{})", range, criteria),
    };
    Ok(formula_body(cell, formula))
}

/// `{cell, range, criteria}` to a `set_formula` body with COUNTIF
pub fn build_countif(args: Value) -> Result<Value, String> {
    let map = object(&args)?;
    let cell = str_field(map, "cell")?;
    let range = str_field(map, "range")?;
    let criteria = criteria_literal(map)?;
    Ok(formula_body(cell, format!("=COUNTIF({},{})", range, criteria)))
}

/// `{cell, range}` to a `set_formula` body with AVERAGE
pub fn build_average(args: Value) -> Result<Value, String> {
    let map = object(&args)?;
    let cell = str_field(map, "cell")?;
    let range = str_field(map, "range")?;
    Ok(formula_body(cell, format!("=AVERAGE({})", range)))
}
