use serde_json::{Value, json};

/// A4 portrait with 2cm margins on a single sheet.
pub fn a4_setup() -> Value {
    json!({
        "page": {
            "pages": [
                { "format": { "size": "A4", "margins": { "top": 56.7, "right": 56.7, "bottom": 56.7, "left": 56.7 } } }
            ]
        },
        "style": {}
    })
}

/// One logical page tiled onto `rows` x `columns` letter sheets.
pub fn tiled_letter_setup(rows: usize, columns: usize) -> Value {
    let mut pages = Vec::new();
    for row in 0..rows {
        for column in 0..columns {
            pages.push(json!({
                "format": { "size": "Letter", "orientation": "portrait" },
                "x": column as f64 * 612.0,
                "y": row as f64 * 792.0
            }));
        }
    }
    json!({
        "page": { "pages": pages },
        "style": { "padding-top": "4pt", "visible": true }
    })
}
