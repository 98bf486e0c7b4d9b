use lopdf::content::Operation;
use lopdf::{Document, Encoding, Object, ObjectId};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// TJ displacement (thousandths of text space) wide enough to count as a word gap.
const WORD_GAP: f32 = -100.0;

/// Text of one page with a line break wherever the text position moves to a new line.
///
/// Breaks are emitted at `ET`, `T*`, `'` and `"`, and at `Td`/`TD`/`Tm` whenever the
/// vertical position changes. Horizontal moves on the same line keep the text joined.
pub fn page_text(doc: &Document, page_id: ObjectId) -> lopdf::Result<String> {
    let mut encodings: BTreeMap<Vec<u8>, Encoding<'_>> = BTreeMap::new();
    for (name, font) in doc.get_page_fonts(page_id)? {
        match font.get_font_encoding(doc) {
            Ok(encoding) => {
                encodings.insert(name, encoding);
            }
            Err(e) => warn!(
                "font /{} has no usable encoding: {e}",
                String::from_utf8_lossy(&name)
            ),
        }
    }

    let content = doc.get_and_decode_page_content(page_id)?;
    let mut out = String::new();
    let mut current: Option<&Encoding<'_>> = None;
    let mut line_y = 0.0_f32;

    for op in &content.operations {
        match op.operator.as_str() {
            "BT" => line_y = 0.0,
            "ET" | "T*" => break_line(&mut out),
            "Tf" => {
                current = op
                    .operands
                    .first()
                    .and_then(|o| o.as_name().ok())
                    .and_then(|name| encodings.get(name));
            }
            "Td" | "TD" => {
                let ty = operand(op, 1);
                if ty != 0.0 {
                    break_line(&mut out);
                }
                line_y += ty;
            }
            "Tm" => {
                let y = operand(op, 5);
                if y != line_y {
                    break_line(&mut out);
                }
                line_y = y;
            }
            "Tj" | "TJ" => {
                for obj in &op.operands {
                    show(current, obj, &mut out);
                }
            }
            "'" => {
                break_line(&mut out);
                if let Some(obj) = op.operands.last() {
                    show(current, obj, &mut out);
                }
            }
            "\"" => {
                break_line(&mut out);
                if let Some(obj) = op.operands.get(2) {
                    show(current, obj, &mut out);
                }
            }
            _ => {}
        }
    }

    Ok(out)
}

fn operand(op: &Operation, i: usize) -> f32 {
    op.operands
        .get(i)
        .and_then(|o| o.as_float().ok())
        .unwrap_or(0.0)
}

fn break_line(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn show(encoding: Option<&Encoding<'_>>, obj: &Object, out: &mut String) {
    match obj {
        Object::String(bytes, _) => {
            let Some(encoding) = encoding else {
                debug!("text shown before any font was selected");
                return;
            };
            match Document::decode_text(encoding, bytes) {
                Ok(text) => out.push_str(&text),
                Err(e) => warn!("undecodable text run: {e}"),
            }
        }
        Object::Array(items) => {
            for item in items {
                show(encoding, item, out);
            }
        }
        Object::Integer(_) | Object::Real(_) => {
            if obj.as_float().is_ok_and(|gap| gap < WORD_GAP) && !out.ends_with(' ') {
                out.push(' ');
            }
        }
        _ => {}
    }
}
