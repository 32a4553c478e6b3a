use slither::render::{CellKind, Frame, Palette};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

fn context_2d(
    canvas: &web_sys::HtmlCanvasElement,
) -> Result<web_sys::CanvasRenderingContext2d, String> {
    canvas
        .get_context("2d")
        .map_err(|_| "canvas: get_context threw".to_string())?
        .ok_or("canvas: missing 2d context".to_string())?
        .dyn_into::<web_sys::CanvasRenderingContext2d>()
        .map_err(|_| "canvas: context is not 2d".to_string())
}

#[allow(deprecated)]
pub(super) fn draw_frame(
    canvas: &web_sys::HtmlCanvasElement,
    frame: &Frame,
    palette: &Palette,
) -> Result<(), String> {
    let ctx = context_2d(canvas)?;

    let w = canvas.width() as f64;
    let h = canvas.height() as f64;
    let n = frame.side() as f64;
    let cell_w = w / n;
    let cell_h = h / n;

    for (row, cells) in frame.rows().enumerate() {
        for (col, &kind) in cells.iter().enumerate() {
            let x = col as f64 * cell_w;
            let y = row as f64 * cell_h;

            if kind == CellKind::Fruit {
                // Fruit sits on its floor tile.
                let floor = CellKind::Floor {
                    shaded: (row + col) % 2 == 1,
                };
                ctx.set_fill_style(&JsValue::from_str(&palette.color(floor, frame.grid).hex()));
                ctx.fill_rect(x, y, cell_w, cell_h);

                ctx.set_fill_style(&JsValue::from_str(&palette.fruit.hex()));
                ctx.begin_path();
                ctx.arc(
                    x + cell_w / 2.0,
                    y + cell_h / 2.0,
                    cell_w.min(cell_h) * 0.35,
                    0.0,
                    std::f64::consts::TAU,
                )
                .map_err(|_| "canvas: arc threw".to_string())?;
                ctx.fill();
                continue;
            }

            ctx.set_fill_style(&JsValue::from_str(&palette.color(kind, frame.grid).hex()));
            ctx.fill_rect(x, y, cell_w, cell_h);
        }
    }

    // Outline the board on the terminal frame.
    if let Some(status) = frame.status {
        let outline = if status.won {
            Some("#fbbf24")
        } else if status.died {
            Some("#ef4444")
        } else {
            None
        };
        if let Some(color) = outline {
            ctx.set_stroke_style(&JsValue::from_str(color));
            ctx.set_line_width(4.0);
            ctx.stroke_rect(2.0, 2.0, w - 4.0, h - 4.0);
        }
    }
    Ok(())
}
