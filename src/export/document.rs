use std::fs::File;
use std::path::{Path, PathBuf};

use printpdf::{Mm, PdfDocument};

use crate::constants::{
    EXPORT_FONT_ENV, EXPORT_FONT_PATHS, EXPORT_FONT_SIZE, EXPORT_LINE_STEP_MM,
    EXPORT_MARGIN_BOTTOM_MM, EXPORT_MARGIN_LEFT_MM, EXPORT_PAGE_HEIGHT_MM, EXPORT_PAGE_WIDTH_MM,
    EXPORT_TITLE, EXPORT_TITLE_BASELINE_MM, EXPORT_TITLE_SIZE,
};
use crate::error::Error;
use crate::schema::ShoppingListItem;

/// One printable line of the aggregate.
pub fn format_line(item: &ShoppingListItem) -> String {
    format!(
        "{} - {} {}",
        item.name, item.total_amount, item.measurement_unit
    )
}

/// Resolves the TTF used for rendering: the `EXPORT_FONT_PATH` override
/// first, then the default search list.
pub fn locate_export_font() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(EXPORT_FONT_ENV) {
        let path = PathBuf::from(path);
        if path.is_file() {
            return Some(path);
        }
        log::error!("{EXPORT_FONT_ENV} points to a missing file: {}", path.display());
    }

    EXPORT_FONT_PATHS
        .iter()
        .map(PathBuf::from)
        .find(|path| path.is_file())
}

/// Renders the aggregate as a paginated PDF: a title line, then one line
/// per entry at a fixed vertical step, breaking to a fresh page when the
/// column runs out. The font must be a TTF covering the ingredient names'
/// script; an empty aggregate still produces a valid title-only document.
pub fn export_shopping_list(
    items: &[ShoppingListItem],
    font_path: &Path,
) -> Result<Vec<u8>, Error> {
    let font_file = File::open(font_path).map_err(|e| {
        log::error!("export font {} is unavailable: {e}", font_path.display());
        Error::render(format!("font {} is unavailable: {e}", font_path.display()))
    })?;

    let (doc, page, layer) = PdfDocument::new(
        "Shopping list",
        Mm(EXPORT_PAGE_WIDTH_MM.into()),
        Mm(EXPORT_PAGE_HEIGHT_MM.into()),
        "text",
    );

    let font = doc.add_external_font(font_file).map_err(|e| {
        Error::render(format!("failed to load font {}: {e}", font_path.display()))
    })?;

    let mut current = doc.get_page(page).get_layer(layer);
    let mut y = EXPORT_TITLE_BASELINE_MM;

    current.use_text(
        EXPORT_TITLE,
        EXPORT_TITLE_SIZE.into(),
        Mm(EXPORT_MARGIN_LEFT_MM.into()),
        Mm(y.into()),
        &font,
    );
    y -= EXPORT_LINE_STEP_MM * 2.0;

    for item in items {
        if y < EXPORT_MARGIN_BOTTOM_MM {
            let (page, layer) = doc.add_page(
                Mm(EXPORT_PAGE_WIDTH_MM.into()),
                Mm(EXPORT_PAGE_HEIGHT_MM.into()),
                "text",
            );
            current = doc.get_page(page).get_layer(layer);
            y = EXPORT_TITLE_BASELINE_MM;
        }

        current.use_text(
            format_line(item),
            EXPORT_FONT_SIZE.into(),
            Mm(EXPORT_MARGIN_LEFT_MM.into()),
            Mm(y.into()),
            &font,
        );
        y -= EXPORT_LINE_STEP_MM;
    }

    doc.save_to_bytes()
        .map_err(|e| Error::render(format!("failed to serialize document: {e}")))
}
