pub const SHOPPING_LIST_FILENAME: &str = "shopping_cart.pdf";
pub const SHOPPING_LIST_CONTENT_TYPE: &str = "application/pdf";

pub const EXPORT_PAGE_WIDTH_MM: f32 = 210.0;
pub const EXPORT_PAGE_HEIGHT_MM: f32 = 297.0;
pub const EXPORT_MARGIN_LEFT_MM: f32 = 25.0;
pub const EXPORT_MARGIN_BOTTOM_MM: f32 = 20.0;
pub const EXPORT_TITLE_BASELINE_MM: f32 = 270.0;
pub const EXPORT_LINE_STEP_MM: f32 = 6.0;
pub const EXPORT_TITLE_SIZE: f32 = 14.0;
pub const EXPORT_FONT_SIZE: f32 = 12.0;

pub const EXPORT_TITLE: &str = "Shopping list:";

/// Overrides the font search list when set.
pub const EXPORT_FONT_ENV: &str = "EXPORT_FONT_PATH";

pub const EXPORT_FONT_PATHS: &[&str] = &[
    "./fonts/FreeSans.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/Library/Fonts/Arial Unicode.ttf",
];
