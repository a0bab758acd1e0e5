use include_dir::{include_dir, Dir};

use crate::Mode;

static GUIDE_DIR: Dir = include_dir!("src/guides");

/// Training notes shown next to the trace for `mode`.
pub fn text(mode: Mode) -> &'static str {
    GUIDE_DIR
        .get_file(format!("{mode}.txt"))
        .and_then(|file| file.contents_utf8())
        .unwrap_or("No guide available for this mode.")
}
