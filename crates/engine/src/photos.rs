use std::path::Path;

use chrono::{DateTime, Utc};

use crate::{ValidationErrors, ValidationKind};

/// Relative location of an uploaded photo: `photos/YYYY/MM/DD/<file name>`.
///
/// Only the final component of `filename` is kept.
pub fn photo_path(uploaded_at: DateTime<Utc>, filename: &str) -> Result<String, ValidationErrors> {
    let name = Path::new(filename.trim())
        .file_name()
        .and_then(|name| name.to_str())
        .filter(|name| !name.is_empty() && !name.starts_with('.'))
        .ok_or_else(|| {
            ValidationErrors::single(
                "filename",
                ValidationKind::InvalidFileName,
                "a plain file name is required",
            )
        })?;

    Ok(format!(
        "photos/{}/{name}",
        uploaded_at.format("%Y/%m/%d")
    ))
}

/// The `n`-th alternative of a taken photo reference: `car.jpg` becomes
/// `car_1.jpg`, `car_2.jpg` and so on. `n == 0` is the reference itself.
pub fn numbered_photo_path(photo: &str, n: u32) -> String {
    if n == 0 {
        return photo.to_string();
    }
    let (dir, name) = photo.rsplit_once('/').unwrap_or(("", photo));
    let numbered = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{stem}_{n}.{ext}"),
        _ => format!("{name}_{n}"),
    };
    if dir.is_empty() {
        numbered
    } else {
        format!("{dir}/{numbered}")
    }
}
