//! Logical paths for newly uploaded assets.

use chrono::Utc;
use uuid::Uuid;
use vidnote_document::LogicalPath;

const DEFAULT_VIDEO_EXT: &str = "mp4";

/// `<folder>/<millis>-<12 hex>.<ext>`. The extension comes from the
/// uploaded file name when it has an alphanumeric one.
pub fn video_path(folder: &str, original_name: &str) -> LogicalPath {
    let ext = extension(original_name).unwrap_or(DEFAULT_VIDEO_EXT);
    let random = Uuid::new_v4().simple().to_string();
    LogicalPath::new(format!(
        "{}/{}-{}.{}",
        trim_folder(folder),
        Utc::now().timestamp_millis(),
        &random[..12],
        ext
    ))
}

/// `<folder>/<millis>-<name>` with every character outside
/// `[A-Za-z0-9._-]` replaced by `_`.
pub fn image_path(folder: &str, original_name: &str) -> LogicalPath {
    let name = if original_name.is_empty() {
        "image"
    } else {
        original_name
    };
    LogicalPath::new(format!(
        "{}/{}-{}",
        trim_folder(folder),
        Utc::now().timestamp_millis(),
        sanitize(name)
    ))
}

/// Fresh record id for a markup.
pub fn new_record_id() -> String {
    Uuid::new_v4().simple().to_string()
}

pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

fn extension(name: &str) -> Option<&str> {
    let (_, ext) = name.rsplit_once('.')?;
    if !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        Some(ext)
    } else {
        None
    }
}

fn trim_folder(folder: &str) -> &str {
    folder.trim_end_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn split(path: &LogicalPath) -> (String, String) {
        let (folder, file) = path.as_str().rsplit_once('/').unwrap();
        (folder.to_string(), file.to_string())
    }

    #[test]
    fn test_video_path_shape() {
        let path = video_path("/timecodes", "Lecture 3.MOV");
        let (folder, file) = split(&path);
        let (millis, rest) = file.split_once('-').unwrap();
        let (random, ext) = rest.split_once('.').unwrap();

        assert_eq!(folder, "/timecodes");
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(random.len(), 12);
        assert!(random.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(ext, "MOV");
    }

    #[test]
    fn test_video_extension_defaults() {
        assert!(video_path("/timecodes/", "video").as_str().ends_with(".mp4"));
        assert!(video_path("/timecodes", "weird.m p4").as_str().ends_with(".mp4"));
        assert!(!video_path("/timecodes/", "a.webm").as_str().contains("//"));
    }

    #[test]
    fn test_image_path_sanitizes() {
        let path = image_path("/timecodes-images", "my cat (1).png");
        let (folder, file) = split(&path);

        assert_eq!(folder, "/timecodes-images");
        assert!(file.ends_with("-my_cat__1_.png"));
    }

    #[test]
    fn test_sanitize_non_ascii() {
        assert_eq!(sanitize("схема.png"), "_____.png");
        assert_eq!(sanitize("a-b_c.d"), "a-b_c.d");
    }

    #[test]
    fn test_record_ids_are_distinct() {
        assert_ne!(new_record_id(), new_record_id());
    }
}
