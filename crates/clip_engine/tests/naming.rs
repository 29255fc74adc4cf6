use clip_engine::{derive_filename, download_path, sanitize_folder, DownloadSettings};
use pretty_assertions::assert_eq;

fn settings() -> DownloadSettings {
    DownloadSettings::default()
}

#[test]
fn traversal_segments_never_survive() {
    let folder = sanitize_folder("../../etc", &settings());
    assert_eq!(folder, "etc");
    for raw in ["..", "a/../b", "..\\..\\windows", "/abs/path", "x/./y"] {
        let folder = sanitize_folder(raw, &settings());
        assert!(!folder.contains(".."), "{raw} -> {folder}");
        assert!(!folder.contains('/') && !folder.contains('\\'), "{raw} -> {folder}");
        assert!(!folder.is_empty());
    }
}

#[test]
fn nested_folder_is_flattened() {
    assert_eq!(sanitize_folder("My Clips/2024", &settings()), "My Clips_2024");
    assert_eq!(sanitize_folder("what?:*", &settings()), "what");
}

#[test]
fn blank_folder_uses_default() {
    for raw in ["", "   ", "...", "///"] {
        assert_eq!(sanitize_folder(raw, &settings()), "ChatClips", "{raw:?}");
    }
}

#[test]
fn reserved_folder_names_are_escaped() {
    assert_eq!(sanitize_folder("con", &settings()), "con_");
}

#[test]
fn folder_length_is_capped() {
    let long = "x".repeat(500);
    assert_eq!(sanitize_folder(&long, &settings()).len(), 64);
}

#[test]
fn file_name_comes_from_last_segment() {
    assert_eq!(
        derive_filename(
            "https://cdn.test/attachments/1/2/clip123.mp4?ex=1&hm=abc",
            &settings()
        ),
        "clip123.mp4"
    );
    assert_eq!(
        derive_filename("https://cdn.test/v/My%20Video.webm", &settings()),
        "My_Video.webm"
    );
}

#[test]
fn nameless_url_gets_hash_and_default_extension() {
    let name = derive_filename("https://cdn.test/media/abcdef", &settings());
    assert!(name.starts_with("clip-"), "{name}");
    assert!(name.ends_with(".mp4"), "{name}");
    assert_eq!(name.len(), "clip-".len() + 8 + ".mp4".len());
    // Deterministic per URL.
    assert_eq!(name, derive_filename("https://cdn.test/media/abcdef", &settings()));
    assert_ne!(name, derive_filename("https://cdn.test/media/other", &settings()));
}

#[test]
fn extension_is_inferred_from_query() {
    assert_eq!(
        derive_filename("https://cdn.test/a/file.bin?format=webm", &settings()),
        "file.bin.webm"
    );
}

#[test]
fn download_path_joins_folder_and_file() {
    assert_eq!(
        download_path("https://cdn.test/a/clip123.mp4", "../../etc", &settings()),
        "etc/clip123.mp4"
    );
    assert_eq!(
        download_path("https://cdn.test/a/clip123.mp4", "", &settings()),
        "ChatClips/clip123.mp4"
    );
}
