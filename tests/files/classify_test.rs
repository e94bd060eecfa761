/*!
 * Classification Tests
 * Categories, links and content against a real directory tree
 */

use std::fs;

use scopefs::files::{classify, is_binary, Category, ClassifyOptions};
use scopefs::sandbox::SandboxRoot;
use scopefs::vfs::LocalFS;
use tempfile::TempDir;

const DETECT: ClassifyOptions = ClassifyOptions {
    detect_content: true,
    modifiable: true,
    read_header: true,
    content: false,
};

fn setup() -> (TempDir, SandboxRoot) {
    let temp = TempDir::new().unwrap();
    let root = SandboxRoot::new(temp.path());
    (temp, root)
}

#[test]
fn test_categories_by_extension_and_header() {
    let (temp, root) = setup();
    let dir = temp.path();
    fs::write(dir.join("clip.mp4"), b"not really a video").unwrap();
    fs::write(dir.join("song.mp3"), b"id3").unwrap();
    fs::write(dir.join("paper.pdf"), b"%PDF-1.4").unwrap();
    fs::write(dir.join("noext"), b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR").unwrap();
    fs::write(dir.join("readme"), b"plain words\n").unwrap();
    fs::write(dir.join("data.bin"), [0u8, 1, 2, 3, 255]).unwrap();

    let fs = LocalFS::new();
    let category = |name: &str| {
        let path = root.resolve(name).unwrap();
        classify(&fs, &root, &path, DETECT).unwrap().category
    };

    assert_eq!(category("/clip.mp4"), Some(Category::Video));
    assert_eq!(category("/song.mp3"), Some(Category::Audio));
    assert_eq!(category("/paper.pdf"), Some(Category::Pdf));
    assert_eq!(category("/noext"), Some(Category::Image));
    assert_eq!(category("/readme"), Some(Category::Text));
    assert_eq!(category("/data.bin"), Some(Category::Blob));
}

#[test]
fn test_text_content_and_immutability() {
    let (temp, root) = setup();
    fs::write(temp.path().join("notes.md"), "# héllo\n").unwrap();

    let opts = ClassifyOptions {
        modifiable: false,
        content: true,
        ..DETECT
    };
    let entry = classify(&LocalFS::new(), &root, &root.resolve("/notes.md").unwrap(), opts)
        .unwrap();
    assert_eq!(entry.category, Some(Category::TextImmutable));
    assert_eq!(entry.content.as_deref(), Some("# héllo\n"));
    assert_eq!(entry.extension, ".md");
}

#[test]
fn test_video_subtitles() {
    let (temp, root) = setup();
    let dir = temp.path().join("movies");
    fs::create_dir(&dir).unwrap();
    for name in ["film.mkv", "film.en.vtt", "film.vtt", "film.srt", "other.vtt"] {
        fs::write(dir.join(name), b"x").unwrap();
    }

    let entry = classify(
        &LocalFS::new(),
        &root,
        &root.resolve("/movies/film.mkv").unwrap(),
        DETECT,
    )
    .unwrap();
    assert_eq!(entry.category, Some(Category::Video));
    assert_eq!(
        entry.subtitles,
        vec!["/movies/film.en.vtt".to_string(), "/movies/film.vtt".to_string()]
    );
}

#[cfg(unix)]
#[test]
fn test_links() {
    let (temp, root) = setup();
    let dir = temp.path();
    fs::write(dir.join("target.txt"), b"0123456789").unwrap();
    std::os::unix::fs::symlink(dir.join("target.txt"), dir.join("abs")).unwrap();
    std::os::unix::fs::symlink("target.txt", dir.join("rel")).unwrap();
    std::os::unix::fs::symlink("/etc/hostname", dir.join("outside")).unwrap();
    std::os::unix::fs::symlink("missing", dir.join("dangling")).unwrap();

    let fs = LocalFS::new();
    let entry = |name: &str| classify(&fs, &root, &root.resolve(name).unwrap(), DETECT).unwrap();

    let abs = entry("/abs");
    assert!(abs.is_symlink);
    assert_eq!(abs.size, 10);
    assert_eq!(abs.link_target.as_deref(), Some("/target.txt"));
    assert_eq!(abs.category, Some(Category::Text));

    assert_eq!(entry("/rel").link_target.as_deref(), Some("target.txt"));
    // Never reveal where the sandbox lives on the host
    assert_eq!(entry("/outside").link_target, None);

    let dangling = entry("/dangling");
    assert!(dangling.is_symlink);
    assert_eq!(dangling.category, Some(Category::InvalidLink));
}

#[test]
fn test_text_binary_boundary() {
    let mut text = b"plain ascii text ".to_vec();
    text.extend_from_slice(&[0xE2, 0x82]);
    assert!(!is_binary(&text));

    let mut mid = b"plain ".to_vec();
    mid.extend_from_slice(&[0xE2, 0x82]);
    mid.extend_from_slice(b" ascii text continues here");
    assert!(is_binary(&mid));
}

#[test]
fn test_missing_file_names_virtual_path() {
    let (temp, root) = setup();
    let err = classify(&LocalFS::new(), &root, &root.resolve("/ghost").unwrap(), DETECT)
        .unwrap_err();
    let message = err.to_string();
    assert!(message.contains("/ghost"));
    assert!(!message.contains(&*temp.path().to_string_lossy()));
}
