//! File-system tests: path lookup, iteration, chained reads.

mod common;

use common::{FatSpec, VolumeBuilder};
use easel::{Error, FatKind, FileEntry, VfsVisitor, VirtualFileSystem, PAGE_SIZE};

/// Records every visitor callback as a readable event string.
#[derive(Default)]
struct Recorder {
    events: Vec<String>,
    stop_after: Option<usize>,
}

impl VfsVisitor for Recorder {
    fn folder_begin(&mut self, entry: &mut FileEntry) -> bool {
        self.events.push(format!("begin:{}", entry.name()));
        true
    }

    fn folder_end(&mut self, entry: &mut FileEntry) -> bool {
        self.events.push(format!("end:{}", entry.name()));
        true
    }

    fn file(&mut self, entry: &mut FileEntry) -> bool {
        self.events.push(format!("file:{}", entry.name()));
        self.stop_after != Some(self.events.len())
    }
}

fn layers_volume() -> VolumeBuilder {
    let mut builder = VolumeBuilder::new(8);
    builder
        .directory(2, &[FatSpec::folder("layers", 3)])
        .directory(
            3,
            &[
                FatSpec::file("00000001", 4, 0),
                FatSpec::file("00000002", 5, 128),
            ],
        );
    builder
}

#[test]
fn iteration_visits_in_stored_order() {
    let file = layers_volume().write_temp();
    let vfs = VirtualFileSystem::open(file.path()).unwrap();

    let mut recorder = Recorder::default();
    vfs.iterate(&mut recorder).unwrap();
    assert_eq!(
        recorder.events,
        [
            "begin:layers",
            "file:00000001",
            "file:00000002",
            "end:layers",
        ]
    );
}

#[test]
fn iteration_stops_when_visitor_declines() {
    let file = layers_volume().write_temp();
    let vfs = VirtualFileSystem::open(file.path()).unwrap();

    let mut recorder = Recorder {
        stop_after: Some(2),
        ..Default::default()
    };
    vfs.iterate(&mut recorder).unwrap();
    assert_eq!(recorder.events, ["begin:layers", "file:00000001"]);
}

#[test]
fn lookup_descends_folders() {
    let file = layers_volume().write_temp();
    let vfs = VirtualFileSystem::open(file.path()).unwrap();

    let entry = vfs.get_entry("layers/00000002").unwrap();
    assert_eq!(entry.name(), "00000002");
    assert_eq!(entry.kind(), Some(FatKind::File));
    assert_eq!(entry.page_index(), 5);
    assert_eq!(entry.size(), 128);
}

#[test]
fn dot_is_a_path_separator_too() {
    let file = layers_volume().write_temp();
    let vfs = VirtualFileSystem::open(file.path()).unwrap();

    assert!(vfs.exists("layers.00000001"));
    assert!(vfs.exists("/layers/00000001"));
    assert!(!vfs.exists("layers.00000009"));
}

#[test]
fn missing_path_reports_not_found() {
    let file = layers_volume().write_temp();
    let vfs = VirtualFileSystem::open(file.path()).unwrap();

    assert!(matches!(
        vfs.get_entry("nowhere"),
        Err(Error::PathNotFound(_))
    ));
}

#[test]
fn file_in_the_middle_of_a_path_is_an_error() {
    let file = layers_volume().write_temp();
    let vfs = VirtualFileSystem::open(file.path()).unwrap();

    assert!(matches!(
        vfs.get_entry("layers/00000001/deeper"),
        Err(Error::PathNotFolder(_))
    ));
}

#[test]
fn chained_file_reads_across_pages() {
    let mut page_a = vec![0u8; PAGE_SIZE];
    let mut page_b = vec![0u8; PAGE_SIZE];
    let mut page_c = vec![0u8; PAGE_SIZE];
    for i in 0..PAGE_SIZE {
        page_a[i] = (i % 251) as u8;
        page_b[i] = (i % 241) as u8;
        page_c[i] = (i % 239) as u8;
    }

    let file = VolumeBuilder::new(16)
        .directory(2, &[FatSpec::file("big", 10, 10_000)])
        .page(10, &page_a)
        .page(11, &page_b)
        .page(12, b"someone else's page")
        .page(13, &page_c)
        .chain(10, 11)
        .chain(11, 13)
        .write_temp();
    let vfs = VirtualFileSystem::open(file.path()).unwrap();

    let mut entry = vfs.get_entry("big").unwrap();
    let mut content = vec![0u8; 10_000];
    assert_eq!(entry.read(&mut content).unwrap(), 10_000);

    let mut expected = Vec::new();
    expected.extend_from_slice(&page_a);
    expected.extend_from_slice(&page_b);
    expected.extend_from_slice(&page_c[..10_000 - 2 * PAGE_SIZE]);
    assert_eq!(content, expected);
    assert_eq!(entry.tell(), 10_000);

    // Offset 4100 lands four bytes into the second chained page.
    entry.seek(4100).unwrap();
    assert_eq!(entry.tell(), 4100);
    let mut four = [0u8; 4];
    assert_eq!(entry.read(&mut four).unwrap(), 4);
    assert_eq!(four, page_b[4..8]);
}

#[test]
fn seek_then_tell_round_trips() {
    let file = VolumeBuilder::new(16)
        .directory(2, &[FatSpec::file("big", 10, 9000)])
        .page(10, &[1; PAGE_SIZE])
        .page(11, &[2; PAGE_SIZE])
        .page(12, &[3; PAGE_SIZE])
        .chain(10, 11)
        .chain(11, 12)
        .write_temp();
    let vfs = VirtualFileSystem::open(file.path()).unwrap();

    let mut entry = vfs.get_entry("big").unwrap();
    for offset in [0usize, 1, 4095, 4096, 8191, 8999] {
        entry.seek(offset).unwrap();
        assert_eq!(entry.tell(), offset);
    }
    assert!(entry.seek(9001).is_err());

    // The same range reads the same bytes twice.
    entry.seek(4090).unwrap();
    let mut first = [0u8; 12];
    entry.read(&mut first).unwrap();
    entry.seek(4090).unwrap();
    let mut second = [0u8; 12];
    entry.read(&mut second).unwrap();
    assert_eq!(first, second);
    assert_eq!(&first[..6], &[1; 6]);
    assert_eq!(&first[6..], &[2; 6]);
}

#[test]
fn read_clamps_to_file_size() {
    let file = VolumeBuilder::new(8)
        .directory(2, &[FatSpec::file("small", 3, 10)])
        .page(3, b"0123456789abcdef")
        .write_temp();
    let vfs = VirtualFileSystem::open(file.path()).unwrap();

    let mut entry = vfs.get_entry("small").unwrap();
    let mut buf = [0u8; 32];
    assert_eq!(entry.read(&mut buf).unwrap(), 10);
    assert_eq!(&buf[..10], b"0123456789");
    assert_eq!(entry.read(&mut buf).unwrap(), 0);
}

#[test]
fn directory_overflow_continues_on_chained_page() {
    let root: Vec<FatSpec> = (0..64)
        .map(|i| FatSpec::file(&format!("f{i:02}"), 10, 4))
        .collect();

    let file = VolumeBuilder::new(16)
        .directory(2, &root)
        .directory(6, &[FatSpec::file("extra", 11, 4)])
        .chain(2, 6)
        .page(10, b"data")
        .page(11, b"more")
        .write_temp();
    let vfs = VirtualFileSystem::open(file.path()).unwrap();

    // Lookup follows the overflow chain past the 64 root slots.
    let entry = vfs.get_entry("extra").unwrap();
    assert_eq!(entry.page_index(), 11);

    let mut recorder = Recorder::default();
    vfs.iterate(&mut recorder).unwrap();
    assert_eq!(recorder.events.len(), 65);
    assert_eq!(recorder.events[64], "file:extra");
}

#[test]
fn iteration_agrees_with_lookup() {
    /// Collects `(path, first_page)` for every file.
    #[derive(Default)]
    struct PathCollector {
        stack: Vec<String>,
        files: Vec<(String, u32)>,
    }

    impl VfsVisitor for PathCollector {
        fn folder_begin(&mut self, entry: &mut FileEntry) -> bool {
            self.stack.push(entry.name().into_owned());
            true
        }

        fn folder_end(&mut self, _entry: &mut FileEntry) -> bool {
            self.stack.pop();
            true
        }

        fn file(&mut self, entry: &mut FileEntry) -> bool {
            let mut path = self.stack.join("/");
            if !path.is_empty() {
                path.push('/');
            }
            path.push_str(&entry.name());
            self.files.push((path, entry.page_index()));
            true
        }
    }

    let file = VolumeBuilder::new(16)
        .directory(
            2,
            &[
                FatSpec::file("canvas", 8, 12),
                FatSpec::folder("layers", 3),
            ],
        )
        .directory(
            3,
            &[
                FatSpec::file("00000001", 9, 4),
                FatSpec::file("00000002", 10, 4),
            ],
        )
        .write_temp();
    let vfs = VirtualFileSystem::open(file.path()).unwrap();

    let mut collector = PathCollector::default();
    vfs.iterate(&mut collector).unwrap();
    assert_eq!(collector.files.len(), 3);

    for (path, page_index) in collector.files {
        let entry = vfs.get_entry(path.as_bytes()).unwrap();
        assert_eq!(entry.page_index(), page_index, "{path}");
    }
}

#[test]
fn entry_timestamps_convert_to_unix() {
    let file = layers_volume().write_temp();
    let vfs = VirtualFileSystem::open(file.path()).unwrap();

    let entry = vfs.get_entry("layers/00000001").unwrap();
    assert_eq!(entry.timestamp_unix(), 1_567_531_938);
    assert_eq!(entry.timestamp(), common::filetime(1_567_531_938));
}

#[test]
fn visitor_can_read_file_contents() {
    struct ContentReader {
        seen: Vec<Vec<u8>>,
    }

    impl VfsVisitor for ContentReader {
        fn file(&mut self, entry: &mut FileEntry) -> bool {
            let mut buf = vec![0u8; entry.size()];
            entry.read(&mut buf).unwrap();
            self.seen.push(buf);
            true
        }
    }

    let file = VolumeBuilder::new(8)
        .directory(2, &[FatSpec::file("note", 3, 5)])
        .page(3, b"hello")
        .write_temp();
    let vfs = VirtualFileSystem::open(file.path()).unwrap();

    let mut reader = ContentReader { seen: Vec::new() };
    vfs.iterate(&mut reader).unwrap();
    assert_eq!(reader.seen, [b"hello".to_vec()]);
}
