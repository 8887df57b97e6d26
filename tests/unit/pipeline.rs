use super::*;
use crate::render::sequence::LogProgress;

fn tiny(out_dir: PathBuf) -> PipelineConfig {
    PipelineConfig {
        width: 4,
        height: 2,
        fps: 10,
        duration_secs: 0.3,
        out_file: out_dir.join("out.mp4"),
        out_dir,
    }
}

#[test]
fn prepare_creates_missing_directories() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("a").join("b");
    let abs = prepare_output_dir(&dir).unwrap();
    assert!(dir.is_dir());
    assert!(abs.is_absolute());
}

#[test]
fn prepare_rejects_blank_and_files() {
    assert!(matches!(
        prepare_output_dir(Path::new("  ")),
        Err(NetherError::Configuration(_))
    ));

    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("not_a_dir");
    std::fs::write(&file, b"x").unwrap();
    assert!(matches!(
        prepare_output_dir(&file),
        Err(NetherError::Io { .. })
    ));
}

#[test]
fn run_without_encoding_stops_at_frames() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = tiny(tmp.path().join("frames"));
    let opts = PipelineOpts {
        encode: false,
        ..PipelineOpts::default()
    };
    let report = run(&cfg, &opts, &CancelToken::new(), &LogProgress, &mut |_| {}).unwrap();
    assert_eq!(report.frames.len(), 3);
    assert_eq!(report.video, None);
    assert!(cfg.out_dir.join("frame_0002.ppm").is_file());
}

#[test]
fn zero_frames_with_encoding_is_a_configuration_error() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = PipelineConfig {
        duration_secs: 0.0,
        ..tiny(tmp.path().join("frames"))
    };
    let err = run(
        &cfg,
        &PipelineOpts::default(),
        &CancelToken::new(),
        &LogProgress,
        &mut |_| {},
    )
    .unwrap_err();
    assert!(matches!(err, NetherError::Configuration(_)));
    assert!(!cfg.out_dir.exists());
}

#[test]
fn missing_encoder_fails_before_rendering() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = tiny(tmp.path().join("frames"));
    let opts = PipelineOpts {
        encoder_program: OsString::from("nether-test-no-such-encoder"),
        ..PipelineOpts::default()
    };
    let err = run(&cfg, &opts, &CancelToken::new(), &LogProgress, &mut |_| {}).unwrap_err();
    assert!(matches!(err, NetherError::Encoder { code: None, .. }));
    assert!(!cfg.out_dir.exists());
}

#[test]
fn odd_frame_size_with_encoding_fails_before_any_frame() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = PipelineConfig {
        width: 321,
        height: 161,
        ..tiny(tmp.path().join("frames"))
    };
    let err = run(
        &cfg,
        &PipelineOpts::default(),
        &CancelToken::new(),
        &LogProgress,
        &mut |_| {},
    )
    .unwrap_err();
    assert!(matches!(err, NetherError::Configuration(_)), "{err}");
    assert!(!cfg.out_dir.exists());
}

#[test]
fn odd_frame_size_is_fine_without_encoding() {
    let tmp = tempfile::tempdir().unwrap();
    let cfg = PipelineConfig {
        width: 3,
        height: 3,
        ..tiny(tmp.path().join("frames"))
    };
    let opts = PipelineOpts {
        encode: false,
        ..PipelineOpts::default()
    };
    let report = run(&cfg, &opts, &CancelToken::new(), &LogProgress, &mut |_| {}).unwrap();
    assert_eq!(report.frames.len(), 3);
}
