use super::*;

#[test]
fn defaults_match_reference_constants() {
    let cfg = PipelineConfig::default();
    assert_eq!((cfg.width, cfg.height, cfg.fps), (320, 160, 60));
    assert_eq!(cfg.duration_secs, 4.0);
    assert_eq!(cfg.out_dir, PathBuf::from("frames"));
    assert_eq!(cfg.out_file, PathBuf::from("nether.mp4"));
    cfg.validate().unwrap();
}

#[test]
fn total_frames_rounds_to_nearest() {
    let mut cfg = PipelineConfig::default();
    assert_eq!(cfg.total_frames(), 240);

    cfg.duration_secs = 4.016;
    assert_eq!(cfg.total_frames(), 241);

    cfg.duration_secs = 4.005;
    assert_eq!(cfg.total_frames(), 240);

    cfg.duration_secs = 0.0;
    assert_eq!(cfg.total_frames(), 0);
}

#[test]
fn frame_paths_are_zero_padded_in_out_dir() {
    let cfg = PipelineConfig {
        out_dir: PathBuf::from("out"),
        ..PipelineConfig::default()
    };
    assert_eq!(
        cfg.frame_path(FrameIndex(7)),
        PathBuf::from("out").join("frame_0007.ppm")
    );
    assert_eq!(cfg.frame_time(FrameIndex(120)), 2.0);
    assert_eq!(cfg.frame_len_bytes(), Some(320 * 160 * 3));
}

#[test]
fn validation_catches_bad_values() {
    let bad = [
        PipelineConfig {
            width: 0,
            ..PipelineConfig::default()
        },
        PipelineConfig {
            height: 0,
            ..PipelineConfig::default()
        },
        PipelineConfig {
            fps: 0,
            ..PipelineConfig::default()
        },
        PipelineConfig {
            duration_secs: f64::NAN,
            ..PipelineConfig::default()
        },
        PipelineConfig {
            duration_secs: -1.0,
            ..PipelineConfig::default()
        },
        PipelineConfig {
            out_dir: PathBuf::from("   "),
            ..PipelineConfig::default()
        },
        PipelineConfig {
            out_file: PathBuf::new(),
            ..PipelineConfig::default()
        },
    ];
    for cfg in bad {
        assert!(
            matches!(cfg.validate(), Err(NetherError::Configuration(_))),
            "{cfg:?} should be rejected"
        );
    }
}

#[test]
fn json_fields_default_when_omitted() {
    let cfg: PipelineConfig = serde_json::from_str(r#"{ "width": 64, "fps": 24 }"#).unwrap();
    assert_eq!(cfg.width, 64);
    assert_eq!(cfg.height, 160);
    assert_eq!(cfg.fps, 24);
    assert_eq!(cfg.out_file, PathBuf::from("nether.mp4"));

    assert!(serde_json::from_str::<PipelineConfig>(r#"{ "widht": 64 }"#).is_err());
}

#[test]
fn from_json_path_reports_missing_file_as_io() {
    let err = PipelineConfig::from_json_path(Path::new("definitely/not/here.json")).unwrap_err();
    assert!(matches!(err, NetherError::Io { .. }));
}
