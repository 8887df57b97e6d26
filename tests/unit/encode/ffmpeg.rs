use super::*;

fn sample_config() -> EncodeConfig {
    EncodeConfig {
        program: OsString::from("ffmpeg"),
        width: 320,
        height: 160,
        frames_dir: PathBuf::from("frames"),
        fps: 60,
        out_path: PathBuf::from("nether.mp4"),
        overwrite: true,
    }
}

#[test]
fn args_follow_the_fixed_invocation_contract() {
    let args = sample_config().args();
    let want: Vec<OsString> = vec![
        "-y".into(),
        "-framerate".into(),
        "60".into(),
        "-i".into(),
        PathBuf::from("frames")
            .join("frame_%04d.ppm")
            .into_os_string(),
        "-c:v".into(),
        "libx264".into(),
        "-pix_fmt".into(),
        "yuv420p".into(),
        "nether.mp4".into(),
    ];
    assert_eq!(args, want);

    let no_clobber = EncodeConfig {
        overwrite: false,
        ..sample_config()
    };
    assert_eq!(no_clobber.args()[0], OsString::from("-n"));
}

#[test]
fn default_config_mirrors_pipeline() {
    let cfg = default_mp4_config(&PipelineConfig::default());
    assert_eq!(cfg.program, OsString::from("ffmpeg"));
    assert_eq!(cfg.frames_dir, PathBuf::from("frames"));
    assert_eq!(cfg.out_path, PathBuf::from("nether.mp4"));
    assert_eq!(cfg.fps, 60);
    assert_eq!((cfg.width, cfg.height), (320, 160));
    assert!(cfg.overwrite);
}

#[test]
fn config_validation_catches_bad_values() {
    assert!(
        EncodeConfig {
            fps: 0,
            ..sample_config()
        }
        .validate()
        .is_err()
    );
    assert!(sample_config().with_program("").validate().is_err());
    assert!(sample_config().validate().is_ok());
}

#[test]
fn odd_frame_sizes_are_rejected_for_yuv420p() {
    for (width, height) in [(321, 160), (320, 161), (321, 161)] {
        let err = EncodeConfig {
            width,
            height,
            ..sample_config()
        }
        .validate()
        .unwrap_err();
        assert!(matches!(err, NetherError::Configuration(_)), "{err}");
        assert!(err.to_string().contains("even"), "{err}");
    }
    assert!(
        EncodeConfig {
            width: 0,
            ..sample_config()
        }
        .validate()
        .is_err()
    );
}

#[test]
fn missing_program_is_an_encoder_error_without_code() {
    let mut lines = Vec::new();
    let err = run_encoder(
        OsStr::new("nether-test-no-such-encoder"),
        &[],
        &mut |l| lines.push(l.to_string()),
    )
    .unwrap_err();
    assert!(matches!(err, NetherError::Encoder { code: None, .. }), "{err}");
    assert!(lines.is_empty());
    assert!(!is_encoder_available(OsStr::new("nether-test-no-such-encoder")));
}

#[cfg(unix)]
#[test]
fn non_zero_exit_carries_the_code() {
    let args: Vec<OsString> = vec!["-c".into(), "echo failing >&2; exit 3".into()];
    let mut lines = Vec::new();
    let err = run_encoder(OsStr::new("sh"), &args, &mut |l| lines.push(l.to_string())).unwrap_err();
    match err {
        NetherError::Encoder { code, .. } => assert_eq!(code, Some(3)),
        other => panic!("expected encoder error, got {other}"),
    }
    assert_eq!(lines, vec!["failing".to_string()]);
}

#[cfg(unix)]
#[test]
fn stdout_and_stderr_are_both_forwarded() {
    let args: Vec<OsString> = vec![
        "-c".into(),
        "echo out-1; echo err-1 >&2; echo out-2".into(),
    ];
    let mut lines = Vec::new();
    run_encoder(OsStr::new("sh"), &args, &mut |l| lines.push(l.to_string())).unwrap();
    lines.sort();
    assert_eq!(lines, vec!["err-1", "out-1", "out-2"]);
}

#[cfg(unix)]
#[test]
fn large_output_does_not_deadlock() {
    // Well past a 64 KiB pipe buffer on both streams.
    let args: Vec<OsString> = vec![
        "-c".into(),
        "i=0; while [ $i -lt 4000 ]; do echo \"line $i padded to make the pipe fill quickly\"; echo \"err $i padded to make the pipe fill quickly\" >&2; i=$((i+1)); done".into(),
    ];
    let mut count = 0usize;
    run_encoder(OsStr::new("sh"), &args, &mut |_| count += 1).unwrap();
    assert_eq!(count, 8000);
}

#[cfg(unix)]
#[test]
fn failed_drain_kills_and_reaps_the_child() {
    let mut child = Command::new("sh")
        .args(["-c", "sleep 30"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    let started = std::time::Instant::now();

    let err = reap_child(
        &mut child,
        Err(NetherError::io("read 'sh' output", std::io::Error::other("pipe broke"))),
        "sh",
    )
    .unwrap_err();

    assert!(matches!(err, NetherError::Io { .. }), "{err}");
    assert!(started.elapsed() < std::time::Duration::from_secs(20));
    // Already reaped: the exit status is cached and the process is gone.
    let status = child.try_wait().unwrap().expect("child was reaped");
    assert!(!status.success());
}
