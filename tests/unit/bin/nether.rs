use super::*;

#[test]
fn panics_become_errors_with_the_payload() {
    let err = catch_panic(|| panic!("worker blew up")).unwrap_err();
    assert!(err.to_string().contains("worker blew up"), "{err}");

    let owned = catch_panic(|| panic!("frame {}", 7)).unwrap_err();
    assert!(owned.to_string().contains("frame 7"), "{owned}");
}

#[test]
fn panics_exit_through_the_catch_all_status() {
    let err = catch_panic(|| panic!("boom")).unwrap_err();
    assert_eq!(report(&err), ExitCode::from(1));
}

#[test]
fn categorized_errors_keep_their_status() {
    let err = anyhow::Error::from(NetherError::configuration("bad width"));
    assert_eq!(report(&err), ExitCode::from(2));
    assert!(catch_panic(|| Ok(())).is_ok());
}
