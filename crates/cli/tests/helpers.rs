use tempfile::tempdir;
use uwin_lift_hlp::{check_output_path, read_extra_seeds};

#[test]
fn extra_seeds_ignore_blank_lines() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("seeds.txt");
    std::fs::write(&path, "4198400\n\n4198912\n").unwrap();
    assert_eq!(read_extra_seeds(&path).unwrap(), vec![4198400, 4198912]);
}

#[test]
fn extra_seeds_report_malformed_lines() {
    let temp = tempdir().unwrap();
    let path = temp.path().join("seeds.txt");
    std::fs::write(&path, "4198400\nmain\n").unwrap();
    let err = read_extra_seeds(&path).unwrap_err();
    assert!(err.to_string().contains("Failed to load extra seed addresses"), "unexpected: {err}");
    assert!(format!("{err:#}").contains("Malformed line 2"), "unexpected: {err:#}");
}

#[test]
fn output_directory_must_exist() {
    let temp = tempdir().unwrap();
    assert!(check_output_path(&temp.path().join("game.o")).is_ok());
    let err = check_output_path(&temp.path().join("missing").join("game.o")).unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}
